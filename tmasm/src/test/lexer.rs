use super::{lines, tokens};
use crate::lexer::{reformat, space_operators, strip_comments};
use crate::Error;
use matches::assert_matches;

#[test]
fn line_comments_are_dropped() {
    let program = lines("int x; // trailing\n// whole line\nint y;");
    let stripped = strip_comments(&program).unwrap();
    assert_eq!(stripped, vec!["int x; ".to_owned(), "int y;".to_owned()]);
}

#[test]
fn block_comments_can_span_lines() {
    // the newlines inside the comment go with it
    let program = lines("int x; /* one\ntwo\nthree */ int y;");
    let stripped = strip_comments(&program).unwrap();
    assert_eq!(stripped, vec!["int x;  int y;".to_owned()]);
}

#[test]
fn unterminated_block_comment_is_an_error() {
    let program = lines("int x;\nint y; /* oops");
    assert_matches!(
        strip_comments(&program),
        Err(Error::UnterminatedComment { line: 2 })
    );
}

#[test]
fn operators_get_spaced() {
    let program = lines("x=a+b;");
    let spaced = space_operators(&program);
    assert_eq!(tokens(&spaced), ["x", "=", "a", "+", "b", ";"]);
}

#[test]
fn two_char_operators_survive_spacing() {
    let program = lines("x+=3;y<=z;a!=b;c&&d;");
    let spaced = space_operators(&program);
    assert_eq!(
        tokens(&spaced),
        ["x", "+=", "3", ";", "y", "<=", "z", ";", "a", "!=", "b", ";", "c", "&&", "d", ";"]
    );
}

#[test]
fn negative_literal_splits_into_minus_and_digits() {
    let program = lines("x=-5;");
    let spaced = space_operators(&program);
    assert_eq!(tokens(&spaced), ["x", "=", "-", "5", ";"]);
}

#[test]
fn reformat_breaks_lines_on_statements_and_braces() {
    let program = lines("int main ( ) { int x ; x = 1 ; }");
    let formatted = reformat(&program);
    assert_eq!(
        formatted,
        vec![
            "int main ( ) {".to_owned(),
            "\tint x ;".to_owned(),
            "\tx = 1 ;".to_owned(),
            "}".to_owned(),
        ]
    );
}

#[test]
fn for_headers_stay_on_one_line() {
    let program = lines("for ( i = 0 ; i < 3 ; i += 1 ) { }");
    let formatted = reformat(&program);
    assert_eq!(formatted[0], "for ( i = 0 ; i < 3 ; i += 1 ) {");
}
