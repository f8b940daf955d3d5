use super::{lines, tokens};
use crate::control::{
    append_void_returns, expand_else_if, for_to_while, lower_while_conditions,
    parenthesize_returns, split_declarations,
};
use crate::lexer::reformat;
use crate::words::join;

fn rewrite<F>(source: &str, pass: F) -> Vec<String>
where
    F: Fn(&[String]) -> Vec<String>,
{
    reformat(&pass(&lines(source)))
}

#[test]
fn for_becomes_init_while_update() {
    let out = rewrite(
        "int main ( ) { for ( i = 0 ; i < N ; i += 1 ) { s += i ; } }",
        |p| for_to_while(p),
    );

    let flat = join(&tokens(&out));
    assert!(flat.contains("i = 0 ; while ( i < N ) {"), "{}", flat);
    // update runs at the end of the body
    assert!(flat.contains("s += i ; i += 1 ; }"), "{}", flat);
}

#[test]
fn empty_for_condition_becomes_true() {
    let out = rewrite("int main ( ) { for ( ; ; ) { x = 1 ; } }", |p| {
        for_to_while(p)
    });
    assert!(join(&tokens(&out)).contains("while ( true ) {"));
}

#[test]
fn continue_picks_up_the_update() {
    let out = rewrite(
        "int main ( ) { for ( i = 0 ; i < N ; i += 1 ) { continue ; x = 1 ; } }",
        |p| for_to_while(p),
    );
    assert!(join(&tokens(&out)).contains("i += 1 ; continue ;"));
}

#[test]
fn inner_loop_continue_is_left_alone() {
    let out = rewrite(
        "int main ( ) { for ( i = 0 ; i < N ; i += 1 ) { while ( b ) { continue ; } } }",
        |p| for_to_while(p),
    );
    let flat = join(&tokens(&out));
    // the inner continue must not gain the outer update
    assert!(flat.contains("while ( b ) { continue ; }"), "{}", flat);
}

#[test]
fn else_if_gains_braces() {
    let out = rewrite(
        "int main ( ) { if ( a ) { } else if ( b ) { } else { } }",
        |p| expand_else_if(p),
    );
    let flat = join(&tokens(&out));
    assert!(flat.contains("else { if ( b ) { } else { } }"), "{}", flat);
}

#[test]
fn while_condition_moves_into_a_guard() {
    let out = rewrite("int main ( ) { while ( a ) { x = 1 ; } }", |p| {
        lower_while_conditions(p)
    });
    let flat = join(&tokens(&out));
    assert!(
        flat.contains("while ( true ) { if ( ! ( a ) ) { break ; }"),
        "{}",
        flat
    );
}

#[test]
fn void_functions_gain_a_return() {
    let out = rewrite("void !FUNC_USER_f ( ) { x = 1 ; }", |p| {
        append_void_returns(p)
    });
    assert!(join(&tokens(&out)).contains("x = 1 ; return ; }"));
}

#[test]
fn existing_trailing_return_is_kept_single() {
    let out = rewrite("void !FUNC_USER_f ( ) { return ; }", |p| {
        append_void_returns(p)
    });
    let count = tokens(&out).iter().filter(|t| *t == "return").count();
    assert_eq!(count, 1);
}

#[test]
fn returns_are_parenthesized() {
    let out = rewrite("int !FUNC_USER_f ( ) { return a + b ; }", |p| {
        parenthesize_returns(p)
    });
    assert!(join(&tokens(&out)).contains("return ( a + b ) ;"));
}

#[test]
fn bare_return_is_untouched() {
    let out = rewrite("void !FUNC_USER_f ( ) { return ; }", |p| {
        parenthesize_returns(p)
    });
    assert!(join(&tokens(&out)).contains("return ; }"));
}

#[test]
fn declarations_split_and_default() {
    let out = rewrite("int !VAR_USER_x ;", |p| split_declarations(p));
    assert_eq!(
        tokens(&out),
        ["int", "!VAR_USER_x", ";", "!VAR_USER_x", "=", "0", ";"]
    );

    let out = rewrite("bool !VAR_USER_b ;", |p| split_declarations(p));
    assert_eq!(
        tokens(&out),
        ["bool", "!VAR_USER_b", ";", "!VAR_USER_b", "=", "false", ";"]
    );

    let out = rewrite("int !VAR_USER_x = 5 ;", |p| split_declarations(p));
    assert_eq!(
        tokens(&out),
        ["int", "!VAR_USER_x", ";", "!VAR_USER_x", "=", "5", ";"]
    );
}
