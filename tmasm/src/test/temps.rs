use super::{lines, tokens};
use crate::lexer::reformat;
use crate::temps::{hoist_declarations, lower_returns, reuse_temporaries};
use crate::words::join;

#[test]
fn sequential_temps_share_a_slot() {
    let program = lines(
        "int !FUNC_USER_main ( ) {
            int !VAR_TEMP_temp3 ;
            !VAR_TEMP_temp3 5 = ;
            !VAR_USER_x !VAR_TEMP_temp3 = ;
            int !VAR_TEMP_temp8 ;
            !VAR_TEMP_temp8 6 = ;
            !VAR_USER_y !VAR_TEMP_temp8 = ;
        }",
    );
    let out = reformat(&reuse_temporaries(&program));
    let flat = join(&tokens(&out));

    // both lifetimes are disjoint, so both become temp0
    assert!(flat.contains("!VAR_TEMP_temp0"), "{}", flat);
    assert!(!flat.contains("!VAR_TEMP_temp3"), "{}", flat);
    assert!(!flat.contains("!VAR_TEMP_temp8"), "{}", flat);
    assert!(!flat.contains("!VAR_TEMP_temp1 "), "{}", flat);
}

#[test]
fn overlapping_temps_get_distinct_slots() {
    let program = lines(
        "int !FUNC_USER_main ( ) {
            int !VAR_TEMP_temp4 ;
            int !VAR_TEMP_temp7 ;
            !VAR_TEMP_temp4 1 = ;
            !VAR_TEMP_temp7 2 = ;
            !VAR_TEMP_temp4 !VAR_TEMP_temp7 && = !VAR_TEMP_temp9 ;
        }",
    );
    let out = reformat(&reuse_temporaries(&program));
    let body = join(&tokens(&out));

    // temp4 and temp7 overlap on the last line and must stay distinct
    assert!(
        body.contains("!VAR_TEMP_temp0 !VAR_TEMP_temp1 && ="),
        "{}",
        body
    );
}

#[test]
fn functions_are_renumbered_independently() {
    let program = lines(
        "int !FUNC_USER_f ( ) {
            !VAR_TEMP_temp5 1 = ;
        }
        int !FUNC_USER_main ( ) {
            !VAR_TEMP_temp6 2 = ;
        }",
    );
    let out = reformat(&reuse_temporaries(&program));
    let flat = join(&tokens(&out));

    assert!(flat.contains("!VAR_TEMP_temp0 1 = ;"), "{}", flat);
    assert!(flat.contains("!VAR_TEMP_temp0 2 = ;"), "{}", flat);
}

#[test]
fn declarations_hoist_into_a_declare_header() {
    let program = lines(
        "int !FUNC_USER_main ( ) {
            int !VAR_USER_x ;
            !VAR_USER_x 1 = ;
            int !VAR_TEMP_temp0 ;
            !VAR_TEMP_temp0 2 = ;
        }",
    );
    let out = reformat(&hoist_declarations(&program));

    assert_eq!(out[0], "int !FUNC_USER_main ( ) {");
    assert_eq!(out[1].trim(), "declare !VAR_USER_x !VAR_TEMP_temp0 ;");
    // the in-body declarations are gone
    assert!(out.iter().skip(2).all(|l| !l.contains("int !VAR")));
}

#[test]
fn empty_functions_still_get_a_declare_line() {
    let program = lines(
        "void !FUNC_USER_f ( ) {
            return ;
        }",
    );
    let out = reformat(&hoist_declarations(&program));
    assert_eq!(out[1].trim(), "declare ;");
}

#[test]
fn value_returns_copy_into_rax() {
    let program = lines("!VAR_TEMP_temp0 return ;");
    let out = reformat(&lower_returns(&program));
    assert_eq!(
        tokens(&out),
        ["!TAPE_RAX", "!VAR_TEMP_temp0", "=", ";", "return", ";"]
    );
}

#[test]
fn bare_returns_are_untouched() {
    let program = lines("return ;");
    let out = reformat(&lower_returns(&program));
    assert_eq!(tokens(&out), ["return", ";"]);
}
