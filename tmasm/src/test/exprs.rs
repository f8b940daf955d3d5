use super::{front_half, lines, tokens};
use crate::exprs::{
    lower_compound_assignments, lower_memory_access, materialize_arguments, replace_operators,
    shunting_yard, signatures, simplify_expressions,
};
use crate::lexer::reformat;
use crate::words::{join, words};
use crate::{Error, TempGen};
use matches::assert_matches;

fn yard(expr: &str) -> Vec<String> {
    shunting_yard(&words(expr)).unwrap()
}

#[test]
fn precedence_orders_the_postfix() {
    let postfix = yard("!VAR_USER_x = !VAR_USER_a + !VAR_USER_b * !VAR_USER_c");
    assert_eq!(
        postfix,
        [
            "!VAR_USER_x",
            "!VAR_USER_a",
            "!VAR_USER_b",
            "!VAR_USER_c",
            "*",
            "+",
            "="
        ]
    );
}

#[test]
fn parentheses_override_precedence() {
    let postfix = yard("( !VAR_USER_a + !VAR_USER_b ) * !VAR_USER_c");
    assert_eq!(
        postfix,
        ["!VAR_USER_a", "!VAR_USER_b", "+", "!VAR_USER_c", "*"]
    );
}

#[test]
fn leading_minus_is_unary() {
    let postfix = yard("- !VAR_USER_a + !VAR_USER_b");
    assert_eq!(postfix, ["!VAR_USER_a", "u-", "!VAR_USER_b", "+"]);
}

#[test]
fn minus_after_value_is_binary() {
    let postfix = yard("!VAR_USER_a - !VAR_USER_b");
    assert_eq!(postfix, ["!VAR_USER_a", "!VAR_USER_b", "-"]);
}

#[test]
fn function_call_consumes_its_arguments() {
    let postfix = yard("!FUNC_LIB_basic_add ( !VAR_USER_a , !VAR_USER_b )");
    assert_eq!(postfix, ["!VAR_USER_a", "!VAR_USER_b", "!FUNC_LIB_basic_add"]);
}

#[test]
fn mem_subscript_rides_the_stack() {
    let postfix = yard("!VAR_LIB_MEM [ !VAR_USER_i ] = !VAR_USER_x");
    assert_eq!(postfix, ["!VAR_USER_i", "!VAR_LIB_MEM", "!VAR_USER_x", "="]);
}

#[test]
fn unbalanced_parens_are_rejected() {
    assert_matches!(
        shunting_yard(&words("( !VAR_USER_a + !VAR_USER_b")),
        Err(Error::UnbalancedExpression { .. })
    );
    assert_matches!(
        shunting_yard(&words("!VAR_USER_a + !VAR_USER_b )")),
        Err(Error::UnbalancedExpression { .. })
    );
}

fn simplified(source: &str) -> Vec<String> {
    let mut temps = TempGen::new();
    let p = front_half(source);
    reformat(&simplify_expressions(&p, &mut temps).unwrap())
}

#[test]
fn compound_expression_becomes_three_address_lines() {
    let out = simplified("int main() { int x = 0; x = x + x * x; return 0; }");
    let flat = join(&tokens(&out));
    // the product lands in a temp, the sum in another
    assert!(
        flat.contains("!VAR_USER_x !VAR_USER_x * ="),
        "{}",
        flat
    );
    assert!(flat.contains("+ ="), "{}", flat);
}

#[test]
fn literals_are_hoisted_into_temps() {
    let out = simplified("int main() { int x = 41; return 0; }");
    let flat = join(&tokens(&out));
    assert!(flat.contains("41 = ;"), "{}", flat);
    // the literal write targets a temp, not the user variable
    let line = out
        .iter()
        .find(|l| words(l).contains(&"41".to_owned()))
        .unwrap();
    assert!(words(line)[0].starts_with("!VAR_TEMP"), "{}", line);
}

#[test]
fn short_circuit_and_branches_on_the_left_operand() {
    let out = simplified(
        "int main() { bool a = true; bool b = true; bool r = a && b; return 0; }",
    );
    let flat = join(&tokens(&out));
    assert!(flat.contains("if {"), "{}", flat);
    assert!(flat.contains("else {"), "{}", flat);
    // both branches assign the result temp
    let assigns = out
        .iter()
        .filter(|l| {
            let w = words(l);
            w.len() == 4 && w[2] == "=" && w[0].starts_with("!VAR_TEMP")
        })
        .count();
    assert!(assigns >= 2, "{}", flat);
}

#[test]
fn simplifier_is_idempotent() {
    let source = "int f(int n) { return n + 1; }
        int main() {
            int x = nextInt();
            if (x > 0 && f(x) > 2) { printInt(x); }
            printSpace();
            return 0;
        }";

    let mut temps = TempGen::new();
    let p = front_half(source);
    let once = reformat(&simplify_expressions(&p, &mut temps).unwrap());
    let twice = reformat(&simplify_expressions(&once, &mut temps).unwrap());

    assert_eq!(tokens(&once), tokens(&twice));
}

#[test]
fn compound_assignment_expands_to_plain_ops() {
    let mut temps = TempGen::new();
    let program = lines("!VAR_USER_s !VAR_USER_x += ;");
    let out = lower_compound_assignments(&program, &mut temps);
    let flat = join(&tokens(&out));
    assert!(
        flat.contains("!VAR_USER_s !VAR_USER_x + = !VAR_TEMP_temp0 ;"),
        "{}",
        flat
    );
    assert!(flat.contains("!VAR_USER_s !VAR_TEMP_temp0 = ;"), "{}", flat);
}

#[test]
fn hard_operators_become_library_calls() {
    let program = lines("!VAR_USER_a !VAR_USER_b + = !VAR_TEMP_temp0 ;");
    let out = replace_operators(&program);
    assert!(join(&tokens(&out)).contains("!FUNC_LIB_add"));
}

#[test]
fn logical_operators_stay_as_operators() {
    let program = lines("!VAR_USER_a !VAR_USER_b && = !VAR_TEMP_temp0 ;");
    let out = replace_operators(&program);
    assert!(join(&tokens(&out)).contains("&&"));
}

#[test]
fn arguments_are_materialized_into_distinct_temps() {
    let mut temps = TempGen::new();
    let program = lines(
        "int !VAR_USER_a ;
         !VAR_USER_a !VAR_USER_a !FUNC_LIB_basic_add = !VAR_TEMP_temp9 ;",
    );
    let out = materialize_arguments(&program, &mut temps);
    let flat = join(&tokens(&out));
    // both uses of `a` now come from fresh temps
    assert!(
        flat.contains(
            "!VAR_TEMP_temp0 !VAR_TEMP_temp1 !FUNC_LIB_basic_add = !VAR_TEMP_temp9 ;"
        ),
        "{}",
        flat
    );
}

#[test]
fn mem_store_and_load_become_calls() {
    let mut temps = TempGen::new();
    let program = lines(
        "!VAR_USER_i !VAR_LIB_MEM !VAR_USER_x = ;
         !VAR_USER_y !VAR_USER_j !VAR_LIB_MEM = ;",
    );
    let out = lower_memory_access(&program, &mut temps);
    let flat = join(&tokens(&out));
    assert!(
        flat.contains("!VAR_USER_i !VAR_USER_x !FUNC_LIB_memset ;"),
        "{}",
        flat
    );
    assert!(
        flat.contains("!VAR_USER_j !FUNC_LIB_memget = !VAR_USER_y ;"),
        "{}",
        flat
    );
}

#[test]
fn mem_to_mem_copies_through_a_temp() {
    let mut temps = TempGen::new();
    let program = lines("!VAR_USER_i !VAR_LIB_MEM !VAR_USER_j !VAR_LIB_MEM = ;");
    let out = lower_memory_access(&program, &mut temps);
    let flat = join(&tokens(&out));
    assert!(
        flat.contains("!VAR_USER_j !FUNC_LIB_memget = !VAR_TEMP_temp0 ;"),
        "{}",
        flat
    );
    assert!(
        flat.contains("!VAR_USER_i !VAR_TEMP_temp0 !FUNC_LIB_memset ;"),
        "{}",
        flat
    );
}

#[test]
fn signatures_pick_up_declared_functions() {
    let program = lines("int !FUNC_USER_f ( int !VAR_USER_a , bool !VAR_USER_b ) {");
    let funcs = signatures(&program);
    let f = funcs.iter().find(|f| f.name == "!FUNC_USER_f").unwrap();
    assert_eq!(f.params, ["int", "bool"]);
    assert_eq!(f.ret, "int");
}
