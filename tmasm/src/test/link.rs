use super::lines;
use crate::link::link_jumps;
use crate::words::words;
use crate::source_to_assembly;
use matches::assert_matches;

#[test]
fn entry_jump_targets_main() {
    let assembly = link_jumps(&lines(
        "int !FUNC_USER_main {
        !TAPE_tape0 0 = ;
        !TAPE_RAX !TAPE_tape0 = ;
        return ;
        }",
    ));

    let first = words(&assembly[0]);
    assert_eq!(first[0], "jmp");
    let target: usize = first[1].parse().unwrap();
    assert_eq!(assembly[target].trim(), "nop ;");
}

#[test]
fn if_becomes_jf_over_the_body() {
    let assembly = link_jumps(&lines(
        "int !FUNC_USER_main {
        !TAPE_tape0 if {
        !TAPE_tape1 1 = ;
        }
        return ;
        }",
    ));

    // line 0 entry jump, line 1 header nop, line 2 the jf
    let jf = words(&assembly[2]);
    assert_eq!(jf[0], "jf");
    assert_eq!(jf[1], "!TAPE_tape0");
    let target: usize = jf[2].parse().unwrap();
    assert_eq!(assembly[target].trim(), "nop ;");
    assert_eq!(target, 4);
}

#[test]
fn if_else_jumps_over_the_else_body() {
    let assembly = link_jumps(&lines(
        "int !FUNC_USER_main {
        !TAPE_tape0 if {
        !TAPE_tape1 1 = ;
        }
        else {
        !TAPE_tape1 2 = ;
        }
        return ;
        }",
    ));

    let jf = words(&assembly[2]);
    assert_eq!(jf[0], "jf");
    let else_line: usize = jf[2].parse().unwrap();
    assert_eq!(assembly[else_line].trim(), "nop ;");

    // the end of the then-branch jumps past the else-branch
    let jmp = words(&assembly[else_line - 1]);
    assert_eq!(jmp[0], "jmp");
    let after: usize = jmp[1].parse().unwrap();
    assert!(after > else_line);
    assert_eq!(assembly[after].trim(), "nop ;");
}

#[test]
fn while_close_jumps_back_and_break_jumps_out() {
    let assembly = link_jumps(&lines(
        "int !FUNC_USER_main {
        while ( true ) {
        break ;
        continue ;
        }
        return ;
        }",
    ));

    // header at line 2 becomes a nop; its close jumps back to it
    assert_eq!(assembly[2].trim(), "nop ;");

    let break_jmp = words(&assembly[3]);
    assert_eq!(break_jmp[0], "jmp");
    let break_target: usize = break_jmp[1].parse().unwrap();
    // break lands on the nop that follows the back-jump
    assert_eq!(assembly[break_target].trim(), "nop ;");
    assert_eq!(words(&assembly[break_target - 1])[0], "jmp");
    assert_eq!(words(&assembly[break_target - 1])[1], "2");

    let continue_jmp = words(&assembly[4]);
    assert_eq!(continue_jmp[0], "jmp");
    assert_eq!(continue_jmp[1], "2");
}

#[test]
fn calls_resolve_to_header_lines() {
    let assembly = link_jumps(&lines(
        "int !FUNC_USER_f {
        return ;
        }
        int !FUNC_USER_main {
        call !FUNC_USER_f ;
        return ;
        }",
    ));

    let call_line = assembly
        .iter()
        .find(|l| words(l).first().map(String::as_str) == Some("call"))
        .unwrap();
    let call = words(call_line);
    assert_eq!(call[1], "1");
    assert_eq!(assembly[1].trim(), "nop ;");
}

#[test]
fn primitive_calls_keep_their_arguments() {
    let assembly = link_jumps(&lines(
        "int !FUNC_USER_main {
        call !FUNC_LIB_basic_add !TAPE_tape0 !TAPE_tape1 ;
        return ;
        }",
    ));

    let call_line = assembly
        .iter()
        .find(|l| l.contains("basic_add"))
        .unwrap();
    assert_eq!(
        words(call_line),
        ["call", "!FUNC_LIB_basic_add", "!TAPE_tape0", "!TAPE_tape1", ";"]
    );
}

// Every jump target of a fully lowered program is a valid line, and the
// assembly parses all the way through.
#[test]
fn linked_jumps_are_total() {
    let source = lines(
        "int gcd(int a, int b) {
            while (b != 0) {
                int t = a % b;
                a = b;
                b = t;
            }
            return a;
        }
        int main() {
            printInt(gcd(nextInt(), nextInt()));
            printSpace();
            return 0;
        }",
    );

    let assembly = source_to_assembly(&source).unwrap();
    let count = assembly.len();

    for line in &assembly {
        let w = words(line);
        match w[0].as_str() {
            "jmp" => {
                let target: usize = w[1].parse().unwrap();
                assert!(target < count, "jmp out of range: {}", line);
            }
            "jf" => {
                let target: usize = w[2].parse().unwrap();
                assert!(target < count, "jf out of range: {}", line);
            }
            "call" => {
                if !w[1].starts_with("!FUNC") {
                    let target: usize = w[1].parse().unwrap();
                    assert!(target < count, "call out of range: {}", line);
                }
            }
            _ => {}
        }
    }

    // and the code generator accepts every line
    assert_matches!(crate::assembly_to_machine(&assembly), Ok(_));
}
