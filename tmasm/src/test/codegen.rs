use super::lines;
use crate::codegen::MachineBuilder;
use crate::{assembly_to_machine, Error};
use matches::assert_matches;
use tmvm::RunResult;

fn machine_for(assembly: &str) -> (tmvm::MultiTapeMachine, MachineBuilder) {
    let asm = lines(assembly);
    let machine = assembly_to_machine(&asm).unwrap();
    // a second builder over the same assembly gives the roster layout
    (machine, MachineBuilder::new(&asm))
}

#[test]
fn literal_write_lands_on_the_variable_tape() {
    let (mut machine, layout) = machine_for(
        "!TAPE_tape0 5 = ;
         nop ;",
    );

    machine.run(Some(10_000));
    let tape = layout.tape_index("variables");
    assert_eq!(machine.tape(tape).contents(), "0101");
    assert_eq!(machine.tape(tape).head(), 0);
}

#[test]
fn boolean_writes_are_single_cells() {
    let (mut machine, layout) = machine_for(
        "!TAPE_tape0 true = ;
         !TAPE_tape1 false = ;
         nop ;",
    );

    machine.run(Some(10_000));
    let vars = layout.tape_index("variables");
    assert_eq!(machine.tape(vars).contents(), "1");
    assert_eq!(machine.tape(vars + 1).contents(), "0");
}

#[test]
fn untaken_jf_falls_through() {
    let (mut machine, layout) = machine_for(
        "!TAPE_tape0 true = ;
         jf !TAPE_tape0 3 ;
         !TAPE_tape1 7 = ;
         nop ;",
    );

    machine.run(Some(20_000));
    let vars = layout.tape_index("variables");
    assert_eq!(machine.tape(vars + 1).contents(), "0111");
}

#[test]
fn taken_jf_skips_the_body() {
    let (mut machine, layout) = machine_for(
        "!TAPE_tape0 false = ;
         jf !TAPE_tape0 3 ;
         !TAPE_tape1 7 = ;
         nop ;",
    );

    machine.run(Some(20_000));
    let vars = layout.tape_index("variables");
    assert_eq!(machine.tape(vars + 1).contents(), "");
}

#[test]
fn jmp_skips_forward() {
    let (mut machine, layout) = machine_for(
        "jmp 2 ;
         !TAPE_tape0 1 = ;
         nop ;",
    );

    machine.run(Some(10_000));
    let vars = layout.tape_index("variables");
    assert_eq!(machine.tape(vars).contents(), "");
}

#[test]
fn copies_replace_longer_old_values() {
    let (mut machine, layout) = machine_for(
        "!TAPE_tape0 100 = ;
         !TAPE_tape1 1 = ;
         !TAPE_tape0 !TAPE_tape1 = ;
         nop ;",
    );

    machine.run(Some(40_000));
    let vars = layout.tape_index("variables");
    // the delimiter cuts the value off; remains of the wider one may sit
    // beyond it
    let contents = machine.tape(vars).contents();
    assert!(contents.starts_with("01_"), "{}", contents);
    assert_eq!(machine.tape(vars).head(), 0);
}

#[test]
fn running_off_the_program_halts_silently() {
    let (mut machine, _) = machine_for("nop ;\nnop ;");

    assert_eq!(machine.run(Some(10_000)), RunResult::Halted);
    assert!(machine.halted());
}

#[test]
fn inline_primitive_writes_rax() {
    let (mut machine, _) = machine_for(
        "!TAPE_tape0 6 = ;
         call !FUNC_LIB_isEven !TAPE_tape0 ;
         nop ;",
    );

    machine.run(Some(20_000));
    let rax = machine.num_tapes() - 1;
    assert_eq!(machine.tape(rax).contents(), "1");
}

#[test]
fn wrong_primitive_arity_is_rejected() {
    let asm = lines("call !FUNC_LIB_basic_add !TAPE_tape0 ;");
    assert_matches!(
        assembly_to_machine(&asm),
        Err(Error::BadAssembly { line: 0, .. })
    );
}

#[test]
fn unknown_primitive_is_rejected() {
    let asm = lines("call !FUNC_LIB_frobnicate !TAPE_tape0 ;");
    assert_matches!(
        assembly_to_machine(&asm),
        Err(Error::BadAssembly { line: 0, .. })
    );
}

#[test]
fn garbage_lines_are_parse_errors() {
    let asm = lines("definitely not assembly ;");
    assert_matches!(assembly_to_machine(&asm), Err(Error::Parse { line: 0, .. }));
}
