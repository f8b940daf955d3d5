use crate::Symbol::{One, Zero};
use crate::{
    MultiTapeMachine, ReadPattern, RunResult, Shift, StepResult, Symbol, SymbolSet, Transition,
    WriteRule,
};

// Two tapes: copy tape 0 onto tape 1 until a blank is read, then halt.
fn copier() -> MultiTapeMachine {
    let transitions = vec![
        Transition::new(
            0,
            vec![ReadPattern::AnyOf(SymbolSet::BITS), ReadPattern::Any],
            0,
            vec![WriteRule::Keep, WriteRule::Keep],
            vec![Shift::Right, Shift::Right],
        ),
        Transition::new(
            0,
            vec![ReadPattern::Only(Symbol::Blank), ReadPattern::Any],
            1,
            vec![WriteRule::Keep, WriteRule::Keep],
            vec![Shift::Hold, Shift::Hold],
        ),
    ];
    MultiTapeMachine::new(2, 2, 0, 1, transitions)
}

#[test]
fn keep_write_preserves_read_symbol() {
    let mut machine = copier();
    machine.set_input("101").unwrap();
    // Keep on tape 1 writes back the blank that was read there.
    assert_eq!(machine.step(), StepResult::Running);
    assert_eq!(machine.tape(1).contents(), "");
}

fn two_tape(from: usize, read: [ReadPattern; 2], to: usize, write: [WriteRule; 2]) -> Transition {
    Transition::new(
        from,
        read.to_vec(),
        to,
        write.to_vec(),
        vec![Shift::Right, Shift::Right],
    )
}

#[test]
fn copy_machine_mirrors_input() {
    let transitions = vec![
        two_tape(
            0,
            [ReadPattern::Only(Zero), ReadPattern::Any],
            0,
            [WriteRule::Keep, WriteRule::Put(Zero)],
        ),
        two_tape(
            0,
            [ReadPattern::Only(One), ReadPattern::Any],
            0,
            [WriteRule::Keep, WriteRule::Put(One)],
        ),
    ];
    let mut machine = MultiTapeMachine::new(2, 2, 0, 1, transitions);
    machine.set_input("0110").unwrap();

    // No transition matches the trailing blank, so the machine halts silently.
    assert_eq!(machine.run(None), RunResult::Halted);
    assert_eq!(machine.tape(1).contents(), "0110");
    assert_eq!(machine.steps(), 5);
}

#[test]
fn first_matching_transition_wins() {
    let transitions = vec![
        Transition::new(
            0,
            vec![ReadPattern::Any],
            1,
            vec![WriteRule::Put(Zero)],
            vec![Shift::Hold],
        ),
        Transition::new(
            0,
            vec![ReadPattern::Only(Symbol::Blank)],
            1,
            vec![WriteRule::Put(One)],
            vec![Shift::Hold],
        ),
    ];
    let mut machine = MultiTapeMachine::new(2, 1, 0, 1, transitions);
    assert_eq!(machine.step(), StepResult::Halted);
    assert_eq!(machine.tape(0).contents(), "0");
}

#[test]
fn no_match_halts_without_touching_tapes() {
    let transitions = vec![Transition::new(
        0,
        vec![ReadPattern::Only(Zero)],
        0,
        vec![WriteRule::Put(One)],
        vec![Shift::Right],
    )];
    let mut machine = MultiTapeMachine::new(2, 1, 0, 1, transitions);
    machine.set_input("1").unwrap();

    assert_eq!(machine.step(), StepResult::Halted);
    assert!(machine.halted());
    assert_eq!(machine.tape(0).contents(), "1");
    assert_eq!(machine.tape(0).head(), 0);
}

#[test]
fn run_respects_step_limit() {
    // Single state looping right forever.
    let transitions = vec![Transition::new(
        0,
        vec![ReadPattern::Any],
        0,
        vec![WriteRule::Put(Zero)],
        vec![Shift::Right],
    )];
    let mut machine = MultiTapeMachine::new(2, 1, 0, 1, transitions);

    assert_eq!(machine.run(Some(100)), RunResult::StepLimit);
    assert_eq!(machine.steps(), 100);
    assert!(!machine.halted());
}

#[test]
fn step_after_halt_is_inert() {
    let mut machine = copier();
    machine.run(None);
    let steps = machine.steps();
    assert_eq!(machine.step(), StepResult::Halted);
    assert_eq!(machine.steps(), steps);
}
