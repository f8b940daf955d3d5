use super::*;
use tmvm::Symbol::{One, Zero};
use tmvm::{ReadPattern, SymbolSet, WriteRule};

fn sample_machine() -> MultiTapeMachine {
    let transitions = vec![
        Transition::new(
            0,
            vec![ReadPattern::AnyOf(SymbolSet::BITS), ReadPattern::Any],
            1,
            vec![WriteRule::Keep, WriteRule::Put(One)],
            vec![Shift::Right, Shift::Hold],
        ),
        Transition::new(
            1,
            vec![ReadPattern::Only(Zero), ReadPattern::Any],
            2,
            vec![WriteRule::Put(Zero), WriteRule::Keep],
            vec![Shift::Left, Shift::Right],
        ),
    ];
    MultiTapeMachine::new(3, 2, 0, 2, transitions)
}

#[test]
fn round_trip() {
    let machine = sample_machine();

    let mut buffer = Vec::new();
    write(&mut buffer, &machine).unwrap();
    let loaded = read(&mut &buffer[..]).unwrap();

    assert_eq!(loaded.num_states(), machine.num_states());
    assert_eq!(loaded.num_tapes(), machine.num_tapes());
    assert_eq!(loaded.initial(), machine.initial());
    assert_eq!(loaded.halt(), machine.halt());

    let original: Vec<&Transition> = machine.transitions().collect();
    let restored: Vec<&Transition> = loaded.transitions().collect();
    assert_eq!(original, restored);
}

#[test]
fn tape_state_round_trips() {
    let mut machine = sample_machine();
    machine.set_input("01").unwrap();
    machine.step();

    let mut buffer = Vec::new();
    write(&mut buffer, &machine).unwrap();
    let loaded = read(&mut &buffer[..]).unwrap();

    for index in 0..machine.num_tapes() {
        let original = machine.tape(index);
        let restored = loaded.tape(index);
        assert_eq!(restored.contents(), original.contents(), "tape {}", index);
        assert_eq!(restored.head(), original.head(), "tape {}", index);
        assert_eq!(
            restored.contents_start(),
            original.contents_start(),
            "tape {}",
            index
        );
    }
}

#[test]
fn truncated_input_is_an_error() {
    let machine = sample_machine();

    let mut buffer = Vec::new();
    write(&mut buffer, &machine).unwrap();
    buffer.truncate(buffer.len() - 3);

    assert!(read(&mut &buffer[..]).is_err());
}

#[test]
fn loaded_machine_runs() {
    let machine = sample_machine();

    let mut buffer = Vec::new();
    write(&mut buffer, &machine).unwrap();
    let mut loaded = read(&mut &buffer[..]).unwrap();

    loaded.set_input("00").unwrap();
    loaded.run(Some(10));
    assert!(loaded.halted());
    assert_eq!(loaded.tape(1).contents(), "1");
}
