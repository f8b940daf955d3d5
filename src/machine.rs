use crate::{parse_cells, Shift, Symbol, Tape, Transition};
use util::ParseEnumError;

/// State of the machine after a single [`step`](struct.MultiTapeMachine.html#method.step).
#[derive(PartialEq, Eq, Debug, Clone, Copy)]
pub enum StepResult {
    Running,
    Halted,
}

/// Why [`run`](struct.MultiTapeMachine.html#method.run) returned.
#[derive(PartialEq, Eq, Debug, Clone, Copy)]
pub enum RunResult {
    Halted,
    StepLimit,
}

// Buckets beyond this size are sorted by read pattern; in generated machines
// only the instruction-dispatch state fans out this wide.
const SORTED_FANOUT: usize = 15;

/// A deterministic multi-tape Turing machine.
///
/// Transitions are bucketed by source state. `step` dispatches to the first
/// transition of the current bucket whose read rules match the symbols under
/// all heads; emission order is therefore significant and preserved.
#[derive(Debug)]
pub struct MultiTapeMachine {
    num_states: usize,
    num_tapes: usize,
    initial: usize,
    current: usize,
    halt: usize,
    steps: u64,
    tapes: Vec<Tape>,
    transitions: Vec<Vec<Transition>>,
}

impl MultiTapeMachine {
    pub fn new(
        num_states: usize,
        num_tapes: usize,
        initial: usize,
        halt: usize,
        transitions: Vec<Transition>,
    ) -> MultiTapeMachine {
        let mut buckets = vec![Vec::new(); num_states];
        for transition in transitions {
            buckets[transition.from].push(transition);
        }

        for bucket in buckets.iter_mut() {
            if bucket.len() > SORTED_FANOUT {
                bucket.sort_by(|a, b| a.read_string().cmp(&b.read_string()));
            }
        }

        MultiTapeMachine {
            num_states,
            num_tapes,
            initial,
            current: initial,
            halt,
            steps: 0,
            tapes: (0..num_tapes).map(|_| Tape::new()).collect(),
            transitions: buckets,
        }
    }

    pub fn num_states(&self) -> usize {
        self.num_states
    }

    pub fn num_tapes(&self) -> usize {
        self.num_tapes
    }

    pub fn initial(&self) -> usize {
        self.initial
    }

    pub fn halt(&self) -> usize {
        self.halt
    }

    pub fn current(&self) -> usize {
        self.current
    }

    pub fn steps(&self) -> u64 {
        self.steps
    }

    pub fn halted(&self) -> bool {
        self.current == self.halt
    }

    pub fn tape(&self, index: usize) -> &Tape {
        &self.tapes[index]
    }

    pub fn tape_mut(&mut self, index: usize) -> &mut Tape {
        &mut self.tapes[index]
    }

    pub fn transitions(&self) -> impl Iterator<Item = &Transition> {
        self.transitions.iter().flat_map(|bucket| bucket.iter())
    }

    /// Write a cell string onto a tape starting at the origin and rewind the
    /// head to the first cell.
    pub fn set_tape(&mut self, index: usize, cells: &str) -> Result<(), ParseEnumError> {
        let symbols = parse_cells(cells)?;
        let tape = &mut self.tapes[index];
        tape.clear();
        for symbol in symbols.iter() {
            tape.write(*symbol);
            tape.shift_head(Shift::Right);
        }
        for _ in 0..symbols.len() {
            tape.shift_head(Shift::Left);
        }
        Ok(())
    }

    /// Write the program input onto tape 0.
    pub fn set_input(&mut self, cells: &str) -> Result<(), ParseEnumError> {
        self.set_tape(0, cells)
    }

    /// Perform one transition. With no matching transition the machine moves
    /// to the halt state silently, leaving every tape untouched.
    pub fn step(&mut self) -> StepResult {
        if self.halted() {
            return StepResult::Halted;
        }

        let symbols: Vec<Symbol> = self.tapes.iter().map(Tape::read).collect();
        let found = self.transitions[self.current]
            .iter()
            .position(|t| t.matches(&symbols));

        self.steps += 1;

        match found {
            None => {
                self.current = self.halt;
            }
            Some(index) => {
                let transition = &self.transitions[self.current][index];
                for (k, tape) in self.tapes.iter_mut().enumerate() {
                    tape.write(transition.write[k].apply(symbols[k]));
                    tape.shift_head(transition.shifts[k]);
                }
                let to = transition.to;
                self.current = to;
            }
        }

        if self.halted() {
            StepResult::Halted
        } else {
            StepResult::Running
        }
    }

    /// Step until the halt state is reached or `max_steps` runs out.
    pub fn run(&mut self, max_steps: Option<u64>) -> RunResult {
        loop {
            if self.halted() {
                return RunResult::Halted;
            }
            if let Some(limit) = max_steps {
                if self.steps >= limit {
                    return RunResult::StepLimit;
                }
            }
            self.step();
        }
    }
}
