use std::collections::HashMap;
use tmvm::{MultiTapeMachine, ReadPattern, Shift, Transition, WriteRule};

use crate::names::TAPE_PREFIX;

/// Accumulates states and transitions over the fixed tape roster of
/// generated machines:
///
///  Tape         | Purpose
/// --------------|----------------------------------------------
/// `input`       | program input, read by `nextInt`
/// `output`      | program output
/// `ipStack`     | saved instruction pointers across calls
/// `ip`          | current instruction pointer, two's complement
/// `ipSideways`  | one single-cell tape per IP bit
/// `paramStack`  | parameter-passing stack
/// `bitIndex`    | MEM bit-cursor position
/// `bits`        | MEM contents, diagonalized
/// `variables`   | one tape per numbered variable
/// `rax`         | return value
pub struct MachineBuilder {
    num_states: usize,
    num_tapes: usize,
    pub(crate) ip_bits: usize,
    pub(crate) num_vars: usize,
    transitions: Vec<Transition>,
    tape_indices: HashMap<&'static str, usize>,
    node_indices: HashMap<&'static str, usize>,
}

impl MachineBuilder {
    /// Size the roster for the given assembly: enough IP bits that the −2
    /// sentinel fits alongside every line number, and one variable tape per
    /// distinct tape index mentioned.
    pub(crate) fn new(assembly: &[String]) -> MachineBuilder {
        let lines = assembly.len().max(1);
        let mut ip_bits = 1;
        while (1usize << ip_bits) < lines {
            ip_bits += 1;
        }
        ip_bits += 1;

        let mut num_vars = 0;
        for line in assembly {
            for word in line.split_whitespace() {
                if word.starts_with(TAPE_PREFIX) {
                    if let Ok(n) = word[TAPE_PREFIX.len()..].parse::<usize>() {
                        num_vars = num_vars.max(n + 1);
                    }
                }
            }
        }

        let roster: [(&'static str, usize); 10] = [
            ("input", 1),
            ("output", 1),
            ("ipStack", 1),
            ("ip", 1),
            ("ipSideways", ip_bits),
            ("paramStack", 1),
            ("bitIndex", 1),
            ("bits", 1),
            ("variables", num_vars),
            ("rax", 1),
        ];

        let mut tape_indices = HashMap::new();
        let mut num_tapes = 0;
        for (name, count) in roster.iter() {
            tape_indices.insert(*name, num_tapes);
            num_tapes += count;
        }

        MachineBuilder {
            num_states: 0,
            num_tapes,
            ip_bits,
            num_vars,
            transitions: Vec::new(),
            tape_indices,
            node_indices: HashMap::new(),
        }
    }

    pub(crate) fn new_node(&mut self) -> usize {
        let node = self.num_states;
        self.num_states += 1;
        node
    }

    pub(crate) fn named_node(&mut self, name: &'static str) -> usize {
        let node = self.new_node();
        self.node_indices.insert(name, node);
        node
    }

    pub(crate) fn node(&self, name: &str) -> usize {
        self.node_indices[name]
    }

    pub(crate) fn tape_index(&self, name: &str) -> usize {
        self.tape_indices[name]
    }

    pub(crate) fn var_tape(&self, index: usize) -> usize {
        self.tape_index("variables") + index
    }

    /// Add a transition touching only the listed tapes; every other tape
    /// reads anything, keeps its symbol and holds its head.
    pub(crate) fn add_transition(
        &mut self,
        from: usize,
        to: usize,
        reads: &[(usize, ReadPattern)],
        writes: &[(usize, WriteRule)],
        shifts: &[(usize, Shift)],
    ) {
        let mut read = vec![ReadPattern::Any; self.num_tapes];
        let mut write = vec![WriteRule::Keep; self.num_tapes];
        let mut shift = vec![Shift::Hold; self.num_tapes];

        for (tape, pattern) in reads {
            read[*tape] = *pattern;
        }
        for (tape, rule) in writes {
            write[*tape] = *rule;
        }
        for (tape, s) in shifts {
            shift[*tape] = *s;
        }

        self.transitions
            .push(Transition::new(from, read, to, write, shift));
    }

    /// Transition reading, writing and shifting a single tape.
    pub(crate) fn add_simple(
        &mut self,
        from: usize,
        to: usize,
        tape: usize,
        read: ReadPattern,
        write: WriteRule,
        shift: Shift,
    ) {
        self.add_transition(from, to, &[(tape, read)], &[(tape, write)], &[(tape, shift)]);
    }

    pub(crate) fn finish(self, initial: usize, halt: usize) -> MultiTapeMachine {
        MultiTapeMachine::new(
            self.num_states,
            self.num_tapes,
            initial,
            halt,
            self.transitions,
        )
    }
}
