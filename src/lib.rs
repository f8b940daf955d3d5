//! Data model and simulator for deterministic multi-tape Turing machines.
//!
//! A machine is a finite set of states with transitions that read one symbol
//! per tape, write one symbol per tape and shift each head independently.
//! The model here is the compilation target of the [tmasm](../tmasm/index.html)
//! crate, but it is self-contained: machines can be built directly from
//! [`Transition`](struct.Transition.html)s and run with
//! [`MultiTapeMachine::run`](struct.MultiTapeMachine.html#method.run).
//!
//! Signed integers live on tapes as a sign cell followed by magnitude bits,
//! least-significant first; the [`encode_int`](fn.encode_int.html) family of
//! functions implements that convention for feeding input and reading output.

mod encode;
mod machine;
mod symbols;
mod tape;
mod transition;

pub use crate::encode::{decode_int, decode_output, encode_input, encode_int};
pub use crate::machine::{MultiTapeMachine, RunResult, StepResult};
pub use crate::symbols::{parse_cells, Shift, Symbol};
pub use crate::tape::Tape;
pub use crate::transition::{
    read_patterns_from_str, write_rules_from_str, ReadPattern, SymbolSet, Transition, WriteRule,
};
