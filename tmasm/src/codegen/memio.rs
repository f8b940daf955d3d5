//! MEM bit-cursor primitives and the I/O primitives.

use super::builder::MachineBuilder;
use super::{copy_between_tapes, only, put, ANY, BIT, KEEP};
use tmvm::Shift::{Hold, Left, Right};
use tmvm::Symbol::{Blank, One, Zero};
use tmvm::{ReadPattern, Shift, WriteRule};

pub(super) fn get_mem_bit_index(b: &mut MachineBuilder, start: usize, end: usize) {
    let bit_index = b.tape_index("bitIndex");
    let rax = b.tape_index("rax");
    copy_between_tapes(b, bit_index, rax, start, end);
}

pub(super) fn set_mem_bit_index(b: &mut MachineBuilder, tape0: usize, start: usize, end: usize) {
    let bit_index = b.tape_index("bitIndex");
    copy_between_tapes(b, tape0, bit_index, start, end);
}

pub(super) fn move_mem_head(b: &mut MachineBuilder, shift: Shift, start: usize, end: usize) {
    let bits = b.tape_index("bits");
    b.add_simple(start, end, bits, ANY, KEEP, shift);
}

pub(super) fn set_mem_bit(b: &mut MachineBuilder, write: WriteRule, start: usize, end: usize) {
    let bits = b.tape_index("bits");
    b.add_simple(start, end, bits, ANY, write, Hold);
}

/// Report whether the cell under the MEM head matches `yes`; `no` is its
/// complement over the alphabet.
pub(super) fn mem_bit_is(
    b: &mut MachineBuilder,
    yes: ReadPattern,
    no: ReadPattern,
    start: usize,
    end: usize,
) {
    let bits = b.tape_index("bits");
    let rax = b.tape_index("rax");

    let written = b.new_node();
    b.add_transition(
        start,
        written,
        &[(bits, yes)],
        &[(rax, put(One))],
        &[(rax, Right)],
    );
    b.add_transition(
        start,
        written,
        &[(bits, no)],
        &[(rax, put(Zero))],
        &[(rax, Right)],
    );

    b.add_simple(written, end, rax, ANY, put(Blank), Left);
}

/// Copy the next blank-delimited number off the input tape into `rax`,
/// leaving the input head on the following number.
pub(super) fn next_int(b: &mut MachineBuilder, start: usize, end: usize) {
    let input = b.tape_index("input");
    let rax = b.tape_index("rax");

    for &bit in &[Zero, One] {
        b.add_transition(
            start,
            start,
            &[(input, only(bit))],
            &[(rax, put(bit))],
            &[(input, Right), (rax, Right)],
        );
    }

    let back = b.new_node();
    b.add_transition(
        start,
        back,
        &[(input, only(Blank))],
        &[(rax, put(Blank))],
        &[(input, Right), (rax, Left)],
    );

    b.add_simple(back, back, rax, BIT, KEEP, Left);
    b.add_simple(back, end, rax, only(Blank), KEEP, Right);
}

/// Append a value to the output tape, leaving the head on the cell after it.
pub(super) fn print_int(b: &mut MachineBuilder, tape0: usize, start: usize, end: usize) {
    let output = b.tape_index("output");

    let copied = b.new_node();
    copy_between_tapes(b, tape0, output, start, copied);

    b.add_simple(copied, copied, output, BIT, KEEP, Right);
    b.add_simple(copied, end, output, only(Blank), KEEP, Hold);
}

pub(super) fn print_space(b: &mut MachineBuilder, start: usize, end: usize) {
    let output = b.tape_index("output");
    b.add_simple(start, end, output, ANY, put(Blank), Right);
}
