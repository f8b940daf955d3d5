//! Arithmetic and logic primitives, inlined at their call sites. Each
//! routine reads its argument tape(s) with heads on the sign cell, leaves
//! the result in `rax` with a delimiting blank and every head back on its
//! value's first cell.
//!
//! The `basic_*` routines only see non-negative operands (the library
//! dispatches on sign before reaching them), so the whole cell string —
//! sign cell included — can be treated as one little-endian number.

use super::builder::MachineBuilder;
use super::{
    copy_between_tapes, only, pad_blanks, put, ANY, BIT, KEEP, ONE_OR_BLANK, ZERO_OR_BLANK,
};
use tmvm::ReadPattern;
use tmvm::Shift::{Left, Right};
use tmvm::Symbol::{Blank, One, Zero};

pub(super) fn is_zero(b: &mut MachineBuilder, tape0: usize, start: usize, end: usize) {
    let rax = b.tape_index("rax");
    let done = b.new_node();

    // a 1 or blank up front can't be zero
    b.add_transition(
        start,
        done,
        &[(tape0, ONE_OR_BLANK)],
        &[(rax, put(Zero))],
        &[(rax, Right)],
    );

    // saw the 0 cell; zero iff nothing follows it
    let after_zero = b.new_node();
    b.add_simple(start, after_zero, tape0, only(Zero), KEEP, Right);
    b.add_transition(
        after_zero,
        done,
        &[(tape0, only(Blank))],
        &[(rax, put(One))],
        &[(tape0, Left), (rax, Right)],
    );
    b.add_transition(
        after_zero,
        done,
        &[(tape0, BIT)],
        &[(rax, put(Zero))],
        &[(tape0, Left), (rax, Right)],
    );

    b.add_simple(done, end, rax, ANY, put(Blank), Left);
}

pub(super) fn is_pos(b: &mut MachineBuilder, tape0: usize, start: usize, end: usize) {
    let rax = b.tape_index("rax");
    let done = b.new_node();

    b.add_transition(
        start,
        done,
        &[(tape0, ONE_OR_BLANK)],
        &[(rax, put(Zero))],
        &[(rax, Right)],
    );

    // sign is 0; positive iff a magnitude bit follows
    let after_sign = b.new_node();
    b.add_simple(start, after_sign, tape0, only(Zero), KEEP, Right);
    b.add_transition(
        after_sign,
        done,
        &[(tape0, only(Blank))],
        &[(rax, put(Zero))],
        &[(tape0, Left), (rax, Right)],
    );
    b.add_transition(
        after_sign,
        done,
        &[(tape0, BIT)],
        &[(rax, put(One))],
        &[(tape0, Left), (rax, Right)],
    );

    b.add_simple(done, end, rax, ANY, put(Blank), Left);
}

pub(super) fn is_neg(b: &mut MachineBuilder, tape0: usize, start: usize, end: usize) {
    let rax = b.tape_index("rax");
    let done = b.new_node();

    b.add_transition(
        start,
        done,
        &[(tape0, ZERO_OR_BLANK)],
        &[(rax, put(Zero))],
        &[(rax, Right)],
    );
    b.add_transition(
        start,
        done,
        &[(tape0, only(One))],
        &[(rax, put(One))],
        &[(rax, Right)],
    );

    b.add_simple(done, end, rax, ANY, put(Blank), Left);
}

// A (pattern, pattern, result bit, carry-out) row of a binary adder state.
type AdderRow = (ReadPattern, ReadPattern, tmvm::Symbol, bool);

fn emit_adder_rows(
    b: &mut MachineBuilder,
    tape0: usize,
    tape1: usize,
    rax: usize,
    from: usize,
    off: usize,
    on: usize,
    rows: &[AdderRow],
) {
    for &(p0, p1, result, carry) in rows {
        let to = if carry { on } else { off };
        b.add_transition(
            from,
            to,
            &[(tape0, p0), (tape1, p1)],
            &[(rax, put(result))],
            &[(tape0, Right), (tape1, Right), (rax, Right)],
        );
    }
}

pub(super) fn basic_add(
    b: &mut MachineBuilder,
    tape0: usize,
    tape1: usize,
    start: usize,
    end: usize,
) {
    let rax = b.tape_index("rax");

    let carry_off = b.new_node();
    pad_blanks(b, tape0, tape1, start, carry_off, true);
    let carry_on = b.new_node();

    // blanks in the padded region read as 0
    emit_adder_rows(
        b,
        tape0,
        tape1,
        rax,
        carry_off,
        carry_off,
        carry_on,
        &[
            (ZERO_OR_BLANK, only(Zero), Zero, false),
            (only(Zero), ZERO_OR_BLANK, Zero, false),
            (ZERO_OR_BLANK, only(One), One, false),
            (only(One), ZERO_OR_BLANK, One, false),
            (only(One), only(One), Zero, true),
        ],
    );
    emit_adder_rows(
        b,
        tape0,
        tape1,
        rax,
        carry_on,
        carry_off,
        carry_on,
        &[
            (ZERO_OR_BLANK, only(Zero), One, false),
            (only(Zero), ZERO_OR_BLANK, One, false),
            (ZERO_OR_BLANK, only(One), Zero, true),
            (only(One), ZERO_OR_BLANK, Zero, true),
            (only(One), only(One), One, true),
        ],
    );

    // both exhausted: terminate the sum, flushing a final carry if set
    let back = b.new_node();
    b.add_transition(
        carry_off,
        back,
        &[(tape0, only(Blank)), (tape1, only(Blank))],
        &[(rax, put(Blank))],
        &[(tape0, Left), (tape1, Left), (rax, Left)],
    );

    let flush = b.new_node();
    let flushed = b.new_node();
    b.add_transition(
        carry_on,
        flush,
        &[(tape0, only(Blank)), (tape1, only(Blank))],
        &[(rax, put(One))],
        &[(tape0, Left), (tape1, Left), (rax, Right)],
    );
    b.add_simple(flush, flushed, rax, ANY, put(Blank), Left);
    b.add_simple(flushed, back, rax, ANY, KEEP, Left);

    b.add_transition(
        back,
        back,
        &[(tape0, BIT)],
        &[],
        &[(tape0, Left), (tape1, Left), (rax, Left)],
    );
    b.add_transition(
        back,
        back,
        &[(tape0, only(Blank)), (tape1, BIT)],
        &[],
        &[(tape0, Left), (tape1, Left), (rax, Left)],
    );
    b.add_transition(
        back,
        end,
        &[(tape0, only(Blank)), (tape1, only(Blank))],
        &[],
        &[(tape0, Right), (tape1, Right), (rax, Right)],
    );
}

pub(super) fn basic_sub(
    b: &mut MachineBuilder,
    tape0: usize,
    tape1: usize,
    start: usize,
    end: usize,
) {
    let rax = b.tape_index("rax");

    let borrow_off = b.new_node();
    pad_blanks(b, tape0, tape1, start, borrow_off, true);
    let borrow_on = b.new_node();

    emit_adder_rows(
        b,
        tape0,
        tape1,
        rax,
        borrow_off,
        borrow_off,
        borrow_on,
        &[
            (ZERO_OR_BLANK, only(Zero), Zero, false),
            (only(Zero), ZERO_OR_BLANK, Zero, false),
            (ZERO_OR_BLANK, only(One), One, true),
            (only(One), ZERO_OR_BLANK, One, false),
            (only(One), only(One), Zero, false),
        ],
    );
    emit_adder_rows(
        b,
        tape0,
        tape1,
        rax,
        borrow_on,
        borrow_off,
        borrow_on,
        &[
            (ZERO_OR_BLANK, only(Zero), One, true),
            (only(Zero), ZERO_OR_BLANK, One, true),
            (ZERO_OR_BLANK, only(One), Zero, true),
            (only(One), ZERO_OR_BLANK, Zero, false),
            (only(One), only(One), One, true),
        ],
    );

    // minuend >= subtrahend, so no borrow survives; terminate and strip the
    // leading zeros the difference may have
    let strip = b.new_node();
    for &state in &[borrow_off, borrow_on] {
        b.add_transition(
            state,
            strip,
            &[(tape0, only(Blank)), (tape1, only(Blank))],
            &[(rax, put(Blank))],
            &[(tape0, Left), (tape1, Left), (rax, Left)],
        );
    }

    let significant = b.new_node();
    let landed = b.new_node();
    b.add_transition(
        strip,
        strip,
        &[(rax, only(Zero))],
        &[(rax, put(Blank))],
        &[(tape0, Left), (tape1, Left), (rax, Left)],
    );
    b.add_transition(
        strip,
        significant,
        &[(rax, only(One))],
        &[],
        &[(tape0, Left), (tape1, Left), (rax, Left)],
    );
    b.add_transition(
        significant,
        significant,
        &[(rax, BIT)],
        &[],
        &[(tape0, Left), (tape1, Left), (rax, Left)],
    );
    for &state in &[strip, significant] {
        b.add_transition(
            state,
            landed,
            &[(rax, only(Blank))],
            &[],
            &[(tape0, Right), (tape1, Right), (rax, Right)],
        );
    }

    // a fully stripped result is zero; restore its single cell
    b.add_simple(landed, end, rax, only(Blank), put(Zero), tmvm::Shift::Hold);
    b.add_simple(landed, end, rax, BIT, KEEP, tmvm::Shift::Hold);
}

pub(super) fn basic_xor(
    b: &mut MachineBuilder,
    tape0: usize,
    tape1: usize,
    start: usize,
    end: usize,
) {
    let rax = b.tape_index("rax");

    let scan = b.new_node();
    pad_blanks(b, tape0, tape1, start, scan, true);

    emit_adder_rows(
        b,
        tape0,
        tape1,
        rax,
        scan,
        scan,
        scan,
        &[
            (ZERO_OR_BLANK, only(Zero), Zero, false),
            (only(Zero), ZERO_OR_BLANK, Zero, false),
            (ZERO_OR_BLANK, only(One), One, false),
            (only(One), ZERO_OR_BLANK, One, false),
            (only(One), only(One), Zero, false),
        ],
    );

    let strip = b.new_node();
    b.add_transition(
        scan,
        strip,
        &[(tape0, only(Blank)), (tape1, only(Blank))],
        &[(rax, put(Blank))],
        &[(tape0, Left), (tape1, Left), (rax, Left)],
    );

    // equal prefixes cancel, so strip leading zeros on the way back
    let significant = b.new_node();
    let landed = b.new_node();
    b.add_transition(
        strip,
        strip,
        &[(rax, only(Zero))],
        &[(rax, put(Blank))],
        &[(tape0, Left), (tape1, Left), (rax, Left)],
    );
    b.add_transition(strip, significant, &[(rax, only(One))], &[], &[]);
    b.add_transition(
        significant,
        significant,
        &[(rax, BIT)],
        &[],
        &[(tape0, Left), (tape1, Left), (rax, Left)],
    );
    for &state in &[strip, significant] {
        b.add_transition(
            state,
            landed,
            &[(tape0, only(Blank)), (tape1, only(Blank))],
            &[],
            &[(tape0, Right), (tape1, Right), (rax, Right)],
        );
    }

    b.add_simple(landed, end, rax, only(Blank), put(Zero), tmvm::Shift::Hold);
    b.add_simple(landed, end, rax, BIT, KEEP, tmvm::Shift::Hold);
}

pub(super) fn basic_eq(
    b: &mut MachineBuilder,
    tape0: usize,
    tape1: usize,
    start: usize,
    end: usize,
) {
    let rax = b.tape_index("rax");
    let back = b.new_node();

    let symbols = [only(Zero), only(One), only(Blank)];
    for (i, &p0) in symbols.iter().enumerate() {
        for (j, &p1) in symbols.iter().enumerate() {
            if i == 2 && j == 2 {
                // ran off both ends with every cell equal
                b.add_transition(
                    start,
                    back,
                    &[(tape0, p0), (tape1, p1)],
                    &[(rax, put(One))],
                    &[(tape0, Left), (tape1, Left), (rax, Right)],
                );
            } else if i == j {
                b.add_transition(
                    start,
                    start,
                    &[(tape0, p0), (tape1, p1)],
                    &[],
                    &[(tape0, Right), (tape1, Right)],
                );
            } else {
                b.add_transition(
                    start,
                    back,
                    &[(tape0, p0), (tape1, p1)],
                    &[(rax, put(Zero))],
                    &[(tape0, Left), (tape1, Left), (rax, Right)],
                );
            }
        }
    }

    b.add_transition(
        back,
        back,
        &[(tape0, BIT), (tape1, BIT)],
        &[],
        &[(tape0, Left), (tape1, Left)],
    );
    b.add_transition(
        back,
        back,
        &[(tape0, BIT), (tape1, only(Blank))],
        &[],
        &[(tape0, Left), (tape1, Left)],
    );
    b.add_transition(
        back,
        back,
        &[(tape0, only(Blank)), (tape1, BIT)],
        &[],
        &[(tape0, Left), (tape1, Left)],
    );

    let landed = b.new_node();
    b.add_transition(
        back,
        landed,
        &[(tape0, only(Blank)), (tape1, only(Blank))],
        &[],
        &[(tape0, Right), (tape1, Right)],
    );
    b.add_simple(landed, end, rax, ANY, put(Blank), Left);
}

pub(super) fn basic_lt(
    b: &mut MachineBuilder,
    tape0: usize,
    tape1: usize,
    start: usize,
    end: usize,
) {
    let rax = b.tape_index("rax");

    // compare from the most significant end, so stop the heads there
    let compare = b.new_node();
    pad_blanks(b, tape0, tape1, start, compare, false);

    let back = b.new_node();
    let landed = b.new_node();

    b.add_transition(
        compare,
        compare,
        &[(tape0, ZERO_OR_BLANK), (tape1, only(Zero))],
        &[],
        &[(tape0, Left), (tape1, Left)],
    );
    b.add_transition(
        compare,
        compare,
        &[(tape0, only(Zero)), (tape1, ZERO_OR_BLANK)],
        &[],
        &[(tape0, Left), (tape1, Left)],
    );
    b.add_transition(
        compare,
        compare,
        &[(tape0, only(One)), (tape1, only(One))],
        &[],
        &[(tape0, Left), (tape1, Left)],
    );
    b.add_transition(
        compare,
        back,
        &[(tape0, ZERO_OR_BLANK), (tape1, only(One))],
        &[(rax, put(One))],
        &[(rax, Right)],
    );
    b.add_transition(
        compare,
        back,
        &[(tape0, only(One)), (tape1, ZERO_OR_BLANK)],
        &[(rax, put(Zero))],
        &[(rax, Right)],
    );
    // walked past the sign cells: the values are equal
    b.add_transition(
        compare,
        landed,
        &[(tape0, only(Blank)), (tape1, only(Blank))],
        &[(rax, put(Zero))],
        &[(tape0, Right), (tape1, Right), (rax, Right)],
    );

    b.add_transition(
        back,
        back,
        &[(tape0, BIT)],
        &[],
        &[(tape0, Left), (tape1, Left)],
    );
    b.add_transition(
        back,
        back,
        &[(tape0, only(Blank)), (tape1, BIT)],
        &[],
        &[(tape0, Left), (tape1, Left)],
    );
    b.add_transition(
        back,
        landed,
        &[(tape0, only(Blank)), (tape1, only(Blank))],
        &[],
        &[(tape0, Right), (tape1, Right)],
    );

    b.add_simple(landed, end, rax, ANY, put(Blank), Left);
}

pub(super) fn basic_neg(b: &mut MachineBuilder, tape0: usize, start: usize, end: usize) {
    // flip the sign cell in place, then copy
    let flipped = b.new_node();
    b.add_simple(start, flipped, tape0, only(Zero), put(One), tmvm::Shift::Hold);
    b.add_simple(start, flipped, tape0, only(One), put(Zero), tmvm::Shift::Hold);

    let rax = b.tape_index("rax");
    copy_between_tapes(b, tape0, rax, flipped, end);
}

pub(super) fn basic_mul2(b: &mut MachineBuilder, tape0: usize, start: usize, end: usize) {
    let rax = b.tape_index("rax");

    // sign cell, then a fresh 0 bit, then the argument's bits
    let copying = b.new_node();
    let shifted = b.new_node();
    for &bit in &[Zero, One] {
        b.add_transition(
            start,
            copying,
            &[(tape0, only(bit))],
            &[(rax, put(bit))],
            &[(tape0, Right), (rax, Right)],
        );
    }
    b.add_simple(copying, shifted, rax, ANY, put(Zero), Right);

    for &bit in &[Zero, One] {
        b.add_transition(
            shifted,
            shifted,
            &[(tape0, only(bit))],
            &[(rax, put(bit))],
            &[(tape0, Right), (rax, Right)],
        );
    }

    let back = b.new_node();
    b.add_transition(
        shifted,
        back,
        &[(tape0, only(Blank))],
        &[(rax, put(Blank))],
        &[(rax, Left)],
    );
    b.add_transition(back, back, &[(rax, BIT)], &[], &[(tape0, Left), (rax, Left)]);
    b.add_transition(
        back,
        end,
        &[(rax, only(Blank))],
        &[],
        &[(tape0, Right), (rax, Right)],
    );
}

pub(super) fn basic_div2(b: &mut MachineBuilder, tape0: usize, start: usize, end: usize) {
    let rax = b.tape_index("rax");

    let copying = b.new_node();
    let skipped = b.new_node();
    for &bit in &[Zero, One] {
        b.add_transition(
            start,
            copying,
            &[(tape0, only(bit))],
            &[(rax, put(bit))],
            &[(tape0, Right), (rax, Right)],
        );
    }
    // halving discards the least significant bit
    b.add_simple(copying, skipped, tape0, ANY, KEEP, Right);

    for &bit in &[Zero, One] {
        b.add_transition(
            skipped,
            skipped,
            &[(tape0, only(bit))],
            &[(rax, put(bit))],
            &[(tape0, Right), (rax, Right)],
        );
    }

    let back = b.new_node();
    b.add_transition(
        skipped,
        back,
        &[(tape0, only(Blank))],
        &[(rax, put(Blank))],
        &[(tape0, Left)],
    );
    b.add_transition(back, back, &[(tape0, BIT)], &[], &[(tape0, Left), (rax, Left)]);
    b.add_transition(
        back,
        end,
        &[(tape0, only(Blank))],
        &[],
        &[(tape0, Right), (rax, Right)],
    );
}

pub(super) fn is_even(b: &mut MachineBuilder, tape0: usize, start: usize, end: usize) {
    let rax = b.tape_index("rax");

    let at_lsb = b.new_node();
    b.add_simple(start, at_lsb, tape0, ANY, KEEP, Right);

    let written = b.new_node();
    b.add_transition(
        at_lsb,
        written,
        &[(tape0, ZERO_OR_BLANK)],
        &[(rax, put(One))],
        &[(rax, Right)],
    );
    b.add_transition(
        at_lsb,
        written,
        &[(tape0, only(One))],
        &[(rax, put(Zero))],
        &[(rax, Right)],
    );

    b.add_transition(
        written,
        end,
        &[],
        &[(rax, put(Blank))],
        &[(tape0, Left), (rax, Left)],
    );
}

pub(super) fn is_odd(b: &mut MachineBuilder, tape0: usize, start: usize, end: usize) {
    let rax = b.tape_index("rax");

    let at_lsb = b.new_node();
    b.add_simple(start, at_lsb, tape0, ANY, KEEP, Right);

    let written = b.new_node();
    b.add_transition(
        at_lsb,
        written,
        &[(tape0, ZERO_OR_BLANK)],
        &[(rax, put(Zero))],
        &[(rax, Right)],
    );
    b.add_transition(
        at_lsb,
        written,
        &[(tape0, only(One))],
        &[(rax, put(One))],
        &[(rax, Right)],
    );

    b.add_transition(
        written,
        end,
        &[],
        &[(rax, put(Blank))],
        &[(tape0, Left), (rax, Left)],
    );
}
