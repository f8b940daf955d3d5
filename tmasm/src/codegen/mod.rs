//! Assembly-to-machine code generation.
//!
//! Every assembly line gets a block of transitions gated on the encoded
//! instruction pointer. The shared control skeleton runs
//! `before → (increment IP) → sideways → (mirror IP bits) → after`; from
//! `after`, one transition per line matches that line's IP bit pattern and
//! enters the instruction body, which finishes back at `before`. Bodies that
//! set the IP themselves (`jmp`, taken `jf`, `call`, primitives never; plain
//! `return` restores and still increments) re-enter at `sideways` instead so
//! the freshly written IP is mirrored without an increment.

mod builder;
mod memio;
mod primitives;

pub use self::builder::MachineBuilder;

use crate::parser;
use crate::{Error, Result};
use num::bigint::BigInt;
use std::fmt;
use std::str::FromStr;
use tmvm::Shift::{Hold, Left, Right};
use tmvm::Symbol::{Blank, One, Zero};
use tmvm::{MultiTapeMachine, ReadPattern, Symbol, SymbolSet, WriteRule};
use util::ParseEnumError;

/// Roster positions of the two tapes callers care about.
pub const INPUT_TAPE: usize = 0;
pub const OUTPUT_TAPE: usize = 1;

pub(crate) const ANY: ReadPattern = ReadPattern::Any;
pub(crate) const BIT: ReadPattern = ReadPattern::AnyOf(SymbolSet::BITS);
pub(crate) const ZERO_OR_BLANK: ReadPattern = ReadPattern::AnyOf(SymbolSet::ZERO_OR_BLANK);
pub(crate) const ONE_OR_BLANK: ReadPattern = ReadPattern::AnyOf(SymbolSet::ONE_OR_BLANK);
pub(crate) const KEEP: WriteRule = WriteRule::Keep;

pub(crate) fn only(symbol: Symbol) -> ReadPattern {
    ReadPattern::Only(symbol)
}

pub(crate) fn put(symbol: Symbol) -> WriteRule {
    WriteRule::Put(symbol)
}

/// A tape operand of an assembly instruction.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum TapeRef {
    Var(usize),
    Rax,
}

/// One parsed assembly instruction.
#[derive(Clone, PartialEq, Debug)]
pub enum Instr {
    Nop,
    Jmp(usize),
    Jf { tape: TapeRef, target: usize },
    Call(usize),
    CallPrimitive { name: Primitive, args: Vec<TapeRef> },
    Return,
    Push { src: TapeRef },
    PopParam { dst: TapeRef },
    PopResult { dst: TapeRef },
    Copy { dst: TapeRef, src: TapeRef },
    SetTrue { dst: TapeRef },
    SetFalse { dst: TapeRef },
    SetInt { dst: TapeRef, value: BigInt },
    Not { arg: TapeRef, dst: TapeRef },
    And { a: TapeRef, b: TapeRef, dst: TapeRef },
    Or { a: TapeRef, b: TapeRef, dst: TapeRef },
}

/// The machine-level primitives inlined at their call sites.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Primitive {
    IsZero,
    IsNeg,
    IsPos,
    BasicAdd,
    BasicSub,
    BasicXor,
    BasicEq,
    BasicLt,
    BasicNeg,
    BasicMul2,
    BasicDiv2,
    IsEven,
    IsOdd,
    GetMemBitIndex,
    SetMemBitIndex,
    MoveMemHeadRight,
    MoveMemHeadLeft,
    SetMemBitZero,
    SetMemBitOne,
    SetMemBitBlank,
    MemBitIsZero,
    MemBitIsOne,
    MemBitIsBlank,
    NextInt,
    PrintInt,
    PrintSpace,
}

const PRIMITIVE_NAMES: &[(Primitive, &str)] = &[
    (Primitive::IsZero, "isZero"),
    (Primitive::IsNeg, "isNeg"),
    (Primitive::IsPos, "isPos"),
    (Primitive::BasicAdd, "basic_add"),
    (Primitive::BasicSub, "basic_sub"),
    (Primitive::BasicXor, "basic_xor"),
    (Primitive::BasicEq, "basic_eq"),
    (Primitive::BasicLt, "basic_lt"),
    (Primitive::BasicNeg, "basic_neg"),
    (Primitive::BasicMul2, "basic_mul2"),
    (Primitive::BasicDiv2, "basic_div2"),
    (Primitive::IsEven, "isEven"),
    (Primitive::IsOdd, "isOdd"),
    (Primitive::GetMemBitIndex, "getMemBitIndex"),
    (Primitive::SetMemBitIndex, "setMemBitIndex"),
    (Primitive::MoveMemHeadRight, "moveMemHeadRight"),
    (Primitive::MoveMemHeadLeft, "moveMemHeadLeft"),
    (Primitive::SetMemBitZero, "setMemBitZero"),
    (Primitive::SetMemBitOne, "setMemBitOne"),
    (Primitive::SetMemBitBlank, "setMemBitBlank"),
    (Primitive::MemBitIsZero, "memBitIsZero"),
    (Primitive::MemBitIsOne, "memBitIsOne"),
    (Primitive::MemBitIsBlank, "memBitIsBlank"),
    (Primitive::NextInt, "nextInt"),
    (Primitive::PrintInt, "printInt"),
    (Primitive::PrintSpace, "printSpace"),
];

impl Primitive {
    fn name(self) -> &'static str {
        PRIMITIVE_NAMES
            .iter()
            .find(|(p, _)| *p == self)
            .map(|(_, n)| *n)
            .unwrap_or("?")
    }

    fn arity(self) -> usize {
        match self {
            Primitive::BasicAdd
            | Primitive::BasicSub
            | Primitive::BasicXor
            | Primitive::BasicEq
            | Primitive::BasicLt => 2,
            Primitive::IsZero
            | Primitive::IsNeg
            | Primitive::IsPos
            | Primitive::BasicNeg
            | Primitive::BasicMul2
            | Primitive::BasicDiv2
            | Primitive::IsEven
            | Primitive::IsOdd
            | Primitive::SetMemBitIndex
            | Primitive::PrintInt => 1,
            _ => 0,
        }
    }
}

impl FromStr for Primitive {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> std::result::Result<Primitive, ParseEnumError> {
        PRIMITIVE_NAMES
            .iter()
            .find(|(_, n)| *n == s)
            .map(|(p, _)| *p)
            .ok_or_else(|| ParseEnumError::new(s, "Primitive"))
    }
}

impl fmt::Display for Primitive {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Line number encoded as IP cells, most significant first, with a leading
/// zero pad; the extra sign position keeps every line number non-negative in
/// two's complement.
pub(crate) fn line_bits(line: usize, width: usize) -> Vec<Symbol> {
    let mut bits = Vec::new();
    let mut value = line;
    while value > 0 {
        bits.push(if value % 2 == 0 { Zero } else { One });
        value /= 2;
    }
    while bits.len() < width {
        bits.push(Zero);
    }
    bits.reverse();
    bits
}

fn cell(b: &MachineBuilder, tape: TapeRef) -> usize {
    match tape {
        TapeRef::Rax => b.tape_index("rax"),
        TapeRef::Var(n) => b.var_tape(n),
    }
}

/// Gate `from → to` on the sideways tapes spelling out `line`.
fn ip_gate(b: &mut MachineBuilder, line: usize, from: usize, to: usize) {
    let bits = line_bits(line, b.ip_bits);
    let sideways = b.tape_index("ipSideways");
    let reads: Vec<(usize, ReadPattern)> = bits
        .iter()
        .enumerate()
        .map(|(i, &bit)| (sideways + i, only(bit)))
        .collect();
    b.add_transition(from, to, &reads, &[], &[]);
}

/// Write `target`'s encoding into the IP tape, rewind the head and re-enter
/// the skeleton at `sideways` (skipping the increment).
fn set_ip_and_dispatch(b: &mut MachineBuilder, from: usize, target: usize) {
    let bits = line_bits(target, b.ip_bits);
    let ip = b.tape_index("ip");

    let mut prev = from;
    for &bit in &bits {
        let q = b.new_node();
        b.add_simple(prev, q, ip, ANY, put(bit), Right);
        prev = q;
    }
    for _ in 0..b.ip_bits {
        let q = b.new_node();
        b.add_simple(prev, q, ip, ANY, KEEP, Left);
        prev = q;
    }
    let sideways = b.node("sideways");
    b.add_simple(prev, sideways, ip, ANY, KEEP, Hold);
}

/// Two's complement increment of the IP tape between `before` and
/// `sideways`, then a bit-by-bit mirror of the IP onto the sideways tapes
/// ending at `after`.
fn add_increment_ip(b: &mut MachineBuilder) {
    let q0 = b.node("before");
    let q1 = b.new_node();
    let q2 = b.new_node();
    let q3 = b.node("sideways");
    let ip = b.tape_index("ip");

    // run right to the end of the IP block
    b.add_simple(q0, q0, ip, BIT, KEEP, Right);
    b.add_simple(q0, q1, ip, only(Blank), put(Blank), Left);

    // propagate the carry leftward
    b.add_simple(q1, q1, ip, only(One), put(Zero), Left);
    b.add_simple(q1, q2, ip, only(Zero), put(One), Left);
    b.add_simple(q1, q2, ip, only(Blank), put(Blank), Hold);

    // rewind to the first bit
    b.add_simple(q2, q2, ip, BIT, KEEP, Left);
    b.add_simple(q2, q3, ip, only(Blank), KEEP, Right);

    // sideways: copy each bit onto its own one-cell tape
    let sideways = b.tape_index("ipSideways");
    let mut prev = q3;
    for i in 0..b.ip_bits {
        let to = b.new_node();
        for &bit in &[Zero, One] {
            b.add_transition(
                prev,
                to,
                &[(ip, only(bit))],
                &[(sideways + i, put(bit))],
                &[(ip, Right)],
            );
        }
        prev = to;
    }
    for _ in 0..b.ip_bits {
        let to = b.new_node();
        b.add_simple(prev, to, ip, ANY, KEEP, Left);
        prev = to;
    }
    let after = b.node("after");
    b.add_simple(prev, after, ip, ANY, KEEP, Hold);
}

/// Zero the MEM bit-cursor tape.
fn init_bit_cursor(b: &mut MachineBuilder, start: usize, end: usize) {
    let bit_index = b.tape_index("bitIndex");
    let q = b.new_node();
    b.add_simple(start, q, bit_index, ANY, put(Zero), Right);
    b.add_simple(q, end, bit_index, ANY, put(Blank), Left);
}

/// Push the −2 sentinel frame onto the IP stack: all ones except the last
/// cell. Returning from `main` restores it, the increment makes it −1, and
/// the exit clause fires.
fn push_sentinel_ip(b: &mut MachineBuilder, start: usize, end: usize) {
    let ip_stack = b.tape_index("ipStack");

    let mut prev = start;
    for i in 0..b.ip_bits {
        let bit = if i == b.ip_bits - 1 { Zero } else { One };
        let q = b.new_node();
        b.add_simple(prev, q, ip_stack, ANY, put(bit), Right);
        prev = q;
    }
    for _ in 0..b.ip_bits {
        let q = b.new_node();
        b.add_simple(prev, q, ip_stack, ANY, KEEP, Left);
        prev = q;
    }
    b.add_simple(prev, end, ip_stack, ANY, KEEP, Hold);
}

/// Zero out the IP tape and hand over to `sideways`.
fn init_ip(b: &mut MachineBuilder, start: usize, end: usize) {
    let ip = b.tape_index("ip");

    let mut prev = start;
    for _ in 0..b.ip_bits {
        let q = b.new_node();
        b.add_simple(prev, q, ip, ANY, put(Zero), Right);
        prev = q;
    }
    for _ in 0..b.ip_bits {
        let q = b.new_node();
        b.add_simple(prev, q, ip, ANY, KEEP, Left);
        prev = q;
    }
    b.add_simple(prev, end, ip, ANY, KEEP, Hold);
}

/// `after → end` when every sideways bit reads 1, i.e. IP = −1.
fn add_exit_clause(b: &mut MachineBuilder) {
    let after = b.node("after");
    let end = b.node("end");
    let sideways = b.tape_index("ipSideways");

    let reads: Vec<(usize, ReadPattern)> = (0..b.ip_bits)
        .map(|i| (sideways + i, only(One)))
        .collect();
    b.add_transition(after, end, &reads, &[], &[]);
}

fn initialize(b: &mut MachineBuilder) {
    b.named_node("start");
    b.named_node("end");
    b.named_node("before");
    b.named_node("after");
    b.named_node("sideways");

    add_increment_ip(b);

    let q0 = b.new_node();
    let q1 = b.new_node();
    let start = b.node("start");
    let sideways = b.node("sideways");

    init_bit_cursor(b, start, q0);
    push_sentinel_ip(b, q0, q1);
    init_ip(b, q1, sideways);

    add_exit_clause(b);
}

/// Bit-for-bit copy of the value under `from`'s head onto `to`, including
/// the delimiting blank, with both heads returned to the value's first cell.
pub(crate) fn copy_between_tapes(
    b: &mut MachineBuilder,
    from: usize,
    to: usize,
    start: usize,
    end: usize,
) {
    for &bit in &[Zero, One] {
        b.add_transition(
            start,
            start,
            &[(from, only(bit))],
            &[(to, put(bit))],
            &[(from, Right), (to, Right)],
        );
    }

    // the delimiter must be written out too, to cut off any longer value
    // previously on the target
    let back = b.new_node();
    b.add_transition(
        start,
        back,
        &[(from, only(Blank))],
        &[(to, put(Blank))],
        &[(from, Left), (to, Left)],
    );

    b.add_transition(
        back,
        back,
        &[(from, BIT)],
        &[],
        &[(from, Left), (to, Left)],
    );
    b.add_transition(
        back,
        end,
        &[(from, only(Blank))],
        &[],
        &[(from, Right), (to, Right)],
    );
}

/// Walk past the current top value and one separator, clearing the cell the
/// next value will start on.
pub(crate) fn push_empty_frame(b: &mut MachineBuilder, tape: usize, start: usize, end: usize) {
    let on_value = b.new_node();
    let on_blank = b.new_node();
    b.add_simple(start, on_value, tape, BIT, KEEP, Hold);
    b.add_simple(start, on_blank, tape, only(Blank), KEEP, Right);

    // past the value, past its delimiter, then blank out residual memory
    let landed = b.new_node();
    b.add_simple(on_value, on_value, tape, BIT, KEEP, Right);
    b.add_simple(on_value, landed, tape, only(Blank), KEEP, Right);
    b.add_simple(landed, end, tape, ANY, put(Blank), Hold);

    b.add_simple(on_blank, end, tape, ANY, put(Blank), Right);
}

/// Drop the top frame: erase up to two cells leftward, then rewind to the
/// start of the value below (or stop on the blank of an empty frame).
pub(crate) fn pop_off_top(b: &mut MachineBuilder, tape: usize, start: usize, end: usize) {
    let q1 = b.new_node();
    let mid = b.new_node();
    b.add_simple(start, q1, tape, ANY, put(Blank), Left);
    b.add_simple(q1, mid, tape, ANY, put(Blank), Left);

    b.add_simple(mid, end, tape, only(Blank), KEEP, Hold);

    let rewind = b.new_node();
    b.add_simple(mid, rewind, tape, BIT, KEEP, Hold);
    b.add_simple(rewind, rewind, tape, BIT, KEEP, Left);
    b.add_simple(rewind, end, tape, only(Blank), KEEP, Right);
}

/// Pad the shorter of two values with blanks until both are the same length.
/// With `rewind` the heads return to the first cell; without it they stop on
/// the last (most significant) cell, where a comparison wants them.
pub(crate) fn pad_blanks(
    b: &mut MachineBuilder,
    tape0: usize,
    tape1: usize,
    start: usize,
    end: usize,
    rewind: bool,
) {
    b.add_transition(
        start,
        start,
        &[(tape0, BIT), (tape1, BIT)],
        &[],
        &[(tape0, Right), (tape1, Right)],
    );

    let blank0 = b.new_node();
    let blank1 = b.new_node();
    let move_left = if rewind { b.new_node() } else { end };

    b.add_transition(
        start,
        blank0,
        &[(tape0, only(Blank)), (tape1, BIT)],
        &[],
        &[],
    );
    b.add_transition(
        start,
        blank1,
        &[(tape0, BIT), (tape1, only(Blank))],
        &[],
        &[],
    );
    b.add_transition(
        start,
        move_left,
        &[(tape0, only(Blank)), (tape1, only(Blank))],
        &[],
        &[(tape0, Left), (tape1, Left)],
    );

    b.add_transition(
        blank0,
        blank0,
        &[(tape1, BIT)],
        &[(tape0, put(Blank))],
        &[(tape0, Right), (tape1, Right)],
    );
    b.add_transition(
        blank0,
        move_left,
        &[(tape1, only(Blank))],
        &[(tape0, put(Blank))],
        &[(tape0, Left), (tape1, Left)],
    );

    b.add_transition(
        blank1,
        blank1,
        &[(tape0, BIT)],
        &[(tape1, put(Blank))],
        &[(tape0, Right), (tape1, Right)],
    );
    b.add_transition(
        blank1,
        move_left,
        &[(tape0, only(Blank))],
        &[(tape1, put(Blank))],
        &[(tape0, Left), (tape1, Left)],
    );

    if !rewind {
        return;
    }

    // rewind while at least one tape still reads a bit
    b.add_transition(
        move_left,
        move_left,
        &[(tape0, BIT)],
        &[],
        &[(tape0, Left), (tape1, Left)],
    );
    b.add_transition(
        move_left,
        move_left,
        &[(tape0, only(Blank)), (tape1, BIT)],
        &[],
        &[(tape0, Left), (tape1, Left)],
    );
    b.add_transition(
        move_left,
        end,
        &[(tape0, only(Blank)), (tape1, only(Blank))],
        &[],
        &[(tape0, Right), (tape1, Right)],
    );
}

fn emit_nop(b: &mut MachineBuilder, line: usize) {
    let after = b.node("after");
    let before = b.node("before");
    ip_gate(b, line, after, before);
}

fn emit_jmp(b: &mut MachineBuilder, line: usize, target: usize) {
    let after = b.node("after");
    let q0 = b.new_node();
    ip_gate(b, line, after, q0);
    set_ip_and_dispatch(b, q0, target);
}

fn emit_jf(b: &mut MachineBuilder, line: usize, tape: TapeRef, target: usize) {
    let after = b.node("after");
    let before = b.node("before");
    let value = cell(b, tape);

    let q0 = b.new_node();
    ip_gate(b, line, after, q0);

    // bit 0 means false: take the jump; 1 or blank falls through
    let taken = b.new_node();
    b.add_simple(q0, taken, value, only(Zero), KEEP, Hold);
    b.add_simple(q0, before, value, ONE_OR_BLANK, KEEP, Hold);

    set_ip_and_dispatch(b, taken, target);
}

fn emit_call(b: &mut MachineBuilder, line: usize, target: usize) {
    let after = b.node("after");
    let q0 = b.new_node();
    ip_gate(b, line, after, q0);

    // fresh frame on every variable tape
    let mut prev = q0;
    for i in 0..b.num_vars {
        let tape = b.var_tape(i);
        let q = b.new_node();
        push_empty_frame(b, tape, prev, q);
        prev = q;
    }

    // save the current IP
    let ip_stack = b.tape_index("ipStack");
    let ip = b.tape_index("ip");
    let q1 = b.new_node();
    let q2 = b.new_node();
    push_empty_frame(b, ip_stack, prev, q1);
    copy_between_tapes(b, ip, ip_stack, q1, q2);

    set_ip_and_dispatch(b, q2, target);
}

fn emit_return(b: &mut MachineBuilder, line: usize) {
    let after = b.node("after");
    let before = b.node("before");
    let q0 = b.new_node();
    ip_gate(b, line, after, q0);

    let mut prev = q0;
    for i in 0..b.num_vars {
        let tape = b.var_tape(i);
        let q = b.new_node();
        pop_off_top(b, tape, prev, q);
        prev = q;
    }

    // restore the caller's IP; the increment then steps past the call line
    let ip_stack = b.tape_index("ipStack");
    let ip = b.tape_index("ip");
    let q1 = b.new_node();
    copy_between_tapes(b, ip_stack, ip, prev, q1);
    pop_off_top(b, ip_stack, q1, before);
}

fn emit_push(b: &mut MachineBuilder, line: usize, src: TapeRef) {
    let after = b.node("after");
    let before = b.node("before");
    let source = cell(b, src);
    let param_stack = b.tape_index("paramStack");

    let q0 = b.new_node();
    let q1 = b.new_node();
    ip_gate(b, line, after, q0);
    push_empty_frame(b, param_stack, q0, q1);
    copy_between_tapes(b, source, param_stack, q1, before);
}

fn emit_pop_param(b: &mut MachineBuilder, line: usize, dst: TapeRef) {
    let after = b.node("after");
    let before = b.node("before");
    let target = cell(b, dst);
    let param_stack = b.tape_index("paramStack");

    let q0 = b.new_node();
    let q1 = b.new_node();
    ip_gate(b, line, after, q0);
    copy_between_tapes(b, param_stack, target, q0, q1);
    pop_off_top(b, param_stack, q1, before);
}

fn emit_pop_result(b: &mut MachineBuilder, line: usize, dst: TapeRef) {
    let after = b.node("after");
    let before = b.node("before");
    let target = cell(b, dst);
    let rax = b.tape_index("rax");

    let q0 = b.new_node();
    ip_gate(b, line, after, q0);
    copy_between_tapes(b, rax, target, q0, before);
}

fn emit_copy(b: &mut MachineBuilder, line: usize, dst: TapeRef, src: TapeRef) {
    let after = b.node("after");
    let before = b.node("before");
    let target = cell(b, dst);
    let source = cell(b, src);

    let q0 = b.new_node();
    ip_gate(b, line, after, q0);
    copy_between_tapes(b, source, target, q0, before);
}

fn emit_set_bool(b: &mut MachineBuilder, line: usize, dst: TapeRef, bit: Symbol) {
    let after = b.node("after");
    let before = b.node("before");
    let target = cell(b, dst);

    let q0 = b.new_node();
    let q1 = b.new_node();
    ip_gate(b, line, after, q0);
    b.add_simple(q0, q1, target, ANY, put(bit), Right);
    b.add_simple(q1, before, target, ANY, put(Blank), Left);
}

fn emit_set_int(b: &mut MachineBuilder, line: usize, dst: TapeRef, value: &BigInt) {
    let after = b.node("after");
    let before = b.node("before");
    let target = cell(b, dst);

    let q0 = b.new_node();
    ip_gate(b, line, after, q0);

    let cells: Vec<Symbol> = tmvm::encode_int(value)
        .chars()
        .map(|c| if c == '1' { One } else { Zero })
        .collect();

    let mut prev = q0;
    for &bit in &cells {
        let q = b.new_node();
        b.add_simple(prev, q, target, ANY, put(bit), Right);
        prev = q;
    }

    let capped = b.new_node();
    b.add_simple(prev, capped, target, ANY, put(Blank), Hold);
    prev = capped;

    for _ in 0..cells.len() {
        let q = b.new_node();
        b.add_simple(prev, q, target, ANY, KEEP, Left);
        prev = q;
    }
    b.add_simple(prev, before, target, ANY, KEEP, Hold);
}

fn emit_not(b: &mut MachineBuilder, line: usize, arg: TapeRef, dst: TapeRef) {
    let after = b.node("after");
    let before = b.node("before");
    let source = cell(b, arg);
    let target = cell(b, dst);

    let q0 = b.new_node();
    ip_gate(b, line, after, q0);

    let written = b.new_node();
    b.add_transition(
        q0,
        written,
        &[(source, only(Zero))],
        &[(target, put(One))],
        &[(target, Right)],
    );
    b.add_transition(
        q0,
        written,
        &[(source, only(One))],
        &[(target, put(Zero))],
        &[(target, Right)],
    );

    b.add_simple(written, before, target, ANY, put(Blank), Left);
}

fn emit_bool_pair(
    b: &mut MachineBuilder,
    line: usize,
    a: TapeRef,
    bb: TapeRef,
    dst: TapeRef,
    table: [Symbol; 4],
) {
    let after = b.node("after");
    let before = b.node("before");
    let first = cell(b, a);
    let second = cell(b, bb);
    let target = cell(b, dst);

    let q0 = b.new_node();
    ip_gate(b, line, after, q0);

    let written = b.new_node();
    let inputs = [(Zero, Zero), (Zero, One), (One, Zero), (One, One)];
    for (k, &(x, y)) in inputs.iter().enumerate() {
        b.add_transition(
            q0,
            written,
            &[(first, only(x)), (second, only(y))],
            &[(target, put(table[k]))],
            &[(target, Right)],
        );
    }

    b.add_simple(written, before, target, ANY, put(Blank), Left);
}

fn emit_primitive(
    b: &mut MachineBuilder,
    line: usize,
    name: Primitive,
    args: &[TapeRef],
) -> Result<()> {
    let tapes: Vec<usize> = args.iter().map(|r| cell(b, *r)).collect();
    if tapes.len() != name.arity() {
        return Err(Error::BadAssembly {
            line,
            message: format!(
                "{} takes {} argument(s), got {}",
                name,
                name.arity(),
                tapes.len()
            ),
        });
    }

    let after = b.node("after");
    let before = b.node("before");
    let q0 = b.new_node();
    let q1 = b.new_node();
    ip_gate(b, line, after, q0);

    match name {
        Primitive::IsZero => primitives::is_zero(b, tapes[0], q0, q1),
        Primitive::IsNeg => primitives::is_neg(b, tapes[0], q0, q1),
        Primitive::IsPos => primitives::is_pos(b, tapes[0], q0, q1),
        Primitive::BasicAdd => primitives::basic_add(b, tapes[0], tapes[1], q0, q1),
        Primitive::BasicSub => primitives::basic_sub(b, tapes[0], tapes[1], q0, q1),
        Primitive::BasicXor => primitives::basic_xor(b, tapes[0], tapes[1], q0, q1),
        Primitive::BasicEq => primitives::basic_eq(b, tapes[0], tapes[1], q0, q1),
        Primitive::BasicLt => primitives::basic_lt(b, tapes[0], tapes[1], q0, q1),
        Primitive::BasicNeg => primitives::basic_neg(b, tapes[0], q0, q1),
        Primitive::BasicMul2 => primitives::basic_mul2(b, tapes[0], q0, q1),
        Primitive::BasicDiv2 => primitives::basic_div2(b, tapes[0], q0, q1),
        Primitive::IsEven => primitives::is_even(b, tapes[0], q0, q1),
        Primitive::IsOdd => primitives::is_odd(b, tapes[0], q0, q1),
        Primitive::GetMemBitIndex => memio::get_mem_bit_index(b, q0, q1),
        Primitive::SetMemBitIndex => memio::set_mem_bit_index(b, tapes[0], q0, q1),
        Primitive::MoveMemHeadRight => memio::move_mem_head(b, Right, q0, q1),
        Primitive::MoveMemHeadLeft => memio::move_mem_head(b, Left, q0, q1),
        Primitive::SetMemBitZero => memio::set_mem_bit(b, put(Zero), q0, q1),
        Primitive::SetMemBitOne => memio::set_mem_bit(b, put(One), q0, q1),
        Primitive::SetMemBitBlank => memio::set_mem_bit(b, put(Blank), q0, q1),
        Primitive::MemBitIsZero => memio::mem_bit_is(b, only(Zero), ONE_OR_BLANK, q0, q1),
        Primitive::MemBitIsOne => memio::mem_bit_is(b, only(One), ZERO_OR_BLANK, q0, q1),
        Primitive::MemBitIsBlank => memio::mem_bit_is(b, only(Blank), BIT, q0, q1),
        Primitive::NextInt => memio::next_int(b, q0, q1),
        Primitive::PrintInt => memio::print_int(b, tapes[0], q0, q1),
        Primitive::PrintSpace => memio::print_space(b, q0, q1),
    }

    // primitive bodies end at q1; step back into the increment skeleton
    let rax = b.tape_index("rax");
    b.add_simple(q1, before, rax, ANY, KEEP, Hold);
    Ok(())
}

fn emit(b: &mut MachineBuilder, line: usize, instr: &Instr) -> Result<()> {
    match instr {
        Instr::Nop => emit_nop(b, line),
        Instr::Jmp(target) => emit_jmp(b, line, *target),
        Instr::Jf { tape, target } => emit_jf(b, line, *tape, *target),
        Instr::Call(target) => emit_call(b, line, *target),
        Instr::CallPrimitive { name, args } => emit_primitive(b, line, *name, args)?,
        Instr::Return => emit_return(b, line),
        Instr::Push { src } => emit_push(b, line, *src),
        Instr::PopParam { dst } => emit_pop_param(b, line, *dst),
        Instr::PopResult { dst } => emit_pop_result(b, line, *dst),
        Instr::Copy { dst, src } => emit_copy(b, line, *dst, *src),
        Instr::SetTrue { dst } => emit_set_bool(b, line, *dst, One),
        Instr::SetFalse { dst } => emit_set_bool(b, line, *dst, Zero),
        Instr::SetInt { dst, value } => emit_set_int(b, line, *dst, value),
        Instr::Not { arg, dst } => emit_not(b, line, *arg, *dst),
        Instr::And { a, b: bb, dst } => {
            emit_bool_pair(b, line, *a, *bb, *dst, [Zero, Zero, Zero, One])
        }
        Instr::Or { a, b: bb, dst } => {
            emit_bool_pair(b, line, *a, *bb, *dst, [Zero, One, One, One])
        }
    }
    Ok(())
}

/// Turn linked assembly into a complete machine: parse every line, lay down
/// the control skeleton, then emit each instruction's transition block.
pub fn assembly_to_machine(assembly: &[String]) -> Result<MultiTapeMachine> {
    let mut instrs = Vec::with_capacity(assembly.len());
    for (i, line) in assembly.iter().enumerate() {
        instrs.push(parser::parse_line(line, i)?);
    }

    let mut b = MachineBuilder::new(assembly);
    initialize(&mut b);

    for (i, instr) in instrs.iter().enumerate() {
        emit(&mut b, i, instr)?;
    }

    let start = b.node("start");
    let end = b.node("end");
    Ok(b.finish(start, end))
}
