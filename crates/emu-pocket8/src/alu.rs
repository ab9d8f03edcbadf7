//! ALU operations.
//!
//! Every operation returns a value/flags pair; callers decide how the
//! flags merge into F (INC/DEC preserve carry, accumulator rotates clear
//! the zero flag). Nothing in here ever errors: results wrap to width.

use crate::flags::{CF, HF, NF, ZF};

/// Result of an ALU operation with flags.
#[derive(Debug, Clone, Copy)]
pub struct AluResult {
    pub value: u8,
    pub flags: u8,
}

/// Accumulator arithmetic/logic group (the `0x80..=0xBF` opcode block).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AluOp {
    Add,
    Adc,
    Sub,
    Sbc,
    And,
    Xor,
    Or,
    Cp,
}

/// Accumulator rotates (`RLCA`/`RRCA`/`RLA`/`RRA`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rotate {
    Rlca,
    Rrca,
    Rla,
    Rra,
}

/// Extended-table rotate/shift/swap group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShiftOp {
    Rlc,
    Rrc,
    Rl,
    Rr,
    Sla,
    Sra,
    Swap,
    Srl,
}

impl Rotate {
    /// The extended-table operation with the same bit movement.
    /// Accumulator rotates differ only in clearing the zero flag.
    #[must_use]
    pub const fn shift_op(self) -> ShiftOp {
        match self {
            Self::Rlca => ShiftOp::Rlc,
            Self::Rrca => ShiftOp::Rrc,
            Self::Rla => ShiftOp::Rl,
            Self::Rra => ShiftOp::Rr,
        }
    }
}

/// Add two bytes with optional carry-in, returning result and flags.
#[must_use]
pub fn add8(a: u8, b: u8, carry: bool) -> AluResult {
    let c = u8::from(carry);
    let result16 = u16::from(a) + u16::from(b) + u16::from(c);
    let result = result16 as u8;

    let mut flags = 0;
    if result == 0 {
        flags |= ZF;
    }
    if (a & 0x0F) + (b & 0x0F) + c > 0x0F {
        flags |= HF;
    }
    if result16 > 0xFF {
        flags |= CF;
    }

    AluResult { value: result, flags }
}

/// Subtract two bytes with optional borrow-in, returning result and flags.
#[must_use]
pub fn sub8(a: u8, b: u8, borrow: bool) -> AluResult {
    let c = u8::from(borrow);
    let result = a.wrapping_sub(b).wrapping_sub(c);

    let mut flags = NF;
    if result == 0 {
        flags |= ZF;
    }
    if (a & 0x0F) < (b & 0x0F) + c {
        flags |= HF;
    }
    if u16::from(a) < u16::from(b) + u16::from(c) {
        flags |= CF;
    }

    AluResult { value: result, flags }
}

/// AND operation. Half-carry is always set.
#[must_use]
pub fn and8(a: u8, b: u8) -> AluResult {
    let result = a & b;
    let flags = if result == 0 { ZF | HF } else { HF };
    AluResult { value: result, flags }
}

/// XOR operation.
#[must_use]
pub fn xor8(a: u8, b: u8) -> AluResult {
    let result = a ^ b;
    let flags = if result == 0 { ZF } else { 0 };
    AluResult { value: result, flags }
}

/// OR operation.
#[must_use]
pub fn or8(a: u8, b: u8) -> AluResult {
    let result = a | b;
    let flags = if result == 0 { ZF } else { 0 };
    AluResult { value: result, flags }
}

/// Increment. Carry is not in the returned flags; the caller preserves F's.
#[must_use]
pub fn inc8(v: u8) -> AluResult {
    let result = v.wrapping_add(1);
    let mut flags = 0;
    if result == 0 {
        flags |= ZF;
    }
    if v & 0x0F == 0x0F {
        flags |= HF;
    }
    AluResult { value: result, flags }
}

/// Decrement. Carry is not in the returned flags; the caller preserves F's.
#[must_use]
pub fn dec8(v: u8) -> AluResult {
    let result = v.wrapping_sub(1);
    let mut flags = NF;
    if result == 0 {
        flags |= ZF;
    }
    if v & 0x0F == 0 {
        flags |= HF;
    }
    AluResult { value: result, flags }
}

/// Dispatch an accumulator group operation. `CP` discards the difference
/// and returns the untouched accumulator as the value.
#[must_use]
pub fn apply(op: AluOp, a: u8, b: u8, carry: bool) -> AluResult {
    match op {
        AluOp::Add => add8(a, b, false),
        AluOp::Adc => add8(a, b, carry),
        AluOp::Sub => sub8(a, b, false),
        AluOp::Sbc => sub8(a, b, carry),
        AluOp::And => and8(a, b),
        AluOp::Xor => xor8(a, b),
        AluOp::Or => or8(a, b),
        AluOp::Cp => {
            let diff = sub8(a, b, false);
            AluResult { value: a, flags: diff.flags }
        }
    }
}

/// Dispatch an extended-table rotate/shift/swap. `carry` is the current
/// carry flag, consumed by the through-carry rotates.
#[must_use]
pub fn shift(op: ShiftOp, v: u8, carry: bool) -> AluResult {
    let c = u8::from(carry);
    let (result, carry_out) = match op {
        ShiftOp::Rlc => (v.rotate_left(1), v >> 7),
        ShiftOp::Rrc => (v.rotate_right(1), v & 1),
        ShiftOp::Rl => ((v << 1) | c, v >> 7),
        ShiftOp::Rr => ((v >> 1) | (c << 7), v & 1),
        ShiftOp::Sla => (v << 1, v >> 7),
        ShiftOp::Sra => ((v >> 1) | (v & 0x80), v & 1),
        ShiftOp::Swap => (v.rotate_left(4), 0),
        ShiftOp::Srl => (v >> 1, v & 1),
    };

    let mut flags = 0;
    if result == 0 {
        flags |= ZF;
    }
    if carry_out != 0 {
        flags |= CF;
    }

    AluResult { value: result, flags }
}
