//! Opcode decode tables.
//!
//! Decode is pure: a byte (plus the extended flag armed by the prefix
//! byte) maps to a tagged `Instruction` or to `UnknownOpcode`. Both
//! tables are total over all 256 byte values and a decode call consults
//! exactly one of them, so the two are disjoint by construction. The
//! prefix byte itself never reaches `decode`: the scheduler intercepts
//! it during fetch and arms the extended flag for exactly one byte.
//!
//! Dispatch is a flat match on the full opcode byte, with the regular
//! register blocks (`LD r,r'`, ALU, the whole extended table) decoded
//! from the byte's bit fields.

use crate::alu::{AluOp, Rotate, ShiftOp};
use crate::error::Error;
use crate::registers::{R8, Wide};

/// Opcode-space extension byte. Arms the extended table for exactly the
/// next fetched byte.
pub const PREFIX: u8 = 0xCB;

/// An instruction operand: a named register or the memory byte
/// addressed by HL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operand {
    Reg(R8),
    MemHl,
}

/// Branch conditions, evaluated against the flags at decode time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cond {
    Always,
    NotZero,
    Zero,
    NotCarry,
    Carry,
}

/// A decoded instruction. Produced once per fetch and consumed by the
/// matching handler within the same fetch-decode-execute cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Instruction {
    Nop,
    /// LD rr,d16 (high byte first in the instruction stream).
    LdPairImm(Wide),
    /// LD (BC/DE),A.
    LdIndA(Wide),
    /// LD A,(BC/DE).
    LdAInd(Wide),
    /// LD (HL±),A.
    LdHlStepA { dec: bool },
    /// LD A,(HL±).
    LdAHlStep { dec: bool },
    IncPair(Wide),
    DecPair(Wide),
    /// ADD HL,rr.
    AddHl(Wide),
    IncOp(Operand),
    DecOp(Operand),
    /// LD r,d8 / LD (HL),d8.
    LdOpImm(Operand),
    RotA(Rotate),
    /// JR cc,e8 (signed offset from the following instruction).
    Jr(Cond),
    Cpl,
    Scf,
    Ccf,
    /// LD r,r' block. Never both memory operands; that encoding is HALT.
    LdOpOp { dst: Operand, src: Operand },
    Halt,
    Alu(AluOp, Operand),
    AluImm(AluOp),
    /// PUSH rr through the SP memory stack.
    Push(Wide),
    Pop(Wide),
    Jp(Cond),
    JpHl,
    /// CALL cc,a16 through the hardware call stack.
    Call(Cond),
    Ret(Cond),
    /// RST: call to a fixed low vector.
    Rst(u16),
    /// Clear the framebuffer.
    ClearDisplay,
    /// XOR-draw sprite byte A at column B, row C; carry = collision.
    DrawSprite,
    /// LD DELAY,A.
    DelayFromA,
    /// LD SOUND,A.
    SoundFromA,
    /// LD A,DELAY.
    DelayToA,
    /// LD A,KEYS.
    KeysToA,

    // Extended (post-prefix) table.
    Shift(ShiftOp, Operand),
    Bit(u8, Operand),
    Res(u8, Operand),
    Set(u8, Operand),
}

/// Decode one opcode byte against the table selected by `extended`.
/// `address` is where the byte was fetched, carried into the error.
pub fn decode(opcode: u8, extended: bool, address: u16) -> Result<Instruction, Error> {
    if extended {
        Ok(decode_extended(opcode))
    } else {
        decode_primary(opcode, address)
    }
}

/// Register selected by a 3-bit operand field.
const fn operand(bits: u8) -> Operand {
    match bits & 7 {
        0 => Operand::Reg(R8::B),
        1 => Operand::Reg(R8::C),
        2 => Operand::Reg(R8::D),
        3 => Operand::Reg(R8::E),
        4 => Operand::Reg(R8::H),
        5 => Operand::Reg(R8::L),
        6 => Operand::MemHl,
        _ => Operand::Reg(R8::A),
    }
}

/// Register pair selected by the high two bits of the opcode's low
/// nibble rows (`BC DE HL SP`).
const fn pair(bits: u8) -> Wide {
    match bits & 3 {
        0 => Wide::BC,
        1 => Wide::DE,
        2 => Wide::HL,
        _ => Wide::SP,
    }
}

/// Like `pair`, but the last slot is AF (PUSH/POP rows).
const fn pair_af(bits: u8) -> Wide {
    match bits & 3 {
        0 => Wide::BC,
        1 => Wide::DE,
        2 => Wide::HL,
        _ => Wide::AF,
    }
}

const fn alu_op(bits: u8) -> AluOp {
    match bits & 7 {
        0 => AluOp::Add,
        1 => AluOp::Adc,
        2 => AluOp::Sub,
        3 => AluOp::Sbc,
        4 => AluOp::And,
        5 => AluOp::Xor,
        6 => AluOp::Or,
        _ => AluOp::Cp,
    }
}

fn decode_primary(op: u8, address: u16) -> Result<Instruction, Error> {
    use Instruction as I;

    let instruction = match op {
        0x00 => I::Nop,

        0x01 | 0x11 | 0x21 | 0x31 => I::LdPairImm(pair(op >> 4)),
        0x02 => I::LdIndA(Wide::BC),
        0x12 => I::LdIndA(Wide::DE),
        0x0A => I::LdAInd(Wide::BC),
        0x1A => I::LdAInd(Wide::DE),
        0x22 => I::LdHlStepA { dec: false },
        0x32 => I::LdHlStepA { dec: true },
        0x2A => I::LdAHlStep { dec: false },
        0x3A => I::LdAHlStep { dec: true },

        0x03 | 0x13 | 0x23 | 0x33 => I::IncPair(pair(op >> 4)),
        0x0B | 0x1B | 0x2B | 0x3B => I::DecPair(pair(op >> 4)),
        0x09 | 0x19 | 0x29 | 0x39 => I::AddHl(pair(op >> 4)),

        0x04 | 0x0C | 0x14 | 0x1C | 0x24 | 0x2C | 0x34 | 0x3C => I::IncOp(operand(op >> 3)),
        0x05 | 0x0D | 0x15 | 0x1D | 0x25 | 0x2D | 0x35 | 0x3D => I::DecOp(operand(op >> 3)),
        0x06 | 0x0E | 0x16 | 0x1E | 0x26 | 0x2E | 0x36 | 0x3E => I::LdOpImm(operand(op >> 3)),

        0x07 => I::RotA(Rotate::Rlca),
        0x0F => I::RotA(Rotate::Rrca),
        0x17 => I::RotA(Rotate::Rla),
        0x1F => I::RotA(Rotate::Rra),

        0x18 => I::Jr(Cond::Always),
        0x20 => I::Jr(Cond::NotZero),
        0x28 => I::Jr(Cond::Zero),
        0x30 => I::Jr(Cond::NotCarry),
        0x38 => I::Jr(Cond::Carry),

        0x2F => I::Cpl,
        0x37 => I::Scf,
        0x3F => I::Ccf,

        0x76 => I::Halt,
        0x40..=0x7F => I::LdOpOp { dst: operand(op >> 3), src: operand(op) },
        0x80..=0xBF => I::Alu(alu_op(op >> 3), operand(op)),
        0xC6 | 0xCE | 0xD6 | 0xDE | 0xE6 | 0xEE | 0xF6 | 0xFE => I::AluImm(alu_op(op >> 3)),

        0xC5 | 0xD5 | 0xE5 | 0xF5 => I::Push(pair_af(op >> 4)),
        0xC1 | 0xD1 | 0xE1 | 0xF1 => I::Pop(pair_af(op >> 4)),

        0xC3 => I::Jp(Cond::Always),
        0xC2 => I::Jp(Cond::NotZero),
        0xCA => I::Jp(Cond::Zero),
        0xD2 => I::Jp(Cond::NotCarry),
        0xDA => I::Jp(Cond::Carry),
        0xE9 => I::JpHl,

        0xCD => I::Call(Cond::Always),
        0xC4 => I::Call(Cond::NotZero),
        0xCC => I::Call(Cond::Zero),
        0xD4 => I::Call(Cond::NotCarry),
        0xDC => I::Call(Cond::Carry),

        0xC9 => I::Ret(Cond::Always),
        0xC0 => I::Ret(Cond::NotZero),
        0xC8 => I::Ret(Cond::Zero),
        0xD0 => I::Ret(Cond::NotCarry),
        0xD8 => I::Ret(Cond::Carry),

        0xC7 | 0xCF | 0xD7 | 0xDF | 0xE7 | 0xEF | 0xF7 | 0xFF => I::Rst(u16::from(op & 0x38)),

        0xD3 => I::ClearDisplay,
        0xF4 => I::DrawSprite,
        0xE3 => I::DelayFromA,
        0xE4 => I::SoundFromA,
        0xEB => I::DelayToA,
        0xEC => I::KeysToA,

        // Everything else (including the prefix byte, which the
        // scheduler intercepts before decode) is explicit: no silent
        // fallthrough to a no-op.
        _ => return Err(Error::UnknownOpcode { opcode: op, address }),
    };

    Ok(instruction)
}

/// The extended table is total: every post-prefix byte is a rotate,
/// shift, swap, or single-bit operation.
fn decode_extended(op: u8) -> Instruction {
    let operand = operand(op);
    let bit = (op >> 3) & 7;
    match op >> 6 {
        0 => {
            let shift = match bit {
                0 => ShiftOp::Rlc,
                1 => ShiftOp::Rrc,
                2 => ShiftOp::Rl,
                3 => ShiftOp::Rr,
                4 => ShiftOp::Sla,
                5 => ShiftOp::Sra,
                6 => ShiftOp::Swap,
                _ => ShiftOp::Srl,
            };
            Instruction::Shift(shift, operand)
        }
        1 => Instruction::Bit(bit, operand),
        2 => Instruction::Res(bit, operand),
        _ => Instruction::Set(bit, operand),
    }
}
