//! Instruction handlers.
//!
//! A handler never blocks and never advances the tick counter: it
//! schedules micro-operations at offsets from the decode tick and
//! returns the instruction's total duration, which places the next
//! fetch-decode cycle. Offsets follow the bus: each memory access owns
//! a four-tick machine cycle, with addresses latched early and data
//! moved late. The PC increment for the opcode byte itself is already
//! scheduled at offset 1 when a handler runs.
//!
//! Conditional instructions evaluate their condition at decode time,
//! before any of their micro-ops has fired, and pick both the micro-op
//! set and the duration from it.

use emu_core::Ticks;

use crate::decode::{Cond, Instruction, Operand};
use crate::microcode::{Effect, Endpoint, MicroOp};
use crate::registers::{R8, Wide};

use super::Console;

/// High/low 8-bit cells of a register pair view.
const fn halves(pair: Wide) -> (R8, R8) {
    match pair {
        Wide::AF => (R8::A, R8::F),
        Wide::BC => (R8::B, R8::C),
        Wide::DE => (R8::D, R8::E),
        Wide::HL => (R8::H, R8::L),
        Wide::WZ => (R8::W, R8::Z),
        // SP and PC are native 16-bit cells; handlers move them through
        // WZ instead of addressing halves.
        Wide::SP | Wide::PC => unreachable!(),
    }
}

impl Console {
    /// Schedule one operand-byte fetch: PC to the address latch, PC
    /// increment, memory read into `dst`. Three separately timed
    /// micro-ops, matching the hardware's bus traffic.
    ///
    /// `dst` may be Z (the read uses the latched address before
    /// overwriting it) but not W: a W destination would be clobbered by
    /// the next fetch's latch copy. Control-flow handlers that need a
    /// byte in W read their low byte straight off PC instead.
    fn schedule_operand_read(&mut self, offset: u64, dst: R8) {
        self.schedule(
            offset,
            MicroOp::transfer(Endpoint::Pair(Wide::PC), Endpoint::Pair(Wide::WZ)),
        );
        self.schedule(offset + 1, MicroOp::Effect(Effect::IncPc));
        self.schedule(
            offset + 2,
            MicroOp::transfer(Endpoint::Mem(Wide::WZ), Endpoint::Reg(dst)),
        );
    }

    /// Fetch the low target byte of a 16-bit control-flow operand into
    /// Z, reading straight off PC: the latch already holds the high
    /// byte and must not be re-copied over.
    fn schedule_target_lo_read(&mut self, offset: u64) {
        self.schedule(
            offset,
            MicroOp::transfer(Endpoint::Mem(Wide::PC), Endpoint::Reg(R8::Z)),
        );
        self.schedule(offset + 1, MicroOp::Effect(Effect::IncPc));
    }

    /// Translate one decoded instruction into scheduled micro-ops and
    /// report its duration.
    pub(crate) fn execute(&mut self, instruction: Instruction) -> Ticks {
        let ticks = match instruction {
            Instruction::Nop => 4,

            Instruction::LdPairImm(Wide::SP) => {
                // SP has no 8-bit halves: the immediate assembles in WZ
                // (high byte first) and moves over whole.
                self.schedule_operand_read(4, R8::W);
                self.schedule_target_lo_read(8);
                self.schedule(
                    11,
                    MicroOp::transfer(Endpoint::Pair(Wide::WZ), Endpoint::Pair(Wide::SP)),
                );
                12
            }
            Instruction::LdPairImm(pair) => {
                // Immediates are high byte first in the stream.
                let (hi, lo) = halves(pair);
                self.schedule_operand_read(4, hi);
                self.schedule_operand_read(8, lo);
                12
            }

            Instruction::LdIndA(pair) => {
                self.schedule(6, MicroOp::transfer(Endpoint::Reg(R8::A), Endpoint::Mem(pair)));
                8
            }
            Instruction::LdAInd(pair) => {
                self.schedule(6, MicroOp::transfer(Endpoint::Mem(pair), Endpoint::Reg(R8::A)));
                8
            }
            Instruction::LdHlStepA { dec } => {
                // The write must hit the pre-step address, so it goes
                // through the latch while HL steps underneath.
                self.schedule(
                    4,
                    MicroOp::transfer(Endpoint::Pair(Wide::HL), Endpoint::Pair(Wide::WZ)),
                );
                let step = if dec { Effect::DecPair(Wide::HL) } else { Effect::IncPair(Wide::HL) };
                self.schedule(5, MicroOp::Effect(step));
                self.schedule(6, MicroOp::transfer(Endpoint::Reg(R8::A), Endpoint::Mem(Wide::WZ)));
                8
            }
            Instruction::LdAHlStep { dec } => {
                self.schedule(
                    4,
                    MicroOp::transfer(Endpoint::Pair(Wide::HL), Endpoint::Pair(Wide::WZ)),
                );
                let step = if dec { Effect::DecPair(Wide::HL) } else { Effect::IncPair(Wide::HL) };
                self.schedule(5, MicroOp::Effect(step));
                self.schedule(6, MicroOp::transfer(Endpoint::Mem(Wide::WZ), Endpoint::Reg(R8::A)));
                8
            }

            Instruction::IncPair(pair) => {
                self.schedule(5, MicroOp::Effect(Effect::IncPair(pair)));
                8
            }
            Instruction::DecPair(pair) => {
                self.schedule(5, MicroOp::Effect(Effect::DecPair(pair)));
                8
            }
            Instruction::AddHl(pair) => {
                self.schedule(5, MicroOp::Effect(Effect::AddHl(pair)));
                8
            }

            Instruction::IncOp(Operand::Reg(r)) => {
                self.schedule(2, MicroOp::Effect(Effect::IncReg(r)));
                4
            }
            Instruction::IncOp(Operand::MemHl) => {
                // Read-modify-write through the Z latch.
                self.schedule(6, MicroOp::transfer(Endpoint::Mem(Wide::HL), Endpoint::Reg(R8::Z)));
                self.schedule(8, MicroOp::Effect(Effect::IncReg(R8::Z)));
                self.schedule(10, MicroOp::transfer(Endpoint::Reg(R8::Z), Endpoint::Mem(Wide::HL)));
                12
            }
            Instruction::DecOp(Operand::Reg(r)) => {
                self.schedule(2, MicroOp::Effect(Effect::DecReg(r)));
                4
            }
            Instruction::DecOp(Operand::MemHl) => {
                self.schedule(6, MicroOp::transfer(Endpoint::Mem(Wide::HL), Endpoint::Reg(R8::Z)));
                self.schedule(8, MicroOp::Effect(Effect::DecReg(R8::Z)));
                self.schedule(10, MicroOp::transfer(Endpoint::Reg(R8::Z), Endpoint::Mem(Wide::HL)));
                12
            }

            Instruction::LdOpImm(Operand::Reg(r)) => {
                self.schedule_operand_read(4, r);
                8
            }
            Instruction::LdOpImm(Operand::MemHl) => {
                self.schedule_operand_read(4, R8::Z);
                self.schedule(10, MicroOp::transfer(Endpoint::Reg(R8::Z), Endpoint::Mem(Wide::HL)));
                12
            }

            Instruction::RotA(rot) => {
                self.schedule(2, MicroOp::Effect(Effect::RotA(rot)));
                4
            }

            Instruction::Jr(cond) => {
                // The offset byte is fetched either way; PC has already
                // stepped past it when the jump commits, so the offset
                // is relative to the following instruction.
                self.schedule_operand_read(4, R8::Z);
                if self.condition(cond) {
                    self.schedule(8, MicroOp::Effect(Effect::JumpRel));
                    12
                } else {
                    8
                }
            }

            Instruction::Cpl => {
                self.schedule(2, MicroOp::Effect(Effect::Cpl));
                4
            }
            Instruction::Scf => {
                self.schedule(2, MicroOp::Effect(Effect::Scf));
                4
            }
            Instruction::Ccf => {
                self.schedule(2, MicroOp::Effect(Effect::Ccf));
                4
            }

            Instruction::LdOpOp { dst: Operand::Reg(d), src: Operand::Reg(s) } => {
                self.schedule(2, MicroOp::transfer(Endpoint::Reg(s), Endpoint::Reg(d)));
                4
            }
            Instruction::LdOpOp { dst: Operand::Reg(d), src: Operand::MemHl } => {
                self.schedule(6, MicroOp::transfer(Endpoint::Mem(Wide::HL), Endpoint::Reg(d)));
                8
            }
            Instruction::LdOpOp { dst: Operand::MemHl, src: Operand::Reg(s) } => {
                self.schedule(6, MicroOp::transfer(Endpoint::Reg(s), Endpoint::Mem(Wide::HL)));
                8
            }
            Instruction::LdOpOp { dst: Operand::MemHl, src: Operand::MemHl } => {
                // That encoding is HALT; decode never produces it.
                unreachable!()
            }

            Instruction::Halt => {
                self.schedule(2, MicroOp::Effect(Effect::Halt));
                4
            }

            Instruction::Alu(op, Operand::Reg(r)) => {
                self.schedule(2, MicroOp::transfer(Endpoint::Reg(r), Endpoint::Reg(R8::Z)));
                self.schedule(3, MicroOp::Effect(Effect::Alu(op)));
                4
            }
            Instruction::Alu(op, Operand::MemHl) => {
                self.schedule(6, MicroOp::transfer(Endpoint::Mem(Wide::HL), Endpoint::Reg(R8::Z)));
                self.schedule(7, MicroOp::Effect(Effect::Alu(op)));
                8
            }
            Instruction::AluImm(op) => {
                self.schedule_operand_read(4, R8::Z);
                self.schedule(7, MicroOp::Effect(Effect::Alu(op)));
                8
            }

            Instruction::Push(pair) => {
                let (hi, lo) = halves(pair);
                self.schedule(5, MicroOp::Effect(Effect::DecPair(Wide::SP)));
                self.schedule(7, MicroOp::transfer(Endpoint::Reg(hi), Endpoint::Mem(Wide::SP)));
                self.schedule(9, MicroOp::Effect(Effect::DecPair(Wide::SP)));
                self.schedule(11, MicroOp::transfer(Endpoint::Reg(lo), Endpoint::Mem(Wide::SP)));
                16
            }
            Instruction::Pop(pair) => {
                let (hi, lo) = halves(pair);
                self.schedule(4, MicroOp::transfer(Endpoint::Mem(Wide::SP), Endpoint::Reg(lo)));
                self.schedule(5, MicroOp::Effect(Effect::IncPair(Wide::SP)));
                self.schedule(8, MicroOp::transfer(Endpoint::Mem(Wide::SP), Endpoint::Reg(hi)));
                self.schedule(9, MicroOp::Effect(Effect::IncPair(Wide::SP)));
                12
            }

            Instruction::Jp(cond) => {
                self.schedule_operand_read(4, R8::W);
                self.schedule_target_lo_read(8);
                if self.condition(cond) {
                    self.schedule(11, MicroOp::Effect(Effect::Jump));
                    16
                } else {
                    12
                }
            }
            Instruction::JpHl => {
                self.schedule(2, MicroOp::Effect(Effect::JumpHl));
                4
            }

            Instruction::Call(cond) => {
                self.schedule_operand_read(4, R8::W);
                self.schedule_target_lo_read(8);
                if self.condition(cond) {
                    self.schedule(12, MicroOp::Effect(Effect::Call));
                    24
                } else {
                    12
                }
            }
            Instruction::Ret(Cond::Always) => {
                self.schedule(8, MicroOp::Effect(Effect::Return));
                16
            }
            Instruction::Ret(cond) => {
                if self.condition(cond) {
                    self.schedule(10, MicroOp::Effect(Effect::Return));
                    20
                } else {
                    8
                }
            }
            Instruction::Rst(vector) => {
                self.schedule(6, MicroOp::Effect(Effect::Rst(vector)));
                16
            }

            Instruction::ClearDisplay => {
                self.schedule(8, MicroOp::Effect(Effect::ClearDisplay));
                16
            }
            Instruction::DrawSprite => {
                self.schedule(8, MicroOp::Effect(Effect::DrawSprite));
                16
            }
            Instruction::DelayFromA => {
                self.schedule(2, MicroOp::Effect(Effect::DelayFromA));
                4
            }
            Instruction::SoundFromA => {
                self.schedule(2, MicroOp::Effect(Effect::SoundFromA));
                4
            }
            Instruction::DelayToA => {
                self.schedule(2, MicroOp::Effect(Effect::DelayToA));
                4
            }
            Instruction::KeysToA => {
                self.schedule(2, MicroOp::Effect(Effect::KeysToA));
                4
            }

            // Extended table. The prefix byte already took its own
            // four-tick fetch; durations here cover the rest.
            Instruction::Shift(op, Operand::Reg(r)) => {
                self.schedule(2, MicroOp::Effect(Effect::Shift(op, r)));
                4
            }
            Instruction::Shift(op, Operand::MemHl) => {
                self.schedule(6, MicroOp::transfer(Endpoint::Mem(Wide::HL), Endpoint::Reg(R8::Z)));
                self.schedule(8, MicroOp::Effect(Effect::Shift(op, R8::Z)));
                self.schedule(10, MicroOp::transfer(Endpoint::Reg(R8::Z), Endpoint::Mem(Wide::HL)));
                12
            }
            Instruction::Bit(bit, Operand::Reg(r)) => {
                self.schedule(2, MicroOp::Effect(Effect::BitTest(bit, r)));
                4
            }
            Instruction::Bit(bit, Operand::MemHl) => {
                self.schedule(6, MicroOp::transfer(Endpoint::Mem(Wide::HL), Endpoint::Reg(R8::Z)));
                self.schedule(7, MicroOp::Effect(Effect::BitTest(bit, R8::Z)));
                8
            }
            Instruction::Res(bit, Operand::Reg(r)) => {
                self.schedule(2, MicroOp::Effect(Effect::BitRes(bit, r)));
                4
            }
            Instruction::Res(bit, Operand::MemHl) => {
                self.schedule(6, MicroOp::transfer(Endpoint::Mem(Wide::HL), Endpoint::Reg(R8::Z)));
                self.schedule(8, MicroOp::Effect(Effect::BitRes(bit, R8::Z)));
                self.schedule(10, MicroOp::transfer(Endpoint::Reg(R8::Z), Endpoint::Mem(Wide::HL)));
                12
            }
            Instruction::Set(bit, Operand::Reg(r)) => {
                self.schedule(2, MicroOp::Effect(Effect::BitSet(bit, r)));
                4
            }
            Instruction::Set(bit, Operand::MemHl) => {
                self.schedule(6, MicroOp::transfer(Endpoint::Mem(Wide::HL), Endpoint::Reg(R8::Z)));
                self.schedule(8, MicroOp::Effect(Effect::BitSet(bit, R8::Z)));
                self.schedule(10, MicroOp::transfer(Endpoint::Reg(R8::Z), Endpoint::Mem(Wide::HL)));
                12
            }
        };

        Ticks::new(ticks)
    }
}
