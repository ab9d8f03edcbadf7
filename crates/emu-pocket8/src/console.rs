//! The console: owns all state and drives the tick loop.

mod execute;

use emu_core::{MasterClock, Ticks};

use crate::alu;
use crate::decode::{self, Cond};
use crate::error::Error;
use crate::flags::{CF, HF, NF, ZF};
use crate::framebuffer::Framebuffer;
use crate::keypad::Keypad;
use crate::memory::Memory;
use crate::microcode::{Effect, Endpoint, ExecQueue, MicroOp};
use crate::registers::{Registers, Wide};
use crate::stack::CallStack;
use crate::timers::Timers;

/// Instruction clock frequency.
pub const MASTER_CLOCK: MasterClock = MasterClock::new(1_048_576);

/// Fixed-rate timer domain frequency, independent of the instruction
/// clock.
pub const TIMER_HZ: u64 = 60;

/// The whole machine: register file, memory, call stack, execution
/// queue, and peripherals, exclusively owned and driven by `tick()`.
///
/// Each `tick()` call advances exactly one tick of the instruction
/// clock: due micro-operations fire in the order they were scheduled,
/// then the counter advances. Instruction boundaries re-enter the
/// fetch-decode-execute cycle through a scheduled effect, so re-running
/// the same program from the same state always produces the same
/// mutation sequence.
pub struct Console {
    pub(crate) regs: Registers,
    pub(crate) memory: Memory,
    pub(crate) stack: CallStack,
    pub(crate) queue: ExecQueue,
    pub(crate) framebuffer: Framebuffer,
    pub(crate) keypad: Keypad,
    pub(crate) timers: Timers,

    /// Absolute tick counter: the sole driver of scheduling. Never
    /// decremented except by `reset()`.
    tick_counter: u64,
    /// Armed by the prefix byte for exactly the next fetch.
    extended: bool,
    halted: bool,
    /// Cleared until the first tick seeds a fetch-decode cycle.
    started: bool,
}

impl Console {
    #[must_use]
    pub fn new() -> Self {
        Self {
            regs: Registers::power_on(),
            memory: Memory::new(),
            stack: CallStack::new(),
            queue: ExecQueue::new(),
            framebuffer: Framebuffer::new(),
            keypad: Keypad::new(),
            timers: Timers::new(),
            tick_counter: 0,
            extended: false,
            halted: false,
            started: false,
        }
    }

    /// Copy a program image into the ROM region. Only legal before the
    /// first tick (or after a reset).
    pub fn load_rom(&mut self, base: u16, image: &[u8]) -> Result<(), Error> {
        assert!(!self.started, "ROM loaded after the first tick");
        self.memory.load_rom(base, image)
    }

    /// Advance one tick of the instruction clock.
    ///
    /// Errors terminate the in-flight instruction: its remaining
    /// micro-ops are discarded, everything else is left as it was, and
    /// the console idles until `resume()` or `skip()`.
    pub fn tick(&mut self) -> Result<(), Error> {
        let result = self.tick_inner();
        if result.is_err() {
            self.queue.clear();
        }
        self.tick_counter += 1;
        result
    }

    fn tick_inner(&mut self) -> Result<(), Error> {
        if !self.started {
            self.started = true;
            self.begin_cycle()?;
        }
        for op in self.queue.drain(self.tick_counter) {
            self.apply(op)?;
        }
        Ok(())
    }

    /// Restore power-on state: registers, queue, call stack,
    /// framebuffer, timers, keys, tick counter, prefix state. ROM (and
    /// RAM) contents survive, as with a reset button. Idempotent.
    pub fn reset(&mut self) {
        self.regs = Registers::power_on();
        self.queue.clear();
        self.stack.clear();
        self.framebuffer.clear();
        self.timers.reset();
        self.keypad.set(0);
        self.tick_counter = 0;
        self.extended = false;
        self.halted = false;
        self.started = false;
    }

    /// Resume fetching at the current PC after an error or HALT.
    pub fn resume(&mut self) {
        self.halted = false;
        self.queue.clear();
        // Re-sync the queue horizon so scheduling stays forward-only.
        let _ = self.queue.drain(self.tick_counter);
        self.started = false;
    }

    /// Skip the byte at PC (e.g. an unknown opcode) and resume after it.
    pub fn skip(&mut self) -> Result<(), Error> {
        let next = self.regs.pc.wrapping_add(1);
        Memory::check(next)?;
        self.regs.pc = next;
        self.resume();
        Ok(())
    }

    /// One fetch-decode step: fetch the byte at PC, decode it, schedule
    /// the PC increment as the instruction's first effect, and let the
    /// handler schedule the rest. The handler's declared duration
    /// places the next fetch-decode cycle.
    fn begin_cycle(&mut self) -> Result<(), Error> {
        if self.halted {
            return Ok(());
        }

        let pc = self.regs.pc;
        let opcode = self.memory.read(pc)?;

        if !self.extended && opcode == decode::PREFIX {
            // The prefix does no work of its own: it arms the extended
            // table for exactly the next fetched byte.
            self.extended = true;
            self.schedule(1, MicroOp::Effect(Effect::IncPc));
            self.schedule(4, MicroOp::Effect(Effect::NextInstruction));
            return Ok(());
        }

        let instruction = decode::decode(opcode, self.extended, pc)?;
        self.extended = false;

        self.schedule(1, MicroOp::Effect(Effect::IncPc));
        let duration = self.execute(instruction);
        self.schedule(duration.get(), MicroOp::Effect(Effect::NextInstruction));
        Ok(())
    }

    /// Schedule a micro-op at an offset from the current tick.
    pub(crate) fn schedule(&mut self, offset: u64, op: MicroOp) {
        self.queue.schedule(self.tick_counter + offset, op);
    }

    /// Evaluate a branch condition against the flags as they stand now
    /// (i.e. at decode time).
    pub(crate) fn condition(&self, cond: Cond) -> bool {
        match cond {
            Cond::Always => true,
            Cond::NotZero => self.regs.f & ZF == 0,
            Cond::Zero => self.regs.f & ZF != 0,
            Cond::NotCarry => self.regs.f & CF == 0,
            Cond::Carry => self.regs.f & CF != 0,
        }
    }

    fn apply(&mut self, op: MicroOp) -> Result<(), Error> {
        match op {
            MicroOp::Transfer { src, dst } => self.transfer(src, dst),
            MicroOp::Effect(effect) => self.effect(effect),
        }
    }

    fn transfer(&mut self, src: Endpoint, dst: Endpoint) -> Result<(), Error> {
        match (src, dst) {
            (Endpoint::Reg(s), Endpoint::Reg(d)) => {
                let v = self.regs.get8(s);
                self.regs.set8(d, v);
                Ok(())
            }
            (Endpoint::Pair(s), Endpoint::Pair(d)) => {
                let v = self.regs.get16(s);
                self.regs.set16(d, v);
                Ok(())
            }
            (Endpoint::Mem(p), Endpoint::Reg(d)) => {
                let v = self.memory.read(self.regs.get16(p))?;
                self.regs.set8(d, v);
                Ok(())
            }
            (Endpoint::Reg(s), Endpoint::Mem(p)) => {
                self.memory.write(self.regs.get16(p), self.regs.get8(s))
            }
            (src, dst) => unreachable!("transfer {src:?} -> {dst:?} is never scheduled"),
        }
    }

    /// Commit a control transfer, keeping PC inside the address space.
    fn jump_to(&mut self, target: u16) -> Result<(), Error> {
        Memory::check(target)?;
        self.regs.pc = target;
        Ok(())
    }

    fn effect(&mut self, effect: Effect) -> Result<(), Error> {
        match effect {
            Effect::NextInstruction => return self.begin_cycle(),
            Effect::IncPc => {
                let next = self.regs.pc.wrapping_add(1);
                Memory::check(next)?;
                self.regs.pc = next;
            }
            Effect::IncPair(w) => {
                let next = self.regs.get16(w).wrapping_add(1);
                if w == Wide::SP {
                    Memory::check(next)?;
                }
                self.regs.set16(w, next);
            }
            Effect::DecPair(w) => {
                let next = self.regs.get16(w).wrapping_sub(1);
                if w == Wide::SP {
                    Memory::check(next)?;
                }
                self.regs.set16(w, next);
            }
            Effect::IncReg(r) => {
                let result = alu::inc8(self.regs.get8(r));
                self.regs.set8(r, result.value);
                self.regs.f = (self.regs.f & CF) | result.flags;
            }
            Effect::DecReg(r) => {
                let result = alu::dec8(self.regs.get8(r));
                self.regs.set8(r, result.value);
                self.regs.f = (self.regs.f & CF) | result.flags;
            }
            Effect::Alu(op) => {
                let carry = self.regs.f & CF != 0;
                let result = alu::apply(op, self.regs.a, self.regs.z, carry);
                self.regs.a = result.value;
                self.regs.f = result.flags;
            }
            Effect::AddHl(w) => {
                let hl = self.regs.hl();
                let rhs = self.regs.get16(w);
                let (sum, carry) = hl.overflowing_add(rhs);
                let mut f = self.regs.f & ZF;
                if (hl & 0x0FFF) + (rhs & 0x0FFF) > 0x0FFF {
                    f |= HF;
                }
                if carry {
                    f |= CF;
                }
                self.regs.set16(Wide::HL, sum);
                self.regs.f = f;
            }
            Effect::RotA(rot) => {
                let carry = self.regs.f & CF != 0;
                let result = alu::shift(rot.shift_op(), self.regs.a, carry);
                self.regs.a = result.value;
                self.regs.f = result.flags & !ZF;
            }
            Effect::Shift(op, r) => {
                let carry = self.regs.f & CF != 0;
                let result = alu::shift(op, self.regs.get8(r), carry);
                self.regs.set8(r, result.value);
                self.regs.f = result.flags;
            }
            Effect::BitTest(bit, r) => {
                let set = self.regs.get8(r) & (1 << bit) != 0;
                let z = if set { 0 } else { ZF };
                self.regs.f = (self.regs.f & CF) | HF | z;
            }
            Effect::BitRes(bit, r) => {
                let v = self.regs.get8(r) & !(1 << bit);
                self.regs.set8(r, v);
            }
            Effect::BitSet(bit, r) => {
                let v = self.regs.get8(r) | (1 << bit);
                self.regs.set8(r, v);
            }
            Effect::Jump => return self.jump_to(self.regs.wz()),
            Effect::JumpRel => {
                let offset = self.regs.z as i8;
                let target = self.regs.pc.wrapping_add(offset as u16);
                return self.jump_to(target);
            }
            Effect::JumpHl => return self.jump_to(self.regs.hl()),
            Effect::Call => {
                let target = self.regs.wz();
                // Validate the target before touching the stack so a
                // failed call corrupts nothing.
                Memory::check(target)?;
                self.stack.push(self.regs.pc)?;
                self.regs.pc = target;
            }
            Effect::Return => {
                let target = self.stack.pop()?;
                self.regs.pc = target;
            }
            Effect::Rst(vector) => {
                self.stack.push(self.regs.pc)?;
                self.regs.pc = vector;
            }
            Effect::Halt => self.halted = true,
            Effect::Cpl => {
                self.regs.a = !self.regs.a;
                self.regs.f |= NF | HF;
            }
            Effect::Scf => self.regs.f = (self.regs.f & ZF) | CF,
            Effect::Ccf => self.regs.f = (self.regs.f & ZF) | ((self.regs.f ^ CF) & CF),
            Effect::ClearDisplay => self.framebuffer.clear(),
            Effect::DrawSprite => {
                let collision = self.framebuffer.draw_byte(self.regs.b, self.regs.c, self.regs.a);
                if collision {
                    self.regs.f |= CF;
                } else {
                    self.regs.f &= !CF;
                }
            }
            Effect::DelayFromA => self.timers.set_delay(self.regs.a),
            Effect::SoundFromA => self.timers.set_sound(self.regs.a),
            Effect::DelayToA => self.regs.a = self.timers.delay(),
            Effect::KeysToA => self.regs.a = self.keypad.get(),
        }
        Ok(())
    }

    // === Observation and collaborator accessors ===

    /// Total ticks elapsed since construction or reset.
    #[must_use]
    pub const fn total_ticks(&self) -> Ticks {
        Ticks::new(self.tick_counter)
    }

    /// Snapshot of the register file.
    #[must_use]
    pub const fn registers(&self) -> Registers {
        self.regs
    }

    #[must_use]
    pub const fn pc(&self) -> u16 {
        self.regs.pc
    }

    #[must_use]
    pub const fn is_halted(&self) -> bool {
        self.halted
    }

    /// Read-only view for the display collaborator.
    #[must_use]
    pub const fn framebuffer(&self) -> &Framebuffer {
        &self.framebuffer
    }

    /// Input collaborator: latch the key bitmask before a tick batch.
    pub const fn set_keys(&mut self, mask: u8) {
        self.keypad.set(mask);
    }

    /// Audio collaborator: play while non-zero.
    #[must_use]
    pub const fn sound(&self) -> u8 {
        self.timers.sound()
    }

    #[must_use]
    pub const fn delay(&self) -> u8 {
        self.timers.delay()
    }

    /// The fixed-rate timer domain, for the driver to advance at
    /// `TIMER_HZ` through `Tickable`.
    pub const fn timers_mut(&mut self) -> &mut Timers {
        &mut self.timers
    }

    /// Current call stack depth.
    #[must_use]
    pub const fn call_depth(&self) -> usize {
        self.stack.depth()
    }

    // === Test utilities ===
    // These bypass cycle-accurate execution; test builds only.

    #[cfg(feature = "test-utils")]
    pub const fn set_pc(&mut self, value: u16) {
        self.regs.pc = value;
    }

    #[cfg(feature = "test-utils")]
    pub const fn set_sp(&mut self, value: u16) {
        self.regs.sp = value;
    }

    #[cfg(feature = "test-utils")]
    pub const fn set_flags(&mut self, value: u8) {
        self.regs.f = value & 0xF0;
    }

    #[cfg(feature = "test-utils")]
    pub const fn framebuffer_mut(&mut self) -> &mut Framebuffer {
        &mut self.framebuffer
    }
}

impl Default for Console {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reset_is_idempotent() {
        let mut console = Console::new();
        console.load_rom(0x100, &[0x3E, 0x42, 0x76]).expect("fits");
        for _ in 0..20 {
            console.tick().expect("tick");
        }

        console.reset();
        let after_one = (console.registers(), console.total_ticks());
        console.reset();
        let after_two = (console.registers(), console.total_ticks());

        assert_eq!(after_one, after_two);
        assert_eq!(console.total_ticks(), Ticks::ZERO);
        assert_eq!(console.registers(), Registers::power_on());
        assert!(console.queue.is_empty());
    }

    #[test]
    fn reset_preserves_rom() {
        let mut console = Console::new();
        console.load_rom(0x100, &[0x3E, 0x42, 0x76]).expect("fits");
        for _ in 0..20 {
            console.tick().expect("tick");
        }
        console.reset();

        // The same program runs again from power-on state.
        for _ in 0..20 {
            console.tick().expect("tick");
        }
        assert_eq!(console.registers().a, 0x42);
        assert!(console.is_halted());
    }

    #[test]
    fn unknown_opcode_surfaces_without_scheduling() {
        let mut console = Console::new();
        console.load_rom(0x100, &[0xFD]).expect("fits");

        let err = console.tick().expect_err("unknown opcode");
        assert_eq!(err, Error::UnknownOpcode { opcode: 0xFD, address: 0x100 });
        // Nothing was scheduled: PC untouched, queue idle.
        assert_eq!(console.pc(), 0x100);
        assert!(console.queue.is_empty());

        // The driver decides; skipping resumes cleanly.
        console.skip().expect("in range");
        assert_eq!(console.pc(), 0x101);
        console.tick().expect("nop at 0x101");
    }

    #[test]
    fn fetch_out_of_range_after_runaway_pc() {
        let mut console = Console::new();
        console.load_rom(0x100, &[0xC3, 0x0F, 0xFF]).expect("fits"); // JP 0xFFF
        for _ in 0..16 {
            console.tick().expect("jump in range");
        }
        assert_eq!(console.pc(), 0xFFF);
        // The byte at 0xFFF is zero (NOP); advancing past it leaves
        // the address space.
        let err = (0..8).find_map(|_| console.tick().err());
        assert_eq!(err, Some(Error::OutOfRange { address: 0x1000 }));
    }

    #[test]
    fn halt_goes_idle_but_keeps_counting() {
        let mut console = Console::new();
        console.load_rom(0x100, &[0x76]).expect("fits");
        for _ in 0..12 {
            console.tick().expect("tick");
        }
        assert!(console.is_halted());
        assert_eq!(console.total_ticks(), Ticks::new(12));
        assert!(console.queue.is_empty());
    }
}
