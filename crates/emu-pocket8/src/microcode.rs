//! Micro-operations and the tick-indexed execution queue.
//!
//! An instruction handler translates a decoded instruction into
//! micro-operations scheduled at tick offsets, reproducing the
//! hardware's per-cycle bus behaviour. Micro-ops carry no timing of
//! their own; when they fire is entirely the queue's business.

use std::collections::HashMap;

use crate::alu::{AluOp, Rotate, ShiftOp};
use crate::registers::{R8, Wide};

/// One endpoint of a transfer: a named register, a named 16-bit
/// register, or the memory byte addressed by a named 16-bit register.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Reg(R8),
    Pair(Wide),
    Mem(Wide),
}

/// A named state transition. The whole effect set is a closed enum so
/// the scheduler can match it exhaustively; no effect captures state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    /// Begin the next fetch-decode-execute cycle.
    NextInstruction,
    /// Advance PC past one instruction byte (bounds-checked).
    IncPc,
    IncPair(Wide),
    DecPair(Wide),
    /// INC on an 8-bit cell, with flags (carry preserved).
    IncReg(R8),
    /// DEC on an 8-bit cell, with flags (carry preserved).
    DecReg(R8),
    /// A ← A op Z-latch, with flags.
    Alu(AluOp),
    /// HL ← HL + rr; N cleared, H/C from bits 11/15, Z preserved.
    AddHl(Wide),
    /// Accumulator rotate; zero flag always cleared.
    RotA(Rotate),
    /// Extended-table rotate/shift/swap on an 8-bit cell.
    Shift(ShiftOp, R8),
    /// Test a bit: Z from the complement, N cleared, H set, C kept.
    BitTest(u8, R8),
    BitRes(u8, R8),
    BitSet(u8, R8),
    /// PC ← WZ.
    Jump,
    /// PC ← PC + Z as signed offset.
    JumpRel,
    /// PC ← HL.
    JumpHl,
    /// Push PC onto the call stack, then PC ← WZ.
    Call,
    /// PC ← popped return address.
    Return,
    /// Call to a fixed low vector.
    Rst(u16),
    Halt,
    Cpl,
    Scf,
    Ccf,
    /// Zero the whole framebuffer atomically.
    ClearDisplay,
    /// XOR-draw sprite byte A at column B, row C; carry = collision.
    DrawSprite,
    DelayFromA,
    SoundFromA,
    DelayToA,
    KeysToA,
}

/// One atomic, single-tick unit of work.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MicroOp {
    /// Copy a byte or word between two endpoints.
    Transfer { src: Endpoint, dst: Endpoint },
    Effect(Effect),
}

impl MicroOp {
    #[must_use]
    pub const fn transfer(src: Endpoint, dst: Endpoint) -> Self {
        Self::Transfer { src, dst }
    }
}

/// Tick-indexed multimap of pending micro-operations.
///
/// Sparse on purpose: entries exist only for ticks with pending work,
/// so `drain` stays O(1) expected however far apart scheduled ticks
/// are. Within one tick, micro-ops fire in insertion order regardless
/// of who scheduled them.
pub struct ExecQueue {
    pending: HashMap<u64, Vec<MicroOp>>,
    /// Highest tick drained so far; scheduling is forward-only.
    current: u64,
}

impl ExecQueue {
    #[must_use]
    pub fn new() -> Self {
        Self {
            pending: HashMap::new(),
            current: 0,
        }
    }

    /// Append `op` to the list for `tick`.
    ///
    /// Scheduling at or before the last drained tick is a programming
    /// contract violation, not a recoverable state.
    pub fn schedule(&mut self, tick: u64, op: MicroOp) {
        assert!(
            tick > self.current,
            "micro-op scheduled at tick {tick}, at or before current tick {current}",
            current = self.current,
        );
        self.pending.entry(tick).or_default().push(op);
    }

    /// Remove and return everything scheduled for exactly `tick`, in
    /// the order it was scheduled.
    pub fn drain(&mut self, tick: u64) -> Vec<MicroOp> {
        self.current = self.current.max(tick);
        self.pending.remove(&tick).unwrap_or_default()
    }

    /// Discard all pending work and forget the tick horizon.
    pub fn clear(&mut self) {
        self.pending.clear();
        self.current = 0;
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

impl Default for ExecQueue {
    fn default() -> Self {
        Self::new()
    }
}
