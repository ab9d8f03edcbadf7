//! Core types for cycle-accurate emulation.
//!
//! A machine in this workspace runs two independent clock domains: the
//! variable-length instruction clock, advanced one tick at a time by the
//! driver, and (where the hardware has one) a fixed-rate timer clock
//! advanced at its own cadence. The two never share a counter.

mod clock;
mod tickable;
mod ticks;

pub use clock::MasterClock;
pub use tickable::Tickable;
pub use ticks::Ticks;
