//! Cycle-accurate Pocket-8 console core.
//!
//! The console is a single-owner state machine driven one tick at a
//! time: each instruction is decoded once, translated into
//! micro-operations scheduled at exact tick offsets, and executed as
//! those ticks arrive. The driver owns the loop; the core never blocks,
//! never spawns, and touches no wall-clock time, so a program replayed
//! from the same state is bit-for-bit deterministic.
//!
//! Peripherals are exposed as plain state for collaborators to read and
//! write between tick batches: the framebuffer for a display frontend,
//! the keypad latch for input, and the delay/sound timers for the
//! fixed-rate 60 Hz domain.

pub mod alu;
mod console;
pub mod decode;
mod error;
pub mod flags;
mod framebuffer;
mod keypad;
mod memory;
pub mod microcode;
mod registers;
mod stack;
mod timers;

pub use console::{Console, MASTER_CLOCK, TIMER_HZ};
pub use decode::{Instruction, PREFIX};
pub use error::Error;
pub use framebuffer::{Framebuffer, HEIGHT, WIDTH};
pub use memory::{MEM_SIZE, PROGRAM_BASE, ROM_END, STACK_TOP};
pub use registers::{R8, Registers, Wide};
pub use stack::STACK_DEPTH;
pub use timers::Timers;
