//! Error taxonomy for the console core.

use std::fmt;

/// Errors surfaced to the driver from `Console::tick()`.
///
/// Arithmetic never errors: results wrap to their declared bit width,
/// matching fixed-width hardware. Everything here terminates the current
/// instruction and leaves unrelated state untouched; the driver decides
/// whether to halt, skip, or substitute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// Decode failure: the byte at `address` maps to no instruction.
    UnknownOpcode { opcode: u8, address: u16 },
    /// Memory access outside the addressable space.
    OutOfRange { address: u16 },
    /// Subroutine call beyond the call stack's depth.
    StackOverflow,
    /// Subroutine return with an empty call stack.
    StackUnderflow,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownOpcode { opcode, address } => {
                write!(f, "unknown opcode {opcode:#04X} at {address:#06X}")
            }
            Self::OutOfRange { address } => {
                write!(f, "memory access out of range: {address:#06X}")
            }
            Self::StackOverflow => write!(f, "call stack overflow"),
            Self::StackUnderflow => write!(f, "call stack underflow"),
        }
    }
}

impl std::error::Error for Error {}
