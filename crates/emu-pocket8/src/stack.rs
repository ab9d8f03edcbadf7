//! Bounded call stack of return addresses.

use crate::error::Error;

/// Maximum nesting depth for subroutine calls.
pub const STACK_DEPTH: usize = 16;

/// LIFO of return addresses for subroutine linkage. Return addresses
/// never transit through memory; overflow and underflow are distinct
/// errors, never wrapped or masked.
pub struct CallStack {
    entries: [u16; STACK_DEPTH],
    depth: usize,
}

impl CallStack {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: [0; STACK_DEPTH],
            depth: 0,
        }
    }

    #[must_use]
    pub const fn depth(&self) -> usize {
        self.depth
    }

    /// Push a return address. A full stack is left untouched.
    pub const fn push(&mut self, address: u16) -> Result<(), Error> {
        if self.depth == STACK_DEPTH {
            return Err(Error::StackOverflow);
        }
        self.entries[self.depth] = address;
        self.depth += 1;
        Ok(())
    }

    /// Pop the most recent return address.
    pub const fn pop(&mut self) -> Result<u16, Error> {
        if self.depth == 0 {
            return Err(Error::StackUnderflow);
        }
        self.depth -= 1;
        Ok(self.entries[self.depth])
    }

    pub const fn clear(&mut self) {
        self.depth = 0;
    }
}

impl Default for CallStack {
    fn default() -> Self {
        Self::new()
    }
}
