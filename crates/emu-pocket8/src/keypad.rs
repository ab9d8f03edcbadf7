//! Keypad input latch.
//!
//! One bit per key. The input collaborator writes the whole mask before
//! each tick batch; the core only reads it (LD A,KEYS) and never polls.

#[derive(Debug, Default, Clone, Copy)]
pub struct Keypad {
    mask: u8,
}

impl Keypad {
    #[must_use]
    pub const fn new() -> Self {
        Self { mask: 0 }
    }

    pub const fn set(&mut self, mask: u8) {
        self.mask = mask;
    }

    #[must_use]
    pub const fn get(&self) -> u8 {
        self.mask
    }
}
