//! Flag register bit positions.
//!
//! Only the high nibble of F exists in silicon; the low nibble always
//! reads back as zero.

/// Zero flag.
pub const ZF: u8 = 0x80;
/// Subtract flag.
pub const NF: u8 = 0x40;
/// Half-carry flag (carry out of bit 3).
pub const HF: u8 = 0x20;
/// Carry flag. Also doubles as the sprite collision flag.
pub const CF: u8 = 0x10;
