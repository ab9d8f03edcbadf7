//! Addressable memory: 4 KiB, ROM low, working RAM high.

use crate::error::Error;

/// Total addressable bytes.
pub const MEM_SIZE: usize = 0x1000;
/// First address past the read-only program region.
pub const ROM_END: u16 = 0x800;
/// Power-on program counter; ROM images are conventionally based here,
/// leaving `0x000..0x100` for the RST vectors.
pub const PROGRAM_BASE: u16 = 0x100;
/// Power-on stack pointer (top of working RAM).
pub const STACK_TOP: u16 = 0xFFE;

/// Byte-addressable space. Addresses outside `0x000..=0xFFF` fail with
/// a bounds error; the hardware does not mirror or wrap.
pub struct Memory {
    bytes: [u8; MEM_SIZE],
}

impl Memory {
    #[must_use]
    pub const fn new() -> Self {
        Self { bytes: [0; MEM_SIZE] }
    }

    /// Validate an address without touching memory. Used by control
    /// transfers to keep PC and SP inside the address space.
    pub const fn check(address: u16) -> Result<(), Error> {
        if (address as usize) < MEM_SIZE {
            Ok(())
        } else {
            Err(Error::OutOfRange { address })
        }
    }

    pub const fn read(&self, address: u16) -> Result<u8, Error> {
        if (address as usize) < MEM_SIZE {
            Ok(self.bytes[address as usize])
        } else {
            Err(Error::OutOfRange { address })
        }
    }

    /// Write a byte. Writes into the ROM region are discarded, as mask
    /// ROM discards them; the address is still bounds-checked.
    pub const fn write(&mut self, address: u16, value: u8) -> Result<(), Error> {
        if (address as usize) >= MEM_SIZE {
            return Err(Error::OutOfRange { address });
        }
        if address >= ROM_END {
            self.bytes[address as usize] = value;
        }
        Ok(())
    }

    /// Copy a program image into the ROM region.
    pub fn load_rom(&mut self, base: u16, image: &[u8]) -> Result<(), Error> {
        let end = base as usize + image.len();
        if base >= ROM_END || end > ROM_END as usize {
            return Err(Error::OutOfRange { address: end as u16 });
        }
        self.bytes[base as usize..end].copy_from_slice(image);
        Ok(())
    }
}

impl Default for Memory {
    fn default() -> Self {
        Self::new()
    }
}
