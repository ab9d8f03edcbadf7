//! Register file.
//!
//! Eight-bit cells plus the two halves of the internal address latch WZ,
//! and the native 16-bit SP/PC. Pairs are views over two adjacent 8-bit
//! cells: writing a pair and writing its halves are observably equivalent.

use crate::memory::{PROGRAM_BASE, STACK_TOP};

/// Named 8-bit register cells, including the latch halves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum R8 {
    A,
    F,
    B,
    C,
    D,
    E,
    H,
    L,
    /// High half of the internal address latch.
    W,
    /// Low half of the internal address latch.
    Z,
}

/// Named 16-bit registers and pair views.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Wide {
    AF,
    BC,
    DE,
    HL,
    SP,
    PC,
    /// Internal address latch: scratch for values in transit between
    /// memory and registers during a multi-tick transfer.
    WZ,
}

/// Register file. Also serves as the observable snapshot returned by
/// `Console::registers()`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Registers {
    pub a: u8,
    pub f: u8,
    pub b: u8,
    pub c: u8,
    pub d: u8,
    pub e: u8,
    pub h: u8,
    pub l: u8,

    /// Address latch halves.
    pub w: u8,
    pub z: u8,

    pub sp: u16,
    pub pc: u16,
}

impl Registers {
    /// Power-on state: zeroed registers, PC at the program base, SP at
    /// the top of working RAM.
    #[must_use]
    pub fn power_on() -> Self {
        Self {
            pc: PROGRAM_BASE,
            sp: STACK_TOP,
            ..Self::default()
        }
    }

    #[must_use]
    pub const fn get8(&self, r: R8) -> u8 {
        match r {
            R8::A => self.a,
            R8::F => self.f,
            R8::B => self.b,
            R8::C => self.c,
            R8::D => self.d,
            R8::E => self.e,
            R8::H => self.h,
            R8::L => self.l,
            R8::W => self.w,
            R8::Z => self.z,
        }
    }

    pub const fn set8(&mut self, r: R8, value: u8) {
        match r {
            R8::A => self.a = value,
            // Only the high nibble of F exists; the rest reads as zero.
            R8::F => self.f = value & 0xF0,
            R8::B => self.b = value,
            R8::C => self.c = value,
            R8::D => self.d = value,
            R8::E => self.e = value,
            R8::H => self.h = value,
            R8::L => self.l = value,
            R8::W => self.w = value,
            R8::Z => self.z = value,
        }
    }

    #[must_use]
    pub const fn get16(&self, w: Wide) -> u16 {
        match w {
            Wide::AF => (self.a as u16) << 8 | self.f as u16,
            Wide::BC => (self.b as u16) << 8 | self.c as u16,
            Wide::DE => (self.d as u16) << 8 | self.e as u16,
            Wide::HL => (self.h as u16) << 8 | self.l as u16,
            Wide::SP => self.sp,
            Wide::PC => self.pc,
            Wide::WZ => (self.w as u16) << 8 | self.z as u16,
        }
    }

    /// Pair writes hit both halves within one logical step.
    pub const fn set16(&mut self, w: Wide, value: u16) {
        let hi = (value >> 8) as u8;
        let lo = value as u8;
        match w {
            Wide::AF => {
                self.a = hi;
                self.f = lo & 0xF0;
            }
            Wide::BC => {
                self.b = hi;
                self.c = lo;
            }
            Wide::DE => {
                self.d = hi;
                self.e = lo;
            }
            Wide::HL => {
                self.h = hi;
                self.l = lo;
            }
            Wide::SP => self.sp = value,
            Wide::PC => self.pc = value,
            Wide::WZ => {
                self.w = hi;
                self.z = lo;
            }
        }
    }

    /// Get the BC register pair.
    #[must_use]
    pub const fn bc(&self) -> u16 {
        self.get16(Wide::BC)
    }

    /// Get the DE register pair.
    #[must_use]
    pub const fn de(&self) -> u16 {
        self.get16(Wide::DE)
    }

    /// Get the HL register pair.
    #[must_use]
    pub const fn hl(&self) -> u16 {
        self.get16(Wide::HL)
    }

    /// Get the internal address latch.
    #[must_use]
    pub const fn wz(&self) -> u16 {
        self.get16(Wide::WZ)
    }
}
