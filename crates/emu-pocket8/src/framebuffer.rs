//! One-bit framebuffer, 64×32.
//!
//! The display collaborator reads this; the core exposes it read-only.
//! Only the CLS and SPR instructions write it.

/// Pixels per row.
pub const WIDTH: usize = 64;
/// Rows.
pub const HEIGHT: usize = 32;

/// 32 rows of 64 one-bit pixels. Column 0 is the row's most
/// significant bit.
pub struct Framebuffer {
    rows: [u64; HEIGHT],
}

impl Framebuffer {
    #[must_use]
    pub const fn new() -> Self {
        Self { rows: [0; HEIGHT] }
    }

    /// Zero every pixel.
    pub const fn clear(&mut self) {
        self.rows = [0; HEIGHT];
    }

    #[must_use]
    pub const fn row(&self, y: usize) -> u64 {
        self.rows[y]
    }

    #[must_use]
    pub const fn pixel(&self, x: usize, y: usize) -> bool {
        (self.rows[y] >> (WIDTH - 1 - x)) & 1 != 0
    }

    /// XOR an 8-pixel strip into a row. The starting column wraps; a
    /// row index past the bottom draws nothing. Returns true when a lit
    /// pixel was erased (sprite collision).
    pub fn draw_byte(&mut self, x: u8, y: u8, bits: u8) -> bool {
        let y = y as usize;
        if y >= HEIGHT {
            return false;
        }
        let strip = (u64::from(bits) << (WIDTH - 8)).rotate_right(u32::from(x) % WIDTH as u32);
        let collision = self.rows[y] & strip != 0;
        self.rows[y] ^= strip;
        collision
    }

    /// Light every pixel. Test scaffolding only.
    #[cfg(any(test, feature = "test-utils"))]
    pub const fn fill(&mut self) {
        self.rows = [u64::MAX; HEIGHT];
    }
}

impl Default for Framebuffer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn draw_sets_and_xor_erases() {
        let mut fb = Framebuffer::new();
        assert!(!fb.draw_byte(0, 0, 0xFF));
        for x in 0..8 {
            assert!(fb.pixel(x, 0));
        }
        assert!(!fb.pixel(8, 0));

        // Same sprite again: collision, pixels erased.
        assert!(fb.draw_byte(0, 0, 0xFF));
        assert_eq!(fb.row(0), 0);
    }

    #[test]
    fn draw_wraps_the_column() {
        let mut fb = Framebuffer::new();
        fb.draw_byte(60, 3, 0xFF);
        assert!(fb.pixel(63, 3));
        assert!(fb.pixel(0, 3));
        assert!(fb.pixel(3, 3));
        assert!(!fb.pixel(4, 3));
    }

    #[test]
    fn draw_below_bottom_is_a_no_op() {
        let mut fb = Framebuffer::new();
        assert!(!fb.draw_byte(0, 32, 0xFF));
        for y in 0..HEIGHT {
            assert_eq!(fb.row(y), 0);
        }
    }

    #[test]
    fn clear_zeroes_everything() {
        let mut fb = Framebuffer::new();
        fb.fill();
        fb.clear();
        for y in 0..HEIGHT {
            assert_eq!(fb.row(y), 0);
        }
    }
}
