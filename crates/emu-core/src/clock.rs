//! Master clock configuration.

use crate::Ticks;

/// Master clock configuration for a machine.
///
/// The driver loop uses this to pace real time: how many instruction
/// ticks to run per displayed frame, and how often to advance the
/// fixed-rate timer domain relative to the frame rate.
#[derive(Debug, Clone, Copy)]
pub struct MasterClock {
    /// Instruction clock frequency in Hz.
    pub frequency_hz: u64,
}

impl MasterClock {
    #[must_use]
    pub const fn new(frequency_hz: u64) -> Self {
        Self { frequency_hz }
    }

    /// Ticks per frame at the given frame rate (integer division).
    #[must_use]
    pub const fn ticks_per_frame(&self, frames_per_second: u64) -> Ticks {
        Ticks::new(self.frequency_hz / frames_per_second)
    }
}
