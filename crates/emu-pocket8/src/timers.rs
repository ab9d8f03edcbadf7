//! Delay and sound timer registers.
//!
//! These live in the fixed-rate 60 Hz clock domain: the driver advances
//! them through `Tickable` at its own cadence, never from the
//! instruction clock. The audio collaborator plays while `sound()` is
//! non-zero.

use emu_core::Tickable;

#[derive(Debug, Default, Clone, Copy)]
pub struct Timers {
    delay: u8,
    sound: u8,
}

impl Timers {
    #[must_use]
    pub const fn new() -> Self {
        Self { delay: 0, sound: 0 }
    }

    #[must_use]
    pub const fn delay(&self) -> u8 {
        self.delay
    }

    #[must_use]
    pub const fn sound(&self) -> u8 {
        self.sound
    }

    pub const fn set_delay(&mut self, value: u8) {
        self.delay = value;
    }

    pub const fn set_sound(&mut self, value: u8) {
        self.sound = value;
    }

    pub const fn reset(&mut self) {
        self.delay = 0;
        self.sound = 0;
    }
}

impl Tickable for Timers {
    /// One 60 Hz step: both registers count down and hold at zero.
    fn tick(&mut self) {
        self.delay = self.delay.saturating_sub(1);
        self.sound = self.sound.saturating_sub(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use emu_core::Ticks;

    #[test]
    fn count_down_saturates_at_zero() {
        let mut timers = Timers::new();
        timers.set_delay(2);
        timers.set_sound(1);

        timers.tick();
        assert_eq!(timers.delay(), 1);
        assert_eq!(timers.sound(), 0);

        timers.tick_n(Ticks::new(5));
        assert_eq!(timers.delay(), 0);
        assert_eq!(timers.sound(), 0);
    }
}
