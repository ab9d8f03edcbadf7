//! Trait for components advanced by a fixed-rate clock.

use crate::Ticks;

/// A component advanced by clock ticks at a fixed rate.
///
/// Used for hardware clocked independently of the instruction stream,
/// such as 60 Hz delay/sound timers. The driver calls `tick()` at the
/// component's own cadence; the instruction clock never drives it.
pub trait Tickable {
    /// Advance the component by one tick of its own clock.
    fn tick(&mut self);

    /// Advance the component by multiple ticks.
    ///
    /// Default implementation calls `tick()` in a loop. Components may
    /// override for efficiency, but must produce identical results.
    fn tick_n(&mut self, count: Ticks) {
        for _ in 0..count.get() {
            self.tick();
        }
    }
}
