//! Fixed-timestep frame driver.
//!
//! Wall-clock time is accumulated per frame and drained in whole ticks of
//! `1 / target_tps` seconds. The speed multiplier scales the accumulated time
//! and `max_ticks_per_frame` caps how many ticks one frame may run, so a slow
//! frame cannot trigger a runaway catch-up spiral. Pausing drops accumulated
//! time instead of banking it.

use std::time::Duration;

#[derive(Debug, Clone)]
pub struct FrameDriver {
    tick_length: Duration,
    accumulator: Duration,
    speed: u32,
    max_ticks_per_frame: u32,
    paused: bool,
}

impl FrameDriver {
    #[must_use]
    pub fn new(target_tps: u64, max_ticks_per_frame: u32) -> Self {
        let tps = target_tps.max(1);
        Self {
            tick_length: Duration::from_nanos(1_000_000_000 / tps),
            accumulator: Duration::ZERO,
            speed: 1,
            max_ticks_per_frame: max_ticks_per_frame.max(1),
            paused: false,
        }
    }

    #[must_use]
    pub fn tick_length(&self) -> Duration {
        self.tick_length
    }

    pub fn set_speed(&mut self, speed: u32) {
        self.speed = speed.clamp(1, self.max_ticks_per_frame);
    }

    #[must_use]
    pub fn speed(&self) -> u32 {
        self.speed
    }

    pub fn set_paused(&mut self, paused: bool) {
        self.paused = paused;
        if paused {
            self.accumulator = Duration::ZERO;
        }
    }

    #[must_use]
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Adds one frame's elapsed time and returns how many ticks to run now.
    pub fn advance(&mut self, elapsed: Duration) -> u32 {
        if self.paused {
            return 0;
        }
        self.accumulator += elapsed * self.speed;
        let mut ticks = 0;
        while self.accumulator >= self.tick_length && ticks < self.max_ticks_per_frame {
            self.accumulator -= self.tick_length;
            ticks += 1;
        }
        if ticks == self.max_ticks_per_frame {
            // Drop the backlog rather than carrying it into the next frame.
            self.accumulator = self.accumulator.min(self.tick_length);
        }
        ticks
    }

    pub fn reset(&mut self) {
        self.accumulator = Duration::ZERO;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accumulates_partial_frames() {
        let mut d = FrameDriver::new(10, 8);
        assert_eq!(d.advance(Duration::from_millis(60)), 0);
        assert_eq!(d.advance(Duration::from_millis(60)), 1);
        assert_eq!(d.advance(Duration::from_millis(200)), 2);
    }

    #[test]
    fn test_pause_skips_ticks() {
        let mut d = FrameDriver::new(10, 8);
        d.set_paused(true);
        assert_eq!(d.advance(Duration::from_secs(5)), 0);
        d.set_paused(false);
        assert_eq!(d.advance(Duration::from_millis(100)), 1);
    }

    #[test]
    fn test_speed_is_capped() {
        let mut d = FrameDriver::new(10, 4);
        d.set_speed(100);
        assert_eq!(d.speed(), 4);
        assert_eq!(d.advance(Duration::from_secs(10)), 4);
        assert!(d.advance(Duration::ZERO) <= 1);
    }
}
