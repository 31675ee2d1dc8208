pub mod scenario;
pub mod state;

pub use scenario::Scenario;
pub use state::App;

use anyhow::Result;
use std::time::{Duration, Instant};

impl App {
    /// Runs `ticks` ticks back to back, handing the diagnostics of each to
    /// `sink`. Stops early on an invariant violation.
    pub fn run_ticks<F>(&mut self, ticks: u64, mut sink: F) -> Result<()>
    where
        F: FnMut(&App) -> Result<()>,
    {
        for _ in 0..ticks {
            if !self.running {
                break;
            }
            self.tick()?;
            sink(self)?;
        }
        Ok(())
    }

    /// Paces ticks against wall-clock time through the frame driver until
    /// `ticks` have run or the app stops.
    pub fn run_realtime<F>(&mut self, ticks: u64, mut sink: F) -> Result<()>
    where
        F: FnMut(&App) -> Result<()>,
    {
        let frame = Duration::from_millis(16);
        let mut last_frame = Instant::now();
        let mut last_config_check = Instant::now();

        while self.running && self.world.tick < ticks {
            if last_config_check.elapsed() >= Duration::from_secs(2) {
                if self.check_config_reload()? {
                    tracing::info!("Configuration hot-reloaded successfully");
                }
                last_config_check = Instant::now();
            }

            let due = self.driver.advance(last_frame.elapsed());
            last_frame = Instant::now();
            for _ in 0..due {
                if self.world.tick >= ticks {
                    break;
                }
                self.tick()?;
                sink(self)?;
            }
            std::thread::sleep(frame);
        }
        Ok(())
    }

    /// One simulation tick plus event bookkeeping.
    pub fn tick(&mut self) -> Result<()> {
        if let Err(e) = self.world.step(&self.settings) {
            tracing::error!(error = %e, tick = self.world.tick, "Tick failed");
            self.running = false;
            return Err(e.into());
        }
        self.last_events = self.world.drain_events();
        Ok(())
    }
}
