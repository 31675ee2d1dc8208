use super::{ResetOptions, World};
use crate::config::SimConfig;
use crate::grid::Grid;
use crate::metrics::{Metrics, TickDiagnostics};
use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::collections::BTreeMap;

fn resolve_seed(explicit: Option<u64>) -> u64 {
    explicit.unwrap_or_else(|| ChaCha8Rng::from_entropy().next_u64())
}

impl World {
    /// Builds a world from a validated configuration, ready to step.
    pub fn new(config: SimConfig) -> anyhow::Result<Self> {
        config.validate()?;
        let seed = resolve_seed(config.world.seed);
        let o2_base = config.world.o2_base;
        let grid = Grid::new(
            config.world.width as usize,
            config.world.height as usize,
            o2_base,
            &config.fields,
        );
        let len = grid.len();
        let world = Self {
            grid,
            tick: 0,
            agents: Vec::new(),
            occupancy: vec![None; len],
            assignments: BTreeMap::new(),
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed,
            next_id: 1,
            events: Vec::new(),
            diagnostics: TickDiagnostics::default(),
            metrics: Metrics::new(),
            config,
        };
        tracing::info!(
            width = world.grid.width,
            height = world.grid.height,
            seed = seed,
            fingerprint = %world.config.fingerprint(),
            "World created"
        );
        Ok(world)
    }

    /// Discards every field, agent and pending event and reallocates the grid
    /// at the configured dimensions with a fresh wall ring.
    ///
    /// A non-positive or non-finite `o2_base` falls back to the configured one.
    pub fn reset(&mut self, o2_base: f32, options: ResetOptions) {
        let o2_base = if o2_base.is_finite() && o2_base > 0.0 {
            o2_base.min(1.0)
        } else {
            tracing::warn!(o2_base = o2_base, "Invalid oxygen base, using configured value");
            self.config.world.o2_base
        };
        let mut grid = Grid::new(
            self.config.world.width as usize,
            self.config.world.height as usize,
            o2_base,
            &self.config.fields,
        );
        let ambient = if options.ambient_heat.is_finite() {
            options.ambient_heat.clamp(0.0, 1.0)
        } else {
            0.0
        };
        for idx in 0..grid.len() {
            if grid.is_open(idx) {
                grid.heat[idx] = ambient;
            }
        }

        self.seed = resolve_seed(options.seed.or(self.config.world.seed));
        self.rng = ChaCha8Rng::seed_from_u64(self.seed);
        self.occupancy = vec![None; grid.len()];
        self.grid = grid;
        self.tick = 0;
        self.agents.clear();
        self.assignments.clear();
        self.next_id = 1;
        self.events.clear();
        self.diagnostics = TickDiagnostics::default();

        tracing::info!(
            o2_base = o2_base,
            seed = self.seed,
            fingerprint = %self.config.fingerprint(),
            "World reset"
        );
    }

    /// Seed the current run was started with.
    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }
}
