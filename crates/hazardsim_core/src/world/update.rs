use super::{AgentTally, World};
use crate::config::StepSettings;
use crate::error::SimError;
use crate::reactions::{self, ReactionContext};
use crate::systems::{self, AgentContext, Others};
use crate::territory;
use rand::SeedableRng;
use std::time::Instant;

/// Replaces malformed step settings with safe values.
fn sanitize(settings: &StepSettings) -> StepSettings {
    let defaults = StepSettings::default();
    let pick = |v: f32, fallback: f32| if v.is_finite() && v >= 0.0 { v } else { fallback };
    let clean = StepSettings {
        d_heat: pick(settings.d_heat, defaults.d_heat),
        d_o2: pick(settings.d_o2, defaults.d_o2),
        o2_base: pick(settings.o2_base, defaults.o2_base).min(1.0),
        o2_cut: pick(settings.o2_cut, defaults.o2_cut),
    };
    if clean != *settings {
        tracing::warn!(?settings, "Malformed step settings normalized");
    }
    clean
}

impl World {
    /// Advances the simulation by one tick.
    ///
    /// Phases run strictly in order: field diffusion and decay, material
    /// reactions, territory recomputation, every agent in ascending id order,
    /// then finalization (clamping, diagnostics).
    ///
    /// # Arguments
    /// * `settings` - Diffusion coefficients and oxygen levels for this tick
    ///
    /// # Returns
    /// `Err` only when `debug.assert_invariants` is set and a field left its
    /// valid range.
    pub fn step(&mut self, settings: &StepSettings) -> Result<(), SimError> {
        let started = Instant::now();
        self.tick += 1;
        if self.config.world.deterministic {
            let seed = self.seed.wrapping_add(self.tick).wrapping_add(0x5EED);
            self.rng = rand_chacha::ChaCha8Rng::seed_from_u64(seed);
        }
        let settings = sanitize(settings);
        let first_event = self.events.len();

        self.grid.diffuse_fields(&settings, &self.config.fields);

        let mut ctx = ReactionContext {
            config: &self.config.reactions,
            settings: &settings,
            tick: self.tick,
            rng: &mut self.rng,
            events: &mut self.events,
        };
        reactions::run_reactions(&mut self.grid, &mut ctx);

        territory::update_territory(&mut self.grid, &self.config.fields, &self.config.territory);

        let tally = self.step_agents();
        self.finalize_tick(tally, first_event, started.elapsed())
    }

    fn step_agents(&mut self) -> AgentTally {
        let mut tally = AgentTally::default();
        let mut ctx = AgentContext {
            grid: &mut self.grid,
            occupancy: &mut self.occupancy,
            config: &self.config,
            rng: &mut self.rng,
            assignments: &mut self.assignments,
            tick: self.tick,
        };
        for i in 0..self.agents.len() {
            let Some((agent, mut others)) = Others::split(&mut self.agents, i) else {
                break;
            };
            tally.add(systems::step_agent(&mut ctx, agent, &mut others));
        }
        tally
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_replaces_bad_values() {
        let bad = StepSettings {
            d_heat: f32::NAN,
            d_o2: -1.0,
            o2_base: 3.0,
            o2_cut: 0.1,
        };
        let clean = sanitize(&bad);
        assert_eq!(clean.d_heat, 0.12);
        assert_eq!(clean.d_o2, 0.18);
        assert_eq!(clean.o2_base, 1.0);
        assert_eq!(clean.o2_cut, 0.1);
        let good = StepSettings::default();
        assert_eq!(sanitize(&good), good);
    }
}
