//! Material reaction and phase-transition rules.
//!
//! Every tile may carry a [`TileMaterial`]. Pairwise reactions are driven by a
//! coupling score between the two states; single-tile rules depend on local
//! heat and oxygen. One call to [`run_reactions`] applies everything once, in
//! a fixed order: ambient relaxation, canisters and burners, fire/oxygen,
//! fire/water, fire spread, acid/base, cryofoam, then water/ice transitions.

pub mod canister;
pub mod chemistry;
pub mod cryofoam;
pub mod fire;
pub mod phase;

use crate::config::{ReactionConfig, StepSettings};
use crate::events::WorldEvent;
use crate::grid::Grid;
use hazardsim_data::{Mode, TileMaterial};
use rand_chacha::ChaCha8Rng;

pub use canister::{blast_radius, detonate, place_canister};
pub use chemistry::react_acid_base;
pub use cryofoam::deposit_cryofoam;
pub use fire::{ignite, react_fire_oxygen, react_fire_water};
pub use phase::apply_phase_transitions;

/// Interaction strength in `[0, 1]` between two material states.
///
/// Aligned phases and high mutual tension couple strongly; opposite phases or
/// a slack partner barely interact.
#[must_use]
pub fn coupling(a: &TileMaterial, b: &TileMaterial) -> f32 {
    let align = 0.5 * (1.0 + (a.phase - b.phase).cos());
    let tension = (a.tension * b.tension).max(0.0).sqrt();
    let c = align * tension;
    if c.is_finite() {
        c.clamp(0.0, 1.0)
    } else {
        0.0
    }
}

/// Synthetic oxygen state seen by a fire: phase-locked to it, scaled by local o2.
#[must_use]
pub fn oxygen_state(o2: f32, o2_base: f32, phase: f32) -> TileMaterial {
    let ratio = if o2_base > 0.0 {
        (o2 / o2_base).clamp(0.0, 1.0)
    } else {
        0.0
    };
    TileMaterial::new(Mode::Oxygen, ratio, ratio, phase)
}

pub struct ReactionContext<'a> {
    pub config: &'a ReactionConfig,
    pub settings: &'a StepSettings,
    pub tick: u64,
    pub rng: &'a mut ChaCha8Rng,
    pub events: &'a mut Vec<WorldEvent>,
}

/// Applies all material rules once.
pub fn run_reactions(grid: &mut Grid, ctx: &mut ReactionContext) {
    relax_ambient(grid, ctx.config, ctx.settings);
    canister::step_burners(grid, ctx.config);
    canister::step_canisters(grid, ctx.config, ctx.events);
    fire::step_fires(grid, ctx);
    chemistry::step_acid_base(grid, ctx.config, ctx.tick, ctx.events);
    cryofoam::step_cryofoam(grid, ctx.config, ctx.rng, ctx.events);
    apply_phase_transitions(grid, ctx.config);
}

/// Non-burning tiles shed a little heat; oxygen creeps back toward its base.
fn relax_ambient(grid: &mut Grid, config: &ReactionConfig, settings: &StepSettings) {
    let base = settings.o2_base.min(grid.o2_base);
    for idx in 0..grid.len() {
        if grid.wall[idx] {
            continue;
        }
        if !grid.fire.contains(&idx) {
            grid.heat[idx] -= grid.heat[idx] * config.ambient_cooling;
        }
        if grid.o2[idx] < base {
            grid.o2[idx] += (base - grid.o2[idx]) * config.o2_regen;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    #[test]
    fn test_coupling_bounds_and_alignment() {
        let a = TileMaterial::new(Mode::Fire, 1.0, 1.0, 0.0);
        let aligned = TileMaterial::new(Mode::Water, 1.0, 1.0, 0.0);
        let opposed = TileMaterial::new(Mode::Water, 1.0, 1.0, PI);
        assert!((coupling(&a, &aligned) - 1.0).abs() < 1e-6);
        assert!(coupling(&a, &opposed) < 1e-6);
        let slack = TileMaterial::new(Mode::Water, 0.0, 1.0, 0.0);
        assert_eq!(coupling(&a, &slack), 0.0);
    }

    #[test]
    fn test_oxygen_state_scales_with_o2() {
        let full = oxygen_state(0.21, 0.21, 1.0);
        let half = oxygen_state(0.105, 0.21, 1.0);
        assert!((full.tension - 1.0).abs() < 1e-6);
        assert!((half.amplitude - 0.5).abs() < 1e-6);
        assert_eq!(full.mode, Mode::Oxygen);
    }
}
