//! Post-move state update: environmental stress, phase shock, social
//! coupling, field deposits and the categorical mode.

use super::sensing::{hazard, o2_deficit, ring};
use super::{AgentContext, Others};
use crate::config::AgentConfig;
use crate::pheromone::PheromoneKind;
use crate::territory;
use hazardsim_data::{is_friendly, Agent, Mode};
use rand::Rng;

/// Applies every post-move rule to `agent`, now standing on `here` after
/// leaving `from` (equal when it stayed).
pub fn settle(
    ctx: &mut AgentContext,
    agent: &mut Agent,
    others: &Others,
    from: usize,
    here: usize,
) {
    let config = ctx.config;
    let cfg = &config.agents;
    let heat = ctx.grid.heat[here].clamp(0.0, 1.0);
    let deficit = o2_deficit(ctx.grid, here);
    let hz = hazard(ctx.grid, here, cfg);

    apply_stress(agent, cfg, &mut *ctx.rng, heat, deficit, hz);
    apply_social(ctx, agent, others);
    deposit(ctx, agent, from, here, hz);
    agent.state.mode = next_mode(agent, cfg);
    agent.state = agent.state.normalized();
    agent.state.amplitude = agent.state.amplitude.min(cfg.max_amplitude);
}

fn apply_stress<R: Rng + ?Sized>(
    agent: &mut Agent,
    cfg: &AgentConfig,
    rng: &mut R,
    heat: f32,
    deficit: f32,
    hz: f32,
) {
    let strain = cfg.o2_stress * deficit + cfg.heat_stress * heat;
    let state = &mut agent.state;
    state.add_tension(-cfg.stress_tension_loss * strain);
    state.add_amplitude(cfg.heat_amplitude_gain * heat, cfg.max_amplitude);

    let mut kick = 0.0;
    if deficit > cfg.shock_o2 {
        kick += cfg.shock_kick;
    }
    if heat > cfg.shock_heat {
        kick += cfg.shock_kick;
    }
    agent.shock = agent.shock * cfg.shock_decay + kick;
    if !agent.shock.is_finite() {
        agent.shock = 0.0;
    }
    if agent.shock > 0.0 {
        let jolt = rng.gen_range(-agent.shock..=agent.shock);
        agent.state.rotate(jolt);
    }

    if hz < cfg.safe_hazard {
        let state = &mut agent.state;
        state.add_tension(cfg.recover_rate);
        let rest = cfg.rest_amplitude;
        state.amplitude += (rest - state.amplitude) * cfg.recover_rate;
        // Drift back toward the faction's resting phase.
        let home = agent.faction.safe_phase();
        state.rotate((home - state.phase).sin() * cfg.social_phase_pull);
    }
}

fn apply_social(ctx: &AgentContext, agent: &mut Agent, others: &Others) {
    let cfg = &ctx.config.agents;
    if cfg.social_radius <= 0 {
        return;
    }
    let mut count = 0usize;
    let mut sin_sum = 0.0;
    let mut cos_sum = 0.0;
    let mut amp_sum = 0.0;
    for idx in ring(ctx.grid, agent.x, agent.y, cfg.social_radius) {
        let Some(other) = ctx.occupancy[idx].and_then(|id| others.get(id)) else {
            continue;
        };
        if !is_friendly(agent.faction, other.faction) {
            continue;
        }
        let delta = other.state.phase - agent.state.phase;
        sin_sum += delta.sin();
        cos_sum += delta.cos();
        amp_sum += other.state.amplitude;
        count += 1;
    }
    if count == 0 {
        return;
    }
    let n = count as f32;
    agent.state.rotate(cfg.social_phase_pull * sin_sum / n);
    let pull = cfg.social_amplitude_pull * (amp_sum / n - agent.state.amplitude);
    agent.state.add_amplitude(pull, cfg.max_amplitude);
    if count >= 2 && cos_sum / n > cfg.sync_threshold {
        agent.state.add_tension(-cfg.sync_tension_penalty);
    }
}

fn deposit(ctx: &mut AgentContext, agent: &Agent, from: usize, here: usize, hz: f32) {
    let config = ctx.config;
    let cfg = &config.agents;
    let grid = &mut *ctx.grid;

    territory::deposit_presence(grid, here, agent.faction, config.territory.presence_deposit);
    if hz < cfg.safe_hazard {
        grid.pheromones.deposit(PheromoneKind::Safe, here, cfg.safe_deposit);
        grid.memory
            .deposit(here, agent.faction.safe_phase(), cfg.memory_deposit);
    }
    if agent.needs_help(config.medic.patient_tension) {
        grid.pheromones.deposit(PheromoneKind::Help, here, cfg.help_deposit);
    }
    if agent.state.mode == Mode::Panic || agent.overwhelmed {
        grid.pheromones.deposit(PheromoneKind::Panic, here, cfg.panic_deposit);
    }
    if from != here {
        grid.pheromones.deposit(PheromoneKind::Route, here, cfg.route_deposit);
        if grid.heat[here] < grid.heat[from] - cfg.escape_epsilon {
            grid.pheromones.deposit(PheromoneKind::Escape, here, cfg.escape_deposit);
        }
    }
    grid.pheromones.deposit(PheromoneKind::Visited, here, cfg.visited_deposit);
}

/// Panic and calm thresholds with a dead band between them. Medics always
/// stay medics.
#[must_use]
pub fn next_mode(agent: &Agent, cfg: &AgentConfig) -> Mode {
    if agent.is_medic() {
        return Mode::Medic;
    }
    let s = &agent.state;
    if s.amplitude >= cfg.panic_amplitude || s.tension <= cfg.panic_tension {
        Mode::Panic
    } else if s.amplitude <= cfg.calm_amplitude && s.tension >= cfg.calm_tension {
        Mode::Calm
    } else if s.mode.is_agent_mode() {
        s.mode
    } else {
        Mode::Calm
    }
}
