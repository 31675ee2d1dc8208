use crate::config::AgentConfig;
use crate::grid::Grid;
use crate::pheromone::PheromoneKind;
use hazardsim_data::{Agent, AgentId};

/// Oxygen shortfall in `[0, 1]` relative to the grid's base level.
#[inline]
#[must_use]
pub fn o2_deficit(grid: &Grid, idx: usize) -> f32 {
    if grid.o2_base <= 0.0 {
        return 1.0;
    }
    1.0 - (grid.o2[idx] / grid.o2_base).clamp(0.0, 1.0)
}

/// Weighted blend of heat, fire amplitude, panic pheromone and oxygen
/// deficit, clamped to `[0, 1]`. Walls read as maximally hazardous.
#[must_use]
pub fn hazard(grid: &Grid, idx: usize, cfg: &AgentConfig) -> f32 {
    if !grid.is_open(idx) {
        return 1.0;
    }
    let h = cfg.hazard_heat_weight * grid.heat[idx]
        + cfg.hazard_fire_weight * grid.fire_amplitude(idx).min(1.0)
        + cfg.hazard_panic_weight * grid.pheromones.get(PheromoneKind::Panic, idx)
        + cfg.hazard_o2_weight * o2_deficit(grid, idx);
    if h.is_finite() {
        h.clamp(0.0, 1.0)
    } else {
        1.0
    }
}

#[inline]
#[must_use]
pub fn safety(grid: &Grid, idx: usize, cfg: &AgentConfig) -> f32 {
    1.0 - hazard(grid, idx, cfg)
}

/// An agent may step onto an open tile nobody stands on that holds no canister.
#[inline]
#[must_use]
pub fn is_passable(grid: &Grid, occupancy: &[Option<AgentId>], idx: usize) -> bool {
    grid.is_open(idx)
        && occupancy.get(idx).is_some_and(Option::is_none)
        && !grid.canisters.contains_key(&idx)
}

/// Whether some reachable neighbor is noticeably cooler.
#[must_use]
pub fn has_escape_gradient(
    grid: &Grid,
    occupancy: &[Option<AgentId>],
    idx: usize,
    cfg: &AgentConfig,
) -> bool {
    let here = grid.heat[idx];
    grid.neighbors4(idx)
        .any(|n| is_passable(grid, occupancy, n) && grid.heat[n] < here - cfg.escape_epsilon)
}

/// Hot, trapped and agitated. Medics are never overwhelmed.
#[must_use]
pub fn is_overwhelmed(
    agent: &Agent,
    grid: &Grid,
    occupancy: &[Option<AgentId>],
    idx: usize,
    cfg: &AgentConfig,
) -> bool {
    !agent.is_medic()
        && grid.heat[idx] >= cfg.overwhelm_heat
        && !has_escape_gradient(grid, occupancy, idx, cfg)
        && agent.state.amplitude >= cfg.overwhelm_amplitude
        && agent.state.tension <= cfg.overwhelm_tension
}

/// Unit orthogonal step closest to a phase angle.
#[must_use]
pub fn heading_from_phase(phase: f32) -> (i32, i32) {
    let (s, c) = phase.sin_cos();
    if c.abs() >= s.abs() {
        (if c >= 0.0 { 1 } else { -1 }, 0)
    } else {
        (0, if s >= 0.0 { 1 } else { -1 })
    }
}

/// Tiles within Chebyshev distance `radius` of `(x, y)`, excluding the center.
pub fn ring(grid: &Grid, x: i32, y: i32, radius: i32) -> impl Iterator<Item = usize> + '_ {
    (-radius..=radius).flat_map(move |dy| {
        (-radius..=radius).filter_map(move |dx| {
            if dx == 0 && dy == 0 {
                None
            } else {
                grid.index(x + dx, y + dy)
            }
        })
    })
}
