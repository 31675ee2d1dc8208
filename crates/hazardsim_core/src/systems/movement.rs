use super::sensing::{hazard, is_passable, safety};
use super::AgentContext;
use crate::config::ScoreWeights;
use crate::pheromone::PheromoneKind;
use hazardsim_data::{is_hostile, Agent, FactionId};
use rand::Rng;

/// Faction-relative territory terms of one tile.
struct TerritoryView {
    own_presence: f32,
    rival_presence: f32,
    territory: f32,
    frontier: f32,
    debt: f32,
    control_gain: f32,
    reinforce: f32,
}

fn territory_view(ctx: &AgentContext, faction: FactionId, idx: usize) -> TerritoryView {
    let grid = &*ctx.grid;
    let t = &grid.territory;
    let f = faction.index();
    let own_presence = grid.presence.project_basis(idx, faction.basis()).max(0.0);
    let rival_presence = FactionId::all()
        .filter(|&other| is_hostile(faction, other))
        .map(|other| grid.presence.project_basis(idx, other.basis()).max(0.0))
        .fold(0.0, f32::max);
    let control = t.control[idx];
    let territory = match t.dominant[idx] {
        Some(owner) if owner == faction => control,
        Some(owner) if is_hostile(faction, owner) => -control,
        _ => 0.0,
    };
    let control_gain = if t.dominant[idx] == Some(faction) {
        0.0
    } else {
        t.contest(idx).max(1.0 - control)
    };
    TerritoryView {
        own_presence,
        rival_presence,
        territory,
        frontier: t.frontier[f][idx],
        debt: t.debt[f][idx],
        control_gain,
        reinforce: t.reinforce[f][idx],
    }
}

/// Weighted desirability of standing on `idx`, without jitter.
#[must_use]
pub fn score_tile(ctx: &AgentContext, agent: &Agent, idx: usize, w: &ScoreWeights) -> f32 {
    let cfg = &ctx.config.agents;
    let grid = &*ctx.grid;
    let p = &grid.pheromones;
    let tv = territory_view(ctx, agent.faction, idx);
    let crowd = grid
        .neighbors4(idx)
        .filter(|&n| ctx.occupancy[n].is_some_and(|id| id != agent.id))
        .count() as f32;

    w.safety * safety(grid, idx, cfg)
        + w.help * p.get(PheromoneKind::Help, idx)
        + w.route * p.get(PheromoneKind::Route, idx)
        - w.panic * p.get(PheromoneKind::Panic, idx)
        + w.safe * p.get(PheromoneKind::Safe, idx)
        + w.escape * p.get(PheromoneKind::Escape, idx)
        - w.visited * p.get(PheromoneKind::Visited, idx)
        + w.own_presence * tv.own_presence
        - w.rival_presence * tv.rival_presence
        + w.safe_memory * grid.memory.project(idx, agent.faction.safe_phase())
        + w.territory * tv.territory
        + w.frontier * tv.frontier
        - w.debt * tv.debt
        + w.control_gain * tv.control_gain
        + w.reinforce * tv.reinforce
        - cfg.crowd_penalty * crowd
}

/// Best of the current tile and its reachable orthogonal neighbors. When
/// staying put scores best, falls back to a random walk biased toward the
/// agent's phase heading.
pub fn choose_step(ctx: &mut AgentContext, agent: &Agent) -> Option<usize> {
    let here = ctx.grid.index(agent.x, agent.y)?;
    let config = ctx.config;
    let weights = if agent.is_medic() {
        &config.agents.medic_weights
    } else {
        &config.agents.ordinary_weights
    };

    let candidates: Vec<usize> = std::iter::once(here)
        .chain(
            ctx.grid
                .neighbors4(here)
                .filter(|&n| is_passable(ctx.grid, ctx.occupancy, n)),
        )
        .collect();

    let mut best = here;
    let mut best_score = f32::NEG_INFINITY;
    for &idx in &candidates {
        let jitter = ctx.rng.gen::<f32>() * config.agents.jitter;
        let score = score_tile(ctx, agent, idx, weights) + jitter;
        if score > best_score {
            best_score = score;
            best = idx;
        }
    }
    if best != here {
        return Some(best);
    }
    random_walk(ctx, agent, here, &candidates[1..])
}

fn random_walk(
    ctx: &mut AgentContext,
    agent: &Agent,
    here: usize,
    options: &[usize],
) -> Option<usize> {
    if options.is_empty() || ctx.rng.gen::<f32>() >= ctx.config.agents.random_walk_chance {
        return None;
    }
    let (hx, hy) = ctx.grid.coords(here);
    let (s, c) = agent.state.phase.sin_cos();
    let weights: Vec<f32> = options
        .iter()
        .map(|&n| {
            let (nx, ny) = ctx.grid.coords(n);
            1.0 + ((nx - hx) as f32 * c + (ny - hy) as f32 * s).max(0.0)
        })
        .collect();
    let total: f32 = weights.iter().sum();
    let mut pick = ctx.rng.gen::<f32>() * total;
    for (&n, w) in options.iter().zip(weights) {
        if pick < w {
            return Some(n);
        }
        pick -= w;
    }
    options.last().copied()
}

/// Occasional exploratory step taken by settled agents on safe ground.
///
/// The agent must stand on low-hazard ground with tension exceeding
/// amplitude by at least `curiosity_mood`. It then heads for the least
/// visited low-hazard neighbor that is no safer than its own tile.
pub fn curiosity_step(ctx: &mut AgentContext, agent: &Agent) -> Option<usize> {
    let cfg = &ctx.config.agents;
    let here = ctx.grid.index(agent.x, agent.y)?;
    let mood = agent.state.tension - agent.state.amplitude;
    if hazard(ctx.grid, here, cfg) >= cfg.curiosity_hazard
        || mood < cfg.curiosity_mood
        || ctx.rng.gen::<f32>() >= cfg.curiosity_chance
    {
        return None;
    }

    let grid = &*ctx.grid;
    let safety_here = safety(grid, here, cfg);
    let options: Vec<(usize, f32)> = grid
        .neighbors4(here)
        .filter(|&n| is_passable(grid, ctx.occupancy, n))
        .filter(|&n| hazard(grid, n, cfg) < cfg.curiosity_hazard)
        .filter(|&n| safety(grid, n, cfg) <= safety_here)
        .map(|n| (n, grid.pheromones.get(PheromoneKind::Visited, n)))
        .collect();
    let least = options.iter().map(|&(_, v)| v).min_by(f32::total_cmp)?;
    let fresh: Vec<usize> = options
        .into_iter()
        .filter(|&(_, v)| v <= least)
        .map(|(n, _)| n)
        .collect();
    Some(fresh[ctx.rng.gen_range(0..fresh.len())])
}
