//! Escape cascade for overwhelmed agents.
//!
//! Tried in order until one yields a step: follow the door gradient, keep
//! running along a committed heading, commit to the coolest tile in the
//! 2-ring, tunnel through a neighbor whose own 2-ring opens onto clearly
//! cooler ground, and after repeated failures take any materially safer
//! neighbor. The last resort is the heading encoded by the agent's own
//! phase. Every option is a single orthogonal step onto a free tile. Only
//! the tunnel may step onto a hotter tile, and only toward ground at least
//! `tunnel_gain` cooler than where the agent stands.

use super::sensing::{hazard, heading_from_phase, is_passable, ring};
use super::AgentContext;
use crate::pheromone::PheromoneKind;
use hazardsim_data::{Agent, PanicRun};

/// Picks the next tile for an overwhelmed agent, recording success or failure.
pub fn escape_step(ctx: &mut AgentContext, agent: &mut Agent) -> Option<usize> {
    let here = ctx.grid.index(agent.x, agent.y)?;
    let step = door_step(ctx, here)
        .or_else(|| continue_run(ctx, agent, here))
        .or_else(|| new_heading(ctx, agent, here))
        .or_else(|| tunnel(ctx, here))
        .or_else(|| desperate_step(ctx, agent, here))
        .or_else(|| phase_step(ctx, agent, here));

    match step {
        Some(_) => agent.fail_count = 0,
        None => {
            agent.fail_count = agent.fail_count.saturating_add(1);
            agent.panic_run = None;
        }
    }
    step
}

fn door_step(ctx: &AgentContext, here: usize) -> Option<usize> {
    let cfg = &ctx.config.agents;
    let grid = &*ctx.grid;
    let door_here = grid.pheromones.get(PheromoneKind::Door, here);
    grid.neighbors4(here)
        .filter(|&n| is_passable(grid, ctx.occupancy, n))
        .map(|n| (n, grid.pheromones.get(PheromoneKind::Door, n)))
        .filter(|&(_, d)| d >= cfg.door_min && d > door_here + cfg.escape_epsilon)
        .max_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(n, _)| n)
}

fn continue_run(ctx: &AgentContext, agent: &mut Agent, here: usize) -> Option<usize> {
    let run = agent.panic_run?;
    let grid = &*ctx.grid;
    let next = grid
        .offset(here, run.dx, run.dy)
        .filter(|&n| run.ticks_left > 0 && is_passable(grid, ctx.occupancy, n))
        .filter(|&n| grid.heat[n] <= grid.heat[here] + ctx.config.agents.escape_epsilon);
    agent.panic_run = match next {
        Some(_) if run.ticks_left > 1 => Some(PanicRun {
            ticks_left: run.ticks_left - 1,
            ..run
        }),
        _ => None,
    };
    next
}

fn new_heading(ctx: &AgentContext, agent: &mut Agent, here: usize) -> Option<usize> {
    let cfg = &ctx.config.agents;
    let grid = &*ctx.grid;
    let (coolest, heat) = ring(grid, agent.x, agent.y, 2)
        .filter(|&i| grid.is_open(i))
        .map(|i| (i, grid.heat[i]))
        .min_by(|a, b| a.1.total_cmp(&b.1))?;
    if heat >= grid.heat[here] - cfg.cool_improvement {
        return None;
    }

    let (cx, cy) = grid.coords(coolest);
    let (sx, sy) = ((cx - agent.x).signum(), (cy - agent.y).signum());
    let axes = if (cx - agent.x).abs() >= (cy - agent.y).abs() {
        [(sx, 0), (0, sy)]
    } else {
        [(0, sy), (sx, 0)]
    };
    let (dx, dy, next) = axes
        .into_iter()
        .filter(|&(dx, dy)| (dx, dy) != (0, 0))
        .find_map(|(dx, dy)| {
            grid.offset(here, dx, dy)
                .filter(|&n| is_passable(grid, ctx.occupancy, n))
                .filter(|&n| grid.heat[n] <= grid.heat[here] + cfg.escape_epsilon)
                .map(|n| (dx, dy, n))
        })?;
    agent.panic_run = (cfg.panic_run_ticks > 0).then_some(PanicRun {
        dx,
        dy,
        ticks_left: cfg.panic_run_ticks,
    });
    Some(next)
}

fn tunnel(ctx: &AgentContext, here: usize) -> Option<usize> {
    let grid = &*ctx.grid;
    let limit = grid.heat[here] - ctx.config.agents.tunnel_gain;
    grid.neighbors4(here)
        .filter(|&mid| is_passable(grid, ctx.occupancy, mid))
        .filter_map(|mid| {
            let (mx, my) = grid.coords(mid);
            let best = ring(grid, mx, my, 2)
                .filter(|&i| i != here && grid.is_open(i))
                .map(|i| grid.heat[i])
                .min_by(f32::total_cmp)?;
            (best < limit).then_some((mid, best))
        })
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(mid, _)| mid)
}

fn desperate_step(ctx: &AgentContext, agent: &Agent, here: usize) -> Option<usize> {
    let cfg = &ctx.config.agents;
    if agent.fail_count < cfg.fail_limit {
        return None;
    }
    let grid = &*ctx.grid;
    let limit = hazard(grid, here, cfg) - cfg.desperate_margin;
    grid.neighbors4(here)
        .filter(|&n| is_passable(grid, ctx.occupancy, n))
        .map(|n| (n, hazard(grid, n, cfg)))
        .filter(|&(_, h)| h < limit)
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(n, _)| n)
}

fn phase_step(ctx: &AgentContext, agent: &Agent, here: usize) -> Option<usize> {
    let grid = &*ctx.grid;
    let (dx, dy) = heading_from_phase(agent.state.phase);
    grid.offset(here, dx, dy)
        .filter(|&n| is_passable(grid, ctx.occupancy, n))
        .filter(|&n| grid.heat[n] <= grid.heat[here] + ctx.config.agents.escape_epsilon)
}
