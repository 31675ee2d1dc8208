//! Per-agent decision systems.
//!
//! Each tick every agent runs, in ascending id order:
//! medic bookkeeping, the movement decision (escape cascade when
//! overwhelmed, otherwise curiosity or weighted scoring), medic care, and the
//! post-move state update with its field deposits. Agents see the moves and
//! deposits of agents that stepped before them in the same tick.

pub mod escape;
pub mod medic;
pub mod movement;
pub mod sensing;
pub mod stress;

use crate::config::SimConfig;
use crate::grid::Grid;
use crate::territory;
use hazardsim_data::{Agent, AgentId};
use rand_chacha::ChaCha8Rng;
use std::collections::BTreeMap;

pub struct AgentContext<'a> {
    pub grid: &'a mut Grid,
    pub occupancy: &'a mut [Option<AgentId>],
    pub config: &'a SimConfig,
    pub rng: &'a mut ChaCha8Rng,
    /// Number of medics currently assigned to each patient.
    pub assignments: &'a mut BTreeMap<AgentId, u32>,
    pub tick: u64,
}

/// Every agent except the one stepping, still sorted by id.
pub struct Others<'a> {
    before: &'a mut [Agent],
    after: &'a mut [Agent],
}

impl<'a> Others<'a> {
    /// Splits `agents` around index `i`. `agents` must be sorted by id.
    pub fn split(agents: &'a mut [Agent], i: usize) -> Option<(&'a mut Agent, Self)> {
        if i >= agents.len() {
            return None;
        }
        let (before, rest) = agents.split_at_mut(i);
        let (agent, after) = rest.split_first_mut()?;
        Some((agent, Self { before, after }))
    }

    #[must_use]
    pub fn get(&self, id: AgentId) -> Option<&Agent> {
        for slice in [&*self.before, &*self.after] {
            if let Ok(i) = slice.binary_search_by_key(&id, |a| a.id) {
                return Some(&slice[i]);
            }
        }
        None
    }

    pub fn get_mut(&mut self, id: AgentId) -> Option<&mut Agent> {
        if let Ok(i) = self.before.binary_search_by_key(&id, |a| a.id) {
            return Some(&mut self.before[i]);
        }
        if let Ok(i) = self.after.binary_search_by_key(&id, |a| a.id) {
            return Some(&mut self.after[i]);
        }
        None
    }

    pub fn iter(&self) -> impl Iterator<Item = &Agent> {
        self.before.iter().chain(self.after.iter())
    }
}

/// What happened to one agent this tick, folded into the tick diagnostics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AgentOutcome {
    pub moved: bool,
    pub hot: bool,
    pub overwhelmed: bool,
}

/// Moves an agent onto an adjacent tile `to` if it can stand there, keeping
/// occupancy in sync. Agents never move more than one tile per tick.
pub fn move_agent(ctx: &mut AgentContext, agent: &mut Agent, to: usize) -> bool {
    let Some(from) = ctx.grid.index(agent.x, agent.y) else {
        return false;
    };
    if to >= ctx.grid.len() || !sensing::is_passable(ctx.grid, ctx.occupancy, to) {
        return false;
    }
    let (x, y) = ctx.grid.coords(to);
    if (x - agent.x).abs().max((y - agent.y).abs()) != 1 {
        return false;
    }
    ctx.occupancy[from] = None;
    ctx.occupancy[to] = Some(agent.id);
    agent.x = x;
    agent.y = y;
    territory::reinforcement_push(ctx.grid, from, to, agent.faction, &ctx.config.territory);
    true
}

/// Runs one agent's full tick.
pub fn step_agent(ctx: &mut AgentContext, agent: &mut Agent, others: &mut Others) -> AgentOutcome {
    let Some(from) = ctx.grid.index(agent.x, agent.y) else {
        return AgentOutcome::default();
    };
    let config = ctx.config;

    let overwhelmed = sensing::is_overwhelmed(agent, ctx.grid, ctx.occupancy, from, &config.agents);
    agent.overwhelmed = overwhelmed;

    let decided = if agent.is_medic() {
        medic::medic_step(ctx, agent, others)
    } else if overwhelmed {
        // A failed cascade leaves the agent where it is.
        Some(escape::escape_step(ctx, agent).unwrap_or(from))
    } else {
        movement::curiosity_step(ctx, agent)
    };
    let target = match decided {
        Some(t) => Some(t),
        None => movement::choose_step(ctx, agent),
    };

    let moved = match target {
        Some(to) if to != from => move_agent(ctx, agent, to),
        _ => false,
    };
    if !moved && !overwhelmed {
        agent.panic_run = None;
    }

    if agent.is_medic() {
        medic::apply_care(ctx, agent, others);
    }
    let here = ctx.grid.index(agent.x, agent.y).unwrap_or(from);
    stress::settle(ctx, agent, others, from, here);

    AgentOutcome {
        moved,
        hot: ctx.grid.heat[here] >= config.agents.hot_heat,
        overwhelmed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hazardsim_data::{FactionId, Mode};
    use rand::SeedableRng;

    fn agents() -> Vec<Agent> {
        (1..=4)
            .map(|i| Agent::new(AgentId(i), i as i32, 1, FactionId(0), Mode::Calm))
            .collect()
    }

    #[test]
    fn test_others_excludes_self() {
        let mut list = agents();
        let (me, mut others) = Others::split(&mut list, 1).unwrap();
        assert_eq!(me.id, AgentId(2));
        assert!(others.get(AgentId(2)).is_none());
        assert!(others.get(AgentId(1)).is_some());
        assert!(others.get_mut(AgentId(4)).is_some());
        assert_eq!(others.iter().count(), 3);
    }

    #[test]
    fn test_split_out_of_range() {
        let mut list = agents();
        assert!(Others::split(&mut list, 9).is_none());
    }

    #[test]
    fn test_move_is_one_tile_at_most() {
        let config = SimConfig::default();
        let mut grid = Grid::new(9, 9, 0.21, &config.fields);
        let mut occupancy = vec![None; grid.len()];
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let mut assignments = BTreeMap::new();
        let mut agent = Agent::new(AgentId(1), 4, 4, FactionId(0), Mode::Calm);
        let from = grid.index(4, 4).unwrap();
        occupancy[from] = Some(agent.id);
        let mut ctx = AgentContext {
            grid: &mut grid,
            occupancy: &mut occupancy,
            config: &config,
            rng: &mut rng,
            assignments: &mut assignments,
            tick: 0,
        };

        let two_away = ctx.grid.index(4, 2).unwrap();
        assert!(!move_agent(&mut ctx, &mut agent, two_away));
        assert!(!move_agent(&mut ctx, &mut agent, from));
        assert_eq!((agent.x, agent.y), (4, 4));

        let next = ctx.grid.index(4, 3).unwrap();
        assert!(move_agent(&mut ctx, &mut agent, next));
        assert_eq!((agent.x, agent.y), (4, 3));
        assert_eq!(ctx.occupancy[next], Some(agent.id));
        assert_eq!(ctx.occupancy[from], None);
    }
}
