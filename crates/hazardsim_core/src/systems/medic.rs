//! Medic targeting, pathing and care.
//!
//! A medic holds at most one patient. Each patient can be claimed by at most
//! `assignment_cap` medics; the counts live in the world's assignment table
//! keyed by patient id and are always released through [`release`].

use super::sensing::{is_passable, ring};
use super::{AgentContext, Others};
use crate::config::MedicConfig;
use crate::grid::Grid;
use crate::pheromone::PheromoneKind;
use hazardsim_data::{Agent, AgentId, Mode};
use std::collections::{BTreeMap, VecDeque};

/// Drops the medic's current patient and path, freeing the assignment slot.
pub fn release(assignments: &mut BTreeMap<AgentId, u32>, medic: &mut Agent) {
    medic.medic.path.clear();
    let Some(target) = medic.medic.target.take() else {
        return;
    };
    if let Some(count) = assignments.get_mut(&target) {
        *count = count.saturating_sub(1);
        if *count == 0 {
            assignments.remove(&target);
        }
    }
}

#[inline]
fn chebyshev(a: &Agent, b: &Agent) -> i32 {
    (a.x - b.x).abs().max((a.y - b.y).abs())
}

/// Nearest agent within the search radius that needs help and still has a
/// free assignment slot. Ties go to the lower id.
#[must_use]
pub fn find_patient(
    medic: &Agent,
    others: &Others,
    assignments: &BTreeMap<AgentId, u32>,
    cfg: &MedicConfig,
) -> Option<AgentId> {
    others
        .iter()
        .filter(|a| a.needs_help(cfg.patient_tension))
        .filter(|a| assignments.get(&a.id).copied().unwrap_or(0) < cfg.assignment_cap)
        .map(|a| (chebyshev(medic, a), a.id))
        .filter(|&(d, _)| d <= cfg.search_radius)
        .min()
        .map(|(_, id)| id)
}

/// Breadth-first path over open, non-burning tiles. The goal tile itself may
/// burn. Returns the steps after `from`, ending at `to`, or `None` when the
/// goal is unreachable within `max_nodes` expansions.
#[must_use]
pub fn find_path(grid: &Grid, from: usize, to: usize, max_nodes: usize) -> Option<VecDeque<usize>> {
    if from == to {
        return Some(VecDeque::new());
    }
    let mut parent: BTreeMap<usize, usize> = BTreeMap::new();
    let mut queue = VecDeque::from([from]);
    parent.insert(from, from);
    let mut expanded = 0;
    while let Some(cur) = queue.pop_front() {
        expanded += 1;
        if expanded > max_nodes {
            return None;
        }
        let next: Vec<usize> = grid.neighbors4(cur).collect();
        for n in next {
            if parent.contains_key(&n) || !grid.is_open(n) {
                continue;
            }
            if n != to && grid.fire.contains(&n) {
                continue;
            }
            parent.insert(n, cur);
            if n == to {
                let mut path = VecDeque::new();
                let mut step = to;
                while step != from {
                    path.push_front(step);
                    step = parent[&step];
                }
                return Some(path);
            }
            queue.push_back(n);
        }
    }
    None
}

/// Keeps the patient assignment current: releases recovered or vanished
/// patients and, on the rescan interval, claims a new one.
pub fn refresh_target(ctx: &mut AgentContext, medic: &mut Agent, others: &Others) {
    let cfg = &ctx.config.medic;
    if let Some(id) = medic.medic.target {
        let keep = others.get(id).is_some_and(|p| {
            p.state.mode == Mode::Panic || p.state.tension < cfg.recovered_tension
        });
        if !keep {
            tracing::debug!(medic = medic.id.0, patient = id.0, "Medic released patient");
            release(ctx.assignments, medic);
        }
    }
    if medic.medic.target.is_some() {
        return;
    }
    if medic.medic.rescan_in > 0 {
        medic.medic.rescan_in -= 1;
        return;
    }
    medic.medic.rescan_in = cfg.rescan_ticks;
    if let Some(id) = find_patient(medic, others, ctx.assignments, cfg) {
        *ctx.assignments.entry(id).or_insert(0) += 1;
        medic.medic.target = Some(id);
        medic.medic.path.clear();
        tracing::debug!(medic = medic.id.0, patient = id.0, "Medic assigned");
    }
}

/// Strictly better help-gradient neighbor, if any.
fn help_climb(ctx: &AgentContext, here: usize) -> Option<usize> {
    let eps = ctx.config.medic.help_epsilon;
    let grid = &*ctx.grid;
    let help_here = grid.pheromones.get(PheromoneKind::Help, here);
    grid.neighbors4(here)
        .filter(|&n| is_passable(grid, ctx.occupancy, n))
        .map(|n| (n, grid.pheromones.get(PheromoneKind::Help, n)))
        .filter(|&(_, h)| h > help_here + eps)
        .max_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(n, _)| n)
}

/// Movement decision for a medic. `Some(here)` means wait beside the patient;
/// `None` hands the decision to weighted scoring.
///
/// A medic walking its planned path still leaves it for a strictly better
/// help-gradient neighbor, replanning from there on the next tick.
pub fn medic_step(ctx: &mut AgentContext, medic: &mut Agent, others: &mut Others) -> Option<usize> {
    let here = ctx.grid.index(medic.x, medic.y)?;
    medic.medic.cooldown = medic.medic.cooldown.saturating_sub(1);
    refresh_target(ctx, medic, others);

    if let Some(patient) = medic.medic.target.and_then(|id| others.get(id)) {
        let goal = ctx.grid.index(patient.x, patient.y)?;
        if medic.medic.path.back() != Some(&goal) {
            match find_path(ctx.grid, here, goal, ctx.config.medic.max_path) {
                Some(path) => medic.medic.path = path,
                None => {
                    medic.medic.path.clear();
                    return None;
                }
            }
        }
        let next = *medic.medic.path.front()?;
        if next == goal {
            return Some(here);
        }
        if let Some(up) = help_climb(ctx, here) {
            medic.medic.path.clear();
            return Some(up);
        }
        if is_passable(ctx.grid, ctx.occupancy, next) {
            medic.medic.path.pop_front();
            return Some(next);
        }
        // Blocked this tick; replan next tick.
        medic.medic.path.clear();
        return Some(here);
    }

    help_climb(ctx, here)
}

/// Whether an agent is in a state the burst can pull back.
fn burst_worthy(agent: &Agent, cfg: &MedicConfig) -> bool {
    !agent.is_medic()
        && (agent.state.tension < cfg.burst_trigger || agent.state.mode == Mode::Panic)
}

/// Calming aura on every nearby non-medic agent, then the cooldown-gated
/// burst on one adjacent agent in crisis. The medic's own patient goes
/// first, then the lowest tension, then the lowest id.
pub fn apply_care(ctx: &mut AgentContext, medic: &mut Agent, others: &mut Others) {
    let cfg = &ctx.config.medic;
    let max_amp = ctx.config.agents.max_amplitude;

    let nearby: Vec<AgentId> = ring(ctx.grid, medic.x, medic.y, cfg.aura_radius)
        .filter_map(|i| ctx.occupancy[i])
        .collect();
    for &id in &nearby {
        let Some(other) = others.get_mut(id) else {
            continue;
        };
        if other.is_medic() {
            continue;
        }
        other.state.add_tension(cfg.aura_tension);
        other.state.add_amplitude(-cfg.aura_amplitude, max_amp);
    }

    if medic.medic.cooldown > 0 {
        return;
    }
    let (mx, my, target) = (medic.x, medic.y, medic.medic.target);
    let chosen = nearby
        .iter()
        .filter_map(|&id| others.get(id))
        .filter(|a| (a.x - mx).abs().max((a.y - my).abs()) <= 1 && burst_worthy(a, cfg))
        .min_by(|a, b| {
            (target != Some(a.id))
                .cmp(&(target != Some(b.id)))
                .then(a.state.tension.total_cmp(&b.state.tension))
                .then(a.id.cmp(&b.id))
        })
        .map(|a| a.id);
    let Some(patient) = chosen.and_then(|id| others.get_mut(id)) else {
        return;
    };
    patient.state.add_tension(cfg.burst_tension);
    patient.state.amplitude *= cfg.burst_amplitude_scale;
    patient.panic_run = None;
    patient.fail_count = 0;
    medic.medic.cooldown = cfg.burst_cooldown;
    tracing::debug!(medic = medic.id.0, patient = patient.id.0, "Medic burst");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{FieldConfig, SimConfig};
    use hazardsim_data::FactionId;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_path_avoids_fire_and_walls() {
        let mut g = Grid::new(7, 5, 0.21, &FieldConfig::default());
        let from = g.index(1, 2).unwrap();
        let to = g.index(5, 2).unwrap();
        g.set_material(
            g.index(3, 2).unwrap(),
            Some(hazardsim_data::TileMaterial::new(Mode::Fire, 0.8, 1.0, 0.0)),
        );
        let path = find_path(&g, from, to, 400).unwrap();
        assert_eq!(path.back(), Some(&to));
        assert!(!path.contains(&g.index(3, 2).unwrap()));
        for y in [1, 3] {
            g.set_wall(g.index(3, y).unwrap(), true).unwrap();
        }
        assert!(find_path(&g, from, to, 400).is_none());
    }

    #[test]
    fn test_find_patient_respects_cap_and_radius() {
        let cfg = MedicConfig {
            assignment_cap: 1,
            ..Default::default()
        };
        let mut agents = vec![
            Agent::new(AgentId(1), 2, 2, FactionId(0), Mode::Medic),
            Agent::new(AgentId(2), 4, 2, FactionId(0), Mode::Panic),
            Agent::new(AgentId(3), 6, 2, FactionId(0), Mode::Panic),
            Agent::new(AgentId(4), 40, 2, FactionId(0), Mode::Panic),
        ];
        let (medic, others) = Others::split(&mut agents, 0).unwrap();
        let mut assignments = BTreeMap::new();
        assert_eq!(find_patient(medic, &others, &assignments, &cfg), Some(AgentId(2)));
        assignments.insert(AgentId(2), 1);
        assert_eq!(find_patient(medic, &others, &assignments, &cfg), Some(AgentId(3)));
        assignments.insert(AgentId(3), 1);
        assert_eq!(find_patient(medic, &others, &assignments, &cfg), None);
    }

    #[test]
    fn test_release_clears_assignment() {
        let mut medic = Agent::new(AgentId(1), 2, 2, FactionId(0), Mode::Medic);
        let mut assignments = BTreeMap::from([(AgentId(5), 1)]);
        medic.medic.target = Some(AgentId(5));
        medic.medic.path.push_back(3);
        release(&mut assignments, &mut medic);
        assert!(medic.medic.target.is_none());
        assert!(medic.medic.path.is_empty());
        assert!(assignments.is_empty());
    }

    struct Ward {
        grid: Grid,
        occupancy: Vec<Option<AgentId>>,
        config: SimConfig,
        rng: ChaCha8Rng,
        assignments: BTreeMap<AgentId, u32>,
        agents: Vec<Agent>,
    }

    impl Ward {
        /// A 9x9 room holding `agents`, which must be sorted by id.
        fn new(agents: Vec<Agent>) -> Self {
            let config = SimConfig::default();
            let grid = Grid::new(9, 9, 0.21, &config.fields);
            let mut occupancy = vec![None; grid.len()];
            for a in &agents {
                occupancy[grid.index(a.x, a.y).unwrap()] = Some(a.id);
            }
            Self {
                grid,
                occupancy,
                config,
                rng: ChaCha8Rng::seed_from_u64(0),
                assignments: BTreeMap::new(),
                agents,
            }
        }

        /// Context plus the medic (first agent) and everyone else.
        fn split(&mut self) -> (AgentContext<'_>, &mut Agent, Others<'_>) {
            let ctx = AgentContext {
                grid: &mut self.grid,
                occupancy: &mut self.occupancy,
                config: &self.config,
                rng: &mut self.rng,
                assignments: &mut self.assignments,
                tick: 0,
            };
            let (medic, others) = Others::split(&mut self.agents, 0).unwrap();
            (ctx, medic, others)
        }
    }

    #[test]
    fn test_burst_on_adjacent_patient() {
        let config = SimConfig::default();
        let mut ward = Ward::new(vec![
            Agent::new(AgentId(1), 3, 3, FactionId(0), Mode::Medic),
            Agent::new(AgentId(2), 4, 3, FactionId(0), Mode::Panic),
        ]);
        ward.agents[1].state.tension = 0.1;
        let (mut ctx, medic, mut others) = ward.split();
        assert_eq!(medic_step(&mut ctx, medic, &mut others), ctx.grid.index(3, 3));
        assert_eq!(medic.medic.target, Some(AgentId(2)));
        apply_care(&mut ctx, medic, &mut others);
        let patient = others.get(AgentId(2)).unwrap();
        assert!(patient.state.tension > 0.1 + config.medic.burst_tension - 1e-6);
        assert_eq!(medic.medic.cooldown, config.medic.burst_cooldown);
        assert_eq!(ctx.assignments.get(&AgentId(2)), Some(&1));
    }

    #[test]
    fn test_aura_reaches_rival_factions() {
        let config = SimConfig::default();
        let mut ward = Ward::new(vec![
            Agent::new(AgentId(1), 4, 4, FactionId(0), Mode::Medic),
            Agent::new(AgentId(2), 6, 4, FactionId(1), Mode::Calm),
            Agent::new(AgentId(3), 4, 6, FactionId(0), Mode::Calm),
        ]);
        for a in &mut ward.agents[1..] {
            a.state.tension = 0.7;
        }
        let (mut ctx, medic, mut others) = ward.split();
        apply_care(&mut ctx, medic, &mut others);
        for id in [AgentId(2), AgentId(3)] {
            let t = others.get(id).unwrap().state.tension;
            assert!((t - (0.7 + config.medic.aura_tension)).abs() < 1e-6);
        }
        assert_eq!(medic.medic.cooldown, 0);
    }

    #[test]
    fn test_burst_reaches_any_adjacent_agent_in_crisis() {
        let config = SimConfig::default();
        let mut ward = Ward::new(vec![
            Agent::new(AgentId(1), 4, 4, FactionId(0), Mode::Medic),
            Agent::new(AgentId(2), 5, 4, FactionId(2), Mode::Calm),
            Agent::new(AgentId(3), 3, 4, FactionId(0), Mode::Calm),
        ]);
        ward.agents[1].state.tension = 0.1;
        ward.agents[2].state.tension = 0.6;
        let (mut ctx, medic, mut others) = ward.split();
        assert!(medic.medic.target.is_none());
        apply_care(&mut ctx, medic, &mut others);

        let rescued = others.get(AgentId(2)).unwrap();
        let expected = 0.1 + config.medic.aura_tension + config.medic.burst_tension;
        assert!((rescued.state.tension - expected).abs() < 1e-6);
        let bystander = others.get(AgentId(3)).unwrap();
        assert!((bystander.state.tension - (0.6 + config.medic.aura_tension)).abs() < 1e-6);
        assert_eq!(medic.medic.cooldown, config.medic.burst_cooldown);
    }

    #[test]
    fn test_path_yields_to_stronger_help_gradient() {
        let mut ward = Ward::new(vec![
            Agent::new(AgentId(1), 2, 3, FactionId(0), Mode::Medic),
            Agent::new(AgentId(2), 5, 3, FactionId(0), Mode::Panic),
        ]);
        ward.agents[1].state.tension = 0.1;
        let side = ward.grid.index(2, 2).unwrap();
        ward.grid.pheromones.deposit(PheromoneKind::Help, side, 0.5);
        let (mut ctx, medic, mut others) = ward.split();

        assert_eq!(medic_step(&mut ctx, medic, &mut others), Some(side));
        assert_eq!(medic.medic.target, Some(AgentId(2)));
        assert!(medic.medic.path.is_empty());
    }

    #[test]
    fn test_path_followed_without_help_gradient() {
        let mut ward = Ward::new(vec![
            Agent::new(AgentId(1), 2, 3, FactionId(0), Mode::Medic),
            Agent::new(AgentId(2), 5, 3, FactionId(0), Mode::Panic),
        ]);
        ward.agents[1].state.tension = 0.1;
        let (mut ctx, medic, mut others) = ward.split();

        assert_eq!(medic_step(&mut ctx, medic, &mut others), ctx.grid.index(3, 3));
        assert_eq!(medic.medic.path.back(), ctx.grid.index(5, 3).as_ref());
    }
}
