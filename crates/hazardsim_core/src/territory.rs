//! Faction territory derived from the presence vector field.
//!
//! Agents deposit presence along their faction's basis angle. Each tick the
//! presence field is diffused, then every open tile is assigned a dominant
//! faction and a control level, and three per-faction signals are derived
//! from that: frontier (contested borders), debt (recently lost ground) and
//! reinforcement (firmly held ground).

use crate::config::{FieldConfig, FieldParams, TerritoryConfig};
use crate::diffusion::DiffusionEngine;
use crate::error::SimError;
use crate::grid::Grid;
use hazardsim_data::{is_friendly, is_hostile, FactionId, FACTION_COUNT};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct TerritoryFields {
    pub dominant: Vec<Option<FactionId>>,
    pub control: Vec<f32>,
    prev_dominant: Vec<Option<FactionId>>,
    prev_control: Vec<f32>,
    pub frontier: [Vec<f32>; FACTION_COUNT],
    pub debt: [Vec<f32>; FACTION_COUNT],
    pub reinforce: [Vec<f32>; FACTION_COUNT],
}

/// Totals of the per-faction fields, summed over factions.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq)]
pub struct TerritorySums {
    pub frontier: f32,
    pub debt: f32,
    pub reinforce: f32,
}

impl TerritoryFields {
    #[must_use]
    pub fn new(len: usize) -> Self {
        Self {
            dominant: vec![None; len],
            control: vec![0.0; len],
            prev_dominant: vec![None; len],
            prev_control: vec![0.0; len],
            frontier: std::array::from_fn(|_| vec![0.0; len]),
            debt: std::array::from_fn(|_| vec![0.0; len]),
            reinforce: std::array::from_fn(|_| vec![0.0; len]),
        }
    }

    /// `1 - |2c - 1|`: zero when uncontrolled or fully held, one at an even split.
    #[inline]
    #[must_use]
    pub fn contest(&self, idx: usize) -> f32 {
        let c = self.control.get(idx).copied().unwrap_or(0.0);
        1.0 - (2.0 * c - 1.0).abs()
    }

    pub fn clamp_all(&mut self) {
        for v in &mut self.control {
            *v = if v.is_finite() { v.clamp(0.0, 1.0) } else { 0.0 };
        }
        for field in self
            .frontier
            .iter_mut()
            .chain(self.debt.iter_mut())
            .chain(self.reinforce.iter_mut())
        {
            for v in field.iter_mut() {
                *v = if v.is_finite() { v.clamp(0.0, 1.0) } else { 0.0 };
            }
        }
    }

    pub fn clear(&mut self) {
        let len = self.control.len();
        *self = Self::new(len);
    }

    #[must_use]
    pub fn sums(&self) -> TerritorySums {
        let total = |fields: &[Vec<f32>; FACTION_COUNT]| -> f32 {
            fields.iter().map(|f| f.iter().sum::<f32>()).sum()
        };
        TerritorySums {
            frontier: total(&self.frontier),
            debt: total(&self.debt),
            reinforce: total(&self.reinforce),
        }
    }

    /// Fails on the first control or per-faction value outside `[0, 1]`.
    pub fn check_invariants(&self) -> Result<(), SimError> {
        let in_unit = |v: f32| v.is_finite() && (0.0..=1.0).contains(&v);
        if let Some((i, &v)) = self.control.iter().enumerate().find(|(_, v)| !in_unit(**v)) {
            return Err(SimError::invariant("control", i, v));
        }
        for (name, fields) in [
            ("frontier", &self.frontier),
            ("debt", &self.debt),
            ("reinforce", &self.reinforce),
        ] {
            for (f, field) in fields.iter().enumerate() {
                if let Some((i, &v)) = field.iter().enumerate().find(|(_, v)| !in_unit(**v)) {
                    return Err(SimError::invariant(format!("{name}[{f}]"), i, v));
                }
            }
        }
        Ok(())
    }
}

/// Positive projection of the presence vector onto every faction basis.
fn shares(grid: &Grid, idx: usize) -> [f32; FACTION_COUNT] {
    let mut out = [0.0; FACTION_COUNT];
    for faction in FactionId::all() {
        out[faction.index()] = grid.presence.project_basis(idx, faction.basis()).max(0.0);
    }
    out
}

/// Dominant faction and control level of one tile.
///
/// Control is the winning positive projection over the sum of all positive
/// projections, so it always lies in `[0, 1]`. Walls and tiles with no net
/// presence have no owner and zero control.
#[must_use]
pub fn compute_control(grid: &Grid, idx: usize) -> (Option<FactionId>, f32) {
    if grid.wall[idx] {
        return (None, 0.0);
    }
    let s = shares(grid, idx);
    let sum: f32 = s.iter().sum();
    if sum <= 0.0 || !sum.is_finite() {
        return (None, 0.0);
    }
    let (best, value) = s
        .iter()
        .copied()
        .enumerate()
        .fold((0, f32::MIN), |acc, (i, v)| if v > acc.1 { (i, v) } else { acc });
    (FactionId::from_index(best), (value / sum).clamp(0.0, 1.0))
}

/// Presence deposit for one agent, scaled by how habitable its tile is.
pub fn deposit_presence(
    grid: &mut Grid,
    idx: usize,
    faction: FactionId,
    amount: f32,
) {
    if !grid.is_open(idx) {
        return;
    }
    let heat = grid.heat[idx].clamp(0.0, 1.0);
    let o2 = if grid.o2_base > 0.0 {
        (grid.o2[idx] / grid.o2_base).clamp(0.0, 1.0)
    } else {
        0.0
    };
    let favorability = (1.0 - heat) * o2;
    grid.presence
        .deposit(idx, faction.safe_phase(), amount * favorability);
}

/// An agent crossing from its faction's reinforced ground into a contested
/// tile pushes frontier pressure onto that tile.
pub fn reinforcement_push(
    grid: &mut Grid,
    from: usize,
    to: usize,
    faction: FactionId,
    config: &TerritoryConfig,
) {
    let f = faction.index();
    let territory = &mut grid.territory;
    let Some(&held) = territory.reinforce[f].get(from) else {
        return;
    };
    if held < config.reinforce_min || territory.contest(to) <= config.contest_threshold {
        return;
    }
    if let Some(v) = territory.frontier[f].get_mut(to) {
        *v = (*v + config.reinforce_push * held).min(1.0);
    }
}

fn diffuse_each(
    engine: &mut DiffusionEngine,
    wall: &[bool],
    fields: &mut [Vec<f32>; FACTION_COUNT],
    params: FieldParams,
) {
    for field in fields.iter_mut() {
        engine.apply(field, wall, params);
    }
}

/// Advances presence and every derived territory signal by one tick.
pub fn update_territory(grid: &mut Grid, fields: &FieldConfig, config: &TerritoryConfig) {
    grid.presence
        .update(&mut grid.engine, &grid.wall, fields.presence);

    let len = grid.len();
    let mut territory = std::mem::take(&mut grid.territory);
    std::mem::swap(&mut territory.prev_dominant, &mut territory.dominant);
    std::mem::swap(&mut territory.prev_control, &mut territory.control);

    for idx in 0..len {
        let (owner, control) = compute_control(grid, idx);
        territory.dominant[idx] = owner;
        territory.control[idx] = control;
    }

    // Frontier: contested tiles whose neighborhood holds both friends and foes.
    for idx in 0..len {
        if grid.wall[idx] {
            continue;
        }
        let contest = territory.contest(idx);
        if contest <= config.contest_threshold {
            continue;
        }
        let owners: Vec<FactionId> = grid
            .neighbors4(idx)
            .filter_map(|n| territory.dominant[n])
            .collect();
        for faction in FactionId::all() {
            let friend = owners.iter().any(|&o| is_friendly(faction, o));
            let foe = owners.iter().any(|&o| is_hostile(faction, o));
            if friend && foe {
                let v = &mut territory.frontier[faction.index()][idx];
                *v = (*v + config.frontier_gain * contest).min(1.0);
            }
        }
    }
    diffuse_each(&mut grid.engine, &grid.wall, &mut territory.frontier, fields.frontier);

    // Debt: ground that was held last tick and has slipped to a hostile side.
    for idx in 0..len {
        let Some(old) = territory.prev_dominant[idx] else {
            continue;
        };
        let was = territory.prev_control[idx];
        if was <= config.held_threshold || grid.wall[idx] {
            continue;
        }
        let s = shares(grid, idx);
        let sum: f32 = s.iter().sum();
        let kept = if sum > 0.0 { s[old.index()] / sum } else { 0.0 };
        let lost = match territory.dominant[idx] {
            Some(new) if new != old => is_hostile(old, new),
            Some(_) if territory.control[idx] < config.lost_threshold => {
                // Still nominally ours; blame the strongest rival.
                s.iter()
                    .enumerate()
                    .filter(|&(i, _)| i != old.index())
                    .max_by(|a, b| a.1.total_cmp(b.1))
                    .and_then(|(i, &v)| (v > 0.0).then_some(i))
                    .and_then(FactionId::from_index)
                    .is_some_and(|rival| is_hostile(old, rival))
            }
            _ => false,
        };
        if lost {
            let amount = config.debt_gain * (was - kept).max(0.0);
            let v = &mut territory.debt[old.index()][idx];
            *v = (*v + amount).min(1.0);
        }
    }
    diffuse_each(&mut grid.engine, &grid.wall, &mut territory.debt, fields.debt);

    // Reinforcement: firmly held ground.
    for idx in 0..len {
        let Some(owner) = territory.dominant[idx] else {
            continue;
        };
        let c = territory.control[idx];
        if c > config.reinforce_threshold {
            let v = &mut territory.reinforce[owner.index()][idx];
            *v = (*v + config.reinforce_gain * (c - config.reinforce_threshold)).min(1.0);
        }
    }
    diffuse_each(&mut grid.engine, &grid.wall, &mut territory.reinforce, fields.reinforce);

    grid.territory = territory;
}
