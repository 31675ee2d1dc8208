use crate::config::ReactionConfig;
use crate::error::PlacementError;
use crate::events::WorldEvent;
use crate::grid::Grid;
use hazardsim_data::{Mode, TileMaterial};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, VecDeque};

/// A sealed reactive-gas canister sitting on one tile.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Canister {
    /// Remaining shell integrity in `[0, 1]`; the fuse arms at zero.
    pub integrity: f32,
    /// Gas charge in `[0, 1]`, widens the blast.
    pub charge: f32,
    /// Ticks until detonation once armed.
    pub fuse: Option<u32>,
}

/// Lingering burn left behind by a detonation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Burner {
    pub tiles: Vec<usize>,
    pub ticks_left: u32,
}

/// Places a canister on an open tile, replacing its material with reactive gas.
pub fn place_canister(grid: &mut Grid, idx: usize, charge: f32) -> Result<(), PlacementError> {
    if !grid.is_open(idx) {
        return Err(PlacementError::Blocked);
    }
    let charge = if charge.is_finite() {
        charge.clamp(0.0, 1.0)
    } else {
        0.0
    };
    grid.foam.remove(&idx);
    grid.set_material(
        idx,
        Some(TileMaterial::new(Mode::ReactiveGas, charge, 0.5 + charge, 0.0)),
    );
    grid.canisters.insert(
        idx,
        Canister {
            integrity: 1.0,
            charge,
            fuse: None,
        },
    );
    Ok(())
}

/// Blast radius for a given charge.
#[must_use]
pub fn blast_radius(charge: f32, config: &ReactionConfig) -> u32 {
    let extra = charge.clamp(0.0, 1.0) * config.canister_charge_radius;
    config.canister_base_radius + extra.round() as u32
}

/// Detonates the canister on `idx`.
///
/// A breadth-first flood over open tiles reaches every tile within the blast
/// radius; each one becomes fire at full heat and loses oxygen in proportion
/// to the flood distance still remaining there. Other canisters caught in the
/// blast are armed with a one-tick fuse rather than consumed, so chains go off
/// on consecutive ticks. Returns the radius used, or `None` when no canister
/// sits on the tile.
pub fn detonate(
    grid: &mut Grid,
    idx: usize,
    config: &ReactionConfig,
    events: &mut Vec<WorldEvent>,
) -> Option<u32> {
    let canister = grid.canisters.remove(&idx)?;
    let radius = blast_radius(canister.charge, config);

    let mut dist = vec![u32::MAX; grid.len()];
    let mut queue = VecDeque::new();
    let mut reached = Vec::new();
    dist[idx] = 0;
    queue.push_back(idx);
    while let Some(cur) = queue.pop_front() {
        reached.push(cur);
        let d = dist[cur];
        if d == radius {
            continue;
        }
        let next: Vec<usize> = grid.neighbors4(cur).filter(|&n| grid.is_open(n)).collect();
        for n in next {
            if dist[n] == u32::MAX {
                dist[n] = d + 1;
                queue.push_back(n);
            }
        }
    }

    let base = grid.o2_base;
    let amplitude = config.max_fire_amplitude.min(1.0 + canister.charge);
    for &tile in &reached {
        let remaining = (radius - dist[tile] + 1) as f32 / (radius + 1) as f32;
        grid.heat[tile] = 1.0;
        grid.o2[tile] = (grid.o2[tile] - base * config.canister_o2_deplete * remaining).max(0.0);
        if let Some(other) = grid.canisters.get_mut(&tile) {
            other.integrity = 0.0;
            other.fuse = Some(other.fuse.map_or(1, |f| f.min(1)));
            continue;
        }
        grid.foam.remove(&tile);
        grid.set_material(
            tile,
            Some(TileMaterial::new(Mode::Fire, 0.8, amplitude, 0.0)),
        );
    }

    let tiles: Vec<usize> = reached
        .into_iter()
        .filter(|t| !grid.canisters.contains_key(t))
        .collect();
    tracing::debug!(tile = idx, radius, tiles = tiles.len(), "Canister detonated");
    grid.burners.insert(
        idx,
        Burner {
            tiles,
            ticks_left: config.burner_ticks,
        },
    );
    events.push(WorldEvent::Detonation { tile: idx, radius });
    Some(radius)
}

/// Keeps burner areas alight and rebuilds the volatile tile set.
pub(crate) fn step_burners(grid: &mut Grid, config: &ReactionConfig) {
    grid.volatile.clear();
    let mut expired = Vec::new();
    let mut relight = BTreeSet::new();
    for (&origin, burner) in &mut grid.burners {
        if burner.ticks_left == 0 {
            expired.push(origin);
            continue;
        }
        burner.ticks_left -= 1;
        relight.extend(burner.tiles.iter().copied());
    }
    for origin in expired {
        grid.burners.remove(&origin);
    }

    let intensity = config.burner_intensity.min(config.max_fire_amplitude);
    for idx in relight {
        if !grid.is_open(idx) || grid.canisters.contains_key(&idx) {
            continue;
        }
        grid.volatile.insert(idx);
        match grid.tiles[idx] {
            Some(m) if m.mode == Mode::Fire && m.amplitude >= intensity => {}
            Some(mut m) if m.mode == Mode::Fire => {
                m.amplitude = intensity;
                grid.tiles[idx] = Some(m);
            }
            Some(m) if m.mode.is_water_or_ice() || m.mode == Mode::Cryofoam => {}
            _ => grid.set_material(
                idx,
                Some(TileMaterial::new(Mode::Fire, 0.8, intensity, 0.0)),
            ),
        }
    }
}

/// Wears down canister shells and fires any whose fuse has run out.
pub(crate) fn step_canisters(
    grid: &mut Grid,
    config: &ReactionConfig,
    events: &mut Vec<WorldEvent>,
) {
    let placed: Vec<usize> = grid.canisters.keys().copied().collect();
    let mut due = Vec::new();
    for idx in placed {
        let heat = grid.heat[idx];
        let near_fire = grid
            .neighbors4(idx)
            .any(|n| grid.fire.contains(&n) || grid.volatile.contains(&n));
        let Some(canister) = grid.canisters.get_mut(&idx) else {
            continue;
        };
        match canister.fuse {
            Some(0) | Some(1) => due.push(idx),
            Some(f) => canister.fuse = Some(f - 1),
            None => {
                let mut wear = 0.0;
                if heat > config.canister_heat_threshold {
                    wear += config.canister_heat_decay * (heat - config.canister_heat_threshold)
                        / (1.0 - config.canister_heat_threshold).max(f32::EPSILON);
                }
                if near_fire {
                    wear += config.canister_fire_decay;
                }
                canister.integrity = (canister.integrity - wear).max(0.0);
                if canister.integrity <= 0.0 {
                    canister.fuse = Some(config.canister_fuse_ticks.max(1));
                    tracing::debug!(tile = idx, "Canister fuse armed");
                }
            }
        }
    }
    for idx in due {
        detonate(grid, idx, config, events);
    }
}
