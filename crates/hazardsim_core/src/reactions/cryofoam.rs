use crate::config::ReactionConfig;
use crate::error::PlacementError;
use crate::events::WorldEvent;
use crate::grid::Grid;
use hazardsim_data::{Mode, TileMaterial};
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

const FOAM_TENSION: f32 = 0.8;
const CHILD_AMPLITUDE: f32 = 0.6;

/// What a foamed tile looked like before the foam landed, and how long it stays.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FoamTimer {
    pub original: Option<TileMaterial>,
    pub original_wall: bool,
    pub original_vent: bool,
    pub remaining: u32,
}

/// Lays cryofoam on an open tile, remembering what to restore at expiry.
///
/// Foam on a burning tile puts the fire out for good. Re-foaming an already
/// foamed tile only refreshes its lifetime and amplitude.
pub fn deposit_cryofoam(
    grid: &mut Grid,
    idx: usize,
    lifetime: u32,
    amplitude: f32,
    config: &ReactionConfig,
) -> Result<(), PlacementError> {
    if !grid.is_open(idx) || grid.canisters.contains_key(&idx) {
        return Err(PlacementError::Blocked);
    }
    let lifetime = lifetime.max(1);
    if let Some(timer) = grid.foam.get_mut(&idx) {
        timer.remaining = timer.remaining.max(lifetime);
        if let Some(m) = grid.tiles[idx].as_mut() {
            m.amplitude = m.amplitude.max(amplitude);
        }
        return Ok(());
    }

    let original = match grid.tiles[idx] {
        Some(m) if m.mode == Mode::Fire => None,
        other => other,
    };
    grid.foam.insert(
        idx,
        FoamTimer {
            original,
            original_wall: grid.wall[idx],
            original_vent: grid.vent[idx],
            remaining: lifetime,
        },
    );
    grid.vent[idx] = false;
    grid.set_material(
        idx,
        Some(TileMaterial::new(Mode::Cryofoam, FOAM_TENSION, amplitude, 0.0)),
    );
    grid.heat[idx] = grid.heat[idx].min(config.foam_heat_cap);
    Ok(())
}

fn restore(grid: &mut Grid, idx: usize, timer: FoamTimer) {
    grid.wall[idx] = timer.original_wall;
    grid.vent[idx] = timer.original_vent;
    grid.set_material(idx, timer.original);
}

fn touches_water_or_ice(grid: &Grid, idx: usize) -> bool {
    grid.mode_at(idx).is_some_and(Mode::is_water_or_ice)
        || grid
            .neighbors4(idx)
            .any(|n| grid.mode_at(n).is_some_and(Mode::is_water_or_ice))
}

/// Ages every foam tile: caps heat, bleeds amplitude, erodes near acid,
/// freezes solid against base, reverts at expiry and creeps over cold water.
pub(crate) fn step_cryofoam(
    grid: &mut Grid,
    config: &ReactionConfig,
    rng: &mut ChaCha8Rng,
    events: &mut Vec<WorldEvent>,
) {
    let foamed: Vec<usize> = grid.foam.keys().copied().collect();
    let mut children: Vec<(usize, u32, f32)> = Vec::new();

    for idx in foamed {
        let Some(mut timer) = grid.foam.get(&idx).copied() else {
            continue;
        };
        let mut foam = match grid.tiles[idx] {
            Some(m) if m.mode == Mode::Cryofoam => m,
            _ => {
                // Overwritten from outside; nothing left to restore into.
                grid.foam.remove(&idx);
                continue;
            }
        };

        grid.heat[idx] = grid.heat[idx].min(config.foam_heat_cap);
        foam.amplitude = (foam.amplitude - config.foam_amplitude_loss).max(0.0);

        if grid.has_neighbor_mode(idx, Mode::Base) {
            grid.foam.remove(&idx);
            grid.wall[idx] = timer.original_wall;
            grid.vent[idx] = false;
            grid.set_material(
                idx,
                Some(TileMaterial::new(Mode::Ice, 0.6, foam.amplitude.max(0.1), foam.phase)),
            );
            events.push(WorldEvent::FoamFrozen { tile: idx });
            continue;
        }

        let erosion = if grid.has_neighbor_mode(idx, Mode::Acid) {
            1 + config.foam_acid_erosion
        } else {
            1
        };
        timer.remaining = timer.remaining.saturating_sub(erosion);

        if timer.remaining == 0 || foam.amplitude <= 0.0 {
            grid.foam.remove(&idx);
            restore(grid, idx, timer);
            events.push(WorldEvent::FoamExpired { tile: idx });
            continue;
        }

        grid.tiles[idx] = Some(foam);
        grid.foam.insert(idx, timer);

        if grid.heat[idx] <= config.foam_expand_heat
            && foam.amplitude >= config.foam_spread_min_amplitude
        {
            for n in grid.neighbors8(idx) {
                if grid.is_open(n)
                    && !grid.foam.contains_key(&n)
                    && !grid.canisters.contains_key(&n)
                    && !matches!(grid.mode_at(n), Some(Mode::Fire | Mode::Cryofoam))
                    && touches_water_or_ice(grid, n)
                    && rng.gen::<f32>() < config.foam_spread_chance
                {
                    let lifetime = (timer.remaining / 2).max(1);
                    children.push((n, lifetime, foam.amplitude * CHILD_AMPLITUDE));
                }
            }
        }
    }

    for (idx, lifetime, amplitude) in children {
        if !grid.foam.contains_key(&idx) {
            // Children were only collected for open, non-canister tiles.
            let _ = deposit_cryofoam(grid, idx, lifetime, amplitude, config);
        }
    }
}
