use super::{coupling, oxygen_state, ReactionContext};
use crate::config::{ReactionConfig, StepSettings};
use crate::error::PlacementError;
use crate::events::WorldEvent;
use crate::grid::Grid;
use hazardsim_data::{Mode, TileMaterial};
use rand::Rng;

const FIRE_TENSION: f32 = 0.8;

/// Result of feeding a fire from its tile's oxygen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FireOutcome {
    Burning,
    Smothered,
}

/// Converts an open tile to fire.
///
/// The intensity is clamped to `max_fire_amplitude` and never lowers a hotter
/// fire already on the tile. Returns the resulting amplitude. Igniting a
/// canister tile arms its fuse instead of replacing the gas.
pub fn ignite(
    grid: &mut Grid,
    idx: usize,
    intensity: f32,
    config: &ReactionConfig,
) -> Result<f32, PlacementError> {
    if !grid.is_open(idx) {
        return Err(PlacementError::Blocked);
    }
    let intensity = if intensity.is_finite() {
        intensity.clamp(0.0, config.max_fire_amplitude)
    } else {
        0.0
    };

    if let Some(canister) = grid.canisters.get_mut(&idx) {
        if canister.fuse.is_none() {
            canister.integrity = 0.0;
            canister.fuse = Some(config.canister_fuse_ticks.max(1));
        }
        return Ok(intensity);
    }

    let amplitude = match grid.tiles[idx] {
        Some(m) if m.mode == Mode::Fire && m.amplitude >= intensity => return Ok(m.amplitude),
        Some(mut m) if m.mode == Mode::Fire => {
            m.amplitude = intensity;
            grid.tiles[idx] = Some(m);
            intensity
        }
        existing => {
            let phase = existing.map_or(0.0, |m| m.phase);
            grid.foam.remove(&idx);
            grid.set_material(
                idx,
                Some(TileMaterial::new(Mode::Fire, FIRE_TENSION, intensity, phase)),
            );
            intensity
        }
    };
    grid.heat[idx] = grid.heat[idx].max(0.5 * amplitude.min(1.0));
    Ok(amplitude)
}

/// Grows a fire by its coupling with local oxygen, heating the tile and
/// burning oxygen. Below the oxygen cutoff the fire collapses unless the tile
/// sits under an active burner.
pub fn react_fire_oxygen(
    grid: &mut Grid,
    idx: usize,
    settings: &StepSettings,
    config: &ReactionConfig,
) -> FireOutcome {
    let mut fire = match grid.tiles[idx] {
        Some(m) if m.mode == Mode::Fire => m,
        _ => {
            grid.fire.remove(&idx);
            return FireOutcome::Smothered;
        }
    };

    let o2 = grid.o2[idx];
    if o2 < settings.o2_cut && !grid.volatile.contains(&idx) {
        grid.set_material(idx, None);
        return FireOutcome::Smothered;
    }

    let oxygen = oxygen_state(o2, settings.o2_base, fire.phase);
    let c = coupling(&fire, &oxygen);
    fire.amplitude = (fire.amplitude + config.fire_growth * c).min(config.max_fire_amplitude);
    grid.heat[idx] = (grid.heat[idx] + config.fire_heat_gain * fire.amplitude.min(1.0)).min(1.0);
    grid.o2[idx] = (o2 - config.fire_o2_burn * fire.amplitude).max(0.0);
    grid.tiles[idx] = Some(fire);
    FireOutcome::Burning
}

/// Quenches a fire with an adjacent water (or ice) tile.
///
/// The fire's phase rotates by a fixed offset and its amplitude drops by a
/// coupling-scaled amount that is always positive; the water tile warms.
/// Returns `true` once the fire is out.
pub fn react_fire_water(
    grid: &mut Grid,
    fire_idx: usize,
    water_idx: usize,
    config: &ReactionConfig,
) -> bool {
    let mut fire = match grid.tiles.get(fire_idx).copied().flatten() {
        Some(m) if m.mode == Mode::Fire => m,
        _ => return true,
    };
    let water = match grid.tiles.get(water_idx).copied().flatten() {
        Some(m) if m.mode.is_water_or_ice() => m,
        _ => return false,
    };

    let c = coupling(&fire, &water);
    let strength = 0.5 + c;
    fire.rotate(config.water_phase_offset);
    let loss = config.water_quench * strength;
    fire.amplitude = (fire.amplitude - loss).max(0.0);
    grid.heat[water_idx] = (grid.heat[water_idx] + config.water_heat_gain * strength).min(1.0);
    grid.heat[fire_idx] = (grid.heat[fire_idx] - 0.5 * loss).max(0.0);

    if fire.amplitude < config.fire_extinguish_floor {
        grid.set_material(fire_idx, None);
        return true;
    }
    grid.tiles[fire_idx] = Some(fire);
    false
}

/// Runs oxygen feeding, water quenching and spread over the fire set.
pub(crate) fn step_fires(grid: &mut Grid, ctx: &mut ReactionContext) {
    let burning: Vec<usize> = grid.fire.iter().copied().collect();

    for &idx in &burning {
        if react_fire_oxygen(grid, idx, ctx.settings, ctx.config) == FireOutcome::Smothered {
            tracing::debug!(tile = idx, "Fire smothered");
            ctx.events.push(WorldEvent::Smothered { tile: idx });
        }
    }

    for &idx in &burning {
        if !grid.fire.contains(&idx) {
            continue;
        }
        let waters: Vec<usize> = grid
            .neighbors4(idx)
            .filter(|&n| grid.mode_at(n).is_some_and(Mode::is_water_or_ice))
            .collect();
        for water in waters {
            if react_fire_water(grid, idx, water, ctx.config) {
                ctx.events.push(WorldEvent::Extinguished { tile: idx });
                break;
            }
        }
    }

    spread_fire(grid, ctx);
}

fn is_flammable(grid: &Grid, idx: usize) -> bool {
    grid.is_open(idx)
        && !grid.foam.contains_key(&idx)
        && !grid.canisters.contains_key(&idx)
        && matches!(grid.mode_at(idx), None | Some(Mode::Oxygen))
}

fn spread_fire(grid: &mut Grid, ctx: &mut ReactionContext) {
    let config = ctx.config;
    if config.fire_spread_chance <= 0.0 {
        return;
    }
    let burning: Vec<usize> = grid.fire.iter().copied().collect();
    let mut ignitions = Vec::new();
    for idx in burning {
        for n in grid.neighbors4(idx) {
            if is_flammable(grid, n)
                && grid.heat[n] >= config.fire_spread_heat
                && grid.o2[n] >= ctx.settings.o2_cut
                && ctx.rng.gen::<f32>() < config.fire_spread_chance
            {
                ignitions.push(n);
            }
        }
    }
    for n in ignitions {
        // Open and not a canister, so ignition cannot fail here.
        let _ = ignite(grid, n, config.fire_spread_intensity, config);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FieldConfig;

    fn grid() -> Grid {
        Grid::new(8, 8, 0.21, &FieldConfig::default())
    }

    #[test]
    fn test_ignite_wall_is_blocked() {
        let mut g = grid();
        let cfg = ReactionConfig::default();
        assert_eq!(ignite(&mut g, 0, 0.5, &cfg), Err(PlacementError::Blocked));
    }

    #[test]
    fn test_ignite_clamps_and_never_lowers() {
        let mut g = grid();
        let cfg = ReactionConfig::default();
        let idx = g.index(3, 3).unwrap();
        assert_eq!(ignite(&mut g, idx, 9.0, &cfg), Ok(cfg.max_fire_amplitude));
        assert_eq!(ignite(&mut g, idx, 0.2, &cfg), Ok(cfg.max_fire_amplitude));
        assert!(g.fire.contains(&idx));
    }

    #[test]
    fn test_fire_collapses_without_oxygen() {
        let mut g = grid();
        let cfg = ReactionConfig::default();
        let settings = StepSettings::default();
        let idx = g.index(4, 4).unwrap();
        ignite(&mut g, idx, 0.6, &cfg).unwrap();
        g.o2[idx] = 0.05;
        assert_eq!(
            react_fire_oxygen(&mut g, idx, &settings, &cfg),
            FireOutcome::Smothered
        );
        assert!(!g.fire.contains(&idx));
        assert!(g.tiles[idx].is_none());
    }

    #[test]
    fn test_volatile_fire_ignores_cutoff() {
        let mut g = grid();
        let cfg = ReactionConfig::default();
        let settings = StepSettings::default();
        let idx = g.index(4, 4).unwrap();
        ignite(&mut g, idx, 0.6, &cfg).unwrap();
        g.o2[idx] = 0.0;
        g.volatile.insert(idx);
        assert_eq!(
            react_fire_oxygen(&mut g, idx, &settings, &cfg),
            FireOutcome::Burning
        );
    }

    #[test]
    fn test_fire_consumes_oxygen_and_heats() {
        let mut g = grid();
        let cfg = ReactionConfig::default();
        let settings = StepSettings::default();
        let idx = g.index(4, 4).unwrap();
        ignite(&mut g, idx, 0.5, &cfg).unwrap();
        let heat_before = g.heat[idx];
        react_fire_oxygen(&mut g, idx, &settings, &cfg);
        assert!(g.heat[idx] > heat_before);
        assert!(g.o2[idx] < 0.21);
        assert!(g.fire_amplitude(idx) > 0.5);
    }

    #[test]
    fn test_fire_water_without_water_does_nothing() {
        let mut g = grid();
        let cfg = ReactionConfig::default();
        let fire = g.index(3, 3).unwrap();
        let dry = g.index(4, 3).unwrap();
        ignite(&mut g, fire, 1.0, &cfg).unwrap();
        assert!(!react_fire_water(&mut g, fire, dry, &cfg));
        assert_eq!(g.fire_amplitude(fire), 1.0);
    }
}
