use crate::config::ReactionConfig;
use crate::grid::Grid;
use hazardsim_data::Mode;

/// Freezes cold water and melts warm ice across the whole grid.
///
/// Freezing releases a little latent heat back into the tile and melting
/// absorbs it. The latent amount is smaller than the gap between the two
/// thresholds, so a tile never flips back on the following tick.
/// Returns the number of tiles that changed phase.
pub fn apply_phase_transitions(grid: &mut Grid, config: &ReactionConfig) -> usize {
    let mut changed = 0;
    for idx in 0..grid.len() {
        let Some(mut material) = grid.tiles[idx] else {
            continue;
        };
        match material.mode {
            Mode::Water if grid.heat[idx] <= config.freeze_heat => {
                material.mode = Mode::Ice;
                grid.heat[idx] = (grid.heat[idx] + config.latent_heat).min(1.0);
            }
            Mode::Ice if grid.heat[idx] >= config.melt_heat => {
                material.mode = Mode::Water;
                grid.heat[idx] = (grid.heat[idx] - config.latent_heat).max(0.0);
            }
            _ => continue,
        }
        grid.tiles[idx] = Some(material);
        changed += 1;
    }
    changed
}
