use super::coupling;
use crate::config::ReactionConfig;
use crate::events::WorldEvent;
use crate::grid::Grid;
use hazardsim_data::{Mode, TileMaterial};

/// Result of one acid/base contact.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AcidBaseOutcome {
    pub reacted: bool,
    pub flash: Option<bool>,
    pub neutralized: bool,
}

/// Reacts an acid tile with a base tile.
///
/// Both tensions drop in proportion to their coupling. Heat is released on the
/// base side only. A flash event fires on first contact and then at most once
/// every `flash_repeat_ticks` for the same pair. When both sides are spent they
/// settle into water.
pub fn react_acid_base(
    grid: &mut Grid,
    acid_idx: usize,
    base_idx: usize,
    config: &ReactionConfig,
    tick: u64,
    events: &mut Vec<WorldEvent>,
) -> AcidBaseOutcome {
    let mut outcome = AcidBaseOutcome {
        reacted: false,
        flash: None,
        neutralized: false,
    };
    let (mut acid, mut base) = match (
        grid.tiles.get(acid_idx).copied().flatten(),
        grid.tiles.get(base_idx).copied().flatten(),
    ) {
        (Some(a), Some(b)) if a.mode == Mode::Acid && b.mode == Mode::Base => (a, b),
        _ => return outcome,
    };

    let strength = 0.25 + 0.75 * coupling(&acid, &base);
    let rate = (config.acid_base_rate * strength).clamp(0.0, 1.0);
    acid.tension -= acid.tension * rate;
    base.tension -= base.tension * rate;
    grid.heat[base_idx] = (grid.heat[base_idx] + config.acid_base_heat * strength).min(1.0);
    outcome.reacted = true;

    let key = (acid_idx, base_idx);
    let flash = match grid.contacts.get(&key) {
        None => Some(true),
        Some(&last) if tick.saturating_sub(last) >= config.flash_repeat_ticks => Some(false),
        Some(_) => None,
    };
    if let Some(first_contact) = flash {
        grid.contacts.insert(key, tick);
        events.push(WorldEvent::Flash {
            tile: base_idx,
            first_contact,
        });
    }
    outcome.flash = flash;

    if acid.tension < config.neutralize_tension && base.tension < config.neutralize_tension {
        let water = TileMaterial::new(Mode::Water, 0.5, 0.2, base.phase);
        grid.set_material(acid_idx, Some(water));
        grid.set_material(base_idx, Some(water));
        grid.contacts.remove(&key);
        outcome.neutralized = true;
    } else {
        grid.tiles[acid_idx] = Some(acid);
        grid.tiles[base_idx] = Some(base);
    }
    outcome
}

/// Reacts every acid tile with its orthogonal base neighbors, in index order.
pub(crate) fn step_acid_base(
    grid: &mut Grid,
    config: &ReactionConfig,
    tick: u64,
    events: &mut Vec<WorldEvent>,
) {
    let pairs: Vec<(usize, usize)> = (0..grid.len())
        .filter(|&i| grid.mode_at(i) == Some(Mode::Acid))
        .flat_map(|i| {
            grid.neighbors4(i)
                .filter(|&n| grid.mode_at(n) == Some(Mode::Base))
                .map(move |n| (i, n))
                .collect::<Vec<_>>()
        })
        .collect();
    for (acid, base) in pairs {
        react_acid_base(grid, acid, base, config, tick, events);
    }

    // Forget pairs that have been apart long enough to count as a fresh contact.
    let horizon = config.flash_repeat_ticks.saturating_mul(4).max(1);
    grid.contacts
        .retain(|_, last| tick.saturating_sub(*last) <= horizon);
}
