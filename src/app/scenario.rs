//! Built-in starting layouts for the headless runner.

use anyhow::Result;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

use crate::model::pheromone::PheromoneKind;
use crate::model::state::{FactionRef, Mode, TileMaterial};
use crate::model::{PlacementError, SpawnAt, World};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Scenario {
    /// Walls only.
    #[default]
    Empty,
    /// A single fire at (20, 20) with water beside it.
    Fire,
    /// Fire, a canister, vents, an exit and three factions with medics.
    Crowd,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown scenario '{0}' (expected empty, fire or crowd)")]
pub struct UnknownScenario(pub String);

impl FromStr for Scenario {
    type Err = UnknownScenario;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "empty" => Ok(Scenario::Empty),
            "fire" => Ok(Scenario::Fire),
            "crowd" => Ok(Scenario::Crowd),
            _ => Err(UnknownScenario(s.to_string())),
        }
    }
}

/// Agents per faction in the crowd layout.
const CROWD_PER_FACTION: usize = 12;

impl Scenario {
    pub fn apply(self, world: &mut World) -> Result<()> {
        match self {
            Scenario::Empty => Ok(()),
            Scenario::Fire => place_fire(world),
            Scenario::Crowd => {
                place_fire(world)?;
                place_crowd(world)
            }
        }
    }
}

fn tile(world: &World, x: i32, y: i32) -> Result<usize> {
    world
        .grid
        .index(x, y)
        .ok_or_else(|| {
            let (w, h) = (world.grid.width, world.grid.height);
            anyhow::anyhow!("({x}, {y}) is outside the {w}x{h} grid")
        })
}

fn place_fire(world: &mut World) -> Result<()> {
    let fire = tile(world, 20, 20)?;
    let water = tile(world, 21, 20)?;
    world.ignite(fire, 1.0)?;
    world.place_material(water, Some(TileMaterial::new(Mode::Water, 0.6, 0.6, 0.0)))?;
    Ok(())
}

fn place_crowd(world: &mut World) -> Result<()> {
    let (w, h) = (world.grid.width as i32, world.grid.height as i32);

    let canister = tile(world, 26, 22)?;
    world.place_canister(canister, 0.6)?;
    let acid = tile(world, 30, 12)?;
    let base = tile(world, 31, 12)?;
    world.place_material(acid, Some(TileMaterial::new(Mode::Acid, 0.8, 0.5, 0.0)))?;
    world.place_material(base, Some(TileMaterial::new(Mode::Base, 0.8, 0.5, 0.0)))?;

    // Exit on the far wall, marked for the escape cascade.
    for y in (h / 2 - 1)..=(h / 2 + 1) {
        let exit = tile(world, w - 2, y)?;
        world.set_vent(exit, true)?;
        world.deposit_pheromone(PheromoneKind::Door, exit, 1.0)?;
    }

    let mut rng = ChaCha8Rng::seed_from_u64(world.seed());
    for faction in 0..3 {
        let mut placed = 0;
        let mut attempts = 0;
        while placed < CROWD_PER_FACTION && attempts < 1000 {
            attempts += 1;
            let x = rng.gen_range(2..w - 2);
            let y = rng.gen_range(2..h - 2);
            let mode = if placed == 0 { Mode::Medic } else { Mode::Calm };
            match world.spawn(mode, FactionRef::Id(faction), SpawnAt::Coords(x, y)) {
                Ok(_) => placed += 1,
                Err(PlacementError::TileOccupied | PlacementError::Blocked) => continue,
                Err(e) => return Err(e.into()),
            }
        }
        if placed < CROWD_PER_FACTION {
            tracing::warn!(faction = faction, placed = placed, "Crowd faction under-filled");
        }
    }
    Ok(())
}
