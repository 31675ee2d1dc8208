pub mod macros;

use hazardsim_lib::model::config::SimConfig;
use hazardsim_lib::model::state::{FactionRef, Mode, TileMaterial};
use hazardsim_lib::model::{SpawnAt, StepSettings, World};

type WorldMod = Box<dyn FnOnce(&mut World)>;

#[allow(dead_code)]
pub struct WorldBuilder {
    config: SimConfig,
    mods: Vec<WorldMod>,
}

#[allow(dead_code)]
impl WorldBuilder {
    /// 80x45, seeded, deterministic, with invariant assertions on.
    pub fn new() -> Self {
        let mut config = SimConfig::default();
        config.world.seed = Some(42);
        config.world.deterministic = true;
        config.debug.assert_invariants = true;
        Self {
            config,
            mods: Vec::new(),
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.config.world.seed = Some(seed);
        self
    }

    pub fn with_size(mut self, width: u16, height: u16) -> Self {
        self.config.world.width = width;
        self.config.world.height = height;
        self
    }

    pub fn with_config<F>(mut self, modifier: F) -> Self
    where
        F: FnOnce(&mut SimConfig),
    {
        modifier(&mut self.config);
        self
    }

    pub fn with_wall(mut self, x: i32, y: i32) -> Self {
        self.mods.push(Box::new(move |world| {
            let idx = world.grid.index(x, y).expect("wall out of bounds");
            world.set_wall(idx, true).expect("wall placement failed");
        }));
        self
    }

    pub fn with_fire(mut self, x: i32, y: i32, intensity: f32) -> Self {
        self.mods.push(Box::new(move |world| {
            let idx = world.grid.index(x, y).expect("fire out of bounds");
            world.ignite(idx, intensity).expect("ignition failed");
        }));
        self
    }

    pub fn with_material(
        mut self,
        x: i32,
        y: i32,
        mode: Mode,
        tension: f32,
        amplitude: f32,
    ) -> Self {
        self.mods.push(Box::new(move |world| {
            let idx = world.grid.index(x, y).expect("material out of bounds");
            world
                .place_material(idx, Some(TileMaterial::new(mode, tension, amplitude, 0.0)))
                .expect("material placement failed");
        }));
        self
    }

    pub fn with_heat(mut self, x: i32, y: i32, heat: f32) -> Self {
        self.mods.push(Box::new(move |world| {
            let idx = world.grid.index(x, y).expect("heat out of bounds");
            world.set_heat(idx, heat).expect("heat placement failed");
        }));
        self
    }

    pub fn with_canister(mut self, x: i32, y: i32, charge: f32) -> Self {
        self.mods.push(Box::new(move |world| {
            let idx = world.grid.index(x, y).expect("canister out of bounds");
            world.place_canister(idx, charge).expect("canister placement failed");
        }));
        self
    }

    pub fn with_agent(mut self, mode: Mode, faction: usize, x: i32, y: i32) -> Self {
        self.mods.push(Box::new(move |world| {
            world
                .spawn(mode, FactionRef::Id(faction), SpawnAt::Coords(x, y))
                .expect("spawn failed");
        }));
        self
    }

    pub fn build(self) -> World {
        let mut world = World::new(self.config).expect("Failed to create world in test builder");
        for modifier in self.mods {
            modifier(&mut world);
        }
        world
    }
}

/// Steps `n` ticks with default settings, panicking on any tick error.
#[allow(dead_code)]
pub fn run_ticks(world: &mut World, n: u64) {
    let settings = StepSettings::default();
    for _ in 0..n {
        world.step(&settings).expect("tick failed");
    }
}
