//! The tile grid: every per-tile quantity as a flat array indexed `y * width + x`.

use crate::config::{FieldConfig, StepSettings};
use crate::diffusion::DiffusionEngine;
use crate::error::PlacementError;
use crate::pheromone::PheromoneFields;
use crate::reactions::canister::{Burner, Canister};
use crate::reactions::cryofoam::FoamTimer;
use crate::territory::TerritoryFields;
use crate::vector_field::VectorField;
use hazardsim_data::{Mode, TileMaterial};
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

pub const ORTHOGONAL: [(i32, i32); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];
pub const EIGHT_WAY: [(i32, i32); 8] = [
    (1, 0),
    (-1, 0),
    (0, 1),
    (0, -1),
    (1, 1),
    (1, -1),
    (-1, 1),
    (-1, -1),
];

#[derive(Debug, Clone)]
pub struct Grid {
    pub width: usize,
    pub height: usize,
    pub o2_base: f32,
    pub wall: Vec<bool>,
    pub vent: Vec<bool>,
    pub heat: Vec<f32>,
    pub o2: Vec<f32>,
    pub tiles: Vec<Option<TileMaterial>>,
    pub pheromones: PheromoneFields,
    pub memory: VectorField,
    pub presence: VectorField,
    pub territory: TerritoryFields,
    /// Tiles currently combusting, kept in index order.
    pub fire: BTreeSet<usize>,
    pub canisters: BTreeMap<usize, Canister>,
    pub burners: BTreeMap<usize, Burner>,
    pub foam: BTreeMap<usize, FoamTimer>,
    /// Tiles covered by an active burner; their fires ignore the oxygen cutoff.
    pub(crate) volatile: HashSet<usize>,
    /// Last flash tick per (acid, base) contact pair.
    pub(crate) contacts: HashMap<(usize, usize), u64>,
    pub(crate) engine: DiffusionEngine,
}

impl Grid {
    /// Allocates a grid with a wall ring and every field at rest.
    #[must_use]
    pub fn new(width: usize, height: usize, o2_base: f32, fields: &FieldConfig) -> Self {
        let len = width * height;
        let mut wall = vec![false; len];
        for y in 0..height {
            for x in 0..width {
                if x == 0 || y == 0 || x + 1 == width || y + 1 == height {
                    wall[y * width + x] = true;
                }
            }
        }
        let o2 = wall
            .iter()
            .map(|w| if *w { 0.0 } else { o2_base })
            .collect();
        Self {
            width,
            height,
            o2_base,
            wall,
            vent: vec![false; len],
            heat: vec![0.0; len],
            o2,
            tiles: vec![None; len],
            pheromones: PheromoneFields::new(width, height),
            memory: VectorField::new(len, 1.0),
            presence: VectorField::new(len, 1.0),
            territory: TerritoryFields::new(len),
            fire: BTreeSet::new(),
            canisters: BTreeMap::new(),
            burners: BTreeMap::new(),
            foam: BTreeMap::new(),
            volatile: HashSet::new(),
            contacts: HashMap::new(),
            engine: DiffusionEngine::new(width, height, fields),
        }
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.width * self.height
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[inline]
    #[must_use]
    pub fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && (x as usize) < self.width && (y as usize) < self.height
    }

    #[inline]
    #[must_use]
    pub fn index(&self, x: i32, y: i32) -> Option<usize> {
        self.in_bounds(x, y)
            .then(|| y as usize * self.width + x as usize)
    }

    #[inline]
    #[must_use]
    pub fn coords(&self, idx: usize) -> (i32, i32) {
        ((idx % self.width) as i32, (idx / self.width) as i32)
    }

    #[must_use]
    pub fn is_border(&self, idx: usize) -> bool {
        let (x, y) = self.coords(idx);
        x == 0 || y == 0 || x as usize + 1 == self.width || y as usize + 1 == self.height
    }

    #[inline]
    #[must_use]
    pub fn is_open(&self, idx: usize) -> bool {
        idx < self.wall.len() && !self.wall[idx]
    }

    #[must_use]
    pub fn has_open_tile(&self) -> bool {
        self.wall.iter().any(|w| !w)
    }

    /// In-bounds neighbor at an offset.
    #[inline]
    #[must_use]
    pub fn offset(&self, idx: usize, dx: i32, dy: i32) -> Option<usize> {
        let (x, y) = self.coords(idx);
        self.index(x + dx, y + dy)
    }

    pub fn neighbors4(&self, idx: usize) -> impl Iterator<Item = usize> + '_ {
        ORTHOGONAL
            .iter()
            .filter_map(move |&(dx, dy)| self.offset(idx, dx, dy))
    }

    pub fn neighbors8(&self, idx: usize) -> impl Iterator<Item = usize> + '_ {
        EIGHT_WAY
            .iter()
            .filter_map(move |&(dx, dy)| self.offset(idx, dx, dy))
    }

    #[inline]
    #[must_use]
    pub fn mode_at(&self, idx: usize) -> Option<Mode> {
        self.tiles.get(idx).and_then(|t| t.map(|m| m.mode))
    }

    #[must_use]
    pub fn has_neighbor_mode(&self, idx: usize, mode: Mode) -> bool {
        self.neighbors4(idx).any(|n| self.mode_at(n) == Some(mode))
    }

    /// Fire amplitude on a tile, zero when it is not burning.
    #[must_use]
    pub fn fire_amplitude(&self, idx: usize) -> f32 {
        match self.tiles[idx] {
            Some(m) if m.mode == Mode::Fire => m.amplitude,
            _ => 0.0,
        }
    }

    /// Replaces a tile's material, keeping the fire set in sync.
    pub fn set_material(&mut self, idx: usize, material: Option<TileMaterial>) {
        if idx >= self.tiles.len() {
            return;
        }
        let material = material.map(TileMaterial::normalized);
        match material {
            Some(m) if m.mode == Mode::Fire => {
                self.fire.insert(idx);
            }
            _ => {
                self.fire.remove(&idx);
            }
        }
        self.tiles[idx] = material;
    }

    /// Walls or opens a tile. The border ring can never be opened.
    pub fn set_wall(&mut self, idx: usize, wall: bool) -> Result<(), PlacementError> {
        if idx >= self.len() || (!wall && self.is_border(idx)) {
            return Err(PlacementError::Blocked);
        }
        self.wall[idx] = wall;
        if wall {
            self.set_material(idx, None);
            self.vent[idx] = false;
            self.o2[idx] = 0.0;
            self.canisters.remove(&idx);
            self.foam.remove(&idx);
        }
        Ok(())
    }

    pub fn set_vent(&mut self, idx: usize, vent: bool) -> Result<(), PlacementError> {
        if !self.is_open(idx) {
            return Err(PlacementError::Blocked);
        }
        self.vent[idx] = vent;
        if vent {
            self.o2[idx] = self.o2_base;
        }
        Ok(())
    }

    /// Heat and oxygen diffusion plus every pheromone and memory field.
    ///
    /// Presence and the per-faction fields are advanced by the territory pass.
    pub fn diffuse_fields(&mut self, settings: &StepSettings, fields: &FieldConfig) {
        self.engine.diffuse(&mut self.heat, &self.wall, settings.d_heat);
        self.engine.diffuse(&mut self.o2, &self.wall, settings.d_o2);
        self.pheromones
            .update(&mut self.engine, &self.wall, fields);
        self.memory
            .update(&mut self.engine, &self.wall, fields.memory);
        self.hold_vents();
    }

    pub fn hold_vents(&mut self) {
        for (idx, vent) in self.vent.iter().enumerate() {
            if *vent && !self.wall[idx] {
                self.o2[idx] = self.o2_base;
            }
        }
    }

    /// Clamps every field into its valid range and scrubs non-finite values.
    pub fn clamp_all(&mut self) {
        let o2_base = self.o2_base;
        for v in &mut self.heat {
            *v = if v.is_finite() { v.clamp(0.0, 1.0) } else { 0.0 };
        }
        for v in &mut self.o2 {
            *v = if v.is_finite() { v.clamp(0.0, o2_base) } else { 0.0 };
        }
        self.hold_vents();
        self.pheromones.clamp_all();
        self.territory.clamp_all();
        for tile in self.tiles.iter_mut().flatten() {
            *tile = tile.normalized();
        }
    }

    #[must_use]
    pub fn heat_sum(&self) -> f32 {
        self.heat.iter().sum()
    }

    #[must_use]
    pub fn o2_sum(&self) -> f32 {
        self.o2.iter().sum()
    }
}
