//! Stigmergic pheromone fields agents deposit into and sense.

use crate::config::{FieldConfig, FieldParams};
use crate::diffusion::DiffusionEngine;
use serde::{Deserialize, Serialize};

/// Types of pheromones agents can deposit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PheromoneKind {
    Help,    // "someone here needs a medic"
    Route,   // "agents walked through here"
    Panic,   // "someone lost it here"
    Safe,    // "this spot was calm"
    Escape,  // "this way got cooler"
    Door,    // exits, seeded by scenarios
    Visited, // short-lived footprint, discourages loops
}

impl PheromoneKind {
    pub const COUNT: usize = 7;
    pub const ALL: [PheromoneKind; Self::COUNT] = [
        PheromoneKind::Help,
        PheromoneKind::Route,
        PheromoneKind::Panic,
        PheromoneKind::Safe,
        PheromoneKind::Escape,
        PheromoneKind::Door,
        PheromoneKind::Visited,
    ];

    #[inline]
    #[must_use]
    pub fn index(self) -> usize {
        self as usize
    }

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            PheromoneKind::Help => "help",
            PheromoneKind::Route => "route",
            PheromoneKind::Panic => "panic",
            PheromoneKind::Safe => "safe",
            PheromoneKind::Escape => "escape",
            PheromoneKind::Door => "door",
            PheromoneKind::Visited => "visited",
        }
    }

    #[must_use]
    pub fn params(self, config: &FieldConfig) -> FieldParams {
        match self {
            PheromoneKind::Help => config.help,
            PheromoneKind::Route => config.route,
            PheromoneKind::Panic => config.panic,
            PheromoneKind::Safe => config.safe,
            PheromoneKind::Escape => config.escape,
            PheromoneKind::Door => config.door,
            PheromoneKind::Visited => config.visited,
        }
    }
}

/// One `[0, 1]` scalar array per pheromone kind.
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct PheromoneFields {
    fields: Vec<Vec<f32>>,
    pub width: usize,
    pub height: usize,
}

impl PheromoneFields {
    #[must_use]
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            fields: vec![vec![0.0; width * height]; PheromoneKind::COUNT],
            width,
            height,
        }
    }

    #[inline]
    #[must_use]
    pub fn get(&self, kind: PheromoneKind, idx: usize) -> f32 {
        self.fields[kind.index()].get(idx).copied().unwrap_or(0.0)
    }

    #[must_use]
    pub fn field(&self, kind: PheromoneKind) -> &[f32] {
        &self.fields[kind.index()]
    }

    pub fn field_mut(&mut self, kind: PheromoneKind) -> &mut [f32] {
        &mut self.fields[kind.index()]
    }

    pub fn deposit(&mut self, kind: PheromoneKind, idx: usize, amount: f32) {
        if let Some(cell) = self.fields[kind.index()].get_mut(idx) {
            *cell = (*cell + amount).clamp(0.0, 1.0);
        }
    }

    /// Average strength of a pheromone in a square radius.
    #[must_use]
    pub fn sense(&self, kind: PheromoneKind, x: i32, y: i32, radius: i32) -> f32 {
        let field = &self.fields[kind.index()];
        let mut sum = 0.0f32;
        let mut count = 0;
        for dy in -radius..=radius {
            for dx in -radius..=radius {
                let nx = x + dx;
                let ny = y + dy;
                if nx >= 0 && nx < self.width as i32 && ny >= 0 && ny < self.height as i32 {
                    sum += field[ny as usize * self.width + nx as usize];
                    count += 1;
                }
            }
        }
        if count > 0 {
            sum / count as f32
        } else {
            0.0
        }
    }

    /// Diffuses and decays every kind with its own parameters.
    pub fn update(&mut self, engine: &mut DiffusionEngine, wall: &[bool], config: &FieldConfig) {
        for kind in PheromoneKind::ALL {
            engine.apply(&mut self.fields[kind.index()], wall, kind.params(config));
        }
    }

    pub fn clamp_all(&mut self) {
        for field in &mut self.fields {
            for v in field.iter_mut() {
                *v = if v.is_finite() { v.clamp(0.0, 1.0) } else { 0.0 };
            }
        }
    }

    pub fn clear(&mut self) {
        for field in &mut self.fields {
            field.fill(0.0);
        }
    }

    #[must_use]
    pub fn sums(&self) -> [f32; PheromoneKind::COUNT] {
        let mut out = [0.0; PheromoneKind::COUNT];
        for kind in PheromoneKind::ALL {
            out[kind.index()] = self.fields[kind.index()].iter().sum();
        }
        out
    }
}
