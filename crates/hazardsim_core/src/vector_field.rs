//! Phase-tagged 2D accumulators (memory and faction presence).
//!
//! A deposit of `amount` at phase `φ` adds `(cos φ, sin φ) · amount`. Queries
//! project the stored vector back onto a target phase, so deposits made at
//! nearby phases reinforce each other and opposite phases cancel.

use crate::config::FieldParams;
use crate::diffusion::DiffusionEngine;
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct VectorField {
    pub xs: Vec<f32>,
    pub ys: Vec<f32>,
    /// Largest magnitude a tile may hold.
    pub max_magnitude: f32,
}

impl VectorField {
    #[must_use]
    pub fn new(len: usize, max_magnitude: f32) -> Self {
        Self {
            xs: vec![0.0; len],
            ys: vec![0.0; len],
            max_magnitude,
        }
    }

    pub fn deposit(&mut self, idx: usize, phase: f32, amount: f32) {
        if idx >= self.xs.len() || !amount.is_finite() {
            return;
        }
        self.xs[idx] += phase.cos() * amount;
        self.ys[idx] += phase.sin() * amount;
        self.limit(idx);
    }

    /// Signed component of the stored vector along `phase`.
    #[inline]
    #[must_use]
    pub fn project(&self, idx: usize, phase: f32) -> f32 {
        match (self.xs.get(idx), self.ys.get(idx)) {
            (Some(x), Some(y)) => x * phase.cos() + y * phase.sin(),
            _ => 0.0,
        }
    }

    /// Projection along a precomputed unit basis `(cos, sin)`.
    #[inline]
    #[must_use]
    pub fn project_basis(&self, idx: usize, basis: (f32, f32)) -> f32 {
        self.xs[idx] * basis.0 + self.ys[idx] * basis.1
    }

    #[inline]
    #[must_use]
    pub fn magnitude(&self, idx: usize) -> f32 {
        self.xs[idx].hypot(self.ys[idx])
    }

    pub fn update(&mut self, engine: &mut DiffusionEngine, wall: &[bool], params: FieldParams) {
        engine.apply_vector(&mut self.xs, &mut self.ys, wall, params);
        for idx in 0..self.xs.len() {
            self.limit(idx);
        }
    }

    fn limit(&mut self, idx: usize) {
        let mag = self.magnitude(idx);
        if !mag.is_finite() {
            self.xs[idx] = 0.0;
            self.ys[idx] = 0.0;
        } else if mag > self.max_magnitude {
            let s = self.max_magnitude / mag;
            self.xs[idx] *= s;
            self.ys[idx] *= s;
        }
    }

    pub fn clear(&mut self) {
        self.xs.fill(0.0);
        self.ys.fill(0.0);
    }

    #[must_use]
    pub fn total_magnitude(&self) -> f32 {
        (0..self.xs.len()).map(|i| self.magnitude(i)).sum()
    }
}
