//! Generic wall-aware diffusion/decay operator shared by every scalar field.
//!
//! One call advances a field by a diffusion coefficient `D` and a decay
//! half-life. Large coefficients are split into `ceil(D / max_alpha)` explicit
//! passes. Each pass is a 4-neighbor Laplacian sweep followed by a lighter
//! diagonal smoothing sweep. Both sweeps exchange mass pairwise between open
//! tiles, so diffusion alone never creates or destroys mass and never leaves
//! the range spanned by its input. Wall tiles neither give nor receive.

use crate::config::{FieldConfig, FieldParams};

const ORTHOGONAL: [(i32, i32); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];
const DIAGONAL: [(i32, i32); 4] = [(1, 1), (1, -1), (-1, 1), (-1, -1)];

/// Per-tick retention factor for a half-life in ticks: `2^(-1/t_half)`.
///
/// `None` (or a non-positive half-life) means no decay.
#[must_use]
pub fn keep_factor(half_life: Option<f32>) -> f32 {
    match half_life {
        Some(h) if h.is_finite() && h > 0.0 => (-1.0 / h).exp2(),
        _ => 1.0,
    }
}

#[derive(Debug, Clone)]
pub struct DiffusionEngine {
    width: usize,
    height: usize,
    max_alpha: f32,
    smoothing: f32,
    epsilon: f32,
    back_buffer: Vec<f32>,
}

impl DiffusionEngine {
    #[must_use]
    pub fn new(width: usize, height: usize, tuning: &FieldConfig) -> Self {
        Self {
            width,
            height,
            max_alpha: tuning.max_alpha_per_substep,
            smoothing: tuning.smoothing,
            epsilon: tuning.epsilon,
            back_buffer: vec![0.0; width * height],
        }
    }

    #[must_use]
    pub fn epsilon(&self) -> f32 {
        self.epsilon
    }

    /// Number of explicit passes used for a coefficient `d`.
    #[must_use]
    pub fn substeps(&self, d: f32) -> u32 {
        if !d.is_finite() || d <= 0.0 {
            return 0;
        }
        (d / self.max_alpha).ceil().max(1.0) as u32
    }

    /// Diffuses then decays `field` in place and snaps tiny values to zero.
    pub fn apply(&mut self, field: &mut [f32], wall: &[bool], params: FieldParams) {
        self.diffuse(field, wall, params.diffusion);
        decay(field, keep_factor(params.half_life), self.epsilon);
    }

    /// Applies the same operator to both components of a vector field.
    ///
    /// Snapping uses the vector magnitude so a direction is never half-erased.
    pub fn apply_vector(
        &mut self,
        xs: &mut [f32],
        ys: &mut [f32],
        wall: &[bool],
        params: FieldParams,
    ) {
        self.diffuse(xs, wall, params.diffusion);
        self.diffuse(ys, wall, params.diffusion);
        let keep = keep_factor(params.half_life);
        let eps = self.epsilon;
        for (x, y) in xs.iter_mut().zip(ys.iter_mut()) {
            *x *= keep;
            *y *= keep;
            if !x.is_finite() || !y.is_finite() || x.hypot(*y) < eps {
                *x = 0.0;
                *y = 0.0;
            }
        }
    }

    /// Pure diffusion without decay (heat, oxygen).
    pub fn diffuse(&mut self, field: &mut [f32], wall: &[bool], d: f32) {
        debug_assert_eq!(field.len(), self.width * self.height);
        debug_assert_eq!(wall.len(), field.len());
        let passes = self.substeps(d);
        if passes == 0 {
            return;
        }
        let alpha = d / passes as f32;
        for _ in 0..passes {
            self.sweep(field, wall, alpha, &ORTHOGONAL);
            if self.smoothing > 0.0 {
                self.sweep(field, wall, alpha * self.smoothing, &DIAGONAL);
            }
        }
    }

    fn sweep(&mut self, field: &mut [f32], wall: &[bool], weight: f32, offsets: &[(i32, i32)]) {
        self.back_buffer.clear();
        self.back_buffer.extend_from_slice(field);
        let old = &self.back_buffer;
        let w = self.width as i32;
        let h = self.height as i32;

        for y in 0..h {
            for x in 0..w {
                let idx = (y * w + x) as usize;
                if wall[idx] {
                    continue;
                }
                let v = old[idx];
                let mut delta = 0.0;
                for &(dx, dy) in offsets {
                    let nx = x + dx;
                    let ny = y + dy;
                    if nx < 0 || ny < 0 || nx >= w || ny >= h {
                        continue;
                    }
                    let n = (ny * w + nx) as usize;
                    if wall[n] {
                        continue;
                    }
                    delta += weight * (old[n] - v);
                }
                field[idx] = v + delta;
            }
        }
    }
}

/// Multiplies every value by `keep` and snaps magnitudes below `epsilon` to zero.
pub fn decay(field: &mut [f32], keep: f32, epsilon: f32) {
    for v in field.iter_mut() {
        *v *= keep;
        if !v.is_finite() || v.abs() < epsilon {
            *v = 0.0;
        }
    }
}
