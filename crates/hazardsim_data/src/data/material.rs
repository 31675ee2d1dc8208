use serde::{Deserialize, Serialize};
use std::f32::consts::TAU;

/// Substance or behavioral state carried by a tile or an agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum Mode {
    Oxygen,
    Water,
    Ice,
    Cryofoam,
    Fire,
    Acid,
    Base,
    ReactiveGas,
    #[default]
    Calm,
    Panic,
    Medic,
}

impl Mode {
    pub const ALL: [Mode; 11] = [
        Mode::Oxygen,
        Mode::Water,
        Mode::Ice,
        Mode::Cryofoam,
        Mode::Fire,
        Mode::Acid,
        Mode::Base,
        Mode::ReactiveGas,
        Mode::Calm,
        Mode::Panic,
        Mode::Medic,
    ];

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Mode::Oxygen => "oxygen",
            Mode::Water => "water",
            Mode::Ice => "ice",
            Mode::Cryofoam => "cryofoam",
            Mode::Fire => "fire",
            Mode::Acid => "acid",
            Mode::Base => "base",
            Mode::ReactiveGas => "reactive-gas",
            Mode::Calm => "calm",
            Mode::Panic => "panic",
            Mode::Medic => "medic",
        }
    }

    /// Parses a mode name, accepting a few legacy spellings.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        let lowered = name.trim().to_ascii_lowercase();
        match lowered.as_str() {
            "reactive_gas" | "clf" | "clf3" => Some(Mode::ReactiveGas),
            "foam" => Some(Mode::Cryofoam),
            other => Mode::ALL.iter().copied().find(|m| m.name() == other),
        }
    }

    /// Modes an agent can be in. Everything else is a tile substance.
    #[must_use]
    pub fn is_agent_mode(self) -> bool {
        matches!(self, Mode::Calm | Mode::Panic | Mode::Medic)
    }

    #[must_use]
    pub fn is_water_or_ice(self) -> bool {
        matches!(self, Mode::Water | Mode::Ice)
    }
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Wraps an angle into `[0, 2π)`. Non-finite input collapses to zero.
#[must_use]
pub fn wrap_phase(phase: f32) -> f32 {
    if !phase.is_finite() {
        return 0.0;
    }
    let wrapped = phase.rem_euclid(TAU);
    if wrapped >= TAU {
        0.0
    } else {
        wrapped
    }
}

/// Oscillatory material state of a tile or agent ("string" state).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TileMaterial {
    pub mode: Mode,
    /// 0.0 - 1.0
    pub tension: f32,
    /// >= 0.0
    pub amplitude: f32,
    /// [0, 2π)
    pub phase: f32,
}

impl TileMaterial {
    #[must_use]
    pub fn new(mode: Mode, tension: f32, amplitude: f32, phase: f32) -> Self {
        Self {
            mode,
            tension,
            amplitude,
            phase,
        }
        .normalized()
    }

    /// Clamps every component into its valid range, replacing NaN with zero.
    #[must_use]
    pub fn normalized(mut self) -> Self {
        self.tension = if self.tension.is_finite() {
            self.tension.clamp(0.0, 1.0)
        } else {
            0.0
        };
        self.amplitude = if self.amplitude.is_finite() {
            self.amplitude.max(0.0)
        } else {
            0.0
        };
        self.phase = wrap_phase(self.phase);
        self
    }

    pub fn rotate(&mut self, delta: f32) {
        self.phase = wrap_phase(self.phase + delta);
    }

    pub fn add_tension(&mut self, delta: f32) {
        self.tension = (self.tension + delta).clamp(0.0, 1.0);
    }

    pub fn add_amplitude(&mut self, delta: f32, max: f32) {
        self.amplitude = (self.amplitude + delta).clamp(0.0, max);
    }
}
