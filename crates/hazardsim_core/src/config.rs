//! Configuration management for simulation parameters.
//!
//! This module provides strongly-typed configuration structures that map to
//! the `config.toml` file. Every tuning constant of the engine lives here.
//!
//! ## Configuration Hierarchy
//!
//! 1. Default values (hardcoded in the `Default` impls)
//! 2. `config.toml` file (overrides defaults, missing sections fall back)
//!
//! ## Example `config.toml`
//!
//! ```toml
//! [world]
//! width = 80
//! height = 45
//! seed = 42
//! deterministic = true
//!
//! [reactions]
//! freeze_heat = 0.15
//! melt_heat = 0.2
//!
//! [debug]
//! assert_invariants = true
//! ```

use serde::{Deserialize, Serialize};

/// Grid dimensions, seeding and the oxygen baseline used at reset.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct WorldConfig {
    pub width: u16,
    pub height: u16,
    pub seed: Option<u64>,
    pub deterministic: bool,
    pub o2_base: f32,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            width: 80,
            height: 45,
            seed: None,
            deterministic: false,
            o2_base: 0.21,
        }
    }
}

/// Diffusion coefficient and decay half-life (in ticks) of one field.
///
/// A `half_life` of `None` disables decay.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct FieldParams {
    pub diffusion: f32,
    pub half_life: Option<f32>,
}

impl FieldParams {
    #[must_use]
    pub const fn new(diffusion: f32, half_life: f32) -> Self {
        Self {
            diffusion,
            half_life: Some(half_life),
        }
    }

    #[must_use]
    pub const fn diffusion_only(diffusion: f32) -> Self {
        Self {
            diffusion,
            half_life: None,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct FieldConfig {
    pub help: FieldParams,
    pub route: FieldParams,
    pub panic: FieldParams,
    pub safe: FieldParams,
    pub escape: FieldParams,
    pub door: FieldParams,
    pub visited: FieldParams,
    pub memory: FieldParams,
    pub presence: FieldParams,
    pub frontier: FieldParams,
    pub debt: FieldParams,
    pub reinforce: FieldParams,
    /// Largest stencil weight a single explicit pass may use.
    pub max_alpha_per_substep: f32,
    /// Diagonal smoothing weight relative to the orthogonal one.
    pub smoothing: f32,
    /// Magnitudes below this are snapped to zero.
    pub epsilon: f32,
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self {
            help: FieldParams::new(0.15, 40.0),
            route: FieldParams::new(0.10, 120.0),
            panic: FieldParams::new(0.25, 20.0),
            safe: FieldParams::new(0.12, 80.0),
            escape: FieldParams::new(0.20, 30.0),
            door: FieldParams::new(0.08, 200.0),
            visited: FieldParams::new(0.02, 60.0),
            memory: FieldParams::new(0.05, 150.0),
            presence: FieldParams::new(0.30, 30.0),
            frontier: FieldParams::new(0.10, 25.0),
            debt: FieldParams::new(0.06, 60.0),
            reinforce: FieldParams::new(0.08, 30.0),
            max_alpha_per_substep: 0.2,
            smoothing: 0.25,
            epsilon: 1e-4,
        }
    }
}

/// Material reaction and phase-transition constants.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct ReactionConfig {
    pub fire_growth: f32,
    pub fire_heat_gain: f32,
    pub fire_o2_burn: f32,
    pub max_fire_amplitude: f32,
    pub fire_extinguish_floor: f32,
    pub fire_spread_heat: f32,
    pub fire_spread_chance: f32,
    pub fire_spread_intensity: f32,
    pub water_phase_offset: f32,
    pub water_quench: f32,
    pub water_heat_gain: f32,
    pub acid_base_rate: f32,
    pub acid_base_heat: f32,
    pub flash_repeat_ticks: u64,
    pub neutralize_tension: f32,
    pub freeze_heat: f32,
    pub melt_heat: f32,
    pub latent_heat: f32,
    pub foam_heat_cap: f32,
    pub foam_amplitude_loss: f32,
    pub foam_acid_erosion: u32,
    pub foam_lifetime: u32,
    pub foam_expand_heat: f32,
    pub foam_spread_chance: f32,
    pub foam_spread_min_amplitude: f32,
    pub canister_heat_threshold: f32,
    pub canister_heat_decay: f32,
    pub canister_fire_decay: f32,
    pub canister_fuse_ticks: u32,
    pub canister_base_radius: u32,
    pub canister_charge_radius: f32,
    pub canister_o2_deplete: f32,
    pub burner_ticks: u32,
    pub burner_intensity: f32,
    pub ambient_cooling: f32,
    pub o2_regen: f32,
}

impl Default for ReactionConfig {
    fn default() -> Self {
        Self {
            fire_growth: 0.08,
            fire_heat_gain: 0.12,
            fire_o2_burn: 0.02,
            max_fire_amplitude: 1.5,
            fire_extinguish_floor: 0.08,
            fire_spread_heat: 0.8,
            fire_spread_chance: 0.05,
            fire_spread_intensity: 0.3,
            water_phase_offset: std::f32::consts::FRAC_PI_3,
            water_quench: 0.15,
            water_heat_gain: 0.04,
            acid_base_rate: 0.1,
            acid_base_heat: 0.08,
            flash_repeat_ticks: 12,
            neutralize_tension: 0.02,
            freeze_heat: 0.15,
            melt_heat: 0.20,
            latent_heat: 0.01,
            foam_heat_cap: 0.1,
            foam_amplitude_loss: 0.01,
            foam_acid_erosion: 3,
            foam_lifetime: 120,
            foam_expand_heat: 0.08,
            foam_spread_chance: 0.1,
            foam_spread_min_amplitude: 0.3,
            canister_heat_threshold: 0.3,
            canister_heat_decay: 0.05,
            canister_fire_decay: 0.08,
            canister_fuse_ticks: 3,
            canister_base_radius: 2,
            canister_charge_radius: 3.0,
            canister_o2_deplete: 0.8,
            burner_ticks: 20,
            burner_intensity: 0.6,
            ambient_cooling: 0.004,
            o2_regen: 0.002,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct TerritoryConfig {
    pub presence_deposit: f32,
    pub contest_threshold: f32,
    pub frontier_gain: f32,
    pub held_threshold: f32,
    pub lost_threshold: f32,
    pub debt_gain: f32,
    pub reinforce_threshold: f32,
    pub reinforce_gain: f32,
    pub reinforce_min: f32,
    pub reinforce_push: f32,
}

impl Default for TerritoryConfig {
    fn default() -> Self {
        Self {
            presence_deposit: 0.05,
            contest_threshold: 0.1,
            frontier_gain: 0.2,
            held_threshold: 0.6,
            lost_threshold: 0.35,
            debt_gain: 0.5,
            reinforce_threshold: 0.7,
            reinforce_gain: 0.3,
            reinforce_min: 0.05,
            reinforce_push: 0.25,
        }
    }
}

/// Weights of the neighbor scoring function.
///
/// Penalty terms (`panic`, `visited`, `rival_presence`, `debt`) are subtracted,
/// so a negative weight turns them into attractors.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ScoreWeights {
    pub safety: f32,
    pub help: f32,
    pub route: f32,
    pub panic: f32,
    pub safe: f32,
    pub escape: f32,
    pub visited: f32,
    pub own_presence: f32,
    pub rival_presence: f32,
    pub safe_memory: f32,
    pub territory: f32,
    pub frontier: f32,
    pub debt: f32,
    pub control_gain: f32,
    pub reinforce: f32,
}

impl ScoreWeights {
    #[must_use]
    pub fn ordinary() -> Self {
        Self {
            safety: 1.0,
            help: 0.05,
            route: 0.1,
            panic: 0.4,
            safe: 0.3,
            escape: 0.4,
            visited: 0.15,
            own_presence: 0.1,
            rival_presence: 0.15,
            safe_memory: 0.1,
            territory: 0.1,
            frontier: 0.05,
            debt: 0.05,
            control_gain: 0.1,
            reinforce: 0.05,
        }
    }

    #[must_use]
    pub fn medic() -> Self {
        Self {
            safety: 0.6,
            help: 0.8,
            route: 0.1,
            panic: -0.2,
            safe: 0.1,
            escape: 0.1,
            visited: 0.1,
            own_presence: 0.05,
            rival_presence: 0.05,
            safe_memory: 0.05,
            territory: 0.05,
            frontier: 0.02,
            debt: -0.1,
            control_gain: 0.02,
            reinforce: 0.02,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct AgentConfig {
    pub hazard_heat_weight: f32,
    /// Added on top of the blend for burning tiles, scaled by fire amplitude.
    pub hazard_fire_weight: f32,
    pub hazard_panic_weight: f32,
    pub hazard_o2_weight: f32,
    pub overwhelm_heat: f32,
    pub overwhelm_amplitude: f32,
    pub overwhelm_tension: f32,
    pub escape_epsilon: f32,
    pub door_min: f32,
    pub panic_run_ticks: u32,
    pub cool_improvement: f32,
    pub tunnel_gain: f32,
    pub fail_limit: u32,
    pub desperate_margin: f32,
    pub curiosity_hazard: f32,
    pub curiosity_mood: f32,
    pub curiosity_chance: f32,
    pub jitter: f32,
    pub random_walk_chance: f32,
    pub crowd_penalty: f32,
    pub o2_stress: f32,
    pub heat_stress: f32,
    pub stress_tension_loss: f32,
    pub heat_amplitude_gain: f32,
    pub recover_rate: f32,
    pub rest_amplitude: f32,
    /// Oxygen deficit above which an agent takes a phase shock.
    pub shock_o2: f32,
    /// Heat above which an agent takes a phase shock.
    pub shock_heat: f32,
    /// Shock magnitude added per crossed threshold, in radians.
    pub shock_kick: f32,
    pub shock_decay: f32,
    pub social_radius: i32,
    pub social_phase_pull: f32,
    pub social_amplitude_pull: f32,
    pub sync_threshold: f32,
    pub sync_tension_penalty: f32,
    pub safe_hazard: f32,
    pub safe_deposit: f32,
    pub help_deposit: f32,
    pub panic_deposit: f32,
    pub escape_deposit: f32,
    pub route_deposit: f32,
    pub visited_deposit: f32,
    pub memory_deposit: f32,
    pub panic_amplitude: f32,
    pub panic_tension: f32,
    pub calm_amplitude: f32,
    pub calm_tension: f32,
    pub max_amplitude: f32,
    pub hot_heat: f32,
    pub ordinary_weights: ScoreWeights,
    pub medic_weights: ScoreWeights,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            hazard_heat_weight: 0.6,
            hazard_panic_weight: 0.25,
            hazard_o2_weight: 0.15,
            hazard_fire_weight: 0.2,
            overwhelm_heat: 0.55,
            overwhelm_amplitude: 0.6,
            overwhelm_tension: 0.4,
            escape_epsilon: 0.02,
            door_min: 0.05,
            panic_run_ticks: 6,
            cool_improvement: 0.03,
            tunnel_gain: 0.08,
            fail_limit: 3,
            desperate_margin: 0.1,
            curiosity_hazard: 0.2,
            curiosity_mood: 0.35,
            curiosity_chance: 0.05,
            jitter: 0.01,
            random_walk_chance: 0.3,
            crowd_penalty: 0.15,
            o2_stress: 0.6,
            heat_stress: 0.5,
            stress_tension_loss: 0.03,
            heat_amplitude_gain: 0.06,
            recover_rate: 0.01,
            rest_amplitude: 0.2,
            shock_o2: 0.3,
            shock_heat: 0.5,
            shock_kick: 0.3,
            shock_decay: 0.8,
            social_radius: 2,
            social_phase_pull: 0.1,
            social_amplitude_pull: 0.05,
            sync_threshold: 0.8,
            sync_tension_penalty: 0.02,
            safe_hazard: 0.15,
            safe_deposit: 0.05,
            help_deposit: 0.1,
            panic_deposit: 0.08,
            escape_deposit: 0.06,
            route_deposit: 0.02,
            visited_deposit: 0.05,
            memory_deposit: 0.05,
            panic_amplitude: 0.75,
            panic_tension: 0.35,
            calm_amplitude: 0.45,
            calm_tension: 0.55,
            max_amplitude: 2.0,
            hot_heat: 0.5,
            ordinary_weights: ScoreWeights::ordinary(),
            medic_weights: ScoreWeights::medic(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct MedicConfig {
    pub search_radius: i32,
    pub rescan_ticks: u32,
    pub assignment_cap: u32,
    pub patient_tension: f32,
    pub recovered_tension: f32,
    pub aura_radius: i32,
    pub aura_tension: f32,
    pub aura_amplitude: f32,
    pub burst_trigger: f32,
    pub burst_tension: f32,
    pub burst_amplitude_scale: f32,
    pub burst_cooldown: u32,
    pub help_epsilon: f32,
    pub max_path: usize,
}

impl Default for MedicConfig {
    fn default() -> Self {
        Self {
            search_radius: 12,
            rescan_ticks: 10,
            assignment_cap: 2,
            patient_tension: 0.35,
            recovered_tension: 0.5,
            aura_radius: 3,
            aura_tension: 0.02,
            aura_amplitude: 0.02,
            burst_trigger: 0.25,
            burst_tension: 0.2,
            burst_amplitude_scale: 0.6,
            burst_cooldown: 30,
            help_epsilon: 0.005,
            max_path: 400,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct DebugConfig {
    /// Checks every bounded field after each tick and fails the tick on violation.
    pub assert_invariants: bool,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct SimConfig {
    pub world: WorldConfig,
    pub fields: FieldConfig,
    pub reactions: ReactionConfig,
    pub territory: TerritoryConfig,
    pub agents: AgentConfig,
    pub medic: MedicConfig,
    pub debug: DebugConfig,
    pub target_tps: u64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            world: WorldConfig::default(),
            fields: FieldConfig::default(),
            reactions: ReactionConfig::default(),
            territory: TerritoryConfig::default(),
            agents: AgentConfig::default(),
            medic: MedicConfig::default(),
            debug: DebugConfig::default(),
            target_tps: 30,
        }
    }
}

/// Per-tick external settings passed to `World::step`.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct StepSettings {
    pub d_heat: f32,
    pub d_o2: f32,
    pub o2_base: f32,
    pub o2_cut: f32,
}

impl Default for StepSettings {
    fn default() -> Self {
        Self {
            d_heat: 0.12,
            d_o2: 0.18,
            o2_base: 0.21,
            o2_cut: 0.12,
        }
    }
}

fn ensure_unit(value: f32, name: &str) -> anyhow::Result<()> {
    anyhow::ensure!(
        (0.0..=1.0).contains(&value),
        "{name} must be in [0.0, 1.0]"
    );
    Ok(())
}

fn ensure_field(params: &FieldParams, name: &str) -> anyhow::Result<()> {
    anyhow::ensure!(
        params.diffusion.is_finite() && params.diffusion >= 0.0,
        "{name} diffusion must be non-negative"
    );
    if let Some(h) = params.half_life {
        anyhow::ensure!(h.is_finite() && h > 0.0, "{name} half-life must be positive");
    }
    Ok(())
}

impl SimConfig {
    /// Validates all configuration parameters.
    ///
    /// Returns `Ok(())` if all parameters are valid, or `Err` with a description
    /// of the first validation failure.
    pub fn validate(&self) -> anyhow::Result<()> {
        // World validation
        anyhow::ensure!(self.world.width >= 3, "World width must be at least 3");
        anyhow::ensure!(self.world.width <= 1000, "World width too large (max 1000)");
        anyhow::ensure!(self.world.height >= 3, "World height must be at least 3");
        anyhow::ensure!(
            self.world.height <= 1000,
            "World height too large (max 1000)"
        );
        anyhow::ensure!(
            self.world.o2_base > 0.0 && self.world.o2_base <= 1.0,
            "Oxygen base must be in (0.0, 1.0]"
        );

        // Field validation
        let f = &self.fields;
        for (params, name) in [
            (&f.help, "help"),
            (&f.route, "route"),
            (&f.panic, "panic"),
            (&f.safe, "safe"),
            (&f.escape, "escape"),
            (&f.door, "door"),
            (&f.visited, "visited"),
            (&f.memory, "memory"),
            (&f.presence, "presence"),
            (&f.frontier, "frontier"),
            (&f.debt, "debt"),
            (&f.reinforce, "reinforce"),
        ] {
            ensure_field(params, name)?;
        }
        ensure_unit(f.smoothing, "Smoothing")?;
        anyhow::ensure!(
            f.max_alpha_per_substep > 0.0 && f.max_alpha_per_substep <= 0.25,
            "Max alpha per substep must be in (0.0, 0.25]"
        );
        anyhow::ensure!(
            4.0 * f.max_alpha_per_substep * f.smoothing <= 1.0,
            "Smoothing weight makes the diagonal sweep unstable"
        );
        anyhow::ensure!(f.epsilon >= 0.0, "Epsilon must be non-negative");

        // Reaction validation
        let r = &self.reactions;
        anyhow::ensure!(
            r.freeze_heat < r.melt_heat,
            "Freeze heat must be below melt heat"
        );
        anyhow::ensure!(
            r.latent_heat * 2.0 < r.melt_heat - r.freeze_heat,
            "Latent heat must not bridge the freeze/melt hysteresis band"
        );
        anyhow::ensure!(
            r.max_fire_amplitude > r.fire_extinguish_floor,
            "Max fire amplitude must exceed the extinguish floor"
        );
        anyhow::ensure!(r.water_quench > 0.0, "Water quench must be positive");
        ensure_unit(r.fire_spread_chance, "Fire spread chance")?;
        ensure_unit(r.foam_spread_chance, "Foam spread chance")?;
        ensure_unit(r.canister_o2_deplete, "Canister oxygen depletion")?;
        ensure_unit(r.ambient_cooling, "Ambient cooling")?;
        ensure_unit(r.o2_regen, "Oxygen regeneration")?;
        anyhow::ensure!(r.foam_lifetime > 0, "Foam lifetime must be positive");

        // Territory validation
        let t = &self.territory;
        ensure_unit(t.contest_threshold, "Contest threshold")?;
        ensure_unit(t.held_threshold, "Held threshold")?;
        ensure_unit(t.lost_threshold, "Lost threshold")?;
        ensure_unit(t.reinforce_threshold, "Reinforce threshold")?;
        anyhow::ensure!(
            t.lost_threshold < t.held_threshold,
            "Lost threshold must be below held threshold"
        );

        // Agent validation
        let a = &self.agents;
        ensure_unit(a.curiosity_chance, "Curiosity chance")?;
        ensure_unit(a.random_walk_chance, "Random walk chance")?;
        ensure_unit(a.shock_decay, "Shock decay")?;
        ensure_unit(a.shock_o2, "Oxygen shock threshold")?;
        ensure_unit(a.shock_heat, "Heat shock threshold")?;
        anyhow::ensure!(
            a.shock_kick.is_finite() && a.shock_kick >= 0.0,
            "Shock kick must be non-negative"
        );
        anyhow::ensure!(a.jitter >= 0.0, "Jitter must be non-negative");
        anyhow::ensure!(a.max_amplitude > 0.0, "Max amplitude must be positive");
        anyhow::ensure!(a.social_radius >= 0, "Social radius must be non-negative");

        // Medic validation
        let m = &self.medic;
        anyhow::ensure!(m.search_radius > 0, "Medic search radius must be positive");
        anyhow::ensure!(m.assignment_cap > 0, "Medic assignment cap must be positive");
        anyhow::ensure!(m.rescan_ticks > 0, "Medic rescan interval must be positive");

        anyhow::ensure!(self.target_tps > 0, "Target TPS must be positive");
        anyhow::ensure!(self.target_tps <= 240, "Target TPS too high (max 240)");

        Ok(())
    }

    /// Parses and validates configuration from TOML text.
    pub fn from_toml(content: &str) -> anyhow::Result<Self> {
        let config = toml::from_str::<Self>(content)?;
        config.validate()?;
        Ok(config)
    }

    #[must_use]
    pub fn fingerprint(&self) -> String {
        use sha2::{Digest, Sha256};
        let mut hasher = Sha256::new();
        hasher.update(format!("{:?}", self.fields).as_bytes());
        hasher.update(format!("{:?}", self.reactions).as_bytes());
        hasher.update(format!("{:?}", self.territory).as_bytes());
        hasher.update(format!("{:?}", self.agents).as_bytes());
        hasher.update(format!("{:?}", self.medic).as_bytes());
        hex::encode(hasher.finalize())
    }
}
