//! # Hazardsim Core
//!
//! The deterministic engine behind hazardsim, a tile-grid hazard and crowd
//! behavior simulator.
//!
//! This crate contains:
//! - A bounded diffusion/decay engine shared by every scalar field
//! - Material reactions and phase transitions (fire, water, ice, acid, base,
//!   cryofoam, reactive gas)
//! - Faction presence, control, frontier, debt and reinforcement fields
//! - The agent decision model (weighted scoring, panic escape, medics)
//! - Metrics collection and structured logging
//!
//! ## Architecture
//!
//! All state lives in one [`World`] passed by reference. A tick runs its
//! phases strictly in order on a single thread: diffuse, react, recompute
//! territory, step agents in id order, finalize. Randomness comes from one
//! seeded `ChaCha8Rng`, so a seed reproduces a run.
//!
//! ## Example
//!
//! ```
//! use hazardsim_core::config::{SimConfig, StepSettings};
//! use hazardsim_core::world::{SpawnAt, World};
//! use hazardsim_data::{FactionRef, Mode};
//!
//! let mut config = SimConfig::default();
//! config.world.seed = Some(42);
//! let mut world = World::new(config).unwrap();
//!
//! let fire = world.grid.index(20, 20).unwrap();
//! world.ignite(fire, 0.9).unwrap();
//! world
//!     .spawn(Mode::Calm, FactionRef::Id(0), SpawnAt::Coords(10, 10))
//!     .unwrap();
//!
//! world.step(&StepSettings::default()).unwrap();
//! assert_eq!(world.diagnostics().tick, 1);
//! ```

/// Configuration management for simulation parameters
pub mod config;
/// Explicit-stencil diffusion and half-life decay
pub mod diffusion;
/// Fixed-timestep frame driver
pub mod driver;
/// Placement and invariant errors
pub mod error;
/// One-shot world events for renderers
pub mod events;
/// The flat tile grid and its fields
pub mod grid;
/// Performance metrics collection and logging
pub mod metrics;
/// Stigmergic pheromone fields
pub mod pheromone;
/// Material reactions and phase transitions
pub mod reactions;
/// Read-only tile and agent views
pub mod snapshot;
/// Per-agent decision systems (sensing, movement, escape, medics, stress)
pub mod systems;
/// Faction presence, control and territorial signals
pub mod territory;
/// Phase-tagged two-component fields
pub mod vector_field;
/// The authoritative world state and its tick
pub mod world;

pub use config::{SimConfig, StepSettings};
pub use driver::FrameDriver;
pub use error::{PlacementError, SimError};
pub use events::WorldEvent;
pub use metrics::{init_logging, Metrics, TickDiagnostics};
pub use snapshot::{AgentSnapshot, TileSnapshot};
pub use world::{ResetOptions, SpawnAt, World};
