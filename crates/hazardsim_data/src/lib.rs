//! Plain data types shared by the hazardsim engine and its collaborators.

pub mod data;

pub use data::agent::{Agent, AgentId, MedicState, PanicRun, Role};
pub use data::faction::{
    affinity, is_friendly, is_hostile, FactionDef, FactionId, FactionRef, FACTIONS, FACTION_COUNT,
};
pub use data::material::{wrap_phase, Mode, TileMaterial};
