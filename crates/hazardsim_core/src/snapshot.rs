use hazardsim_data::{AgentId, FactionId, Mode, Role};
use serde::{Deserialize, Serialize};

/// Read-only view of one tile.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct TileSnapshot {
    pub index: usize,
    pub x: i32,
    pub y: i32,
    pub wall: bool,
    pub vent: bool,
    /// `None` for an empty tile.
    pub mode: Option<Mode>,
    pub tension: f32,
    pub amplitude: f32,
    pub phase: f32,
    pub heat: f32,
    pub o2: f32,
    pub dominant_faction: Option<FactionId>,
    pub control: f32,
    pub occupant: Option<AgentId>,
}

/// Read-only view of one agent.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct AgentSnapshot {
    pub id: AgentId,
    pub x: i32,
    pub y: i32,
    pub faction: FactionId,
    pub role: Role,
    pub mode: Mode,
    pub tension: f32,
    pub amplitude: f32,
    pub phase: f32,
    pub overwhelmed: bool,
    pub target: Option<AgentId>,
}
