//! The authoritative simulation state and its tick.
//!
//! A [`World`] owns the grid, the agent list and the random stream. It is
//! always passed explicitly by reference; nothing in the engine keeps global
//! state.

use crate::config::SimConfig;
use crate::events::WorldEvent;
use crate::grid::Grid;
use crate::metrics::{Metrics, TickDiagnostics};
use hazardsim_data::{Agent, AgentId};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub mod finalize;
pub mod init;
pub mod query;
pub mod spawn;
pub mod update;

/// Extra knobs accepted by [`World::reset`].
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq)]
pub struct ResetOptions {
    /// Overrides `world.seed` for this run.
    pub seed: Option<u64>,
    /// Uniform heat every open tile starts with.
    pub ambient_heat: f32,
}

/// Where [`World::spawn`] should place a new agent.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpawnAt {
    Tile(usize),
    Coords(i32, i32),
    /// First open, unoccupied tile in index order.
    Anywhere,
}

pub struct World {
    pub config: SimConfig,
    pub grid: Grid,
    pub tick: u64,
    /// Sorted by id, which is also the stepping order.
    pub(crate) agents: Vec<Agent>,
    pub(crate) occupancy: Vec<Option<AgentId>>,
    /// Number of medics assigned to each patient.
    pub(crate) assignments: BTreeMap<AgentId, u32>,
    pub(crate) rng: ChaCha8Rng,
    pub(crate) seed: u64,
    pub(crate) next_id: u32,
    pub(crate) events: Vec<WorldEvent>,
    pub(crate) diagnostics: TickDiagnostics,
    pub metrics: Metrics,
}

impl std::fmt::Debug for World {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("World")
            .field("width", &self.grid.width)
            .field("height", &self.grid.height)
            .field("tick", &self.tick)
            .field("agents", &self.agents.len())
            .field("fires", &self.grid.fire.len())
            .finish_non_exhaustive()
    }
}

/// Tallies of agent outcomes over one tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct AgentTally {
    pub hot: usize,
    pub overwhelmed: usize,
    pub moved: usize,
}

impl AgentTally {
    pub fn add(&mut self, outcome: crate::systems::AgentOutcome) {
        self.hot += usize::from(outcome.hot);
        self.overwhelmed += usize::from(outcome.overwhelmed);
        self.moved += usize::from(outcome.moved);
    }
}
