//! Read-only queries for renderers and external collaborators.

use super::World;
use crate::events::WorldEvent;
use crate::metrics::TickDiagnostics;
use crate::snapshot::{AgentSnapshot, TileSnapshot};
use hazardsim_data::{Agent, AgentId};

impl World {
    /// Snapshot of one tile, `None` when out of range.
    #[must_use]
    pub fn tile(&self, idx: usize) -> Option<TileSnapshot> {
        if idx >= self.grid.len() {
            return None;
        }
        let (x, y) = self.grid.coords(idx);
        let material = self.grid.tiles[idx];
        Some(TileSnapshot {
            index: idx,
            x,
            y,
            wall: self.grid.wall[idx],
            vent: self.grid.vent[idx],
            mode: material.map(|m| m.mode),
            tension: material.map_or(0.0, |m| m.tension),
            amplitude: material.map_or(0.0, |m| m.amplitude),
            phase: material.map_or(0.0, |m| m.phase),
            heat: self.grid.heat[idx],
            o2: self.grid.o2[idx],
            dominant_faction: self.grid.territory.dominant[idx],
            control: self.grid.territory.control[idx],
            occupant: self.occupancy[idx],
        })
    }

    #[must_use]
    pub fn tile_at(&self, x: i32, y: i32) -> Option<TileSnapshot> {
        self.grid.index(x, y).and_then(|idx| self.tile(idx))
    }

    /// All agents in stepping order.
    #[must_use]
    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }

    #[must_use]
    pub fn agent(&self, id: AgentId) -> Option<&Agent> {
        self.agents
            .binary_search_by_key(&id, |a| a.id)
            .ok()
            .map(|i| &self.agents[i])
    }

    #[must_use]
    pub fn agent_snapshot(&self, id: AgentId) -> Option<AgentSnapshot> {
        self.agent(id).map(snapshot)
    }

    pub fn agent_snapshots(&self) -> impl Iterator<Item = AgentSnapshot> + '_ {
        self.agents.iter().map(snapshot)
    }

    #[must_use]
    pub fn occupant(&self, idx: usize) -> Option<AgentId> {
        self.occupancy.get(idx).copied().flatten()
    }

    /// How many medics currently claim this agent as their patient.
    #[must_use]
    pub fn assignment_count(&self, id: AgentId) -> u32 {
        self.assignments.get(&id).copied().unwrap_or(0)
    }

    /// Diagnostics of the last completed tick.
    #[must_use]
    pub fn diagnostics(&self) -> &TickDiagnostics {
        &self.diagnostics
    }

    /// Takes every event raised since the last drain.
    pub fn drain_events(&mut self) -> Vec<WorldEvent> {
        std::mem::take(&mut self.events)
    }
}

fn snapshot(agent: &Agent) -> AgentSnapshot {
    AgentSnapshot {
        id: agent.id,
        x: agent.x,
        y: agent.y,
        faction: agent.faction,
        role: agent.role,
        mode: agent.state.mode,
        tension: agent.state.tension,
        amplitude: agent.state.amplitude,
        phase: agent.state.phase,
        overwhelmed: agent.overwhelmed,
        target: agent.medic.target,
    }
}
