//! Agent lifecycle and the placement operations external collaborators use
//! to edit the grid between ticks.

use super::{SpawnAt, World};
use crate::error::PlacementError;
use crate::pheromone::PheromoneKind;
use crate::reactions;
use crate::systems::medic;
use crate::systems::sensing::is_passable;
use hazardsim_data::{Agent, AgentId, FactionId, FactionRef, Mode, TileMaterial};

impl World {
    /// Creates an agent on the requested tile.
    ///
    /// Checks run in order: the grid has no open tile at all, the target is a
    /// wall, out of bounds or a canister, then another agent stands there. An
    /// unknown faction falls back to the first faction and a non-agent mode to
    /// calm.
    pub fn spawn(
        &mut self,
        mode: Mode,
        faction: FactionRef,
        at: SpawnAt,
    ) -> Result<AgentId, PlacementError> {
        if !self.grid.has_open_tile() {
            return Err(PlacementError::NoOpenTile);
        }
        let idx = match at {
            SpawnAt::Tile(idx) => idx,
            SpawnAt::Coords(x, y) => self.grid.index(x, y).ok_or(PlacementError::Blocked)?,
            SpawnAt::Anywhere => (0..self.grid.len())
                .find(|&i| is_passable(&self.grid, &self.occupancy, i))
                .ok_or(PlacementError::TileOccupied)?,
        };
        if !self.grid.is_open(idx) || self.grid.canisters.contains_key(&idx) {
            return Err(PlacementError::Blocked);
        }
        if self.occupancy[idx].is_some() {
            return Err(PlacementError::TileOccupied);
        }

        let faction = faction.resolve().unwrap_or_else(|| {
            tracing::warn!(faction = ?faction, "Unknown faction, using default");
            FactionId(0)
        });
        let mode = if mode.is_agent_mode() {
            mode
        } else {
            tracing::warn!(mode = mode.name(), "Not an agent mode, spawning calm");
            Mode::Calm
        };

        let id = AgentId(self.next_id);
        self.next_id += 1;
        let (x, y) = self.grid.coords(idx);
        // Ids only grow, so pushing keeps the list sorted.
        self.agents.push(Agent::new(id, x, y, faction, mode));
        self.occupancy[idx] = Some(id);
        tracing::debug!(agent = id.0, x = x, y = y, faction = faction.0, "Agent spawned");
        Ok(id)
    }

    /// Removes an agent, freeing its tile and every medic assignment that
    /// involves it. Returns `false` when no such agent exists.
    pub fn despawn(&mut self, id: AgentId) -> bool {
        let Ok(pos) = self.agents.binary_search_by_key(&id, |a| a.id) else {
            return false;
        };
        let mut agent = self.agents.remove(pos);
        if let Some(idx) = self.grid.index(agent.x, agent.y) {
            if self.occupancy[idx] == Some(id) {
                self.occupancy[idx] = None;
            }
        }
        if agent.is_medic() {
            medic::release(&mut self.assignments, &mut agent);
        }
        self.assignments.remove(&id);
        for other in &mut self.agents {
            if other.medic.target == Some(id) {
                other.medic.target = None;
                other.medic.path.clear();
            }
        }
        tracing::debug!(agent = id.0, "Agent despawned");
        true
    }

    /// Sets a tile on fire. See [`reactions::ignite`].
    pub fn ignite(&mut self, idx: usize, intensity: f32) -> Result<f32, PlacementError> {
        reactions::ignite(&mut self.grid, idx, intensity, &self.config.reactions)
    }

    /// Replaces the material of an open tile; `None` clears it.
    ///
    /// Cryofoam and reactive gas go through their own placement rules so
    /// that foam timers and canisters stay consistent. Agent modes are not
    /// tile materials and clear the tile.
    pub fn place_material(
        &mut self,
        idx: usize,
        material: Option<TileMaterial>,
    ) -> Result<(), PlacementError> {
        if !self.grid.is_open(idx) {
            return Err(PlacementError::Blocked);
        }
        let material = match material.map(TileMaterial::normalized) {
            Some(m) if m.mode == Mode::Cryofoam => {
                return self.deposit_cryofoam(idx, m.amplitude);
            }
            Some(m) if m.mode == Mode::ReactiveGas => {
                return self.place_canister(idx, m.tension);
            }
            Some(m) if m.mode.is_agent_mode() => {
                tracing::warn!(mode = m.mode.name(), "Agent mode placed on a tile, clearing it");
                None
            }
            other => other,
        };
        self.grid.canisters.remove(&idx);
        self.grid.foam.remove(&idx);
        self.grid.set_material(idx, material);
        Ok(())
    }

    pub fn deposit_cryofoam(&mut self, idx: usize, amplitude: f32) -> Result<(), PlacementError> {
        let cfg = &self.config.reactions;
        let amplitude = if amplitude.is_finite() {
            amplitude.max(0.0)
        } else {
            1.0
        };
        reactions::deposit_cryofoam(&mut self.grid, idx, cfg.foam_lifetime, amplitude, cfg)
    }

    /// Places a reactive-gas canister. Agents cannot share a tile with one.
    pub fn place_canister(&mut self, idx: usize, charge: f32) -> Result<(), PlacementError> {
        if self.occupancy.get(idx).copied().flatten().is_some() {
            return Err(PlacementError::TileOccupied);
        }
        reactions::place_canister(&mut self.grid, idx, charge)
    }

    /// Walls or opens a tile. An occupied tile cannot be walled over.
    pub fn set_wall(&mut self, idx: usize, wall: bool) -> Result<(), PlacementError> {
        if wall && self.occupancy.get(idx).copied().flatten().is_some() {
            return Err(PlacementError::TileOccupied);
        }
        self.grid.set_wall(idx, wall)?;
        if !wall {
            self.grid.o2[idx] = self.grid.o2_base;
        }
        Ok(())
    }

    pub fn set_vent(&mut self, idx: usize, vent: bool) -> Result<(), PlacementError> {
        self.grid.set_vent(idx, vent)
    }

    pub fn deposit_pheromone(
        &mut self,
        kind: PheromoneKind,
        idx: usize,
        amount: f32,
    ) -> Result<(), PlacementError> {
        if !self.grid.is_open(idx) {
            return Err(PlacementError::Blocked);
        }
        if amount.is_finite() {
            self.grid.pheromones.deposit(kind, idx, amount);
        }
        Ok(())
    }

    pub fn set_heat(&mut self, idx: usize, heat: f32) -> Result<(), PlacementError> {
        if !self.grid.is_open(idx) {
            return Err(PlacementError::Blocked);
        }
        self.grid.heat[idx] = if heat.is_finite() {
            heat.clamp(0.0, 1.0)
        } else {
            0.0
        };
        Ok(())
    }
}
