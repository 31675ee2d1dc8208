use super::{AgentTally, World};
use crate::error::SimError;
use crate::metrics::{FieldSums, TickDiagnostics};
use crate::pheromone::PheromoneKind;
use std::f32::consts::TAU;
use std::time::Duration;

impl World {
    pub(crate) fn finalize_tick(
        &mut self,
        tally: AgentTally,
        first_event: usize,
        elapsed: Duration,
    ) -> Result<(), SimError> {
        // Checked before the clamp so out-of-range values from this tick surface.
        if self.config.debug.assert_invariants {
            self.check_invariants()?;
        }
        self.grid.clamp_all();
        for agent in &mut self.agents {
            agent.state = agent.state.normalized();
        }

        let new_events = &self.events[first_event.min(self.events.len())..];
        for event in new_events {
            self.metrics.increment_counter(event.name());
        }
        self.diagnostics = TickDiagnostics {
            tick: self.tick,
            agents: self.agents.len(),
            hot_agents: tally.hot,
            overwhelmed_agents: tally.overwhelmed,
            moved_agents: tally.moved,
            fires: self.grid.fire.len(),
            canisters: self.grid.canisters.len(),
            foam_tiles: self.grid.foam.len(),
            events: new_events.len(),
            sums: self.field_sums(),
        };
        self.metrics
            .record_tick(elapsed, self.agents.len(), self.grid.fire.len());
        Ok(())
    }

    /// Totals of every field, as reported in the tick diagnostics.
    #[must_use]
    pub fn field_sums(&self) -> FieldSums {
        let p = self.grid.pheromones.sums();
        let t = self.grid.territory.sums();
        FieldSums {
            heat: self.grid.heat_sum(),
            o2: self.grid.o2_sum(),
            help: p[PheromoneKind::Help.index()],
            route: p[PheromoneKind::Route.index()],
            panic: p[PheromoneKind::Panic.index()],
            safe: p[PheromoneKind::Safe.index()],
            escape: p[PheromoneKind::Escape.index()],
            door: p[PheromoneKind::Door.index()],
            visited: p[PheromoneKind::Visited.index()],
            memory: self.grid.memory.total_magnitude(),
            presence: self.grid.presence.total_magnitude(),
            frontier: t.frontier,
            debt: t.debt,
            reinforce: t.reinforce,
        }
    }

    /// Verifies every bounded quantity and the agent/occupancy bookkeeping.
    ///
    /// Returns the first violation found.
    pub fn check_invariants(&self) -> Result<(), SimError> {
        let grid = &self.grid;
        let unit = |v: f32| v.is_finite() && (0.0..=1.0).contains(&v);

        for idx in 0..grid.len() {
            if !unit(grid.heat[idx]) {
                return Err(SimError::invariant("heat", idx, grid.heat[idx]));
            }
            let o2 = grid.o2[idx];
            if !o2.is_finite() || o2 < 0.0 || o2 > grid.o2_base {
                return Err(SimError::invariant("o2", idx, o2));
            }
            if grid.wall[idx] && grid.tiles[idx].is_some() {
                return Err(SimError::invariant("wall material", idx, 1.0));
            }
            if let Some(m) = grid.tiles[idx] {
                if !unit(m.tension) {
                    return Err(SimError::invariant("tension", idx, m.tension));
                }
                if !m.amplitude.is_finite() || m.amplitude < 0.0 {
                    return Err(SimError::invariant("amplitude", idx, m.amplitude));
                }
                if !(0.0..TAU).contains(&m.phase) {
                    return Err(SimError::invariant("phase", idx, m.phase));
                }
            }
        }
        for kind in PheromoneKind::ALL {
            let field = grid.pheromones.field(kind);
            if let Some((i, &v)) = field.iter().enumerate().find(|(_, v)| !unit(**v)) {
                return Err(SimError::invariant(kind.name(), i, v));
            }
        }
        grid.territory.check_invariants()?;

        for agent in &self.agents {
            let here = grid.index(agent.x, agent.y);
            match here {
                Some(idx) if self.occupancy[idx] == Some(agent.id) => {}
                _ => return Err(SimError::invariant("occupancy", agent.id.0 as usize, 0.0)),
            }
        }
        let occupied = self.occupancy.iter().filter(|o| o.is_some()).count();
        if occupied != self.agents.len() {
            return Err(SimError::invariant("occupancy", occupied, self.agents.len() as f32));
        }
        Ok(())
    }
}
