use super::faction::FactionId;
use super::material::{Mode, TileMaterial};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
pub struct AgentId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Role {
    #[default]
    Ordinary,
    Medic,
}

/// A committed escape heading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PanicRun {
    pub dx: i32,
    pub dy: i32,
    pub ticks_left: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MedicState {
    pub target: Option<AgentId>,
    /// Remaining tile indices to walk, nearest first.
    pub path: VecDeque<usize>,
    pub cooldown: u32,
    pub rescan_in: u32,
}

/// A mobile agent living on one tile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Agent {
    pub id: AgentId,
    pub x: i32,
    pub y: i32,
    pub faction: FactionId,
    pub role: Role,
    pub state: TileMaterial,
    pub panic_run: Option<PanicRun>,
    pub fail_count: u32,
    /// Magnitude of the current phase shock, decays every tick.
    pub shock: f32,
    pub medic: MedicState,
    /// Whether the agent was overwhelmed on its last step.
    pub overwhelmed: bool,
}

impl Agent {
    /// Creates an agent with the resting state of its role and mode.
    ///
    /// Medics always carry `Mode::Medic`; any non-agent mode is treated as calm.
    #[must_use]
    pub fn new(id: AgentId, x: i32, y: i32, faction: FactionId, mode: Mode) -> Self {
        let (role, state) = match mode {
            Mode::Medic => (
                Role::Medic,
                TileMaterial::new(Mode::Medic, 0.9, 0.2, faction.safe_phase()),
            ),
            Mode::Panic => (
                Role::Ordinary,
                TileMaterial::new(Mode::Panic, 0.3, 0.8, faction.safe_phase()),
            ),
            _ => (
                Role::Ordinary,
                TileMaterial::new(Mode::Calm, 0.7, 0.3, faction.safe_phase()),
            ),
        };
        Self {
            id,
            x,
            y,
            faction,
            role,
            state,
            panic_run: None,
            fail_count: 0,
            shock: 0.0,
            medic: MedicState::default(),
            overwhelmed: false,
        }
    }

    #[inline]
    #[must_use]
    pub fn is_medic(&self) -> bool {
        self.role == Role::Medic
    }

    /// Whether a medic should consider this agent a patient.
    #[must_use]
    pub fn needs_help(&self, tension_trigger: f32) -> bool {
        !self.is_medic() && (self.state.mode == Mode::Panic || self.state.tension < tension_trigger)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_medic_role() {
        let a = Agent::new(AgentId(3), 4, 5, FactionId(1), Mode::Medic);
        assert!(a.is_medic());
        assert_eq!(a.state.mode, Mode::Medic);
        assert!(!a.needs_help(0.35));
    }

    #[test]
    fn test_non_agent_mode_becomes_calm() {
        let a = Agent::new(AgentId(1), 1, 1, FactionId(0), Mode::Acid);
        assert_eq!(a.role, Role::Ordinary);
        assert_eq!(a.state.mode, Mode::Calm);
    }

    #[test]
    fn test_panicking_agent_needs_help() {
        let a = Agent::new(AgentId(2), 1, 1, FactionId(2), Mode::Panic);
        assert!(a.needs_help(0.1));
    }
}
