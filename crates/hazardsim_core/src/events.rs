use serde::{Deserialize, Serialize};

/// One-shot notifications raised during a tick, drained by the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WorldEvent {
    /// Acid met base. `first_contact` is false for throttled repeat flashes.
    Flash { tile: usize, first_contact: bool },
    Detonation { tile: usize, radius: u32 },
    Extinguished { tile: usize },
    Smothered { tile: usize },
    FoamExpired { tile: usize },
    FoamFrozen { tile: usize },
}

impl WorldEvent {
    #[must_use]
    pub fn tile(&self) -> usize {
        match *self {
            WorldEvent::Flash { tile, .. }
            | WorldEvent::Detonation { tile, .. }
            | WorldEvent::Extinguished { tile }
            | WorldEvent::Smothered { tile }
            | WorldEvent::FoamExpired { tile }
            | WorldEvent::FoamFrozen { tile } => tile,
        }
    }

    /// Counter name used by the metrics collector.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            WorldEvent::Flash { .. } => "flash",
            WorldEvent::Detonation { .. } => "detonation",
            WorldEvent::Extinguished { .. } => "extinguished",
            WorldEvent::Smothered { .. } => "smothered",
            WorldEvent::FoamExpired { .. } => "foam_expired",
            WorldEvent::FoamFrozen { .. } => "foam_frozen",
        }
    }
}
