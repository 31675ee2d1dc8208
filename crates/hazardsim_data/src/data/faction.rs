use serde::{Deserialize, Serialize};

/// Static description of a faction: a name and its basis angle ("safe phase").
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FactionDef {
    pub name: &'static str,
    pub safe_phase: f32,
}

pub const FACTION_COUNT: usize = 3;

/// Factions are spread evenly around the unit circle, so every pair is hostile.
pub const FACTIONS: [FactionDef; FACTION_COUNT] = [
    FactionDef {
        name: "ember",
        safe_phase: 0.0,
    },
    FactionDef {
        name: "tide",
        safe_phase: 2.094_395_1,
    },
    FactionDef {
        name: "moss",
        safe_phase: 4.188_790_2,
    },
];

const FRIENDLY_AFFINITY: f32 = 0.25;
const HOSTILE_AFFINITY: f32 = -0.25;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
pub struct FactionId(pub u8);

impl FactionId {
    #[must_use]
    pub fn from_index(index: usize) -> Option<Self> {
        (index < FACTION_COUNT).then(|| Self(index as u8))
    }

    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        FACTIONS
            .iter()
            .position(|f| f.name.eq_ignore_ascii_case(name))
            .and_then(Self::from_index)
    }

    #[inline]
    #[must_use]
    pub fn index(self) -> usize {
        self.0 as usize
    }

    #[must_use]
    pub fn def(self) -> &'static FactionDef {
        &FACTIONS[self.index().min(FACTION_COUNT - 1)]
    }

    #[must_use]
    pub fn safe_phase(self) -> f32 {
        self.def().safe_phase
    }

    /// Unit basis vector `(cos, sin)` of the faction's safe phase.
    #[must_use]
    pub fn basis(self) -> (f32, f32) {
        let phase = self.safe_phase();
        (phase.cos(), phase.sin())
    }

    pub fn all() -> impl Iterator<Item = FactionId> {
        (0..FACTION_COUNT).map(|i| FactionId(i as u8))
    }
}

/// Symmetric affinity in [-1, 1]: 1 for the same faction, negative for rivals.
#[must_use]
pub fn affinity(a: FactionId, b: FactionId) -> f32 {
    if a == b {
        return 1.0;
    }
    (a.safe_phase() - b.safe_phase()).cos()
}

#[must_use]
pub fn is_friendly(a: FactionId, b: FactionId) -> bool {
    affinity(a, b) >= FRIENDLY_AFFINITY
}

#[must_use]
pub fn is_hostile(a: FactionId, b: FactionId) -> bool {
    affinity(a, b) <= HOSTILE_AFFINITY
}

/// Loose faction reference accepted from external input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FactionRef {
    Id(usize),
    Name(String),
}

impl FactionRef {
    /// Resolves the reference, or `None` when it names no known faction.
    #[must_use]
    pub fn resolve(&self) -> Option<FactionId> {
        match self {
            FactionRef::Id(i) => FactionId::from_index(*i),
            FactionRef::Name(n) => FactionId::from_name(n),
        }
    }
}

impl From<usize> for FactionRef {
    fn from(i: usize) -> Self {
        FactionRef::Id(i)
    }
}

impl From<&str> for FactionRef {
    fn from(name: &str) -> Self {
        FactionRef::Name(name.to_string())
    }
}

impl From<FactionId> for FactionRef {
    fn from(id: FactionId) -> Self {
        FactionRef::Id(id.index())
    }
}
