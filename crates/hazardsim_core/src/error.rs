//! Error types for the simulation core.
//!
//! Placement failures are expected and frequent, so they are plain values the
//! caller matches on. Invariant violations only surface when
//! `debug.assert_invariants` is enabled.

use thiserror::Error;

/// Why a spawn, ignition or material placement was refused.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlacementError {
    #[error("tile is occupied by another agent")]
    TileOccupied,
    #[error("no open tile exists on the grid")]
    NoOpenTile,
    #[error("tile is blocked")]
    Blocked,
}

impl PlacementError {
    /// Stable string code handed to external collaborators.
    #[must_use]
    pub fn code(self) -> &'static str {
        match self {
            PlacementError::TileOccupied => "tile-occupied",
            PlacementError::NoOpenTile => "no-open-tile",
            PlacementError::Blocked => "blocked",
        }
    }
}

/// Main error type for simulation operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SimError {
    /// A bounded field escaped its valid range.
    #[error("invariant violation: {field}[{index}] = {value}")]
    InvariantViolation {
        field: String,
        index: usize,
        value: f32,
    },

    #[error("placement error: {0}")]
    Placement(#[from] PlacementError),
}

impl SimError {
    #[must_use]
    pub fn invariant<S: Into<String>>(field: S, index: usize, value: f32) -> Self {
        Self::InvariantViolation {
            field: field.into(),
            index,
            value,
        }
    }
}

/// Result type alias for simulation operations.
pub type Result<T> = std::result::Result<T, SimError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placement_codes() {
        assert_eq!(PlacementError::TileOccupied.code(), "tile-occupied");
        assert_eq!(PlacementError::NoOpenTile.code(), "no-open-tile");
        assert_eq!(PlacementError::Blocked.code(), "blocked");
    }

    #[test]
    fn test_error_display() {
        let err = SimError::invariant("frontier[1]", 42, 1.5);
        assert_eq!(
            err.to_string(),
            "invariant violation: frontier[1][42] = 1.5"
        );
        let err: SimError = PlacementError::Blocked.into();
        assert!(err.to_string().contains("blocked"));
    }
}
