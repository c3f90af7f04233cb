//! Error taxonomy.
//!
//! Two layers. [`ErrorCode`] is the per-session status code a failed query
//! or command leaves behind in the session's last-error slot; callers poll
//! it after a `false`/`None` result. [`ProtocolError`] is the conventional
//! structured error for operations that can fail at construction or while
//! exporting state.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

// ---------------------------------------------------------------------------
// ErrorCode
// ---------------------------------------------------------------------------

/// Status code describing why the most recent query or command failed.
///
/// Stored in the session's last-error slot, not returned from functions;
/// a cleared slot (`None`) means the last operation either succeeded or
/// never reached a failure point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorCode {
    /// The handle refers to a unit confirmed destroyed or never created.
    UnitDoesNotExist,
    /// The unit exists but is hidden from the querying player.
    UnitNotVisible,
    /// The command requires ownership of the unit.
    UnitNotOwned,
    /// The unit's kind cannot perform the command.
    IncompatibleUnitKind,
    /// The unit's current state conflicts with the command.
    UnitBusy,
    InsufficientMinerals,
    InsufficientGas,
    InsufficientSupply,
    InsufficientEnergy,
    /// The required technology is not researched.
    InsufficientTech,
    /// The command consumes stored ammunition or cargo that is absent.
    InsufficientAmmo,
    /// The target lies outside the actor's reachable range.
    OutOfRange,
    /// The actor has no weapon able to strike this target.
    UnableToHit,
    /// The requested tile area cannot hold the building.
    UnbuildableLocation,
    /// A command parameter was malformed (unregistered kind or tech).
    InvalidParameter,
}

impl ErrorCode {
    /// Short stable name, used in logs.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::UnitDoesNotExist => "unit does not exist",
            Self::UnitNotVisible => "unit not visible",
            Self::UnitNotOwned => "unit not owned",
            Self::IncompatibleUnitKind => "incompatible unit kind",
            Self::UnitBusy => "unit busy",
            Self::InsufficientMinerals => "insufficient minerals",
            Self::InsufficientGas => "insufficient gas",
            Self::InsufficientSupply => "insufficient supply",
            Self::InsufficientEnergy => "insufficient energy",
            Self::InsufficientTech => "insufficient tech",
            Self::InsufficientAmmo => "insufficient ammo",
            Self::OutOfRange => "out of range",
            Self::UnableToHit => "unable to hit",
            Self::UnbuildableLocation => "unbuildable location",
            Self::InvalidParameter => "invalid parameter",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// ProtocolError
// ---------------------------------------------------------------------------

/// Structured failure for session construction and state export.
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("unit pool capacity {0} exceeds the addressable slot range")]
    PoolTooLarge(usize),

    #[error("self player {0} is the neutral player")]
    NeutralSelfPlayer(u8),

    #[error("command log serialization failed: {0}")]
    LogExport(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_matches_name() {
        assert_eq!(ErrorCode::UnitNotVisible.to_string(), "unit not visible");
        assert_eq!(ErrorCode::OutOfRange.as_str(), "out of range");
    }

    #[test]
    fn codes_round_trip_through_json() {
        let code = ErrorCode::InsufficientTech;
        let text = serde_json::to_string(&code).unwrap();
        assert_eq!(serde_json::from_str::<ErrorCode>(&text).unwrap(), code);
    }
}
