//! Unit and player identifiers.
//!
//! A [`UnitId`] is a 64-bit handle that packs a *generation* counter in the
//! high 32 bits and a pool *slot* in the low 32 bits. The generation is
//! bumped every time a slot is reoccupied by a new unit, so a handle kept
//! across an occupant change is immediately detectable as stale instead of
//! silently resolving to the new occupant.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Index of a slot in the fixed-size unit pool.
pub type SlotIndex = u32;

// ---------------------------------------------------------------------------
// UnitId
// ---------------------------------------------------------------------------

/// A generational unit handle.
///
/// Layout: `[generation: u32 | slot: u32]`
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UnitId(u64);

impl UnitId {
    /// Construct a `UnitId` from a slot and generation.
    #[inline]
    pub fn new(slot: SlotIndex, generation: u32) -> Self {
        Self((generation as u64) << 32 | slot as u64)
    }

    /// The slot portion (low 32 bits).
    #[inline]
    pub fn slot(self) -> SlotIndex {
        self.0 as u32
    }

    /// The generation portion (high 32 bits).
    #[inline]
    pub fn generation(self) -> u32 {
        (self.0 >> 32) as u32
    }

    /// Raw `u64` representation.
    #[inline]
    pub fn to_raw(self) -> u64 {
        self.0
    }

    /// Reconstruct from a raw `u64`.
    #[inline]
    pub fn from_raw(raw: u64) -> Self {
        Self(raw)
    }
}

impl fmt::Debug for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "UnitId({}v{})", self.slot(), self.generation())
    }
}

impl fmt::Display for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}v{}", self.slot(), self.generation())
    }
}

// ---------------------------------------------------------------------------
// PlayerId
// ---------------------------------------------------------------------------

/// Numeric player identifier.
///
/// Player 255 is reserved for the neutral player that owns resource fields
/// and critters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlayerId(pub u8);

impl PlayerId {
    /// The neutral player.
    pub const NEUTRAL: PlayerId = PlayerId(255);

    /// Whether this is the neutral player.
    #[inline]
    pub fn is_neutral(self) -> bool {
        self == Self::NEUTRAL
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_neutral() {
            write!(f, "neutral")
        } else {
            write!(f, "player {}", self.0)
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
