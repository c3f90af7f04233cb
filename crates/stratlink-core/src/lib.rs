//! Shared vocabulary for the Stratlink protocol.
//!
//! Everything both sides of the protocol boundary need to agree on: the
//! generational [`UnitId`](id::UnitId) handle, map geometry, the unit and
//! technology [`Catalog`](catalog::Catalog), the closed
//! [`Command`](command::Command) vocabulary, the
//! [`ErrorCode`](error::ErrorCode) taxonomy, the
//! [`RawRecord`](record::RawRecord) state copy, and the
//! [`RawStateSource`](source::RawStateSource) seam the protocol drives.
//!
//! This crate holds no protocol logic; the access gate, mirror lifecycle,
//! and command pipeline live in `stratlink-client`.

#![deny(unsafe_code)]

pub mod catalog;
pub mod command;
pub mod error;
pub mod geometry;
pub mod id;
pub mod player;
pub mod record;
pub mod source;

/// Convenience re-exports for downstream crates.
pub mod prelude {
    pub use crate::catalog::{
        Catalog, TechId, TechTarget, TechTraits, ToggleKind, ToggleRequirement, UnitCost,
        UnitKindId, UnitTraits, UpgradeId, WeaponProfile,
    };
    pub use crate::command::Command;
    pub use crate::error::{ErrorCode, ProtocolError};
    pub use crate::geometry::{Position, TilePosition, TILE_SIZE};
    pub use crate::id::{PlayerId, SlotIndex, UnitId};
    pub use crate::player::{PlayerState, PlayerTable, Relation};
    pub use crate::record::{Activity, CarriedCargo, RawRecord, BUILD_QUEUE_CAP};
    pub use crate::source::{EncodedOrder, OrderOpcode, RawStateSource, VisibilityMask};
}
