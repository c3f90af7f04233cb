//! The raw state source boundary.
//!
//! [`RawStateSource`] is the single seam between the protocol and whatever
//! actually runs the simulation: a live game process, a replay reader, or
//! the deterministic test harness. The protocol only ever reads owned
//! record copies and pushes encoded orders; it never holds references into
//! source-owned memory.

use crate::geometry::Position;
use crate::id::{PlayerId, SlotIndex};
use crate::record::RawRecord;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// VisibilityMask
// ---------------------------------------------------------------------------

/// Per-player visibility bitset for one unit.
///
/// Bit `n` set means player `n` currently sees the unit. Players above
/// bit 63 (the neutral id among them) are never tracked; they see nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct VisibilityMask(pub u64);

impl VisibilityMask {
    /// Mask with no player bit set.
    pub const NONE: VisibilityMask = VisibilityMask(0);

    pub fn visible_to(self, player: PlayerId) -> bool {
        player.0 < 64 && self.0 & (1 << player.0) != 0
    }

    pub fn with(self, player: PlayerId) -> Self {
        if player.0 < 64 {
            Self(self.0 | 1 << player.0)
        } else {
            self
        }
    }

    pub fn without(self, player: PlayerId) -> Self {
        if player.0 < 64 {
            Self(self.0 & !(1 << player.0))
        } else {
            self
        }
    }
}

// ---------------------------------------------------------------------------
// EncodedOrder
// ---------------------------------------------------------------------------

/// Wire-level opcode of an encoded order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderOpcode {
    AttackMove,
    AttackUnit,
    Move,
    RightClickPosition,
    RightClickUnit,
    Stop,
    HoldPosition,
    Patrol,
    Follow,
    Train,
    Build,
    BuildAddon,
    Morph,
    Research,
    Upgrade,
    SetRallyPosition,
    SetRallyUnit,
    Repair,
    ReturnCargo,
    Burrow,
    Unburrow,
    Siege,
    Unsiege,
    Cloak,
    Decloak,
    Lift,
    Land,
    Load,
    Unload,
    UnloadAll,
    UnloadAllAt,
    CancelConstruction,
    CancelMorph,
    CancelTrainSlot,
    CancelAddon,
    CancelResearch,
    CancelUpgrade,
    UseTech,
    UseTechAt,
    UseTechOn,
}

/// One order as sent over the wire, addressed to the currently selected
/// unit (see [`RawStateSource::select_for_command`]).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EncodedOrder {
    pub opcode: OrderOpcode,
    /// Target unit's pool slot, when the order has a unit target.
    pub target_slot: Option<SlotIndex>,
    /// Target pixel position, when the order has one.
    pub position: Option<Position>,
    /// Kind, tech, upgrade, or queue-slot argument, when the order has one.
    pub arg: Option<u16>,
}

impl EncodedOrder {
    pub fn bare(opcode: OrderOpcode) -> Self {
        Self {
            opcode,
            target_slot: None,
            position: None,
            arg: None,
        }
    }

    pub fn at(opcode: OrderOpcode, position: Position) -> Self {
        Self {
            position: Some(position),
            ..Self::bare(opcode)
        }
    }

    pub fn on(opcode: OrderOpcode, target_slot: SlotIndex) -> Self {
        Self {
            target_slot: Some(target_slot),
            ..Self::bare(opcode)
        }
    }

    pub fn with_arg(mut self, arg: u16) -> Self {
        self.arg = Some(arg);
        self
    }
}

// ---------------------------------------------------------------------------
// RawStateSource
// ---------------------------------------------------------------------------

/// Abstract view of the running simulation.
pub trait RawStateSource {
    /// Number of addressable unit slots.
    fn slot_count(&self) -> usize;

    /// Owned copy of the record in `slot`, or `None` when the slot holds no
    /// live unit. The copy is consistent for the duration of the call.
    fn read_record(&self, slot: SlotIndex) -> Option<RawRecord>;

    /// Which players currently see the unit in `slot`.
    fn visibility_mask(&self, slot: SlotIndex) -> VisibilityMask;

    /// Whether the match reveals all units to all players.
    fn complete_information_enabled(&self) -> bool;

    /// Make `slot` the addressee of subsequent [`send_order`] calls.
    ///
    /// [`send_order`]: RawStateSource::send_order
    fn select_for_command(&mut self, slot: SlotIndex);

    /// Push one encoded order at the currently selected unit. Fire and
    /// forget; results surface in later records.
    fn send_order(&mut self, order: EncodedOrder);
}
