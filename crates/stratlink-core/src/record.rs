//! Raw per-unit simulation state.
//!
//! A [`RawRecord`] is the owned copy of one unit's live state handed out by
//! a [`RawStateSource`](crate::source::RawStateSource). The source may
//! mutate between reads, but a returned record never changes under the
//! caller, so every accessor computed from one record is self-consistent.

use crate::catalog::{TechId, UnitKindId, UpgradeId};
use crate::geometry::Position;
use crate::id::{PlayerId, SlotIndex};
use serde::{Deserialize, Serialize};

/// Longest permitted production queue.
pub const BUILD_QUEUE_CAP: usize = 5;

// ---------------------------------------------------------------------------
// Activity
// ---------------------------------------------------------------------------

/// What a unit is currently doing.
///
/// A closed set: each record carries exactly one activity, so predicates
/// like "is gathering" are a plain match instead of a numeric range check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Activity {
    Idle,
    Guarding,
    Stopped,
    HoldingPosition,
    Moving,
    Patrolling,
    Following,
    Attacking,
    GatheringMinerals,
    GatheringGas,
    ReturningCargo,
    Constructing,
    BeingConstructed,
    Morphing,
    Researching,
    Upgrading,
    Repairing,
    Training,
    Unloading,
    Landing,
    LiftingOff,
}

impl Activity {
    /// Activities that occupy a production facility's queue machinery.
    pub fn is_producing(self) -> bool {
        matches!(self, Self::Training | Self::Morphing)
    }

    /// Activities during which most new orders are rejected as busy.
    pub fn is_transitional(self) -> bool {
        matches!(
            self,
            Self::Morphing | Self::BeingConstructed | Self::Landing | Self::LiftingOff
        )
    }

    pub fn is_gathering(self) -> bool {
        matches!(self, Self::GatheringMinerals | Self::GatheringGas)
    }
}

// ---------------------------------------------------------------------------
// RawRecord
// ---------------------------------------------------------------------------

/// Resource cargo a worker may be holding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CarriedCargo {
    Minerals,
    Gas,
}

/// One unit's state as the simulation reports it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawRecord {
    pub owner: PlayerId,
    pub kind: UnitKindId,
    pub position: Position,

    pub hit_points: i32,
    pub shields: i32,
    pub energy: i32,
    /// Minerals or gas remaining, for resource containers.
    pub resources: i32,
    /// Stored rounds for ammunition-fed abilities.
    pub ammo: i32,
    pub kill_count: i32,
    pub ground_weapon_cooldown: i32,
    pub air_weapon_cooldown: i32,

    pub activity: Activity,
    /// Set during the wind-up frames before the first attack lands.
    pub starting_attack: bool,
    /// Construction or morph has finished.
    pub completed: bool,
    pub hallucination: bool,

    pub burrowed: bool,
    pub cloaked: bool,
    pub sieged: bool,
    pub lifted: bool,
    pub stimmed: bool,

    /// Slot of the unit currently targeted, if any.
    pub target: Option<SlotIndex>,
    pub move_target: Option<Position>,
    pub rally_position: Option<Position>,
    pub rally_unit: Option<SlotIndex>,

    /// Pending production, front of the queue first. At most
    /// [`BUILD_QUEUE_CAP`] entries.
    pub build_queue: Vec<UnitKindId>,
    pub researching: Option<TechId>,
    pub upgrading: Option<UpgradeId>,
    pub remaining_build_time: i32,
    pub remaining_train_time: i32,
    pub remaining_research_time: i32,
    pub remaining_upgrade_time: i32,

    /// Slots of units riding inside this transport.
    pub loaded_units: Vec<SlotIndex>,
    pub carried_cargo: Option<CarriedCargo>,
}

impl RawRecord {
    /// A completed, idle unit at `position`; fixtures adjust what they need.
    pub fn new(owner: PlayerId, kind: UnitKindId, position: Position) -> Self {
        Self {
            owner,
            kind,
            position,
            hit_points: 1,
            shields: 0,
            energy: 0,
            resources: 0,
            ammo: 0,
            kill_count: 0,
            ground_weapon_cooldown: 0,
            air_weapon_cooldown: 0,
            activity: Activity::Idle,
            starting_attack: false,
            completed: true,
            hallucination: false,
            burrowed: false,
            cloaked: false,
            sieged: false,
            lifted: false,
            stimmed: false,
            target: None,
            move_target: None,
            rally_position: None,
            rally_unit: None,
            build_queue: Vec::new(),
            researching: None,
            upgrading: None,
            remaining_build_time: 0,
            remaining_train_time: 0,
            remaining_research_time: 0,
            remaining_upgrade_time: 0,
            loaded_units: Vec::new(),
            carried_cargo: None,
        }
    }

    /// Whether any production, research, or upgrade is in flight.
    pub fn is_occupied_producing(&self) -> bool {
        !self.build_queue.is_empty() || self.researching.is_some() || self.upgrading.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_record_is_idle_and_complete() {
        let r = RawRecord::new(PlayerId(0), UnitKindId(1), Position::new(10, 20));
        assert_eq!(r.activity, Activity::Idle);
        assert!(r.completed);
        assert!(!r.is_occupied_producing());
    }

    #[test]
    fn activity_predicates() {
        assert!(Activity::Training.is_producing());
        assert!(Activity::Morphing.is_transitional());
        assert!(Activity::GatheringGas.is_gathering());
        assert!(!Activity::Idle.is_gathering());
    }
}
