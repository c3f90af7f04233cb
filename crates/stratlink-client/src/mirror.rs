//! The unit mirror pool.
//!
//! One [`UnitMirror`] per simulation slot. A mirror tracks the slot's
//! current occupant through its whole lifecycle: unoccupied, live (holding
//! an owned [`RawRecord`] copy), and destroyed (holding a [`SavedUnit`]
//! snapshot taken once at death). Handles are generational: reoccupying a
//! slot bumps its generation, so a [`UnitId`] from the previous occupancy
//! stops resolving instead of aliasing the newcomer.

use serde::{Deserialize, Serialize};
use stratlink_core::catalog::UnitKindId;
use stratlink_core::geometry::{Position, TilePosition};
use stratlink_core::id::{PlayerId, SlotIndex, UnitId};
use stratlink_core::record::RawRecord;

// ---------------------------------------------------------------------------
// Snapshots
// ---------------------------------------------------------------------------

/// Fields preserved past destruction, copied from the last refreshed
/// record. Never taken from a fresh read; the unit may already be gone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedUnit {
    pub owner: PlayerId,
    pub kind: UnitKindId,
    pub position: Position,
    pub tile_position: TilePosition,
    pub resources: i32,
    pub hit_points: i32,
}

impl SavedUnit {
    fn capture(record: &RawRecord) -> Self {
        Self {
            owner: record.owner,
            kind: record.kind,
            position: record.position,
            tile_position: record.position.to_tile(),
            resources: record.resources,
            hit_points: record.hit_points,
        }
    }
}

/// One-time static snapshot taken at or before frame zero.
///
/// Lets a player ask what a mineral field or starting building looked like
/// at match start even after it has been mined out or destroyed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InitialSnapshot {
    pub kind: UnitKindId,
    pub position: Position,
    pub tile_position: TilePosition,
    pub resources: i32,
    pub hit_points: i32,
}

impl InitialSnapshot {
    fn capture(record: &RawRecord) -> Self {
        Self {
            kind: record.kind,
            position: record.position,
            tile_position: record.position.to_tile(),
            resources: record.resources,
            hit_points: record.hit_points,
        }
    }
}

// ---------------------------------------------------------------------------
// UnitLink
// ---------------------------------------------------------------------------

/// What a mirror currently points at.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub enum UnitLink {
    /// Slot has never held a unit in this generation.
    #[default]
    Absent,
    /// Slot holds a live unit; the record is last refresh's owned copy.
    Live(RawRecord),
    /// The occupant was destroyed; only the snapshot remains.
    Snapshot(SavedUnit),
}

// ---------------------------------------------------------------------------
// UnitMirror
// ---------------------------------------------------------------------------

/// Client-side state for one pool slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitMirror {
    slot: SlotIndex,
    generation: u32,
    pub(crate) link: UnitLink,
    pub(crate) alive: bool,
    pub(crate) dead: bool,
    pub(crate) user_marked: bool,
    pub(crate) initial: Option<InitialSnapshot>,
    /// Owner and kind fetched ahead at refresh, used for decisions about
    /// this unit on the following frame even if it vanishes meanwhile.
    pub(crate) last_owner: Option<PlayerId>,
    pub(crate) last_kind: Option<UnitKindId>,
}

impl UnitMirror {
    fn unoccupied(slot: SlotIndex) -> Self {
        Self {
            slot,
            generation: 0,
            link: UnitLink::Absent,
            alive: false,
            dead: false,
            user_marked: false,
            initial: None,
            last_owner: None,
            last_kind: None,
        }
    }

    /// Handle for the current occupancy.
    pub fn id(&self) -> UnitId {
        UnitId::new(self.slot, self.generation)
    }

    pub fn slot(&self) -> SlotIndex {
        self.slot
    }

    pub fn generation(&self) -> u32 {
        self.generation
    }

    pub fn is_alive(&self) -> bool {
        self.alive
    }

    pub fn is_dead(&self) -> bool {
        self.dead
    }

    pub fn is_user_marked(&self) -> bool {
        self.user_marked
    }

    /// The live record, when the occupant is present and alive.
    pub fn live(&self) -> Option<&RawRecord> {
        match &self.link {
            UnitLink::Live(record) => Some(record),
            _ => None,
        }
    }

    pub(crate) fn live_mut(&mut self) -> Option<&mut RawRecord> {
        match &mut self.link {
            UnitLink::Live(record) => Some(record),
            _ => None,
        }
    }

    /// The death snapshot, when the occupant has been destroyed.
    pub fn saved(&self) -> Option<&SavedUnit> {
        match &self.link {
            UnitLink::Snapshot(saved) => Some(saved),
            _ => None,
        }
    }

    pub fn initial(&self) -> Option<&InitialSnapshot> {
        self.initial.as_ref()
    }

    /// Store this refresh's record copy and advance-fetch owner and kind.
    pub(crate) fn store_record(&mut self, record: RawRecord) {
        self.last_owner = Some(record.owner);
        self.last_kind = Some(record.kind);
        self.link = UnitLink::Live(record);
        self.alive = true;
        self.dead = false;
    }

    /// Capture the initial snapshot, at most once.
    pub(crate) fn capture_initial(&mut self) {
        if self.initial.is_none() {
            if let UnitLink::Live(record) = &self.link {
                self.initial = Some(InitialSnapshot::capture(record));
            }
        }
    }

    /// Run the destruction path: snapshot the last live record, drop the
    /// user mark, flip alive/dead. Idempotent for an already dead mirror.
    pub(crate) fn destroy(&mut self) {
        if let UnitLink::Live(record) = &self.link {
            self.link = UnitLink::Snapshot(SavedUnit::capture(record));
        }
        self.alive = false;
        self.dead = true;
        self.user_marked = false;
    }

    /// Reset the slot for a new occupant, invalidating old handles.
    pub(crate) fn begin_new_occupancy(&mut self) {
        let slot = self.slot;
        let generation = self.generation.wrapping_add(1);
        *self = Self::unoccupied(slot);
        self.generation = generation;
    }
}

// ---------------------------------------------------------------------------
// MirrorPool
// ---------------------------------------------------------------------------

/// Fixed-size pool of unit mirrors, indexed by simulation slot.
#[derive(Debug, Serialize, Deserialize)]
pub struct MirrorPool {
    slots: Vec<UnitMirror>,
}

impl MirrorPool {
    pub fn new(capacity: usize) -> Self {
        Self {
            slots: (0..capacity)
                .map(|slot| UnitMirror::unoccupied(slot as SlotIndex))
                .collect(),
        }
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn get(&self, slot: SlotIndex) -> Option<&UnitMirror> {
        self.slots.get(slot as usize)
    }

    pub fn get_mut(&mut self, slot: SlotIndex) -> Option<&mut UnitMirror> {
        self.slots.get_mut(slot as usize)
    }

    /// Resolve a handle: the slot must exist and the generation must match
    /// the current occupancy.
    pub fn resolve(&self, id: UnitId) -> Option<&UnitMirror> {
        self.get(id.slot())
            .filter(|mirror| mirror.generation == id.generation())
    }

    pub fn resolve_mut(&mut self, id: UnitId) -> Option<&mut UnitMirror> {
        self.slots
            .get_mut(id.slot() as usize)
            .filter(|mirror| mirror.generation == id.generation())
    }

    pub fn iter(&self) -> impl Iterator<Item = &UnitMirror> {
        self.slots.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stratlink_core::geometry::Position;

    fn record() -> RawRecord {
        let mut r = RawRecord::new(PlayerId(0), UnitKindId(1), Position::new(100, 100));
        r.hit_points = 40;
        r.resources = 8;
        r
    }

    #[test]
    fn store_then_destroy_keeps_snapshot() {
        let mut pool = MirrorPool::new(4);
        let mirror = pool.get_mut(2).unwrap();
        mirror.store_record(record());
        assert!(mirror.is_alive());
        assert!(!mirror.is_dead());

        mirror.destroy();
        assert!(!mirror.is_alive());
        assert!(mirror.is_dead());
        let saved = mirror.saved().unwrap();
        assert_eq!(saved.owner, PlayerId(0));
        assert_eq!(saved.hit_points, 40);
        assert_eq!(saved.tile_position, Position::new(100, 100).to_tile());
    }

    #[test]
    fn reoccupancy_invalidates_old_handles() {
        let mut pool = MirrorPool::new(4);
        let mirror = pool.get_mut(0).unwrap();
        mirror.store_record(record());
        let old_id = mirror.id();

        mirror.destroy();
        mirror.begin_new_occupancy();
        mirror.store_record(record());
        let new_id = pool.get(0).unwrap().id();

        assert_ne!(old_id, new_id);
        assert!(pool.resolve(old_id).is_none());
        assert!(pool.resolve(new_id).is_some());
    }

    #[test]
    fn initial_snapshot_is_captured_once() {
        let mut pool = MirrorPool::new(1);
        let mirror = pool.get_mut(0).unwrap();
        mirror.store_record(record());
        mirror.capture_initial();
        assert_eq!(mirror.initial().unwrap().resources, 8);

        let mut changed = record();
        changed.resources = 0;
        mirror.store_record(changed);
        mirror.capture_initial();
        assert_eq!(mirror.initial().unwrap().resources, 8);
    }

    #[test]
    fn destroy_is_idempotent() {
        let mut pool = MirrorPool::new(1);
        let mirror = pool.get_mut(0).unwrap();
        mirror.store_record(record());
        mirror.destroy();
        let saved = mirror.saved().cloned();
        mirror.destroy();
        assert_eq!(mirror.saved().cloned(), saved);
        assert!(mirror.is_dead());
    }
}
