//! The session context object.
//!
//! A [`Session`] owns everything one player's protocol endpoint needs: the
//! raw state source, the mirror pool, the catalog, the player table, the
//! frame counter, the last-error slot, and the command log. There is no
//! global state; embedders may run several sessions side by side.

use crate::access::GateContext;
use crate::log::{CommandLog, IssuedCommand};
use crate::mirror::{MirrorPool, UnitMirror};
use crate::unit::UnitView;
use std::cell::Cell;
use std::collections::HashSet;
use stratlink_core::catalog::{Catalog, UnitTraits};
use stratlink_core::error::{ErrorCode, ProtocolError};
use stratlink_core::id::{PlayerId, SlotIndex, UnitId};
use stratlink_core::player::PlayerTable;
use stratlink_core::source::{RawStateSource, VisibilityMask};
use tracing::{debug, warn};

/// One player's live connection to the simulation.
pub struct Session<S: RawStateSource> {
    source: S,
    pool: MirrorPool,
    catalog: Catalog,
    players: PlayerTable,
    self_player: PlayerId,
    frame: u64,
    refreshes: u64,
    in_refresh: bool,
    last_error: Cell<Option<ErrorCode>>,
    pub(crate) log: CommandLog,
    /// Slot indices the source reported that do not address the pool.
    /// Warned about once, then ignored for the rest of the match.
    ignored_slots: HashSet<SlotIndex>,
}

impl<S: RawStateSource> Session<S> {
    /// Build a session for `self_player` over `source`.
    ///
    /// The pool is sized to the source's slot count. Fails when the count
    /// exceeds the handle's 32-bit slot range or the player is neutral.
    pub fn new(
        source: S,
        catalog: Catalog,
        players: PlayerTable,
        self_player: PlayerId,
    ) -> Result<Self, ProtocolError> {
        let capacity = source.slot_count();
        if capacity > u32::MAX as usize {
            return Err(ProtocolError::PoolTooLarge(capacity));
        }
        if self_player.is_neutral() {
            return Err(ProtocolError::NeutralSelfPlayer(self_player.0));
        }
        Ok(Self {
            source,
            pool: MirrorPool::new(capacity),
            catalog,
            players,
            self_player,
            frame: 0,
            refreshes: 0,
            in_refresh: false,
            last_error: Cell::new(None),
            log: CommandLog::new(),
            ignored_slots: HashSet::new(),
        })
    }

    // -----------------------------------------------------------------------
    // Frame lifecycle
    // -----------------------------------------------------------------------

    /// Refresh every mirror from the source. The driver calls this once per
    /// simulation tick, before handing control to player code.
    pub fn on_frame_refresh(&mut self) {
        if self.refreshes > 0 {
            self.frame += 1;
        }
        self.refreshes += 1;
        self.in_refresh = true;

        for slot in 0..self.pool.capacity() as SlotIndex {
            let record = self.source.read_record(slot);
            let Some(mirror) = self.pool.get_mut(slot) else {
                continue;
            };
            match record {
                Some(record) => {
                    if !mirror.is_alive() && mirror.is_dead() {
                        mirror.begin_new_occupancy();
                    }
                    mirror.store_record(record);
                }
                None => {
                    if mirror.is_alive() {
                        debug!(slot, "unit vanished from source, running destruction");
                        mirror.destroy();
                    }
                }
            }
        }

        if self.frame == 0 {
            for slot in 0..self.pool.capacity() as SlotIndex {
                if let Some(mirror) = self.pool.get_mut(slot) {
                    mirror.capture_initial();
                }
            }
        }

        self.in_refresh = false;
        debug!(frame = self.frame, "frame refresh complete");
    }

    /// Out-of-band destruction notice from the source.
    ///
    /// Slot indices outside the pool are quarantined: warned about once,
    /// then silently dropped forever. A corrupt source must not abort the
    /// match.
    pub fn on_unit_destroyed(&mut self, slot: SlotIndex) {
        match self.pool.get_mut(slot) {
            Some(mirror) => {
                if mirror.is_alive() {
                    mirror.destroy();
                }
            }
            None => {
                if self.ignored_slots.insert(slot) {
                    warn!(slot, "destruction notice for out-of-range slot, ignoring it permanently");
                }
            }
        }
    }

    /// Current frame number (zero until the second refresh).
    pub fn frame(&self) -> u64 {
        self.frame
    }

    // -----------------------------------------------------------------------
    // Error slot
    // -----------------------------------------------------------------------

    /// The status code left by the most recent failed operation.
    pub fn last_error(&self) -> Option<ErrorCode> {
        self.last_error.get()
    }

    /// Store or clear the status code. Returns `true` only for a clear,
    /// acknowledging that no error is pending.
    pub fn set_last_error(&self, code: Option<ErrorCode>) -> bool {
        self.last_error.set(code);
        code.is_none()
    }

    pub(crate) fn error_slot(&self) -> &Cell<Option<ErrorCode>> {
        &self.last_error
    }

    // -----------------------------------------------------------------------
    // Unit resolution and enumeration
    // -----------------------------------------------------------------------

    /// Resolve a handle. Returns a view while the generation matches the
    /// slot's current occupancy, including after destruction; stale handles
    /// from a prior occupancy resolve to `None`.
    pub fn unit(&self, id: UnitId) -> Option<UnitView<'_, S>> {
        self.pool.resolve(id).map(|m| UnitView::new(self, m))
    }

    /// Views of every live unit the player may access, in slot order.
    /// Units hidden by fog of war are not enumerated; handing out their
    /// handles would confirm they exist.
    pub fn units(&self) -> impl Iterator<Item = UnitView<'_, S>> {
        self.pool
            .iter()
            .filter(|m| {
                let gate = self.gate();
                m.is_alive()
                    && gate.can_access(m, self.visibility(m.slot()), self.traits_of(m))
            })
            .map(|m| UnitView::new(self, m))
    }

    /// Views of every live unit owned by the session's player.
    pub fn own_units(&self) -> impl Iterator<Item = UnitView<'_, S>> {
        self.units()
            .filter(|u| u.mirror().live().map(|r| r.owner) == Some(self.self_player))
    }

    /// Set or clear the user mark on a unit (the selection bookkeeping the
    /// destruction path clears).
    pub fn set_user_marked(&mut self, id: UnitId, marked: bool) {
        if let Some(mirror) = self.pool.resolve_mut(id) {
            if mirror.is_alive() {
                mirror.user_marked = marked;
            }
        }
    }

    // -----------------------------------------------------------------------
    // Command log
    // -----------------------------------------------------------------------

    /// Pending dispatched commands, in issuance order; clears the log.
    pub fn drain_commands(&mut self) -> Vec<IssuedCommand> {
        self.log.drain()
    }

    pub fn command_log(&self) -> &CommandLog {
        &self.log
    }

    // -----------------------------------------------------------------------
    // Shared internals
    // -----------------------------------------------------------------------

    pub(crate) fn gate(&self) -> GateContext {
        GateContext {
            self_player: self.self_player,
            complete_information: self.source.complete_information_enabled(),
            frame: self.frame,
            in_refresh: self.in_refresh,
        }
    }

    pub(crate) fn mirror(&self, id: UnitId) -> Option<&UnitMirror> {
        self.pool.resolve(id)
    }

    pub(crate) fn visibility(&self, slot: SlotIndex) -> VisibilityMask {
        self.source.visibility_mask(slot)
    }

    pub(crate) fn traits_of(&self, mirror: &UnitMirror) -> Option<&UnitTraits> {
        let kind = mirror.live().map(|r| r.kind).or(mirror.last_kind)?;
        self.catalog.unit(kind)
    }

    /// Handle of the current occupant of `slot`, if any generation has
    /// ever occupied it.
    pub(crate) fn handle_at(&self, slot: SlotIndex) -> Option<UnitId> {
        self.pool.get(slot).map(|m| m.id())
    }

    pub fn self_player(&self) -> PlayerId {
        self.self_player
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn players(&self) -> &PlayerTable {
        &self.players
    }

    /// Mutable player table access for the driver's per-tick updates.
    pub fn players_mut(&mut self) -> &mut PlayerTable {
        &mut self.players
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Mutable source access, mainly for test harnesses.
    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    pub(crate) fn source_and_pool_mut(&mut self) -> (&mut S, &mut MirrorPool) {
        (&mut self.source, &mut self.pool)
    }
}
