//! Gated unit accessors.
//!
//! A [`UnitView`] is a borrowed, per-query window onto one unit. Every
//! accessor runs the appropriate gate tier first and returns a documented
//! sentinel on denial (`None`, zero, `false`, or empty) instead of leaking
//! raw state. The gate's verdict also drives the session's last-error
//! slot through the attempt wrappers.
//!
//! Tiering: dynamic state (position, hit points, activity, toggles) sits
//! behind the plain gate; identity (kind, owner) behind the special gate,
//! so a just-destroyed own unit still answers from its snapshot; internals
//! (production queues, research, rally, cargo) behind the inside gate.

use crate::mirror::{InitialSnapshot, UnitMirror};
use stratlink_core::catalog::{TechId, UnitKindId, UpgradeId};
use stratlink_core::geometry::{Position, TilePosition};
use stratlink_core::id::{PlayerId, UnitId};
use stratlink_core::record::{Activity, CarriedCargo, RawRecord};
use stratlink_core::source::RawStateSource;

use crate::session::Session;

/// Read-only view of one unit, bound to a session and a handle.
///
/// Holds the resolved mirror directly; the borrow on the session keeps the
/// occupancy from changing underneath the view.
#[derive(Clone, Copy)]
pub struct UnitView<'a, S: RawStateSource> {
    session: &'a Session<S>,
    mirror: &'a UnitMirror,
}

impl<'a, S: RawStateSource> UnitView<'a, S> {
    pub(crate) fn new(session: &'a Session<S>, mirror: &'a UnitMirror) -> Self {
        Self { session, mirror }
    }

    pub fn id(&self) -> UnitId {
        self.mirror.id()
    }

    pub(crate) fn mirror(&self) -> &'a UnitMirror {
        self.mirror
    }

    // -----------------------------------------------------------------------
    // Gate plumbing
    // -----------------------------------------------------------------------

    fn attempt_access(&self) -> bool {
        let mirror = self.mirror();
        let gate = self.session.gate();
        let granted = gate.can_access(
            mirror,
            self.session.visibility(mirror.slot()),
            self.session.traits_of(mirror),
        );
        gate.attempt(mirror, granted, self.session.error_slot())
    }

    fn attempt_access_special(&self) -> bool {
        let mirror = self.mirror();
        let gate = self.session.gate();
        let granted = gate.can_access_special(
            mirror,
            self.session.visibility(mirror.slot()),
            self.session.traits_of(mirror),
        );
        gate.attempt(mirror, granted, self.session.error_slot())
    }

    fn attempt_access_inside(&self) -> bool {
        let mirror = self.mirror();
        let gate = self.session.gate();
        let granted = gate.can_access_inside(
            mirror,
            self.session.visibility(mirror.slot()),
            self.session.traits_of(mirror),
        );
        gate.attempt(mirror, granted, self.session.error_slot())
    }

    fn record(&self) -> Option<&'a RawRecord> {
        self.mirror().live()
    }

    fn gated(&self) -> Option<&'a RawRecord> {
        if self.attempt_access() {
            self.record()
        } else {
            None
        }
    }

    fn gated_inside(&self) -> Option<&'a RawRecord> {
        if self.attempt_access_inside() {
            self.record()
        } else {
            None
        }
    }

    // -----------------------------------------------------------------------
    // Ungated
    // -----------------------------------------------------------------------

    /// Whether the unit is currently live, as far as the player may know.
    /// A live unit outside the special gate reads as nonexistent; fog of
    /// war hides liveness the same way it hides everything else.
    pub fn exists(&self) -> bool {
        let mirror = self.mirror();
        let gate = self.session.gate();
        gate.exists(mirror)
            && gate.can_access_special(
                mirror,
                self.session.visibility(mirror.slot()),
                self.session.traits_of(mirror),
            )
    }

    pub fn is_alive(&self) -> bool {
        self.mirror.is_alive()
    }

    pub fn is_dead(&self) -> bool {
        self.mirror.is_dead()
    }

    pub fn is_user_marked(&self) -> bool {
        self.mirror().is_user_marked()
    }

    /// The one-time snapshot from match start, if this slot held a unit at
    /// frame zero.
    pub fn initial(&self) -> Option<&'a InitialSnapshot> {
        self.mirror().initial()
    }

    // -----------------------------------------------------------------------
    // Plain gate: dynamic state
    // -----------------------------------------------------------------------

    pub fn position(&self) -> Option<Position> {
        self.gated().map(|r| r.position)
    }

    pub fn tile_position(&self) -> Option<TilePosition> {
        self.gated().map(|r| r.position.to_tile())
    }

    pub fn hit_points(&self) -> i32 {
        self.gated().map_or(0, |r| r.hit_points)
    }

    pub fn shields(&self) -> i32 {
        self.gated().map_or(0, |r| r.shields)
    }

    pub fn energy(&self) -> i32 {
        self.gated().map_or(0, |r| r.energy)
    }

    /// Minerals or gas remaining in a resource container.
    pub fn resources(&self) -> i32 {
        self.gated().map_or(0, |r| r.resources)
    }

    pub fn ammo(&self) -> i32 {
        self.gated().map_or(0, |r| r.ammo)
    }

    pub fn kill_count(&self) -> i32 {
        self.gated().map_or(0, |r| r.kill_count)
    }

    pub fn ground_weapon_cooldown(&self) -> i32 {
        self.gated().map_or(0, |r| r.ground_weapon_cooldown)
    }

    pub fn air_weapon_cooldown(&self) -> i32 {
        self.gated().map_or(0, |r| r.air_weapon_cooldown)
    }

    pub fn activity(&self) -> Option<Activity> {
        self.gated().map(|r| r.activity)
    }

    pub fn is_completed(&self) -> bool {
        self.gated().is_some_and(|r| r.completed)
    }

    pub fn is_idle(&self) -> bool {
        self.gated()
            .is_some_and(|r| matches!(r.activity, Activity::Idle | Activity::Guarding))
    }

    pub fn is_moving(&self) -> bool {
        self.gated()
            .is_some_and(|r| matches!(r.activity, Activity::Moving | Activity::Patrolling))
    }

    /// Attacking, including the wind-up frames before the first hit.
    pub fn is_attacking(&self) -> bool {
        self.gated()
            .is_some_and(|r| r.activity == Activity::Attacking || r.starting_attack)
    }

    pub fn is_gathering(&self) -> bool {
        self.gated().is_some_and(|r| {
            r.activity.is_gathering() || r.activity == Activity::ReturningCargo
        })
    }

    pub fn is_constructing(&self) -> bool {
        self.gated().is_some_and(|r| {
            matches!(r.activity, Activity::Constructing | Activity::BeingConstructed)
                || !r.completed
        })
    }

    pub fn is_morphing(&self) -> bool {
        self.gated().is_some_and(|r| r.activity == Activity::Morphing)
    }

    pub fn is_repairing(&self) -> bool {
        self.gated().is_some_and(|r| r.activity == Activity::Repairing)
    }

    pub fn is_burrowed(&self) -> bool {
        self.gated().is_some_and(|r| r.burrowed)
    }

    pub fn is_cloaked(&self) -> bool {
        self.gated().is_some_and(|r| r.cloaked)
    }

    pub fn is_sieged(&self) -> bool {
        self.gated().is_some_and(|r| r.sieged)
    }

    pub fn is_lifted(&self) -> bool {
        self.gated().is_some_and(|r| r.lifted)
    }

    pub fn is_stimmed(&self) -> bool {
        self.gated().is_some_and(|r| r.stimmed)
    }

    /// The unit currently targeted, as a handle into this session.
    pub fn target(&self) -> Option<UnitId> {
        let slot = self.gated().and_then(|r| r.target)?;
        self.session.handle_at(slot)
    }

    pub fn move_target(&self) -> Option<Position> {
        self.gated().and_then(|r| r.move_target)
    }

    // -----------------------------------------------------------------------
    // Special gate: identity
    // -----------------------------------------------------------------------

    /// The unit's kind. Answers from the death snapshot for a destroyed
    /// unit the player owned.
    pub fn kind(&self) -> Option<UnitKindId> {
        if !self.attempt_access_special() {
            return None;
        }
        let mirror = self.mirror();
        mirror
            .live()
            .map(|r| r.kind)
            .or_else(|| mirror.saved().map(|s| s.kind))
    }

    /// The unit's owner, with the same snapshot fallback as [`kind`].
    ///
    /// [`kind`]: UnitView::kind
    pub fn owner(&self) -> Option<PlayerId> {
        if !self.attempt_access_special() {
            return None;
        }
        let mirror = self.mirror();
        mirror
            .live()
            .map(|r| r.owner)
            .or_else(|| mirror.saved().map(|s| s.owner))
    }

    // -----------------------------------------------------------------------
    // Inside gate: internals
    // -----------------------------------------------------------------------

    /// Pending production queue, front first. Empty on denial.
    pub fn build_queue(&self) -> Vec<UnitKindId> {
        self.gated_inside()
            .map_or_else(Vec::new, |r| r.build_queue.clone())
    }

    pub fn is_training(&self) -> bool {
        self.gated_inside().is_some_and(|r| !r.build_queue.is_empty())
    }

    pub fn researching(&self) -> Option<TechId> {
        self.gated_inside().and_then(|r| r.researching)
    }

    pub fn upgrading(&self) -> Option<UpgradeId> {
        self.gated_inside().and_then(|r| r.upgrading)
    }

    pub fn remaining_build_time(&self) -> i32 {
        self.gated_inside().map_or(0, |r| r.remaining_build_time)
    }

    pub fn remaining_train_time(&self) -> i32 {
        self.gated_inside().map_or(0, |r| r.remaining_train_time)
    }

    pub fn remaining_research_time(&self) -> i32 {
        self.gated_inside().map_or(0, |r| r.remaining_research_time)
    }

    pub fn remaining_upgrade_time(&self) -> i32 {
        self.gated_inside().map_or(0, |r| r.remaining_upgrade_time)
    }

    pub fn rally_position(&self) -> Option<Position> {
        self.gated_inside().and_then(|r| r.rally_position)
    }

    pub fn rally_unit(&self) -> Option<UnitId> {
        let slot = self.gated_inside().and_then(|r| r.rally_unit)?;
        self.session.handle_at(slot)
    }

    /// Units riding inside this transport. Empty on denial.
    pub fn loaded_units(&self) -> Vec<UnitId> {
        let Some(record) = self.gated_inside() else {
            return Vec::new();
        };
        record
            .loaded_units
            .iter()
            .filter_map(|&slot| self.session.handle_at(slot))
            .collect()
    }

    pub fn carried_cargo(&self) -> Option<CarriedCargo> {
        self.gated_inside().and_then(|r| r.carried_cargo)
    }

    pub fn is_hallucination(&self) -> bool {
        self.gated_inside().is_some_and(|r| r.hallucination)
    }
}
