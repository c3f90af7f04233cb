//! The access gate.
//!
//! Three tiers decide what a player may learn about a unit:
//!
//! - the plain gate (`can_access`) guards dynamic state such as position
//!   and hit points;
//! - the special gate (`can_access_special`) additionally admits a
//!   just-destroyed unit the player used to own, so identity queries keep
//!   answering from the death snapshot;
//! - the inside gate (`can_access_inside`) guards production internals and
//!   cargo, which only the owner (or complete information) may see.
//!
//! During the batch refresh window the gates grant everything and the
//! error slot is left untouched; the refresh machinery reads units the
//! player could not.

use crate::mirror::UnitMirror;
use std::cell::Cell;
use stratlink_core::catalog::UnitTraits;
use stratlink_core::error::ErrorCode;
use stratlink_core::id::PlayerId;
use stratlink_core::source::VisibilityMask;

/// Inputs the gate predicates need beyond the mirror itself.
#[derive(Debug, Clone, Copy)]
pub(crate) struct GateContext {
    pub self_player: PlayerId,
    pub complete_information: bool,
    pub frame: u64,
    pub in_refresh: bool,
}

impl GateContext {
    /// Whether the mirror currently holds a live unit.
    pub fn exists(&self, mirror: &UnitMirror) -> bool {
        mirror.is_alive() && mirror.live().is_some()
    }

    /// Plain gate: live and either visible to us, revealed by complete
    /// information, or covered by an exception (refresh window; frame-zero
    /// neutral and resource units, whose starting state is public).
    pub fn can_access(
        &self,
        mirror: &UnitMirror,
        visibility: VisibilityMask,
        traits: Option<&UnitTraits>,
    ) -> bool {
        if !self.exists(mirror) {
            return false;
        }
        if self.in_refresh || self.complete_information {
            return true;
        }
        if visibility.visible_to(self.self_player) {
            return true;
        }
        if self.frame == 0 {
            if let Some(traits) = traits {
                if traits.is_neutral || traits.is_resource_container {
                    return true;
                }
            }
        }
        false
    }

    /// Special gate: the plain gate, or a destroyed unit we last owned.
    pub fn can_access_special(
        &self,
        mirror: &UnitMirror,
        visibility: VisibilityMask,
        traits: Option<&UnitTraits>,
    ) -> bool {
        if self.can_access(mirror, visibility, traits) {
            return true;
        }
        mirror.last_owner == Some(self.self_player)
    }

    /// Inside gate: the plain gate, narrowed to own units unless complete
    /// information reveals everyone's internals.
    pub fn can_access_inside(
        &self,
        mirror: &UnitMirror,
        visibility: VisibilityMask,
        traits: Option<&UnitTraits>,
    ) -> bool {
        if !self.can_access(mirror, visibility, traits) {
            return false;
        }
        if self.complete_information {
            return true;
        }
        mirror.live().map(|r| r.owner) == Some(self.self_player)
    }

    /// Wrap a gate verdict with error reporting.
    ///
    /// Outside the refresh window: clear the error slot, and on denial
    /// store `UnitDoesNotExist` for a unit confirmed gone that we used to
    /// own, `UnitNotVisible` otherwise. Inside the window the verdict
    /// passes through and the slot is never touched.
    pub fn attempt(
        &self,
        mirror: &UnitMirror,
        granted: bool,
        error_slot: &Cell<Option<ErrorCode>>,
    ) -> bool {
        if self.in_refresh {
            return granted;
        }
        error_slot.set(None);
        if granted {
            return true;
        }
        let code = if !self.exists(mirror) && mirror.last_owner == Some(self.self_player) {
            ErrorCode::UnitDoesNotExist
        } else {
            ErrorCode::UnitNotVisible
        };
        error_slot.set(Some(code));
        false
    }
}
