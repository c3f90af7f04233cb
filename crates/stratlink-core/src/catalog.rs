//! The unit and technology catalog.
//!
//! The reference data a session needs to validate commands: which unit kinds
//! can move, produce, burrow, or siege, what their weapons reach, what a
//! technology costs in energy and which kinds may use it. The catalog is
//! supplied by the embedder at session construction and never changes during
//! a match; the protocol core only reads it.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

// ---------------------------------------------------------------------------
// Ids
// ---------------------------------------------------------------------------

/// Identifier of a unit kind (catalog key).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UnitKindId(pub u16);

/// Identifier of a researchable technology.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TechId(pub u16);

/// Identifier of a levelled upgrade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UpgradeId(pub u16);

impl fmt::Display for UnitKindId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "kind {}", self.0)
    }
}

// ---------------------------------------------------------------------------
// WeaponProfile
// ---------------------------------------------------------------------------

/// Range band of a weapon, in pixels from the wielder's center.
///
/// A target closer than `min_range` or farther than `max_range` cannot be
/// hit by a unit that is unable to reposition itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeaponProfile {
    pub min_range: i32,
    pub max_range: i32,
}

impl WeaponProfile {
    /// Whether `distance` falls inside the weapon's range band.
    pub fn in_range(&self, distance: f64) -> bool {
        distance >= f64::from(self.min_range) && distance <= f64::from(self.max_range)
    }
}

// ---------------------------------------------------------------------------
// UnitTraits
// ---------------------------------------------------------------------------

/// Build cost of a unit kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct UnitCost {
    pub minerals: i32,
    pub gas: i32,
    pub supply: i32,
}

/// Static capabilities of a unit kind.
///
/// Everything the command validator needs to know about a kind without
/// touching live simulation state. Toggle capabilities carry the technology
/// that must be researched before the toggle may be used (`None` means the
/// ability is innate).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitTraits {
    pub name: String,
    pub cost: UnitCost,
    /// Technology that must be researched before this kind can be made.
    pub required_tech: Option<TechId>,

    pub is_building: bool,
    pub is_addon: bool,
    pub is_worker: bool,
    pub is_organic: bool,
    pub is_flyer: bool,
    pub is_neutral: bool,
    pub is_resource_container: bool,

    pub can_move: bool,
    /// Can train units (has a build queue).
    pub can_produce: bool,
    /// Building that can lift off and land.
    pub can_lift: bool,
    /// Can carry other units.
    pub is_transport: bool,

    pub can_burrow: Option<ToggleRequirement>,
    pub can_cloak: Option<ToggleRequirement>,
    pub can_siege: Option<ToggleRequirement>,

    pub ground_weapon: Option<WeaponProfile>,
    pub air_weapon: Option<WeaponProfile>,

    pub max_hit_points: i32,
    pub max_shields: i32,
    pub max_energy: i32,

    /// Collision radius used for edge-to-edge distance, in pixels.
    pub bounding_radius: i32,
    /// Footprint for placement checks, in tiles.
    pub tile_width: i32,
    pub tile_height: i32,
}

/// Prerequisites for using a toggle ability (burrow/cloak/siege).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ToggleRequirement {
    /// Technology that must be researched, if any.
    pub tech: Option<TechId>,
    /// Energy drained when engaging the toggle.
    pub energy_cost: i32,
}

impl UnitTraits {
    /// A blank, immobile, incapable kind; fixtures override what they need.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            cost: UnitCost::default(),
            required_tech: None,
            is_building: false,
            is_addon: false,
            is_worker: false,
            is_organic: false,
            is_flyer: false,
            is_neutral: false,
            is_resource_container: false,
            can_move: false,
            can_produce: false,
            can_lift: false,
            is_transport: false,
            can_burrow: None,
            can_cloak: None,
            can_siege: None,
            ground_weapon: None,
            air_weapon: None,
            max_hit_points: 1,
            max_shields: 0,
            max_energy: 0,
            bounding_radius: 8,
            tile_width: 1,
            tile_height: 1,
        }
    }
}

// ---------------------------------------------------------------------------
// TechTraits
// ---------------------------------------------------------------------------

/// What a technology is aimed at when used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TechTarget {
    /// Cast on the user itself (stims, toggles).
    SelfCast,
    /// Cast at a map position.
    Ground,
    /// Cast on another unit.
    Unit,
}

/// Which toggle a self-cast technology drives, if any.
///
/// Using such a technology is rewritten into the matching toggle command
/// pair (engage when disengaged, disengage when engaged).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ToggleKind {
    Burrow,
    Cloak,
    Siege,
}

/// Static properties of a researchable technology.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TechTraits {
    pub name: String,
    pub energy_cost: i32,
    pub target: TechTarget,
    /// Self-cast technologies that flip a persistent mode.
    pub toggle: Option<ToggleKind>,
    /// Whether each use consumes one round of stored ammunition.
    pub consumes_ammo: bool,
    /// Kinds permitted to use this technology.
    pub users: Vec<UnitKindId>,
}

impl TechTraits {
    /// Whether `kind` is among the permitted users.
    pub fn usable_by(&self, kind: UnitKindId) -> bool {
        self.users.contains(&kind)
    }
}

// ---------------------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------------------

/// Immutable registry of unit kinds and technologies for one game rule set.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Catalog {
    units: HashMap<UnitKindId, UnitTraits>,
    techs: HashMap<TechId, TechTraits>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a unit kind. Later registrations overwrite earlier ones.
    pub fn register_unit(&mut self, id: UnitKindId, traits: UnitTraits) {
        self.units.insert(id, traits);
    }

    /// Register a technology.
    pub fn register_tech(&mut self, id: TechId, traits: TechTraits) {
        self.techs.insert(id, traits);
    }

    /// Traits of a unit kind, if registered.
    pub fn unit(&self, id: UnitKindId) -> Option<&UnitTraits> {
        self.units.get(&id)
    }

    /// Traits of a technology, if registered.
    pub fn tech(&self, id: TechId) -> Option<&TechTraits> {
        self.techs.get(&id)
    }

    pub fn unit_count(&self) -> usize {
        self.units.len()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weapon_range_band() {
        let w = WeaponProfile {
            min_range: 32,
            max_range: 128,
        };
        assert!(!w.in_range(10.0));
        assert!(w.in_range(32.0));
        assert!(w.in_range(128.0));
        assert!(!w.in_range(128.5));
    }

    #[test]
    fn catalog_lookup() {
        let mut catalog = Catalog::new();
        let id = UnitKindId(7);
        catalog.register_unit(id, UnitTraits::named("sentry"));
        assert_eq!(catalog.unit(id).map(|t| t.name.as_str()), Some("sentry"));
        assert!(catalog.unit(UnitKindId(8)).is_none());
    }

    #[test]
    fn tech_user_check() {
        let tech = TechTraits {
            name: "tunneling".to_owned(),
            energy_cost: 0,
            target: TechTarget::SelfCast,
            toggle: Some(ToggleKind::Burrow),
            consumes_ammo: false,
            users: vec![UnitKindId(1), UnitKindId(2)],
        };
        assert!(tech.usable_by(UnitKindId(1)));
        assert!(!tech.usable_by(UnitKindId(3)));
    }
}
