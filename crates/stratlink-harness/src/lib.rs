//! Deterministic test backing for the protocol.
//!
//! [`SimHarness`] is an in-memory [`RawStateSource`]: tests spawn and kill
//! units, flip visibility bits, and inspect every order the client sent.
//! [`fixture_catalog`] and [`fixture_players`] provide a small rule set
//! with one representative kind per capability the validator cares about.

#![deny(unsafe_code)]

use stratlink_core::catalog::{
    Catalog, TechId, TechTarget, TechTraits, ToggleKind, ToggleRequirement, UnitCost, UnitKindId,
    UnitTraits, WeaponProfile,
};
use stratlink_core::id::{PlayerId, SlotIndex};
use stratlink_core::player::{PlayerState, PlayerTable, Relation};
use stratlink_core::record::RawRecord;
use stratlink_core::source::{EncodedOrder, RawStateSource, VisibilityMask};

// ---------------------------------------------------------------------------
// SimHarness
// ---------------------------------------------------------------------------

/// One order as the harness received it, with the selection active at the
/// time.
#[derive(Debug, Clone, PartialEq)]
pub struct SentOrder {
    pub selected: Option<SlotIndex>,
    pub order: EncodedOrder,
}

/// In-memory simulation backend with scripted state.
#[derive(Debug)]
pub struct SimHarness {
    records: Vec<Option<RawRecord>>,
    visibility: Vec<VisibilityMask>,
    complete_information: bool,
    selected: Option<SlotIndex>,
    sent: Vec<SentOrder>,
}

impl SimHarness {
    pub fn new(capacity: usize) -> Self {
        Self {
            records: vec![None; capacity],
            visibility: vec![VisibilityMask::NONE; capacity],
            complete_information: false,
            selected: None,
            sent: Vec::new(),
        }
    }

    /// Place a unit in `slot`, visible to its owner.
    pub fn spawn(&mut self, slot: SlotIndex, record: RawRecord) {
        let owner = record.owner;
        if let Some(cell) = self.records.get_mut(slot as usize) {
            *cell = Some(record);
        }
        if let Some(mask) = self.visibility.get_mut(slot as usize) {
            *mask = mask.with(owner);
        }
    }

    /// Remove the unit from `slot`; the next refresh observes the absence.
    pub fn kill(&mut self, slot: SlotIndex) {
        if let Some(cell) = self.records.get_mut(slot as usize) {
            *cell = None;
        }
        if let Some(mask) = self.visibility.get_mut(slot as usize) {
            *mask = VisibilityMask::NONE;
        }
    }

    /// Scripted mutation of a live record.
    pub fn record_mut(&mut self, slot: SlotIndex) -> Option<&mut RawRecord> {
        self.records.get_mut(slot as usize)?.as_mut()
    }

    pub fn set_visible(&mut self, slot: SlotIndex, player: PlayerId, visible: bool) {
        if let Some(mask) = self.visibility.get_mut(slot as usize) {
            *mask = if visible {
                mask.with(player)
            } else {
                mask.without(player)
            };
        }
    }

    pub fn set_complete_information(&mut self, enabled: bool) {
        self.complete_information = enabled;
    }

    /// Every order sent so far, in send order.
    pub fn sent_orders(&self) -> &[SentOrder] {
        &self.sent
    }

    pub fn clear_sent(&mut self) {
        self.sent.clear();
    }
}

impl RawStateSource for SimHarness {
    fn slot_count(&self) -> usize {
        self.records.len()
    }

    fn read_record(&self, slot: SlotIndex) -> Option<RawRecord> {
        self.records.get(slot as usize)?.clone()
    }

    fn visibility_mask(&self, slot: SlotIndex) -> VisibilityMask {
        self.visibility
            .get(slot as usize)
            .copied()
            .unwrap_or(VisibilityMask::NONE)
    }

    fn complete_information_enabled(&self) -> bool {
        self.complete_information
    }

    fn select_for_command(&mut self, slot: SlotIndex) {
        self.selected = Some(slot);
    }

    fn send_order(&mut self, order: EncodedOrder) {
        self.sent.push(SentOrder {
            selected: self.selected,
            order,
        });
    }
}

// ---------------------------------------------------------------------------
// Fixture kinds
// ---------------------------------------------------------------------------

pub const RIFLEMAN: UnitKindId = UnitKindId(1);
pub const HARVESTER: UnitKindId = UnitKindId(2);
pub const GARRISON: UnitKindId = UnitKindId(3);
pub const SIEGE_CRAWLER: UnitKindId = UnitKindId(4);
pub const PROWLER: UnitKindId = UnitKindId(5);
pub const BURROWER: UnitKindId = UnitKindId(6);
pub const TRANSPORT: UnitKindId = UnitKindId(7);
pub const MINERAL_FIELD: UnitKindId = UnitKindId(8);
pub const WATCHTOWER: UnitKindId = UnitKindId(9);
pub const ADDON_BAY: UnitKindId = UnitKindId(10);

pub const SIEGE_PROTOCOL: TechId = TechId(1);
pub const CLOAKING_FIELD: TechId = TechId(2);
pub const TUNNELING: TechId = TechId(3);
pub const SENSOR_SWEEP: TechId = TechId(4);
pub const NANO_REPAIR: TechId = TechId(5);
pub const REMOTE_MINES: TechId = TechId(6);

/// A catalog with one kind per capability the validator distinguishes.
pub fn fixture_catalog() -> Catalog {
    let mut catalog = Catalog::new();

    let mut rifleman = UnitTraits::named("rifleman");
    rifleman.cost = UnitCost {
        minerals: 50,
        gas: 0,
        supply: 1,
    };
    rifleman.is_organic = true;
    rifleman.can_move = true;
    rifleman.max_hit_points = 40;
    rifleman.ground_weapon = Some(WeaponProfile {
        min_range: 0,
        max_range: 160,
    });
    rifleman.air_weapon = Some(WeaponProfile {
        min_range: 0,
        max_range: 160,
    });
    catalog.register_unit(RIFLEMAN, rifleman);

    let mut harvester = UnitTraits::named("harvester");
    harvester.cost = UnitCost {
        minerals: 50,
        gas: 0,
        supply: 1,
    };
    harvester.is_worker = true;
    harvester.can_move = true;
    harvester.max_hit_points = 60;
    catalog.register_unit(HARVESTER, harvester);

    let mut garrison = UnitTraits::named("garrison");
    garrison.cost = UnitCost {
        minerals: 400,
        gas: 0,
        supply: 0,
    };
    garrison.is_building = true;
    garrison.can_produce = true;
    garrison.can_lift = true;
    garrison.max_hit_points = 500;
    garrison.bounding_radius = 64;
    garrison.tile_width = 4;
    garrison.tile_height = 3;
    catalog.register_unit(GARRISON, garrison);

    let mut crawler = UnitTraits::named("siege crawler");
    crawler.cost = UnitCost {
        minerals: 150,
        gas: 100,
        supply: 2,
    };
    crawler.can_move = true;
    crawler.can_siege = Some(ToggleRequirement {
        tech: Some(SIEGE_PROTOCOL),
        energy_cost: 0,
    });
    crawler.max_hit_points = 150;
    crawler.ground_weapon = Some(WeaponProfile {
        min_range: 64,
        max_range: 384,
    });
    catalog.register_unit(SIEGE_CRAWLER, crawler);

    let mut prowler = UnitTraits::named("prowler");
    prowler.cost = UnitCost {
        minerals: 125,
        gas: 125,
        supply: 2,
    };
    prowler.can_move = true;
    prowler.can_cloak = Some(ToggleRequirement {
        tech: Some(CLOAKING_FIELD),
        energy_cost: 25,
    });
    prowler.max_hit_points = 120;
    prowler.max_energy = 200;
    prowler.ground_weapon = Some(WeaponProfile {
        min_range: 0,
        max_range: 192,
    });
    catalog.register_unit(PROWLER, prowler);

    let mut burrower = UnitTraits::named("burrower");
    burrower.cost = UnitCost {
        minerals: 75,
        gas: 25,
        supply: 1,
    };
    burrower.is_organic = true;
    burrower.can_move = true;
    burrower.can_burrow = Some(ToggleRequirement {
        tech: Some(TUNNELING),
        energy_cost: 0,
    });
    burrower.max_hit_points = 35;
    catalog.register_unit(BURROWER, burrower);

    let mut transport = UnitTraits::named("transport");
    transport.cost = UnitCost {
        minerals: 100,
        gas: 100,
        supply: 2,
    };
    transport.can_move = true;
    transport.is_flyer = true;
    transport.is_transport = true;
    transport.max_hit_points = 150;
    catalog.register_unit(TRANSPORT, transport);

    let mut field = UnitTraits::named("ore field");
    field.is_neutral = true;
    field.is_resource_container = true;
    field.max_hit_points = 100000;
    field.bounding_radius = 32;
    field.tile_width = 2;
    field.tile_height = 1;
    catalog.register_unit(MINERAL_FIELD, field);

    let mut tower = UnitTraits::named("watchtower");
    tower.cost = UnitCost {
        minerals: 150,
        gas: 0,
        supply: 0,
    };
    tower.is_building = true;
    tower.max_hit_points = 300;
    tower.bounding_radius = 32;
    tower.tile_width = 2;
    tower.tile_height = 2;
    tower.ground_weapon = Some(WeaponProfile {
        min_range: 64,
        max_range: 224,
    });
    tower.air_weapon = Some(WeaponProfile {
        min_range: 0,
        max_range: 224,
    });
    catalog.register_unit(WATCHTOWER, tower);

    let mut bay = UnitTraits::named("addon bay");
    bay.cost = UnitCost {
        minerals: 50,
        gas: 50,
        supply: 0,
    };
    bay.is_building = true;
    bay.is_addon = true;
    bay.max_hit_points = 200;
    catalog.register_unit(ADDON_BAY, bay);

    catalog.register_tech(
        SIEGE_PROTOCOL,
        TechTraits {
            name: "siege protocol".to_owned(),
            energy_cost: 0,
            target: TechTarget::SelfCast,
            toggle: Some(ToggleKind::Siege),
            consumes_ammo: false,
            users: vec![SIEGE_CRAWLER],
        },
    );
    catalog.register_tech(
        CLOAKING_FIELD,
        TechTraits {
            name: "cloaking field".to_owned(),
            energy_cost: 25,
            target: TechTarget::SelfCast,
            toggle: Some(ToggleKind::Cloak),
            consumes_ammo: false,
            users: vec![PROWLER],
        },
    );
    catalog.register_tech(
        TUNNELING,
        TechTraits {
            name: "tunneling".to_owned(),
            energy_cost: 0,
            target: TechTarget::SelfCast,
            toggle: Some(ToggleKind::Burrow),
            consumes_ammo: false,
            users: vec![BURROWER],
        },
    );
    catalog.register_tech(
        SENSOR_SWEEP,
        TechTraits {
            name: "sensor sweep".to_owned(),
            energy_cost: 50,
            target: TechTarget::Ground,
            toggle: None,
            consumes_ammo: false,
            users: vec![PROWLER],
        },
    );
    catalog.register_tech(
        NANO_REPAIR,
        TechTraits {
            name: "nano repair".to_owned(),
            energy_cost: 25,
            target: TechTarget::Unit,
            toggle: None,
            consumes_ammo: false,
            users: vec![PROWLER],
        },
    );
    catalog.register_tech(
        REMOTE_MINES,
        TechTraits {
            name: "remote mines".to_owned(),
            energy_cost: 0,
            target: TechTarget::Ground,
            toggle: None,
            consumes_ammo: true,
            users: vec![PROWLER],
        },
    );

    catalog
}

/// Two hostile players with comfortable resources, plus nothing for the
/// neutral player (it needs no entry).
pub fn fixture_players() -> PlayerTable {
    let mut table = PlayerTable::new();

    let mut p0 = PlayerState::default();
    p0.minerals = 1000;
    p0.gas = 500;
    p0.supply_used = 10;
    p0.supply_cap = 40;
    p0.set_relation(PlayerId(1), Relation::Enemy);

    let mut p1 = PlayerState::default();
    p1.minerals = 1000;
    p1.gas = 500;
    p1.supply_used = 10;
    p1.supply_cap = 40;
    p1.set_relation(PlayerId(0), Relation::Enemy);

    table.insert(PlayerId(0), p0);
    table.insert(PlayerId(1), p1);
    table
}

/// Install a per-test subscriber that prints on failure. Safe to call from
/// every test; only the first call wins.
pub fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("debug")),
        )
        .with_test_writer()
        .try_init();
}
