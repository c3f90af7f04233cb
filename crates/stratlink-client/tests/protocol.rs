//! End-to-end protocol behavior over the deterministic harness.

use stratlink_client::prelude::*;
use stratlink_harness::{
    fixture_catalog, fixture_players, init_test_logging, SimHarness, BURROWER, GARRISON,
    HARVESTER, MINERAL_FIELD, PROWLER, REMOTE_MINES, RIFLEMAN, SIEGE_CRAWLER, SIEGE_PROTOCOL,
    TRANSPORT, TUNNELING, WATCHTOWER,
};

const P0: PlayerId = PlayerId(0);
const P1: PlayerId = PlayerId(1);

fn new_session(harness: SimHarness) -> Session<SimHarness> {
    init_test_logging();
    Session::new(harness, fixture_catalog(), fixture_players(), P0).unwrap()
}

fn id_at(session: &Session<SimHarness>, slot: SlotIndex) -> UnitId {
    session
        .units()
        .find(|u| u.id().slot() == slot)
        .map(|u| u.id())
        .unwrap()
}

// ---------------------------------------------------------------------------
// Lifecycle
// ---------------------------------------------------------------------------

#[test]
fn destroyed_own_unit_answers_identity_from_its_snapshot() {
    let mut harness = SimHarness::new(8);
    harness.spawn(0, RawRecord::new(P0, RIFLEMAN, Position::new(50, 50)));
    let mut session = new_session(harness);
    session.on_frame_refresh();
    let id = id_at(&session, 0);

    session.source_mut().kill(0);
    session.on_frame_refresh();

    let unit = session.unit(id).unwrap();
    assert!(!unit.exists());
    assert_eq!(unit.owner(), Some(P0));
    assert_eq!(unit.kind(), Some(RIFLEMAN));

    // Dynamic state stays behind the plain gate and names the reason.
    assert_eq!(unit.position(), None);
    assert_eq!(session.last_error(), Some(ErrorCode::UnitDoesNotExist));

    // Commands to the dead unit carry the same identity-aware code.
    assert!(!session.stop(id));
    assert_eq!(session.last_error(), Some(ErrorCode::UnitDoesNotExist));
}

#[test]
fn stale_handles_stop_resolving_after_reoccupancy() {
    let mut harness = SimHarness::new(4);
    harness.spawn(1, RawRecord::new(P0, RIFLEMAN, Position::new(0, 0)));
    let mut session = new_session(harness);
    session.on_frame_refresh();
    let old_id = id_at(&session, 1);

    session.source_mut().kill(1);
    session.on_frame_refresh();
    session
        .source_mut()
        .spawn(1, RawRecord::new(P0, BURROWER, Position::new(9, 9)));
    session.on_frame_refresh();

    assert!(session.unit(old_id).is_none());
    let new_id = id_at(&session, 1);
    assert_ne!(old_id, new_id);
    assert!(session.unit(new_id).unwrap().exists());
}

#[test]
fn out_of_band_destruction_matches_the_refresh_path() {
    let mut harness = SimHarness::new(4);
    harness.spawn(2, RawRecord::new(P0, RIFLEMAN, Position::new(10, 10)));
    let mut session = new_session(harness);
    session.on_frame_refresh();
    let id = id_at(&session, 2);

    session.on_unit_destroyed(2);
    let unit = session.unit(id).unwrap();
    assert!(!unit.exists());
    assert_eq!(unit.owner(), Some(P0));
}

#[test]
fn corrupt_destruction_notices_are_quarantined() {
    let mut harness = SimHarness::new(4);
    harness.spawn(0, RawRecord::new(P0, RIFLEMAN, Position::new(0, 0)));
    let mut session = new_session(harness);
    session.on_frame_refresh();

    // Repeated garbage indices must neither panic nor disturb live units.
    session.on_unit_destroyed(4_000_000);
    session.on_unit_destroyed(4_000_000);
    assert!(session.unit(id_at(&session, 0)).unwrap().exists());
}

#[test]
fn initial_snapshot_survives_resource_depletion() {
    let mut harness = SimHarness::new(4);
    let mut field = RawRecord::new(PlayerId::NEUTRAL, MINERAL_FIELD, Position::new(320, 320));
    field.resources = 1500;
    harness.spawn(0, field);
    let mut session = new_session(harness);
    session.on_frame_refresh();
    let id = id_at(&session, 0);

    if let Some(r) = session.source_mut().record_mut(0) {
        r.resources = 4;
    }
    session.on_frame_refresh();

    let unit = session.unit(id).unwrap();
    assert_eq!(unit.initial().unwrap().resources, 1500);
}

// ---------------------------------------------------------------------------
// Access gate
// ---------------------------------------------------------------------------

#[test]
fn invisible_foreign_unit_yields_sentinels_and_not_visible() {
    let mut harness = SimHarness::new(4);
    let mut enemy = RawRecord::new(P1, RIFLEMAN, Position::new(700, 700));
    enemy.hit_points = 40;
    harness.spawn(0, enemy);
    harness.set_visible(0, P0, true);
    let mut session = new_session(harness);
    session.on_frame_refresh();
    let id = id_at(&session, 0);

    // The unit slips back under the fog; the kept handle must not keep
    // confirming it is there.
    session.source_mut().set_visible(0, P0, false);
    assert_eq!(session.units().count(), 0);

    let unit = session.unit(id).unwrap();
    assert!(!unit.exists());
    assert_eq!(unit.position(), None);
    assert_eq!(session.last_error(), Some(ErrorCode::UnitNotVisible));
    assert_eq!(unit.hit_points(), 0);
    assert_eq!(unit.kind(), None);
    assert_eq!(session.last_error(), Some(ErrorCode::UnitNotVisible));
}

#[test]
fn neutral_resources_are_public_on_frame_zero_only() {
    let mut harness = SimHarness::new(4);
    let mut field = RawRecord::new(PlayerId::NEUTRAL, MINERAL_FIELD, Position::new(320, 320));
    field.resources = 1500;
    harness.spawn(0, field);
    harness.set_visible(0, PlayerId::NEUTRAL, true);
    let mut session = new_session(harness);

    session.on_frame_refresh();
    assert_eq!(session.frame(), 0);
    let id = id_at(&session, 0);
    assert_eq!(session.unit(id).unwrap().resources(), 1500);

    session.on_frame_refresh();
    assert_eq!(session.frame(), 1);
    assert_eq!(session.unit(id).unwrap().resources(), 0);
    assert_eq!(session.last_error(), Some(ErrorCode::UnitNotVisible));
}

#[test]
fn production_internals_stay_with_the_owner() {
    let mut harness = SimHarness::new(4);
    let mut barracks = RawRecord::new(P1, GARRISON, Position::new(200, 200));
    barracks.build_queue = vec![RIFLEMAN];
    harness.spawn(0, barracks);
    harness.set_visible(0, P0, true);
    let mut session = new_session(harness);
    session.on_frame_refresh();
    let id = id_at(&session, 0);

    let unit = session.unit(id).unwrap();
    // Visible, so dynamic state flows...
    assert!(unit.position().is_some());
    // ...but the queue does not.
    assert!(unit.build_queue().is_empty());
    assert!(!unit.is_training());
}

#[test]
fn complete_information_opens_every_gate() {
    let mut harness = SimHarness::new(4);
    let mut barracks = RawRecord::new(P1, GARRISON, Position::new(200, 200));
    barracks.build_queue = vec![RIFLEMAN];
    harness.spawn(0, barracks);
    harness.set_complete_information(true);
    let mut session = new_session(harness);
    session.on_frame_refresh();
    let id = id_at(&session, 0);

    let unit = session.unit(id).unwrap();
    assert!(unit.position().is_some());
    assert_eq!(unit.build_queue(), vec![RIFLEMAN]);
}

// ---------------------------------------------------------------------------
// Command pipeline
// ---------------------------------------------------------------------------

#[test]
fn toggle_double_issue_sends_exactly_once() {
    let mut harness = SimHarness::new(4);
    harness.spawn(0, RawRecord::new(P0, SIEGE_CRAWLER, Position::new(100, 100)));
    let mut session = new_session(harness);
    session.on_frame_refresh();
    session
        .players_mut()
        .get_mut(P0)
        .unwrap()
        .grant_tech(SIEGE_PROTOCOL);
    let id = id_at(&session, 0);

    assert!(session.siege(id));
    assert!(session.siege(id));

    assert_eq!(session.source().sent_orders().len(), 1);
    assert_eq!(
        session.source().sent_orders()[0].order.opcode,
        OrderOpcode::Siege
    );
    assert_eq!(session.command_log().len(), 1);
}

#[test]
fn resieging_a_sieged_unit_is_a_clean_noop() {
    let mut harness = SimHarness::new(4);
    let mut crawler = RawRecord::new(P0, SIEGE_CRAWLER, Position::new(100, 100));
    crawler.sieged = true;
    harness.spawn(0, crawler.clone());
    let mut session = new_session(harness);
    session.on_frame_refresh();
    session
        .players_mut()
        .get_mut(P0)
        .unwrap()
        .grant_tech(SIEGE_PROTOCOL);
    let id = id_at(&session, 0);

    assert!(session.siege(id));
    assert!(session.source().sent_orders().is_empty());
    assert!(session.command_log().is_empty());
    // The local record was not patched either.
    assert!(session.unit(id).unwrap().is_sieged());
    assert_eq!(session.last_error(), None);
}

#[test]
fn unsiege_on_a_kind_that_cannot_siege_is_rejected() {
    let mut harness = SimHarness::new(4);
    harness.spawn(0, RawRecord::new(P0, RIFLEMAN, Position::new(50, 50)));
    let mut session = new_session(harness);
    session.on_frame_refresh();
    let id = id_at(&session, 0);

    // Already unsieged, but kind compatibility is judged before the
    // in-state shortcut.
    assert!(!session.unsiege(id));
    assert_eq!(session.last_error(), Some(ErrorCode::IncompatibleUnitKind));
    assert!(session.source().sent_orders().is_empty());
}

#[test]
fn resiege_without_the_tech_is_rejected() {
    let mut harness = SimHarness::new(4);
    let mut crawler = RawRecord::new(P0, SIEGE_CRAWLER, Position::new(100, 100));
    crawler.sieged = true;
    harness.spawn(0, crawler);
    let mut session = new_session(harness);
    session.on_frame_refresh();
    let id = id_at(&session, 0);

    assert!(!session.siege(id));
    assert_eq!(session.last_error(), Some(ErrorCode::InsufficientTech));
    assert!(session.source().sent_orders().is_empty());
}

#[test]
fn attacking_an_inaccessible_target_fails_without_sending() {
    let mut harness = SimHarness::new(4);
    harness.spawn(0, RawRecord::new(P0, RIFLEMAN, Position::new(100, 100)));
    harness.spawn(1, RawRecord::new(P1, RIFLEMAN, Position::new(130, 100)));
    harness.set_visible(1, P0, true);
    let mut session = new_session(harness);
    session.on_frame_refresh();
    let attacker = id_at(&session, 0);
    let target = id_at(&session, 1);

    session.source_mut().set_visible(1, P0, false);
    assert!(!session.attack_unit(attacker, target));
    assert!(session.source().sent_orders().is_empty());
    assert_eq!(session.last_error(), Some(ErrorCode::UnitNotVisible));
}

#[test]
fn unaffordable_training_names_the_missing_resource() {
    let mut harness = SimHarness::new(4);
    harness.spawn(0, RawRecord::new(P0, GARRISON, Position::new(100, 100)));
    let mut session = new_session(harness);
    session.on_frame_refresh();
    let id = id_at(&session, 0);

    {
        let p = session.players_mut().get_mut(P0).unwrap();
        p.minerals = 10;
    }
    assert!(!session.train(id, RIFLEMAN));
    assert_eq!(session.last_error(), Some(ErrorCode::InsufficientMinerals));

    {
        let p = session.players_mut().get_mut(P0).unwrap();
        p.minerals = 1000;
        p.supply_used = 40;
        p.supply_cap = 40;
    }
    assert!(!session.train(id, RIFLEMAN));
    assert_eq!(session.last_error(), Some(ErrorCode::InsufficientSupply));

    assert!(session.source().sent_orders().is_empty());
}

#[test]
fn rooted_attackers_respect_their_range_band() {
    let mut harness = SimHarness::new(4);
    harness.spawn(0, RawRecord::new(P0, WATCHTOWER, Position::new(0, 0)));
    harness.spawn(1, RawRecord::new(P1, RIFLEMAN, Position::new(1000, 0)));
    harness.spawn(2, RawRecord::new(P1, RIFLEMAN, Position::new(70, 0)));
    harness.spawn(3, RawRecord::new(P1, RIFLEMAN, Position::new(200, 0)));
    harness.set_visible(1, P0, true);
    harness.set_visible(2, P0, true);
    harness.set_visible(3, P0, true);
    let mut session = new_session(harness);
    session.on_frame_refresh();
    let tower = id_at(&session, 0);

    // Too far.
    assert!(!session.attack_unit(tower, id_at(&session, 1)));
    assert_eq!(session.last_error(), Some(ErrorCode::OutOfRange));

    // Inside the minimum range.
    assert!(!session.attack_unit(tower, id_at(&session, 2)));
    assert_eq!(session.last_error(), Some(ErrorCode::OutOfRange));

    // In the band.
    assert!(session.attack_unit(tower, id_at(&session, 3)));
    assert_eq!(session.source().sent_orders().len(), 1);
}

#[test]
fn right_clicking_an_enemy_behaves_like_an_attack() {
    let mut harness = SimHarness::new(8);
    harness.spawn(0, RawRecord::new(P0, WATCHTOWER, Position::new(0, 0)));
    harness.spawn(1, RawRecord::new(P0, HARVESTER, Position::new(64, 0)));
    harness.spawn(2, RawRecord::new(P1, RIFLEMAN, Position::new(1000, 0)));
    let mut field = RawRecord::new(PlayerId::NEUTRAL, MINERAL_FIELD, Position::new(320, 0));
    field.resources = 100;
    harness.spawn(3, field);
    harness.set_visible(2, P0, true);
    harness.set_visible(3, P0, true);
    let mut session = new_session(harness);
    session.on_frame_refresh();
    let tower = id_at(&session, 0);
    let worker = id_at(&session, 1);
    let enemy = id_at(&session, 2);
    let ore = id_at(&session, 3);

    // A rooted attacker still needs the target inside its range band.
    assert!(!session.issue(tower, Command::RightClickUnit(enemy)));
    assert_eq!(session.last_error(), Some(ErrorCode::OutOfRange));

    // A weaponless unit cannot right-click-attack at all.
    assert!(!session.issue(worker, Command::RightClickUnit(enemy)));
    assert_eq!(session.last_error(), Some(ErrorCode::UnableToHit));
    assert!(session.source().sent_orders().is_empty());

    // Neutral targets stay a plain right click (gathering).
    assert!(session.issue(worker, Command::RightClickUnit(ore)));
    assert_eq!(
        session.source().sent_orders()[0].order.opcode,
        OrderOpcode::RightClickUnit
    );
}

#[test]
fn commanding_a_dead_enemy_stays_behind_the_fog() {
    let mut harness = SimHarness::new(4);
    harness.spawn(0, RawRecord::new(P1, RIFLEMAN, Position::new(50, 50)));
    harness.set_visible(0, P0, true);
    let mut session = new_session(harness);
    session.on_frame_refresh();
    let id = id_at(&session, 0);

    session.source_mut().kill(0);
    session.on_frame_refresh();

    // Never self-owned, so the code must not confirm the death.
    assert!(!session.stop(id));
    assert_eq!(session.last_error(), Some(ErrorCode::UnitNotVisible));
    assert!(session.source().sent_orders().is_empty());
}

#[test]
fn missing_tech_blocks_the_toggle() {
    let mut harness = SimHarness::new(4);
    harness.spawn(0, RawRecord::new(P0, BURROWER, Position::new(50, 50)));
    let mut session = new_session(harness);
    session.on_frame_refresh();
    let id = id_at(&session, 0);

    assert!(!session.burrow(id));
    assert_eq!(session.last_error(), Some(ErrorCode::InsufficientTech));
    assert!(session.source().sent_orders().is_empty());
}

#[test]
fn toggle_tech_use_forwards_to_the_toggle_pair() {
    let mut harness = SimHarness::new(4);
    harness.spawn(0, RawRecord::new(P0, BURROWER, Position::new(50, 50)));
    let mut session = new_session(harness);
    session.on_frame_refresh();
    session
        .players_mut()
        .get_mut(P0)
        .unwrap()
        .grant_tech(TUNNELING);
    let id = id_at(&session, 0);

    assert!(session.use_tech(id, TUNNELING));
    assert_eq!(
        session.source().sent_orders()[0].order.opcode,
        OrderOpcode::Burrow
    );
    assert!(session.unit(id).unwrap().is_burrowed());

    // Using it again from the burrowed state disengages.
    assert!(session.use_tech(id, TUNNELING));
    assert_eq!(
        session.source().sent_orders()[1].order.opcode,
        OrderOpcode::Unburrow
    );
    assert!(!session.unit(id).unwrap().is_burrowed());
}

#[test]
fn boarding_goes_over_the_wire_as_a_right_click() {
    let mut harness = SimHarness::new(4);
    harness.spawn(0, RawRecord::new(P0, RIFLEMAN, Position::new(50, 50)));
    harness.spawn(1, RawRecord::new(P0, TRANSPORT, Position::new(80, 50)));
    let mut session = new_session(harness);
    session.on_frame_refresh();
    let rifleman = id_at(&session, 0);
    let transport = id_at(&session, 1);

    assert!(session.issue(rifleman, Command::Load(transport)));
    let sent = session.source().sent_orders();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].selected, Some(0));
    assert_eq!(sent[0].order.opcode, OrderOpcode::RightClickUnit);
    assert_eq!(sent[0].order.target_slot, Some(1));
}

#[test]
fn latency_compensation_shows_the_command_same_tick() {
    let mut harness = SimHarness::new(4);
    harness.spawn(0, RawRecord::new(P0, RIFLEMAN, Position::new(50, 50)));
    let mut session = new_session(harness);
    session.on_frame_refresh();
    let id = id_at(&session, 0);

    assert!(session.move_to(id, Position::new(400, 400)));
    let unit = session.unit(id).unwrap();
    assert!(unit.is_moving());
    assert_eq!(unit.move_target(), Some(Position::new(400, 400)));

    assert!(session.hold_position(id));
    assert_eq!(
        session.unit(id).unwrap().activity(),
        Some(Activity::HoldingPosition)
    );
}

#[test]
fn cancellations_with_nothing_pending_succeed_silently() {
    let mut harness = SimHarness::new(4);
    harness.spawn(0, RawRecord::new(P0, GARRISON, Position::new(100, 100)));
    let mut session = new_session(harness);
    session.on_frame_refresh();
    let id = id_at(&session, 0);

    assert!(session.issue(id, Command::CancelTrain));
    assert!(session.issue(id, Command::CancelResearch));
    assert!(session.issue(id, Command::CancelUpgrade));
    assert!(session.source().sent_orders().is_empty());
    assert_eq!(session.last_error(), None);
}

#[test]
fn cancelling_finished_construction_is_refused_quietly() {
    let mut harness = SimHarness::new(4);
    harness.spawn(0, RawRecord::new(P0, GARRISON, Position::new(100, 100)));
    let mut shell = RawRecord::new(P0, GARRISON, Position::new(300, 100));
    shell.completed = false;
    harness.spawn(1, shell);
    let mut session = new_session(harness);
    session.on_frame_refresh();

    // Nothing under construction: the call fails without a code.
    let done = id_at(&session, 0);
    assert!(!session.issue(done, Command::CancelConstruction));
    assert_eq!(session.last_error(), None);
    assert!(session.source().sent_orders().is_empty());

    // A building still going up cancels for real.
    let going_up = id_at(&session, 1);
    assert!(session.issue(going_up, Command::CancelConstruction));
    assert_eq!(
        session.source().sent_orders()[0].order.opcode,
        OrderOpcode::CancelConstruction
    );
}

#[test]
fn addon_cancellation_always_reaches_the_wire() {
    let mut harness = SimHarness::new(4);
    harness.spawn(0, RawRecord::new(P0, GARRISON, Position::new(100, 100)));
    let mut session = new_session(harness);
    session.on_frame_refresh();
    let id = id_at(&session, 0);

    assert!(session.issue(id, Command::CancelAddon));
    assert_eq!(
        session.source().sent_orders()[0].order.opcode,
        OrderOpcode::CancelAddon
    );
}

#[test]
fn commands_to_foreign_units_are_rejected_as_not_owned() {
    let mut harness = SimHarness::new(4);
    let mut enemy = RawRecord::new(P1, RIFLEMAN, Position::new(50, 50));
    enemy.hit_points = 40;
    harness.spawn(0, enemy);
    harness.set_visible(0, P0, true);
    let mut session = new_session(harness);
    session.on_frame_refresh();
    let id = id_at(&session, 0);

    assert!(!session.stop(id));
    assert_eq!(session.last_error(), Some(ErrorCode::UnitNotOwned));
}

#[test]
fn cloak_requires_energy_after_research() {
    let mut harness = SimHarness::new(4);
    let mut prowler = RawRecord::new(P0, PROWLER, Position::new(50, 50));
    prowler.energy = 10;
    harness.spawn(0, prowler);
    let mut session = new_session(harness);
    session.on_frame_refresh();
    session
        .players_mut()
        .get_mut(P0)
        .unwrap()
        .grant_tech(stratlink_harness::CLOAKING_FIELD);
    let id = id_at(&session, 0);

    assert!(!session.cloak(id));
    assert_eq!(session.last_error(), Some(ErrorCode::InsufficientEnergy));

    if let Some(r) = session.source_mut().record_mut(0) {
        r.energy = 100;
    }
    session.on_frame_refresh();
    assert!(session.cloak(id));
    // Predicted drain lands immediately.
    assert_eq!(session.unit(id).unwrap().energy(), 75);
}

#[test]
fn ammo_consuming_tech_needs_a_charge() {
    let mut harness = SimHarness::new(4);
    harness.spawn(0, RawRecord::new(P0, PROWLER, Position::new(50, 50)));
    let mut session = new_session(harness);
    session.on_frame_refresh();
    session
        .players_mut()
        .get_mut(P0)
        .unwrap()
        .grant_tech(REMOTE_MINES);
    let id = id_at(&session, 0);

    let drop_point = Position::new(100, 100);
    assert!(!session.issue(id, Command::UseTechAt(REMOTE_MINES, drop_point)));
    assert_eq!(session.last_error(), Some(ErrorCode::InsufficientAmmo));
    assert!(session.source().sent_orders().is_empty());

    if let Some(r) = session.source_mut().record_mut(0) {
        r.ammo = 2;
    }
    session.on_frame_refresh();
    assert!(session.issue(id, Command::UseTechAt(REMOTE_MINES, drop_point)));
    // The predicted spend lands immediately.
    assert_eq!(session.unit(id).unwrap().ammo(), 1);
}

#[test]
fn returning_cargo_requires_cargo() {
    let mut harness = SimHarness::new(4);
    harness.spawn(0, RawRecord::new(P0, HARVESTER, Position::new(50, 50)));
    let mut session = new_session(harness);
    session.on_frame_refresh();
    let id = id_at(&session, 0);

    assert!(!session.issue(id, Command::ReturnCargo));
    assert_eq!(session.last_error(), Some(ErrorCode::InsufficientAmmo));
    assert!(session.source().sent_orders().is_empty());

    if let Some(r) = session.source_mut().record_mut(0) {
        r.carried_cargo = Some(CarriedCargo::Minerals);
    }
    session.on_frame_refresh();
    assert!(session.issue(id, Command::ReturnCargo));
    assert_eq!(
        session.unit(id).unwrap().activity(),
        Some(Activity::ReturningCargo)
    );
}

// ---------------------------------------------------------------------------
// Command log
// ---------------------------------------------------------------------------

#[test]
fn command_log_preserves_issuance_order_and_round_trips() {
    let mut harness = SimHarness::new(4);
    harness.spawn(0, RawRecord::new(P0, RIFLEMAN, Position::new(50, 50)));
    harness.spawn(1, RawRecord::new(P0, RIFLEMAN, Position::new(60, 50)));
    let mut session = new_session(harness);
    session.on_frame_refresh();
    let a = id_at(&session, 0);
    let b = id_at(&session, 1);

    assert!(session.move_to(a, Position::new(300, 300)));
    assert!(session.hold_position(b));
    assert!(session.stop(a));

    let json = session.command_log().export_json().unwrap();
    let parsed: Vec<IssuedCommand> = serde_json::from_str(&json).unwrap();

    let drained = session.drain_commands();
    assert_eq!(parsed, drained);
    assert_eq!(drained.len(), 3);
    assert_eq!(drained[0].unit, a);
    assert_eq!(drained[0].command, Command::MoveTo(Position::new(300, 300)));
    assert_eq!(drained[1].unit, b);
    assert_eq!(drained[1].command, Command::HoldPosition);
    assert_eq!(drained[2].command, Command::Stop);
    assert!(drained.windows(2).all(|w| w[0].sequence < w[1].sequence));

    assert!(session.command_log().is_empty());
}
