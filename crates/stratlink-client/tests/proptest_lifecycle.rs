//! Property tests for the mirror lifecycle.
//!
//! These tests use `proptest` to generate random sequences of spawn, kill,
//! reoccupy, and refresh operations against the harness, and verify that
//! the mirror invariants hold after each sequence.

use proptest::prelude::*;
use stratlink_client::prelude::*;
use stratlink_harness::{fixture_catalog, fixture_players, SimHarness, BURROWER, RIFLEMAN};

const POOL: usize = 16;
const P0: PlayerId = PlayerId(0);
const P1: PlayerId = PlayerId(1);

/// Operations we can perform against the source and session.
#[derive(Debug, Clone)]
enum LifecycleOp {
    Spawn { slot: u32, own: bool },
    Kill(u32),
    NotifyDestroyed(u32),
    Refresh,
}

fn lifecycle_op_strategy() -> impl Strategy<Value = LifecycleOp> {
    prop_oneof![
        (0..POOL as u32, proptest::bool::ANY)
            .prop_map(|(slot, own)| LifecycleOp::Spawn { slot, own }),
        (0..POOL as u32).prop_map(LifecycleOp::Kill),
        // Mostly valid slots, occasionally garbage for the quarantine path.
        (0..(POOL as u32 + 4)).prop_map(LifecycleOp::NotifyDestroyed),
        Just(LifecycleOp::Refresh),
    ]
}

fn record_for(own: bool, slot: u32) -> RawRecord {
    let owner = if own { P0 } else { P1 };
    let kind = if own { RIFLEMAN } else { BURROWER };
    RawRecord::new(owner, kind, Position::new(slot as i32 * 32, 64))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(1000))]

    /// Alive and dead are mutually exclusive at every observable point,
    /// and both only ever hold for a slot that has seen an occupant.
    #[test]
    fn alive_dead_exclusion_holds_under_random_lifecycles(
        ops in prop::collection::vec(lifecycle_op_strategy(), 1..60),
    ) {
        let harness = SimHarness::new(POOL);
        let mut session =
            Session::new(harness, fixture_catalog(), fixture_players(), P0).unwrap();
        session.on_frame_refresh();

        let mut seen: Vec<UnitId> = Vec::new();

        for op in ops {
            match op {
                LifecycleOp::Spawn { slot, own } => {
                    if session.source().read_record(slot).is_none() {
                        session.source_mut().spawn(slot, record_for(own, slot));
                        // Keep enemies scouted so enumeration covers them.
                        if !own {
                            session.source_mut().set_visible(slot, P0, true);
                        }
                    }
                }
                LifecycleOp::Kill(slot) => session.source_mut().kill(slot),
                LifecycleOp::NotifyDestroyed(slot) => session.on_unit_destroyed(slot),
                LifecycleOp::Refresh => session.on_frame_refresh(),
            }

            for unit in session.units() {
                // A unit enumerated as live must exist and never read dead.
                prop_assert!(unit.exists());
                prop_assert!(!unit.is_dead());
                if !seen.contains(&unit.id()) {
                    seen.push(unit.id());
                }
            }

            // Every handle ever seen either resolves with alive and dead
            // mutually exclusive, or has been invalidated by reoccupancy.
            for &id in &seen {
                if let Some(unit) = session.unit(id) {
                    prop_assert!(!(unit.is_alive() && unit.is_dead()));
                }
            }
        }
    }

    /// A handle taken before a kill keeps answering identity queries from
    /// the snapshot, and stops resolving once the slot is reoccupied.
    #[test]
    fn snapshots_answer_and_stale_handles_vanish(
        kill_slots in prop::collection::vec(0..POOL as u32, 1..8),
        reoccupy in proptest::bool::ANY,
    ) {
        let mut harness = SimHarness::new(POOL);
        for slot in 0..POOL as u32 {
            harness.spawn(slot, record_for(true, slot));
        }
        let mut session =
            Session::new(harness, fixture_catalog(), fixture_players(), P0).unwrap();
        session.on_frame_refresh();

        let ids: Vec<UnitId> = session.units().map(|u| u.id()).collect();
        prop_assert_eq!(ids.len(), POOL);

        let mut killed: Vec<UnitId> = Vec::new();
        for &slot in &kill_slots {
            session.source_mut().kill(slot);
            killed.push(ids[slot as usize]);
        }
        session.on_frame_refresh();

        for &id in &killed {
            let unit = session.unit(id).unwrap();
            prop_assert!(!unit.exists());
            prop_assert_eq!(unit.owner(), Some(P0));
            prop_assert_eq!(unit.kind(), Some(RIFLEMAN));
            // Commands to a dead unit fail without reaching the wire.
            prop_assert!(!session.stop(id));
        }
        prop_assert!(session.source().sent_orders().is_empty());

        if reoccupy {
            for &slot in &kill_slots {
                session.source_mut().spawn(slot, record_for(false, slot));
            }
            session.on_frame_refresh();

            for &id in &killed {
                prop_assert!(session.unit(id).is_none());
                let current = session
                    .units()
                    .find(|u| u.id().slot() == id.slot())
                    .map(|u| u.id());
                prop_assert_ne!(current, Some(id));
            }
        }
    }

    /// Issuing random toggle pairs never double-sends: the wire sees one
    /// order per state change, regardless of how often the command repeats.
    #[test]
    fn repeated_toggles_send_once_per_state_change(
        repeats in 1..6usize,
    ) {
        let mut harness = SimHarness::new(4);
        harness.spawn(0, record_for(false, 0));
        let mut session =
            Session::new(harness, fixture_catalog(), fixture_players(), P1).unwrap();
        session.on_frame_refresh();
        session
            .players_mut()
            .get_mut(P1)
            .unwrap()
            .grant_tech(stratlink_harness::TUNNELING);
        let id = session.units().next().unwrap().id();

        for _ in 0..repeats {
            prop_assert!(session.burrow(id));
        }
        prop_assert_eq!(session.source().sent_orders().len(), 1);

        for _ in 0..repeats {
            prop_assert!(session.unburrow(id));
        }
        prop_assert_eq!(session.source().sent_orders().len(), 2);
    }
}
