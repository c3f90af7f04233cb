//! Command validation and dispatch.
//!
//! [`Session::issue`] runs the full pipeline for one command: resolve the
//! actor, validate in a fixed order (ownership, kind compatibility, busy
//! state, prerequisites, spatial checks, target accessibility), then on
//! success select the actor at the source, send the encoded order, append
//! to the command log, and patch the local record with the predicted
//! outcome so same-tick queries see the command's effect before the next
//! refresh confirms it.
//!
//! The first validation failure wins and lands in the last-error slot.
//! Toggle commands that validate but find the unit already in the
//! requested state succeed without sending anything, and cancellations
//! with nothing to cancel do the same.

use crate::session::Session;
use stratlink_core::catalog::{TechTarget, ToggleKind, UnitCost, UnitTraits};
use stratlink_core::command::Command;
use stratlink_core::error::ErrorCode;
use stratlink_core::geometry::TilePosition;
use stratlink_core::id::UnitId;
use stratlink_core::record::{Activity, RawRecord, BUILD_QUEUE_CAP};
use stratlink_core::source::{EncodedOrder, OrderOpcode, RawStateSource};
use tracing::debug;

/// Tile offset from a producer to the addon it constructs.
const ADDON_TILE_OFFSET: (i32, i32) = (4, 1);

/// How a validation step fails: with a reportable code, or silently,
/// either because a target-access attempt already recorded its own code
/// or because the failure carries none at all.
enum Fail {
    Code(ErrorCode),
    Silent,
}

type Check = Result<(), Fail>;

fn require(cond: bool, code: ErrorCode) -> Check {
    if cond {
        Ok(())
    } else {
        Err(Fail::Code(code))
    }
}

impl<S: RawStateSource> Session<S> {
    /// Validate and dispatch one command. Returns `true` when the order
    /// was sent (or the command was a recognized no-op); on `false` the
    /// last-error slot explains why, except for an inaccessible target
    /// where the access attempt already spoke.
    pub fn issue(&mut self, id: UnitId, command: Command) -> bool {
        self.set_last_error(None);
        self.issue_resolved(id, command)
    }

    fn issue_resolved(&mut self, id: UnitId, command: Command) -> bool {
        let Some(mirror) = self.mirror(id) else {
            return self.fail(ErrorCode::UnitNotVisible);
        };
        // The actor goes through the same access attempt as any accessor,
        // so a gone unit names UnitDoesNotExist only when the player used
        // to own it and UnitNotVisible otherwise.
        let gate = self.gate();
        let granted = gate.exists(mirror)
            && gate.can_access_special(
                mirror,
                self.visibility(id.slot()),
                self.traits_of(mirror),
            );
        if !gate.attempt(mirror, granted, self.error_slot()) {
            return false;
        }
        let record = match mirror.live() {
            Some(record) => record.clone(),
            None => return false,
        };

        if record.owner != self.self_player() {
            return self.fail(ErrorCode::UnitNotOwned);
        }

        // Self-cast toggle technologies forward to the matching toggle
        // command for the state the unit is not yet in.
        if let Command::UseTech(tech) = command {
            if let Some(toggle) = self.catalog().tech(tech).and_then(|t| t.toggle) {
                let forwarded = match toggle {
                    ToggleKind::Burrow if record.burrowed => Command::Unburrow,
                    ToggleKind::Burrow => Command::Burrow,
                    ToggleKind::Cloak if record.cloaked => Command::Decloak,
                    ToggleKind::Cloak => Command::Cloak,
                    ToggleKind::Siege if record.sieged => Command::Unsiege,
                    ToggleKind::Siege => Command::Siege,
                };
                return self.issue_resolved(id, forwarded);
            }
        }

        // Halting forwards to a plain stop, and only mid-construction.
        if command == Command::HaltConstruction {
            if record.activity != Activity::Constructing {
                return true;
            }
            return self.issue_resolved(id, Command::Stop);
        }

        match self.validate(&record, &command) {
            Ok(()) => {}
            Err(Fail::Code(code)) => return self.fail(code),
            Err(Fail::Silent) => return false,
        }

        // A validated command whose requested state already holds is a
        // clean no-op: success, nothing sent, no patch, no log entry.
        if toggle_noop(&record, &command) || cancel_noop(&record, &command) {
            return true;
        }

        self.dispatch(id, &record, command)
    }

    fn fail(&self, code: ErrorCode) -> bool {
        self.set_last_error(Some(code))
    }

    // -----------------------------------------------------------------------
    // Validation
    // -----------------------------------------------------------------------

    fn validate(&self, record: &RawRecord, command: &Command) -> Check {
        let Some(traits) = self.catalog().unit(record.kind) else {
            return Err(Fail::Code(ErrorCode::InvalidParameter));
        };

        match *command {
            Command::AttackMove(_)
            | Command::MoveTo(_)
            | Command::RightClickPosition(_)
            | Command::Patrol(_) => self.validate_movement(record, traits),

            Command::Follow(target) => {
                self.validate_movement(record, traits)?;
                self.target_accessible(target).map(|_| ())
            }

            Command::AttackUnit(target) => self.validate_attack(record, traits, target),

            Command::RightClickUnit(target) => {
                require(record.completed, ErrorCode::UnitBusy)?;
                require(!record.burrowed, ErrorCode::UnitBusy)?;
                let (target_record, target_traits) = self.target_accessible(target)?;
                // A right click on an enemy is an attack and is held to
                // the same weapon and range rules; anything else moves,
                // gathers, or boards.
                if self.players().is_enemy(self.self_player(), target_record.owner) {
                    self.validate_weapon_range(record, traits, &target_record, target_traits)?;
                }
                Ok(())
            }

            Command::Stop | Command::HoldPosition => {
                require(record.completed, ErrorCode::UnitBusy)
            }

            Command::Train(kind) => {
                require(traits.can_produce, ErrorCode::IncompatibleUnitKind)?;
                require(record.completed, ErrorCode::UnitBusy)?;
                require(!record.lifted, ErrorCode::UnitBusy)?;
                require(record.build_queue.len() < BUILD_QUEUE_CAP, ErrorCode::UnitBusy)?;
                self.validate_product(kind, true)
            }

            Command::Build(tile, kind) => {
                require(traits.is_worker, ErrorCode::IncompatibleUnitKind)?;
                let product = self
                    .catalog()
                    .unit(kind)
                    .ok_or(Fail::Code(ErrorCode::InvalidParameter))?;
                require(product.is_building, ErrorCode::IncompatibleUnitKind)?;
                require(record.completed, ErrorCode::UnitBusy)?;
                require(record.activity != Activity::Constructing, ErrorCode::UnitBusy)?;
                self.validate_product(kind, false)?;
                require(tile.x >= 0 && tile.y >= 0, ErrorCode::UnbuildableLocation)
            }

            Command::BuildAddon(kind) => {
                require(traits.is_building, ErrorCode::IncompatibleUnitKind)?;
                let product = self
                    .catalog()
                    .unit(kind)
                    .ok_or(Fail::Code(ErrorCode::InvalidParameter))?;
                require(product.is_addon, ErrorCode::IncompatibleUnitKind)?;
                require(record.completed, ErrorCode::UnitBusy)?;
                require(!record.lifted, ErrorCode::UnitBusy)?;
                require(!record.is_occupied_producing(), ErrorCode::UnitBusy)?;
                self.validate_product(kind, false)
            }

            Command::Morph(kind) => {
                self.catalog()
                    .unit(kind)
                    .ok_or(Fail::Code(ErrorCode::InvalidParameter))?;
                require(record.completed, ErrorCode::UnitBusy)?;
                require(record.activity != Activity::Morphing, ErrorCode::UnitBusy)?;
                self.validate_product(kind, true)
            }

            Command::Research(tech) => {
                self.catalog()
                    .tech(tech)
                    .ok_or(Fail::Code(ErrorCode::InvalidParameter))?;
                require(traits.is_building, ErrorCode::IncompatibleUnitKind)?;
                require(record.completed, ErrorCode::UnitBusy)?;
                require(!record.is_occupied_producing(), ErrorCode::UnitBusy)?;
                require(
                    !self.players().has_researched(self.self_player(), tech),
                    ErrorCode::InvalidParameter,
                )
            }

            Command::Upgrade(_) => {
                require(traits.is_building, ErrorCode::IncompatibleUnitKind)?;
                require(record.completed, ErrorCode::UnitBusy)?;
                require(!record.is_occupied_producing(), ErrorCode::UnitBusy)
            }

            Command::SetRallyPosition(_) => {
                require(traits.can_produce, ErrorCode::IncompatibleUnitKind)?;
                require(record.completed, ErrorCode::UnitBusy)
            }

            Command::SetRallyUnit(target) => {
                require(traits.can_produce, ErrorCode::IncompatibleUnitKind)?;
                require(record.completed, ErrorCode::UnitBusy)?;
                self.target_accessible(target).map(|_| ())
            }

            Command::Repair(target) => {
                require(traits.is_worker, ErrorCode::IncompatibleUnitKind)?;
                require(record.completed, ErrorCode::UnitBusy)?;
                let (_, target_traits) = self.target_accessible(target)?;
                match target_traits {
                    Some(t) => require(!t.is_organic, ErrorCode::IncompatibleUnitKind),
                    None => Ok(()),
                }
            }

            Command::ReturnCargo => {
                require(traits.is_worker, ErrorCode::IncompatibleUnitKind)?;
                require(record.completed, ErrorCode::UnitBusy)?;
                require(record.carried_cargo.is_some(), ErrorCode::InsufficientAmmo)
            }

            Command::Burrow | Command::Unburrow => {
                self.validate_toggle(record, traits.can_burrow, *command == Command::Burrow)
            }
            Command::Siege | Command::Unsiege => {
                self.validate_toggle(record, traits.can_siege, *command == Command::Siege)
            }
            Command::Cloak | Command::Decloak => {
                self.validate_toggle(record, traits.can_cloak, *command == Command::Cloak)
            }

            Command::Lift => {
                require(traits.can_lift, ErrorCode::IncompatibleUnitKind)?;
                require(record.completed, ErrorCode::UnitBusy)?;
                require(!record.is_occupied_producing(), ErrorCode::UnitBusy)
            }

            Command::Land(tile) => {
                require(traits.can_lift, ErrorCode::IncompatibleUnitKind)?;
                require(tile.x >= 0 && tile.y >= 0, ErrorCode::UnbuildableLocation)
            }

            Command::Load(target) => {
                require(record.completed, ErrorCode::UnitBusy)?;
                let (_, target_traits) = self.target_accessible(target)?;
                if traits.is_transport {
                    Ok(())
                } else if target_traits.is_some_and(|t| t.is_transport) {
                    // Passenger side: boards by right-clicking the
                    // transport; dispatch handles the rewrite.
                    Ok(())
                } else {
                    Err(Fail::Code(ErrorCode::IncompatibleUnitKind))
                }
            }

            Command::Unload(target) => {
                require(traits.is_transport, ErrorCode::IncompatibleUnitKind)?;
                require(
                    record.loaded_units.contains(&target.slot()),
                    ErrorCode::InvalidParameter,
                )
            }

            Command::UnloadAll => {
                require(traits.is_transport, ErrorCode::IncompatibleUnitKind)
            }

            Command::UnloadAllAt(_) => {
                require(traits.is_transport, ErrorCode::IncompatibleUnitKind)?;
                require(
                    traits.can_move || record.lifted,
                    ErrorCode::IncompatibleUnitKind,
                )
            }

            Command::CancelConstruction => {
                require(traits.is_building, ErrorCode::IncompatibleUnitKind)?;
                // A finished building has no construction to cancel. The
                // call is refused without a code.
                if record.completed {
                    return Err(Fail::Silent);
                }
                Ok(())
            }
            Command::CancelAddon => {
                require(traits.is_building, ErrorCode::IncompatibleUnitKind)
            }
            Command::CancelMorph
            | Command::CancelTrain
            | Command::CancelTrainSlot(_)
            | Command::CancelResearch
            | Command::CancelUpgrade => Ok(()),

            Command::HaltConstruction => Ok(()),

            Command::UseTech(tech) => {
                self.validate_tech(record, tech, TechTarget::SelfCast, None)
            }
            Command::UseTechAt(tech, _) => {
                self.validate_tech(record, tech, TechTarget::Ground, None)
            }
            Command::UseTechOn(tech, target) => {
                self.validate_tech(record, tech, TechTarget::Unit, Some(target))
            }
        }
    }

    fn validate_movement(&self, record: &RawRecord, traits: &UnitTraits) -> Check {
        require(
            traits.can_move || record.lifted,
            ErrorCode::IncompatibleUnitKind,
        )?;
        require(record.completed, ErrorCode::UnitBusy)?;
        require(!record.burrowed && !record.sieged, ErrorCode::UnitBusy)
    }

    fn validate_attack(&self, record: &RawRecord, traits: &UnitTraits, target: UnitId) -> Check {
        require(record.completed, ErrorCode::UnitBusy)?;
        require(!record.burrowed, ErrorCode::UnitBusy)?;
        require(
            traits.ground_weapon.is_some() || traits.air_weapon.is_some(),
            ErrorCode::UnableToHit,
        )?;

        let (target_record, target_traits) = self.target_accessible(target)?;
        self.validate_weapon_range(record, traits, &target_record, target_traits)
    }

    /// Weapon selection against this target plus the rooted-attacker
    /// range check, shared by attack and hostile right-click validation.
    fn validate_weapon_range(
        &self,
        record: &RawRecord,
        traits: &UnitTraits,
        target_record: &RawRecord,
        target_traits: Option<&UnitTraits>,
    ) -> Check {
        let airborne =
            target_record.lifted || target_traits.is_some_and(|t| t.is_flyer);
        let weapon = if airborne {
            traits.air_weapon
        } else {
            traits.ground_weapon
        };
        let Some(weapon) = weapon else {
            return Err(Fail::Code(ErrorCode::UnableToHit));
        };

        // Units that can close the distance themselves skip the range
        // check; only a rooted attacker must already be in range.
        if !traits.can_move && !record.lifted {
            let gap = record.position.distance_to(target_record.position)
                - f64::from(traits.bounding_radius)
                - f64::from(target_traits.map_or(0, |t| t.bounding_radius));
            require(weapon.in_range(gap.max(0.0)), ErrorCode::OutOfRange)?;
        }
        Ok(())
    }

    fn validate_toggle(
        &self,
        record: &RawRecord,
        capability: Option<stratlink_core::catalog::ToggleRequirement>,
        engaging: bool,
    ) -> Check {
        let Some(requirement) = capability else {
            return Err(Fail::Code(ErrorCode::IncompatibleUnitKind));
        };
        require(record.completed, ErrorCode::UnitBusy)?;
        if engaging {
            if let Some(tech) = requirement.tech {
                require(
                    self.players().has_researched(self.self_player(), tech),
                    ErrorCode::InsufficientTech,
                )?;
            }
            require(
                record.energy >= requirement.energy_cost,
                ErrorCode::InsufficientEnergy,
            )?;
        }
        Ok(())
    }

    fn validate_product(&self, kind: stratlink_core::catalog::UnitKindId, check_supply: bool) -> Check {
        let Some(product) = self.catalog().unit(kind) else {
            return Err(Fail::Code(ErrorCode::InvalidParameter));
        };
        if let Some(tech) = product.required_tech {
            require(
                self.players().has_researched(self.self_player(), tech),
                ErrorCode::InsufficientTech,
            )?;
        }
        self.check_affordable(product.cost, check_supply)
    }

    fn check_affordable(&self, cost: UnitCost, check_supply: bool) -> Check {
        let player = self.players().get(self.self_player());
        let (minerals, gas, supply_used, supply_cap) = player
            .map(|p| (p.minerals, p.gas, p.supply_used, p.supply_cap))
            .unwrap_or((0, 0, 0, 0));
        require(minerals >= cost.minerals, ErrorCode::InsufficientMinerals)?;
        require(gas >= cost.gas, ErrorCode::InsufficientGas)?;
        if check_supply && cost.supply > 0 {
            require(
                supply_used + cost.supply <= supply_cap,
                ErrorCode::InsufficientSupply,
            )?;
        }
        Ok(())
    }

    fn validate_tech(
        &self,
        record: &RawRecord,
        tech: stratlink_core::catalog::TechId,
        expected_target: TechTarget,
        target: Option<UnitId>,
    ) -> Check {
        let Some(tech_traits) = self.catalog().tech(tech) else {
            return Err(Fail::Code(ErrorCode::InvalidParameter));
        };
        require(
            tech_traits.usable_by(record.kind),
            ErrorCode::IncompatibleUnitKind,
        )?;
        require(record.completed, ErrorCode::UnitBusy)?;
        require(
            self.players().has_researched(self.self_player(), tech),
            ErrorCode::InsufficientTech,
        )?;
        require(
            record.energy >= tech_traits.energy_cost,
            ErrorCode::InsufficientEnergy,
        )?;
        if tech_traits.consumes_ammo {
            require(record.ammo > 0, ErrorCode::InsufficientAmmo)?;
        }
        require(
            tech_traits.target == expected_target,
            ErrorCode::InvalidParameter,
        )?;
        if let Some(target) = target {
            self.target_accessible(target)?;
        }
        Ok(())
    }

    /// Resolve and gate a command target. On denial the access attempt has
    /// already set the error slot; the validator adds nothing more.
    fn target_accessible(
        &self,
        target: UnitId,
    ) -> Result<(RawRecord, Option<&UnitTraits>), Fail> {
        let Some(mirror) = self.mirror(target) else {
            // A handle from a prior occupancy says nothing about who held
            // it; the code must not reveal more than fog of war would.
            self.set_last_error(Some(ErrorCode::UnitNotVisible));
            return Err(Fail::Silent);
        };
        let gate = self.gate();
        let traits = self.traits_of(mirror);
        let granted = gate.can_access(mirror, self.visibility(target.slot()), traits);
        if !gate.attempt(mirror, granted, self.error_slot()) {
            return Err(Fail::Silent);
        }
        match mirror.live() {
            Some(record) => Ok((record.clone(), traits)),
            None => Err(Fail::Silent),
        }
    }

    // -----------------------------------------------------------------------
    // Dispatch
    // -----------------------------------------------------------------------

    fn dispatch(&mut self, id: UnitId, record: &RawRecord, command: Command) -> bool {
        // Boarding a transport goes over the wire as a right click on it.
        let wire_command = match command {
            Command::Load(target)
                if !self
                    .catalog()
                    .unit(record.kind)
                    .is_some_and(|t| t.is_transport) =>
            {
                Command::RightClickUnit(target)
            }
            other => other,
        };

        let order = encode(&wire_command, record);
        let frame = self.frame();
        let patch = self.prediction_inputs(record, &wire_command);

        let (source, pool) = self.source_and_pool_mut();
        source.select_for_command(id.slot());
        source.send_order(order);

        if let Some(live) = pool.resolve_mut(id).and_then(|m| m.live_mut()) {
            predict(live, &wire_command, patch);
        }

        self.log.push(id, wire_command, frame);
        debug!(unit = %id, command = wire_command.name(), frame, "command dispatched");
        true
    }

    /// Energy and ammo spent by the command, looked up before the mutable
    /// split of source and pool.
    fn prediction_inputs(&self, record: &RawRecord, command: &Command) -> PredictionCost {
        let traits = self.catalog().unit(record.kind);
        let toggle_cost = |req: Option<stratlink_core::catalog::ToggleRequirement>| {
            req.map_or(0, |r| r.energy_cost)
        };
        match *command {
            Command::Burrow => PredictionCost {
                energy: traits.and_then(|t| t.can_burrow).map_or(0, |r| r.energy_cost),
                ammo: 0,
            },
            Command::Cloak => PredictionCost {
                energy: toggle_cost(traits.and_then(|t| t.can_cloak)),
                ammo: 0,
            },
            Command::Siege => PredictionCost {
                energy: toggle_cost(traits.and_then(|t| t.can_siege)),
                ammo: 0,
            },
            Command::UseTech(tech) | Command::UseTechAt(tech, _) | Command::UseTechOn(tech, _) => {
                let t = self.catalog().tech(tech);
                PredictionCost {
                    energy: t.map_or(0, |t| t.energy_cost),
                    ammo: if t.is_some_and(|t| t.consumes_ammo) { 1 } else { 0 },
                }
            }
            _ => PredictionCost { energy: 0, ammo: 0 },
        }
    }

    // -----------------------------------------------------------------------
    // Convenience wrappers
    // -----------------------------------------------------------------------

    pub fn attack_move(&mut self, id: UnitId, position: stratlink_core::geometry::Position) -> bool {
        self.issue(id, Command::AttackMove(position))
    }

    pub fn attack_unit(&mut self, id: UnitId, target: UnitId) -> bool {
        self.issue(id, Command::AttackUnit(target))
    }

    pub fn move_to(&mut self, id: UnitId, position: stratlink_core::geometry::Position) -> bool {
        self.issue(id, Command::MoveTo(position))
    }

    pub fn stop(&mut self, id: UnitId) -> bool {
        self.issue(id, Command::Stop)
    }

    pub fn hold_position(&mut self, id: UnitId) -> bool {
        self.issue(id, Command::HoldPosition)
    }

    pub fn train(&mut self, id: UnitId, kind: stratlink_core::catalog::UnitKindId) -> bool {
        self.issue(id, Command::Train(kind))
    }

    pub fn build(
        &mut self,
        id: UnitId,
        tile: TilePosition,
        kind: stratlink_core::catalog::UnitKindId,
    ) -> bool {
        self.issue(id, Command::Build(tile, kind))
    }

    pub fn research(&mut self, id: UnitId, tech: stratlink_core::catalog::TechId) -> bool {
        self.issue(id, Command::Research(tech))
    }

    pub fn burrow(&mut self, id: UnitId) -> bool {
        self.issue(id, Command::Burrow)
    }

    pub fn unburrow(&mut self, id: UnitId) -> bool {
        self.issue(id, Command::Unburrow)
    }

    pub fn siege(&mut self, id: UnitId) -> bool {
        self.issue(id, Command::Siege)
    }

    pub fn unsiege(&mut self, id: UnitId) -> bool {
        self.issue(id, Command::Unsiege)
    }

    pub fn cloak(&mut self, id: UnitId) -> bool {
        self.issue(id, Command::Cloak)
    }

    pub fn decloak(&mut self, id: UnitId) -> bool {
        self.issue(id, Command::Decloak)
    }

    pub fn use_tech(&mut self, id: UnitId, tech: stratlink_core::catalog::TechId) -> bool {
        self.issue(id, Command::UseTech(tech))
    }

    pub fn use_tech_on(
        &mut self,
        id: UnitId,
        tech: stratlink_core::catalog::TechId,
        target: UnitId,
    ) -> bool {
        self.issue(id, Command::UseTechOn(tech, target))
    }
}

// ---------------------------------------------------------------------------
// No-op detection
// ---------------------------------------------------------------------------

/// Toggle commands whose requested state already holds.
fn toggle_noop(record: &RawRecord, command: &Command) -> bool {
    match command {
        Command::Burrow => record.burrowed,
        Command::Unburrow => !record.burrowed,
        Command::Siege => record.sieged,
        Command::Unsiege => !record.sieged,
        Command::Cloak => record.cloaked,
        Command::Decloak => !record.cloaked,
        Command::Lift => record.lifted,
        Command::Land(_) => !record.lifted,
        _ => false,
    }
}

/// Cancellations with nothing in progress succeed without sending.
/// `CancelConstruction` and `CancelAddon` are absent: the former refuses
/// on a finished building during validation, the latter always sends and
/// leaves the judgment to the simulation.
fn cancel_noop(record: &RawRecord, command: &Command) -> bool {
    match command {
        Command::CancelMorph => record.activity != Activity::Morphing,
        Command::CancelTrain => record.build_queue.is_empty(),
        Command::CancelTrainSlot(i) => usize::from(*i) >= record.build_queue.len(),
        Command::CancelResearch => record.researching.is_none(),
        Command::CancelUpgrade => record.upgrading.is_none(),
        _ => false,
    }
}

// ---------------------------------------------------------------------------
// Encoding
// ---------------------------------------------------------------------------

/// Translate a validated command into its wire form. The actor's record
/// supplies context the wire needs (addon placement, queue tail index).
fn encode(command: &Command, actor: &RawRecord) -> EncodedOrder {
    use OrderOpcode as Op;
    match *command {
        Command::AttackMove(p) => EncodedOrder::at(Op::AttackMove, p),
        Command::AttackUnit(u) => EncodedOrder::on(Op::AttackUnit, u.slot()),
        Command::MoveTo(p) => EncodedOrder::at(Op::Move, p),
        Command::RightClickPosition(p) => EncodedOrder::at(Op::RightClickPosition, p),
        Command::RightClickUnit(u) => EncodedOrder::on(Op::RightClickUnit, u.slot()),
        Command::Stop => EncodedOrder::bare(Op::Stop),
        Command::HoldPosition => EncodedOrder::bare(Op::HoldPosition),
        Command::Patrol(p) => EncodedOrder::at(Op::Patrol, p),
        Command::Follow(u) => EncodedOrder::on(Op::Follow, u.slot()),

        Command::Train(kind) => EncodedOrder::bare(Op::Train).with_arg(kind.0),
        Command::Build(tile, kind) => {
            EncodedOrder::at(Op::Build, tile.to_position()).with_arg(kind.0)
        }
        Command::BuildAddon(kind) => {
            let tile = actor.position.to_tile();
            let addon_tile = TilePosition::new(
                tile.x + ADDON_TILE_OFFSET.0,
                tile.y + ADDON_TILE_OFFSET.1,
            );
            EncodedOrder::at(Op::BuildAddon, addon_tile.to_position()).with_arg(kind.0)
        }
        Command::Morph(kind) => EncodedOrder::bare(Op::Morph).with_arg(kind.0),
        Command::Research(tech) => EncodedOrder::bare(Op::Research).with_arg(tech.0),
        Command::Upgrade(upgrade) => EncodedOrder::bare(Op::Upgrade).with_arg(upgrade.0),
        Command::SetRallyPosition(p) => EncodedOrder::at(Op::SetRallyPosition, p),
        Command::SetRallyUnit(u) => EncodedOrder::on(Op::SetRallyUnit, u.slot()),

        Command::Repair(u) => EncodedOrder::on(Op::Repair, u.slot()),
        Command::ReturnCargo => EncodedOrder::bare(Op::ReturnCargo),

        Command::Burrow => EncodedOrder::bare(Op::Burrow),
        Command::Unburrow => EncodedOrder::bare(Op::Unburrow),
        Command::Siege => EncodedOrder::bare(Op::Siege),
        Command::Unsiege => EncodedOrder::bare(Op::Unsiege),
        Command::Cloak => EncodedOrder::bare(Op::Cloak),
        Command::Decloak => EncodedOrder::bare(Op::Decloak),
        Command::Lift => EncodedOrder::bare(Op::Lift),
        Command::Land(tile) => EncodedOrder::at(Op::Land, tile.to_position()),

        Command::Load(u) => EncodedOrder::on(Op::Load, u.slot()),
        Command::Unload(u) => EncodedOrder::on(Op::Unload, u.slot()),
        Command::UnloadAll => EncodedOrder::bare(Op::UnloadAll),
        Command::UnloadAllAt(p) => EncodedOrder::at(Op::UnloadAllAt, p),

        Command::CancelConstruction => EncodedOrder::bare(Op::CancelConstruction),
        Command::HaltConstruction => EncodedOrder::bare(Op::Stop),
        Command::CancelMorph => EncodedOrder::bare(Op::CancelMorph),
        // A bare cancel removes the newest queue entry.
        Command::CancelTrain => EncodedOrder::bare(Op::CancelTrainSlot)
            .with_arg(actor.build_queue.len().saturating_sub(1) as u16),
        Command::CancelTrainSlot(i) => {
            EncodedOrder::bare(Op::CancelTrainSlot).with_arg(u16::from(i))
        }
        Command::CancelAddon => EncodedOrder::bare(Op::CancelAddon),
        Command::CancelResearch => EncodedOrder::bare(Op::CancelResearch),
        Command::CancelUpgrade => EncodedOrder::bare(Op::CancelUpgrade),

        Command::UseTech(tech) => EncodedOrder::bare(Op::UseTech).with_arg(tech.0),
        Command::UseTechAt(tech, p) => EncodedOrder::at(Op::UseTechAt, p).with_arg(tech.0),
        Command::UseTechOn(tech, u) => EncodedOrder::on(Op::UseTechOn, u.slot()).with_arg(tech.0),
    }
}

// ---------------------------------------------------------------------------
// Latency compensation
// ---------------------------------------------------------------------------

struct PredictionCost {
    energy: i32,
    ammo: i32,
}

/// Patch the local record with the command's predicted effect. The next
/// refresh overwrites the whole record, so an optimistic guess here never
/// outlives one frame of simulation truth.
fn predict(record: &mut RawRecord, command: &Command, cost: PredictionCost) {
    record.energy -= cost.energy;
    record.ammo -= cost.ammo;

    match *command {
        Command::Stop => {
            record.activity = Activity::Stopped;
            record.move_target = None;
            record.target = None;
        }
        Command::HoldPosition => {
            record.activity = Activity::HoldingPosition;
            record.move_target = None;
        }
        Command::MoveTo(p) | Command::RightClickPosition(p) => {
            record.activity = Activity::Moving;
            record.move_target = Some(p);
        }
        Command::Patrol(p) => {
            record.activity = Activity::Patrolling;
            record.move_target = Some(p);
        }
        Command::AttackMove(p) => {
            record.activity = Activity::Attacking;
            record.move_target = Some(p);
        }
        Command::AttackUnit(u) => {
            record.activity = Activity::Attacking;
            record.target = Some(u.slot());
        }
        // Context-dependent at the source (board, gather, attack); the
        // neutral guess is to head for the target.
        Command::RightClickUnit(u) => {
            record.activity = Activity::Moving;
            record.target = Some(u.slot());
        }
        Command::Follow(u) => {
            record.activity = Activity::Following;
            record.target = Some(u.slot());
        }

        Command::Train(kind) => {
            if record.build_queue.len() < BUILD_QUEUE_CAP {
                record.build_queue.push(kind);
            }
            record.activity = Activity::Training;
        }
        Command::Build(tile, _) => {
            record.activity = Activity::Moving;
            record.move_target = Some(tile.to_position());
        }
        Command::Morph(_) => record.activity = Activity::Morphing,
        Command::Research(tech) => {
            record.researching = Some(tech);
            record.activity = Activity::Researching;
        }
        Command::Upgrade(upgrade) => {
            record.upgrading = Some(upgrade);
            record.activity = Activity::Upgrading;
        }
        Command::SetRallyPosition(p) => record.rally_position = Some(p),
        Command::SetRallyUnit(u) => record.rally_unit = Some(u.slot()),

        Command::Repair(u) => {
            record.activity = Activity::Repairing;
            record.target = Some(u.slot());
        }
        Command::ReturnCargo => record.activity = Activity::ReturningCargo,

        Command::Burrow => record.burrowed = true,
        Command::Unburrow => record.burrowed = false,
        Command::Siege => record.sieged = true,
        Command::Unsiege => record.sieged = false,
        Command::Cloak => record.cloaked = true,
        Command::Decloak => record.cloaked = false,
        Command::Lift => record.lifted = true,
        Command::Land(_) => {
            record.lifted = false;
            record.activity = Activity::Landing;
        }

        Command::UnloadAll | Command::UnloadAllAt(_) => record.activity = Activity::Unloading,

        Command::CancelTrain => {
            record.build_queue.pop();
        }
        Command::CancelTrainSlot(i) => {
            let i = usize::from(i);
            if i < record.build_queue.len() {
                record.build_queue.remove(i);
            }
        }
        Command::CancelResearch => {
            record.researching = None;
            record.remaining_research_time = 0;
            record.activity = Activity::Idle;
        }
        Command::CancelUpgrade => {
            record.upgrading = None;
            record.remaining_upgrade_time = 0;
            record.activity = Activity::Idle;
        }

        _ => {}
    }
}
