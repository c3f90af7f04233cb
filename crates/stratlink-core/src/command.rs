//! The closed command vocabulary.
//!
//! Every order a controller can give a unit is one variant of [`Command`].
//! The validator and dispatcher match on it exhaustively, so adding a
//! variant forces both to handle it before the crate compiles again.

use crate::catalog::{TechId, UnitKindId, UpgradeId};
use crate::geometry::{Position, TilePosition};
use crate::id::UnitId;
use serde::{Deserialize, Serialize};

/// A unit command, immutable once constructed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Command {
    // Movement and combat
    AttackMove(Position),
    AttackUnit(UnitId),
    MoveTo(Position),
    RightClickPosition(Position),
    RightClickUnit(UnitId),
    Stop,
    HoldPosition,
    Patrol(Position),
    Follow(UnitId),

    // Production
    Train(UnitKindId),
    Build(TilePosition, UnitKindId),
    BuildAddon(UnitKindId),
    Morph(UnitKindId),
    Research(TechId),
    Upgrade(UpgradeId),
    SetRallyPosition(Position),
    SetRallyUnit(UnitId),

    // Worker and support
    Repair(UnitId),
    ReturnCargo,

    // Toggles
    Burrow,
    Unburrow,
    Siege,
    Unsiege,
    Cloak,
    Decloak,
    Lift,
    Land(TilePosition),

    // Transport
    Load(UnitId),
    Unload(UnitId),
    UnloadAll,
    UnloadAllAt(Position),

    // Cancellation
    CancelConstruction,
    HaltConstruction,
    CancelMorph,
    CancelTrain,
    CancelTrainSlot(u8),
    CancelAddon,
    CancelResearch,
    CancelUpgrade,

    // Technology use
    UseTech(TechId),
    UseTechAt(TechId, Position),
    UseTechOn(TechId, UnitId),
}

impl Command {
    /// The unit this command is aimed at, when it has one.
    pub fn target_unit(&self) -> Option<UnitId> {
        match *self {
            Self::AttackUnit(u)
            | Self::RightClickUnit(u)
            | Self::Follow(u)
            | Self::SetRallyUnit(u)
            | Self::Repair(u)
            | Self::Load(u)
            | Self::Unload(u)
            | Self::UseTechOn(_, u) => Some(u),
            _ => None,
        }
    }

    /// The map position this command is aimed at, when it has one.
    pub fn target_position(&self) -> Option<Position> {
        match *self {
            Self::AttackMove(p)
            | Self::MoveTo(p)
            | Self::RightClickPosition(p)
            | Self::Patrol(p)
            | Self::SetRallyPosition(p)
            | Self::UnloadAllAt(p)
            | Self::UseTechAt(_, p) => Some(p),
            Self::Build(tile, _) | Self::Land(tile) => Some(tile.to_position()),
            _ => None,
        }
    }

    /// Stable lowercase name for logs and the command-log export.
    pub fn name(&self) -> &'static str {
        match self {
            Self::AttackMove(_) => "attack_move",
            Self::AttackUnit(_) => "attack_unit",
            Self::MoveTo(_) => "move",
            Self::RightClickPosition(_) => "right_click_position",
            Self::RightClickUnit(_) => "right_click_unit",
            Self::Stop => "stop",
            Self::HoldPosition => "hold_position",
            Self::Patrol(_) => "patrol",
            Self::Follow(_) => "follow",
            Self::Train(_) => "train",
            Self::Build(..) => "build",
            Self::BuildAddon(_) => "build_addon",
            Self::Morph(_) => "morph",
            Self::Research(_) => "research",
            Self::Upgrade(_) => "upgrade",
            Self::SetRallyPosition(_) => "set_rally_position",
            Self::SetRallyUnit(_) => "set_rally_unit",
            Self::Repair(_) => "repair",
            Self::ReturnCargo => "return_cargo",
            Self::Burrow => "burrow",
            Self::Unburrow => "unburrow",
            Self::Siege => "siege",
            Self::Unsiege => "unsiege",
            Self::Cloak => "cloak",
            Self::Decloak => "decloak",
            Self::Lift => "lift",
            Self::Land(_) => "land",
            Self::Load(_) => "load",
            Self::Unload(_) => "unload",
            Self::UnloadAll => "unload_all",
            Self::UnloadAllAt(_) => "unload_all_at",
            Self::CancelConstruction => "cancel_construction",
            Self::HaltConstruction => "halt_construction",
            Self::CancelMorph => "cancel_morph",
            Self::CancelTrain => "cancel_train",
            Self::CancelTrainSlot(_) => "cancel_train_slot",
            Self::CancelAddon => "cancel_addon",
            Self::CancelResearch => "cancel_research",
            Self::CancelUpgrade => "cancel_upgrade",
            Self::UseTech(_) => "use_tech",
            Self::UseTechAt(..) => "use_tech_at",
            Self::UseTechOn(..) => "use_tech_on",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn target_extraction() {
        let u = UnitId::new(5, 1);
        assert_eq!(Command::AttackUnit(u).target_unit(), Some(u));
        assert_eq!(Command::Stop.target_unit(), None);
        assert_eq!(
            Command::Build(TilePosition::new(2, 3), UnitKindId(1)).target_position(),
            Some(Position::new(64, 96))
        );
    }

    #[test]
    fn commands_round_trip_through_json() {
        let cmd = Command::UseTechOn(TechId(4), UnitId::new(9, 2));
        let text = serde_json::to_string(&cmd).unwrap();
        assert_eq!(serde_json::from_str::<Command>(&text).unwrap(), cmd);
    }
}
