//! Per-player match state.
//!
//! Resources, researched technologies, upgrade levels, and diplomatic
//! relations. The driver (or harness) keeps this current each tick; the
//! protocol reads it during command validation and never writes it.

use crate::catalog::{TechId, UpgradeId};
use crate::id::PlayerId;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Diplomatic stance of one player toward another.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Relation {
    Ally,
    Enemy,
    Neutral,
}

/// One player's validation-relevant state.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlayerState {
    pub minerals: i32,
    pub gas: i32,
    pub supply_used: i32,
    pub supply_cap: i32,
    researched: HashSet<TechId>,
    upgrade_levels: HashMap<UpgradeId, u8>,
    relations: HashMap<PlayerId, Relation>,
}

impl PlayerState {
    pub fn grant_tech(&mut self, tech: TechId) {
        self.researched.insert(tech);
    }

    pub fn set_upgrade_level(&mut self, upgrade: UpgradeId, level: u8) {
        self.upgrade_levels.insert(upgrade, level);
    }

    pub fn set_relation(&mut self, other: PlayerId, relation: Relation) {
        self.relations.insert(other, relation);
    }
}

/// Registry of every player in the match.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlayerTable {
    players: HashMap<PlayerId, PlayerState>,
}

impl PlayerTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a player's state.
    pub fn insert(&mut self, id: PlayerId, state: PlayerState) {
        self.players.insert(id, state);
    }

    pub fn get(&self, id: PlayerId) -> Option<&PlayerState> {
        self.players.get(&id)
    }

    pub fn get_mut(&mut self, id: PlayerId) -> Option<&mut PlayerState> {
        self.players.get_mut(&id)
    }

    /// Whether `player` has completed researching `tech`.
    pub fn has_researched(&self, player: PlayerId, tech: TechId) -> bool {
        self.players
            .get(&player)
            .is_some_and(|p| p.researched.contains(&tech))
    }

    /// Current level of `upgrade` for `player` (zero when never bought).
    pub fn upgrade_level(&self, player: PlayerId, upgrade: UpgradeId) -> u8 {
        self.players
            .get(&player)
            .and_then(|p| p.upgrade_levels.get(&upgrade).copied())
            .unwrap_or(0)
    }

    /// Stance of `a` toward `b`. Unknown pairs and the neutral player
    /// default to neutral; a player is its own ally.
    pub fn relation(&self, a: PlayerId, b: PlayerId) -> Relation {
        if a == b {
            return Relation::Ally;
        }
        if a.is_neutral() || b.is_neutral() {
            return Relation::Neutral;
        }
        self.players
            .get(&a)
            .and_then(|p| p.relations.get(&b).copied())
            .unwrap_or(Relation::Neutral)
    }

    pub fn is_enemy(&self, a: PlayerId, b: PlayerId) -> bool {
        self.relation(a, b) == Relation::Enemy
    }
}
