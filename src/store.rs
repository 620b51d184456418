//! Persistence seam.
//!
//! The engine never talks to a database directly. Everything it needs to read
//! or write between requests goes through `Store`; `MemoryStore` is the
//! in-process implementation used by the binaries and the tests.

use crate::battle::state::SessionId;
use crate::errors::EconomyError;
use crate::progression::{
    BattlepassProgress, GymBadgeRecord, QuestBoard, SpeciesStats, TrainerCooldownRecord,
};
use chrono::{DateTime, Utc};
use log::debug;
use schema::{Gym, OwnerId, SpeciesId};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::{Mutex, MutexGuard};

/// An owned creature. Level and experience live on `SpeciesStats`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Creature {
    pub owner: OwnerId,
    pub species: SpeciesId,
    pub shiny: bool,
    pub acquired_at: DateTime<Utc>,
}

pub trait Store: Send + Sync {
    /// Stats for `(owner, species)`, created at zero experience if missing.
    fn species_stats(&self, owner: OwnerId, species: SpeciesId) -> SpeciesStats;
    fn save_species_stats(&self, stats: SpeciesStats);

    fn cooldown(&self, owner: OwnerId) -> TrainerCooldownRecord;
    fn save_cooldown(&self, record: TrainerCooldownRecord);

    fn badges(&self, owner: OwnerId) -> GymBadgeRecord;
    fn record_badge(&self, owner: OwnerId, gym: Gym, at: DateTime<Utc>);

    fn balance(&self, owner: OwnerId) -> u64;
    /// Remove `amount` from the balance, or fail without changing it.
    fn debit(&self, owner: OwnerId, amount: u64) -> Result<u64, EconomyError>;
    fn credit(&self, owner: OwnerId, amount: u64) -> u64;

    /// Insert all creatures at once.
    fn grant_creatures(&self, creatures: Vec<Creature>);
    fn creatures(&self, owner: OwnerId) -> Vec<Creature>;
    fn owns_species(&self, owner: OwnerId, species: SpeciesId) -> bool {
        self.creatures(owner).iter().any(|c| c.species == species)
    }

    /// Unopened packs by pack id.
    fn pack_inventory(&self, owner: OwnerId) -> BTreeMap<String, u32>;
    fn grant_packs(&self, owner: OwnerId, pack_id: &str, count: u32) -> u32;
    /// Remove one unopened pack, or fail without changing anything.
    fn take_pack(&self, owner: OwnerId, pack_id: &str) -> Result<u32, EconomyError>;

    fn battlepass(&self, owner: OwnerId) -> BattlepassProgress;
    fn save_battlepass(&self, progress: BattlepassProgress);

    fn quest_board(&self, owner: OwnerId) -> Option<QuestBoard>;
    fn save_quest_board(&self, board: QuestBoard);

    fn load_session(&self, id: SessionId) -> Option<Vec<u8>>;
    fn save_session(&self, id: SessionId, snapshot: Vec<u8>);
    fn session_ids(&self) -> Vec<SessionId>;

    /// The Pending or Active session an owner is currently bound to.
    fn open_session(&self, owner: OwnerId) -> Option<SessionId>;
    fn set_open_session(&self, owner: OwnerId, session: Option<SessionId>);
    /// Every session some owner is still bound to, without duplicates.
    fn open_session_ids(&self) -> Vec<SessionId>;
}

#[derive(Default)]
struct Tables {
    species_stats: HashMap<(OwnerId, SpeciesId), SpeciesStats>,
    cooldowns: HashMap<OwnerId, TrainerCooldownRecord>,
    badges: HashMap<OwnerId, GymBadgeRecord>,
    balances: HashMap<OwnerId, u64>,
    creatures: Vec<Creature>,
    packs: HashMap<OwnerId, BTreeMap<String, u32>>,
    battlepass: HashMap<OwnerId, BattlepassProgress>,
    quest_boards: HashMap<OwnerId, QuestBoard>,
    sessions: BTreeMap<SessionId, Vec<u8>>,
    open_sessions: HashMap<OwnerId, SessionId>,
}

#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn tables(&self) -> MutexGuard<'_, Tables> {
        self.tables.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Store for MemoryStore {
    fn species_stats(&self, owner: OwnerId, species: SpeciesId) -> SpeciesStats {
        self.tables()
            .species_stats
            .get(&(owner, species))
            .cloned()
            .unwrap_or_else(|| SpeciesStats::new(owner, species))
    }

    fn save_species_stats(&self, stats: SpeciesStats) {
        self.tables()
            .species_stats
            .insert((stats.owner, stats.species), stats);
    }

    fn cooldown(&self, owner: OwnerId) -> TrainerCooldownRecord {
        self.tables()
            .cooldowns
            .get(&owner)
            .cloned()
            .unwrap_or_else(|| TrainerCooldownRecord::new(owner))
    }

    fn save_cooldown(&self, record: TrainerCooldownRecord) {
        self.tables().cooldowns.insert(record.owner, record);
    }

    fn badges(&self, owner: OwnerId) -> GymBadgeRecord {
        self.tables()
            .badges
            .get(&owner)
            .cloned()
            .unwrap_or_else(|| GymBadgeRecord::new(owner))
    }

    fn record_badge(&self, owner: OwnerId, gym: Gym, at: DateTime<Utc>) {
        let mut tables = self.tables();
        let record = tables
            .badges
            .entry(owner)
            .or_insert_with(|| GymBadgeRecord::new(owner));
        if !record.has_badge(gym) {
            record.badges.push((gym, at));
        }
    }

    fn balance(&self, owner: OwnerId) -> u64 {
        self.tables().balances.get(&owner).copied().unwrap_or(0)
    }

    fn debit(&self, owner: OwnerId, amount: u64) -> Result<u64, EconomyError> {
        let mut tables = self.tables();
        let balance = tables.balances.entry(owner).or_insert(0);
        if *balance < amount {
            return Err(EconomyError::InsufficientFunds {
                owner,
                needed: amount,
                available: *balance,
            });
        }
        *balance -= amount;
        debug!("Debited {} from {} ({} left)", amount, owner, *balance);
        Ok(*balance)
    }

    fn credit(&self, owner: OwnerId, amount: u64) -> u64 {
        let mut tables = self.tables();
        let balance = tables.balances.entry(owner).or_insert(0);
        *balance = balance.saturating_add(amount);
        *balance
    }

    fn grant_creatures(&self, creatures: Vec<Creature>) {
        self.tables().creatures.extend(creatures);
    }

    fn creatures(&self, owner: OwnerId) -> Vec<Creature> {
        self.tables()
            .creatures
            .iter()
            .filter(|c| c.owner == owner)
            .cloned()
            .collect()
    }

    fn pack_inventory(&self, owner: OwnerId) -> BTreeMap<String, u32> {
        self.tables().packs.get(&owner).cloned().unwrap_or_default()
    }

    fn grant_packs(&self, owner: OwnerId, pack_id: &str, count: u32) -> u32 {
        let mut tables = self.tables();
        let held = tables
            .packs
            .entry(owner)
            .or_default()
            .entry(pack_id.to_string())
            .or_insert(0);
        *held = held.saturating_add(count);
        *held
    }

    fn take_pack(&self, owner: OwnerId, pack_id: &str) -> Result<u32, EconomyError> {
        let mut tables = self.tables();
        let inventory = tables.packs.entry(owner).or_default();
        match inventory.get_mut(pack_id) {
            Some(held) if *held > 0 => {
                *held -= 1;
                let left = *held;
                if left == 0 {
                    inventory.remove(pack_id);
                }
                Ok(left)
            }
            _ => Err(EconomyError::NoPackHeld {
                owner,
                pack: pack_id.to_string(),
            }),
        }
    }

    fn battlepass(&self, owner: OwnerId) -> BattlepassProgress {
        self.tables()
            .battlepass
            .get(&owner)
            .cloned()
            .unwrap_or_else(|| BattlepassProgress::new(owner))
    }

    fn save_battlepass(&self, progress: BattlepassProgress) {
        self.tables().battlepass.insert(progress.owner, progress);
    }

    fn quest_board(&self, owner: OwnerId) -> Option<QuestBoard> {
        self.tables().quest_boards.get(&owner).cloned()
    }

    fn save_quest_board(&self, board: QuestBoard) {
        self.tables().quest_boards.insert(board.owner, board);
    }

    fn load_session(&self, id: SessionId) -> Option<Vec<u8>> {
        self.tables().sessions.get(&id).cloned()
    }

    fn save_session(&self, id: SessionId, snapshot: Vec<u8>) {
        self.tables().sessions.insert(id, snapshot);
    }

    fn session_ids(&self) -> Vec<SessionId> {
        self.tables().sessions.keys().copied().collect()
    }

    fn open_session(&self, owner: OwnerId) -> Option<SessionId> {
        self.tables().open_sessions.get(&owner).copied()
    }

    fn set_open_session(&self, owner: OwnerId, session: Option<SessionId>) {
        let mut tables = self.tables();
        match session {
            Some(id) => tables.open_sessions.insert(owner, id),
            None => tables.open_sessions.remove(&owner),
        };
    }

    fn open_session_ids(&self) -> Vec<SessionId> {
        let ids: BTreeSet<SessionId> = self.tables().open_sessions.values().copied().collect();
        ids.into_iter().collect()
    }
}
