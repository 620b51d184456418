use crate::battle::ai::OpponentStrategy;
use crate::battle::state::{BattleSession, Combatant, SessionId, Side};
use crate::catalog::StaticCatalog;
use crate::clock::ManualClock;
use crate::commands::League;
use crate::config::EngineConfig;
use crate::economy::PackCatalog;
use crate::errors::EngineResult;
use crate::progression::{Prize, SpeciesStats};
use crate::rng::{ScriptedRng, SeededRng};
use crate::store::{MemoryStore, Store};
use chrono::{DateTime, Utc};
use schema::{BattleKind, MoveData, OwnerId, PokemonType, SpeciesId};
use std::sync::Arc;

/// A builder for test combatants with common defaults.
///
/// # Example
/// ```ignore
/// let pikachu = TestCombatantBuilder::new(25, 10)
///     .with_types(vec![PokemonType::Electric])
///     .with_moves(vec![MoveData::new("Thunder Shock", PokemonType::Electric, 40)])
///     .with_hp(100)
///     .build();
/// ```
pub struct TestCombatantBuilder {
    species: u16,
    level: u32,
    types: Vec<PokemonType>,
    moves: Vec<MoveData>,
    hp: u16,
}

impl TestCombatantBuilder {
    pub fn new(species: u16, level: u32) -> Self {
        Self {
            species,
            level,
            types: vec![PokemonType::Normal],
            moves: vec![MoveData::new("Tackle", PokemonType::Normal, 40)],
            hp: 100,
        }
    }

    pub fn with_types(mut self, types: Vec<PokemonType>) -> Self {
        self.types = types;
        self
    }

    pub fn with_moves(mut self, moves: Vec<MoveData>) -> Self {
        self.moves = moves;
        self
    }

    pub fn with_hp(mut self, hp: u16) -> Self {
        self.hp = hp;
        self
    }

    pub fn build(self) -> Combatant {
        Combatant {
            species: SpeciesId(self.species),
            name: format!("Test #{}", self.species),
            types: self.types,
            level: self.level,
            moves: self.moves,
            max_hp: self.hp,
            current_hp: self.hp,
        }
    }
}

pub fn start_time() -> DateTime<Utc> {
    DateTime::from_timestamp(1_700_000_000, 0).expect("valid timestamp")
}

/// An active human-vs-NPC session for driving the state machine directly.
pub fn create_npc_battle(human: Combatant, roster: Vec<Combatant>, strategy: OpponentStrategy) -> BattleSession {
    BattleSession {
        id: SessionId(1),
        kind: BattleKind::Trainer,
        state: crate::battle::state::SessionState::Active,
        sides: [
            Side::human(OwnerId(1), human),
            Side::npc("Test Trainer", strategy, roster),
        ],
        turn_log: Vec::new(),
        winner: None,
        forfeited_by: None,
        gym: None,
        prize: Prize::default(),
        created_at: start_time(),
    }
}

/// A scripted RNG where every draw is 0.5: no crits, mid variance.
pub fn predictable_rng() -> ScriptedRng {
    ScriptedRng::new(vec![0.5; 200])
}

/// A league over an in-memory store with a hand-driven clock. Daily quests
/// are switched off so balances only move by battle and shop amounts.
pub fn create_test_league(seed: u64) -> (League, Arc<ManualClock>, Arc<MemoryStore>) {
    let mut config = EngineConfig::default();
    config.quests.daily_count = 0;
    create_custom_league(seed, config, StaticCatalog::kanto(), PackCatalog::default())
}

pub fn create_custom_league(
    seed: u64,
    config: EngineConfig,
    catalog: StaticCatalog,
    packs: PackCatalog,
) -> (League, Arc<ManualClock>, Arc<MemoryStore>) {
    let clock = Arc::new(ManualClock::new(start_time()));
    let store = Arc::new(MemoryStore::new());
    let league = League::new(
        config,
        store.clone(),
        Arc::new(catalog),
        clock.clone(),
        Box::new(SeededRng::new(seed)),
    )
    .with_packs(packs);
    (league, clock, store)
}

/// Give an owner enough experience on a species to reach `level`.
pub fn set_level(store: &MemoryStore, owner: OwnerId, species: SpeciesId, level: u32) {
    let mut stats = SpeciesStats::new(owner, species);
    stats.experience = (level as u64 - 1) * 100;
    store.save_species_stats(stats);
}

/// Helper function to assert that a Result is Ok and return the value.
pub fn assert_ok<T>(result: EngineResult<T>) -> T {
    match result {
        Ok(value) => value,
        Err(err) => panic!("Expected Ok but got error: {}", err),
    }
}
