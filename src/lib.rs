//! Pokemon League Battle & Loot Engine
//!
//! Deterministic turn-based battles, per-species leveling, trainer cooldowns,
//! ordered gym progression, rarity-guaranteed pack openings, a catch
//! battlepass and daily quests for a chat creature-collecting game. All randomness and time are injected, so every
//! outcome can be replayed from a seed.

// --- MODULE DECLARATIONS ---
pub mod battle;
pub mod catalog;
pub mod clock;
pub mod commands;
pub mod config;
pub mod economy;
pub mod errors;
pub mod locks;
pub mod progression;
pub mod rng;
pub mod server;
pub mod store;
pub mod teams;

// --- PUBLIC API RE-EXPORTS ---

// --- From the `schema` crate ---
pub use schema::{
    BattleKind, Effectiveness, EffectivenessTier, Gym, MoveData, OwnerId, PokemonType, RarityTier,
    SpeciesData, SpeciesId,
};

// --- From this crate's modules (`src/`) ---

// Battle engine and session state.
pub use battle::ai::OpponentStrategy;
pub use battle::calculators::{AttackOutcome, DamageCalculator};
pub use battle::engine::{build_combatant, ready_for_turn_resolution, BattleStateMachine};
pub use battle::state::{BattleSession, Combatant, SessionId, SessionState, TurnRecord};

// Progression, economy and the command surface.
pub use catalog::{CatalogProvider, StaticCatalog};
pub use clock::{Clock, ManualClock, SystemClock};
pub use commands::{
    BattleReport, BattlepassStatus, CatchReport, League, PackPurchase, RewardReport,
};
pub use config::EngineConfig;
pub use economy::{LootGenerator, PackCatalog, PackConfig, PackOpening};
pub use errors::{EngineError, EngineResult};
pub use progression::{
    Battlepass, BattlepassProgress, CooldownTracker, GymProgressTracker, LevelingEngine,
    QuestBoard, QuestTracker, SpeciesStats,
};
pub use rng::{RngSource, ScriptedRng, SeededRng};
pub use store::{Creature, MemoryStore, Store};
