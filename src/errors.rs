use crate::battle::state::{SessionId, SessionState};
use chrono::Duration;
use schema::{Gym, OwnerId, SpeciesId};
use thiserror::Error;

/// Main error type for the Pokemon League engine
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    /// Error raised by the battle state machine
    #[error("Battle error: {0}")]
    Battle(#[from] BattleError),
    /// Error raised by leveling, cooldowns or gym progression
    #[error("Progression error: {0}")]
    Progression(#[from] ProgressionError),
    /// Error surfaced from the economy layer
    #[error("Economy error: {0}")]
    Economy(#[from] EconomyError),
    /// Referenced species or move metadata is missing
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),
    /// Configuration could not be read or parsed
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}

/// Errors related to battle sessions
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BattleError {
    /// The participant already has an Active or Pending session
    #[error("{participant} is already in battle {session}")]
    SessionConflict {
        participant: OwnerId,
        session: SessionId,
    },
    #[error("No battle session with id {0}")]
    SessionNotFound(SessionId),
    /// The requested action is not valid from the session's current state
    #[error("Cannot {action} a session that is {from:?}")]
    InvalidTransition {
        from: SessionState,
        action: &'static str,
    },
    #[error("{0} is not a participant in this battle")]
    NotAParticipant(OwnerId),
    #[error("Invalid move index: {0}")]
    InvalidMove(usize),
    /// The stored snapshot could not be encoded or decoded
    #[error("Battle {0} snapshot is corrupt")]
    CorruptSession(SessionId),
    /// A participant cannot battle itself
    #[error("{0} cannot challenge themselves")]
    SelfChallenge(OwnerId),
    /// Owners can only send out species they have caught or pulled
    #[error("{owner} does not own a {species}")]
    CreatureNotOwned { owner: OwnerId, species: SpeciesId },
}

/// Errors related to leveling, cooldowns and gym progression
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProgressionError {
    /// The gym is not the next one in the progression
    #[error("{attempted} is out of order (next gym: {expected:?})")]
    OutOfOrder { expected: Option<Gym>, attempted: Gym },
    /// Experience awards must be positive
    #[error("Invalid experience award: {0}")]
    InvalidAward(i64),
    #[error("Unknown gym: {0}")]
    UnknownGym(String),
    /// The trainer-battle window is full
    #[error("Trainer battles on cooldown, retry in {} seconds", retry_after.num_seconds())]
    CooldownActive { retry_after: Duration },
}

/// Errors related to balances and packs
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EconomyError {
    #[error("{owner} needs {needed} but only has {available}")]
    InsufficientFunds {
        owner: OwnerId,
        needed: u64,
        available: u64,
    },
    #[error("Unknown pack: {0}")]
    UnknownPack(String),
    /// The owner's inventory has no unopened pack of this kind
    #[error("{owner} has no {pack} pack to open")]
    NoPackHeld { owner: OwnerId, pack: String },
}

/// Errors related to catalog lookups
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    #[error("Species not found: {0}")]
    SpeciesNotFound(SpeciesId),
    /// Metadata exists but is unusable (no types, empty move list, ...)
    #[error("Incomplete data for {species}: {details}")]
    DataIncomplete { species: SpeciesId, details: String },
}

/// Errors related to loading configuration files
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("Failed to read {path}: {reason}")]
    Io { path: String, reason: String },
    #[error("Malformed config: {0}")]
    Parse(String),
}

/// Type alias for Results using EngineError
pub type EngineResult<T> = Result<T, EngineError>;

/// Type alias for Results using BattleError
pub type BattleResult<T> = Result<T, BattleError>;

/// Type alias for Results using ProgressionError
pub type ProgressionResult<T> = Result<T, ProgressionError>;

/// Type alias for Results using CatalogError
pub type CatalogResult<T> = Result<T, CatalogError>;
