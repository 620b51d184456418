use crate::errors::{ProgressionError, ProgressionResult};
use log::{debug, info};
use schema::{OwnerId, SpeciesId};
use serde::{Deserialize, Serialize};

/// Experience needed per level. Levels are uncapped.
pub const XP_PER_LEVEL: u64 = 100;

/// Level derived from a cumulative experience total.
pub fn level_for_experience(experience: u64) -> u32 {
    u32::try_from(experience / XP_PER_LEVEL + 1).unwrap_or(u32::MAX)
}

/// Per-owner, per-species progress. Every creature of the same species owned
/// by the same owner shares this record.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct SpeciesStats {
    pub owner: OwnerId,
    pub species: SpeciesId,
    pub experience: u64,
    pub wins: u32,
    pub losses: u32,
}

impl SpeciesStats {
    pub fn new(owner: OwnerId, species: SpeciesId) -> Self {
        Self {
            owner,
            species,
            experience: 0,
            wins: 0,
            losses: 0,
        }
    }

    pub fn level(&self) -> u32 {
        level_for_experience(self.experience)
    }

    pub fn record_result(&mut self, won: bool) {
        if won {
            self.wins += 1;
        } else {
            self.losses += 1;
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelChange {
    pub previous_level: u32,
    pub new_level: u32,
    pub experience: u64,
}

impl LevelChange {
    pub fn leveled_up(&self) -> bool {
        self.new_level > self.previous_level
    }
}

pub struct LevelingEngine;

impl LevelingEngine {
    /// Add `xp` to the record and recompute the level from the new total.
    pub fn award(stats: &mut SpeciesStats, xp: i64) -> ProgressionResult<LevelChange> {
        if xp <= 0 {
            return Err(ProgressionError::InvalidAward(xp));
        }

        let previous_level = stats.level();
        stats.experience = stats.experience.saturating_add(xp as u64);
        let change = LevelChange {
            previous_level,
            new_level: stats.level(),
            experience: stats.experience,
        };

        if change.leveled_up() {
            info!(
                "{} {} grew to level {} ({} xp)",
                stats.owner, stats.species, change.new_level, change.experience
            );
        } else {
            debug!(
                "{} {} gained {} xp ({} total)",
                stats.owner, stats.species, xp, change.experience
            );
        }
        Ok(change)
    }
}
