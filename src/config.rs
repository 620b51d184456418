//! Tunable engine constants.
//!
//! Everything that is balance rather than logic lives here: the damage curve,
//! the XP reward table, the trainer cooldown window and the challenge expiry.
//! Values can be overridden from a RON file; missing fields keep their defaults.

use crate::errors::ConfigError;
use chrono::Duration;
use schema::BattleKind;
use serde::{Deserialize, Serialize};
use std::path::Path;

// Default critical hit chance (1/16)
const CRITICAL_CHANCE: f64 = 0.0625;
const CRITICAL_MULTIPLIER: f64 = 1.5;
const STAB_MULTIPLIER: f64 = 1.5;
const VARIANCE_MIN: f64 = 0.85;
const VARIANCE_MAX: f64 = 1.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DamageTuning {
    pub critical_chance: f64,
    pub critical_multiplier: f64,
    pub stab_multiplier: f64,
    pub variance_min: f64,
    pub variance_max: f64,
    /// Base damage is `power * (1 + level / level_divisor) * power_scale`.
    pub level_divisor: f64,
    pub power_scale: f64,
}

impl Default for DamageTuning {
    fn default() -> Self {
        Self {
            critical_chance: CRITICAL_CHANCE,
            critical_multiplier: CRITICAL_MULTIPLIER,
            stab_multiplier: STAB_MULTIPLIER,
            variance_min: VARIANCE_MIN,
            variance_max: VARIANCE_MAX,
            level_divisor: 50.0,
            power_scale: 0.4,
        }
    }
}

impl DamageTuning {
    pub fn base_damage(&self, power: u16, level: u32) -> f64 {
        power as f64 * (1.0 + level as f64 / self.level_divisor) * self.power_scale
    }
}

/// XP awarded to each human side when a battle resolves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RewardTable {
    pub pvp_win: i64,
    pub pvp_loss: i64,
    pub trainer_win: i64,
    pub trainer_loss: i64,
    pub gym_win: i64,
    pub gym_loss: i64,
}

impl Default for RewardTable {
    fn default() -> Self {
        Self {
            pvp_win: 75,
            pvp_loss: 0,
            trainer_win: 50,
            trainer_loss: 10,
            gym_win: 100,
            gym_loss: 0,
        }
    }
}

impl RewardTable {
    pub fn xp_for(&self, kind: BattleKind, won: bool) -> i64 {
        match (kind, won) {
            (BattleKind::Pvp, true) => self.pvp_win,
            (BattleKind::Pvp, false) => self.pvp_loss,
            (BattleKind::Trainer, true) => self.trainer_win,
            (BattleKind::Trainer, false) => self.trainer_loss,
            (BattleKind::Gym, true) => self.gym_win,
            (BattleKind::Gym, false) => self.gym_loss,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CooldownSettings {
    pub window_minutes: i64,
    pub max_uses: usize,
}

impl Default for CooldownSettings {
    fn default() -> Self {
        Self {
            window_minutes: 60,
            max_uses: 3,
        }
    }
}

impl CooldownSettings {
    pub fn window(&self) -> Duration {
        Duration::minutes(self.window_minutes)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BattleSettings {
    /// How long a PvP challenge may sit unanswered before it is cancelled.
    pub challenge_expiry_seconds: i64,
    /// Trainer levels follow the challenger's level but never exceed this.
    pub trainer_level_cap: u32,
    pub hp_per_level: u16,
    /// Used when the catalog has no base HP for a species.
    pub default_base_hp: u16,
}

impl Default for BattleSettings {
    fn default() -> Self {
        Self {
            challenge_expiry_seconds: 300,
            trainer_level_cap: 50,
            hp_per_level: 2,
            default_base_hp: 50,
        }
    }
}

impl BattleSettings {
    pub fn challenge_expiry(&self) -> Duration {
        Duration::seconds(self.challenge_expiry_seconds)
    }
}

/// Season track fed by catches. Every level reached grants a pack; every
/// `milestone_interval`-th level grants the milestone pack as well.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BattlepassSettings {
    pub xp_per_catch: u64,
    pub xp_per_level: u64,
    pub max_level: u32,
    pub level_pack: String,
    pub milestone_interval: u32,
    pub milestone_pack: String,
}

impl Default for BattlepassSettings {
    fn default() -> Self {
        Self {
            xp_per_catch: 10,
            xp_per_level: 100,
            max_level: 50,
            level_pack: "basic".to_string(),
            milestone_interval: 10,
            milestone_pack: "premium".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuestSettings {
    /// Quests handed out each day.
    pub daily_count: usize,
}

impl Default for QuestSettings {
    fn default() -> Self {
        Self { daily_count: 3 }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub damage: DamageTuning,
    pub rewards: RewardTable,
    pub cooldown: CooldownSettings,
    pub battle: BattleSettings,
    pub battlepass: BattlepassSettings,
    pub quests: QuestSettings,
}

impl EngineConfig {
    pub fn from_ron_str(source: &str) -> Result<Self, ConfigError> {
        ron::from_str(source).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let source = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        Self::from_ron_str(&source)
    }
}
