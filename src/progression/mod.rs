pub mod battlepass;
pub mod cooldown;
pub mod gyms;
pub mod leveling;
pub mod quests;
pub mod rewards;

pub use battlepass::{Battlepass, BattlepassAward, BattlepassProgress};
pub use cooldown::{CooldownDecision, CooldownTracker, TrainerCooldownRecord};
pub use gyms::{GymBadgeRecord, GymProgressTracker, GymVictory};
pub use leveling::{level_for_experience, LevelChange, LevelingEngine, SpeciesStats};
pub use quests::{DailyQuest, QuestBoard, QuestCompletion, QuestEvent, QuestGoal, QuestTracker};
pub use rewards::{BattleReward, Prize, RewardCalculator};
