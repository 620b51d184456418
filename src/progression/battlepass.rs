use crate::config::BattlepassSettings;
use log::info;
use schema::OwnerId;
use serde::{Deserialize, Serialize};

/// An owner's season track. Separate from species experience: it only moves
/// when creatures are caught.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct BattlepassProgress {
    pub owner: OwnerId,
    pub xp: u64,
}

impl BattlepassProgress {
    pub fn new(owner: OwnerId) -> Self {
        Self { owner, xp: 0 }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct BattlepassAward {
    pub previous_level: u32,
    pub new_level: u32,
    pub xp: u64,
    /// Pack ids unlocked by the levels gained, in level order.
    pub packs: Vec<String>,
}

impl BattlepassAward {
    pub fn leveled_up(&self) -> bool {
        self.new_level > self.previous_level
    }
}

pub struct Battlepass<'a> {
    settings: &'a BattlepassSettings,
}

impl<'a> Battlepass<'a> {
    pub fn new(settings: &'a BattlepassSettings) -> Self {
        Self { settings }
    }

    /// Level for a progress record, capped at the season's last level.
    pub fn level(&self, progress: &BattlepassProgress) -> u32 {
        let per_level = self.settings.xp_per_level.max(1);
        let level = u32::try_from(progress.xp / per_level + 1).unwrap_or(u32::MAX);
        level.min(self.settings.max_level.max(1))
    }

    /// Add `xp` and collect the pack rewards of every level crossed.
    pub fn award(&self, progress: &mut BattlepassProgress, xp: u64) -> BattlepassAward {
        let previous_level = self.level(progress);
        progress.xp = progress.xp.saturating_add(xp);
        let new_level = self.level(progress);

        let mut packs = Vec::new();
        for level in previous_level + 1..=new_level {
            packs.push(self.settings.level_pack.clone());
            let interval = self.settings.milestone_interval;
            if interval > 0 && level % interval == 0 {
                packs.push(self.settings.milestone_pack.clone());
            }
        }
        if new_level > previous_level {
            info!(
                "{} reached battlepass level {} ({} packs unlocked)",
                progress.owner,
                new_level,
                packs.len()
            );
        }

        BattlepassAward {
            previous_level,
            new_level,
            xp: progress.xp,
            packs,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ten_catches_reach_level_two() {
        let settings = BattlepassSettings::default();
        let battlepass = Battlepass::new(&settings);
        let mut progress = BattlepassProgress::new(OwnerId(1));

        for _ in 0..9 {
            let award = battlepass.award(&mut progress, settings.xp_per_catch);
            assert!(!award.leveled_up());
            assert!(award.packs.is_empty());
        }
        let award = battlepass.award(&mut progress, settings.xp_per_catch);
        assert_eq!((award.previous_level, award.new_level), (1, 2));
        assert_eq!(award.packs, vec!["basic".to_string()]);
    }

    #[test]
    fn test_milestone_levels_add_the_milestone_pack() {
        let settings = BattlepassSettings::default();
        let battlepass = Battlepass::new(&settings);
        let mut progress = BattlepassProgress::new(OwnerId(1));
        progress.xp = 850;

        let award = battlepass.award(&mut progress, 200);
        assert_eq!((award.previous_level, award.new_level), (9, 11));
        assert_eq!(award.packs, vec!["basic", "premium", "basic"]);
    }

    #[test]
    fn test_level_is_capped_and_stops_paying() {
        let settings = BattlepassSettings::default();
        let battlepass = Battlepass::new(&settings);
        let mut progress = BattlepassProgress::new(OwnerId(1));
        progress.xp = 4_890;

        let award = battlepass.award(&mut progress, 10);
        assert_eq!(award.new_level, 50);
        assert_eq!(award.packs, vec!["basic", "premium"]);

        let past_cap = battlepass.award(&mut progress, 1_000);
        assert_eq!(past_cap.new_level, 50);
        assert!(past_cap.packs.is_empty());
        assert_eq!(progress.xp, 5_900);
    }
}
