use crate::config::RewardTable;
use schema::BattleKind;
use serde::{Deserialize, Serialize};

/// What an NPC opponent pays out when beaten.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct Prize {
    pub money: u64,
    /// Pack id added to the winner's inventory.
    pub pack: Option<String>,
}

/// Everything one human side receives when a battle resolves.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct BattleReward {
    pub xp: i64,
    pub money: u64,
    pub pack: Option<String>,
}

pub struct RewardCalculator<'a> {
    table: &'a RewardTable,
}

impl<'a> RewardCalculator<'a> {
    pub fn new(table: &'a RewardTable) -> Self {
        Self { table }
    }

    /// Reward for one human side. A side that forfeited receives nothing;
    /// the prize is only paid to a winner.
    pub fn reward_for(&self, kind: BattleKind, won: bool, forfeited: bool, prize: &Prize) -> BattleReward {
        if forfeited {
            return BattleReward::default();
        }
        if !won {
            return BattleReward {
                xp: self.table.xp_for(kind, false),
                ..BattleReward::default()
            };
        }
        BattleReward {
            xp: self.table.xp_for(kind, true),
            money: prize.money,
            pack: prize.pack.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rewards_by_outcome() {
        let table = RewardTable::default();
        let calculator = RewardCalculator::new(&table);
        let prize = Prize {
            money: 500,
            pack: Some("basic".to_string()),
        };

        let won = calculator.reward_for(BattleKind::Gym, true, false, &prize);
        assert_eq!(won.xp, 100);
        assert_eq!(won.money, 500);
        assert_eq!(won.pack.as_deref(), Some("basic"));

        let lost = calculator.reward_for(BattleKind::Trainer, false, false, &prize);
        assert_eq!(lost, BattleReward { xp: 10, money: 0, pack: None });

        let fled = calculator.reward_for(BattleKind::Trainer, false, true, &prize);
        assert_eq!(fled, BattleReward::default());

        let pvp = calculator.reward_for(BattleKind::Pvp, true, false, &Prize::default());
        assert_eq!(pvp, BattleReward { xp: 75, money: 0, pack: None });
    }
}
