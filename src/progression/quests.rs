//! Daily quests.
//!
//! Each owner gets a fresh board of quests per UTC day. Commands report what
//! happened as `QuestEvent`s; completing a quest pays its money reward once.

use crate::rng::RngSource;
use chrono::NaiveDate;
use log::{debug, info};
use schema::{BattleKind, OwnerId, PokemonType, SpeciesId};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuestGoal {
    CatchCreatures,
    CatchType(PokemonType),
    /// Distinct species caught today.
    CatchUnique,
    CatchLegendary,
    WinBattles,
    DefeatTrainers,
    ChallengeGyms,
    DefeatGymLeader,
    /// PvP battles finished, won or lost.
    PvpBattles,
    EarnBadge,
    OpenPacks,
    EarnMoney,
    SpendMoney,
    BuyFromShop,
    LevelUpSpecies,
    GainBattlepassXp,
}

/// Something a command did that quests may count.
#[derive(Debug, Clone, PartialEq)]
pub enum QuestEvent {
    Caught {
        species: SpeciesId,
        types: Vec<PokemonType>,
        legendary: bool,
    },
    BattleFinished {
        kind: BattleKind,
        won: bool,
    },
    GymChallenged,
    BadgeEarned,
    PackOpened,
    MoneyEarned(u64),
    MoneySpent(u64),
    ShopPurchase,
    SpeciesLeveledUp,
    BattlepassXp(u64),
}

use PokemonType::*;
use QuestGoal::*;

const QUEST_TEMPLATES: &[(QuestGoal, u64, u64, &str)] = &[
    (CatchCreatures, 3, 30, "Catch 3 Pokemon"),
    (CatchCreatures, 5, 50, "Catch 5 Pokemon"),
    (CatchCreatures, 8, 80, "Catch 8 Pokemon"),
    (CatchCreatures, 10, 100, "Catch 10 Pokemon"),
    (CatchCreatures, 15, 150, "Catch 15 Pokemon"),
    (CatchType(Fire), 2, 40, "Catch 2 Fire-type Pokemon"),
    (CatchType(Fire), 3, 60, "Catch 3 Fire-type Pokemon"),
    (CatchType(Water), 2, 40, "Catch 2 Water-type Pokemon"),
    (CatchType(Water), 3, 60, "Catch 3 Water-type Pokemon"),
    (CatchType(Grass), 2, 40, "Catch 2 Grass-type Pokemon"),
    (CatchType(Grass), 3, 60, "Catch 3 Grass-type Pokemon"),
    (CatchType(Electric), 2, 40, "Catch 2 Electric-type Pokemon"),
    (CatchType(Psychic), 2, 40, "Catch 2 Psychic-type Pokemon"),
    (CatchType(Fighting), 2, 40, "Catch 2 Fighting-type Pokemon"),
    (CatchType(Rock), 2, 40, "Catch 2 Rock-type Pokemon"),
    (CatchType(Ground), 2, 40, "Catch 2 Ground-type Pokemon"),
    (CatchType(Flying), 2, 40, "Catch 2 Flying-type Pokemon"),
    (CatchType(Bug), 2, 35, "Catch 2 Bug-type Pokemon"),
    (CatchType(Poison), 2, 40, "Catch 2 Poison-type Pokemon"),
    (CatchType(Normal), 3, 40, "Catch 3 Normal-type Pokemon"),
    (CatchType(Dragon), 1, 80, "Catch a Dragon-type Pokemon"),
    (CatchType(Ghost), 1, 50, "Catch a Ghost-type Pokemon"),
    (CatchType(Ice), 1, 50, "Catch an Ice-type Pokemon"),
    (CatchUnique, 3, 60, "Catch 3 different Pokemon species"),
    (CatchUnique, 5, 100, "Catch 5 different Pokemon species"),
    (CatchLegendary, 1, 200, "Catch a legendary Pokemon"),
    (WinBattles, 1, 50, "Win 1 battle"),
    (WinBattles, 3, 150, "Win 3 battles"),
    (WinBattles, 5, 250, "Win 5 battles"),
    (DefeatTrainers, 1, 70, "Defeat 1 wild trainer"),
    (DefeatTrainers, 2, 120, "Defeat 2 wild trainers"),
    (DefeatTrainers, 3, 180, "Defeat 3 wild trainers"),
    (ChallengeGyms, 1, 100, "Challenge a gym leader"),
    (ChallengeGyms, 2, 180, "Challenge 2 gym leaders"),
    (DefeatGymLeader, 1, 150, "Defeat a gym leader"),
    (PvpBattles, 1, 80, "Battle another player"),
    (PvpBattles, 2, 140, "Battle other players 2 times"),
    (EarnBadge, 1, 150, "Earn a new gym badge"),
    (OpenPacks, 1, 25, "Open 1 pack"),
    (OpenPacks, 3, 75, "Open 3 packs"),
    (OpenPacks, 5, 120, "Open 5 packs"),
    (EarnMoney, 100, 50, "Earn 100 Pokedollars"),
    (EarnMoney, 500, 150, "Earn 500 Pokedollars"),
    (EarnMoney, 1000, 250, "Earn 1000 Pokedollars"),
    (SpendMoney, 200, 60, "Spend 200 Pokedollars"),
    (SpendMoney, 500, 120, "Spend 500 Pokedollars"),
    (BuyFromShop, 1, 50, "Buy 1 item from the shop"),
    (BuyFromShop, 2, 90, "Buy 2 items from the shop"),
    (LevelUpSpecies, 1, 60, "Level up a Pokemon"),
    (LevelUpSpecies, 2, 100, "Level up 2 Pokemon"),
    (GainBattlepassXp, 50, 50, "Gain 50 battlepass XP"),
    (GainBattlepassXp, 100, 90, "Gain 100 battlepass XP"),
];

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct DailyQuest {
    pub goal: QuestGoal,
    pub description: String,
    pub target: u64,
    pub progress: u64,
    /// Money paid on completion.
    pub reward: u64,
    pub completed: bool,
    /// Species already counted towards `CatchUnique`.
    #[serde(default)]
    pub seen_species: Vec<SpeciesId>,
}

impl DailyQuest {
    fn from_template(&(goal, target, reward, description): &(QuestGoal, u64, u64, &str)) -> Self {
        Self {
            goal,
            description: description.to_string(),
            target,
            progress: 0,
            reward,
            completed: false,
            seen_species: Vec::new(),
        }
    }

    /// How far `event` moves this quest.
    fn increment_for(&mut self, event: &QuestEvent) -> u64 {
        match (self.goal, event) {
            (CatchCreatures, QuestEvent::Caught { .. }) => 1,
            (CatchType(wanted), QuestEvent::Caught { types, .. }) => u64::from(types.contains(&wanted)),
            (CatchUnique, QuestEvent::Caught { species, .. }) => {
                if self.seen_species.contains(species) {
                    0
                } else {
                    self.seen_species.push(*species);
                    1
                }
            }
            (CatchLegendary, QuestEvent::Caught { legendary, .. }) => u64::from(*legendary),
            (WinBattles, QuestEvent::BattleFinished { won, .. }) => u64::from(*won),
            (DefeatTrainers, QuestEvent::BattleFinished { kind, won }) => {
                u64::from(*won && *kind == BattleKind::Trainer)
            }
            (DefeatGymLeader, QuestEvent::BattleFinished { kind, won }) => {
                u64::from(*won && *kind == BattleKind::Gym)
            }
            (PvpBattles, QuestEvent::BattleFinished { kind, .. }) => u64::from(*kind == BattleKind::Pvp),
            (ChallengeGyms, QuestEvent::GymChallenged) => 1,
            (EarnBadge, QuestEvent::BadgeEarned) => 1,
            (OpenPacks, QuestEvent::PackOpened) => 1,
            (EarnMoney, QuestEvent::MoneyEarned(amount)) => *amount,
            (SpendMoney, QuestEvent::MoneySpent(amount)) => *amount,
            (BuyFromShop, QuestEvent::ShopPurchase) => 1,
            (LevelUpSpecies, QuestEvent::SpeciesLeveledUp) => 1,
            (GainBattlepassXp, QuestEvent::BattlepassXp(amount)) => *amount,
            _ => 0,
        }
    }
}

/// One owner's quests for one day.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct QuestBoard {
    pub owner: OwnerId,
    pub day: NaiveDate,
    pub quests: Vec<DailyQuest>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct QuestCompletion {
    pub description: String,
    pub reward: u64,
}

pub struct QuestTracker;

impl QuestTracker {
    /// Draw `count` quests with distinct goals from the template table.
    pub fn generate(owner: OwnerId, day: NaiveDate, count: usize, rng: &mut dyn RngSource) -> QuestBoard {
        let mut remaining: Vec<&(QuestGoal, u64, u64, &str)> = QUEST_TEMPLATES.iter().collect();
        let mut quests = Vec::with_capacity(count);
        while quests.len() < count && !remaining.is_empty() {
            let picked = remaining.remove(rng.pick_index(remaining.len(), "daily quest"));
            remaining.retain(|template| template.0 != picked.0);
            quests.push(DailyQuest::from_template(picked));
        }
        debug!("Generated {} quests for {} on {}", quests.len(), owner, day);
        QuestBoard { owner, day, quests }
    }

    /// Whether the board belongs to an earlier day and must be replaced.
    pub fn is_stale(board: &QuestBoard, today: NaiveDate) -> bool {
        board.day != today
    }

    /// Apply an event and return the quests it completed. A completed quest
    /// never counts again.
    pub fn record(board: &mut QuestBoard, event: &QuestEvent) -> Vec<QuestCompletion> {
        let mut completions = Vec::new();
        for quest in board.quests.iter_mut().filter(|q| !q.completed) {
            let step = quest.increment_for(event);
            if step == 0 {
                continue;
            }
            quest.progress = quest.progress.saturating_add(step).min(quest.target);
            if quest.progress >= quest.target {
                quest.completed = true;
                info!("{} completed quest '{}'", board.owner, quest.description);
                completions.push(QuestCompletion {
                    description: quest.description.clone(),
                    reward: quest.reward,
                });
            }
        }
        completions
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::{ScriptedRng, SeededRng};

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 1).unwrap()
    }

    fn board(templates: &[usize]) -> QuestBoard {
        QuestBoard {
            owner: OwnerId(1),
            day: today(),
            quests: templates
                .iter()
                .map(|i| DailyQuest::from_template(&QUEST_TEMPLATES[*i]))
                .collect(),
        }
    }

    fn caught(species: u16, types: Vec<PokemonType>) -> QuestEvent {
        QuestEvent::Caught {
            species: SpeciesId(species),
            types,
            legendary: false,
        }
    }

    #[test]
    fn test_generated_quests_have_distinct_goals() {
        for seed in 0..50 {
            let board = QuestTracker::generate(OwnerId(1), today(), 3, &mut SeededRng::new(seed));
            assert_eq!(board.quests.len(), 3);
            for (i, quest) in board.quests.iter().enumerate() {
                assert!(board.quests[i + 1..].iter().all(|q| q.goal != quest.goal));
                assert_eq!(quest.progress, 0);
            }
        }
    }

    #[test]
    fn test_scripted_draws_pick_templates_in_order() {
        let mut rng = ScriptedRng::new(vec![0.0, 0.0]);
        let board = QuestTracker::generate(OwnerId(1), today(), 2, &mut rng);
        assert_eq!(board.quests[0].description, "Catch 3 Pokemon");
        // Every other CatchCreatures variant was removed with the first pick
        assert_eq!(board.quests[1].description, "Catch 2 Fire-type Pokemon");
    }

    #[test]
    fn test_progress_completes_once_and_pays_once() {
        // Catch 3 Pokemon, Catch 2 Fire-type Pokemon, Catch 3 different species
        let mut board = board(&[0, 5, 23]);
        assert_eq!(board.quests[2].goal, CatchUnique);

        assert!(QuestTracker::record(&mut board, &caught(4, vec![Fire])).is_empty());
        assert!(QuestTracker::record(&mut board, &caught(4, vec![Fire])).len() == 1);
        assert_eq!(board.quests[1].progress, 2);
        assert_eq!(board.quests[2].progress, 1);

        let done = QuestTracker::record(&mut board, &caught(25, vec![Electric]));
        assert_eq!(
            done,
            vec![QuestCompletion {
                description: "Catch 3 Pokemon".to_string(),
                reward: 30
            }]
        );
        assert!(QuestTracker::record(&mut board, &caught(1, vec![Grass, Poison])).len() == 1);
        assert!(board.quests.iter().all(|q| q.completed));
        assert!(QuestTracker::record(&mut board, &caught(7, vec![Water])).is_empty());
    }

    #[test]
    fn test_money_and_battle_events() {
        // Earn 100 Pokedollars, Defeat 1 wild trainer, Battle another player
        let mut board = board(&[41, 29, 35]);
        QuestTracker::record(&mut board, &QuestEvent::MoneyEarned(60));
        assert_eq!(board.quests[0].progress, 60);
        let done = QuestTracker::record(&mut board, &QuestEvent::MoneyEarned(60));
        assert_eq!(done[0].reward, 50);
        assert_eq!(board.quests[0].progress, 100);

        let lost = QuestEvent::BattleFinished {
            kind: BattleKind::Trainer,
            won: false,
        };
        assert!(QuestTracker::record(&mut board, &lost).is_empty());
        let pvp_loss = QuestEvent::BattleFinished {
            kind: BattleKind::Pvp,
            won: false,
        };
        assert_eq!(QuestTracker::record(&mut board, &pvp_loss).len(), 1);
        assert!(!board.quests[1].completed);
    }

    #[test]
    fn test_board_goes_stale_the_next_day() {
        let board = board(&[0]);
        assert!(!QuestTracker::is_stale(&board, today()));
        assert!(QuestTracker::is_stale(&board, today().succ_opt().unwrap()));
    }
}
