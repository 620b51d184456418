//! NPC rosters: the route trainers and the eight Kanto gym leaders.

use crate::battle::ai::OpponentStrategy;
use crate::progression::Prize;
use crate::rng::RngSource;
use schema::{Gym, SpeciesId};
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

/// Trainer levels start following the challenger above this level.
const SCALING_THRESHOLD: u32 = 15;

/// A route trainer. The team's levels are rolled per battle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainerTemplate {
    pub name: String,
    pub species: Vec<SpeciesId>,
    pub min_level: u32,
    pub max_level: u32,
    pub reward_money: u64,
}

impl TrainerTemplate {
    fn new(name: &str, species: &[u16], min_level: u32, max_level: u32, reward_money: u64) -> Self {
        Self {
            name: name.to_string(),
            species: species.iter().map(|id| SpeciesId(*id)).collect(),
            min_level,
            max_level,
            reward_money,
        }
    }

    /// Level range after scaling to the challenger: both ends rise by however
    /// far the challenger is above the threshold, capped at `cap`.
    pub fn scaled_levels(&self, challenger_level: u32, cap: u32) -> (u32, u32) {
        let adjustment = challenger_level.saturating_sub(SCALING_THRESHOLD);
        (
            (self.min_level + adjustment).min(cap),
            (self.max_level + adjustment).min(cap),
        )
    }

    /// Roll a level for every team member.
    pub fn roll_team(
        &self,
        challenger_level: u32,
        cap: u32,
        rng: &mut dyn RngSource,
    ) -> Vec<(SpeciesId, u32)> {
        let (low, high) = self.scaled_levels(challenger_level, cap);
        self.species
            .iter()
            .map(|species| (*species, rng.range_inclusive(low, high, "trainer level")))
            .collect()
    }

    pub fn prize(&self) -> Prize {
        Prize {
            money: self.reward_money,
            pack: None,
        }
    }

    pub fn strategy(&self) -> OpponentStrategy {
        OpponentStrategy::FixedList
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GymLeader {
    pub gym: Gym,
    pub name: String,
    pub team: Vec<(SpeciesId, u32)>,
    pub reward_money: u64,
    pub reward_pack: String,
}

impl GymLeader {
    fn new(gym: Gym, name: &str, team: &[(u16, u32)], reward_money: u64, reward_pack: &str) -> Self {
        Self {
            gym,
            name: name.to_string(),
            team: team.iter().map(|(id, level)| (SpeciesId(*id), *level)).collect(),
            reward_money,
            reward_pack: reward_pack.to_string(),
        }
    }

    pub fn prize(&self) -> Prize {
        Prize {
            money: self.reward_money,
            pack: Some(self.reward_pack.clone()),
        }
    }

    pub fn strategy(&self) -> OpponentStrategy {
        OpponentStrategy::Greedy
    }
}

static TRAINERS: LazyLock<Vec<TrainerTemplate>> = LazyLock::new(|| {
    vec![
        TrainerTemplate::new("Bug Catcher Liam", &[11, 13, 14], 8, 12, 150),
        TrainerTemplate::new("Bug Catcher Wade", &[10, 13, 48], 10, 14, 180),
        TrainerTemplate::new("Youngster Ben", &[19, 21], 12, 16, 200),
        TrainerTemplate::new("Youngster Joey", &[19, 19], 14, 18, 220),
        TrainerTemplate::new("Lass Iris", &[35, 39], 13, 17, 210),
        TrainerTemplate::new("Lass Dana", &[16, 20, 52], 15, 19, 240),
        TrainerTemplate::new("Hiker Marcos", &[74, 95], 16, 20, 280),
        TrainerTemplate::new("Hiker Franklin", &[74, 74, 75], 18, 22, 320),
        TrainerTemplate::new("Picnicker Kelsey", &[43, 69], 14, 18, 230),
        TrainerTemplate::new("Picnicker Gina", &[43, 46, 69], 17, 21, 270),
        TrainerTemplate::new("Camper Ricky", &[27, 104], 15, 19, 250),
        TrainerTemplate::new("Camper Ethan", &[58, 77], 18, 22, 290),
        TrainerTemplate::new("Swimmer Diana", &[72, 116], 17, 21, 260),
        TrainerTemplate::new("Swimmer Jack", &[54, 60, 118], 19, 23, 300),
        TrainerTemplate::new("Fisherman Wade", &[129, 129, 129], 10, 14, 160),
        TrainerTemplate::new("Fisherman Ned", &[98, 120], 18, 22, 290),
        TrainerTemplate::new("Engineer Baily", &[81, 100], 16, 20, 270),
        TrainerTemplate::new("Engineer Bernie", &[81, 81, 82], 20, 24, 340),
        TrainerTemplate::new("Psychic Johan", &[63, 96], 17, 21, 280),
        TrainerTemplate::new("Psychic Dario", &[64, 97], 22, 26, 370),
        TrainerTemplate::new("Channeler Hope", &[92, 93], 18, 22, 300),
        TrainerTemplate::new("Beauty Bridget", &[35, 39, 40], 19, 23, 310),
        TrainerTemplate::new("Beauty Olivia", &[44, 70], 21, 25, 350),
        TrainerTemplate::new("Biker Jared", &[88, 109], 19, 23, 320),
        TrainerTemplate::new("Biker Malik", &[89, 110], 23, 27, 390),
        TrainerTemplate::new("Cooltrainer Mary", &[26, 28, 59], 24, 28, 420),
        TrainerTemplate::new("Cooltrainer Paul", &[55, 62, 71], 25, 29, 450),
    ]
});

static GYM_LEADERS: LazyLock<Vec<GymLeader>> = LazyLock::new(|| {
    vec![
        GymLeader::new(Gym::Pewter, "Brock", &[(74, 12), (95, 14)], 500, "basic"),
        GymLeader::new(Gym::Cerulean, "Misty", &[(120, 18), (121, 21)], 750, "basic"),
        GymLeader::new(
            Gym::Vermilion,
            "Lt. Surge",
            &[(100, 21), (25, 18), (26, 24)],
            1000,
            "booster",
        ),
        GymLeader::new(
            Gym::Celadon,
            "Erika",
            &[(71, 29), (114, 24), (45, 29)],
            1250,
            "booster",
        ),
        GymLeader::new(
            Gym::Fuchsia,
            "Koga",
            &[(109, 37), (89, 39), (109, 37), (110, 43)],
            1500,
            "premium",
        ),
        GymLeader::new(
            Gym::Saffron,
            "Sabrina",
            &[(64, 38), (122, 37), (49, 38), (65, 43)],
            1750,
            "premium",
        ),
        GymLeader::new(
            Gym::Cinnabar,
            "Blaine",
            &[(58, 42), (77, 40), (78, 42), (59, 47)],
            2000,
            "elite_trainer",
        ),
        GymLeader::new(
            Gym::Viridian,
            "Giovanni",
            &[(111, 45), (51, 42), (31, 44), (34, 45), (112, 50)],
            2500,
            "elite_trainer",
        ),
    ]
});

pub fn trainers() -> &'static [TrainerTemplate] {
    &TRAINERS
}

/// Uniformly choose a route trainer to fight.
pub fn pick_trainer(rng: &mut dyn RngSource) -> &'static TrainerTemplate {
    &TRAINERS[rng.pick_index(TRAINERS.len(), "trainer")]
}

pub fn gym_leader(gym: Gym) -> &'static GymLeader {
    &GYM_LEADERS[gym.order()]
}

pub fn gym_leaders() -> &'static [GymLeader] {
    &GYM_LEADERS
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{CatalogProvider, StaticCatalog};
    use crate::rng::SeededRng;

    #[test]
    fn test_every_roster_species_is_in_the_catalog() {
        let catalog = StaticCatalog::kanto();
        for trainer in trainers() {
            for species in &trainer.species {
                assert!(catalog.species_data(*species).is_some(), "{} uses {}", trainer.name, species);
            }
        }
        for leader in gym_leaders() {
            for (species, _) in &leader.team {
                assert!(catalog.species_data(*species).is_some(), "{} uses {}", leader.name, species);
            }
        }
    }

    #[test]
    fn test_leaders_line_up_with_gym_order() {
        for gym in Gym::ALL {
            assert_eq!(gym_leader(gym).gym, gym);
        }
        assert_eq!(gym_leader(Gym::Pewter).name, "Brock");
        assert_eq!(gym_leader(Gym::Viridian).prize().money, 2500);
    }

    #[test]
    fn test_trainer_levels_scale_and_cap() {
        let joey = &trainers()[3];
        assert_eq!(joey.scaled_levels(10, 50), (14, 18));
        assert_eq!(joey.scaled_levels(25, 50), (24, 28));
        assert_eq!(joey.scaled_levels(60, 50), (50, 50));

        let mut rng = SeededRng::new(11);
        for _ in 0..100 {
            let team = joey.roll_team(25, 50, &mut rng);
            assert_eq!(team.len(), 2);
            assert!(team.iter().all(|(_, level)| (24..=28).contains(level)));
        }
    }
}
