use crate::PokemonType;
use serde::{Deserialize, Serialize};
use std::fmt;
use strum::{EnumIter, EnumString};

/// Chat-platform user id of a player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct OwnerId(pub u64);

impl fmt::Display for OwnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "user:{}", self.0)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BattleKind {
    Pvp,
    Trainer,
    Gym,
}

impl fmt::Display for BattleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let display_name = match self {
            BattleKind::Pvp => "PvP",
            BattleKind::Trainer => "Trainer",
            BattleKind::Gym => "Gym",
        };
        write!(f, "{}", display_name)
    }
}

/// The eight Kanto gyms in the order they must be defeated.
#[derive(
    Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, EnumIter, EnumString,
)]
#[strum(ascii_case_insensitive)]
pub enum Gym {
    Pewter,
    Cerulean,
    Vermilion,
    Celadon,
    Fuchsia,
    Saffron,
    Cinnabar,
    Viridian,
}

impl Gym {
    pub const ALL: [Gym; 8] = [
        Gym::Pewter,
        Gym::Cerulean,
        Gym::Vermilion,
        Gym::Celadon,
        Gym::Fuchsia,
        Gym::Saffron,
        Gym::Cinnabar,
        Gym::Viridian,
    ];

    /// Zero-based position in the progression.
    pub fn order(self) -> usize {
        self as usize
    }

    pub fn from_order(index: usize) -> Option<Gym> {
        Self::ALL.get(index).copied()
    }

    pub fn specialty(self) -> PokemonType {
        match self {
            Gym::Pewter => PokemonType::Rock,
            Gym::Cerulean => PokemonType::Water,
            Gym::Vermilion => PokemonType::Electric,
            Gym::Celadon => PokemonType::Grass,
            Gym::Fuchsia => PokemonType::Poison,
            Gym::Saffron => PokemonType::Psychic,
            Gym::Cinnabar => PokemonType::Fire,
            Gym::Viridian => PokemonType::Ground,
        }
    }

    pub fn badge(self) -> &'static str {
        match self {
            Gym::Pewter => "Boulder Badge",
            Gym::Cerulean => "Cascade Badge",
            Gym::Vermilion => "Thunder Badge",
            Gym::Celadon => "Rainbow Badge",
            Gym::Fuchsia => "Soul Badge",
            Gym::Saffron => "Marsh Badge",
            Gym::Cinnabar => "Volcano Badge",
            Gym::Viridian => "Earth Badge",
        }
    }
}

impl fmt::Display for Gym {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let display_name = match self {
            Gym::Pewter => "Pewter City Gym",
            Gym::Cerulean => "Cerulean City Gym",
            Gym::Vermilion => "Vermilion City Gym",
            Gym::Celadon => "Celadon City Gym",
            Gym::Fuchsia => "Fuchsia City Gym",
            Gym::Saffron => "Saffron City Gym",
            Gym::Cinnabar => "Cinnabar Island Gym",
            Gym::Viridian => "Viridian City Gym",
        };
        write!(f, "{}", display_name)
    }
}
