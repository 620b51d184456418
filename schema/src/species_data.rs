use crate::PokemonType;
use serde::{Deserialize, Serialize};
use std::fmt;

/// National pokedex number. Creatures and species stats refer to a species
/// only through this key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SpeciesId(pub u16);

impl fmt::Display for SpeciesId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:03}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum RarityTier {
    #[default]
    Standard,
    Legendary,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveData {
    pub name: String,
    pub move_type: PokemonType,
    pub power: u16,
}

impl MoveData {
    pub fn new(name: &str, move_type: PokemonType, power: u16) -> Self {
        Self {
            name: name.to_string(),
            move_type,
            power,
        }
    }

    /// Every species can fall back to this when its move list is missing.
    pub fn struggle() -> Self {
        Self::new("Struggle", PokemonType::Typeless, 50)
    }
}

impl fmt::Display for MoveData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}, {})", self.name, self.move_type, self.power)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpeciesData {
    pub pokedex_number: u16,
    pub name: String,
    pub types: Vec<PokemonType>,
    pub rarity: RarityTier,
    pub base_hp: u16,
    pub moves: Vec<MoveData>,
}

impl SpeciesData {
    pub fn id(&self) -> SpeciesId {
        SpeciesId(self.pokedex_number)
    }

    pub fn is_legendary(&self) -> bool {
        self.rarity == RarityTier::Legendary
    }
}
