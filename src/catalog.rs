//! Read-only species metadata.
//!
//! The engine only needs a handful of facts about a species: its types, its
//! move list, its rarity tier and its base HP. `CatalogProvider` is the seam
//! the surrounding system plugs its cached data into; `StaticCatalog` ships a
//! built-in Kanto dataset used by the demo binary and the tests.

use crate::errors::{CatalogError, CatalogResult, ConfigError};
use schema::{MoveData, PokemonType, RarityTier, SpeciesData, SpeciesId};
use log::warn;
use std::collections::BTreeMap;

pub trait CatalogProvider: Send + Sync {
    fn species_data(&self, species: SpeciesId) -> Option<&SpeciesData>;

    /// Every species of the given tier, in pokedex order.
    fn species_pool(&self, tier: RarityTier) -> Vec<SpeciesId>;

    fn get_move_set(&self, species: SpeciesId) -> CatalogResult<Vec<MoveData>> {
        let data = self
            .species_data(species)
            .ok_or(CatalogError::SpeciesNotFound(species))?;
        if data.moves.is_empty() {
            return Err(CatalogError::DataIncomplete {
                species,
                details: "empty move list".to_string(),
            });
        }
        Ok(data.moves.clone())
    }

    fn get_types(&self, species: SpeciesId) -> CatalogResult<Vec<PokemonType>> {
        let data = self
            .species_data(species)
            .ok_or(CatalogError::SpeciesNotFound(species))?;
        if data.types.is_empty() {
            return Err(CatalogError::DataIncomplete {
                species,
                details: "no types".to_string(),
            });
        }
        Ok(data.types.clone())
    }

    fn get_rarity_tier(&self, species: SpeciesId) -> CatalogResult<RarityTier> {
        self.species_data(species)
            .map(|data| data.rarity)
            .ok_or(CatalogError::SpeciesNotFound(species))
    }

    fn get_base_hp(&self, species: SpeciesId) -> CatalogResult<u16> {
        match self.species_data(species) {
            Some(data) if data.base_hp > 0 => Ok(data.base_hp),
            Some(_) => Err(CatalogError::DataIncomplete {
                species,
                details: "base HP of zero".to_string(),
            }),
            None => Err(CatalogError::SpeciesNotFound(species)),
        }
    }

    fn species_name(&self, species: SpeciesId) -> String {
        self.species_data(species)
            .map(|data| data.name.clone())
            .unwrap_or_else(|| species.to_string())
    }
}

#[derive(Debug, Clone, Default)]
pub struct StaticCatalog {
    species: BTreeMap<SpeciesId, SpeciesData>,
}

impl StaticCatalog {
    pub fn from_species(entries: Vec<SpeciesData>) -> Self {
        let species = entries.into_iter().map(|data| (data.id(), data)).collect();
        Self { species }
    }

    /// Load a catalog from a RON list of `SpeciesData`.
    pub fn from_ron_str(source: &str) -> Result<Self, ConfigError> {
        let entries: Vec<SpeciesData> =
            ron::from_str(source).map_err(|e| ConfigError::Parse(e.to_string()))?;
        Ok(Self::from_species(entries))
    }

    /// The built-in Kanto dataset.
    pub fn kanto() -> Self {
        let entries = KANTO_SPECIES
            .iter()
            .map(|(number, name, types, base_hp, moves, rarity)| SpeciesData {
                pokedex_number: *number,
                name: name.to_string(),
                types: types.to_vec(),
                rarity: *rarity,
                base_hp: *base_hp,
                moves: moves.iter().map(|m| move_by_name(m)).collect(),
            })
            .collect();
        Self::from_species(entries)
    }

    pub fn len(&self) -> usize {
        self.species.len()
    }

    pub fn is_empty(&self) -> bool {
        self.species.is_empty()
    }
}

impl CatalogProvider for StaticCatalog {
    fn species_data(&self, species: SpeciesId) -> Option<&SpeciesData> {
        self.species.get(&species)
    }

    fn species_pool(&self, tier: RarityTier) -> Vec<SpeciesId> {
        self.species
            .values()
            .filter(|data| data.rarity == tier)
            .map(|data| data.id())
            .collect()
    }
}

/// Look up a move from the built-in move table. Unknown names become Struggle.
pub fn move_by_name(name: &str) -> MoveData {
    match MOVES
        .iter()
        .find(|(move_name, _, _)| move_name.eq_ignore_ascii_case(name))
    {
        Some((move_name, move_type, power)) => MoveData::new(move_name, *move_type, *power),
        None => {
            warn!("Unknown move '{}', using Struggle", name);
            MoveData::struggle()
        }
    }
}

use PokemonType::*;

const MOVES: &[(&str, PokemonType, u16)] = &[
    ("Tackle", Normal, 40),
    ("Scratch", Normal, 40),
    ("Pound", Normal, 40),
    ("Quick Attack", Normal, 40),
    ("Headbutt", Normal, 70),
    ("Slash", Normal, 70),
    ("Swift", Normal, 60),
    ("Slam", Normal, 80),
    ("Hyper Fang", Normal, 80),
    ("Body Slam", Normal, 85),
    ("Take Down", Normal, 90),
    ("Hyper Beam", Normal, 150),
    ("Splash", Normal, 0),
    ("Ember", Fire, 40),
    ("Flamethrower", Fire, 90),
    ("Fire Blast", Fire, 110),
    ("Bubble", Water, 40),
    ("Water Gun", Water, 40),
    ("Bubble Beam", Water, 65),
    ("Surf", Water, 90),
    ("Hydro Pump", Water, 110),
    ("Absorb", Grass, 20),
    ("Mega Drain", Grass, 40),
    ("Vine Whip", Grass, 45),
    ("Razor Leaf", Grass, 55),
    ("Petal Dance", Grass, 120),
    ("Thunder Shock", Electric, 40),
    ("Spark", Electric, 65),
    ("Thunderbolt", Electric, 90),
    ("Thunder", Electric, 110),
    ("Aurora Beam", Ice, 65),
    ("Ice Beam", Ice, 90),
    ("Blizzard", Ice, 110),
    ("Double Kick", Fighting, 30),
    ("Karate Chop", Fighting, 50),
    ("Low Kick", Fighting, 65),
    ("Submission", Fighting, 80),
    ("Poison Sting", Poison, 15),
    ("Smog", Poison, 30),
    ("Acid", Poison, 40),
    ("Sludge", Poison, 65),
    ("Sludge Bomb", Poison, 90),
    ("Bone Club", Ground, 65),
    ("Dig", Ground, 80),
    ("Earthquake", Ground, 100),
    ("Peck", Flying, 35),
    ("Gust", Flying, 40),
    ("Wing Attack", Flying, 60),
    ("Drill Peck", Flying, 80),
    ("Confusion", Psychic, 50),
    ("Psybeam", Psychic, 65),
    ("Psychic", Psychic, 90),
    ("Bug Bite", Bug, 60),
    ("Signal Beam", Bug, 75),
    ("Rock Throw", Rock, 50),
    ("Rock Slide", Rock, 75),
    ("Lick", Ghost, 30),
    ("Shadow Ball", Ghost, 80),
    ("Twister", Dragon, 40),
    ("Dragon Breath", Dragon, 60),
    ("Outrage", Dragon, 120),
    ("Bite", Dark, 60),
    ("Crunch", Dark, 80),
    ("Metal Claw", Steel, 50),
    ("Disarming Voice", Fairy, 40),
    ("Moonblast", Fairy, 95),
];

const STD: RarityTier = RarityTier::Standard;
const LEG: RarityTier = RarityTier::Legendary;

type SpeciesRow = (
    u16,
    &'static str,
    &'static [PokemonType],
    u16,
    &'static [&'static str],
    RarityTier,
);

const KANTO_SPECIES: &[SpeciesRow] = &[
    (1, "Bulbasaur", &[Grass, Poison], 45, &["Tackle", "Vine Whip", "Razor Leaf"], STD),
    (3, "Venusaur", &[Grass, Poison], 80, &["Razor Leaf", "Sludge Bomb", "Petal Dance"], STD),
    (4, "Charmander", &[Fire], 39, &["Scratch", "Ember", "Flamethrower"], STD),
    (6, "Charizard", &[Fire, Flying], 78, &["Flamethrower", "Wing Attack", "Slash"], STD),
    (7, "Squirtle", &[Water], 44, &["Tackle", "Water Gun", "Bubble Beam"], STD),
    (9, "Blastoise", &[Water], 79, &["Surf", "Bite", "Hydro Pump"], STD),
    (10, "Caterpie", &[Bug], 45, &["Tackle", "Bug Bite"], STD),
    (11, "Metapod", &[Bug], 50, &["Tackle", "Bug Bite"], STD),
    (13, "Weedle", &[Bug, Poison], 40, &["Poison Sting", "Bug Bite"], STD),
    (14, "Kakuna", &[Bug, Poison], 45, &["Poison Sting", "Bug Bite"], STD),
    (16, "Pidgey", &[Normal, Flying], 40, &["Tackle", "Gust", "Quick Attack"], STD),
    (19, "Rattata", &[Normal], 30, &["Tackle", "Quick Attack", "Hyper Fang"], STD),
    (20, "Raticate", &[Normal], 55, &["Quick Attack", "Hyper Fang", "Crunch"], STD),
    (21, "Spearow", &[Normal, Flying], 40, &["Peck", "Quick Attack", "Drill Peck"], STD),
    (25, "Pikachu", &[Electric], 35, &["Quick Attack", "Thunder Shock", "Thunderbolt"], STD),
    (26, "Raichu", &[Electric], 60, &["Thunderbolt", "Thunder", "Slam"], STD),
    (27, "Sandshrew", &[Ground], 50, &["Scratch", "Dig"], STD),
    (28, "Sandslash", &[Ground], 75, &["Slash", "Dig", "Earthquake"], STD),
    (31, "Nidoqueen", &[Poison, Ground], 90, &["Body Slam", "Earthquake", "Sludge Bomb"], STD),
    (34, "Nidoking", &[Poison, Ground], 81, &["Double Kick", "Earthquake", "Sludge Bomb"], STD),
    (35, "Clefairy", &[Fairy], 70, &["Pound", "Disarming Voice", "Moonblast"], STD),
    (39, "Jigglypuff", &[Normal, Fairy], 115, &["Pound", "Body Slam", "Disarming Voice"], STD),
    (40, "Wigglytuff", &[Normal, Fairy], 140, &["Body Slam", "Disarming Voice", "Moonblast"], STD),
    (43, "Oddish", &[Grass, Poison], 45, &["Absorb", "Acid"], STD),
    (44, "Gloom", &[Grass, Poison], 60, &["Acid", "Mega Drain", "Sludge"], STD),
    (45, "Vileplume", &[Grass, Poison], 75, &["Petal Dance", "Sludge Bomb", "Mega Drain"], STD),
    (46, "Paras", &[Bug, Grass], 35, &["Scratch", "Absorb", "Bug Bite"], STD),
    (48, "Venonat", &[Bug, Poison], 60, &["Tackle", "Confusion", "Signal Beam"], STD),
    (49, "Venomoth", &[Bug, Poison], 70, &["Psybeam", "Signal Beam", "Sludge"], STD),
    (51, "Dugtrio", &[Ground], 35, &["Dig", "Earthquake", "Slash"], STD),
    (52, "Meowth", &[Normal], 40, &["Scratch", "Bite"], STD),
    (54, "Psyduck", &[Water], 50, &["Scratch", "Water Gun", "Confusion"], STD),
    (55, "Golduck", &[Water], 80, &["Surf", "Confusion", "Psychic"], STD),
    (58, "Growlithe", &[Fire], 55, &["Bite", "Ember", "Flamethrower"], STD),
    (59, "Arcanine", &[Fire], 90, &["Flamethrower", "Crunch", "Take Down"], STD),
    (60, "Poliwag", &[Water], 40, &["Bubble", "Water Gun"], STD),
    (62, "Poliwrath", &[Water, Fighting], 90, &["Surf", "Submission", "Body Slam"], STD),
    (63, "Abra", &[Psychic], 25, &["Confusion"], STD),
    (64, "Kadabra", &[Psychic], 40, &["Confusion", "Psybeam", "Psychic"], STD),
    (65, "Alakazam", &[Psychic], 55, &["Psybeam", "Psychic", "Shadow Ball"], STD),
    (66, "Machop", &[Fighting], 70, &["Karate Chop", "Low Kick"], STD),
    (68, "Machamp", &[Fighting], 90, &["Submission", "Karate Chop", "Earthquake"], STD),
    (69, "Bellsprout", &[Grass, Poison], 50, &["Vine Whip", "Acid"], STD),
    (70, "Weepinbell", &[Grass, Poison], 65, &["Razor Leaf", "Acid", "Slam"], STD),
    (71, "Victreebel", &[Grass, Poison], 80, &["Razor Leaf", "Sludge Bomb", "Slam"], STD),
    (72, "Tentacool", &[Water, Poison], 40, &["Poison Sting", "Water Gun", "Bubble Beam"], STD),
    (74, "Geodude", &[Rock, Ground], 40, &["Tackle", "Rock Throw", "Dig"], STD),
    (75, "Graveler", &[Rock, Ground], 55, &["Rock Throw", "Rock Slide", "Earthquake"], STD),
    (77, "Ponyta", &[Fire], 50, &["Tackle", "Ember", "Take Down"], STD),
    (78, "Rapidash", &[Fire], 65, &["Flamethrower", "Take Down", "Fire Blast"], STD),
    (81, "Magnemite", &[Electric, Steel], 25, &["Thunder Shock", "Spark", "Metal Claw"], STD),
    (82, "Magneton", &[Electric, Steel], 50, &["Thunderbolt", "Spark", "Metal Claw"], STD),
    (88, "Grimer", &[Poison], 80, &["Pound", "Sludge"], STD),
    (89, "Muk", &[Poison], 105, &["Sludge", "Sludge Bomb", "Body Slam"], STD),
    (92, "Gastly", &[Ghost, Poison], 30, &["Lick", "Sludge"], STD),
    (93, "Haunter", &[Ghost, Poison], 45, &["Lick", "Shadow Ball", "Sludge Bomb"], STD),
    (95, "Onix", &[Rock, Ground], 35, &["Tackle", "Rock Throw", "Rock Slide"], STD),
    (96, "Drowzee", &[Psychic], 60, &["Pound", "Confusion", "Headbutt"], STD),
    (97, "Hypno", &[Psychic], 85, &["Psychic", "Headbutt", "Psybeam"], STD),
    (98, "Krabby", &[Water], 30, &["Bubble", "Bubble Beam", "Metal Claw"], STD),
    (100, "Voltorb", &[Electric], 40, &["Tackle", "Spark", "Thunderbolt"], STD),
    (104, "Cubone", &[Ground], 50, &["Bone Club", "Headbutt"], STD),
    (109, "Koffing", &[Poison], 40, &["Tackle", "Smog", "Sludge"], STD),
    (110, "Weezing", &[Poison], 65, &["Sludge", "Sludge Bomb", "Take Down"], STD),
    (111, "Rhyhorn", &[Ground, Rock], 80, &["Rock Slide", "Take Down", "Dig"], STD),
    (112, "Rhydon", &[Ground, Rock], 105, &["Rock Slide", "Earthquake", "Body Slam"], STD),
    (114, "Tangela", &[Grass], 65, &["Vine Whip", "Mega Drain", "Slam"], STD),
    (116, "Horsea", &[Water], 30, &["Bubble", "Water Gun", "Twister"], STD),
    (118, "Goldeen", &[Water], 45, &["Peck", "Water Gun", "Headbutt"], STD),
    (120, "Staryu", &[Water], 30, &["Tackle", "Water Gun", "Swift"], STD),
    (121, "Starmie", &[Water, Psychic], 60, &["Surf", "Psychic", "Swift"], STD),
    (122, "Mr. Mime", &[Psychic, Fairy], 40, &["Confusion", "Psybeam", "Psychic"], STD),
    (129, "Magikarp", &[Water], 20, &["Splash", "Tackle"], STD),
    (130, "Gyarados", &[Water, Flying], 95, &["Bite", "Hydro Pump", "Twister"], STD),
    (133, "Eevee", &[Normal], 55, &["Tackle", "Quick Attack", "Bite"], STD),
    (143, "Snorlax", &[Normal], 160, &["Headbutt", "Body Slam", "Crunch"], STD),
    (144, "Articuno", &[Ice, Flying], 90, &["Ice Beam", "Blizzard", "Gust"], LEG),
    (145, "Zapdos", &[Electric, Flying], 90, &["Thunderbolt", "Thunder", "Drill Peck"], LEG),
    (146, "Moltres", &[Fire, Flying], 90, &["Flamethrower", "Fire Blast", "Wing Attack"], LEG),
    (147, "Dratini", &[Dragon], 41, &["Twister", "Slam"], STD),
    (148, "Dragonair", &[Dragon], 61, &["Twister", "Dragon Breath", "Slam"], STD),
    (149, "Dragonite", &[Dragon, Flying], 91, &["Outrage", "Wing Attack", "Hyper Beam"], STD),
    (150, "Mewtwo", &[Psychic], 106, &["Psychic", "Shadow Ball", "Ice Beam"], LEG),
    (151, "Mew", &[Psychic], 100, &["Psychic", "Pound", "Ice Beam"], LEG),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_listed_move_exists() {
        for (_, name, _, _, moves, _) in KANTO_SPECIES {
            for move_name in moves.iter() {
                assert_ne!(
                    move_by_name(move_name).name,
                    "Struggle",
                    "{name} lists unknown move {move_name}"
                );
            }
        }
    }

    #[test]
    fn test_unknown_move_falls_back_to_struggle() {
        assert_eq!(move_by_name("thunderbolt").name, "Thunderbolt");
        assert_eq!(move_by_name("Splash Dance"), MoveData::struggle());
    }

    #[test]
    fn test_legendary_pool_matches_the_five_birds_and_psychics() {
        let catalog = StaticCatalog::kanto();
        let legendaries = catalog.species_pool(RarityTier::Legendary);
        assert_eq!(
            legendaries,
            vec![SpeciesId(144), SpeciesId(145), SpeciesId(146), SpeciesId(150), SpeciesId(151)]
        );
        assert!(!catalog.species_pool(RarityTier::Standard).contains(&SpeciesId(150)));
    }

    #[test]
    fn test_lookups_and_missing_species() {
        let catalog = StaticCatalog::kanto();
        let pikachu = SpeciesId(25);
        assert_eq!(catalog.get_types(pikachu), Ok(vec![Electric]));
        assert_eq!(catalog.get_rarity_tier(pikachu), Ok(RarityTier::Standard));
        assert_eq!(catalog.get_base_hp(pikachu), Ok(35));
        assert_eq!(catalog.species_name(pikachu), "Pikachu");
        assert_eq!(catalog.get_move_set(pikachu).map(|m| m.len()), Ok(3));

        let missing = SpeciesId(999);
        assert_eq!(catalog.get_types(missing), Err(CatalogError::SpeciesNotFound(missing)));
        assert_eq!(catalog.species_name(missing), "#999");
    }

    #[test]
    fn test_incomplete_entries_are_reported() {
        let catalog = StaticCatalog::from_species(vec![SpeciesData {
            pokedex_number: 500,
            name: "Glitch".to_string(),
            types: vec![],
            rarity: RarityTier::Standard,
            base_hp: 0,
            moves: vec![],
        }]);
        let glitch = SpeciesId(500);
        assert!(matches!(catalog.get_types(glitch), Err(CatalogError::DataIncomplete { .. })));
        assert!(matches!(catalog.get_move_set(glitch), Err(CatalogError::DataIncomplete { .. })));
        assert!(matches!(catalog.get_base_hp(glitch), Err(CatalogError::DataIncomplete { .. })));
    }

    #[test]
    fn test_catalog_from_ron() {
        let catalog = StaticCatalog::from_ron_str(
            r#"[(
                pokedex_number: 25,
                name: "Pikachu",
                types: [Electric],
                rarity: Standard,
                base_hp: 35,
                moves: [(name: "Thunder Shock", move_type: Electric, power: 40)],
            )]"#,
        )
        .expect("catalog should parse");
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.get_move_set(SpeciesId(25)).map(|m| m[0].power), Ok(40));
    }
}
