use serde::{Deserialize, Serialize};
use std::fmt;
use strum::{EnumIter, EnumString};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Hash, EnumIter, EnumString,
)]
#[strum(ascii_case_insensitive)]
pub enum PokemonType {
    Normal,
    Fighting,
    Flying,
    Poison,
    Ground,
    Rock,
    Bug,
    Ghost,
    Steel,
    Fire,
    Water,
    Grass,
    Electric,
    Psychic,
    Ice,
    Dragon,
    Dark,
    Fairy,
    /// Placeholder for types the catalog could not resolve. Neutral against everything.
    Typeless,
}

impl fmt::Display for PokemonType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// An exact type multiplier, stored in quarter steps so dual-type products
/// (0, 1/4, 1/2, 1, 2, 4) never pick up floating point error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Effectiveness(u8);

impl Effectiveness {
    pub const IMMUNE: Effectiveness = Effectiveness(0);
    pub const QUARTER: Effectiveness = Effectiveness(1);
    pub const HALF: Effectiveness = Effectiveness(2);
    pub const NEUTRAL: Effectiveness = Effectiveness(4);
    pub const DOUBLE: Effectiveness = Effectiveness(8);
    pub const QUADRUPLE: Effectiveness = Effectiveness(16);

    pub const fn quarters(self) -> u8 {
        self.0
    }

    pub fn as_f64(self) -> f64 {
        self.0 as f64 / 4.0
    }

    /// Multiply two multipliers together, staying in quarter steps.
    pub fn combine(self, other: Effectiveness) -> Effectiveness {
        let product = (self.0 as u16 * other.0 as u16) / 4;
        Effectiveness(product.min(u8::MAX as u16) as u8)
    }

    pub fn tier(self) -> EffectivenessTier {
        match self.0 {
            0 => EffectivenessTier::Immune,
            1..=3 => EffectivenessTier::NotVeryEffective,
            4 => EffectivenessTier::Neutral,
            _ => EffectivenessTier::SuperEffective,
        }
    }

    pub fn is_immune(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for Effectiveness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            1 => write!(f, "x1/4"),
            2 => write!(f, "x1/2"),
            q => write!(f, "x{}", q / 4),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EffectivenessTier {
    Immune,
    NotVeryEffective,
    Neutral,
    SuperEffective,
}

impl PokemonType {
    /// Type effectiveness multiplier for an attacking type against a single defending type.
    /// Returns DOUBLE = Super Effective, NEUTRAL = Normal, HALF = Not Very Effective, IMMUNE = No Effect
    pub fn type_effectiveness(attacking: PokemonType, defending: PokemonType) -> Effectiveness {
        use PokemonType::*;

        const IMMUNE: Effectiveness = Effectiveness::IMMUNE;
        const HALF: Effectiveness = Effectiveness::HALF;
        const DOUBLE: Effectiveness = Effectiveness::DOUBLE;
        const NEUTRAL: Effectiveness = Effectiveness::NEUTRAL;

        match (attacking, defending) {
            (Typeless, _) | (_, Typeless) => NEUTRAL,

            // Normal
            (Normal, Ghost) => IMMUNE,
            (Normal, Rock) | (Normal, Steel) => HALF,
            (Normal, _) => NEUTRAL,

            // Fire
            (Fire, Fire) | (Fire, Water) | (Fire, Rock) | (Fire, Dragon) => HALF,
            (Fire, Grass) | (Fire, Ice) | (Fire, Bug) | (Fire, Steel) => DOUBLE,
            (Fire, _) => NEUTRAL,

            // Water
            (Water, Water) | (Water, Grass) | (Water, Dragon) => HALF,
            (Water, Fire) | (Water, Ground) | (Water, Rock) => DOUBLE,
            (Water, _) => NEUTRAL,

            // Electric
            (Electric, Electric) | (Electric, Grass) | (Electric, Dragon) => HALF,
            (Electric, Ground) => IMMUNE,
            (Electric, Water) | (Electric, Flying) => DOUBLE,
            (Electric, _) => NEUTRAL,

            // Grass
            (Grass, Fire)
            | (Grass, Grass)
            | (Grass, Poison)
            | (Grass, Flying)
            | (Grass, Bug)
            | (Grass, Dragon)
            | (Grass, Steel) => HALF,
            (Grass, Water) | (Grass, Ground) | (Grass, Rock) => DOUBLE,
            (Grass, _) => NEUTRAL,

            // Ice
            (Ice, Fire) | (Ice, Water) | (Ice, Ice) | (Ice, Steel) => HALF,
            (Ice, Grass) | (Ice, Ground) | (Ice, Flying) | (Ice, Dragon) => DOUBLE,
            (Ice, _) => NEUTRAL,

            // Fighting
            (Fighting, Poison)
            | (Fighting, Flying)
            | (Fighting, Psychic)
            | (Fighting, Bug)
            | (Fighting, Fairy) => HALF,
            (Fighting, Ghost) => IMMUNE,
            (Fighting, Normal)
            | (Fighting, Ice)
            | (Fighting, Rock)
            | (Fighting, Dark)
            | (Fighting, Steel) => DOUBLE,
            (Fighting, _) => NEUTRAL,

            // Poison
            (Poison, Poison) | (Poison, Ground) | (Poison, Rock) | (Poison, Ghost) => HALF,
            (Poison, Steel) => IMMUNE,
            (Poison, Grass) | (Poison, Fairy) => DOUBLE,
            (Poison, _) => NEUTRAL,

            // Ground
            (Ground, Grass) | (Ground, Bug) => HALF,
            (Ground, Flying) => IMMUNE,
            (Ground, Fire)
            | (Ground, Electric)
            | (Ground, Poison)
            | (Ground, Rock)
            | (Ground, Steel) => DOUBLE,
            (Ground, _) => NEUTRAL,

            // Flying
            (Flying, Electric) | (Flying, Rock) | (Flying, Steel) => HALF,
            (Flying, Grass) | (Flying, Fighting) | (Flying, Bug) => DOUBLE,
            (Flying, _) => NEUTRAL,

            // Psychic
            (Psychic, Psychic) | (Psychic, Steel) => HALF,
            (Psychic, Dark) => IMMUNE,
            (Psychic, Fighting) | (Psychic, Poison) => DOUBLE,
            (Psychic, _) => NEUTRAL,

            // Bug
            (Bug, Fire)
            | (Bug, Fighting)
            | (Bug, Poison)
            | (Bug, Flying)
            | (Bug, Ghost)
            | (Bug, Steel)
            | (Bug, Fairy) => HALF,
            (Bug, Grass) | (Bug, Psychic) | (Bug, Dark) => DOUBLE,
            (Bug, _) => NEUTRAL,

            // Rock
            (Rock, Fighting) | (Rock, Ground) | (Rock, Steel) => HALF,
            (Rock, Fire) | (Rock, Ice) | (Rock, Flying) | (Rock, Bug) => DOUBLE,
            (Rock, _) => NEUTRAL,

            // Ghost
            (Ghost, Normal) => IMMUNE,
            (Ghost, Dark) => HALF,
            (Ghost, Psychic) | (Ghost, Ghost) => DOUBLE,
            (Ghost, _) => NEUTRAL,

            // Dragon
            (Dragon, Steel) => HALF,
            (Dragon, Fairy) => IMMUNE,
            (Dragon, Dragon) => DOUBLE,
            (Dragon, _) => NEUTRAL,

            // Dark
            (Dark, Fighting) | (Dark, Dark) | (Dark, Fairy) => HALF,
            (Dark, Psychic) | (Dark, Ghost) => DOUBLE,
            (Dark, _) => NEUTRAL,

            // Steel
            (Steel, Fire) | (Steel, Water) | (Steel, Electric) | (Steel, Steel) => HALF,
            (Steel, Ice) | (Steel, Rock) | (Steel, Fairy) => DOUBLE,
            (Steel, _) => NEUTRAL,

            // Fairy
            (Fairy, Fire) | (Fairy, Poison) | (Fairy, Steel) => HALF,
            (Fairy, Fighting) | (Fairy, Dragon) | (Fairy, Dark) => DOUBLE,
            (Fairy, _) => NEUTRAL,
        }
    }

    /// Multiplier of an attack against a defender with one or two types.
    ///
    /// Repeated defender types are only counted once, so `[Fire, Fire]`
    /// behaves like a pure Fire defender.
    pub fn multiplier(attacking: PokemonType, defending: &[PokemonType]) -> Effectiveness {
        let mut result = Effectiveness::NEUTRAL;
        for (i, defender_type) in defending.iter().enumerate() {
            if defending[..i].contains(defender_type) {
                continue;
            }
            result = result.combine(Self::type_effectiveness(attacking, *defender_type));
        }
        result
    }

    pub fn is_immune(attacking: PokemonType, defending: PokemonType) -> bool {
        Self::type_effectiveness(attacking, defending).is_immune()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_single_type_matchups() {
        use PokemonType::*;
        assert_eq!(PokemonType::type_effectiveness(Water, Fire), Effectiveness::DOUBLE);
        assert_eq!(PokemonType::type_effectiveness(Fire, Water), Effectiveness::HALF);
        assert_eq!(PokemonType::type_effectiveness(Electric, Ground), Effectiveness::IMMUNE);
        assert_eq!(PokemonType::type_effectiveness(Normal, Normal), Effectiveness::NEUTRAL);
        assert!(PokemonType::is_immune(Ghost, Normal));
    }

    #[test]
    fn test_dual_type_products() {
        use PokemonType::*;
        // Geodude line: Rock/Ground takes 4x from Water and Grass
        assert_eq!(PokemonType::multiplier(Water, &[Rock, Ground]), Effectiveness::QUADRUPLE);
        assert_eq!(PokemonType::multiplier(Grass, &[Rock, Ground]), Effectiveness::QUADRUPLE);
        // Fire into Fire/Dragon is 1/4
        assert_eq!(PokemonType::multiplier(Fire, &[Fire, Dragon]), Effectiveness::QUARTER);
        // An immunity on either type zeroes the whole product
        assert_eq!(PokemonType::multiplier(Electric, &[Water, Ground]), Effectiveness::IMMUNE);
        // Super effective against one type, resisted by the other
        assert_eq!(PokemonType::multiplier(Ice, &[Dragon, Steel]), Effectiveness::NEUTRAL);
    }

    #[test]
    fn test_every_pair_lands_in_the_allowed_set() {
        let allowed = [0u8, 1, 2, 4, 8, 16];
        for attacking in PokemonType::iter() {
            for first in PokemonType::iter() {
                let single = PokemonType::multiplier(attacking, &[first]);
                assert!(allowed.contains(&single.quarters()));
                for second in PokemonType::iter() {
                    let dual = PokemonType::multiplier(attacking, &[first, second]);
                    assert!(
                        allowed.contains(&dual.quarters()),
                        "{attacking} vs {first}/{second} gave {dual}"
                    );
                }
            }
        }
    }

    #[test]
    fn test_duplicate_defender_types_count_once() {
        use PokemonType::*;
        assert_eq!(
            PokemonType::multiplier(Water, &[Fire, Fire]),
            PokemonType::multiplier(Water, &[Fire])
        );
    }

    #[test]
    fn test_typeless_is_neutral() {
        for other in PokemonType::iter() {
            assert_eq!(
                PokemonType::type_effectiveness(PokemonType::Typeless, other),
                Effectiveness::NEUTRAL
            );
        }
    }

    #[test]
    fn test_tiers_and_parsing() {
        assert_eq!(Effectiveness::IMMUNE.tier(), EffectivenessTier::Immune);
        assert_eq!(Effectiveness::QUARTER.tier(), EffectivenessTier::NotVeryEffective);
        assert_eq!(Effectiveness::NEUTRAL.tier(), EffectivenessTier::Neutral);
        assert_eq!(Effectiveness::QUADRUPLE.tier(), EffectivenessTier::SuperEffective);
        assert_eq!("fire".parse::<PokemonType>(), Ok(PokemonType::Fire));
        assert_eq!("PSYCHIC".parse::<PokemonType>(), Ok(PokemonType::Psychic));
        assert!("sound".parse::<PokemonType>().is_err());
    }
}
