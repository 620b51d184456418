use crate::config::DamageTuning;
use crate::rng::RngSource;
use log::debug;
use schema::{Effectiveness, EffectivenessTier, MoveData, PokemonType};
use serde::{Deserialize, Serialize};

/// Result of one resolved attack.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttackOutcome {
    pub damage: u16,
    pub is_critical: bool,
    pub effectiveness: Effectiveness,
    pub tier: EffectivenessTier,
}

pub struct DamageCalculator<'a> {
    tuning: &'a DamageTuning,
}

impl<'a> DamageCalculator<'a> {
    pub fn new(tuning: &'a DamageTuning) -> Self {
        Self { tuning }
    }

    /// Resolve one attack.
    ///
    /// The type multiplier is looked up first; an immune defender takes no
    /// damage and no randomness is consumed. Otherwise exactly two draws are
    /// made, in order: the critical-hit roll, then the damage variance.
    pub fn resolve(
        &self,
        attacker_level: u32,
        attacker_types: &[PokemonType],
        move_data: &MoveData,
        defender_types: &[PokemonType],
        rng: &mut dyn RngSource,
    ) -> AttackOutcome {
        let effectiveness = PokemonType::multiplier(move_data.move_type, defender_types);
        if effectiveness.is_immune() {
            debug!("{} had no effect", move_data.name);
            return AttackOutcome {
                damage: 0,
                is_critical: false,
                effectiveness,
                tier: EffectivenessTier::Immune,
            };
        }

        let is_critical = rng.chance(self.tuning.critical_chance, "critical hit");
        let variance = rng.uniform(self.tuning.variance_min, self.tuning.variance_max, "damage variance");

        let mut damage = self.tuning.base_damage(move_data.power, attacker_level);
        if is_critical {
            damage *= self.tuning.critical_multiplier;
        }
        damage *= self.stab(move_data, attacker_types);
        damage *= effectiveness.as_f64();
        damage *= variance;

        let damage = (damage.floor() as u16).max(1);
        debug!(
            "{} dealt {} damage (critical: {}, effectiveness: {})",
            move_data.name, damage, is_critical, effectiveness
        );
        AttackOutcome {
            damage,
            is_critical,
            effectiveness,
            tier: effectiveness.tier(),
        }
    }

    /// Mean damage of a non-critical hit. Consumes no randomness.
    pub fn expected_damage(
        &self,
        attacker_level: u32,
        attacker_types: &[PokemonType],
        move_data: &MoveData,
        defender_types: &[PokemonType],
    ) -> f64 {
        let effectiveness = PokemonType::multiplier(move_data.move_type, defender_types);
        let mean_variance = (self.tuning.variance_min + self.tuning.variance_max) / 2.0;
        self.tuning.base_damage(move_data.power, attacker_level)
            * self.stab(move_data, attacker_types)
            * effectiveness.as_f64()
            * mean_variance
    }

    fn stab(&self, move_data: &MoveData, attacker_types: &[PokemonType]) -> f64 {
        if attacker_types.contains(&move_data.move_type) {
            self.tuning.stab_multiplier
        } else {
            1.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::{ScriptedRng, SeededRng};
    use PokemonType::*;

    fn thunderbolt() -> MoveData {
        MoveData::new("Thunderbolt", Electric, 90)
    }

    #[test]
    fn test_super_effective_stab_hit() {
        let tuning = DamageTuning::default();
        let calculator = DamageCalculator::new(&tuning);
        // 90 * 2 * 0.4 = 72, STAB 108, x2 = 216, x0.85 = 183.6
        let mut rng = ScriptedRng::new(vec![0.99, 0.0]);
        let outcome = calculator.resolve(50, &[Electric], &thunderbolt(), &[Water], &mut rng);
        assert_eq!(outcome.damage, 183);
        assert!(!outcome.is_critical);
        assert_eq!(outcome.tier, EffectivenessTier::SuperEffective);
        assert_eq!(rng.consumed(), 2);
    }

    #[test]
    fn test_critical_is_drawn_before_variance() {
        let tuning = DamageTuning::default();
        let calculator = DamageCalculator::new(&tuning);
        let mut rng = ScriptedRng::new(vec![0.0, 0.0]);
        let outcome = calculator.resolve(50, &[Electric], &thunderbolt(), &[Water], &mut rng);
        assert!(outcome.is_critical);
        assert_eq!(outcome.damage, 275);

        // A high first draw is a miss on the crit roll even when the second is low
        let mut rng = ScriptedRng::new(vec![0.5, 0.01]);
        let outcome = calculator.resolve(50, &[Electric], &thunderbolt(), &[Water], &mut rng);
        assert!(!outcome.is_critical);
    }

    #[test]
    fn test_immune_defender_takes_nothing_and_draws_nothing() {
        let tuning = DamageTuning::default();
        let calculator = DamageCalculator::new(&tuning);
        let mut rng = ScriptedRng::new(vec![]);
        let outcome = calculator.resolve(
            80,
            &[Normal],
            &MoveData::new("Body Slam", Normal, 85),
            &[Ghost, Poison],
            &mut rng,
        );
        assert_eq!(outcome.damage, 0);
        assert!(!outcome.is_critical);
        assert_eq!(outcome.tier, EffectivenessTier::Immune);
        assert_eq!(rng.consumed(), 0);

        let mut rng = ScriptedRng::new(vec![]);
        let ground = calculator.resolve(80, &[Ground], &MoveData::new("Earthquake", Ground, 100), &[Electric, Flying], &mut rng);
        assert_eq!(ground.damage, 0);
    }

    #[test]
    fn test_non_immune_hits_deal_at_least_one() {
        let tuning = DamageTuning::default();
        let calculator = DamageCalculator::new(&tuning);
        let mut rng = ScriptedRng::new(vec![0.9, 0.0]);
        let splash = calculator.resolve(1, &[Water], &MoveData::new("Splash", Normal, 0), &[Rock, Steel], &mut rng);
        assert_eq!(splash.damage, 1);
        assert_eq!(splash.tier, EffectivenessTier::NotVeryEffective);

        let mut rng = ScriptedRng::new(vec![0.9, 0.0]);
        let resisted = calculator.resolve(1, &[Grass], &MoveData::new("Absorb", Grass, 20), &[Fire, Flying], &mut rng);
        assert_eq!(resisted.effectiveness, Effectiveness::QUARTER);
        // 20 * 1.02 * 0.4 * 1.5 * 0.25 * 0.85 = 2.6
        assert_eq!(resisted.damage, 2);
    }

    #[test]
    fn test_same_seed_same_outcomes() {
        let tuning = DamageTuning::default();
        let calculator = DamageCalculator::new(&tuning);
        let mut first = SeededRng::new(77);
        let mut second = SeededRng::new(77);
        for level in 1..40 {
            let a = calculator.resolve(level, &[Electric], &thunderbolt(), &[Grass], &mut first);
            let b = calculator.resolve(level, &[Electric], &thunderbolt(), &[Grass], &mut second);
            assert_eq!(a, b);
            assert!(a.damage >= 1);
        }
    }

    #[test]
    fn test_expected_damage_ranks_type_matchups() {
        let tuning = DamageTuning::default();
        let calculator = DamageCalculator::new(&tuning);
        let tackle = MoveData::new("Tackle", Normal, 40);
        let water = calculator.expected_damage(30, &[Electric], &thunderbolt(), &[Water]);
        let ground = calculator.expected_damage(30, &[Electric], &thunderbolt(), &[Ground]);
        let neutral = calculator.expected_damage(30, &[Electric], &tackle, &[Ground]);
        assert!(water > neutral);
        assert_eq!(ground, 0.0);
    }
}
