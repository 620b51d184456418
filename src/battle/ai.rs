//! Move selection for NPC opponents.

use crate::battle::calculators::DamageCalculator;
use crate::battle::state::Combatant;
use crate::rng::RngSource;
use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;

/// Anything that can pick a move for a combatant.
pub trait Behavior {
    /// Index into `attacker.usable_moves()`.
    fn choose_move(
        &mut self,
        attacker: &Combatant,
        defender: &Combatant,
        calculator: &DamageCalculator,
        rng: &mut dyn RngSource,
    ) -> usize;
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub enum OpponentStrategy {
    /// Uniform pick from the combatant's move list.
    FixedList,
    /// Weighted pick; `weights[i]` belongs to move `i`, missing weights count as zero.
    Weighted(Vec<f64>),
    /// Replays move indices in order, wrapping around.
    Scripted { sequence: Vec<usize>, cursor: usize },
    /// Highest expected damage against the current defender. Ties go to the
    /// lower move index.
    Greedy,
}

impl OpponentStrategy {
    pub fn scripted(sequence: Vec<usize>) -> Self {
        OpponentStrategy::Scripted {
            sequence,
            cursor: 0,
        }
    }
}

impl Behavior for OpponentStrategy {
    fn choose_move(
        &mut self,
        attacker: &Combatant,
        defender: &Combatant,
        calculator: &DamageCalculator,
        rng: &mut dyn RngSource,
    ) -> usize {
        let moves = attacker.usable_moves();
        match self {
            OpponentStrategy::FixedList => rng.pick_index(moves.len(), "npc move"),
            OpponentStrategy::Weighted(weights) => {
                let weights: Vec<f64> = (0..moves.len())
                    .map(|i| weights.get(i).copied().unwrap_or(0.0).max(0.0))
                    .collect();
                let total: f64 = weights.iter().sum();
                if total <= 0.0 {
                    return rng.pick_index(moves.len(), "npc move");
                }
                let mut target = rng.next_unit("npc weighted move") * total;
                for (index, weight) in weights.iter().enumerate() {
                    if target < *weight {
                        return index;
                    }
                    target -= weight;
                }
                weights.iter().rposition(|w| *w > 0.0).unwrap_or(0)
            }
            OpponentStrategy::Scripted { sequence, cursor } => {
                if sequence.is_empty() {
                    return 0;
                }
                let choice = sequence[*cursor % sequence.len()] % moves.len();
                *cursor += 1;
                choice
            }
            OpponentStrategy::Greedy => moves
                .iter()
                .enumerate()
                .max_by_key(|(index, move_data)| {
                    let expected = calculator.expected_damage(
                        attacker.level,
                        &attacker.types,
                        move_data,
                        &defender.types,
                    );
                    (OrderedFloat(expected), Reverse(*index))
                })
                .map(|(index, _)| index)
                .unwrap_or(0),
        }
    }
}
