//! The battle state machine.
//!
//! A session is created `Pending` (PvP challenge) or `Active` (trainer and gym
//! battles), advances one turn per round of move submissions, and ends
//! `Resolved` with a winner or `Cancelled` without one. Every function here is
//! pure with respect to I/O: persistence and rewards are the caller's job.

use crate::battle::ai::{Behavior, OpponentStrategy};
use crate::battle::calculators::DamageCalculator;
use crate::battle::state::{
    AttackRecord, BattleSession, Combatant, Controller, SessionId, SessionState, Side, TurnRecord,
};
use crate::catalog::CatalogProvider;
use crate::config::{BattleSettings, EngineConfig};
use crate::errors::{BattleError, BattleResult, CatalogError, CatalogResult};
use crate::progression::Prize;
use crate::rng::RngSource;
use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use schema::{BattleKind, Gym, MoveData, OwnerId, PokemonType, SpeciesId};

/// Snapshot a species at a level into a battle-ready combatant.
///
/// Unknown species are an error. Incomplete catalog entries fall back to a
/// typeless creature that only knows Struggle, with the default base HP.
pub fn build_combatant(
    catalog: &dyn CatalogProvider,
    species: SpeciesId,
    level: u32,
    settings: &BattleSettings,
) -> CatalogResult<Combatant> {
    let data = catalog
        .species_data(species)
        .ok_or(CatalogError::SpeciesNotFound(species))?;

    let types = catalog.get_types(species).unwrap_or_else(|e| {
        warn!("{}; treating as typeless", e);
        vec![PokemonType::Typeless]
    });
    let moves = catalog.get_move_set(species).unwrap_or_else(|e| {
        warn!("{}; falling back to Struggle", e);
        vec![MoveData::struggle()]
    });
    let base_hp = catalog.get_base_hp(species).unwrap_or_else(|e| {
        warn!("{}; using default base HP", e);
        settings.default_base_hp
    });

    let bonus = level.saturating_mul(settings.hp_per_level as u32);
    let max_hp = u16::try_from(base_hp as u32 + bonus).unwrap_or(u16::MAX);
    Ok(Combatant {
        species,
        name: data.name.clone(),
        types,
        level,
        moves,
        max_hp,
        current_hp: max_hp,
    })
}

/// Borrow the attacking side and the defending side at once.
fn sides_mut(sides: &mut [Side; 2], attacker: usize) -> (&mut Side, &mut Side) {
    let (left, right) = sides.split_at_mut(1);
    if attacker == 0 {
        (&mut left[0], &mut right[0])
    } else {
        (&mut right[0], &mut left[0])
    }
}

pub struct BattleStateMachine<'a> {
    config: &'a EngineConfig,
}

impl<'a> BattleStateMachine<'a> {
    pub fn new(config: &'a EngineConfig) -> Self {
        Self { config }
    }

    /// Open a PvP challenge. It stays `Pending` until the opponent answers.
    pub fn start_pvp(
        &self,
        id: SessionId,
        challenger: (OwnerId, Combatant),
        opponent: (OwnerId, Combatant),
        now: DateTime<Utc>,
    ) -> BattleResult<BattleSession> {
        if challenger.0 == opponent.0 {
            return Err(BattleError::SelfChallenge(challenger.0));
        }
        info!("{} challenged {} ({})", challenger.0, opponent.0, id);
        Ok(BattleSession {
            id,
            kind: BattleKind::Pvp,
            state: SessionState::Pending,
            sides: [
                Side::human(challenger.0, challenger.1),
                Side::human(opponent.0, opponent.1),
            ],
            turn_log: Vec::new(),
            winner: None,
            forfeited_by: None,
            gym: None,
            prize: Prize::default(),
            created_at: now,
        })
    }

    /// Start a battle against an NPC trainer or gym leader. These begin `Active`.
    #[allow(clippy::too_many_arguments)]
    pub fn start_npc(
        &self,
        id: SessionId,
        kind: BattleKind,
        challenger: (OwnerId, Combatant),
        npc_name: &str,
        strategy: OpponentStrategy,
        roster: Vec<Combatant>,
        gym: Option<Gym>,
        prize: Prize,
        now: DateTime<Utc>,
    ) -> BattleSession {
        info!("{} started a {} battle against {} ({})", challenger.0, kind, npc_name, id);
        BattleSession {
            id,
            kind,
            state: SessionState::Active,
            sides: [
                Side::human(challenger.0, challenger.1),
                Side::npc(npc_name, strategy, roster),
            ],
            turn_log: Vec::new(),
            winner: None,
            forfeited_by: None,
            gym,
            prize,
            created_at: now,
        }
    }

    /// The challenged participant accepts: `Pending -> Active`.
    pub fn accept(&self, session: &mut BattleSession, by: OwnerId) -> BattleResult<()> {
        if session.state != SessionState::Pending {
            return Err(BattleError::InvalidTransition {
                from: session.state,
                action: "accept",
            });
        }
        if session.sides[1].owner() != Some(by) {
            return Err(BattleError::NotAParticipant(by));
        }
        session.state = SessionState::Active;
        info!("{} accepted {}", by, session.id);
        Ok(())
    }

    /// Either participant calls off a pending challenge: `Pending -> Cancelled`.
    pub fn decline(&self, session: &mut BattleSession, by: OwnerId) -> BattleResult<()> {
        if session.state != SessionState::Pending {
            return Err(BattleError::InvalidTransition {
                from: session.state,
                action: "decline",
            });
        }
        if session.side_of(by).is_none() {
            return Err(BattleError::NotAParticipant(by));
        }
        session.state = SessionState::Cancelled;
        info!("{} declined {}", by, session.id);
        Ok(())
    }

    /// Cancel a challenge nobody answered in time. Returns whether it expired.
    pub fn expire_if_stale(&self, session: &mut BattleSession, now: DateTime<Utc>) -> bool {
        let deadline = session.created_at + self.config.battle.challenge_expiry();
        if session.state == SessionState::Pending && now >= deadline {
            session.state = SessionState::Cancelled;
            info!("{} expired without an answer", session.id);
            return true;
        }
        false
    }

    /// The participant gives up. The other side wins immediately.
    pub fn forfeit(&self, session: &mut BattleSession, by: OwnerId) -> BattleResult<()> {
        if session.state != SessionState::Active {
            return Err(BattleError::InvalidTransition {
                from: session.state,
                action: "forfeit",
            });
        }
        let side = session.side_of(by).ok_or(BattleError::NotAParticipant(by))?;
        session.forfeited_by = Some(side);
        session.winner = Some(1 - side);
        session.state = SessionState::Resolved;
        info!("{} forfeited {}", by, session.id);
        Ok(())
    }

    /// Record a human's move for the coming turn and resolve the turn once
    /// every human side has chosen.
    pub fn submit_move(
        &self,
        session: &mut BattleSession,
        by: OwnerId,
        move_index: usize,
        rng: &mut dyn RngSource,
    ) -> BattleResult<Option<TurnRecord>> {
        if session.state != SessionState::Active {
            return Err(BattleError::InvalidTransition {
                from: session.state,
                action: "submit a move to",
            });
        }
        let side_index = session.side_of(by).ok_or(BattleError::NotAParticipant(by))?;
        let side = &mut session.sides[side_index];
        let move_count = side
            .active_combatant()
            .map(|c| c.usable_moves().len())
            .unwrap_or(0);
        if move_index >= move_count {
            return Err(BattleError::InvalidMove(move_index));
        }
        side.pending_move = Some(move_index);
        debug!("{} chose move {} in {}", by, move_index, session.id);

        if !ready_for_turn_resolution(session) {
            return Ok(None);
        }
        Ok(Some(self.resolve_turn(session, rng)))
    }

    /// Play out one turn. The side that attacks first alternates, starting
    /// with the challenger on turn 1. A creature that faints before acting
    /// loses its attack; its replacement acts from the next turn.
    pub fn resolve_turn(&self, session: &mut BattleSession, rng: &mut dyn RngSource) -> TurnRecord {
        let calculator = DamageCalculator::new(&self.config.damage);
        let turn_number = session.turn_number() + 1;
        let first = if turn_number % 2 == 1 { 0 } else { 1 };
        let order = [first, 1 - first];

        let mut choices = [0usize; 2];
        for &side_index in &order {
            let (side, opponent) = sides_mut(&mut session.sides, side_index);
            choices[side_index] = select_move(side, opponent, &calculator, rng);
        }

        let mut fainted_this_turn = [false; 2];
        let mut attacks = Vec::with_capacity(2);
        for &attacker_index in &order {
            if session.state != SessionState::Active || fainted_this_turn[attacker_index] {
                continue;
            }
            let defender_index = 1 - attacker_index;
            let (attacker_side, defender_side) = sides_mut(&mut session.sides, attacker_index);
            let (Some(attacker), Some(defender)) = (
                attacker_side.active_combatant(),
                defender_side.active_combatant_mut(),
            ) else {
                continue;
            };

            let moves = attacker.usable_moves();
            let move_data = &moves[choices[attacker_index].min(moves.len() - 1)];
            let outcome = calculator.resolve(
                attacker.level,
                &attacker.types,
                move_data,
                &defender.types,
                rng,
            );
            let hp_after = defender.take_damage(outcome.damage);
            let defender_species = defender.species;
            let defender_fainted = defender.is_fainted();

            let replacement = if defender_fainted {
                fainted_this_turn[defender_index] = true;
                defender_side.send_out_next()
            } else {
                None
            };

            attacks.push(AttackRecord {
                side: attacker_index,
                attacker: attacker.species,
                move_name: move_data.name.clone(),
                damage: outcome.damage,
                is_critical: outcome.is_critical,
                tier: outcome.tier,
                defender: defender_species,
                defender_hp_after: hp_after,
                defender_fainted,
                replacement,
            });

            if defender_fainted && replacement.is_none() {
                session.winner = Some(attacker_index);
                session.state = SessionState::Resolved;
                info!(
                    "{} won {} on turn {}",
                    session.sides[attacker_index].label(),
                    session.id,
                    turn_number
                );
            }
        }

        let record = TurnRecord {
            turn_number,
            attacks,
        };
        session.turn_log.push(record.clone());
        record
    }
}

/// True once every human side has a move queued. NPC sides choose on the fly.
pub fn ready_for_turn_resolution(session: &BattleSession) -> bool {
    session.state == SessionState::Active
        && session.sides.iter().all(|side| match side.controller {
            Controller::Human(_) => side.pending_move.is_some(),
            Controller::Npc { .. } => true,
        })
}

fn select_move(
    side: &mut Side,
    opponent: &Side,
    calculator: &DamageCalculator,
    rng: &mut dyn RngSource,
) -> usize {
    match &mut side.controller {
        Controller::Human(_) => side.pending_move.take().unwrap_or(0),
        Controller::Npc { strategy, .. } => {
            match (side.roster.get(side.active), opponent.active_combatant()) {
                (Some(attacker), Some(defender)) => {
                    strategy.choose_move(attacker, defender, calculator, rng)
                }
                _ => 0,
            }
        }
    }
}
