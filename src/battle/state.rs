use crate::battle::ai::OpponentStrategy;
use crate::progression::Prize;
use chrono::{DateTime, Utc};
use schema::{BattleKind, EffectivenessTier, Gym, MoveData, OwnerId, PokemonType, SpeciesId};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SessionId(pub u64);

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "battle-{}", self.0)
    }
}

/// Lifecycle of a battle. States only move forward:
/// `Pending -> Active -> Resolved`, or `Pending -> Cancelled`.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Pending,
    Active,
    Resolved,
    Cancelled,
}

impl SessionState {
    /// Whether a participant in this session is still tied up by it.
    pub fn is_open(self) -> bool {
        matches!(self, SessionState::Pending | SessionState::Active)
    }
}

/// A creature as it stands in battle: a snapshot of species data and the
/// owner's shared level, plus the HP it has left.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Combatant {
    pub species: SpeciesId,
    pub name: String,
    pub types: Vec<PokemonType>,
    pub level: u32,
    pub moves: Vec<MoveData>,
    pub max_hp: u16,
    pub current_hp: u16,
}

impl Combatant {
    pub fn is_fainted(&self) -> bool {
        self.current_hp == 0
    }

    /// Subtract damage, stopping at zero. Returns the HP left.
    pub fn take_damage(&mut self, damage: u16) -> u16 {
        self.current_hp = self.current_hp.saturating_sub(damage);
        self.current_hp
    }

    /// Move list to pick from. A creature without usable moves struggles.
    pub fn usable_moves(&self) -> Vec<MoveData> {
        if self.moves.is_empty() {
            vec![MoveData::struggle()]
        } else {
            self.moves.clone()
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub enum Controller {
    Human(OwnerId),
    Npc {
        name: String,
        strategy: OpponentStrategy,
    },
}

/// One participant's roster. Humans bring a single creature; NPC trainers and
/// gym leaders bring their whole team and send the next one out on a faint.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Side {
    pub controller: Controller,
    pub roster: Vec<Combatant>,
    pub active: usize,
    /// Move index chosen by a human for the upcoming turn.
    pub pending_move: Option<usize>,
}

impl Side {
    pub fn human(owner: OwnerId, combatant: Combatant) -> Self {
        Self {
            controller: Controller::Human(owner),
            roster: vec![combatant],
            active: 0,
            pending_move: None,
        }
    }

    pub fn npc(name: &str, strategy: OpponentStrategy, roster: Vec<Combatant>) -> Self {
        Self {
            controller: Controller::Npc {
                name: name.to_string(),
                strategy,
            },
            roster,
            active: 0,
            pending_move: None,
        }
    }

    pub fn owner(&self) -> Option<OwnerId> {
        match self.controller {
            Controller::Human(owner) => Some(owner),
            Controller::Npc { .. } => None,
        }
    }

    pub fn label(&self) -> String {
        match &self.controller {
            Controller::Human(owner) => owner.to_string(),
            Controller::Npc { name, .. } => name.clone(),
        }
    }

    pub fn active_combatant(&self) -> Option<&Combatant> {
        self.roster.get(self.active)
    }

    pub fn active_combatant_mut(&mut self) -> Option<&mut Combatant> {
        self.roster.get_mut(self.active)
    }

    /// True once every combatant on the side has fainted.
    pub fn is_defeated(&self) -> bool {
        self.roster.iter().all(Combatant::is_fainted)
    }

    /// Switch to the next healthy combatant after the active one faints.
    pub fn send_out_next(&mut self) -> Option<SpeciesId> {
        let next = self.roster.iter().position(|c| !c.is_fainted())?;
        self.active = next;
        Some(self.roster[next].species)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct AttackRecord {
    pub side: usize,
    pub attacker: SpeciesId,
    pub move_name: String,
    pub damage: u16,
    pub is_critical: bool,
    pub tier: EffectivenessTier,
    pub defender: SpeciesId,
    pub defender_hp_after: u16,
    pub defender_fainted: bool,
    pub replacement: Option<SpeciesId>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct TurnRecord {
    pub turn_number: u32,
    pub attacks: Vec<AttackRecord>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct BattleSession {
    pub id: SessionId,
    pub kind: BattleKind,
    pub state: SessionState,
    /// `sides[0]` is always the challenger.
    pub sides: [Side; 2],
    pub turn_log: Vec<TurnRecord>,
    pub winner: Option<usize>,
    pub forfeited_by: Option<usize>,
    pub gym: Option<Gym>,
    pub prize: Prize,
    pub created_at: DateTime<Utc>,
}

impl BattleSession {
    pub fn turn_number(&self) -> u32 {
        self.turn_log.len() as u32
    }

    /// Index of the side controlled by `owner`, if any.
    pub fn side_of(&self, owner: OwnerId) -> Option<usize> {
        self.sides.iter().position(|side| side.owner() == Some(owner))
    }

    pub fn human_owners(&self) -> Vec<OwnerId> {
        self.sides.iter().filter_map(Side::owner).collect()
    }

    pub fn winner_owner(&self) -> Option<OwnerId> {
        self.winner.and_then(|index| self.sides[index].owner())
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, postcard::Error> {
        postcard::to_allocvec(self)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, postcard::Error> {
        postcard::from_bytes(bytes)
    }
}
