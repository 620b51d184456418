//! The command surface.
//!
//! `League` glues the pure engine pieces to a `Store`, a `CatalogProvider`, a
//! `Clock` and one shared RNG. Every command takes the key-scoped locks it
//! needs before reading state, so requests for different owners run in
//! parallel while requests for the same owner serialize.
//!
//! Commands finish every fallible step before their first write, so an error
//! leaves the store as it was.

use crate::battle::engine::{build_combatant, BattleStateMachine};
use crate::battle::state::{BattleSession, Combatant, SessionId, SessionState, TurnRecord};
use crate::catalog::CatalogProvider;
use crate::clock::Clock;
use crate::config::EngineConfig;
use crate::economy::{LootGenerator, PackCatalog, PackOpening};
use crate::errors::{BattleError, CatalogError, EngineResult};
use crate::locks::KeyedLocks;
use crate::progression::{
    Battlepass, BattlepassAward, CooldownTracker, GymProgressTracker, GymVictory, LevelChange,
    LevelingEngine, QuestBoard, QuestCompletion, QuestEvent, QuestTracker, RewardCalculator,
};
use crate::rng::RngSource;
use crate::store::{Creature, Store};
use crate::teams;
use chrono::{DateTime, Utc};
use log::{info, warn};
use schema::{BattleKind, Gym, OwnerId, RarityTier, SpeciesId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

/// What one human participant received when a battle resolved.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct RewardReport {
    pub owner: OwnerId,
    pub species: SpeciesId,
    pub won: bool,
    pub xp: i64,
    pub level_change: Option<LevelChange>,
    pub money: u64,
    /// Pack id added to the owner's inventory.
    pub pack: Option<String>,
    pub badge: Option<GymVictory>,
    pub quests: Vec<QuestCompletion>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct BattleReport {
    pub session: BattleSession,
    pub turn: Option<TurnRecord>,
    /// Filled only when this command resolved the battle.
    pub rewards: Vec<RewardReport>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct PackPurchase {
    pub pack_id: String,
    pub price: u64,
    pub balance: u64,
    /// Unopened packs of this kind now held.
    pub held: u32,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct CatchReport {
    pub creature: Creature,
    pub battlepass: BattlepassAward,
    pub quests: Vec<QuestCompletion>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct BattlepassStatus {
    pub owner: OwnerId,
    pub xp: u64,
    pub level: u32,
    pub max_level: u32,
}

/// One side's rewards, decided before anything is written.
struct RewardPlan {
    owner: OwnerId,
    species: SpeciesId,
    won: bool,
    xp: i64,
    money: u64,
    pack: Option<String>,
}

pub struct League {
    config: EngineConfig,
    store: Arc<dyn Store>,
    catalog: Arc<dyn CatalogProvider>,
    clock: Arc<dyn Clock>,
    packs: PackCatalog,
    loot: LootGenerator,
    rng: Mutex<Box<dyn RngSource + Send>>,
    owner_locks: KeyedLocks<OwnerId>,
    stat_locks: KeyedLocks<(OwnerId, SpeciesId)>,
    next_session: AtomicU64,
}

impl League {
    pub fn new(
        config: EngineConfig,
        store: Arc<dyn Store>,
        catalog: Arc<dyn CatalogProvider>,
        clock: Arc<dyn Clock>,
        rng: Box<dyn RngSource + Send>,
    ) -> Self {
        let loot = LootGenerator::from_catalog(catalog.as_ref());
        let next_session = store
            .session_ids()
            .into_iter()
            .map(|id| id.0 + 1)
            .max()
            .unwrap_or(1);
        Self {
            config,
            store,
            catalog,
            clock,
            packs: PackCatalog::default(),
            loot,
            rng: Mutex::new(rng),
            owner_locks: KeyedLocks::new(),
            stat_locks: KeyedLocks::new(),
            next_session: AtomicU64::new(next_session),
        }
    }

    pub fn with_packs(mut self, packs: PackCatalog) -> Self {
        self.packs = packs;
        self
    }

    pub fn packs(&self) -> &PackCatalog {
        &self.packs
    }

    pub fn store(&self) -> &dyn Store {
        self.store.as_ref()
    }

    fn machine(&self) -> BattleStateMachine<'_> {
        BattleStateMachine::new(&self.config)
    }

    fn with_rng<T>(&self, f: impl FnOnce(&mut dyn RngSource) -> T) -> T {
        let mut rng = self.rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        f(&mut **rng)
    }

    fn allocate_session_id(&self) -> SessionId {
        SessionId(self.next_session.fetch_add(1, Ordering::SeqCst))
    }

    // --- Session persistence ---

    pub fn load_session(&self, id: SessionId) -> EngineResult<BattleSession> {
        let bytes = self
            .store
            .load_session(id)
            .ok_or(BattleError::SessionNotFound(id))?;
        BattleSession::from_bytes(&bytes).map_err(|_| BattleError::CorruptSession(id).into())
    }

    /// Persist a session and keep the per-owner open-session index in step
    /// with its state.
    fn save_session(&self, session: &BattleSession) -> EngineResult<()> {
        let bytes = session
            .to_bytes()
            .map_err(|_| BattleError::CorruptSession(session.id))?;
        self.store.save_session(session.id, bytes);
        for owner in session.human_owners() {
            if session.state.is_open() {
                self.store.set_open_session(owner, Some(session.id));
            } else if self.store.open_session(owner) == Some(session.id) {
                self.store.set_open_session(owner, None);
            }
        }
        Ok(())
    }

    /// Fail with `SessionConflict` if the owner is tied up in an open
    /// session. A stale pending challenge is expired on the spot instead.
    fn ensure_available(&self, owner: OwnerId, now: DateTime<Utc>) -> EngineResult<()> {
        let Some(id) = self.store.open_session(owner) else {
            return Ok(());
        };
        let mut session = match self.load_session(id) {
            Ok(session) => session,
            Err(e) => {
                warn!("Dropping unreadable open session for {}: {}", owner, e);
                self.store.set_open_session(owner, None);
                return Ok(());
            }
        };
        if self.machine().expire_if_stale(&mut session, now) {
            self.save_session(&session)?;
        }
        if session.state.is_open() {
            return Err(BattleError::SessionConflict {
                participant: owner,
                session: id,
            }
            .into());
        }
        self.store.set_open_session(owner, None);
        Ok(())
    }

    /// Snapshot one of the owner's creatures at the owner's species level.
    fn combatant_for(&self, owner: OwnerId, species: SpeciesId) -> EngineResult<Combatant> {
        if !self.store.owns_species(owner, species) {
            return Err(BattleError::CreatureNotOwned { owner, species }.into());
        }
        let level = self.store.species_stats(owner, species).level();
        Ok(build_combatant(
            self.catalog.as_ref(),
            species,
            level,
            &self.config.battle,
        )?)
    }

    fn npc_roster(&self, team: &[(SpeciesId, u32)]) -> EngineResult<Vec<Combatant>> {
        team.iter()
            .map(|(species, level)| {
                build_combatant(self.catalog.as_ref(), *species, *level, &self.config.battle)
                    .map_err(Into::into)
            })
            .collect()
    }

    // --- PvP ---

    /// Challenge another owner. The session waits in `Pending` for an answer.
    pub fn start_battle(
        &self,
        challenger: OwnerId,
        challenger_species: SpeciesId,
        opponent: OwnerId,
        opponent_species: SpeciesId,
    ) -> EngineResult<BattleSession> {
        if challenger == opponent {
            return Err(BattleError::SelfChallenge(challenger).into());
        }
        self.owner_locks.with_pair_lock(&challenger, &opponent, || {
            let now = self.clock.now();
            self.ensure_available(challenger, now)?;
            self.ensure_available(opponent, now)?;

            let session = self.machine().start_pvp(
                self.allocate_session_id(),
                (challenger, self.combatant_for(challenger, challenger_species)?),
                (opponent, self.combatant_for(opponent, opponent_species)?),
                now,
            )?;
            self.save_session(&session)?;
            Ok(session)
        })
    }

    /// Lock every human in a session, then reload it under the lock.
    fn with_session_lock<T>(
        &self,
        id: SessionId,
        f: impl FnOnce(BattleSession) -> EngineResult<T>,
    ) -> EngineResult<T> {
        let owners = self.load_session(id)?.human_owners();
        match owners.as_slice() {
            [a, b] => self
                .owner_locks
                .with_pair_lock(a, b, || f(self.load_session(id)?)),
            [a] => self.owner_locks.with_lock(a, || f(self.load_session(id)?)),
            _ => f(self.load_session(id)?),
        }
    }

    pub fn accept_challenge(&self, id: SessionId, by: OwnerId) -> EngineResult<BattleSession> {
        self.with_session_lock(id, |mut session| {
            if self.machine().expire_if_stale(&mut session, self.clock.now()) {
                self.save_session(&session)?;
                return Err(BattleError::InvalidTransition {
                    from: session.state,
                    action: "accept",
                }
                .into());
            }
            self.machine().accept(&mut session, by)?;
            self.save_session(&session)?;
            Ok(session)
        })
    }

    pub fn decline_challenge(&self, id: SessionId, by: OwnerId) -> EngineResult<BattleSession> {
        self.with_session_lock(id, |mut session| {
            self.machine().decline(&mut session, by)?;
            self.save_session(&session)?;
            Ok(session)
        })
    }

    /// Cancel every pending challenge older than the configured expiry.
    /// Cancelled sessions award nothing. Unreadable sessions are skipped.
    pub fn expire_challenges(&self) -> EngineResult<Vec<SessionId>> {
        let mut expired = Vec::new();
        for id in self.store.open_session_ids() {
            let outcome = self.with_session_lock(id, |mut session| {
                if !self.machine().expire_if_stale(&mut session, self.clock.now()) {
                    return Ok(false);
                }
                self.save_session(&session)?;
                Ok(true)
            });
            match outcome {
                Ok(true) => expired.push(id),
                Ok(false) => {}
                Err(e) => warn!("Skipping {} in the expiry sweep: {}", id, e),
            }
        }
        if !expired.is_empty() {
            info!("Expired {} pending challenges", expired.len());
        }
        Ok(expired)
    }

    // --- Turns ---

    pub fn submit_move(
        &self,
        id: SessionId,
        by: OwnerId,
        move_index: usize,
    ) -> EngineResult<BattleReport> {
        self.with_session_lock(id, |mut session| {
            let turn = self.with_rng(|rng| self.machine().submit_move(&mut session, by, move_index, rng))?;
            self.finish_command(session, turn)
        })
    }

    pub fn forfeit(&self, id: SessionId, by: OwnerId) -> EngineResult<BattleReport> {
        self.with_session_lock(id, |mut session| {
            self.machine().forfeit(&mut session, by)?;
            self.finish_command(session, None)
        })
    }

    /// Store the session, then pay out if it just resolved. The resolved
    /// state lands before any reward, so a turn is never paid twice.
    fn finish_command(
        &self,
        session: BattleSession,
        turn: Option<TurnRecord>,
    ) -> EngineResult<BattleReport> {
        let plans = if session.state == SessionState::Resolved {
            self.plan_rewards(&session)
        } else {
            Vec::new()
        };
        self.save_session(&session)?;
        let rewards = plans
            .into_iter()
            .map(|plan| self.pay_out(&session, plan))
            .collect();
        Ok(BattleReport {
            session,
            turn,
            rewards,
        })
    }

    /// Decide every side's rewards without touching the store. A prize pack
    /// missing from the lineup is dropped with a warning.
    fn plan_rewards(&self, session: &BattleSession) -> Vec<RewardPlan> {
        let calculator = RewardCalculator::new(&self.config.rewards);
        session
            .sides
            .iter()
            .enumerate()
            .filter_map(|(index, side)| {
                let owner = side.owner()?;
                let species = side.roster.first()?.species;
                let won = session.winner == Some(index);
                let forfeited = session.forfeited_by == Some(index);
                let reward = calculator.reward_for(session.kind, won, forfeited, &session.prize);
                let pack = reward.pack.filter(|pack_id| match self.packs.get(pack_id) {
                    Ok(_) => true,
                    Err(e) => {
                        warn!("Prize not granted to {}: {}", owner, e);
                        false
                    }
                });
                Some(RewardPlan {
                    owner,
                    species,
                    won,
                    xp: reward.xp,
                    money: reward.money,
                    pack,
                })
            })
            .collect()
    }

    /// Apply one side's planned rewards. Nothing in here fails.
    fn pay_out(&self, session: &BattleSession, plan: RewardPlan) -> RewardReport {
        let RewardPlan {
            owner,
            species,
            won,
            xp,
            money,
            pack,
        } = plan;

        let level_change = self.stat_locks.with_lock(&(owner, species), || {
            let mut stats = self.store.species_stats(owner, species);
            stats.record_result(won);
            let change = if xp > 0 {
                match LevelingEngine::award(&mut stats, xp) {
                    Ok(change) => Some(change),
                    Err(e) => {
                        warn!("No experience for {}: {}", owner, e);
                        None
                    }
                }
            } else {
                None
            };
            self.store.save_species_stats(stats);
            change
        });

        if money > 0 {
            self.store.credit(owner, money);
        }
        if let Some(pack_id) = &pack {
            self.store.grant_packs(owner, pack_id, 1);
        }
        let badge = match (won, session.gym) {
            (true, Some(gym)) => self.record_gym_victory(owner, gym, self.clock.now()),
            _ => None,
        };

        let mut events = vec![
            QuestEvent::BattleFinished {
                kind: session.kind,
                won,
            },
            QuestEvent::MoneyEarned(money),
        ];
        if level_change.is_some_and(|change| change.leveled_up()) {
            events.push(QuestEvent::SpeciesLeveledUp);
        }
        if matches!(badge, Some(GymVictory::BadgeEarned(_))) {
            events.push(QuestEvent::BadgeEarned);
        }
        let quests = self.record_quests(owner, &events);

        RewardReport {
            owner,
            species,
            won,
            xp,
            level_change,
            money,
            pack,
            badge,
            quests,
        }
    }

    fn record_gym_victory(&self, owner: OwnerId, gym: Gym, now: DateTime<Utc>) -> Option<GymVictory> {
        let mut record = self.store.badges(owner);
        match GymProgressTracker::record_victory(&mut record, gym, now) {
            Ok(GymVictory::BadgeEarned(gym)) => {
                self.store.record_badge(owner, gym, now);
                Some(GymVictory::BadgeEarned(gym))
            }
            Ok(rematch) => Some(rematch),
            Err(e) => {
                warn!("Gym victory for {} not recorded: {}", owner, e);
                None
            }
        }
    }

    // --- NPC battles ---

    /// Fight a random route trainer. Limited by the trainer cooldown window;
    /// the slot is spent only once the session is stored.
    pub fn start_trainer_battle(&self, owner: OwnerId, species: SpeciesId) -> EngineResult<BattleSession> {
        self.owner_locks.with_lock(&owner, || {
            let now = self.clock.now();
            self.ensure_available(owner, now)?;
            let challenger = self.combatant_for(owner, species)?;

            let tracker = CooldownTracker::new(&self.config.cooldown);
            let mut cooldown = self.store.cooldown(owner);
            tracker.try_consume(&mut cooldown, now).into_result()?;

            let (trainer, team) = self.with_rng(|rng| {
                let trainer = teams::pick_trainer(rng);
                let team = trainer.roll_team(challenger.level, self.config.battle.trainer_level_cap, rng);
                (trainer, team)
            });
            let roster = self.npc_roster(&team)?;

            let session = self.machine().start_npc(
                self.allocate_session_id(),
                BattleKind::Trainer,
                (owner, challenger),
                &trainer.name,
                trainer.strategy(),
                roster,
                None,
                trainer.prize(),
                now,
            );
            self.save_session(&session)?;
            self.store.save_cooldown(cooldown);
            Ok(session)
        })
    }

    /// Challenge a gym leader. Gyms must be taken in order until all eight
    /// badges are held.
    pub fn challenge_gym(&self, owner: OwnerId, species: SpeciesId, gym: Gym) -> EngineResult<BattleSession> {
        self.owner_locks.with_lock(&owner, || {
            let now = self.clock.now();
            self.ensure_available(owner, now)?;
            GymProgressTracker::check_challenge(&self.store.badges(owner), gym)?;

            let leader = teams::gym_leader(gym);
            let challenger = self.combatant_for(owner, species)?;
            let roster = self.npc_roster(&leader.team)?;
            let session = self.machine().start_npc(
                self.allocate_session_id(),
                BattleKind::Gym,
                (owner, challenger),
                &leader.name,
                leader.strategy(),
                roster,
                Some(gym),
                leader.prize(),
                now,
            );
            self.save_session(&session)?;
            self.record_quests(owner, &[QuestEvent::GymChallenged]);
            Ok(session)
        })
    }

    pub fn next_gym(&self, owner: OwnerId) -> Option<Gym> {
        GymProgressTracker::next_gym(&self.store.badges(owner))
    }

    // --- Economy ---

    /// Charge the pack price and add one unopened pack to the inventory.
    /// Nothing changes if the balance is short.
    pub fn buy_pack(&self, owner: OwnerId, pack_id: &str) -> EngineResult<PackPurchase> {
        let price = self.packs.get(pack_id)?.price;
        self.owner_locks.with_lock(&owner, || {
            let balance = self.store.debit(owner, price)?;
            let held = self.store.grant_packs(owner, pack_id, 1);
            info!("{} bought a {} pack for {}", owner, pack_id, price);
            self.record_quests(owner, &[QuestEvent::MoneySpent(price), QuestEvent::ShopPurchase]);
            Ok(PackPurchase {
                pack_id: pack_id.to_string(),
                price,
                balance,
                held,
            })
        })
    }

    /// Open one held pack and add its creatures to the collection.
    pub fn open_pack(&self, owner: OwnerId, pack_id: &str) -> EngineResult<PackOpening> {
        self.packs.get(pack_id)?;
        self.owner_locks.with_lock(&owner, || {
            self.store.take_pack(owner, pack_id)?;
            let opening = self.open_into_collection(owner, pack_id)?;
            self.record_quests(owner, &[QuestEvent::PackOpened]);
            Ok(opening)
        })
    }

    /// Open every held pack. Packs no longer in the lineup stay unopened.
    pub fn open_all_packs(&self, owner: OwnerId) -> EngineResult<Vec<PackOpening>> {
        self.owner_locks.with_lock(&owner, || {
            let mut openings = Vec::new();
            for (pack_id, count) in self.store.pack_inventory(owner) {
                if let Err(e) = self.packs.get(&pack_id) {
                    warn!("{} keeps {} unopened: {}", owner, pack_id, e);
                    continue;
                }
                for _ in 0..count {
                    self.store.take_pack(owner, &pack_id)?;
                    openings.push(self.open_into_collection(owner, &pack_id)?);
                }
            }
            let events = vec![QuestEvent::PackOpened; openings.len()];
            self.record_quests(owner, &events);
            Ok(openings)
        })
    }

    pub fn pack_inventory(&self, owner: OwnerId) -> BTreeMap<String, u32> {
        self.store.pack_inventory(owner)
    }

    fn open_into_collection(&self, owner: OwnerId, pack_id: &str) -> EngineResult<PackOpening> {
        let config = self.packs.get(pack_id)?;
        let now = self.clock.now();
        let opening = self.with_rng(|rng| self.loot.open(config, now, rng));
        let creatures = opening
            .entries
            .iter()
            .map(|entry| Creature {
                owner,
                species: entry.species,
                shiny: entry.shiny,
                acquired_at: now,
            })
            .collect();
        self.store.grant_creatures(creatures);
        info!(
            "{} opened {} and got {} creatures ({} legendary, {} shiny)",
            owner,
            config.name,
            opening.entries.len(),
            opening.legendary_count(),
            opening.shiny_count()
        );
        Ok(opening)
    }

    // --- Catching and the battlepass ---

    /// Add a caught creature to the collection. Each catch feeds the
    /// battlepass, and levels gained there add packs to the inventory.
    pub fn catch_creature(&self, owner: OwnerId, species: SpeciesId, shiny: bool) -> EngineResult<CatchReport> {
        if self.catalog.species_data(species).is_none() {
            return Err(CatalogError::SpeciesNotFound(species).into());
        }
        self.owner_locks.with_lock(&owner, || {
            let creature = Creature {
                owner,
                species,
                shiny,
                acquired_at: self.clock.now(),
            };
            self.store.grant_creatures(vec![creature.clone()]);
            info!("{} caught {}", owner, self.catalog.species_name(species));

            let settings = &self.config.battlepass;
            let mut progress = self.store.battlepass(owner);
            let award = Battlepass::new(settings).award(&mut progress, settings.xp_per_catch);
            self.store.save_battlepass(progress);
            for pack_id in &award.packs {
                match self.packs.get(pack_id) {
                    Ok(_) => {
                        self.store.grant_packs(owner, pack_id, 1);
                    }
                    Err(e) => warn!("Battlepass reward not granted to {}: {}", owner, e),
                }
            }

            let events = [
                QuestEvent::Caught {
                    species,
                    types: self.catalog.get_types(species).unwrap_or_default(),
                    legendary: matches!(
                        self.catalog.get_rarity_tier(species),
                        Ok(RarityTier::Legendary)
                    ),
                },
                QuestEvent::BattlepassXp(settings.xp_per_catch),
            ];
            let quests = self.record_quests(owner, &events);
            Ok(CatchReport {
                creature,
                battlepass: award,
                quests,
            })
        })
    }

    pub fn battlepass(&self, owner: OwnerId) -> BattlepassStatus {
        let progress = self.store.battlepass(owner);
        BattlepassStatus {
            owner,
            xp: progress.xp,
            level: Battlepass::new(&self.config.battlepass).level(&progress),
            max_level: self.config.battlepass.max_level,
        }
    }

    // --- Daily quests ---

    /// Today's board, drawn on first use each day.
    pub fn daily_quests(&self, owner: OwnerId) -> QuestBoard {
        self.owner_locks.with_lock(&owner, || {
            let board = self.current_board(owner);
            self.store.save_quest_board(board.clone());
            board
        })
    }

    fn current_board(&self, owner: OwnerId) -> QuestBoard {
        let today = self.clock.now().date_naive();
        match self.store.quest_board(owner) {
            Some(board) if !QuestTracker::is_stale(&board, today) => board,
            _ => self.with_rng(|rng| {
                QuestTracker::generate(owner, today, self.config.quests.daily_count, rng)
            }),
        }
    }

    /// Feed events into today's board and pay out what they completed.
    /// Callers hold the owner's lock.
    fn record_quests(&self, owner: OwnerId, events: &[QuestEvent]) -> Vec<QuestCompletion> {
        let mut board = self.current_board(owner);
        let completions: Vec<QuestCompletion> = events
            .iter()
            .flat_map(|event| QuestTracker::record(&mut board, event))
            .collect();
        self.store.save_quest_board(board);
        for completion in &completions {
            self.store.credit(owner, completion.reward);
        }
        completions
    }

    // --- Balances ---

    pub fn balance(&self, owner: OwnerId) -> u64 {
        self.store.balance(owner)
    }

    /// Administrative grant. The server only exposes it behind the admin
    /// token.
    pub fn credit(&self, owner: OwnerId, amount: u64) -> u64 {
        self.store.credit(owner, amount)
    }
}
