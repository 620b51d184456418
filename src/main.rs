use pokemon_league::{
    BattleReport, EngineConfig, EngineResult, League, ManualClock, MemoryStore, OwnerId,
    SeededRng, SessionState, SpeciesId, StaticCatalog,
};
use std::sync::Arc;

const ASH: OwnerId = OwnerId(1);
const GARY: OwnerId = OwnerId(2);
const PIKACHU: SpeciesId = SpeciesId(25);
const EEVEE: SpeciesId = SpeciesId(133);

fn print_report(report: &BattleReport) {
    if let Some(turn) = &report.turn {
        for attack in &turn.attacks {
            println!(
                "  Turn {}: side {} used {} for {} damage{} ({} HP left)",
                turn.turn_number,
                attack.side,
                attack.move_name,
                attack.damage,
                if attack.is_critical { " (critical)" } else { "" },
                attack.defender_hp_after
            );
        }
    }
    for reward in &report.rewards {
        println!(
            "  {} {}: +{} xp, +${}{}",
            reward.owner,
            if reward.won { "won" } else { "lost" },
            reward.xp,
            reward.money,
            match &reward.badge {
                Some(badge) => format!(", {:?}", badge),
                None => String::new(),
            }
        );
    }
}

fn run() -> EngineResult<()> {
    let clock = Arc::new(ManualClock::new(chrono::Utc::now()));
    let league = League::new(
        EngineConfig::default(),
        Arc::new(MemoryStore::new()),
        Arc::new(StaticCatalog::kanto()),
        clock.clone(),
        Box::new(SeededRng::new(151)),
    );

    // Example 1: Stock both collections
    league.catch_creature(ASH, PIKACHU, false)?;
    league.catch_creature(GARY, EEVEE, false)?;
    league.credit(ASH, 1_000);
    println!("{} starts with ${}", ASH, league.balance(ASH));
    println!();

    // Example 2: A PvP challenge played to the end
    let session = league.start_battle(ASH, PIKACHU, GARY, EEVEE)?;
    println!("{} challenged {} ({})", ASH, GARY, session.id);
    league.accept_challenge(session.id, GARY)?;

    let mut state = SessionState::Active;
    while state == SessionState::Active {
        league.submit_move(session.id, ASH, 0)?;
        let report = league.submit_move(session.id, GARY, 0)?;
        print_report(&report);
        state = report.session.state;
    }
    println!();

    // Example 3: The first gym on the list
    if let Some(gym) = league.next_gym(ASH) {
        clock.advance(chrono::Duration::minutes(1));
        let session = league.challenge_gym(ASH, PIKACHU, gym)?;
        println!("{} challenged the {} gym ({})", ASH, gym, session.id);
        let mut state = SessionState::Active;
        while state == SessionState::Active {
            let report = league.submit_move(session.id, ASH, 0)?;
            print_report(&report);
            state = report.session.state;
        }
        println!("Next gym for {}: {:?}", ASH, league.next_gym(ASH));
    }
    println!();

    // Example 4: Spend the winnings, then open everything held
    let purchase = league.buy_pack(ASH, "basic")?;
    println!("{} bought a {} pack (${} left)", ASH, purchase.pack_id, purchase.balance);
    for opening in league.open_all_packs(ASH)? {
        println!("{} opened a pack:", ASH);
        for entry in &opening.entries {
            println!(
                "  #{:03}{}{}",
                entry.species.0,
                if entry.shiny { " (shiny)" } else { "" },
                if entry.is_legendary { " (legendary)" } else { "" }
            );
        }
    }
    println!("{} has ${} left", ASH, league.balance(ASH));
    println!();

    // Example 5: Battlepass and today's quests
    let pass = league.battlepass(ASH);
    println!("{} battlepass: level {} ({} xp)", ASH, pass.level, pass.xp);
    for quest in league.daily_quests(ASH).quests {
        println!(
            "  [{}] {} ({}/{}, ${})",
            if quest.completed { "x" } else { " " },
            quest.description,
            quest.progress,
            quest.target,
            quest.reward
        );
    }

    Ok(())
}

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        println!("Error: {}", e);
    }
}
