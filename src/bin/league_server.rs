//! Pokemon League command server
//!
//! Reads one JSON command per line on stdin and writes one JSON response per
//! line on stdout. The chat front end owns rendering; this process owns the
//! game state for as long as it runs.
//!
//! Usage: `league-server [config.ron]`. Set `LEAGUE_SEED` for a replayable run
//! and `LEAGUE_ADMIN_TOKEN` to enable the `credit` command.

use std::io;
use std::path::Path;
use std::sync::Arc;

use log::{error, info};
use pokemon_league::server::LeagueServer;
use pokemon_league::{EngineConfig, League, MemoryStore, SeededRng, StaticCatalog, SystemClock};

fn main() -> io::Result<()> {
    env_logger::init();

    let config = match std::env::args().nth(1) {
        Some(path) => match EngineConfig::load(Path::new(&path)) {
            Ok(config) => config,
            Err(e) => {
                error!("{}", e);
                return Err(io::Error::new(io::ErrorKind::InvalidInput, e.to_string()));
            }
        },
        None => EngineConfig::default(),
    };
    let seed = std::env::var("LEAGUE_SEED").ok().and_then(|s| s.parse().ok());
    let rng = match seed {
        Some(seed) => SeededRng::new(seed),
        None => SeededRng::from_entropy(),
    };
    let league = League::new(
        config,
        Arc::new(MemoryStore::new()),
        Arc::new(StaticCatalog::kanto()),
        Arc::new(SystemClock),
        Box::new(rng),
    );
    let server = LeagueServer::new(league, std::env::var("LEAGUE_ADMIN_TOKEN").ok());
    info!("League server ready (seed: {:?})", seed);

    server.serve(io::stdin().lock(), io::stdout())
}
