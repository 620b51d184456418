//! Line-oriented JSON command server.
//!
//! One JSON command per input line, one JSON response per output line. The
//! chat front end owns rendering; this layer only parses, dispatches to
//! `League` and reports `{"ok": ..., "result" | "error": ...}`.
//!
//! `credit` mints money, so it is an admin command: it needs the token the
//! server was started with, and it is refused outright when no token is set.

use crate::battle::state::SessionId;
use crate::commands::League;
use crate::errors::{EngineError, ProgressionError};
use log::warn;
use schema::{Gym, OwnerId, SpeciesId};
use serde::Deserialize;
use serde_json::{json, Value};
use std::io::{self, BufRead, Write};
use thiserror::Error;

#[derive(Debug, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum Command {
    StartBattle {
        challenger: u64,
        challenger_species: u16,
        opponent: u64,
        opponent_species: u16,
    },
    AcceptChallenge {
        session: u64,
        owner: u64,
    },
    DeclineChallenge {
        session: u64,
        owner: u64,
    },
    SubmitMove {
        session: u64,
        owner: u64,
        move_index: usize,
    },
    Forfeit {
        session: u64,
        owner: u64,
    },
    ExpireChallenges,
    StartTrainerBattle {
        owner: u64,
        species: u16,
    },
    ChallengeGym {
        owner: u64,
        species: u16,
        gym: String,
    },
    NextGym {
        owner: u64,
    },
    BuyPack {
        owner: u64,
        pack: String,
    },
    OpenPack {
        owner: u64,
        pack: String,
    },
    OpenAllPacks {
        owner: u64,
    },
    PackInventory {
        owner: u64,
    },
    CatchCreature {
        owner: u64,
        species: u16,
        #[serde(default)]
        shiny: bool,
    },
    Battlepass {
        owner: u64,
    },
    DailyQuests {
        owner: u64,
    },
    Balance {
        owner: u64,
    },
    /// Admin only.
    Credit {
        owner: u64,
        amount: u64,
        #[serde(default)]
        token: Option<String>,
    },
    ListPacks,
}

#[derive(Error, Debug)]
pub enum ServerError {
    #[error(transparent)]
    Engine(#[from] EngineError),
    #[error("{0} requires the admin token")]
    Unauthorized(&'static str),
}

pub struct LeagueServer {
    league: League,
    admin_token: Option<String>,
}

impl LeagueServer {
    pub fn new(league: League, admin_token: Option<String>) -> Self {
        let admin_token = admin_token.filter(|token| !token.is_empty());
        if admin_token.is_none() {
            warn!("No admin token set; credit is disabled");
        }
        Self {
            league,
            admin_token,
        }
    }

    pub fn league(&self) -> &League {
        &self.league
    }

    fn authorize(&self, command: &'static str, token: Option<&str>) -> Result<(), ServerError> {
        match (&self.admin_token, token) {
            (Some(expected), Some(given)) if expected == given => Ok(()),
            _ => Err(ServerError::Unauthorized(command)),
        }
    }

    pub fn handle_command(&self, command: Command) -> Result<Value, ServerError> {
        let league = &self.league;
        let value = match command {
            Command::StartBattle {
                challenger,
                challenger_species,
                opponent,
                opponent_species,
            } => json!(league.start_battle(
                OwnerId(challenger),
                SpeciesId(challenger_species),
                OwnerId(opponent),
                SpeciesId(opponent_species),
            )?),
            Command::AcceptChallenge { session, owner } => {
                json!(league.accept_challenge(SessionId(session), OwnerId(owner))?)
            }
            Command::DeclineChallenge { session, owner } => {
                json!(league.decline_challenge(SessionId(session), OwnerId(owner))?)
            }
            Command::SubmitMove {
                session,
                owner,
                move_index,
            } => json!(league.submit_move(SessionId(session), OwnerId(owner), move_index)?),
            Command::Forfeit { session, owner } => {
                json!(league.forfeit(SessionId(session), OwnerId(owner))?)
            }
            Command::ExpireChallenges => json!(league.expire_challenges()?),
            Command::StartTrainerBattle { owner, species } => {
                json!(league.start_trainer_battle(OwnerId(owner), SpeciesId(species))?)
            }
            Command::ChallengeGym {
                owner,
                species,
                gym,
            } => {
                let gym: Gym = gym
                    .parse()
                    .map_err(|_| EngineError::from(ProgressionError::UnknownGym(gym.clone())))?;
                json!(league.challenge_gym(OwnerId(owner), SpeciesId(species), gym)?)
            }
            Command::NextGym { owner } => json!(league.next_gym(OwnerId(owner))),
            Command::BuyPack { owner, pack } => json!(league.buy_pack(OwnerId(owner), &pack)?),
            Command::OpenPack { owner, pack } => json!(league.open_pack(OwnerId(owner), &pack)?),
            Command::OpenAllPacks { owner } => json!(league.open_all_packs(OwnerId(owner))?),
            Command::PackInventory { owner } => json!(league.pack_inventory(OwnerId(owner))),
            Command::CatchCreature {
                owner,
                species,
                shiny,
            } => json!(league.catch_creature(OwnerId(owner), SpeciesId(species), shiny)?),
            Command::Battlepass { owner } => json!(league.battlepass(OwnerId(owner))),
            Command::DailyQuests { owner } => json!(league.daily_quests(OwnerId(owner))),
            Command::Balance { owner } => json!({ "balance": league.balance(OwnerId(owner)) }),
            Command::Credit {
                owner,
                amount,
                token,
            } => {
                self.authorize("credit", token.as_deref())?;
                json!({ "balance": league.credit(OwnerId(owner), amount) })
            }
            Command::ListPacks => json!(league.packs().listing()),
        };
        Ok(value)
    }

    pub fn handle_line(&self, line: &str) -> Value {
        let command: Command = match serde_json::from_str(line) {
            Ok(command) => command,
            Err(e) => return json!({ "ok": false, "error": format!("bad command: {}", e) }),
        };
        match self.handle_command(command) {
            Ok(result) => json!({ "ok": true, "result": result }),
            Err(e) => json!({ "ok": false, "error": e.to_string() }),
        }
    }

    /// Serve until the reader runs dry. Blank lines are ignored.
    pub fn serve(&self, reader: impl BufRead, mut writer: impl Write) -> io::Result<()> {
        for line in reader.lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let response = self.handle_line(&line);
            writeln!(writer, "{}", response)?;
            writer.flush()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::battle::tests::common::create_test_league;
    use pretty_assertions::assert_eq;

    fn server(token: Option<&str>) -> LeagueServer {
        let (league, _clock, _store) = create_test_league(7);
        LeagueServer::new(league, token.map(str::to_string))
    }

    #[test]
    fn test_credit_without_token_is_refused() {
        let server = server(Some("s3cret"));
        let response = server.handle_line(r#"{"command":"credit","owner":1,"amount":500}"#);
        assert_eq!(response["ok"], json!(false));
        assert_eq!(response["error"], json!("credit requires the admin token"));
        assert_eq!(server.league().balance(OwnerId(1)), 0);

        let wrong = server.handle_line(r#"{"command":"credit","owner":1,"amount":500,"token":"guess"}"#);
        assert_eq!(wrong["ok"], json!(false));
        assert_eq!(server.league().balance(OwnerId(1)), 0);
    }

    #[test]
    fn test_credit_with_token_is_applied() {
        let server = server(Some("s3cret"));
        let response =
            server.handle_line(r#"{"command":"credit","owner":1,"amount":500,"token":"s3cret"}"#);
        assert_eq!(response, json!({ "ok": true, "result": { "balance": 500 } }));
    }

    #[test]
    fn test_credit_is_disabled_without_configured_token() {
        let server = server(None);
        let response = server.handle_line(r#"{"command":"credit","owner":1,"amount":500,"token":""}"#);
        assert_eq!(response["ok"], json!(false));
        assert_eq!(server.league().balance(OwnerId(1)), 0);
    }

    #[test]
    fn test_bad_json_is_reported_not_fatal() {
        let server = server(None);
        let response = server.handle_line("{not json");
        assert_eq!(response["ok"], json!(false));
        assert!(response["error"].as_str().unwrap().starts_with("bad command"));
    }

    #[test]
    fn test_open_pack_needs_a_held_pack() {
        let server = server(None);
        let response = server.handle_line(r#"{"command":"open_pack","owner":1,"pack":"basic"}"#);
        assert_eq!(response["ok"], json!(false));
        assert_eq!(response["error"], json!("Economy error: user:1 has no basic pack to open"));
    }

    #[test]
    fn test_serve_answers_each_line() {
        let server = server(None);
        let input = "{\"command\":\"balance\",\"owner\":2}\n\n{\"command\":\"pack_inventory\",\"owner\":2}\n";
        let mut output = Vec::new();
        server.serve(input.as_bytes(), &mut output).unwrap();

        let lines: Vec<Value> = String::from_utf8(output)
            .unwrap()
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();
        assert_eq!(
            lines,
            vec![
                json!({ "ok": true, "result": { "balance": 0 } }),
                json!({ "ok": true, "result": {} }),
            ]
        );
    }
}
