pub mod event;
pub mod export;
pub mod game;
pub mod import;
pub mod init;
pub mod log;
pub mod stats;

use rt_core::{Game, GameId, Ledger, NewOutcome, ProbabilityUnit, UserId, normalize};

use crate::config::TrackerConfig;

/// Load the ledger named by the config.
fn open_ledger(config: &TrackerConfig) -> Result<Ledger, String> {
    Ledger::load(&config.data_file)
        .map_err(|e| format!("cannot load {}: {e}", config.data_file.display()))
}

/// Write the ledger back to the file named by the config.
fn save_ledger(config: &TrackerConfig, ledger: &Ledger) -> Result<(), String> {
    ledger
        .save(&config.data_file)
        .map_err(|e| format!("cannot save {}: {e}", config.data_file.display()))
}

/// The acting user, required for commands that write or filter by user.
fn require_user(config: &TrackerConfig) -> Result<UserId, String> {
    config
        .default_user
        .ok_or_else(|| "no user given: pass --user <id> or set default_user in rngtrack.toml".into())
}

/// Find a game by id (`3` or `#3`) or by name.
fn resolve_game<'l>(ledger: &'l Ledger, game: &str) -> Result<&'l Game, String> {
    let by_id = game
        .trim_start_matches('#')
        .parse::<u64>()
        .ok()
        .and_then(|id| ledger.game(GameId(id)));
    by_id
        .or_else(|| ledger.find_game(game))
        .ok_or_else(|| format!("game not found: \"{game}\""))
}

/// Parse `NAME=PROBABILITY`. A trailing `%` forces percent; otherwise
/// `unit` decides how the number is read.
fn parse_outcome(arg: &str, unit: ProbabilityUnit) -> Result<NewOutcome, String> {
    let (name, value) = arg
        .rsplit_once('=')
        .ok_or_else(|| format!("invalid outcome \"{arg}\": expected NAME=PROBABILITY"))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("invalid outcome \"{arg}\": name is empty"));
    }

    let value = value.trim();
    let (number, unit) = match value.strip_suffix('%') {
        Some(number) => (number.trim(), ProbabilityUnit::Percent),
        None => (value, unit),
    };
    let raw: f64 = number
        .parse()
        .map_err(|_| format!("invalid probability \"{value}\" for outcome \"{name}\""))?;
    let expected = normalize(raw, unit).map_err(|e| e.to_string())?;
    Ok(NewOutcome::new(name, expected))
}

/// Format a signed percentage-point value, e.g. `+1.00`.
fn signed(value: f64) -> String {
    format!("{value:+.2}")
}
