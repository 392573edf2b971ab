use std::path::Path;

use rt_core::migrate::{LegacyEvent, migrate_event};

use crate::config::TrackerConfig;

pub fn run(config: &TrackerConfig, game: &str, file: &Path) -> Result<(), String> {
    let content = std::fs::read_to_string(file)
        .map_err(|e| format!("cannot read {}: {e}", file.display()))?;
    let legacy: LegacyEvent = serde_json::from_str(&content)
        .map_err(|e| format!("invalid legacy event {}: {e}", file.display()))?;

    let mut ledger = super::open_ledger(config)?;
    let game_id = super::resolve_game(&ledger, game)?.id;
    let report = migrate_event(&mut ledger, game_id, &legacy).map_err(|e| e.to_string())?;
    super::save_ledger(config, &ledger)?;

    println!(
        "  Imported '{}' as event {}: {} successes, {} failures",
        legacy.name, report.event, report.successes, report.failures
    );
    Ok(())
}
