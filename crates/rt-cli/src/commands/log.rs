use rt_core::{EventId, LogEntry, OutcomeId, OutcomeRef};

use crate::config::TrackerConfig;

pub fn run(
    config: &TrackerConfig,
    event: u64,
    outcome: &str,
    count: u32,
    imported: bool,
) -> Result<(), String> {
    let user = super::require_user(config)?;
    let mut ledger = super::open_ledger(config)?;
    let event_id = EventId(event);

    let event = ledger
        .event(event_id)
        .ok_or_else(|| format!("event not found: {event_id}"))?;
    // A name wins over a numeric id, so an outcome called "1" stays reachable.
    let outcome_ref = match event.outcome_by_name(outcome) {
        Some(o) => OutcomeRef::Id(o.id),
        None => match outcome.trim_start_matches('#').parse::<u64>() {
            Ok(id) => OutcomeRef::Id(OutcomeId(id)),
            Err(_) => OutcomeRef::Name(outcome.to_string()),
        },
    };

    let entry = LogEntry::new(event_id, outcome_ref, user)
        .times(count)
        .imported(imported);
    let created = ledger.record(entry).map_err(|e| e.to_string())?;
    super::save_ledger(config, &ledger)?;

    let name = ledger
        .event(event_id)
        .and_then(|e| e.resolve(&created[0].outcome))
        .map(|o| o.name.clone())
        .unwrap_or_default();
    let origin = if imported { " (imported)" } else { "" };
    println!(
        "  Logged {} x '{}' for user {}{}",
        created.len(),
        name,
        user.0,
        origin
    );
    Ok(())
}
