use comfy_table::{ContentArrangement, Table};

use rt_core::{EventId, ProbabilityUnit};

use crate::config::TrackerConfig;

pub fn add(
    config: &TrackerConfig,
    game: &str,
    name: &str,
    outcomes: &[String],
    unit: ProbabilityUnit,
) -> Result<(), String> {
    let outcomes = outcomes
        .iter()
        .map(|arg| super::parse_outcome(arg, unit))
        .collect::<Result<Vec<_>, _>>()?;

    let mut ledger = super::open_ledger(config)?;
    let game_id = super::resolve_game(&ledger, game)?.id;
    if ledger.find_event(game_id, name).is_some() {
        return Err(format!("event '{name}' already exists in this game"));
    }
    let event = ledger
        .add_event(game_id, name, outcomes)
        .map_err(|e| e.to_string())?
        .clone();
    super::save_ledger(config, &ledger)?;

    println!("  Added event '{}' ({})", event.name, event.id);
    for outcome in &event.outcomes {
        println!("    {:<20} {:>7.2}%", outcome.name, outcome.expected.as_percent());
    }
    let total = event.expected_total() * 100.0;
    if (total - 100.0).abs() > 0.1 {
        println!("  note: expected probabilities sum to {total:.2}%");
    }
    Ok(())
}

pub fn list(config: &TrackerConfig, game: &str) -> Result<(), String> {
    let ledger = super::open_ledger(config)?;
    let game = super::resolve_game(&ledger, game)?;
    let events = ledger.events_for_game(game.id);

    if events.is_empty() {
        println!("  No events for '{}'.", game.name);
        return Ok(());
    }

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Id", "Event", "Outcomes", "Logs"]);
    for event in &events {
        let outcomes: Vec<String> = event
            .outcomes
            .iter()
            .map(|o| format!("{} ({:.2}%)", o.name, o.expected.as_percent()))
            .collect();
        let logs = ledger.logs_for_event(event.id).len();
        table.add_row(vec![
            event.id.0.to_string(),
            event.name.clone(),
            outcomes.join(", "),
            logs.to_string(),
        ]);
    }

    println!("{table}");
    Ok(())
}

pub fn add_outcome(
    config: &TrackerConfig,
    event: u64,
    arg: &str,
    unit: ProbabilityUnit,
) -> Result<(), String> {
    let outcome = super::parse_outcome(arg, unit)?;
    let mut ledger = super::open_ledger(config)?;
    let added = ledger
        .add_outcome(EventId(event), outcome)
        .map_err(|e| e.to_string())?
        .clone();
    super::save_ledger(config, &ledger)?;

    println!(
        "  Added outcome '{}' ({:.2}%) to event {}",
        added.name,
        added.expected.as_percent(),
        EventId(event)
    );
    Ok(())
}
