use comfy_table::{ContentArrangement, Table};

use crate::config::TrackerConfig;

pub fn add(config: &TrackerConfig, name: &str, image_url: Option<String>) -> Result<(), String> {
    let mut ledger = super::open_ledger(config)?;
    let before = ledger.game_count();
    let game = ledger.add_game(name, image_url).clone();
    super::save_ledger(config, &ledger)?;

    if ledger.game_count() > before {
        println!("  Added game '{}' ({})", game.name, game.id);
    } else {
        println!("  Game '{}' already exists ({})", game.name, game.id);
    }
    Ok(())
}

pub fn list(config: &TrackerConfig, mine: bool) -> Result<(), String> {
    let ledger = super::open_ledger(config)?;

    let games = if mine {
        ledger.games_for_user(super::require_user(config)?)
    } else {
        ledger.games().collect()
    };

    if games.is_empty() {
        println!("  No games found.");
        return Ok(());
    }

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Id", "Name", "Events"]);
    for game in &games {
        let events = ledger.events_for_game(game.id).len();
        table.add_row(vec![game.id.to_string(), game.name.clone(), events.to_string()]);
    }

    println!("{table}");
    println!();
    println!("  {} games", games.len());
    Ok(())
}
