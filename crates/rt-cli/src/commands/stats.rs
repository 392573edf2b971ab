use colored::Colorize;
use comfy_table::{ContentArrangement, Table};

use rt_core::{CallerContext, EventId};
use rt_stats::{StatsEngine, StatsOptions, StatsResponse};

use crate::config::TrackerConfig;

pub fn run(config: &TrackerConfig, event: u64, json: bool) -> Result<(), String> {
    let ledger = super::open_ledger(config)?;
    let caller = CallerContext::from_user(config.default_user);
    let options = StatsOptions::default().with_global_scope(config.global_scope);

    let response = StatsEngine::with_options(&ledger, options)
        .stats(EventId(event), caller)
        .map_err(|e| e.to_string())?;

    if json {
        let out = serde_json::to_string_pretty(&response)
            .map_err(|e| format!("JSON serialization error: {e}"))?;
        println!("{out}");
    } else {
        print_table(&response);
    }
    Ok(())
}

fn print_table(stats: &StatsResponse) {
    println!(
        "  {} {}",
        stats.event_name.bold(),
        format!("({}, {} attempts)", stats.global_scope, stats.total_attempts).dimmed()
    );
    println!();

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    let mut header = vec![
        "Outcome",
        "Count",
        "Expected %",
        "Actual %",
        "Deviation",
        "Expected hits",
        "Hit deviation",
    ];
    if stats.has_personal() {
        header.extend(["Yours", "Your %", "Your deviation", "Your hit deviation"]);
    }
    table.set_header(header);

    for (name, count) in &stats.outcomes {
        let mut row = vec![
            name.clone(),
            count.to_string(),
            format!("{:.2}", stats.expected_rates[name]),
            format!("{:.2}", stats.actual_rates[name]),
            colorize(stats.deviation[name]),
            format!("{:.2}", stats.expected_hits[name]),
            colorize(stats.hit_deviation[name]),
        ];
        if stats.has_personal() {
            row.push(stats.user_outcomes[name].to_string());
            row.push(format!("{:.2}", stats.user_actual_rates[name]));
            row.push(colorize(stats.user_deviation[name]));
            row.push(colorize(stats.user_hit_deviation[name]));
        }
        table.add_row(row);
    }
    println!("{table}");

    if stats.unresolved > 0 {
        println!(
            "  {} logs reference outcomes this event no longer defines",
            stats.unresolved
        );
    }
    match stats.user_id {
        Some(user) => println!(
            "  Your attempts: {} (user {})",
            stats.user_total_attempts, user.0
        ),
        None => println!("  {}", "Pass --user <id> to compare your own luck.".dimmed()),
    }
}

fn colorize(deviation: f64) -> String {
    let text = super::signed(deviation);
    if deviation > 0.0 {
        text.green().to_string()
    } else if deviation < 0.0 {
        text.red().to_string()
    } else {
        text
    }
}
