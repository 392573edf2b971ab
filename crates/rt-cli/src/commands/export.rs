use std::path::Path;

use rt_core::{Ledger, Log, UserId};

use crate::config::TrackerConfig;

pub fn run(config: &TrackerConfig, format: &str, output: Option<&Path>) -> Result<(), String> {
    let user = super::require_user(config)?;
    let ledger = super::open_ledger(config)?;
    let logs = ledger.logs_for_user(user);

    let content = match format {
        "json" => export_json(&logs)?,
        "markdown" | "md" => export_markdown(&ledger, user, &logs),
        _ => {
            return Err(format!(
                "unsupported format: \"{format}\". Use: json, markdown"
            ));
        }
    };

    if let Some(path) = output {
        std::fs::write(path, &content)
            .map_err(|e| format!("cannot write to {}: {e}", path.display()))?;
        println!("  Exported {} logs to {}", logs.len(), path.display());
    } else {
        print!("{content}");
    }

    Ok(())
}

fn export_json(logs: &[&Log]) -> Result<String, String> {
    let mut json = serde_json::to_string_pretty(logs)
        .map_err(|e| format!("JSON serialization error: {e}"))?;
    json.push('\n');
    Ok(json)
}

fn export_markdown(ledger: &Ledger, user: UserId, logs: &[&Log]) -> String {
    let mut out = format!("# Logs for user {}\n\n", user.0);
    if logs.is_empty() {
        out.push_str("_No logs._\n");
        return out;
    }

    out.push_str("| Time | Game | Event | Outcome | Imported |\n");
    out.push_str("|------|------|-------|---------|----------|\n");
    for log in logs {
        let event = ledger.event(log.event_id);
        let game = event
            .and_then(|e| ledger.game(e.game_id))
            .map(|g| g.name.as_str())
            .unwrap_or("?");
        let event_name = event.map(|e| e.name.as_str()).unwrap_or("?");
        let outcome = event
            .and_then(|e| e.resolve(&log.outcome))
            .map(|o| o.name.clone())
            .unwrap_or_else(|| log.outcome.to_string());
        let imported = if log.is_imported { "yes" } else { "no" };
        out.push_str(&format!(
            "| {} | {game} | {event_name} | {outcome} | {imported} |\n",
            log.timestamp.format("%Y-%m-%d %H:%M")
        ));
    }
    out
}
