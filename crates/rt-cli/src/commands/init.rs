use std::fs;
use std::path::Path;

use rt_core::Ledger;

use crate::config::{DEFAULT_CONFIG_FILE, TrackerConfig};

pub fn run(config: &TrackerConfig) -> Result<(), String> {
    let config_path = Path::new(DEFAULT_CONFIG_FILE);
    if config_path.exists() {
        return Err(format!("'{DEFAULT_CONFIG_FILE}' already exists"));
    }

    fs::write(config_path, TrackerConfig::template())
        .map_err(|e| format!("cannot write {DEFAULT_CONFIG_FILE}: {e}"))?;

    if config.data_file.exists() {
        println!("  Keeping existing ledger {}", config.data_file.display());
    } else {
        super::save_ledger(config, &Ledger::new())?;
    }

    println!("Created {DEFAULT_CONFIG_FILE}");
    println!();
    println!("Get started:");
    println!("  rngtrack add-game \"My Game\"");
    println!("  rngtrack add-event \"My Game\" \"Boss Drop\" -o \"Legendary=5%\" -o \"Nothing=95%\"");
    println!("  rngtrack --user 1 log 1 Legendary");
    println!("  rngtrack --user 1 stats 1");

    Ok(())
}
