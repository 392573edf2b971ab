//! Tracker configuration, read from `rngtrack.toml`.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use rt_core::{GlobalScope, UserId};

/// Config file looked up in the working directory when `--config` is absent.
pub const DEFAULT_CONFIG_FILE: &str = "rngtrack.toml";
/// Ledger file used when nothing else is configured.
pub const DEFAULT_DATA_FILE: &str = "rngtrack.json";
/// Environment variable that overrides the configured ledger file.
pub const DATA_ENV: &str = "RNGTRACK_DATA";

/// Settings for the `rngtrack` binary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    /// Path of the JSON ledger.
    pub data_file: PathBuf,
    /// User to act as when `--user` is not given.
    pub default_user: Option<UserId>,
    /// Whether imported logs count toward global stats.
    pub global_scope: GlobalScope,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            data_file: PathBuf::from(DEFAULT_DATA_FILE),
            default_user: None,
            global_scope: GlobalScope::Organic,
        }
    }
}

impl TrackerConfig {
    /// Load the config.
    ///
    /// An explicit path must exist and parse. Without one, `rngtrack.toml`
    /// in the working directory is used if present; a broken implicit file
    /// is reported and ignored. `RNGTRACK_DATA` overrides `data_file`.
    pub fn load(explicit: Option<&Path>) -> Result<Self, String> {
        let mut config = match explicit {
            Some(path) => Self::from_file(path)?,
            None => {
                let path = Path::new(DEFAULT_CONFIG_FILE);
                if path.exists() {
                    Self::from_file(path).unwrap_or_else(|err| {
                        tracing::warn!("{err}; using defaults");
                        Self::default()
                    })
                } else {
                    Self::default()
                }
            }
        };

        if let Some(data) = std::env::var_os(DATA_ENV) {
            config.data_file = PathBuf::from(data);
        }
        Ok(config)
    }

    /// Parse a config file.
    pub fn from_file(path: &Path) -> Result<Self, String> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("cannot read config {}: {e}", path.display()))?;
        Self::from_toml(&content).map_err(|e| format!("invalid config {}: {e}", path.display()))
    }

    /// Parse config from TOML text.
    pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Use a different ledger file.
    pub fn with_data_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.data_file = path.into();
        self
    }

    /// Act as the given user when none is passed on the command line.
    pub fn with_default_user(mut self, user: Option<UserId>) -> Self {
        self.default_user = user;
        self
    }

    /// Commented template written by `rngtrack init`.
    pub fn template() -> String {
        format!(
            r#"# rngtrack configuration

# Where logged observations are stored.
data_file = "{DEFAULT_DATA_FILE}"

# User id to log as when --user is not given.
# default_user = 1

# Global stats exclude imported history ("organic") or include it ("all").
global_scope = "organic"
"#
        )
    }
}
