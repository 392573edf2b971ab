use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::id::GameId;

/// A game that groups trackable events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Game {
    /// Unique identifier for this game.
    pub id: GameId,
    /// Display name. Unique across the ledger, ignoring case.
    pub name: String,
    /// Optional cover art or icon.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    /// Timestamp when the game was first added.
    pub created_at: DateTime<Utc>,
}

impl Game {
    /// Create a game with the given ID.
    pub fn new(id: GameId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            image_url: None,
            created_at: Utc::now(),
        }
    }

    /// Attach an image URL.
    pub fn with_image_url(mut self, url: impl Into<String>) -> Self {
        self.image_url = Some(url.into());
        self
    }
}
