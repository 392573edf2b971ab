use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::Path;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::error::{TrackError, TrackResult};
use crate::event::{Event, NewOutcome, Outcome};
use crate::game::Game;
use crate::id::{EventId, GameId, LogId, OutcomeId, UserId};
use crate::log::{Log, LogEntry, MAX_BULK_COUNT, OutcomeRef};
use crate::scope::Scope;
use crate::source::LogSource;

/// Current on-disk layout version.
pub const SCHEMA_VERSION: u32 = 1;

/// Tolerance for the sum of an event's expected probabilities.
const PROBABILITY_SUM_TOLERANCE: f64 = 1e-3;

/// The serialized form of a ledger.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct LedgerFile {
    schema_version: u32,
    games: Vec<Game>,
    events: Vec<Event>,
    logs: Vec<Log>,
}

/// The store of games, events, outcomes, and logs.
///
/// Logs are append-only. Events only ever gain outcomes.
#[derive(Debug, Clone)]
pub struct Ledger {
    games: BTreeMap<GameId, Game>,
    events: BTreeMap<EventId, Event>,
    logs: Vec<Log>,

    // Indexes
    game_by_name_lower: HashMap<String, GameId>,
    logs_by_event: HashMap<EventId, Vec<usize>>,

    next_game: GameId,
    next_event: EventId,
    next_outcome: OutcomeId,
    next_log: LogId,
}

impl Ledger {
    /// Create an empty ledger.
    pub fn new() -> Self {
        Self {
            games: BTreeMap::new(),
            events: BTreeMap::new(),
            logs: Vec::new(),
            game_by_name_lower: HashMap::new(),
            logs_by_event: HashMap::new(),
            next_game: GameId(1),
            next_event: EventId(1),
            next_outcome: OutcomeId(1),
            next_log: LogId(1),
        }
    }

    // -----------------------------------------------------------------------
    // Persistence
    // -----------------------------------------------------------------------

    /// Load a ledger from a JSON file. A missing file yields an empty ledger.
    pub fn load(path: &Path) -> TrackResult<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no ledger file, starting empty");
            return Ok(Self::new());
        }
        let content = std::fs::read_to_string(path)?;
        let ledger = Self::from_json(&content)?;
        tracing::debug!(
            path = %path.display(),
            games = ledger.games.len(),
            events = ledger.events.len(),
            logs = ledger.logs.len(),
            "loaded ledger"
        );
        Ok(ledger)
    }

    /// Save the ledger as JSON.
    ///
    /// Writes a sibling temp file and renames it into place, so readers see
    /// either the old or the new contents.
    pub fn save(&self, path: &Path) -> TrackResult<()> {
        let json = self.to_json()?;
        let mut tmp = path.as_os_str().to_owned();
        tmp.push(".tmp");
        std::fs::write(&tmp, json)?;
        std::fs::rename(&tmp, path)?;
        tracing::debug!(path = %path.display(), logs = self.logs.len(), "saved ledger");
        Ok(())
    }

    /// Decode a ledger from its JSON representation.
    pub fn from_json(json: &str) -> TrackResult<Self> {
        let file: LedgerFile = serde_json::from_str(json)?;
        if file.schema_version > SCHEMA_VERSION {
            tracing::warn!(
                found = file.schema_version,
                supported = SCHEMA_VERSION,
                "ledger was written by a newer version"
            );
        }

        let mut ledger = Self::new();
        for game in file.games {
            ledger.next_game = ledger.next_game.max(game.id.next());
            ledger
                .game_by_name_lower
                .insert(game.name.to_lowercase(), game.id);
            ledger.games.insert(game.id, game);
        }
        for event in file.events {
            ledger.next_event = ledger.next_event.max(event.id.next());
            for outcome in &event.outcomes {
                ledger.next_outcome = ledger.next_outcome.max(outcome.id.next());
            }
            ledger.events.insert(event.id, event);
        }
        for log in file.logs {
            ledger.push_log(log);
        }
        Ok(ledger)
    }

    /// Encode the ledger as pretty-printed JSON.
    pub fn to_json(&self) -> TrackResult<String> {
        let file = LedgerFile {
            schema_version: SCHEMA_VERSION,
            games: self.games.values().cloned().collect(),
            events: self.events.values().cloned().collect(),
            logs: self.logs.clone(),
        };
        Ok(serde_json::to_string_pretty(&file)?)
    }

    // -----------------------------------------------------------------------
    // Games
    // -----------------------------------------------------------------------

    /// Add a game, or return the existing one with the same name.
    pub fn add_game(&mut self, name: impl Into<String>, image_url: Option<String>) -> &Game {
        let name = name.into();
        let name_lower = name.to_lowercase();
        let id = match self.game_by_name_lower.get(&name_lower) {
            Some(id) => *id,
            None => {
                let id = self.next_game;
                self.next_game = id.next();
                let mut game = Game::new(id, name);
                game.image_url = image_url;
                tracing::info!(game = %id, name = %game.name, "added game");
                self.game_by_name_lower.insert(name_lower, id);
                self.games.insert(id, game);
                id
            }
        };
        &self.games[&id]
    }

    /// Get a game by ID.
    pub fn game(&self, id: GameId) -> Option<&Game> {
        self.games.get(&id)
    }

    /// Find a game by name (case-insensitive).
    pub fn find_game(&self, name: &str) -> Option<&Game> {
        self.game_by_name_lower
            .get(&name.to_lowercase())
            .and_then(|id| self.games.get(id))
    }

    /// All games, ordered by ID.
    pub fn games(&self) -> impl Iterator<Item = &Game> {
        self.games.values()
    }

    /// Games in which the user has logged at least one observation.
    pub fn games_for_user(&self, user: UserId) -> Vec<&Game> {
        let game_ids: HashSet<GameId> = self
            .logs
            .iter()
            .filter(|log| log.user_id == user)
            .filter_map(|log| self.events.get(&log.event_id))
            .map(|event| event.game_id)
            .collect();
        self.games
            .values()
            .filter(|game| game_ids.contains(&game.id))
            .collect()
    }

    // -----------------------------------------------------------------------
    // Events and outcomes
    // -----------------------------------------------------------------------

    /// Define a new event under a game.
    ///
    /// Needs at least one outcome, and outcome names must be unique within
    /// the event.
    pub fn add_event(
        &mut self,
        game: GameId,
        name: impl Into<String>,
        outcomes: Vec<NewOutcome>,
    ) -> TrackResult<&Event> {
        let name = name.into();
        if !self.games.contains_key(&game) {
            return Err(TrackError::GameNotFound(game));
        }
        if outcomes.is_empty() {
            return Err(TrackError::EmptyOutcomeSet(name));
        }
        let mut seen = HashSet::new();
        for outcome in &outcomes {
            if !seen.insert(outcome.name.to_lowercase()) {
                return Err(TrackError::DuplicateOutcome(outcome.name.clone()));
            }
        }

        let id = self.next_event;
        self.next_event = id.next();
        let mut event = Event::new(id, game, name);
        for outcome in outcomes {
            let outcome = self.make_outcome(id, outcome);
            event.outcomes.push(outcome);
        }
        warn_on_probability_sum(&event);
        tracing::info!(event = %id, game = %game, name = %event.name, "added event");

        self.events.insert(id, event);
        Ok(&self.events[&id])
    }

    /// Add an outcome to an existing event.
    pub fn add_outcome(&mut self, event: EventId, outcome: NewOutcome) -> TrackResult<&Outcome> {
        let existing = self
            .events
            .get(&event)
            .ok_or(TrackError::EventNotFound(event))?;
        if existing.outcome_by_name(&outcome.name).is_some() {
            return Err(TrackError::DuplicateOutcome(outcome.name));
        }

        let outcome = self.make_outcome(event, outcome);
        let id = outcome.id;
        tracing::info!(event = %event, outcome = %id, name = %outcome.name, "added outcome");

        let target = self
            .events
            .get_mut(&event)
            .ok_or(TrackError::EventNotFound(event))?;
        target.outcomes.push(outcome);
        warn_on_probability_sum(target);
        let added = target.outcomes.len() - 1;
        Ok(&target.outcomes[added])
    }

    fn make_outcome(&mut self, event: EventId, outcome: NewOutcome) -> Outcome {
        let id = self.next_outcome;
        self.next_outcome = id.next();
        Outcome {
            id,
            event_id: event,
            name: outcome.name,
            expected: outcome.expected,
        }
    }

    /// Get an event by ID.
    pub fn event(&self, id: EventId) -> Option<&Event> {
        self.events.get(&id)
    }

    /// Find an event of a game by name (case-insensitive).
    pub fn find_event(&self, game: GameId, name: &str) -> Option<&Event> {
        let name_lower = name.to_lowercase();
        self.events
            .values()
            .find(|e| e.game_id == game && e.name.to_lowercase() == name_lower)
    }

    /// All events of a game, ordered by ID.
    pub fn events_for_game(&self, game: GameId) -> Vec<&Event> {
        self.events.values().filter(|e| e.game_id == game).collect()
    }

    // -----------------------------------------------------------------------
    // Logs
    // -----------------------------------------------------------------------

    /// Record one or more observations.
    ///
    /// The entry is validated before anything is written: either all
    /// `entry.row_count()` rows are appended or none are.
    pub fn record(&mut self, entry: LogEntry) -> TrackResult<Vec<Log>> {
        if entry.row_count() > MAX_BULK_COUNT {
            return Err(TrackError::BulkCountTooLarge {
                requested: entry.count,
                limit: MAX_BULK_COUNT,
            });
        }
        let event = self
            .events
            .get(&entry.event_id)
            .ok_or(TrackError::EventNotFound(entry.event_id))?;
        let outcome = event
            .resolve(&entry.outcome)
            .ok_or_else(|| TrackError::OutcomeNotFound {
                event: entry.event_id,
                outcome: entry.outcome.to_string(),
            })?;
        let outcome_ref = OutcomeRef::Id(outcome.id);

        let now = Utc::now();
        let mut created = Vec::with_capacity(entry.row_count() as usize);
        for _ in 0..entry.row_count() {
            let id = self.next_log;
            self.next_log = id.next();
            let log = Log {
                id,
                event_id: entry.event_id,
                outcome: outcome_ref.clone(),
                user_id: entry.user_id,
                timestamp: now,
                is_imported: entry.is_imported,
            };
            created.push(log.clone());
            self.push_log(log);
        }
        tracing::info!(
            event = %entry.event_id,
            outcome = %outcome_ref,
            user = %entry.user_id,
            rows = created.len(),
            imported = entry.is_imported,
            "recorded logs"
        );
        Ok(created)
    }

    /// Append an already-built log row, keeping indexes current.
    ///
    /// Used by loading and migration. The row's outcome is not validated.
    pub fn push_log(&mut self, log: Log) {
        self.next_log = self.next_log.max(log.id.next());
        self.logs_by_event
            .entry(log.event_id)
            .or_default()
            .push(self.logs.len());
        self.logs.push(log);
    }

    /// The next log ID that will be assigned.
    pub fn next_log_id(&self) -> LogId {
        self.next_log
    }

    /// All logs of an event, in insertion order.
    pub fn logs_for_event(&self, event: EventId) -> Vec<&Log> {
        self.logs_by_event
            .get(&event)
            .map(|idx| idx.iter().map(|&i| &self.logs[i]).collect())
            .unwrap_or_default()
    }

    /// All logs a user recorded, in insertion order.
    pub fn logs_for_user(&self, user: UserId) -> Vec<&Log> {
        self.logs.iter().filter(|l| l.user_id == user).collect()
    }

    // -----------------------------------------------------------------------
    // Statistics
    // -----------------------------------------------------------------------

    /// Number of games.
    pub fn game_count(&self) -> usize {
        self.games.len()
    }

    /// Number of events.
    pub fn event_count(&self) -> usize {
        self.events.len()
    }

    /// Number of log rows.
    pub fn log_count(&self) -> usize {
        self.logs.len()
    }
}

impl Default for Ledger {
    fn default() -> Self {
        Self::new()
    }
}

impl LogSource for Ledger {
    fn fetch_event_with_outcomes(&self, event: EventId) -> TrackResult<Option<Event>> {
        Ok(self.events.get(&event).cloned())
    }

    fn fetch_logs(&self, event: EventId, scope: &Scope) -> TrackResult<Vec<Log>> {
        Ok(self
            .logs_for_event(event)
            .into_iter()
            .filter(|log| scope.admits(log))
            .cloned()
            .collect())
    }
}

fn warn_on_probability_sum(event: &Event) {
    let total = event.expected_total();
    if (total - 1.0).abs() > PROBABILITY_SUM_TOLERANCE {
        tracing::warn!(
            event = %event.id,
            name = %event.name,
            total,
            "expected probabilities do not sum to 100%"
        );
    }
}
