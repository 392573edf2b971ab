use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::id::{EventId, UserId};
use crate::log::Log;

/// Which logs an aggregation admits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scope {
    /// Every user, organic logs only.
    GlobalOrganic,
    /// Every user, organic and imported logs.
    GlobalAll,
    /// One user, organic and imported logs.
    Personal(UserId),
}

impl Scope {
    /// Whether a log belongs to this scope. Does not check the event.
    pub fn admits(&self, log: &Log) -> bool {
        match self {
            Self::GlobalOrganic => !log.is_imported,
            Self::GlobalAll => true,
            Self::Personal(user) => log.user_id == *user,
        }
    }

    /// Whether a log belongs to this scope and to the given event.
    pub fn admits_for(&self, event: EventId, log: &Log) -> bool {
        log.event_id == event && self.admits(log)
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::GlobalOrganic => write!(f, "global (organic)"),
            Self::GlobalAll => write!(f, "global (all)"),
            Self::Personal(user) => write!(f, "personal (user {user})"),
        }
    }
}

/// Which logs feed the global block of the stats.
///
/// Personal stats always include imported logs; this only controls the
/// global view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GlobalScope {
    /// Exclude imported history from global stats.
    #[default]
    Organic,
    /// Include imported history in global stats.
    All,
}

impl GlobalScope {
    /// The aggregation scope this policy selects.
    pub fn scope(self) -> Scope {
        match self {
            Self::Organic => Scope::GlobalOrganic,
            Self::All => Scope::GlobalAll,
        }
    }
}

impl FromStr for GlobalScope {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "organic" => Ok(Self::Organic),
            "all" => Ok(Self::All),
            other => Err(format!("unknown global scope: \"{other}\". Use: organic, all")),
        }
    }
}

/// Who is asking for stats, decided once at the boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CallerContext {
    /// A known user; personal stats are computed for them.
    Identified(UserId),
    /// No user; personal stats stay empty.
    #[default]
    Anonymous,
}

impl CallerContext {
    /// Build a context from an optional user ID.
    pub fn from_user(user: Option<UserId>) -> Self {
        user.map_or(Self::Anonymous, Self::Identified)
    }

    /// The identified user, if any.
    pub fn user(self) -> Option<UserId> {
        match self {
            Self::Identified(user) => Some(user),
            Self::Anonymous => None,
        }
    }

    /// The personal scope for this caller, if identified.
    pub fn personal_scope(self) -> Option<Scope> {
        self.user().map(Scope::Personal)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::id::{LogId, OutcomeId};
    use crate::log::OutcomeRef;

    fn log(user: u64, imported: bool) -> Log {
        Log {
            id: LogId(1),
            event_id: EventId(1),
            outcome: OutcomeRef::Id(OutcomeId(1)),
            user_id: UserId(user),
            timestamp: Utc::now(),
            is_imported: imported,
        }
    }

    #[test]
    fn organic_scope_skips_imported() {
        assert!(Scope::GlobalOrganic.admits(&log(1, false)));
        assert!(!Scope::GlobalOrganic.admits(&log(1, true)));
    }

    #[test]
    fn personal_scope_keeps_imported() {
        let scope = Scope::Personal(UserId(1));
        assert!(scope.admits(&log(1, true)));
        assert!(scope.admits(&log(1, false)));
        assert!(!scope.admits(&log(2, false)));
    }

    #[test]
    fn admits_for_checks_event() {
        assert!(!Scope::GlobalAll.admits_for(EventId(2), &log(1, false)));
    }

    #[test]
    fn caller_context_from_user() {
        assert_eq!(CallerContext::from_user(None), CallerContext::Anonymous);
        assert_eq!(
            CallerContext::from_user(Some(UserId(5))).personal_scope(),
            Some(Scope::Personal(UserId(5)))
        );
    }

    #[test]
    fn global_scope_parses() {
        assert_eq!("All".parse::<GlobalScope>().unwrap(), GlobalScope::All);
        assert_eq!(GlobalScope::default().scope(), Scope::GlobalOrganic);
        assert!("imported".parse::<GlobalScope>().is_err());
    }
}
