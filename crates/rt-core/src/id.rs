use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! sequential_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub u64);

        impl $name {
            /// The identifier that follows this one.
            pub fn next(self) -> Self {
                Self(self.0 + 1)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "#{}", self.0)
            }
        }

        impl From<u64> for $name {
            fn from(raw: u64) -> Self {
                Self(raw)
            }
        }
    };
}

sequential_id!(
    /// Identifier of a game.
    GameId
);
sequential_id!(
    /// Identifier of an event.
    EventId
);
sequential_id!(
    /// Identifier of an outcome. Unique across all events.
    OutcomeId
);
sequential_id!(
    /// Identifier of a single log row.
    LogId
);
sequential_id!(
    /// Identifier of the user who recorded a log.
    UserId
);
