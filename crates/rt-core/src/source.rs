use crate::error::TrackResult;
use crate::event::Event;
use crate::id::EventId;
use crate::log::Log;
use crate::scope::Scope;

/// Read access to persisted events and logs.
///
/// Implementations must return a consistent snapshot per call: a batch
/// written by one bulk insert is either fully visible or not at all.
pub trait LogSource {
    /// Look up an event together with its current outcome set.
    fn fetch_event_with_outcomes(&self, event: EventId) -> TrackResult<Option<Event>>;

    /// All logs of an event that the scope admits.
    fn fetch_logs(&self, event: EventId, scope: &Scope) -> TrackResult<Vec<Log>>;
}

impl<S: LogSource + ?Sized> LogSource for &S {
    fn fetch_event_with_outcomes(&self, event: EventId) -> TrackResult<Option<Event>> {
        (**self).fetch_event_with_outcomes(event)
    }

    fn fetch_logs(&self, event: EventId, scope: &Scope) -> TrackResult<Vec<Log>> {
        (**self).fetch_logs(event, scope)
    }
}
