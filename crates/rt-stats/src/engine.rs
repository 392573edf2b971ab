//! Wiring the aggregation pipeline to a [`LogSource`].

use rt_core::{CallerContext, EventId, GlobalScope, LogSource, TrackError, TrackResult};

use crate::aggregate::{KeyBy, aggregate};
use crate::assemble::{StatsResponse, assemble};

/// Options for a [`StatsEngine`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatsOptions {
    /// Whether imported logs feed the global block.
    pub global_scope: GlobalScope,
}

impl StatsOptions {
    /// Set the global scope policy.
    pub fn with_global_scope(mut self, global_scope: GlobalScope) -> Self {
        self.global_scope = global_scope;
        self
    }
}

/// Computes [`StatsResponse`]s from a log source.
///
/// Holds no state besides its options: every call reads a fresh snapshot
/// from the source.
#[derive(Debug, Clone)]
pub struct StatsEngine<S> {
    source: S,
    options: StatsOptions,
}

impl<S: LogSource> StatsEngine<S> {
    /// Create an engine with default options.
    pub fn new(source: S) -> Self {
        Self::with_options(source, StatsOptions::default())
    }

    /// Create an engine with the given options.
    pub fn with_options(source: S, options: StatsOptions) -> Self {
        Self { source, options }
    }

    /// Stats for an event, with a personal block if the caller is identified.
    ///
    /// Fails with [`TrackError::EventNotFound`] for unknown events. Storage
    /// errors from the source are returned unchanged.
    pub fn stats(&self, event_id: EventId, caller: CallerContext) -> TrackResult<StatsResponse> {
        let event = self
            .source
            .fetch_event_with_outcomes(event_id)?
            .ok_or(TrackError::EventNotFound(event_id))?;

        let global_scope = self.options.global_scope.scope();
        let global_logs = self.source.fetch_logs(event_id, &global_scope)?;
        let global = aggregate(&global_logs, &event, &global_scope, KeyBy::Id);

        let personal = match caller.personal_scope() {
            Some(scope) => {
                let logs = self.source.fetch_logs(event_id, &scope)?;
                Some(aggregate(&logs, &event, &scope, KeyBy::Id))
            }
            None => None,
        };

        let response = assemble(
            &event,
            global_scope,
            &global,
            caller.user().zip(personal.as_ref()),
        );
        tracing::debug!(
            event = %event_id,
            scope = %global_scope,
            total = response.total_attempts,
            user = ?response.user_id,
            user_total = response.user_total_attempts,
            "computed stats"
        );
        Ok(response)
    }
}
