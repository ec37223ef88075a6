//! Comparison observers
//!
//! The value matcher reports every (pattern, value, outcome) triple to an
//! optional observer. Observers cannot influence the outcome.

use std::sync::Mutex;

use crate::schema::PatternDescriptor;

use super::events::Event;

/// Receives every scalar comparison made during matching
pub trait MatchObserver: Send + Sync {
    fn on_compare(&self, pattern: &PatternDescriptor, value: Option<&str>, matched: bool);
}

/// Emits each comparison as a `trace` level `tracing` event
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl MatchObserver for TracingObserver {
    fn on_compare(&self, pattern: &PatternDescriptor, value: Option<&str>, matched: bool) {
        tracing::trace!(
            event = Event::ValueCompared.as_str(),
            pattern = %pattern,
            value = value.unwrap_or("<absent>"),
            matched
        );
    }
}

/// One recorded comparison
#[derive(Debug, Clone, PartialEq)]
pub struct Comparison {
    pub pattern: String,
    pub value: Option<String>,
    pub matched: bool,
}

/// Keeps every comparison in memory, for tests and debugging
#[derive(Debug, Default)]
pub struct RecordingObserver {
    comparisons: Mutex<Vec<Comparison>>,
}

impl RecordingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of everything recorded so far
    pub fn comparisons(&self) -> Vec<Comparison> {
        self.comparisons
            .lock()
            .map(|c| c.clone())
            .unwrap_or_else(|poisoned| poisoned.into_inner().clone())
    }
}

impl MatchObserver for RecordingObserver {
    fn on_compare(&self, pattern: &PatternDescriptor, value: Option<&str>, matched: bool) {
        let comparison = Comparison {
            pattern: pattern.to_string(),
            value: value.map(str::to_string),
            matched,
        };
        match self.comparisons.lock() {
            Ok(mut c) => c.push(comparison),
            Err(poisoned) => poisoned.into_inner().push(comparison),
        }
    }
}
