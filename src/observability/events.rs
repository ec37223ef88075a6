//! Observable events
//!
//! Every `tracing` event this crate emits carries one of these names in its
//! `event` field, so log consumers can filter on a stable identifier.

use std::fmt;

/// Observable events in treecheck
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Setup
    /// Configuration file loaded
    ConfigLoaded,
    /// Pattern added to a registry
    PatternRegistered,
    /// Schema passed self-validation and was compiled
    SchemaCompiled,
    /// Schema rejected during self-validation
    SchemaRejected,

    // Matching
    /// Data verification begins
    VerifyStart,
    /// Data verification complete
    VerifyComplete,
    /// One scalar compared against one pattern
    ValueCompared,
}

impl Event {
    /// Returns the string representation of the event
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::ConfigLoaded => "CONFIG_LOADED",
            Event::PatternRegistered => "PATTERN_REGISTERED",
            Event::SchemaCompiled => "SCHEMA_COMPILED",
            Event::SchemaRejected => "SCHEMA_REJECTED",
            Event::VerifyStart => "VERIFY_START",
            Event::VerifyComplete => "VERIFY_COMPLETE",
            Event::ValueCompared => "VALUE_COMPARED",
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
