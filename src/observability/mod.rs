//! Observability for treecheck
//!
//! Diagnostics go through the `tracing` facade; installing a subscriber is
//! left to the binary. This module provides:
//! - Stable event names (`Event`)
//! - The comparison hook used by the value matcher (`MatchObserver`)
//!
//! # Principles
//!
//! 1. Observability is read-only
//! 2. No effect on match results
//! 3. No background threads
//!
//! # Usage
//!
//! ```ignore
//! use treecheck::observability::TracingObserver;
//!
//! let validator = TreeValidator::new(&schema)?.with_observer(TracingObserver);
//! ```

mod events;
mod observer;

pub use events::Event;
pub use observer::{Comparison, MatchObserver, RecordingObserver, TracingObserver};
