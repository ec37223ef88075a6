//! Schema subsystem for treecheck
//!
//! A schema ("syntax tree") is authored as plain data with the same
//! container shapes as the data it checks. It is validated and compiled
//! once, then treated as read-only for every `verify` call.
//!
//! # Design Principles
//!
//! - Descriptors are parsed once into typed variants
//! - Ambiguous schemas are rejected before any data is seen
//! - Schema defects are errors; data defects are violation text

mod errors;
mod types;
mod validator;

pub use errors::{SchemaError, SchemaResult};
pub use types::{
    ChoiceKind, FieldKey, FieldKind, ListMarker, PatternDescriptor, RecordRouting, RecordSchema,
    SchemaNode, SequenceSchema,
};
pub use validator::SchemaValidator;

pub(crate) use types::is_anchored;
