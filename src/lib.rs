//! treecheck - schema-driven validation of hierarchical data trees
//!
//! A schema is itself a tree whose leaves are short descriptors (`i:1,10`,
//! `R:hostname`, `m:port`, ...). It is compiled once into a `SchemaNode`,
//! then any number of data trees can be checked against it. Every data
//! problem is reported as one `path: message` line; schema authoring
//! mistakes are reported as `SchemaError`.
//!
//! ```no_run
//! use serde_json::json;
//! use treecheck::TreeValidator;
//!
//! let validator = TreeValidator::new(&json!({"m:port": "i:1,65535"}))?;
//! let report = validator.verify(&json!({"port": 22}), "settings")?;
//! assert!(report.is_empty());
//! # Ok::<(), treecheck::SchemaError>(())
//! ```

pub mod cli;
pub mod convert;
pub mod observability;
pub mod patterns;
pub mod schema;
pub mod verify;

pub use convert::{
    amount_to_units, duration_to_milliseconds, duration_to_seconds, string_to_boolean,
    ConversionError, ConversionResult,
};
pub use patterns::{register_global, RegexRegistry, ValueMatcher};
pub use schema::{SchemaError, SchemaNode, SchemaResult, SchemaValidator};
pub use verify::{verify, MatchStatus, TreeValidator};
