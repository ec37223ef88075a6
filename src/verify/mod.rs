//! Data verification for treecheck
//!
//! Matches a data tree against a compiled schema and reports every
//! violation, one line each, with the path of the offending node.
//!
//! Verification never stops at the first problem. Only schema defects end
//! a run early, as `Err(SchemaError)`.

mod status;
mod structure;
mod validator;

pub use status::MatchStatus;
pub use validator::TreeValidator;

use serde_json::Value;

use crate::schema::SchemaResult;

/// One-shot check of `data` against a raw schema, using the process-wide
/// pattern registry
pub fn verify(data: &Value, syntax: &Value, root: &str) -> SchemaResult<String> {
    TreeValidator::new(syntax)?.verify(data, root)
}
