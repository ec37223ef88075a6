//! Pattern subsystem for treecheck
//!
//! - `RegexRegistry`: named, anchored, compiled patterns (built-ins plus
//!   anything registered at setup)
//! - `ValueMatcher`: one scalar against one leaf descriptor

mod builtin;
mod matcher;
mod registry;

pub use builtin::PROTECTED_PATTERNS;
pub use matcher::{describe, ValueMatcher};
pub use registry::{global_snapshot, register_global, RegexRegistry};

pub(crate) use registry::compile_anchored;
pub(crate) use builtin::{AMOUNT_DATA_SOURCE, AMOUNT_SOURCE, DURATION_SOURCE};
