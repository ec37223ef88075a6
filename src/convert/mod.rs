//! Value conversions for treecheck
//!
//! Parses the amount, duration and boolean forms that the built-in
//! `amount`, `amount_data`, `duration` and `boolean` patterns accept. The
//! regex sources are shared with the pattern registry, in capturing form.

mod amount;
mod boolean;
mod duration;
mod errors;

pub use amount::amount_to_units;
pub use boolean::string_to_boolean;
pub use duration::{duration_to_milliseconds, duration_to_seconds};
pub use errors::{ConversionError, ConversionResult};
