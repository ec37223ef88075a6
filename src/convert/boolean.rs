//! Boolean coercion

const TRUTHY: [&str; 5] = ["true", "yes", "y", "on", "1"];

/// True exactly for `true`, `yes`, `y`, `on` and `1`, ignoring case.
/// Anything else, including the empty string, is false.
pub fn string_to_boolean(text: &str) -> bool {
    TRUTHY.iter().any(|t| t.eq_ignore_ascii_case(text))
}
