//! # Regex Registry
//!
//! Named, compiled, anchored patterns. A process-wide table holds the
//! built-ins plus anything registered during setup; each validator clones
//! that table when it is built, so later global registrations never reach
//! existing validators.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use once_cell::sync::Lazy;
use regex::Regex;

use crate::observability::Event;
use crate::schema::{SchemaError, SchemaResult};

use super::builtin::{self, PROTECTED_PATTERNS};

static PATTERN_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[-_.A-Za-z0-9]+$").expect("pattern name grammar is valid"));

static GLOBAL_REGISTRY: Lazy<RwLock<RegexRegistry>> =
    Lazy::new(|| RwLock::new(RegexRegistry::with_builtins()));

/// Registry of named patterns
#[derive(Debug, Clone, Default)]
pub struct RegexRegistry {
    patterns: HashMap<String, Regex>,
}

impl RegexRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry holding every built-in pattern
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        for (name, source) in builtin::sources() {
            match Regex::new(&source) {
                Ok(re) => {
                    registry.patterns.insert(name.to_string(), re);
                }
                Err(e) => tracing::error!(name, error = %e, "built-in pattern failed to compile"),
            }
        }
        registry
    }

    /// Register a pattern, replacing any earlier entry with the same name.
    ///
    /// # Errors
    ///
    /// - name outside `[-_.A-Za-z0-9]+`
    /// - name is one of the protected built-ins
    /// - pattern not anchored with `^...$`
    /// - pattern does not compile
    pub fn register(&mut self, name: &str, pattern: &str) -> SchemaResult<()> {
        if !PATTERN_NAME.is_match(name) {
            return Err(SchemaError::InvalidPatternName(name.to_string()));
        }
        if PROTECTED_PATTERNS.contains(&name) {
            return Err(SchemaError::ProtectedPattern(name.to_string()));
        }
        let re = compile_anchored(pattern)?;
        let replaced = self.patterns.insert(name.to_string(), re).is_some();

        tracing::debug!(
            event = Event::PatternRegistered.as_str(),
            name,
            replaced
        );
        Ok(())
    }

    /// Look up a pattern by name
    pub fn lookup(&self, name: &str) -> SchemaResult<&Regex> {
        self.patterns
            .get(name)
            .ok_or_else(|| SchemaError::UnknownPattern(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.patterns.contains_key(name)
    }

    /// Registered names in sorted order
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.patterns.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

/// Compile a pattern that must be anchored with `^...$`
pub(crate) fn compile_anchored(pattern: &str) -> SchemaResult<Regex> {
    if !crate::schema::is_anchored(pattern) {
        return Err(SchemaError::UnanchoredPattern(pattern.to_string()));
    }
    Regex::new(pattern).map_err(|e| SchemaError::InvalidPattern {
        pattern: pattern.to_string(),
        reason: e.to_string(),
    })
}

/// Register a pattern in the process-wide registry.
///
/// Only validators created afterwards see the new pattern. Do this during
/// setup, before validators are shared across threads.
pub fn register_global(name: &str, pattern: &str) -> SchemaResult<()> {
    GLOBAL_REGISTRY
        .write()
        .unwrap_or_else(PoisonError::into_inner)
        .register(name, pattern)
}

/// Copy of the process-wide registry
pub fn global_snapshot() -> RegexRegistry {
    GLOBAL_REGISTRY
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .clone()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtins_present() {
        let registry = RegexRegistry::with_builtins();
        for name in [
            "boolean",
            "name",
            "plugin",
            "printable",
            "string",
            "unix_path",
            "windows_path",
            "user_name",
            "variable",
            "hostname",
            "ipv4_addr",
            "ipv4_cidr",
            "ipv6_addr",
            "ipv6_cidr",
            "machine",
            "amount",
            "amount_data",
            "duration",
        ] {
            assert!(registry.contains(name), "missing built-in {}", name);
        }
    }

    #[test]
    fn test_register_and_overwrite() {
        let mut registry = RegexRegistry::new();
        registry.register("port-name", "^[a-z]+$").unwrap();
        assert!(registry.lookup("port-name").unwrap().is_match("http"));

        registry.register("port-name", "^[0-9]+$").unwrap();
        let re = registry.lookup("port-name").unwrap();
        assert!(re.is_match("80"));
        assert!(!re.is_match("http"));
    }

    #[test]
    fn test_register_rejections() {
        let mut registry = RegexRegistry::with_builtins();

        let err = registry.register("bad name", "^x$").unwrap_err();
        assert_eq!(err.code(), "SCHEMA_INVALID_PATTERN_NAME");

        let err = registry.register("duration", "^x$").unwrap_err();
        assert_eq!(err.code(), "SCHEMA_PROTECTED_PATTERN");

        let err = registry.register("loose", "[a-z]+").unwrap_err();
        assert_eq!(err.code(), "SCHEMA_UNANCHORED_PATTERN");

        let err = registry.register("broken", "^([a-z]$").unwrap_err();
        assert_eq!(err.code(), "SCHEMA_INVALID_PATTERN");
    }

    #[test]
    fn test_lookup_unknown_fails() {
        let registry = RegexRegistry::new();
        let err = registry.lookup("nope").unwrap_err();
        assert_eq!(err, SchemaError::UnknownPattern("nope".into()));
    }

    #[test]
    fn test_snapshot_is_independent_of_later_registrations() {
        let before = global_snapshot();
        register_global("registry-unit-test-late", "^late$").unwrap();
        let after = global_snapshot();

        assert!(!before.contains("registry-unit-test-late"));
        assert!(after.contains("registry-unit-test-late"));
    }

    #[test]
    fn test_names_sorted() {
        let mut registry = RegexRegistry::new();
        registry.register("b", "^b$").unwrap();
        registry.register("a", "^a$").unwrap();
        assert_eq!(registry.names(), vec!["a", "b"]);
        assert_eq!(registry.len(), 2);
    }
}
