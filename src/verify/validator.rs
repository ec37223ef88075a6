//! Validator facade
//!
//! A `TreeValidator` owns a registry snapshot and one compiled schema, and
//! checks any number of data trees against it. Compilation happens once, in
//! the constructor, so a schema defect is reported before any data is seen.

use std::sync::Arc;

use serde_json::Value;
use tracing::debug;

use crate::observability::{Event, MatchObserver};
use crate::patterns::{global_snapshot, RegexRegistry, ValueMatcher};
use crate::schema::{SchemaNode, SchemaResult, SchemaValidator};

use super::status::MatchStatus;
use super::structure::StructureMatcher;

/// Compiled schema plus the patterns it refers to
pub struct TreeValidator {
    registry: RegexRegistry,
    schema: SchemaNode,
    observer: Option<Arc<dyn MatchObserver>>,
}

impl TreeValidator {
    /// Compiles `syntax` against a snapshot of the process-wide registry.
    ///
    /// # Errors
    ///
    /// Returns the first schema defect found.
    pub fn new(syntax: &Value) -> SchemaResult<Self> {
        Self::with_registry(syntax, global_snapshot())
    }

    /// Compiles `syntax` against an explicit registry
    pub fn with_registry(syntax: &Value, registry: RegexRegistry) -> SchemaResult<Self> {
        let schema = SchemaValidator::new(&registry).compile(syntax)?;
        Ok(Self {
            registry,
            schema,
            observer: None,
        })
    }

    /// Reports every scalar comparison made during verification
    pub fn with_observer(mut self, observer: impl MatchObserver + 'static) -> Self {
        self.observer = Some(Arc::new(observer));
        self
    }

    pub fn set_observer(&mut self, observer: Arc<dyn MatchObserver>) {
        self.observer = Some(observer);
    }

    /// Adds a pattern visible to this validator only
    pub fn register(&mut self, name: &str, pattern: &str) -> SchemaResult<()> {
        self.registry.register(name, pattern)
    }

    /// Recompiles against a new schema; the old one is kept on failure
    pub fn replace_schema(&mut self, syntax: &Value) -> SchemaResult<()> {
        self.schema = SchemaValidator::new(&self.registry).compile(syntax)?;
        Ok(())
    }

    pub fn schema(&self) -> &SchemaNode {
        &self.schema
    }

    pub fn registry(&self) -> &RegexRegistry {
        &self.registry
    }

    /// Checks `data` against the compiled schema.
    ///
    /// Returns the newline separated violations, empty when `data` is valid.
    /// Paths in the report start at `root`.
    ///
    /// # Errors
    ///
    /// Only schema defects that surface during matching, such as a named
    /// pattern that is not registered.
    pub fn verify(&self, data: &Value, root: &str) -> SchemaResult<String> {
        self.verify_against(data, &self.schema, root)
    }

    /// Checks `data` against another compiled schema, using this
    /// validator's registry and observer
    pub fn verify_against(
        &self,
        data: &Value,
        schema: &SchemaNode,
        root: &str,
    ) -> SchemaResult<String> {
        debug!(event = Event::VerifyStart.as_str(), root = root, schema = schema.shape_name());

        let mut values = ValueMatcher::new(&self.registry);
        if let Some(observer) = &self.observer {
            values = values.with_observer(observer.as_ref());
        }

        let mut status = MatchStatus::new(root);
        StructureMatcher::new(values).match_node(data, schema, &mut status)?;

        debug!(
            event = Event::VerifyComplete.as_str(),
            root = root,
            violations = status.len()
        );
        Ok(status.into_text())
    }

    pub fn is_valid(&self, data: &Value) -> SchemaResult<bool> {
        Ok(self.verify(data, "")?.is_empty())
    }
}

impl std::fmt::Debug for TreeValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TreeValidator")
            .field("patterns", &self.registry.len())
            .field("schema", &self.schema)
            .field("observed", &self.observer.is_some())
            .finish()
    }
}
