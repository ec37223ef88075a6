//! Schema self-validation
//!
//! Walks a raw schema once, eagerly, including branches no particular data
//! instance would exercise, and compiles it into a `SchemaNode` tree.
//!
//! Rejected at this stage:
//! - Malformed descriptors and record keys
//! - Unknown named patterns, unanchored or invalid inline patterns
//! - Inconsistent numeric ranges
//! - List markers anywhere but the head of a list
//! - Lists whose record alternatives cannot be told apart
//!
//! Record routing for every list is decided here, once, and stored in the
//! compiled `SequenceSchema`.

use std::collections::HashSet;

use serde_json::{Map, Value};

use crate::observability::Event;
use crate::patterns::{compile_anchored, RegexRegistry};

use super::errors::{SchemaError, SchemaResult};
use super::types::{
    FieldKey, FieldKind, PatternDescriptor, RecordRouting, RecordSchema, SchemaNode,
    SequenceSchema,
};

/// Validates and compiles raw schemas against one registry
pub struct SchemaValidator<'a> {
    registry: &'a RegexRegistry,
}

impl<'a> SchemaValidator<'a> {
    /// Creates a validator resolving named patterns in `registry`.
    pub fn new(registry: &'a RegexRegistry) -> Self {
        Self { registry }
    }

    /// Validates a raw schema and compiles it.
    ///
    /// # Errors
    ///
    /// Returns the first `SchemaError` found; a schema is either fully
    /// valid or rejected.
    pub fn compile(&self, syntax: &Value) -> SchemaResult<SchemaNode> {
        let result = self.compile_node(syntax);
        match &result {
            Ok(node) => tracing::debug!(
                event = Event::SchemaCompiled.as_str(),
                root = node.shape_name()
            ),
            Err(e) => tracing::debug!(
                event = Event::SchemaRejected.as_str(),
                code = e.code(),
                error = %e
            ),
        }
        result
    }

    fn compile_node(&self, value: &Value) -> SchemaResult<SchemaNode> {
        match value {
            Value::String(text) => {
                let descriptor = PatternDescriptor::parse(text)?;
                if descriptor.is_list_marker() {
                    return Err(SchemaError::malformed(
                        text,
                        "list markers may only appear as the first element of a list",
                    ));
                }
                self.check_descriptor(&descriptor)?;
                Ok(SchemaNode::Scalar(descriptor))
            }
            Value::Array(items) => self.compile_sequence(items).map(SchemaNode::Sequence),
            Value::Object(map) => self.compile_record(map).map(SchemaNode::Record),
            Value::Null => Err(SchemaError::MissingDescriptor(
                "null found where a descriptor was expected".into(),
            )),
            other => Err(SchemaError::MissingDescriptor(format!(
                "`{}` is not a descriptor string",
                other
            ))),
        }
    }

    fn compile_sequence(&self, items: &[Value]) -> SchemaResult<SequenceSchema> {
        let mut marker = None;
        let mut alternatives = Vec::with_capacity(items.len());

        for (index, item) in items.iter().enumerate() {
            if let Value::String(text) = item {
                let descriptor = PatternDescriptor::parse(text)?;
                if let PatternDescriptor::ListMarker(m) = descriptor {
                    if index != 0 {
                        return Err(SchemaError::malformed(
                            text,
                            "list markers may only appear as the first element of a list",
                        ));
                    }
                    marker = Some(m);
                    continue;
                }
                self.check_descriptor(&descriptor)?;
                alternatives.push(SchemaNode::Scalar(descriptor));
                continue;
            }
            alternatives.push(self.compile_node(item)?);
        }

        if alternatives.is_empty() {
            return Err(SchemaError::EmptySequence);
        }

        let routing = classify_records(&alternatives)?;
        Ok(SequenceSchema {
            marker,
            alternatives,
            routing,
        })
    }

    fn compile_record(&self, map: &Map<String, Value>) -> SchemaResult<RecordSchema> {
        let mut fields = Vec::with_capacity(map.len());
        let mut seen = HashSet::new();

        for (raw_key, raw_value) in map {
            if raw_key.is_empty() {
                return Err(SchemaError::MissingDescriptor("record key is empty".into()));
            }
            let key = FieldKey::parse(raw_key)?;
            self.check_descriptor(key.pattern())?;

            if !key.is_custom() && !seen.insert(key.name().to_string()) {
                return Err(SchemaError::DuplicateField(key.name().to_string()));
            }

            let node = self.compile_node(raw_value)?;
            if key.kind() == FieldKind::Typed && !matches!(node, SchemaNode::Scalar(_)) {
                return Err(SchemaError::invalid_key(
                    raw_key,
                    "a typed field must map to a simple value pattern",
                ));
            }

            fields.push((key, node));
        }

        Ok(RecordSchema { fields })
    }

    /// Resolves pattern references the descriptor depends on
    fn check_descriptor(&self, descriptor: &PatternDescriptor) -> SchemaResult<()> {
        match descriptor {
            PatternDescriptor::NamedRegex(name) => self.registry.lookup(name).map(|_| ()),
            PatternDescriptor::InlineRegex(pattern) => compile_anchored(pattern).map(|_| ()),
            _ => Ok(()),
        }
    }
}

/// Decides how record elements of a list are routed to record alternatives.
fn classify_records(alternatives: &[SchemaNode]) -> SchemaResult<RecordRouting> {
    let records: Vec<(usize, &RecordSchema)> = alternatives
        .iter()
        .enumerate()
        .filter_map(|(index, alt)| match alt {
            SchemaNode::Record(record) => Some((index, record)),
            _ => None,
        })
        .collect();

    match records.as_slice() {
        [] => Ok(RecordRouting::None),
        [(index, _)] => Ok(RecordRouting::Single(*index)),
        _ => {
            for (_, record) in &records {
                check_discriminable(record)?;
            }
            check_distinct(records.iter().map(|(_, record)| *record))?;
            Ok(RecordRouting::Discriminated)
        }
    }
}

/// One of several record alternatives must be identifiable either by its
/// single field name or by its one typed field.
fn check_discriminable(record: &RecordSchema) -> SchemaResult<()> {
    let typed = record.typed_fields().count();
    if typed > 1 {
        return Err(SchemaError::AmbiguousRecords(
            "a record alternative declares more than one typed field".into(),
        ));
    }
    if typed == 1 {
        return Ok(());
    }

    match record.fields() {
        [(key, _)] if key.is_custom() => Err(SchemaError::AmbiguousRecords(
            "a single-field record alternative keyed by c: has no name to match on".into(),
        )),
        [_] => Ok(()),
        _ => Err(SchemaError::AmbiguousRecords(
            "untyped records must be the only record in a list".into(),
        )),
    }
}

/// No two alternatives may share a single field name, or a typed field
/// name with the same literal value; routing would never reach the second.
fn check_distinct<'r>(records: impl Iterator<Item = &'r RecordSchema>) -> SchemaResult<()> {
    let mut single_names = HashSet::new();
    let mut type_values = HashSet::new();

    for record in records {
        if let [(key, _)] = record.fields() {
            if let Some(name) = key.literal_name() {
                if !single_names.insert(name) {
                    return Err(SchemaError::AmbiguousRecords(format!(
                        "two record alternatives are keyed by the single field `{}`",
                        name
                    )));
                }
            }
        }

        for (key, node) in record.typed_fields() {
            let SchemaNode::Scalar(PatternDescriptor::Literal(value)) = node else {
                continue;
            };
            if !type_values.insert((key.name(), value.as_str())) {
                return Err(SchemaError::AmbiguousRecords(format!(
                    "two record alternatives have typed field `{}` set to `{}`",
                    key.name(),
                    value
                )));
            }
        }
    }
    Ok(())
}
