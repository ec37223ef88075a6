//! Recursive structure matching
//!
//! Walks a data tree and a compiled schema together. Data problems become
//! lines in a `MatchStatus` and never stop the walk; only schema defects
//! surface as `Err`.
//!
//! List elements are classified by their own shape:
//! - scalars try each scalar alternative in order
//! - nested lists try each list alternative into a scratch status and keep
//!   the first clean attempt (full backtracking)
//! - records are routed by the policy precomputed for the list
//!
//! Nested list backtracking is exponential in depth times alternatives per
//! level. Schemas are expected to stay shallow.

use std::borrow::Cow;

use serde_json::{Map, Value};

use crate::patterns::ValueMatcher;
use crate::schema::{
    FieldKey, FieldKind, PatternDescriptor, RecordRouting, RecordSchema, SchemaNode,
    SchemaResult, SequenceSchema,
};

use super::status::MatchStatus;

/// Outcome of looking up a data field in a record schema
enum Resolution<'s> {
    Field(&'s SchemaNode),
    CatchAll,
    Unknown,
}

pub(crate) struct StructureMatcher<'a> {
    values: ValueMatcher<'a>,
}

impl<'a> StructureMatcher<'a> {
    pub(crate) fn new(values: ValueMatcher<'a>) -> Self {
        Self { values }
    }

    /// Matches `data` against `schema`, reporting into `status`
    pub(crate) fn match_node(
        &self,
        data: &Value,
        schema: &SchemaNode,
        status: &mut MatchStatus,
    ) -> SchemaResult<()> {
        match schema {
            SchemaNode::Scalar(descriptor) => self.match_scalar(data, descriptor, status),
            SchemaNode::Sequence(sequence) => match data {
                Value::Array(items) => self.match_sequence(items, sequence, status, false),
                Value::Null => {
                    status.report("is not a list");
                    Ok(())
                }
                // lone value standing in for a one-element list; the
                // synthetic index must not show up in reported paths
                lone if sequence.accepts_lone_value() => {
                    self.match_sequence(std::slice::from_ref(lone), sequence, status, true)
                }
                _ => {
                    status.report("is not a list");
                    Ok(())
                }
            },
            SchemaNode::Record(record) => match data {
                Value::Object(map) => self.match_record(map, record, status),
                _ => {
                    status.report("is not a record");
                    Ok(())
                }
            },
        }
    }

    fn match_scalar(
        &self,
        data: &Value,
        descriptor: &PatternDescriptor,
        status: &mut MatchStatus,
    ) -> SchemaResult<()> {
        if matches!(data, Value::Array(_) | Value::Object(_)) {
            status.report("does not contain a simple value");
            return Ok(());
        }

        let text = scalar_text(data);
        let mut expected = Vec::new();
        if self
            .values
            .matches(descriptor, text.as_deref(), Some(&mut expected))?
        {
            return Ok(());
        }

        match text {
            Some(text) => status.report(format!(
                "value `{}` is invalid, expected {}",
                text,
                expected.join(" or ")
            )),
            None => status.report(format!("has no value, expected {}", expected.join(" or "))),
        }
        Ok(())
    }

    fn match_sequence(
        &self,
        items: &[Value],
        sequence: &SequenceSchema,
        status: &mut MatchStatus,
        suppress_index: bool,
    ) -> SchemaResult<()> {
        for (index, item) in items.iter().enumerate() {
            if !suppress_index {
                status.enter_index(index);
            }

            match item {
                Value::Array(inner) => self.match_nested_sequence(inner, sequence, status)?,
                Value::Object(map) => self.match_record_element(map, sequence, status)?,
                Value::Null => status.report("unsupported data type"),
                scalar => {
                    let text = scalar_text(scalar).unwrap_or_default();
                    self.match_scalar_element(&text, sequence, status)?;
                }
            }

            if !suppress_index {
                status.leave();
            }
        }

        if items.is_empty() && !sequence.allows_empty() {
            status.report("empty list not allowed");
        }
        Ok(())
    }

    fn match_scalar_element(
        &self,
        text: &str,
        sequence: &SequenceSchema,
        status: &mut MatchStatus,
    ) -> SchemaResult<()> {
        let mut expected = Vec::new();
        for descriptor in sequence.scalar_alternatives() {
            if self.values.matches(descriptor, Some(text), Some(&mut expected))? {
                return Ok(());
            }
        }

        if expected.is_empty() {
            status.report(format!(
                "value `{}` is not allowed, this list holds no simple values",
                text
            ));
        } else {
            status.report(format!(
                "value `{}` is invalid, expected {}",
                text,
                expected.join(" or ")
            ));
        }
        Ok(())
    }

    fn match_nested_sequence(
        &self,
        items: &[Value],
        sequence: &SequenceSchema,
        status: &mut MatchStatus,
    ) -> SchemaResult<()> {
        let mut attempts = Vec::new();
        for alternative in sequence.sequence_alternatives() {
            let mut scratch = status.scratch();
            self.match_sequence(items, alternative, &mut scratch, false)?;
            if scratch.is_ok() {
                return Ok(());
            }
            attempts.push(scratch);
        }

        if attempts.is_empty() {
            status.report("is a list, but this list holds no nested lists");
        }
        for attempt in attempts {
            status.absorb(attempt);
        }
        Ok(())
    }

    fn match_record_element(
        &self,
        map: &Map<String, Value>,
        sequence: &SequenceSchema,
        status: &mut MatchStatus,
    ) -> SchemaResult<()> {
        match sequence.routing() {
            RecordRouting::Single(index) => match sequence.alternatives().get(index) {
                Some(SchemaNode::Record(record)) => self.match_record(map, record, status),
                _ => {
                    status.report("is a record, but this list holds no records");
                    Ok(())
                }
            },
            RecordRouting::Discriminated => match map.len() {
                0 => {
                    status.report("unexpected empty record");
                    Ok(())
                }
                1 => self.route_single_field(map, sequence, status),
                _ => self.route_typed(map, sequence, status),
            },
            RecordRouting::None => {
                status.report("is a record, but this list holds no records");
                Ok(())
            }
        }
    }

    /// The one field's name selects the single-field alternative
    fn route_single_field(
        &self,
        map: &Map<String, Value>,
        sequence: &SequenceSchema,
        status: &mut MatchStatus,
    ) -> SchemaResult<()> {
        let Some(name) = map.keys().next() else {
            return Ok(());
        };

        for record in sequence.record_alternatives() {
            if let [(key, _)] = record.fields() {
                if self.key_matches(key, name)? {
                    return self.match_record(map, record, status);
                }
            }
        }

        status.report(format!(
            "unexpected single-type-field record with type name `{}`",
            name
        ));
        Ok(())
    }

    /// A typed field's value selects the alternative
    fn route_typed(
        &self,
        map: &Map<String, Value>,
        sequence: &SequenceSchema,
        status: &mut MatchStatus,
    ) -> SchemaResult<()> {
        for (name, value) in map {
            let Some(text) = scalar_text(value) else {
                continue;
            };
            for record in sequence.record_alternatives() {
                for (key, node) in record.typed_fields() {
                    let SchemaNode::Scalar(descriptor) = node else {
                        continue;
                    };
                    if self.key_matches(key, name)?
                        && self.values.matches(descriptor, Some(text.as_ref()), None)?
                    {
                        return self.match_record(map, record, status);
                    }
                }
            }
        }

        status.report("unexpected multi-field record that is either untyped or an unrecognised type");
        Ok(())
    }

    fn match_record(
        &self,
        map: &Map<String, Value>,
        record: &RecordSchema,
        status: &mut MatchStatus,
    ) -> SchemaResult<()> {
        for (key, _) in record.fields() {
            if !key.kind().is_required() {
                continue;
            }
            let mut present = false;
            for name in map.keys() {
                if self.key_matches(key, name)? {
                    present = true;
                    break;
                }
            }
            if !present {
                status.report(format!("mandatory field `{}` is missing", key.name()));
            }
        }

        for (name, value) in map {
            match self.resolve_field(record, name)? {
                Resolution::Field(node) => {
                    status.enter_field(name);
                    self.match_node(value, node, status)?;
                    status.leave();
                }
                Resolution::CatchAll => {}
                Resolution::Unknown => status.report(format!("field `{}` is not allowed", name)),
            }
        }
        Ok(())
    }

    fn resolve_field<'s>(
        &self,
        record: &'s RecordSchema,
        name: &str,
    ) -> SchemaResult<Resolution<'s>> {
        for kind in [FieldKind::Mandatory, FieldKind::Optional, FieldKind::Typed] {
            if let Some(node) = record.literal(kind, name) {
                return Ok(Resolution::Field(node));
            }
        }

        for (key, node) in record.fields() {
            if key.is_custom() || key.literal_name().is_some() {
                continue;
            }
            if self.values.matches(key.pattern(), Some(name), None)? {
                return Ok(Resolution::Field(node));
            }
        }

        if record.has_custom() {
            Ok(Resolution::CatchAll)
        } else {
            Ok(Resolution::Unknown)
        }
    }

    fn key_matches(&self, key: &FieldKey, name: &str) -> SchemaResult<bool> {
        match key.pattern() {
            PatternDescriptor::Custom => Ok(false),
            PatternDescriptor::Literal(literal) => Ok(literal == name),
            pattern => self.values.matches(pattern, Some(name), None),
        }
    }
}

/// Text form of a scalar; `None` for absent values and containers
pub(crate) fn scalar_text(value: &Value) -> Option<Cow<'_, str>> {
    match value {
        Value::String(s) => Some(Cow::Borrowed(s.as_str())),
        Value::Number(n) => Some(Cow::Owned(n.to_string())),
        Value::Bool(true) => Some(Cow::Borrowed("true")),
        Value::Bool(false) => Some(Cow::Borrowed("false")),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::patterns::RegexRegistry;
    use crate::schema::SchemaValidator;
    use serde_json::json;

    fn run(data: Value, syntax: Value) -> Vec<String> {
        let registry = RegexRegistry::with_builtins();
        let schema = SchemaValidator::new(&registry).compile(&syntax).unwrap();
        let mut status = MatchStatus::new("root");
        StructureMatcher::new(ValueMatcher::new(&registry))
            .match_node(&data, &schema, &mut status)
            .unwrap();
        status.violations().to_vec()
    }

    #[test]
    fn test_scalar_text_forms() {
        assert_eq!(scalar_text(&json!("a")).as_deref(), Some("a"));
        assert_eq!(scalar_text(&json!(42)).as_deref(), Some("42"));
        assert_eq!(scalar_text(&json!(1.5)).as_deref(), Some("1.5"));
        assert_eq!(scalar_text(&json!(true)).as_deref(), Some("true"));
        assert_eq!(scalar_text(&Value::Null), None);
        assert_eq!(scalar_text(&json!([])), None);
    }

    #[test]
    fn test_shape_mismatch_phrases() {
        let lines = run(
            json!({"a": [1], "b": 1, "c": "x"}),
            json!({"m:a": "i:", "m:b": ["i:"], "m:c": {"m:d": "c:"}}),
        );
        assert_eq!(
            lines,
            vec![
                "root->a: does not contain a simple value",
                "root->b: is not a list",
                "root->c: is not a record",
            ]
        );
    }

    #[test]
    fn test_null_field_has_no_value() {
        let lines = run(json!({"a": null}), json!({"m:a": "c:"}));
        assert_eq!(lines, vec!["root->a: has no value, expected anything"]);
    }

    #[test]
    fn test_scalar_element_lists_every_alternative() {
        let lines = run(json!(["ssh", "telnet"]), json!(["ssh", "rdp", "i:1,5"]));
        assert_eq!(
            lines,
            vec!["root->[1]: value `telnet` is invalid, expected `ssh` or `rdp` or integer between 1 and 5"]
        );
    }

    #[test]
    fn test_null_element_unsupported() {
        let lines = run(json!([null]), json!(["c:"]));
        assert_eq!(lines, vec!["root->[0]: unsupported data type"]);
    }

    #[test]
    fn test_nested_sequence_backtracks_to_later_alternative() {
        let syntax = json!([["i:"], ["R:hostname"]]);
        assert!(run(json!([["a.example.com", "b.example.com"]]), syntax.clone()).is_empty());
        assert!(run(json!([[1, 2]]), syntax.clone()).is_empty());

        // every attempt's reasons survive when all fail
        let lines = run(json!([["bad host"]]), syntax);
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("integer"));
        assert!(lines[1].contains("hostname"));
        assert!(lines.iter().all(|l| l.starts_with("root->[0]->[0]: ")));
    }

    #[test]
    fn test_record_routing_by_single_field_name() {
        let syntax = json!([
            {"m:ssh": {"m:host": "R:hostname"}},
            {"m:rdp": {"m:host": "R:hostname", "s:domain": "R:name"}}
        ]);
        assert!(run(json!([{"rdp": {"host": "h1", "domain": "corp"}}]), syntax.clone()).is_empty());

        let lines = run(json!([{"vnc": {"host": "h1"}}]), syntax);
        assert_eq!(
            lines,
            vec!["root->[0]: unexpected single-type-field record with type name `vnc`"]
        );
    }

    #[test]
    fn test_record_routing_by_typed_value() {
        let syntax = json!([
            {"t:type": "ssh", "m:host": "R:hostname", "s:port": "i:1,65535"},
            {"t:type": "rdp", "m:host": "R:hostname"}
        ]);
        assert!(run(json!([{"type": "ssh", "host": "h", "port": 22}]), syntax.clone()).is_empty());

        // routed to the rdp alternative, which has no port field
        let lines = run(json!([{"type": "rdp", "host": "h", "port": 22}]), syntax.clone());
        assert_eq!(lines, vec!["root->[0]: field `port` is not allowed"]);

        let lines = run(json!([{"type": "vnc", "host": "h"}]), syntax.clone());
        assert_eq!(
            lines,
            vec!["root->[0]: unexpected multi-field record that is either untyped or an unrecognised type"]
        );

        let lines = run(json!([{}]), syntax);
        assert_eq!(lines, vec!["root->[0]: unexpected empty record"]);
    }

    #[test]
    fn test_single_record_alternative_routes_unconditionally() {
        let lines = run(json!([{"other": 1}]), json!([{"m:host": "R:hostname"}]));
        assert_eq!(
            lines,
            vec![
                "root->[0]: mandatory field `host` is missing",
                "root->[0]: field `other` is not allowed",
            ]
        );
    }

    #[test]
    fn test_record_in_list_without_record_alternatives() {
        let lines = run(json!([{"a": 1}]), json!(["c:"]));
        assert_eq!(lines, vec!["root->[0]: is a record, but this list holds no records"]);
    }

    #[test]
    fn test_pattern_named_fields() {
        let syntax = json!({"s:R:user_name": {"m:shell": "R:unix_path"}});
        assert!(run(json!({"alice": {"shell": "/bin/sh"}, "bob": {"shell": "/bin/bash"}}), syntax.clone())
            .is_empty());

        let lines = run(json!({"Alice": {"shell": "/bin/sh"}}), syntax);
        assert_eq!(lines, vec!["root: field `Alice` is not allowed"]);
    }

    #[test]
    fn test_mandatory_pattern_named_field_presence() {
        let lines = run(json!({}), json!({"m:r:^user_[a-z]+$": "c:"}));
        assert_eq!(lines, vec!["root: mandatory field `r:^user_[a-z]+$` is missing"]);
    }

    #[test]
    fn test_custom_catch_all_accepts_unexamined() {
        let syntax = json!({"m:name": "R:name", "c:": "c:"});
        assert!(run(json!({"name": "x", "extra": {"deep": [1, 2]}}), syntax).is_empty());
    }

    #[test]
    fn test_typed_key_is_mandatory() {
        let lines = run(json!({"host": "h"}), json!({"t:type": "ssh", "m:host": "R:hostname"}));
        assert_eq!(lines, vec!["root: mandatory field `type` is missing"]);
    }

    #[test]
    fn test_scanning_continues_past_violations() {
        let lines = run(
            json!({"a": "x", "b": "y", "c": "z"}),
            json!({"m:a": "i:", "m:b": "i:", "m:c": "i:", "m:d": "i:"}),
        );
        assert_eq!(lines.len(), 4);
    }
}
