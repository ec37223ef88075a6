//! Schema Invariant Tests
//!
//! Schema compilation happens once, before any data is seen:
//! - Every descriptor is parsed into its typed form or rejected
//! - Named patterns must exist when the schema is compiled
//! - Record alternatives in one list must be distinguishable
//! - Rejection never depends on data

use serde_json::{json, Value};
use treecheck::patterns::RegexRegistry;
use treecheck::schema::{
    PatternDescriptor, RecordRouting, SchemaError, SchemaNode, SchemaValidator,
};

// =============================================================================
// Helper Functions
// =============================================================================

fn compile(syntax: Value) -> Result<SchemaNode, SchemaError> {
    let registry = RegexRegistry::with_builtins();
    SchemaValidator::new(&registry).compile(&syntax)
}

fn code(syntax: Value) -> &'static str {
    compile(syntax).unwrap_err().code()
}

// =============================================================================
// Descriptor Tests
// =============================================================================

#[test]
fn test_leaf_descriptors_compile_to_typed_form() {
    let node = compile(json!("i:10,100,5")).unwrap();
    assert_eq!(
        node,
        SchemaNode::Scalar(PatternDescriptor::IntRange {
            min: Some(10),
            max: Some(100),
            step: Some(5),
        })
    );

    let node = compile(json!("hello")).unwrap();
    assert_eq!(node, SchemaNode::Scalar(PatternDescriptor::Literal("hello".into())));
}

#[test]
fn test_malformed_descriptors_rejected() {
    assert_eq!(code(json!("i:a")), "SCHEMA_MALFORMED_DESCRIPTOR");
    assert_eq!(code(json!("i:1,2,3,4")), "SCHEMA_MALFORMED_DESCRIPTOR");
    assert_eq!(code(json!("x:1")), "SCHEMA_UNKNOWN_KIND");
    assert_eq!(code(json!("m:name")), "SCHEMA_MISPLACED_FIELD_KIND");
    assert_eq!(code(json!(42)), "SCHEMA_MISSING_DESCRIPTOR");
    assert_eq!(code(json!(null)), "SCHEMA_MISSING_DESCRIPTOR");
}

#[test]
fn test_range_rules() {
    assert_eq!(code(json!("i:10,1")), "SCHEMA_INVALID_RANGE");
    assert_eq!(code(json!("i:0,10,0")), "SCHEMA_INVALID_RANGE");
    assert_eq!(code(json!("i:0,10,-5")), "SCHEMA_INVALID_RANGE");
    assert_eq!(code(json!("i:1,10,5")), "SCHEMA_INVALID_RANGE");
    assert_eq!(code(json!("f:2.5,1")), "SCHEMA_INVALID_RANGE");
    assert_eq!(code(json!("f:inf")), "SCHEMA_INVALID_RANGE");

    assert!(compile(json!("i:,,5")).is_ok());
    assert!(compile(json!("f:,")).is_ok());
}

#[test]
fn test_pattern_references_checked_at_compile_time() {
    assert_eq!(code(json!("R:no_such_pattern")), "SCHEMA_UNKNOWN_PATTERN");
    assert_eq!(code(json!("r:[a-z]+")), "SCHEMA_UNANCHORED_PATTERN");
    assert_eq!(code(json!("r:^[a-z+$")), "SCHEMA_INVALID_PATTERN");
    assert!(compile(json!("R:ipv6_cidr")).is_ok());
}

// =============================================================================
// Sequence Tests
// =============================================================================

#[test]
fn test_list_marker_only_leads() {
    assert!(compile(json!(["l:choice_list,allow_empty_list", "c:"])).is_ok());
    assert_eq!(code(json!(["c:", "l:choice_list"])), "SCHEMA_MALFORMED_DESCRIPTOR");
    assert_eq!(code(json!(["l:choice_many", "c:"])), "SCHEMA_INVALID_LIST_MARKER");
}

#[test]
fn test_sequence_needs_an_alternative() {
    assert_eq!(code(json!([])), "SCHEMA_EMPTY_SEQUENCE");
    assert_eq!(code(json!(["l:choice_value"])), "SCHEMA_EMPTY_SEQUENCE");
}

/// Two record alternatives where one is untyped and multi-field are
/// rejected, whatever data would later be checked.
#[test]
fn test_ambiguous_record_alternatives_rejected() {
    let ambiguous = json!([
        {"t:type": "ssh", "m:host": "R:hostname"},
        {"m:host": "R:hostname", "m:port": "i:1,65535"}
    ]);
    assert_eq!(code(ambiguous), "SCHEMA_AMBIGUOUS_RECORDS");

    let two_typed = json!([{"t:a": "x", "t:b": "y"}, {"t:a": "z"}]);
    assert_eq!(code(two_typed), "SCHEMA_AMBIGUOUS_RECORDS");

    let nested = json!({"m:outer": [["c:"], [{"m:a": "c:", "m:b": "c:"}, {"m:c": "c:"}]]});
    assert_eq!(code(nested), "SCHEMA_AMBIGUOUS_RECORDS");
}

/// Alternatives that routing could never reach are rejected up front.
#[test]
fn test_indistinguishable_record_alternatives_rejected() {
    let same_name = json!({"m:menu": [
        {"m:ssh": {"m:host": "R:hostname"}},
        {"m:ssh": {"m:port": "i:1,65535"}}
    ]});
    assert_eq!(code(same_name), "SCHEMA_AMBIGUOUS_RECORDS");

    let same_type = json!([
        {"t:kind": "web", "m:listen": "i:1,65535"},
        {"t:kind": "web", "m:root": "R:unix_path"}
    ]);
    assert_eq!(code(same_type), "SCHEMA_AMBIGUOUS_RECORDS");
}

#[test]
fn test_record_routing_is_precomputed() {
    let single = compile(json!(["c:", {"m:a": "c:", "m:b": "c:"}])).unwrap();
    let SchemaNode::Sequence(seq) = single else {
        panic!("expected sequence");
    };
    assert_eq!(seq.routing(), RecordRouting::Single(1));

    let discriminated = compile(json!([{"m:ssh": "c:"}, {"t:type": "rdp", "m:x": "c:"}])).unwrap();
    let SchemaNode::Sequence(seq) = discriminated else {
        panic!("expected sequence");
    };
    assert_eq!(seq.routing(), RecordRouting::Discriminated);
}

// =============================================================================
// Record Tests
// =============================================================================

#[test]
fn test_record_key_rules() {
    assert_eq!(code(json!({"name": "c:"})), "SCHEMA_INVALID_FIELD_KEY");
    assert_eq!(code(json!({"m:": "c:"})), "SCHEMA_INVALID_FIELD_KEY");
    assert_eq!(code(json!({"t:type": ["c:"]})), "SCHEMA_INVALID_FIELD_KEY");
    assert_eq!(code(json!({"m:a": "c:", "s:a": "c:"})), "SCHEMA_DUPLICATE_FIELD");
}

#[test]
fn test_compilation_is_deterministic() {
    let syntax = json!({
        "m:config_version": "f:0",
        "m:menu": [{"m:rdp": {"m:name": "R:printable", "m:host": "R:hostname"}}]
    });
    let first = compile(syntax.clone()).unwrap();
    for _ in 0..10 {
        assert_eq!(compile(syntax.clone()).unwrap(), first);
    }
}

#[test]
fn test_local_patterns_visible_to_compiler() {
    let mut registry = RegexRegistry::with_builtins();
    registry.register("ticket", "^[A-Z]+-[0-9]+$").unwrap();
    let schema = SchemaValidator::new(&registry).compile(&json!({"m:id": "R:ticket"}));
    assert!(schema.is_ok());
}
