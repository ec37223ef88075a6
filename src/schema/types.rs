//! Compiled schema types
//!
//! A raw schema is a `serde_json::Value` whose leaves are descriptor strings
//! such as `R:hostname` or `i:1,10`. The schema validator parses it once into
//! the typed tree below; matching never re-parses descriptor text.
//!
//! Descriptor language (`<tag>:<argument>`):
//! - `f:min,max`       float value, optional inclusive bounds
//! - `i:min,max,step`  integer value, optional bounds and step
//! - `R:name`          registered regex
//! - `r:^pattern$`     inline anchored regex
//! - `l:kind[,allow_empty_list]` list semantics marker
//! - `c:`              catch-all
//! - anything else     literal string
//!
//! Record keys use `m:name`, `s:name`, `t:name` and `c:`.

use std::fmt;

use super::errors::{SchemaError, SchemaResult};

/// Whether a list holds several values or may stand in for a single one
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChoiceKind {
    /// `choice_list`: the field is always a list
    List,
    /// `choice_value`: the field may also be one lone value from the list's alternatives
    Value,
}

impl ChoiceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChoiceKind::List => "choice_list",
            ChoiceKind::Value => "choice_value",
        }
    }
}

/// Leading marker of a schema list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListMarker {
    pub kind: ChoiceKind,
    pub allow_empty: bool,
}

/// Leaf pattern of a schema
#[derive(Debug, Clone, PartialEq)]
pub enum PatternDescriptor {
    /// Exact string match
    Literal(String),
    /// Pattern looked up by name in the regex registry
    NamedRegex(String),
    /// Anchored regex written directly in the schema
    InlineRegex(String),
    /// Decimal number with optional inclusive bounds
    FloatRange { min: Option<f64>, max: Option<f64> },
    /// Integer with optional inclusive bounds and step
    IntRange {
        min: Option<i64>,
        max: Option<i64>,
        step: Option<i64>,
    },
    /// Anything
    Custom,
    /// List semantics, never compared against data
    ListMarker(ListMarker),
}

impl PatternDescriptor {
    /// Parses descriptor text.
    ///
    /// A string is a descriptor when it starts with an ASCII letter followed
    /// by `:`. Every other string is a literal.
    pub fn parse(text: &str) -> SchemaResult<Self> {
        let Some((tag, argument)) = split_tag(text) else {
            return Ok(PatternDescriptor::Literal(text.to_string()));
        };

        match tag {
            'f' => parse_float_range(text, argument),
            'i' => parse_int_range(text, argument),
            'R' => {
                if argument.is_empty() {
                    return Err(SchemaError::malformed(text, "pattern name is empty"));
                }
                Ok(PatternDescriptor::NamedRegex(argument.to_string()))
            }
            'r' => {
                if !is_anchored(argument) {
                    return Err(SchemaError::UnanchoredPattern(argument.to_string()));
                }
                Ok(PatternDescriptor::InlineRegex(argument.to_string()))
            }
            'l' => parse_list_marker(text, argument),
            'c' => {
                if !argument.is_empty() {
                    return Err(SchemaError::malformed(text, "c: takes no argument"));
                }
                Ok(PatternDescriptor::Custom)
            }
            'm' | 's' | 't' => Err(SchemaError::MisplacedFieldKind {
                tag,
                descriptor: text.to_string(),
            }),
            _ => Err(SchemaError::UnknownKind {
                tag,
                descriptor: text.to_string(),
            }),
        }
    }

    pub fn is_list_marker(&self) -> bool {
        matches!(self, PatternDescriptor::ListMarker(_))
    }
}

impl fmt::Display for PatternDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PatternDescriptor::Literal(text) => write!(f, "{}", text),
            PatternDescriptor::NamedRegex(name) => write!(f, "R:{}", name),
            PatternDescriptor::InlineRegex(pattern) => write!(f, "r:{}", pattern),
            PatternDescriptor::FloatRange { min, max } => {
                write!(f, "f:{},{}", opt(min), opt(max))
            }
            PatternDescriptor::IntRange { min, max, step } => {
                write!(f, "i:{},{},{}", opt(min), opt(max), opt(step))
            }
            PatternDescriptor::Custom => write!(f, "c:"),
            PatternDescriptor::ListMarker(marker) => {
                write!(f, "l:{}", marker.kind.as_str())?;
                if marker.allow_empty {
                    write!(f, ",allow_empty_list")?;
                }
                Ok(())
            }
        }
    }
}

fn opt<T: fmt::Display>(value: &Option<T>) -> String {
    value.as_ref().map(|v| v.to_string()).unwrap_or_default()
}

/// Returns true if the regex text is wrapped in `^...$`
pub(crate) fn is_anchored(pattern: &str) -> bool {
    pattern.len() >= 2 && pattern.starts_with('^') && pattern.ends_with('$')
}

fn split_tag(text: &str) -> Option<(char, &str)> {
    let mut chars = text.chars();
    let tag = chars.next()?;
    if !tag.is_ascii_alphabetic() || chars.next()? != ':' {
        return None;
    }
    Some((tag, &text[2..]))
}

fn parse_float_range(text: &str, argument: &str) -> SchemaResult<PatternDescriptor> {
    let parts = split_arguments(text, argument, 2)?;
    let min = parse_bound::<f64>(text, parts[0])?;
    let max = parse_bound::<f64>(text, parts[1])?;

    for bound in [min, max].into_iter().flatten() {
        if !bound.is_finite() {
            return Err(SchemaError::invalid_range(text, "bounds must be finite"));
        }
    }
    if let (Some(lo), Some(hi)) = (min, max) {
        if lo > hi {
            return Err(SchemaError::invalid_range(text, "min is greater than max"));
        }
    }

    Ok(PatternDescriptor::FloatRange { min, max })
}

fn parse_int_range(text: &str, argument: &str) -> SchemaResult<PatternDescriptor> {
    let parts = split_arguments(text, argument, 3)?;
    let min = parse_bound::<i64>(text, parts[0])?;
    let max = parse_bound::<i64>(text, parts[1])?;
    let step = parse_bound::<i64>(text, parts[2])?;

    if let (Some(lo), Some(hi)) = (min, max) {
        if lo > hi {
            return Err(SchemaError::invalid_range(text, "min is greater than max"));
        }
    }
    if let Some(step) = step {
        if step <= 0 {
            return Err(SchemaError::invalid_range(text, "step must be positive"));
        }
        for bound in [min, max].into_iter().flatten() {
            if bound % step != 0 {
                return Err(SchemaError::invalid_range(
                    text,
                    format!("step {} does not evenly divide bound {}", step, bound),
                ));
            }
        }
    }

    Ok(PatternDescriptor::IntRange { min, max, step })
}

/// Splits a comma separated argument into exactly `count` slots, padding
/// missing trailing slots with empty strings.
fn split_arguments<'a>(text: &str, argument: &'a str, count: usize) -> SchemaResult<Vec<&'a str>> {
    let mut parts: Vec<&str> = if argument.is_empty() {
        Vec::new()
    } else {
        argument.split(',').map(str::trim).collect()
    };
    if parts.len() > count {
        return Err(SchemaError::malformed(
            text,
            format!("expected at most {} comma separated values", count),
        ));
    }
    parts.resize(count, "");
    Ok(parts)
}

fn parse_bound<T: std::str::FromStr>(text: &str, part: &str) -> SchemaResult<Option<T>> {
    if part.is_empty() {
        return Ok(None);
    }
    part.parse::<T>()
        .map(Some)
        .map_err(|_| SchemaError::malformed(text, format!("`{}` is not a number", part)))
}

fn parse_list_marker(text: &str, argument: &str) -> SchemaResult<PatternDescriptor> {
    let (kind, rest) = match argument.split_once(',') {
        Some((kind, rest)) => (kind, Some(rest)),
        None => (argument, None),
    };
    let kind = match kind {
        "choice_list" => ChoiceKind::List,
        "choice_value" => ChoiceKind::Value,
        _ => return Err(SchemaError::InvalidListMarker(text.to_string())),
    };
    let allow_empty = match rest {
        None => false,
        Some("allow_empty_list") => true,
        Some(_) => return Err(SchemaError::InvalidListMarker(text.to_string())),
    };
    Ok(PatternDescriptor::ListMarker(ListMarker { kind, allow_empty }))
}

/// How a record key constrains presence and routing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// `m:` must be present
    Mandatory,
    /// `s:` may be present
    Optional,
    /// `t:` must be present; its value identifies the record's alternative
    Typed,
    /// `c:` accepts any field no other key recognises
    Custom,
}

impl FieldKind {
    pub fn tag(&self) -> char {
        match self {
            FieldKind::Mandatory => 'm',
            FieldKind::Optional => 's',
            FieldKind::Typed => 't',
            FieldKind::Custom => 'c',
        }
    }

    /// Mandatory and typed keys must appear in the data
    pub fn is_required(&self) -> bool {
        matches!(self, FieldKind::Mandatory | FieldKind::Typed)
    }
}

/// Parsed record key
#[derive(Debug, Clone, PartialEq)]
pub struct FieldKey {
    kind: FieldKind,
    name: String,
    pattern: PatternDescriptor,
}

impl FieldKey {
    /// Parses a raw record key such as `m:host`, `s:R:user_name` or `c:`.
    pub fn parse(key: &str) -> SchemaResult<Self> {
        let Some((tag, name)) = split_tag(key) else {
            return Err(SchemaError::invalid_key(key, "expected m:, s:, t: or c: prefix"));
        };

        let kind = match tag {
            'm' => FieldKind::Mandatory,
            's' => FieldKind::Optional,
            't' => FieldKind::Typed,
            'c' => {
                if !name.is_empty() {
                    return Err(SchemaError::invalid_key(key, "c: takes no name"));
                }
                return Ok(Self {
                    kind: FieldKind::Custom,
                    name: String::new(),
                    pattern: PatternDescriptor::Custom,
                });
            }
            _ => return Err(SchemaError::invalid_key(key, "expected m:, s:, t: or c: prefix")),
        };

        if name.is_empty() {
            return Err(SchemaError::invalid_key(key, "field name is empty"));
        }

        // Only regex descriptors are meaningful as key names; anything else
        // containing a colon is taken literally.
        let pattern = match split_tag(name) {
            Some(('R', _)) | Some(('r', _)) => PatternDescriptor::parse(name)?,
            _ => PatternDescriptor::Literal(name.to_string()),
        };

        Ok(Self {
            kind,
            name: name.to_string(),
            pattern,
        })
    }

    pub fn kind(&self) -> FieldKind {
        self.kind
    }

    /// Raw name text as written after the kind tag (empty for `c:`)
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Pattern the data field name is compared with
    pub fn pattern(&self) -> &PatternDescriptor {
        &self.pattern
    }

    /// Literal field name, if the key is not pattern-named
    pub fn literal_name(&self) -> Option<&str> {
        match &self.pattern {
            PatternDescriptor::Literal(name) => Some(name),
            _ => None,
        }
    }

    pub fn is_custom(&self) -> bool {
        self.kind == FieldKind::Custom
    }
}

impl fmt::Display for FieldKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind.tag(), self.name)
    }
}

/// Record routing policy for a list, precomputed at compile time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordRouting {
    /// No record alternative: records are rejected
    None,
    /// One record alternative, at this index in `alternatives`
    Single(usize),
    /// Several record alternatives, told apart by single field name or typed field value
    Discriminated,
}

/// Compiled schema list
#[derive(Debug, Clone, PartialEq)]
pub struct SequenceSchema {
    pub(crate) marker: Option<ListMarker>,
    pub(crate) alternatives: Vec<SchemaNode>,
    pub(crate) routing: RecordRouting,
}

impl SequenceSchema {
    pub fn marker(&self) -> Option<ListMarker> {
        self.marker
    }

    /// Alternatives in declaration order, without the list marker
    pub fn alternatives(&self) -> &[SchemaNode] {
        &self.alternatives
    }

    pub fn routing(&self) -> RecordRouting {
        self.routing
    }

    pub fn allows_empty(&self) -> bool {
        self.marker.map_or(false, |m| m.allow_empty)
    }

    /// True when a lone value may stand in for the list
    pub fn accepts_lone_value(&self) -> bool {
        self.marker.map_or(false, |m| m.kind == ChoiceKind::Value)
    }

    pub fn scalar_alternatives(&self) -> impl Iterator<Item = &PatternDescriptor> {
        self.alternatives.iter().filter_map(|alt| match alt {
            SchemaNode::Scalar(descriptor) => Some(descriptor),
            _ => None,
        })
    }

    pub fn sequence_alternatives(&self) -> impl Iterator<Item = &SequenceSchema> {
        self.alternatives.iter().filter_map(|alt| match alt {
            SchemaNode::Sequence(seq) => Some(seq),
            _ => None,
        })
    }

    pub fn record_alternatives(&self) -> impl Iterator<Item = &RecordSchema> {
        self.alternatives.iter().filter_map(|alt| match alt {
            SchemaNode::Record(record) => Some(record),
            _ => None,
        })
    }
}

/// Compiled schema record
#[derive(Debug, Clone, PartialEq)]
pub struct RecordSchema {
    pub(crate) fields: Vec<(FieldKey, SchemaNode)>,
}

impl RecordSchema {
    pub fn fields(&self) -> &[(FieldKey, SchemaNode)] {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn has_custom(&self) -> bool {
        self.fields.iter().any(|(key, _)| key.is_custom())
    }

    /// Looks up a literal key of the given kind
    pub fn literal(&self, kind: FieldKind, name: &str) -> Option<&SchemaNode> {
        self.fields
            .iter()
            .find(|(key, _)| key.kind() == kind && key.literal_name() == Some(name))
            .map(|(_, node)| node)
    }

    /// Typed keys with their value descriptors
    pub fn typed_fields(&self) -> impl Iterator<Item = (&FieldKey, &SchemaNode)> {
        self.fields
            .iter()
            .filter(|(key, _)| key.kind() == FieldKind::Typed)
            .map(|(key, node)| (key, node))
    }
}

/// Compiled schema node
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaNode {
    Scalar(PatternDescriptor),
    Sequence(SequenceSchema),
    Record(RecordSchema),
}

impl SchemaNode {
    /// Short shape name for messages
    pub fn shape_name(&self) -> &'static str {
        match self {
            SchemaNode::Scalar(_) => "value",
            SchemaNode::Sequence(_) => "list",
            SchemaNode::Record(_) => "record",
        }
    }
}
