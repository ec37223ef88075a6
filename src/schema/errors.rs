//! Schema error types
//!
//! A `SchemaError` always means the schema (or a pattern registered for it)
//! was authored incorrectly. Problems with the data being checked are never
//! reported through this type; they are accumulated as violation text.
//!
//! Error codes:
//! - SCHEMA_MALFORMED_DESCRIPTOR
//! - SCHEMA_UNKNOWN_KIND
//! - SCHEMA_MISPLACED_FIELD_KIND
//! - SCHEMA_MISSING_DESCRIPTOR
//! - SCHEMA_UNKNOWN_PATTERN
//! - SCHEMA_UNANCHORED_PATTERN
//! - SCHEMA_INVALID_PATTERN
//! - SCHEMA_INVALID_PATTERN_NAME
//! - SCHEMA_PROTECTED_PATTERN
//! - SCHEMA_INVALID_RANGE
//! - SCHEMA_INVALID_LIST_MARKER
//! - SCHEMA_AMBIGUOUS_RECORDS
//! - SCHEMA_INVALID_FIELD_KEY
//! - SCHEMA_DUPLICATE_FIELD
//! - SCHEMA_EMPTY_SEQUENCE

use thiserror::Error;

/// Result type for schema operations
pub type SchemaResult<T> = Result<T, SchemaError>;

/// Schema authoring errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    // ==================
    // Descriptor Errors
    // ==================
    /// Descriptor argument could not be parsed
    #[error("malformed descriptor `{descriptor}`: {reason}")]
    MalformedDescriptor { descriptor: String, reason: String },

    /// Kind tag is not part of the descriptor language
    #[error("unknown descriptor kind `{tag}` in `{descriptor}`")]
    UnknownKind { tag: char, descriptor: String },

    /// Field key tag (m/s/t) used where a value pattern was expected
    #[error("field kind `{tag}:` cannot be used as a value pattern in `{descriptor}`")]
    MisplacedFieldKind { tag: char, descriptor: String },

    /// A descriptor was expected but the schema node is absent or not a string
    #[error("missing descriptor: {0}")]
    MissingDescriptor(String),

    // ==================
    // Pattern Errors
    // ==================
    /// Named pattern is not registered
    #[error("unknown named pattern `{0}`")]
    UnknownPattern(String),

    /// Regex is not wrapped in `^...$`
    #[error("pattern `{0}` must be anchored with ^ and $")]
    UnanchoredPattern(String),

    /// Regex failed to compile
    #[error("invalid pattern `{pattern}`: {reason}")]
    InvalidPattern { pattern: String, reason: String },

    /// Pattern name contains characters outside [-_.A-Za-z0-9]
    #[error("invalid pattern name `{0}`")]
    InvalidPatternName(String),

    /// Attempt to overwrite a pattern other components depend on
    #[error("pattern `{0}` is protected and cannot be replaced")]
    ProtectedPattern(String),

    // ==================
    // Shape Errors
    // ==================
    /// Numeric range bounds or step are inconsistent
    #[error("invalid range `{descriptor}`: {reason}")]
    InvalidRange { descriptor: String, reason: String },

    /// List marker argument is not one of the recognised forms
    #[error("invalid list marker `{0}`: expected l:choice_list or l:choice_value, optionally followed by ,allow_empty_list")]
    InvalidListMarker(String),

    /// Record alternatives in one list cannot be told apart
    #[error("ambiguous record alternatives: {0}")]
    AmbiguousRecords(String),

    /// Record key is not m:/s:/t:/c:
    #[error("invalid field key `{key}`: {reason}")]
    InvalidFieldKey { key: String, reason: String },

    /// Same field name declared twice under different kinds
    #[error("field `{0}` is declared more than once")]
    DuplicateField(String),

    /// Schema list has no alternatives to match against
    #[error("list declares no alternatives")]
    EmptySequence,
}

impl SchemaError {
    /// Returns the stable error code
    pub fn code(&self) -> &'static str {
        match self {
            SchemaError::MalformedDescriptor { .. } => "SCHEMA_MALFORMED_DESCRIPTOR",
            SchemaError::UnknownKind { .. } => "SCHEMA_UNKNOWN_KIND",
            SchemaError::MisplacedFieldKind { .. } => "SCHEMA_MISPLACED_FIELD_KIND",
            SchemaError::MissingDescriptor(_) => "SCHEMA_MISSING_DESCRIPTOR",
            SchemaError::UnknownPattern(_) => "SCHEMA_UNKNOWN_PATTERN",
            SchemaError::UnanchoredPattern(_) => "SCHEMA_UNANCHORED_PATTERN",
            SchemaError::InvalidPattern { .. } => "SCHEMA_INVALID_PATTERN",
            SchemaError::InvalidPatternName(_) => "SCHEMA_INVALID_PATTERN_NAME",
            SchemaError::ProtectedPattern(_) => "SCHEMA_PROTECTED_PATTERN",
            SchemaError::InvalidRange { .. } => "SCHEMA_INVALID_RANGE",
            SchemaError::InvalidListMarker(_) => "SCHEMA_INVALID_LIST_MARKER",
            SchemaError::AmbiguousRecords(_) => "SCHEMA_AMBIGUOUS_RECORDS",
            SchemaError::InvalidFieldKey { .. } => "SCHEMA_INVALID_FIELD_KEY",
            SchemaError::DuplicateField(_) => "SCHEMA_DUPLICATE_FIELD",
            SchemaError::EmptySequence => "SCHEMA_EMPTY_SEQUENCE",
        }
    }

    pub(crate) fn malformed(descriptor: &str, reason: impl Into<String>) -> Self {
        SchemaError::MalformedDescriptor {
            descriptor: descriptor.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn invalid_range(descriptor: &str, reason: impl Into<String>) -> Self {
        SchemaError::InvalidRange {
            descriptor: descriptor.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn invalid_key(key: &str, reason: impl Into<String>) -> Self {
        SchemaError::InvalidFieldKey {
            key: key.to_string(),
            reason: reason.into(),
        }
    }
}
