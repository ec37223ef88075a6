//! Scalar value matching
//!
//! Tests one scalar (already rendered to text) against one leaf descriptor.
//! Matching has no side effects besides the optional observer callback, so
//! callers may try alternatives in any order.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::observability::MatchObserver;
use crate::schema::{PatternDescriptor, SchemaError, SchemaResult};

use super::registry::{compile_anchored, RegexRegistry};

static FLOAT_GRAMMAR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[-+]?(?:[0-9]+(?:\.[0-9]*)?|\.[0-9]+)(?:[eE][-+]?[0-9]+)?$")
        .expect("float grammar is valid")
});

static INT_GRAMMAR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[-+]?[0-9]+$").expect("integer grammar is valid"));

/// Matches scalars against leaf descriptors using one registry
#[derive(Clone, Copy)]
pub struct ValueMatcher<'a> {
    registry: &'a RegexRegistry,
    observer: Option<&'a dyn MatchObserver>,
}

impl<'a> ValueMatcher<'a> {
    pub fn new(registry: &'a RegexRegistry) -> Self {
        Self {
            registry,
            observer: None,
        }
    }

    /// Report every comparison to `observer`
    pub fn with_observer(mut self, observer: &'a dyn MatchObserver) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Tests `value` against `descriptor`.
    ///
    /// `None` stands for an absent value and never matches. On mismatch the
    /// expected shape is pushed onto `sink`, when one is given.
    ///
    /// # Errors
    ///
    /// Fails only for schema defects: unknown named pattern, unanchored or
    /// invalid inline regex, or a list marker used as a value pattern.
    pub fn matches(
        &self,
        descriptor: &PatternDescriptor,
        value: Option<&str>,
        sink: Option<&mut Vec<String>>,
    ) -> SchemaResult<bool> {
        let matched = match value {
            Some(text) => self.test(descriptor, text)?,
            None => {
                if descriptor.is_list_marker() {
                    return Err(list_marker_error(descriptor));
                }
                false
            }
        };

        if let Some(observer) = self.observer {
            observer.on_compare(descriptor, value, matched);
        }

        if !matched {
            if let Some(sink) = sink {
                sink.push(describe(descriptor));
            }
        }

        Ok(matched)
    }

    fn test(&self, descriptor: &PatternDescriptor, text: &str) -> SchemaResult<bool> {
        match descriptor {
            PatternDescriptor::Literal(literal) => Ok(literal == text),
            PatternDescriptor::FloatRange { min, max } => {
                if !FLOAT_GRAMMAR.is_match(text) {
                    return Ok(false);
                }
                let Ok(number) = text.parse::<f64>() else {
                    return Ok(false);
                };
                Ok(within(number, *min, *max))
            }
            PatternDescriptor::IntRange { min, max, step } => {
                if !INT_GRAMMAR.is_match(text) {
                    return Ok(false);
                }
                Ok(int_in_range(text, *min, *max, *step))
            }
            PatternDescriptor::NamedRegex(name) => Ok(self.registry.lookup(name)?.is_match(text)),
            PatternDescriptor::InlineRegex(pattern) => Ok(compile_anchored(pattern)?.is_match(text)),
            PatternDescriptor::Custom => Ok(true),
            PatternDescriptor::ListMarker(_) => Err(list_marker_error(descriptor)),
        }
    }
}

/// Integer text of any length against i64 bounds and step
fn int_in_range(text: &str, min: Option<i64>, max: Option<i64>, step: Option<i64>) -> bool {
    let negative = text.starts_with('-');
    let digits = text.trim_start_matches(|c: char| c == '-' || c == '+');

    let bounded = match text.parse::<i128>() {
        Ok(number) => within(number, min.map(i128::from), max.map(i128::from)),
        // beyond i128: above every i64 max when positive, below every min when negative
        Err(_) => {
            if negative {
                min.is_none()
            } else {
                max.is_none()
            }
        }
    };

    bounded && step.map_or(true, |s| remainder(digits, s) == 0)
}

/// Remainder of a decimal digit string, computed digit by digit
fn remainder(digits: &str, divisor: i64) -> i128 {
    let divisor = i128::from(divisor);
    digits.bytes().fold(0i128, |acc, digit| {
        (acc * 10 + i128::from(digit - b'0')) % divisor
    })
}

fn within<T: PartialOrd>(number: T, min: Option<T>, max: Option<T>) -> bool {
    min.map_or(true, |lo| number >= lo) && max.map_or(true, |hi| number <= hi)
}

fn list_marker_error(descriptor: &PatternDescriptor) -> SchemaError {
    SchemaError::malformed(
        &descriptor.to_string(),
        "list markers are never compared against data",
    )
}

/// Phrase describing what a descriptor expects
pub fn describe(descriptor: &PatternDescriptor) -> String {
    match descriptor {
        PatternDescriptor::Literal(literal) => format!("`{}`", literal),
        PatternDescriptor::NamedRegex(name) => format!("a value matching the `{}` pattern", name),
        PatternDescriptor::InlineRegex(pattern) => format!("a value matching `{}`", pattern),
        PatternDescriptor::FloatRange { min, max } => {
            format!("floating point number{}", bounds_phrase(min, max))
        }
        PatternDescriptor::IntRange { min, max, step } => {
            let mut phrase = format!("integer{}", bounds_phrase(min, max));
            if let Some(step) = step {
                phrase.push_str(&format!(" with a step size of {}", step));
            }
            phrase
        }
        PatternDescriptor::Custom => "anything".to_string(),
        PatternDescriptor::ListMarker(_) => format!("list marker `{}`", descriptor),
    }
}

fn bounds_phrase<T: std::fmt::Display>(min: &Option<T>, max: &Option<T>) -> String {
    match (min, max) {
        (Some(lo), Some(hi)) => format!(" between {} and {}", lo, hi),
        (Some(lo), None) => format!(" of at least {}", lo),
        (None, Some(hi)) => format!(" of at most {}", hi),
        (None, None) => String::new(),
    }
}
