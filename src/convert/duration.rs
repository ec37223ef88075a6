//! Duration parsing (`<digits><unit>`)

use once_cell::sync::Lazy;
use regex::Regex;

use crate::patterns::DURATION_SOURCE;

use super::errors::{ConversionError, ConversionResult};

static DURATION: Lazy<Regex> =
    Lazy::new(|| Regex::new(DURATION_SOURCE).expect("duration source is valid"));

/// Length of one unit in seconds; `ms` is handled separately
fn unit_seconds(unit: &str) -> u64 {
    match unit {
        "m" => 60,
        "h" => 3_600,
        "d" => 86_400,
        "w" => 604_800,
        _ => 1,
    }
}

/// Parsed count and unit
fn parse(text: &str) -> ConversionResult<(u64, &str)> {
    let invalid = || ConversionError::InvalidDuration(text.to_string());
    let caps = DURATION.captures(text).ok_or_else(invalid)?;
    let (Some(value), Some(unit)) = (caps.name("value"), caps.name("unit")) else {
        return Err(invalid());
    };
    let value = value
        .as_str()
        .parse::<u64>()
        .map_err(|_| ConversionError::Overflow(text.to_string()))?;
    Ok((value, unit.as_str()))
}

/// `2m` is 120, `55ms` is 0.055
pub fn duration_to_seconds(text: &str) -> ConversionResult<f64> {
    let (value, unit) = parse(text)?;
    if unit == "ms" {
        return Ok(value as f64 / 1000.0);
    }
    value
        .checked_mul(unit_seconds(unit))
        .map(|seconds| seconds as f64)
        .ok_or_else(|| ConversionError::Overflow(text.to_string()))
}

/// `2m` is 120000, `55ms` is 55
pub fn duration_to_milliseconds(text: &str) -> ConversionResult<u64> {
    let (value, unit) = parse(text)?;
    if unit == "ms" {
        return Ok(value);
    }
    value
        .checked_mul(unit_seconds(unit))
        .and_then(|seconds| seconds.checked_mul(1000))
        .ok_or_else(|| ConversionError::Overflow(text.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seconds_per_unit() {
        assert_eq!(duration_to_seconds("2m").unwrap(), 120.0);
        assert_eq!(duration_to_seconds("55ms").unwrap(), 0.055);
        assert_eq!(duration_to_seconds("30s").unwrap(), 30.0);
        assert_eq!(duration_to_seconds("1h").unwrap(), 3600.0);
        assert_eq!(duration_to_seconds("2d").unwrap(), 172_800.0);
        assert_eq!(duration_to_seconds("1w").unwrap(), 604_800.0);
    }

    #[test]
    fn test_milliseconds() {
        assert_eq!(duration_to_milliseconds("55ms").unwrap(), 55);
        assert_eq!(duration_to_milliseconds("2m").unwrap(), 120_000);
        assert_eq!(duration_to_milliseconds("0s").unwrap(), 0);
    }

    #[test]
    fn test_rejects_malformed() {
        for text in ["", "5", "m", "1.5s", "-1s", "5y", "5 s", "5S"] {
            assert_eq!(
                duration_to_seconds(text),
                Err(ConversionError::InvalidDuration(text.to_string())),
                "{}",
                text
            );
        }
    }

    #[test]
    fn test_overflow() {
        let err = duration_to_milliseconds("99999999999999999999w").unwrap_err();
        assert_eq!(err.code(), "CONVERT_OVERFLOW");
        assert!(duration_to_milliseconds("18446744073709551615w").is_err());
    }
}
