//! Amount parsing
//!
//! Two forms:
//! - bare: `10.09K`, decimal mantissa with an optional power-of-1000
//!   multiplier, no unit
//! - data: `100Kib`, integer mantissa, optional multiplier (`i` for powers
//!   of 1024), then `b` for bytes or `B` for bits
//!
//! The mantissa is scaled in `u128` so exact results stay exact; the only
//! rounding happens in the final conversion to `f64`.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::patterns::{AMOUNT_DATA_SOURCE, AMOUNT_SOURCE};

use super::errors::{ConversionError, ConversionResult};

static AMOUNT: Lazy<Regex> =
    Lazy::new(|| Regex::new(AMOUNT_SOURCE).expect("amount source is valid"));

static AMOUNT_DATA: Lazy<Regex> =
    Lazy::new(|| Regex::new(AMOUNT_DATA_SOURCE).expect("amount_data source is valid"));

/// Unit domain of a data amount
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Domain {
    Bytes,
    Bits,
}

fn multiplier(symbol: Option<&str>, base: u128) -> u128 {
    let power = match symbol {
        Some("K") => 1,
        Some("M") => 2,
        Some("G") => 3,
        Some("T") => 4,
        _ => 0,
    };
    base.pow(power)
}

/// `"10.09"` becomes `(1009, 100)`
fn split_decimal(text: &str, original: &str) -> ConversionResult<(u128, u128)> {
    let overflow = || ConversionError::Overflow(original.to_string());
    let (whole, fraction) = text.split_once('.').unwrap_or((text, ""));

    let digits = format!("{}{}", whole, fraction);
    let numerator = digits.parse::<u128>().map_err(|_| overflow())?;
    let exponent = u32::try_from(fraction.len()).map_err(|_| overflow())?;
    let denominator = 10u128.checked_pow(exponent).ok_or_else(overflow)?;
    Ok((numerator, denominator))
}

fn to_f64(numerator: u128, denominator: u128) -> f64 {
    if numerator % denominator == 0 {
        (numerator / denominator) as f64
    } else {
        numerator as f64 / denominator as f64
    }
}

/// Number of units described by `text`.
///
/// Bare amounts are returned as written. Data amounts are returned in bits
/// when `want_bits` is set and in bytes otherwise, rescaling by 8 when the
/// input is in the other domain.
///
/// # Errors
///
/// `InvalidAmount` when neither form matches, `Overflow` when the scaled
/// value does not fit.
pub fn amount_to_units(text: &str, want_bits: bool) -> ConversionResult<f64> {
    let overflow = || ConversionError::Overflow(text.to_string());

    if let Some(caps) = AMOUNT.captures(text) {
        let mantissa = caps
            .name("mantissa")
            .ok_or_else(|| ConversionError::InvalidAmount(text.to_string()))?;
        let (numerator, denominator) = split_decimal(mantissa.as_str(), text)?;
        let factor = multiplier(caps.name("multiplier").map(|m| m.as_str()), 1000);
        let scaled = numerator.checked_mul(factor).ok_or_else(overflow)?;
        return Ok(to_f64(scaled, denominator));
    }

    let caps = AMOUNT_DATA
        .captures(text)
        .ok_or_else(|| ConversionError::InvalidAmount(text.to_string()))?;
    let (Some(mantissa), Some(unit)) = (caps.name("mantissa"), caps.name("unit")) else {
        return Err(ConversionError::InvalidAmount(text.to_string()));
    };

    let mantissa = mantissa.as_str().parse::<u128>().map_err(|_| overflow())?;
    let base = if caps.name("binary").is_some() { 1024 } else { 1000 };
    let factor = multiplier(caps.name("multiplier").map(|m| m.as_str()), base);
    let units = mantissa.checked_mul(factor).ok_or_else(overflow)?;

    let domain = if unit.as_str() == "B" {
        Domain::Bits
    } else {
        Domain::Bytes
    };

    match (domain, want_bits) {
        (Domain::Bytes, true) => units.checked_mul(8).map(|bits| bits as f64).ok_or_else(overflow),
        (Domain::Bits, false) => Ok(to_f64(units, 8)),
        _ => Ok(units as f64),
    }
}
