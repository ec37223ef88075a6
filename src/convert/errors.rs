//! # Conversion Errors

use thiserror::Error;

/// Result type for conversions
pub type ConversionResult<T> = Result<T, ConversionError>;

/// Conversion errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConversionError {
    #[error("`{0}` is not an amount")]
    InvalidAmount(String),

    #[error("`{0}` is not a duration")]
    InvalidDuration(String),

    #[error("`{0}` does not fit the result type")]
    Overflow(String),
}

impl ConversionError {
    /// Stable error code
    pub fn code(&self) -> &'static str {
        match self {
            ConversionError::InvalidAmount(_) => "CONVERT_INVALID_AMOUNT",
            ConversionError::InvalidDuration(_) => "CONVERT_INVALID_DURATION",
            ConversionError::Overflow(_) => "CONVERT_OVERFLOW",
        }
    }
}
