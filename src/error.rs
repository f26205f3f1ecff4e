//! Crate error types
//!
//! Only configuration mistakes and host I/O are errors. Data coming out of the
//! simulation itself is clamped, never rejected.

use thiserror::Error;

/// Crate result type
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by the simulation core and its persistence helpers
#[derive(Debug, Error)]
pub enum Error {
    /// A tuning or scheduler parameter is outside its legal domain
    #[error("invalid configuration: {field} = {value} ({reason})")]
    InvalidConfiguration {
        field: &'static str,
        value: String,
        reason: &'static str,
    },

    #[error("storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    pub(crate) fn invalid(field: &'static str, value: impl ToString, reason: &'static str) -> Self {
        Self::InvalidConfiguration {
            field,
            value: value.to_string(),
            reason,
        }
    }
}

/// Reject anything that is not a finite, strictly positive number
pub(crate) fn require_positive(field: &'static str, value: f64) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(Error::invalid(field, value, "must be a finite positive number"))
    }
}

/// Reject NaN and infinities
pub(crate) fn require_finite(field: &'static str, value: f64) -> Result<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(Error::invalid(field, value, "must be finite"))
    }
}

/// Reject anything that is not a finite, non-negative number
pub(crate) fn require_non_negative(field: &'static str, value: f64) -> Result<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(Error::invalid(field, value, "must be a finite non-negative number"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_positive_guard() {
        assert!(require_positive("step", 0.5).is_ok());
        assert!(require_positive("step", 0.0).is_err());
        assert!(require_positive("step", f64::NAN).is_err());
        assert!(require_positive("step", f64::INFINITY).is_err());
    }

    #[test]
    fn test_error_message_names_field() {
        let err = require_non_negative("decay", -1.0).unwrap_err();
        assert!(err.to_string().contains("decay"));
    }
}
