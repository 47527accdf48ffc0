//! Structured error types for indicator computation.
//!
//! Every compute entry point returns `Result<_, IndicatorError>`. Callers that
//! assemble frames treat any error as "no result" and contribute no column.

use thiserror::Error;

/// Reasons an indicator call produced no result.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum IndicatorError {
    #[error("insufficient data: need at least {required} bars, got {got}")]
    InsufficientData { required: usize, got: usize },

    #[error("emergency break: every value of {stage} is non-finite")]
    EmergencyBreak { stage: &'static str },

    #[error("{param} must be at least 1")]
    ZeroLength { param: &'static str },

    #[error("series length mismatch: expected {expected}, got {got}")]
    LengthMismatch { expected: usize, got: usize },

    #[error("reference backend failed: {0}")]
    Backend(String),
}

pub type Result<T> = std::result::Result<T, IndicatorError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_failure() {
        let err = IndicatorError::InsufficientData {
            required: 10,
            got: 3,
        };
        assert_eq!(
            err.to_string(),
            "insufficient data: need at least 10 bars, got 3"
        );

        let err = IndicatorError::EmergencyBreak { stage: "DEMA" };
        assert!(err.to_string().contains("DEMA"));

        let err = IndicatorError::ZeroLength { param: "length" };
        assert_eq!(err.to_string(), "length must be at least 1");
    }
}
