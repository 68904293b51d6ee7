//! Error taxonomy for the recommendation workflow
//!
//! - `ValidationError`: bad or missing input, caught before any provider call
//! - `RequestError`: the provider could not produce a prediction
//! - `SubmitError`: what a single submission reports back to the caller
//!
//! None of these are fatal. A session that sees any of them is back in `Idle`
//! with its history untouched.

use crate::sample::SampleField;
use thiserror::Error;

/// Input rejected during validation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("{field} is required")]
    Missing { field: SampleField },

    #[error("{field} must be a number (got {input:?})")]
    NotANumber { field: SampleField, input: String },

    #[error("{field} must be between {min} and {max} (got {value})")]
    OutOfRange {
        field: SampleField,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("{field} must not be negative (got {value})")]
    Negative { field: SampleField, value: f64 },

    #[error("{field} is not a known soil type (got {input:?})")]
    UnknownSoilType { field: SampleField, input: String },
}

impl ValidationError {
    /// Field the error refers to, for inline form feedback
    pub fn field(&self) -> SampleField {
        match self {
            ValidationError::Missing { field }
            | ValidationError::NotANumber { field, .. }
            | ValidationError::OutOfRange { field, .. }
            | ValidationError::Negative { field, .. }
            | ValidationError::UnknownSoilType { field, .. } => *field,
        }
    }
}

/// Provider failure. Always retryable from the user's point of view.
#[derive(Debug, Error)]
pub enum RequestError {
    #[error("recommendation service unreachable: {0}")]
    Transport(String),

    #[error("recommendation service did not answer within {0:?}")]
    Timeout(std::time::Duration),

    #[error("recommendation service returned HTTP {0}")]
    Status(u16),

    #[error("recommendation service sent an unreadable response: {0}")]
    Malformed(String),

    #[error("recommendation service reported an error: {0}")]
    Service(String),
}

/// Outcome of a failed submission
#[derive(Debug, Error)]
pub enum SubmitError {
    #[error("invalid sample: {0}")]
    Rejected(#[from] ValidationError),

    #[error("recommendation failed: {0}")]
    Failed(#[from] RequestError),

    #[error("a recommendation request is already in progress for this session")]
    InFlight,
}

impl SubmitError {
    /// Whether resubmitting the same input could succeed
    pub fn is_retryable(&self) -> bool {
        !matches!(self, SubmitError::Rejected(_))
    }
}
