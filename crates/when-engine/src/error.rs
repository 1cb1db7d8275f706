//! Error types for when-engine operations.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum WhenError {
    #[error(
        "Ambiguous timezone in input. Use a format that encodes a timezone \
         (e.g. ISO 8601 strings or unix times), or name a timezone after the time"
    )]
    AmbiguousTimezone,

    #[error(
        "Multiple input timezones provided. Some formats already encode a \
         timezone (e.g. ISO 8601 strings or unix times)"
    )]
    ConflictingTimezone,

    #[error("Unknown timezone: {0}")]
    UnknownTimezone(String),

    #[error("Unrecognized time expression: '{0}'")]
    UnparseableInput(String),

    #[error("Invalid operation: {0}")]
    InvalidOperation(String),
}

pub type Result<T> = std::result::Result<T, WhenError>;
