//! Error types for slot-engine operations.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SlotError {
    /// A request field violated its contract (non-positive duration, negative
    /// buffer, inverted window or interval, unparseable timestamp, ...).
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Unknown timezone: {0}")]
    UnknownTimezone(String),

    /// The caller-supplied JSON did not match the expected request shape.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
}

impl SlotError {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        SlotError::InvalidArgument(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, SlotError>;
