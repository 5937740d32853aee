//! Error types for analysis acquisition.

use thiserror::Error;

/// Result type alias using WxError.
pub type WxResult<T> = Result<T, WxError>;

/// Primary error type for acquisition and synchronization.
#[derive(Debug, Error)]
pub enum WxError {
    // === Validation Errors ===
    #[error("Invalid extent: {0}")]
    InvalidExtent(String),

    #[error("Field not found: {field} (valid time {valid_time})")]
    FieldNotFound { field: String, valid_time: String },

    // === Data Errors ===
    #[error("Data not available: {0}")]
    DataUnavailable(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Failed to decode payload: {0}")]
    Decode(String),

    // === Setup Errors ===
    #[error("Configuration error: {0}")]
    Config(String),
}

impl WxError {
    /// Whether a failed fetch may succeed when attempted again.
    ///
    /// Malformed requests and absent fields are permanent; network and
    /// payload problems, or a product that has not been published yet, are not.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            WxError::DataUnavailable(_) | WxError::Transport(_) | WxError::Decode(_)
        )
    }

    pub fn field_not_found(field: impl Into<String>, valid_time: impl ToString) -> Self {
        WxError::FieldNotFound {
            field: field.into(),
            valid_time: valid_time.to_string(),
        }
    }
}
