//! Decoding errors for EDR catalog responses.

use thiserror::Error;

pub type CovJsonResult<T> = Result<T, CovJsonError>;

/// Errors raised while interpreting EDR / CoverageJSON documents.
#[derive(Debug, Error)]
pub enum CovJsonError {
    /// A required domain axis is absent.
    #[error("Missing axis: {0}")]
    MissingAxis(String),

    /// An axis exists but cannot be read as requested.
    #[error("Invalid axis '{axis}': {message}")]
    InvalidAxis { axis: String, message: String },

    /// The document carries no range for a parameter.
    #[error("Missing range for parameter: {0}")]
    MissingRange(String),

    /// A range's shape does not agree with the domain.
    #[error("Shape mismatch for '{parameter}': {message}")]
    ShapeMismatch { parameter: String, message: String },

    /// Extent metadata is malformed.
    #[error("Invalid extent: {0}")]
    InvalidExtent(String),
}
