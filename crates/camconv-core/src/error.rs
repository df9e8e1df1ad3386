//! Error type shared by every converter and camera constructor.

use thiserror::Error;

/// Result alias used throughout the workspace.
pub type Result<T> = std::result::Result<T, CameraError>;

/// Errors raised while validating, building or converting cameras.
///
/// Every converter validates its inputs before computing anything, so an
/// error never comes with a partial result.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CameraError {
    /// Batch lengths disagree, or an array has the wrong inner shape.
    #[error("shape mismatch in {what}: expected {expected}, got {got}")]
    ShapeMismatch {
        what: String,
        expected: String,
        got: String,
    },
    /// The convention name is not present in the registry.
    #[error("unknown camera convention `{0}`")]
    UnknownConvention(String),
    /// A convention with this name is already registered.
    #[error("camera convention `{0}` is already registered")]
    DuplicateConvention(String),
    /// A conversion needs a value (resolution, zmean, ...) that was not supplied.
    #[error("missing parameter `{name}`: {reason}")]
    MissingParameter { name: &'static str, reason: String },
    /// Parameters cannot be resolved into a valid camera or descriptor.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
    /// A batch index is outside the batch.
    #[error("index {index} out of range for batch of {len}")]
    IndexOutOfRange { index: usize, len: usize },
    /// Factory configuration failed to parse.
    #[error("invalid camera configuration: {0}")]
    Config(String),
}

impl CameraError {
    /// Shorthand for [`CameraError::ShapeMismatch`].
    pub fn shape(
        what: impl Into<String>,
        expected: impl ToString,
        got: impl ToString,
    ) -> Self {
        Self::ShapeMismatch {
            what: what.into(),
            expected: expected.to_string(),
            got: got.to_string(),
        }
    }

    /// Shorthand for [`CameraError::MissingParameter`].
    pub fn missing(name: &'static str, reason: impl Into<String>) -> Self {
        Self::MissingParameter {
            name,
            reason: reason.into(),
        }
    }
}
