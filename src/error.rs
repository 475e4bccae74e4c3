//! Error types for the recognition pipeline.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while loading resources or classifying a landmark frame.
///
/// | Category | Variants | Caller response |
/// |----------|----------|-----------------|
/// | Validation | InvalidLandmarks | Fix the request |
/// | Availability | ModelUnavailable | Report a server-side failure |
/// | Startup | ModelLoad, LabelLoad, Incompatible | Fix the model resources |
/// | Inference | Inference | Report a server-side failure |
///
/// A low-confidence classification is not an error; it is reported as
/// [`Classification::none`](crate::classifier::Classification::none).
#[derive(Debug, Error)]
pub enum SignError {
    /// The landmark input was rejected before any numeric work.
    #[error("{reason}")]
    InvalidLandmarks {
        /// Human-readable rejection reason.
        reason: String,
    },

    /// The model or label table is not loaded.
    #[error("Model not loaded: {reason}")]
    ModelUnavailable {
        /// Why the classifier is unavailable.
        reason: String,
    },

    /// The scoring model could not be loaded.
    #[error("Failed to load model {}: {reason}", .path.display())]
    ModelLoad {
        /// Model file that was being loaded.
        path: PathBuf,
        /// Underlying failure.
        reason: String,
    },

    /// The label table could not be loaded.
    #[error("Failed to load labels {}: {reason}", .path.display())]
    LabelLoad {
        /// Label file that was being loaded.
        path: PathBuf,
        /// Underlying failure.
        reason: String,
    },

    /// The model and label table do not fit together.
    #[error("Model and labels are incompatible: {reason}")]
    Incompatible {
        /// Mismatch description.
        reason: String,
    },

    /// The model failed while scoring a feature vector.
    #[error("Inference failed: {reason}")]
    Inference {
        /// Underlying failure.
        reason: String,
    },
}

impl SignError {
    /// Creates an input validation error.
    pub fn invalid(reason: impl Into<String>) -> Self {
        Self::InvalidLandmarks {
            reason: reason.into(),
        }
    }

    /// Creates an inference error.
    pub fn inference(reason: impl std::fmt::Display) -> Self {
        Self::Inference {
            reason: reason.to_string(),
        }
    }

    /// Returns true if the error was caused by the caller's input.
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::InvalidLandmarks { .. })
    }
}

/// Result alias for pipeline operations.
pub type SignResult<T> = Result<T, SignError>;
