//! Error types for the diagram pipeline.

use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, VisualizerError>;

/// Everything that can stop a diagram from being produced.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum VisualizerError {
    /// The model has no resolvable input width, even after a build attempt.
    #[error("model has no resolvable input shape: {reason}")]
    ModelNotBuildable { reason: String },

    /// Fewer than two layers, or a layer without neurons.
    #[error("invalid topology: {reason}")]
    InvalidTopology { reason: String },

    /// Orientation string that is neither horizontal nor vertical.
    #[error("orientation must be 'horizontal' (or 'h') or 'vertical' (or 'v'), got '{0}'")]
    InvalidOrientation(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// The native window could not be started.
    #[error("display error: {0}")]
    Display(String),
}

impl VisualizerError {
    pub(crate) fn topology(reason: impl Into<String>) -> Self {
        Self::InvalidTopology {
            reason: reason.into(),
        }
    }

    pub(crate) fn not_buildable(reason: impl Into<String>) -> Self {
        Self::ModelNotBuildable {
            reason: reason.into(),
        }
    }
}
