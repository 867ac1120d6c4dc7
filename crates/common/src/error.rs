//! Error types shared across Turntable crates.

use std::path::PathBuf;

/// Top-level error type for Turntable operations.
///
/// The first four variants are the run taxonomy: each one is fatal to a
/// render run and is surfaced to the caller unchanged.
#[derive(Debug, thiserror::Error)]
pub enum TurntableError {
    #[error("No active object selected")]
    NoActiveObject,

    #[error("No keyframes found on active object '{object}'")]
    NoKeyframes { object: String },

    #[error("Failed to create output directory {path}: {source}")]
    DirectoryCreationFailed {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Render #{index} to {path} failed: {message}")]
    RenderInvocationFailed {
        index: u32,
        path: PathBuf,
        message: String,
    },

    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    #[error("Run cancelled after {completed} of {total} jobs")]
    Cancelled { completed: u32, total: u32 },

    #[error("Checkpoint does not match this run: {message}")]
    CheckpointMismatch { message: String },

    #[error("Host error: {message}")]
    Host { message: String },

    #[error("Document error: {message}")]
    Document { message: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias using TurntableError.
pub type TurntableResult<T> = Result<T, TurntableError>;

impl TurntableError {
    pub fn no_keyframes(object: impl Into<String>) -> Self {
        Self::NoKeyframes {
            object: object.into(),
        }
    }

    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: msg.into(),
        }
    }

    pub fn checkpoint_mismatch(msg: impl Into<String>) -> Self {
        Self::CheckpointMismatch {
            message: msg.into(),
        }
    }

    pub fn host(msg: impl Into<String>) -> Self {
        Self::Host {
            message: msg.into(),
        }
    }

    pub fn document(msg: impl Into<String>) -> Self {
        Self::Document {
            message: msg.into(),
        }
    }

    /// Whether this error belongs to the run taxonomy raised by the
    /// render driver itself (as opposed to plumbing failures).
    pub fn is_run_failure(&self) -> bool {
        matches!(
            self,
            Self::NoActiveObject
                | Self::NoKeyframes { .. }
                | Self::DirectoryCreationFailed { .. }
                | Self::RenderInvocationFailed { .. }
        )
    }
}
