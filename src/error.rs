//! Error types for the surface pipeline.
//!
//! Every fallible operation returns `PipelineResult<T>`.

use std::path::PathBuf;

use thiserror::Error;

/// Unified error type for loading, preprocessing and extraction.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Input path does not exist or cannot be read.
    #[error("Volume not found or unreadable '{}': {source}", path.display())]
    NotFound {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Input could not be parsed as a 3D scalar volume.
    #[error("Invalid volume format: {0}")]
    Format(String),

    /// A numeric parameter is out of its valid range.
    #[error("Invalid parameter: {0}")]
    Value(String),

    /// Volume is too small for isosurface extraction.
    #[error("Invalid volume dimensions: {0}")]
    Dimension(String),

    /// Configuration file or value is invalid.
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// I/O failure while writing an output artifact.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience alias for `Result<T, PipelineError>`.
pub type PipelineResult<T> = Result<T, PipelineError>;
