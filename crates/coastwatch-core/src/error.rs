//! Error types for the Coastwatch classification core.
//!
//! Configuration errors are fatal at startup; per-request pipeline errors
//! are recovered at the pipeline boundary and converted into sentinel
//! results before they can reach a caller.

use thiserror::Error;

/// Top-level error type for Coastwatch operations.
#[derive(Error, Debug)]
pub enum CoastwatchError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Pipeline processing errors
    #[error("Pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    /// General I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration-specific errors. All of these are fatal: the process must
/// not begin serving classification requests with a broken configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the config file from disk
    #[error("Failed to read config file: {0}")]
    Read(#[from] std::io::Error),

    /// Failed to parse TOML configuration
    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// Configuration values are invalid
    #[error("Invalid configuration: {0}")]
    Validation(String),

    /// Prompt set does not line up with the label set
    #[error("Prompt set has {actual} entries, expected {expected} (one per label)")]
    PromptMismatch { expected: usize, actual: usize },
}

/// Pipeline processing errors, organized by stage.
///
/// `origin` is a human-readable description of the image source: a file
/// path, or `<memory>` for an in-memory buffer.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Image decoding failed
    #[error("Decode error for {origin}: {message}")]
    Decode { origin: String, message: String },

    /// Model loading or prompt encoding failed
    #[error("Model error: {message}")]
    Model { message: String },

    /// Inference runtime failure during a forward pass
    #[error("Inference error for {origin}: {message}")]
    Inference { origin: String, message: String },

    /// Operation timed out
    #[error("Timeout in {stage} stage for {origin} after {timeout_ms}ms")]
    Timeout {
        origin: String,
        stage: String,
        timeout_ms: u64,
    },

    /// Input exceeds size limit
    #[error("File too large: {origin} ({size_mb}MB > {max_mb}MB)")]
    FileTooLarge {
        origin: String,
        size_mb: u64,
        max_mb: u64,
    },

    /// Image dimensions exceed limit
    #[error("Image too large: {origin} ({width}x{height} > {max_dim})")]
    ImageTooLarge {
        origin: String,
        width: u32,
        height: u32,
        max_dim: u32,
    },
}

/// Convenience type alias for Coastwatch results.
pub type Result<T> = std::result::Result<T, CoastwatchError>;

/// Convenience type alias for pipeline-specific results.
pub type PipelineResult<T> = std::result::Result<T, PipelineError>;
