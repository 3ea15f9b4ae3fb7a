//! Sub-configuration structs with defaults.

use serde::{Deserialize, Serialize};

/// Embedding model settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Model name/variant (currently "clip-vit-base-patch32")
    pub model: String,

    /// Image input size expected by the vision encoder.
    pub image_size: u32,

    /// Directory holding the ONNX models and tokenizer (~ is expanded).
    pub model_dir: String,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            model: "clip-vit-base-patch32".to_string(),
            image_size: 224,
            model_dir: "~/.coastwatch/models".to_string(),
        }
    }
}

/// Decision policy thresholds.
///
/// Defaults encode the production rule: suppress a pollution prediction
/// below 0.85 confidence when p(no_waste) exceeds 0.15.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicyConfig {
    /// Argmax confidence below which a pollution label may be overridden.
    pub confidence_floor: f32,

    /// Minimum no_waste probability required for the override to fire.
    pub clean_evidence_floor: f32,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            confidence_floor: 0.85,
            clean_evidence_floor: 0.15,
        }
    }
}

/// Resource limits.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Maximum input size in megabytes
    pub max_file_size_mb: u64,

    /// Maximum image dimension (width or height)
    pub max_image_dimension: u32,

    /// Decode timeout in milliseconds
    pub decode_timeout_ms: u64,

    /// Inference timeout in milliseconds
    pub infer_timeout_ms: u64,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_file_size_mb: 50,
            max_image_dimension: 10000,
            decode_timeout_ms: 5000,
            infer_timeout_ms: 30000,
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: error, warn, info, debug, trace
    pub level: String,

    /// Log format: "pretty" or "json"
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}
