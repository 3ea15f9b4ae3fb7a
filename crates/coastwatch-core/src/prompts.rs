//! The natural-language prompt set matched against images.
//!
//! One description per label, in label order. The descriptions are worded
//! to only match obvious pollution; the last entry describes a clean scene
//! and anchors the `no_waste` probability the decision policy reads.

use crate::error::ConfigError;
use crate::labels::Label;

/// Default category descriptions, index-aligned with [`Label::ALL`].
const DEFAULT_PROMPTS: [&str; Label::COUNT] = [
    "plastic bottles and plastic bags littering a beach with visible garbage",
    "oil spill petroleum contamination dark brown black murky polluted water",
    "garbage pile trash heap rubbish dump on sandy beach",
    "fishing nets ropes tangled in water or on beach shore",
    "natural clean ocean water waves sea view without any garbage or pollution",
];

/// An ordered, validated set of category descriptions.
///
/// Immutable after construction. A length mismatch against the label set is
/// a configuration error, caught before the process starts serving.
#[derive(Debug, Clone)]
pub struct PromptSet {
    prompts: Vec<String>,
}

impl PromptSet {
    /// Build a prompt set, validating one prompt per label.
    pub fn new(prompts: Vec<String>) -> Result<Self, ConfigError> {
        if prompts.len() != Label::COUNT {
            return Err(ConfigError::PromptMismatch {
                expected: Label::COUNT,
                actual: prompts.len(),
            });
        }
        if let Some(idx) = prompts.iter().position(|p| p.trim().is_empty()) {
            return Err(ConfigError::Validation(format!(
                "prompt for label '{}' is empty",
                Label::ALL[idx]
            )));
        }
        Ok(Self { prompts })
    }

    /// The prompts, in label order.
    pub fn prompts(&self) -> &[String] {
        &self.prompts
    }

    /// The prompt for a specific label.
    pub fn prompt_for(&self, label: Label) -> &str {
        &self.prompts[label.index()]
    }
}

impl Default for PromptSet {
    fn default() -> Self {
        Self {
            prompts: DEFAULT_PROMPTS.iter().map(|s| s.to_string()).collect(),
        }
    }
}
