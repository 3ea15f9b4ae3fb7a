//! Coastwatch Core - zero-shot coastal pollution classification.
//!
//! Coastwatch decides which pollution category a coastal photograph
//! depicts, without any task-specific training, and can recover a
//! geolocation embedded in the image's metadata.
//!
//! # Architecture
//!
//! ```text
//! Image → Decode/Validate → Match (CLIP) → Decision Policy → Result
//!                  Geotag extraction runs independently
//! ```
//!
//! The core exposes exactly two operations: [`PollutionClassifier::classify`]
//! and [`extract_geo`]. Neither surfaces per-request errors: undecodable
//! input and inference failures resolve to distinguishable sentinel
//! results, and a missing geotag resolves to an absent coordinate.
//!
//! # Usage
//!
//! ```rust,ignore
//! use std::path::Path;
//!
//! use coastwatch_core::{Config, PollutionClassifier};
//!
//! #[tokio::main]
//! async fn main() -> coastwatch_core::Result<()> {
//!     let config = Config::load()?;
//!     let classifier = PollutionClassifier::load(&config)?;
//!
//!     let result = classifier.classify(Path::new("./beach.jpg").into()).await;
//!     println!("{} ({:.1}%)", result.display_name, result.confidence * 100.0);
//!     Ok(())
//! }
//! ```

// Module declarations
pub mod config;
pub mod error;
pub mod geotag;
pub mod labels;
pub mod matcher;
pub mod math;
pub mod pipeline;
pub mod policy;
pub mod prompts;
pub mod types;

// Re-exports for convenient access
pub use config::Config;
pub use error::{CoastwatchError, ConfigError, PipelineError, PipelineResult, Result};
pub use geotag::extract_geo;
pub use labels::{category_info, category_info_for, CategoryInfo, Label};
pub use matcher::{ClipMatcher, PromptMatcher};
pub use pipeline::PollutionClassifier;
pub use policy::{Decision, DecisionPolicy};
pub use prompts::PromptSet;
pub use types::{ClassificationResult, Distribution, GeoCoordinate, ImageCheck, ImageSource};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
