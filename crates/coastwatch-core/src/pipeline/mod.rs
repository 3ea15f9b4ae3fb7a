//! The classification pipeline.
//!
//! Two stages in front of the decision logic:
//! - **decode**: validate and decode the input image, with limits and timeouts
//! - **classifier**: orchestrate decode → matcher → policy → registry

pub mod classifier;
pub mod decode;

pub use classifier::PollutionClassifier;
pub use decode::{probe_dimensions, DecodedImage, ImageDecoder};
