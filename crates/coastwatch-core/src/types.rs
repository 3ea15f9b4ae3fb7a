//! Core data types for the Coastwatch classification pipeline.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::PipelineError;
use crate::labels::{category_info, Label};

/// An image handed to the core: either an in-memory buffer or a path to a
/// file owned by the caller. The core only reads it and never retains a
/// reference past the call.
#[derive(Debug, Clone)]
pub enum ImageSource {
    Bytes(Vec<u8>),
    Path(PathBuf),
}

impl ImageSource {
    /// Human-readable description of where the image came from, for logs
    /// and error context.
    pub fn origin(&self) -> String {
        match self {
            ImageSource::Bytes(_) => "<memory>".to_string(),
            ImageSource::Path(p) => p.display().to_string(),
        }
    }

    /// Consume the source, yielding the raw image bytes.
    pub fn into_bytes(self) -> std::io::Result<Vec<u8>> {
        match self {
            ImageSource::Bytes(b) => Ok(b),
            ImageSource::Path(p) => std::fs::read(p),
        }
    }
}

impl From<Vec<u8>> for ImageSource {
    fn from(bytes: Vec<u8>) -> Self {
        ImageSource::Bytes(bytes)
    }
}

impl From<PathBuf> for ImageSource {
    fn from(path: PathBuf) -> Self {
        ImageSource::Path(path)
    }
}

impl From<&Path> for ImageSource {
    fn from(path: &Path) -> Self {
        ImageSource::Path(path.to_path_buf())
    }
}

/// Tolerance when checking that a distribution sums to 1.
const SUM_TOLERANCE: f32 = 1e-4;

/// A probability distribution over the label set, index-aligned with
/// [`Label::ALL`]. Produced fresh per classification call; never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct Distribution {
    probs: [f32; Label::COUNT],
}

impl Distribution {
    /// Build a distribution, validating each entry is in [0, 1] and the
    /// total is 1 within floating tolerance.
    pub fn new(probs: [f32; Label::COUNT]) -> Result<Self, PipelineError> {
        if probs.iter().any(|p| !(0.0..=1.0).contains(p) || !p.is_finite()) {
            return Err(PipelineError::Inference {
                origin: "<distribution>".to_string(),
                message: format!("probability outside [0, 1]: {probs:?}"),
            });
        }
        let sum: f32 = probs.iter().sum();
        if (sum - 1.0).abs() > SUM_TOLERANCE {
            return Err(PipelineError::Inference {
                origin: "<distribution>".to_string(),
                message: format!("probabilities sum to {sum}, expected 1"),
            });
        }
        Ok(Self { probs })
    }

    /// All probabilities, in label order.
    pub fn probabilities(&self) -> &[f32; Label::COUNT] {
        &self.probs
    }

    /// Probability assigned to a specific label.
    pub fn probability(&self, label: Label) -> f32 {
        self.probs[label.index()]
    }

    /// The highest-probability label and its probability.
    ///
    /// Standard argmax semantics: on an exact tie, the first label in
    /// canonical order wins.
    pub fn argmax(&self) -> (Label, f32) {
        let mut best = 0;
        for i in 1..Label::COUNT {
            if self.probs[i] > self.probs[best] {
                best = i;
            }
        }
        (Label::ALL[best], self.probs[best])
    }
}

/// The final, enriched result of classifying one image.
///
/// `label` and `confidence` are what the application layer stores verbatim;
/// the display fields exist for client rendering only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationResult {
    pub label: Label,
    pub confidence: f32,
    pub display_name: String,
    pub icon: String,
    pub color: String,
}

impl ClassificationResult {
    /// Enrich a (label, confidence) pair with registry display metadata.
    pub fn enriched(label: Label, confidence: f32) -> Self {
        let info = category_info(label);
        Self {
            label,
            confidence,
            display_name: info.display_name.to_string(),
            icon: info.icon.to_string(),
            color: info.color.to_string(),
        }
    }

    /// Sentinel for an image that could not be decoded.
    pub fn decode_failure() -> Self {
        Self::enriched(Label::OtherSolidWaste, 0.0)
    }

    /// Sentinel for an inference runtime failure. The 0.5 placeholder keeps
    /// this distinguishable from the decode-failure sentinel.
    pub fn inference_fallback() -> Self {
        Self::enriched(Label::OtherSolidWaste, 0.5)
    }
}

/// A geolocation recovered from an image's EXIF geotag block.
///
/// When `present` is false the coordinates carry no meaning; callers treat
/// that as "no override available", not as an error.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoCoordinate {
    pub present: bool,
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoCoordinate {
    /// No geotag available.
    pub fn absent() -> Self {
        Self {
            present: false,
            latitude: 0.0,
            longitude: 0.0,
        }
    }

    /// A geotag at the given signed decimal coordinates.
    pub fn at(latitude: f64, longitude: f64) -> Self {
        Self {
            present: true,
            latitude,
            longitude,
        }
    }
}

/// Informational sanity check on image dimensions.
///
/// Does not gate classification; surfaced alongside results so reviewers
/// can discount thumbnails and screenshots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageCheck {
    pub width: u32,
    pub height: u32,
    pub suspicious: bool,
    pub warnings: Vec<String>,
}

impl ImageCheck {
    /// Minimum acceptable shorter edge, in pixels.
    const MIN_EDGE: u32 = 100;

    /// Evaluate decoded dimensions.
    pub fn evaluate(width: u32, height: u32) -> Self {
        let mut warnings = Vec::new();
        if width.min(height) < Self::MIN_EDGE {
            warnings.push(format!(
                "image is too small ({width}x{height}, min edge {})",
                Self::MIN_EDGE
            ));
        }
        Self {
            width,
            height,
            suspicious: !warnings.is_empty(),
            warnings,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distribution_rejects_bad_sum() {
        let err = Distribution::new([0.5, 0.5, 0.5, 0.0, 0.0]).unwrap_err();
        assert!(err.to_string().contains("sum"));
    }

    #[test]
    fn test_distribution_rejects_out_of_range() {
        assert!(Distribution::new([1.2, -0.2, 0.0, 0.0, 0.0]).is_err());
    }

    #[test]
    fn test_distribution_accepts_near_one_sum() {
        // Softmax output is only approximately 1 in f32
        let dist = Distribution::new([0.2, 0.2, 0.2, 0.2, 0.20002]).unwrap();
        assert_eq!(dist.probability(Label::NoWaste), 0.20002);
    }

    #[test]
    fn test_argmax_first_index_wins_ties() {
        let dist = Distribution::new([0.3, 0.3, 0.2, 0.1, 0.1]).unwrap();
        let (label, p) = dist.argmax();
        assert_eq!(label, Label::Plastic);
        assert_eq!(p, 0.3);
    }

    #[test]
    fn test_enriched_result_carries_registry_fields() {
        let result = ClassificationResult::enriched(Label::OilSpill, 0.91);
        assert_eq!(result.display_name, "Oil Spill");
        assert_eq!(result.color, "#1f2937");
        assert_eq!(result.confidence, 0.91);
    }

    #[test]
    fn test_sentinels_are_distinguishable() {
        let decode = ClassificationResult::decode_failure();
        let inference = ClassificationResult::inference_fallback();
        assert_eq!(decode.label, Label::OtherSolidWaste);
        assert_eq!(inference.label, Label::OtherSolidWaste);
        assert_eq!(decode.confidence, 0.0);
        assert_eq!(inference.confidence, 0.5);
    }

    #[test]
    fn test_classification_result_serde() {
        let result = ClassificationResult::enriched(Label::NoWaste, 0.45);
        let json = serde_json::to_string(&result).unwrap();
        assert!(json.contains("\"label\":\"no_waste\""));
        assert!(json.contains("\"display_name\":\"No Waste Detected\""));
        let parsed: ClassificationResult = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, result);
    }

    #[test]
    fn test_geo_coordinate_absent() {
        let geo = GeoCoordinate::absent();
        assert!(!geo.present);
    }

    #[test]
    fn test_image_check_flags_small_images() {
        let check = ImageCheck::evaluate(64, 800);
        assert!(check.suspicious);
        assert_eq!(check.warnings.len(), 1);

        let check = ImageCheck::evaluate(1920, 1080);
        assert!(!check.suspicious);
        assert!(check.warnings.is_empty());
    }
}
