//! Pipeline orchestration: decode, match, decide, enrich.
//!
//! [`PollutionClassifier`] is the composition root and the only entry
//! point external callers use. `classify` never returns an error: every
//! per-request failure resolves to a well-typed sentinel result, so the
//! application layer only handles failures at startup.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::timeout;

use crate::config::Config;
use crate::error::Result;
use crate::matcher::{ClipMatcher, PromptMatcher};
use crate::policy::DecisionPolicy;
use crate::prompts::PromptSet;
use crate::types::{ClassificationResult, ImageSource};

use super::decode::ImageDecoder;

/// The classification pipeline: validates the image is decodable, runs the
/// matcher, applies the decision policy, and enriches the result with
/// registry metadata.
///
/// Stateless per call; concurrent `classify` invocations are independent.
pub struct PollutionClassifier {
    matcher: Arc<dyn PromptMatcher>,
    decoder: ImageDecoder,
    policy: DecisionPolicy,
    infer_timeout_ms: u64,
}

impl PollutionClassifier {
    /// Load the production classifier, including the CLIP model.
    ///
    /// This is the startup path: any failure here (missing weights, prompt
    /// set mismatch) is fatal and the process must not begin serving.
    pub fn load(config: &Config) -> Result<Self> {
        let prompts = PromptSet::default();
        let matcher = ClipMatcher::load(&config.model, &config.model_dir(), &prompts)?;
        Ok(Self::with_matcher(Arc::new(matcher), config))
    }

    /// Build a classifier around an existing matcher.
    ///
    /// This is the dependency-injection seam: tests substitute a fake
    /// matcher to exercise the pipeline without model weights.
    pub fn with_matcher(matcher: Arc<dyn PromptMatcher>, config: &Config) -> Self {
        Self {
            matcher,
            decoder: ImageDecoder::new(config.limits.clone()),
            policy: DecisionPolicy::new(&config.policy),
            infer_timeout_ms: config.limits.infer_timeout_ms,
        }
    }

    /// Classify one image.
    ///
    /// Always returns a structurally valid result:
    /// - undecodable input → `(other_solid_waste, 0.0)`
    /// - inference failure or timeout → `(other_solid_waste, 0.5)`
    /// - otherwise the policy decision, enriched with display metadata
    pub async fn classify(&self, source: ImageSource) -> ClassificationResult {
        let origin = source.origin();

        let bytes = match source.into_bytes() {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::warn!(%origin, error = %e, "failed to read image, returning decode sentinel");
                return ClassificationResult::decode_failure();
            }
        };

        let decoded = match self.decoder.decode_from_bytes(bytes, &origin).await {
            Ok(decoded) => decoded,
            Err(e) => {
                tracing::warn!(%origin, error = %e, "undecodable image, returning decode sentinel");
                return ClassificationResult::decode_failure();
            }
        };
        tracing::debug!(
            %origin,
            width = decoded.width,
            height = decoded.height,
            format = %super::decode::format_to_string(decoded.format),
            "image decoded"
        );

        // The forward pass blocks; run it off the async executor and bound it.
        let matcher = Arc::clone(&self.matcher);
        let image = decoded.image;
        let infer = timeout(Duration::from_millis(self.infer_timeout_ms), async {
            tokio::task::spawn_blocking(move || matcher.match_image(&image)).await
        })
        .await;

        let distribution = match infer {
            Ok(Ok(Ok(distribution))) => distribution,
            Ok(Ok(Err(e))) => {
                tracing::warn!(%origin, error = %e, "inference failed, returning fallback sentinel");
                return ClassificationResult::inference_fallback();
            }
            Ok(Err(e)) => {
                tracing::warn!(%origin, error = %e, "inference task panicked, returning fallback sentinel");
                return ClassificationResult::inference_fallback();
            }
            Err(_) => {
                tracing::warn!(
                    %origin,
                    timeout_ms = self.infer_timeout_ms,
                    "inference timed out, returning fallback sentinel"
                );
                return ClassificationResult::inference_fallback();
            }
        };

        let decision = self.policy.decide(&distribution);
        tracing::debug!(%origin, label = %decision.label, confidence = decision.confidence, "classified");
        ClassificationResult::enriched(decision.label, decision.confidence)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{PipelineError, PipelineResult};
    use crate::labels::Label;
    use crate::types::Distribution;
    use image::DynamicImage;
    use std::io::Cursor;
    use std::sync::atomic::{AtomicBool, Ordering};

    struct FakeMatcher {
        probs: [f32; Label::COUNT],
        invoked: AtomicBool,
    }

    impl FakeMatcher {
        fn new(probs: [f32; Label::COUNT]) -> Self {
            Self {
                probs,
                invoked: AtomicBool::new(false),
            }
        }
    }

    impl PromptMatcher for FakeMatcher {
        fn match_image(&self, _image: &DynamicImage) -> PipelineResult<Distribution> {
            self.invoked.store(true, Ordering::SeqCst);
            Distribution::new(self.probs)
        }
    }

    struct FailingMatcher;

    impl PromptMatcher for FailingMatcher {
        fn match_image(&self, _image: &DynamicImage) -> PipelineResult<Distribution> {
            Err(PipelineError::Inference {
                origin: "<fake>".to_string(),
                message: "backend unavailable".to_string(),
            })
        }
    }

    fn png_bytes() -> Vec<u8> {
        let img = image::RgbImage::from_pixel(120, 120, image::Rgb([200, 180, 90]));
        let mut buf = Cursor::new(Vec::new());
        img.write_to(&mut buf, image::ImageFormat::Png).unwrap();
        buf.into_inner()
    }

    fn classifier_with(matcher: Arc<dyn PromptMatcher>) -> PollutionClassifier {
        PollutionClassifier::with_matcher(matcher, &Config::default())
    }

    #[tokio::test]
    async fn test_confident_plastic_prediction() {
        let classifier =
            classifier_with(Arc::new(FakeMatcher::new([0.90, 0.02, 0.03, 0.02, 0.03])));
        let result = classifier.classify(png_bytes().into()).await;
        assert_eq!(result.label, Label::Plastic);
        assert_eq!(result.confidence, 0.90);
        assert_eq!(result.display_name, "Plastic Pollution");
    }

    #[tokio::test]
    async fn test_low_confidence_overridden_to_no_waste() {
        let classifier =
            classifier_with(Arc::new(FakeMatcher::new([0.40, 0.05, 0.05, 0.05, 0.45])));
        let result = classifier.classify(png_bytes().into()).await;
        assert_eq!(result.label, Label::NoWaste);
        assert_eq!(result.confidence, 0.45);
        assert_eq!(result.icon, "✅");
    }

    #[tokio::test]
    async fn test_low_confidence_kept_without_clean_evidence() {
        let classifier =
            classifier_with(Arc::new(FakeMatcher::new([0.40, 0.30, 0.10, 0.10, 0.10])));
        let result = classifier.classify(png_bytes().into()).await;
        assert_eq!(result.label, Label::Plastic);
        assert_eq!(result.confidence, 0.40);
    }

    #[tokio::test]
    async fn test_garbage_bytes_yield_decode_sentinel_without_inference() {
        let matcher = Arc::new(FakeMatcher::new([0.2, 0.2, 0.2, 0.2, 0.2]));
        let classifier = classifier_with(matcher.clone());

        let result = classifier
            .classify(b"definitely not an image".to_vec().into())
            .await;

        assert_eq!(result, ClassificationResult::decode_failure());
        assert!(
            !matcher.invoked.load(Ordering::SeqCst),
            "matcher must not run for undecodable input"
        );
    }

    #[tokio::test]
    async fn test_missing_file_yields_decode_sentinel() {
        let classifier = classifier_with(Arc::new(FakeMatcher::new([0.2, 0.2, 0.2, 0.2, 0.2])));
        let result = classifier
            .classify(std::path::Path::new("/nonexistent/photo.jpg").into())
            .await;
        assert_eq!(result, ClassificationResult::decode_failure());
    }

    #[tokio::test]
    async fn test_inference_failure_yields_fallback_sentinel() {
        let classifier = classifier_with(Arc::new(FailingMatcher));
        let result = classifier.classify(png_bytes().into()).await;
        assert_eq!(result, ClassificationResult::inference_fallback());
        assert_eq!(result.confidence, 0.5);
    }

    #[tokio::test]
    async fn test_classify_from_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scene.png");
        std::fs::write(&path, png_bytes()).unwrap();

        let classifier =
            classifier_with(Arc::new(FakeMatcher::new([0.05, 0.05, 0.05, 0.05, 0.80])));
        let result = classifier.classify(path.as_path().into()).await;
        assert_eq!(result.label, Label::NoWaste);
        assert_eq!(result.confidence, 0.80);
    }
}
