//! Zero-shot matching of images against the category prompt set.
//!
//! The [`PromptMatcher`] trait is the seam between the classification
//! pipeline and the embedding model: production code uses [`ClipMatcher`]
//! (CLIP ViT-B/32 over ONNX Runtime), tests substitute a fake.
//!
//! A `ClipMatcher` is constructed once at process startup and shared for
//! the process lifetime; construction failure is fatal (missing weights
//! are a configuration error, not a per-request one).

pub(crate) mod clip;
pub(crate) mod preprocess;

use std::path::{Path, PathBuf};

use image::DynamicImage;

use crate::config::ModelConfig;
use crate::error::PipelineError;
use crate::labels::Label;
use crate::math::{dot, softmax};
use crate::prompts::PromptSet;
use crate::types::Distribution;

use self::clip::{ClipTextSession, ClipVisionSession};
use self::preprocess::preprocess;

/// Local model filenames inside `{model_dir}/{model}/`.
const VISION_MODEL_FILENAME: &str = "vision_model.onnx";
const TEXT_MODEL_FILENAME: &str = "text_model.onnx";
const TOKENIZER_FILENAME: &str = "tokenizer.json";

/// CLIP's learned logit scale (temperature), exp(4.6052) ≈ 100.
///
/// Multiplies cosine similarities before the softmax so the output behaves
/// like the probabilities the combined model would produce.
const LOGIT_SCALE: f32 = 100.0;

/// Matches an image against the fixed prompt set, producing a probability
/// distribution over the label set.
///
/// Implementations must be deterministic for fixed weights and identical
/// image bytes.
pub trait PromptMatcher: Send + Sync {
    fn match_image(&self, image: &DynamicImage) -> Result<Distribution, PipelineError>;
}

/// Production matcher: CLIP vision encoder plus a prompt bank of text
/// embeddings computed once at load time.
pub struct ClipMatcher {
    vision: ClipVisionSession,
    /// One text embedding per label, in label order.
    prompt_bank: Vec<Vec<f32>>,
    image_size: u32,
}

impl ClipMatcher {
    /// Load the CLIP encoders and pre-encode the prompt set.
    ///
    /// Expects `vision_model.onnx`, `text_model.onnx`, and `tokenizer.json`
    /// under `{model_dir}/{model}/`. The text encoder is only needed here:
    /// the five prompt embeddings are fixed for the process lifetime, so it
    /// is dropped once the bank is built.
    pub fn load(
        config: &ModelConfig,
        model_dir: &Path,
        prompts: &PromptSet,
    ) -> Result<Self, PipelineError> {
        let variant_dir = model_dir.join(&config.model);
        for filename in [VISION_MODEL_FILENAME, TEXT_MODEL_FILENAME, TOKENIZER_FILENAME] {
            let path = variant_dir.join(filename);
            if !path.exists() {
                return Err(PipelineError::Model {
                    message: format!(
                        "Model file not found at {path:?}. Run `coastwatch models download` first."
                    ),
                });
            }
        }

        tracing::info!("Loading CLIP model from {:?}", variant_dir);
        let vision = ClipVisionSession::load(&variant_dir.join(VISION_MODEL_FILENAME))?;

        let text = ClipTextSession::load(
            &variant_dir.join(TEXT_MODEL_FILENAME),
            &variant_dir.join(TOKENIZER_FILENAME),
        )?;
        let prompt_bank = text.encode_batch(prompts.prompts())?;
        if prompt_bank.len() != Label::COUNT {
            return Err(PipelineError::Model {
                message: format!(
                    "Prompt bank has {} embeddings, expected {}",
                    prompt_bank.len(),
                    Label::COUNT
                ),
            });
        }
        tracing::info!("CLIP model loaded, {} prompts encoded", prompt_bank.len());

        Ok(Self {
            vision,
            prompt_bank,
            image_size: config.image_size,
        })
    }

    /// Check whether all model files exist on disk.
    pub fn model_exists(config: &ModelConfig, model_dir: &Path) -> bool {
        let variant_dir = model_dir.join(&config.model);
        [VISION_MODEL_FILENAME, TEXT_MODEL_FILENAME, TOKENIZER_FILENAME]
            .iter()
            .all(|f| variant_dir.join(f).exists())
    }

    /// Expected on-disk paths for the model files.
    pub fn model_paths(config: &ModelConfig, model_dir: &Path) -> Vec<PathBuf> {
        let variant_dir = model_dir.join(&config.model);
        [VISION_MODEL_FILENAME, TEXT_MODEL_FILENAME, TOKENIZER_FILENAME]
            .iter()
            .map(|f| variant_dir.join(f))
            .collect()
    }
}

impl PromptMatcher for ClipMatcher {
    /// Encode the image and score it against every prompt embedding.
    ///
    /// Both sides are L2-normalized, so the dot product is the cosine
    /// similarity; scaled logits go through a softmax so the distribution
    /// sums to 1.
    fn match_image(&self, image: &DynamicImage) -> Result<Distribution, PipelineError> {
        let tensor = preprocess(image, self.image_size);
        let image_embedding = self.vision.embed(&tensor)?;

        let logits: Vec<f32> = self
            .prompt_bank
            .iter()
            .map(|prompt_embedding| LOGIT_SCALE * dot(&image_embedding, prompt_embedding))
            .collect();

        let probs = softmax(&logits);
        let probs: [f32; Label::COUNT] =
            probs
                .try_into()
                .map_err(|v: Vec<f32>| PipelineError::Inference {
                    origin: "<matcher>".to_string(),
                    message: format!("expected {} probabilities, got {}", Label::COUNT, v.len()),
                })?;

        Distribution::new(probs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_logit_scaling_softmax_shape() {
        // Unit-norm embeddings with one clearly-closest prompt: the scaled
        // softmax should concentrate mass on it while still summing to 1.
        let image = vec![1.0, 0.0];
        let bank = [
            vec![0.999, 0.0447],
            vec![0.707, 0.707],
            vec![0.0, 1.0],
            vec![-0.707, 0.707],
            vec![-1.0, 0.0],
        ];
        let logits: Vec<f32> = bank.iter().map(|p| LOGIT_SCALE * dot(&image, p)).collect();
        let probs = softmax(&logits);

        let sum: f32 = probs.iter().sum();
        assert!((sum - 1.0).abs() < 1e-4);
        assert!(probs[0] > 0.99);
    }

    #[test]
    fn test_model_exists_missing_dir() {
        let config = ModelConfig::default();
        let dir = tempfile::tempdir().unwrap();
        assert!(!ClipMatcher::model_exists(&config, dir.path()));
    }

    #[test]
    fn test_model_paths_layout() {
        let config = ModelConfig::default();
        let paths = ClipMatcher::model_paths(&config, Path::new("/models"));
        assert_eq!(paths.len(), 3);
        assert!(paths[0].ends_with("clip-vit-base-patch32/vision_model.onnx"));
        assert!(paths[2].ends_with("clip-vit-base-patch32/tokenizer.json"));
    }

    #[test]
    fn test_load_fails_without_models() {
        let dir = tempfile::tempdir().unwrap();
        let err =
            ClipMatcher::load(&ModelConfig::default(), dir.path(), &PromptSet::default())
                .unwrap_err();
        assert!(err.to_string().contains("models download"));
    }
}
