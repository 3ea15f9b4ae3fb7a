//! CLIP ONNX session management and inference.
//!
//! Wraps the vision and text encoders of a CLIP model exported to ONNX.
//! Both encoders project into the same embedding space; the projected
//! output tensor is named `image_embeds`/`text_embeds` in the export, with
//! `pooler_output` accepted as a fallback for older exports.

use std::path::Path;
use std::sync::Mutex;

use ndarray::Array4;
use ort::session::Session;
use ort::value::Value;

use crate::error::PipelineError;

/// CLIP text context length (tokens per prompt).
const TEXT_CONTEXT_LENGTH: usize = 77;

/// Wraps an ONNX Runtime session for the CLIP vision encoder.
///
/// Uses a `Mutex` because `Session::run` requires `&mut self`; this also
/// serializes concurrent forward passes, which ONNX Runtime does not
/// guarantee to be reentrant through one session.
pub struct ClipVisionSession {
    session: Mutex<Session>,
    /// Name of the input tensor (detected from model metadata).
    input_name: String,
}

impl ClipVisionSession {
    /// Load the CLIP vision encoder from an ONNX file.
    pub fn load(model_path: &Path) -> Result<Self, PipelineError> {
        let session = Session::builder()
            .map_err(|e| PipelineError::Model {
                message: format!("Failed to create ONNX session builder: {e}"),
            })?
            .commit_from_file(model_path)
            .map_err(|e| PipelineError::Model {
                message: format!("Failed to load vision encoder from {model_path:?}: {e}"),
            })?;

        // Detect the input tensor name from model metadata.
        let input_name = session
            .inputs()
            .first()
            .map(|i| i.name().to_string())
            .unwrap_or_else(|| "pixel_values".to_string());

        tracing::debug!(
            "Loaded CLIP vision encoder from {:?} (input: {:?}, outputs: {:?})",
            model_path,
            input_name,
            session
                .outputs()
                .iter()
                .map(|o| o.name())
                .collect::<Vec<_>>()
        );

        Ok(Self {
            session: Mutex::new(session),
            input_name,
        })
    }

    /// Run inference on a preprocessed image tensor and return the
    /// L2-normalized image embedding.
    ///
    /// Input shape: \[1, 3, image_size, image_size\] (NCHW).
    pub fn embed(&self, preprocessed: &Array4<f32>) -> Result<Vec<f32>, PipelineError> {
        let shape: Vec<i64> = preprocessed.shape().iter().map(|&d| d as i64).collect();
        let flat_data: Vec<f32> = preprocessed.iter().copied().collect();

        let input_value =
            Value::from_array((shape, flat_data)).map_err(|e| PipelineError::Inference {
                origin: "<vision>".to_string(),
                message: format!("Failed to create input tensor: {e}"),
            })?;

        let inputs = ort::inputs![self.input_name.as_str() => input_value];

        let mut session = self.session.lock().map_err(|e| PipelineError::Inference {
            origin: "<vision>".to_string(),
            message: format!("Session lock poisoned: {e}"),
        })?;

        let outputs = session.run(inputs).map_err(|e| PipelineError::Inference {
            origin: "<vision>".to_string(),
            message: format!("ONNX inference failed: {e}"),
        })?;

        // The projected cross-modal embedding, not last_hidden_state.
        let embeds = outputs
            .iter()
            .find(|(name, _)| *name == "image_embeds" || *name == "pooler_output")
            .ok_or_else(|| PipelineError::Inference {
                origin: "<vision>".to_string(),
                message: "Model did not produce image_embeds".to_string(),
            })?;

        let (shape, data) =
            embeds
                .1
                .try_extract_tensor::<f32>()
                .map_err(|e| PipelineError::Inference {
                    origin: "<vision>".to_string(),
                    message: format!("Failed to extract image_embeds tensor: {e}"),
                })?;

        // image_embeds is [1, dim]; take the single embedding vector.
        let raw = match shape.len() {
            1 => data.to_vec(),
            2 => {
                let dim = shape[1] as usize;
                data[..dim].to_vec()
            }
            _ => {
                return Err(PipelineError::Inference {
                    origin: "<vision>".to_string(),
                    message: format!("Unexpected image_embeds shape: {:?}", shape),
                });
            }
        };

        Ok(crate::math::l2_normalize(&raw))
    }
}

/// Wraps the CLIP text encoder and its tokenizer.
///
/// Only used at load time to encode the fixed prompt set; dropped once the
/// prompt bank is built.
pub struct ClipTextSession {
    session: Mutex<Session>,
    tokenizer: tokenizers::Tokenizer,
}

impl ClipTextSession {
    /// Load the text encoder and tokenizer.
    pub fn load(model_path: &Path, tokenizer_path: &Path) -> Result<Self, PipelineError> {
        let session = Session::builder()
            .map_err(|e| PipelineError::Model {
                message: format!("Failed to create ONNX session builder: {e}"),
            })?
            .commit_from_file(model_path)
            .map_err(|e| PipelineError::Model {
                message: format!("Failed to load text encoder from {model_path:?}: {e}"),
            })?;

        let tokenizer = tokenizers::Tokenizer::from_file(tokenizer_path).map_err(|e| {
            PipelineError::Model {
                message: format!("Failed to load tokenizer: {e}"),
            }
        })?;

        tracing::debug!(
            "Loaded CLIP text encoder (inputs: {:?})",
            session
                .inputs()
                .iter()
                .map(|i| i.name())
                .collect::<Vec<_>>()
        );

        Ok(Self {
            session: Mutex::new(session),
            tokenizer,
        })
    }

    /// Encode a batch of texts to L2-normalized embeddings, one per input.
    pub fn encode_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, PipelineError> {
        let batch_size = texts.len();
        if batch_size == 0 {
            return Ok(vec![]);
        }

        let encodings = self
            .tokenizer
            .encode_batch(texts.to_vec(), true)
            .map_err(|e| PipelineError::Model {
                message: format!("Tokenization failed: {e}"),
            })?;

        // Fixed-length input_ids and attention_mask, zero-padded to the
        // CLIP context length.
        let mut input_ids = vec![0i64; batch_size * TEXT_CONTEXT_LENGTH];
        let mut attention_mask = vec![0i64; batch_size * TEXT_CONTEXT_LENGTH];

        for (i, encoding) in encodings.iter().enumerate() {
            let ids = encoding.get_ids();
            for (j, &id) in ids.iter().take(TEXT_CONTEXT_LENGTH).enumerate() {
                input_ids[i * TEXT_CONTEXT_LENGTH + j] = id as i64;
                attention_mask[i * TEXT_CONTEXT_LENGTH + j] = 1;
            }
        }

        let batch_shape = vec![batch_size as i64, TEXT_CONTEXT_LENGTH as i64];
        let ids_value = Value::from_array((batch_shape.clone(), input_ids)).map_err(|e| {
            PipelineError::Model {
                message: format!("Failed to create input_ids tensor: {e}"),
            }
        })?;
        let mask_value =
            Value::from_array((batch_shape, attention_mask)).map_err(|e| PipelineError::Model {
                message: format!("Failed to create attention_mask tensor: {e}"),
            })?;

        let mut session = self.session.lock().map_err(|e| PipelineError::Model {
            message: format!("Text encoder lock poisoned: {e}"),
        })?;

        let outputs = session
            .run(ort::inputs!["input_ids" => ids_value, "attention_mask" => mask_value])
            .map_err(|e| PipelineError::Model {
                message: format!("Text encoder inference failed: {e}"),
            })?;

        let embeds = outputs
            .iter()
            .find(|(name, _)| *name == "text_embeds" || *name == "pooler_output")
            .ok_or_else(|| PipelineError::Model {
                message: "Text encoder did not produce text_embeds".to_string(),
            })?;

        let (shape, data) =
            embeds
                .1
                .try_extract_tensor::<f32>()
                .map_err(|e| PipelineError::Model {
                    message: format!("Failed to extract text_embeds tensor: {e}"),
                })?;

        let embedding_dim = match shape.len() {
            1 => data.len() / batch_size,
            2 => shape[1] as usize,
            _ => {
                return Err(PipelineError::Model {
                    message: format!("Unexpected text_embeds shape: {:?}", shape),
                });
            }
        };

        let embeddings: Vec<Vec<f32>> = data
            .chunks(embedding_dim)
            .take(batch_size)
            .map(crate::math::l2_normalize)
            .collect();

        Ok(embeddings)
    }
}
