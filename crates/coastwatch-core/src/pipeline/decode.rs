//! Image decoding with format detection, validation, and timeout support.
//!
//! Decoding is the gate in front of the matcher: an input that fails any
//! check here never reaches inference. Callers of the pipeline see a
//! sentinel result instead of an error.

use std::time::Duration;

use image::{DynamicImage, GenericImageView, ImageFormat};
use tokio::time::timeout;

use crate::config::LimitsConfig;
use crate::error::PipelineError;

/// Image decoder with configurable limits and timeout.
pub struct ImageDecoder {
    limits: LimitsConfig,
}

/// Result of decoding an image.
pub struct DecodedImage {
    /// The decoded image data
    pub image: DynamicImage,
    /// Detected image format
    pub format: ImageFormat,
    /// Image width in pixels
    pub width: u32,
    /// Image height in pixels
    pub height: u32,
}

impl ImageDecoder {
    /// Create a new decoder with the given limits.
    pub fn new(limits: LimitsConfig) -> Self {
        Self { limits }
    }

    /// Decode an image from an in-memory byte buffer with validation and
    /// timeout. `origin` describes the source for error context.
    pub async fn decode_from_bytes(
        &self,
        bytes: Vec<u8>,
        origin: &str,
    ) -> Result<DecodedImage, PipelineError> {
        let max_bytes = self.limits.max_file_size_mb * 1024 * 1024;
        if bytes.len() as u64 > max_bytes {
            return Err(PipelineError::FileTooLarge {
                origin: origin.to_string(),
                size_mb: bytes.len() as u64 / (1024 * 1024),
                max_mb: self.limits.max_file_size_mb,
            });
        }

        // Cheap magic-byte check before handing the buffer to a full decode.
        if !has_image_magic(&bytes) {
            return Err(PipelineError::Decode {
                origin: origin.to_string(),
                message: "Unrecognized image format (invalid magic bytes)".to_string(),
            });
        }

        let origin_owned = origin.to_string();
        let timeout_duration = Duration::from_millis(self.limits.decode_timeout_ms);

        let decode_result = timeout(timeout_duration, async {
            tokio::task::spawn_blocking(move || decode_bytes_sync(bytes, &origin_owned)).await
        })
        .await;

        match decode_result {
            Ok(Ok(Ok(decoded))) => {
                if decoded.width > self.limits.max_image_dimension
                    || decoded.height > self.limits.max_image_dimension
                {
                    return Err(PipelineError::ImageTooLarge {
                        origin: origin.to_string(),
                        width: decoded.width,
                        height: decoded.height,
                        max_dim: self.limits.max_image_dimension,
                    });
                }
                Ok(decoded)
            }
            Ok(Ok(Err(e))) => Err(e),
            Ok(Err(e)) => Err(PipelineError::Decode {
                origin: origin.to_string(),
                message: format!("Task join error: {}", e),
            }),
            Err(_) => Err(PipelineError::Timeout {
                origin: origin.to_string(),
                stage: "decode".to_string(),
                timeout_ms: self.limits.decode_timeout_ms,
            }),
        }
    }
}

/// Synchronous decode from bytes (runs in spawn_blocking).
fn decode_bytes_sync(bytes: Vec<u8>, origin: &str) -> Result<DecodedImage, PipelineError> {
    use std::io::Cursor;

    let reader = image::ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| PipelineError::Decode {
            origin: origin.to_string(),
            message: format!("Cannot detect image format: {}", e),
        })?;
    let format = reader.format().ok_or_else(|| PipelineError::Decode {
        origin: origin.to_string(),
        message: "Unknown image format".to_string(),
    })?;
    let image = reader.decode().map_err(|e| PipelineError::Decode {
        origin: origin.to_string(),
        message: e.to_string(),
    })?;

    let (width, height) = image.dimensions();
    Ok(DecodedImage {
        image,
        format,
        width,
        height,
    })
}

/// Check whether a buffer starts with a known raster image signature.
fn has_image_magic(bytes: &[u8]) -> bool {
    if bytes.len() < 4 {
        return false;
    }
    match bytes {
        // JPEG: FF D8 FF
        [0xFF, 0xD8, 0xFF, ..] => true,
        // PNG
        [0x89, b'P', b'N', b'G', ..] => true,
        // GIF8
        [b'G', b'I', b'F', b'8', ..] => true,
        // RIFF container: require the WEBP fourcc when enough bytes exist
        [b'R', b'I', b'F', b'F', rest @ ..] => rest.len() < 8 || &rest[4..8] == b"WEBP",
        // BMP
        [b'B', b'M', ..] => true,
        // TIFF, either byte order
        [b'I', b'I', 0x2A, 0x00, ..] | [b'M', b'M', 0x00, 0x2A, ..] => true,
        // HEIC/HEIF/AVIF: ftyp box at offset 4
        [_, _, _, _, b'f', b't', b'y', b'p', ..] => true,
        _ => false,
    }
}

/// Read just the dimensions from an image header, without a full decode.
///
/// Returns `None` when the buffer is not a readable image.
pub fn probe_dimensions(bytes: &[u8]) -> Option<(u32, u32)> {
    use std::io::Cursor;

    image::ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .ok()?
        .into_dimensions()
        .ok()
}

/// Convert an ImageFormat to a string representation.
pub fn format_to_string(format: ImageFormat) -> String {
    match format {
        ImageFormat::Jpeg => "jpeg".to_string(),
        ImageFormat::Png => "png".to_string(),
        ImageFormat::WebP => "webp".to_string(),
        ImageFormat::Gif => "gif".to_string(),
        ImageFormat::Tiff => "tiff".to_string(),
        ImageFormat::Bmp => "bmp".to_string(),
        ImageFormat::Avif => "avif".to_string(),
        _ => "unknown".to_string(),
    }
}
