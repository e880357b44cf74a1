//! In-memory image conversion.
//!
//! Generated images arrive base64-encoded in whatever format the model
//! emits. They are decoded, flattened to three-channel RGB, and
//! re-encoded as PNG without touching the filesystem.

use std::io::Cursor;

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use image::{DynamicImage, ImageFormat};

/// Failure while decoding or re-encoding an image.
#[derive(Debug, thiserror::Error)]
pub enum ImagingError {
    /// The inline payload is not valid base64.
    #[error("base64 decode failed: {0}")]
    Base64(#[from] base64::DecodeError),

    /// The bytes are not a decodable image, or PNG encoding failed.
    #[error("image codec error: {0}")]
    Codec(#[from] image::ImageError),
}

/// A PNG image ready for upload.
#[derive(Clone, PartialEq, Eq)]
pub struct ConvertedImage {
    /// Name announced to the image host, `{created}.png`.
    pub file_name: String,
    /// MIME type of `bytes`.
    pub mime_type: &'static str,
    /// Encoded PNG bytes.
    pub bytes: Vec<u8>,
}

impl std::fmt::Debug for ConvertedImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConvertedImage")
            .field("file_name", &self.file_name)
            .field("mime_type", &self.mime_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// Decodes a base64 image and converts it to an RGB PNG named after `created`.
///
/// # Errors
///
/// Returns [`ImagingError`] if the payload is not base64 or not an image.
pub fn convert_b64_to_png(b64: &str, created: i64) -> Result<ConvertedImage, ImagingError> {
    let raw = BASE64.decode(b64.trim().as_bytes())?;
    let bytes = convert_to_rgb_png(&raw)?;
    Ok(ConvertedImage {
        file_name: format!("{created}.png"),
        mime_type: "image/png",
        bytes,
    })
}

/// Re-encodes any supported image as an 8-bit RGB PNG.
///
/// # Errors
///
/// Returns [`ImagingError::Codec`] if `raw` cannot be decoded.
pub fn convert_to_rgb_png(raw: &[u8]) -> Result<Vec<u8>, ImagingError> {
    let decoded = image::load_from_memory(raw)?;
    let rgb = DynamicImage::ImageRgb8(decoded.to_rgb8());
    let mut out = Cursor::new(Vec::new());
    rgb.write_to(&mut out, ImageFormat::Png)?;
    Ok(out.into_inner())
}
