use std::io::Cursor;

use base64::{engine::general_purpose::STANDARD, Engine};
use image::{ImageReader, Limits, RgbImage};

use crate::error::{OcrError, Result};

/// Decoded RGB8 raster handed to the recognition engine.
///
/// Keeps the resolution of the submitted image; only the pixel layout is
/// normalized.
#[derive(Debug, Clone)]
pub struct CanonicalImage {
    pixels: RgbImage,
}

impl CanonicalImage {
    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn pixels(&self) -> &RgbImage {
        &self.pixels
    }
}

impl TryFrom<RgbImage> for CanonicalImage {
    type Error = OcrError;

    fn try_from(pixels: RgbImage) -> Result<Self> {
        if pixels.width() == 0 || pixels.height() == 0 {
            return Err(OcrError::InvalidImageFormat(format!(
                "Image is empty: {}x{}",
                pixels.width(),
                pixels.height()
            )));
        }
        Ok(Self { pixels })
    }
}

/// Image payload as received from the client.
#[derive(Debug, Clone)]
pub enum ImageInput {
    /// Raw bytes from a multipart upload.
    Upload(Vec<u8>),
    /// Base64 text from a JSON body, optionally a `data:` URI.
    Base64(String),
}

#[derive(Debug, Clone)]
pub struct ImageDecoder {
    max_dimension: u32,
}

impl ImageDecoder {
    pub fn new(max_dimension: u32) -> Self {
        Self { max_dimension }
    }

    pub fn decode(&self, input: Option<ImageInput>) -> Result<CanonicalImage> {
        let bytes = match input.ok_or(OcrError::MissingImage)? {
            ImageInput::Upload(bytes) => bytes,
            ImageInput::Base64(encoded) => decode_base64(&encoded)?,
        };
        self.decode_bytes(&bytes)
    }

    pub fn decode_bytes(&self, bytes: &[u8]) -> Result<CanonicalImage> {
        if bytes.is_empty() {
            return Err(OcrError::InvalidImageFormat("Image data is empty".to_string()));
        }

        if let Some(kind) = infer::get(bytes) {
            if kind.matcher_type() != infer::MatcherType::Image {
                return Err(OcrError::InvalidImageFormat(format!(
                    "Expected an image, got {}",
                    kind.mime_type()
                )));
            }
        }

        let mut reader = ImageReader::new(Cursor::new(bytes))
            .with_guessed_format()
            .map_err(|e| OcrError::InvalidImageFormat(format!("Failed to read image: {e}")))?;

        if reader.format().is_none() {
            return Err(OcrError::InvalidImageFormat(
                "Unrecognized image format".to_string(),
            ));
        }

        let mut limits = Limits::default();
        limits.max_image_width = Some(self.max_dimension);
        limits.max_image_height = Some(self.max_dimension);
        reader.limits(limits);

        let img = reader
            .decode()
            .map_err(|e| OcrError::InvalidImageFormat(format!("Failed to decode image: {e}")))?;

        CanonicalImage::try_from(img.to_rgb8())
    }
}

/// Decodes standard base64, tolerating a `data:<mime>;base64,` prefix and
/// embedded line breaks.
pub fn decode_base64(encoded: &str) -> Result<Vec<u8>> {
    let payload = match encoded.split_once(',') {
        Some((_, data)) => data,
        None => encoded,
    };
    let compact: String = payload.chars().filter(|c| !c.is_whitespace()).collect();
    if compact.is_empty() {
        return Err(OcrError::InvalidBase64("Image data is empty".to_string()));
    }

    STANDARD
        .decode(compact.as_bytes())
        .map_err(|e| OcrError::InvalidBase64(e.to_string()))
}
