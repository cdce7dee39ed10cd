//! Image codec seam
//!
//! Embedded images are handed to an [`ImageCodec`] as raw compressed bytes.
//! The codec returns an RGBA8 pixel buffer that stays owned by the material
//! and is handed back through [`ImageCodec::release`] exactly once when the
//! document is dropped (or when a failed decode unwinds).

use image::ImageFormat;

/// Decoded RGBA8 image, row-major, no padding
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedImage {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

/// Error reported by an image codec
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("unsupported image MIME type {0}")]
    UnsupportedMimeType(String),
    #[error(transparent)]
    Image(#[from] image::ImageError),
    #[error("{0}")]
    Other(String),
}

/// Decoder for embedded images.
///
/// The scene builder calls `decode` once per material, in order, and never
/// from more than one thread at a time.
pub trait ImageCodec: Send + Sync {
    /// Decode compressed bytes into RGBA8 pixels
    fn decode(&self, bytes: &[u8], mime_type: Option<&str>) -> Result<DecodedImage, CodecError>;

    /// Take back a pixel buffer produced by [`decode`](Self::decode)
    fn release(&self, pixels: Vec<u8>) {
        drop(pixels);
    }
}

/// Codec backed by the `image` crate (PNG and JPEG)
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageCrateCodec;

impl ImageCodec for ImageCrateCodec {
    fn decode(&self, bytes: &[u8], mime_type: Option<&str>) -> Result<DecodedImage, CodecError> {
        let img = match mime_type {
            Some(mime) => {
                let format = ImageFormat::from_mime_type(mime)
                    .ok_or_else(|| CodecError::UnsupportedMimeType(mime.to_string()))?;
                image::load_from_memory_with_format(bytes, format)?
            }
            None => image::load_from_memory(bytes)?,
        };

        let rgba = img.to_rgba8();
        let (width, height) = rgba.dimensions();
        Ok(DecodedImage {
            width,
            height,
            pixels: rgba.into_raw(),
        })
    }
}

/// Codec that skips image decoding entirely.
///
/// Every texture decodes as a 0x0 image with no pixels. Used when only the
/// geometry matters, e.g. when timing the parser.
#[derive(Debug, Clone, Copy, Default)]
pub struct SkipImages;

impl ImageCodec for SkipImages {
    fn decode(&self, _bytes: &[u8], _mime_type: Option<&str>) -> Result<DecodedImage, CodecError> {
        Ok(DecodedImage {
            width: 0,
            height: 0,
            pixels: Vec::new(),
        })
    }
}
