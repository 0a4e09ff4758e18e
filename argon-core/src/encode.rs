//! Thumbnail encoding into transportable strings
//!
//! Settlement turns raw bitmaps into strings that can cross the IPC
//! boundary; the default encoder produces PNG data URLs.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder, RgbaImage};
use tracing::warn;

/// Encodes a bitmap into a transportable string form
///
/// Encoding is total and synchronous: implementations always produce a
/// string, even for degenerate images.
pub trait ThumbnailEncoder: Send + Sync {
    /// Encode `image` into its transportable representation
    fn encode(&self, image: &RgbaImage) -> String;
}

/// Encodes bitmaps as `data:image/png;base64,` URLs
pub struct PngDataUrlEncoder;

impl ThumbnailEncoder for PngDataUrlEncoder {
    fn encode(&self, image: &RgbaImage) -> String {
        let mut png = Vec::new();
        let encoder = PngEncoder::new(&mut png);
        if let Err(e) = encoder.write_image(
            image.as_raw(),
            image.width(),
            image.height(),
            ExtendedColorType::Rgba8,
        ) {
            // Encoding must stay total; degrade to an empty payload.
            warn!("PNG encoding failed: {}", e);
            png.clear();
        }
        format!("data:image/png;base64,{}", STANDARD.encode(&png))
    }
}
