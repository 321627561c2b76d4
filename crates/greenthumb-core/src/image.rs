//! Normalized image payload and the normalization limits.

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;

/// Uploads above this many bytes are rejected before decoding (10 MiB).
pub const MAX_UPLOAD_BYTES: u64 = 10 * 1024 * 1024;

/// Neither output dimension may exceed this many pixels.
pub const MAX_DIMENSION: u32 = 1536;

/// JPEG quality factor used when re-encoding (0.85 on a 0..1 scale).
pub const JPEG_QUALITY: u8 = 85;

/// Media type of every normalized payload.
pub const JPEG_MIME_TYPE: &str = "image/jpeg";

/// An image ready for transmission to the remote model. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImagePayload {
    pub data: Vec<u8>,
    pub mime_type: String,
    pub width: u32,
    pub height: u32,
}

impl ImagePayload {
    /// Encodes the payload bytes as standard base64 for inline transport.
    pub fn to_base64(&self) -> String {
        BASE64_STANDARD.encode(&self.data)
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Computes output dimensions that fit within `max_dim` on both axes.
///
/// Aspect ratio is preserved and the longer side is pinned to `max_dim`.
/// Images that already fit are returned unchanged.
pub fn fit_dimensions(width: u32, height: u32, max_dim: u32) -> (u32, u32) {
    if width <= max_dim && height <= max_dim {
        return (width, height);
    }

    let scale = |short: u32, long: u32| -> u32 {
        let scaled = (f64::from(short) * f64::from(max_dim) / f64::from(long)).round();
        (scaled as u32).max(1)
    };

    if width > height {
        (max_dim, scale(height, width))
    } else {
        (scale(width, height), max_dim)
    }
}
