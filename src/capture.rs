//! Framebuffer capture: RGBA8 conversion and PNG export

use std::path::Path;
use log::info;
use crate::rasterizer::{unpack_color, Framebuffer};

/// Error type for screenshot export
#[derive(Debug)]
pub enum CaptureError {
    ImageError(image::ImageError),
    /// Pixel data didn't match the reported size
    SizeMismatch { width: usize, height: usize, bytes: usize },
}

impl From<image::ImageError> for CaptureError {
    fn from(e: image::ImageError) -> Self {
        CaptureError::ImageError(e)
    }
}

impl std::fmt::Display for CaptureError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CaptureError::ImageError(e) => write!(f, "Image error: {}", e),
            CaptureError::SizeMismatch { width, height, bytes } => {
                write!(f, "{} bytes don't form a {}x{} RGBA image", bytes, width, height)
            }
        }
    }
}

impl std::error::Error for CaptureError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CaptureError::ImageError(e) => Some(e),
            CaptureError::SizeMismatch { .. } => None,
        }
    }
}

/// Logical region as RGBA bytes, row-major. Alpha is forced to 255: the sky clear
/// colour is stored with alpha 0.
pub fn to_rgba8(fb: &Framebuffer) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(fb.width() * fb.height() * 4);
    for &argb in fb.as_slice() {
        let [r, g, b, _] = unpack_color(argb);
        bytes.extend_from_slice(&[r, g, b, 255]);
    }
    bytes
}

/// Write a colour framebuffer to a PNG file
pub fn save_png<P: AsRef<Path>>(fb: &Framebuffer, path: P) -> Result<(), CaptureError> {
    let path = path.as_ref();
    let (width, height) = (fb.width(), fb.height());
    let bytes = to_rgba8(fb);
    let len = bytes.len();

    let img = image::RgbaImage::from_raw(width as u32, height as u32, bytes)
        .ok_or(CaptureError::SizeMismatch { width, height, bytes: len })?;
    img.save_with_format(path, image::ImageFormat::Png)?;

    info!("Saved {}x{} capture to {}", width, height, path.display());
    Ok(())
}
