use std::io::Cursor;
use std::path::Path;

use anyhow::Context;
use image::{GrayImage, RgbaImage};

use crate::foundation::core::Rgba8;
use crate::foundation::error::NerfmaskResult;
use crate::mask::codec::read_mask_luma;

/// How a mask is turned into an editor overlay.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PreviewStyle {
    /// Luma strictly below this value counts as masked.
    pub threshold: u8,
    /// Color painted over masked pixels.
    pub tint: Rgba8,
}

impl Default for PreviewStyle {
    fn default() -> Self {
        Self {
            threshold: 128,
            tint: Rgba8([0, 0, 255, 255]),
        }
    }
}

/// Masked pixels become `style.tint`, everything else fully transparent.
pub fn render_overlay(mask: &GrayImage, style: PreviewStyle) -> RgbaImage {
    RgbaImage::from_fn(mask.width(), mask.height(), |x, y| {
        let luma = mask.get_pixel(x, y).0[0];
        if luma < style.threshold {
            image::Rgba(style.tint.0)
        } else {
            image::Rgba(Rgba8::TRANSPARENT.0)
        }
    })
}

/// Read the mask at `path` and return its overlay as PNG bytes.
pub fn overlay_png(path: &Path, style: PreviewStyle) -> NerfmaskResult<Vec<u8>> {
    let overlay = render_overlay(&read_mask_luma(path)?, style);
    let mut buf = Vec::new();
    overlay
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .with_context(|| format!("encode overlay png for '{}'", path.display()))?;
    Ok(buf)
}

#[cfg(test)]
#[path = "../../tests/unit/mask/preview.rs"]
mod tests;
