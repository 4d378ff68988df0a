use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::Context;
use image::GrayImage;
use image::codecs::jpeg::JpegEncoder;

use crate::foundation::error::{NerfmaskError, NerfmaskResult};

/// Luma value that leaves a pixel unmasked.
pub const UNMASKED: u8 = 255;
/// Luma value that masks a pixel out.
pub const MASKED: u8 = 0;

/// Encoding settings for masks written to disk.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MaskEncoding {
    /// JPEG quality, 1..=100.
    pub jpeg_quality: u8,
}

impl Default for MaskEncoding {
    fn default() -> Self {
        Self { jpeg_quality: 75 }
    }
}

/// Decode any supported raster and convert it to a single 8-bit channel.
pub fn read_mask_luma(path: &Path) -> NerfmaskResult<GrayImage> {
    if !path.is_file() {
        return Err(NerfmaskError::not_found(format!(
            "mask '{}' does not exist",
            path.display()
        )));
    }
    let img = image::open(path).with_context(|| format!("decode mask '{}'", path.display()))?;
    Ok(img.to_luma8())
}

/// Write `mask` as a grayscale JPEG, creating the parent directory if needed.
pub fn write_mask_jpeg(path: &Path, mask: &GrayImage, enc: MaskEncoding) -> NerfmaskResult<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create mask dir '{}'", parent.display()))?;
    }
    let file = std::fs::File::create(path)
        .with_context(|| format!("create mask file '{}'", path.display()))?;
    let mut writer = BufWriter::new(file);
    let quality = enc.jpeg_quality.clamp(1, 100);
    JpegEncoder::new_with_quality(&mut writer, quality)
        .encode(
            mask.as_raw(),
            mask.width(),
            mask.height(),
            image::ExtendedColorType::L8,
        )
        .with_context(|| format!("encode jpeg mask '{}'", path.display()))?;
    writer
        .flush()
        .with_context(|| format!("flush mask file '{}'", path.display()))?;
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/mask/codec.rs"]
mod tests;
