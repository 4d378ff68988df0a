use std::path::Path;

use anyhow::Context;

use crate::foundation::error::{NerfmaskError, NerfmaskResult};

/// Native pixel dimensions of an image.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

impl Resolution {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Read the dimensions from an image header without decoding pixels.
    pub fn of_image(path: &Path) -> NerfmaskResult<Self> {
        if !path.is_file() {
            return Err(NerfmaskError::not_found(format!(
                "image '{}' does not exist",
                path.display()
            )));
        }
        let (width, height) = image::image_dimensions(path)
            .with_context(|| format!("read image dimensions of '{}'", path.display()))?;
        Ok(Self { width, height })
    }

    /// Stable `{width}x{height}` key used for asset file names.
    pub fn key(self) -> String {
        format!("{}x{}", self.width, self.height)
    }
}

impl std::fmt::Display for Resolution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Straight (non-premultiplied) RGBA8 color.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Rgba8(pub [u8; 4]);

impl Rgba8 {
    pub const TRANSPARENT: Self = Self([0, 0, 0, 0]);
}

/// Validate a caller-supplied (possibly negative) frame index against `framecount`.
pub fn checked_index(index: i64, framecount: usize) -> NerfmaskResult<usize> {
    match usize::try_from(index) {
        Ok(i) if i < framecount => Ok(i),
        _ => Err(NerfmaskError::out_of_bounds(index, framecount)),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
