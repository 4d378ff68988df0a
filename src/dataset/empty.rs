use std::collections::BTreeSet;
use std::path::Path;

use image::GrayImage;

use crate::foundation::core::Resolution;
use crate::foundation::error::NerfmaskResult;
use crate::manifest::store::ManifestStore;
use crate::mask::codec::{MaskEncoding, UNMASKED, read_mask_luma, write_mask_jpeg};

/// Minimum and maximum luma of `mask`, or `None` for a zero-sized image.
pub fn luma_extrema(mask: &GrayImage) -> Option<(u8, u8)> {
    mask.pixels().map(|p| p.0[0]).fold(None, |acc, v| match acc {
        None => Some((v, v)),
        Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
    })
}

/// A mask is empty when every pixel is exactly [`UNMASKED`].
pub fn is_empty_mask(mask: &GrayImage) -> bool {
    luma_extrema(mask) == Some((UNMASKED, UNMASKED))
}

pub fn mask_file_is_empty(path: &Path) -> NerfmaskResult<bool> {
    Ok(is_empty_mask(&read_mask_luma(path)?))
}

/// Uniformly unmasked canvas of the given size.
pub fn empty_mask(res: Resolution) -> GrayImage {
    GrayImage::from_pixel(res.width, res.height, image::Luma([UNMASKED]))
}

/// Write the empty mask for every resolution in `resolutions` that does not exist yet.
///
/// Returns the number of files created.
pub fn ensure_empty_mask_assets(
    store: &ManifestStore,
    resolutions: &BTreeSet<Resolution>,
    enc: MaskEncoding,
) -> NerfmaskResult<usize> {
    let mut created = 0usize;
    for &res in resolutions {
        let path = store.resolve(&store.layout().empty_mask_rel(res));
        if path.is_file() {
            continue;
        }
        write_mask_jpeg(&path, &empty_mask(res), enc)?;
        tracing::debug!(resolution = %res, path = %path.display(), "wrote empty mask");
        created += 1;
    }
    Ok(created)
}

#[cfg(test)]
#[path = "../../tests/unit/dataset/empty.rs"]
mod tests;
