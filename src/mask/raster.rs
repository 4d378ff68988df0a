use image::GrayImage;

use crate::dataset::empty::empty_mask;
use crate::dataset::loader::Dataset;
use crate::foundation::core::Resolution;
use crate::foundation::error::{NerfmaskError, NerfmaskResult};
use crate::mask::codec::{MASKED, MaskEncoding, read_mask_luma, write_mask_jpeg};

/// Rectangle drawn in editor canvas coordinates.
///
/// `img_width`/`img_height` are the canvas dimensions the rectangle was drawn against; they need
/// not match the image's native size and may differ between rectangles of the same request.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Rectangle {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub img_width: f64,
    pub img_height: f64,
}

/// Rectangle in native pixel coordinates, before clipping. Covers `[x, x+width) × [y, y+height)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PixelBox {
    pub x: i64,
    pub y: i64,
    pub width: i64,
    pub height: i64,
}

impl PixelBox {
    /// Clip to `res`, returning `(x0, y0, x1, y1)` with exclusive ends, or `None` when nothing
    /// remains.
    pub fn clip(self, res: Resolution) -> Option<(u32, u32, u32, u32)> {
        let clamp = |v: i64, max: u32| v.clamp(0, i64::from(max)) as u32;
        let x0 = clamp(self.x, res.width);
        let y0 = clamp(self.y, res.height);
        let x1 = clamp(self.x.saturating_add(self.width), res.width);
        let y1 = clamp(self.y.saturating_add(self.height), res.height);
        (x0 < x1 && y0 < y1).then_some((x0, y0, x1, y1))
    }
}

impl Rectangle {
    pub fn validate(&self) -> NerfmaskResult<()> {
        let finite = [
            self.x,
            self.y,
            self.width,
            self.height,
            self.img_width,
            self.img_height,
        ]
        .iter()
        .all(|v| v.is_finite());
        if !finite {
            return Err(NerfmaskError::validation(
                "rectangle coordinates must be finite",
            ));
        }
        if self.img_width <= 0.0 || self.img_height <= 0.0 {
            return Err(NerfmaskError::validation(
                "rectangle img_width and img_height must be > 0",
            ));
        }
        Ok(())
    }

    /// Rescale from canvas to native coordinates, flooring each component independently.
    ///
    /// Expects a rectangle that passed [`Rectangle::validate`].
    pub fn to_native(&self, res: Resolution) -> PixelBox {
        debug_assert!(self.validate().is_ok(), "unvalidated rectangle {self:?}");
        let sx = f64::from(res.width) / self.img_width;
        let sy = f64::from(res.height) / self.img_height;
        PixelBox {
            x: (self.x * sx).floor() as i64,
            y: (self.y * sy).floor() as i64,
            width: (self.width * sx).floor() as i64,
            height: (self.height * sy).floor() as i64,
        }
    }
}

/// Paint `rects` (masked) over an unmasked canvas of size `res`.
///
/// `base`, when given, is pasted top-left first without scaling. Rectangles are applied in order.
pub fn rasterize(
    res: Resolution,
    base: Option<&GrayImage>,
    rects: &[Rectangle],
) -> NerfmaskResult<GrayImage> {
    for r in rects {
        r.validate()?;
    }
    Ok(paint_rects(res, base, rects))
}

fn paint_rects(res: Resolution, base: Option<&GrayImage>, rects: &[Rectangle]) -> GrayImage {
    let mut canvas = empty_mask(res);
    if let Some(base) = base {
        image::imageops::replace(&mut canvas, base, 0, 0);
    }

    for r in rects {
        let Some((x0, y0, x1, y1)) = r.to_native(res).clip(res) else {
            continue;
        };
        for y in y0..y1 {
            for x in x0..x1 {
                canvas.put_pixel(x, y, image::Luma([MASKED]));
            }
        }
    }
    canvas
}

/// Rasterize `rects` for frame `index`, persist the mask and point the manifest at it.
///
/// With `keep_existing_mask`, the frame's current user mask (original or previously generated)
/// is composited underneath. The on-disk manifest is re-read right before the update so external
/// edits to other frames survive. Returns `true` on success.
#[tracing::instrument(skip(dataset, rects), fields(root = %dataset.root().display(), rects = rects.len()))]
pub fn generate_mask(
    dataset: &mut Dataset,
    index: i64,
    rects: &[Rectangle],
    keep_existing_mask: bool,
    enc: MaskEncoding,
) -> NerfmaskResult<bool> {
    let view = dataset.frame(index)?.clone();
    for r in rects {
        r.validate()?;
    }

    let res = Resolution::of_image(&view.image_path)?;
    let base = match &view.mask {
        Some(mask) if keep_existing_mask && mask.is_user_mask() => {
            Some(read_mask_luma(mask.path())?)
        }
        _ => None,
    };

    let canvas = paint_rects(res, base.as_ref(), rects);

    let store = dataset.store();
    let rel = store.layout().generated_mask_rel(view.index);
    let path = store.resolve(&rel);

    // The frame must exist on disk before any mask file is written.
    let mut on_disk = store.read()?;
    let on_disk_len = on_disk.len();
    let rec = on_disk.frame_mut(view.index).ok_or_else(|| {
        NerfmaskError::parse(format!(
            "manifest on disk has {on_disk_len} frames, cannot update frame {}",
            view.index
        ))
    })?;
    rec.set_mask_path(rel.as_str());

    write_mask_jpeg(&path, &canvas, enc)?;
    store.write(&on_disk)?;

    dataset.set_generated_mask(view.index, &rel)?;
    tracing::info!(frame = view.index, mask = %path.display(), "generated mask");
    Ok(true)
}

#[cfg(test)]
#[path = "../../tests/unit/mask/raster.rs"]
mod tests;
