//! nerfmask edits per-frame segmentation masks of a NeRF/photogrammetry dataset described by a
//! `transforms.json` manifest.
//!
//! # Pipeline overview
//!
//! 1. **Load**: [`Dataset::load`] reads the manifest, optionally backs up masks and manifest once,
//!    replaces missing or all-white masks with one shared empty mask per image resolution, and
//!    rewrites the manifest.
//! 2. **Edit**: [`generate_mask`] rescales editor rectangles to native resolution, paints them
//!    (optionally over the current mask), writes the result and points the manifest at it.
//! 3. **Preview**: [`render_overlay`] turns a grayscale mask into a tinted RGBA overlay.
//!
//! [`MaskSession`] wraps these for a transport layer: one active dataset, loads and edits
//! serialized, reads served from `Arc` snapshots.
#![forbid(unsafe_code)]

mod dataset;
mod foundation;
mod manifest;
mod mask;
mod session;

pub use dataset::empty::{
    empty_mask, ensure_empty_mask_assets, is_empty_mask, luma_extrema, mask_file_is_empty,
};
pub use dataset::loader::{Dataset, FrameMask, FrameView, LoadOpts, load_dataset};
pub use foundation::core::{Resolution, Rgba8, checked_index};
pub use foundation::error::{NerfmaskError, NerfmaskResult};
pub use manifest::model::{FrameRecord, Manifest, repoint_masks};
pub use manifest::store::{BackupOutcome, DatasetLayout, ManifestStore};
pub use mask::codec::{MASKED, MaskEncoding, UNMASKED, read_mask_luma, write_mask_jpeg};
pub use mask::preview::{PreviewStyle, overlay_png, render_overlay};
pub use mask::raster::{PixelBox, Rectangle, generate_mask, rasterize};
pub use session::api::{
    DatasetSummary, ErrorResponse, GenerateMaskRequest, GenerateMaskResponse,
    SetDatasetPathRequest,
};
pub use session::mask_session::{MaskSession, SessionOpts};
