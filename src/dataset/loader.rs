use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use rayon::prelude::*;

use crate::dataset::empty::{ensure_empty_mask_assets, mask_file_is_empty};
use crate::foundation::core::{Resolution, checked_index};
use crate::foundation::error::{NerfmaskError, NerfmaskResult};
use crate::manifest::model::{FrameRecord, Manifest};
use crate::manifest::store::{BackupOutcome, DatasetLayout, ManifestStore};
use crate::mask::codec::MaskEncoding;

/// Where a frame's current mask comes from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FrameMask {
    /// Mask referenced by the manifest that masks at least one pixel.
    Original(PathBuf),
    /// Shared all-white mask for the frame's native resolution.
    Empty {
        /// Absolute path of the empty-mask asset.
        path: PathBuf,
        /// Native resolution of the frame image.
        resolution: Resolution,
    },
    /// Mask written by [`crate::generate_mask`].
    Generated(PathBuf),
}

impl FrameMask {
    pub fn path(&self) -> &Path {
        match self {
            Self::Original(p) | Self::Generated(p) => p,
            Self::Empty { path, .. } => path,
        }
    }

    /// True for masks that actually carry user intent (not the canonical empty mask).
    pub fn is_user_mask(&self) -> bool {
        !matches!(self, Self::Empty { .. })
    }
}

/// In-memory view of one manifest frame.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameView {
    /// Position in the manifest `frames` array.
    pub index: usize,
    /// Absolute image path.
    pub image_path: PathBuf,
    /// Current mask, if any.
    pub mask: Option<FrameMask>,
}

impl FrameView {
    /// Absolute path of the original (non-empty, manifest-provided) mask.
    pub fn mask_path(&self) -> Option<&Path> {
        match &self.mask {
            Some(FrameMask::Original(p)) => Some(p),
            _ => None,
        }
    }

    /// Absolute path of a mask synthesized by nerfmask (empty or generated).
    pub fn quick_mask_path(&self) -> Option<&Path> {
        match &self.mask {
            Some(FrameMask::Empty { path, .. }) => Some(path),
            Some(FrameMask::Generated(p)) => Some(p),
            _ => None,
        }
    }

    /// Absolute path of whichever mask is current.
    pub fn current_mask_path(&self) -> Option<&Path> {
        self.mask.as_ref().map(FrameMask::path)
    }

    pub fn has_user_mask(&self) -> bool {
        self.mask.as_ref().is_some_and(FrameMask::is_user_mask)
    }
}

/// Options for [`Dataset::load`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LoadOpts {
    /// Back up masks and manifest before the first rewrite.
    pub make_safety_copy: bool,
    /// Encoding for empty-mask assets.
    pub encoding: MaskEncoding,
}

impl Default for LoadOpts {
    fn default() -> Self {
        Self {
            make_safety_copy: true,
            encoding: MaskEncoding::default(),
        }
    }
}

/// Normalized, memory-resident dataset.
///
/// Owns the manifest it was loaded from; each [`FrameView`] index doubles as the index of its
/// [`FrameRecord`], so record mutations go through the dataset and stay visible to both.
#[derive(Clone, Debug)]
pub struct Dataset {
    store: ManifestStore,
    manifest: Manifest,
    frames: Vec<FrameView>,
}

enum Classified {
    Kept(PathBuf),
    Empty(Resolution),
}

impl Dataset {
    /// Read, back up (optionally), normalize and rewrite the manifest under `store.root()`.
    ///
    /// All-or-nothing: a frame without `file_path` or any unreadable image/mask fails the load.
    #[tracing::instrument(skip(store), fields(root = %store.root().display()))]
    pub fn load(store: ManifestStore, opts: LoadOpts) -> NerfmaskResult<Self> {
        let mut manifest = store.read()?;

        if opts.make_safety_copy
            && let BackupOutcome::Created { copied, failed } = store.backup(&manifest)?
        {
            tracing::info!(copied, failed, "backup written");
        }

        let classified = manifest
            .frames()
            .par_iter()
            .enumerate()
            .map(|(i, rec)| classify_frame(&store, i, rec))
            .collect::<NerfmaskResult<Vec<_>>>()?;

        let resolutions: BTreeSet<Resolution> = classified
            .iter()
            .filter_map(|(_, c)| match c {
                Classified::Empty(res) => Some(*res),
                Classified::Kept(_) => None,
            })
            .collect();
        let created = ensure_empty_mask_assets(&store, &resolutions, opts.encoding)?;

        let mut frames = Vec::with_capacity(classified.len());
        for (index, (image_path, class)) in classified.into_iter().enumerate() {
            let mask = match class {
                Classified::Kept(path) => FrameMask::Original(path),
                Classified::Empty(resolution) => {
                    let rel = store.layout().empty_mask_rel(resolution);
                    if let Some(rec) = manifest.frame_mut(index) {
                        rec.set_mask_path(rel.as_str());
                    }
                    FrameMask::Empty {
                        path: store.resolve(&rel),
                        resolution,
                    }
                }
            };
            frames.push(FrameView {
                index,
                image_path,
                mask: Some(mask),
            });
        }

        store.write(&manifest)?;
        tracing::info!(
            frames = frames.len(),
            empty_resolutions = resolutions.len(),
            empty_assets_created = created,
            "dataset loaded"
        );

        Ok(Self {
            store,
            manifest,
            frames,
        })
    }

    pub fn store(&self) -> &ManifestStore {
        &self.store
    }

    pub fn root(&self) -> &Path {
        self.store.root()
    }

    pub fn layout(&self) -> &DatasetLayout {
        self.store.layout()
    }

    pub fn manifest(&self) -> &Manifest {
        &self.manifest
    }

    pub fn framecount(&self) -> usize {
        self.frames.len()
    }

    pub fn frames(&self) -> &[FrameView] {
        &self.frames
    }

    /// Frame view at a caller-supplied index; negative or past-the-end is `OutOfBounds`.
    pub fn frame(&self, index: i64) -> NerfmaskResult<&FrameView> {
        let i = checked_index(index, self.frames.len())?;
        Ok(&self.frames[i])
    }

    /// Manifest record backing frame `index`.
    pub fn record(&self, index: usize) -> Option<&FrameRecord> {
        self.manifest.frame(index)
    }

    /// Per-frame flag: does the frame carry a user-meaningful mask.
    pub fn frames_have_masks(&self) -> Vec<bool> {
        self.frames.iter().map(FrameView::has_user_mask).collect()
    }

    /// Point frame `index` at a freshly generated mask, in both the view and its record.
    pub(crate) fn set_generated_mask(&mut self, index: usize, rel: &str) -> NerfmaskResult<()> {
        let framecount = self.frames.len();
        let view = self
            .frames
            .get_mut(index)
            .ok_or_else(|| NerfmaskError::out_of_bounds(index as i64, framecount))?;
        view.mask = Some(FrameMask::Generated(self.store.resolve(rel)));
        if let Some(rec) = self.manifest.frame_mut(index) {
            rec.set_mask_path(rel);
        }
        Ok(())
    }
}

/// Load `root` with the default layout and encoding.
pub fn load_dataset(root: impl Into<PathBuf>, make_safety_copy: bool) -> NerfmaskResult<Dataset> {
    let store = ManifestStore::new(root, DatasetLayout::default());
    Dataset::load(
        store,
        LoadOpts {
            make_safety_copy,
            ..LoadOpts::default()
        },
    )
}

fn classify_frame(
    store: &ManifestStore,
    index: usize,
    rec: &FrameRecord,
) -> NerfmaskResult<(PathBuf, Classified)> {
    let file_path = rec
        .file_path()
        .ok_or_else(|| NerfmaskError::parse(format!("frame {index} has no 'file_path'")))?;
    let image_path = store.resolve(file_path);

    if let Some(rel) = rec.mask_path() {
        // Already normalized: skip decoding the lossy asset.
        if !store.layout().is_empty_mask_ref(rel) {
            let mask_path = store.resolve(rel);
            if !mask_file_is_empty(&mask_path)? {
                tracing::debug!(frame = index, mask = %mask_path.display(), "kept mask");
                return Ok((image_path, Classified::Kept(mask_path)));
            }
        }
    }

    let res = Resolution::of_image(&image_path)?;
    tracing::debug!(frame = index, resolution = %res, "empty mask");
    Ok((image_path, Classified::Empty(res)))
}

#[cfg(test)]
#[path = "../../tests/unit/dataset/loader.rs"]
mod tests;
