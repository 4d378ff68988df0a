use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use crate::dataset::loader::{Dataset, LoadOpts};
use crate::foundation::error::{NerfmaskError, NerfmaskResult};
use crate::manifest::store::{DatasetLayout, ManifestStore};
use crate::mask::codec::MaskEncoding;
use crate::mask::preview::{PreviewStyle, overlay_png};
use crate::mask::raster::generate_mask;
use crate::session::api::{DatasetSummary, GenerateMaskRequest, GenerateMaskResponse};

/// Options shared by every dataset a [`MaskSession`] loads.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SessionOpts {
    /// File and directory names inside a dataset root.
    pub layout: DatasetLayout,
    /// Encoding of empty and generated masks.
    pub encoding: MaskEncoding,
    /// Overlay style for [`MaskSession::get_mask`].
    pub preview: PreviewStyle,
}

/// Holds the single active dataset and serializes everything that mutates it.
///
/// Loads and mask generation run under one update lock. Readers clone an `Arc` snapshot of the
/// current dataset, so a concurrent load replacing it never invalidates an in-flight read.
#[derive(Debug, Default)]
pub struct MaskSession {
    opts: SessionOpts,
    update: Mutex<()>,
    current: RwLock<Option<Arc<Dataset>>>,
}

impl MaskSession {
    pub fn new(opts: SessionOpts) -> Self {
        Self {
            opts,
            update: Mutex::new(()),
            current: RwLock::new(None),
        }
    }

    pub fn opts(&self) -> &SessionOpts {
        &self.opts
    }

    /// Snapshot of the active dataset, if any.
    pub fn dataset(&self) -> Option<Arc<Dataset>> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn require_dataset(&self) -> NerfmaskResult<Arc<Dataset>> {
        self.dataset().ok_or(NerfmaskError::NoDataset)
    }

    fn replace(&self, dataset: Option<Arc<Dataset>>) {
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = dataset;
    }

    /// Load the dataset at `path`, replacing the active one.
    ///
    /// `path` must be absolute, exist, and contain the manifest. On any failure the session is
    /// left without a dataset.
    pub fn set_dataset_path(
        &self,
        path: impl AsRef<Path>,
        make_safety_copy: bool,
    ) -> NerfmaskResult<DatasetSummary> {
        let path = path.as_ref();
        let _guard = self.update.lock().unwrap_or_else(PoisonError::into_inner);

        let loaded = self.check_root(path).and_then(|()| {
            let store = ManifestStore::new(path, self.opts.layout.clone());
            Dataset::load(
                store,
                LoadOpts {
                    make_safety_copy,
                    encoding: self.opts.encoding,
                },
            )
        });

        match loaded {
            Ok(dataset) => {
                let summary = DatasetSummary::of(&dataset);
                self.replace(Some(Arc::new(dataset)));
                Ok(summary)
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "failed to load dataset");
                self.replace(None);
                Err(e)
            }
        }
    }

    fn check_root(&self, path: &Path) -> NerfmaskResult<()> {
        if !path.is_absolute() {
            return Err(NerfmaskError::validation("path must be absolute"));
        }
        if !path.exists() {
            return Err(NerfmaskError::not_found(format!(
                "path '{}' does not exist",
                path.display()
            )));
        }
        if !path.join(&self.opts.layout.manifest_file).is_file() {
            return Err(NerfmaskError::not_found(format!(
                "path '{}' does not contain a {} file",
                path.display(),
                self.opts.layout.manifest_file
            )));
        }
        Ok(())
    }

    pub fn current_dataset(&self) -> NerfmaskResult<DatasetSummary> {
        let dataset = self.require_dataset()?;
        Ok(DatasetSummary::of(&dataset))
    }

    /// Absolute path of the image for frame `index`.
    pub fn get_image(&self, index: i64) -> NerfmaskResult<PathBuf> {
        let dataset = self.require_dataset()?;
        Ok(dataset.frame(index)?.image_path.clone())
    }

    /// PNG overlay of frame `index`'s current mask.
    pub fn get_mask(&self, index: i64) -> NerfmaskResult<Vec<u8>> {
        let dataset = self.require_dataset()?;
        let view = dataset.frame(index)?;
        let path = view
            .current_mask_path()
            .ok_or(NerfmaskError::NoMaskAvailable { index: view.index })?;
        overlay_png(path, self.opts.preview)
    }

    pub fn generate_mask(
        &self,
        index: i64,
        req: &GenerateMaskRequest,
    ) -> NerfmaskResult<GenerateMaskResponse> {
        let _guard = self.update.lock().unwrap_or_else(PoisonError::into_inner);
        let current = self.require_dataset()?;
        let mut next = Dataset::clone(&current);
        let success = generate_mask(
            &mut next,
            index,
            &req.rectangles,
            req.keep_mask,
            self.opts.encoding,
        )?;
        self.replace(Some(Arc::new(next)));
        Ok(GenerateMaskResponse { success })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/mask_session.rs"]
mod tests;
