use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::Context;

use crate::foundation::core::Resolution;
use crate::foundation::error::{NerfmaskError, NerfmaskResult};
use crate::manifest::model::{Manifest, repoint_masks};

/// File and directory names used inside a dataset root.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DatasetLayout {
    /// Manifest file name.
    pub manifest_file: String,
    /// Copy of the manifest with mask paths pointing into `backup_dir`.
    pub backup_manifest_file: String,
    /// Backup mask directory. Its existence marks the backup as done.
    pub backup_dir: String,
    /// Directory holding one empty mask per resolution.
    pub empty_mask_dir: String,
    /// Directory holding one generated mask per frame index.
    pub generated_mask_dir: String,
}

impl Default for DatasetLayout {
    fn default() -> Self {
        Self {
            manifest_file: "transforms.json".to_string(),
            backup_manifest_file: "backup_transforms.json".to_string(),
            backup_dir: "backup_masks".to_string(),
            empty_mask_dir: "empty_masks".to_string(),
            generated_mask_dir: "generated_masks".to_string(),
        }
    }
}

impl DatasetLayout {
    /// Root-relative path of the empty mask for `res`.
    pub fn empty_mask_rel(&self, res: Resolution) -> String {
        format!("{}/empty_mask_{}.jpeg", self.empty_mask_dir, res.key())
    }

    /// Root-relative path of the generated mask for frame `index`.
    pub fn generated_mask_rel(&self, index: usize) -> String {
        format!("{}/generated_mask_{index}.jpeg", self.generated_mask_dir)
    }

    /// Root-relative path of the backup copy of frame `index`'s mask.
    pub fn backup_mask_rel(&self, index: usize, extension: Option<&str>) -> String {
        match extension {
            Some(ext) => format!("{}/mask_{index}.{ext}", self.backup_dir),
            None => format!("{}/mask_{index}", self.backup_dir),
        }
    }

    /// Whether a manifest mask reference points into the empty-mask directory.
    pub fn is_empty_mask_ref(&self, rel: &str) -> bool {
        let rel = rel.replace('\\', "/");
        let rel = rel.strip_prefix("./").unwrap_or(&rel);
        rel.strip_prefix(self.empty_mask_dir.as_str())
            .is_some_and(|rest| rest.starts_with('/'))
    }
}

/// Outcome of [`ManifestStore::backup`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BackupOutcome {
    /// Backup marker already present; nothing was touched.
    Skipped,
    /// Backup was written.
    Created {
        /// Mask files copied successfully.
        copied: usize,
        /// Mask files that failed to copy (logged, not rolled back).
        failed: usize,
    },
}

/// Reads and writes the manifest of one dataset root.
#[derive(Clone, Debug)]
pub struct ManifestStore {
    root: PathBuf,
    layout: DatasetLayout,
}

impl ManifestStore {
    pub fn new(root: impl Into<PathBuf>, layout: DatasetLayout) -> Self {
        Self {
            root: root.into(),
            layout,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn layout(&self) -> &DatasetLayout {
        &self.layout
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.root.join(&self.layout.manifest_file)
    }

    /// Resolve a root-relative reference to an absolute path.
    pub fn resolve(&self, rel: &str) -> PathBuf {
        self.root.join(Path::new(rel))
    }

    pub fn has_manifest(&self) -> bool {
        self.manifest_path().is_file()
    }

    pub fn has_backup(&self) -> bool {
        self.root.join(&self.layout.backup_dir).exists()
    }

    pub fn read(&self) -> NerfmaskResult<Manifest> {
        let path = self.manifest_path();
        if !path.is_file() {
            return Err(NerfmaskError::not_found(format!(
                "manifest '{}' does not exist",
                path.display()
            )));
        }
        let text = std::fs::read_to_string(&path)
            .with_context(|| format!("read manifest '{}'", path.display()))?;
        Manifest::from_json_str(&text)
    }

    pub fn write(&self, manifest: &Manifest) -> NerfmaskResult<()> {
        self.write_to(&self.manifest_path(), manifest)
    }

    fn write_to(&self, path: &Path, manifest: &Manifest) -> NerfmaskResult<()> {
        let text = manifest.to_json_pretty()?;
        std::fs::write(path, text)
            .with_context(|| format!("write manifest '{}'", path.display()))?;
        Ok(())
    }

    /// Copy every referenced mask into the backup directory and write a repointed manifest copy.
    ///
    /// No-op once the backup directory exists. The directory is created before copying, so an
    /// interrupted backup is not retried on the next call.
    #[tracing::instrument(skip(self, manifest), fields(root = %self.root.display()))]
    pub fn backup(&self, manifest: &Manifest) -> NerfmaskResult<BackupOutcome> {
        if self.has_backup() {
            return Ok(BackupOutcome::Skipped);
        }

        tracing::info!("making a safety copy of the masks and manifest");
        let backup_dir = self.root.join(&self.layout.backup_dir);
        std::fs::create_dir_all(&backup_dir)
            .with_context(|| format!("create backup dir '{}'", backup_dir.display()))?;

        let mut repointed = BTreeMap::new();
        let mut failed = 0usize;
        for (i, frame) in manifest.frames().iter().enumerate() {
            let Some(mask_rel) = frame.mask_path() else {
                continue;
            };
            let src = self.resolve(mask_rel);
            let ext = Path::new(mask_rel).extension().and_then(|e| e.to_str());
            let dst_rel = self.layout.backup_mask_rel(i, ext);
            let dst = self.resolve(&dst_rel);
            match std::fs::copy(&src, &dst) {
                Ok(_) => {
                    repointed.insert(i, dst_rel);
                }
                Err(e) => {
                    failed += 1;
                    tracing::warn!(
                        frame = i,
                        src = %src.display(),
                        error = %e,
                        "failed to back up mask"
                    );
                }
            }
        }

        let backup = repoint_masks(manifest, &repointed);
        self.write_to(&self.root.join(&self.layout.backup_manifest_file), &backup)?;

        Ok(BackupOutcome::Created {
            copied: repointed.len(),
            failed,
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/manifest/store.rs"]
mod tests;
