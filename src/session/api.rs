//! Request/response shapes exchanged with a transport layer.

use std::path::PathBuf;

use crate::dataset::loader::Dataset;
use crate::foundation::error::NerfmaskError;
use crate::mask::raster::Rectangle;

/// Body of `set_dataset_path`.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct SetDatasetPathRequest {
    /// Absolute dataset root.
    pub path: PathBuf,
    /// Back up masks and manifest before the first rewrite.
    #[serde(rename = "makeSafetyCopy", default = "default_true")]
    pub make_safety_copy: bool,
}

fn default_true() -> bool {
    true
}

/// Body of `generate_mask`.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct GenerateMaskRequest {
    pub rectangles: Vec<Rectangle>,
    pub keep_mask: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct GenerateMaskResponse {
    pub success: bool,
}

/// Summary returned by `set_dataset_path` and `current_dataset`.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct DatasetSummary {
    pub path: PathBuf,
    pub framecount: usize,
    /// One flag per frame: does it carry a user mask (original or generated), as opposed to the
    /// canonical empty mask.
    pub frames_have_masks: Vec<bool>,
}

impl DatasetSummary {
    pub fn of(dataset: &Dataset) -> Self {
        Self {
            path: dataset.root().to_path_buf(),
            framecount: dataset.framecount(),
            frames_have_masks: dataset.frames_have_masks(),
        }
    }
}

/// Structured failure body.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl From<&NerfmaskError> for ErrorResponse {
    fn from(e: &NerfmaskError) -> Self {
        Self {
            error: e.to_string(),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/api.rs"]
mod tests;
