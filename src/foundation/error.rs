/// Convenience result type used across nerfmask.
pub type NerfmaskResult<T> = Result<T, NerfmaskError>;

/// Top-level error taxonomy used by the dataset and mask APIs.
#[derive(thiserror::Error, Debug)]
pub enum NerfmaskError {
    /// Manifest or a referenced asset is missing.
    #[error("not found: {0}")]
    NotFound(String),

    /// Manifest is present but malformed, or a frame lacks a required field.
    #[error("parse error: {0}")]
    Parse(String),

    /// Requested frame index is outside `[0, framecount)`.
    #[error("index out of bounds: {index} (framecount {framecount})")]
    OutOfBounds {
        /// Index as requested by the caller.
        index: i64,
        /// Number of frames in the loaded dataset.
        framecount: usize,
    },

    /// Mask requested for a frame that has none.
    #[error("no mask available for frame {index}")]
    NoMaskAvailable {
        /// Frame index.
        index: usize,
    },

    /// An operation needing a dataset was called before one was loaded.
    #[error("no dataset loaded")]
    NoDataset,

    /// Invalid caller-provided input (paths, rectangles).
    #[error("validation error: {0}")]
    Validation(String),

    /// Underlying read/write/copy/codec failure.
    #[error("io error: {0:#}")]
    Io(#[from] anyhow::Error),
}

impl NerfmaskError {
    /// Build a [`NerfmaskError::NotFound`] value.
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Build a [`NerfmaskError::Parse`] value.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }

    /// Build a [`NerfmaskError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`NerfmaskError::OutOfBounds`] value.
    pub fn out_of_bounds(index: i64, framecount: usize) -> Self {
        Self::OutOfBounds { index, framecount }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
