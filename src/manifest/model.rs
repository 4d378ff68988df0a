use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::foundation::error::{NerfmaskError, NerfmaskResult};

const FRAMES_KEY: &str = "frames";
const FILE_PATH_KEY: &str = "file_path";
const MASK_PATH_KEY: &str = "mask_path";

/// One entry of the manifest `frames` array.
///
/// Only `file_path` and `mask_path` are interpreted. Every other key (camera intrinsics,
/// `transform_matrix`, ...) is carried through untouched and in its original position.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct FrameRecord {
    fields: Map<String, Value>,
}

impl FrameRecord {
    /// Record with just an image reference.
    pub fn new(file_path: impl Into<String>) -> Self {
        let mut fields = Map::new();
        fields.insert(FILE_PATH_KEY.to_string(), Value::String(file_path.into()));
        Self { fields }
    }

    pub fn from_fields(fields: Map<String, Value>) -> Self {
        Self { fields }
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    /// Dataset-relative image path, if present and a string.
    pub fn file_path(&self) -> Option<&str> {
        self.fields.get(FILE_PATH_KEY).and_then(Value::as_str)
    }

    /// Dataset-relative mask path, if present and a string.
    pub fn mask_path(&self) -> Option<&str> {
        self.fields.get(MASK_PATH_KEY).and_then(Value::as_str)
    }

    /// Point `mask_path` at `path`. An existing key keeps its position.
    pub fn set_mask_path(&mut self, path: impl Into<String>) {
        self.fields
            .insert(MASK_PATH_KEY.to_string(), Value::String(path.into()));
    }

    pub fn with_field(mut self, key: impl Into<String>, value: Value) -> Self {
        self.fields.insert(key.into(), value);
        self
    }
}

/// Parsed dataset manifest (`transforms.json`).
///
/// Top-level keys other than `frames` are preserved verbatim, including their order relative to
/// `frames`.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "Value", into = "Value")]
pub struct Manifest {
    // `frames` stays in `doc` as a placeholder so the key keeps its position on output.
    doc: Map<String, Value>,
    frames: Vec<FrameRecord>,
}

impl Manifest {
    pub fn new(frames: Vec<FrameRecord>) -> Self {
        let mut doc = Map::new();
        doc.insert(FRAMES_KEY.to_string(), Value::Null);
        Self { doc, frames }
    }

    pub fn from_json_str(s: &str) -> NerfmaskResult<Self> {
        let value: Value = serde_json::from_str(s)
            .map_err(|e| NerfmaskError::parse(format!("manifest is not valid JSON: {e}")))?;
        Self::try_from(value)
    }

    /// Pretty JSON with four-space indentation.
    pub fn to_json_pretty(&self) -> NerfmaskResult<String> {
        let mut buf = Vec::new();
        let fmt = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut ser = serde_json::Serializer::with_formatter(&mut buf, fmt);
        self.serialize(&mut ser)
            .map_err(|e| NerfmaskError::parse(format!("serialize manifest: {e}")))?;
        String::from_utf8(buf).map_err(|e| NerfmaskError::parse(format!("manifest utf-8: {e}")))
    }

    pub fn frames(&self) -> &[FrameRecord] {
        &self.frames
    }

    pub fn frame(&self, index: usize) -> Option<&FrameRecord> {
        self.frames.get(index)
    }

    pub fn frame_mut(&mut self, index: usize) -> Option<&mut FrameRecord> {
        self.frames.get_mut(index)
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Top-level value other than `frames`.
    pub fn extra(&self, key: &str) -> Option<&Value> {
        if key == FRAMES_KEY {
            return None;
        }
        self.doc.get(key)
    }
}

impl TryFrom<Value> for Manifest {
    type Error = NerfmaskError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        let Value::Object(mut doc) = value else {
            return Err(NerfmaskError::parse("manifest root must be a JSON object"));
        };
        let frames = match doc.get_mut(FRAMES_KEY).map(Value::take) {
            Some(Value::Array(items)) => items,
            Some(_) => return Err(NerfmaskError::parse("manifest 'frames' must be an array")),
            None => return Err(NerfmaskError::parse("manifest has no 'frames' key")),
        };

        let frames = frames
            .into_iter()
            .enumerate()
            .map(|(i, item)| match item {
                Value::Object(fields) => Ok(FrameRecord::from_fields(fields)),
                _ => Err(NerfmaskError::parse(format!(
                    "manifest frame {i} must be a JSON object"
                ))),
            })
            .collect::<NerfmaskResult<Vec<_>>>()?;

        Ok(Self { doc, frames })
    }
}

impl From<Manifest> for Value {
    fn from(m: Manifest) -> Self {
        let mut doc = m.doc;
        let frames = m
            .frames
            .into_iter()
            .map(|f| Value::Object(f.fields))
            .collect();
        doc.insert(FRAMES_KEY.to_string(), Value::Array(frames));
        Value::Object(doc)
    }
}

/// Copy of `manifest` with `mask_path` replaced for every frame index in `paths`.
///
/// Indices with no matching frame are ignored.
pub fn repoint_masks(manifest: &Manifest, paths: &BTreeMap<usize, String>) -> Manifest {
    let mut out = manifest.clone();
    for (&index, path) in paths {
        if let Some(frame) = out.frames.get_mut(index) {
            frame.set_mask_path(path.clone());
        }
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/manifest/model.rs"]
mod tests;
