use std::path::{Path, PathBuf};

use crate::{
    foundation::error::{DepthliftError, DepthliftResult},
    provider::response::ProviderResponse,
};

/// An image handed to the depth provider.
#[derive(Clone, Debug)]
pub struct Upload {
    /// Original file name.
    pub name: String,
    /// Encoded image bytes.
    pub bytes: Vec<u8>,
}

impl Upload {
    /// Read an upload from disk.
    pub fn from_path(path: &Path) -> DepthliftResult<Self> {
        let bytes = std::fs::read(path)
            .map_err(|e| DepthliftError::provider(format!("read '{}': {e}", path.display())))?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok(Self { name, bytes })
    }
}

/// The depth-estimation service seen from the viewer.
///
/// Transport failures and non-success responses both surface as
/// [`DepthliftError::Provider`].
pub trait DepthProvider {
    /// Process one upload.
    fn process(&mut self, upload: &Upload) -> DepthliftResult<ProviderResponse>;

    /// Directory that relative image references in responses resolve against.
    fn assets_root(&self) -> &Path;
}

/// Provider that replays a recorded response, for offline rendering and tests.
#[derive(Clone, Debug)]
pub struct RecordedProvider {
    response: ProviderResponse,
    assets_root: PathBuf,
}

impl RecordedProvider {
    /// Replay `response`; relative references resolve against `assets_root`.
    pub fn new(response: ProviderResponse, assets_root: impl Into<PathBuf>) -> Self {
        Self {
            response,
            assets_root: assets_root.into(),
        }
    }

    /// Load a recorded response JSON. References resolve next to the file.
    pub fn from_file(path: &Path) -> DepthliftResult<Self> {
        let bytes = std::fs::read(path).map_err(|e| {
            DepthliftError::provider(format!("read response '{}': {e}", path.display()))
        })?;
        let response = ProviderResponse::from_json(&bytes)?;
        let root = path.parent().unwrap_or_else(|| Path::new("."));
        Ok(Self::new(response, root))
    }
}

impl DepthProvider for RecordedProvider {
    fn process(&mut self, upload: &Upload) -> DepthliftResult<ProviderResponse> {
        tracing::debug!(
            upload = %upload.name,
            bytes = upload.bytes.len(),
            "replaying recorded response"
        );
        self.response.clone().into_result()
    }

    fn assets_root(&self) -> &Path {
        &self.assets_root
    }
}
