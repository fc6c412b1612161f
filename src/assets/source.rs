use std::path::PathBuf;

use anyhow::Context;
use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64_STANDARD};
use rayon::prelude::*;

use crate::{
    assets::decode::{PreparedImage, decode_image},
    foundation::error::{DepthliftError, DepthliftResult},
};

/// Resolves provider image references into decoded images.
///
/// Implementations must be shareable across threads: layer images are decoded in parallel.
pub trait ImageLoader: Sync {
    /// Resolve and fully decode one reference.
    fn load(&self, reference: &str) -> DepthliftResult<PreparedImage>;
}

/// Decode every reference, in parallel, preserving order. Fails on the first bad image.
pub fn load_all(
    loader: &dyn ImageLoader,
    references: &[&str],
) -> DepthliftResult<Vec<PreparedImage>> {
    references.par_iter().map(|r| loader.load(r)).collect()
}

/// Loader for `data:` URLs and paths relative to a root directory.
#[derive(Clone, Debug)]
pub struct AssetResolver {
    root: PathBuf,
}

impl AssetResolver {
    /// Resolve relative paths against `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Raw encoded bytes behind a reference.
    pub fn read_bytes(&self, reference: &str) -> DepthliftResult<Vec<u8>> {
        if let Some(rest) = reference.strip_prefix("data:") {
            return decode_data_url(rest);
        }
        let rel = normalize_rel_path(reference)?;
        let path = self.root.join(rel);
        let bytes = std::fs::read(&path)
            .with_context(|| format!("read image '{}'", path.display()))
            .map_err(|e| DepthliftError::decode(format!("{e:#}")))?;
        Ok(bytes)
    }
}

impl ImageLoader for AssetResolver {
    fn load(&self, reference: &str) -> DepthliftResult<PreparedImage> {
        let bytes = self.read_bytes(reference)?;
        decode_image(&bytes).map_err(|e| match e {
            DepthliftError::Decode(msg) => {
                DepthliftError::decode(format!("'{}': {msg}", abbreviate(reference)))
            }
            other => other,
        })
    }
}

/// Normalize and validate response-relative image paths.
///
/// The normalized result uses `/` separators, removes `.` segments, and rejects absolute paths or
/// parent traversals (`..`).
pub fn normalize_rel_path(source: &str) -> DepthliftResult<String> {
    let s = source.replace('\\', "/");
    if s.starts_with('/') {
        return Err(DepthliftError::decode("image paths must be relative"));
    }
    if s.is_empty() {
        return Err(DepthliftError::decode("image reference must be non-empty"));
    }

    let mut out = Vec::<&str>::new();
    for part in s.split('/') {
        if part.is_empty() || part == "." {
            continue;
        }
        if part == ".." {
            return Err(DepthliftError::decode("image paths must not contain '..'"));
        }
        out.push(part);
    }

    if out.is_empty() {
        return Err(DepthliftError::decode("image path must contain a file name"));
    }

    Ok(out.join("/"))
}

// `rest` is everything after `data:`, e.g. `image/png;base64,iVBOR...`.
fn decode_data_url(rest: &str) -> DepthliftResult<Vec<u8>> {
    let (meta, payload) = rest
        .split_once(',')
        .ok_or_else(|| DepthliftError::decode("data URL has no payload"))?;
    if !meta.ends_with(";base64") {
        return Err(DepthliftError::decode("only base64 data URLs are supported"));
    }
    BASE64_STANDARD
        .decode(payload.trim())
        .map_err(|e| DepthliftError::decode(format!("invalid base64 in data URL: {e}")))
}

fn abbreviate(reference: &str) -> &str {
    match reference.char_indices().nth(48) {
        Some((i, _)) => &reference[..i],
        None => reference,
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/source.rs"]
mod tests;
