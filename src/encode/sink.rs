use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::{foundation::error::DepthliftResult, render::backend::FrameRGBA};

/// Configuration provided to a [`FrameSink`] before the first frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SinkConfig {
    /// Output width in pixels.
    pub width: u32,
    /// Output height in pixels.
    pub height: u32,
}

/// Sink contract for consuming presented frames in tick order.
///
/// Ordering contract: `push_frame` is called with strictly increasing tick indices.
pub trait FrameSink {
    /// Called once before any frames are pushed.
    fn begin(&mut self, cfg: SinkConfig) -> DepthliftResult<()>;
    /// Push one frame.
    fn push_frame(&mut self, tick: u64, frame: &FrameRGBA) -> DepthliftResult<()>;
    /// Called once after the last frame is pushed.
    fn end(&mut self) -> DepthliftResult<()>;
}

/// In-memory sink for tests and debugging.
#[derive(Debug, Default)]
pub struct InMemorySink {
    cfg: Option<SinkConfig>,
    frames: Vec<(u64, FrameRGBA)>,
    finished: bool,
}

impl InMemorySink {
    /// Create a new in-memory sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the sink configuration captured in `begin`, if any.
    pub fn config(&self) -> Option<SinkConfig> {
        self.cfg
    }

    /// Borrow the captured frames.
    pub fn frames(&self) -> &[(u64, FrameRGBA)] {
        &self.frames
    }

    /// `true` once `end` has been called.
    pub fn is_finished(&self) -> bool {
        self.finished
    }
}

impl FrameSink for InMemorySink {
    fn begin(&mut self, cfg: SinkConfig) -> DepthliftResult<()> {
        self.cfg = Some(cfg);
        self.frames.clear();
        self.finished = false;
        Ok(())
    }

    fn push_frame(&mut self, tick: u64, frame: &FrameRGBA) -> DepthliftResult<()> {
        self.frames.push((tick, frame.clone()));
        Ok(())
    }

    fn end(&mut self) -> DepthliftResult<()> {
        self.finished = true;
        Ok(())
    }
}

/// Writes every frame as `<prefix><tick:05>.png` into a directory.
#[derive(Debug)]
pub struct PngSequenceSink {
    dir: PathBuf,
    prefix: String,
    written: Vec<PathBuf>,
}

impl PngSequenceSink {
    /// Sink writing into `dir` (created on `begin`).
    pub fn new(dir: impl Into<PathBuf>, prefix: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            prefix: prefix.into(),
            written: Vec::new(),
        }
    }

    /// Paths written so far, in push order.
    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }

    fn path_for(&self, tick: u64) -> PathBuf {
        self.dir.join(format!("{}{tick:05}.png", self.prefix))
    }
}

impl FrameSink for PngSequenceSink {
    fn begin(&mut self, cfg: SinkConfig) -> DepthliftResult<()> {
        std::fs::create_dir_all(&self.dir)
            .with_context(|| format!("create output dir '{}'", self.dir.display()))?;
        self.written.clear();
        tracing::debug!(
            dir = %self.dir.display(),
            width = cfg.width,
            height = cfg.height,
            "png sequence started"
        );
        Ok(())
    }

    fn push_frame(&mut self, tick: u64, frame: &FrameRGBA) -> DepthliftResult<()> {
        let path = self.path_for(tick);
        write_png(&path, frame)?;
        self.written.push(path);
        Ok(())
    }

    fn end(&mut self) -> DepthliftResult<()> {
        tracing::info!(
            frames = self.written.len(),
            dir = %self.dir.display(),
            "png sequence written"
        );
        Ok(())
    }
}

/// Encode one frame as a straight-alpha PNG.
pub fn write_png(path: &Path, frame: &FrameRGBA) -> DepthliftResult<()> {
    image::save_buffer_with_format(
        path,
        &frame.to_straight_rgba8(),
        frame.width,
        frame.height,
        image::ColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .with_context(|| format!("write png '{}'", path.display()))?;
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/encode/sink.rs"]
mod tests;
