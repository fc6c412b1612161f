use crate::{
    foundation::{core::Canvas, error::DepthliftResult},
    layers::compositor::{Layer, LayerFrame},
    mesh::{compositor::MeshFrame, surface::Surface},
};

/// A presented frame as RGBA8 pixels.
///
/// Frames are **premultiplied alpha**; the `premultiplied` flag makes this explicit at API
/// boundaries.
#[derive(Clone, Debug, PartialEq)]
pub struct FrameRGBA {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// RGBA8 bytes, tightly packed, row-major.
    pub data: Vec<u8>,
    /// Whether `data` is premultiplied alpha.
    pub premultiplied: bool,
}

impl FrameRGBA {
    /// RGBA8 of the pixel at `(x, y)`, or `None` outside the frame.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y as usize * self.width as usize + x as usize) * 4;
        let px = self.data.get(i..i + 4)?;
        Some([px[0], px[1], px[2], px[3]])
    }

    /// Straight-alpha copy of the pixels, as expected by PNG encoders.
    pub fn to_straight_rgba8(&self) -> Vec<u8> {
        if !self.premultiplied {
            return self.data.clone();
        }
        let mut out = self.data.clone();
        for px in out.chunks_exact_mut(4) {
            let a = px[3];
            if a == 0 || a == 255 {
                continue;
            }
            for c in &mut px[..3] {
                *c = ((u16::from(*c) * 255 + u16::from(a) / 2) / u16::from(a)).min(255) as u8;
            }
        }
        out
    }
}

/// Display surface driven by the session controller.
///
/// `attach_*` runs once per build and may fail; `present_*` runs once per tick and never fails.
pub trait Presenter {
    /// Whether this presenter can draw the mesh strategy.
    fn supports_mesh(&self) -> bool;

    /// Prepare to draw `layers` into a `viewport`-sized surface.
    fn attach_layers(&mut self, viewport: Canvas, layers: &[Layer]) -> DepthliftResult<()>;

    /// Prepare to draw `surface` into a `render_size` surface.
    fn attach_mesh(&mut self, render_size: Canvas, surface: &Surface) -> DepthliftResult<()>;

    /// Follow a container size change.
    fn resize(&mut self, viewport: Canvas) -> DepthliftResult<()>;

    /// Draw one frame of the flat strategy.
    fn present_layers(&mut self, layers: &[Layer], frame: &LayerFrame);

    /// Draw one frame of the mesh strategy.
    fn present_mesh(&mut self, surface: &Surface, frame: &MeshFrame);

    /// Most recently presented frame, if any.
    fn last_frame(&self) -> Option<&FrameRGBA>;

    /// Drop every attached resource. Safe to call repeatedly.
    fn release(&mut self);
}

/// Available presenter kinds.
///
/// - `Cpu` is always available.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum BackendKind {
    /// CPU raster presenter powered by `vello_cpu`.
    #[default]
    Cpu,
}

/// Backend-agnostic settings.
#[derive(Clone, Debug, Default)]
pub struct RenderSettings {
    /// If set, every frame starts from this straight-alpha RGBA8 color instead of transparent.
    pub clear_rgba: Option<[u8; 4]>,
    /// Draw the mesh without the ambient/directional shading pass.
    pub unlit_mesh: bool,
}

/// Create a presenter implementation.
pub fn create_backend(
    kind: BackendKind,
    settings: &RenderSettings,
) -> DepthliftResult<Box<dyn Presenter>> {
    match kind {
        BackendKind::Cpu => Ok(Box::new(crate::render::cpu::CpuBackend::new(
            settings.clone(),
        ))),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/backend.rs"]
mod tests;
