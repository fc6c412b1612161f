use glam::{EulerRot, Mat4, Quat, Vec3};

use crate::{
    animation::smooth::Smoothed2,
    assets::decode::PreparedImage,
    depth::grid::DepthGrid,
    foundation::{
        core::{Canvas, NormVec},
        error::DepthliftResult,
    },
    mesh::{
        camera::{CameraFit, fit_render_size},
        surface::Surface,
    },
    session::config::{MeshTuning, SessionConfig},
};

/// Per-frame pose of the displaced mesh.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MeshFrame {
    /// Rotation about X in radians.
    pub rotation_x: f32,
    /// Rotation about Y in radians.
    pub rotation_y: f32,
    /// Model scale: zoom on X/Y, zoom times depth intensity on Z.
    pub scale: Vec3,
    /// Model-to-world transform.
    pub model: Mat4,
    /// World-to-clip transform.
    pub view_proj: Mat4,
    /// Pixel size of the render surface.
    pub render_size: Canvas,
}

/// Mesh strategy: a displaced, textured plane rotated and zoomed by input.
///
/// Vertex data is fixed at [`MeshCompositor::init`]; per frame only rotation and scale change.
#[derive(Clone, Debug)]
pub struct MeshCompositor {
    tuning: MeshTuning,
    surface: Option<Surface>,
    camera: Option<CameraFit>,
    render_size: Canvas,
    rotation: Smoothed2,
    zoom: f64,
    depth_intensity: f64,
}

impl MeshCompositor {
    /// An idle compositor; nothing is rendered until [`MeshCompositor::init`] succeeds.
    pub fn new(tuning: MeshTuning) -> Self {
        Self {
            tuning,
            surface: None,
            camera: None,
            render_size: Canvas {
                width: 1,
                height: 1,
            },
            rotation: Smoothed2::default(),
            zoom: 1.0,
            depth_intensity: 1.0,
        }
    }

    /// Build the surface for `texture` displaced by `grid` and fit it into `container`.
    ///
    /// `width`/`height` are the source image dimensions; zero falls back to the texture size.
    #[tracing::instrument(skip(self, texture, grid))]
    pub fn init(
        &mut self,
        texture: PreparedImage,
        grid: &DepthGrid,
        width: u32,
        height: u32,
        container: Canvas,
    ) -> DepthliftResult<()> {
        self.teardown();

        let (width, height) = if width == 0 || height == 0 {
            (texture.width, texture.height)
        } else {
            (width, height)
        };
        let surface = Surface::build(
            grid,
            width,
            height,
            self.tuning.segments,
            self.tuning.depth_scale,
            texture,
        )?;
        let (w, h) = surface.size();
        let camera =
            CameraFit::for_plane(w, h, self.tuning.fov_deg, self.tuning.camera_margin)?;

        self.render_size = fit_render_size(container, f64::from(w / h));
        self.camera = Some(camera);
        self.surface = Some(surface);
        self.rotation = Smoothed2::default();
        self.zoom = 1.0;
        tracing::info!(
            width,
            height,
            render_w = self.render_size.width,
            render_h = self.render_size.height,
            "mesh compositor ready"
        );
        Ok(())
    }

    /// `true` between a successful `init` and `teardown`.
    pub fn is_active(&self) -> bool {
        self.surface.is_some()
    }

    /// The displaced surface, while active.
    pub fn surface(&self) -> Option<&Surface> {
        self.surface.as_ref()
    }

    /// Pixel size of the render surface.
    pub fn render_size(&self) -> Canvas {
        self.render_size
    }

    /// Current zoom level.
    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    /// Current smoothed rotation `(x, y)` in radians.
    pub fn rotation(&self) -> (f64, f64) {
        (self.rotation.current.x, self.rotation.current.y)
    }

    /// Point the target rotation at a normalized input vector.
    pub fn set_target(&mut self, input: NormVec) {
        self.rotation.target = NormVec::new(
            -input.y * self.tuning.max_rotation,
            input.x * self.tuning.max_rotation,
        );
    }

    /// Apply one wheel tick: scrolling down zooms in, up zooms out, clamped to the zoom range.
    pub fn zoom_by_wheel(&mut self, delta_y: f64) {
        if delta_y == 0.0 || !delta_y.is_finite() {
            return;
        }
        let factor = if delta_y > 0.0 {
            1.0 + self.tuning.zoom_step
        } else {
            1.0 - self.tuning.zoom_step
        };
        self.zoom = (self.zoom * factor).clamp(self.tuning.zoom_min, self.tuning.zoom_max);
    }

    /// Set the render-time Z scale. Vertex data is untouched.
    pub fn set_depth_intensity(&mut self, intensity: f64) {
        self.depth_intensity = intensity.max(0.0);
    }

    /// Refit the render surface to a new container size.
    pub fn resize(&mut self, container: Canvas) {
        if let Some(surface) = &self.surface {
            let (w, h) = surface.size();
            self.render_size = fit_render_size(container, f64::from(w / h));
        }
        if let Some(camera) = &mut self.camera {
            camera.set_aspect(self.render_size.aspect() as f32);
        }
    }

    /// Advance rotation smoothing towards the input target and return the frame pose.
    ///
    /// Returns `None` when the compositor is not active.
    pub fn update(&mut self, input: NormVec, config: &SessionConfig) -> Option<MeshFrame> {
        let camera = self.camera?;
        if self.surface.is_none() {
            return None;
        }

        self.set_target(input);
        self.set_depth_intensity(config.depth_intensity);
        self.rotation.advance(self.tuning.rotation_speed);

        let rotation_x = self.rotation.current.x as f32;
        let rotation_y = self.rotation.current.y as f32;
        let zoom = self.zoom as f32;
        let scale = Vec3::new(zoom, zoom, zoom * self.depth_intensity as f32);
        let model = Mat4::from_scale_rotation_translation(
            scale,
            Quat::from_euler(EulerRot::XYZ, rotation_x, rotation_y, 0.0),
            Vec3::ZERO,
        );
        Some(MeshFrame {
            rotation_x,
            rotation_y,
            scale,
            model,
            view_proj: camera.view_proj(),
            render_size: self.render_size,
        })
    }

    /// Release the surface and stop producing frames. Safe to call repeatedly or before `init`.
    pub fn teardown(&mut self) {
        if self.surface.take().is_some() {
            tracing::debug!("mesh surface released");
        }
        self.camera = None;
        self.rotation.reset();
    }
}

#[cfg(test)]
#[path = "../../tests/unit/mesh/compositor.rs"]
mod tests;
