use glam::{Mat4, Vec3, Vec4};

use crate::foundation::{
    core::Canvas,
    error::{DepthliftError, DepthliftResult},
};

const NEAR: f32 = 0.1;
const MIN_FAR: f32 = 5000.0;

/// Perspective camera on the +Z axis looking at the plane's center.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraFit {
    /// Vertical field of view in radians.
    pub fov_y: f32,
    /// Width over height of the projection.
    pub aspect: f32,
    /// Camera distance from the origin.
    pub distance: f32,
    /// Far clip plane.
    pub far: f32,
}

impl CameraFit {
    /// Place the camera so an undistorted `width × height` plane fills the view vertically at
    /// zoom 1, then back off by `margin`.
    pub fn for_plane(width: f32, height: f32, fov_deg: f64, margin: f64) -> DepthliftResult<Self> {
        if !(width > 0.0 && height > 0.0) {
            return Err(DepthliftError::validation("camera plane must be non-empty"));
        }
        if !(fov_deg > 0.0 && fov_deg < 180.0) {
            return Err(DepthliftError::validation("camera field of view out of range"));
        }
        let fov_y = (fov_deg as f32).to_radians();
        let half_tan = (fov_y / 2.0).tan();
        let distance = (height / 2.0 / half_tan).abs() * margin.max(1.0) as f32;
        Ok(Self {
            fov_y,
            aspect: width / height,
            distance,
            far: (distance * 4.0).max(MIN_FAR),
        })
    }

    /// Refit the projection aspect (viewer resize).
    pub fn set_aspect(&mut self, aspect: f32) {
        if aspect.is_finite() && aspect > 0.0 {
            self.aspect = aspect;
        }
    }

    /// World-to-camera transform.
    pub fn view(&self) -> Mat4 {
        Mat4::look_at_rh(Vec3::new(0.0, 0.0, self.distance), Vec3::ZERO, Vec3::Y)
    }

    /// Camera-to-clip transform.
    pub fn projection(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_y, self.aspect, NEAR, self.far)
    }

    /// Combined world-to-clip transform.
    pub fn view_proj(&self) -> Mat4 {
        self.projection() * self.view()
    }
}

/// A world point projected into a pixel viewport.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Projected {
    /// Pixel x, growing right.
    pub x: f64,
    /// Pixel y, growing down.
    pub y: f64,
    /// Distance in front of the camera (larger is further away).
    pub depth: f32,
}

/// Project `p` through `clip_from_world` into a `viewport`-sized pixel grid.
///
/// Returns `None` for points behind the camera.
pub fn project(clip_from_world: Mat4, p: Vec3, viewport: Canvas) -> Option<Projected> {
    let clip: Vec4 = clip_from_world * p.extend(1.0);
    if clip.w <= f32::EPSILON {
        return None;
    }
    let ndc = clip.truncate() / clip.w;
    Some(Projected {
        x: f64::from((ndc.x * 0.5 + 0.5) * viewport.width as f32),
        y: f64::from((0.5 - ndc.y * 0.5) * viewport.height as f32),
        depth: clip.w,
    })
}

/// Largest size with the image's aspect ratio that fits inside `container` (no stretching).
pub fn fit_render_size(container: Canvas, image_aspect: f64) -> Canvas {
    let (cw, ch) = (f64::from(container.width), f64::from(container.height));
    let (w, h) = if image_aspect > container.aspect() {
        (cw, cw / image_aspect)
    } else {
        (ch * image_aspect, ch)
    };
    Canvas {
        width: (w.round() as u32).max(1),
        height: (h.round() as u32).max(1),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/mesh/camera.rs"]
mod tests;
