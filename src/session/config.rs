use std::path::Path;

use anyhow::Context;

use crate::{
    animation::ease::Ease,
    foundation::error::{DepthliftError, DepthliftResult},
};

/// Parallax strength change per keyboard step.
pub const STRENGTH_STEP: f64 = 5.0;
/// Upper bound for parallax strength.
pub const MAX_PARALLAX_STRENGTH: f64 = 100.0;

/// Process-wide viewer settings. Compositors read this every frame; hosts may change it at any
/// time between ticks.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Planar layer offset, in pixels, for a full-scale input on a depth-1 layer.
    pub parallax_strength: f64,
    /// Container tilt, in degrees, for a full-scale input.
    pub rotation_amount: f64,
    /// Per-tick smoothing factor for the input vector.
    pub smoothness: f64,
    /// Pseudo-Z spread of the layer stack, in pixels.
    pub depth_scale_base: f64,
    /// Multiplier on depth effects (layer pseudo-Z and mesh Z scale).
    pub depth_intensity: f64,
    /// Maximum number of layers shown by the flat strategy.
    pub max_layers: usize,
    /// Enable device-orientation input.
    pub gyro_enabled: bool,
    /// Use the mesh strategy whenever the provider data and presenter allow it.
    pub prefer_mesh: bool,
    /// Response curve applied to pointer input.
    pub pointer_ease: Ease,
    /// Mesh strategy constants.
    pub mesh: MeshTuning,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            parallax_strength: 30.0,
            rotation_amount: 4.0,
            smoothness: 0.12,
            depth_scale_base: 50.0,
            depth_intensity: 1.0,
            max_layers: 5,
            gyro_enabled: false,
            prefer_mesh: true,
            pointer_ease: Ease::InOutQuad,
            mesh: MeshTuning::default(),
        }
    }
}

/// Constants for the displaced-mesh strategy.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct MeshTuning {
    /// Z displacement for a depth-1 vertex, in image pixels.
    pub depth_scale: f64,
    /// Per-tick smoothing factor for mesh rotation.
    pub rotation_speed: f64,
    /// Rotation, in radians, for a full-scale input.
    pub max_rotation: f64,
    /// Grid cells per side.
    pub segments: u32,
    /// Vertical field of view in degrees.
    pub fov_deg: f64,
    /// Extra camera distance so the tilted plane does not clip at the edges.
    pub camera_margin: f64,
    /// Smallest zoom level.
    pub zoom_min: f64,
    /// Largest zoom level.
    pub zoom_max: f64,
    /// Relative zoom change per wheel tick.
    pub zoom_step: f64,
}

impl Default for MeshTuning {
    fn default() -> Self {
        Self {
            depth_scale: 60.0,
            rotation_speed: 0.08,
            max_rotation: 0.25,
            segments: 128,
            fov_deg: 45.0,
            camera_margin: 1.5,
            zoom_min: 0.5,
            zoom_max: 3.0,
            zoom_step: 0.1,
        }
    }
}

impl SessionConfig {
    /// Load a JSON config file. Missing fields take their defaults.
    pub fn from_json_file(path: &Path) -> DepthliftResult<Self> {
        let bytes =
            std::fs::read(path).with_context(|| format!("read config '{}'", path.display()))?;
        let cfg: Self = serde_json::from_slice(&bytes)
            .with_context(|| format!("parse config '{}'", path.display()))?;
        cfg.validate()?;
        Ok(cfg.sanitized())
    }

    /// Reject non-finite numbers and empty zoom ranges.
    pub fn validate(&self) -> DepthliftResult<()> {
        let finite = [
            ("parallax_strength", self.parallax_strength),
            ("rotation_amount", self.rotation_amount),
            ("smoothness", self.smoothness),
            ("depth_scale_base", self.depth_scale_base),
            ("depth_intensity", self.depth_intensity),
            ("mesh.depth_scale", self.mesh.depth_scale),
            ("mesh.rotation_speed", self.mesh.rotation_speed),
            ("mesh.max_rotation", self.mesh.max_rotation),
            ("mesh.fov_deg", self.mesh.fov_deg),
            ("mesh.camera_margin", self.mesh.camera_margin),
            ("mesh.zoom_min", self.mesh.zoom_min),
            ("mesh.zoom_max", self.mesh.zoom_max),
            ("mesh.zoom_step", self.mesh.zoom_step),
        ];
        for (name, v) in finite {
            if !v.is_finite() {
                return Err(DepthliftError::validation(format!("{name} must be finite")));
            }
        }
        if !(self.mesh.fov_deg > 0.0 && self.mesh.fov_deg < 180.0) {
            return Err(DepthliftError::validation(
                "mesh.fov_deg must be in (0, 180)",
            ));
        }
        if self.mesh.zoom_min <= 0.0 || self.mesh.zoom_min > self.mesh.zoom_max {
            return Err(DepthliftError::validation(
                "mesh zoom range must satisfy 0 < zoom_min <= zoom_max",
            ));
        }
        Ok(())
    }

    /// Apply the numeric clamps the controls enforce.
    pub fn sanitized(mut self) -> Self {
        self.parallax_strength = self.parallax_strength.clamp(0.0, MAX_PARALLAX_STRENGTH);
        self.smoothness = self.smoothness.clamp(0.01, 1.0);
        self.depth_intensity = self.depth_intensity.max(0.0);
        self.max_layers = self.max_layers.max(1);
        self.mesh.segments = self.mesh.segments.max(1);
        self.mesh.rotation_speed = self.mesh.rotation_speed.clamp(0.01, 1.0);
        self.mesh.camera_margin = self.mesh.camera_margin.max(1.0);
        self
    }

    /// Apply `steps` keyboard strength steps, clamped to `[0, 100]`.
    pub fn nudge_strength(&mut self, steps: i32) {
        self.parallax_strength = (self.parallax_strength + f64::from(steps) * STRENGTH_STEP)
            .clamp(0.0, MAX_PARALLAX_STRENGTH);
    }

    /// Effective pseudo-Z spread of the layer stack.
    pub fn depth_scale(&self) -> f64 {
        self.depth_scale_base * self.depth_intensity
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/config.rs"]
mod tests;
