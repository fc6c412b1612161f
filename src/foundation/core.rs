use crate::foundation::error::{DepthliftError, DepthliftResult};

pub use kurbo::{Affine, Point, Rect, Vec2};

/// Pixel size of a presentation surface (viewer container, render target, image).
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Canvas {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Canvas {
    /// Create a validated canvas with non-zero dimensions.
    pub fn new(width: u32, height: u32) -> DepthliftResult<Self> {
        if width == 0 || height == 0 {
            return Err(DepthliftError::validation(
                "canvas width and height must be > 0",
            ));
        }
        Ok(Self { width, height })
    }

    /// Width over height.
    pub fn aspect(self) -> f64 {
        f64::from(self.width) / f64::from(self.height.max(1))
    }

    /// Canvas as a rect anchored at the origin.
    pub fn to_rect(self) -> Rect {
        Rect::new(0.0, 0.0, f64::from(self.width), f64::from(self.height))
    }

    /// Canvas center point.
    pub fn center(self) -> Point {
        Point::new(f64::from(self.width) / 2.0, f64::from(self.height) / 2.0)
    }
}

/// Normalized 2D input vector; each axis is nominally in `[-1, 1]`.
///
/// `x` grows to the right and `y` grows downwards, matching screen coordinates.
#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct NormVec {
    /// Horizontal component.
    pub x: f64,
    /// Vertical component.
    pub y: f64,
}

impl NormVec {
    /// The centered (rest) vector.
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

    /// Build a vector from its components.
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Clamp both components to `[-1, 1]`.
    pub fn clamped(self) -> Self {
        Self {
            x: self.x.clamp(-1.0, 1.0),
            y: self.y.clamp(-1.0, 1.0),
        }
    }

    /// Component-wise scale.
    pub fn scale(self, k: f64) -> Self {
        Self {
            x: self.x * k,
            y: self.y * k,
        }
    }

    /// Convert into a `kurbo` vector.
    pub fn to_vec2(self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
