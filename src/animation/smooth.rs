use crate::foundation::core::NormVec;

/// Values closer to zero than this are considered at rest.
pub const SNAP_EPSILON: f64 = 1e-3;

/// One exponential smoothing step: move `current` towards `target` by `factor`.
///
/// `factor` is expected in `(0, 1]`; `1` jumps straight to the target.
pub fn smooth_step(current: f64, target: f64, factor: f64) -> f64 {
    current + (target - current) * factor
}

/// [`smooth_step`] followed by the rest rule: when both the stepped value and the target are
/// within [`SNAP_EPSILON`] of zero, the result is exactly `0.0`.
pub fn smooth_axis(current: f64, target: f64, factor: f64) -> f64 {
    let next = smooth_step(current, target, factor);
    if next.abs() < SNAP_EPSILON && target.abs() < SNAP_EPSILON {
        0.0
    } else {
        next
    }
}

/// A 2D value chasing a target one frame at a time.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Smoothed2 {
    /// Value presented this frame.
    pub current: NormVec,
    /// Value the current one converges to.
    pub target: NormVec,
}

impl Smoothed2 {
    /// Advance both axes by one smoothing step. Returns `true` if `current` changed.
    pub fn advance(&mut self, factor: f64) -> bool {
        let next = NormVec::new(
            smooth_axis(self.current.x, self.target.x, factor),
            smooth_axis(self.current.y, self.target.y, factor),
        );
        let changed = next != self.current;
        self.current = next;
        changed
    }

    /// Return `true` once `current` sits exactly on `target`.
    pub fn is_settled(&self) -> bool {
        self.current == self.target
    }

    /// Drop all motion immediately.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/smooth.rs"]
mod tests;
