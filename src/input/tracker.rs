use crate::{
    animation::{ease::Ease, smooth::Smoothed2},
    foundation::core::{NormVec, Point, Rect},
};

/// Smoothed and target input vectors shared by the active compositor.
///
/// `target` is written by input events; `current` is advanced once per frame tick.
pub type InputState = Smoothed2;

/// Degrees of device tilt that map to a full-scale input vector.
const TILT_RANGE_DEG: f64 = 45.0;
/// Device pitch (beta) considered "held upright"; maps to `y = 0`.
const UPRIGHT_BETA_DEG: f64 = 90.0;

/// Keyboard shortcuts understood by the session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum KeyCommand {
    /// Increase parallax strength by one step.
    StrengthUp,
    /// Decrease parallax strength by one step.
    StrengthDown,
    /// Return the target vector to the center.
    Reset,
}

impl KeyCommand {
    /// Map a DOM-style key name to a command.
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "ArrowUp" => Some(Self::StrengthUp),
            "ArrowDown" => Some(Self::StrengthDown),
            "r" | "R" => Some(Self::Reset),
            _ => None,
        }
    }
}

/// Raw interaction events, in viewer client coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum InputEvent {
    /// Pointer moved over the viewer.
    PointerMove {
        /// Client-space pointer position.
        position: Point,
    },
    /// Pointer left the viewer.
    PointerLeave,
    /// A touch began; `position` is the first active touch point.
    TouchStart {
        /// Client-space touch position.
        position: Point,
    },
    /// The first active touch point moved.
    TouchMove {
        /// Client-space touch position.
        position: Point,
    },
    /// All touches ended.
    TouchEnd,
    /// Device orientation sample in degrees. Either angle may be unavailable.
    Orientation {
        /// Front-to-back tilt.
        beta: Option<f64>,
        /// Left-to-right tilt.
        gamma: Option<f64>,
    },
    /// Scroll-wheel tick; positive `delta_y` scrolls down.
    Wheel {
        /// Vertical scroll delta.
        delta_y: f64,
    },
    /// Keyboard shortcut.
    Key(KeyCommand),
}

/// What the session should do in response to one [`InputEvent`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum InputAction {
    /// Replace the target vector. Both strategies follow it unchanged.
    SetTarget(NormVec),
    /// Pointer target: the layer strategy follows `eased`, the mesh follows `raw`.
    SetPointer {
        /// Normalized position after the pointer response curve.
        eased: NormVec,
        /// Normalized position as measured.
        raw: NormVec,
    },
    /// Return the target vector to `(0, 0)`; the smoothed vector follows over later ticks.
    ResetTarget,
    /// Zoom step from a wheel tick (mesh strategy only).
    Zoom {
        /// Vertical scroll delta that produced the step.
        delta_y: f64,
    },
    /// Nudge parallax strength by the given number of keyboard steps.
    AdjustStrength(i32),
    /// Event carries nothing for the session.
    Ignore,
}

/// Converts pointer, touch, and orientation events into normalized target vectors.
///
/// Pointer input goes through the configured response curve for the layer strategy; touch
/// input does not. The asymmetry is long-standing viewer behavior and is kept as-is. Mesh
/// rotation always follows the uncurved pointer position.
#[derive(Clone, Debug)]
pub struct InputTracker {
    viewport: Rect,
    pointer_ease: Ease,
    touch_origin: Option<Point>,
}

impl InputTracker {
    /// Create a tracker for a viewer occupying `viewport` in client coordinates.
    pub fn new(viewport: Rect, pointer_ease: Ease) -> Self {
        Self {
            viewport,
            pointer_ease,
            touch_origin: None,
        }
    }

    /// Viewer bounds in client coordinates.
    pub fn viewport(&self) -> Rect {
        self.viewport
    }

    /// Update viewer bounds (layout change or resize).
    pub fn set_viewport(&mut self, viewport: Rect) {
        self.viewport = viewport;
    }

    /// Change the pointer response curve.
    pub fn set_pointer_ease(&mut self, ease: Ease) {
        self.pointer_ease = ease;
    }

    /// Where the current touch gesture started, if one is in progress.
    pub fn touch_origin(&self) -> Option<Point> {
        self.touch_origin
    }

    /// Map a client position to `(pos - center) / (size / 2)` on each axis.
    ///
    /// No clamping: positions inside the viewport land in `[-1, 1]`.
    pub fn normalize(&self, position: Point) -> NormVec {
        let half_w = self.viewport.width() / 2.0;
        let half_h = self.viewport.height() / 2.0;
        let axis = |p: f64, origin: f64, half: f64| {
            if half > 0.0 {
                (p - origin - half) / half
            } else {
                0.0
            }
        };
        NormVec::new(
            axis(position.x, self.viewport.x0, half_w),
            axis(position.y, self.viewport.y0, half_h),
        )
    }

    /// Interpret one event. `gyro_enabled` gates the orientation path.
    pub fn handle(&mut self, event: &InputEvent, gyro_enabled: bool) -> InputAction {
        match *event {
            InputEvent::PointerMove { position } => {
                let raw = self.normalize(position);
                InputAction::SetPointer {
                    eased: NormVec::new(
                        self.pointer_ease.signed(raw.x),
                        self.pointer_ease.signed(raw.y),
                    ),
                    raw,
                }
            }
            InputEvent::PointerLeave => InputAction::ResetTarget,
            InputEvent::TouchStart { position } => {
                self.touch_origin = Some(position);
                InputAction::Ignore
            }
            InputEvent::TouchMove { position } => InputAction::SetTarget(self.normalize(position)),
            InputEvent::TouchEnd => {
                self.touch_origin = None;
                InputAction::ResetTarget
            }
            InputEvent::Orientation { beta, gamma } => {
                if !gyro_enabled {
                    return InputAction::Ignore;
                }
                match (beta, gamma) {
                    (Some(beta), Some(gamma)) => {
                        InputAction::SetTarget(orientation_vector(beta, gamma))
                    }
                    _ => InputAction::Ignore,
                }
            }
            InputEvent::Wheel { delta_y } => InputAction::Zoom { delta_y },
            InputEvent::Key(KeyCommand::StrengthUp) => InputAction::AdjustStrength(1),
            InputEvent::Key(KeyCommand::StrengthDown) => InputAction::AdjustStrength(-1),
            InputEvent::Key(KeyCommand::Reset) => InputAction::ResetTarget,
        }
    }
}

/// Map device tilt to a target vector: `x = gamma / 45`, `y = (beta - 90) / 45`, both clamped.
pub fn orientation_vector(beta: f64, gamma: f64) -> NormVec {
    NormVec::new(
        gamma / TILT_RANGE_DEG,
        (beta - UPRIGHT_BETA_DEG) / TILT_RANGE_DEG,
    )
    .clamped()
}

#[cfg(test)]
#[path = "../../tests/unit/input/tracker.rs"]
mod tests;
