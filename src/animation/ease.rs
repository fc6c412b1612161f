/// Response curves used to reshape the magnitude of normalized pointer input.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Ease {
    /// Identity response.
    Linear,
    /// Quadratic ease-in/out (`2t²` below the midpoint, `-1 + (4 - 2t)t` above).
    #[default]
    InOutQuad,
    /// Quadratic ease-out.
    OutQuad,
    /// Cubic ease-in/out.
    InOutCubic,
}

impl Ease {
    /// Apply this curve to `t` in `[0, 1]`. Inputs outside the range are clamped.
    pub fn apply(self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Self::Linear => t,
            Self::InOutQuad => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    -1.0 + (4.0 - 2.0 * t) * t
                }
            }
            Self::OutQuad => 1.0 - (1.0 - t) * (1.0 - t),
            Self::InOutCubic => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    1.0 - ((-2.0 * t + 2.0).powi(3) / 2.0)
                }
            }
        }
    }

    /// Apply the curve to `|v|` and restore the sign of `v`.
    ///
    /// The result is odd: `signed(-v) == -signed(v)`, and `signed(0) == 0`.
    pub fn signed(self, v: f64) -> f64 {
        if v == 0.0 || v.is_nan() {
            return 0.0;
        }
        self.apply(v.abs()).copysign(v)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/ease.rs"]
mod tests;
