use crate::foundation::error::{DepthliftError, DepthliftResult};

/// Immutable, rectangular grid of normalized depth samples (`0` = far, `1` = near).
///
/// Stored row-major. A grid can only be built through [`DepthGrid::from_rows`], so every value
/// of this type is non-empty and rectangular.
#[derive(Clone, Debug, PartialEq)]
pub struct DepthGrid {
    width: usize,
    height: usize,
    samples: Vec<f32>,
}

impl DepthGrid {
    /// Validate provider rows and build a grid.
    ///
    /// Rejects zero rows, a zero-length first row, ragged rows, and non-finite samples.
    /// Finite samples outside `[0, 1]` are clamped.
    pub fn from_rows(rows: &[Vec<f32>]) -> DepthliftResult<Self> {
        let height = rows.len();
        if height == 0 {
            return Err(DepthliftError::malformed_depth("depth grid has no rows"));
        }
        let width = rows[0].len();
        if width == 0 {
            return Err(DepthliftError::malformed_depth("depth grid has no columns"));
        }

        let mut samples = Vec::with_capacity(width * height);
        for (y, row) in rows.iter().enumerate() {
            if row.len() != width {
                return Err(DepthliftError::malformed_depth(format!(
                    "depth grid is not rectangular: row {y} has {} samples, expected {width}",
                    row.len()
                )));
            }
            for (x, &d) in row.iter().enumerate() {
                if !d.is_finite() {
                    return Err(DepthliftError::malformed_depth(format!(
                        "non-finite depth sample at ({x}, {y})"
                    )));
                }
                samples.push(d.clamp(0.0, 1.0));
            }
        }

        Ok(Self {
            width,
            height,
            samples,
        })
    }

    /// Number of columns.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Number of rows.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Sample at explicit cell coordinates. Out-of-range coordinates clamp to the edge.
    pub fn at(&self, row: usize, col: usize) -> f32 {
        let row = row.min(self.height - 1);
        let col = col.min(self.width - 1);
        self.samples[row * self.width + col]
    }

    /// Nearest-neighbor sample at normalized coordinates in `[0, 1]`.
    ///
    /// Each axis maps to `floor(n * dimension)` clamped to `[0, dimension - 1]`, so `1.0`
    /// resolves to the last row/column.
    pub fn sample(&self, norm_row: f64, norm_col: f64) -> f32 {
        self.at(
            cell_index(norm_row, self.height),
            cell_index(norm_col, self.width),
        )
    }

    /// Smallest and largest sample in the grid.
    pub fn range(&self) -> (f32, f32) {
        self.samples
            .iter()
            .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), &d| {
                (lo.min(d), hi.max(d))
            })
    }
}

fn cell_index(norm: f64, dim: usize) -> usize {
    let max = dim.saturating_sub(1);
    if !norm.is_finite() || norm <= 0.0 {
        return 0;
    }
    let idx = (norm * dim as f64).floor();
    if idx >= max as f64 { max } else { idx as usize }
}

#[cfg(test)]
#[path = "../../tests/unit/depth/grid.rs"]
mod tests;
