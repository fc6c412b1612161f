use glam::Vec3;

use crate::{
    assets::decode::PreparedImage,
    depth::grid::DepthGrid,
    foundation::error::{DepthliftError, DepthliftResult},
};

/// Largest accepted grid resolution (cells per side).
pub const MAX_SEGMENTS: u32 = 1024;

/// Displaced plane built once per upload.
///
/// Vertices are laid out row-major, `(segments + 1)²` of them: row `i` runs from the top edge
/// (`+Y`) down, column `j` from the left edge (`-X`) right. Z holds `depth * depth_scale` and is
/// never rewritten after the build.
#[derive(Clone, Debug)]
pub struct Surface {
    segments: u32,
    size: (f32, f32),
    positions: Vec<Vec3>,
    normals: Vec<Vec3>,
    tex_coords: Vec<[f32; 2]>,
    triangles: Vec<[u32; 3]>,
    texture: PreparedImage,
}

impl Surface {
    /// Build the displaced grid for a `width × height` image plane.
    #[tracing::instrument(
        skip(grid, texture),
        fields(grid_w = grid.width(), grid_h = grid.height())
    )]
    pub fn build(
        grid: &DepthGrid,
        width: u32,
        height: u32,
        segments: u32,
        depth_scale: f64,
        texture: PreparedImage,
    ) -> DepthliftResult<Self> {
        if width == 0 || height == 0 {
            return Err(DepthliftError::validation(
                "mesh plane width and height must be > 0",
            ));
        }
        if segments == 0 || segments > MAX_SEGMENTS {
            return Err(DepthliftError::validation(format!(
                "mesh segments must be in 1..={MAX_SEGMENTS}"
            )));
        }

        let (w, h) = (width as f32, height as f32);
        let seg = segments as usize;
        let side = seg + 1;
        let (tex_w, tex_h) = (texture.width as f32, texture.height as f32);

        let mut positions = Vec::with_capacity(side * side);
        let mut tex_coords = Vec::with_capacity(side * side);
        for i in 0..side {
            let v = i as f32 / seg as f32;
            for j in 0..side {
                let u = j as f32 / seg as f32;
                let depth = grid.sample(f64::from(v), f64::from(u));
                positions.push(Vec3::new(
                    -w / 2.0 + u * w,
                    h / 2.0 - v * h,
                    (f64::from(depth) * depth_scale) as f32,
                ));
                tex_coords.push([u * tex_w, v * tex_h]);
            }
        }

        let mut triangles = Vec::with_capacity(seg * seg * 2);
        for iy in 0..seg {
            for ix in 0..seg {
                let a = (ix + side * iy) as u32;
                let b = (ix + side * (iy + 1)) as u32;
                let c = (ix + 1 + side * (iy + 1)) as u32;
                let d = (ix + 1 + side * iy) as u32;
                triangles.push([a, b, d]);
                triangles.push([b, c, d]);
            }
        }

        let normals = vertex_normals(&positions, &triangles);
        tracing::debug!(
            vertices = positions.len(),
            triangles = triangles.len(),
            "built mesh surface"
        );

        Ok(Self {
            segments,
            size: (w, h),
            positions,
            normals,
            tex_coords,
            triangles,
            texture,
        })
    }

    /// Grid cells per side.
    pub fn segments(&self) -> u32 {
        self.segments
    }

    /// Plane width and height in image pixels.
    pub fn size(&self) -> (f32, f32) {
        self.size
    }

    /// Vertex positions, row-major.
    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    /// Unit vertex normals, recomputed after displacement.
    pub fn normals(&self) -> &[Vec3] {
        &self.normals
    }

    /// Texture coordinates in texture pixels.
    pub fn tex_coords(&self) -> &[[f32; 2]] {
        &self.tex_coords
    }

    /// Counter-clockwise (seen from `+Z`) triangles.
    pub fn triangles(&self) -> &[[u32; 3]] {
        &self.triangles
    }

    /// Texture image.
    pub fn texture(&self) -> &PreparedImage {
        &self.texture
    }

    /// Number of vertices, always `(segments + 1)²`.
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }
}

/// Area-weighted vertex normals. Vertices without any non-degenerate face get `+Z`.
pub fn vertex_normals(positions: &[Vec3], triangles: &[[u32; 3]]) -> Vec<Vec3> {
    let mut acc = vec![Vec3::ZERO; positions.len()];
    for tri in triangles {
        let [a, b, c] = tri.map(|i| i as usize);
        let face = (positions[b] - positions[a]).cross(positions[c] - positions[a]);
        acc[a] += face;
        acc[b] += face;
        acc[c] += face;
    }
    acc.into_iter()
        .map(|n| {
            let n = n.normalize_or_zero();
            if n == Vec3::ZERO { Vec3::Z } else { n }
        })
        .collect()
}

#[cfg(test)]
#[path = "../../tests/unit/mesh/surface.rs"]
mod tests;
