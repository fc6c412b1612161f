use std::sync::Arc;

use glam::{Mat3, Vec3};

use crate::{
    assets::decode::PreparedImage,
    foundation::{
        core::{Affine, Canvas},
        error::{DepthliftError, DepthliftResult},
    },
    layers::compositor::{Layer, LayerFrame, layer_paint_transform},
    mesh::{
        camera::{Projected, project},
        compositor::MeshFrame,
        surface::Surface,
    },
    render::backend::{FrameRGBA, Presenter, RenderSettings},
};

/// Ambient light intensity applied to every mesh face.
pub const AMBIENT_LIGHT: f32 = 0.8;
/// Directional light intensity along +Z (towards the viewer).
pub const DIRECTIONAL_LIGHT: f32 = 0.4;

/// Headless presenter rendering both strategies with `vello_cpu`.
pub struct CpuBackend {
    settings: RenderSettings,
    viewport: Option<Canvas>,
    layer_paints: Vec<vello_cpu::Image>,
    mesh_paint: Option<vello_cpu::Image>,
    ctx: Option<vello_cpu::RenderContext>,
    frame: Option<FrameRGBA>,
}

impl CpuBackend {
    /// A presenter with nothing attached.
    pub fn new(settings: RenderSettings) -> Self {
        Self {
            settings,
            viewport: None,
            layer_paints: Vec::new(),
            mesh_paint: None,
            ctx: None,
            frame: None,
        }
    }

    /// Take ownership of the most recent frame.
    pub fn take_frame(&mut self) -> Option<FrameRGBA> {
        self.frame.take()
    }

    fn draw(&mut self, size: Canvas, f: impl FnOnce(&mut vello_cpu::RenderContext)) {
        let Ok((width, height)) = canvas_u16(size) else {
            tracing::warn!(
                width = size.width,
                height = size.height,
                "frame skipped: size exceeds u16"
            );
            return;
        };
        let mut ctx = match self.ctx.take() {
            Some(ctx) if ctx.width() == width && ctx.height() == height => ctx,
            _ => vello_cpu::RenderContext::new(width, height),
        };
        ctx.reset();

        if let Some([r, g, b, a]) = self.settings.clear_rgba {
            ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
            ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(r, g, b, a));
            ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
                0.0,
                0.0,
                f64::from(width),
                f64::from(height),
            ));
        }

        f(&mut ctx);

        ctx.flush();
        let mut pixmap = vello_cpu::Pixmap::new(width, height);
        ctx.render_to_pixmap(&mut pixmap);
        self.ctx = Some(ctx);

        let data = pixmap.data_as_u8_slice().to_vec();
        match &mut self.frame {
            Some(frame) if frame.width == size.width && frame.height == size.height => {
                frame.data = data;
            }
            _ => {
                self.frame = Some(FrameRGBA {
                    width: size.width,
                    height: size.height,
                    data,
                    premultiplied: true,
                });
            }
        }
    }
}

impl Presenter for CpuBackend {
    fn supports_mesh(&self) -> bool {
        true
    }

    fn attach_layers(&mut self, viewport: Canvas, layers: &[Layer]) -> DepthliftResult<()> {
        canvas_u16(viewport)?;
        self.release();
        self.layer_paints = layers
            .iter()
            .map(|l| image_paint(&l.image))
            .collect::<DepthliftResult<_>>()?;
        self.viewport = Some(viewport);
        tracing::debug!(layers = layers.len(), "cpu presenter attached layers");
        Ok(())
    }

    fn attach_mesh(&mut self, render_size: Canvas, surface: &Surface) -> DepthliftResult<()> {
        canvas_u16(render_size)?;
        self.release();
        self.mesh_paint = Some(image_paint(surface.texture())?);
        self.viewport = Some(render_size);
        tracing::debug!(
            triangles = surface.triangles().len(),
            "cpu presenter attached mesh"
        );
        Ok(())
    }

    fn resize(&mut self, viewport: Canvas) -> DepthliftResult<()> {
        canvas_u16(viewport)?;
        if self.viewport.is_some() {
            self.viewport = Some(viewport);
        }
        Ok(())
    }

    fn present_layers(&mut self, layers: &[Layer], frame: &LayerFrame) {
        let Some(viewport) = self.viewport else {
            return;
        };
        let paints = std::mem::take(&mut self.layer_paints);
        self.draw(viewport, |ctx| {
            for ((layer, paint), pose) in layers.iter().zip(&paints).zip(&frame.poses) {
                let (w, h) = (layer.image.width, layer.image.height);
                let transform = layer_paint_transform(viewport, (w, h), pose, frame.tilt);
                ctx.set_transform(affine_to_cpu(transform));
                ctx.set_paint(paint.clone());
                let opacity = pose.opacity.clamp(0.0, 1.0) as f32;
                if opacity < 1.0 {
                    ctx.push_opacity_layer(opacity);
                }
                ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
                    0.0,
                    0.0,
                    f64::from(w),
                    f64::from(h),
                ));
                if opacity < 1.0 {
                    ctx.pop_layer();
                }
            }
        });
        self.layer_paints = paints;
    }

    fn present_mesh(&mut self, surface: &Surface, frame: &MeshFrame) {
        let Some(paint) = self.mesh_paint.clone() else {
            return;
        };
        let lit = !self.settings.unlit_mesh;
        let faces = painter_sorted_faces(surface, frame);
        self.draw(frame.render_size, |ctx| {
            for face in &faces {
                let Some(transform) = texture_to_screen(face.uv, face.screen) else {
                    continue;
                };
                let mut path = vello_cpu::kurbo::BezPath::new();
                path.move_to(uv_point(face.uv[0]));
                path.line_to(uv_point(face.uv[1]));
                path.line_to(uv_point(face.uv[2]));
                path.close_path();

                ctx.set_transform(affine_to_cpu(transform));
                ctx.set_paint(paint.clone());
                ctx.fill_path(&path);

                if lit && face.shade < 1.0 {
                    let alpha = ((1.0 - face.shade) * 255.0).round() as u8;
                    ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(0, 0, 0, alpha));
                    ctx.fill_path(&path);
                }
            }
        });
    }

    fn last_frame(&self) -> Option<&FrameRGBA> {
        self.frame.as_ref()
    }

    fn release(&mut self) {
        self.layer_paints.clear();
        self.mesh_paint = None;
        self.viewport = None;
    }
}

/// One projected mesh triangle ready to paint.
#[derive(Clone, Copy, Debug)]
struct Face {
    screen: [(f64, f64); 3],
    uv: [[f32; 2]; 3],
    depth: f32,
    shade: f32,
}

/// Project every triangle and order them far to near.
///
/// Triangles with a vertex behind the camera are dropped.
fn painter_sorted_faces(surface: &Surface, frame: &MeshFrame) -> Vec<Face> {
    let positions = surface.positions();
    let normals = surface.normals();
    let tex = surface.tex_coords();
    let normal_matrix = Mat3::from_mat4(frame.model).inverse().transpose();

    let projected: Vec<Option<Projected>> = positions
        .iter()
        .map(|&p| {
            project(
                frame.view_proj,
                frame.model.transform_point3(p),
                frame.render_size,
            )
        })
        .collect();

    let mut faces: Vec<Face> = surface
        .triangles()
        .iter()
        .filter_map(|&[a, b, c]| {
            let (a, b, c) = (a as usize, b as usize, c as usize);
            let pa = projected[a]?;
            let pb = projected[b]?;
            let pc = projected[c]?;
            let n = normal_matrix * (normals[a] + normals[b] + normals[c]);
            Some(Face {
                screen: [(pa.x, pa.y), (pb.x, pb.y), (pc.x, pc.y)],
                uv: [tex[a], tex[b], tex[c]],
                depth: (pa.depth + pb.depth + pc.depth) / 3.0,
                shade: face_shade(n),
            })
        })
        .collect();
    faces.sort_by(|x, y| y.depth.total_cmp(&x.depth));
    faces
}

/// Ambient plus +Z directional light for a world-space normal, capped at 1.
pub fn face_shade(normal: Vec3) -> f32 {
    let n = normal.normalize_or_zero();
    (AMBIENT_LIGHT + DIRECTIONAL_LIGHT * n.z.max(0.0)).min(1.0)
}

/// Affine map taking texture-space triangle `uv` onto screen-space triangle `screen`.
///
/// Returns `None` when either triangle is degenerate.
pub fn texture_to_screen(uv: [[f32; 2]; 3], screen: [(f64, f64); 3]) -> Option<Affine> {
    let [u0, v0] = uv[0].map(f64::from);
    let [u1, v1] = uv[1].map(f64::from);
    let [u2, v2] = uv[2].map(f64::from);
    let (du1, dv1, du2, dv2) = (u1 - u0, v1 - v0, u2 - u0, v2 - v0);
    let det = du1 * dv2 - du2 * dv1;
    if det.abs() < 1e-12 {
        return None;
    }

    let (x0, y0) = screen[0];
    let (dx1, dy1) = (screen[1].0 - x0, screen[1].1 - y0);
    let (dx2, dy2) = (screen[2].0 - x0, screen[2].1 - y0);
    if (dx1 * dy2 - dx2 * dy1).abs() < 1e-9 {
        return None;
    }

    let a = (dx1 * dv2 - dx2 * dv1) / det;
    let b = (dy1 * dv2 - dy2 * dv1) / det;
    let c = (dx2 * du1 - dx1 * du2) / det;
    let d = (dy2 * du1 - dy1 * du2) / det;
    let e = x0 - a * u0 - c * v0;
    let f = y0 - b * u0 - d * v0;
    Some(Affine::new([a, b, c, d, e, f]))
}

fn uv_point(uv: [f32; 2]) -> vello_cpu::kurbo::Point {
    vello_cpu::kurbo::Point::new(f64::from(uv[0]), f64::from(uv[1]))
}

fn affine_to_cpu(a: Affine) -> vello_cpu::kurbo::Affine {
    vello_cpu::kurbo::Affine::new(a.as_coeffs())
}

fn canvas_u16(size: Canvas) -> DepthliftResult<(u16, u16)> {
    let w: u16 = size
        .width
        .try_into()
        .map_err(|_| DepthliftError::validation("surface width exceeds u16"))?;
    let h: u16 = size
        .height
        .try_into()
        .map_err(|_| DepthliftError::validation("surface height exceeds u16"))?;
    Ok((w, h))
}

fn image_paint(image: &PreparedImage) -> DepthliftResult<vello_cpu::Image> {
    let pixmap = pixmap_from_premul_bytes(&image.rgba8_premul, image.width, image.height)?;
    Ok(vello_cpu::Image {
        image: vello_cpu::ImageSource::Pixmap(Arc::new(pixmap)),
        sampler: vello_cpu::peniko::ImageSampler::default(),
    })
}

fn pixmap_from_premul_bytes(
    rgba8_premul: &[u8],
    width: u32,
    height: u32,
) -> DepthliftResult<vello_cpu::Pixmap> {
    let (w, h) = canvas_u16(Canvas { width, height })?;
    if rgba8_premul.len() != width as usize * height as usize * 4 {
        return Err(DepthliftError::validation(
            "prepared image byte length mismatch",
        ));
    }

    let mut may_have_opacities = false;
    let pixels: Vec<_> = rgba8_premul
        .chunks_exact(4)
        .map(|px| {
            may_have_opacities |= px[3] != 255;
            vello_cpu::peniko::color::PremulRgba8 {
                r: px[0],
                g: px[1],
                b: px[2],
                a: px[3],
            }
        })
        .collect();

    Ok(vello_cpu::Pixmap::from_parts_with_opacity(
        pixels,
        w,
        h,
        may_have_opacities,
    ))
}

#[cfg(test)]
#[path = "../../tests/unit/render/cpu.rs"]
mod tests;
