use crate::{
    assets::{
        decode::PreparedImage,
        source::{ImageLoader, load_all},
    },
    foundation::{
        core::{Affine, Canvas, NormVec, Vec2},
        error::{DepthliftError, DepthliftResult},
    },
    provider::response::LayerPayload,
    session::config::SessionConfig,
};

/// Perspective distance used to project a layer's pseudo-Z offset, in pixels.
pub const LAYER_PERSPECTIVE_PX: f64 = 1000.0;

/// One decoded image layer of the flat strategy.
#[derive(Clone, Debug)]
pub struct Layer {
    /// Decoded layer pixels.
    pub image: PreparedImage,
    /// Depth in `[0, 1]` (`1` = nearest).
    pub depth: f64,
    /// Provider-assigned name.
    pub name: String,
    /// Provider display-order index.
    pub index: i64,
}

/// Per-frame visible state of one layer.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LayerPose {
    /// Planar offset in pixels.
    pub offset: Vec2,
    /// Pseudo-Z offset in pixels (positive is towards the viewer).
    pub depth_z: f64,
    /// Uniform scale.
    pub scale: f64,
    /// Opacity in `[0, 1]`.
    pub opacity: f64,
}

/// Container rotation applied once to the whole stack, in degrees.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ContainerTilt {
    /// Rotation about the horizontal axis.
    pub rotate_x_deg: f64,
    /// Rotation about the vertical axis.
    pub rotate_y_deg: f64,
}

/// Complete visible state of the flat strategy for one frame, back to front.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LayerFrame {
    /// One pose per layer, in the same order as [`LayerCompositor::layers`].
    pub poses: Vec<LayerPose>,
    /// Container tilt.
    pub tilt: ContainerTilt,
}

/// Pick `max_layers` indices evenly spread over `0..n`.
///
/// When `n <= max_layers` every index is kept. Otherwise index `i` maps to
/// `round(i * (n - 1) / (max_layers - 1))`, which always keeps the first and last entries.
/// With `max_layers == 1` only the backmost entry is kept.
pub fn pick_layer_indices(n: usize, max_layers: usize) -> Vec<usize> {
    if n <= max_layers {
        return (0..n).collect();
    }
    if max_layers <= 1 {
        return vec![0];
    }
    let step = (n - 1) as f64 / (max_layers - 1) as f64;
    (0..max_layers)
        .map(|i| ((i as f64 * step).round() as usize).min(n - 1))
        .collect()
}

/// Pose of a layer at depth `d` for the smoothed input vector.
pub fn layer_pose(depth: f64, input: NormVec, config: &SessionConfig) -> LayerPose {
    let d = depth.clamp(0.0, 1.0);
    LayerPose {
        offset: input.to_vec2() * (config.parallax_strength * d),
        depth_z: (d - 0.5) * config.depth_scale(),
        scale: 1.01 + d * 0.01,
        opacity: 0.95 + d * 0.05,
    }
}

/// Container tilt for the smoothed input vector.
pub fn container_tilt(input: NormVec, config: &SessionConfig) -> ContainerTilt {
    ContainerTilt {
        rotate_x_deg: -input.y * config.rotation_amount,
        rotate_y_deg: input.x * config.rotation_amount,
    }
}

/// Map image pixels into the container for one posed layer.
///
/// The image is cover-fitted and centered, posed about the container center (planar offset,
/// scale, and the projected pseudo-Z), then foreshortened by the container tilt.
pub fn layer_paint_transform(
    container: Canvas,
    image_size: (u32, u32),
    pose: &LayerPose,
    tilt: ContainerTilt,
) -> Affine {
    let (iw, ih) = (f64::from(image_size.0.max(1)), f64::from(image_size.1.max(1)));
    let center = container.center().to_vec2();
    let cover = (f64::from(container.width) / iw).max(f64::from(container.height) / ih);

    let denom = (LAYER_PERSPECTIVE_PX - pose.depth_z).max(1.0);
    let perspective = LAYER_PERSPECTIVE_PX / denom;

    let foreshorten = Affine::scale_non_uniform(
        tilt.rotate_y_deg.to_radians().cos(),
        tilt.rotate_x_deg.to_radians().cos(),
    );

    Affine::translate(center)
        * foreshorten
        * Affine::translate(pose.offset)
        * Affine::scale(pose.scale * perspective * cover)
        * Affine::translate(Vec2::new(-iw / 2.0, -ih / 2.0))
}

/// Flat-parallax strategy: a small back-to-front stack of decoded image layers.
#[derive(Clone, Debug)]
pub struct LayerCompositor {
    layers: Vec<Layer>,
}

impl LayerCompositor {
    /// Sort, downsample, and decode provider layers.
    ///
    /// Every picked image is fully decoded before this returns; a single failure aborts the build.
    #[tracing::instrument(skip(payloads, loader), fields(n = payloads.len()))]
    pub fn build(
        payloads: &[LayerPayload],
        max_layers: usize,
        loader: &dyn ImageLoader,
    ) -> DepthliftResult<Self> {
        if payloads.is_empty() {
            return Err(DepthliftError::missing_layers("provider returned no layers"));
        }

        let mut sorted: Vec<&LayerPayload> = payloads.iter().collect();
        sorted.sort_by_key(|p| p.index);

        let picked: Vec<&LayerPayload> = pick_layer_indices(sorted.len(), max_layers.max(1))
            .into_iter()
            .map(|i| sorted[i])
            .collect();
        tracing::debug!(
            picked = ?picked.iter().map(|p| p.index).collect::<Vec<_>>(),
            "picked layers"
        );

        let refs: Vec<&str> = picked.iter().map(|p| p.data.as_str()).collect();
        let images = load_all(loader, &refs)?;

        let layers = picked
            .into_iter()
            .zip(images)
            .map(|(p, image)| Layer {
                image,
                depth: p.depth.clamp(0.0, 1.0),
                name: p.name.clone(),
                index: p.index,
            })
            .collect();
        Ok(Self { layers })
    }

    /// Wrap already-decoded layers, sorted back to front.
    pub fn from_layers(mut layers: Vec<Layer>) -> DepthliftResult<Self> {
        if layers.is_empty() {
            return Err(DepthliftError::missing_layers("layer list is empty"));
        }
        layers.sort_by_key(|l| l.index);
        Ok(Self { layers })
    }

    /// Layers back to front.
    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    /// Compute this frame's poses and tilt from the smoothed input vector.
    pub fn update(&self, input: NormVec, config: &SessionConfig) -> LayerFrame {
        LayerFrame {
            poses: self
                .layers
                .iter()
                .map(|l| layer_pose(l.depth, input, config))
                .collect(),
            tilt: container_tilt(input, config),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/layers/compositor.rs"]
mod tests;
