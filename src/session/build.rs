use crate::{
    assets::source::ImageLoader,
    depth::grid::DepthGrid,
    foundation::{
        core::Canvas,
        error::{DepthliftError, DepthliftResult},
    },
    layers::compositor::LayerCompositor,
    mesh::compositor::MeshCompositor,
    provider::response::ProviderResponse,
    session::config::SessionConfig,
};

/// Which rendering strategy a session runs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    /// Displaced, textured mesh.
    Mesh,
    /// Flat parallax layer stack.
    Layers,
}

/// A fully built strategy, ready to be attached to a presenter.
#[derive(Clone, Debug)]
pub enum PreparedStrategy {
    /// Mesh strategy with its surface built.
    Mesh(MeshCompositor),
    /// Layer strategy with every picked layer decoded.
    Layers(LayerCompositor),
}

impl PreparedStrategy {
    /// Strategy tag.
    pub fn kind(&self) -> StrategyKind {
        match self {
            Self::Mesh(_) => StrategyKind::Mesh,
            Self::Layers(_) => StrategyKind::Layers,
        }
    }
}

/// Choose and build a strategy from one provider response.
///
/// The mesh is used iff the provider asks for it, `config.prefer_mesh` is on, the presenter is
/// `mesh_capable`, and the response carries a well-formed depth grid plus a texture reference.
/// Malformed mesh data falls back to the layer list when one exists; otherwise the mesh error is
/// returned. Without mesh data and without layers the build fails with
/// [`DepthliftError::MissingLayerData`].
#[tracing::instrument(
    skip(response, loader, config),
    fields(use_mesh = response.use_mesh, layers = response.layers.len())
)]
pub fn prepare_strategy(
    response: &ProviderResponse,
    loader: &dyn ImageLoader,
    config: &SessionConfig,
    mesh_capable: bool,
    container: Canvas,
) -> DepthliftResult<PreparedStrategy> {
    if !response.success {
        return Err(DepthliftError::provider(
            response
                .error
                .clone()
                .unwrap_or_else(|| "provider reported failure without a message".to_string()),
        ));
    }

    let wants_mesh = response.use_mesh && config.prefer_mesh && mesh_capable;
    if wants_mesh {
        match mesh_inputs(response) {
            Ok((grid, image)) => {
                let texture = loader.load(image)?;
                let mut mesh = MeshCompositor::new(config.mesh.clone());
                mesh.init(texture, &grid, response.width, response.height, container)?;
                mesh.set_depth_intensity(config.depth_intensity);
                return Ok(PreparedStrategy::Mesh(mesh));
            }
            Err(err) if !response.layers.is_empty() => {
                tracing::warn!(error = %err, "mesh data unusable, falling back to layers");
            }
            Err(err) => return Err(err),
        }
    } else if response.use_mesh {
        tracing::debug!(
            prefer_mesh = config.prefer_mesh,
            mesh_capable,
            "mesh requested but not available here"
        );
    }

    if response.layers.is_empty() {
        return Err(DepthliftError::missing_layers(
            "response has neither usable mesh data nor layers",
        ));
    }
    if let Some(rows) = response.depth_data.as_deref()
        && let Err(err) = DepthGrid::from_rows(rows)
    {
        tracing::warn!(error = %err, "ignoring malformed depth grid in layer response");
    }
    let layers = LayerCompositor::build(&response.layers, config.max_layers, loader)?;
    Ok(PreparedStrategy::Layers(layers))
}

fn mesh_inputs(response: &ProviderResponse) -> DepthliftResult<(DepthGrid, &str)> {
    let rows = response
        .depth_data
        .as_deref()
        .ok_or_else(|| DepthliftError::malformed_depth("response carries no depth_data"))?;
    let grid = DepthGrid::from_rows(rows)?;
    let image = response
        .image
        .as_deref()
        .ok_or_else(|| DepthliftError::malformed_depth("depth data has no image to displace"))?;
    Ok((grid, image))
}

#[cfg(test)]
#[path = "../../tests/unit/session/build.rs"]
mod tests;
