//! depthlift renders a depth-driven "parallax photo" from one image plus a depth map.
//!
//! A depth provider returns either a depth grid (for a displaced 3D mesh) or a small set of depth
//! layers (for a flat parallax stack). The crate turns pointer, touch, orientation, wheel, and
//! keyboard input into a smoothed input vector and drives the chosen strategy once per frame:
//!
//! - Build a session from a [`ProviderResponse`] with a [`RenderSessionController`]
//! - Queue [`InputEvent`]s and call [`RenderSessionController::tick`] once per display refresh
//! - Present through any [`Presenter`]; [`CpuBackend`] renders headless RGBA frames
//! - Stream frames into a [`FrameSink`]
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod animation;
mod assets;
mod depth;
mod encode;
mod foundation;
mod input;
mod layers;
mod mesh;
mod provider;
mod render;
mod session;

pub use crate::foundation::core::{Affine, Canvas, NormVec, Point, Rect, Vec2};
pub use crate::foundation::error::{DepthliftError, DepthliftResult};

pub use crate::animation::ease::Ease;
pub use crate::animation::smooth::{SNAP_EPSILON, Smoothed2, smooth_axis, smooth_step};
pub use crate::assets::decode::{PreparedImage, decode_image};
pub use crate::assets::source::{AssetResolver, ImageLoader, load_all, normalize_rel_path};
pub use crate::depth::grid::DepthGrid;
pub use crate::encode::sink::{FrameSink, InMemorySink, PngSequenceSink, SinkConfig, write_png};
pub use crate::input::tracker::{
    InputAction, InputEvent, InputState, InputTracker, KeyCommand, orientation_vector,
};
pub use crate::layers::compositor::{
    ContainerTilt, LAYER_PERSPECTIVE_PX, Layer, LayerCompositor, LayerFrame, LayerPose,
    container_tilt, layer_paint_transform, layer_pose, pick_layer_indices,
};
pub use crate::mesh::camera::{CameraFit, Projected, fit_render_size, project};
pub use crate::mesh::compositor::{MeshCompositor, MeshFrame};
pub use crate::mesh::surface::{MAX_SEGMENTS, Surface, vertex_normals};
pub use crate::provider::response::{LayerPayload, ProviderResponse};
pub use crate::provider::source::{DepthProvider, RecordedProvider, Upload};
pub use crate::render::backend::{
    BackendKind, FrameRGBA, Presenter, RenderSettings, create_backend,
};
pub use crate::render::cpu::{
    AMBIENT_LIGHT, CpuBackend, DIRECTIONAL_LIGHT, face_shade, texture_to_screen,
};
pub use crate::session::build::{PreparedStrategy, StrategyKind, prepare_strategy};
pub use crate::session::config::{
    MAX_PARALLAX_STRENGTH, MeshTuning, STRENGTH_STEP, SessionConfig,
};
pub use crate::session::controller::{
    BuildOutcome, BuildTicket, RenderSessionController, SessionState, TickOutcome,
};
pub use crate::session::frame_loop::FrameLoop;
