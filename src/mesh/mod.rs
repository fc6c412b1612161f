pub(crate) mod camera;
pub(crate) mod compositor;
pub(crate) mod surface;
