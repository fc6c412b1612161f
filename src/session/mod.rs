pub(crate) mod build;
pub(crate) mod config;
pub(crate) mod controller;
pub(crate) mod frame_loop;
