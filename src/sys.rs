//! Geometry and the boundary to the host window manager.

pub mod geometry;
pub mod headless;
pub mod window;
