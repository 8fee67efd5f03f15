//! patch-raster: flat-shaded software rasterizer
//!
//! Triangles ("patches") are drawn one colour and one depth at a time into plain
//! 32-bit framebuffers, with back-face culling, a depth test and shadow mapping from
//! a single directional light.
//!
//! - `rasterizer`: math, framebuffers and the patch rasterizer core
//! - `mesh`: PLY import and procedural shapes
//! - `shading`: the camera/light transforms and lighting shaders
//! - `scene` / `frame`: RON scene files and the per-frame shadow + colour passes
//! - `capture`: PNG export

/// Version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod rasterizer;
pub mod mesh;
pub mod shading;
pub mod scene;
pub mod frame;
pub mod capture;
