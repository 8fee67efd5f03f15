//! Flat-shaded software rasterizer
//!
//! Draws triangle "patches" into caller-owned 32-bit framebuffers:
//! - One colour and one depth per patch (no interpolation)
//! - Bounding-box coverage with a strictly-less depth test
//! - Back-face culling by NDC winding
//! - Shadow-map sampling against a depth buffer rendered from the light
//!
//! Everything here is single-threaded and allocation-free per draw call.

pub mod lanes;
mod math;
mod matrix;
mod framebuffer;
mod types;
mod shader;
mod render;
pub mod shadow;

pub use lanes::BACKEND as LANE_BACKEND;
pub use math::*;
pub use matrix::*;
pub use framebuffer::*;
pub use types::*;
pub use shader::*;
pub use render::*;

/// Largest framebuffer capacity accepted, in pixels (4K UHD-ish)
pub const MAX_FB_WIDTH: usize = 2560;
pub const MAX_FB_HEIGHT: usize = 2160;
