//! Core rendering functions
//! Patch rasterization: transform, cull, reject, bounding-box fill with a flat depth test
//!
//! Coverage is the patch's screen-space bounding box, not its exact triangle: every
//! pixel inside the box gets the patch's single colour and single depth. The fill is
//! kept in `fill_bounds` so an edge-accurate routine could replace it.

use log::trace;
use super::framebuffer::Framebuffer;
use super::math::Vec4;
use super::shader::{PatchShader, VertexShader};
use super::types::{pack_color, quantize_depth, Patch, WindingOrder};

/// Everything one draw call needs. Built fresh per call.
///
/// A missing colour or depth target means "skip that output"; with neither, the
/// call does nothing.
pub struct DrawConfig<'a> {
    pub front_winding: WindingOrder,
    pub enable_back_cull: bool,
    pub vertex_shader: &'a dyn VertexShader,
    /// Falls back to the patch's own colour when absent
    pub patch_shader: Option<&'a dyn PatchShader>,
    pub color_buffer: Option<&'a mut Framebuffer>,
    pub depth_buffer: Option<&'a mut Framebuffer>,
}

impl<'a> DrawConfig<'a> {
    /// Counter-clockwise front faces, back-face culling on, no targets
    pub fn new(vertex_shader: &'a dyn VertexShader) -> Self {
        Self {
            front_winding: WindingOrder::default(),
            enable_back_cull: true,
            vertex_shader,
            patch_shader: None,
            color_buffer: None,
            depth_buffer: None,
        }
    }

    pub fn with_patch_shader(mut self, shader: &'a dyn PatchShader) -> Self {
        self.patch_shader = Some(shader);
        self
    }

    pub fn with_color(mut self, buffer: &'a mut Framebuffer) -> Self {
        self.color_buffer = Some(buffer);
        self
    }

    pub fn with_depth(mut self, buffer: &'a mut Framebuffer) -> Self {
        self.depth_buffer = Some(buffer);
        self
    }

    pub fn with_front_winding(mut self, winding: WindingOrder) -> Self {
        self.front_winding = winding;
        self
    }

    pub fn with_back_cull(mut self, enabled: bool) -> Self {
        self.enable_back_cull = enabled;
        self
    }

    fn has_target(&self) -> bool {
        self.color_buffer.is_some() || self.depth_buffer.is_some()
    }

    /// Raster dimensions: the colour target's, else the depth target's
    fn target_size(&self) -> (usize, usize) {
        if let Some(color) = self.color_buffer.as_deref() {
            if let Some(depth) = self.depth_buffer.as_deref() {
                debug_assert!(
                    color.width() == depth.width() && color.height() == depth.height(),
                    "colour and depth targets differ in size"
                );
            }
            (color.width(), color.height())
        } else if let Some(depth) = self.depth_buffer.as_deref() {
            (depth.width(), depth.height())
        } else {
            (0, 0)
        }
    }
}

/// What happened to a single patch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatchOutcome {
    /// No colour or depth target configured
    Skipped,
    /// Facing away with back-face culling on
    Culled,
    /// Bounding box entirely outside the NDC volume
    Rejected,
    /// Reached the fill stage
    Drawn,
}

/// Per-call counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DrawStats {
    pub submitted: usize,
    pub culled: usize,
    pub rejected: usize,
    pub drawn: usize,
}

impl DrawStats {
    fn record(&mut self, outcome: PatchOutcome) {
        self.submitted += 1;
        match outcome {
            PatchOutcome::Culled => self.culled += 1,
            PatchOutcome::Rejected => self.rejected += 1,
            PatchOutcome::Drawn => self.drawn += 1,
            PatchOutcome::Skipped => {}
        }
    }
}

/// Winding of three NDC points from the sign of
/// `| x0 y0 1 | x1 y1 1 | x2 y2 1 |`; negative is clockwise.
pub fn winding_order(v0: Vec4, v1: Vec4, v2: Vec4) -> WindingOrder {
    let det = v0.x * v1.y + v0.y * v2.x + v1.x * v2.y - v1.y * v2.x - v0.y * v1.x - v0.x * v2.y;
    if det < 0.0 {
        WindingOrder::Clockwise
    } else {
        WindingOrder::CounterClockwise
    }
}

/// Half-open pixel rectangle `[min_x, max_x) x [min_y, max_y)`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScreenBounds {
    pub min_x: usize,
    pub min_y: usize,
    pub max_x: usize,
    pub max_y: usize,
}

impl ScreenBounds {
    /// Map an NDC box to pixels: `(ndc * 0.5 + 0.5) * dim`, floor the minimum,
    /// ceil the maximum, clamp to `[0, dim]`
    pub fn from_ndc(lo: Vec4, hi: Vec4, width: usize, height: usize) -> Self {
        let (w, h) = (width as f32, height as f32);
        let to_px = |ndc: f32, dim: f32| (ndc * 0.5 + 0.5) * dim;

        Self {
            min_x: to_px(lo.x, w).floor().max(0.0) as usize,
            min_y: to_px(lo.y, h).floor().max(0.0) as usize,
            max_x: to_px(hi.x, w).ceil().min(w) as usize,
            max_y: to_px(hi.y, h).ceil().min(h) as usize,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.min_x >= self.max_x || self.min_y >= self.max_y
    }
}

/// Transform, cull, reject and fill one patch
pub fn draw_patch(patch: &Patch, cfg: &mut DrawConfig) -> PatchOutcome {
    if !cfg.has_target() {
        return PatchOutcome::Skipped;
    }

    let v0 = cfg.vertex_shader.transform(patch.pos[0]);
    let v1 = cfg.vertex_shader.transform(patch.pos[1]);
    let v2 = cfg.vertex_shader.transform(patch.pos[2]);

    if cfg.enable_back_cull && winding_order(v0, v1, v2) != cfg.front_winding {
        return PatchOutcome::Culled;
    }

    // Coarse reject only: anything whose box touches the NDC volume is filled in full
    let lo = v0.min(v1).min(v2);
    let hi = v0.max(v1).max(v2);
    if hi.x <= -1.0 || lo.x >= 1.0 || hi.y <= -1.0 || lo.y >= 1.0 || lo.z <= 0.0 || hi.z >= 1.0 {
        return PatchOutcome::Rejected;
    }

    let (width, height) = cfg.target_size();
    let bounds = ScreenBounds::from_ndc(lo, hi, width, height);

    let avg = (v0 + v1 + v2) / 3.0;
    let depth = quantize_depth(avg.z);

    let color = if cfg.color_buffer.is_some() {
        let rgba = match cfg.patch_shader {
            Some(shader) => shader.shade(patch, avg),
            None => patch.color.extend(1.0),
        };
        pack_color(rgba.max(Vec4::splat(0.0)).min(Vec4::splat(1.0)))
    } else {
        0
    };

    fill_bounds(
        cfg.color_buffer.as_deref_mut(),
        cfg.depth_buffer.as_deref_mut(),
        &bounds,
        color,
        depth,
    );

    PatchOutcome::Drawn
}

/// Draw a patch list in order. Later patches see the depth writes of earlier ones;
/// equal depths keep what was drawn first.
pub fn draw_patches(patches: &[Patch], cfg: &mut DrawConfig) -> DrawStats {
    let mut stats = DrawStats::default();
    if !cfg.has_target() {
        return stats;
    }

    for patch in patches {
        stats.record(draw_patch(patch, cfg));
    }

    trace!(
        "draw_patches: {} submitted, {} culled, {} rejected, {} drawn",
        stats.submitted, stats.culled, stats.rejected, stats.drawn
    );
    stats
}

/// Flat fill of the bounding box with one colour and one depth
fn fill_bounds(
    color_dst: Option<&mut Framebuffer>,
    depth_dst: Option<&mut Framebuffer>,
    bounds: &ScreenBounds,
    color: u32,
    depth: u32,
) {
    if bounds.is_empty() {
        return;
    }
    let (x0, x1) = (bounds.min_x, bounds.max_x);

    match (color_dst, depth_dst) {
        (Some(color_dst), Some(depth_dst)) => {
            for y in bounds.min_y..bounds.max_y {
                let colors = color_dst.span_mut(y, x0, x1);
                let depths = depth_dst.span_mut(y, x0, x1);
                for (c, d) in colors.iter_mut().zip(depths.iter_mut()) {
                    if depth < *d {
                        *d = depth;
                        *c = color;
                    }
                }
            }
        }
        (None, Some(depth_dst)) => {
            for y in bounds.min_y..bounds.max_y {
                for d in depth_dst.span_mut(y, x0, x1) {
                    if depth < *d {
                        *d = depth;
                    }
                }
            }
        }
        (Some(color_dst), None) => {
            for y in bounds.min_y..bounds.max_y {
                color_dst.span_mut(y, x0, x1).fill(color);
            }
        }
        (None, None) => {}
    }
}
