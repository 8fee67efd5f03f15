//! Per-frame orchestration
//!
//! Owns the colour, depth and shadow buffers and runs one frame as:
//! clear -> camera/light matrices -> shadow pass -> colour pass, entry by entry.

use std::path::Path;
use std::time::Instant;
use log::{debug, info};
use crate::mesh;
use crate::rasterizer::{
    deg_to_rad, draw_patches, pack_color, DrawConfig, DrawStats, Framebuffer, Mat4, Patch,
    PatchShader, Vec3, WindingOrder, CLEAR_DEPTH, MAX_FB_HEIGHT, MAX_FB_WIDTH,
};
use crate::scene::{Material, MeshEntry, SceneConfig, SceneError};
use crate::shading::{Lighting, LitShader, ShadowedLitShader, TransformShader, UnlitShader};

/// A scene entry with its geometry loaded
pub struct LoadedMesh {
    pub entry: MeshEntry,
    pub patches: Vec<Patch>,
}

/// Config plus loaded geometry
pub struct Scene {
    pub config: SceneConfig,
    pub meshes: Vec<LoadedMesh>,
}

impl Scene {
    /// Build every mesh in the config. PLY paths resolve against `base_dir`.
    pub fn load(config: SceneConfig, base_dir: &Path) -> Result<Self, SceneError> {
        config.validate()?;

        let mut meshes = Vec::with_capacity(config.meshes.len());
        for entry in &config.meshes {
            let patches = entry.source.build(base_dir)?;
            if let Some(b) = mesh::bounds(&patches) {
                debug!(
                    "Mesh {:?}: {} patches, bounds ({:.2}, {:.2}, {:.2}) .. ({:.2}, {:.2}, {:.2})",
                    entry.material, patches.len(),
                    b.min.x, b.min.y, b.min.z, b.max.x, b.max.y, b.max.z
                );
            }
            meshes.push(LoadedMesh { entry: entry.clone(), patches });
        }

        info!(
            "Scene loaded: {} meshes, {} patches",
            meshes.len(),
            meshes.iter().map(|m| m.patches.len()).sum::<usize>()
        );
        Ok(Self { config, meshes })
    }

    pub fn patch_count(&self) -> usize {
        self.meshes.iter().map(|m| m.patches.len()).sum()
    }
}

/// Wall-clock cost and rasterizer counters of one frame
#[derive(Debug, Clone, Copy, Default)]
pub struct FrameTimings {
    /// Clearing and matrix setup, milliseconds
    pub update_ms: f32,
    /// Shadow and colour passes, milliseconds
    pub draw_ms: f32,
    pub shadow_stats: DrawStats,
    pub color_stats: DrawStats,
}

fn add_stats(total: &mut DrawStats, s: DrawStats) {
    total.submitted += s.submitted;
    total.culled += s.culled;
    total.rejected += s.rejected;
    total.drawn += s.drawn;
}

/// Camera and light matrices for one point in time
#[derive(Debug, Clone, Copy)]
pub struct FrameMatrices {
    pub view_proj: Mat4,
    pub light_view_proj: Mat4,
    /// Unit vector towards the sun
    pub sun_direction: Vec3,
}

impl FrameMatrices {
    pub fn compute(config: &SceneConfig, time: f32, aspect: f32) -> Self {
        let cam = &config.camera;
        let eye = Vec3::new((time * 0.5).sin(), time.sin() * 0.2 + 0.3, (time * 0.5).cos()) * cam.orbit_radius;
        let view = Mat4::look_at(eye, Vec3::ZERO);
        let proj = Mat4::perspective(deg_to_rad(cam.fov_degrees), aspect, cam.near, cam.far);

        let sun = config.sun.unit_direction();
        let sh = &config.shadow;
        let sun_pos = sun * sh.light_distance;
        let light_view = Mat4::look_at(sun_pos, sun_pos - sun);
        let light_proj = Mat4::orthogonal(sh.width, sh.height, sh.near, sh.far);

        Self {
            view_proj: proj * view,
            light_view_proj: light_proj * light_view,
            sun_direction: sun,
        }
    }
}

pub struct FrameRenderer {
    color: Framebuffer,
    depth: Framebuffer,
    shadow_map: Framebuffer,
}

impl FrameRenderer {
    /// Colour/depth sized `width x height` with room to grow up to the maximum size
    pub fn new(width: usize, height: usize, shadow_size: usize) -> Self {
        let mut renderer = Self::with_capacity(MAX_FB_WIDTH, MAX_FB_HEIGHT, shadow_size);
        renderer.resize(width, height);
        renderer
    }

    /// Colour/depth capacity fixed at `capacity_width x capacity_height`
    pub fn with_capacity(capacity_width: usize, capacity_height: usize, shadow_size: usize) -> Self {
        Self {
            color: Framebuffer::with_capacity(capacity_width, capacity_height),
            depth: Framebuffer::with_capacity(capacity_width, capacity_height),
            shadow_map: Framebuffer::new(shadow_size, shadow_size),
        }
    }

    /// Change the colour/depth size without reallocating. Panics past capacity.
    pub fn resize(&mut self, width: usize, height: usize) {
        self.color.resize(width, height);
        self.depth.resize(width, height);
    }

    pub fn size(&self) -> (usize, usize) {
        (self.color.width(), self.color.height())
    }

    pub fn color_buffer(&self) -> &Framebuffer {
        &self.color
    }

    pub fn depth_buffer(&self) -> &Framebuffer {
        &self.depth
    }

    pub fn shadow_map(&self) -> &Framebuffer {
        &self.shadow_map
    }

    /// Render the scene at animation time `time` (seconds)
    pub fn render(&mut self, scene: &Scene, time: f32) -> FrameTimings {
        let config = &scene.config;
        let update_start = Instant::now();

        self.color.fill(pack_color(config.clear_color.extend(0.0)));
        self.depth.fill(CLEAR_DEPTH);
        self.shadow_map.fill(CLEAR_DEPTH);

        let (width, height) = self.size();
        let m = FrameMatrices::compute(config, time, width as f32 / height as f32);
        let lighting = Lighting::new(m.sun_direction, config.sun.color);
        let marker_offset = m.sun_direction * config.sun.marker_distance;
        let offset_of = |entry: &MeshEntry| {
            if entry.follow_sun { entry.offset + marker_offset } else { entry.offset }
        };

        let update_ms = update_start.elapsed().as_secs_f32() * 1000.0;
        let draw_start = Instant::now();

        let mut shadow_stats = DrawStats::default();
        for mesh in scene.meshes.iter().filter(|mesh| mesh.entry.casts_shadow) {
            let vs = TransformShader::new(m.light_view_proj, offset_of(&mesh.entry));
            let mut cfg = DrawConfig::new(&vs)
                .with_front_winding(WindingOrder::Clockwise)
                .with_depth(&mut self.shadow_map);
            add_stats(&mut shadow_stats, draw_patches(&mesh.patches, &mut cfg));
        }

        let mut color_stats = DrawStats::default();
        let lit = LitShader { lighting };
        for mesh in &scene.meshes {
            let offset = offset_of(&mesh.entry);
            let vs = TransformShader::new(m.view_proj, offset);
            let shadowed = ShadowedLitShader {
                lighting,
                object_offset: offset.extend(0.0),
                light_view_proj: m.light_view_proj,
                shadow_map: &self.shadow_map,
                bias: config.shadow.bias,
            };
            let ps: &dyn PatchShader = match mesh.entry.material {
                Material::LitShadowed => &shadowed,
                Material::Lit => &lit,
                Material::Unlit => &UnlitShader,
            };

            let mut cfg = DrawConfig::new(&vs)
                .with_patch_shader(ps)
                .with_color(&mut self.color)
                .with_depth(&mut self.depth);
            add_stats(&mut color_stats, draw_patches(&mesh.patches, &mut cfg));
        }

        let timings = FrameTimings {
            update_ms,
            draw_ms: draw_start.elapsed().as_secs_f32() * 1000.0,
            shadow_stats,
            color_stats,
        };
        debug!(
            "Frame time: update {:.3}ms, draw {:.3}ms ({} of {} patches drawn)",
            timings.update_ms, timings.draw_ms, color_stats.drawn, color_stats.submitted
        );
        timings
    }
}
