//! Concrete shaders used by the frame renderer
//!
//! A single `TransformShader` serves both the camera and the light pass; only the
//! matrix differs. Patch shaders produce flat sun + ambient lighting, optionally
//! darkened by the shadow map.

use crate::rasterizer::{
    perspective_divide, shadow, Framebuffer, Mat4, Patch, PatchShader, Vec3, Vec4, VertexShader,
};

/// Object offset + view-projection + perspective divide
#[derive(Debug, Clone, Copy)]
pub struct TransformShader {
    pub view_proj: Mat4,
    /// Added to every object-space corner before projection (w = 0)
    pub object_offset: Vec4,
}

impl TransformShader {
    pub fn new(view_proj: Mat4, object_offset: Vec3) -> Self {
        Self { view_proj, object_offset: object_offset.extend(0.0) }
    }
}

impl VertexShader for TransformShader {
    #[inline]
    fn transform(&self, object_pos: Vec4) -> Vec4 {
        perspective_divide(self.view_proj * (object_pos + self.object_offset))
    }
}

/// Directional sun plus constant sky ambient
#[derive(Debug, Clone, Copy)]
pub struct Lighting {
    /// Unit vector pointing towards the sun
    pub sun_direction: Vec3,
    pub sun_color: Vec3,
    pub ambient: Vec3,
}

impl Lighting {
    /// Pale blue sky fill
    pub const DEFAULT_AMBIENT: Vec3 = Vec3::new(0.6 * 0.25, 0.8 * 0.25, 1.0 * 0.25);

    pub fn new(sun_direction: Vec3, sun_color: Vec3) -> Self {
        Self { sun_direction, sun_color, ambient: Self::DEFAULT_AMBIENT }
    }

    /// Lambert term for a normal, no shadowing
    pub fn direct(&self, normal: Vec3) -> Vec3 {
        self.sun_color * normal.dot(self.sun_direction).max(0.0)
    }

    fn apply(&self, albedo: Vec3, direct: Vec3) -> Vec4 {
        (albedo * (direct + self.ambient)).extend(1.0)
    }
}

/// Sun + ambient, no shadows
#[derive(Debug, Clone, Copy)]
pub struct LitShader {
    pub lighting: Lighting,
}

impl PatchShader for LitShader {
    fn shade(&self, patch: &Patch, _avg_clip: Vec4) -> Vec4 {
        self.lighting.apply(patch.color, self.lighting.direct(patch.normal))
    }
}

/// Sun + ambient, direct light dropped where the shadow map sees something nearer
pub struct ShadowedLitShader<'a> {
    pub lighting: Lighting,
    pub object_offset: Vec4,
    pub light_view_proj: Mat4,
    pub shadow_map: &'a Framebuffer,
    pub bias: f32,
}

impl PatchShader for ShadowedLitShader<'_> {
    fn shade(&self, patch: &Patch, _avg_clip: Vec4) -> Vec4 {
        let world = patch.centroid() + self.object_offset;
        let direct = if shadow::is_occluded(self.shadow_map, &self.light_view_proj, world, self.bias) {
            Vec3::ZERO
        } else {
            self.lighting.direct(patch.normal)
        };
        self.lighting.apply(patch.color, direct)
    }
}

/// Patch colour as-is
#[derive(Debug, Clone, Copy, Default)]
pub struct UnlitShader;

impl PatchShader for UnlitShader {
    fn shade(&self, patch: &Patch, _avg_clip: Vec4) -> Vec4 {
        patch.color.extend(1.0)
    }
}
