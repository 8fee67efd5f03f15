//! Shader hooks: the caller-supplied per-vertex and per-patch computation
//!
//! The rasterizer only sees these traits. Any state a shader needs (matrices, light,
//! a shadow map) lives in the implementing type or the closure's captures.

use super::math::Vec4;
use super::types::Patch;

/// Object space -> clip space, including the perspective divide.
///
/// Called once per corner. The returned position must already be divided by w.
pub trait VertexShader {
    fn transform(&self, object_pos: Vec4) -> Vec4;
}

/// Flat colour for a visible patch, RGBA in [0, 1] (clamped by the rasterizer).
///
/// `avg_clip` is the mean of the three transformed corners.
pub trait PatchShader {
    fn shade(&self, patch: &Patch, avg_clip: Vec4) -> Vec4;
}

impl<F> VertexShader for F
where
    F: Fn(Vec4) -> Vec4,
{
    fn transform(&self, object_pos: Vec4) -> Vec4 {
        self(object_pos)
    }
}

impl<F> PatchShader for F
where
    F: Fn(&Patch, Vec4) -> Vec4,
{
    fn shade(&self, patch: &Patch, avg_clip: Vec4) -> Vec4 {
        self(patch, avg_clip)
    }
}

/// Divide a homogeneous position by its own w
#[inline]
pub fn perspective_divide(v: Vec4) -> Vec4 {
    v / v.w
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rasterizer::math::Vec3;

    #[test]
    fn test_closures_are_shaders() {
        let scale = 2.0;
        let vs = move |v: Vec4| v * scale;
        let ps = |p: &Patch, _avg: Vec4| p.color.extend(1.0);

        assert_eq!(vs.transform(Vec4::splat(1.0)), Vec4::splat(2.0));

        let patch = Patch { color: Vec3::new(0.2, 0.4, 0.6), ..Default::default() };
        assert_eq!(ps.shade(&patch, Vec4::ZERO), Vec4::new(0.2, 0.4, 0.6, 1.0));
    }

    #[test]
    fn test_perspective_divide() {
        assert_eq!(perspective_divide(Vec4::new(2.0, 4.0, 1.0, 2.0)), Vec4::new(1.0, 2.0, 0.5, 1.0));
    }
}
