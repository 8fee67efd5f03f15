//! Shadow-map sampling
//!
//! The shadow map is an ordinary depth framebuffer rendered from the light with an
//! orthographic projection. A world position is occluded when something nearer to the
//! light was recorded at its texel.

use super::framebuffer::Framebuffer;
use super::math::Vec4;
use super::matrix::Mat4;
use super::types::quantize_depth;

/// Depth offset subtracted before comparing, avoids self-shadowing acne
pub const DEFAULT_SHADOW_BIAS: f32 = 0.01;

/// World position -> light NDC
#[inline]
pub fn light_space(light_view_proj: &Mat4, world_pos: Vec4) -> Vec4 {
    let p = *light_view_proj * world_pos;
    p / p.w
}

/// `clamp(z - bias, 0, 1)`, quantized like the depth buffer
#[inline]
pub fn biased_depth(z: f32, bias: f32) -> u32 {
    quantize_depth((z - bias).clamp(0.0, 1.0))
}

/// Texel under a light-space NDC position, `None` when it falls off the map
pub fn texel(map: &Framebuffer, ndc: Vec4) -> Option<(usize, usize)> {
    let fx = (ndc.x * 0.5 + 0.5) * map.width() as f32;
    let fy = (ndc.y * 0.5 + 0.5) * map.height() as f32;
    if !(fx >= 0.0 && fy >= 0.0) {
        return None;
    }

    let (x, y) = (fx as usize, fy as usize);
    if x < map.width() && y < map.height() {
        Some((x, y))
    } else {
        None
    }
}

/// True when the map holds a depth strictly nearer than `world_pos`'s biased depth.
/// Positions outside the map are lit.
pub fn is_occluded(map: &Framebuffer, light_view_proj: &Mat4, world_pos: Vec4, bias: f32) -> bool {
    let ndc = light_space(light_view_proj, world_pos);
    match texel(map, ndc) {
        Some((x, y)) => map.get(x, y) < biased_depth(ndc.z, bias),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rasterizer::framebuffer::CLEAR_DEPTH;

    #[test]
    fn test_texel_mapping() {
        let map = Framebuffer::new(256, 256);
        assert_eq!(texel(&map, Vec4::new(0.0, 0.0, 0.5, 1.0)), Some((128, 128)));
        assert_eq!(texel(&map, Vec4::new(-1.0, -1.0, 0.5, 1.0)), Some((0, 0)));
        assert_eq!(texel(&map, Vec4::new(0.999, -0.999, 0.5, 1.0)), Some((255, 0)));
        assert_eq!(texel(&map, Vec4::new(1.0, 0.0, 0.5, 1.0)), None);
        assert_eq!(texel(&map, Vec4::new(0.0, -1.2, 0.5, 1.0)), None);
    }

    #[test]
    fn test_biased_depth_clamps() {
        assert_eq!(biased_depth(0.005, DEFAULT_SHADOW_BIAS), 0);
        assert_eq!(biased_depth(2.0, DEFAULT_SHADOW_BIAS), u32::MAX);
        assert!(biased_depth(0.5, DEFAULT_SHADOW_BIAS) < quantize_depth(0.5));
    }

    #[test]
    fn test_occlusion_against_recorded_depth() {
        let mut map = Framebuffer::new(8, 8);
        map.fill(CLEAR_DEPTH);
        map.set(4, 4, quantize_depth(0.4));

        let light = Mat4::IDENTITY;
        // Behind the occluder
        assert!(is_occluded(&map, &light, Vec4::new(0.0, 0.0, 0.6, 1.0), DEFAULT_SHADOW_BIAS));
        // The occluder itself stays lit thanks to the bias
        assert!(!is_occluded(&map, &light, Vec4::new(0.0, 0.0, 0.4, 1.0), DEFAULT_SHADOW_BIAS));
        // Nearer than the occluder
        assert!(!is_occluded(&map, &light, Vec4::new(0.0, 0.0, 0.2, 1.0), DEFAULT_SHADOW_BIAS));
        // Empty texel
        assert!(!is_occluded(&map, &light, Vec4::new(-0.9, -0.9, 0.9, 1.0), DEFAULT_SHADOW_BIAS));
        // Off the map
        assert!(!is_occluded(&map, &light, Vec4::new(3.0, 0.0, 0.9, 1.0), DEFAULT_SHADOW_BIAS));
    }
}
