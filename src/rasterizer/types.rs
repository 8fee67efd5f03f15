//! Core types for the rasterizer

use super::math::{Vec3, Vec4};

/// Rotational direction of a triangle's vertices in NDC
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum WindingOrder {
    Clockwise,
    #[default]
    CounterClockwise,
}

impl WindingOrder {
    pub fn flipped(self) -> Self {
        match self {
            WindingOrder::Clockwise => WindingOrder::CounterClockwise,
            WindingOrder::CounterClockwise => WindingOrder::Clockwise,
        }
    }
}

/// A triangle with one aggregated normal and colour (the flat-shading unit).
///
/// Produced by mesh sources, read-only to the rasterizer.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Patch {
    /// Object-space positions (w = 1)
    pub pos: [Vec4; 3],
    /// Average of the vertex normals
    pub normal: Vec3,
    /// Average of the vertex colours, channels in [0, 1]
    pub color: Vec3,
}

impl Patch {
    pub fn new(pos: [Vec4; 3], normal: Vec3, color: Vec3) -> Self {
        Self { pos, normal, color }
    }

    /// Build from per-vertex attributes, averaging normal and colour
    pub fn from_vertices(positions: [Vec3; 3], normals: [Vec3; 3], colors: [Vec3; 3]) -> Self {
        Self {
            pos: positions.map(|p| p.extend(1.0)),
            normal: (normals[0] + normals[1] + normals[2]) / 3.0,
            color: (colors[0] + colors[1] + colors[2]) / 3.0,
        }
    }

    /// Average object-space position of the three corners
    pub fn centroid(&self) -> Vec4 {
        (self.pos[0] + self.pos[1] + self.pos[2]) / 3.0
    }
}

/// Pack RGBA in [0, 1] into `0xAARRGGBB`. Inputs must already be clamped.
pub fn pack_color(rgba: Vec4) -> u32 {
    let channel = |c: f32| ((c * 255.0).round() as u32) & 0xff;
    (channel(rgba.w) << 24) | (channel(rgba.x) << 16) | (channel(rgba.y) << 8) | channel(rgba.z)
}

/// Unpack `0xAARRGGBB` into `[r, g, b, a]` bytes
pub fn unpack_color(argb: u32) -> [u8; 4] {
    let [a, r, g, b] = argb.to_be_bytes();
    [r, g, b, a]
}

/// Quantize a [0, 1] depth to the full u32 range (0 = nearest, `u32::MAX` = farthest)
#[inline]
pub fn quantize_depth(z: f32) -> u32 {
    (z * u32::MAX as f32) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pack_layout() {
        assert_eq!(pack_color(Vec4::new(1.0, 0.0, 0.0, 1.0)), 0xFFFF_0000);
        assert_eq!(pack_color(Vec4::new(0.0, 1.0, 0.0, 0.0)), 0x0000_FF00);
        assert_eq!(pack_color(Vec4::new(0.0, 0.0, 1.0, 0.0)), 0x0000_00FF);
    }

    #[test]
    fn test_pack_unpack_channels() {
        let levels = [0.0f32, 0.5, 1.0];
        for &r in &levels {
            for &g in &levels {
                for &b in &levels {
                    for &a in &levels {
                        let bytes = unpack_color(pack_color(Vec4::new(r, g, b, a)));
                        let expected = [r, g, b, a].map(|c| (c * 255.0).round() as i32);
                        for (got, want) in bytes.iter().zip(expected) {
                            assert!((*got as i32 - want).abs() <= 1);
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn test_quantize_depth_ends() {
        assert_eq!(quantize_depth(0.0), 0);
        assert_eq!(quantize_depth(1.0), u32::MAX);
        assert_eq!(quantize_depth(0.5), (0.5 * u32::MAX as f64).round() as u32);
        assert!(quantize_depth(0.25) < quantize_depth(0.75));
    }

    #[test]
    fn test_patch_aggregates_attributes() {
        let p = Patch::from_vertices(
            [Vec3::new(0.0, 0.0, 0.0), Vec3::new(3.0, 0.0, 0.0), Vec3::new(0.0, 3.0, 0.0)],
            [Vec3::new(0.0, 0.0, 1.0); 3],
            [Vec3::new(1.0, 0.0, 0.0), Vec3::new(0.0, 1.0, 0.0), Vec3::new(0.0, 0.0, 1.0)],
        );
        assert_eq!(p.pos[1], Vec4::new(3.0, 0.0, 0.0, 1.0));
        assert_eq!(p.normal, Vec3::new(0.0, 0.0, 1.0));
        assert!((p.color - Vec3::splat(1.0 / 3.0)).magnitude() < 1e-6);
        assert_eq!(p.centroid(), Vec4::new(1.0, 1.0, 0.0, 1.0));
    }

    #[test]
    fn test_winding_flip() {
        assert_eq!(WindingOrder::default(), WindingOrder::CounterClockwise);
        assert_eq!(WindingOrder::Clockwise.flipped(), WindingOrder::CounterClockwise);
    }
}
