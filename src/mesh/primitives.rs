//! Procedural shapes
//!
//! Faces wind counter-clockwise when seen from outside, matching the rasterizer's
//! default front winding under `Mat4::look_at` + `Mat4::perspective`.

use crate::rasterizer::{Patch, Vec3};

/// Outward normal and the in-plane (u, v) axes of each box face, with `u x v == normal`
const BOX_FACES: [(Vec3, Vec3, Vec3); 6] = [
    (Vec3::new(1.0, 0.0, 0.0), Vec3::new(0.0, 0.0, -1.0), Vec3::new(0.0, 1.0, 0.0)),
    (Vec3::new(-1.0, 0.0, 0.0), Vec3::new(0.0, 0.0, 1.0), Vec3::new(0.0, 1.0, 0.0)),
    (Vec3::new(0.0, 1.0, 0.0), Vec3::new(1.0, 0.0, 0.0), Vec3::new(0.0, 0.0, -1.0)),
    (Vec3::new(0.0, -1.0, 0.0), Vec3::new(1.0, 0.0, 0.0), Vec3::new(0.0, 0.0, 1.0)),
    (Vec3::new(0.0, 0.0, 1.0), Vec3::new(1.0, 0.0, 0.0), Vec3::new(0.0, 1.0, 0.0)),
    (Vec3::new(0.0, 0.0, -1.0), Vec3::new(-1.0, 0.0, 0.0), Vec3::new(0.0, 1.0, 0.0)),
];

/// Two patches covering the rectangle `center +- u +- v`
fn quad(center: Vec3, u: Vec3, v: Vec3, normal: Vec3, color: Vec3) -> [Patch; 2] {
    let corners = [
        center - u - v,
        center + u - v,
        center + u + v,
        center - u + v,
    ];
    let patch = |a: usize, b: usize, c: usize| {
        Patch::new(
            [corners[a].extend(1.0), corners[b].extend(1.0), corners[c].extend(1.0)],
            normal,
            color,
        )
    };
    [patch(0, 1, 2), patch(0, 2, 3)]
}

/// Axis-aligned box, 12 patches
pub fn cuboid(center: Vec3, half_extents: Vec3, color: Vec3) -> Vec<Patch> {
    let mut patches = Vec::with_capacity(12);
    for (normal, u, v) in BOX_FACES {
        let face_center = center + normal * half_extents;
        patches.extend(quad(face_center, u * half_extents, v * half_extents, normal, color));
    }
    patches
}

/// Cube with edge length `size`
pub fn cube(center: Vec3, size: f32, color: Vec3) -> Vec<Patch> {
    cuboid(center, Vec3::splat(size * 0.5), color)
}

/// Square `size x size` floor at `height`, facing +Y
pub fn ground(size: f32, height: f32, color: Vec3) -> Vec<Patch> {
    let (normal, u, v) = BOX_FACES[2];
    let half = size * 0.5;
    quad(Vec3::new(0.0, height, 0.0), u * half, v * half, normal, color).to_vec()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rasterizer::{
        deg_to_rad, draw_patches, perspective_divide, DrawConfig, DrawStats, Framebuffer,
        Mat4, Vec4, CLEAR_DEPTH,
    };

    fn geometric_normal(p: &Patch) -> Vec3 {
        let [a, b, c] = p.pos.map(|v| v.xyz());
        (b - a).cross(c - a)
    }

    #[test]
    fn test_face_axes_are_right_handed() {
        for (normal, u, v) in BOX_FACES {
            assert_eq!(u.cross(v), normal);
        }
    }

    #[test]
    fn test_cuboid_winds_outward() {
        let center = Vec3::new(0.5, -1.0, 2.0);
        let patches = cuboid(center, Vec3::new(1.0, 0.5, 2.0), Vec3::ONE);
        assert_eq!(patches.len(), 12);

        for p in &patches {
            assert!(geometric_normal(p).dot(p.normal) > 0.0);
            // Outward: the face sits on the normal's side of the centre
            assert!((p.centroid().xyz() - center).dot(p.normal) > 0.0);
        }
    }

    #[test]
    fn test_ground_faces_up() {
        let patches = ground(4.0, -0.5, Vec3::new(0.2, 0.6, 0.2));
        assert_eq!(patches.len(), 2);
        for p in &patches {
            assert_eq!(p.normal, Vec3::new(0.0, 1.0, 0.0));
            assert!(geometric_normal(p).y > 0.0);
            assert!(p.pos.iter().all(|v| v.y == -0.5 && v.x.abs() == 2.0 && v.z.abs() == 2.0));
        }
    }

    #[test]
    fn test_camera_sees_only_facing_sides() {
        let view_proj = Mat4::perspective(deg_to_rad(60.0), 1.0, 0.1, 80.0)
            * Mat4::look_at(Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO);
        let vs = move |v: Vec4| perspective_divide(view_proj * v);

        let mut depth = Framebuffer::new(64, 64);
        depth.fill(CLEAR_DEPTH);
        let mut cfg = DrawConfig::new(&vs).with_depth(&mut depth);
        let stats = draw_patches(&cube(Vec3::ZERO, 1.0, Vec3::ONE), &mut cfg);

        // Only the +Z face is turned towards an eye on the +Z axis
        assert_eq!(stats, DrawStats { submitted: 12, culled: 10, rejected: 0, drawn: 2 });
    }
}
