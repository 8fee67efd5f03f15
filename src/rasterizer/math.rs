//! Vector math for 3D rendering
//!
//! Vec2/Vec3/Vec4 are plain value types. All component-wise arithmetic goes through
//! `F32x4`, so the scalar and SSE builds render identically. Narrow vectors pad the
//! unused lanes with zero.

use std::ops::{Add, AddAssign, Div, DivAssign, Mul, MulAssign, Neg, Sub, SubAssign};
use serde::{Serialize, Deserialize};
use super::lanes::F32x4;

/// Convert degrees to radians
pub fn deg_to_rad(degrees: f32) -> f32 {
    degrees * (std::f32::consts::PI / 180.0)
}

/// Convert radians to degrees
pub fn rad_to_deg(radians: f32) -> f32 {
    radians * (180.0 / std::f32::consts::PI)
}

/// 2D Vector
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

/// 3D Vector
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

/// Homogeneous 4D vector (positions carry w = 1, clip space output carries w after divide)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[repr(C, align(16))]
pub struct Vec4 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub w: f32,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub const fn splat(a: f32) -> Self {
        Self { x: a, y: a }
    }

    /// Widen by appending a z component
    pub const fn extend(self, z: f32) -> Vec3 {
        Vec3 { x: self.x, y: self.y, z }
    }

    #[inline]
    fn to_lanes(self) -> F32x4 {
        F32x4::new(self.x, self.y, 0.0, 0.0)
    }

    #[inline]
    fn from_lanes(l: F32x4) -> Self {
        let [x, y, _, _] = l.to_array();
        Self { x, y }
    }
}

impl Vec3 {
    pub const ZERO: Vec3 = Vec3 { x: 0.0, y: 0.0, z: 0.0 };
    pub const ONE: Vec3 = Vec3 { x: 1.0, y: 1.0, z: 1.0 };
    /// Fixed world-up axis used by `Mat4::look_at`
    pub const WORLD_UP: Vec3 = Vec3 { x: 0.0, y: 1.0, z: 0.0 };

    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub const fn splat(a: f32) -> Self {
        Self { x: a, y: a, z: a }
    }

    /// Widen by appending a w component
    pub const fn extend(self, w: f32) -> Vec4 {
        Vec4 { x: self.x, y: self.y, z: self.z, w }
    }

    pub const fn xy(self) -> Vec2 {
        Vec2 { x: self.x, y: self.y }
    }

    pub fn cross(self, other: Vec3) -> Vec3 {
        Vec3 {
            x: self.y * other.z - self.z * other.y,
            y: self.z * other.x - self.x * other.z,
            z: self.x * other.y - self.y * other.x,
        }
    }

    #[inline]
    fn to_lanes(self) -> F32x4 {
        F32x4::new(self.x, self.y, self.z, 0.0)
    }

    #[inline]
    fn from_lanes(l: F32x4) -> Self {
        let [x, y, z, _] = l.to_array();
        Self { x, y, z }
    }
}

impl Vec4 {
    pub const ZERO: Vec4 = Vec4 { x: 0.0, y: 0.0, z: 0.0, w: 0.0 };

    pub const fn new(x: f32, y: f32, z: f32, w: f32) -> Self {
        Self { x, y, z, w }
    }

    pub const fn splat(a: f32) -> Self {
        Self { x: a, y: a, z: a, w: a }
    }

    /// Build from two pairs: `(a.x, a.y, b.x, b.y)`
    pub const fn from_pairs(a: Vec2, b: Vec2) -> Self {
        Self { x: a.x, y: a.y, z: b.x, w: b.y }
    }

    pub const fn xy(self) -> Vec2 {
        Vec2 { x: self.x, y: self.y }
    }

    pub const fn xyz(self) -> Vec3 {
        Vec3 { x: self.x, y: self.y, z: self.z }
    }

    #[inline]
    pub(crate) fn to_lanes(self) -> F32x4 {
        F32x4::new(self.x, self.y, self.z, self.w)
    }

    #[inline]
    pub(crate) fn from_lanes(l: F32x4) -> Self {
        let [x, y, z, w] = l.to_array();
        Self { x, y, z, w }
    }
}

/// Arithmetic shared by all three vector types, expressed through the lane backend
macro_rules! impl_vec_ops {
    ($t:ident) => {
        impl $t {
            pub fn min(self, other: $t) -> $t {
                $t::from_lanes(self.to_lanes().min(other.to_lanes()))
            }

            pub fn max(self, other: $t) -> $t {
                $t::from_lanes(self.to_lanes().max(other.to_lanes()))
            }

            pub fn dot(self, other: $t) -> f32 {
                self.to_lanes().mul(other.to_lanes()).sum()
            }

            /// Euclidean norm
            pub fn magnitude(self) -> f32 {
                self.dot(self).sqrt()
            }

            /// Unit vector in the same direction. The input must be non-zero.
            pub fn normalized(self) -> $t {
                let m = self.magnitude();
                debug_assert!(m > 0.0, concat!("normalizing a zero-length ", stringify!($t)));
                self / m
            }
        }

        impl Add for $t {
            type Output = $t;
            fn add(self, o: $t) -> $t {
                $t::from_lanes(self.to_lanes().add(o.to_lanes()))
            }
        }

        impl Sub for $t {
            type Output = $t;
            fn sub(self, o: $t) -> $t {
                $t::from_lanes(self.to_lanes().sub(o.to_lanes()))
            }
        }

        impl Mul for $t {
            type Output = $t;
            fn mul(self, o: $t) -> $t {
                $t::from_lanes(self.to_lanes().mul(o.to_lanes()))
            }
        }

        impl Div for $t {
            type Output = $t;
            fn div(self, o: $t) -> $t {
                $t::from_lanes(self.to_lanes().div(o.to_lanes()))
            }
        }

        impl Add<f32> for $t {
            type Output = $t;
            fn add(self, a: f32) -> $t {
                $t::from_lanes(self.to_lanes().add(F32x4::splat(a)))
            }
        }

        impl Sub<f32> for $t {
            type Output = $t;
            fn sub(self, a: f32) -> $t {
                $t::from_lanes(self.to_lanes().sub(F32x4::splat(a)))
            }
        }

        impl Mul<f32> for $t {
            type Output = $t;
            fn mul(self, a: f32) -> $t {
                $t::from_lanes(self.to_lanes().mul(F32x4::splat(a)))
            }
        }

        impl Div<f32> for $t {
            type Output = $t;
            fn div(self, a: f32) -> $t {
                $t::from_lanes(self.to_lanes().div(F32x4::splat(a)))
            }
        }

        impl Neg for $t {
            type Output = $t;
            fn neg(self) -> $t {
                self * -1.0
            }
        }

        impl AddAssign for $t {
            fn add_assign(&mut self, o: $t) {
                *self = *self + o;
            }
        }

        impl SubAssign for $t {
            fn sub_assign(&mut self, o: $t) {
                *self = *self - o;
            }
        }

        impl MulAssign for $t {
            fn mul_assign(&mut self, o: $t) {
                *self = *self * o;
            }
        }

        impl DivAssign for $t {
            fn div_assign(&mut self, o: $t) {
                *self = *self / o;
            }
        }

        impl AddAssign<f32> for $t {
            fn add_assign(&mut self, a: f32) {
                *self = *self + a;
            }
        }

        impl SubAssign<f32> for $t {
            fn sub_assign(&mut self, a: f32) {
                *self = *self - a;
            }
        }

        impl MulAssign<f32> for $t {
            fn mul_assign(&mut self, a: f32) {
                *self = *self * a;
            }
        }

        impl DivAssign<f32> for $t {
            fn div_assign(&mut self, a: f32) {
                *self = *self / a;
            }
        }
    };
}

impl_vec_ops!(Vec2);
impl_vec_ops!(Vec3);
impl_vec_ops!(Vec4);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vec3_dot() {
        let a = Vec3::new(1.0, 2.0, 3.0);
        let b = Vec3::new(4.0, 5.0, 6.0);
        assert!((a.dot(b) - 32.0).abs() < 0.001);
    }

    #[test]
    fn test_vec3_cross() {
        let a = Vec3::new(1.0, 0.0, 0.0);
        let b = Vec3::new(0.0, 1.0, 0.0);
        let c = a.cross(b);
        assert_eq!(c, Vec3::new(0.0, 0.0, 1.0));
        assert_eq!(b.cross(a), Vec3::new(0.0, 0.0, -1.0));
    }

    #[test]
    fn test_vec4_ops_touch_every_lane() {
        let a = Vec4::new(1.0, 2.0, 3.0, 4.0);
        let b = Vec4::new(2.0, 2.0, 2.0, 2.0);
        assert_eq!(a - b, Vec4::new(-1.0, 0.0, 1.0, 2.0));
        assert_eq!(a * b, Vec4::new(2.0, 4.0, 6.0, 8.0));
        assert_eq!(a / b, Vec4::new(0.5, 1.0, 1.5, 2.0));
        assert_eq!(a + 1.0, Vec4::new(2.0, 3.0, 4.0, 5.0));
        assert_eq!(-a, Vec4::new(-1.0, -2.0, -3.0, -4.0));
    }

    #[test]
    fn test_compound_assignment_matches_operators() {
        let mut v = Vec3::new(1.0, 2.0, 3.0);
        v += Vec3::ONE;
        v *= 2.0;
        v -= 1.0;
        v /= Vec3::new(1.0, 2.0, 7.0);
        assert_eq!(v, ((Vec3::new(1.0, 2.0, 3.0) + Vec3::ONE) * 2.0 - 1.0) / Vec3::new(1.0, 2.0, 7.0));
    }

    #[test]
    fn test_min_max() {
        let a = Vec4::new(1.0, 5.0, -3.0, 0.0);
        let b = Vec4::new(2.0, 4.0, -4.0, 0.5);
        assert_eq!(a.min(b), Vec4::new(1.0, 4.0, -4.0, 0.0));
        assert_eq!(a.max(b), Vec4::new(2.0, 5.0, -3.0, 0.5));
    }

    #[test]
    fn test_magnitude_and_normalize() {
        assert_eq!(Vec3::new(3.0, 4.0, 0.0).magnitude(), 5.0);
        assert_eq!(Vec2::new(0.0, -2.0).normalized(), Vec2::new(0.0, -1.0));
        let n = Vec4::new(1.0, 1.0, 1.0, 1.0).normalized();
        assert!((n.magnitude() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_widen_narrow() {
        let v = Vec2::new(1.0, 2.0).extend(3.0).extend(4.0);
        assert_eq!(v, Vec4::new(1.0, 2.0, 3.0, 4.0));
        assert_eq!(v.xyz(), Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(v.xy(), Vec2::new(1.0, 2.0));
        assert_eq!(Vec4::from_pairs(Vec2::new(1.0, 2.0), Vec2::new(3.0, 4.0)), v);
    }

    #[test]
    fn test_angle_conversion() {
        assert!((deg_to_rad(180.0) - std::f32::consts::PI).abs() < 1e-6);
        assert!((rad_to_deg(std::f32::consts::FRAC_PI_2) - 90.0).abs() < 1e-4);
    }
}
