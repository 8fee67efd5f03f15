//! 4x4 matrix and the projection/view constructors
//!
//! Column-major like GLSL: `m[col][row]`. Multiplying a column vector applies the
//! right-hand matrix first, so `(a * b) * v == a * (b * v)`.
//!
//! Projection conventions shared by everything that renders:
//! - Y is flipped (row 1 negated) so +Y up in the world lands at the top of the framebuffer
//! - clip-space depth maps near -> 0 and far -> 1 after the perspective divide

use std::ops::{Add, AddAssign, Div, DivAssign, Mul, MulAssign, Sub, SubAssign};
use super::lanes::F32x4;
use super::math::{Vec3, Vec4};

#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[repr(C, align(64))]
pub struct Mat4 {
    pub m: [[f32; 4]; 4],
}

impl Mat4 {
    pub const ZERO: Mat4 = Mat4 { m: [[0.0; 4]; 4] };
    pub const IDENTITY: Mat4 = Mat4::diagonal(1.0);

    /// `a` on the diagonal, zero elsewhere
    pub const fn diagonal(a: f32) -> Self {
        Self {
            m: [
                [a, 0.0, 0.0, 0.0],
                [0.0, a, 0.0, 0.0],
                [0.0, 0.0, a, 0.0],
                [0.0, 0.0, 0.0, a],
            ],
        }
    }

    pub const fn from_cols(c0: Vec4, c1: Vec4, c2: Vec4, c3: Vec4) -> Self {
        Self {
            m: [
                [c0.x, c0.y, c0.z, c0.w],
                [c1.x, c1.y, c1.z, c1.w],
                [c2.x, c2.y, c2.z, c2.w],
                [c3.x, c3.y, c3.z, c3.w],
            ],
        }
    }

    pub const fn from_rows(r0: Vec4, r1: Vec4, r2: Vec4, r3: Vec4) -> Self {
        Self {
            m: [
                [r0.x, r1.x, r2.x, r3.x],
                [r0.y, r1.y, r2.y, r3.y],
                [r0.z, r1.z, r2.z, r3.z],
                [r0.w, r1.w, r2.w, r3.w],
            ],
        }
    }

    pub fn col(&self, i: usize) -> Vec4 {
        let c = self.m[i];
        Vec4::new(c[0], c[1], c[2], c[3])
    }

    pub fn row(&self, j: usize) -> Vec4 {
        Vec4::new(self.m[0][j], self.m[1][j], self.m[2][j], self.m[3][j])
    }

    pub fn transpose(&self) -> Mat4 {
        Mat4::from_rows(self.col(0), self.col(1), self.col(2), self.col(3))
    }

    #[inline]
    fn lanes(&self, i: usize) -> F32x4 {
        let c = self.m[i];
        F32x4::new(c[0], c[1], c[2], c[3])
    }

    /// Linear combination of the columns: `(c0*x + c1*y) + (c2*z + c3*w)`
    #[inline]
    fn combine(&self, x: f32, y: f32, z: f32, w: f32) -> [f32; 4] {
        let a = self.lanes(0).mul(F32x4::splat(x));
        let b = self.lanes(1).mul(F32x4::splat(y));
        let c = self.lanes(2).mul(F32x4::splat(z));
        let d = self.lanes(3).mul(F32x4::splat(w));
        a.add(b).add(c.add(d)).to_array()
    }

    #[inline]
    fn map(&self, f: impl Fn(F32x4) -> F32x4) -> Mat4 {
        let mut out = Mat4::ZERO;
        for i in 0..4 {
            out.m[i] = f(self.lanes(i)).to_array();
        }
        out
    }

    /// Right-handed perspective projection (zero-to-one depth, flipped Y)
    pub fn perspective(fov_y: f32, aspect: f32, near: f32, far: f32) -> Mat4 {
        let half_tan = (fov_y / 2.0).tan();

        let mut p = Mat4::ZERO;
        p.m[0][0] = 1.0 / (half_tan * aspect);
        p.m[1][1] = -1.0 / half_tan;
        p.m[2][2] = far / (near - far);
        p.m[2][3] = -1.0;
        p.m[3][2] = -(far * near) / (far - near);
        p
    }

    /// Orthographic projection of a `width x height` box centred on the view axis
    pub fn orthogonal(width: f32, height: f32, near: f32, far: f32) -> Mat4 {
        let mut o = Mat4::IDENTITY;
        o.m[0][0] = 2.0 / width;
        o.m[1][1] = -2.0 / height;
        o.m[2][2] = -1.0 / (far - near);
        o.m[3][2] = -near / (far - near);
        o
    }

    /// View matrix looking from `position` towards `target`.
    ///
    /// The basis is built against `Vec3::WORLD_UP`, so the inputs must not coincide and
    /// the view direction must not be vertical.
    pub fn look_at(position: Vec3, target: Vec3) -> Mat4 {
        let forward = (target - position).normalized();
        let right = Vec3::WORLD_UP.cross(forward).normalized();
        let up = forward.cross(right);

        Mat4::from_rows(
            right.extend(-right.dot(position)),
            up.extend(-up.dot(position)),
            (-forward).extend(forward.dot(position)),
            Vec4::new(0.0, 0.0, 0.0, 1.0),
        )
    }
}

impl Mul for Mat4 {
    type Output = Mat4;
    fn mul(self, rhs: Mat4) -> Mat4 {
        let mut result = Mat4::ZERO;
        for i in 0..4 {
            let e = rhs.m[i];
            result.m[i] = self.combine(e[0], e[1], e[2], e[3]);
        }
        result
    }
}

impl Mul<Vec4> for Mat4 {
    type Output = Vec4;
    fn mul(self, v: Vec4) -> Vec4 {
        let [x, y, z, w] = self.combine(v.x, v.y, v.z, v.w);
        Vec4::new(x, y, z, w)
    }
}

impl Add<f32> for Mat4 {
    type Output = Mat4;
    fn add(self, a: f32) -> Mat4 {
        let s = F32x4::splat(a);
        self.map(|c| c.add(s))
    }
}

impl Sub<f32> for Mat4 {
    type Output = Mat4;
    fn sub(self, a: f32) -> Mat4 {
        let s = F32x4::splat(a);
        self.map(|c| c.sub(s))
    }
}

impl Mul<f32> for Mat4 {
    type Output = Mat4;
    fn mul(self, a: f32) -> Mat4 {
        let s = F32x4::splat(a);
        self.map(|c| c.mul(s))
    }
}

impl Div<f32> for Mat4 {
    type Output = Mat4;
    fn div(self, a: f32) -> Mat4 {
        let s = F32x4::splat(a);
        self.map(|c| c.div(s))
    }
}

impl AddAssign<f32> for Mat4 {
    fn add_assign(&mut self, a: f32) {
        *self = *self + a;
    }
}

impl SubAssign<f32> for Mat4 {
    fn sub_assign(&mut self, a: f32) {
        *self = *self - a;
    }
}

impl MulAssign<f32> for Mat4 {
    fn mul_assign(&mut self, a: f32) {
        *self = *self * a;
    }
}

impl DivAssign<f32> for Mat4 {
    fn div_assign(&mut self, a: f32) {
        *self = *self / a;
    }
}

impl MulAssign for Mat4 {
    fn mul_assign(&mut self, rhs: Mat4) {
        *self = *self * rhs;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rasterizer::math::deg_to_rad;

    fn approx(a: Vec4, b: Vec4) -> bool {
        (a - b).magnitude() < 1e-4
    }

    fn divide(v: Vec4) -> Vec4 {
        v / v.w
    }

    #[test]
    fn test_default_is_zero_and_diagonal() {
        assert_eq!(Mat4::default(), Mat4::ZERO);
        let d = Mat4::diagonal(2.0);
        assert_eq!(d * Vec4::new(1.0, 2.0, 3.0, 4.0), Vec4::new(2.0, 4.0, 6.0, 8.0));
    }

    #[test]
    fn test_column_major_layout() {
        let mut t = Mat4::IDENTITY;
        t.m[3][0] = 5.0; // translate x
        assert_eq!(t * Vec4::new(1.0, 0.0, 0.0, 1.0), Vec4::new(6.0, 0.0, 0.0, 1.0));
        assert_eq!(t.row(0), Vec4::new(1.0, 0.0, 0.0, 5.0));
        assert_eq!(t.transpose().m[0][3], 5.0);
    }

    #[test]
    fn test_composition_order() {
        let mut a = Mat4::IDENTITY;
        a.m[3][0] = 1.0;
        let b = Mat4::diagonal(2.0);
        let v = Vec4::new(1.0, 1.0, 1.0, 1.0);
        // b applied first: scale then translate
        assert_eq!((a * b) * v, a * (b * v));
        assert_eq!((a * b) * v, Vec4::new(4.0, 2.0, 2.0, 2.0));
    }

    #[test]
    fn test_scalar_ops_and_compound_division() {
        let m = Mat4::diagonal(4.0);
        let mut n = m;
        n /= 2.0;
        assert_eq!(n, m / 2.0);
        assert_eq!(n.m[0][0], 2.0);
        assert_eq!(n.m[0][1], 0.0);

        let mut k = Mat4::ZERO;
        k += 1.0;
        k *= 3.0;
        k -= 1.0;
        assert!(k.m.iter().flatten().all(|&e| e == 2.0));
    }

    #[test]
    fn test_perspective_depth_range() {
        let p = Mat4::perspective(deg_to_rad(60.0), 16.0 / 9.0, 0.1, 80.0);
        let near = divide(p * Vec4::new(0.0, 0.0, -0.1, 1.0));
        let far = divide(p * Vec4::new(0.0, 0.0, -80.0, 1.0));
        assert!(near.z.abs() < 1e-5);
        assert!((far.z - 1.0).abs() < 1e-5);

        // +Y in view space ends up at negative NDC y (top row of the framebuffer)
        let up = divide(p * Vec4::new(0.0, 1.0, -5.0, 1.0));
        assert!(up.y < 0.0);
    }

    #[test]
    fn test_orthogonal_depth_range() {
        let o = Mat4::orthogonal(10.0, 10.0, 0.1, 80.0);
        assert!((o * Vec4::new(0.0, 0.0, -0.1, 1.0)).z.abs() < 1e-6);
        assert!(((o * Vec4::new(0.0, 0.0, -80.0, 1.0)).z - 1.0).abs() < 1e-6);
        assert!(approx(o * Vec4::new(5.0, 5.0, -1.0, 1.0), Vec4::new(1.0, -1.0, o.m[2][2] * -1.0 + o.m[3][2], 1.0)));
    }

    #[test]
    fn test_look_at_moves_eye_to_origin() {
        let eye = Vec3::new(3.0, 2.0, 5.0);
        let target = Vec3::new(1.0, 0.5, -1.0);
        let view = Mat4::look_at(eye, target);

        assert!(approx(view * eye.extend(1.0), Vec4::new(0.0, 0.0, 0.0, 1.0)));

        // The target sits straight ahead on -Z at its distance from the eye
        let dist = (target - eye).magnitude();
        assert!(approx(view * target.extend(1.0), Vec4::new(0.0, 0.0, -dist, 1.0)));
    }
}
