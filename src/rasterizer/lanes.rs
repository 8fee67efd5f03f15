//! Four-lane float arithmetic backing the vector and matrix types
//!
//! Two backends share one operation order so they produce bit-identical results:
//! - `scalar`: plain `[f32; 4]`, available everywhere
//! - `sse`: `__m128` registers, x86_64 only
//!
//! `F32x4` resolves to the SSE backend when the `simd` feature is enabled on x86_64.
//! Horizontal sums are always `(l0 + l1) + (l2 + l3)`, and `min`/`max` return the
//! second operand when the comparison is unordered (NaN), matching `minps`/`maxps`.

/// Portable backend
pub mod scalar {
    #[derive(Debug, Clone, Copy, PartialEq)]
    pub struct F32x4([f32; 4]);

    #[inline]
    fn lane_min(a: f32, b: f32) -> f32 {
        if a < b { a } else { b }
    }

    #[inline]
    fn lane_max(a: f32, b: f32) -> f32 {
        if a > b { a } else { b }
    }

    impl F32x4 {
        #[inline]
        pub fn new(l0: f32, l1: f32, l2: f32, l3: f32) -> Self {
            Self([l0, l1, l2, l3])
        }

        #[inline]
        pub fn splat(v: f32) -> Self {
            Self([v; 4])
        }

        #[inline]
        pub fn to_array(self) -> [f32; 4] {
            self.0
        }

        #[inline]
        fn zip(self, o: Self, f: impl Fn(f32, f32) -> f32) -> Self {
            let (a, b) = (self.0, o.0);
            Self([f(a[0], b[0]), f(a[1], b[1]), f(a[2], b[2]), f(a[3], b[3])])
        }

        #[inline]
        pub fn add(self, o: Self) -> Self {
            self.zip(o, |a, b| a + b)
        }

        #[inline]
        pub fn sub(self, o: Self) -> Self {
            self.zip(o, |a, b| a - b)
        }

        #[inline]
        pub fn mul(self, o: Self) -> Self {
            self.zip(o, |a, b| a * b)
        }

        #[inline]
        pub fn div(self, o: Self) -> Self {
            self.zip(o, |a, b| a / b)
        }

        #[inline]
        pub fn min(self, o: Self) -> Self {
            self.zip(o, lane_min)
        }

        #[inline]
        pub fn max(self, o: Self) -> Self {
            self.zip(o, lane_max)
        }

        #[inline]
        pub fn sum(self) -> f32 {
            let l = self.0;
            (l[0] + l[1]) + (l[2] + l[3])
        }
    }
}

/// SSE backend (SSE/SSE2 are part of the x86_64 baseline, no runtime detection needed)
#[cfg(target_arch = "x86_64")]
#[allow(unused_unsafe)]
pub mod sse {
    use core::arch::x86_64::{
        __m128, _mm_add_ps, _mm_add_ss, _mm_cvtss_f32, _mm_div_ps, _mm_max_ps, _mm_min_ps,
        _mm_movehl_ps, _mm_mul_ps, _mm_set1_ps, _mm_set_ps, _mm_shuffle_ps, _mm_storeu_ps,
        _mm_sub_ps,
    };

    #[derive(Debug, Clone, Copy)]
    pub struct F32x4(__m128);

    impl PartialEq for F32x4 {
        fn eq(&self, other: &Self) -> bool {
            self.to_array() == other.to_array()
        }
    }

    impl F32x4 {
        #[inline]
        pub fn new(l0: f32, l1: f32, l2: f32, l3: f32) -> Self {
            // _mm_set_ps takes lanes high to low
            Self(unsafe { _mm_set_ps(l3, l2, l1, l0) })
        }

        #[inline]
        pub fn splat(v: f32) -> Self {
            Self(unsafe { _mm_set1_ps(v) })
        }

        #[inline]
        pub fn to_array(self) -> [f32; 4] {
            let mut out = [0.0f32; 4];
            unsafe { _mm_storeu_ps(out.as_mut_ptr(), self.0) };
            out
        }

        #[inline]
        pub fn add(self, o: Self) -> Self {
            Self(unsafe { _mm_add_ps(self.0, o.0) })
        }

        #[inline]
        pub fn sub(self, o: Self) -> Self {
            Self(unsafe { _mm_sub_ps(self.0, o.0) })
        }

        #[inline]
        pub fn mul(self, o: Self) -> Self {
            Self(unsafe { _mm_mul_ps(self.0, o.0) })
        }

        #[inline]
        pub fn div(self, o: Self) -> Self {
            Self(unsafe { _mm_div_ps(self.0, o.0) })
        }

        #[inline]
        pub fn min(self, o: Self) -> Self {
            Self(unsafe { _mm_min_ps(self.0, o.0) })
        }

        #[inline]
        pub fn max(self, o: Self) -> Self {
            Self(unsafe { _mm_max_ps(self.0, o.0) })
        }

        #[inline]
        pub fn sum(self) -> f32 {
            unsafe {
                // [l1, l0, l3, l2]
                let swapped = _mm_shuffle_ps::<0b10_11_00_01>(self.0, self.0);
                // [l0+l1, l0+l1, l2+l3, l2+l3]
                let pairs = _mm_add_ps(self.0, swapped);
                let high = _mm_movehl_ps(pairs, pairs);
                _mm_cvtss_f32(_mm_add_ss(pairs, high))
            }
        }
    }
}

#[cfg(all(feature = "simd", target_arch = "x86_64"))]
pub use sse::F32x4;

#[cfg(not(all(feature = "simd", target_arch = "x86_64")))]
pub use scalar::F32x4;

/// Name of the backend selected at build time (for startup logging)
pub const BACKEND: &str = if cfg!(all(feature = "simd", target_arch = "x86_64")) {
    "sse"
} else {
    "scalar"
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_sum_order() {
        let v = scalar::F32x4::new(1.0, 2.0, 3.0, 4.0);
        assert_eq!(v.sum(), 10.0);
    }

    #[test]
    fn test_scalar_min_max_nan_takes_second() {
        let a = scalar::F32x4::new(f32::NAN, 1.0, 5.0, -2.0);
        let b = scalar::F32x4::new(3.0, f32::NAN, 4.0, -1.0);
        let min = a.min(b).to_array();
        let max = a.max(b).to_array();
        assert_eq!(min[0], 3.0);
        assert!(min[1].is_nan());
        assert_eq!(min[2], 4.0);
        assert_eq!(max[3], -1.0);
    }

    #[cfg(target_arch = "x86_64")]
    #[test]
    fn test_backends_bit_identical() {
        let samples = [
            [1.0f32, -2.5, 3.25, 0.0],
            [0.1, 0.2, 0.3, 0.4],
            [1.0e-7, 3.0e8, -0.333_333_34, 7.0],
            [f32::NAN, 1.0, -0.0, 0.0],
        ];

        // NaN payloads may differ between folded and runtime division, compare NaN-ness only
        let bits = |a: [f32; 4]| a.map(|l| if l.is_nan() { u32::MAX } else { l.to_bits() });

        for a in samples {
            for b in samples {
                let (sa, sb) = (scalar::F32x4::new(a[0], a[1], a[2], a[3]), scalar::F32x4::new(b[0], b[1], b[2], b[3]));
                let (va, vb) = (sse::F32x4::new(a[0], a[1], a[2], a[3]), sse::F32x4::new(b[0], b[1], b[2], b[3]));

                assert_eq!(bits(sa.add(sb).to_array()), bits(va.add(vb).to_array()));
                assert_eq!(bits(sa.sub(sb).to_array()), bits(va.sub(vb).to_array()));
                assert_eq!(bits(sa.mul(sb).to_array()), bits(va.mul(vb).to_array()));
                assert_eq!(bits(sa.div(sb).to_array()), bits(va.div(vb).to_array()));
                assert_eq!(bits(sa.min(sb).to_array()), bits(va.min(vb).to_array()));
                assert_eq!(bits(sa.max(sb).to_array()), bits(va.max(vb).to_array()));
                assert_eq!(bits([sa.mul(sb).sum(); 4]), bits([va.mul(vb).sum(); 4]));
            }
        }
    }

    #[cfg(target_arch = "x86_64")]
    #[test]
    fn test_sse_lane_order() {
        let v = sse::F32x4::new(1.0, 2.0, 3.0, 4.0);
        assert_eq!(v.to_array(), [1.0, 2.0, 3.0, 4.0]);
        assert_eq!(sse::F32x4::splat(2.0).to_array(), [2.0; 4]);
    }
}
