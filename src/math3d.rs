//! Vector and matrix math for the 3D pipeline
//!
//! Matrices are column-major `[f32; 16]` (element `m[col * 4 + row]`), the
//! layout shared by the mesh pipeline and the command surface.

use std::ops::{Add, Mul, Neg, Sub};

use serde::{Deserialize, Serialize};

/// Lengths at or below this are treated as zero by `normalize`
const NORMALIZE_EPS: f32 = 1e-8;

// ============================================================================
// Vectors
// ============================================================================

/// 2D vector, used for screen positions and texture coordinates
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    #[inline]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// 3D vector
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    #[inline]
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    #[inline]
    pub fn dot(self, o: Self) -> f32 {
        self.x * o.x + self.y * o.y + self.z * o.z
    }

    #[inline]
    pub fn cross(self, o: Self) -> Self {
        Self::new(
            self.y * o.z - self.z * o.y,
            self.z * o.x - self.x * o.z,
            self.x * o.y - self.y * o.x,
        )
    }

    #[inline]
    pub fn length(self) -> f32 {
        self.dot(self).sqrt()
    }

    /// Unit vector in the same direction; near-zero vectors become zero
    #[inline]
    pub fn normalize(self) -> Self {
        let len = self.length();
        if len <= NORMALIZE_EPS {
            Self::default()
        } else {
            self * (1.0 / len)
        }
    }

    /// Extend to homogeneous coordinates
    #[inline]
    pub fn extend(self, w: f32) -> Vec4 {
        Vec4::new(self.x, self.y, self.z, w)
    }

    pub fn approx_eq(self, o: Self, epsilon: f32) -> bool {
        (self.x - o.x).abs() < epsilon && (self.y - o.y).abs() < epsilon && (self.z - o.z).abs() < epsilon
    }
}

/// Homogeneous 4D vector (clip space)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec4 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub w: f32,
}

impl Vec4 {
    #[inline]
    pub const fn new(x: f32, y: f32, z: f32, w: f32) -> Self {
        Self { x, y, z, w }
    }
}

macro_rules! impl_vec_ops {
    ($t:ident { $($f:ident),+ }) => {
        impl Add for $t {
            type Output = Self;
            #[inline]
            fn add(self, o: Self) -> Self {
                Self { $($f: self.$f + o.$f),+ }
            }
        }

        impl Sub for $t {
            type Output = Self;
            #[inline]
            fn sub(self, o: Self) -> Self {
                Self { $($f: self.$f - o.$f),+ }
            }
        }

        impl Neg for $t {
            type Output = Self;
            #[inline]
            fn neg(self) -> Self {
                Self { $($f: -self.$f),+ }
            }
        }

        impl Mul<f32> for $t {
            type Output = Self;
            #[inline]
            fn mul(self, s: f32) -> Self {
                Self { $($f: self.$f * s),+ }
            }
        }
    };
}

impl_vec_ops!(Vec2 { x, y });
impl_vec_ops!(Vec3 { x, y, z });
impl_vec_ops!(Vec4 { x, y, z, w });

// ============================================================================
// Mat4
// ============================================================================

/// 4x4 column-major matrix
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Mat4 {
    pub m: [f32; 16],
}

impl Default for Mat4 {
    fn default() -> Self {
        Self::identity()
    }
}

impl Mat4 {
    #[rustfmt::skip]
    pub const IDENTITY: Self = Self {
        m: [
            1.0, 0.0, 0.0, 0.0,
            0.0, 1.0, 0.0, 0.0,
            0.0, 0.0, 1.0, 0.0,
            0.0, 0.0, 0.0, 1.0,
        ],
    };

    #[inline]
    pub const fn identity() -> Self {
        Self::IDENTITY
    }

    #[inline]
    pub const fn from_cols_array(m: [f32; 16]) -> Self {
        Self { m }
    }

    #[inline]
    pub fn to_cols_array(&self) -> [f32; 16] {
        self.m
    }

    /// Matrix product `a * b` (b is applied first)
    pub fn mul(a: &Mat4, b: &Mat4) -> Mat4 {
        let mut r = [0.0f32; 16];
        for c in 0..4 {
            for row in 0..4 {
                r[c * 4 + row] = (0..4).map(|k| a.m[k * 4 + row] * b.m[c * 4 + k]).sum();
            }
        }
        Mat4 { m: r }
    }

    /// Apply to a homogeneous vector
    pub fn transform(&self, v: Vec4) -> Vec4 {
        let m = &self.m;
        Vec4::new(
            m[0] * v.x + m[4] * v.y + m[8] * v.z + m[12] * v.w,
            m[1] * v.x + m[5] * v.y + m[9] * v.z + m[13] * v.w,
            m[2] * v.x + m[6] * v.y + m[10] * v.z + m[14] * v.w,
            m[3] * v.x + m[7] * v.y + m[11] * v.z + m[15] * v.w,
        )
    }

    pub fn translate(t: Vec3) -> Mat4 {
        let mut r = Self::IDENTITY;
        r.m[12] = t.x;
        r.m[13] = t.y;
        r.m[14] = t.z;
        r
    }

    pub fn scale(s: Vec3) -> Mat4 {
        let mut r = Self::IDENTITY;
        r.m[0] = s.x;
        r.m[5] = s.y;
        r.m[10] = s.z;
        r
    }

    pub fn rotate_x(rad: f32) -> Mat4 {
        let (s, c) = rad.sin_cos();
        let mut r = Self::IDENTITY;
        r.m[5] = c;
        r.m[9] = -s;
        r.m[6] = s;
        r.m[10] = c;
        r
    }

    pub fn rotate_y(rad: f32) -> Mat4 {
        let (s, c) = rad.sin_cos();
        let mut r = Self::IDENTITY;
        r.m[0] = c;
        r.m[8] = s;
        r.m[2] = -s;
        r.m[10] = c;
        r
    }

    pub fn rotate_z(rad: f32) -> Mat4 {
        let (s, c) = rad.sin_cos();
        let mut r = Self::IDENTITY;
        r.m[0] = c;
        r.m[4] = -s;
        r.m[1] = s;
        r.m[5] = c;
        r
    }

    /// OpenGL-style perspective projection, depth mapped to NDC [-1, 1]
    pub fn perspective(fovy_rad: f32, aspect: f32, near: f32, far: f32) -> Mat4 {
        let f = 1.0 / (fovy_rad * 0.5).tan();
        let mut r = Mat4 { m: [0.0; 16] };
        r.m[0] = f / aspect;
        r.m[5] = f;
        r.m[10] = (far + near) / (near - far);
        r.m[11] = -1.0;
        r.m[14] = (2.0 * far * near) / (near - far);
        r
    }

    /// Right-handed view matrix looking from `eye` toward `target`
    pub fn look_at(eye: Vec3, target: Vec3, up: Vec3) -> Mat4 {
        let f = (target - eye).normalize();
        let s = f.cross(up).normalize();
        let u = s.cross(f);

        let mut r = Self::IDENTITY;
        r.m[0] = s.x;
        r.m[4] = s.y;
        r.m[8] = s.z;
        r.m[1] = u.x;
        r.m[5] = u.y;
        r.m[9] = u.z;
        r.m[2] = -f.x;
        r.m[6] = -f.y;
        r.m[10] = -f.z;
        r.m[12] = -s.dot(eye);
        r.m[13] = -u.dot(eye);
        r.m[14] = f.dot(eye);
        r
    }
}

impl Mul for Mat4 {
    type Output = Mat4;
    #[inline]
    fn mul(self, rhs: Mat4) -> Mat4 {
        Mat4::mul(&self, &rhs)
    }
}

impl Mul<Vec4> for Mat4 {
    type Output = Vec4;
    #[inline]
    fn mul(self, v: Vec4) -> Vec4 {
        self.transform(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-5;

    fn approx4(a: Vec4, b: Vec4) -> bool {
        (a.x - b.x).abs() < EPS && (a.y - b.y).abs() < EPS && (a.z - b.z).abs() < EPS && (a.w - b.w).abs() < EPS
    }

    #[test]
    fn test_normalize_zero_is_zero() {
        assert_eq!(Vec3::default().normalize(), Vec3::default());
        let n = Vec3::new(3.0, 0.0, 4.0).normalize();
        assert!((n.length() - 1.0).abs() < EPS);
    }

    #[test]
    fn test_cross_right_handed() {
        let z = Vec3::new(1.0, 0.0, 0.0).cross(Vec3::new(0.0, 1.0, 0.0));
        assert!(z.approx_eq(Vec3::new(0.0, 0.0, 1.0), EPS));
    }

    #[test]
    fn test_identity_is_neutral() {
        let t = Mat4::translate(Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(Mat4::identity() * t, t);
        assert_eq!(t * Mat4::identity(), t);
    }

    #[test]
    fn test_translate_column_major() {
        let t = Mat4::translate(Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(&t.m[12..15], &[1.0, 2.0, 3.0]);
        let p = t * Vec4::new(0.0, 0.0, 0.0, 1.0);
        assert!(approx4(p, Vec4::new(1.0, 2.0, 3.0, 1.0)));
    }

    #[test]
    fn test_mul_applies_right_first() {
        let m = Mat4::translate(Vec3::new(10.0, 0.0, 0.0)) * Mat4::scale(Vec3::new(2.0, 2.0, 2.0));
        let p = m * Vec4::new(1.0, 0.0, 0.0, 1.0);
        assert!(approx4(p, Vec4::new(12.0, 0.0, 0.0, 1.0)));
    }

    #[test]
    fn test_rotate_z_quarter_turn() {
        let r = Mat4::rotate_z(std::f32::consts::FRAC_PI_2);
        let p = r * Vec4::new(1.0, 0.0, 0.0, 1.0);
        assert!(approx4(p, Vec4::new(0.0, 1.0, 0.0, 1.0)));
    }

    #[test]
    fn test_rotate_x_and_y() {
        let half_pi = std::f32::consts::FRAC_PI_2;
        let p = Mat4::rotate_x(half_pi) * Vec4::new(0.0, 1.0, 0.0, 1.0);
        assert!(approx4(p, Vec4::new(0.0, 0.0, 1.0, 1.0)));
        let p = Mat4::rotate_y(half_pi) * Vec4::new(0.0, 0.0, 1.0, 1.0);
        assert!(approx4(p, Vec4::new(1.0, 0.0, 0.0, 1.0)));
    }

    #[test]
    fn test_perspective_maps_near_far() {
        let p = Mat4::perspective(1.0, 1.0, 0.5, 10.0);
        assert_eq!(p.m[11], -1.0);
        let near = p * Vec4::new(0.0, 0.0, -0.5, 1.0);
        let far = p * Vec4::new(0.0, 0.0, -10.0, 1.0);
        assert!((near.z / near.w + 1.0).abs() < EPS);
        assert!((far.z / far.w - 1.0).abs() < 1e-4);
    }

    #[test]
    fn test_look_at_moves_eye_to_origin() {
        let eye = Vec3::new(0.0, 0.0, 5.0);
        let v = Mat4::look_at(eye, Vec3::default(), Vec3::new(0.0, 1.0, 0.0));
        let p = v * eye.extend(1.0);
        assert!(approx4(p, Vec4::new(0.0, 0.0, 0.0, 1.0)));
        // target lands on the -Z axis
        let t = v * Vec4::new(0.0, 0.0, 0.0, 1.0);
        assert!(approx4(t, Vec4::new(0.0, 0.0, -5.0, 1.0)));
    }
}
