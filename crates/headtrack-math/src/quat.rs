//! Quaternion and vector primitives.
//!
//! Rotations follow a fixed axis convention:
//!
//! - **yaw** rotates around +Y (up),
//! - **pitch** rotates around +X (right),
//! - **roll** rotates around +Z (forward).
//!
//! [`Quat::from_yaw_pitch_roll`] composes them as `Yaw · Pitch · Roll`.  That
//! order keeps each axis independent of the others at any head orientation;
//! composing in a different order lets roll leak into yaw at high pitch.
//!
//! # Example
//!
//! ```rust
//! use headtrack_math::quat::{Quat, Vec3};
//!
//! let q = Quat::from_yaw_pitch_roll(90.0, 0.0, 0.0);
//! let v = q.rotate(Vec3::FORWARD);
//! assert!((v.x - 1.0).abs() < 1e-5);
//! assert!(v.z.abs() < 1e-5);
//!
//! let back = q.inverse() * q;
//! assert!(back.angle_to(Quat::IDENTITY) < 1e-2);
//! ```

use serde::{Deserialize, Serialize};
use std::ops::{Add, Mul, Neg, Sub};

/// Above this `|dot|` slerp falls back to normalized linear interpolation.
pub const SLERP_LINEAR_THRESHOLD: f32 = 0.9995;

/// Magnitudes below this are treated as degenerate by [`Quat::normalize`].
const NORMALIZE_EPSILON: f32 = 1e-6;

// ────────────────────────────────────────────────────────────────────────────
// Vec3
// ────────────────────────────────────────────────────────────────────────────

/// A 3-D vector.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub const ZERO: Vec3 = Vec3::new(0.0, 0.0, 0.0);
    /// +X
    pub const RIGHT: Vec3 = Vec3::new(1.0, 0.0, 0.0);
    /// +Y
    pub const UP: Vec3 = Vec3::new(0.0, 1.0, 0.0);
    /// +Z
    pub const FORWARD: Vec3 = Vec3::new(0.0, 0.0, 1.0);

    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn dot(self, rhs: Self) -> f32 {
        self.x * rhs.x + self.y * rhs.y + self.z * rhs.z
    }

    pub fn cross(self, rhs: Self) -> Self {
        Self::new(
            self.y * rhs.z - self.z * rhs.y,
            self.z * rhs.x - self.x * rhs.z,
            self.x * rhs.y - self.y * rhs.x,
        )
    }

    pub fn length(self) -> f32 {
        self.dot(self).sqrt()
    }

    /// Unit vector in the same direction.  Vectors shorter than `1e-4` are
    /// returned unchanged.
    pub fn normalized(self) -> Self {
        let len = self.length();
        if len > 1e-4 { self * (1.0 / len) } else { self }
    }

    /// Rotate `self` around the unit `axis` using precomputed `cos`/`sin` of
    /// the angle (Rodrigues' formula).
    pub fn rotate_around_axis(self, axis: Vec3, cos_angle: f32, sin_angle: f32) -> Self {
        let cross = axis.cross(self);
        let dot = axis.dot(self);
        let omc = 1.0 - cos_angle;
        self * cos_angle + cross * sin_angle + axis * (dot * omc)
    }

    /// Rotate `self` around the unit `axis` by `degrees`.
    pub fn rotate_around_axis_deg(self, axis: Vec3, degrees: f32) -> Self {
        let rad = degrees.to_radians();
        self.rotate_around_axis(axis, rad.cos(), rad.sin())
    }
}

impl Add for Vec3 {
    type Output = Vec3;
    fn add(self, rhs: Vec3) -> Vec3 {
        Vec3::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Sub for Vec3 {
    type Output = Vec3;
    fn sub(self, rhs: Vec3) -> Vec3 {
        Vec3::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl Mul<f32> for Vec3 {
    type Output = Vec3;
    fn mul(self, rhs: f32) -> Vec3 {
        Vec3::new(self.x * rhs, self.y * rhs, self.z * rhs)
    }
}

impl Neg for Vec3 {
    type Output = Vec3;
    fn neg(self) -> Vec3 {
        Vec3::new(-self.x, -self.y, -self.z)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Quat
// ────────────────────────────────────────────────────────────────────────────

/// A rotation quaternion stored as `(x, y, z, w)`.
///
/// Every operation except [`Quat::normalize`] assumes unit length.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Quat {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub w: f32,
}

impl Default for Quat {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Quat {
    /// No rotation.
    pub const IDENTITY: Quat = Quat::new(0.0, 0.0, 0.0, 1.0);

    pub const fn new(x: f32, y: f32, z: f32, w: f32) -> Self {
        Self { x, y, z, w }
    }

    /// Rotation of `radians` around the unit `axis`.
    pub fn from_axis_angle(axis: Vec3, radians: f32) -> Self {
        let (s, c) = (radians * 0.5).sin_cos();
        Self::new(axis.x * s, axis.y * s, axis.z * s, c)
    }

    /// Build a rotation from yaw/pitch/roll in degrees as `Yaw · Pitch · Roll`.
    pub fn from_yaw_pitch_roll(yaw: f32, pitch: f32, roll: f32) -> Self {
        let q_yaw = Self::from_axis_angle(Vec3::UP, yaw.to_radians());
        let q_pitch = Self::from_axis_angle(Vec3::RIGHT, pitch.to_radians());
        let q_roll = Self::from_axis_angle(Vec3::FORWARD, roll.to_radians());
        q_yaw * q_pitch * q_roll
    }

    /// Decompose into `(yaw, pitch, roll)` degrees; the exact inverse of
    /// [`Quat::from_yaw_pitch_roll`] for pitch inside `(-90°, 90°)`.
    ///
    /// At the ±90° pitch singularity roll is reported as `0` and the whole
    /// twist is attributed to yaw.
    pub fn to_yaw_pitch_roll(self) -> (f32, f32, f32) {
        let Quat { x, y, z, w } = self;
        let m12 = 2.0 * (y * z - w * x);
        let sin_pitch = (-m12).clamp(-1.0, 1.0);
        let pitch = sin_pitch.asin();

        if sin_pitch.abs() < 0.99999 {
            let m02 = 2.0 * (x * z + w * y);
            let m22 = 1.0 - 2.0 * (x * x + y * y);
            let m10 = 2.0 * (x * y + w * z);
            let m11 = 1.0 - 2.0 * (x * x + z * z);
            (
                m02.atan2(m22).to_degrees(),
                pitch.to_degrees(),
                m10.atan2(m11).to_degrees(),
            )
        } else {
            let m20 = 2.0 * (x * z - w * y);
            let m00 = 1.0 - 2.0 * (y * y + z * z);
            ((-m20).atan2(m00).to_degrees(), pitch.to_degrees(), 0.0)
        }
    }

    pub fn dot(self, rhs: Self) -> f32 {
        self.x * rhs.x + self.y * rhs.y + self.z * rhs.z + self.w * rhs.w
    }

    pub fn length(self) -> f32 {
        self.dot(self).sqrt()
    }

    /// Scale to unit length.  Near-zero (or non-finite) quaternions become
    /// [`Quat::IDENTITY`].
    pub fn normalize(self) -> Self {
        let len = self.length();
        if !len.is_finite() || len < NORMALIZE_EPSILON {
            return Self::IDENTITY;
        }
        let inv = 1.0 / len;
        Self::new(self.x * inv, self.y * inv, self.z * inv, self.w * inv)
    }

    /// Conjugate; equal to the inverse for unit quaternions.
    pub fn inverse(self) -> Self {
        Self::new(-self.x, -self.y, -self.z, self.w)
    }

    /// Rotate `v` by this quaternion using the expanded sandwich product
    /// `v + w·t + q×t` with `t = 2·(q×v)`.
    pub fn rotate(self, v: Vec3) -> Vec3 {
        let q = Vec3::new(self.x, self.y, self.z);
        let t = q.cross(v) * 2.0;
        v + t * self.w + q.cross(t)
    }

    /// Spherical interpolation from `self` (t = 0) to `other` (t = 1) along
    /// the shorter arc.  The result is always unit length.
    pub fn slerp(self, other: Self, t: f32) -> Self {
        let mut end = other;
        let mut dot = self.dot(other);
        if dot < 0.0 {
            end = -end;
            dot = -dot;
        }

        if dot > SLERP_LINEAR_THRESHOLD {
            return Self::new(
                self.x + (end.x - self.x) * t,
                self.y + (end.y - self.y) * t,
                self.z + (end.z - self.z) * t,
                self.w + (end.w - self.w) * t,
            )
            .normalize();
        }

        let theta_0 = dot.min(1.0).acos();
        let theta = theta_0 * t;
        let sin_theta_0 = theta_0.sin();
        let s0 = (theta_0 - theta).sin() / sin_theta_0;
        let s1 = theta.sin() / sin_theta_0;

        Self::new(
            s0 * self.x + s1 * end.x,
            s0 * self.y + s1 * end.y,
            s0 * self.z + s1 * end.z,
            s0 * self.w + s1 * end.w,
        )
        .normalize()
    }

    /// Angle in degrees between two rotations (shorter arc).
    pub fn angle_to(self, other: Self) -> f32 {
        let dot = self.dot(other).abs().min(1.0);
        (2.0 * dot.acos()).to_degrees()
    }
}

/// Hamilton product: `a * b` applies `b` first, then `a`.
impl Mul for Quat {
    type Output = Quat;
    fn mul(self, rhs: Quat) -> Quat {
        Quat::new(
            self.w * rhs.x + self.x * rhs.w + self.y * rhs.z - self.z * rhs.y,
            self.w * rhs.y - self.x * rhs.z + self.y * rhs.w + self.z * rhs.x,
            self.w * rhs.z + self.x * rhs.y - self.y * rhs.x + self.z * rhs.w,
            self.w * rhs.w - self.x * rhs.x - self.y * rhs.y - self.z * rhs.z,
        )
    }
}

impl Neg for Quat {
    type Output = Quat;
    fn neg(self) -> Quat {
        Quat::new(-self.x, -self.y, -self.z, -self.w)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
