//! [`CenterOffsetManager`] – reference orientation for recentering.
//!
//! The center is stored both as yaw/pitch/roll and as a quaternion so that
//! either offset path can be applied:
//!
//! - [`CenterOffsetManager::apply_offset`] subtracts angles component-wise.
//!   Cheap, and exact as long as only one axis is involved.
//! - [`CenterOffsetManager::apply_offset_quat`] computes `center⁻¹ · q`,
//!   which stays correct for any combination of axes.
//!
//! Until a center is set both paths are pass-throughs.
//!
//! # Example
//!
//! ```rust
//! use headtrack_processing::center::CenterOffsetManager;
//! use headtrack_types::Pose;
//!
//! let mut center = CenterOffsetManager::new();
//! center.set_center(&Pose::new(10.0, 5.0, 2.0, 1));
//!
//! let out = center.apply_offset(&Pose::new(30.0, 20.0, 10.0, 7));
//! assert_eq!(out, Pose::new(20.0, 15.0, 8.0, 7));
//! ```

use headtrack_math::Quat;
use headtrack_math::angle::normalize_angle;
use headtrack_types::Pose;

#[derive(Debug, Clone, Default)]
pub struct CenterOffsetManager {
    /// Center as angles; `timestamp_us` is always `0`.
    center_pose: Pose,
    center_rotation: Quat,
    has_valid_center: bool,
}

impl CenterOffsetManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_valid_center(&self) -> bool {
        self.has_valid_center
    }

    /// Center angles (zero when unset).
    pub fn center_pose(&self) -> Pose {
        self.center_pose
    }

    /// Center rotation ([`Quat::IDENTITY`] when unset).
    pub fn center_rotation(&self) -> Quat {
        self.center_rotation
    }

    /// Use the angles of `pose` as the new center.
    pub fn set_center(&mut self, pose: &Pose) {
        self.set_center_components(pose.yaw, pose.pitch, pose.roll);
    }

    pub fn set_center_components(&mut self, yaw: f32, pitch: f32, roll: f32) {
        self.center_pose = Pose::new(yaw, pitch, roll, 0);
        self.center_rotation = Quat::from_yaw_pitch_roll(yaw, pitch, roll);
        self.has_valid_center = true;
        tracing::debug!(yaw, pitch, roll, "Center set");
    }

    pub fn set_center_rotation(&mut self, rotation: Quat) {
        let rotation = rotation.normalize();
        let (yaw, pitch, roll) = rotation.to_yaw_pitch_roll();
        self.center_pose = Pose::new(yaw, pitch, roll, 0);
        self.center_rotation = rotation;
        self.has_valid_center = true;
        tracing::debug!(yaw, pitch, roll, "Center set from rotation");
    }

    /// Euler subtraction of the center from `pose`, wrapped into ±180°.
    /// Invalid poses pass through.
    pub fn apply_offset(&self, pose: &Pose) -> Pose {
        if !self.has_valid_center || !pose.is_valid() {
            return *pose;
        }
        Pose::new(
            normalize_angle(pose.yaw - self.center_pose.yaw),
            normalize_angle(pose.pitch - self.center_pose.pitch),
            normalize_angle(pose.roll - self.center_pose.roll),
            pose.timestamp_us,
        )
    }

    /// `center⁻¹ · rotation`.
    pub fn apply_offset_quat(&self, rotation: Quat) -> Quat {
        if !self.has_valid_center {
            return rotation;
        }
        (self.center_rotation.inverse() * rotation).normalize()
    }

    /// Fold an incremental rotation into the existing center
    /// (`center ← center · delta`).  Without a center, `delta` becomes it.
    pub fn compose_additional_offset(&mut self, delta: Quat) {
        if !self.has_valid_center {
            self.set_center_rotation(delta);
            return;
        }
        self.set_center_rotation(self.center_rotation * delta);
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unset_center_is_passthrough() {
        let mgr = CenterOffsetManager::new();
        assert!(!mgr.has_valid_center());
        let pose = Pose::new(30.0, 20.0, 10.0, 5);
        assert_eq!(mgr.apply_offset(&pose), pose);
        let q = Quat::from_yaw_pitch_roll(30.0, 20.0, 10.0);
        assert_eq!(mgr.apply_offset_quat(q), q);
    }

    #[test]
    fn euler_offset_is_exact() {
        let mut mgr = CenterOffsetManager::new();
        mgr.set_center_components(10.0, 5.0, 2.0);
        let out = mgr.apply_offset(&Pose::new(30.0, 20.0, 10.0, 11));
        assert_eq!(out, Pose::new(20.0, 15.0, 8.0, 11));
    }

    #[test]
    fn euler_offset_wraps_across_seam() {
        let mut mgr = CenterOffsetManager::new();
        mgr.set_center_components(170.0, 0.0, 0.0);
        let out = mgr.apply_offset(&Pose::new(-170.0, 0.0, 0.0, 1));
        assert!((out.yaw - 20.0).abs() < 1e-4);
    }

    #[test]
    fn invalid_pose_is_not_offset() {
        let mut mgr = CenterOffsetManager::new();
        mgr.set_center_components(10.0, 0.0, 0.0);
        let invalid = Pose::new(30.0, 0.0, 0.0, 0);
        assert_eq!(mgr.apply_offset(&invalid), invalid);
    }

    #[test]
    fn quat_offset_cancels_center() {
        let mut mgr = CenterOffsetManager::new();
        mgr.set_center_components(25.0, -40.0, 15.0);
        let q = Quat::from_yaw_pitch_roll(25.0, -40.0, 15.0);
        assert!(mgr.apply_offset_quat(q).angle_to(Quat::IDENTITY) < 1e-2);
    }

    #[test]
    fn quat_and_euler_paths_agree_on_single_axis() {
        let mut mgr = CenterOffsetManager::new();
        mgr.set_center_components(0.0, 12.0, 0.0);
        let pose = Pose::new(0.0, 40.0, 0.0, 1);
        let euler = mgr.apply_offset(&pose);
        let quat = mgr.apply_offset_quat(Quat::from_yaw_pitch_roll(0.0, 40.0, 0.0));
        let from_euler = Quat::from_yaw_pitch_roll(euler.yaw, euler.pitch, euler.roll);
        assert!(quat.angle_to(from_euler) < 1e-2);
    }

    #[test]
    fn compose_additional_offset_nudges_center() {
        let mut mgr = CenterOffsetManager::new();
        mgr.set_center_components(20.0, 0.0, 0.0);
        mgr.compose_additional_offset(Quat::from_yaw_pitch_roll(5.0, 0.0, 0.0));
        let center = mgr.center_pose();
        assert!((center.yaw - 25.0).abs() < 1e-3);
        assert_eq!(center.timestamp_us, 0);
    }

    #[test]
    fn compose_without_center_sets_it() {
        let mut mgr = CenterOffsetManager::new();
        let q = Quat::from_yaw_pitch_roll(0.0, 0.0, 30.0);
        mgr.compose_additional_offset(q);
        assert!(mgr.has_valid_center());
        assert!(mgr.center_rotation().angle_to(q) < 1e-3);
    }

    #[test]
    fn reset_clears_center() {
        let mut mgr = CenterOffsetManager::new();
        mgr.set_center_components(1.0, 2.0, 3.0);
        mgr.reset();
        assert!(!mgr.has_valid_center());
        assert_eq!(mgr.center_rotation(), Quat::IDENTITY);
    }
}
