//! [`AimDecoupler`] – keep aiming independent of head motion.
//!
//! Head tracking rotates the camera, but the weapon should keep pointing
//! where the game's own view direction points.  Two formulations:
//!
//! - [`AimDecoupler::aim_direction`]: the aim direction expressed in the
//!   head-rotated camera's local frame, `tracking⁻¹ · forward`.
//! - [`AimDecoupler::aim_rotation`]: given a combined view rotation
//!   `view = base · tracking`, recover `base` as `view · tracking⁻¹`.

use headtrack_math::{Quat, Vec3};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AimDecoupler {
    forward: Vec3,
}

impl Default for AimDecoupler {
    fn default() -> Self {
        Self {
            forward: Vec3::FORWARD,
        }
    }
}

impl AimDecoupler {
    /// `forward` is normalized; a zero vector falls back to +Z.
    pub fn new(forward: Vec3) -> Self {
        if forward.length() < 1e-4 {
            return Self::default();
        }
        Self {
            forward: forward.normalized(),
        }
    }

    pub fn forward(&self) -> Vec3 {
        self.forward
    }

    /// Aim direction in the tracked camera's local frame.
    pub fn aim_direction(&self, tracking: Quat) -> Vec3 {
        tracking.inverse().rotate(self.forward)
    }

    /// Same as [`AimDecoupler::aim_direction`] from yaw/pitch/roll degrees,
    /// undoing yaw, pitch and roll in turn about the fixed world axes.
    pub fn aim_direction_from_angles(&self, yaw: f32, pitch: f32, roll: f32) -> Vec3 {
        self.forward
            .rotate_around_axis_deg(Vec3::UP, -yaw)
            .rotate_around_axis_deg(Vec3::RIGHT, -pitch)
            .rotate_around_axis_deg(Vec3::FORWARD, -roll)
    }

    /// Base view rotation with the tracking contribution removed.
    pub fn aim_rotation(&self, view: Quat, tracking: Quat) -> Quat {
        (view * tracking.inverse()).normalize()
    }

    /// World-space aim direction for a combined `view` rotation.
    pub fn aim_forward(&self, view: Quat, tracking: Quat) -> Vec3 {
        self.aim_rotation(view, tracking).rotate(self.forward)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: Vec3, b: Vec3) -> bool {
        (a - b).length() < 1e-4
    }

    #[test]
    fn identity_tracking_aims_forward() {
        let aim = AimDecoupler::default();
        assert!(close(aim.aim_direction(Quat::IDENTITY), Vec3::FORWARD));
    }

    #[test]
    fn looking_right_moves_aim_left_in_camera_frame() {
        let aim = AimDecoupler::default();
        let dir = aim.aim_direction(Quat::from_yaw_pitch_roll(90.0, 0.0, 0.0));
        assert!(close(dir, Vec3::new(-1.0, 0.0, 0.0)));
    }

    #[test]
    fn scalar_and_quaternion_forms_agree() {
        let aim = AimDecoupler::default();
        for &(yaw, pitch, roll) in &[(30.0, 20.0, 10.0), (-75.0, -40.0, 25.0), (120.0, 5.0, -60.0)] {
            let q = aim.aim_direction(Quat::from_yaw_pitch_roll(yaw, pitch, roll));
            let s = aim.aim_direction_from_angles(yaw, pitch, roll);
            assert!(close(q, s), "({yaw}, {pitch}, {roll}): {q:?} vs {s:?}");
        }
    }

    #[test]
    fn aim_ignores_tracking_contribution() {
        let aim = AimDecoupler::default();
        let base = Quat::from_yaw_pitch_roll(40.0, -15.0, 0.0);
        let tracking = Quat::from_yaw_pitch_roll(-25.0, 30.0, 8.0);
        let view = base * tracking;
        assert!(close(aim.aim_forward(view, tracking), base.rotate(Vec3::FORWARD)));
        assert!(aim.aim_rotation(view, tracking).angle_to(base) < 1e-2);
    }

    #[test]
    fn zero_forward_falls_back() {
        assert_eq!(AimDecoupler::new(Vec3::ZERO), AimDecoupler::default());
    }
}
