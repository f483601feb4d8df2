//! [`SmoothedRotation`] – exponential rotation smoothing state.

use headtrack_math::Quat;
use headtrack_math::smoothing::calculate_smoothing_factor;

/// A smoothed rotation plus an "initialized" flag.
///
/// The first update snaps to its target; later updates slerp toward it by a
/// frame-rate independent factor.
#[derive(Debug, Clone, Copy, Default)]
pub struct SmoothedRotation {
    rotation: Quat,
    initialized: bool,
}

impl SmoothedRotation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rotation(&self) -> Quat {
        self.rotation
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Move toward `target` using the user-facing `smoothing` knob.
    pub fn update(&mut self, target: Quat, smoothing: f32, dt: f32) -> Quat {
        let t = calculate_smoothing_factor(smoothing, dt);
        self.blend_toward(target, t)
    }

    /// Move toward `target` by an explicit interpolation factor `t ∈ [0, 1]`.
    pub fn blend_toward(&mut self, target: Quat, t: f32) -> Quat {
        if !self.initialized {
            return self.snap_to(target);
        }
        self.rotation = self.rotation.slerp(target, t.clamp(0.0, 1.0));
        self.rotation
    }

    /// Slerp toward [`Quat::IDENTITY`] by `t`.
    pub fn fade_toward_identity(&mut self, t: f32) -> Quat {
        if self.initialized {
            self.rotation = self.rotation.slerp(Quat::IDENTITY, t.clamp(0.0, 1.0));
        }
        self.rotation
    }

    pub fn snap_to(&mut self, rotation: Quat) -> Quat {
        self.rotation = rotation.normalize();
        self.initialized = true;
        self.rotation
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_update_snaps() {
        let mut s = SmoothedRotation::new();
        let target = Quat::from_yaw_pitch_roll(60.0, 10.0, 0.0);
        let out = s.update(target, 0.9, 1.0 / 60.0);
        assert!(out.angle_to(target) < 1e-3);
        assert!(s.is_initialized());
    }

    #[test]
    fn converges_without_overshoot() {
        let mut s = SmoothedRotation::new();
        s.snap_to(Quat::from_yaw_pitch_roll(-60.0, 30.0, 10.0));
        let target = Quat::from_yaw_pitch_roll(45.0, -20.0, 5.0);
        let mut previous = s.rotation().angle_to(target);
        for _ in 0..120 {
            let remaining = s.update(target, 0.5, 1.0 / 60.0).angle_to(target);
            assert!(remaining <= previous + 1e-3, "overshoot: {remaining} > {previous}");
            previous = remaining;
        }
        assert!(previous < 2.0, "still {previous}° away");
    }

    #[test]
    fn zero_dt_holds_still() {
        let mut s = SmoothedRotation::new();
        let start = Quat::from_yaw_pitch_roll(10.0, 0.0, 0.0);
        s.snap_to(start);
        s.update(Quat::from_yaw_pitch_roll(80.0, 0.0, 0.0), 0.5, 0.0);
        assert!(s.rotation().angle_to(start) < 1e-3);
    }

    #[test]
    fn fade_reaches_identity() {
        let mut s = SmoothedRotation::new();
        s.snap_to(Quat::from_yaw_pitch_roll(30.0, 30.0, 30.0));
        s.fade_toward_identity(1.0);
        assert!(s.rotation().angle_to(Quat::IDENTITY) < 1e-3);
    }

    #[test]
    fn reset_forces_next_snap() {
        let mut s = SmoothedRotation::new();
        s.snap_to(Quat::from_yaw_pitch_roll(30.0, 0.0, 0.0));
        s.reset();
        assert!(!s.is_initialized());
        let target = Quat::from_yaw_pitch_roll(-90.0, 0.0, 0.0);
        assert!(s.update(target, 1.0, 1.0 / 60.0).angle_to(target) < 1e-3);
    }
}
