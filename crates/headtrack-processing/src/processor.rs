//! [`TrackingProcessor`] – per-frame shaping of a raw pose.
//!
//! Stage order for a valid pose:
//!
//! 1. sensitivity multipliers and inversion,
//! 2. subtractive deadzone per axis,
//! 3. centering (Euler subtraction when only one axis is involved,
//!    quaternion `center⁻¹ · q` otherwise),
//! 4. quaternion smoothing, with the remote-source smoothing floor.
//!
//! The output pose is decomposed from the smoothed rotation and keeps the
//! raw pose's timestamp.  Invalid poses pass through untouched.

use headtrack_math::Quat;
use headtrack_math::deadzone::apply_deadzone;
use headtrack_math::smoothing::effective_smoothing;
use headtrack_types::{DeadzoneSettings, Pose, SensitivitySettings};

use crate::center::CenterOffsetManager;
use crate::smoothing::SmoothedRotation;

/// Angles below this magnitude count as "not involved" when choosing the
/// centering path.
const AXIS_EPSILON: f32 = 1e-4;

#[derive(Debug, Clone)]
pub struct TrackingProcessor {
    center: CenterOffsetManager,
    smoothed: SmoothedRotation,
    sensitivity: SensitivitySettings,
    deadzone: DeadzoneSettings,
    smoothing: f32,
    last_output: Pose,
}

impl Default for TrackingProcessor {
    fn default() -> Self {
        Self::new(0.0, SensitivitySettings::default(), DeadzoneSettings::none())
    }
}

impl TrackingProcessor {
    pub fn new(smoothing: f32, sensitivity: SensitivitySettings, deadzone: DeadzoneSettings) -> Self {
        Self {
            center: CenterOffsetManager::new(),
            smoothed: SmoothedRotation::new(),
            sensitivity,
            deadzone,
            smoothing,
            last_output: Pose::invalid(),
        }
    }

    // ── Settings ────────────────────────────────────────────────────────────

    pub fn smoothing(&self) -> f32 {
        self.smoothing
    }

    pub fn set_smoothing(&mut self, smoothing: f32) {
        self.smoothing = smoothing;
    }

    pub fn sensitivity(&self) -> SensitivitySettings {
        self.sensitivity
    }

    pub fn set_sensitivity(&mut self, sensitivity: SensitivitySettings) {
        self.sensitivity = sensitivity;
    }

    pub fn deadzone(&self) -> DeadzoneSettings {
        self.deadzone
    }

    pub fn set_deadzone(&mut self, deadzone: DeadzoneSettings) {
        self.deadzone = deadzone;
    }

    // ── State ───────────────────────────────────────────────────────────────

    pub fn center_manager(&self) -> &CenterOffsetManager {
        &self.center
    }

    pub fn center_manager_mut(&mut self) -> &mut CenterOffsetManager {
        &mut self.center
    }

    /// Current smoothed rotation.
    pub fn rotation(&self) -> Quat {
        self.smoothed.rotation()
    }

    /// Last pose produced by [`TrackingProcessor::process`] (invalid before
    /// the first frame and after [`TrackingProcessor::reset`]).
    pub fn last_output(&self) -> Pose {
        self.last_output
    }

    // ── Per-frame ───────────────────────────────────────────────────────────

    /// Shape one raw pose.  `is_remote` raises the smoothing floor for
    /// network sources; `dt` is the frame time in seconds.
    pub fn process(&mut self, raw: &Pose, is_remote: bool, dt: f32) -> Pose {
        if !raw.is_valid() {
            return *raw;
        }
        let target = self.target_rotation(raw);
        let smoothing = effective_smoothing(self.smoothing, is_remote);
        let rotation = self.smoothed.update(target, smoothing, dt);
        self.emit(rotation, raw.timestamp_us)
    }

    /// Like [`TrackingProcessor::process`] but with an explicit blend
    /// factor `t` in place of the smoothing setting.
    pub fn process_with_factor(&mut self, raw: &Pose, t: f32) -> Pose {
        if !raw.is_valid() {
            return *raw;
        }
        let target = self.target_rotation(raw);
        let rotation = self.smoothed.blend_toward(target, t);
        self.emit(rotation, raw.timestamp_us)
    }

    /// Drift the smoothed rotation toward neutral by `t`.
    pub fn fade_toward_identity(&mut self, t: f32) -> Pose {
        let rotation = self.smoothed.fade_toward_identity(t);
        let timestamp = self.last_output.timestamp_us;
        if timestamp == 0 {
            return Pose::invalid();
        }
        self.emit(rotation, timestamp)
    }

    // ── Recentering ─────────────────────────────────────────────────────────

    /// Make the current smoothed orientation the new neutral.  The smoothed
    /// state is kept, so the view glides back to center.
    pub fn recenter(&mut self) {
        let current = self.smoothed.rotation();
        self.center.compose_additional_offset(current);
        let center = self.center.center_pose();
        tracing::info!(yaw = center.yaw, pitch = center.pitch, roll = center.roll, "Recentered");
    }

    /// Use `pose` as the neutral orientation directly.  The next processed
    /// frame snaps instead of smoothing across the discontinuity.
    pub fn recenter_to(&mut self, pose: &Pose) {
        self.center.set_center(pose);
        self.smoothed.reset();
        tracing::info!(yaw = pose.yaw, pitch = pose.pitch, roll = pose.roll, "Recentered to pose");
    }

    /// Clear the center and the smoothing state.
    pub fn reset(&mut self) {
        self.center.reset();
        self.smoothed.reset();
        self.last_output = Pose::invalid();
        tracing::debug!("Tracking processor reset");
    }

    // ── Internals ───────────────────────────────────────────────────────────

    fn target_rotation(&self, raw: &Pose) -> Quat {
        let s = &self.sensitivity;
        let signed = |value: f32, gain: f32, invert: bool| {
            let v = value * gain;
            if invert { -v } else { v }
        };
        let shaped = Pose::new(
            apply_deadzone(signed(raw.yaw, s.yaw, s.invert_yaw), self.deadzone.yaw),
            apply_deadzone(signed(raw.pitch, s.pitch, s.invert_pitch), self.deadzone.pitch),
            apply_deadzone(signed(raw.roll, s.roll, s.invert_roll), self.deadzone.roll),
            raw.timestamp_us,
        );

        if !self.center.has_valid_center() {
            return Quat::from_yaw_pitch_roll(shaped.yaw, shaped.pitch, shaped.roll);
        }
        if single_axis_centering(&self.center.center_pose(), &shaped) {
            let centered = self.center.apply_offset(&shaped);
            return Quat::from_yaw_pitch_roll(centered.yaw, centered.pitch, centered.roll);
        }
        self.center
            .apply_offset_quat(Quat::from_yaw_pitch_roll(shaped.yaw, shaped.pitch, shaped.roll))
    }

    fn emit(&mut self, rotation: Quat, timestamp_us: i64) -> Pose {
        let (yaw, pitch, roll) = rotation.to_yaw_pitch_roll();
        self.last_output = Pose::new(yaw, pitch, roll, timestamp_us);
        self.last_output
    }
}

/// Euler subtraction is only exact when the center touches at most one axis
/// and the pose moves on no other axis.
fn single_axis_centering(center: &Pose, pose: &Pose) -> bool {
    let involved = |p: &Pose| {
        [
            p.yaw.abs() > AXIS_EPSILON,
            p.pitch.abs() > AXIS_EPSILON,
            p.roll.abs() > AXIS_EPSILON,
        ]
    };
    let c = involved(center);
    let p = involved(pose);
    c.iter().filter(|&&on| on).count() <= 1 && (0..3).all(|i| !p[i] || c[i])
}

#[cfg(test)]
mod tests {
    use super::*;

    const FRAME: f32 = 1.0 / 60.0;
    const EPS: f32 = 1e-2;

    fn assert_angles(pose: Pose, yaw: f32, pitch: f32, roll: f32) {
        assert!(
            (pose.yaw - yaw).abs() < EPS && (pose.pitch - pitch).abs() < EPS && (pose.roll - roll).abs() < EPS,
            "expected ({yaw}, {pitch}, {roll}), got ({}, {}, {})",
            pose.yaw,
            pose.pitch,
            pose.roll
        );
    }

    // ── Shaping ─────────────────────────────────────────────────────────────

    #[test]
    fn unsmoothed_pose_passes_through() {
        let mut proc = TrackingProcessor::default();
        let out = proc.process(&Pose::new(30.0, 20.0, 10.0, 5), false, FRAME);
        assert_angles(out, 30.0, 20.0, 10.0);
        assert_eq!(out.timestamp_us, 5);
    }

    #[test]
    fn invalid_pose_is_untouched() {
        let mut proc = TrackingProcessor::default();
        let invalid = Pose::new(30.0, 0.0, 0.0, 0);
        assert_eq!(proc.process(&invalid, false, FRAME), invalid);
        assert!(!proc.last_output().is_valid());
    }

    #[test]
    fn sensitivity_and_inversion() {
        let sensitivity = SensitivitySettings {
            yaw: 2.0,
            invert_pitch: true,
            ..SensitivitySettings::default()
        };
        let mut proc = TrackingProcessor::new(0.0, sensitivity, DeadzoneSettings::none());
        let out = proc.process(&Pose::new(10.0, 15.0, 0.0, 1), false, FRAME);
        assert_angles(out, 20.0, -15.0, 0.0);
    }

    #[test]
    fn deadzone_suppresses_small_motion() {
        let mut proc = TrackingProcessor::new(0.0, SensitivitySettings::default(), DeadzoneSettings::uniform(1.0));
        assert_angles(proc.process(&Pose::new(0.5, -0.5, 0.2, 1), false, FRAME), 0.0, 0.0, 0.0);
        assert_angles(proc.process(&Pose::new(11.0, 0.0, 0.0, 2), false, FRAME), 10.0, 0.0, 0.0);
    }

    #[test]
    fn smoothing_lags_behind_jump() {
        let mut proc = TrackingProcessor::new(0.8, SensitivitySettings::default(), DeadzoneSettings::none());
        proc.process(&Pose::new(0.0, 0.0, 0.0, 1), false, FRAME);
        let out = proc.process(&Pose::new(40.0, 0.0, 0.0, 2), false, FRAME);
        assert!(out.yaw > 0.0 && out.yaw < 40.0);
    }

    #[test]
    fn remote_source_gets_smoothing_floor() {
        let mut proc = TrackingProcessor::default();
        proc.process(&Pose::new(0.0, 0.0, 0.0, 1), true, FRAME);
        let out = proc.process(&Pose::new(40.0, 0.0, 0.0, 2), true, FRAME);
        assert!(out.yaw < 39.0, "remote source snapped to {}", out.yaw);
    }

    // ── Centering ───────────────────────────────────────────────────────────

    #[test]
    fn single_axis_center_uses_exact_subtraction() {
        let mut proc = TrackingProcessor::default();
        proc.center_manager_mut().set_center_components(10.0, 0.0, 0.0);
        assert_angles(proc.process(&Pose::new(30.0, 0.0, 0.0, 1), false, FRAME), 20.0, 0.0, 0.0);
    }

    #[test]
    fn multi_axis_center_cancels_exactly() {
        let mut proc = TrackingProcessor::default();
        proc.center_manager_mut().set_center_components(35.0, -20.0, 10.0);
        assert_angles(proc.process(&Pose::new(35.0, -20.0, 10.0, 1), false, FRAME), 0.0, 0.0, 0.0);
    }

    #[test]
    fn recenter_makes_current_pose_neutral() {
        let mut proc = TrackingProcessor::default();
        let pose = Pose::new(25.0, 10.0, -5.0, 1);
        proc.process(&pose, false, FRAME);
        proc.recenter();
        assert!(proc.center_manager().has_valid_center());
        assert_angles(proc.process(&pose.with_timestamp(2), false, FRAME), 0.0, 0.0, 0.0);
    }

    #[test]
    fn repeated_recenter_composes() {
        let mut proc = TrackingProcessor::default();
        proc.process(&Pose::new(20.0, 0.0, 0.0, 1), false, FRAME);
        proc.recenter();
        proc.process(&Pose::new(50.0, 0.0, 0.0, 2), false, FRAME);
        proc.recenter();
        assert!((proc.center_manager().center_pose().yaw - 50.0).abs() < EPS);
        assert_angles(proc.process(&Pose::new(50.0, 0.0, 0.0, 3), false, FRAME), 0.0, 0.0, 0.0);
    }

    #[test]
    fn recenter_to_snaps_next_frame() {
        let mut proc = TrackingProcessor::new(0.9, SensitivitySettings::default(), DeadzoneSettings::none());
        proc.process(&Pose::new(-60.0, 0.0, 0.0, 1), false, FRAME);
        proc.recenter_to(&Pose::new(10.0, 0.0, 0.0, 0));
        assert_angles(proc.process(&Pose::new(30.0, 0.0, 0.0, 2), false, FRAME), 20.0, 0.0, 0.0);
    }

    #[test]
    fn reset_clears_center_and_output() {
        let mut proc = TrackingProcessor::default();
        proc.process(&Pose::new(20.0, 0.0, 0.0, 1), false, FRAME);
        proc.recenter();
        proc.reset();
        assert!(!proc.center_manager().has_valid_center());
        assert!(!proc.last_output().is_valid());
        assert_angles(proc.process(&Pose::new(20.0, 0.0, 0.0, 2), false, FRAME), 20.0, 0.0, 0.0);
    }

    // ── Fading ──────────────────────────────────────────────────────────────

    #[test]
    fn fade_returns_toward_neutral() {
        let mut proc = TrackingProcessor::default();
        proc.process(&Pose::new(40.0, 0.0, 0.0, 7), false, FRAME);
        let out = proc.fade_toward_identity(0.5);
        assert!(out.yaw > 0.0 && out.yaw < 40.0);
        assert_eq!(out.timestamp_us, 7);
        assert_angles(proc.fade_toward_identity(1.0), 0.0, 0.0, 0.0);
    }

    #[test]
    fn fade_before_first_frame_is_invalid() {
        let mut proc = TrackingProcessor::default();
        assert!(!proc.fade_toward_identity(0.5).is_valid());
    }

    #[test]
    fn explicit_factor_blends_partially() {
        let mut proc = TrackingProcessor::default();
        proc.process(&Pose::new(0.0, 0.0, 0.0, 1), false, FRAME);
        let out = proc.process_with_factor(&Pose::new(40.0, 0.0, 0.0, 2), 0.5);
        assert!((out.yaw - 20.0).abs() < 0.5);
    }
}
