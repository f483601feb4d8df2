//! [`PoseInterpolator`] – bounded extrapolation between sparse samples.
//!
//! Tracking sources often deliver fewer samples than the renderer draws
//! frames.  When a new sample arrives it is returned unchanged and the
//! angular velocity against the previous sample is recorded.  While the
//! sample stays the same (same or older timestamp) the pose is projected
//! forward along that velocity, for at most `max_extrapolation_time` seconds.

use headtrack_math::angle::{normalize_angle, shortest_angle_delta};
use headtrack_types::Pose;

/// Default cap on how far past the last sample a pose is projected.
pub const DEFAULT_MAX_EXTRAPOLATION_TIME: f32 = 0.1;

#[derive(Debug, Clone)]
pub struct PoseInterpolator {
    baseline: Option<Pose>,
    /// Degrees per second for yaw, pitch, roll.
    velocity: [f32; 3],
    time_since_sample: f32,
    max_extrapolation_time: f32,
}

impl Default for PoseInterpolator {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_EXTRAPOLATION_TIME)
    }
}

impl PoseInterpolator {
    pub fn new(max_extrapolation_time: f32) -> Self {
        Self {
            baseline: None,
            velocity: [0.0; 3],
            time_since_sample: 0.0,
            max_extrapolation_time: max_extrapolation_time.max(0.0),
        }
    }

    pub fn max_extrapolation_time(&self) -> f32 {
        self.max_extrapolation_time
    }

    /// Negative values are treated as `0` (no extrapolation).
    pub fn set_max_extrapolation_time(&mut self, seconds: f32) {
        self.max_extrapolation_time = if seconds.is_nan() { 0.0 } else { seconds.max(0.0) };
    }

    /// Last measured angular velocity in degrees per second.
    pub fn velocity(&self) -> (f32, f32, f32) {
        (self.velocity[0], self.velocity[1], self.velocity[2])
    }

    /// Seconds accumulated since the last new sample.
    pub fn time_since_sample(&self) -> f32 {
        self.time_since_sample
    }

    /// Feed this frame's pose and elapsed time; returns the pose to use.
    ///
    /// Invalid poses pass through without touching the state.
    pub fn update(&mut self, pose: &Pose, dt: f32) -> Pose {
        if !pose.is_valid() {
            return *pose;
        }

        let Some(base) = self.baseline else {
            self.accept_sample(*pose, [0.0; 3]);
            return *pose;
        };

        if pose.timestamp_us > base.timestamp_us {
            // i64 span can exceed i64::MAX; subtract in f64.
            let elapsed = ((pose.timestamp_us as f64 - base.timestamp_us as f64) / 1_000_000.0) as f32;
            let velocity = [
                shortest_angle_delta(base.yaw, pose.yaw) / elapsed,
                shortest_angle_delta(base.pitch, pose.pitch) / elapsed,
                shortest_angle_delta(base.roll, pose.roll) / elapsed,
            ];
            tracing::trace!(?velocity, elapsed, "New tracking sample");
            self.accept_sample(*pose, velocity);
            return *pose;
        }

        if dt.is_finite() && dt > 0.0 {
            self.time_since_sample += dt;
        }
        let lookahead = self.time_since_sample.min(self.max_extrapolation_time);
        Pose::new(
            normalize_angle(base.yaw + self.velocity[0] * lookahead),
            normalize_angle(base.pitch + self.velocity[1] * lookahead),
            normalize_angle(base.roll + self.velocity[2] * lookahead),
            base.timestamp_us,
        )
    }

    pub fn reset(&mut self) {
        self.baseline = None;
        self.velocity = [0.0; 3];
        self.time_since_sample = 0.0;
    }

    fn accept_sample(&mut self, pose: Pose, velocity: [f32; 3]) {
        self.baseline = Some(pose);
        self.velocity = velocity;
        self.time_since_sample = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FRAME: f32 = 1.0 / 60.0;

    /// Two samples 100 ms apart, yaw moving at 100°/s.
    fn primed(max: f32) -> PoseInterpolator {
        let mut interp = PoseInterpolator::new(max);
        interp.update(&Pose::new(0.0, 0.0, 0.0, 1_000_000), FRAME);
        interp.update(&Pose::new(10.0, 0.0, 0.0, 1_100_000), FRAME);
        interp
    }

    #[test]
    fn new_sample_is_returned_unmodified() {
        let mut interp = PoseInterpolator::default();
        let first = Pose::new(5.0, -3.0, 1.0, 10);
        assert_eq!(interp.update(&first, FRAME), first);
        let second = Pose::new(6.0, -2.0, 1.5, 20);
        assert_eq!(interp.update(&second, FRAME), second);
    }

    #[test]
    fn velocity_is_degrees_per_second() {
        let interp = primed(0.1);
        let (yaw, pitch, roll) = interp.velocity();
        assert!((yaw - 100.0).abs() < 1e-2);
        assert_eq!(pitch, 0.0);
        assert_eq!(roll, 0.0);
    }

    #[test]
    fn velocity_takes_short_way_across_seam() {
        let mut interp = PoseInterpolator::default();
        interp.update(&Pose::new(179.0, 0.0, 0.0, 1_000_000), FRAME);
        interp.update(&Pose::new(-179.0, 0.0, 0.0, 1_100_000), FRAME);
        assert!((interp.velocity().0 - 20.0).abs() < 1e-2);
    }

    #[test]
    fn stale_frames_extrapolate() {
        let mut interp = primed(0.1);
        let stale = Pose::new(10.0, 0.0, 0.0, 1_100_000);
        let out = interp.update(&stale, 0.05);
        assert!((out.yaw - 15.0).abs() < 1e-3);
        assert_eq!(out.timestamp_us, 1_100_000);
    }

    #[test]
    fn extrapolation_is_capped() {
        let stale = Pose::new(10.0, 0.0, 0.0, 1_100_000);

        let mut ten = primed(0.05);
        let mut after_ten = stale;
        for _ in 0..10 {
            after_ten = ten.update(&stale, FRAME);
        }

        let mut hundred = primed(0.05);
        let mut after_hundred = stale;
        for _ in 0..100 {
            after_hundred = hundred.update(&stale, FRAME);
        }

        assert!((after_ten.yaw - after_hundred.yaw).abs() < 1e-4);
        assert!((after_ten.yaw - 15.0).abs() < 1e-3);
    }

    #[test]
    fn older_timestamp_counts_as_stale() {
        let mut interp = primed(0.1);
        let out = interp.update(&Pose::new(-50.0, 0.0, 0.0, 1_000_000), 0.02);
        assert!((out.yaw - 12.0).abs() < 1e-3);
        assert!((interp.velocity().0 - 100.0).abs() < 1e-2);
    }

    #[test]
    fn new_sample_resets_accumulator() {
        let mut interp = primed(0.1);
        interp.update(&Pose::new(10.0, 0.0, 0.0, 1_100_000), 0.05);
        assert!(interp.time_since_sample() > 0.0);
        interp.update(&Pose::new(20.0, 0.0, 0.0, 1_200_000), FRAME);
        assert_eq!(interp.time_since_sample(), 0.0);
    }

    #[test]
    fn invalid_pose_passes_through() {
        let mut interp = primed(0.1);
        let invalid = Pose::invalid();
        assert_eq!(interp.update(&invalid, FRAME), invalid);
        assert_eq!(interp.time_since_sample(), 0.0);
    }

    #[test]
    fn extreme_timestamp_gap_keeps_velocity_sign() {
        let mut interp = PoseInterpolator::default();
        interp.update(&Pose::new(0.0, 0.0, 0.0, -9_000_000_000_000_000_000), FRAME);
        let later = Pose::new(10.0, 0.0, 0.0, 9_000_000_000_000_000_000);
        assert_eq!(interp.update(&later, FRAME), later);
        let (yaw, pitch, roll) = interp.velocity();
        assert!(yaw >= 0.0 && yaw.is_finite());
        assert_eq!(pitch, 0.0);
        assert_eq!(roll, 0.0);

        let out = interp.update(&later, 0.05);
        assert!(out.yaw >= 10.0 && out.yaw < 10.001);
    }

    #[test]
    fn zero_cap_disables_extrapolation() {
        let mut interp = primed(0.1);
        interp.set_max_extrapolation_time(-1.0);
        let out = interp.update(&Pose::new(10.0, 0.0, 0.0, 1_100_000), 0.05);
        assert_eq!(out.yaw, 10.0);
    }
}
