//! Frame-rate independent exponential smoothing.
//!
//! The user-facing `smoothing` knob (0 = instant, 1 = very slow) maps to an
//! exponential convergence rate.  The per-frame interpolation factor is
//!
//! ```text
//! speed = SPEED_MAX − (SPEED_MAX − SPEED_MIN) · smoothing
//! t     = 1 − exp(−speed · dt)
//! ```
//!
//! so two frames of `dt/2` move exactly as far as one frame of `dt`.
//!
//! # Example
//!
//! ```rust
//! use headtrack_math::smoothing::calculate_smoothing_factor;
//!
//! let one = calculate_smoothing_factor(0.5, 1.0 / 30.0);
//! let half = calculate_smoothing_factor(0.5, 1.0 / 60.0);
//! // Two half-frames leave the same residual as one full frame.
//! assert!(((1.0 - half) * (1.0 - half) - (1.0 - one)).abs() < 1e-5);
//! ```

/// Convergence rate (1/s) at `smoothing = 0`.
pub const SPEED_MAX: f32 = 50.0;
/// Convergence rate (1/s) at `smoothing = 1`.
pub const SPEED_MIN: f32 = 0.1;
/// Minimum smoothing applied to network-jittery (remote) sources.
pub const REMOTE_CONNECTION_BASELINE: f32 = 0.15;
/// Below this the knob counts as "off" and the factor is `1` (snap).
const SMOOTHING_OFF: f32 = 0.001;

pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// `1 − exp(−rate · dt)`, with negative `dt` treated as zero.
pub fn exponential_factor(rate: f32, dt: f32) -> f32 {
    1.0 - (-rate.max(0.0) * dt.max(0.0)).exp()
}

/// Interpolation factor in `[0, 1]` for this frame.
pub fn calculate_smoothing_factor(smoothing: f32, dt: f32) -> f32 {
    if smoothing.is_nan() || smoothing < SMOOTHING_OFF {
        return 1.0;
    }
    let speed = lerp(SPEED_MAX, SPEED_MIN, smoothing.min(1.0));
    exponential_factor(speed, dt)
}

/// Move `current` toward `target` by this frame's smoothing factor.
pub fn smooth(current: f32, target: f32, smoothing: f32, dt: f32) -> f32 {
    lerp(current, target, calculate_smoothing_factor(smoothing, dt))
}

/// Raise `base` to [`REMOTE_CONNECTION_BASELINE`] for remote sources.
pub fn effective_smoothing(base: f32, is_remote: bool) -> f32 {
    if is_remote && (base.is_nan() || base < REMOTE_CONNECTION_BASELINE) {
        REMOTE_CONNECTION_BASELINE
    } else {
        base
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_smoothing_snaps() {
        assert_eq!(calculate_smoothing_factor(0.0, 1.0 / 60.0), 1.0);
        assert_eq!(calculate_smoothing_factor(-3.0, 1.0 / 60.0), 1.0);
        assert_eq!(calculate_smoothing_factor(f32::NAN, 1.0 / 60.0), 1.0);
    }

    #[test]
    fn factor_is_within_unit_interval() {
        for s in [0.01, 0.25, 0.5, 0.75, 1.0, 4.0] {
            for dt in [0.0, 0.001, 1.0 / 144.0, 1.0 / 30.0, 1.0] {
                let t = calculate_smoothing_factor(s, dt);
                assert!((0.0..=1.0).contains(&t), "s={s} dt={dt} t={t}");
            }
        }
    }

    #[test]
    fn negative_dt_does_not_move() {
        assert_eq!(calculate_smoothing_factor(0.5, -0.1), 0.0);
    }

    #[test]
    fn more_smoothing_moves_slower() {
        let dt = 1.0 / 60.0;
        assert!(calculate_smoothing_factor(0.2, dt) > calculate_smoothing_factor(0.8, dt));
    }

    #[test]
    fn frame_rate_independent_convergence() {
        let mut at_30 = 0.0;
        for _ in 0..30 {
            at_30 = smooth(at_30, 10.0, 0.6, 1.0 / 30.0);
        }
        let mut at_144 = 0.0;
        for _ in 0..144 {
            at_144 = smooth(at_144, 10.0, 0.6, 1.0 / 144.0);
        }
        assert!((at_30 - at_144).abs() < 1e-3, "{at_30} vs {at_144}");
    }

    #[test]
    fn remote_baseline_only_raises() {
        assert_eq!(effective_smoothing(0.0, true), REMOTE_CONNECTION_BASELINE);
        assert_eq!(effective_smoothing(0.5, true), 0.5);
        assert_eq!(effective_smoothing(0.0, false), 0.0);
    }
}
