//! Deadzone shaping for a single scalar channel.

/// Subtractive deadzone: magnitudes at or below `deadzone` become `0`, larger
/// magnitudes are reduced by `deadzone` so the output starts from zero at the
/// edge instead of jumping.
pub fn apply_deadzone(value: f32, deadzone: f32) -> f32 {
    if deadzone <= 0.0 {
        return value;
    }
    let magnitude = value.abs();
    if magnitude <= deadzone {
        return 0.0;
    }
    value.signum() * (magnitude - deadzone)
}

/// Two-threshold deadzone.
///
/// - `|value| < min` → `0`
/// - `min ≤ |value| ≤ max` (when `max > min`) → magnitude rescaled linearly
///   from `0` at `min` to `max` at `max`
/// - `|value| > max` → unchanged
///
/// When `max ≤ min` there is no ramp and the subtractive form of
/// [`apply_deadzone`] is used with `min` as the threshold.
pub fn apply_ranged_deadzone(value: f32, min: f32, max: f32) -> f32 {
    let magnitude = value.abs();
    if magnitude < min {
        return 0.0;
    }
    if max <= min {
        return apply_deadzone(value, min);
    }
    if magnitude > max {
        return value;
    }
    let ramp = (magnitude - min) / (max - min);
    value.signum() * ramp * max
}
