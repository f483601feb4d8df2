//! Angle helpers in degrees.

/// Wrap an angle into `[-180, 180]`.
///
/// Angles already inside the range are returned bit-for-bit unchanged.
pub fn normalize_angle(angle: f32) -> f32 {
    if (-180.0..=180.0).contains(&angle) {
        return angle;
    }
    let mut wrapped = angle % 360.0;
    if wrapped > 180.0 {
        wrapped -= 360.0;
    } else if wrapped < -180.0 {
        wrapped += 360.0;
    }
    wrapped
}

/// Signed shortest rotation from `from` to `to`.
pub fn shortest_angle_delta(from: f32, to: f32) -> f32 {
    normalize_angle(to - from)
}

/// Clamp that never panics: inverted bounds resolve to `hi`, NaN bounds are
/// ignored.
pub fn clamp_lenient(value: f32, lo: f32, hi: f32) -> f32 {
    value.max(lo).min(hi)
}
