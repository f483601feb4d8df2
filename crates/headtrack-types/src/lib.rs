//! `headtrack-types` – shared value types for the head-tracking pipeline.
//!
//! Everything here is a plain value: poses, per-axis settings, axis
//! identifiers, and the configuration-time error type.  None of these types
//! own resources or shared state; every pipeline stage takes them by value.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;
use std::time::Instant;
use thiserror::Error;

/// Default freshness window: a pose older than this is considered stale.
pub const DEFAULT_FRESHNESS_WINDOW_MS: u64 = 500;

/// A 3DOF head pose in degrees, stamped with a monotonic timestamp.
///
/// A `timestamp_us` of `0` marks an *invalid* pose.  Real samples never
/// carry it, so stages that check validity pass such poses through untouched.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Pose {
    pub yaw: f32,
    pub pitch: f32,
    pub roll: f32,
    /// Monotonic microseconds (see [`monotonic_micros`]); `0` = invalid.
    pub timestamp_us: i64,
}

impl Pose {
    /// Create a pose with an explicit timestamp.
    pub fn new(yaw: f32, pitch: f32, roll: f32, timestamp_us: i64) -> Self {
        Self {
            yaw,
            pitch,
            roll,
            timestamp_us,
        }
    }

    /// Create a pose stamped with the current monotonic time.
    pub fn now(yaw: f32, pitch: f32, roll: f32) -> Self {
        Self::new(yaw, pitch, roll, monotonic_micros())
    }

    /// The invalid sentinel pose (all zero, `timestamp_us == 0`).
    pub fn invalid() -> Self {
        Self::default()
    }

    /// A zero rotation stamped with the current time.
    pub fn zero() -> Self {
        Self::now(0.0, 0.0, 0.0)
    }

    pub fn is_valid(&self) -> bool {
        self.timestamp_us != 0
    }

    /// `true` when the pose is valid and younger than `window_ms` at `now_us`.
    pub fn is_fresh(&self, now_us: i64, window_ms: u64) -> bool {
        if !self.is_valid() {
            return false;
        }
        let window_us = i64::try_from(window_ms.saturating_mul(1000)).unwrap_or(i64::MAX);
        now_us.saturating_sub(self.timestamp_us) < window_us
    }

    /// Component-wise subtraction of `offset`, keeping this pose's timestamp.
    pub fn subtract_offset(&self, offset: &Pose) -> Pose {
        Pose::new(
            self.yaw - offset.yaw,
            self.pitch - offset.pitch,
            self.roll - offset.roll,
            self.timestamp_us,
        )
    }

    /// The same angles with a different timestamp.
    pub fn with_timestamp(self, timestamp_us: i64) -> Pose {
        Pose {
            timestamp_us,
            ..self
        }
    }
}

/// Microseconds elapsed on a process-wide monotonic clock.
///
/// The first reading is `1`, never `0`, so a freshly stamped pose is always
/// valid.
pub fn monotonic_micros() -> i64 {
    static EPOCH: OnceLock<Instant> = OnceLock::new();
    let epoch = EPOCH.get_or_init(Instant::now);
    let micros = epoch.elapsed().as_micros();
    i64::try_from(micros).unwrap_or(i64::MAX - 1) + 1
}

/// Per-axis sensitivity multipliers and inversion flags.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SensitivitySettings {
    pub yaw: f32,
    pub pitch: f32,
    pub roll: f32,
    pub invert_yaw: bool,
    pub invert_pitch: bool,
    pub invert_roll: bool,
}

impl Default for SensitivitySettings {
    fn default() -> Self {
        Self::uniform(1.0)
    }
}

impl SensitivitySettings {
    /// Same multiplier on every axis, no inversion.
    pub fn uniform(sensitivity: f32) -> Self {
        Self {
            yaw: sensitivity,
            pitch: sensitivity,
            roll: sensitivity,
            invert_yaw: false,
            invert_pitch: false,
            invert_roll: false,
        }
    }
}

/// Per-axis deadzone thresholds in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DeadzoneSettings {
    pub yaw: f32,
    pub pitch: f32,
    pub roll: f32,
}

impl DeadzoneSettings {
    /// No deadzone on any axis.
    pub fn none() -> Self {
        Self::uniform(0.0)
    }

    /// The recommended half-degree deadzone.
    pub fn recommended() -> Self {
        Self::uniform(0.5)
    }

    pub fn uniform(deadzone: f32) -> Self {
        Self {
            yaw: deadzone,
            pitch: deadzone,
            roll: deadzone,
        }
    }
}

/// A single input or output channel.  Rotation channels are in degrees;
/// translation channels are carried without interpretation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    Yaw,
    Pitch,
    Roll,
    X,
    Y,
    Z,
}

impl Axis {
    /// All six axes in channel order.
    pub const ALL: [Axis; 6] = [Axis::Yaw, Axis::Pitch, Axis::Roll, Axis::X, Axis::Y, Axis::Z];

    /// Position of this axis in a six-channel array.
    pub fn index(self) -> usize {
        match self {
            Axis::Yaw => 0,
            Axis::Pitch => 1,
            Axis::Roll => 2,
            Axis::X => 3,
            Axis::Y => 4,
            Axis::Z => 5,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Axis::Yaw => "yaw",
            Axis::Pitch => "pitch",
            Axis::Roll => "roll",
            Axis::X => "x",
            Axis::Y => "y",
            Axis::Z => "z",
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Axis {
    type Err = HeadtrackError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "yaw" => Ok(Axis::Yaw),
            "pitch" => Ok(Axis::Pitch),
            "roll" => Ok(Axis::Roll),
            "x" => Ok(Axis::X),
            "y" => Ok(Axis::Y),
            "z" => Ok(Axis::Z),
            other => Err(HeadtrackError::UnknownValue {
                key: "axis".to_string(),
                value: other.to_string(),
            }),
        }
    }
}

/// Configuration-time errors.  The per-frame path never produces these.
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum HeadtrackError {
    #[error("Unknown value for {key}: {value:?}")]
    UnknownValue { key: String, value: String },

    #[error("Missing profile field: {0}")]
    MissingField(String),

    #[error("Invalid number for {key}: {value:?}")]
    InvalidNumber { key: String, value: String },

    #[error("Malformed profile line {line}: {content:?}")]
    MalformedLine { line: usize, content: String },

    #[error("Duplicate profile key {key} on line {line}")]
    DuplicateKey { key: String, line: usize },

    #[error("I/O error on {path}: {details}")]
    Io { path: String, details: String },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_timestamp_is_invalid() {
        assert!(!Pose::invalid().is_valid());
        assert!(!Pose::new(10.0, 0.0, 0.0, 0).is_valid());
        assert!(Pose::new(0.0, 0.0, 0.0, 1).is_valid());
    }

    #[test]
    fn monotonic_clock_never_returns_zero() {
        let a = monotonic_micros();
        let b = monotonic_micros();
        assert!(a >= 1);
        assert!(b >= a);
        assert!(Pose::zero().is_valid());
    }

    #[test]
    fn freshness_uses_window() {
        let pose = Pose::new(0.0, 0.0, 0.0, 1_000_000);
        assert!(pose.is_fresh(1_000_000, DEFAULT_FRESHNESS_WINDOW_MS));
        assert!(pose.is_fresh(1_499_999, DEFAULT_FRESHNESS_WINDOW_MS));
        assert!(!pose.is_fresh(1_500_000, DEFAULT_FRESHNESS_WINDOW_MS));
        assert!(!Pose::invalid().is_fresh(1, DEFAULT_FRESHNESS_WINDOW_MS));
    }

    #[test]
    fn subtract_offset_keeps_timestamp() {
        let pose = Pose::new(30.0, 20.0, 10.0, 42);
        let center = Pose::new(10.0, 5.0, 2.0, 0);
        let out = pose.subtract_offset(&center);
        assert_eq!(out, Pose::new(20.0, 15.0, 8.0, 42));
    }

    #[test]
    fn settings_presets() {
        let s = SensitivitySettings::uniform(2.0);
        assert_eq!((s.yaw, s.pitch, s.roll), (2.0, 2.0, 2.0));
        assert_eq!(SensitivitySettings::default(), SensitivitySettings::uniform(1.0));
        assert_eq!(DeadzoneSettings::none(), DeadzoneSettings::default());
        assert_eq!(DeadzoneSettings::recommended().pitch, 0.5);
    }

    #[test]
    fn axis_parse_and_display() {
        for axis in Axis::ALL {
            let parsed: Axis = axis.to_string().parse().unwrap();
            assert_eq!(parsed, axis);
            assert_eq!(Axis::ALL[axis.index()], axis);
        }
        assert_eq!(" PITCH ".parse::<Axis>().unwrap(), Axis::Pitch);
        assert!(matches!(
            "elevation".parse::<Axis>(),
            Err(HeadtrackError::UnknownValue { .. })
        ));
    }

    #[test]
    fn settings_deserialize_with_missing_fields() {
        let s: SensitivitySettings = serde_json::from_str(r#"{"yaw": 2.0}"#).unwrap();
        assert_eq!(s.yaw, 2.0);
        assert_eq!(s.pitch, 1.0);
        assert!(!s.invert_roll);
    }

    #[test]
    fn error_display() {
        let err = HeadtrackError::MissingField("yaw.source".to_string());
        assert!(err.to_string().contains("yaw.source"));
    }
}
