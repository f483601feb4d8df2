//! Per-axis transform pipeline.
//!
//! An [`AxisConfig`] turns one raw channel into one output channel in a fixed
//! order:
//!
//! ```text
//! deadzone → sensitivity curve → sensitivity multiplier → inversion → clamp
//! ```
//!
//! A config whose `source` is `None` always outputs `0` and skips every step.
//!
//! # Example
//!
//! ```rust
//! use headtrack_mapping::axis::{AxisConfig, CurveKind};
//! use headtrack_types::Axis;
//!
//! let mut cfg = AxisConfig::identity(Axis::Yaw);
//! assert_eq!(cfg.transform_value(12.5), 12.5);
//!
//! cfg.sensitivity = 2.0;
//! cfg.inverted = true;
//! assert_eq!(cfg.transform_value(10.0), -20.0);
//!
//! cfg.source = None;
//! assert_eq!(cfg.transform_value(10.0), 0.0);
//! ```

use headtrack_math::angle::clamp_lenient;
use headtrack_math::deadzone::apply_ranged_deadzone;
use headtrack_types::{Axis, Pose};
use serde::{Deserialize, Serialize};

// ────────────────────────────────────────────────────────────────────────────
// Curves
// ────────────────────────────────────────────────────────────────────────────

/// Response curve applied to the normalized input magnitude.
///
/// Each variant yields a *multiplier* for the input; `Linear` is always `1`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CurveKind {
    #[default]
    Linear,
    /// Output grows with the square of the normalized input.
    Quadratic,
    /// Output grows with the cube of the normalized input.
    Cubic,
    /// Output grows with `n^exponent`.
    Custom { exponent: f32 },
}

impl CurveKind {
    /// Multiplier for a normalized magnitude `n ∈ [0, 1]`.
    pub fn multiplier(self, n: f32) -> f32 {
        let m = match self {
            CurveKind::Linear => 1.0,
            CurveKind::Quadratic => n,
            CurveKind::Cubic => n * n,
            CurveKind::Custom { exponent } => n.powf(exponent - 1.0),
        };
        if m.is_finite() { m } else { 1.0 }
    }

    /// Profile name of the variant.
    pub fn name(self) -> &'static str {
        match self {
            CurveKind::Linear => "linear",
            CurveKind::Quadratic => "quadratic",
            CurveKind::Cubic => "cubic",
            CurveKind::Custom { .. } => "custom",
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Channels
// ────────────────────────────────────────────────────────────────────────────

/// Six raw channels (yaw, pitch, roll, x, y, z) indexed by [`Axis`].
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct AxisChannels {
    pub values: [f32; 6],
}

impl AxisChannels {
    /// Rotation channels from `pose`; translation channels are zero.
    pub fn from_pose(pose: &Pose) -> Self {
        Self::from_pose_and_translation(pose, [0.0; 3])
    }

    pub fn from_pose_and_translation(pose: &Pose, translation: [f32; 3]) -> Self {
        Self {
            values: [
                pose.yaw,
                pose.pitch,
                pose.roll,
                translation[0],
                translation[1],
                translation[2],
            ],
        }
    }

    pub fn get(&self, axis: Axis) -> f32 {
        self.values[axis.index()]
    }

    pub fn set(&mut self, axis: Axis, value: f32) {
        self.values[axis.index()] = value;
    }

    /// Rotation channels as a pose stamped with `timestamp_us`.
    pub fn to_pose(&self, timestamp_us: i64) -> Pose {
        Pose::new(
            self.get(Axis::Yaw),
            self.get(Axis::Pitch),
            self.get(Axis::Roll),
            timestamp_us,
        )
    }

    pub fn translation(&self) -> [f32; 3] {
        [self.get(Axis::X), self.get(Axis::Y), self.get(Axis::Z)]
    }
}

// ────────────────────────────────────────────────────────────────────────────
// AxisConfig
// ────────────────────────────────────────────────────────────────────────────

/// Full configuration of one output axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AxisConfig {
    /// Raw channel to read; `None` disables the axis (output `0`).
    pub source: Option<Axis>,
    /// Output channel written by this config.
    pub target: Axis,
    pub sensitivity: f32,
    pub inverted: bool,
    pub deadzone_min: f32,
    pub deadzone_max: f32,
    pub min_limit: f32,
    pub max_limit: f32,
    pub enable_limits: bool,
    pub curve: CurveKind,
    /// Blend between linear (`0`) and the full curve (`1`).
    pub curve_strength: f32,
    /// Input magnitude mapped to `1.0` before the curve is evaluated.
    pub max_input_range: f32,
}

impl Default for AxisConfig {
    fn default() -> Self {
        Self::identity(Axis::Yaw)
    }
}

impl AxisConfig {
    /// Pass-through config reading and writing `axis`.
    pub fn identity(axis: Axis) -> Self {
        Self {
            source: Some(axis),
            target: axis,
            sensitivity: 1.0,
            inverted: false,
            deadzone_min: 0.0,
            deadzone_max: 0.0,
            min_limit: -180.0,
            max_limit: 180.0,
            enable_limits: false,
            curve: CurveKind::Linear,
            curve_strength: 1.0,
            max_input_range: 180.0,
        }
    }

    /// Read this axis' source channel from `channels` and transform it.
    pub fn transform(&self, channels: &AxisChannels) -> f32 {
        match self.source {
            Some(source) => self.transform_value(channels.get(source)),
            None => 0.0,
        }
    }

    /// Run a raw scalar through the full per-axis pipeline.
    pub fn transform_value(&self, raw: f32) -> f32 {
        if self.source.is_none() {
            return 0.0;
        }

        let mut value = apply_ranged_deadzone(raw, self.deadzone_min, self.deadzone_max);
        value = self.apply_curve(value);
        value *= self.sensitivity;
        if self.inverted {
            value = -value;
        }
        if self.enable_limits {
            value = clamp_lenient(value, self.min_limit, self.max_limit);
        }
        value
    }

    fn apply_curve(&self, value: f32) -> f32 {
        if self.curve == CurveKind::Linear
            || self.curve_strength == 0.0
            || self.max_input_range.is_nan()
            || self.max_input_range <= 0.0
            || value == 0.0
        {
            return value;
        }
        let normalized = (value.abs() / self.max_input_range).min(1.0);
        let strength = clamp_lenient(self.curve_strength, 0.0, 1.0);
        let multiplier = 1.0 + (self.curve.multiplier(normalized) - 1.0) * strength;
        value * multiplier
    }
}
