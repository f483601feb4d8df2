//! Coordinate-convention bridge between a tracker and a consumer.
//!
//! Each output rotation axis picks a source channel and an optional sign flip.
//! Typical use: a tracker reporting *pitch-down-positive* feeding a consumer
//! that expects *pitch-up-positive*.
//!
//! # Example
//!
//! ```rust
//! use headtrack_mapping::coordinate::CoordinateTransformer;
//! use headtrack_types::Pose;
//!
//! let bridge = CoordinateTransformer::invert_pitch();
//! let out = bridge.transform(&Pose::new(10.0, 15.0, -5.0, 1));
//! assert_eq!(out, Pose::new(10.0, -15.0, -5.0, 1));
//! ```

use crate::axis::AxisChannels;
use headtrack_types::{Axis, Pose};
use serde::{Deserialize, Serialize};

/// Source selection and sign for one output axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AxisMapping {
    /// `None` always yields `0`.
    pub source: Option<Axis>,
    pub invert: bool,
}

impl AxisMapping {
    pub fn new(source: Option<Axis>, invert: bool) -> Self {
        Self { source, invert }
    }

    pub fn direct(axis: Axis) -> Self {
        Self::new(Some(axis), false)
    }

    pub fn inverted(axis: Axis) -> Self {
        Self::new(Some(axis), true)
    }

    pub fn disabled() -> Self {
        Self::new(None, false)
    }

    pub fn apply(&self, channels: &AxisChannels) -> f32 {
        match self.source {
            Some(axis) if self.invert => -channels.get(axis),
            Some(axis) => channels.get(axis),
            None => 0.0,
        }
    }
}

/// Stateless remap/invert of yaw, pitch and roll.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoordinateTransformer {
    pub yaw: AxisMapping,
    pub pitch: AxisMapping,
    pub roll: AxisMapping,
}

impl Default for CoordinateTransformer {
    fn default() -> Self {
        Self::identity()
    }
}

impl CoordinateTransformer {
    pub fn new(yaw: AxisMapping, pitch: AxisMapping, roll: AxisMapping) -> Self {
        Self { yaw, pitch, roll }
    }

    pub fn identity() -> Self {
        Self::new(
            AxisMapping::direct(Axis::Yaw),
            AxisMapping::direct(Axis::Pitch),
            AxisMapping::direct(Axis::Roll),
        )
    }

    /// Identity with pitch sign flipped.
    pub fn invert_pitch() -> Self {
        Self {
            pitch: AxisMapping::inverted(Axis::Pitch),
            ..Self::identity()
        }
    }

    /// Remap the rotation channels; translation channels are copied through.
    pub fn transform_channels(&self, input: &AxisChannels) -> AxisChannels {
        let mut out = *input;
        out.set(Axis::Yaw, self.yaw.apply(input));
        out.set(Axis::Pitch, self.pitch.apply(input));
        out.set(Axis::Roll, self.roll.apply(input));
        out
    }

    /// Remap a pose, keeping its timestamp. Invalid poses pass through.
    pub fn transform(&self, pose: &Pose) -> Pose {
        if !pose.is_valid() {
            return *pose;
        }
        self.transform_channels(&AxisChannels::from_pose(pose))
            .to_pose(pose.timestamp_us)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_is_noop() {
        let pose = Pose::new(1.0, 2.0, 3.0, 4);
        assert_eq!(CoordinateTransformer::identity().transform(&pose), pose);
    }

    #[test]
    fn axes_can_be_swapped_and_inverted() {
        let t = CoordinateTransformer::new(
            AxisMapping::inverted(Axis::Pitch),
            AxisMapping::direct(Axis::Yaw),
            AxisMapping::disabled(),
        );
        let out = t.transform(&Pose::new(10.0, 20.0, 30.0, 9));
        assert_eq!(out, Pose::new(-20.0, 10.0, 0.0, 9));
    }

    #[test]
    fn translation_channels_can_drive_rotation() {
        let t = CoordinateTransformer::new(
            AxisMapping::direct(Axis::X),
            AxisMapping::direct(Axis::Pitch),
            AxisMapping::direct(Axis::Roll),
        );
        let input = AxisChannels::from_pose_and_translation(&Pose::new(1.0, 2.0, 3.0, 1), [7.0, 8.0, 9.0]);
        let out = t.transform_channels(&input);
        assert_eq!(out.get(Axis::Yaw), 7.0);
        assert_eq!(out.translation(), [7.0, 8.0, 9.0]);
    }

    #[test]
    fn invalid_pose_passes_through_unchanged() {
        let invalid = Pose::new(10.0, 15.0, -5.0, 0);
        let out = CoordinateTransformer::invert_pitch().transform(&invalid);
        assert!(!out.is_valid());
        assert_eq!(out, invalid);
    }
}
