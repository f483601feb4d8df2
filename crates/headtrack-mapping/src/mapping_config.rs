//! [`MappingConfig`] – a set of [`AxisConfig`]s applied to a whole sample.

use crate::axis::{AxisChannels, AxisConfig};
use headtrack_types::{Axis, HeadtrackError, Pose};
use serde::{Deserialize, Serialize};

/// Ordered list of per-axis configs.  Each config writes its own `target`
/// channel; channels no config targets stay `0`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MappingConfig {
    pub axes: Vec<AxisConfig>,
}

impl Default for MappingConfig {
    /// Identity mapping for the three rotation axes.
    fn default() -> Self {
        Self {
            axes: vec![
                AxisConfig::identity(Axis::Yaw),
                AxisConfig::identity(Axis::Pitch),
                AxisConfig::identity(Axis::Roll),
            ],
        }
    }
}

impl MappingConfig {
    /// Identity mapping for all six channels.
    pub fn six_axis() -> Self {
        Self {
            axes: Axis::ALL.iter().map(|&a| AxisConfig::identity(a)).collect(),
        }
    }

    pub fn axis(&self, target: Axis) -> Option<&AxisConfig> {
        self.axes.iter().find(|a| a.target == target)
    }

    pub fn axis_mut(&mut self, target: Axis) -> Option<&mut AxisConfig> {
        self.axes.iter_mut().find(|a| a.target == target)
    }

    /// Reject configs where two entries write the same target.
    pub fn validate(&self) -> Result<(), HeadtrackError> {
        let mut seen = [false; 6];
        for cfg in &self.axes {
            let slot = &mut seen[cfg.target.index()];
            if *slot {
                return Err(HeadtrackError::InvalidConfig(format!(
                    "axis {} is targeted more than once",
                    cfg.target
                )));
            }
            *slot = true;
        }
        Ok(())
    }

    pub fn apply(&self, input: &AxisChannels) -> AxisChannels {
        let mut out = AxisChannels::default();
        for cfg in &self.axes {
            out.set(cfg.target, cfg.transform(input));
        }
        out
    }

    /// Apply to the rotation channels of `pose`.  Invalid poses pass through.
    pub fn apply_pose(&self, pose: &Pose) -> Pose {
        if !pose.is_valid() {
            return *pose;
        }
        self.apply(&AxisChannels::from_pose(pose))
            .to_pose(pose.timestamp_us)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_mapping_is_identity() {
        let cfg = MappingConfig::default();
        let pose = Pose::new(12.0, -7.5, 3.0, 99);
        assert_eq!(cfg.apply_pose(&pose), pose);
    }

    #[test]
    fn untargeted_channels_are_zero() {
        let cfg = MappingConfig::default();
        let input = AxisChannels::from_pose_and_translation(&Pose::new(1.0, 2.0, 3.0, 1), [4.0, 5.0, 6.0]);
        assert_eq!(cfg.apply(&input).translation(), [0.0, 0.0, 0.0]);
        assert_eq!(MappingConfig::six_axis().apply(&input), input);
    }

    #[test]
    fn swapping_sources_swaps_channels() {
        let mut cfg = MappingConfig::default();
        cfg.axis_mut(Axis::Yaw).unwrap().source = Some(Axis::Roll);
        cfg.axis_mut(Axis::Roll).unwrap().source = Some(Axis::Yaw);
        let out = cfg.apply_pose(&Pose::new(10.0, 20.0, 30.0, 5));
        assert_eq!(out, Pose::new(30.0, 20.0, 10.0, 5));
    }

    #[test]
    fn invalid_pose_passes_through() {
        let mut cfg = MappingConfig::default();
        cfg.axis_mut(Axis::Yaw).unwrap().sensitivity = 5.0;
        let invalid = Pose::new(10.0, 0.0, 0.0, 0);
        assert_eq!(cfg.apply_pose(&invalid), invalid);
    }

    #[test]
    fn validate_rejects_duplicate_targets() {
        let mut cfg = MappingConfig::default();
        assert!(cfg.validate().is_ok());
        cfg.axes.push(AxisConfig::identity(Axis::Pitch));
        assert!(matches!(cfg.validate(), Err(HeadtrackError::InvalidConfig(_))));
    }
}
