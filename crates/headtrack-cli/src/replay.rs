//! Pose-log replay: drive a pipeline from a recorded stream.
//!
//! One host frame per line:
//!
//! ```text
//! # timestamp_us  yaw    pitch  roll
//! 1000000         12.5   -3.0   0.0
//! 1016000         13.1   -2.9   0.1
//! none
//! ```
//!
//! `none` marks a frame where the receiver delivered nothing.  Blank lines
//! and lines starting with `#` or `;` are skipped.

use headtrack_runtime::{FrameOutput, PoseSlot, TrackingPipeline};
use headtrack_types::{HeadtrackError, Pose};
use std::fs;
use std::path::Path;

pub fn parse_replay(text: &str) -> Result<Vec<Pose>, HeadtrackError> {
    let mut frames = Vec::new();
    for (idx, raw) in text.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
            continue;
        }
        if line.eq_ignore_ascii_case("none") {
            frames.push(Pose::invalid());
            continue;
        }

        let fields: Vec<&str> = line.split_whitespace().collect();
        let [ts, yaw, pitch, roll] = fields.as_slice() else {
            return Err(HeadtrackError::MalformedLine {
                line: idx + 1,
                content: raw.to_string(),
            });
        };
        let timestamp_us = ts.parse::<i64>().map_err(|_| invalid("timestamp_us", ts))?;
        frames.push(Pose::new(
            parse_angle("yaw", yaw)?,
            parse_angle("pitch", pitch)?,
            parse_angle("roll", roll)?,
            timestamp_us,
        ));
    }
    Ok(frames)
}

pub fn load_replay(path: &Path) -> Result<Vec<Pose>, HeadtrackError> {
    let text = fs::read_to_string(path).map_err(|e| HeadtrackError::Io {
        path: path.display().to_string(),
        details: e.to_string(),
    })?;
    parse_replay(&text)
}

fn parse_angle(key: &str, value: &str) -> Result<f32, HeadtrackError> {
    value
        .parse::<f32>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| invalid(key, value))
}

fn invalid(key: &str, value: &str) -> HeadtrackError {
    HeadtrackError::InvalidNumber {
        key: key.to_string(),
        value: value.to_string(),
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReplaySummary {
    pub frames: usize,
    pub frames_without_data: usize,
    pub recenter_suggestions: usize,
    pub last: Option<FrameOutput>,
}

/// Feed `frames` through a [`PoseSlot`] into `pipeline`, one tick per frame.
/// Recenter suggestions are counted and acknowledged.
pub fn run_replay(
    pipeline: &mut TrackingPipeline,
    frames: &[Pose],
    remote: bool,
    dt: f32,
    mut on_frame: impl FnMut(usize, &FrameOutput),
) -> ReplaySummary {
    let slot = PoseSlot::new(remote);
    let mut summary = ReplaySummary::default();

    for (idx, pose) in frames.iter().enumerate() {
        if pose.is_valid() {
            slot.publish(*pose);
        } else {
            slot.set_receiving(false);
            summary.frames_without_data += 1;
        }

        let out = pipeline.tick(&slot, dt);
        if out.needs_recenter {
            summary.recenter_suggestions += 1;
            pipeline.acknowledge_recenter();
        }
        on_frame(idx, &out);
        summary.frames += 1;
        summary.last = Some(out);
    }

    tracing::info!(
        session = %pipeline.session_id(),
        frames = summary.frames,
        without_data = summary.frames_without_data,
        "Replay finished"
    );
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use headtrack_processing::{TrackingLossConfig, TrackingLossState};
    use headtrack_runtime::PipelineConfig;

    const LOG: &str = "\
# recorded at 60 Hz
1000000 10.0 0.0 0.0
1016667 11.0 0.5 0.0

none
; receiver hiccup over
1050000 12.0 1.0 -0.5
";

    #[test]
    fn parses_samples_and_gaps() {
        let frames = parse_replay(LOG).expect("valid log");
        assert_eq!(frames.len(), 4);
        assert_eq!(frames[0], Pose::new(10.0, 0.0, 0.0, 1_000_000));
        assert!(!frames[2].is_valid());
        assert_eq!(frames[3].roll, -0.5);
    }

    #[test]
    fn reports_malformed_line_number() {
        let err = parse_replay("1000 1.0 2.0 3.0\n2000 1.0 2.0\n").unwrap_err();
        assert_eq!(
            err,
            HeadtrackError::MalformedLine {
                line: 2,
                content: "2000 1.0 2.0".to_string()
            }
        );
    }

    #[test]
    fn reports_bad_numbers() {
        assert!(matches!(
            parse_replay("abc 1.0 2.0 3.0"),
            Err(HeadtrackError::InvalidNumber { ref key, .. }) if key == "timestamp_us"
        ));
        assert!(matches!(
            parse_replay("1000 1.0 NaN 3.0"),
            Err(HeadtrackError::InvalidNumber { ref key, .. }) if key == "pitch"
        ));
    }

    #[test]
    fn load_replay_from_file() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let path = dir.path().join("session.log");
        std::fs::write(&path, LOG).expect("write");
        assert_eq!(load_replay(&path).expect("load").len(), 4);
        assert!(matches!(
            load_replay(&dir.path().join("missing.log")),
            Err(HeadtrackError::Io { .. })
        ));
    }

    #[test]
    fn replay_drives_pipeline() {
        let config = PipelineConfig {
            smoothing: 0.0,
            extrapolation_enabled: false,
            ..PipelineConfig::default()
        };
        let mut pipeline = TrackingPipeline::new(config).expect("valid config");
        let frames = parse_replay(LOG).expect("valid log");

        let mut seen = Vec::new();
        let summary = run_replay(&mut pipeline, &frames, false, 1.0 / 60.0, |idx, out| {
            seen.push((idx, out.loss_state));
        });

        assert_eq!(summary.frames, 4);
        assert_eq!(summary.frames_without_data, 1);
        assert_eq!(seen[2], (2, TrackingLossState::Holding));
        let last = summary.last.expect("last frame");
        assert_eq!(last.loss_state, TrackingLossState::Active);
        assert!((last.pose.yaw - 12.0).abs() < 1e-2);
    }

    #[test]
    fn long_gap_suggests_recenter_once() {
        let config = PipelineConfig {
            loss: TrackingLossConfig {
                recenter_threshold_frames: 3,
                ..TrackingLossConfig::default()
            },
            ..PipelineConfig::default()
        };
        let mut pipeline = TrackingPipeline::new(config).expect("valid config");
        let mut frames = vec![Pose::new(0.0, 0.0, 0.0, 1)];
        frames.extend(std::iter::repeat_n(Pose::invalid(), 10));

        let summary = run_replay(&mut pipeline, &frames, true, 1.0 / 60.0, |_, _| {});
        assert_eq!(summary.recenter_suggestions, 1);
    }
}
