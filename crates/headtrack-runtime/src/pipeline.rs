//! [`TrackingPipeline`] – one explicitly owned tracking session.
//!
//! Per frame, with fresh data:
//!
//! ```text
//! raw ─▶ CoordinateTransformer? ─▶ PoseInterpolator? ─▶ MappingConfig?
//!     ─▶ TrackingProcessor ─▶ rotation ─▶ AimDecoupler
//! ```
//!
//! Without fresh data the [`TrackingLossHandler`] decides whether the last
//! rotation is held or faded toward neutral.  The host calls
//! [`TrackingPipeline::tick`] exactly once per rendered frame.

use headtrack_mapping::{CoordinateTransformer, MappingConfig};
use headtrack_math::{Quat, Vec3};
use headtrack_processing::{
    AimDecoupler, PoseInterpolator, TrackingLossConfig, TrackingLossHandler, TrackingLossState,
    TrackingProcessor,
};
use headtrack_types::{
    DEFAULT_FRESHNESS_WINDOW_MS, DeadzoneSettings, HeadtrackError, Pose, SensitivitySettings,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::source::{GameplayState, PoseSource};

/// Everything a pipeline needs, as a plain value.  Swap it between frames
/// with [`TrackingPipeline::set_config`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub smoothing: f32,
    pub sensitivity: SensitivitySettings,
    pub deadzone: DeadzoneSettings,
    pub loss: TrackingLossConfig,
    /// Samples older than this (measured in frame time since they last
    /// changed) count as lost.
    pub freshness_window_ms: u64,
    pub extrapolation_enabled: bool,
    pub max_extrapolation_time: f32,
    pub coordinate: Option<CoordinateTransformer>,
    pub mapping: Option<MappingConfig>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            smoothing: 0.3,
            sensitivity: SensitivitySettings::default(),
            deadzone: DeadzoneSettings::none(),
            loss: TrackingLossConfig::default(),
            freshness_window_ms: DEFAULT_FRESHNESS_WINDOW_MS,
            extrapolation_enabled: true,
            max_extrapolation_time: headtrack_processing::interpolator::DEFAULT_MAX_EXTRAPOLATION_TIME,
            coordinate: None,
            mapping: None,
        }
    }
}

impl PipelineConfig {
    pub fn validate(&self) -> Result<(), HeadtrackError> {
        if !self.smoothing.is_finite() || !(0.0..=1.0).contains(&self.smoothing) {
            return Err(HeadtrackError::InvalidConfig(format!(
                "smoothing must be within 0..=1, got {}",
                self.smoothing
            )));
        }
        if !self.max_extrapolation_time.is_finite() || self.max_extrapolation_time < 0.0 {
            return Err(HeadtrackError::InvalidConfig(format!(
                "max_extrapolation_time must be >= 0, got {}",
                self.max_extrapolation_time
            )));
        }
        if let Some(mapping) = &self.mapping {
            mapping.validate()?;
        }
        Ok(())
    }
}

/// Result of one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameOutput {
    /// Processed pose; invalid until the first sample has been processed.
    pub pose: Pose,
    /// Rotation to apply to the view.
    pub rotation: Quat,
    /// Aim direction in the tracked camera's local frame.
    pub aim_direction: Vec3,
    pub loss_state: TrackingLossState,
    pub needs_recenter: bool,
}

impl FrameOutput {
    fn neutral(loss_state: TrackingLossState) -> Self {
        Self {
            pose: Pose::invalid(),
            rotation: Quat::IDENTITY,
            aim_direction: Vec3::FORWARD,
            loss_state,
            needs_recenter: false,
        }
    }
}

pub struct TrackingPipeline {
    session_id: Uuid,
    config: PipelineConfig,
    processor: TrackingProcessor,
    interpolator: PoseInterpolator,
    loss: TrackingLossHandler,
    aim: AimDecoupler,
    gameplay: Option<Box<dyn GameplayState + Send>>,
    enabled: bool,
    last_sample_timestamp: Option<i64>,
    seconds_since_sample: f32,
}

impl TrackingPipeline {
    pub fn new(config: PipelineConfig) -> Result<Self, HeadtrackError> {
        config.validate()?;
        let pipeline = Self {
            session_id: Uuid::new_v4(),
            processor: TrackingProcessor::new(config.smoothing, config.sensitivity, config.deadzone),
            interpolator: PoseInterpolator::new(config.max_extrapolation_time),
            loss: TrackingLossHandler::new(config.loss),
            aim: AimDecoupler::default(),
            gameplay: None,
            enabled: true,
            last_sample_timestamp: None,
            seconds_since_sample: 0.0,
            config,
        };
        tracing::info!(session = %pipeline.session_id, "Tracking session started");
        Ok(pipeline)
    }

    /// Gate tracking on the host's gameplay state.
    pub fn with_gameplay_state(mut self, gameplay: Box<dyn GameplayState + Send>) -> Self {
        self.gameplay = Some(gameplay);
        self
    }

    pub fn with_aim_decoupler(mut self, aim: AimDecoupler) -> Self {
        self.aim = aim;
        self
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Replace the configuration.  Center, smoothing and loss state survive.
    pub fn set_config(&mut self, config: PipelineConfig) -> Result<(), HeadtrackError> {
        config.validate()?;
        self.processor.set_smoothing(config.smoothing);
        self.processor.set_sensitivity(config.sensitivity);
        self.processor.set_deadzone(config.deadzone);
        self.interpolator
            .set_max_extrapolation_time(config.max_extrapolation_time);
        self.loss.set_config(config.loss);
        self.config = config;
        tracing::debug!(session = %self.session_id, "Pipeline configuration updated");
        Ok(())
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Disabled pipelines output identity and do not advance any state.
    pub fn set_enabled(&mut self, enabled: bool) {
        if self.enabled != enabled {
            tracing::info!(session = %self.session_id, enabled, "Tracking toggled");
        }
        self.enabled = enabled;
    }

    pub fn processor(&self) -> &TrackingProcessor {
        &self.processor
    }

    pub fn loss_state(&self) -> TrackingLossState {
        self.loss.state()
    }

    // ── Per-frame ───────────────────────────────────────────────────────────

    /// Read the latest pose from `source` and advance one frame.
    pub fn tick(&mut self, source: &dyn PoseSource, dt: f32) -> FrameOutput {
        let raw = if source.is_receiving() {
            source.latest_pose()
        } else {
            Pose::invalid()
        };
        self.process_frame(&raw, source.is_remote_connection(), dt)
    }

    /// Advance one frame with an explicit raw pose.  Pass
    /// [`Pose::invalid`] for a frame without data.
    pub fn process_frame(&mut self, raw: &Pose, is_remote: bool, dt: f32) -> FrameOutput {
        if !self.enabled || !self.in_gameplay() {
            return FrameOutput::neutral(self.loss.state());
        }

        let has_data = self.observe_sample(raw, dt);
        let state = self.loss.update(has_data, dt);

        let pose = if has_data {
            let shaped = self.shape(raw, dt);
            if state == TrackingLossState::Stabilizing {
                let t = self.loss.fade_interpolation(dt);
                self.processor.process_with_factor(&shaped, t)
            } else {
                self.processor.process(&shaped, is_remote, dt)
            }
        } else if state == TrackingLossState::Fading {
            let t = self.loss.fade_interpolation(dt);
            self.processor.fade_toward_identity(t)
        } else {
            self.processor.last_output()
        };

        let rotation = self.processor.rotation();
        FrameOutput {
            pose,
            rotation,
            aim_direction: self.aim.aim_direction(rotation),
            loss_state: state,
            needs_recenter: self.loss.needs_recenter(),
        }
    }

    // ── Recentering ─────────────────────────────────────────────────────────

    /// Make the current orientation neutral and ease back in.
    pub fn recenter(&mut self) {
        tracing::info!(session = %self.session_id, "Recenter requested");
        self.processor.recenter();
        self.loss.request_stabilization();
        self.loss.clear_recenter_flag();
    }

    pub fn recenter_to(&mut self, pose: &Pose) {
        tracing::info!(session = %self.session_id, "Recenter to explicit pose requested");
        self.processor.recenter_to(pose);
        self.loss.clear_recenter_flag();
    }

    /// Dismiss a pending recenter suggestion without recentering.
    pub fn acknowledge_recenter(&mut self) {
        self.loss.clear_recenter_flag();
    }

    /// Drop every piece of per-session state except configuration.
    pub fn reset(&mut self) {
        self.processor.reset();
        self.interpolator.reset();
        self.loss.reset();
        self.last_sample_timestamp = None;
        self.seconds_since_sample = 0.0;
        tracing::info!(session = %self.session_id, "Tracking session reset");
    }

    // ── Internals ───────────────────────────────────────────────────────────

    fn in_gameplay(&self) -> bool {
        self.gameplay.as_ref().is_none_or(|g| g.is_in_gameplay())
    }

    /// Track how long the raw sample has been unchanged; `true` while it is
    /// valid and within the freshness window. Only a strictly newer
    /// timestamp counts as a new sample.
    fn observe_sample(&mut self, raw: &Pose, dt: f32) -> bool {
        if !raw.is_valid() {
            return false;
        }
        if self.last_sample_timestamp.is_none_or(|last| raw.timestamp_us > last) {
            self.last_sample_timestamp = Some(raw.timestamp_us);
            self.seconds_since_sample = 0.0;
        } else if dt.is_finite() && dt > 0.0 {
            self.seconds_since_sample += dt;
        }
        self.seconds_since_sample * 1000.0 < self.config.freshness_window_ms as f32
    }

    fn shape(&mut self, raw: &Pose, dt: f32) -> Pose {
        let mut pose = *raw;
        if let Some(coordinate) = &self.config.coordinate {
            pose = coordinate.transform(&pose);
        }
        if self.config.extrapolation_enabled {
            pose = self.interpolator.update(&pose, dt);
        }
        if let Some(mapping) = &self.config.mapping {
            pose = mapping.apply_pose(&pose);
        }
        pose
    }
}
