//! [`TrackingLossHandler`] – what to do when tracking data stops.
//!
//! ```text
//!            no data (≤ fade delay)          no data (> fade delay)
//!   Active ───────────────────────▶ Holding ────────────────────▶ Fading
//!     ▲                               │                             │
//!     └──────── data returns ─────────┘          data returns       │
//!     ▲                                                             ▼
//!     └──────── stabilization frames elapsed ───────────────── Stabilizing
//! ```
//!
//! While `Holding` the last rotation is frozen.  While `Fading` the view
//! drifts back toward neutral.  `Stabilizing` blends back in after a fade
//! (or after an explicit [`TrackingLossHandler::request_stabilization`]).
//! A long outage additionally raises a one-shot "needs recenter" flag.

use headtrack_math::smoothing::exponential_factor;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrackingLossState {
    #[default]
    Active,
    Holding,
    Fading,
    Stabilizing,
}

impl TrackingLossState {
    pub fn name(self) -> &'static str {
        match self {
            TrackingLossState::Active => "active",
            TrackingLossState::Holding => "holding",
            TrackingLossState::Fading => "fading",
            TrackingLossState::Stabilizing => "stabilizing",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackingLossConfig {
    /// Seconds without data before the view starts fading to neutral.
    pub fade_delay_seconds: f32,
    /// Exponential rate (1/s) of the fade and stabilization blends.
    pub fade_speed: f32,
    /// Consecutive frames without data before a recenter is suggested.
    pub recenter_threshold_frames: u32,
    /// Frames spent in `Stabilizing` once data returns after a fade.
    pub stabilization_frames: u32,
}

impl Default for TrackingLossConfig {
    fn default() -> Self {
        Self {
            fade_delay_seconds: 0.5,
            fade_speed: 2.0,
            recenter_threshold_frames: 300,
            stabilization_frames: 10,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct TrackingLossHandler {
    config: TrackingLossConfig,
    state: TrackingLossState,
    frames_without_data: u32,
    seconds_without_data: f32,
    stabilization_remaining: u32,
    faded_this_outage: bool,
    needs_recenter: bool,
    recenter_raised: bool,
}

impl TrackingLossHandler {
    pub fn new(config: TrackingLossConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn config(&self) -> &TrackingLossConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: TrackingLossConfig) {
        self.config = config;
    }

    pub fn state(&self) -> TrackingLossState {
        self.state
    }

    pub fn frames_without_data(&self) -> u32 {
        self.frames_without_data
    }

    pub fn seconds_without_data(&self) -> f32 {
        self.seconds_without_data
    }

    pub fn needs_recenter(&self) -> bool {
        self.needs_recenter
    }

    /// Acknowledge the recenter suggestion.  It is not raised again until
    /// data has returned and been lost anew.
    pub fn clear_recenter_flag(&mut self) {
        self.needs_recenter = false;
    }

    /// Advance one frame.
    pub fn update(&mut self, has_valid_data: bool, dt: f32) -> TrackingLossState {
        let next = if has_valid_data {
            self.on_data()
        } else {
            self.on_no_data(dt)
        };
        if next != self.state {
            tracing::debug!(from = self.state.name(), to = next.name(), "Tracking loss state changed");
        }
        self.state = next;
        next
    }

    /// Blend factor for this frame while fading or stabilizing, `0` otherwise.
    pub fn fade_interpolation(&self, dt: f32) -> f32 {
        match self.state {
            TrackingLossState::Fading | TrackingLossState::Stabilizing => {
                exponential_factor(self.config.fade_speed, dt)
            }
            _ => 0.0,
        }
    }

    /// Enter `Stabilizing` for the configured number of frames, e.g. right
    /// after a recenter.
    pub fn request_stabilization(&mut self) {
        self.stabilization_remaining = self.config.stabilization_frames;
        if self.stabilization_remaining > 0 && self.state == TrackingLossState::Active {
            self.state = TrackingLossState::Stabilizing;
        }
    }

    pub fn reset(&mut self) {
        *self = Self::new(self.config);
    }

    fn on_data(&mut self) -> TrackingLossState {
        if self.faded_this_outage {
            self.stabilization_remaining = self.config.stabilization_frames;
        }
        self.frames_without_data = 0;
        self.seconds_without_data = 0.0;
        self.faded_this_outage = false;
        self.recenter_raised = false;

        if self.stabilization_remaining > 0 {
            self.stabilization_remaining -= 1;
            TrackingLossState::Stabilizing
        } else {
            TrackingLossState::Active
        }
    }

    fn on_no_data(&mut self, dt: f32) -> TrackingLossState {
        self.frames_without_data = self.frames_without_data.saturating_add(1);
        if dt.is_finite() && dt > 0.0 {
            self.seconds_without_data += dt;
        }

        if self.frames_without_data > self.config.recenter_threshold_frames && !self.recenter_raised {
            self.needs_recenter = true;
            self.recenter_raised = true;
            tracing::info!(
                frames = self.frames_without_data,
                "Tracking lost for a long time; recenter suggested"
            );
        }

        if self.seconds_without_data > self.config.fade_delay_seconds {
            self.faded_this_outage = true;
            TrackingLossState::Fading
        } else {
            TrackingLossState::Holding
        }
    }
}
