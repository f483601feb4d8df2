//! `headtrack-runtime` – session orchestration for the head-tracking stack.
//!
//! - [`pipeline`]: [`TrackingPipeline`], an explicitly owned session that
//!   drives every stage once per frame.
//! - [`source`]: the [`PoseSource`] / [`GameplayState`] seams and the
//!   [`PoseSlot`] single-slot handoff.
//! - [`telemetry`]: `tracing` subscriber setup with optional OTLP export.

pub mod pipeline;
pub mod source;
pub mod telemetry;

pub use pipeline::{FrameOutput, PipelineConfig, TrackingPipeline};
pub use source::{GameplayState, PoseSlot, PoseSource};
