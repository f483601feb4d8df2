//! `headtrack-mapping` – axis mapping and coordinate conventions.
//!
//! Sits between the raw pose source and the tracking processor, reshaping
//! individual channels before any rotation math happens.
//!
//! # Modules
//!
//! - [`axis`] – [`AxisConfig`][axis::AxisConfig]: per-axis deadzone, response
//!   curve, sensitivity, inversion and clamp, plus the six-channel
//!   [`AxisChannels`][axis::AxisChannels] sample.
//! - [`mapping_config`] – [`MappingConfig`][mapping_config::MappingConfig]:
//!   the set of axis configs applied to a whole sample.
//! - [`coordinate`] – [`CoordinateTransformer`][coordinate::CoordinateTransformer]:
//!   stateless remap/invert of yaw, pitch and roll between two conventions.
//! - [`profile`] – flat `key = value` load/save of a
//!   [`MappingConfig`][mapping_config::MappingConfig].

pub mod axis;
pub mod coordinate;
pub mod mapping_config;
pub mod profile;

pub use axis::{AxisChannels, AxisConfig, CurveKind};
pub use coordinate::{AxisMapping, CoordinateTransformer};
pub use mapping_config::MappingConfig;
pub use profile::{format_profile, load_profile, parse_profile, save_profile};
