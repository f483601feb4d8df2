//! `headtrack-math` – pure math for the head-tracking pipeline.
//!
//! Nothing in this crate allocates or fails: degenerate input degrades to a
//! documented value instead of an error.
//!
//! # Modules
//!
//! - [`quat`] – [`Quat`][quat::Quat] and [`Vec3`][quat::Vec3]: Hamilton
//!   product, conjugate inverse, slerp with shortest-arc and linear fallback,
//!   yaw/pitch/roll conversion in a fixed `Yaw · Pitch · Roll` order.
//! - [`angle`] – wrapping into `[-180, 180]` and shortest angular deltas.
//! - [`deadzone`] – subtractive and two-threshold deadzones.
//! - [`smoothing`] – frame-rate independent exponential smoothing factors and
//!   the remote-source baseline.

pub mod angle;
pub mod deadzone;
pub mod quat;
pub mod smoothing;

pub use quat::{Quat, Vec3};
