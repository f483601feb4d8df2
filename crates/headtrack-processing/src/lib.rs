//! `headtrack-processing` – the stateful per-frame stages.
//!
//! - [`center`]: reference orientation and offset application.
//! - [`smoothing`]: exponential quaternion smoothing state.
//! - [`interpolator`]: bounded extrapolation between sparse samples.
//! - [`processor`]: sensitivity, deadzone, centering and smoothing in order.
//! - [`loss`]: hold / fade / stabilize behavior when data stops.
//! - [`aim`]: aim direction decoupled from head motion.
//!
//! Every stage is owned by a single caller and mutated through `&mut self`;
//! none of them lock or allocate per frame.

pub mod aim;
pub mod center;
pub mod interpolator;
pub mod loss;
pub mod processor;
pub mod smoothing;

pub use aim::AimDecoupler;
pub use center::CenterOffsetManager;
pub use interpolator::PoseInterpolator;
pub use loss::{TrackingLossConfig, TrackingLossHandler, TrackingLossState};
pub use processor::TrackingProcessor;
pub use smoothing::SmoothedRotation;
