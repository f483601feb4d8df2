//! Collaborator seams: where raw poses come from and whether to use them.
//!
//! The receiver that produces poses runs on its own thread and publishes
//! into a [`PoseSlot`].  The pipeline only ever reads the latest pose, so
//! coalesced or repeated samples are normal.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, PoisonError};

use headtrack_types::Pose;

/// Non-blocking access to the most recent raw pose.
pub trait PoseSource {
    /// Latest pose, or [`Pose::invalid`] if nothing has arrived.
    fn latest_pose(&self) -> Pose;

    fn is_receiving(&self) -> bool;

    /// Remote (network) sources get a higher smoothing floor.
    fn is_remote_connection(&self) -> bool;
}

/// Host-provided gameplay gate.  Tracking is suspended while it returns
/// `false` (menus, loading screens, ...).
pub trait GameplayState {
    fn is_in_gameplay(&self) -> bool;
}

impl<F> GameplayState for F
where
    F: Fn() -> bool,
{
    fn is_in_gameplay(&self) -> bool {
        self()
    }
}

/// Single-slot handoff between a receiver thread and the frame thread.
///
/// Writers overwrite; readers copy.  A poisoned lock still yields the last
/// written pose.
#[derive(Debug, Default)]
pub struct PoseSlot {
    pose: Mutex<Pose>,
    receiving: AtomicBool,
    remote: AtomicBool,
}

impl PoseSlot {
    pub fn new(remote: bool) -> Self {
        Self {
            remote: AtomicBool::new(remote),
            ..Self::default()
        }
    }

    /// Store `pose` as the latest sample and mark the slot as receiving.
    pub fn publish(&self, pose: Pose) {
        *self.pose.lock().unwrap_or_else(PoisonError::into_inner) = pose;
        self.receiving.store(true, Ordering::Release);
    }

    pub fn set_receiving(&self, receiving: bool) {
        self.receiving.store(receiving, Ordering::Release);
    }

    pub fn set_remote(&self, remote: bool) {
        self.remote.store(remote, Ordering::Release);
    }

    /// Forget the stored pose and stop receiving.
    pub fn clear(&self) {
        *self.pose.lock().unwrap_or_else(PoisonError::into_inner) = Pose::invalid();
        self.receiving.store(false, Ordering::Release);
    }
}

impl PoseSource for PoseSlot {
    fn latest_pose(&self) -> Pose {
        *self.pose.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn is_receiving(&self) -> bool {
        self.receiving.load(Ordering::Acquire)
    }

    fn is_remote_connection(&self) -> bool {
        self.remote.load(Ordering::Acquire)
    }
}
