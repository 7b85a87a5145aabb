//! Caller-side seam for consulting an fsync policy.

use std::sync::Arc;

use crate::engine::FsyncControl;

/// Anything a storage path can ask before issuing an fsync.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync`; gates are consulted concurrently
/// from every flushing thread.
///
/// # Object Safety
///
/// This trait is object-safe and can be used as `dyn FsyncGate`.
pub trait FsyncGate: Send + Sync {
    /// Whether the caller should perform its fsync now.
    fn should_fsync(&self) -> bool;
}

impl FsyncGate for FsyncControl {
    fn should_fsync(&self) -> bool {
        FsyncControl::should_fsync(self)
    }
}

impl<G: FsyncGate + ?Sized> FsyncGate for &G {
    fn should_fsync(&self) -> bool {
        (**self).should_fsync()
    }
}

impl<G: FsyncGate + ?Sized> FsyncGate for Arc<G> {
    fn should_fsync(&self) -> bool {
        (**self).should_fsync()
    }
}

/// Gate that honors every fsync.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AlwaysFsync;

impl FsyncGate for AlwaysFsync {
    fn should_fsync(&self) -> bool {
        true
    }
}
