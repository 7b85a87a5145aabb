//! Flush policy configuration for [`FsyncControl`](crate::FsyncControl).
//!
//! Controls whether fsync requests are honored and how many consecutive
//! skips are tolerated before one is forced through.

/// Default number of consecutive skips tolerated while fsync is disabled.
pub const DEFAULT_FORCE_INTERVAL: u32 = 1000;

/// Persistent admission policy.
///
/// This is a plain snapshot; the engine stores each field in its own atomic
/// so writers never block the decision path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlushPolicy {
    /// Honor every fsync when true. Defaults to false (fsync skipped by policy).
    pub enabled: bool,
    /// Consecutive skips tolerated before a forced fsync. `0` never forces.
    pub force_interval: u32,
}

impl Default for FlushPolicy {
    fn default() -> Self {
        Self {
            enabled: false,
            force_interval: DEFAULT_FORCE_INTERVAL,
        }
    }
}

impl FlushPolicy {
    /// Policy that honors every fsync.
    #[must_use]
    pub fn honor_all() -> Self {
        Self {
            enabled: true,
            ..Self::default()
        }
    }

    /// Policy that skips every fsync and never forces one through.
    #[must_use]
    pub fn skip_all() -> Self {
        Self {
            enabled: false,
            force_interval: 0,
        }
    }

    /// Whether a disabled policy with this interval will ever force an fsync.
    #[must_use]
    pub fn forces(&self) -> bool {
        !self.enabled && self.force_interval != 0
    }
}

/// What happens to the skip streak when fsync is switched on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StreakOnEnable {
    /// Leave the streak frozen; counting resumes from it once fsync is disabled again.
    #[default]
    Preserve,
    /// Zero the streak on every disabled -> enabled transition.
    Reset,
}
