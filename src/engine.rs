//! Flush admission engine: the per-request fsync decision.

use std::sync::{
    atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering},
    Arc,
};

use log::info;

use crate::policy::{FlushPolicy, StreakOnEnable};
use crate::stats::{Counters, DecisionStats};

/// Interface revision reported by the `version` control point.
pub const FSYNC_CONTROL_VERSION: u32 = 1;

/// Outcome of a single admission decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Policy is enabled; the fsync goes through.
    Honored,
    /// Policy is disabled but the skip streak exceeded the force interval.
    Forced,
    /// The fsync is skipped.
    Skipped,
}

impl Decision {
    /// Whether the caller should perform the fsync.
    #[must_use]
    pub fn is_fsync(self) -> bool {
        !matches!(self, Decision::Skipped)
    }
}

struct Inner {
    enabled: AtomicBool,
    force_interval: AtomicU32,
    // Consecutive skips since the last forced fsync.
    skip_streak: AtomicU64,
    streak_on_enable: StreakOnEnable,
    defaults: FlushPolicy,
    counters: Counters,
}

/// Runtime fsync admission policy with a forced-fsync floor.
///
/// Storage code calls [`should_fsync`](Self::should_fsync) before each
/// synchronous flush and obeys the answer. While fsync is disabled, every
/// `force_interval + 2`-th call is forced through so the medium still sees
/// periodic flushes.
///
/// # Examples
///
/// ```
/// use fsync_control::FsyncControl;
///
/// let control = FsyncControl::builder().force_interval(2).build();
///
/// // Disabled by default: three skips, then one forced fsync.
/// let decisions: Vec<bool> = (0..4).map(|_| control.should_fsync()).collect();
/// assert_eq!(decisions, [false, false, false, true]);
///
/// control.set_enabled(true);
/// assert!(control.should_fsync());
/// ```
///
/// Cloning is cheap; clones share the same policy and skip streak. Build
/// separate instances for independent state.
#[derive(Clone)]
pub struct FsyncControl {
    inner: Arc<Inner>,
}

impl std::fmt::Debug for FsyncControl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FsyncControl")
            .field("enabled", &self.enabled())
            .field("force_interval", &self.force_interval())
            .field("skip_streak", &self.skip_streak())
            .field("streak_on_enable", &self.inner.streak_on_enable)
            .finish()
    }
}

impl Default for FsyncControl {
    fn default() -> Self {
        Self::new()
    }
}

impl FsyncControl {
    /// Create an engine with the default policy (disabled, interval 1000).
    #[must_use]
    pub fn new() -> Self {
        Self::with_policy(FlushPolicy::default())
    }

    /// Create an engine starting from `policy`.
    #[must_use]
    pub fn with_policy(policy: FlushPolicy) -> Self {
        Self::builder().policy(policy).build()
    }

    /// Start building an engine.
    #[must_use]
    pub fn builder() -> FsyncControlBuilder {
        FsyncControlBuilder::default()
    }

    /// Decide whether the caller should perform its fsync.
    ///
    /// Never blocks and never fails. Safe to call concurrently from any
    /// number of threads.
    #[must_use]
    pub fn should_fsync(&self) -> bool {
        self.decide().is_fsync()
    }

    /// Decide and report why.
    #[must_use]
    pub fn decide(&self) -> Decision {
        let inner = &*self.inner;
        if inner.enabled.load(Ordering::Acquire) {
            inner.counters.record_honored();
            return Decision::Honored;
        }

        let interval = u64::from(inner.force_interval.load(Ordering::Acquire));
        if interval != 0 {
            // Single RMW: concurrent callers can neither lose an increment
            // nor both force on the same streak.
            let prev = match inner
                .skip_streak
                .fetch_update(Ordering::AcqRel, Ordering::Acquire, |streak| {
                    if streak > interval {
                        Some(0)
                    } else {
                        Some(streak.saturating_add(1))
                    }
                }) {
                Ok(prev) | Err(prev) => prev,
            };
            if prev > interval {
                info!("fsync_control: do fsync");
                inner.counters.record_forced();
                return Decision::Forced;
            }
        }

        inner.counters.record_skipped();
        Decision::Skipped
    }

    /// Switch fsync on or off. Takes effect for the next decision.
    pub fn set_enabled(&self, enabled: bool) {
        let was = self.inner.enabled.swap(enabled, Ordering::AcqRel);
        if enabled {
            if !was && self.inner.streak_on_enable == StreakOnEnable::Reset {
                self.inner.skip_streak.store(0, Ordering::Release);
            }
            info!("fsync_control: fsync enabled");
        } else {
            info!("fsync_control: fsync disabled");
        }
    }

    /// Set the number of consecutive skips tolerated before a forced fsync.
    /// `0` disables forcing.
    pub fn set_force_interval(&self, interval: u32) {
        self.inner.force_interval.store(interval, Ordering::Release);
        info!("fsync_control: do_fsync_counter = {interval}");
    }

    /// Whether fsync is currently honored by policy.
    #[must_use]
    pub fn enabled(&self) -> bool {
        self.inner.enabled.load(Ordering::Acquire)
    }

    /// Current force interval.
    #[must_use]
    pub fn force_interval(&self) -> u32 {
        self.inner.force_interval.load(Ordering::Acquire)
    }

    /// Interface revision; constant.
    #[must_use]
    pub fn version(&self) -> u32 {
        FSYNC_CONTROL_VERSION
    }

    /// Snapshot of the current policy.
    #[must_use]
    pub fn policy(&self) -> FlushPolicy {
        FlushPolicy {
            enabled: self.enabled(),
            force_interval: self.force_interval(),
        }
    }

    /// How the skip streak is treated when fsync is switched on.
    #[must_use]
    pub fn streak_on_enable(&self) -> StreakOnEnable {
        self.inner.streak_on_enable
    }

    /// Current skip streak. Diagnostic read only; it cannot be written.
    #[must_use]
    pub fn skip_streak(&self) -> u64 {
        self.inner.skip_streak.load(Ordering::Acquire)
    }

    /// Counters of decisions made since construction or the last [`reset`](Self::reset).
    #[must_use]
    pub fn stats(&self) -> DecisionStats {
        self.inner.counters.snapshot()
    }

    /// Restore the policy this engine was built with and zero all runtime state.
    pub fn reset(&self) {
        let defaults = self.inner.defaults;
        self.inner.enabled.store(defaults.enabled, Ordering::Release);
        self.inner
            .force_interval
            .store(defaults.force_interval, Ordering::Release);
        self.inner.skip_streak.store(0, Ordering::Release);
        self.inner.counters.reset();
    }
}

/// Builder for [`FsyncControl`].
#[derive(Debug, Clone, Copy, Default)]
pub struct FsyncControlBuilder {
    policy: FlushPolicy,
    streak_on_enable: StreakOnEnable,
}

impl FsyncControlBuilder {
    /// Initial (and reset) policy.
    #[must_use]
    pub fn policy(mut self, policy: FlushPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Initial enabled flag.
    #[must_use]
    pub fn enabled(mut self, enabled: bool) -> Self {
        self.policy.enabled = enabled;
        self
    }

    /// Initial force interval.
    #[must_use]
    pub fn force_interval(mut self, interval: u32) -> Self {
        self.policy.force_interval = interval;
        self
    }

    /// Skip streak handling on enable.
    #[must_use]
    pub fn streak_on_enable(mut self, mode: StreakOnEnable) -> Self {
        self.streak_on_enable = mode;
        self
    }

    /// Build the engine.
    #[must_use]
    pub fn build(self) -> FsyncControl {
        FsyncControl {
            inner: Arc::new(Inner {
                enabled: AtomicBool::new(self.policy.enabled),
                force_interval: AtomicU32::new(self.policy.force_interval),
                skip_streak: AtomicU64::new(0),
                streak_on_enable: self.streak_on_enable,
                defaults: self.policy,
                counters: Counters::default(),
            }),
        }
    }
}
