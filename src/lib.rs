//! # fsync-control: runtime fsync admission for storage code paths
//!
//! This crate decides, per fsync request, whether a synchronous flush should
//! actually be performed. Operators can turn fsync off for throughput at
//! runtime; while it is off, a forced-fsync interval guarantees the medium
//! still sees a flush every `force_interval + 2` requests.
//!
//! ## Features
//!
//! - **Lock-free decisions**: one atomic read-modify-write per request, never blocks
//! - **Durability floor**: bounded skip streak while fsync is disabled
//! - **Named control points**: `fsync_enabled`, `do_fsync_counter`, `version`
//! - **Non-fatal registration**: the engine works even if its control device never attaches
//!
//! ## Quick Start
//!
//! ```
//! use fsync_control::{ControlSurface, FsyncControl};
//!
//! let control = FsyncControl::new();
//! let surface = ControlSurface::new(control.clone());
//!
//! // Disabled by default: the first request is skipped.
//! assert!(!control.should_fsync());
//!
//! surface.store("fsync_enabled", b"1\n")?;
//! assert!(control.should_fsync());
//! # Ok::<(), fsync_control::FsyncControlError>(())
//! ```
//!
//! ## Modules
//!
//! - [`errors`]: Error types for control-point writes and registration
//! - [`policy`]: Policy values and defaults
//! - [`engine`]: The `FsyncControl` decision engine
//! - [`control`]: Named, text-addressable control points
//! - [`device`]: Registration of the control points with a host
//! - [`gate`]: Caller-side `FsyncGate` trait
//! - [`stats`]: Decision counters
//! - [`utils`]: Parsing and formatting of control-point values

#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![deny(missing_docs)]

pub mod errors;
pub mod utils;
pub mod policy;
pub mod stats;
pub mod engine;
pub mod control;
pub mod device;
pub mod gate;

pub use control::{Attribute, ControlSurface};
pub use engine::{Decision, FsyncControl, FsyncControlBuilder, FSYNC_CONTROL_VERSION};
pub use errors::FsyncControlError;
pub use gate::{AlwaysFsync, FsyncGate};
pub use policy::{FlushPolicy, StreakOnEnable, DEFAULT_FORCE_INTERVAL};
pub use stats::DecisionStats;
