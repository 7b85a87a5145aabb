//! Crate-specific error types for fsync-control.

use thiserror::Error;

/// Result alias for fsync-control operations.
pub type Result<T> = std::result::Result<T, FsyncControlError>;

/// Error type covering control-point writes and device registration.
///
/// None of these are fatal: the decision engine keeps answering with its
/// current (or default) policy whatever happens on the control surface.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FsyncControlError {
    /// A write did not parse as an unsigned decimal integer.
    #[error("invalid input for {attribute}: {input:?}")]
    InvalidInput {
        /// Control point that received the write.
        attribute: &'static str,
        /// The rejected input, verbatim.
        input: String,
    },

    /// A well-formed number outside the accepted domain of a boolean control point.
    #[error("invalid input range for {attribute}: {value}")]
    OutOfRange {
        /// Control point that received the write.
        attribute: &'static str,
        /// The parsed, rejected value.
        value: u32,
    },

    /// Attempted write to a read-only control point.
    #[error("control point is read-only: {0}")]
    ReadOnly(&'static str),

    /// Lookup of a control point that does not exist.
    #[error("unknown control point: {0}")]
    UnknownAttribute(String),

    /// The host refused to register the device or its attribute group.
    #[error("registration failed: {0}")]
    RegistrationFailed(String),
}
