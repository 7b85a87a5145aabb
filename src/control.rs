//! Named control points for inspecting and changing the fsync policy.
//!
//! Two layers are exposed. [`ControlSurface::get`] and [`ControlSurface::set`]
//! are the typed store: writes either apply or fail with a
//! [`FsyncControlError`]. [`ControlSurface::show`] and [`ControlSurface::store`]
//! are the text transport an operator talks to: `store` always consumes the
//! whole buffer and reports rejected values through the log instead of the
//! return value.

use std::fmt;

use log::warn;

use crate::engine::FsyncControl;
use crate::errors::{FsyncControlError, Result};
use crate::utils::{format_value, parse_unsigned};

/// A named control point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Attribute {
    /// `fsync_enabled`: `1` honors every fsync, `0` skips by policy.
    FsyncEnabled,
    /// `version`: read-only interface revision.
    Version,
    /// `do_fsync_counter`: the force interval.
    DoFsyncCounter,
}

impl Attribute {
    /// Every control point, in registration order.
    pub const ALL: [Attribute; 3] = [
        Attribute::FsyncEnabled,
        Attribute::Version,
        Attribute::DoFsyncCounter,
    ];

    /// Name the control point is addressed by.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Attribute::FsyncEnabled => "fsync_enabled",
            Attribute::Version => "version",
            Attribute::DoFsyncCounter => "do_fsync_counter",
        }
    }

    /// Look up a control point by name.
    ///
    /// # Errors
    ///
    /// Returns `FsyncControlError::UnknownAttribute` for any other name.
    pub fn from_name(name: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|attr| attr.name() == name)
            .ok_or_else(|| FsyncControlError::UnknownAttribute(name.to_owned()))
    }

    /// Whether writes are accepted.
    #[must_use]
    pub fn is_writable(self) -> bool {
        !matches!(self, Attribute::Version)
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Control points bound to one [`FsyncControl`].
///
/// # Examples
///
/// ```
/// use fsync_control::{ControlSurface, FsyncControl};
///
/// let surface = ControlSurface::new(FsyncControl::new());
/// assert_eq!(surface.show("fsync_enabled")?, "0\n");
///
/// surface.store("fsync_enabled", b"1\n")?;
/// assert_eq!(surface.show("fsync_enabled")?, "1\n");
///
/// // Rejected values are consumed but leave state unchanged.
/// assert_eq!(surface.store("do_fsync_counter", b"abc")?, 3);
/// assert_eq!(surface.show("do_fsync_counter")?, "1000\n");
/// # Ok::<(), fsync_control::FsyncControlError>(())
/// ```
#[derive(Debug, Clone)]
pub struct ControlSurface {
    control: FsyncControl,
}

impl ControlSurface {
    /// Bind control points to `control`.
    #[must_use]
    pub fn new(control: FsyncControl) -> Self {
        Self { control }
    }

    /// The engine behind these control points.
    #[must_use]
    pub fn control(&self) -> &FsyncControl {
        &self.control
    }

    /// Current numeric value of a control point.
    #[must_use]
    pub fn get(&self, attr: Attribute) -> u32 {
        match attr {
            Attribute::FsyncEnabled => u32::from(self.control.enabled()),
            Attribute::Version => self.control.version(),
            Attribute::DoFsyncCounter => self.control.force_interval(),
        }
    }

    /// Parse `input` and apply it to a control point.
    ///
    /// # Errors
    ///
    /// Returns `FsyncControlError::ReadOnly` for `version`,
    /// `FsyncControlError::InvalidInput` if `input` does not start with an
    /// unsigned integer, and `FsyncControlError::OutOfRange` for
    /// `fsync_enabled` values other than 0 or 1. State is unchanged on error.
    pub fn set(&self, attr: Attribute, input: &str) -> Result<()> {
        let parse = || {
            parse_unsigned(input).ok_or_else(|| FsyncControlError::InvalidInput {
                attribute: attr.name(),
                input: input.to_owned(),
            })
        };
        match attr {
            Attribute::Version => Err(FsyncControlError::ReadOnly(attr.name())),
            Attribute::FsyncEnabled => match parse()? {
                0 => {
                    self.control.set_enabled(false);
                    Ok(())
                }
                1 => {
                    self.control.set_enabled(true);
                    Ok(())
                }
                value => Err(FsyncControlError::OutOfRange {
                    attribute: attr.name(),
                    value,
                }),
            },
            Attribute::DoFsyncCounter => {
                self.control.set_force_interval(parse()?);
                Ok(())
            }
        }
    }

    /// Read a control point by name as text.
    ///
    /// # Errors
    ///
    /// Returns `FsyncControlError::UnknownAttribute` for an unknown name.
    pub fn show(&self, name: &str) -> Result<String> {
        let attr = Attribute::from_name(name)?;
        Ok(format_value(self.get(attr)))
    }

    /// Write text to a control point by name, returning the bytes consumed.
    ///
    /// The whole buffer is always reported as consumed. A value that fails to
    /// parse or is out of range is logged and ignored; read the control point
    /// back to learn whether the write took effect.
    ///
    /// # Errors
    ///
    /// Returns `FsyncControlError::UnknownAttribute` for an unknown name and
    /// `FsyncControlError::ReadOnly` for `version`.
    pub fn store(&self, name: &str, buf: &[u8]) -> Result<usize> {
        let attr = Attribute::from_name(name)?;
        let input = String::from_utf8_lossy(buf);
        match self.set(attr, &input) {
            Ok(()) => {}
            Err(e @ FsyncControlError::ReadOnly(_)) => return Err(e),
            Err(e) => warn!("fsync_control: {e}"),
        }
        Ok(buf.len())
    }
}
