//! Registration of the control points with a host device registry.
//!
//! The engine never depends on this succeeding: if the host refuses the
//! device or its attribute group, the failure is logged and the engine keeps
//! deciding with whatever policy it already has.

use std::collections::HashMap;
use std::sync::Arc;

use log::{debug, error, info};
use parking_lot::RwLock;

use crate::control::{Attribute, ControlSurface};
use crate::engine::FsyncControl;
use crate::errors::{FsyncControlError, Result};

/// Name the control device registers under.
pub const DEVICE_NAME: &str = "fsynccontrol";

/// Handle to a registered misc device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DeviceId(u32);

impl DeviceId {
    /// Dynamically assigned minor number.
    #[must_use]
    pub fn minor(self) -> u32 {
        self.0
    }
}

/// Registry that exposes devices and their attribute groups to operators.
pub trait DeviceHost: Send + Sync {
    /// Register a misc device under `name`.
    ///
    /// # Errors
    ///
    /// Returns `FsyncControlError::RegistrationFailed` if the host refuses.
    fn register_misc(&self, name: &str) -> Result<DeviceId>;

    /// Attach the attribute group `attrs`, served by `surface`, to `device`.
    ///
    /// # Errors
    ///
    /// Returns `FsyncControlError::RegistrationFailed` if the host refuses.
    fn create_group(&self, device: DeviceId, surface: &ControlSurface, attrs: &[Attribute]) -> Result<()>;

    /// Remove `device` and its attribute group. Unknown devices are ignored.
    fn deregister(&self, device: DeviceId);
}

struct RegisteredDevice {
    name: String,
    group: Option<(ControlSurface, Vec<Attribute>)>,
}

#[derive(Default)]
struct HostState {
    next_minor: u32,
    devices: HashMap<DeviceId, RegisteredDevice>,
}

/// In-process [`DeviceHost`] that serves attribute reads and writes by name.
///
/// Can be told to refuse device registration or group creation to exercise
/// failure handling.
#[derive(Default)]
pub struct InMemoryHost {
    state: RwLock<HostState>,
    refuse_device: bool,
    refuse_group: bool,
}

impl std::fmt::Debug for InMemoryHost {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryHost")
            .field("devices", &self.state.read().devices.len())
            .field("refuse_device", &self.refuse_device)
            .field("refuse_group", &self.refuse_group)
            .finish()
    }
}

impl InMemoryHost {
    /// Create an empty host that accepts every registration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Refuse every device registration.
    #[must_use]
    pub fn refuse_device_registration(mut self) -> Self {
        self.refuse_device = true;
        self
    }

    /// Accept devices but refuse every attribute group.
    #[must_use]
    pub fn refuse_group_creation(mut self) -> Self {
        self.refuse_group = true;
        self
    }

    /// Whether a device named `name` is registered.
    #[must_use]
    pub fn is_registered(&self, name: &str) -> bool {
        self.find(name).is_some()
    }

    /// Attributes exposed under device `name`, in group order.
    #[must_use]
    pub fn attributes(&self, name: &str) -> Vec<Attribute> {
        let state = self.state.read();
        state
            .devices
            .values()
            .find(|dev| dev.name == name)
            .and_then(|dev| dev.group.as_ref())
            .map(|(_, attrs)| attrs.clone())
            .unwrap_or_default()
    }

    /// Read attribute `attr` of device `device`.
    ///
    /// # Errors
    ///
    /// Returns `FsyncControlError::UnknownAttribute` if the device or attribute is not exposed.
    pub fn show(&self, device: &str, attr: &str) -> Result<String> {
        self.surface_for(device, attr)?.show(attr)
    }

    /// Write `buf` to attribute `attr` of device `device`.
    ///
    /// # Errors
    ///
    /// Returns `FsyncControlError::UnknownAttribute` if the device or attribute
    /// is not exposed, `FsyncControlError::ReadOnly` for read-only attributes.
    pub fn store(&self, device: &str, attr: &str, buf: &[u8]) -> Result<usize> {
        self.surface_for(device, attr)?.store(attr, buf)
    }

    fn find(&self, name: &str) -> Option<DeviceId> {
        self.state
            .read()
            .devices
            .iter()
            .find(|(_, dev)| dev.name == name)
            .map(|(id, _)| *id)
    }

    fn surface_for(&self, device: &str, attr: &str) -> Result<ControlSurface> {
        let path = format!("{device}/{attr}");
        let state = self.state.read();
        let (surface, attrs) = state
            .devices
            .values()
            .find(|dev| dev.name == device)
            .and_then(|dev| dev.group.as_ref())
            .ok_or_else(|| FsyncControlError::UnknownAttribute(path.clone()))?;
        if !attrs.iter().any(|a| a.name() == attr) {
            return Err(FsyncControlError::UnknownAttribute(path));
        }
        Ok(surface.clone())
    }
}

impl DeviceHost for InMemoryHost {
    fn register_misc(&self, name: &str) -> Result<DeviceId> {
        if self.refuse_device {
            return Err(FsyncControlError::RegistrationFailed(format!(
                "misc_register({name}) refused by host"
            )));
        }
        let mut state = self.state.write();
        if state.devices.values().any(|dev| dev.name == name) {
            return Err(FsyncControlError::RegistrationFailed(format!(
                "device {name} already registered"
            )));
        }
        let id = DeviceId(state.next_minor);
        state.next_minor += 1;
        state.devices.insert(
            id,
            RegisteredDevice {
                name: name.to_owned(),
                group: None,
            },
        );
        Ok(id)
    }

    fn create_group(&self, device: DeviceId, surface: &ControlSurface, attrs: &[Attribute]) -> Result<()> {
        if self.refuse_group {
            return Err(FsyncControlError::RegistrationFailed(
                "attribute group refused by host".into(),
            ));
        }
        let mut state = self.state.write();
        let dev = state.devices.get_mut(&device).ok_or_else(|| {
            FsyncControlError::RegistrationFailed(format!("no device with minor {}", device.minor()))
        })?;
        dev.group = Some((surface.clone(), attrs.to_vec()));
        Ok(())
    }

    fn deregister(&self, device: DeviceId) {
        self.state.write().devices.remove(&device);
    }
}

/// How far registration got.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Attachment {
    /// Device and attribute group are registered.
    Attached,
    /// The device is registered but its attribute group is not.
    DeviceOnly,
    /// Nothing is registered.
    Detached,
}

/// The fsync control device: an engine plus its registration with a host.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use fsync_control::device::{Attachment, FsyncControlDevice, InMemoryHost, DEVICE_NAME};
/// use fsync_control::FsyncControl;
///
/// let host = Arc::new(InMemoryHost::new());
/// let device = FsyncControlDevice::install(host.clone(), FsyncControl::new());
/// assert_eq!(device.attachment(), Attachment::Attached);
///
/// host.store(DEVICE_NAME, "fsync_enabled", b"1\n")?;
/// assert!(device.control().should_fsync());
/// # Ok::<(), fsync_control::FsyncControlError>(())
/// ```
pub struct FsyncControlDevice {
    host: Arc<dyn DeviceHost>,
    surface: ControlSurface,
    device: Option<DeviceId>,
    attachment: Attachment,
}

impl std::fmt::Debug for FsyncControlDevice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FsyncControlDevice")
            .field("control", self.surface.control())
            .field("device", &self.device)
            .field("attachment", &self.attachment)
            .finish()
    }
}

impl FsyncControlDevice {
    /// Register the control device and its attributes with `host`.
    ///
    /// Never fails: registration errors are logged and reflected in
    /// [`attachment`](Self::attachment).
    pub fn install(host: Arc<dyn DeviceHost>, control: FsyncControl) -> Self {
        let surface = ControlSurface::new(control);
        info!("fsync_control: misc_register({DEVICE_NAME})");

        let (device, attachment) = match host.register_misc(DEVICE_NAME) {
            Err(e) => {
                error!("fsync_control: misc_register({DEVICE_NAME}) fail: {e}");
                (None, Attachment::Detached)
            }
            Ok(id) => match host.create_group(id, &surface, &Attribute::ALL) {
                Ok(()) => (Some(id), Attachment::Attached),
                Err(e) => {
                    error!("fsync_control: failed to create attribute group for {DEVICE_NAME}: {e}");
                    (Some(id), Attachment::DeviceOnly)
                }
            },
        };

        Self {
            host,
            surface,
            device,
            attachment,
        }
    }

    /// The engine served by this device.
    #[must_use]
    pub fn control(&self) -> &FsyncControl {
        self.surface.control()
    }

    /// Control points served by this device.
    #[must_use]
    pub fn surface(&self) -> &ControlSurface {
        &self.surface
    }

    /// Registration state.
    #[must_use]
    pub fn attachment(&self) -> Attachment {
        self.attachment
    }

    /// Assigned device handle, if registration succeeded.
    #[must_use]
    pub fn device(&self) -> Option<DeviceId> {
        self.device
    }

    /// Deregister from the host and reset the engine to its defaults.
    pub fn teardown(self) {
        if let Some(id) = self.device {
            self.host.deregister(id);
            debug!("fsync_control: deregistered {DEVICE_NAME} (minor {})", id.minor());
        }
        self.surface.control().reset();
    }
}
