//! uinput-based destination device.

use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

use evdev::raw_stream::RawDevice;
use evdev::uinput::VirtualDevice;
use evdev::{
    AbsoluteAxisCode, AttributeSet, BusType, KeyCode as EvdevKey, MiscCode, PropType,
    RelativeAxisCode, SwitchCode, UinputAbsSetup,
};
use touchpad_relay_types::{DeviceDescription, EventKind, RawEvent};
use tracing::{debug, info};

use super::convert;
use crate::error::InputError;
use crate::EventSink;

/// How long to wait for udev to create the event node of a new device.
const DEVNODE_ATTEMPTS: u32 = 50;
const DEVNODE_RETRY_DELAY: Duration = Duration::from_millis(20);

/// Emulated device created through uinput from a [`DeviceDescription`].
///
/// Events are written to the device's `/dev/input/event*` node one at a
/// time, so frame boundaries come only from the `SYN_REPORT` events
/// relayed from the source. Dropping the sink destroys the device.
pub struct UinputSink {
    // Kept alive for the lifetime of the sink; dropping it removes the node.
    _device: VirtualDevice,
    devnode: PathBuf,
    node: RawDevice,
}

impl UinputSink {
    /// Create the virtual device, optionally overriding its name.
    pub fn create(description: &DeviceDescription, name: Option<&str>) -> Result<Self, InputError> {
        let name = name.unwrap_or(&description.name);
        let mut device = build_virtual_device(description, name)?;

        let devnode = device
            .enumerate_dev_nodes_blocking()
            .map_err(|e| InputError::VirtualDeviceCreate(e.to_string()))?
            .find_map(Result::ok)
            .ok_or_else(|| {
                InputError::VirtualDeviceCreate("virtual device has no event node".to_string())
            })?;

        let node = open_devnode(&devnode)?;
        info!(name = %name, devnode = %devnode.display(), "created virtual device");

        Ok(Self {
            _device: device,
            devnode,
            node,
        })
    }
}

fn open_devnode(devnode: &Path) -> Result<RawDevice, InputError> {
    let mut attempt = 1;
    loop {
        match RawDevice::open(devnode) {
            Ok(node) => return Ok(node),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound && attempt < DEVNODE_ATTEMPTS => {
                debug!(devnode = %devnode.display(), attempt, "waiting for event node");
                attempt += 1;
                thread::sleep(DEVNODE_RETRY_DELAY);
            }
            Err(e) => {
                return Err(InputError::VirtualDeviceCreate(format!(
                    "{}: {e}",
                    devnode.display()
                )))
            }
        }
    }
}

fn build_virtual_device(
    description: &DeviceDescription,
    name: &str,
) -> Result<VirtualDevice, InputError> {
    let create_err = |e: std::io::Error| InputError::VirtualDeviceCreate(e.to_string());

    let id = description.id;
    let mut builder = VirtualDevice::builder()
        .map_err(create_err)?
        .name(name)
        .input_id(evdev::InputId::new(
            BusType(id.bustype),
            id.vendor,
            id.product,
            id.version,
        ));

    let mut props = AttributeSet::<PropType>::new();
    for prop in &description.properties {
        props.insert(PropType(*prop));
    }
    builder = builder.with_properties(&props).map_err(create_err)?;

    let mut keys = AttributeSet::<EvdevKey>::new();
    for code in description.codes_for(EventKind::Key) {
        keys.insert(EvdevKey(code));
    }
    if keys.iter().next().is_some() {
        builder = builder.with_keys(&keys).map_err(create_err)?;
    }

    let mut rel = AttributeSet::<RelativeAxisCode>::new();
    for code in description.codes_for(EventKind::Relative) {
        rel.insert(RelativeAxisCode(code));
    }
    if rel.iter().next().is_some() {
        builder = builder.with_relative_axes(&rel).map_err(create_err)?;
    }

    let mut msc = AttributeSet::<MiscCode>::new();
    for code in description.codes_for(EventKind::Misc) {
        msc.insert(MiscCode(code));
    }
    if msc.iter().next().is_some() {
        builder = builder.with_msc(&msc).map_err(create_err)?;
    }

    let mut switches = AttributeSet::<SwitchCode>::new();
    for code in description.codes_for(EventKind::Switch) {
        switches.insert(SwitchCode(code));
    }
    if switches.iter().next().is_some() {
        builder = builder.with_switches(&switches).map_err(create_err)?;
    }

    for (code, axis) in &description.axes {
        let setup = UinputAbsSetup::new(AbsoluteAxisCode(*code), convert::absinfo_from_axis(axis));
        builder = builder.with_absolute_axis(&setup).map_err(create_err)?;
    }

    builder.build().map_err(create_err)
}

impl EventSink for UinputSink {
    fn devnode(&self) -> &Path {
        &self.devnode
    }

    fn write(&mut self, event: &RawEvent) -> Result<(), InputError> {
        self.node
            .send_events(&[convert::event_to_evdev(event)])
            .map_err(|e| InputError::Write(format!("{}: {e}", self.devnode.display())))
    }
}
