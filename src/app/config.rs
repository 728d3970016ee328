use soundslide::{DeviceConfiguration, SharedHidEndpoint, SlideFunction};

use super::usb::UsbHidTransport;

pub(crate) use soundslide::config::{STARTUP_GRACE_MS, TICK_MS};

pub(crate) const USB_POLL_MS: u64 = 1;
pub(crate) const USB_VID: u16 = 0x16c0;
pub(crate) const USB_PID: u16 = 0x27db;
pub(crate) const USB_MANUFACTURER: &str = "SoundSlide";
pub(crate) const USB_PRODUCT: &str = "SoundSlide touch strip";
pub(crate) const USB_SERIAL_NUMBER: &str = "SS-0001";
pub(crate) const HID_POLL_MS: u8 = 10;
pub(crate) const USB_EP_MEMORY_WORDS: usize = 1024;

/// Settings used until a persistent store exists on this board.
pub(crate) const DEVICE_CONFIG: DeviceConfiguration = DeviceConfiguration {
    flip: false,
    scale: 1,
    function: SlideFunction::Volume,
};

/// Shared between the gesture task and the USB task.
pub(crate) static REPORTER: SharedHidEndpoint<UsbHidTransport> = SharedHidEndpoint::new();
