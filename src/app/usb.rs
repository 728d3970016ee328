use core::ptr::addr_of_mut;

use esp_hal::{
    otg_fs::{Usb, UsbBus},
    peripherals::{GPIO19, GPIO20, USB0},
};
use log::trace;
use soundslide::{
    hid::{TransportError, REPORT_DESCRIPTOR},
    HidReport, ReportTransport,
};
use static_cell::StaticCell;
use usb_device::{class_prelude::*, LangID, UsbError};
use usbd_hid::hid_class::HIDClass;

use super::config::{HID_POLL_MS, USB_EP_MEMORY_WORDS};

pub(crate) type StripUsbBus = UsbBus<Usb<'static>>;

static USB_BUS: StaticCell<UsbBusAllocator<StripUsbBus>> = StaticCell::new();
static mut EP_MEMORY: [u32; USB_EP_MEMORY_WORDS] = [0; USB_EP_MEMORY_WORDS];

pub(crate) fn init_bus(
    usb0: USB0<'static>,
    dp: GPIO20<'static>,
    dm: GPIO19<'static>,
) -> &'static UsbBusAllocator<StripUsbBus> {
    let usb = Usb::new(usb0, dp, dm);
    // Only reference ever taken to EP_MEMORY.
    let ep_memory = unsafe { &mut *addr_of_mut!(EP_MEMORY) };
    USB_BUS.init(UsbBus::new(usb, ep_memory))
}

/// usbd-hid class that also remembers when the host has collected the last
/// input report, or reset the bus under it, so the sequencer can be told
/// outside of `UsbDevice::poll`.
pub(crate) struct HidReportClass {
    inner: HIDClass<'static, StripUsbBus>,
    collected: bool,
    bus_reset: bool,
}

impl HidReportClass {
    pub(crate) fn new(bus: &'static UsbBusAllocator<StripUsbBus>) -> Self {
        Self {
            inner: HIDClass::new(bus, REPORT_DESCRIPTOR, HID_POLL_MS),
            collected: false,
            bus_reset: false,
        }
    }

    pub(crate) fn take_collected(&mut self) -> bool {
        core::mem::take(&mut self.collected)
    }

    /// A report queued before the reset will never complete.
    pub(crate) fn take_bus_reset(&mut self) -> bool {
        core::mem::take(&mut self.bus_reset)
    }
}

impl UsbClass<StripUsbBus> for HidReportClass {
    fn get_configuration_descriptors(&self, writer: &mut DescriptorWriter) -> usb_device::Result<()> {
        self.inner.get_configuration_descriptors(writer)
    }

    fn get_bos_descriptors(&self, writer: &mut BosWriter) -> usb_device::Result<()> {
        self.inner.get_bos_descriptors(writer)
    }

    fn get_string(&self, index: StringIndex, lang_id: LangID) -> Option<&str> {
        self.inner.get_string(index, lang_id)
    }

    fn reset(&mut self) {
        self.collected = false;
        self.bus_reset = true;
        self.inner.reset();
    }

    fn poll(&mut self) {
        self.inner.poll();
    }

    fn control_out(&mut self, xfer: ControlOut<StripUsbBus>) {
        self.inner.control_out(xfer);
    }

    fn control_in(&mut self, xfer: ControlIn<StripUsbBus>) {
        self.inner.control_in(xfer);
    }

    fn endpoint_setup(&mut self, addr: EndpointAddress) {
        self.inner.endpoint_setup(addr);
    }

    fn endpoint_out(&mut self, addr: EndpointAddress) {
        self.inner.endpoint_out(addr);
    }

    fn endpoint_in_complete(&mut self, addr: EndpointAddress) {
        self.collected = true;
        self.inner.endpoint_in_complete(addr);
    }

    fn get_alt_setting(&mut self, interface: InterfaceNumber) -> Option<u8> {
        self.inner.get_alt_setting(interface)
    }

    fn set_alt_setting(&mut self, interface: InterfaceNumber, alternative: u8) -> bool {
        self.inner.set_alt_setting(interface, alternative)
    }
}

/// Interrupt-IN side of the HID interface as the sequencer sees it.
pub(crate) struct UsbHidTransport {
    class: HidReportClass,
}

impl UsbHidTransport {
    pub(crate) fn new(class: HidReportClass) -> Self {
        Self { class }
    }

    pub(crate) fn class_mut(&mut self) -> &mut HidReportClass {
        &mut self.class
    }
}

impl ReportTransport for UsbHidTransport {
    fn start_tx(&mut self, report: &HidReport) -> Result<(), TransportError> {
        match self.class.inner.push_raw_input(&report.to_bytes()) {
            Ok(_) => Ok(()),
            Err(UsbError::WouldBlock) => Err(TransportError::Busy),
            Err(err) => {
                trace!("usb: push_failed err={:?}", err);
                Err(TransportError::Busy)
            }
        }
    }
}
