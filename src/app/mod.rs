pub(crate) mod config;
mod strip;
mod tasks;
mod usb;

use esp_hal::timer::timg::TimerGroup;
use usb_device::device::{StringDescriptors, UsbDeviceBuilder, UsbVidPid};

use self::{
    config::{
        DEVICE_CONFIG, REPORTER, USB_MANUFACTURER, USB_PID, USB_PRODUCT, USB_SERIAL_NUMBER,
        USB_VID,
    },
    strip::AdcStrip,
    usb::{HidReportClass, UsbHidTransport},
};
use soundslide::HidEndpoint;

pub(crate) fn run() -> ! {
    let peripherals = esp_hal::init(esp_hal::Config::default());
    let timg0 = TimerGroup::new(peripherals.TIMG0);
    esp_rtos::start(timg0.timer0);
    esp_println::logger::init_logger_from_env();

    let strip = AdcStrip::new(
        peripherals.ADC1,
        peripherals.GPIO1,
        peripherals.GPIO2,
        peripherals.GPIO3,
        peripherals.GPIO4,
    );

    let usb_bus = usb::init_bus(peripherals.USB0, peripherals.GPIO20, peripherals.GPIO19);
    let hid = HidReportClass::new(usb_bus);
    REPORTER.install(HidEndpoint::new(UsbHidTransport::new(hid)));

    let builder = UsbDeviceBuilder::new(usb_bus, UsbVidPid(USB_VID, USB_PID)).strings(&[
        StringDescriptors::default()
            .manufacturer(USB_MANUFACTURER)
            .product(USB_PRODUCT)
            .serial_number(USB_SERIAL_NUMBER),
    ]);
    let usb_dev = match builder {
        Ok(builder) => builder.device_class(0).build(),
        Err(err) => {
            esp_println::println!("usb: init_failed err={:?}", err);
            halt_forever();
        }
    };

    esp_println::println!(
        "soundslide: boot function={} scale={} flip={}",
        DEVICE_CONFIG.function.label(),
        DEVICE_CONFIG.scale,
        DEVICE_CONFIG.flip
    );

    let mut executor = esp_rtos::embassy::Executor::new();
    let executor = unsafe { make_static(&mut executor) };
    executor.run(move |spawner| {
        spawner.must_spawn(tasks::usb_task(usb_dev));
        spawner.must_spawn(tasks::gesture_task(strip, &DEVICE_CONFIG));
    });
}

unsafe fn make_static<T>(value: &mut T) -> &'static mut T {
    unsafe { core::mem::transmute(value) }
}

fn halt_forever() -> ! {
    loop {
        core::hint::spin_loop();
    }
}
