use embassy_time::{Duration, Ticker, Timer};
use log::info;
use soundslide::{ConfigurationStore, DeviceConfiguration, GestureDecoder};
use usb_device::device::{UsbDevice, UsbDeviceState};

use super::{
    config::{REPORTER, STARTUP_GRACE_MS, TICK_MS, USB_POLL_MS},
    strip::AdcStrip,
    usb::StripUsbBus,
};

#[embassy_executor::task]
pub(crate) async fn gesture_task(mut strip: AdcStrip, store: &'static DeviceConfiguration) {
    // A finger resting on the strip at plug-in must not turn into a gesture.
    Timer::after(Duration::from_millis(STARTUP_GRACE_MS)).await;
    info!("gesture: armed tick_ms={}", TICK_MS);

    let mut decoder = GestureDecoder::new();
    let mut reporter = &REPORTER;
    let mut ticker = Ticker::every(Duration::from_millis(TICK_MS));
    loop {
        ticker.next().await;
        let config = store.configuration();
        decoder.tick(&mut strip, &config, &mut reporter);
    }
}

#[embassy_executor::task]
pub(crate) async fn usb_task(mut usb_dev: UsbDevice<'static, StripUsbBus>) {
    let mut ticker = Ticker::every(Duration::from_millis(USB_POLL_MS));
    let mut last_state = usb_dev.state();

    loop {
        ticker.next().await;
        REPORTER.with(|endpoint| {
            usb_dev.poll(&mut [endpoint.transport_mut().class_mut()]);
            let state = usb_dev.state();
            let class = endpoint.transport_mut().class_mut();
            let bus_reset = class.take_bus_reset();
            let collected = class.take_collected();

            // Leaving Configured (reset, suspend, re-enumeration) drops the
            // report in flight without a completion.
            let deconfigured =
                last_state == UsbDeviceState::Configured && state != UsbDeviceState::Configured;
            if bus_reset || deconfigured {
                endpoint.reset();
            } else if collected {
                endpoint.transfer_complete();
            } else if state == UsbDeviceState::Configured {
                endpoint.pump();
            }
        });

        let state = usb_dev.state();
        if state != last_state {
            info!("usb: state={:?}", state);
            last_state = state;
        }
    }
}
