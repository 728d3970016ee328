//! Gesture decoding core for the SoundSlide touch strip.
//!
//! Everything in here is hardware-free: the firmware binary feeds it sensor
//! readings once per tick and hands it a HID transport, the host tools and
//! tests do the same with fakes.

#![cfg_attr(not(test), no_std)]

pub mod config;
pub mod dispatch;
pub mod gesture;
pub mod hid;
pub mod sensor;

pub use config::{ConfigError, ConfigurationStore, DeviceConfiguration, SlideFunction};
pub use dispatch::{ActionReporter, LogicalAction};
pub use gesture::{GestureDecoder, TapGesture, TickOutput};
pub use hid::{HidEndpoint, HidReport, KeyAction, ReportTransport, SharedHidEndpoint};
pub use sensor::{SensorReader, SensorSnapshot};
