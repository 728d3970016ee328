//! HID side: report layout, descriptor, and the press/release sequencer that
//! feeds the interrupt-IN endpoint.

pub mod descriptor;
pub mod report;
pub mod sequencer;

pub use descriptor::REPORT_DESCRIPTOR;
pub use report::{HidReport, KeyAction, HID_REPORT_LEN, KEY_CODE_L, MODIFIER_LEFT_GUI};
pub use sequencer::{
    HidEndpoint, PendingReport, ReportSequencer, ReportTransport, SharedHidEndpoint,
    TransportError,
};
