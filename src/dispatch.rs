//! Maps decoded gestures to the actions the host sees.

use log::debug;

use crate::{config::SlideFunction, gesture::TapGesture, hid::KeyAction};

/// Sink for logical actions. Both calls return immediately; the reports they
/// cause reach the wire asynchronously.
pub trait ActionReporter {
    fn report_action(&mut self, action: KeyAction, magnitude: u8);
    fn report_scroll(&mut self, step: i8);
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogicalAction {
    Key { action: KeyAction, magnitude: u8 },
    Scroll(i8),
}

pub fn tap_action(gesture: TapGesture) -> LogicalAction {
    let action = match gesture {
        TapGesture::SingleTap => KeyAction::MicMute,
        TapGesture::DoubleTap => KeyAction::LockWorkstation,
    };
    LogicalAction::Key {
        action,
        magnitude: 1,
    }
}

/// Key presses for a slide emission. Scroll mode passes every emission through,
/// zero included; the key modes drop zero.
pub fn slide_action(function: SlideFunction, change: i8) -> Option<LogicalAction> {
    let (up, down) = match function {
        SlideFunction::Scroll => return Some(LogicalAction::Scroll(change)),
        SlideFunction::Volume => (KeyAction::VolumeUp, KeyAction::VolumeDown),
        SlideFunction::Brightness => (KeyAction::BrightnessUp, KeyAction::BrightnessDown),
    };

    let action = match change {
        0 => return None,
        c if c > 0 => up,
        _ => down,
    };
    Some(LogicalAction::Key {
        action,
        magnitude: change.unsigned_abs(),
    })
}

pub fn deliver<R: ActionReporter + ?Sized>(action: LogicalAction, reporter: &mut R) {
    match action {
        LogicalAction::Key { action, magnitude } => {
            debug!("dispatch: key action={} count={}", action.label(), magnitude);
            reporter.report_action(action, magnitude);
        }
        LogicalAction::Scroll(step) => reporter.report_scroll(step),
    }
}
