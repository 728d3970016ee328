use std::vec::Vec;

use super::*;
use crate::{
    config::{SlideFunction, MAX_CHANNELS},
    hid::{HidEndpoint, HidReport, ReportTransport, TransportError},
};

const CHANNELS: usize = 8;
const MUTE: [u8; 4] = [0x10, 0, 0, 0];
const LOCK: [u8; 4] = [0, 0, 0x08, 0x0F];
const VOL_UP: [u8; 4] = [0x01, 0, 0, 0];
const VOL_DOWN: [u8; 4] = [0x02, 0, 0, 0];
const BRIGHT_DOWN: [u8; 4] = [0x08, 0, 0, 0];
const RELEASE: [u8; 4] = [0, 0, 0, 0];

#[derive(Default)]
struct Wire {
    sent: Vec<[u8; 4]>,
}

impl ReportTransport for Wire {
    fn start_tx(&mut self, report: &HidReport) -> Result<(), TransportError> {
        self.sent.push(report.to_bytes());
        Ok(())
    }
}

/// Strip whose readings are set per tick.
struct Strip {
    values: Vec<u16>,
}

impl Strip {
    fn new(channels: usize) -> Self {
        Self {
            values: std::vec![10; channels],
        }
    }

    fn set_finger(&mut self, finger: Option<usize>) {
        for (channel, value) in self.values.iter_mut().enumerate() {
            *value = if Some(channel) == finger { 100 } else { 10 };
        }
    }
}

impl SensorReader for Strip {
    fn channel_count(&self) -> usize {
        self.values.len()
    }

    fn channel_value(&mut self, channel: usize) -> u16 {
        self.values[channel]
    }
}

/// Decoder wired to an endpoint whose host collects every report before the
/// next tick.
struct Rig {
    decoder: GestureDecoder,
    strip: Strip,
    endpoint: HidEndpoint<Wire>,
    config: DeviceConfiguration,
    reports: Vec<(Tick, [u8; 4])>,
    taps: Vec<(Tick, TapGesture)>,
}

impl Rig {
    fn new(config: DeviceConfiguration) -> Self {
        Self {
            decoder: GestureDecoder::new(),
            strip: Strip::new(CHANNELS),
            endpoint: HidEndpoint::new(Wire::default()),
            config,
            reports: Vec::new(),
            taps: Vec::new(),
        }
    }

    fn step(&mut self, finger: Option<usize>) -> TickOutput {
        self.strip.set_finger(finger);
        let output = self
            .decoder
            .tick(&mut self.strip, &self.config, &mut self.endpoint);
        while self.endpoint.sequencer().in_flight() {
            self.endpoint.transfer_complete();
        }

        if let Some(tap) = output.tap {
            self.taps.push((output.tick, tap));
        }
        let tick = output.tick;
        self.reports.extend(
            self.endpoint
                .transport_mut()
                .sent
                .drain(..)
                .map(|bytes| (tick, bytes)),
        );
        output
    }

    fn hold(&mut self, finger: usize, ticks: u32) {
        for _ in 0..ticks {
            self.step(Some(finger));
        }
    }

    fn idle(&mut self, ticks: u32) {
        for _ in 0..ticks {
            self.step(None);
        }
    }

    fn slide(&mut self, channels: &[usize]) {
        for &channel in channels {
            self.step(Some(channel));
        }
    }
}

fn config(flip: bool, scale: u8, function: SlideFunction) -> DeviceConfiguration {
    DeviceConfiguration::new(flip, scale, function).unwrap()
}

#[test]
fn slide_towards_higher_channels_turns_volume_down() {
    let mut rig = Rig::new(DeviceConfiguration::DEFAULT);
    rig.slide(&[1, 2, 3, 4]); // deltas of -1 at ticks 2, 3, 4
    rig.idle(10);

    assert_eq!(
        rig.reports,
        [
            (5, VOL_DOWN),
            (5, RELEASE),
            (6, VOL_DOWN),
            (6, RELEASE),
            (7, VOL_DOWN),
            (7, RELEASE),
        ]
    );
    assert!(rig.taps.is_empty());
}

#[test]
fn flip_reverses_slide_direction() {
    let mut rig = Rig::new(config(true, 1, SlideFunction::Volume));
    rig.slide(&[1, 2]);
    rig.idle(10);

    assert_eq!(rig.reports, [(5, VOL_UP), (5, RELEASE)]);
}

#[test]
fn scaled_jump_becomes_repeated_brightness_presses() {
    let mut rig = Rig::new(config(false, 2, SlideFunction::Brightness));
    rig.slide(&[1, 3]); // -2 channels, scaled to -4
    rig.idle(10);

    let expected: Vec<(Tick, [u8; 4])> = [BRIGHT_DOWN, RELEASE]
        .repeat(4)
        .into_iter()
        .map(|bytes| (5, bytes))
        .collect();
    assert_eq!(rig.reports, expected);
}

#[test]
fn scroll_mode_emits_wheel_report_three_ticks_after_motion() {
    let mut rig = Rig::new(config(false, 5, SlideFunction::Scroll));
    assert_eq!(rig.step(Some(2)).slide, 0);
    assert_eq!(rig.step(Some(3)).slide, 0);
    rig.hold(3, 2);
    assert_eq!(rig.step(Some(3)).slide, -5);
    rig.hold(3, 5);
    rig.idle(10);

    assert_eq!(rig.reports, [(5, [0x00, 0xFB, 0x00, 0x00])]);
    assert!(rig.taps.is_empty());
}

#[test]
fn short_touch_is_mic_mute_after_window_closes() {
    let mut rig = Rig::new(DeviceConfiguration::DEFAULT);
    rig.hold(4, 3);
    rig.idle(40); // released at tick 4

    assert_eq!(rig.taps, [(24, TapGesture::SingleTap)]);
    assert_eq!(rig.reports, [(24, MUTE), (24, RELEASE)]);
}

#[test]
fn two_short_touches_lock_the_workstation() {
    let mut rig = Rig::new(DeviceConfiguration::DEFAULT);
    rig.hold(4, 3);
    rig.idle(6); // released at tick 4
    rig.hold(4, 3);
    rig.idle(40); // released at tick 13

    assert_eq!(rig.taps, [(13, TapGesture::DoubleTap)]);
    assert_eq!(rig.reports, [(13, LOCK), (13, RELEASE)]);
}

#[test]
fn touch_length_boundary_for_taps() {
    let mut rig = Rig::new(DeviceConfiguration::DEFAULT);
    rig.hold(0, 14);
    rig.idle(40); // released at tick 15 after 14 ticks
    assert_eq!(rig.taps, [(35, TapGesture::SingleTap)]);

    let mut rig = Rig::new(DeviceConfiguration::DEFAULT);
    rig.hold(0, 15);
    rig.idle(40);
    assert!(rig.taps.is_empty());
    assert!(rig.reports.is_empty());
}

#[test]
fn slide_during_double_tap_window_keeps_pending_tap() {
    let mut rig = Rig::new(DeviceConfiguration::DEFAULT);
    rig.hold(4, 3);
    rig.idle(3); // released at tick 4
    rig.slide(&[2, 3, 3, 3]); // ticks 7..=10, delta at 8
    rig.idle(20);

    assert_eq!(rig.taps, [(24, TapGesture::SingleTap)]);
    assert_eq!(
        rig.reports,
        [(11, VOL_DOWN), (11, RELEASE), (24, MUTE), (24, RELEASE)]
    );
}

#[test]
fn oversized_strip_reads_as_no_touch() {
    let mut decoder = GestureDecoder::new();
    let mut strip = Strip::new(MAX_CHANNELS + 1);
    strip.set_finger(Some(0));
    let mut endpoint = HidEndpoint::new(Wire::default());

    let output = decoder.tick(&mut strip, &DeviceConfiguration::DEFAULT, &mut endpoint);
    assert_eq!(output.position, None);
    assert_eq!(decoder.now(), 1);
}

#[test]
fn reset_forgets_pending_motion() {
    let mut rig = Rig::new(DeviceConfiguration::DEFAULT);
    rig.slide(&[1, 2]);
    rig.decoder.reset();
    rig.idle(10);

    assert_eq!(rig.decoder.now(), 10);
    assert!(rig.reports.is_empty());
}
