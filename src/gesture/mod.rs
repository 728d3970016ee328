//! Per-tick gesture pipeline: snapshot -> finger position -> {slide queue, tap
//! classifier} -> dispatched actions.

pub mod position;
pub mod slide_queue;
pub mod tap;

#[cfg(test)]
mod tests;

use log::{trace, warn};

pub use position::{locate_finger, Detection, EpisodeSummary, FingerPositionDetector};
pub use slide_queue::SlideQueue;
pub use tap::{Contact, TapEngine, TapGesture};

use crate::{
    config::DeviceConfiguration,
    dispatch::{self, ActionReporter},
    sensor::{SensorReader, SensorSnapshot},
};

/// Tick counter; wraps, all comparisons go through `wrapping_sub`.
pub type Tick = u32;

/// What one tick decided, mostly for tracing and tests. The actions have
/// already been handed to the reporter by the time this is returned.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TickOutput {
    pub tick: Tick,
    pub position: Option<u8>,
    pub tap: Option<TapGesture>,
    pub slide: i8,
}

pub struct GestureDecoder {
    now: Tick,
    detector: FingerPositionDetector,
    slide: SlideQueue,
    taps: TapEngine,
}

impl Default for GestureDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl GestureDecoder {
    pub fn new() -> Self {
        Self {
            now: 0,
            detector: FingerPositionDetector::new(),
            slide: SlideQueue::new(),
            taps: TapEngine::new(),
        }
    }

    pub fn now(&self) -> Tick {
        self.now
    }

    /// Samples the strip and runs one decoding tick.
    ///
    /// A strip with more channels than a snapshot can hold is logged and
    /// decoded as "no touch" for this tick.
    pub fn tick<S, R>(
        &mut self,
        sensor: &mut S,
        config: &DeviceConfiguration,
        reporter: &mut R,
    ) -> TickOutput
    where
        S: SensorReader + ?Sized,
        R: ActionReporter + ?Sized,
    {
        let snapshot = match SensorSnapshot::capture(sensor) {
            Ok(snapshot) => snapshot,
            Err(err) => {
                warn!("gesture: snapshot_failed tick={} err={}", self.now, err);
                SensorSnapshot::default()
            }
        };
        self.tick_snapshot(&snapshot, config, reporter)
    }

    pub fn tick_snapshot<R>(
        &mut self,
        snapshot: &SensorSnapshot,
        config: &DeviceConfiguration,
        reporter: &mut R,
    ) -> TickOutput
    where
        R: ActionReporter + ?Sized,
    {
        self.now = self.now.wrapping_add(1);
        let now = self.now;

        let detection = self.detector.sample(snapshot.values(), now);
        if let Some(displacement) = detection.displacement() {
            let delta = config.shape_delta(displacement);
            trace!("gesture: slide_delta tick={} raw={} shaped={}", now, displacement, delta);
            self.slide.push(delta);
        }

        let contact = self.contact(&detection, now);
        let tap = self.taps.tick(now, contact);
        if let Some(gesture) = tap {
            dispatch::deliver(dispatch::tap_action(gesture), reporter);
        }

        self.slide.optimize();
        let change = self.slide.emit();
        if let Some(action) = dispatch::slide_action(config.function, change) {
            dispatch::deliver(action, reporter);
        }

        TickOutput {
            tick: now,
            position: detection.position,
            tap,
            slide: change,
        }
    }

    pub fn reset(&mut self) {
        self.now = 0;
        self.detector.reset();
        self.slide.reset();
        self.taps = TapEngine::new();
    }

    fn contact(&mut self, detection: &Detection, now: Tick) -> Contact {
        let episode = self.detector.episode_mut();
        if let Some(summary) = episode.take_release(now) {
            Contact::Released(summary)
        } else if detection.touch_started {
            Contact::Started
        } else if episode.is_touching() {
            Contact::Held
        } else {
            Contact::Absent
        }
    }
}
