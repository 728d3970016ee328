use core::{cell::RefCell, fmt};

use embassy_sync::blocking_mutex::{raw::CriticalSectionRawMutex, Mutex};
use log::{debug, trace, warn};

use super::report::{HidReport, KeyAction};
use crate::dispatch::ActionReporter;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TransportError {
    /// The endpoint still holds a report or the host has not configured it.
    Busy,
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Busy => f.write_str("endpoint busy"),
        }
    }
}

/// Interrupt-IN endpoint that carries input reports to the host.
///
/// `start_tx` queues exactly one report. The owner of the transport must call
/// [`HidEndpoint::transfer_complete`] once the host has collected it.
pub trait ReportTransport {
    fn start_tx(&mut self, report: &HidReport) -> Result<(), TransportError>;
}

/// The key sequence currently being played out.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PendingReport {
    pub action: Option<KeyAction>,
    /// Reports still to send; even means the next one presses the key.
    pub phases: u16,
}

impl PendingReport {
    const IDLE: Self = Self {
        action: None,
        phases: 0,
    };

    fn is_idle(&self) -> bool {
        self.phases == 0
    }

    fn next_report(&self) -> HidReport {
        match self.action {
            Some(action) if self.phases % 2 == 0 => action.pressed(),
            _ => HidReport::EMPTY,
        }
    }

    fn advance(&mut self) {
        self.phases = self.phases.saturating_sub(1);
        if self.phases == 0 {
            self.action = None;
        }
    }
}

/// Turns logical actions into press/release report pairs, never holding more
/// than one report on the wire.
///
/// A new key action replaces whatever sequence is still playing (the newest
/// gesture wins; a half-played press may lose its explicit release because
/// the next report carries the new key state instead). Scroll steps do not
/// disturb a key sequence: they ride along in the next report.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ReportSequencer {
    pending: PendingReport,
    scroll: i8,
    in_flight: bool,
}

impl ReportSequencer {
    pub const fn new() -> Self {
        Self {
            pending: PendingReport::IDLE,
            scroll: 0,
            in_flight: false,
        }
    }

    pub fn pending(&self) -> PendingReport {
        self.pending
    }

    pub fn in_flight(&self) -> bool {
        self.in_flight
    }

    fn has_work(&self) -> bool {
        !self.pending.is_idle() || self.scroll != 0
    }

    pub fn report_action<T: ReportTransport + ?Sized>(
        &mut self,
        action: KeyAction,
        magnitude: u8,
        transport: &mut T,
    ) {
        if magnitude == 0 {
            return;
        }
        if !self.pending.is_idle() {
            trace!(
                "hid: overwrite pending={:?} phases={} with={}",
                self.pending.action,
                self.pending.phases,
                action.label()
            );
        }
        self.pending = PendingReport {
            action: Some(action),
            phases: u16::from(magnitude) * 2,
        };
        self.pump(transport);
    }

    pub fn report_scroll<T: ReportTransport + ?Sized>(&mut self, step: i8, transport: &mut T) {
        self.scroll = self.scroll.saturating_add(step).max(-i8::MAX);
        self.pump(transport);
    }

    /// The previous report reached the host.
    pub fn transfer_complete<T: ReportTransport + ?Sized>(&mut self, transport: &mut T) {
        self.in_flight = false;
        self.pump(transport);
    }

    /// Sends the next report if the wire is free and anything is waiting.
    pub fn pump<T: ReportTransport + ?Sized>(&mut self, transport: &mut T) {
        if self.in_flight || !self.has_work() {
            return;
        }

        let report = self.pending.next_report().with_scroll(self.scroll);
        match transport.start_tx(&report) {
            Ok(()) => {
                trace!("hid: tx bytes={:02x?}", report.to_bytes());
                self.in_flight = true;
                self.scroll = 0;
                self.pending.advance();
            }
            Err(err) => warn!("hid: tx_refused err={} phases={}", err, self.pending.phases),
        }
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

/// Sequencer bound to its transport; the unit shared between the tick
/// handler and the transfer-complete handler.
pub struct HidEndpoint<T> {
    sequencer: ReportSequencer,
    transport: T,
}

impl<T: ReportTransport> HidEndpoint<T> {
    pub const fn new(transport: T) -> Self {
        Self {
            sequencer: ReportSequencer::new(),
            transport,
        }
    }

    pub fn sequencer(&self) -> &ReportSequencer {
        &self.sequencer
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    pub fn transfer_complete(&mut self) {
        self.sequencer.transfer_complete(&mut self.transport);
    }

    /// Retries a report the transport refused earlier.
    pub fn pump(&mut self) {
        self.sequencer.pump(&mut self.transport);
    }

    /// Forgets the report in flight and anything pending. For bus resets and
    /// re-enumeration, after which the completion for that report never comes.
    pub fn reset(&mut self) {
        if self.sequencer.in_flight() || self.sequencer.has_work() {
            debug!(
                "hid: reset in_flight={} phases={}",
                self.sequencer.in_flight(),
                self.sequencer.pending().phases
            );
        }
        self.sequencer.reset();
    }
}

impl<T: ReportTransport> ActionReporter for HidEndpoint<T> {
    fn report_action(&mut self, action: KeyAction, magnitude: u8) {
        self.sequencer
            .report_action(action, magnitude, &mut self.transport);
    }

    fn report_scroll(&mut self, step: i8) {
        self.sequencer.report_scroll(step, &mut self.transport);
    }
}

/// Process-wide home of the endpoint.
///
/// Every access runs inside a critical section, so the tick handler and the
/// completion handler can never interleave on the sequencer state, whichever
/// context (task or interrupt) they run in.
pub struct SharedHidEndpoint<T> {
    inner: Mutex<CriticalSectionRawMutex, RefCell<Option<HidEndpoint<T>>>>,
}

impl<T> Default for SharedHidEndpoint<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> SharedHidEndpoint<T> {
    pub const fn new() -> Self {
        Self {
            inner: Mutex::new(RefCell::new(None)),
        }
    }

    pub fn install(&self, endpoint: HidEndpoint<T>) {
        self.inner.lock(|cell| {
            cell.replace(Some(endpoint));
        });
    }

    /// Runs `f` on the endpoint; `None` before [`Self::install`].
    pub fn with<R>(&self, f: impl FnOnce(&mut HidEndpoint<T>) -> R) -> Option<R> {
        self.inner.lock(|cell| cell.borrow_mut().as_mut().map(f))
    }
}

impl<T: ReportTransport> ActionReporter for &SharedHidEndpoint<T> {
    fn report_action(&mut self, action: KeyAction, magnitude: u8) {
        if self
            .with(|endpoint| endpoint.report_action(action, magnitude))
            .is_none()
        {
            warn!("hid: dropped action={} reason=not_installed", action.label());
        }
    }

    fn report_scroll(&mut self, step: i8) {
        // Scroll mode calls this every tick, so no warning here.
        if self.with(|endpoint| endpoint.report_scroll(step)).is_none() {
            trace!("hid: dropped scroll={} reason=not_installed", step);
        }
    }
}
