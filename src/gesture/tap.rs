use log::debug;
use statig::{blocking::IntoStateMachineExt as _, prelude::*};

use super::{position::EpisodeSummary, Tick};
use crate::config::{DOUBLE_TAP_WINDOW_TICKS, TAP_MAX_TICKS};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TapGesture {
    SingleTap,
    DoubleTap,
}

impl TapGesture {
    pub const fn label(self) -> &'static str {
        match self {
            Self::SingleTap => "single",
            Self::DoubleTap => "double",
        }
    }
}

/// Contact state of the strip for one tick, as seen by the tap classifier.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Contact {
    #[default]
    Absent,
    Started,
    Held,
    Released(EpisodeSummary),
}

impl Contact {
    fn is_down(self) -> bool {
        matches!(self, Self::Started | Self::Held)
    }
}

#[derive(Clone, Copy, Debug)]
enum TapHsmEvent {
    Tick { now: Tick, contact: Contact },
}

#[derive(Default)]
struct DispatchContext {
    gesture: Option<TapGesture>,
}

/// Single/double tap classifier.
///
/// Release classification always runs before the double-tap window expiry
/// check within one tick: a second tap released on the very tick the window
/// would close still has its release judged first.
pub struct TapEngine {
    machine: statig::blocking::StateMachine<TapHsm>,
}

impl Default for TapEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl TapEngine {
    pub fn new() -> Self {
        Self {
            machine: TapHsm::new().state_machine(),
        }
    }

    pub fn tick(&mut self, now: Tick, contact: Contact) -> Option<TapGesture> {
        let mut context = DispatchContext::default();
        self.machine
            .handle_with_context(&TapHsmEvent::Tick { now, contact }, &mut context);
        context.gesture
    }

    /// True while a first tap is waiting for a possible second one.
    pub fn is_waiting(&self) -> bool {
        self.machine.inner().first_tap_at.is_some()
    }
}

struct TapHsm {
    first_tap_at: Option<Tick>,
}

impl TapHsm {
    fn new() -> Self {
        Self { first_tap_at: None }
    }

    fn is_tap(summary: EpisodeSummary) -> bool {
        summary.duration_ticks > 0 && summary.duration_ticks < TAP_MAX_TICKS && !summary.moved
    }

    fn window_expired(&self, now: Tick) -> bool {
        self.first_tap_at
            .is_some_and(|at| now.wrapping_sub(at) >= DOUBLE_TAP_WINDOW_TICKS)
    }

    fn start_wait(&mut self, now: Tick) {
        self.first_tap_at = Some(now);
    }

    fn clear_wait(&mut self) {
        self.first_tap_at = None;
    }

    fn emit(context: &mut DispatchContext, now: Tick, gesture: TapGesture) {
        debug!("gesture: tap kind={} tick={}", gesture.label(), now);
        context.gesture = Some(gesture);
    }
}

#[state_machine(initial = "State::idle()")]
impl TapHsm {
    #[state]
    fn idle(&mut self, context: &mut DispatchContext, event: &TapHsmEvent) -> Outcome<State> {
        let _ = context;
        match event {
            TapHsmEvent::Tick {
                contact: Contact::Started,
                ..
            } => Transition(State::touching()),
            TapHsmEvent::Tick { .. } => Handled,
        }
    }

    #[state]
    fn touching(&mut self, context: &mut DispatchContext, event: &TapHsmEvent) -> Outcome<State> {
        let _ = context;
        match event {
            TapHsmEvent::Tick {
                now,
                contact: Contact::Released(summary),
            } => {
                if Self::is_tap(*summary) {
                    self.start_wait(*now);
                    Transition(State::awaiting_second_tap())
                } else {
                    Transition(State::idle())
                }
            }
            TapHsmEvent::Tick { .. } => Handled,
        }
    }

    #[state(superstate = "double_tap_window")]
    fn awaiting_second_tap(
        &mut self,
        context: &mut DispatchContext,
        event: &TapHsmEvent,
    ) -> Outcome<State> {
        let _ = context;
        match event {
            TapHsmEvent::Tick {
                now,
                contact: Contact::Started,
            } if !self.window_expired(*now) => Transition(State::second_touch()),
            TapHsmEvent::Tick { .. } => Super,
        }
    }

    #[state(superstate = "double_tap_window")]
    fn second_touch(
        &mut self,
        context: &mut DispatchContext,
        event: &TapHsmEvent,
    ) -> Outcome<State> {
        match event {
            TapHsmEvent::Tick {
                now,
                contact: Contact::Released(summary),
            } if Self::is_tap(*summary) => {
                if self.window_expired(*now) {
                    // The first tap's window closes on this very tick; report it
                    // on its own and let this tap open a fresh window.
                    Self::emit(context, *now, TapGesture::SingleTap);
                    self.start_wait(*now);
                    Transition(State::awaiting_second_tap())
                } else {
                    Self::emit(context, *now, TapGesture::DoubleTap);
                    self.clear_wait();
                    Transition(State::idle())
                }
            }
            TapHsmEvent::Tick {
                now,
                contact: Contact::Released(_),
            } if !self.window_expired(*now) => Transition(State::awaiting_second_tap()),
            TapHsmEvent::Tick { .. } => Super,
        }
    }

    #[superstate]
    fn double_tap_window(
        &mut self,
        context: &mut DispatchContext,
        event: &TapHsmEvent,
    ) -> Outcome<State> {
        match event {
            TapHsmEvent::Tick { now, contact } if self.window_expired(*now) => {
                Self::emit(context, *now, TapGesture::SingleTap);
                self.clear_wait();
                if contact.is_down() {
                    Transition(State::touching())
                } else {
                    Transition(State::idle())
                }
            }
            TapHsmEvent::Tick { .. } => Handled,
        }
    }
}
