//! Timer engine implementation.
//!
//! The engine is a tick-driven state machine over work and rest phases. It
//! does not own a thread or sleep: while a countdown runs it holds a
//! repeating schedule obtained from the injected [`Scheduler`], and the host
//! calls [`TimerEngine::tick`] once per delivered tick.
//!
//! ## State Transitions
//!
//! ```text
//! Idle ──start_session──> Working ──pause──> Paused ──resume──> Working
//! Idle ──start_rest─────> Resting ──pause──> Paused ──resume──> Resting
//! Working | Resting ──remaining hits 0──> Idle (+ Completed)
//! any ──reset──> Idle
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! let mut engine = TimerEngine::new(Durations::default(), SystemClock, scheduler);
//! engine.subscribe(|event| { println!("{event:?}"); Ok(()) });
//! engine.start_session();
//! // once per second:
//! engine.tick();
//! ```

use std::time::Duration;

use tracing::{debug, warn};

use super::clock::Clock;
use super::scheduler::{Scheduler, TickHandle};
use super::state::{ActivePhase, Durations, EngineState, Phase};
use crate::events::EngineEvent;

const TICK_PERIOD: Duration = Duration::from_secs(1);

pub type ListenerResult = Result<(), Box<dyn std::error::Error>>;
type Listener = Box<dyn FnMut(&EngineEvent) -> ListenerResult>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// Core timer engine.
///
/// Single-threaded: every operation runs to completion, notifies listeners
/// synchronously and only then returns.
pub struct TimerEngine {
    state: EngineState,
    clock: Box<dyn Clock>,
    scheduler: Box<dyn Scheduler>,
    ticker: Option<Box<dyn TickHandle>>,
    listeners: Vec<(ListenerId, Listener)>,
    next_listener_id: u64,
}

impl TimerEngine {
    /// Create an idle engine. Durations are clamped into range.
    pub fn new(
        durations: Durations,
        clock: impl Clock + 'static,
        scheduler: impl Scheduler + 'static,
    ) -> Self {
        let durations = Durations::clamped(durations.session_minutes, durations.rest_minutes);
        Self {
            state: EngineState::idle(durations),
            clock: Box::new(clock),
            scheduler: Box::new(scheduler),
            ticker: None,
            listeners: Vec::new(),
            next_listener_id: 0,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> EngineState {
        self.state.clone()
    }

    pub fn phase(&self) -> Phase {
        self.state.phase
    }

    pub fn remaining_seconds(&self) -> u64 {
        self.state.remaining_seconds
    }

    pub fn durations(&self) -> Durations {
        self.state.durations()
    }

    pub fn is_ticking(&self) -> bool {
        self.ticker.as_ref().is_some_and(|t| t.is_active())
    }

    // ── Listeners ────────────────────────────────────────────────────

    pub fn subscribe<F>(&mut self, listener: F) -> ListenerId
    where
        F: FnMut(&EngineEvent) -> ListenerResult + 'static,
    {
        let id = ListenerId(self.next_listener_id);
        self.next_listener_id += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Returns `false` if the listener was not registered.
    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(lid, _)| *lid != id);
        self.listeners.len() != before
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Start a work session, replacing whatever was running.
    pub fn start_session(&mut self) {
        self.start(ActivePhase::Working);
    }

    /// Start a rest, replacing whatever was running.
    pub fn start_rest(&mut self) {
        self.start(ActivePhase::Resting);
    }

    /// Pause a running countdown. Returns `false` (and does nothing) when
    /// the timer is not Working or Resting.
    pub fn pause(&mut self) -> bool {
        let Some(active) = self.state.phase.active() else {
            return false;
        };
        self.stop_ticking();
        self.state.phase = Phase::Paused;
        self.state.paused_at = Some(self.clock.now());
        self.state.paused_from = Some(active);
        self.state.phase_started_at = None;
        debug!(from = ?active, remaining = self.state.remaining_seconds, "timer paused");
        self.notify_state();
        true
    }

    /// Resume into the phase that was paused. Returns `false` (and does
    /// nothing) unless the timer is Paused.
    pub fn resume(&mut self) -> bool {
        if self.state.phase != Phase::Paused {
            return false;
        }
        let Some(origin) = self.state.paused_from else {
            warn!("paused timer has no pause origin, resetting");
            self.reset();
            return false;
        };
        self.state.phase = origin.into();
        self.state.phase_started_at = Some(self.clock.now());
        self.state.paused_at = None;
        self.state.paused_from = None;
        self.start_ticking();
        debug!(into = ?origin, remaining = self.state.remaining_seconds, "timer resumed");
        self.notify_state();
        true
    }

    /// Return to Idle. Always notifies, even when already idle.
    pub fn reset(&mut self) {
        self.stop_ticking();
        self.state = EngineState::idle(self.state.durations());
        debug!("timer reset");
        self.notify_state();
    }

    /// Advance the countdown by one second.
    ///
    /// Returns the phase that finished if this tick completed it. Ticks
    /// outside Working/Resting are ignored.
    pub fn tick(&mut self) -> Option<ActivePhase> {
        let active = self.state.phase.active()?;
        self.state.remaining_seconds = self.state.remaining_seconds.saturating_sub(1);
        if self.state.remaining_seconds == 0 {
            let elapsed = self.state.total_seconds();
            self.complete(active, elapsed);
            return Some(active);
        }
        self.notify_state();
        None
    }

    /// Change the configured durations.
    ///
    /// Values are clamped into range. If the length of the current
    /// countdown changed, the time already spent in it is preserved and the
    /// remaining time shrinks or grows accordingly; a countdown left with
    /// nothing completes immediately. Returns the completed phase, if any.
    pub fn update_durations(&mut self, session_minutes: u32, rest_minutes: u32) -> Option<ActivePhase> {
        let new = Durations::clamped(session_minutes, rest_minutes);
        if new.session_minutes != session_minutes || new.rest_minutes != rest_minutes {
            debug!(
                session_minutes,
                rest_minutes,
                clamped_session = new.session_minutes,
                clamped_rest = new.rest_minutes,
                "durations clamped"
            );
        }
        let old = self.state.durations();
        self.state.session_duration_minutes = new.session_minutes;
        self.state.rest_duration_minutes = new.rest_minutes;

        let mut completed = None;
        if let Some(phase) = self.state.countdown_phase() {
            let old_secs = old.secs_for(phase);
            let new_secs = new.secs_for(phase);
            if old_secs != new_secs {
                let elapsed = old_secs.saturating_sub(self.state.remaining_seconds);
                self.state.remaining_seconds = new_secs.saturating_sub(elapsed);
                debug!(?phase, elapsed, remaining = self.state.remaining_seconds, "countdown rescaled");
                if self.state.remaining_seconds == 0 {
                    completed = Some((phase, elapsed));
                }
            }
        }

        match completed {
            Some((phase, elapsed)) => self.complete(phase, elapsed),
            None => self.notify_state(),
        }
        completed.map(|(phase, _)| phase)
    }

    /// Replace the state with one recovered from storage.
    ///
    /// States that break the engine invariants are refused and leave the
    /// engine untouched.
    pub fn seed(&mut self, state: EngineState) -> bool {
        if let Err(reason) = state.check_invariants() {
            warn!(reason, "refusing to seed timer with invalid state");
            return false;
        }
        self.stop_ticking();
        self.state = state;
        if self.state.phase.active().is_some() {
            self.start_ticking();
        }
        debug!(phase = %self.state.phase, remaining = self.state.remaining_seconds, "timer seeded");
        self.notify_state();
        true
    }

    /// Stop ticking and drop every listener. Safe to call repeatedly.
    pub fn dispose(&mut self) {
        self.stop_ticking();
        self.listeners.clear();
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn start(&mut self, phase: ActivePhase) {
        self.stop_ticking();
        self.state.phase = phase.into();
        self.state.remaining_seconds = self.state.durations().secs_for(phase);
        self.state.phase_started_at = Some(self.clock.now());
        self.state.paused_at = None;
        self.state.paused_from = None;
        self.start_ticking();
        debug!(?phase, remaining = self.state.remaining_seconds, "timer started");
        self.notify_state();
    }

    fn complete(&mut self, phase: ActivePhase, elapsed_seconds: u64) {
        self.stop_ticking();
        self.state = EngineState::idle(self.state.durations());
        debug!(?phase, elapsed_seconds, "countdown completed");
        self.notify_state();
        let at = self.clock.now();
        self.emit(EngineEvent::Completed {
            phase,
            elapsed_seconds,
            at,
        });
    }

    fn start_ticking(&mut self) {
        self.stop_ticking();
        self.ticker = Some(self.scheduler.schedule_repeating(TICK_PERIOD));
    }

    fn stop_ticking(&mut self) {
        if let Some(mut ticker) = self.ticker.take() {
            ticker.cancel();
        }
    }

    fn notify_state(&mut self) {
        let event = EngineEvent::StateChanged {
            state: self.state.clone(),
        };
        self.emit(event);
    }

    fn emit(&mut self, event: EngineEvent) {
        for (id, listener) in self.listeners.iter_mut() {
            if let Err(e) = listener(&event) {
                warn!(listener = id.0, error = %e, "timer listener failed");
            }
        }
    }
}

impl Drop for TimerEngine {
    fn drop(&mut self) {
        self.stop_ticking();
    }
}
