//! Host-side orchestration around the timer engine.
//!
//! The engine only counts down and notifies. [`TimerHost`] is the layer that
//! reacts: it renders every change, persists it, plays a cue when a phase
//! finishes, keeps the statistics and applies the auto-start policy from the
//! configuration.
//!
//! Engine notifications are queued by a listener and drained after each
//! command, so reactions that drive the engine again (auto-start) never run
//! inside an engine callback.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use chrono::{DateTime, Duration, Utc};
use tracing::{info, warn};

use crate::display::StatusView;
use crate::error::Result;
use crate::events::EngineEvent;
use crate::persistence::{PersistenceGateway, Statistics};
use crate::storage::{Config, KvStore};
use crate::timer::{ActivePhase, EngineState, Phase, TimerEngine};

/// Something that shows the timer.
pub trait StatusDisplay {
    fn render(&mut self, view: &StatusView);
}

/// Sound played when a phase finishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cue {
    WorkFinished,
    RestFinished,
}

impl From<ActivePhase> for Cue {
    fn from(phase: ActivePhase) -> Self {
        match phase {
            ActivePhase::Working => Cue::WorkFinished,
            ActivePhase::Resting => Cue::RestFinished,
        }
    }
}

/// Audio output. Failures are logged by the host and otherwise ignored.
pub trait AudioNotifier {
    fn play(&mut self, cue: Cue) -> std::result::Result<(), Box<dyn std::error::Error>>;
}

#[derive(Debug, Default)]
pub struct NullDisplay;

impl StatusDisplay for NullDisplay {
    fn render(&mut self, _view: &StatusView) {}
}

#[derive(Debug, Default)]
pub struct SilentNotifier;

impl AudioNotifier for SilentNotifier {
    fn play(&mut self, _cue: Cue) -> std::result::Result<(), Box<dyn std::error::Error>> {
        Ok(())
    }
}

pub struct TimerHost<S: KvStore> {
    engine: TimerEngine,
    gateway: PersistenceGateway<S>,
    config: Config,
    display: Box<dyn StatusDisplay>,
    audio: Box<dyn AudioNotifier>,
    queue: Rc<RefCell<VecDeque<EngineEvent>>>,
    stats: Statistics,
    /// Instant the engine state is exact for, while it still derives from
    /// a restored countdown. `None` once a command set it from the clock.
    synced_at: Option<DateTime<Utc>>,
}

impl<S: KvStore> TimerHost<S> {
    pub fn new(
        mut engine: TimerEngine,
        gateway: PersistenceGateway<S>,
        config: Config,
        display: impl StatusDisplay + 'static,
        audio: impl AudioNotifier + 'static,
    ) -> Self {
        let queue = Rc::new(RefCell::new(VecDeque::new()));
        let sink = Rc::clone(&queue);
        engine.subscribe(move |event| {
            sink.borrow_mut().push_back(event.clone());
            Ok(())
        });
        Self {
            engine,
            gateway,
            config,
            display: Box::new(display),
            audio: Box::new(audio),
            queue,
            stats: Statistics::default(),
            synced_at: None,
        }
    }

    /// Restore the saved timer and apply the configured durations.
    ///
    /// Work sessions that ran out while the host was closed are credited to
    /// the statistics. With `auto_start_on_open`, an idle timer starts a
    /// work session.
    pub fn open(&mut self) -> Result<()> {
        match self.gateway.restore()? {
            Some(restored) => {
                self.stats = restored.statistics;
                for phase in &restored.finished_while_away {
                    if *phase == ActivePhase::Working {
                        self.credit_session(restored.state.durations().session_secs());
                    }
                }
                if !restored.finished_while_away.is_empty() {
                    info!(
                        finished = ?restored.finished_while_away,
                        now = %restored.state.phase,
                        "timer advanced while closed"
                    );
                }
                self.engine.seed(restored.state);
                self.synced_at = Some(restored.as_of);
            }
            None => {
                self.stats = Statistics::default();
                self.synced_at = None;
            }
        }

        let durations = self.config.durations();
        self.engine
            .update_durations(durations.session_minutes, durations.rest_minutes);

        if self.engine.phase() == Phase::Idle && self.config.behavior.auto_start_on_open {
            self.synced_at = None;
            self.engine.start_session();
        }
        self.process()
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> EngineState {
        self.engine.state()
    }

    pub fn view(&self) -> StatusView {
        StatusView::from_state(&self.engine.state())
    }

    pub fn statistics(&self) -> Statistics {
        self.stats
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn engine(&self) -> &TimerEngine {
        &self.engine
    }

    pub fn gateway(&self) -> &PersistenceGateway<S> {
        &self.gateway
    }

    // ── Commands ─────────────────────────────────────────────────────

    pub fn start_session(&mut self) -> Result<()> {
        self.synced_at = None;
        self.engine.start_session();
        self.process()
    }

    pub fn start_rest(&mut self) -> Result<()> {
        self.synced_at = None;
        self.engine.start_rest();
        self.process()
    }

    pub fn pause(&mut self) -> Result<()> {
        self.synced_at = None;
        self.engine.pause();
        self.process()
    }

    pub fn resume(&mut self) -> Result<()> {
        self.synced_at = None;
        self.engine.resume();
        self.process()
    }

    pub fn reset(&mut self) -> Result<()> {
        self.synced_at = None;
        self.engine.reset();
        self.process()
    }

    pub fn tick(&mut self) -> Result<()> {
        if let Some(at) = self.synced_at.as_mut() {
            *at += Duration::seconds(1);
        }
        self.engine.tick();
        self.process()
    }

    /// Swap in a new configuration, pushing its durations to the engine.
    pub fn apply_config(&mut self, config: Config) -> Result<()> {
        let durations = config.durations();
        self.config = config;
        self.engine
            .update_durations(durations.session_minutes, durations.rest_minutes);
        self.process()
    }

    /// Reset the timer and forget the saved record and statistics.
    pub fn reset_all(&mut self) -> Result<()> {
        self.stats = Statistics::default();
        self.synced_at = None;
        self.engine.reset();
        self.process()?;
        self.gateway.clear()
    }

    /// Final save, then release the engine's ticker and listeners.
    pub fn shutdown(&mut self) -> Result<()> {
        let saved = self.persist();
        self.engine.dispose();
        saved
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn process(&mut self) -> Result<()> {
        let mut changed = false;
        loop {
            let Some(event) = self.queue.borrow_mut().pop_front() else {
                break;
            };
            match event {
                EngineEvent::StateChanged { state } => {
                    self.display.render(&StatusView::from_state(&state));
                    changed = true;
                }
                EngineEvent::Completed {
                    phase,
                    elapsed_seconds,
                    ..
                } => self.on_completed(phase, elapsed_seconds),
            }
        }
        if changed {
            self.persist()?;
        }
        Ok(())
    }

    fn on_completed(&mut self, phase: ActivePhase, elapsed_seconds: u64) {
        match phase {
            ActivePhase::Working => {
                self.credit_session(elapsed_seconds);
                info!(sessions = self.stats.session_count, "work session finished");
            }
            ActivePhase::Resting => info!("rest finished"),
        }

        if self.config.notifications.sound_enabled {
            if let Err(e) = self.audio.play(phase.into()) {
                warn!(error = %e, "completion sound failed");
            }
        }

        let behavior = &self.config.behavior;
        match phase {
            ActivePhase::Working if behavior.auto_start_rest => {
                self.synced_at = None;
                self.engine.start_rest();
            }
            ActivePhase::Resting if behavior.auto_start_work => {
                self.synced_at = None;
                self.engine.start_session();
            }
            _ => {}
        }
    }

    fn credit_session(&mut self, seconds: u64) {
        self.stats.session_count += 1;
        self.stats.total_work_seconds += seconds;
    }

    fn persist(&self) -> Result<()> {
        let state = self.engine.state();
        let (count, secs) = (self.stats.session_count, self.stats.total_work_seconds);
        match self.synced_at {
            Some(at) => self.gateway.save_at(&state, count, secs, at),
            None => self.gateway.save(&state, count, secs),
        }
    }
}
