use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Bounds for the work session length, in minutes.
pub const SESSION_MINUTES_MIN: u32 = 1;
pub const SESSION_MINUTES_MAX: u32 = 120;
/// Bounds for the rest length, in minutes.
pub const REST_MINUTES_MIN: u32 = 1;
pub const REST_MINUTES_MAX: u32 = 60;

pub const DEFAULT_SESSION_MINUTES: u32 = 25;
pub const DEFAULT_REST_MINUTES: u32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Idle,
    Working,
    Resting,
    Paused,
}

impl Phase {
    pub fn as_str(self) -> &'static str {
        match self {
            Phase::Idle => "idle",
            Phase::Working => "working",
            Phase::Resting => "resting",
            Phase::Paused => "paused",
        }
    }

    /// The running phase this corresponds to, if the clock is ticking.
    pub fn active(self) -> Option<ActivePhase> {
        match self {
            Phase::Working => Some(ActivePhase::Working),
            Phase::Resting => Some(ActivePhase::Resting),
            Phase::Idle | Phase::Paused => None,
        }
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A phase with a running countdown.
///
/// Used to remember what a pause interrupted and to tag completions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivePhase {
    Working,
    Resting,
}

impl From<ActivePhase> for Phase {
    fn from(active: ActivePhase) -> Self {
        match active {
            ActivePhase::Working => Phase::Working,
            ActivePhase::Resting => Phase::Resting,
        }
    }
}

/// Configured work/rest lengths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Durations {
    pub session_minutes: u32,
    pub rest_minutes: u32,
}

impl Durations {
    /// Build durations, clamping each value into its permitted range.
    ///
    /// Out-of-range input never fails: `0` becomes the minimum and anything
    /// past the maximum becomes the maximum.
    pub fn clamped(session_minutes: u32, rest_minutes: u32) -> Self {
        Self {
            session_minutes: session_minutes.clamp(SESSION_MINUTES_MIN, SESSION_MINUTES_MAX),
            rest_minutes: rest_minutes.clamp(REST_MINUTES_MIN, REST_MINUTES_MAX),
        }
    }

    pub fn is_within_bounds(&self) -> bool {
        (SESSION_MINUTES_MIN..=SESSION_MINUTES_MAX).contains(&self.session_minutes)
            && (REST_MINUTES_MIN..=REST_MINUTES_MAX).contains(&self.rest_minutes)
    }

    pub fn session_secs(&self) -> u64 {
        u64::from(self.session_minutes) * 60
    }

    pub fn rest_secs(&self) -> u64 {
        u64::from(self.rest_minutes) * 60
    }

    pub fn secs_for(&self, phase: ActivePhase) -> u64 {
        match phase {
            ActivePhase::Working => self.session_secs(),
            ActivePhase::Resting => self.rest_secs(),
        }
    }
}

impl Default for Durations {
    fn default() -> Self {
        Self {
            session_minutes: DEFAULT_SESSION_MINUTES,
            rest_minutes: DEFAULT_REST_MINUTES,
        }
    }
}

/// Snapshot of the timer.
///
/// The engine owns the live copy; everyone else only sees clones.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineState {
    pub phase: Phase,
    pub remaining_seconds: u64,
    pub session_duration_minutes: u32,
    pub rest_duration_minutes: u32,
    pub phase_started_at: Option<DateTime<Utc>>,
    pub paused_at: Option<DateTime<Utc>>,
    /// Phase that was running when the timer was paused.
    pub paused_from: Option<ActivePhase>,
}

impl EngineState {
    pub fn idle(durations: Durations) -> Self {
        Self {
            phase: Phase::Idle,
            remaining_seconds: 0,
            session_duration_minutes: durations.session_minutes,
            rest_duration_minutes: durations.rest_minutes,
            phase_started_at: None,
            paused_at: None,
            paused_from: None,
        }
    }

    pub fn durations(&self) -> Durations {
        Durations {
            session_minutes: self.session_duration_minutes,
            rest_minutes: self.rest_duration_minutes,
        }
    }

    /// The phase whose countdown `remaining_seconds` belongs to.
    ///
    /// For a paused timer this is the phase the pause interrupted.
    pub fn countdown_phase(&self) -> Option<ActivePhase> {
        match self.phase {
            Phase::Working => Some(ActivePhase::Working),
            Phase::Resting => Some(ActivePhase::Resting),
            Phase::Paused => self.paused_from,
            Phase::Idle => None,
        }
    }

    /// Total length of the current countdown in seconds, `0` when idle.
    pub fn total_seconds(&self) -> u64 {
        self.countdown_phase()
            .map(|p| self.durations().secs_for(p))
            .unwrap_or(0)
    }

    /// Check the structural invariants of a state.
    ///
    /// Returns a short description of the first violation.
    pub fn check_invariants(&self) -> Result<(), &'static str> {
        if !self.durations().is_within_bounds() {
            return Err("duration out of range");
        }
        match self.phase {
            Phase::Idle => {
                if self.remaining_seconds != 0 {
                    return Err("idle timer with remaining time");
                }
                if self.phase_started_at.is_some() || self.paused_at.is_some() {
                    return Err("idle timer with timestamps");
                }
                if self.paused_from.is_some() {
                    return Err("idle timer with pause origin");
                }
            }
            Phase::Working | Phase::Resting => {
                if self.phase_started_at.is_none() {
                    return Err("running timer without start time");
                }
                if self.paused_at.is_some() || self.paused_from.is_some() {
                    return Err("running timer with pause data");
                }
            }
            Phase::Paused => {
                if self.paused_at.is_none() {
                    return Err("paused timer without pause time");
                }
                if self.paused_from.is_none() {
                    return Err("paused timer without pause origin");
                }
                if self.phase_started_at.is_some() {
                    return Err("paused timer with start time");
                }
            }
        }
        if self.remaining_seconds > self.total_seconds() {
            return Err("remaining time exceeds phase duration");
        }
        Ok(())
    }
}
