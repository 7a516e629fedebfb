//! Status line model shared by every display.

use serde::Serialize;

use crate::timer::{ActivePhase, EngineState, Phase};

/// Format seconds as `MM:SS`.
///
/// Minutes are not wrapped into hours: `3661` renders as `61:01`.
pub fn format_remaining(seconds: u64) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

pub fn phase_icon(phase: Phase) -> &'static str {
    match phase {
        Phase::Idle => "○",
        Phase::Working => "●",
        Phase::Resting => "☕",
        Phase::Paused => "⏸",
    }
}

pub fn phase_label(phase: Phase, paused_from: Option<ActivePhase>) -> &'static str {
    match (phase, paused_from) {
        (Phase::Idle, _) => "Idle",
        (Phase::Working, _) => "Work",
        (Phase::Resting, _) => "Rest",
        (Phase::Paused, Some(ActivePhase::Resting)) => "Rest (paused)",
        (Phase::Paused, _) => "Work (paused)",
    }
}

/// What a display needs to draw one frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusView {
    pub phase: Phase,
    pub remaining_seconds: u64,
    pub session_duration_minutes: u32,
    pub rest_duration_minutes: u32,
    pub icon: &'static str,
    pub label: &'static str,
    pub countdown: String,
}

impl StatusView {
    pub fn from_state(state: &EngineState) -> Self {
        Self {
            phase: state.phase,
            remaining_seconds: state.remaining_seconds,
            session_duration_minutes: state.session_duration_minutes,
            rest_duration_minutes: state.rest_duration_minutes,
            icon: phase_icon(state.phase),
            label: phase_label(state.phase, state.paused_from),
            countdown: format_remaining(state.remaining_seconds),
        }
    }

    /// One-line rendering, e.g. `● Work 24:59`.
    pub fn line(&self, with_icon: bool) -> String {
        if with_icon {
            format!("{} {} {}", self.icon, self.label, self.countdown)
        } else {
            format!("{} {}", self.label, self.countdown)
        }
    }
}
