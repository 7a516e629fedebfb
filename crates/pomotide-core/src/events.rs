use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::timer::{ActivePhase, EngineState};

/// Notifications emitted by the timer engine.
///
/// Every mutation produces a `StateChanged`; a countdown reaching zero
/// additionally produces a `Completed` right after it. `elapsed_seconds` is
/// the time actually spent in the finished countdown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EngineEvent {
    StateChanged { state: EngineState },
    Completed {
        phase: ActivePhase,
        elapsed_seconds: u64,
        at: DateTime<Utc>,
    },
}

impl EngineEvent {
    pub fn is_completion(&self) -> bool {
        matches!(self, EngineEvent::Completed { .. })
    }
}
