use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::timer::{ActivePhase, EngineState, Phase};

/// Durable form of the timer: engine state, save time and counters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedRecord {
    pub phase: Phase,
    pub remaining_seconds: u64,
    pub session_duration_minutes: u32,
    pub rest_duration_minutes: u32,
    pub phase_started_at: Option<DateTime<Utc>>,
    pub paused_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub paused_from: Option<ActivePhase>,
    /// Wall-clock time of the save.
    pub last_active_at: DateTime<Utc>,
    #[serde(default)]
    pub session_count: u64,
    #[serde(default)]
    pub total_work_seconds: u64,
}

/// Cumulative counters kept next to the timer state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Statistics {
    pub session_count: u64,
    pub total_work_seconds: u64,
}

#[derive(Debug, Error)]
pub enum RecordError {
    #[error("malformed record: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("invalid record: {0}")]
    Invalid(&'static str),
}

impl PersistedRecord {
    pub fn new(state: &EngineState, stats: Statistics, last_active_at: DateTime<Utc>) -> Self {
        Self {
            phase: state.phase,
            remaining_seconds: state.remaining_seconds,
            session_duration_minutes: state.session_duration_minutes,
            rest_duration_minutes: state.rest_duration_minutes,
            phase_started_at: state.phase_started_at,
            paused_at: state.paused_at,
            paused_from: state.paused_from,
            last_active_at,
            session_count: stats.session_count,
            total_work_seconds: stats.total_work_seconds,
        }
    }

    /// Parse and validate a stored document.
    pub fn parse(json: &str) -> Result<Self, RecordError> {
        let record: PersistedRecord = serde_json::from_str(json)?;
        record.state().check_invariants().map_err(RecordError::Invalid)?;
        Ok(record)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn state(&self) -> EngineState {
        EngineState {
            phase: self.phase,
            remaining_seconds: self.remaining_seconds,
            session_duration_minutes: self.session_duration_minutes,
            rest_duration_minutes: self.rest_duration_minutes,
            phase_started_at: self.phase_started_at,
            paused_at: self.paused_at,
            paused_from: self.paused_from,
        }
    }

    pub fn statistics(&self) -> Statistics {
        Statistics {
            session_count: self.session_count,
            total_work_seconds: self.total_work_seconds,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALID: &str = r#"{
        "phase": "working",
        "remaining_seconds": 1200,
        "session_duration_minutes": 25,
        "rest_duration_minutes": 5,
        "phase_started_at": "2026-03-01T09:00:00Z",
        "paused_at": null,
        "last_active_at": "2026-03-01T09:05:00Z",
        "session_count": 3,
        "total_work_seconds": 4500
    }"#;

    #[test]
    fn parses_valid_document() {
        let record = PersistedRecord::parse(VALID).unwrap();
        assert_eq!(record.phase, Phase::Working);
        assert_eq!(record.paused_from, None);
        assert_eq!(record.statistics().session_count, 3);
    }

    #[test]
    fn rejects_unknown_phase_tag() {
        let json = VALID.replace("\"working\"", "\"napping\"");
        assert!(matches!(
            PersistedRecord::parse(&json),
            Err(RecordError::Malformed(_))
        ));
    }

    #[test]
    fn rejects_non_numeric_remaining() {
        let json = VALID.replace("1200", "\"soon\"");
        assert!(PersistedRecord::parse(&json).is_err());
        let json = VALID.replace("1200", "-5");
        assert!(PersistedRecord::parse(&json).is_err());
    }

    #[test]
    fn rejects_out_of_range_duration() {
        let json = VALID.replace("\"session_duration_minutes\": 25", "\"session_duration_minutes\": 121");
        assert!(matches!(
            PersistedRecord::parse(&json),
            Err(RecordError::Invalid(_))
        ));
    }

    #[test]
    fn rejects_unparsable_timestamp() {
        let json = VALID.replace("2026-03-01T09:05:00Z", "yesterday-ish");
        assert!(PersistedRecord::parse(&json).is_err());
    }

    #[test]
    fn rejects_running_phase_without_start() {
        let json = VALID.replace("\"2026-03-01T09:00:00Z\"", "null");
        assert!(matches!(
            PersistedRecord::parse(&json),
            Err(RecordError::Invalid(_))
        ));
    }
}
