//! Drift correction for states restored after downtime.
//!
//! A saved countdown kept running in wall-clock terms while the host was
//! closed. Reconciliation maps the stale `(phase, remaining)` pair to the
//! pair that would be correct now. Arithmetic is done on whole seconds
//! between two UTC instants, so local clock changes (DST, timezone) never
//! leak in.

use chrono::{DateTime, Duration, Utc};

use super::record::PersistedRecord;
use crate::timer::{ActivePhase, EngineState, Phase};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reconciled {
    pub state: EngineState,
    /// Phases that ran out while the host was away, oldest first.
    pub finished: Vec<ActivePhase>,
    /// Instant `state` is exact for. Trails `now` by the sub-second part of
    /// the gap while a countdown is still running; saving with it keeps
    /// that fraction for the next restore.
    pub as_of: DateTime<Utc>,
}

/// Seconds between the save and `now`, floored and never negative.
pub fn elapsed_since(last_active_at: DateTime<Utc>, now: DateTime<Utc>) -> u64 {
    (now - last_active_at).num_seconds().max(0) as u64
}

pub fn reconcile(record: &PersistedRecord, now: DateTime<Utc>) -> Reconciled {
    let state = record.state();
    let Some(active) = state.phase.active() else {
        // Idle has nothing to drift and a paused clock was stopped at pause time.
        return Reconciled {
            state,
            finished: Vec::new(),
            as_of: now,
        };
    };

    let elapsed = elapsed_since(record.last_active_at, now);
    let as_of = record.last_active_at + Duration::seconds(elapsed as i64);
    let stored = state.remaining_seconds;
    let adjusted = stored.saturating_sub(elapsed);
    if adjusted > 0 {
        return Reconciled {
            state: EngineState {
                remaining_seconds: adjusted,
                ..state
            },
            finished: Vec::new(),
            as_of,
        };
    }

    let durations = state.durations();
    match active {
        ActivePhase::Working => {
            let overflow = elapsed - stored;
            let rest_secs = durations.rest_secs();
            if overflow < rest_secs {
                let rest_started = record.last_active_at + Duration::seconds(stored as i64);
                Reconciled {
                    state: EngineState {
                        phase: Phase::Resting,
                        remaining_seconds: rest_secs - overflow,
                        phase_started_at: Some(rest_started),
                        ..EngineState::idle(durations)
                    },
                    finished: vec![ActivePhase::Working],
                    as_of,
                }
            } else {
                Reconciled {
                    state: EngineState::idle(durations),
                    finished: vec![ActivePhase::Working, ActivePhase::Resting],
                    as_of: now,
                }
            }
        }
        ActivePhase::Resting => Reconciled {
            state: EngineState::idle(durations),
            finished: vec![ActivePhase::Resting],
            as_of: now,
        },
    }
}
