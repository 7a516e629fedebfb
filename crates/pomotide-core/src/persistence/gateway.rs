use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use super::reconcile::{reconcile, Reconciled};
use super::record::{PersistedRecord, Statistics};
use crate::error::Result;
use crate::storage::KvStore;
use crate::timer::{ActivePhase, Clock, EngineState};

/// Key of the timer record in the store.
pub const RECORD_KEY: &str = "timer_state";

/// Outcome of a successful restore.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Restored {
    pub state: EngineState,
    /// Phases that ran out while the host was closed, oldest first.
    pub finished_while_away: Vec<ActivePhase>,
    pub statistics: Statistics,
    /// Instant `state` is exact for; pass it to [`PersistenceGateway::save_at`]
    /// when writing the state back unchanged.
    pub as_of: DateTime<Utc>,
}

/// Durable round-trip of the timer state and counters.
///
/// Corrupted records are handled here: they are erased and reported as
/// absent. Storage failures propagate to the caller.
pub struct PersistenceGateway<S: KvStore> {
    store: S,
    clock: Box<dyn Clock>,
}

impl<S: KvStore> PersistenceGateway<S> {
    pub fn new(store: S, clock: impl Clock + 'static) -> Self {
        Self {
            store,
            clock: Box::new(clock),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Overwrite the record with `state`, stamped with the current time.
    pub fn save(&self, state: &EngineState, session_count: u64, total_work_seconds: u64) -> Result<()> {
        self.save_at(state, session_count, total_work_seconds, self.clock.now())
    }

    /// Overwrite the record with `state`, stamped with `as_of`.
    pub fn save_at(
        &self,
        state: &EngineState,
        session_count: u64,
        total_work_seconds: u64,
        as_of: DateTime<Utc>,
    ) -> Result<()> {
        let stats = Statistics {
            session_count,
            total_work_seconds,
        };
        let record = PersistedRecord::new(state, stats, as_of);
        self.store.set(RECORD_KEY, &record.to_json()?)?;
        debug!(phase = %state.phase, remaining = state.remaining_seconds, "timer state saved");
        Ok(())
    }

    /// Load the state, corrected for the time elapsed since the last save.
    ///
    /// Returns `None` when nothing was saved or the record was invalid.
    pub fn load(&self) -> Result<Option<EngineState>> {
        Ok(self.restore()?.map(|r| r.state))
    }

    /// Like [`load`](Self::load), also reporting counters and the phases
    /// that finished while the host was closed.
    pub fn restore(&self) -> Result<Option<Restored>> {
        let Some(record) = self.read_record()? else {
            return Ok(None);
        };
        let Reconciled {
            state,
            finished,
            as_of,
        } = reconcile(&record, self.clock.now());
        if !finished.is_empty() {
            debug!(?finished, phase = %state.phase, "reconciled expired countdown");
        }
        Ok(Some(Restored {
            state,
            finished_while_away: finished,
            statistics: record.statistics(),
            as_of,
        }))
    }

    pub fn clear(&self) -> Result<()> {
        self.store.delete(RECORD_KEY)?;
        Ok(())
    }

    /// Counters from the record, zero when absent or invalid.
    pub fn statistics(&self) -> Result<Statistics> {
        Ok(self
            .read_record()?
            .map(|r| r.statistics())
            .unwrap_or_default())
    }

    /// Replace the counters, leaving the phase fields and save time alone.
    /// Does nothing when there is no valid record.
    pub fn update_statistics(&self, session_count: u64, total_work_seconds: u64) -> Result<()> {
        let Some(mut record) = self.read_record()? else {
            return Ok(());
        };
        record.session_count = session_count;
        record.total_work_seconds = total_work_seconds;
        self.store.set(RECORD_KEY, &record.to_json()?)?;
        Ok(())
    }

    fn read_record(&self) -> Result<Option<PersistedRecord>> {
        let Some(json) = self.store.get(RECORD_KEY)? else {
            return Ok(None);
        };
        match PersistedRecord::parse(&json) {
            Ok(record) => Ok(Some(record)),
            Err(e) => {
                warn!(error = %e, "discarding corrupted timer record");
                self.clear()?;
                Ok(None)
            }
        }
    }
}
