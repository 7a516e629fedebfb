//! Persistence of the timer across host restarts.
//!
//! The [`PersistenceGateway`] writes a JSON [`PersistedRecord`] into a
//! [`KvStore`](crate::storage::KvStore) and, on startup, reads it back
//! through [`reconcile`] so a countdown that kept running while the host was
//! closed resumes where it would be now.

mod gateway;
mod reconcile;
mod record;

pub use gateway::{PersistenceGateway, Restored, RECORD_KEY};
pub use reconcile::{elapsed_since, reconcile, Reconciled};
pub use record::{PersistedRecord, RecordError, Statistics};
