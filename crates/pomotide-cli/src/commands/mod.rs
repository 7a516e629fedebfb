pub mod config;
pub mod run;
pub mod stats;
pub mod timer;

use pomotide_core::host::{AudioNotifier, StatusDisplay};
use pomotide_core::timer::{Scheduler, SystemClock};
use pomotide_core::{Config, PersistenceGateway, SqliteStore, TimerEngine, TimerHost};

/// Build the host on top of the on-disk store and restore the saved timer.
pub fn open_host(
    config: Config,
    scheduler: impl Scheduler + 'static,
    display: impl StatusDisplay + 'static,
    audio: impl AudioNotifier + 'static,
) -> Result<TimerHost<SqliteStore>, Box<dyn std::error::Error>> {
    let engine = TimerEngine::new(config.durations(), SystemClock, scheduler);
    let gateway = PersistenceGateway::new(SqliteStore::open()?, SystemClock);
    let mut host = TimerHost::new(engine, gateway, config, display, audio);
    host.open()?;
    Ok(host)
}
