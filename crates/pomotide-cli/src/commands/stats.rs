use clap::Subcommand;
use pomotide_core::timer::SystemClock;
use pomotide_core::{PersistenceGateway, SqliteStore};
use serde::Serialize;

#[derive(Subcommand)]
pub enum StatsAction {
    /// Completed sessions and total work time
    Show {
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Zero the counters, keeping the timer state
    Reset,
}

#[derive(Serialize)]
struct StatsReport {
    session_count: u64,
    total_work_seconds: u64,
    total_work_minutes: u64,
}

pub fn run(action: StatsAction) -> Result<(), Box<dyn std::error::Error>> {
    let gateway = PersistenceGateway::new(SqliteStore::open()?, SystemClock);

    match action {
        StatsAction::Show { json } => {
            let stats = gateway.statistics()?;
            let report = StatsReport {
                session_count: stats.session_count,
                total_work_seconds: stats.total_work_seconds,
                total_work_minutes: stats.total_work_seconds / 60,
            };
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!(
                    "{} sessions, {} min of work",
                    report.session_count, report.total_work_minutes
                );
            }
        }
        StatsAction::Reset => {
            gateway.update_statistics(0, 0)?;
            println!("statistics reset");
        }
    }
    Ok(())
}
