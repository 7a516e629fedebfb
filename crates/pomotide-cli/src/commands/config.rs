use clap::Subcommand;
use pomotide_core::host::{NullDisplay, SilentNotifier};
use pomotide_core::timer::ManualScheduler;
use pomotide_core::Config;

use super::open_host;

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Get a config value
    Get {
        /// Config key (e.g. "timer.session_duration_minutes")
        key: String,
    },
    /// Set a config value
    Set {
        /// Config key
        key: String,
        /// New value
        value: String,
    },
    /// List all config values
    List,
    /// Reset config to defaults
    Reset,
}

pub fn run(action: ConfigAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        ConfigAction::Get { key } => {
            let config = Config::load()?;
            match config.get(&key) {
                Some(value) => println!("{value}"),
                None => return Err(format!("unknown key: {key}").into()),
            }
        }
        ConfigAction::Set { key, value } => {
            let mut config = Config::load()?;
            config.set(&key, &value)?;
            if key.starts_with("timer.") {
                push_durations(config)?;
            }
            println!("ok");
        }
        ConfigAction::List => {
            let config = Config::load()?;
            let json = serde_json::to_string_pretty(&config)?;
            println!("{json}");
        }
        ConfigAction::Reset => {
            let config = Config::default();
            config.save()?;
            push_durations(config)?;
            println!("config reset to defaults");
        }
    }
    Ok(())
}

/// Rescale a saved countdown to the new durations.
fn push_durations(config: Config) -> Result<(), Box<dyn std::error::Error>> {
    let mut host = open_host(config.clone(), ManualScheduler::new(), NullDisplay, SilentNotifier)?;
    host.apply_config(config)?;
    host.shutdown()?;
    Ok(())
}
