use clap::Subcommand;
use pomotide_core::host::{NullDisplay, SilentNotifier};
use pomotide_core::timer::ManualScheduler;
use pomotide_core::Config;

use super::open_host;

#[derive(Subcommand)]
pub enum TimerAction {
    /// Start a work session
    Start,
    /// Start a rest
    Rest,
    /// Pause the running countdown
    Pause,
    /// Resume a paused countdown
    Resume,
    /// Reset to idle state
    Reset,
    /// Print the current timer state
    Status {
        /// Print JSON instead of a status line
        #[arg(long)]
        json: bool,
    },
}

/// One-shot control: restore (with drift correction), apply, save.
///
/// No ticker runs between invocations; the next invocation catches up from
/// the saved timestamp.
pub fn run(action: TimerAction) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let show_icons = config.display.show_icons;
    let mut host = open_host(config, ManualScheduler::new(), NullDisplay, SilentNotifier)?;

    let mut json = false;
    match action {
        TimerAction::Start => host.start_session()?,
        TimerAction::Rest => host.start_rest()?,
        TimerAction::Pause => host.pause()?,
        TimerAction::Resume => host.resume()?,
        TimerAction::Reset => host.reset()?,
        TimerAction::Status { json: as_json } => json = as_json,
    }

    let view = host.view();
    if json {
        println!("{}", serde_json::to_string_pretty(&view)?);
    } else {
        println!("{}", view.line(show_icons));
    }

    host.shutdown()?;
    Ok(())
}
