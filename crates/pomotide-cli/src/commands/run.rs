//! Foreground host loop.

use std::str::FromStr;

use pomotide_core::timer::IntervalScheduler;
use pomotide_core::Config;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info};

use super::open_host;
use crate::terminal::{StatusLine, TerminalBell};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LoopCommand {
    Start,
    Rest,
    Pause,
    Resume,
    Reset,
    Quit,
}

impl FromStr for LoopCommand {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "start" | "s" | "work" => Ok(LoopCommand::Start),
            "rest" | "r" | "break" => Ok(LoopCommand::Rest),
            "pause" | "p" => Ok(LoopCommand::Pause),
            "resume" | "c" => Ok(LoopCommand::Resume),
            "reset" | "x" => Ok(LoopCommand::Reset),
            "quit" | "q" | "exit" => Ok(LoopCommand::Quit),
            other => Err(format!("unknown command: {other}")),
        }
    }
}

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    runtime.block_on(run_loop())
}

async fn run_loop() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let show_icons = config.display.show_icons;
    let (scheduler, mut ticks) = IntervalScheduler::new();
    let mut host = open_host(config, scheduler, StatusLine::new(show_icons), TerminalBell)?;
    info!(phase = %host.state().phase, "timer host running");
    eprintln!("commands: start, rest, pause, resume, reset, quit");
    eprint!("{}", host.view().line(show_icons));

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;

    loop {
        tokio::select! {
            Some(()) = ticks.recv() => host.tick()?,
            line = lines.next_line(), if stdin_open => {
                let Some(line) = line? else {
                    debug!("stdin closed, running until interrupted");
                    stdin_open = false;
                    continue;
                };
                if line.trim().is_empty() {
                    continue;
                }
                match line.parse::<LoopCommand>() {
                    Ok(LoopCommand::Quit) => break,
                    Ok(LoopCommand::Start) => host.start_session()?,
                    Ok(LoopCommand::Rest) => host.start_rest()?,
                    Ok(LoopCommand::Pause) => host.pause()?,
                    Ok(LoopCommand::Resume) => host.resume()?,
                    Ok(LoopCommand::Reset) => host.reset()?,
                    Err(e) => eprintln!("\n{e}"),
                }
            }
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    eprintln!();
    host.shutdown()?;
    Ok(())
}
