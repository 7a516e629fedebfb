//! Terminal collaborators for the timer host.

use std::io::Write;

use pomotide_core::host::{AudioNotifier, Cue, StatusDisplay};
use pomotide_core::StatusView;

/// Redraws a single status line on stderr.
pub struct StatusLine {
    show_icons: bool,
}

impl StatusLine {
    pub fn new(show_icons: bool) -> Self {
        Self { show_icons }
    }
}

impl StatusDisplay for StatusLine {
    fn render(&mut self, view: &StatusView) {
        let mut err = std::io::stderr().lock();
        // \x1b[2K clears the previous, possibly longer, line.
        let _ = write!(err, "\r\x1b[2K{}", view.line(self.show_icons));
        let _ = err.flush();
    }
}

/// Rings the terminal bell: once after work, twice after rest.
pub struct TerminalBell;

impl AudioNotifier for TerminalBell {
    fn play(&mut self, cue: Cue) -> Result<(), Box<dyn std::error::Error>> {
        let bells = match cue {
            Cue::WorkFinished => "\x07",
            Cue::RestFinished => "\x07\x07",
        };
        let mut out = std::io::stdout().lock();
        out.write_all(bells.as_bytes())?;
        out.flush()?;
        Ok(())
    }
}
