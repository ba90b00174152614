//! Console Event Sink
//!
//! Human-readable progress lines. Colors only when writing to a terminal.

use std::io::{self, Write};
use std::sync::Mutex;

use crossterm::style::{Color, Stylize};
use is_terminal::IsTerminal;

use crate::domain::ports::{DeployEvent, DeployEventSink};

const SUCCESS: Color = Color::Green;
const ERROR: Color = Color::Red;
const WARNING: Color = Color::Yellow;
const DIM: Color = Color::DarkGrey;

pub struct ConsoleEventSink {
    writer: Mutex<Box<dyn Write + Send>>,
    color: bool,
    verbose: bool,
}

impl ConsoleEventSink {
    /// Write to stderr, keeping stdout free for command output
    pub fn stderr(verbose: bool) -> Self {
        let color = io::stderr().is_terminal() && std::env::var_os("NO_COLOR").is_none();
        Self {
            writer: Mutex::new(Box::new(io::stderr())),
            color,
            verbose,
        }
    }

    pub fn with_writer<W: Write + Send + 'static>(writer: W, color: bool, verbose: bool) -> Self {
        Self {
            writer: Mutex::new(Box::new(writer)),
            color,
            verbose,
        }
    }

    fn paint(&self, text: &str, color: Color) -> String {
        if self.color {
            text.with(color).to_string()
        } else {
            text.to_string()
        }
    }

    fn line(&self, text: String) {
        if let Ok(mut writer) = self.writer.lock() {
            let _ = writeln!(writer, "{text}");
            let _ = writer.flush();
        }
    }

    fn render(&self, event: DeployEvent) -> Option<String> {
        let line = match event {
            DeployEvent::SessionOpened { destination } => {
                self.paint(&format!("Connected to {destination}"), SUCCESS)
            }
            DeployEvent::LedgerFetched { revisions, active } => {
                let active = active.unwrap_or_else(|| "none".to_string());
                format!("Found {revisions} revision(s), active: {active}")
            }
            DeployEvent::LedgerRecovered { reason } => self.paint(
                &format!("Ignoring unreadable revision ledger ({reason})"),
                WARNING,
            ),
            DeployEvent::ReleaseDirReady { dir } => {
                self.paint(&format!("Created directory {dir}"), SUCCESS)
            }
            DeployEvent::UploadStarted { total } => {
                self.paint(&format!("Uploading {total} file(s)"), SUCCESS)
            }
            DeployEvent::FileUploaded { path, .. } => {
                if !self.verbose {
                    return None;
                }
                self.paint(&format!("  {}", path.display()), DIM)
            }
            DeployEvent::UploadFailed { path, error, .. } => self.paint(
                &format!("  {} failed to upload: {error}", path.display()),
                ERROR,
            ),
            DeployEvent::ReleasesPurged { dirs } => {
                let mut text = self.paint("Purging revisions:", SUCCESS);
                for dir in dirs {
                    text.push_str(&format!("\n  {dir}"));
                }
                text
            }
            DeployEvent::PruneSkipped { revision, reason } => self.paint(
                &format!("Skipping ledger entry '{revision}' ({reason})"),
                WARNING,
            ),
            DeployEvent::LedgerSaved { revisions } => {
                format!("Saved revision ledger ({revisions} revision(s))")
            }
            DeployEvent::Activated { revision } => {
                self.paint(&format!("Revision {revision} is now active!"), SUCCESS)
            }
            DeployEvent::SessionClosed => self.paint("Connection closed", SUCCESS),
        };
        Some(line)
    }
}

impl DeployEventSink for ConsoleEventSink {
    fn on_event(&self, event: DeployEvent) {
        if let Some(line) = self.render(event) {
            self.line(line);
        }
    }

    fn wants_detailed_events(&self) -> bool {
        self.verbose
    }
}
