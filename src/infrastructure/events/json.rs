//! JSON Event Sink
//!
//! Outputs deploy events as NDJSON for CI/automation consumption.

use crate::domain::ports::{DeployEvent, DeployEventSink};
use std::io::{self, Write};
use std::sync::Mutex;

/// Event sink that outputs NDJSON events to stdout
pub struct JsonEventSink {
    /// Mutex to ensure thread-safe writes
    writer: Mutex<Box<dyn Write + Send>>,
}

impl JsonEventSink {
    /// Create a new JSON event sink writing to stdout
    pub fn stdout() -> Self {
        Self {
            writer: Mutex::new(Box::new(io::stdout())),
        }
    }

    /// Create a JSON event sink writing to a custom writer (for testing)
    pub fn with_writer<W: Write + Send + 'static>(writer: W) -> Self {
        Self {
            writer: Mutex::new(Box::new(writer)),
        }
    }

    /// Write one line outside the event stream (final reports, errors)
    pub fn write_value(&self, value: serde_json::Value) {
        if let Ok(mut writer) = self.writer.lock() {
            let _ = writeln!(writer, "{}", value);
            let _ = writer.flush();
        }
    }
}

impl DeployEventSink for JsonEventSink {
    fn on_event(&self, event: DeployEvent) {
        let json = match event {
            DeployEvent::SessionOpened { destination } => serde_json::json!({
                "event": "session_opened",
                "destination": destination,
            }),

            DeployEvent::LedgerFetched { revisions, active } => serde_json::json!({
                "event": "ledger_fetched",
                "revisions": revisions,
                "active": active,
            }),

            DeployEvent::LedgerRecovered { reason } => serde_json::json!({
                "event": "ledger_recovered",
                "reason": reason,
            }),

            DeployEvent::ReleaseDirReady { dir } => serde_json::json!({
                "event": "release_dir_ready",
                "dir": dir,
            }),

            DeployEvent::UploadStarted { total } => serde_json::json!({
                "event": "upload_start",
                "total": total,
            }),

            DeployEvent::FileUploaded { index, path } => serde_json::json!({
                "event": "item_uploaded",
                "index": index,
                "path": path.display().to_string(),
            }),

            DeployEvent::UploadFailed { index, path, error } => serde_json::json!({
                "event": "item_error",
                "index": index,
                "path": path.display().to_string(),
                "error": error,
            }),

            DeployEvent::ReleasesPurged { dirs } => serde_json::json!({
                "event": "releases_purged",
                "dirs": dirs,
            }),

            DeployEvent::PruneSkipped { revision, reason } => serde_json::json!({
                "event": "prune_skipped",
                "revision": revision,
                "reason": reason,
            }),

            DeployEvent::LedgerSaved { revisions } => serde_json::json!({
                "event": "ledger_saved",
                "revisions": revisions,
            }),

            DeployEvent::Activated { revision } => serde_json::json!({
                "event": "activated",
                "revision": revision,
            }),

            DeployEvent::SessionClosed => serde_json::json!({
                "event": "session_closed",
            }),
        };

        self.write_value(json);
    }

    fn wants_detailed_events(&self) -> bool {
        true // JSON mode wants all events
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::sync::{Arc, Mutex};

    struct TestWriter {
        buffer: Arc<Mutex<Vec<u8>>>,
    }

    impl TestWriter {
        fn new() -> (Self, Arc<Mutex<Vec<u8>>>) {
            let buffer = Arc::new(Mutex::new(Vec::new()));
            (
                Self {
                    buffer: buffer.clone(),
                },
                buffer,
            )
        }
    }

    impl Write for TestWriter {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.buffer.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn lines(buffer: &Arc<Mutex<Vec<u8>>>) -> Vec<serde_json::Value> {
        String::from_utf8(buffer.lock().unwrap().clone())
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect()
    }

    #[test]
    fn json_sink_outputs_one_line_per_event() {
        let (writer, buffer) = TestWriter::new();
        let sink = JsonEventSink::with_writer(writer);

        sink.on_event(DeployEvent::SessionOpened {
            destination: "deploy@example.com:22".to_string(),
        });
        sink.on_event(DeployEvent::FileUploaded {
            index: 3,
            path: PathBuf::from("assets/app.js"),
        });
        sink.on_event(DeployEvent::SessionClosed);

        let events = lines(&buffer);
        assert_eq!(events.len(), 3);
        assert_eq!(events[0]["event"], "session_opened");
        assert_eq!(events[1]["index"], 3);
        assert_eq!(events[1]["path"], "assets/app.js");
        assert_eq!(events[2]["event"], "session_closed");
    }

    #[test]
    fn json_sink_reports_active_as_null_when_absent() {
        let (writer, buffer) = TestWriter::new();
        let sink = JsonEventSink::with_writer(writer);

        sink.on_event(DeployEvent::LedgerFetched {
            revisions: 0,
            active: None,
        });

        let events = lines(&buffer);
        assert!(events[0]["active"].is_null());
    }

    #[test]
    fn json_sink_lists_purged_dirs() {
        let (writer, buffer) = TestWriter::new();
        let sink = JsonEventSink::with_writer(writer);

        sink.on_event(DeployEvent::ReleasesPurged {
            dirs: vec!["/var/www/releases/a".to_string()],
        });

        let events = lines(&buffer);
        assert_eq!(events[0]["event"], "releases_purged");
        assert_eq!(events[0]["dirs"][0], "/var/www/releases/a");
    }
}
