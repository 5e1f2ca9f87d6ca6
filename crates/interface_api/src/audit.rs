//! File-backed audit trail
//!
//! Each event becomes one pretty-printed JSON file named
//! `{event_type}-{id}.json` under the log directory. Writes happen on a
//! background task fed by an unbounded channel, so `record` never waits on
//! the filesystem.

use std::path::{Path, PathBuf};

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use core_kernel::{AuditEvent, AuditSink};

/// Audit sink writing events to a directory
#[derive(Debug, Clone)]
pub struct FileAuditSink {
    tx: mpsc::UnboundedSender<AuditEvent>,
}

impl FileAuditSink {
    /// Starts the writer task; must be called inside a Tokio runtime
    ///
    /// The returned handle completes once every sink clone has been dropped
    /// and the queued events are written.
    pub fn spawn(log_dir: impl Into<PathBuf>) -> (Self, JoinHandle<()>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let handle = tokio::spawn(write_events(log_dir.into(), rx));
        (Self { tx }, handle)
    }
}

impl AuditSink for FileAuditSink {
    fn record(&self, event: AuditEvent) {
        if let Err(e) = self.tx.send(event) {
            warn!(event_type = %e.0.event_type, "Audit writer stopped, event dropped");
        }
    }
}

/// File name for an event
pub fn event_file_name(event: &AuditEvent) -> String {
    format!("{}-{}.json", event.event_type, event.id.as_uuid())
}

async fn write_events(log_dir: PathBuf, mut rx: mpsc::UnboundedReceiver<AuditEvent>) {
    if let Err(e) = tokio::fs::create_dir_all(&log_dir).await {
        warn!(dir = %log_dir.display(), error = %e, "Failed to create audit log directory");
    }

    while let Some(event) = rx.recv().await {
        write_event(&log_dir, &event).await;
    }
    debug!("Audit writer finished");
}

async fn write_event(log_dir: &Path, event: &AuditEvent) {
    let path = log_dir.join(event_file_name(event));
    let body = match serde_json::to_vec_pretty(event) {
        Ok(body) => body,
        Err(e) => {
            warn!(event_type = %event.event_type, error = %e, "Failed to serialize audit event");
            return;
        }
    };
    if let Err(e) = tokio::fs::write(&path, body).await {
        warn!(file = %path.display(), error = %e, "Failed to write audit event");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_kernel::AuditEventKind;
    use serde_json::json;

    #[tokio::test]
    async fn test_events_are_written_as_files() {
        let dir = tempfile::tempdir().unwrap();
        let log_dir = dir.path().join("logs");
        let (sink, writer) = FileAuditSink::spawn(&log_dir);

        let event = AuditEvent::new(AuditEventKind::ClaimSubmitted, json!({"npi": "1234567890"}));
        let expected = log_dir.join(event_file_name(&event));
        sink.record(event);
        drop(sink);
        writer.await.unwrap();

        let written: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(expected).unwrap()).unwrap();
        assert_eq!(written["event_type"], "claim_submitted");
        assert_eq!(written["payload"]["npi"], "1234567890");
    }

    #[tokio::test]
    async fn test_record_after_writer_stopped_does_not_panic() {
        let dir = tempfile::tempdir().unwrap();
        let (sink, writer) = FileAuditSink::spawn(dir.path());
        writer.abort();
        let _ = writer.await;

        sink.record(AuditEvent::new(AuditEventKind::ClaimReversed, json!({})));
    }
}
