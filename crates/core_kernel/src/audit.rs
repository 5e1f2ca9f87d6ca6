//! Audit trail port
//!
//! Every business operation and every seeded record leaves an [`AuditEvent`].
//! Recording is fire-and-forget: [`AuditSink::record`] returns nothing, so a
//! failing sink can never change the outcome of the operation that emitted it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Mutex;

use crate::identifiers::AuditEventId;

/// Kind of audit event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditEventKind {
    /// A claim was accepted over the API
    ClaimSubmitted,
    /// A claim was reversed over the API
    ClaimReversed,
    /// A pharmacy was inserted by the seed loader
    PharmacyLoaded,
    /// A claim was inserted by the seed loader
    ClaimLoaded,
    /// A reversal was inserted by the seed loader
    ReversalLoaded,
}

impl AuditEventKind {
    /// Returns the stable wire name of the event kind
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditEventKind::ClaimSubmitted => "claim_submitted",
            AuditEventKind::ClaimReversed => "claim_reversed",
            AuditEventKind::PharmacyLoaded => "pharmacy_loaded",
            AuditEventKind::ClaimLoaded => "claim_loaded",
            AuditEventKind::ReversalLoaded => "reversal_loaded",
        }
    }
}

impl fmt::Display for AuditEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single append-only audit record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEvent {
    /// Unique identifier
    pub id: AuditEventId,
    /// What happened
    pub event_type: AuditEventKind,
    /// When it happened
    pub timestamp: DateTime<Utc>,
    /// Event-specific data
    pub payload: serde_json::Value,
}

impl AuditEvent {
    /// Creates an event stamped with the current time
    pub fn new(event_type: AuditEventKind, payload: serde_json::Value) -> Self {
        Self {
            id: AuditEventId::new_v7(),
            event_type,
            timestamp: Utc::now(),
            payload,
        }
    }
}

/// Destination for audit events
///
/// Implementations must not block the caller for long and must swallow
/// their own failures (logging them is fine).
pub trait AuditSink: Send + Sync + 'static {
    /// Records an event, best-effort
    fn record(&self, event: AuditEvent);
}

/// Sink that keeps events in memory, for tests and diagnostics
#[derive(Debug, Default)]
pub struct RecordingAuditSink {
    events: Mutex<Vec<AuditEvent>>,
}

impl RecordingAuditSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of everything recorded so far
    pub fn events(&self) -> Vec<AuditEvent> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }

    /// Returns the recorded events of one kind
    pub fn events_of(&self, kind: AuditEventKind) -> Vec<AuditEvent> {
        self.events()
            .into_iter()
            .filter(|e| e.event_type == kind)
            .collect()
    }
}

impl AuditSink for RecordingAuditSink {
    fn record(&self, event: AuditEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event);
        }
    }
}
