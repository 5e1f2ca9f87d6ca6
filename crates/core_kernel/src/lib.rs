//! Core Kernel - Foundational types shared by the pharmacy claims crates
//!
//! This crate provides the building blocks used across the workspace:
//! - Strongly-typed identifiers for claims, reversals and audit events
//! - The audit event type and the `AuditSink` port every component records through

pub mod identifiers;
pub mod audit;

pub use identifiers::{ClaimId, ReversalId, AuditEventId};
pub use audit::{AuditEvent, AuditEventKind, AuditSink, RecordingAuditSink};
