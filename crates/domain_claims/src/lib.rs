//! Pharmacy Claims Domain
//!
//! This crate implements the prescription claim lifecycle: a claim is
//! submitted against a known pharmacy and may later be reversed exactly once.
//!
//! # Claim Lifecycle
//!
//! ```text
//! Submitted -> Reversed (terminal, at most one reversal per claim)
//! ```
//!
//! Persistence is reached only through the [`ClaimsPort`] trait, so the same
//! service runs against PostgreSQL in production and an in-memory store in tests.

pub mod pharmacy;
pub mod claim;
pub mod reversal;
pub mod timestamp;
pub mod validation;
pub mod ports;
pub mod service;
pub mod error;

pub use pharmacy::{Pharmacy, PharmacyChain};
pub use claim::{Claim, ClaimRequest, ClaimReceipt};
pub use reversal::{Reversal, ReversalRequest, ReversalReceipt};
pub use validation::ClaimValidator;
pub use ports::{ClaimsPort, BatchOutcome, SeedTable};
pub use service::ClaimsService;
pub use error::{ClaimError, ClaimErrorKind, ValidationError, ValidationField};
