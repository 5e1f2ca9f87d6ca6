//! Test Utilities Crate
//!
//! Provides shared test infrastructure, fixtures, and helpers for the
//! pharmacy claims test suite.
//!
//! # Modules
//!
//! - `fixtures`: Pre-built pharmacies, claims and reversals
//! - `builders`: Claim builder and on-disk seed directory builder
//! - `database`: PostgreSQL test container management
//! - `assertions`: Custom assertion helpers for claim types
//! - `generators`: Property-based test data generators

pub mod fixtures;
pub mod builders;
pub mod database;
pub mod assertions;
pub mod generators;

pub use fixtures::*;
pub use builders::*;
pub use database::*;
pub use assertions::*;
pub use generators::*;
