//! Infrastructure Database Layer
//!
//! This crate provides the PostgreSQL persistence gateway for the pharmacy
//! claims system using SQLx.
//!
//! # Architecture
//!
//! The crate follows the repository pattern: `ClaimsRepository` owns the SQL,
//! and `PostgresClaimsAdapter` implements the domain's `ClaimsPort` on top of
//! it, translating rows and errors.
//!
//! # Atomicity
//!
//! - Claim reversal runs check-then-insert in one transaction with the claim
//!   row locked, backed by a unique constraint on `reversals.claim_id`
//! - Batch inserts run in one transaction per batch and skip rows whose key
//!   already exists
//!
//! # Example
//!
//! ```rust,ignore
//! use infra_db::{DatabaseConfig, create_pool, run_migrations, PostgresClaimsAdapter};
//!
//! let pool = create_pool(DatabaseConfig::new("postgres://localhost/pharmacy_claims")).await?;
//! run_migrations(&pool).await?;
//! let port = PostgresClaimsAdapter::new(pool);
//! ```

pub mod pool;
pub mod error;
pub mod repositories;
pub mod adapters;

pub use pool::{DatabaseConfig, create_pool, wait_for_database, run_migrations};
pub use error::DatabaseError;
pub use repositories::ClaimsRepository;
pub use adapters::PostgresClaimsAdapter;
