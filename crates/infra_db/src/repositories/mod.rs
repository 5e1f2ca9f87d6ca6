//! Repository implementations
//!
//! Repositories encapsulate SQL and map between database rows and plain
//! column types. Queries are built at runtime with `sqlx::query_as` and
//! `FromRow`, so the crate builds without a live database.

pub mod claims;

pub use claims::ClaimsRepository;
