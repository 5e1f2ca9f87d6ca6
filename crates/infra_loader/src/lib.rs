//! Seed data loader
//!
//! Fills the pharmacy, claim and reversal tables from files on disk at
//! startup. Tables that already hold rows are left alone, so restarting the
//! service never duplicates data.
//!
//! # Layout
//!
//! ```text
//! <data_dir>/pharmacies/*.csv   chain,npi
//! <data_dir>/claims/*.json      [{id, ndc, npi, quantity, price, timestamp}]
//! <data_dir>/reverts/*.json     [{id, claim_id, timestamp, reason?}]
//! ```
//!
//! JSON files are parsed by a pool of blocking workers while a single
//! consumer batches the parsed records into the database.

pub mod error;
pub mod report;
pub mod entity;
pub mod files;
pub mod loader;

pub use error::LoaderError;
pub use report::LoadReport;
pub use entity::{JsonSeed, SeedEntity};
pub use loader::{effective_batch_size, Loader, DEFAULT_BATCH_SIZE, MAX_BATCH_SIZE, MAX_CONCURRENT_WORKERS};
