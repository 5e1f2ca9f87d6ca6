//! Claims Domain Ports
//!
//! This module defines the persistence gateway the claims domain needs,
//! enabling swappable implementations (PostgreSQL, in-memory mock).
//!
//! # Architecture
//!
//! The `ClaimsPort` trait covers both the request-time operations used by
//! [`ClaimsService`](crate::ClaimsService) and the batch operations used by
//! the seed loader, so both paths share one storage contract:
//!
//! - **Internal Adapter**: PostgreSQL (`infra_db::PostgresClaimsAdapter`)
//! - **Mock Adapter**: in-memory store for tests (feature `mock`)
//!
//! # Atomicity
//!
//! `reverse_claim` must check existence, check for a prior reversal and
//! insert as one unit; two concurrent calls for the same claim must never
//! both succeed. Batch inserts are all-or-nothing per call, except that rows
//! colliding with an existing unique key are skipped rather than failing.

use async_trait::async_trait;
use std::fmt;

use core_kernel::ClaimId;

use crate::claim::Claim;
use crate::error::ClaimError;
use crate::pharmacy::Pharmacy;
use crate::reversal::Reversal;

/// Tables the seed loader fills
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SeedTable {
    Pharmacies,
    Claims,
    Reversals,
}

impl SeedTable {
    pub fn table_name(&self) -> &'static str {
        match self {
            SeedTable::Pharmacies => "pharmacies",
            SeedTable::Claims => "claims",
            SeedTable::Reversals => "reversals",
        }
    }
}

impl fmt::Display for SeedTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.table_name())
    }
}

/// Result of a committed batch insert
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchOutcome {
    /// Positions (into the submitted slice) of rows that were actually inserted
    pub inserted: Vec<usize>,
    /// Rows skipped because their key already existed
    pub duplicates: usize,
}

impl BatchOutcome {
    pub fn inserted_count(&self) -> usize {
        self.inserted.len()
    }
}

/// Persistence gateway for pharmacies, claims and reversals
#[async_trait]
pub trait ClaimsPort: Send + Sync + 'static {
    /// Looks up a pharmacy by NPI
    async fn find_pharmacy(&self, npi: &str) -> Result<Option<Pharmacy>, ClaimError>;

    /// Looks up a claim by id
    async fn find_claim(&self, claim_id: ClaimId) -> Result<Option<Claim>, ClaimError>;

    /// Inserts a single claim
    async fn create_claim(&self, claim: &Claim) -> Result<(), ClaimError>;

    /// Records a reversal atomically
    ///
    /// # Errors
    ///
    /// * `ClaimNotFound` - the claim does not exist
    /// * `AlreadyReversed` - a reversal already references the claim
    async fn reverse_claim(&self, reversal: &Reversal) -> Result<(), ClaimError>;

    /// Inserts pharmacies in one transaction, skipping existing NPIs
    async fn insert_pharmacies(&self, pharmacies: &[Pharmacy]) -> Result<BatchOutcome, ClaimError>;

    /// Inserts claims in one transaction, skipping existing ids
    async fn insert_claims(&self, claims: &[Claim]) -> Result<BatchOutcome, ClaimError>;

    /// Inserts reversals in one transaction, skipping existing ids and already-reversed claims
    async fn insert_reversals(&self, reversals: &[Reversal]) -> Result<BatchOutcome, ClaimError>;

    /// Counts the rows of a seeded table
    async fn count(&self, table: SeedTable) -> Result<u64, ClaimError>;

    /// Verifies the store is reachable
    async fn ping(&self) -> Result<(), ClaimError>;
}

/// Mock implementation of ClaimsPort for testing
///
/// Stores everything in memory behind a single lock, which makes every
/// operation trivially atomic. Foreign keys are honoured the way the
/// database does: a batch referencing a missing parent fails as a whole.
#[cfg(any(test, feature = "mock"))]
pub mod mock {
    use super::*;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicBool, Ordering};
    use tokio::sync::Mutex;

    #[derive(Debug, Default)]
    struct Tables {
        pharmacies: HashMap<String, Pharmacy>,
        claims: HashMap<ClaimId, Claim>,
        // keyed by claim id, mirroring the unique constraint
        reversals: HashMap<ClaimId, Reversal>,
    }

    /// In-memory mock implementation of ClaimsPort
    #[derive(Debug, Default)]
    pub struct MockClaimsPort {
        tables: Mutex<Tables>,
        unavailable: AtomicBool,
    }

    impl MockClaimsPort {
        /// Creates an empty mock port
        pub fn new() -> Self {
            Self::default()
        }

        /// Pre-populates with pharmacies for testing
        pub async fn with_pharmacies(pharmacies: Vec<Pharmacy>) -> Self {
            let port = Self::new();
            {
                let mut tables = port.tables.lock().await;
                for pharmacy in pharmacies {
                    tables.pharmacies.insert(pharmacy.npi.clone(), pharmacy);
                }
            }
            port
        }

        /// Makes every subsequent call fail with a storage error
        pub fn set_unavailable(&self, unavailable: bool) {
            self.unavailable.store(unavailable, Ordering::SeqCst);
        }

        /// Returns every stored claim
        pub async fn claims(&self) -> Vec<Claim> {
            self.tables.lock().await.claims.values().cloned().collect()
        }

        /// Returns every stored reversal
        pub async fn reversals(&self) -> Vec<Reversal> {
            self.tables.lock().await.reversals.values().cloned().collect()
        }

        /// Returns every stored pharmacy
        pub async fn pharmacies(&self) -> Vec<Pharmacy> {
            self.tables.lock().await.pharmacies.values().cloned().collect()
        }

        fn check_available(&self) -> Result<(), ClaimError> {
            if self.unavailable.load(Ordering::SeqCst) {
                return Err(ClaimError::storage("mock store unavailable"));
            }
            Ok(())
        }
    }

    #[async_trait]
    impl ClaimsPort for MockClaimsPort {
        async fn find_pharmacy(&self, npi: &str) -> Result<Option<Pharmacy>, ClaimError> {
            self.check_available()?;
            Ok(self.tables.lock().await.pharmacies.get(npi).cloned())
        }

        async fn find_claim(&self, claim_id: ClaimId) -> Result<Option<Claim>, ClaimError> {
            self.check_available()?;
            Ok(self.tables.lock().await.claims.get(&claim_id).cloned())
        }

        async fn create_claim(&self, claim: &Claim) -> Result<(), ClaimError> {
            self.check_available()?;
            let mut tables = self.tables.lock().await;
            if !tables.pharmacies.contains_key(&claim.npi) {
                return Err(ClaimError::storage(format!(
                    "foreign key violation: pharmacy {} does not exist",
                    claim.npi
                )));
            }
            if tables.claims.contains_key(&claim.id) {
                return Err(ClaimError::storage(format!("duplicate claim id {}", claim.id)));
            }
            tables.claims.insert(claim.id, claim.clone());
            Ok(())
        }

        async fn reverse_claim(&self, reversal: &Reversal) -> Result<(), ClaimError> {
            self.check_available()?;
            let mut tables = self.tables.lock().await;
            if !tables.claims.contains_key(&reversal.claim_id) {
                return Err(ClaimError::ClaimNotFound(reversal.claim_id));
            }
            if tables.reversals.contains_key(&reversal.claim_id) {
                return Err(ClaimError::AlreadyReversed(reversal.claim_id));
            }
            tables.reversals.insert(reversal.claim_id, reversal.clone());
            Ok(())
        }

        async fn insert_pharmacies(&self, pharmacies: &[Pharmacy]) -> Result<BatchOutcome, ClaimError> {
            self.check_available()?;
            let mut tables = self.tables.lock().await;
            let mut outcome = BatchOutcome::default();
            for (index, pharmacy) in pharmacies.iter().enumerate() {
                if tables.pharmacies.contains_key(&pharmacy.npi) {
                    outcome.duplicates += 1;
                } else {
                    tables.pharmacies.insert(pharmacy.npi.clone(), pharmacy.clone());
                    outcome.inserted.push(index);
                }
            }
            Ok(outcome)
        }

        async fn insert_claims(&self, claims: &[Claim]) -> Result<BatchOutcome, ClaimError> {
            self.check_available()?;
            let mut tables = self.tables.lock().await;
            if let Some(orphan) = claims.iter().find(|c| !tables.pharmacies.contains_key(&c.npi)) {
                return Err(ClaimError::storage(format!(
                    "foreign key violation: pharmacy {} does not exist",
                    orphan.npi
                )));
            }
            let mut outcome = BatchOutcome::default();
            for (index, claim) in claims.iter().enumerate() {
                if tables.claims.contains_key(&claim.id) {
                    outcome.duplicates += 1;
                } else {
                    tables.claims.insert(claim.id, claim.clone());
                    outcome.inserted.push(index);
                }
            }
            Ok(outcome)
        }

        async fn insert_reversals(&self, reversals: &[Reversal]) -> Result<BatchOutcome, ClaimError> {
            self.check_available()?;
            let mut tables = self.tables.lock().await;
            if let Some(orphan) = reversals.iter().find(|r| !tables.claims.contains_key(&r.claim_id)) {
                return Err(ClaimError::storage(format!(
                    "foreign key violation: claim {} does not exist",
                    orphan.claim_id.as_uuid()
                )));
            }
            let mut outcome = BatchOutcome::default();
            for (index, reversal) in reversals.iter().enumerate() {
                let id_taken = tables.reversals.values().any(|r| r.id == reversal.id);
                if id_taken || tables.reversals.contains_key(&reversal.claim_id) {
                    outcome.duplicates += 1;
                } else {
                    tables.reversals.insert(reversal.claim_id, reversal.clone());
                    outcome.inserted.push(index);
                }
            }
            Ok(outcome)
        }

        async fn count(&self, table: SeedTable) -> Result<u64, ClaimError> {
            self.check_available()?;
            let tables = self.tables.lock().await;
            let count = match table {
                SeedTable::Pharmacies => tables.pharmacies.len(),
                SeedTable::Claims => tables.claims.len(),
                SeedTable::Reversals => tables.reversals.len(),
            };
            Ok(count as u64)
        }

        async fn ping(&self) -> Result<(), ClaimError> {
            self.check_available()
        }
    }
}
