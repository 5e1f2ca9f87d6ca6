//! PostgreSQL Claims Adapter
//!
//! This module provides the internal (database) adapter for the claims
//! domain, implementing the `ClaimsPort` trait using PostgreSQL via the
//! `ClaimsRepository`.
//!
//! # Overview
//!
//! The `PostgresClaimsAdapter` serves as the bridge between the domain
//! layer's port interface and the database layer. It converts domain
//! models to insert types, converts row types back to domain models and
//! translates database errors into domain errors.
//!
//! # Example
//!
//! ```rust,ignore
//! use infra_db::PostgresClaimsAdapter;
//! use domain_claims::ClaimsPort;
//! use std::sync::Arc;
//!
//! let port: Arc<dyn ClaimsPort> = Arc::new(PostgresClaimsAdapter::new(pool));
//! let pharmacy = port.find_pharmacy("1234567890").await?;
//! ```

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::{debug, instrument};

use core_kernel::{ClaimId, ReversalId};
use domain_claims::{
    BatchOutcome, Claim, ClaimError, ClaimsPort, Pharmacy, PharmacyChain, Reversal, SeedTable,
};

use crate::error::DatabaseError;
use crate::repositories::claims::{
    ClaimRow, ClaimsRepository, NewClaim, NewPharmacy, NewReversal, PharmacyChain as DbPharmacyChain,
    PharmacyRow, ReversalRow,
};

/// PostgreSQL-backed implementation of the ClaimsPort trait
///
/// # Error Handling
///
/// Database errors are translated to `ClaimError` variants:
/// - `DatabaseError::NotFound` on reversal -> `ClaimError::ClaimNotFound`
/// - `DatabaseError::DuplicateEntry` on reversal -> `ClaimError::AlreadyReversed`
/// - Other errors -> `ClaimError::Storage`
#[derive(Debug, Clone)]
pub struct PostgresClaimsAdapter {
    repository: ClaimsRepository,
}

impl PostgresClaimsAdapter {
    /// Creates a new PostgreSQL claims adapter
    ///
    /// # Arguments
    ///
    /// * `pool` - The PostgreSQL connection pool
    pub fn new(pool: PgPool) -> Self {
        Self {
            repository: ClaimsRepository::new(pool),
        }
    }

    /// Looks up the reversal recorded for a claim
    pub async fn find_reversal(&self, claim_id: ClaimId) -> Result<Option<Reversal>, ClaimError> {
        let row = self.repository.find_reversal_by_claim(*claim_id.as_uuid()).await?;
        Ok(row.map(row_to_reversal))
    }
}

// ============================================================================
// Conversions
// ============================================================================

fn chain_to_db(chain: PharmacyChain) -> DbPharmacyChain {
    match chain {
        PharmacyChain::Health => DbPharmacyChain::Health,
        PharmacyChain::Saint => DbPharmacyChain::Saint,
        PharmacyChain::Doctor => DbPharmacyChain::Doctor,
    }
}

fn chain_from_db(chain: DbPharmacyChain) -> PharmacyChain {
    match chain {
        DbPharmacyChain::Health => PharmacyChain::Health,
        DbPharmacyChain::Saint => PharmacyChain::Saint,
        DbPharmacyChain::Doctor => PharmacyChain::Doctor,
    }
}

fn row_to_pharmacy(row: PharmacyRow) -> Pharmacy {
    Pharmacy::new(row.npi, chain_from_db(row.chain))
}

fn row_to_claim(row: ClaimRow) -> Claim {
    Claim {
        id: ClaimId::from_uuid(row.id),
        ndc: row.ndc,
        quantity: row.quantity,
        npi: row.npi,
        price: row.price,
        timestamp: row.timestamp,
    }
}

fn row_to_reversal(row: ReversalRow) -> Reversal {
    Reversal {
        id: ReversalId::from_uuid(row.id),
        claim_id: ClaimId::from_uuid(row.claim_id),
        reason: row.reason,
        timestamp: row.timestamp,
    }
}

fn new_pharmacy(pharmacy: &Pharmacy) -> NewPharmacy {
    NewPharmacy {
        npi: pharmacy.npi.clone(),
        chain: chain_to_db(pharmacy.chain),
    }
}

fn new_claim(claim: &Claim) -> NewClaim {
    NewClaim {
        id: *claim.id.as_uuid(),
        ndc: claim.ndc.clone(),
        npi: claim.npi.clone(),
        quantity: claim.quantity,
        price: claim.price,
        timestamp: claim.timestamp,
    }
}

fn new_reversal(reversal: &Reversal) -> NewReversal {
    NewReversal {
        id: *reversal.id.as_uuid(),
        claim_id: *reversal.claim_id.as_uuid(),
        reason: reversal.reason.clone(),
        timestamp: reversal.timestamp,
    }
}

fn batch_outcome(submitted: usize, inserted: Vec<usize>) -> BatchOutcome {
    BatchOutcome {
        duplicates: submitted - inserted.len(),
        inserted,
    }
}

#[async_trait]
impl ClaimsPort for PostgresClaimsAdapter {
    #[instrument(skip(self))]
    async fn find_pharmacy(&self, npi: &str) -> Result<Option<Pharmacy>, ClaimError> {
        let row = self.repository.find_pharmacy_by_npi(npi).await?;
        Ok(row.map(row_to_pharmacy))
    }

    #[instrument(skip(self), fields(claim_id = %claim_id.as_uuid()))]
    async fn find_claim(&self, claim_id: ClaimId) -> Result<Option<Claim>, ClaimError> {
        let row = self.repository.find_claim(*claim_id.as_uuid()).await?;
        Ok(row.map(row_to_claim))
    }

    #[instrument(skip(self, claim), fields(claim_id = %claim.id.as_uuid()))]
    async fn create_claim(&self, claim: &Claim) -> Result<(), ClaimError> {
        self.repository.insert_claim(&new_claim(claim)).await?;
        debug!("Claim row inserted");
        Ok(())
    }

    #[instrument(skip(self, reversal), fields(claim_id = %reversal.claim_id.as_uuid()))]
    async fn reverse_claim(&self, reversal: &Reversal) -> Result<(), ClaimError> {
        match self.repository.reverse_claim(&new_reversal(reversal)).await {
            Ok(row) => {
                debug!(reversal_id = %row.id, "Reversal row inserted");
                Ok(())
            }
            Err(DatabaseError::NotFound(_)) => Err(ClaimError::ClaimNotFound(reversal.claim_id)),
            Err(DatabaseError::DuplicateEntry(_)) => Err(ClaimError::AlreadyReversed(reversal.claim_id)),
            Err(e) => Err(e.into()),
        }
    }

    #[instrument(skip(self, pharmacies), fields(rows = pharmacies.len()))]
    async fn insert_pharmacies(&self, pharmacies: &[Pharmacy]) -> Result<BatchOutcome, ClaimError> {
        let rows: Vec<NewPharmacy> = pharmacies.iter().map(new_pharmacy).collect();
        let inserted = self.repository.insert_pharmacies(&rows).await?;
        Ok(batch_outcome(rows.len(), inserted))
    }

    #[instrument(skip(self, claims), fields(rows = claims.len()))]
    async fn insert_claims(&self, claims: &[Claim]) -> Result<BatchOutcome, ClaimError> {
        let rows: Vec<NewClaim> = claims.iter().map(new_claim).collect();
        let inserted = self.repository.insert_claims(&rows).await?;
        Ok(batch_outcome(rows.len(), inserted))
    }

    #[instrument(skip(self, reversals), fields(rows = reversals.len()))]
    async fn insert_reversals(&self, reversals: &[Reversal]) -> Result<BatchOutcome, ClaimError> {
        let rows: Vec<NewReversal> = reversals.iter().map(new_reversal).collect();
        let inserted = self.repository.insert_reversals(&rows).await?;
        Ok(batch_outcome(rows.len(), inserted))
    }

    async fn count(&self, table: SeedTable) -> Result<u64, ClaimError> {
        let count = self.repository.count(table.table_name()).await?;
        Ok(count.max(0) as u64)
    }

    async fn ping(&self) -> Result<(), ClaimError> {
        self.repository.ping().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chain_conversion_covers_every_chain() {
        for chain in PharmacyChain::ALL {
            assert_eq!(chain_from_db(chain_to_db(chain)), chain);
        }
    }

    #[test]
    fn test_batch_outcome_counts_skipped_rows() {
        let outcome = batch_outcome(5, vec![0, 3]);
        assert_eq!(outcome.inserted_count(), 2);
        assert_eq!(outcome.duplicates, 3);
    }
}
