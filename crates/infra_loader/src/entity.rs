//! Seedable entity types
//!
//! Ties each domain type to its table, its batch insert on the port and the
//! audit event emitted per inserted row.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};

use core_kernel::AuditEventKind;
use domain_claims::{
    BatchOutcome, Claim, ClaimError, ClaimValidator, ClaimsPort, Pharmacy, Reversal, SeedTable,
    ValidationError, ValidationField,
};

/// A record type the loader can insert in batches
#[async_trait]
pub trait SeedEntity: Send + Sync + Sized + 'static {
    /// Table the records land in
    const TABLE: SeedTable;
    /// Audit event emitted for each inserted record
    const AUDIT_KIND: AuditEventKind;

    /// Inserts one batch through the port
    async fn insert_batch(port: &dyn ClaimsPort, batch: &[Self]) -> Result<BatchOutcome, ClaimError>;

    /// Audit payload describing the inserted record
    fn audit_payload(&self) -> Value;
}

/// A record type seeded from JSON array files
pub trait JsonSeed: SeedEntity + DeserializeOwned {
    /// Subdirectory of the data directory holding the files
    const SUBDIR: &'static str;
    /// File name pattern within the subdirectory
    const PATTERN: &'static str = "*.json";

    /// Rejects records that must not be inserted
    fn check(&self, validator: &ClaimValidator) -> Result<(), ValidationError>;
}

#[async_trait]
impl SeedEntity for Pharmacy {
    const TABLE: SeedTable = SeedTable::Pharmacies;
    const AUDIT_KIND: AuditEventKind = AuditEventKind::PharmacyLoaded;

    async fn insert_batch(port: &dyn ClaimsPort, batch: &[Self]) -> Result<BatchOutcome, ClaimError> {
        port.insert_pharmacies(batch).await
    }

    fn audit_payload(&self) -> Value {
        json!({
            "npi": self.npi,
            "chain": self.chain,
        })
    }
}

#[async_trait]
impl SeedEntity for Claim {
    const TABLE: SeedTable = SeedTable::Claims;
    const AUDIT_KIND: AuditEventKind = AuditEventKind::ClaimLoaded;

    async fn insert_batch(port: &dyn ClaimsPort, batch: &[Self]) -> Result<BatchOutcome, ClaimError> {
        port.insert_claims(batch).await
    }

    fn audit_payload(&self) -> Value {
        json!({
            "claim_id": self.id,
            "ndc": self.ndc,
            "npi": self.npi,
            "quantity": self.quantity,
            "price": self.price,
            "timestamp": self.timestamp,
        })
    }
}

impl JsonSeed for Claim {
    const SUBDIR: &'static str = "claims";

    fn check(&self, validator: &ClaimValidator) -> Result<(), ValidationError> {
        validator.validate_claim(self)
    }
}

#[async_trait]
impl SeedEntity for Reversal {
    const TABLE: SeedTable = SeedTable::Reversals;
    const AUDIT_KIND: AuditEventKind = AuditEventKind::ReversalLoaded;

    async fn insert_batch(port: &dyn ClaimsPort, batch: &[Self]) -> Result<BatchOutcome, ClaimError> {
        port.insert_reversals(batch).await
    }

    fn audit_payload(&self) -> Value {
        json!({
            "reversal_id": self.id,
            "claim_id": self.claim_id,
            "reason": self.reason,
            "timestamp": self.timestamp,
        })
    }
}

impl JsonSeed for Reversal {
    const SUBDIR: &'static str = "reverts";

    fn check(&self, _validator: &ClaimValidator) -> Result<(), ValidationError> {
        if self.id.is_nil() || self.claim_id.is_nil() {
            return Err(ValidationError::new(
                ValidationField::ClaimId,
                "reversal id and claim_id must be valid UUIDs",
            ));
        }
        Ok(())
    }
}
