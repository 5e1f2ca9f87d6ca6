//! Claims application service
//!
//! Orchestrates the submit and reverse workflows:
//! validate, check the referenced entity exists, persist, then audit.

use serde_json::json;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use core_kernel::{AuditEvent, AuditEventKind, AuditSink, ClaimId};

use crate::claim::{Claim, ClaimReceipt, ClaimRequest};
use crate::error::{ClaimError, ValidationError, ValidationField};
use crate::ports::ClaimsPort;
use crate::reversal::{Reversal, ReversalReceipt, ReversalRequest};
use crate::validation::ClaimValidator;

/// Service for claim submission and reversal
///
/// Built once at startup and shared behind an `Arc`; it holds no mutable
/// state of its own.
pub struct ClaimsService {
    port: Arc<dyn ClaimsPort>,
    audit: Arc<dyn AuditSink>,
    validator: ClaimValidator,
}

impl ClaimsService {
    /// Creates a new service
    ///
    /// # Arguments
    ///
    /// * `port` - Persistence gateway
    /// * `audit` - Audit trail destination
    /// * `validator` - Field-format rules
    pub fn new(port: Arc<dyn ClaimsPort>, audit: Arc<dyn AuditSink>, validator: ClaimValidator) -> Self {
        Self { port, audit, validator }
    }

    /// Submits a new claim
    ///
    /// # Errors
    ///
    /// * `Validation` - a field is malformed; nothing is persisted
    /// * `PharmacyNotFound` - no pharmacy has the given NPI; nothing is persisted
    /// * `Storage` - the store failed
    #[instrument(skip(self, request), fields(npi = %request.npi, ndc = %request.ndc))]
    pub async fn submit_claim(&self, request: ClaimRequest) -> Result<ClaimReceipt, ClaimError> {
        self.validator.validate_request(&request)?;

        let pharmacy = self
            .port
            .find_pharmacy(&request.npi)
            .await?
            .ok_or_else(|| ClaimError::PharmacyNotFound(request.npi.clone()))?;

        let claim = Claim::submit(request);
        self.port.create_claim(&claim).await?;

        info!(claim_id = %claim.id.as_uuid(), chain = %pharmacy.chain, "Claim submitted");

        self.audit.record(AuditEvent::new(
            AuditEventKind::ClaimSubmitted,
            json!({
                "claim_id": claim.id,
                "ndc": claim.ndc,
                "quantity": claim.quantity,
                "npi": claim.npi,
                "price": claim.price,
                "chain": pharmacy.chain,
            }),
        ));

        Ok(ClaimReceipt::submitted(claim.id))
    }

    /// Reverses a previously submitted claim
    ///
    /// # Errors
    ///
    /// * `Validation` - the claim id is nil
    /// * `ClaimNotFound` - no claim has the given id
    /// * `AlreadyReversed` - the claim already has a reversal
    /// * `Storage` - the store failed
    #[instrument(skip(self, request), fields(claim_id = %request.claim_id.as_uuid()))]
    pub async fn reverse_claim(&self, request: ReversalRequest) -> Result<ReversalReceipt, ClaimError> {
        if request.claim_id.is_nil() {
            return Err(ValidationError::new(
                ValidationField::ClaimId,
                "claim_id must be a valid UUID",
            )
            .into());
        }

        let claim = self
            .port
            .find_claim(request.claim_id)
            .await?
            .ok_or(ClaimError::ClaimNotFound(request.claim_id))?;

        let reversal = Reversal::new(claim.id, request.reason);
        self.port.reverse_claim(&reversal).await?;

        info!(reversal_id = %reversal.id.as_uuid(), "Claim reversed");

        let mut payload = json!({
            "claim_id": claim.id,
            "reversal_id": reversal.id,
            "original_ndc": claim.ndc,
            "original_quantity": claim.quantity,
            "original_npi": claim.npi,
            "original_price": claim.price,
            "reason": reversal.reason,
        });

        match self.port.find_pharmacy(&claim.npi).await {
            Ok(Some(pharmacy)) => {
                payload["chain"] = json!(pharmacy.chain);
            }
            Ok(None) => debug!(npi = %claim.npi, "Pharmacy missing for reversed claim"),
            Err(e) => warn!(error = %e, npi = %claim.npi, "Failed to resolve pharmacy for audit"),
        }

        self.audit.record(AuditEvent::new(AuditEventKind::ClaimReversed, payload));

        Ok(ReversalReceipt::reversed(&reversal))
    }

    /// Gets a claim by id
    pub async fn get_claim(&self, claim_id: ClaimId) -> Result<Claim, ClaimError> {
        self.port
            .find_claim(claim_id)
            .await?
            .ok_or(ClaimError::ClaimNotFound(claim_id))
    }

    /// Checks the store is reachable
    pub async fn ping(&self) -> Result<(), ClaimError> {
        self.port.ping().await
    }
}
