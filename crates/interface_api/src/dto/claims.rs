//! Claims DTOs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use domain_claims::{Claim, ClaimReceipt, ClaimRequest, ReversalReceipt, ReversalRequest};

#[derive(Debug, Deserialize)]
pub struct SubmitClaimRequest {
    pub ndc: String,
    pub quantity: Decimal,
    pub npi: String,
    pub price: Decimal,
}

impl From<SubmitClaimRequest> for ClaimRequest {
    fn from(request: SubmitClaimRequest) -> Self {
        ClaimRequest {
            ndc: request.ndc,
            quantity: request.quantity,
            npi: request.npi,
            price: request.price,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SubmitClaimResponse {
    pub status: String,
    pub claim_id: Uuid,
}

impl From<ClaimReceipt> for SubmitClaimResponse {
    fn from(receipt: ClaimReceipt) -> Self {
        Self {
            status: receipt.status,
            claim_id: *receipt.claim_id.as_uuid(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ReverseClaimRequest {
    pub claim_id: Uuid,
    #[serde(default)]
    pub reason: Option<String>,
}

impl From<ReverseClaimRequest> for ReversalRequest {
    fn from(request: ReverseClaimRequest) -> Self {
        ReversalRequest {
            claim_id: core_kernel::ClaimId::from_uuid(request.claim_id),
            reason: request.reason,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ReverseClaimResponse {
    pub status: String,
    pub claim_id: Uuid,
    pub reversal_id: Uuid,
}

impl From<ReversalReceipt> for ReverseClaimResponse {
    fn from(receipt: ReversalReceipt) -> Self {
        Self {
            status: receipt.status,
            claim_id: *receipt.claim_id.as_uuid(),
            reversal_id: *receipt.reversal_id.as_uuid(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ClaimResponse {
    pub id: Uuid,
    pub ndc: String,
    pub npi: String,
    pub quantity: Decimal,
    pub price: Decimal,
    pub timestamp: DateTime<Utc>,
}

impl From<Claim> for ClaimResponse {
    fn from(claim: Claim) -> Self {
        Self {
            id: *claim.id.as_uuid(),
            ndc: claim.ndc,
            npi: claim.npi,
            quantity: claim.quantity,
            price: claim.price,
            timestamp: claim.timestamp,
        }
    }
}
