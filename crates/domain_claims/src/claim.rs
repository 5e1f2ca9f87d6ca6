//! Claim aggregate

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use core_kernel::ClaimId;

/// Request to submit a new claim
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClaimRequest {
    /// National Drug Code
    pub ndc: String,
    /// Dispensed quantity
    pub quantity: Decimal,
    /// Dispensing pharmacy
    pub npi: String,
    /// Billed price
    pub price: Decimal,
}

/// A prescription claim
///
/// Claims are never updated or deleted; reversing one records a linked
/// [`Reversal`](crate::Reversal) instead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claim {
    /// Unique identifier
    pub id: ClaimId,
    /// National Drug Code, 9 to 11 digits
    pub ndc: String,
    /// Dispensed quantity
    pub quantity: Decimal,
    /// Dispensing pharmacy
    pub npi: String,
    /// Billed price
    pub price: Decimal,
    /// When the claim was submitted
    #[serde(deserialize_with = "crate::timestamp::deserialize")]
    pub timestamp: DateTime<Utc>,
}

impl Claim {
    /// Creates a claim from an accepted request, assigning id and timestamp
    pub fn submit(request: ClaimRequest) -> Self {
        Self {
            id: ClaimId::new(),
            ndc: request.ndc,
            quantity: request.quantity,
            npi: request.npi,
            price: request.price,
            timestamp: crate::timestamp::now(),
        }
    }

    /// Returns the submission fields, for re-validating seed records
    pub fn as_request(&self) -> ClaimRequest {
        ClaimRequest {
            ndc: self.ndc.clone(),
            quantity: self.quantity,
            npi: self.npi.clone(),
            price: self.price,
        }
    }
}

/// Result of a successful submission
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimReceipt {
    pub status: String,
    pub claim_id: ClaimId,
}

impl ClaimReceipt {
    pub const SUBMITTED: &'static str = "claim submitted";

    pub fn submitted(claim_id: ClaimId) -> Self {
        Self {
            status: Self::SUBMITTED.to_string(),
            claim_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_submit_copies_request_fields() {
        let request = ClaimRequest {
            ndc: "12345678901".to_string(),
            quantity: dec!(30),
            npi: "1234567890".to_string(),
            price: dec!(25.99),
        };

        let before = crate::timestamp::now();
        let claim = Claim::submit(request.clone());

        assert_eq!(claim.as_request(), request);
        assert!(!claim.id.is_nil());
        assert!(claim.timestamp >= before);
        assert_eq!(claim.timestamp.timestamp_subsec_nanos() % 1_000, 0);
    }

    #[test]
    fn test_seed_claim_deserializes_naive_timestamp() {
        let json = r#"{
            "id": "3b5a4c1e-0f7e-4d0a-9c55-1f1b8d1a2b3c",
            "ndc": "00002323401",
            "npi": "0000000000",
            "quantity": 60.0,
            "price": 379.26,
            "timestamp": "2024-03-27T21:05:41"
        }"#;

        let claim: Claim = serde_json::from_str(json).unwrap();
        assert_eq!(claim.ndc, "00002323401");
        assert_eq!(claim.quantity, dec!(60));
        assert_eq!(claim.price, dec!(379.26));
    }
}
