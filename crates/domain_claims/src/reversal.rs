//! Claim reversals

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{ClaimId, ReversalId};

/// Request to reverse a previously submitted claim
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReversalRequest {
    pub claim_id: ClaimId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// A reversal of exactly one claim
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reversal {
    /// Unique identifier
    pub id: ReversalId,
    /// The reversed claim
    pub claim_id: ClaimId,
    /// Free-text reason given by the caller
    #[serde(default)]
    pub reason: Option<String>,
    /// When the reversal was recorded
    #[serde(deserialize_with = "crate::timestamp::deserialize")]
    pub timestamp: DateTime<Utc>,
}

impl Reversal {
    /// Creates a reversal for the claim, stamped now
    pub fn new(claim_id: ClaimId, reason: Option<String>) -> Self {
        Self {
            id: ReversalId::new(),
            claim_id,
            reason: reason.filter(|r| !r.trim().is_empty()),
            timestamp: crate::timestamp::now(),
        }
    }
}

/// Result of a successful reversal
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReversalReceipt {
    pub status: String,
    pub claim_id: ClaimId,
    pub reversal_id: ReversalId,
}

impl ReversalReceipt {
    pub const REVERSED: &'static str = "claim reversed";

    pub fn reversed(reversal: &Reversal) -> Self {
        Self {
            status: Self::REVERSED.to_string(),
            claim_id: reversal.claim_id,
            reversal_id: reversal.id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_reason_is_dropped() {
        let reversal = Reversal::new(ClaimId::new(), Some("   ".to_string()));
        assert_eq!(reversal.reason, None);

        let reversal = Reversal::new(ClaimId::new(), Some("patient returned".to_string()));
        assert_eq!(reversal.reason.as_deref(), Some("patient returned"));
    }

    #[test]
    fn test_new_reversal_is_stamped_in_micros() {
        let reversal = Reversal::new(ClaimId::new(), None);
        assert_eq!(reversal.timestamp.timestamp_subsec_nanos() % 1_000, 0);
    }

    #[test]
    fn test_request_reason_is_optional() {
        let json = r#"{"claim_id": "3b5a4c1e-0f7e-4d0a-9c55-1f1b8d1a2b3c"}"#;
        let request: ReversalRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.reason, None);
    }
}
