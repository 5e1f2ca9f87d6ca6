//! Pre-built Test Fixtures
//!
//! Provides ready-to-use test data for pharmacies, claims and reversals.
//! These fixtures are designed to be consistent and predictable for unit tests.

use chrono::{DateTime, TimeZone, Utc};
use rust_decimal_macros::dec;
use uuid::Uuid;

use core_kernel::ClaimId;
use domain_claims::{Claim, ClaimRequest, Pharmacy, PharmacyChain, Reversal, ReversalRequest};

/// Fixture for pharmacy test data
pub struct PharmacyFixtures;

impl PharmacyFixtures {
    /// NPI of the standard "health" chain pharmacy
    pub const HEALTH_NPI: &'static str = "1234567890";
    /// NPI of the standard "saint" chain pharmacy
    pub const SAINT_NPI: &'static str = "2345678901";
    /// NPI of the standard "doctor" chain pharmacy
    pub const DOCTOR_NPI: &'static str = "3456789012";
    /// Well-formed NPI that no fixture pharmacy uses
    pub const UNKNOWN_NPI: &'static str = "9999999999";

    pub fn health() -> Pharmacy {
        Pharmacy::new(Self::HEALTH_NPI, PharmacyChain::Health)
    }

    pub fn saint() -> Pharmacy {
        Pharmacy::new(Self::SAINT_NPI, PharmacyChain::Saint)
    }

    pub fn doctor() -> Pharmacy {
        Pharmacy::new(Self::DOCTOR_NPI, PharmacyChain::Doctor)
    }

    /// One pharmacy per chain
    pub fn all() -> Vec<Pharmacy> {
        vec![Self::health(), Self::saint(), Self::doctor()]
    }
}

/// Fixture for temporal test data
pub struct TemporalFixtures;

impl TemporalFixtures {
    /// Fixed submission time (Jan 15, 2024 10:30:00 UTC)
    pub fn submitted_at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 15, 10, 30, 0).unwrap()
    }

    /// Fixed reversal time (Jan 16, 2024 09:00:00 UTC)
    pub fn reversed_at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 16, 9, 0, 0).unwrap()
    }
}

/// Fixture for claim test data
pub struct ClaimFixtures;

impl ClaimFixtures {
    /// The canonical valid submission against the health pharmacy
    pub fn request() -> ClaimRequest {
        ClaimRequest {
            ndc: "12345678901".to_string(),
            quantity: dec!(30),
            npi: PharmacyFixtures::HEALTH_NPI.to_string(),
            price: dec!(25.99),
        }
    }

    /// A valid submission against an NPI with no pharmacy
    pub fn request_for_unknown_pharmacy() -> ClaimRequest {
        ClaimRequest {
            npi: PharmacyFixtures::UNKNOWN_NPI.to_string(),
            ..Self::request()
        }
    }

    /// A stored claim with a fixed timestamp for the given pharmacy
    pub fn claim_for(npi: &str) -> Claim {
        Claim {
            id: ClaimId::new(),
            ndc: "00002143380".to_string(),
            quantity: dec!(2.5),
            npi: npi.to_string(),
            price: dec!(12.40),
            timestamp: TemporalFixtures::submitted_at(),
        }
    }

    /// A stored claim against the health pharmacy
    pub fn claim() -> Claim {
        Self::claim_for(PharmacyFixtures::HEALTH_NPI)
    }
}

/// Fixture for reversal test data
pub struct ReversalFixtures;

impl ReversalFixtures {
    /// A reversal request with no reason
    pub fn request(claim_id: ClaimId) -> ReversalRequest {
        ReversalRequest {
            claim_id,
            reason: None,
        }
    }

    /// A stored reversal with a fixed timestamp
    pub fn reversal_for(claim_id: ClaimId) -> Reversal {
        Reversal {
            timestamp: TemporalFixtures::reversed_at(),
            ..Reversal::new(claim_id, Some("dispensing error".to_string()))
        }
    }

    /// The nil claim id, never a valid reversal target
    pub fn nil_claim_id() -> ClaimId {
        ClaimId::from_uuid(Uuid::nil())
    }
}
