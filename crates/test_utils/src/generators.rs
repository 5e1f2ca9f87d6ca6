//! Property-Based Test Generators
//!
//! Provides proptest strategies for generating random test data
//! that either maintains or deliberately breaks the claim field rules.

use proptest::prelude::*;
use rust_decimal::Decimal;

use domain_claims::{ClaimRequest, PharmacyChain};

/// Strategy for drug codes of 9 to 11 digits
pub fn valid_ndc_strategy() -> impl Strategy<Value = String> {
    "[0-9]{9,11}"
}

/// Strategy for drug codes that break the length or digit rule
pub fn invalid_ndc_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        "[0-9]{0,8}",
        "[0-9]{12,16}",
        "[0-9]{3}[A-Za-z -][0-9]{5,7}",
    ]
}

/// Strategy for 10-digit provider identifiers
pub fn valid_npi_strategy() -> impl Strategy<Value = String> {
    "[0-9]{10}"
}

/// Strategy for provider identifiers that break the length or digit rule
pub fn invalid_npi_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        "[0-9]{0,9}",
        "[0-9]{11,15}",
        "[0-9]{4}[A-Za-z.-][0-9]{5}",
    ]
}

/// Strategy for generating positive Decimal values
pub fn positive_decimal_strategy() -> impl Strategy<Value = Decimal> {
    (1i64..1_000_000_000i64, 0u32..4u32).prop_map(|(m, s)| Decimal::new(m, s))
}

/// Strategy for generating zero or positive Decimal values
pub fn non_negative_decimal_strategy() -> impl Strategy<Value = Decimal> {
    (0i64..1_000_000_000i64, 0u32..4u32).prop_map(|(m, s)| Decimal::new(m, s))
}

/// Strategy for generating strictly negative Decimal values
pub fn negative_decimal_strategy() -> impl Strategy<Value = Decimal> {
    positive_decimal_strategy().prop_map(|d| -d)
}

/// Strategy for pharmacy chains
pub fn chain_strategy() -> impl Strategy<Value = PharmacyChain> {
    prop_oneof![
        Just(PharmacyChain::Health),
        Just(PharmacyChain::Saint),
        Just(PharmacyChain::Doctor),
    ]
}

/// Strategy for well-formed claim requests against the given NPI
pub fn valid_claim_request_strategy(npi: &'static str) -> impl Strategy<Value = ClaimRequest> {
    (
        valid_ndc_strategy(),
        positive_decimal_strategy(),
        non_negative_decimal_strategy(),
    )
        .prop_map(move |(ndc, quantity, price)| ClaimRequest {
            ndc,
            quantity,
            npi: npi.to_string(),
            price,
        })
}
