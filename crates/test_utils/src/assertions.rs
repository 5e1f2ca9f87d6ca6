//! Custom Test Assertions
//!
//! Provides specialized assertion helpers for claim types that give
//! more meaningful error messages than standard assertions.

use domain_claims::{Claim, ClaimError, ClaimErrorKind, ValidationField};

/// Asserts that two claims carry the same business fields
///
/// The server-assigned id and timestamp are ignored.
///
/// # Panics
///
/// Panics naming the first field that differs
pub fn assert_same_claim_fields(actual: &Claim, expected: &Claim) {
    assert_eq!(actual.ndc, expected.ndc, "NDC mismatch");
    assert_eq!(actual.npi, expected.npi, "NPI mismatch");
    assert_eq!(
        actual.quantity.normalize(),
        expected.quantity.normalize(),
        "Quantity mismatch: actual={}, expected={}",
        actual.quantity,
        expected.quantity
    );
    assert_eq!(
        actual.price.normalize(),
        expected.price.normalize(),
        "Price mismatch: actual={}, expected={}",
        actual.price,
        expected.price
    );
}

/// Asserts that an error is a validation failure on the given field
pub fn assert_validation_error(error: &ClaimError, field: ValidationField) {
    match error {
        ClaimError::Validation(v) => assert_eq!(
            v.field, field,
            "Expected validation failure on {}, got one on {}: {}",
            field.as_str(),
            v.field.as_str(),
            v.message
        ),
        other => panic!("Expected validation error on {}, got: {}", field.as_str(), other),
    }
}

/// Asserts that a result failed with the given error kind
pub fn assert_error_kind<T: std::fmt::Debug>(result: &Result<T, ClaimError>, kind: ClaimErrorKind) {
    match result {
        Err(e) => assert_eq!(e.kind(), kind, "Expected {:?} error, got: {}", kind, e),
        Ok(value) => panic!("Expected {:?} error, got Ok({:?})", kind, value),
    }
}
