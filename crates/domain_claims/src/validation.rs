//! Claim validation rules
//!
//! Field-format checks applied to every claim before it reaches storage,
//! whether it arrives over the API or from a seed file.
//!
//! # Validation Rules
//!
//! Checked in this order, stopping at the first failure:
//! - NDC is 9 to 11 ASCII digits
//! - NPI is exactly 10 ASCII digits
//! - Quantity is greater than zero
//! - Price is zero or more

use rust_decimal::Decimal;

use crate::claim::{Claim, ClaimRequest};
use crate::error::{ValidationError, ValidationField};

const NDC_MIN_LEN: usize = 9;
const NDC_MAX_LEN: usize = 11;
const NPI_LEN: usize = 10;

/// Validator for claim fields
///
/// Stateless; one instance is built at startup and shared by the claims
/// service and the seed loader so both apply identical rules.
///
/// # Examples
///
/// ```rust
/// use domain_claims::{ClaimRequest, ClaimValidator};
/// use rust_decimal::Decimal;
///
/// let request = ClaimRequest {
///     ndc: "12345678901".to_string(),
///     quantity: Decimal::from(30),
///     npi: "1234567890".to_string(),
///     price: Decimal::new(2599, 2),
/// };
/// assert!(ClaimValidator::new().validate_request(&request).is_ok());
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct ClaimValidator;

impl ClaimValidator {
    pub fn new() -> Self {
        Self
    }

    /// Validates a submission request, reporting the first failing field
    pub fn validate_request(&self, request: &ClaimRequest) -> Result<(), ValidationError> {
        self.validate_ndc(&request.ndc)?;
        self.validate_npi(&request.npi)?;
        self.validate_quantity(request.quantity)?;
        self.validate_price(request.price)?;
        Ok(())
    }

    /// Validates a fully-formed claim, as read from a seed file
    pub fn validate_claim(&self, claim: &Claim) -> Result<(), ValidationError> {
        if claim.id.is_nil() {
            return Err(ValidationError::new(
                ValidationField::ClaimId,
                "invalid claim id: must not be nil",
            ));
        }
        self.validate_request(&claim.as_request())
    }

    pub fn validate_ndc(&self, ndc: &str) -> Result<(), ValidationError> {
        if ndc.len() < NDC_MIN_LEN || ndc.len() > NDC_MAX_LEN {
            return Err(ValidationError::new(
                ValidationField::Ndc,
                "invalid NDC format: must be 9-11 digits",
            ));
        }
        if !is_all_digits(ndc) {
            return Err(ValidationError::new(
                ValidationField::Ndc,
                "invalid NDC format: must be numeric",
            ));
        }
        Ok(())
    }

    pub fn validate_npi(&self, npi: &str) -> Result<(), ValidationError> {
        if npi.len() != NPI_LEN {
            return Err(ValidationError::new(
                ValidationField::Npi,
                "invalid NPI: must be exactly 10 digits",
            ));
        }
        if !is_all_digits(npi) {
            return Err(ValidationError::new(
                ValidationField::Npi,
                "invalid NPI: must be numeric",
            ));
        }
        Ok(())
    }

    pub fn validate_quantity(&self, quantity: Decimal) -> Result<(), ValidationError> {
        if quantity <= Decimal::ZERO {
            return Err(ValidationError::new(
                ValidationField::Quantity,
                "invalid quantity: must be greater than 0",
            ));
        }
        Ok(())
    }

    pub fn validate_price(&self, price: Decimal) -> Result<(), ValidationError> {
        if price < Decimal::ZERO {
            return Err(ValidationError::new(
                ValidationField::Price,
                "invalid price: must be non-negative",
            ));
        }
        Ok(())
    }
}

fn is_all_digits(value: &str) -> bool {
    !value.is_empty() && value.bytes().all(|b| b.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn valid_request() -> ClaimRequest {
        ClaimRequest {
            ndc: "12345678901".to_string(),
            quantity: dec!(30),
            npi: "1234567890".to_string(),
            price: dec!(25.99),
        }
    }

    #[test]
    fn test_valid_request_passes() {
        assert!(ClaimValidator::new().validate_request(&valid_request()).is_ok());
    }

    #[test]
    fn test_first_failing_field_is_reported() {
        let request = ClaimRequest {
            ndc: "12".to_string(),
            npi: "abc".to_string(),
            quantity: dec!(-1),
            price: dec!(-1),
        };
        let err = ClaimValidator::new().validate_request(&request).unwrap_err();
        assert_eq!(err.field, ValidationField::Ndc);

        let request = ClaimRequest { ndc: "123456789".to_string(), ..request };
        let err = ClaimValidator::new().validate_request(&request).unwrap_err();
        assert_eq!(err.field, ValidationField::Npi);
    }

    #[test]
    fn test_ndc_length_bounds() {
        let validator = ClaimValidator::new();
        assert!(validator.validate_ndc("123456789").is_ok());
        assert!(validator.validate_ndc("12345678901").is_ok());
        assert!(validator.validate_ndc("12345678").is_err());
        assert!(validator.validate_ndc("123456789012").is_err());
    }

    #[test]
    fn test_ndc_must_be_numeric() {
        let err = ClaimValidator::new().validate_ndc("12345-6789").unwrap_err();
        assert_eq!(err.message, "invalid NDC format: must be numeric");
    }

    #[test]
    fn test_signed_npi_is_not_numeric() {
        let err = ClaimValidator::new().validate_npi("+123456789").unwrap_err();
        assert_eq!(err.message, "invalid NPI: must be numeric");
    }

    #[test]
    fn test_quantity_and_price_boundaries() {
        let validator = ClaimValidator::new();
        assert!(validator.validate_quantity(dec!(0)).is_err());
        assert!(validator.validate_quantity(dec!(0.001)).is_ok());
        assert!(validator.validate_price(dec!(0)).is_ok());
        assert!(validator.validate_price(dec!(-0.01)).is_err());
    }
}
