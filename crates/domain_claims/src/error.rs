//! Claims domain errors

use core_kernel::ClaimId;
use std::fmt;
use thiserror::Error;

/// Field that failed validation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationField {
    Ndc,
    Npi,
    Quantity,
    Price,
    Chain,
    ClaimId,
}

impl ValidationField {
    pub fn as_str(&self) -> &'static str {
        match self {
            ValidationField::Ndc => "ndc",
            ValidationField::Npi => "npi",
            ValidationField::Quantity => "quantity",
            ValidationField::Price => "price",
            ValidationField::Chain => "chain",
            ValidationField::ClaimId => "claim_id",
        }
    }
}

impl fmt::Display for ValidationField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A field-format rule was broken
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ValidationError {
    /// The first field that failed
    pub field: ValidationField,
    /// Stable, human-readable description
    pub message: String,
}

impl ValidationError {
    pub fn new(field: ValidationField, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Errors that can occur in the claims domain
#[derive(Debug, Error)]
pub enum ClaimError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("pharmacy with NPI {0} not found")]
    PharmacyNotFound(String),

    #[error("claim with ID {} not found", .0.as_uuid())]
    ClaimNotFound(ClaimId),

    #[error("claim {} is already reversed", .0.as_uuid())]
    AlreadyReversed(ClaimId),

    #[error("storage error: {0}")]
    Storage(String),
}

/// Coarse classification used by the boundary layer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClaimErrorKind {
    Validation,
    NotFound,
    Conflict,
    Storage,
}

impl ClaimError {
    pub fn storage(message: impl Into<String>) -> Self {
        ClaimError::Storage(message.into())
    }

    pub fn kind(&self) -> ClaimErrorKind {
        match self {
            ClaimError::Validation(_) => ClaimErrorKind::Validation,
            ClaimError::PharmacyNotFound(_) | ClaimError::ClaimNotFound(_) => ClaimErrorKind::NotFound,
            ClaimError::AlreadyReversed(_) => ClaimErrorKind::Conflict,
            ClaimError::Storage(_) => ClaimErrorKind::Storage,
        }
    }
}
