//! Pharmacy reference data

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{ValidationError, ValidationField};

/// Pharmacy chains the network contracts with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PharmacyChain {
    Health,
    Saint,
    Doctor,
}

impl PharmacyChain {
    pub const ALL: [PharmacyChain; 3] = [PharmacyChain::Health, PharmacyChain::Saint, PharmacyChain::Doctor];

    pub fn as_str(&self) -> &'static str {
        match self {
            PharmacyChain::Health => "health",
            PharmacyChain::Saint => "saint",
            PharmacyChain::Doctor => "doctor",
        }
    }
}

impl fmt::Display for PharmacyChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PharmacyChain {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        PharmacyChain::ALL
            .into_iter()
            .find(|chain| chain.as_str() == normalized)
            .ok_or_else(|| {
                ValidationError::new(
                    ValidationField::Chain,
                    format!("invalid chain '{}': must be one of health, saint, doctor", s.trim()),
                )
            })
    }
}

/// A pharmacy, identified by its NPI
///
/// Pharmacies are only created by the seed loader and never change afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pharmacy {
    /// National Provider Identifier, 10 digits
    pub npi: String,
    /// Owning chain
    pub chain: PharmacyChain,
}

impl Pharmacy {
    pub fn new(npi: impl Into<String>, chain: PharmacyChain) -> Self {
        Self {
            npi: npi.into(),
            chain,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chain_parsing_is_lenient_about_case_and_spaces() {
        assert_eq!(" Health ".parse::<PharmacyChain>().unwrap(), PharmacyChain::Health);
        assert_eq!("SAINT".parse::<PharmacyChain>().unwrap(), PharmacyChain::Saint);
        assert_eq!("doctor".parse::<PharmacyChain>().unwrap(), PharmacyChain::Doctor);
    }

    #[test]
    fn test_unknown_chain_is_rejected() {
        let err = "walgreens".parse::<PharmacyChain>().unwrap_err();
        assert_eq!(err.field, ValidationField::Chain);
        assert!(err.message.contains("walgreens"));
    }
}
