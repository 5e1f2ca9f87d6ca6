//! Test Data Builders
//!
//! Provides builder patterns for constructing test data with sensible defaults.
//! These builders allow tests to specify only the relevant fields while using
//! defaults for everything else.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde_json::{json, Value};
use tempfile::TempDir;

use core_kernel::ClaimId;
use domain_claims::{Claim, Pharmacy, Reversal};

use crate::fixtures::{ClaimFixtures, PharmacyFixtures, TemporalFixtures};

/// Builder for constructing test claims
pub struct TestClaimBuilder {
    id: ClaimId,
    ndc: String,
    quantity: Decimal,
    npi: String,
    price: Decimal,
    timestamp: DateTime<Utc>,
}

impl Default for TestClaimBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TestClaimBuilder {
    /// Creates a new builder with default values
    pub fn new() -> Self {
        let request = ClaimFixtures::request();
        Self {
            id: ClaimId::new(),
            ndc: request.ndc,
            quantity: request.quantity,
            npi: request.npi,
            price: request.price,
            timestamp: TemporalFixtures::submitted_at(),
        }
    }

    /// Sets the claim ID
    pub fn with_id(mut self, id: ClaimId) -> Self {
        self.id = id;
        self
    }

    /// Sets the drug code
    pub fn with_ndc(mut self, ndc: impl Into<String>) -> Self {
        self.ndc = ndc.into();
        self
    }

    /// Sets the quantity
    pub fn with_quantity(mut self, quantity: Decimal) -> Self {
        self.quantity = quantity;
        self
    }

    /// Sets the pharmacy NPI
    pub fn with_npi(mut self, npi: impl Into<String>) -> Self {
        self.npi = npi.into();
        self
    }

    /// Sets the price
    pub fn with_price(mut self, price: Decimal) -> Self {
        self.price = price;
        self
    }

    /// Sets the submission timestamp
    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Builds the claim
    pub fn build(self) -> Claim {
        Claim {
            id: self.id,
            ndc: self.ndc,
            quantity: self.quantity,
            npi: self.npi,
            price: self.price,
            timestamp: self.timestamp,
        }
    }
}

/// Builder for an on-disk seed data directory
///
/// Lays files out the way the loader expects them: `pharmacies/*.csv`,
/// `claims/*.json` and `reverts/*.json`. The directory is removed when the
/// returned [`SeedDirectory`] is dropped.
pub struct SeedDirectoryBuilder {
    pharmacy_files: Vec<(String, String)>,
    claim_files: Vec<(String, String)>,
    reversal_files: Vec<(String, String)>,
}

impl Default for SeedDirectoryBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl SeedDirectoryBuilder {
    /// Creates an empty builder; no subdirectory is created unless a file is added
    pub fn new() -> Self {
        Self {
            pharmacy_files: Vec::new(),
            claim_files: Vec::new(),
            reversal_files: Vec::new(),
        }
    }

    /// Adds a pharmacy CSV built from the given pharmacies
    pub fn with_pharmacies(self, name: &str, pharmacies: &[Pharmacy]) -> Self {
        let mut body = String::from("chain,npi\n");
        for pharmacy in pharmacies {
            body.push_str(&format!("{},{}\n", pharmacy.chain, pharmacy.npi));
        }
        self.with_pharmacy_csv(name, body)
    }

    /// Adds the fixture pharmacies as `pharmacies.csv`
    pub fn with_fixture_pharmacies(self) -> Self {
        self.with_pharmacies("pharmacies.csv", &PharmacyFixtures::all())
    }

    /// Adds a raw pharmacy CSV file
    pub fn with_pharmacy_csv(mut self, name: &str, body: impl Into<String>) -> Self {
        self.pharmacy_files.push((name.to_string(), body.into()));
        self
    }

    /// Adds a claims JSON file built from the given claims
    pub fn with_claims(self, name: &str, claims: &[Claim]) -> Self {
        let records: Vec<Value> = claims.iter().map(claim_record).collect();
        self.with_claims_json(name, Value::Array(records).to_string())
    }

    /// Adds a raw claims JSON file
    pub fn with_claims_json(mut self, name: &str, body: impl Into<String>) -> Self {
        self.claim_files.push((name.to_string(), body.into()));
        self
    }

    /// Adds a reversals JSON file built from the given reversals
    pub fn with_reversals(self, name: &str, reversals: &[Reversal]) -> Self {
        let records: Vec<Value> = reversals.iter().map(reversal_record).collect();
        self.with_reversals_json(name, Value::Array(records).to_string())
    }

    /// Adds a raw reversals JSON file
    pub fn with_reversals_json(mut self, name: &str, body: impl Into<String>) -> Self {
        self.reversal_files.push((name.to_string(), body.into()));
        self
    }

    /// Writes every file into a fresh temporary directory
    ///
    /// # Panics
    ///
    /// Panics if the temporary directory or any file cannot be written
    pub fn build(self) -> SeedDirectory {
        let dir = TempDir::new().expect("Failed to create seed directory");
        write_all(dir.path(), "pharmacies", &self.pharmacy_files);
        write_all(dir.path(), "claims", &self.claim_files);
        write_all(dir.path(), "reverts", &self.reversal_files);
        SeedDirectory { dir }
    }
}

/// A temporary seed data directory
pub struct SeedDirectory {
    dir: TempDir,
}

impl SeedDirectory {
    /// Root of the seed data
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Root of the seed data as an owned path
    pub fn path_buf(&self) -> PathBuf {
        self.dir.path().to_path_buf()
    }
}

fn write_all(root: &Path, subdir: &str, files: &[(String, String)]) {
    if files.is_empty() {
        return;
    }
    let target = root.join(subdir);
    fs::create_dir_all(&target).expect("Failed to create seed subdirectory");
    for (name, body) in files {
        fs::write(target.join(name), body).expect("Failed to write seed file");
    }
}

/// Seed-file JSON for a claim, with a naive timestamp as the seed files carry it
pub fn claim_record(claim: &Claim) -> Value {
    json!({
        "id": claim.id.as_uuid(),
        "ndc": claim.ndc,
        "npi": claim.npi,
        "quantity": claim.quantity.to_f64(),
        "price": claim.price.to_f64(),
        "timestamp": claim.timestamp.naive_utc().format("%Y-%m-%dT%H:%M:%S").to_string(),
    })
}

/// Seed-file JSON for a reversal
pub fn reversal_record(reversal: &Reversal) -> Value {
    let mut record = json!({
        "id": reversal.id.as_uuid(),
        "claim_id": reversal.claim_id.as_uuid(),
        "timestamp": reversal.timestamp.naive_utc().format("%Y-%m-%dT%H:%M:%S").to_string(),
    });
    if let Some(reason) = &reversal.reason {
        record["reason"] = json!(reason);
    }
    record
}
