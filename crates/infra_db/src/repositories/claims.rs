//! Claims repository implementation
//!
//! This module provides database access for pharmacies, claims and
//! reversals, including the transactional reversal and the batch inserts
//! used by the seed loader.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::DatabaseError;

/// Repository for managing pharmacy claims data
///
/// The ClaimsRepository handles all database operations for the claim
/// lifecycle: pharmacy lookup, submission, reversal and bulk seeding.
#[derive(Debug, Clone)]
pub struct ClaimsRepository {
    pool: PgPool,
}

impl ClaimsRepository {
    /// Creates a new ClaimsRepository with the given connection pool
    ///
    /// # Arguments
    ///
    /// * `pool` - The PostgreSQL connection pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Retrieves a pharmacy by its NPI
    ///
    /// # Arguments
    ///
    /// * `npi` - The 10-digit provider identifier
    pub async fn find_pharmacy_by_npi(&self, npi: &str) -> Result<Option<PharmacyRow>, DatabaseError> {
        let pharmacy = sqlx::query_as::<_, PharmacyRow>(
            r#"
            SELECT id, npi, chain
            FROM pharmacies
            WHERE npi = $1
            "#,
        )
        .bind(npi)
        .fetch_optional(&self.pool)
        .await?;

        Ok(pharmacy)
    }

    /// Retrieves a claim by its identifier
    ///
    /// # Arguments
    ///
    /// * `claim_id` - The claim identifier
    pub async fn find_claim(&self, claim_id: Uuid) -> Result<Option<ClaimRow>, DatabaseError> {
        let claim = sqlx::query_as::<_, ClaimRow>(
            r#"
            SELECT id, ndc, npi, quantity, price, timestamp
            FROM claims
            WHERE id = $1
            "#,
        )
        .bind(claim_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(claim)
    }

    /// Retrieves the reversal for a claim, if any
    pub async fn find_reversal_by_claim(&self, claim_id: Uuid) -> Result<Option<ReversalRow>, DatabaseError> {
        let reversal = sqlx::query_as::<_, ReversalRow>(
            r#"
            SELECT id, claim_id, reason, timestamp
            FROM reversals
            WHERE claim_id = $1
            "#,
        )
        .bind(claim_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(reversal)
    }

    /// Inserts a single claim
    ///
    /// # Arguments
    ///
    /// * `claim` - The claim data to insert
    ///
    /// # Errors
    ///
    /// * `QueryFailed` - the NPI has no pharmacy
    /// * `DuplicateEntry` - the claim id already exists
    pub async fn insert_claim(&self, claim: &NewClaim) -> Result<(), DatabaseError> {
        sqlx::query(
            r#"
            INSERT INTO claims (id, ndc, npi, quantity, price, timestamp)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(claim.id)
        .bind(&claim.ndc)
        .bind(&claim.npi)
        .bind(claim.quantity)
        .bind(claim.price)
        .bind(claim.timestamp)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Records a reversal for a claim
    ///
    /// Locks the claim row, checks for an existing reversal and inserts,
    /// all in one transaction. Concurrent reversals of the same claim queue
    /// on the row lock, so only the first can insert.
    ///
    /// # Errors
    ///
    /// * `NotFound` - the claim does not exist
    /// * `DuplicateEntry` - the claim already has a reversal
    pub async fn reverse_claim(&self, reversal: &NewReversal) -> Result<ReversalRow, DatabaseError> {
        let mut tx = self.pool.begin().await?;

        let locked: Option<Uuid> = sqlx::query_scalar("SELECT id FROM claims WHERE id = $1 FOR UPDATE")
            .bind(reversal.claim_id)
            .fetch_optional(&mut *tx)
            .await?;

        if locked.is_none() {
            return Err(DatabaseError::not_found("Claim", reversal.claim_id));
        }

        let already_reversed: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM reversals WHERE claim_id = $1)")
                .bind(reversal.claim_id)
                .fetch_one(&mut *tx)
                .await?;

        if already_reversed {
            return Err(DatabaseError::duplicate("Reversal", "claim_id", reversal.claim_id));
        }

        let row = sqlx::query_as::<_, ReversalRow>(
            r#"
            INSERT INTO reversals (id, claim_id, reason, timestamp)
            VALUES ($1, $2, $3, $4)
            RETURNING id, claim_id, reason, timestamp
            "#,
        )
        .bind(reversal.id)
        .bind(reversal.claim_id)
        .bind(reversal.reason.as_deref())
        .bind(reversal.timestamp)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(row)
    }

    /// Inserts a batch of pharmacies in one transaction
    ///
    /// Rows whose NPI already exists are skipped.
    ///
    /// # Returns
    ///
    /// Positions of the rows that were inserted
    pub async fn insert_pharmacies(&self, pharmacies: &[NewPharmacy]) -> Result<Vec<usize>, DatabaseError> {
        let mut tx = self.pool.begin().await?;
        let mut inserted = Vec::with_capacity(pharmacies.len());

        for (index, pharmacy) in pharmacies.iter().enumerate() {
            let result = sqlx::query(
                r#"
                INSERT INTO pharmacies (npi, chain)
                VALUES ($1, $2)
                ON CONFLICT (npi) DO NOTHING
                "#,
            )
            .bind(&pharmacy.npi)
            .bind(pharmacy.chain)
            .execute(&mut *tx)
            .await?;

            if result.rows_affected() == 1 {
                inserted.push(index);
            }
        }

        tx.commit().await?;
        Ok(inserted)
    }

    /// Inserts a batch of claims in one transaction
    ///
    /// Rows whose id already exists are skipped. A claim referencing an
    /// unknown pharmacy fails the whole batch.
    pub async fn insert_claims(&self, claims: &[NewClaim]) -> Result<Vec<usize>, DatabaseError> {
        let mut tx = self.pool.begin().await?;
        let mut inserted = Vec::with_capacity(claims.len());

        for (index, claim) in claims.iter().enumerate() {
            let result = sqlx::query(
                r#"
                INSERT INTO claims (id, ndc, npi, quantity, price, timestamp)
                VALUES ($1, $2, $3, $4, $5, $6)
                ON CONFLICT (id) DO NOTHING
                "#,
            )
            .bind(claim.id)
            .bind(&claim.ndc)
            .bind(&claim.npi)
            .bind(claim.quantity)
            .bind(claim.price)
            .bind(claim.timestamp)
            .execute(&mut *tx)
            .await?;

            if result.rows_affected() == 1 {
                inserted.push(index);
            }
        }

        tx.commit().await?;
        Ok(inserted)
    }

    /// Inserts a batch of reversals in one transaction
    ///
    /// Rows colliding on either the reversal id or the claim id are skipped.
    /// A reversal referencing an unknown claim fails the whole batch.
    pub async fn insert_reversals(&self, reversals: &[NewReversal]) -> Result<Vec<usize>, DatabaseError> {
        let mut tx = self.pool.begin().await?;
        let mut inserted = Vec::with_capacity(reversals.len());

        for (index, reversal) in reversals.iter().enumerate() {
            let result = sqlx::query(
                r#"
                INSERT INTO reversals (id, claim_id, reason, timestamp)
                VALUES ($1, $2, $3, $4)
                ON CONFLICT DO NOTHING
                "#,
            )
            .bind(reversal.id)
            .bind(reversal.claim_id)
            .bind(reversal.reason.as_deref())
            .bind(reversal.timestamp)
            .execute(&mut *tx)
            .await?;

            if result.rows_affected() == 1 {
                inserted.push(index);
            }
        }

        tx.commit().await?;
        Ok(inserted)
    }

    /// Counts the rows of one of the claims tables
    ///
    /// # Arguments
    ///
    /// * `table` - One of `pharmacies`, `claims`, `reversals`
    pub async fn count(&self, table: &'static str) -> Result<i64, DatabaseError> {
        if !matches!(table, "pharmacies" | "claims" | "reversals") {
            return Err(DatabaseError::QueryFailed(format!("unknown table {}", table)));
        }

        let sql = format!("SELECT COUNT(*) FROM {}", table);
        let count: i64 = sqlx::query_scalar(&sql)
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    /// Checks connectivity with a trivial round trip
    pub async fn ping(&self) -> Result<(), DatabaseError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

// ============================================================================
// Row Types
// ============================================================================

/// Pharmacy chain enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "pharmacy_chain", rename_all = "lowercase")]
pub enum PharmacyChain {
    Health,
    Saint,
    Doctor,
}

/// Pharmacy database row
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PharmacyRow {
    pub id: i32,
    pub npi: String,
    pub chain: PharmacyChain,
}

/// Claim database row
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ClaimRow {
    pub id: Uuid,
    pub ndc: String,
    pub npi: String,
    pub quantity: Decimal,
    pub price: Decimal,
    pub timestamp: DateTime<Utc>,
}

/// Reversal database row
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ReversalRow {
    pub id: Uuid,
    pub claim_id: Uuid,
    pub reason: Option<String>,
    pub timestamp: DateTime<Utc>,
}

/// Data for inserting a pharmacy
#[derive(Debug, Clone)]
pub struct NewPharmacy {
    pub npi: String,
    pub chain: PharmacyChain,
}

/// Data for inserting a claim
#[derive(Debug, Clone)]
pub struct NewClaim {
    pub id: Uuid,
    pub ndc: String,
    pub npi: String,
    pub quantity: Decimal,
    pub price: Decimal,
    pub timestamp: DateTime<Utc>,
}

/// Data for inserting a reversal
#[derive(Debug, Clone)]
pub struct NewReversal {
    pub id: Uuid,
    pub claim_id: Uuid,
    pub reason: Option<String>,
    pub timestamp: DateTime<Utc>,
}
