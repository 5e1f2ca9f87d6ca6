//! Integration tests for the PostgreSQL claims adapter
//!
//! These tests start a PostgreSQL container and need a running Docker
//! daemon, so they are ignored by default:
//!
//! ```text
//! cargo test -p infra_db -- --ignored
//! ```

use std::sync::Arc;

use rust_decimal_macros::dec;

use core_kernel::ClaimId;
use domain_claims::{Claim, ClaimError, ClaimsPort, Pharmacy, PharmacyChain, Reversal, SeedTable};
use infra_db::PostgresClaimsAdapter;
use test_utils::{
    assert_same_claim_fields, ClaimFixtures, PharmacyFixtures, ReversalFixtures, TestClaimBuilder,
    TestDatabase,
};

async fn seeded_database() -> (TestDatabase, PostgresClaimsAdapter) {
    let db = TestDatabase::new().await.expect("Failed to start test database");
    db.seed_pharmacies().await.expect("Failed to seed pharmacies");
    let adapter = PostgresClaimsAdapter::new(db.pool().clone());
    (db, adapter)
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_claim_round_trip() {
    let (_db, adapter) = seeded_database().await;
    let claim = TestClaimBuilder::new().with_quantity(dec!(2.125)).build();

    adapter.create_claim(&claim).await.unwrap();
    let stored = adapter.find_claim(claim.id).await.unwrap().expect("claim stored");

    assert_eq!(stored.id, claim.id);
    assert_eq!(stored.timestamp, claim.timestamp);
    assert_same_claim_fields(&stored, &claim);
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_submitted_timestamps_survive_storage() {
    let (_db, adapter) = seeded_database().await;

    for _ in 0..5 {
        let claim = Claim::submit(ClaimFixtures::request());
        adapter.create_claim(&claim).await.unwrap();
        let reversal = Reversal::new(claim.id, None);
        adapter.reverse_claim(&reversal).await.unwrap();

        let stored = adapter.find_claim(claim.id).await.unwrap().expect("claim stored");
        let stored_reversal = adapter.find_reversal(claim.id).await.unwrap().expect("reversal stored");

        assert_eq!(stored, claim);
        assert_eq!(stored_reversal.timestamp, reversal.timestamp);
    }
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_find_pharmacy_maps_chain() {
    let (_db, adapter) = seeded_database().await;

    let pharmacy = adapter.find_pharmacy(PharmacyFixtures::SAINT_NPI).await.unwrap();
    let missing = adapter.find_pharmacy(PharmacyFixtures::UNKNOWN_NPI).await.unwrap();

    assert_eq!(pharmacy.map(|p| p.chain), Some(PharmacyChain::Saint));
    assert!(missing.is_none());
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_claim_for_unknown_pharmacy_is_storage_error() {
    let (_db, adapter) = seeded_database().await;
    let claim = ClaimFixtures::claim_for(PharmacyFixtures::UNKNOWN_NPI);

    let result = adapter.create_claim(&claim).await;

    assert!(matches!(result, Err(ClaimError::Storage(_))));
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_reverse_missing_claim_is_not_found() {
    let (_db, adapter) = seeded_database().await;
    let claim_id = ClaimId::new();

    let result = adapter.reverse_claim(&Reversal::new(claim_id, None)).await;

    assert!(matches!(result, Err(ClaimError::ClaimNotFound(id)) if id == claim_id));
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_reverse_persists_reason_and_rejects_second() {
    let (_db, adapter) = seeded_database().await;
    let claim = ClaimFixtures::claim();
    adapter.create_claim(&claim).await.unwrap();

    adapter
        .reverse_claim(&ReversalFixtures::reversal_for(claim.id))
        .await
        .unwrap();
    let second = adapter.reverse_claim(&Reversal::new(claim.id, None)).await;

    assert!(matches!(second, Err(ClaimError::AlreadyReversed(id)) if id == claim.id));
    let stored = adapter.find_reversal(claim.id).await.unwrap().expect("reversal stored");
    assert_eq!(stored.reason.as_deref(), Some("dispensing error"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
#[ignore = "requires Docker"]
async fn test_concurrent_reversals_have_one_winner() {
    let (_db, adapter) = seeded_database().await;
    let adapter = Arc::new(adapter);
    let claim = ClaimFixtures::claim();
    adapter.create_claim(&claim).await.unwrap();

    let handles: Vec<_> = (0..10)
        .map(|_| {
            let adapter = adapter.clone();
            let claim_id = claim.id;
            tokio::spawn(async move { adapter.reverse_claim(&Reversal::new(claim_id, None)).await })
        })
        .collect();

    let mut successes = 0;
    let mut conflicts = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(()) => successes += 1,
            Err(ClaimError::AlreadyReversed(_)) => conflicts += 1,
            Err(e) => panic!("unexpected error: {e}"),
        }
    }

    assert_eq!(successes, 1);
    assert_eq!(conflicts, 9);
    assert_eq!(adapter.count(SeedTable::Reversals).await.unwrap(), 1);
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_batch_insert_skips_existing_keys() {
    let (_db, adapter) = seeded_database().await;
    let batch = vec![
        PharmacyFixtures::health(),
        Pharmacy::new("5555555555", PharmacyChain::Doctor),
        Pharmacy::new("5555555555", PharmacyChain::Saint),
    ];

    let outcome = adapter.insert_pharmacies(&batch).await.unwrap();

    assert_eq!(outcome.inserted, vec![1]);
    assert_eq!(outcome.duplicates, 2);
    assert_eq!(adapter.count(SeedTable::Pharmacies).await.unwrap(), 4);
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_claim_batch_rolls_back_on_orphan() {
    let (_db, adapter) = seeded_database().await;
    let batch = vec![
        ClaimFixtures::claim(),
        ClaimFixtures::claim_for(PharmacyFixtures::UNKNOWN_NPI),
    ];

    let result = adapter.insert_claims(&batch).await;

    assert!(matches!(result, Err(ClaimError::Storage(_))));
    assert_eq!(adapter.count(SeedTable::Claims).await.unwrap(), 0);
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_reversal_batch_skips_already_reversed_claim() {
    let (_db, adapter) = seeded_database().await;
    let claim = ClaimFixtures::claim();
    adapter.insert_claims(&[claim.clone()]).await.unwrap();
    adapter.reverse_claim(&Reversal::new(claim.id, None)).await.unwrap();

    let outcome = adapter
        .insert_reversals(&[ReversalFixtures::reversal_for(claim.id)])
        .await
        .unwrap();

    assert!(outcome.inserted.is_empty());
    assert_eq!(outcome.duplicates, 1);
}
