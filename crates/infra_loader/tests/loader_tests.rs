//! Loader tests against the in-memory claims port

use std::collections::HashSet;
use std::sync::Arc;

use core_kernel::{AuditEventKind, ClaimId, RecordingAuditSink};
use domain_claims::ports::mock::MockClaimsPort;
use domain_claims::{ClaimValidator, ClaimsPort, Pharmacy, PharmacyChain, Reversal, SeedTable};
use infra_loader::{Loader, LoaderError, DEFAULT_BATCH_SIZE, MAX_BATCH_SIZE};
use test_utils::{ClaimFixtures, PharmacyFixtures, ReversalFixtures, SeedDirectoryBuilder, TestClaimBuilder};

struct Harness {
    loader: Loader,
    port: Arc<MockClaimsPort>,
    audit: Arc<RecordingAuditSink>,
}

fn harness_with(port: MockClaimsPort, batch_size: usize) -> Harness {
    let port = Arc::new(port);
    let audit = Arc::new(RecordingAuditSink::new());
    let loader = Loader::new(port.clone(), audit.clone(), ClaimValidator::new()).with_batch_size(batch_size);
    Harness { loader, port, audit }
}

async fn harness_with_pharmacies(batch_size: usize) -> Harness {
    harness_with(MockClaimsPort::with_pharmacies(PharmacyFixtures::all()).await, batch_size)
}

// ============================================================================
// Pharmacy CSV
// ============================================================================

mod pharmacy_tests {
    use super::*;

    #[tokio::test]
    async fn test_valid_rows_inserted_and_malformed_rows_skipped() {
        let h = harness_with(MockClaimsPort::new(), 2);
        let seed = SeedDirectoryBuilder::new()
            .with_pharmacy_csv(
                "pharmacies.csv",
                "chain,npi\n\
                 health,1234567890\n\
                 saint,2345678901\n\
                 doctor,3456789012\n\
                 walmart,4567890123\n\
                 health,12345\n\
                 saint\n",
            )
            .build();

        let report = h.loader.load_pharmacies(seed.path()).await.unwrap();

        assert_eq!(report.inserted, 3);
        assert_eq!(report.skipped, 3);
        assert_eq!(h.port.count(SeedTable::Pharmacies).await.unwrap(), 3);
        assert_eq!(h.audit.events_of(AuditEventKind::PharmacyLoaded).len(), 3);
    }

    #[tokio::test]
    async fn test_rerun_against_populated_table_inserts_nothing() {
        let h = harness_with(MockClaimsPort::new(), DEFAULT_BATCH_SIZE);
        let seed = SeedDirectoryBuilder::new().with_fixture_pharmacies().build();

        h.loader.load_pharmacies(seed.path()).await.unwrap();
        let second = h.loader.load_pharmacies(seed.path()).await.unwrap();

        assert!(second.is_empty());
        assert_eq!(h.port.count(SeedTable::Pharmacies).await.unwrap(), 3);
        assert_eq!(h.audit.events_of(AuditEventKind::PharmacyLoaded).len(), 3);
    }

    #[tokio::test]
    async fn test_duplicate_npi_within_file_is_inserted_once() {
        let h = harness_with(MockClaimsPort::new(), DEFAULT_BATCH_SIZE);
        let seed = SeedDirectoryBuilder::new()
            .with_pharmacies(
                "pharmacies.csv",
                &[
                    Pharmacy::new("1234567890", PharmacyChain::Health),
                    Pharmacy::new("1234567890", PharmacyChain::Doctor),
                ],
            )
            .build();

        let report = h.loader.load_pharmacies(seed.path()).await.unwrap();

        assert_eq!(report.inserted, 1);
        assert_eq!(report.duplicates, 1);
    }

    #[tokio::test]
    async fn test_missing_pharmacy_directory_is_fatal() {
        let h = harness_with(MockClaimsPort::new(), DEFAULT_BATCH_SIZE);
        let seed = SeedDirectoryBuilder::new().build();

        let err = h.loader.load_pharmacies(seed.path()).await.unwrap_err();

        assert!(matches!(err, LoaderError::MissingDirectory(_)));
    }

    #[tokio::test]
    async fn test_file_without_valid_rows_is_nothing_loaded() {
        let h = harness_with(MockClaimsPort::new(), DEFAULT_BATCH_SIZE);
        let seed = SeedDirectoryBuilder::new()
            .with_pharmacy_csv("pharmacies.csv", "chain,npi\nunknown,1234567890\n")
            .build();

        let err = h.loader.load_pharmacies(seed.path()).await.unwrap_err();

        assert!(matches!(err, LoaderError::NothingLoaded(SeedTable::Pharmacies)));
    }
}

// ============================================================================
// Claim and Reversal JSON
// ============================================================================

mod json_tests {
    use super::*;

    fn claims(n: usize) -> Vec<domain_claims::Claim> {
        (0..n).map(|_| ClaimFixtures::claim()).collect()
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_many_files_load_union_exactly_once() {
        let h = harness_with_pharmacies(7).await;
        let mut expected = HashSet::new();
        let mut builder = SeedDirectoryBuilder::new();
        for file in 0..15 {
            let batch = claims(5);
            expected.extend(batch.iter().map(|c| c.id));
            builder = builder.with_claims(&format!("claims_{file:02}.json"), &batch);
        }
        let seed = builder.build();

        let report = h.loader.load_claims(seed.path()).await.unwrap();

        let stored: HashSet<ClaimId> = h.port.claims().await.into_iter().map(|c| c.id).collect();
        assert_eq!(report.files, 15);
        assert_eq!(report.inserted, 75);
        assert_eq!(stored, expected);
        assert_eq!(h.audit.events_of(AuditEventKind::ClaimLoaded).len(), 75);
    }

    #[tokio::test]
    async fn test_corrupt_file_does_not_block_others() {
        let h = harness_with_pharmacies(DEFAULT_BATCH_SIZE).await;
        let seed = SeedDirectoryBuilder::new()
            .with_claims("a.json", &claims(3))
            .with_claims_json("b.json", "[{\"id\": ")
            .with_claims("c.json", &claims(2))
            .build();

        let report = h.loader.load_claims(seed.path()).await.unwrap();

        assert_eq!(report.failed_files, 1);
        assert_eq!(report.inserted, 5);
    }

    #[tokio::test]
    async fn test_trailing_percent_is_tolerated() {
        let h = harness_with_pharmacies(DEFAULT_BATCH_SIZE).await;
        let claim = ClaimFixtures::claim();
        let body = format!("[{}]\n%\n", test_utils::claim_record(&claim));
        let seed = SeedDirectoryBuilder::new().with_claims_json("claims.json", body).build();

        let report = h.loader.load_claims(seed.path()).await.unwrap();

        assert_eq!(report.inserted, 1);
        assert_eq!(h.port.claims().await[0].id, claim.id);
    }

    #[tokio::test]
    async fn test_invalid_claims_are_skipped() {
        let h = harness_with_pharmacies(DEFAULT_BATCH_SIZE).await;
        let seed = SeedDirectoryBuilder::new()
            .with_claims(
                "claims.json",
                &[
                    ClaimFixtures::claim(),
                    TestClaimBuilder::new().with_ndc("12").build(),
                    TestClaimBuilder::new().with_price(rust_decimal_macros::dec!(-1)).build(),
                ],
            )
            .build();

        let report = h.loader.load_claims(seed.path()).await.unwrap();

        assert_eq!(report.parsed, 1);
        assert_eq!(report.skipped, 2);
        assert_eq!(report.inserted, 1);
    }

    #[tokio::test]
    async fn test_missing_claims_directory_is_no_data() {
        let h = harness_with_pharmacies(DEFAULT_BATCH_SIZE).await;
        let seed = SeedDirectoryBuilder::new().build();

        let report = h.loader.load_claims(seed.path()).await.unwrap();

        assert!(report.is_empty());
    }

    #[tokio::test]
    async fn test_failed_batch_is_counted_and_loading_continues() {
        let h = harness_with_pharmacies(2).await;
        let seed = SeedDirectoryBuilder::new()
            .with_claims(
                "claims.json",
                &[
                    ClaimFixtures::claim(),
                    ClaimFixtures::claim_for(PharmacyFixtures::UNKNOWN_NPI),
                    ClaimFixtures::claim(),
                ],
            )
            .build();

        let report = h.loader.load_claims(seed.path()).await.unwrap();

        assert_eq!(report.failed_batches, 1);
        assert_eq!(report.inserted, 1);
    }

    #[tokio::test]
    async fn test_reversals_load_after_claims() {
        let h = harness_with_pharmacies(DEFAULT_BATCH_SIZE).await;
        let first = ClaimFixtures::claim();
        let second = ClaimFixtures::claim();
        let seed = SeedDirectoryBuilder::new()
            .with_fixture_pharmacies()
            .with_claims("claims.json", &[first.clone(), second.clone()])
            .with_reversals(
                "reverts.json",
                &[
                    ReversalFixtures::reversal_for(first.id),
                    Reversal::new(first.id, None),
                ],
            )
            .build();

        let results = h.loader.load_all(seed.path()).await;

        let tables: Vec<SeedTable> = results.iter().map(|(table, _)| *table).collect();
        assert_eq!(tables, vec![SeedTable::Pharmacies, SeedTable::Claims, SeedTable::Reversals]);
        let reversals = h.port.reversals().await;
        assert_eq!(reversals.len(), 1);
        assert_eq!(reversals[0].claim_id, first.id);
        assert_eq!(h.audit.events_of(AuditEventKind::ReversalLoaded).len(), 1);
    }
}

mod batch_size_tests {
    use super::*;

    #[tokio::test]
    async fn test_out_of_range_batch_sizes_fall_back() {
        assert_eq!(harness_with(MockClaimsPort::new(), 0).loader.batch_size(), DEFAULT_BATCH_SIZE);
        assert_eq!(
            harness_with(MockClaimsPort::new(), MAX_BATCH_SIZE + 1).loader.batch_size(),
            DEFAULT_BATCH_SIZE
        );
        assert_eq!(
            harness_with(MockClaimsPort::new(), MAX_BATCH_SIZE).loader.batch_size(),
            MAX_BATCH_SIZE
        );
    }
}
