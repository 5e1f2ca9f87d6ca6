//! End-to-end scenarios: seed a store from disk, then drive it over HTTP

use std::sync::Arc;

use axum::http::StatusCode;
use axum_test::TestServer;
use serde_json::json;

use core_kernel::{AuditEventKind, AuditSink, RecordingAuditSink};
use domain_claims::ports::mock::MockClaimsPort;
use domain_claims::{ClaimValidator, ClaimsPort, ClaimsService, SeedTable};
use infra_loader::Loader;
use interface_api::dto::claims::ClaimResponse;
use interface_api::{create_router, AppState};
use test_utils::{ClaimFixtures, PharmacyFixtures, ReversalFixtures, SeedDirectoryBuilder};

/// Tests that seeded claims are served and reversed like submitted ones
#[tokio::test]
async fn test_seeded_claims_are_reversible_over_http() {
    let open = ClaimFixtures::claim();
    let reversed = ClaimFixtures::claim_for(PharmacyFixtures::SAINT_NPI);
    let seed = SeedDirectoryBuilder::new()
        .with_fixture_pharmacies()
        .with_claims("claims.json", &[open.clone(), reversed.clone()])
        .with_reversals("reverts.json", &[ReversalFixtures::reversal_for(reversed.id)])
        .build();

    let store = Arc::new(MockClaimsPort::new());
    let audit = Arc::new(RecordingAuditSink::new());
    let port: Arc<dyn ClaimsPort> = store.clone();
    let sink: Arc<dyn AuditSink> = audit.clone();

    let results = Loader::new(port.clone(), sink.clone(), ClaimValidator::new())
        .load_all(seed.path())
        .await;
    assert!(results.iter().all(|(_, result)| result.is_ok()));

    let service = Arc::new(ClaimsService::new(port, sink, ClaimValidator::new()));
    let server = TestServer::new(create_router(AppState::new(service))).unwrap();

    let fetched = server.get(&format!("/claim/{}", open.id.as_uuid())).await;
    fetched.assert_status_ok();
    assert_eq!(fetched.json::<ClaimResponse>().npi, PharmacyFixtures::HEALTH_NPI);

    server
        .post("/reversal")
        .json(&json!({"claim_id": reversed.id.as_uuid()}))
        .await
        .assert_status(StatusCode::CONFLICT);
    server
        .post("/reversal")
        .json(&json!({"claim_id": open.id.as_uuid()}))
        .await
        .assert_status_ok();

    assert_eq!(store.reversals().await.len(), 2);
    assert_eq!(audit.events_of(AuditEventKind::ReversalLoaded).len(), 1);
    assert_eq!(audit.events_of(AuditEventKind::ClaimReversed).len(), 1);
}

/// Tests that a second startup against a populated store seeds nothing
#[tokio::test]
async fn test_restart_does_not_reseed() {
    let seed = SeedDirectoryBuilder::new()
        .with_fixture_pharmacies()
        .with_claims("claims.json", &[ClaimFixtures::claim()])
        .build();
    let store = Arc::new(MockClaimsPort::new());
    let audit = Arc::new(RecordingAuditSink::new());
    let loader = Loader::new(store.clone(), audit.clone(), ClaimValidator::new());

    loader.load_all(seed.path()).await;
    let second = loader.load_all(seed.path()).await;

    for (table, result) in second {
        let report = result.unwrap();
        assert!(report.is_empty(), "{table} was seeded twice");
    }
    assert_eq!(store.count(SeedTable::Claims).await.unwrap(), 1);
    assert_eq!(audit.events_of(AuditEventKind::ClaimLoaded).len(), 1);
}
