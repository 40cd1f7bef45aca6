//! Identity resolution at startup.
//!
//! The stored identifier is checked exactly once, before any polling,
//! and the outcome decides whether the panel gets a client at all.

use std::time::Duration;

use latch_session::{IdentityOutcome, Panel, SessionFault, resolve_identity};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::common;

#[tokio::test]
async fn registered_id_resolves_to_its_name() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/get_name"))
        .and(header("User-Id", common::TEST_USER))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "success": true,
            "name": "Garage"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let outcome = resolve_identity(&common::api_for(&server)).await;
    assert_eq!(
        outcome,
        IdentityOutcome::Registered {
            name: "Garage".to_string()
        }
    );
}

#[tokio::test]
async fn absent_name_resolves_to_unregistered() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/get_name"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({ "success": true })),
        )
        .mount(&server)
        .await;

    let outcome = resolve_identity(&common::api_for(&server)).await;
    assert_eq!(outcome, IdentityOutcome::Unregistered);
}

#[tokio::test]
async fn lookup_refusal_reads_as_unregistered() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/get_name"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({ "success": false })),
        )
        .mount(&server)
        .await;

    let outcome = resolve_identity(&common::api_for(&server)).await;
    assert_eq!(outcome, IdentityOutcome::Unregistered);
}

#[tokio::test]
async fn failed_lookup_is_fatal_with_detail() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/get_name"))
        .respond_with(ResponseTemplate::new(500).set_body_string("identity store offline"))
        .mount(&server)
        .await;

    let outcome = resolve_identity(&common::api_for(&server)).await;
    let IdentityOutcome::LookupFailed { detail } = outcome else {
        panic!("expected a failed lookup, got {outcome:?}");
    };
    assert!(detail.contains("500"), "detail should carry the status: {detail}");
    assert!(detail.contains("identity store offline"));
}

#[tokio::test]
async fn missing_stored_id_never_calls_the_service() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let mut panel = Panel::without_identity(common::fast_options());
    tokio::time::sleep(Duration::from_millis(80)).await;
    panel.pump();

    let view = panel.snapshot();
    assert_eq!(view.fault, Some(SessionFault::Unregistered));
    assert!(!view.can_command());
    assert!(!view.can_rename());
}
