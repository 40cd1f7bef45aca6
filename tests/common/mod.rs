//! Shared fixtures for the integration suite.
//!
//! Every scenario runs against a local wiremock server standing in for
//! the lock service; nothing here touches the real network.

#![allow(dead_code)]

use std::time::Duration;

use latch_session::{LockApi, Panel, PanelOptions, PanelView, UserId};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const TEST_USER: &str = "integration-user";

pub fn test_user() -> UserId {
    UserId::new(TEST_USER).unwrap()
}

pub fn api_for(server: &MockServer) -> LockApi {
    LockApi::new(server.uri(), test_user())
}

/// Options tuned so scenarios never wait on the real cadence.
pub fn fast_options() -> PanelOptions {
    PanelOptions {
        refresh_period: Duration::from_millis(25),
        notice_ttl: Duration::from_millis(50),
    }
}

/// One immediate startup read, then no further polling inside the test
/// window. Keeps command scenarios free of refresh races.
pub fn startup_only_options() -> PanelOptions {
    PanelOptions {
        refresh_period: Duration::from_secs(60),
        notice_ttl: Duration::from_millis(50),
    }
}

/// Mounts `GET /api/get_name` answering with a registered name.
pub async fn mount_name(server: &MockServer, name: &str) {
    Mock::given(method("GET"))
        .and(path("/api/get_name"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({ "success": true, "name": name })),
        )
        .mount(server)
        .await;
}

/// Mounts `GET /api/status` reporting the bolt position.
pub async fn mount_status(server: &MockServer, locked: bool) {
    Mock::given(method("GET"))
        .and(path("/api/status"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({ "success": true, "locked": locked })),
        )
        .mount(server)
        .await;
}

/// Mounts a POST endpoint acknowledging success.
pub async fn mount_ack(server: &MockServer, route: &str) {
    Mock::given(method("POST"))
        .and(path(route))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({ "success": true })),
        )
        .mount(server)
        .await;
}

/// Mounts a POST endpoint refusing the request inside a 2xx envelope.
pub async fn mount_refusal(server: &MockServer, route: &str) {
    Mock::given(method("POST"))
        .and(path(route))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({ "success": false })),
        )
        .mount(server)
        .await;
}

/// Pumps the panel every few milliseconds until `predicate` holds,
/// panicking with `what` if two seconds pass first.
pub async fn pump_until(
    panel: &mut Panel,
    what: &str,
    mut predicate: impl FnMut(&PanelView) -> bool,
) -> PanelView {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(2);
    loop {
        panel.pump();
        let view = panel.snapshot();
        if predicate(&view) {
            return view;
        }
        assert!(
            tokio::time::Instant::now() < deadline,
            "timed out waiting for {what}"
        );
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}
