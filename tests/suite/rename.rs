//! Display-name editing scenarios.
//!
//! Renames apply on screen before the server answers; a failure alerts
//! but never rolls the shown name back.

use std::time::Duration;

use latch_session::{IdentityOutcome, Panel};
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::common;

fn registered() -> IdentityOutcome {
    IdentityOutcome::Registered {
        name: "Garage".to_string(),
    }
}

#[tokio::test]
async fn rename_applies_at_once_and_confirms_with_a_notice() {
    let server = MockServer::start().await;
    common::mount_status(&server, true).await;
    Mock::given(method("POST"))
        .and(path("/api/set_name"))
        .and(body_json(serde_json::json!({ "name": "Side Gate" })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({ "success": true })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let mut panel = Panel::start(
        common::api_for(&server),
        registered(),
        common::startup_only_options(),
    );
    common::pump_until(&mut panel, "the startup read", |v| v.belief.is_known()).await;

    panel.commit_name("Side Gate");
    assert_eq!(
        panel.snapshot().display_name.as_deref(),
        Some("Side Gate"),
        "the new name shows before the server answers"
    );

    let view = common::pump_until(&mut panel, "the rename to confirm", |v| {
        v.notice.as_deref() == Some("Name updated")
    })
    .await;
    assert_eq!(view.display_name.as_deref(), Some("Side Gate"));
    assert!(view.alert.is_none());
    panel.shutdown();
}

#[tokio::test]
async fn failed_rename_keeps_the_shown_name_and_alerts() {
    let server = MockServer::start().await;
    common::mount_status(&server, true).await;
    Mock::given(method("POST"))
        .and(path("/api/set_name"))
        .respond_with(ResponseTemplate::new(500).set_body_string("name store offline"))
        .mount(&server)
        .await;

    let mut panel = Panel::start(
        common::api_for(&server),
        registered(),
        common::startup_only_options(),
    );
    common::pump_until(&mut panel, "the startup read", |v| v.belief.is_known()).await;

    panel.commit_name("Side Gate");
    let view = common::pump_until(&mut panel, "the rename to fail", |v| v.alert.is_some()).await;

    let alert = view.alert.as_deref().unwrap_or_default();
    assert!(
        alert.starts_with("Name update failed"),
        "unexpected alert: {alert}"
    );
    assert_eq!(
        view.display_name.as_deref(),
        Some("Side Gate"),
        "a failed rename does not roll the name back"
    );
    panel.shutdown();
}

#[tokio::test]
async fn unchanged_name_sends_nothing() {
    let server = MockServer::start().await;
    common::mount_status(&server, true).await;
    Mock::given(method("POST"))
        .and(path("/api/set_name"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let mut panel = Panel::start(
        common::api_for(&server),
        registered(),
        common::startup_only_options(),
    );
    common::pump_until(&mut panel, "the startup read", |v| v.belief.is_known()).await;

    panel.commit_name("Garage");
    tokio::time::sleep(Duration::from_millis(60)).await;
    panel.pump();

    assert_eq!(panel.snapshot().display_name.as_deref(), Some("Garage"));
    panel.shutdown();
}
