//! Full panel scenarios against a mock lock service.

use latch_session::{IdentityOutcome, LockBelief, Panel};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::common;

fn registered() -> IdentityOutcome {
    IdentityOutcome::Registered {
        name: "Garage".to_string(),
    }
}

/// The whole happy path in one sitting: the stored identifier resolves to
/// a name, the startup read lands, an open round-trips, and the done
/// notice retires on its own.
#[tokio::test]
async fn resolved_identity_through_open_to_notice_expiry() {
    let server = MockServer::start().await;
    common::mount_name(&server, "Kenji").await;
    common::mount_status(&server, true).await;
    common::mount_ack(&server, "/api/open").await;

    let api = common::api_for(&server);
    let identity = latch_session::resolve_identity(&api).await;
    assert_eq!(
        identity,
        IdentityOutcome::Registered {
            name: "Kenji".to_string()
        }
    );

    let mut panel = Panel::start(api, identity, common::startup_only_options());
    let view = common::pump_until(&mut panel, "the startup read", |v| v.belief.is_known()).await;
    assert_eq!(view.belief, LockBelief::Locked);
    assert_eq!(view.display_name.as_deref(), Some("Kenji"));
    assert!(view.can_command());

    panel.request_open();
    let busy = panel.snapshot();
    assert!(busy.busy);
    assert_eq!(busy.notice.as_deref(), Some("Opening..."));

    let view = common::pump_until(&mut panel, "the open to confirm", |v| !v.busy).await;
    assert_eq!(view.belief, LockBelief::Unlocked);
    assert_eq!(view.notice.as_deref(), Some("Opened"));
    assert!(view.can_command());

    let view = common::pump_until(&mut panel, "the notice to retire", |v| v.notice.is_none()).await;
    assert_eq!(view.belief, LockBelief::Unlocked, "only the notice goes");
    panel.shutdown();
}

#[tokio::test]
async fn startup_read_settles_the_belief() {
    let server = MockServer::start().await;
    common::mount_status(&server, true).await;

    let mut panel = Panel::start(
        common::api_for(&server),
        registered(),
        common::startup_only_options(),
    );
    let view = common::pump_until(&mut panel, "the belief to settle", |v| v.belief.is_known()).await;

    assert_eq!(view.belief, LockBelief::Locked);
    assert_eq!(view.display_name.as_deref(), Some("Garage"));
    assert!(view.alert.is_none());
    panel.shutdown();
}

#[tokio::test]
async fn open_command_confirms_and_notices() {
    let server = MockServer::start().await;
    common::mount_status(&server, true).await;
    common::mount_ack(&server, "/api/open").await;

    let mut panel = Panel::start(
        common::api_for(&server),
        registered(),
        common::startup_only_options(),
    );
    common::pump_until(&mut panel, "the startup read", |v| v.belief.is_known()).await;

    panel.request_open();
    let busy = panel.snapshot();
    assert!(busy.busy, "the slot must be taken before the call resolves");
    assert_eq!(busy.notice.as_deref(), Some("Opening..."));
    assert!(!busy.can_command());

    let view = common::pump_until(&mut panel, "the open to confirm", |v| !v.busy).await;
    assert_eq!(view.belief, LockBelief::Unlocked);
    assert_eq!(view.notice.as_deref(), Some("Opened"));
    assert!(view.can_command());
    panel.shutdown();
}

#[tokio::test]
async fn refused_close_alerts_and_frees_the_slot() {
    let server = MockServer::start().await;
    common::mount_status(&server, true).await;
    common::mount_refusal(&server, "/api/close").await;

    let mut panel = Panel::start(
        common::api_for(&server),
        registered(),
        common::startup_only_options(),
    );
    common::pump_until(&mut panel, "the startup read", |v| v.belief.is_known()).await;

    panel.request_close();
    let view = common::pump_until(&mut panel, "the close to resolve", |v| !v.busy).await;

    assert_eq!(view.alert.as_deref(), Some("Close failed"));
    assert!(view.notice.is_none(), "a failed command has no done notice");
    assert_eq!(view.belief, LockBelief::Locked, "the belief must not move");
    assert!(view.can_command(), "a freed slot allows an immediate retry");
    panel.shutdown();
}

#[tokio::test]
async fn failed_poll_drops_belief_to_unknown_but_keeps_controls() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "success": true,
            "locked": true
        })))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/status"))
        .respond_with(ResponseTemplate::new(500).set_body_string("lock service down"))
        .mount(&server)
        .await;

    let mut panel = Panel::start(
        common::api_for(&server),
        registered(),
        common::fast_options(),
    );
    common::pump_until(&mut panel, "the first read", |v| v.belief == LockBelief::Locked).await;
    let view = common::pump_until(&mut panel, "the belief to drop", |v| {
        v.belief == LockBelief::Unknown
    })
    .await;

    let alert = view.alert.as_deref().unwrap_or_default();
    assert!(
        alert.starts_with("Could not read lock status"),
        "unexpected alert: {alert}"
    );
    assert!(alert.contains("500"));
    assert!(view.can_command(), "a read failure must not disable controls");
    assert!(view.fault.is_none());
    panel.shutdown();
}

#[tokio::test]
async fn recovered_poll_clears_the_refresh_alert() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/status"))
        .respond_with(ResponseTemplate::new(500).set_body_string("transient"))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    common::mount_status(&server, false).await;

    let mut panel = Panel::start(
        common::api_for(&server),
        registered(),
        common::fast_options(),
    );
    common::pump_until(&mut panel, "the failed read", |v| v.alert.is_some()).await;
    let view = common::pump_until(&mut panel, "the recovery", |v| {
        v.belief == LockBelief::Unlocked
    })
    .await;

    assert!(view.alert.is_none(), "a successful read clears its alert");
    panel.shutdown();
}
