mod helpers;

use helpers::{RecordingView, Reply, ScriptedTransport};
use serde_json::json;
use std::time::Duration;
use tokio::sync::mpsc;

use crc_settings::daemon::DaemonClient;
use crc_settings::logging::EventLogger;
use crc_settings::models::{ConfigProperty, ConfigValue};
use crc_settings::pane::CommitState;
use crc_settings::session::{ClosedSession, PaneEvent, PaneSession};

async fn run_session(
    transport: &ScriptedTransport,
    view: RecordingView,
    events: Vec<PaneEvent>,
) -> ClosedSession<RecordingView> {
    let (tx, rx) = mpsc::channel(events.len() + 1);
    for event in events {
        tx.send(event).await.unwrap();
    }
    tx.send(PaneEvent::Close).await.unwrap();

    let session = PaneSession::new(
        DaemonClient::new(transport.clone()),
        view,
        EventLogger::new("preferences"),
    );
    session.run(rx).await
}

fn edit(property: ConfigProperty, value: impl Into<ConfigValue>) -> PaneEvent {
    PaneEvent::Edit {
        property,
        value: value.into(),
    }
}

fn count(commands: &[String], name: &str) -> usize {
    commands.iter().filter(|c| *c == name).count()
}

#[tokio::test]
async fn test_open_renders_fetched_snapshot() {
    let transport = ScriptedTransport::with_configs(json!({"cpus": 4, "memory": 9216}));

    let closed = run_session(&transport, RecordingView::accepting(), vec![]).await;

    assert_eq!(transport.commands(), vec!["getconfig"]);
    assert_eq!(closed.view.renders.len(), 1);
    let snapshot = &closed.view.renders[0];
    assert_eq!(snapshot.get(ConfigProperty::Cpus), Some(&ConfigValue::Integer(4)));
    assert_eq!(snapshot.display_value(ConfigProperty::HttpProxy), "Unset");
    assert_eq!(closed.pane.state(), &CommitState::Idle);
}

#[tokio::test]
async fn test_apply_sends_only_changed_property_and_refetches() {
    let transport = ScriptedTransport::with_configs(json!({"cpus": 4, "memory": 9216}));

    let closed = run_session(
        &transport,
        RecordingView::accepting(),
        vec![edit(ConfigProperty::Cpus, 6_i64), PaneEvent::Apply],
    )
    .await;

    let commands = transport.commands();
    assert_eq!(count(&commands, "setconfig"), 1);
    assert_eq!(count(&commands, "unsetconfig"), 0);
    assert_eq!(count(&commands, "getconfig"), 2);

    let set = transport
        .requests()
        .into_iter()
        .find(|r| r["command"] == "setconfig")
        .unwrap();
    assert_eq!(set["args"], json!({"properties": {"cpus": 6}}));

    assert_eq!(closed.view.prompts.len(), 1);
    assert!(closed.view.errors.is_empty());
    assert!(closed.pane.tracker().is_empty());
    assert_eq!(closed.pane.state(), &CommitState::Applied);
}

#[tokio::test]
async fn test_cleared_string_is_unset_and_consent_sent_as_text() {
    let transport = ScriptedTransport::with_configs(json!({"http-proxy": "http://proxy:3128"}));

    let closed = run_session(
        &transport,
        RecordingView::accepting(),
        vec![
            edit(ConfigProperty::HttpProxy, ""),
            PaneEvent::Consent(false),
            PaneEvent::Apply,
        ],
    )
    .await;

    let requests = transport.requests();
    let set_at = requests.iter().position(|r| r["command"] == "setconfig").unwrap();
    let unset_at = requests.iter().position(|r| r["command"] == "unsetconfig").unwrap();
    assert!(set_at < unset_at);
    assert_eq!(requests[set_at]["args"], json!({"properties": {"consent-telemetry": "no"}}));
    assert_eq!(requests[unset_at]["args"], json!({"properties": ["http-proxy"]}));
    assert_eq!(closed.pane.state(), &CommitState::Applied);
}

#[tokio::test]
async fn test_apply_without_edits_sends_nothing() {
    let transport = ScriptedTransport::with_configs(json!({}));

    let closed = run_session(&transport, RecordingView::accepting(), vec![PaneEvent::Apply]).await;

    assert_eq!(transport.commands(), vec!["getconfig"]);
    assert!(closed.view.prompts.is_empty());
    assert_eq!(closed.pane.state(), &CommitState::Idle);
}

#[tokio::test]
async fn test_declined_confirmation_keeps_edits() {
    let transport = ScriptedTransport::with_configs(json!({"cpus": 4}));

    let closed = run_session(
        &transport,
        RecordingView::declining(),
        vec![edit(ConfigProperty::Memory, 10240_i64), PaneEvent::Apply],
    )
    .await;

    assert_eq!(transport.commands(), vec!["getconfig"]);
    assert_eq!(closed.view.prompts.len(), 1);
    assert_eq!(closed.pane.tracker().len(), 1);
    assert_eq!(closed.pane.state(), &CommitState::Idle);
}

#[tokio::test]
async fn test_transport_failure_preserves_edits() {
    let transport = ScriptedTransport::with_configs(json!({"cpus": 4}));
    transport.reply_to("setconfig", Reply::Drop);

    let closed = run_session(
        &transport,
        RecordingView::accepting(),
        vec![
            edit(ConfigProperty::Cpus, 6_i64),
            edit(ConfigProperty::NoProxy, ""),
            PaneEvent::Apply,
        ],
    )
    .await;

    let commands = transport.commands();
    assert_eq!(count(&commands, "setconfig"), 1);
    assert_eq!(count(&commands, "unsetconfig"), 0);
    assert_eq!(count(&commands, "getconfig"), 1);

    assert_eq!(closed.pane.state(), &CommitState::Failed);
    assert_eq!(closed.pane.tracker().len(), 2);
    assert_eq!(closed.view.errors.len(), 1);
    assert_eq!(closed.view.errors[0].0, "Failed to apply configuration");
}

#[tokio::test]
async fn test_rejected_set_still_unsets() {
    let transport = ScriptedTransport::with_configs(json!({}));
    transport.reply_to(
        "setconfig",
        Reply::Json(json!({"Error": "Value '2' for configuration property 'cpus' is invalid"})),
    );

    let closed = run_session(
        &transport,
        RecordingView::accepting(),
        vec![
            edit(ConfigProperty::Cpus, 2_i64),
            edit(ConfigProperty::ProxyCaFile, ""),
            PaneEvent::Apply,
        ],
    )
    .await;

    let commands = transport.commands();
    assert_eq!(count(&commands, "setconfig"), 1);
    assert_eq!(count(&commands, "unsetconfig"), 1);

    assert_eq!(
        closed.view.errors,
        vec![(
            "Error".to_string(),
            "Value '2' for configuration property 'cpus' is invalid".to_string()
        )]
    );
    assert!(closed.pane.tracker().is_empty());
    assert_eq!(closed.pane.state(), &CommitState::Applied);
}

#[tokio::test]
async fn test_garbled_reply_reports_bad_response() {
    let transport = ScriptedTransport::with_configs(json!({}));
    transport.reply_to("setconfig", Reply::Raw("not json".to_string()));

    let closed = run_session(
        &transport,
        RecordingView::accepting(),
        vec![edit(ConfigProperty::Nameserver, "10.0.0.1"), PaneEvent::Apply],
    )
    .await;

    assert_eq!(
        closed.view.errors,
        vec![("Bad response".to_string(), "Undefined error".to_string())]
    );
}

#[tokio::test]
async fn test_unreachable_daemon_on_open() {
    let transport = ScriptedTransport::with_configs(json!({}));
    transport.reply_to("getconfig", Reply::Drop);

    let closed = run_session(&transport, RecordingView::accepting(), vec![]).await;

    assert!(closed.view.renders.is_empty());
    assert_eq!(
        closed.view.errors[0].0,
        "Did not receive any response from the daemon"
    );
    assert!(closed.pane.snapshot().is_none());
}

#[tokio::test]
async fn test_daemon_error_on_fetch_is_shown() {
    let transport = ScriptedTransport::with_configs(json!({}));
    transport.reply_to("getconfig", Reply::Json(json!({"Error": "config file is corrupt"})));

    let closed = run_session(&transport, RecordingView::accepting(), vec![]).await;

    assert_eq!(
        closed.view.errors,
        vec![("Error".to_string(), "config file is corrupt".to_string())]
    );
}

#[tokio::test]
async fn test_reload_discards_edits_and_refetches() {
    let transport = ScriptedTransport::with_configs(json!({"cpus": 4}));

    let closed = run_session(
        &transport,
        RecordingView::accepting(),
        vec![edit(ConfigProperty::Cpus, 8_i64), PaneEvent::Reload],
    )
    .await;

    assert_eq!(count(&transport.commands(), "getconfig"), 2);
    assert!(closed.pane.tracker().is_empty());
    // the first fetch is dropped if it lands after the reload started
    assert!(!closed.view.renders.is_empty());
    assert!(closed.pane.snapshot().is_some());
}

#[tokio::test]
async fn test_slow_initial_fetch_does_not_replace_refetch() {
    let transport = ScriptedTransport::with_configs(json!({"cpus": 6}));
    transport.reply_to(
        "getconfig",
        Reply::Delayed(
            Duration::from_millis(300),
            Box::new(Reply::Json(json!({"Error": "", "Configs": {"cpus": 4}}))),
        ),
    );

    let closed = run_session(
        &transport,
        RecordingView::accepting(),
        vec![edit(ConfigProperty::Cpus, 6_i64), PaneEvent::Apply],
    )
    .await;

    assert_eq!(count(&transport.commands(), "getconfig"), 2);
    assert_eq!(closed.pane.state(), &CommitState::Applied);
    let snapshot = closed.pane.snapshot().unwrap();
    assert_eq!(snapshot.get(ConfigProperty::Cpus), Some(&ConfigValue::Integer(6)));
    assert!(closed
        .view
        .renders
        .iter()
        .all(|r| r.get(ConfigProperty::Cpus) == Some(&ConfigValue::Integer(6))));
}

#[tokio::test]
async fn test_unset_transport_failure_preserves_edits() {
    let transport = ScriptedTransport::with_configs(json!({"cpus": 4}));
    transport.reply_to("unsetconfig", Reply::Drop);

    let closed = run_session(
        &transport,
        RecordingView::accepting(),
        vec![
            edit(ConfigProperty::Cpus, 6_i64),
            edit(ConfigProperty::HttpsProxy, ""),
            PaneEvent::Apply,
        ],
    )
    .await;

    let commands = transport.commands();
    assert_eq!(count(&commands, "setconfig"), 1);
    assert_eq!(count(&commands, "unsetconfig"), 1);
    assert_eq!(count(&commands, "getconfig"), 1);

    assert_eq!(closed.pane.state(), &CommitState::Failed);
    assert_eq!(closed.pane.tracker().len(), 2);
    assert_eq!(closed.pane.tracker().get(ConfigProperty::HttpsProxy), Some(&ConfigValue::from("")));
    assert_eq!(closed.view.errors.len(), 1);
    assert_eq!(closed.view.errors[0].0, "Failed to apply configuration");
}

#[tokio::test]
async fn test_rejected_unset_is_shown_and_applied() {
    let transport = ScriptedTransport::with_configs(json!({"proxy-ca-file": "/tmp/ca.pem"}));
    transport.reply_to(
        "unsetconfig",
        Reply::Json(json!({"Error": "proxy-ca-file is locked"})),
    );

    let closed = run_session(
        &transport,
        RecordingView::accepting(),
        vec![edit(ConfigProperty::ProxyCaFile, ""), PaneEvent::Apply],
    )
    .await;

    let commands = transport.commands();
    assert_eq!(count(&commands, "setconfig"), 0);
    assert_eq!(count(&commands, "unsetconfig"), 1);
    assert_eq!(count(&commands, "getconfig"), 2);

    assert_eq!(
        closed.view.errors,
        vec![("Error".to_string(), "proxy-ca-file is locked".to_string())]
    );
    assert!(closed.pane.tracker().is_empty());
    assert_eq!(closed.pane.state(), &CommitState::Applied);
}

#[tokio::test]
async fn test_panicking_commit_worker_fails_commit() {
    let transport = ScriptedTransport::with_configs(json!({"cpus": 4}));
    transport.reply_to("setconfig", Reply::Panic);

    let closed = run_session(
        &transport,
        RecordingView::accepting(),
        vec![edit(ConfigProperty::Cpus, 6_i64), PaneEvent::Apply],
    )
    .await;

    assert_eq!(closed.pane.state(), &CommitState::Failed);
    assert_eq!(closed.pane.tracker().len(), 1);
    assert_eq!(closed.view.errors.len(), 1);
    assert_eq!(closed.view.errors[0].0, "Failed to apply configuration");
    assert_eq!(count(&transport.commands(), "getconfig"), 1);
}

#[tokio::test]
async fn test_panicking_fetch_worker_reports_error() {
    let transport = ScriptedTransport::with_configs(json!({}));
    transport.reply_to("getconfig", Reply::Panic);

    let closed = run_session(&transport, RecordingView::accepting(), vec![]).await;

    assert!(closed.pane.snapshot().is_none());
    assert_eq!(
        closed.view.errors,
        vec![(
            "Did not receive any response from the daemon".to_string(),
            "Ensure the CRC daemon is running, for more information please check the logs".to_string()
        )]
    );
}

#[tokio::test]
async fn test_edit_with_wrong_kind_is_refused() {
    let transport = ScriptedTransport::with_configs(json!({}));

    let closed = run_session(
        &transport,
        RecordingView::accepting(),
        vec![edit(ConfigProperty::Cpus, ""), PaneEvent::Apply],
    )
    .await;

    assert_eq!(transport.commands(), vec!["getconfig"]);
    assert_eq!(
        closed.view.errors,
        vec![(
            "Cannot change configuration".to_string(),
            "cpus expects integer values".to_string()
        )]
    );
    assert!(closed.pane.tracker().is_empty());
}
