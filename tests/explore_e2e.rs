//! End-to-end exploration against a mock reasoning service over HTTP.

mod common;

use std::sync::Arc;
use std::time::Duration;

use cheemera::{
    ClientConfig, ExploreResult, Explorer, HttpExploreClient, Property, ReasoningService,
    SessionConfig, TabStatus, TransportError,
};
use common::{a_implies_b, apply_rule_payload, catalog, MockReasoner, Reply, RULE_ID};

const WAIT: Duration = Duration::from_secs(10);

fn explorer_for(mock: &MockReasoner) -> Explorer {
    let client = HttpExploreClient::new(ClientConfig::new(mock.url())).unwrap();
    let mut explorer = Explorer::new(catalog(), Arc::new(client), SessionConfig::default()).unwrap();
    assert!(explorer.select("a_implies_b.json"));
    explorer
}

#[test]
fn test_if_then_rule_resolves_through_http() {
    let mock = MockReasoner::start(vec![Reply::Json(apply_rule_payload())]);
    let mut explorer = explorer_for(&mock);
    let tab = explorer.sessions().active_id();

    let trigger = explorer.sessions_mut().add_selector(tab, Some("A"));
    assert!(trigger.is_issued());
    assert!(explorer.sessions().tab(tab).unwrap().is_loading());
    assert!(explorer.sessions_mut().wait_idle(WAIT));

    let settled = explorer.sessions().tab(tab).unwrap();
    assert_eq!(settled.status, TabStatus::Resolved);
    assert!(!settled.is_loading());

    let expected: ExploreResult = serde_json::from_value(apply_rule_payload()).unwrap();
    let result = settled.result.as_ref().unwrap();
    assert_eq!(result, &expected);
    assert!(result.is_ok());
    assert!(result.possible());
    assert_eq!(
        result.deduced_properties().collect::<Vec<_>>(),
        vec![&Property::positive("B")]
    );
    assert_eq!(
        explorer.step_source(tab, 0).map(|b| b.belief_unique_id.as_str()),
        Some(RULE_ID)
    );
}

#[test]
fn test_request_carries_belief_set_and_properties() {
    let mock = MockReasoner::start(vec![Reply::Json(apply_rule_payload())]);
    let mut explorer = explorer_for(&mock);
    let tab = explorer.sessions().active_id();

    explorer.sessions_mut().add_selector(tab, Some("A"));
    assert!(explorer.sessions_mut().wait_idle(WAIT));

    let body = mock.requests.recv_timeout(WAIT).unwrap();
    assert_eq!(body["beliefSet"]["beliefSetName"], "A implies B");
    assert_eq!(
        body["beliefSet"]["beliefs"][0]["beliefUniqueId"],
        RULE_ID
    );
    assert_eq!(
        body["explore"],
        serde_json::json!([{ "sentence": "A", "valence": true }])
    );
}

#[test]
fn test_server_error_marks_fresh_tab_failed() {
    let mock = MockReasoner::start(vec![Reply::Status(500)]);
    let mut explorer = explorer_for(&mock);
    let tab = explorer.sessions().active_id();

    explorer.sessions_mut().add_selector(tab, Some("A"));
    assert!(explorer.sessions_mut().wait_idle(WAIT));

    let settled = explorer.sessions().tab(tab).unwrap();
    assert_eq!(settled.status, TabStatus::Failed);
    assert!(!settled.is_loading());
    assert!(settled.result.is_none());
    assert!(settled.last_error.as_deref().is_some_and(|e| e.contains("500")));
}

#[test]
fn test_server_error_keeps_previous_result() {
    let mock = MockReasoner::start(vec![
        Reply::Json(apply_rule_payload()),
        Reply::Status(500),
    ]);
    let mut explorer = explorer_for(&mock);
    let tab = explorer.sessions().active_id();

    explorer.sessions_mut().add_selector(tab, Some("A"));
    assert!(explorer.sessions_mut().wait_idle(WAIT));
    let before = explorer.sessions().tab(tab).unwrap().result.clone();
    assert!(before.is_some());

    explorer.sessions_mut().add_selector(tab, Some("B"));
    assert!(explorer.sessions_mut().wait_idle(WAIT));

    let settled = explorer.sessions().tab(tab).unwrap();
    assert_eq!(settled.status, TabStatus::Failed);
    assert_eq!(settled.result, before);
    assert_eq!(settled.selectors.len(), 2);
}

#[test]
fn test_malformed_body_is_reported() {
    let mock = MockReasoner::start(vec![Reply::Body("{ not json")]);
    let client = HttpExploreClient::new(ClientConfig::new(mock.url())).unwrap();

    let err = client
        .explore(&a_implies_b(), &[Property::positive("A")])
        .unwrap_err();
    assert!(matches!(err, TransportError::MalformedResponse { .. }));
    assert!(!err.is_retryable());
}

#[test]
fn test_rejected_status_is_surfaced() {
    let mock = MockReasoner::start(vec![Reply::Status(503)]);
    let client = HttpExploreClient::new(ClientConfig::new(mock.url())).unwrap();

    let err = client
        .explore(&a_implies_b(), &[Property::positive("A")])
        .unwrap_err();
    assert_eq!(err, TransportError::Rejected { status: 503 });
    assert_eq!(err.status(), Some(503));
}

#[test]
fn test_reselecting_discards_tabs_and_results() {
    let mock = MockReasoner::start(vec![Reply::Json(apply_rule_payload())]);
    let mut explorer = explorer_for(&mock);
    let tab = explorer.sessions().active_id();
    explorer.sessions_mut().add_selector(tab, Some("A"));
    assert!(explorer.sessions_mut().wait_idle(WAIT));
    explorer.sessions_mut().create_tab();

    assert!(explorer.select("empty.json"));

    let tabs = explorer.sessions().tabs();
    assert_eq!(tabs.len(), 1);
    assert_eq!(tabs[0].name, "Explore 1");
    assert!(tabs[0].selectors.is_empty());
    assert!(tabs[0].result.is_none());
    assert!(explorer.sentences().is_empty());
}
