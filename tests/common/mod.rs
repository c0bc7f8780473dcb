//! Shared fixtures for integration tests: belief sets, a mock reasoning
//! service served over HTTP, and scripted in-process services.

#![allow(dead_code)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};

use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use crossbeam_channel::{unbounded, Receiver, Sender};
use serde_json::{json, Value};

use cheemera::{
    Belief, BeliefSet, BeliefSetCatalog, BeliefSetFile, Consequence, ExploreResult, Property,
    ReasoningService, Scenario, TransportError,
};

pub const RULE_ID: &str = "belief-a-implies-b";

/// One IF_THEN belief: A implies B.
pub fn a_implies_b() -> BeliefSet {
    BeliefSet::new("A implies B")
        .with_owner("tests")
        .with_version("1")
        .with_belief(
            Belief::new(
                RULE_ID,
                Scenario::if_then(
                    vec![Property::positive("A")],
                    vec![Consequence::always(vec![Property::positive("B")])],
                ),
            )
            .with_origin("manual", "00000000-0000-0000-0000-000000000001"),
        )
}

pub fn catalog() -> BeliefSetCatalog {
    BeliefSetCatalog::new(vec![
        BeliefSetFile::new("a_implies_b.json", a_implies_b()),
        BeliefSetFile::new("empty.json", BeliefSet::new("empty")),
    ])
    .unwrap()
}

/// The reasoning-service payload for exploring `A` against [`a_implies_b`].
pub fn apply_rule_payload() -> Value {
    json!({
        "resultCode": "OK",
        "resultReason": "",
        "results": {
            "possible": true,
            "reasoningSteps": [{
                "inferenceStepType": "ApplyRule",
                "deducedProperty": [{ "sentence": "B", "valence": true }],
                "sourceBeliefId": RULE_ID
            }],
            "arrayOfSecondaryResidues": []
        }
    })
}

/// How the mock answers one request.
#[derive(Debug, Clone)]
pub enum Reply {
    Json(Value),
    Status(u16),
    Body(&'static str),
}

fn respond(reply: &Reply) -> Response {
    match reply {
        Reply::Json(value) => Json(value.clone()).into_response(),
        Reply::Status(code) => (
            StatusCode::from_u16(*code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            Json(json!({ "error": "mock failure" })),
        )
            .into_response(),
        Reply::Body(text) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "application/json")],
            *text,
        )
            .into_response(),
    }
}

/// Serves `router` on an ephemeral loopback port from a helper thread.
pub struct TestServer {
    pub addr: SocketAddr,
    stop: Option<tokio::sync::oneshot::Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl TestServer {
    pub fn start(router: Router) -> Self {
        let (addr_tx, addr_rx) = std::sync::mpsc::channel();
        let (stop_tx, stop_rx) = tokio::sync::oneshot::channel::<()>();

        let handle = thread::spawn(move || {
            let runtime = tokio::runtime::Builder::new_multi_thread()
                .worker_threads(2)
                .enable_all()
                .build()
                .unwrap();
            runtime.block_on(async move {
                let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
                addr_tx.send(listener.local_addr().unwrap()).unwrap();
                axum::serve(listener, router)
                    .with_graceful_shutdown(async {
                        let _ = stop_rx.await;
                    })
                    .await
                    .unwrap();
            });
        });

        let addr = addr_rx.recv().unwrap();
        Self {
            addr,
            stop: Some(stop_tx),
            handle: Some(handle),
        }
    }

    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(stop) = self.stop.take() {
            let _ = stop.send(());
        }
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

/// Mock reasoning service: answers `/exploreBeliefSet` with scripted
/// replies (the last one repeats) and records every request body.
pub struct MockReasoner {
    pub server: TestServer,
    pub requests: Receiver<Value>,
}

impl MockReasoner {
    pub fn start(replies: Vec<Reply>) -> Self {
        assert!(!replies.is_empty());
        let replies = Arc::new(replies);
        let served = Arc::new(AtomicUsize::new(0));
        let (req_tx, req_rx) = unbounded();

        let handler = move |Json(body): Json<Value>| async move {
            let _ = req_tx.send(body);
            let n = served.fetch_add(1, Ordering::SeqCst);
            respond(&replies[n.min(replies.len() - 1)])
        };
        let router = Router::new().route("/exploreBeliefSet", post(handler));

        Self {
            server: TestServer::start(router),
            requests: req_rx,
        }
    }

    pub fn url(&self) -> String {
        self.server.url()
    }
}

/// In-process service whose calls block until the test opens their gate.
///
/// A call blocks while any explored sentence has a gate; every answer
/// lists the explored sentences in `resultReason` so tests can tell
/// responses apart.
pub struct GatedService {
    gates: Mutex<HashMap<String, Receiver<()>>>,
}

impl GatedService {
    pub fn new() -> Self {
        Self {
            gates: Mutex::new(HashMap::new()),
        }
    }

    /// Holds calls exploring `sentence` until the returned sender fires
    /// (once per call) or is dropped.
    pub fn gate(&self, sentence: &str) -> Sender<()> {
        let (tx, rx) = unbounded();
        self.gates.lock().unwrap().insert(sentence.to_string(), rx);
        tx
    }
}

impl ReasoningService for GatedService {
    fn explore(
        &self,
        _belief_set: &BeliefSet,
        properties: &[Property],
    ) -> Result<ExploreResult, TransportError> {
        let gates: Vec<Receiver<()>> = {
            let map = self.gates.lock().unwrap();
            properties
                .iter()
                .filter_map(|p| map.get(&p.sentence).cloned())
                .collect()
        };
        for gate in gates {
            let _ = gate.recv();
        }
        let sentences: Vec<&str> = properties.iter().map(|p| p.sentence.as_str()).collect();
        let mut result = ExploreResult::ok(true, Vec::new());
        result.result_reason = sentences.join(",");
        Ok(result)
    }
}
