//! Shared mock services for integration testing.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::{Request, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::json;

use meshgate::PeerIdentity;

/// One request as observed by the mock upstream.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub uri: String,
    pub headers: HashMap<String, String>,
}

pub type Recorded = Arc<Mutex<Vec<RecordedRequest>>>;

/// Start an upstream that records every request and answers 200 with a fixed
/// body and marker header.
pub async fn start_recording_upstream() -> (SocketAddr, Recorded) {
    let recorded: Recorded = Arc::new(Mutex::new(Vec::new()));
    let app = Router::new()
        .fallback(record_handler)
        .with_state(recorded.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (addr, recorded)
}

async fn record_handler(State(recorded): State<Recorded>, request: Request<Body>) -> Response {
    let headers = request
        .headers()
        .iter()
        .map(|(name, value)| {
            (
                name.as_str().to_string(),
                String::from_utf8_lossy(value.as_bytes()).to_string(),
            )
        })
        .collect();

    recorded.lock().unwrap().push(RecordedRequest {
        method: request.method().to_string(),
        uri: request.uri().to_string(),
        headers,
    });

    (
        StatusCode::OK,
        [("x-upstream", "reached")],
        "upstream response body",
    )
        .into_response()
}

/// Scripted overlay daemon backing the gateway's local API calls.
#[derive(Debug, Default)]
pub struct MockOverlay {
    /// Identity returned for every whois lookup; None answers 404.
    pub identity: Option<PeerIdentity>,
    /// DNS name reported by the self-status endpoint.
    pub dns_name: String,
    /// Ports the gateway asked to expose publicly.
    pub funnel_requests: Mutex<Vec<u16>>,
}

/// Start the mock overlay daemon and return its local API address.
pub async fn start_mock_overlay(overlay: Arc<MockOverlay>) -> SocketAddr {
    let app = Router::new()
        .route("/v0/register", post(register))
        .route("/v0/whois", get(whois))
        .route("/v0/status/self", get(self_status))
        .route("/v0/funnel/{port}", post(funnel))
        .with_state(overlay);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    addr
}

async fn register() -> Json<serde_json::Value> {
    Json(json!({ "auth_url": null }))
}

async fn whois(State(overlay): State<Arc<MockOverlay>>) -> Response {
    match &overlay.identity {
        Some(identity) => Json(identity.clone()).into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn self_status(State(overlay): State<Arc<MockOverlay>>) -> Json<serde_json::Value> {
    Json(json!({ "dns_name": overlay.dns_name }))
}

async fn funnel(State(overlay): State<Arc<MockOverlay>>, Path(port): Path<u16>) -> StatusCode {
    overlay.funnel_requests.lock().unwrap().push(port);
    StatusCode::OK
}
