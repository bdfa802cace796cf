//! Gateway router and request handler.
//!
//! # Responsibilities
//! - Build the axum Router for the primary listener
//! - Resolve caller identity and annotate the request (separate stage)
//! - Hand the annotated request to the forwarding primitive
//! - Wire up middleware (tracing, request ID)
//!
//! # Design Decisions
//! - Resolution and header injection are distinct stages so each is testable
//!   on its own; annotation always falls through to forwarding
//! - Identity is resolved inline within the request being handled; concurrent
//!   requests resolve independently

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use axum::body::Body;
use axum::extract::{ConnectInfo, State};
use axum::http::Request;
use axum::response::Response;
use axum::routing::any;
use axum::Router;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

use crate::http::forward::{self, ProxyClient, UpstreamTarget};
use crate::identity::headers::apply_identity;
use crate::identity::IdentityResolver;
use crate::observability::metrics;

/// Application state injected into the gateway handler.
#[derive(Clone)]
pub struct AppState {
    /// Shared upstream client.
    pub client: ProxyClient,
    /// The single origin all requests forward to.
    pub upstream: UpstreamTarget,
    /// Identity lookup seam.
    pub resolver: Arc<dyn IdentityResolver>,
    /// Whether identity headers are injected at all.
    pub auth_headers: bool,
    /// Scheme of the primary listener, recorded as X-Forwarded-Proto.
    pub proto: &'static str,
}

/// Build the router served on the primary listener.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/{*path}", any(gateway_handler))
        .route("/", any(gateway_handler))
        .with_state(state)
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
}

/// Annotate-then-forward handler for every method and path.
async fn gateway_handler(
    State(state): State<AppState>,
    ConnectInfo(remote): ConnectInfo<SocketAddr>,
    mut request: Request<Body>,
) -> Response {
    let started = Instant::now();
    let method = request.method().clone();

    if state.auth_headers {
        annotate(state.resolver.as_ref(), remote, &mut request).await;
    }

    let response = forward::send(
        &state.client,
        &state.upstream,
        remote.ip(),
        state.proto,
        request,
    )
    .await;

    metrics::record_request(&method, response.status(), started);
    response
}

/// Resolution stage followed by the injection stage.
///
/// A failed lookup leaves the request untouched; the request always proceeds
/// to forwarding either way.
async fn annotate(resolver: &dyn IdentityResolver, remote: SocketAddr, request: &mut Request<Body>) {
    match resolver.resolve(remote).await {
        Some(identity) => {
            apply_identity(request.headers_mut(), &identity);
            tracing::debug!(
                peer_addr = %remote,
                login = %identity.login_name,
                "Annotated request with caller identity"
            );
        }
        None => {
            tracing::debug!(peer_addr = %remote, "No identity for peer, forwarding unannotated");
        }
    }
}
