//! HTTP→HTTPS redirect responder.
//!
//! # Responsibilities
//! - Resolve this node's overlay DNS name once at startup
//! - Answer every request on the redirect port with 302 to the primary
//!   HTTPS endpoint
//!
//! # Design Decisions
//! - Best effort: a failed self-status query or bind logs and skips the
//!   responder; the primary listener is never affected

use std::net::SocketAddr;

use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Router;
use axum_server::Handle;
use tokio::task::JoinHandle;

use crate::config::GatewayConfig;
use crate::net::listener::{self, ListenerMode};
use crate::overlay::OverlayClient;

/// Redirect target for a node with the given overlay DNS name.
///
/// The overlay reports DNS names with a trailing dot, which is stripped.
pub fn redirect_target(dns_name: &str, primary_port: u16) -> String {
    format!(
        "https://{}:{}/",
        dns_name.trim_end_matches('.'),
        primary_port
    )
}

/// Build the router served on the redirect listener.
pub fn build_router(target: String) -> Router {
    Router::new().fallback(redirect_all).with_state(target)
}

/// Answers any method on any path with a 302 to the primary endpoint.
async fn redirect_all(State(target): State<String>) -> Response {
    (StatusCode::FOUND, [(header::LOCATION, target)]).into_response()
}

/// Start the redirect responder if it can be provisioned.
///
/// Returns the bound address and serve task, or None when the self-status
/// query or the bind fails; both are logged and non-fatal.
pub async fn start(
    config: &GatewayConfig,
    overlay: &OverlayClient,
    primary_port: u16,
    handle: Handle,
) -> Option<(SocketAddr, JoinHandle<()>)> {
    let status = match overlay.self_status().await {
        Ok(status) => status,
        Err(error) => {
            tracing::error!(error = %error, "Self status query failed, redirect listener not started");
            return None;
        }
    };

    let bound = match listener::provision(
        ListenerMode::Plain,
        config.redirect_port,
        config,
        overlay,
    )
    .await
    {
        Ok(bound) => bound,
        Err(error) => {
            tracing::error!(error = %error, "Redirect listener not started");
            return None;
        }
    };

    let target = redirect_target(&status.dns_name, primary_port);
    let local_addr = bound.local_addr();
    tracing::info!(
        address = %local_addr,
        target = %target,
        "Redirect listener started"
    );

    let app = build_router(target);
    let task = tokio::spawn(async move {
        if let Err(error) = bound.serve(app, handle).await {
            tracing::error!(error = %error, "Redirect serve loop exited");
        }
    });

    Some((local_addr, task))
}
