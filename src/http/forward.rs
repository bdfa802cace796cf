//! Single-origin forwarding primitive.
//!
//! # Responsibilities
//! - Rewrite the request URI onto the fixed upstream origin, preserving path
//!   and query
//! - Strip hop-by-hop headers before handoff
//! - Record the caller in X-Forwarded-For / X-Forwarded-Proto
//! - Stream the upstream response back unmodified
//!
//! # Design Decisions
//! - One shared pooled client for the process; per-request state lives in the
//!   request itself
//! - Upstream transport failures surface as 502, never as a crash

use axum::body::Body;
use axum::http::uri::{Authority, PathAndQuery, Scheme};
use axum::http::{header, HeaderMap, HeaderName, HeaderValue, Request, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use hyper_tls::HttpsConnector;
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::client::legacy::Client;
use hyper_util::rt::TokioExecutor;
use std::net::IpAddr;
use url::Url;

static X_FORWARDED_FOR: HeaderName = HeaderName::from_static("x-forwarded-for");
static X_FORWARDED_PROTO: HeaderName = HeaderName::from_static("x-forwarded-proto");

/// Pooled HTTP client used for all upstream requests.
pub type ProxyClient = Client<HttpsConnector<HttpConnector>, Body>;

/// Build the shared upstream client.
pub fn build_client() -> ProxyClient {
    Client::builder(TokioExecutor::new()).build(HttpsConnector::new())
}

/// Scheme and authority of the upstream origin, precomputed once at startup.
#[derive(Debug, Clone)]
pub struct UpstreamTarget {
    scheme: Scheme,
    authority: Authority,
}

impl TryFrom<&Url> for UpstreamTarget {
    type Error = axum::http::Error;

    fn try_from(url: &Url) -> Result<Self, Self::Error> {
        let scheme = Scheme::try_from(url.scheme())?;
        let host = url.host_str().unwrap_or_default();
        let authority = match url.port() {
            Some(port) => format!("{}:{}", host, port),
            None => host.to_string(),
        };
        let authority = Authority::try_from(authority.as_str())?;
        Ok(Self { scheme, authority })
    }
}

impl std::fmt::Display for UpstreamTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}://{}", self.scheme, self.authority)
    }
}

/// Forward one request to the upstream origin and return its response.
pub async fn send(
    client: &ProxyClient,
    target: &UpstreamTarget,
    peer: IpAddr,
    proto: &'static str,
    mut request: Request<Body>,
) -> Response {
    strip_hop_by_hop(request.headers_mut());
    record_forwarding(request.headers_mut(), peer, proto);
    rewrite_uri(&mut request, target);

    match client.request(request).await {
        Ok(response) => response.map(Body::new).into_response(),
        Err(error) => {
            tracing::error!(upstream = %target, error = %error, "Upstream request failed");
            (StatusCode::BAD_GATEWAY, "Upstream request failed").into_response()
        }
    }
}

/// Point the request URI at the upstream origin, keeping path and query.
fn rewrite_uri(request: &mut Request<Body>, target: &UpstreamTarget) {
    let mut parts = request.uri().clone().into_parts();
    parts.scheme = Some(target.scheme.clone());
    parts.authority = Some(target.authority.clone());
    if parts.path_and_query.is_none() {
        parts.path_and_query = Some(PathAndQuery::from_static("/"));
    }
    if let Ok(uri) = Uri::from_parts(parts) {
        *request.uri_mut() = uri;
    }
}

/// Remove Connection-scoped headers that must not travel past one hop.
fn strip_hop_by_hop(headers: &mut HeaderMap) {
    let connection_named: Vec<HeaderName> = headers
        .get_all(header::CONNECTION)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(','))
        .filter_map(|name| HeaderName::try_from(name.trim()).ok())
        .collect();
    for name in connection_named {
        headers.remove(&name);
    }

    headers.remove(header::CONNECTION);
    headers.remove(HeaderName::from_static("keep-alive"));
    headers.remove(HeaderName::from_static("proxy-connection"));
    headers.remove(header::TE);
    headers.remove(header::TRAILER);
    headers.remove(header::TRANSFER_ENCODING);
    headers.remove(header::UPGRADE);
}

/// Append the caller to X-Forwarded-For and stamp X-Forwarded-Proto.
fn record_forwarding(headers: &mut HeaderMap, peer: IpAddr, proto: &'static str) {
    let forwarded_for = match headers
        .get(&X_FORWARDED_FOR)
        .and_then(|value| value.to_str().ok())
    {
        Some(prior) => format!("{}, {}", prior, peer),
        None => peer.to_string(),
    };
    if let Ok(value) = HeaderValue::from_str(&forwarded_for) {
        headers.insert(&X_FORWARDED_FOR, value);
    }
    headers.insert(&X_FORWARDED_PROTO, HeaderValue::from_static(proto));
}
