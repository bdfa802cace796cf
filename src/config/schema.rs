//! Configuration schema definitions.

use std::net::SocketAddr;
use std::path::PathBuf;

use url::Url;

/// Immutable gateway configuration, built once at startup.
///
/// Constructed from CLI flags (with environment fallbacks) in the binary and
/// handed by reference to every subsystem. Nothing mutates it after
/// [`validate`](crate::config::validation::validate) has accepted it.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Name this node advertises on the overlay.
    pub hostname: String,

    /// Port for the primary (proxied) listener.
    pub port: u16,

    /// Directory where the overlay daemon keeps credentials and TLS material.
    pub state_dir: PathBuf,

    /// Non-interactive overlay enrollment secret. None means interactive
    /// enrollment is required.
    pub auth_key: Option<String>,

    /// Absolute URL of the single backend origin all requests forward to.
    pub upstream: Url,

    /// Serve the primary listener with overlay-terminated TLS.
    pub tls: bool,

    /// Expose the primary listener to the public internet through the
    /// overlay's funnel. Wins over `tls` when both are set.
    pub funnel: bool,

    /// Inject identity headers into forwarded requests.
    pub auth_headers: bool,

    /// Run the secondary HTTP→HTTPS redirect listener.
    pub redirect: bool,

    /// Port for the redirect listener.
    pub redirect_port: u16,

    /// Base URL of the overlay daemon's local API.
    pub overlay_api: Url,

    /// Bind address for the Prometheus exporter. None disables metrics.
    pub metrics_address: Option<SocketAddr>,
}
