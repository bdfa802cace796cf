//! meshgate
//!
//! An identity-aware reverse proxy gateway built with Tokio and Axum.
//!
//! # Architecture Overview
//!
//! ```text
//!                    ┌───────────────────────────────────────────────┐
//!                    │                   MESHGATE                    │
//!                    │                                               │
//!   Overlay/Funnel   │  ┌─────────┐   ┌──────────┐   ┌────────────┐ │
//!   ────────────────►│  │   net   │──►│ identity │──►│    http    │ │──► Upstream
//!                    │  │listener │   │ annotate │   │  forward   │ │    Origin
//!                    │  └─────────┘   └────┬─────┘   └────────────┘ │
//!                    │                     │ whois                  │
//!                    │                ┌────▼─────┐                  │
//!                    │                │ overlay  │ local API        │
//!                    │                │  daemon  │                  │
//!                    │                └──────────┘                  │
//!                    │                                               │
//!   HTTP (redirect)  │  ┌──────────────────┐                        │
//!   ────────────────►│  │ redirect 302 →   │                        │
//!                    │  │ https primary    │                        │
//!                    │  └──────────────────┘                        │
//!                    └───────────────────────────────────────────────┘
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{ArgAction, Parser};
use url::Url;

use meshgate::config::GatewayConfig;
use meshgate::lifecycle::{signals, Gateway, Shutdown};
use meshgate::observability::{logging, metrics};

#[derive(Parser, Debug)]
#[command(name = "meshgate", version)]
#[command(about = "Identity-aware reverse proxy gateway for a private mesh overlay")]
struct Cli {
    /// Name this node advertises on the overlay.
    #[arg(long, env = "MESHGATE_HOSTNAME", default_value = "meshgate")]
    hostname: String,

    /// Port for the primary listener.
    #[arg(long, env = "MESHGATE_PORT", default_value_t = 443)]
    port: u16,

    /// Directory where the overlay daemon keeps credentials for this node.
    #[arg(long, env = "MESHGATE_STATE_DIR", default_value = "state")]
    state_dir: PathBuf,

    /// Overlay enrollment key. Unset means interactive enrollment.
    #[arg(long, env = "MESHGATE_AUTH_KEY")]
    auth_key: Option<String>,

    /// URL of the upstream service to proxy HTTP requests to
    /// (e.g., http://localhost:8080).
    #[arg(long, env = "MESHGATE_UPSTREAM")]
    upstream: Url,

    /// Serve the primary listener with overlay-terminated TLS.
    #[arg(long, env = "MESHGATE_TLS", default_value_t = true, action = ArgAction::Set)]
    tls: bool,

    /// Expose the service to the public internet through the overlay funnel.
    #[arg(long, env = "MESHGATE_FUNNEL", default_value_t = false, action = ArgAction::Set)]
    funnel: bool,

    /// Add identity headers to forwarded requests.
    #[arg(long, env = "MESHGATE_AUTH_HEADERS", default_value_t = true, action = ArgAction::Set)]
    auth_headers: bool,

    /// Redirect HTTP to HTTPS from a secondary listener.
    #[arg(long, env = "MESHGATE_REDIRECT", default_value_t = false, action = ArgAction::Set)]
    redirect: bool,

    /// Port to listen on for http requests to redirect.
    #[arg(long, env = "MESHGATE_REDIRECT_PORT", default_value_t = 80)]
    redirect_port: u16,

    /// Base URL of the overlay daemon's local API.
    #[arg(long, env = "MESHGATE_OVERLAY_API", default_value = "http://127.0.0.1:4180")]
    overlay_api: Url,

    /// Bind address for the Prometheus exporter. Unset disables metrics.
    #[arg(long, env = "MESHGATE_METRICS_ADDRESS")]
    metrics_address: Option<SocketAddr>,

    /// Log filter applied when RUST_LOG is unset.
    #[arg(long, env = "MESHGATE_LOG_LEVEL", default_value = "info")]
    log_level: String,
}

impl Cli {
    fn into_config(self) -> GatewayConfig {
        GatewayConfig {
            hostname: self.hostname,
            port: self.port,
            state_dir: self.state_dir,
            auth_key: self.auth_key,
            upstream: self.upstream,
            tls: self.tls,
            funnel: self.funnel,
            auth_headers: self.auth_headers,
            redirect: self.redirect,
            redirect_port: self.redirect_port,
            overlay_api: self.overlay_api,
            metrics_address: self.metrics_address,
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(&cli.log_level);

    let config = cli.into_config();
    if let Some(addr) = config.metrics_address {
        metrics::init_metrics(addr);
    }

    let shutdown = Shutdown::new();
    let running = match Gateway::new(config).start(&shutdown).await {
        Ok(running) => running,
        Err(error) => {
            tracing::error!(error = %error, "Gateway startup failed");
            return ExitCode::FAILURE;
        }
    };

    let signal_shutdown = shutdown.clone();
    tokio::spawn(async move {
        signals::wait_for_termination().await;
        signal_shutdown.trigger();
    });

    running.wait().await;
    ExitCode::SUCCESS
}
