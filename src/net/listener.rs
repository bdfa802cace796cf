//! Listener mode selection and provisioning.
//!
//! # Responsibilities
//! - Pick the listener mode from the funnel/tls flags
//! - Bind exactly one listener for the requested mode and port
//! - Enable public funnel ingress through the overlay daemon when asked
//!
//! # Design Decisions
//! - Funnel wins over the tls flag: public exposure always terminates TLS
//! - Provisioning failures carry the requested mode and port; the caller
//!   decides whether they are fatal (primary) or best-effort (redirect)

use std::net::SocketAddr;

use axum::Router;
use axum_server::tls_rustls::RustlsConfig;
use axum_server::Handle;
use thiserror::Error;

use crate::config::GatewayConfig;
use crate::net::tls;
use crate::overlay::{OverlayClient, OverlayError};

/// How a listener faces the network.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListenerMode {
    /// Cleartext HTTP, reachable from the overlay only.
    Plain,
    /// Overlay-terminated TLS, reachable from the overlay only.
    Tls,
    /// Overlay-terminated TLS, exposed to the public internet.
    Funnel,
}

impl ListenerMode {
    /// Select the mode for the primary listener. Funnel implies public TLS
    /// termination and takes precedence over the plain tls flag.
    pub fn select(funnel: bool, tls: bool) -> Self {
        if funnel {
            ListenerMode::Funnel
        } else if tls {
            ListenerMode::Tls
        } else {
            ListenerMode::Plain
        }
    }

    /// Scheme clients use to reach a listener of this mode.
    pub fn scheme(&self) -> &'static str {
        match self {
            ListenerMode::Plain => "http",
            ListenerMode::Tls | ListenerMode::Funnel => "https",
        }
    }
}

impl std::fmt::Display for ListenerMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ListenerMode::Plain => write!(f, "plain"),
            ListenerMode::Tls => write!(f, "tls"),
            ListenerMode::Funnel => write!(f, "funnel"),
        }
    }
}

/// Error type for listener provisioning.
#[derive(Debug, Error)]
pub enum ListenError {
    #[error("failed to bind {mode} listener on port {port}: {source}")]
    Bind {
        mode: ListenerMode,
        port: u16,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to load TLS material for {mode} listener on port {port}: {source}")]
    Tls {
        mode: ListenerMode,
        port: u16,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to enable public funnel on port {port}: {source}")]
    Funnel {
        port: u16,
        #[source]
        source: OverlayError,
    },
}

/// One bound inbound listener, plus the TLS material its mode requires.
///
/// Owned by the gateway runtime for its lifetime and closed exactly once via
/// the serve handle on shutdown.
pub struct BoundListener {
    mode: ListenerMode,
    local_addr: SocketAddr,
    listener: std::net::TcpListener,
    tls: Option<RustlsConfig>,
}

impl BoundListener {
    /// Mode this listener was provisioned with.
    pub fn mode(&self) -> ListenerMode {
        self.mode
    }

    /// Address this listener is bound to.
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Serve `app` on this listener until the handle shuts it down.
    ///
    /// New accepts stop when the handle fires; in-flight requests finish
    /// naturally.
    pub async fn serve(self, app: Router, handle: Handle) -> Result<(), std::io::Error> {
        let make_service = app.into_make_service_with_connect_info::<SocketAddr>();
        match self.tls {
            Some(tls) => {
                axum_server::from_tcp_rustls(self.listener, tls)
                    .handle(handle)
                    .serve(make_service)
                    .await
            }
            None => {
                axum_server::from_tcp(self.listener)
                    .handle(handle)
                    .serve(make_service)
                    .await
            }
        }
    }
}

/// Acquire one inbound listener of the requested mode on `port`.
///
/// Funnel mode first asks the overlay daemon for public exposure; tls and
/// funnel modes load the certificate pair the daemon maintains in the state
/// directory.
pub async fn provision(
    mode: ListenerMode,
    port: u16,
    config: &GatewayConfig,
    overlay: &OverlayClient,
) -> Result<BoundListener, ListenError> {
    if mode == ListenerMode::Funnel {
        overlay
            .enable_funnel(port)
            .await
            .map_err(|source| ListenError::Funnel { port, source })?;
    }

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|source| ListenError::Bind { mode, port, source })?;
    let local_addr = listener
        .local_addr()
        .map_err(|source| ListenError::Bind { mode, port, source })?;
    let listener = listener
        .into_std()
        .map_err(|source| ListenError::Bind { mode, port, source })?;

    let tls = match mode {
        ListenerMode::Plain => None,
        ListenerMode::Tls | ListenerMode::Funnel => Some(
            tls::load_overlay_certs(&config.state_dir, &config.hostname)
                .await
                .map_err(|source| ListenError::Tls { mode, port, source })?,
        ),
    };

    tracing::info!(
        address = %local_addr,
        mode = %mode,
        "Listener bound"
    );

    Ok(BoundListener {
        mode,
        local_addr,
        listener,
        tls,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_funnel_wins_regardless_of_tls_flag() {
        assert_eq!(ListenerMode::select(true, true), ListenerMode::Funnel);
        assert_eq!(ListenerMode::select(true, false), ListenerMode::Funnel);
    }

    #[test]
    fn test_tls_when_funnel_disabled() {
        assert_eq!(ListenerMode::select(false, true), ListenerMode::Tls);
    }

    #[test]
    fn test_plain_when_both_disabled() {
        assert_eq!(ListenerMode::select(false, false), ListenerMode::Plain);
    }

    #[test]
    fn test_scheme_per_mode() {
        assert_eq!(ListenerMode::Plain.scheme(), "http");
        assert_eq!(ListenerMode::Tls.scheme(), "https");
        assert_eq!(ListenerMode::Funnel.scheme(), "https");
    }
}
