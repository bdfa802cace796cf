//! Gateway runtime orchestration.
//!
//! # Responsibilities
//! - Validate configuration and enroll with the overlay daemon
//! - Provision the primary listener (fatal on failure)
//! - Start the redirect responder (best effort)
//! - Run both serve loops until shutdown, then stop them cleanly
//!
//! # Design Decisions
//! - Fail fast: any error before the Listening state is fatal to startup
//! - The process is considered up the moment the primary serve loop starts
//! - The serve handles are the sole cancellation primitive; closing them
//!   stops new accepts while in-flight requests finish naturally

use std::net::SocketAddr;
use std::sync::Arc;

use axum_server::Handle;
use thiserror::Error;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

use crate::config::{validation, ConfigError, GatewayConfig};
use crate::http::forward::{self, UpstreamTarget};
use crate::http::{build_router, redirect, AppState};
use crate::lifecycle::Shutdown;
use crate::net::listener::{self, ListenError, ListenerMode};
use crate::overlay::{OverlayClient, OverlayError};

/// Error type for fatal startup failures.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Listen(#[from] ListenError),

    #[error("overlay enrollment failed: {0}")]
    Overlay(#[from] OverlayError),
}

/// The gateway before startup: configuration and nothing else.
pub struct Gateway {
    config: GatewayConfig,
}

impl Gateway {
    /// Create a gateway from a validated-on-start configuration.
    pub fn new(config: GatewayConfig) -> Self {
        Self { config }
    }

    /// Initialize the gateway: validate, enroll, provision listeners, spawn
    /// the serve loops. On success the gateway is listening.
    pub async fn start(self, shutdown: &Shutdown) -> Result<RunningGateway, StartupError> {
        validation::validate(&self.config)?;

        let overlay = OverlayClient::new(self.config.overlay_api.clone());
        match overlay.register(&self.config).await {
            Ok(reply) => {
                if let Some(auth_url) = reply.auth_url {
                    tracing::info!(url = %auth_url, "Interactive overlay enrollment required");
                }
            }
            // Identity headers need a working overlay handle; without them the
            // gateway can still serve, degraded.
            Err(error) if self.config.auth_headers => return Err(StartupError::Overlay(error)),
            Err(error) => {
                tracing::warn!(error = %error, "Overlay enrollment failed, serving without identity")
            }
        }

        let mode = ListenerMode::select(self.config.funnel, self.config.tls);
        let primary = listener::provision(mode, self.config.port, &self.config, &overlay).await?;
        let primary_addr = primary.local_addr();

        let upstream = UpstreamTarget::try_from(&self.config.upstream).map_err(ConfigError::from)?;
        let state = AppState {
            client: forward::build_client(),
            upstream,
            resolver: Arc::new(overlay.clone()),
            auth_headers: self.config.auth_headers,
            proto: mode.scheme(),
        };
        let app = build_router(state);

        let mut handles = Vec::new();
        let mut tasks = Vec::new();

        let redirect_addr = if self.config.redirect {
            let handle = Handle::new();
            match redirect::start(&self.config, &overlay, primary_addr.port(), handle.clone()).await
            {
                Some((addr, task)) => {
                    handles.push(handle);
                    tasks.push(task);
                    Some(addr)
                }
                None => None,
            }
        } else {
            None
        };

        let primary_handle = Handle::new();
        handles.push(primary_handle.clone());
        tasks.push(tokio::spawn(async move {
            if let Err(error) = primary.serve(app, primary_handle).await {
                tracing::error!(error = %error, "Primary serve loop exited");
            }
        }));

        tracing::info!(
            hostname = %self.config.hostname,
            address = %primary_addr,
            mode = %mode,
            upstream = %self.config.upstream,
            "Listening for incoming connections"
        );

        Ok(RunningGateway {
            primary_addr,
            redirect_addr,
            handles,
            tasks,
            shutdown_rx: shutdown.subscribe(),
        })
    }
}

/// A gateway in the Listening state.
pub struct RunningGateway {
    primary_addr: SocketAddr,
    redirect_addr: Option<SocketAddr>,
    handles: Vec<Handle>,
    tasks: Vec<JoinHandle<()>>,
    shutdown_rx: broadcast::Receiver<()>,
}

impl RunningGateway {
    /// Address the primary listener is bound to.
    pub fn primary_addr(&self) -> SocketAddr {
        self.primary_addr
    }

    /// Address the redirect listener is bound to, when it started.
    pub fn redirect_addr(&self) -> Option<SocketAddr> {
        self.redirect_addr
    }

    /// Stop accepting on every listener. In-flight requests finish naturally.
    /// Safe to invoke more than once.
    pub fn initiate_shutdown(&self) {
        for handle in &self.handles {
            handle.graceful_shutdown(None);
        }
    }

    /// Serve until the shutdown signal fires, then stop both loops and wait
    /// for them to finish.
    pub async fn wait(mut self) {
        let _ = self.shutdown_rx.recv().await;
        tracing::info!("Shutting down");
        self.initiate_shutdown();
        for task in self.tasks.drain(..) {
            let _ = task.await;
        }
        tracing::info!("Gateway stopped");
    }
}
