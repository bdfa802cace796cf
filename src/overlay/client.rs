//! HTTP client for the overlay daemon's local API.

use std::net::SocketAddr;

use reqwest::StatusCode;
use thiserror::Error;
use url::Url;

use crate::config::GatewayConfig;
use crate::identity::resolver::{IdentityResolver, ResolveFuture};
use crate::identity::PeerIdentity;
use crate::overlay::types::{RegisterReply, RegisterRequest, SelfStatus};

/// Error type for overlay API operations.
#[derive(Debug, Error)]
pub enum OverlayError {
    #[error("overlay API request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("overlay API returned {status} for {endpoint}")]
    Api {
        endpoint: &'static str,
        status: StatusCode,
    },

    #[error("overlay API URL cannot be joined with {endpoint}: {source}")]
    Endpoint {
        endpoint: &'static str,
        source: url::ParseError,
    },
}

/// Client for the overlay daemon's loopback API.
///
/// Holds no connection state; every call is an independent request against
/// the daemon, so failures carry no history and callers decide severity.
#[derive(Debug, Clone)]
pub struct OverlayClient {
    http: reqwest::Client,
    base: Url,
}

impl OverlayClient {
    /// Create a client against the daemon's local API base URL.
    pub fn new(base: Url) -> Self {
        Self {
            http: reqwest::Client::new(),
            base,
        }
    }

    /// Enroll this node with the overlay daemon.
    ///
    /// With a blank auth key the daemon may reply with an interactive
    /// authentication URL, which the caller is expected to surface.
    pub async fn register(&self, config: &GatewayConfig) -> Result<RegisterReply, OverlayError> {
        let url = self.endpoint("/v0/register")?;
        let request = RegisterRequest {
            hostname: config.hostname.clone(),
            state_dir: config.state_dir.display().to_string(),
            auth_key: config.auth_key.clone(),
        };

        let response = self.http.post(url).json(&request).send().await?;
        if !response.status().is_success() {
            return Err(OverlayError::Api {
                endpoint: "/v0/register",
                status: response.status(),
            });
        }
        Ok(response.json().await?)
    }

    /// Look up the overlay identity behind a remote socket address.
    ///
    /// Returns `Ok(None)` when the overlay has no record for the address.
    pub async fn whois(&self, remote: SocketAddr) -> Result<Option<PeerIdentity>, OverlayError> {
        let url = self.endpoint("/v0/whois")?;
        let response = self
            .http
            .get(url)
            .query(&[("addr", remote.to_string())])
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(OverlayError::Api {
                endpoint: "/v0/whois",
                status: response.status(),
            });
        }
        Ok(Some(response.json().await?))
    }

    /// Query this node's own overlay status.
    pub async fn self_status(&self) -> Result<SelfStatus, OverlayError> {
        let url = self.endpoint("/v0/status/self")?;
        let response = self.http.get(url).send().await?;
        if !response.status().is_success() {
            return Err(OverlayError::Api {
                endpoint: "/v0/status/self",
                status: response.status(),
            });
        }
        Ok(response.json().await?)
    }

    /// Ask the daemon to expose `port` to the public internet.
    pub async fn enable_funnel(&self, port: u16) -> Result<(), OverlayError> {
        let url = self
            .base
            .join(&format!("/v0/funnel/{}", port))
            .map_err(|source| OverlayError::Endpoint {
                endpoint: "/v0/funnel",
                source,
            })?;

        let response = self.http.post(url).send().await?;
        if !response.status().is_success() {
            return Err(OverlayError::Api {
                endpoint: "/v0/funnel",
                status: response.status(),
            });
        }
        Ok(())
    }

    fn endpoint(&self, path: &'static str) -> Result<Url, OverlayError> {
        self.base
            .join(path)
            .map_err(|source| OverlayError::Endpoint {
                endpoint: path,
                source,
            })
    }
}

impl IdentityResolver for OverlayClient {
    fn resolve(&self, remote: SocketAddr) -> ResolveFuture<'_> {
        Box::pin(async move {
            match self.whois(remote).await {
                Ok(identity) => identity,
                Err(error) => {
                    // Lookup errors and missing records are equivalent here.
                    tracing::debug!(peer_addr = %remote, error = %error, "Whois lookup failed");
                    None
                }
            }
        })
    }
}
