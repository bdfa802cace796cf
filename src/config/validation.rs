//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (clap and url handle syntactic)
//! - Check the upstream origin is usable as a forwarding target
//! - Detect listener port clashes
//!
//! # Design Decisions
//! - Validation is a pure function: GatewayConfig → Result<(), ConfigError>
//! - Runs before any listener is bound; failure is fatal

use thiserror::Error;

use crate::config::schema::GatewayConfig;

/// Error type for configuration validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("upstream URL must have a host: {0}")]
    UpstreamMissingHost(url::Url),

    #[error("upstream URL scheme must be http or https, got {0:?}")]
    UpstreamScheme(String),

    #[error("upstream URL is not usable as a forwarding target: {0}")]
    UpstreamTarget(#[from] axum::http::Error),

    #[error("primary and redirect listeners cannot share port {0}")]
    PortClash(u16),
}

/// Validate a gateway configuration.
pub fn validate(config: &GatewayConfig) -> Result<(), ConfigError> {
    if config.upstream.host_str().is_none() {
        return Err(ConfigError::UpstreamMissingHost(config.upstream.clone()));
    }

    match config.upstream.scheme() {
        "http" | "https" => {}
        other => return Err(ConfigError::UpstreamScheme(other.to_string())),
    }

    // Confirms scheme and authority convert cleanly for URI rewriting.
    crate::http::forward::UpstreamTarget::try_from(&config.upstream)?;

    // Port 0 asks the OS for an ephemeral port, so two zeros never collide.
    if config.redirect && config.port != 0 && config.redirect_port == config.port {
        return Err(ConfigError::PortClash(config.port));
    }

    Ok(())
}
