//! Overlay daemon integration.
//!
//! The mesh overlay transport (encryption, key exchange, funnel ingress, TLS
//! certificate maintenance) is run by a separate daemon on the node. The
//! gateway talks to it over a loopback HTTP API:
//!
//! ```text
//! POST /v0/register       enroll this node (hostname, state dir, auth key)
//! GET  /v0/whois?addr=    identity behind a remote socket address
//! GET  /v0/status/self    this node's own overlay status (DNS name)
//! POST /v0/funnel/{port}  expose a port to the public internet
//! ```
//!
//! # Design Decisions
//! - The client is cheap to construct and holds no connection state; each
//!   operation fails independently so callers can apply their own severity
//! - Whois degrades to "unknown peer" at the resolver seam; only startup
//!   treats overlay errors as fatal, and only when identity is required

pub mod client;
pub mod types;

pub use client::{OverlayClient, OverlayError};
