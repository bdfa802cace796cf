//! Caller identity subsystem.
//!
//! # Data Flow
//! ```text
//! inbound connection remote address
//!     → resolver.rs (overlay whois lookup, best effort)
//!     → Option<PeerIdentity>
//!     → headers.rs (overwrite identity headers on the outbound request)
//!     → forwarding primitive
//! ```
//!
//! # Design Decisions
//! - Resolution is keyed by the connection's remote socket address, never by
//!   anything the client sends; address spoofing is prevented by the overlay
//!   transport itself
//! - Resolution failure is indistinguishable from "no identity record" and is
//!   never fatal to the request
//! - Identities are resolved fresh per request and never cached

pub mod headers;
pub mod resolver;

use serde::{Deserialize, Serialize};

pub use resolver::IdentityResolver;

/// Overlay-verified identity of a peer.
///
/// All fields are opaque strings sourced from the overlay and passed through
/// verbatim as header values; no validation is performed here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeerIdentity {
    /// Stable login name, e.g. `alice@example`.
    pub login_name: String,

    /// Human-readable display name.
    pub display_name: String,

    /// URL of the peer's profile picture.
    pub profile_pic_url: String,
}
