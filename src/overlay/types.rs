//! Wire types for the overlay daemon's local API.

use serde::{Deserialize, Serialize};

/// Enrollment request sent once at startup.
#[derive(Debug, Clone, Serialize)]
pub struct RegisterRequest {
    /// Name this node advertises on the overlay.
    pub hostname: String,

    /// Directory where the daemon keeps credentials for this node.
    pub state_dir: String,

    /// Pre-authorized enrollment key. None means the daemon may require
    /// interactive authentication.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auth_key: Option<String>,
}

/// Daemon reply to an enrollment request.
#[derive(Debug, Clone, Deserialize)]
pub struct RegisterReply {
    /// URL the operator must visit when interactive authentication is
    /// required. Absent once the node is enrolled.
    #[serde(default)]
    pub auth_url: Option<String>,
}

/// This node's own overlay status.
#[derive(Debug, Clone, Deserialize)]
pub struct SelfStatus {
    /// Fully-qualified overlay DNS name, with a trailing dot,
    /// e.g. `node1.example.ts.net.`.
    pub dns_name: String,
}
