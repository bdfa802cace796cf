//! Identity-aware reverse proxy gateway for a private mesh overlay.

pub mod config;
pub mod http;
pub mod identity;
pub mod lifecycle;
pub mod net;
pub mod observability;
pub mod overlay;

pub use config::GatewayConfig;
pub use identity::PeerIdentity;
pub use lifecycle::{Gateway, RunningGateway, Shutdown};
