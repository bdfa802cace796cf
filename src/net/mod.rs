//! Network layer subsystem.
//!
//! # Data Flow
//! ```text
//! GatewayConfig flags (funnel, tls)
//!     → listener.rs (mode selection: funnel > tls > plain)
//!     → listener.rs (bind, funnel enablement via overlay daemon)
//!     → tls.rs (overlay-managed certificate material for tls/funnel)
//!     → BoundListener handed to the gateway runtime
//! ```
//!
//! # Design Decisions
//! - Exactly one listener per provision call; the runtime owns it and closes
//!   it once through the serve handle
//! - TLS certificate management stays with the overlay daemon; the gateway
//!   only reads the PEM files the daemon maintains

pub mod listener;
pub mod tls;

pub use listener::{provision, BoundListener, ListenError, ListenerMode};
