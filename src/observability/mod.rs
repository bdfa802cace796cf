//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! logging.rs: RUST_LOG / --log-level → tracing-subscriber registry
//! metrics.rs: request outcomes → Prometheus exporter (optional)
//! ```
//!
//! # Design Decisions
//! - Runtime errors surface only in logs, never as altered HTTP responses
//! - Metrics are opt-in; without an exporter address the recorders are no-ops

pub mod logging;
pub mod metrics;
