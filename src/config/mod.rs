//! Gateway configuration subsystem.
//!
//! # Data Flow
//! ```text
//! CLI flags / MESHGATE_* environment
//!     → main.rs (clap parse)
//!     → GatewayConfig (built once, immutable)
//!     → validation.rs (semantic checks)
//!     → passed by reference into each subsystem
//! ```
//!
//! # Design Decisions
//! - No subsystem reads ambient global state; everything flows through
//!   GatewayConfig
//! - Validation separates syntactic (clap/url parsing) from semantic checks
//! - Validation runs before any listener is bound

pub mod schema;
pub mod validation;

pub use schema::GatewayConfig;
pub use validation::ConfigError;
