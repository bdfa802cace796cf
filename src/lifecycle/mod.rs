//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Validate config → Overlay enrollment → Provision primary listener
//!     → Start redirect responder (best effort) → Spawn serve loops
//!
//! Shutdown (shutdown.rs):
//!     Signal received → Stop accepting on every listener
//!     → In-flight requests finish → Serve tasks join → Exit
//!
//! Signals (signals.rs):
//!     SIGINT/SIGTERM → Trigger graceful shutdown
//! ```
//!
//! # Design Decisions
//! - Serve loops are sibling tasks: one loop failing is logged and isolated,
//!   never supervised or restarted
//! - Shutdown is idempotent; no drain deadline is enforced

pub mod shutdown;
pub mod signals;
pub mod startup;

pub use shutdown::Shutdown;
pub use startup::{Gateway, RunningGateway, StartupError};
