//! HTTP handling subsystem.
//!
//! # Data Flow
//! ```text
//! overlay/funnel connection
//!     → server.rs (router, identity annotation stage)
//!     → forward.rs (URI rewrite, forwarding hygiene, upstream client)
//!     → upstream origin
//!     → response streamed back unmodified
//!
//! redirect listener
//!     → redirect.rs (302 to the primary HTTPS endpoint, any method/path)
//! ```

pub mod forward;
pub mod redirect;
pub mod server;

pub use server::{build_router, AppState};
