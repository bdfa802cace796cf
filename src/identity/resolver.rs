//! Identity resolution seam.

use std::future::Future;
use std::net::SocketAddr;
use std::pin::Pin;

use crate::identity::PeerIdentity;

/// Boxed future returned by [`IdentityResolver::resolve`].
pub type ResolveFuture<'a> = Pin<Box<dyn Future<Output = Option<PeerIdentity>> + Send + 'a>>;

/// Maps a remote socket address to the overlay identity behind it.
///
/// Implementations are best-effort: a lookup error and a missing record both
/// come back as `None`. The production implementation lives on
/// [`OverlayClient`](crate::overlay::OverlayClient); tests substitute a fixed
/// map.
pub trait IdentityResolver: Send + Sync {
    /// Resolve the identity behind `remote`, or `None` if the overlay has no
    /// record for it.
    fn resolve(&self, remote: SocketAddr) -> ResolveFuture<'_>;
}
