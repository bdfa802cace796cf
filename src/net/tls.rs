//! TLS material loading.
//!
//! The overlay daemon provisions and renews a certificate for the node's
//! overlay DNS name and drops the PEM pair into the state directory. The
//! gateway only loads it; issuance and renewal are not its concern.

use std::path::Path;

use axum_server::tls_rustls::RustlsConfig;

/// Load the overlay-managed certificate pair for `hostname` from the state
/// directory into a rustls server configuration.
pub async fn load_overlay_certs(
    state_dir: &Path,
    hostname: &str,
) -> Result<RustlsConfig, std::io::Error> {
    let cert_path = state_dir.join(format!("{}.crt", hostname));
    let key_path = state_dir.join(format!("{}.key", hostname));

    if !cert_path.exists() {
        return Err(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("certificate file not found: {:?}", cert_path),
        ));
    }
    if !key_path.exists() {
        return Err(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("private key file not found: {:?}", key_path),
        ));
    }

    RustlsConfig::from_pem_file(cert_path, key_path).await
}
