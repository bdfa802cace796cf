//! OS signal handling.
//!
//! # Responsibilities
//! - Wait for the interrupt or terminate signal
//! - Translate it into the internal shutdown trigger
//!
//! # Design Decisions
//! - Only SIGINT and SIGTERM are handled; everything else keeps its default
//!   disposition
//! - A second signal during shutdown has no additional effect

/// Wait until the process receives an interrupt or terminate signal.
pub async fn wait_for_termination() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        let mut interrupt =
            signal(SignalKind::interrupt()).expect("failed to install SIGINT handler");
        let mut terminate =
            signal(SignalKind::terminate()).expect("failed to install SIGTERM handler");

        tokio::select! {
            _ = interrupt.recv() => tracing::info!(signal = "SIGINT", "Termination signal received"),
            _ = terminate.recv() => tracing::info!(signal = "SIGTERM", "Termination signal received"),
        }
    }

    #[cfg(not(unix))]
    {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
        tracing::info!("Termination signal received");
    }
}
