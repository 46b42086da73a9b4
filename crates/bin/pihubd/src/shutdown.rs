//! Graceful-shutdown signal handling.

use tokio_util::sync::CancellationToken;

/// Resolve on Ctrl-C, or SIGTERM on unix.
pub async fn signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %err, "cannot listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(err) => {
                tracing::warn!(error = %err, "cannot listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
}

/// Cancel `token` when a shutdown signal arrives.
pub async fn cancel_on_signal(token: CancellationToken) {
    tokio::select! {
        () = signal() => {
            tracing::info!("shutdown requested");
            token.cancel();
        }
        () = token.cancelled() => {}
    }
}
