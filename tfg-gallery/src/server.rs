//! Running the router until the process is asked to stop

use std::fmt;
use std::future::Future;

use axum::Router;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{error, info};

/// Why the server is shutting down
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// Ctrl+C
    Interrupt,
    /// SIGTERM
    Terminate,
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StopReason::Interrupt => write!(f, "interrupt"),
            StopReason::Terminate => write!(f, "terminate signal"),
        }
    }
}

/// Serve `app` until `stop` resolves, then let open requests finish
pub async fn serve_until<F>(listener: TcpListener, app: Router, stop: F) -> std::io::Result<()>
where
    F: Future<Output = StopReason> + Send + 'static,
{
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            let reason = stop.await;
            info!("Received {}, draining connections", reason);
        })
        .await
}

/// First stop request from the OS
///
/// A signal that cannot be listened for is logged and never fires.
pub async fn stop_requested() -> StopReason {
    tokio::select! {
        reason = interrupted() => reason,
        reason = terminated() => reason,
    }
}

async fn interrupted() -> StopReason {
    if let Err(e) = signal::ctrl_c().await {
        error!("Cannot listen for Ctrl+C: {}", e);
        std::future::pending::<()>().await;
    }
    StopReason::Interrupt
}

#[cfg(unix)]
async fn terminated() -> StopReason {
    use tokio::signal::unix::{signal, SignalKind};

    match signal(SignalKind::terminate()) {
        Ok(mut stream) => {
            stream.recv().await;
        }
        Err(e) => {
            error!("Cannot listen for SIGTERM: {}", e);
            std::future::pending::<()>().await;
        }
    }
    StopReason::Terminate
}

#[cfg(not(unix))]
async fn terminated() -> StopReason {
    std::future::pending().await
}
