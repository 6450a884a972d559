//! HTTP server hosting a [`Gateway`].
//!
//! A hyper/tokio accept loop: one spawned task per connection, graceful
//! shutdown via [`ShutdownSignal`], and a drain wait bounded by the
//! configured shutdown timeout. The server imposes no timeout on request
//! handling; a stalled business call stalls only its own connection task.

use std::sync::Arc;

use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use thiserror::Error;
use tokio::net::TcpListener;

use crate::config::GatewayConfig;
use crate::gateway::Gateway;
use crate::shutdown::{ConnectionTracker, ShutdownSignal};

/// Server hosting errors.
#[derive(Debug, Error)]
pub enum ServerError {
    /// The configured address could not be bound.
    #[error("bind error: {0}")]
    Bind(String),

    /// An I/O failure during serving.
    #[error("i/o error: {0}")]
    Io(String),
}

/// Serves the gateway until SIGTERM or SIGINT.
pub async fn serve(gateway: Gateway, config: &GatewayConfig) -> Result<(), ServerError> {
    serve_with_shutdown(gateway, config, ShutdownSignal::with_os_signals()).await
}

/// Serves the gateway until the given shutdown signal triggers.
pub async fn serve_with_shutdown(
    gateway: Gateway,
    config: &GatewayConfig,
    shutdown: ShutdownSignal,
) -> Result<(), ServerError> {
    let addr = config
        .socket_addr()
        .map_err(|e| ServerError::Bind(format!("invalid address '{}': {e}", config.bind_addr())))?;

    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| ServerError::Bind(format!("cannot bind {addr}: {e}")))?;

    tracing::info!(%addr, "gateway listening");

    let gateway = Arc::new(gateway);
    let tracker = ConnectionTracker::new();

    loop {
        tokio::select! {
            accepted = listener.accept() => {
                match accepted {
                    Ok((stream, remote_addr)) => {
                        let gateway = Arc::clone(&gateway);
                        let token = tracker.acquire();
                        let shutdown = shutdown.clone();

                        tokio::spawn(async move {
                            if let Err(err) =
                                handle_connection(&gateway, stream, shutdown).await
                            {
                                tracing::warn!(%remote_addr, error = %err, "connection error");
                            }
                            drop(token);
                        });
                    }
                    Err(err) => {
                        tracing::error!(error = %err, "cannot accept connection");
                    }
                }
            }

            _ = shutdown.recv() => {
                tracing::info!("shutdown signal received");
                break;
            }
        }
    }

    let timeout = config.shutdown_timeout();
    tracing::info!(
        active = tracker.active_connections(),
        ?timeout,
        "waiting for connections to drain"
    );

    tokio::select! {
        _ = tracker.drained() => {
            tracing::info!("all connections closed");
        }
        _ = tokio::time::sleep(timeout) => {
            tracing::warn!(
                active = tracker.active_connections(),
                "shutdown timeout reached with connections still active"
            );
        }
    }

    Ok(())
}

async fn handle_connection(
    gateway: &Arc<Gateway>,
    stream: tokio::net::TcpStream,
    shutdown: ShutdownSignal,
) -> Result<(), hyper::Error> {
    let io = TokioIo::new(stream);
    let gateway = Arc::clone(gateway);

    let service = service_fn(move |request| {
        let gateway = Arc::clone(&gateway);
        async move { Ok::<_, std::convert::Infallible>(gateway.handle(request).await) }
    });

    let conn = http1::Builder::new().serve_connection(io, service);

    tokio::select! {
        result = conn => result,
        _ = shutdown.recv() => Ok(()),
    }
}
