//! Listener binding and the serve loop with bounded shutdown drain.

use std::future::{Future, IntoFuture};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::Notify;
use tracing::{info, warn};

use crate::config::Config;
use crate::error::Result;

/// Bind the configured port on all interfaces.
pub async fn bind(config: &Config) -> Result<TcpListener> {
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = TcpListener::bind(addr).await?;
    let port = listener.local_addr()?.port();
    info!(port = port, "Server started");
    Ok(listener)
}

/// Serve `router` until `signal` resolves.
///
/// Once the signal fires no new connections are accepted; requests already
/// in flight get at most `grace` to finish before the serve loop is dropped.
pub async fn serve<F>(listener: TcpListener, router: Router, grace: Duration, signal: F) -> Result<()>
where
    F: Future<Output = ()> + Send,
{
    let stop = Arc::new(Notify::new());
    let stopped = stop.clone();

    let server = axum::serve(listener, router)
        .with_graceful_shutdown(async move { stopped.notified().await })
        .into_future();
    tokio::pin!(server);

    tokio::select! {
        result = &mut server => return Ok(result?),
        () = signal => {}
    }

    stop.notify_one();
    match tokio::time::timeout(grace, server).await {
        Ok(result) => Ok(result?),
        Err(_) => {
            warn!(
                grace_seconds = grace.as_secs(),
                "Grace period elapsed with requests still in flight"
            );
            Ok(())
        }
    }
}
