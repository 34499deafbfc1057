//! Signaling relayer: fans every WebSocket message out to all other peers.

pub mod api;
pub mod config;
pub mod error;
pub mod relay;

use std::future::Future;
use std::net::SocketAddr;

use tokio::net::TcpListener;

/// Serve the relay on an already bound listener until `shutdown` resolves.
pub async fn serve(
    listener: TcpListener,
    state: api::AppState,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> std::io::Result<()> {
    axum::serve(
        listener,
        api::router(state).into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown)
    .await
}
