//! WebSocket upgrade and per-connection handling.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::{
        ws::{rejection::WebSocketUpgradeRejection, Message, WebSocket, WebSocketUpgrade},
        ConnectInfo, State,
    },
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use futures_util::{SinkExt, StreamExt};

use crate::api::AppState;
use crate::error::RelayError;
use crate::relay::Connection;

/// Check the origin policy, then upgrade. Rejected or failed upgrades never
/// reach the relay.
pub async fn ws_handler(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    ws: Result<WebSocketUpgrade, WebSocketUpgradeRejection>,
) -> Response {
    let origin = headers.get(header::ORIGIN);
    if !state.config.origin_policy.allows(origin) {
        tracing::warn!(%addr, ?origin, "upgrade rejected: origin not allowed");
        return (StatusCode::FORBIDDEN, "origin not allowed").into_response();
    }
    let ws = match ws {
        Ok(ws) => ws,
        Err(rejection) => {
            tracing::warn!(%addr, error = %rejection, "upgrade rejected");
            return rejection.into_response();
        }
    };
    ws.on_failed_upgrade(move |e: axum::Error| {
        tracing::warn!(%addr, error = %e, "upgrade failed")
    })
    .on_upgrade(move |socket| handle_socket(socket, addr, state))
}

async fn handle_socket(socket: WebSocket, addr: SocketAddr, state: AppState) {
    let (ws_tx, ws_rx) = socket.split();
    let outbound = ws_tx
        .with(|text: String| async move { Ok::<_, axum::Error>(Message::Text(text.into())) })
        .sink_map_err(RelayError::Transport);
    let connection = Arc::new(Connection::new(addr.to_string(), Box::pin(outbound)));
    state.relay.attach(connection, ws_rx).await;
}

#[cfg(test)]
mod tests {
    use crate::api::{router, AppState};
    use crate::config::{Config, OriginPolicy};
    use crate::relay::RelayState;
    use axum::body::Body;
    use axum::extract::connect_info::MockConnectInfo;
    use axum::http::{HeaderValue, Request, StatusCode};
    use http_body_util::BodyExt;
    use std::net::SocketAddr;
    use std::sync::Arc;
    use tower::ServiceExt;

    fn app(origin_policy: OriginPolicy) -> axum::Router {
        let config = Config {
            origin_policy,
            ..Config::default()
        };
        let (relay, _handle) = RelayState::spawn(config.intake_capacity);
        let state = AppState {
            relay,
            config: Arc::new(config),
        };
        router(state).layer(MockConnectInfo(SocketAddr::from(([127, 0, 0, 1], 4321))))
    }

    fn upgrade_request(origin: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder()
            .uri("/ws")
            .header("Connection", "upgrade")
            .header("Upgrade", "websocket")
            .header("Sec-WebSocket-Version", "13")
            .header("Sec-WebSocket-Key", "dGhlIHNhbXBsZSBub25jZQ==");
        if let Some(origin) = origin {
            builder = builder.header("Origin", origin);
        }
        builder.body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn health_returns_ok() {
        let response = app(OriginPolicy::Any)
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&body[..], b"ok");
    }

    #[tokio::test]
    async fn exact_origin_rejects_other_origins() {
        let policy = OriginPolicy::Exact(HeaderValue::from_static("http://localhost:3000"));
        let response = app(policy)
            .oneshot(upgrade_request(Some("http://evil.example")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn exact_origin_rejects_missing_origin() {
        let policy = OriginPolicy::Exact(HeaderValue::from_static("http://localhost:3000"));
        let response = app(policy).oneshot(upgrade_request(None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn matching_origin_passes_origin_check() {
        let policy = OriginPolicy::Exact(HeaderValue::from_static("http://localhost:3000"));
        let response = app(policy)
            .oneshot(upgrade_request(Some("http://localhost:3000")))
            .await
            .unwrap();
        // no hyper connection behind a oneshot request, so the upgrade itself
        // is refused; the origin check is not what stopped it
        assert_ne!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn plain_get_on_ws_path_is_rejected() {
        let response = app(OriginPolicy::Any)
            .oneshot(Request::builder().uri("/ws").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert!(response.status().is_client_error());
    }
}
