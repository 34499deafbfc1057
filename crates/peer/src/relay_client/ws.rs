//! WebSocket client for exchanging signaling messages through a relayer.

use anyhow::Result;
use futures_util::{SinkExt, StreamExt};
use shared::{ws_types, SignalMessage};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::handshake::client::Request;
use tokio_tungstenite::tungstenite::http::{header, HeaderValue};
use tokio_tungstenite::tungstenite::Message;

pub type WsStream =
    tokio_tungstenite::WebSocketStream<tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>>;

/// Handshake request for `url`, carrying `origin` as the `Origin` header.
/// A relayer with an exact-origin policy refuses requests without one.
pub fn client_request(url: &str, origin: Option<&str>) -> Result<Request> {
    let mut request = url.into_client_request()?;
    if let Some(origin) = origin {
        request
            .headers_mut()
            .insert(header::ORIGIN, HeaderValue::from_str(origin)?);
    }
    Ok(request)
}

pub async fn connect(url: &str, origin: Option<&str>) -> Result<WsStream> {
    let (ws, _) = connect_async(client_request(url, origin)?).await?;
    tracing::info!("Connected to relayer at {}", url);
    Ok(ws)
}

/// Payload argument: JSON when it parses, otherwise a JSON string.
pub fn parse_payload(raw: Option<&str>) -> serde_json::Value {
    match raw {
        None => serde_json::Value::Null,
        Some(raw) => serde_json::from_str(raw)
            .unwrap_or_else(|_| serde_json::Value::String(raw.to_string())),
    }
}

/// Turn a line typed by the user into a message.
///
/// A JSON object with a non-empty `type` is sent as is, so offers and
/// candidates can be pasted directly. Blank lines are skipped; anything else
/// is a chat message.
pub fn parse_line(line: &str) -> Option<SignalMessage> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }
    if line.starts_with('{') {
        if let Ok(msg) = serde_json::from_str::<SignalMessage>(line) {
            if !msg.r#type.is_empty() {
                return Some(msg);
            }
        }
    }
    Some(SignalMessage::new(
        ws_types::CHAT,
        serde_json::Value::String(line.to_string()),
    ))
}

/// One display line for an incoming frame: `[sender] type: payload`.
pub fn render(text: &str) -> String {
    let Ok(msg) = serde_json::from_str::<SignalMessage>(text) else {
        return text.to_string();
    };
    let sender = msg.sender.as_deref().unwrap_or("?");
    let payload = match &msg.payload {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    };
    format!("[{}] {}: {}", sender, msg.r#type, payload)
}

/// Interactive session: stdin lines go out, relayed messages are printed.
/// Ends when stdin closes or the relayer drops the connection.
pub async fn run_chat(url: &str, origin: Option<&str>) -> Result<()> {
    let (mut ws_tx, mut ws_rx) = connect(url, origin).await?.split();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else {
                    if let Err(e) = ws_tx.close().await {
                        tracing::debug!("close failed: {}", e);
                    }
                    break;
                };
                if let Some(msg) = parse_line(&line) {
                    ws_tx.send(Message::Text(serde_json::to_string(&msg)?)).await?;
                }
            }
            incoming = ws_rx.next() => {
                match incoming {
                    Some(Ok(Message::Text(t))) => println!("{}", render(&t)),
                    Some(Ok(Message::Close(_))) | None => {
                        tracing::info!("Relayer closed the connection");
                        break;
                    }
                    Some(Err(e)) => return Err(e.into()),
                    Some(Ok(_)) => {}
                }
            }
        }
    }
    Ok(())
}

/// Print relayed messages until the relayer closes the connection.
pub async fn run_listen(url: &str, origin: Option<&str>) -> Result<()> {
    let (_ws_tx, mut ws_rx) = connect(url, origin).await?.split();
    while let Some(msg) = ws_rx.next().await {
        match msg? {
            Message::Text(t) => println!("{}", render(&t)),
            Message::Close(_) => break,
            _ => {}
        }
    }
    tracing::info!("Relayer closed the connection");
    Ok(())
}

/// Send one message and close.
pub async fn send_once(
    url: &str,
    origin: Option<&str>,
    r#type: &str,
    payload: Option<&str>,
) -> Result<()> {
    let mut ws = connect(url, origin).await?;
    let msg = SignalMessage::new(r#type, parse_payload(payload));
    ws.send(Message::Text(serde_json::to_string(&msg)?)).await?;
    ws.close(None).await?;
    tracing::info!("Sent {} message", msg.r#type);
    Ok(())
}
