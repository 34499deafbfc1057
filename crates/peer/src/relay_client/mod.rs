//! WebSocket client side of the relay protocol.

mod ws;

pub use ws::{
    client_request, connect, parse_line, parse_payload, render, run_chat, run_listen, send_once,
    WsStream,
};
