//! Shared test harness: in-memory state, token minting, gateway helpers.
#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio::time;
use tokio_tungstenite::{tungstenite, MaybeTlsStream, WebSocketStream};

use chirp_api::auth::tokens;
use chirp_api::config::Config;
use chirp_api::models::User;
use chirp_api::store::{MemoryStore, UserStore};
use chirp_api::AppState;

pub const TEST_JWT_SECRET: &str = "chirp-test-secret";

pub fn test_config() -> Config {
    Config {
        jwt_secret: TEST_JWT_SECRET.to_string(),
        port: 0,
        client_origin: None,
    }
}

pub fn test_state() -> AppState {
    AppState::new(Arc::new(MemoryStore::new()), Arc::new(test_config()))
}

/// Start an actual TCP server for gateway + HTTP testing.
/// Returns (addr, state). The server runs in the background.
pub async fn start_server() -> (SocketAddr, AppState) {
    let state = test_state();
    let app = chirp_api::routes::router().with_state(state.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind");
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (addr, state)
}

pub async fn seed_user(state: &AppState, name: &str, handle: &str) -> User {
    let user = User::new(name, handle);
    state.store.insert_user(user.clone()).await.unwrap();
    user
}

pub fn mint_token(user_id: &str) -> String {
    tokens::issue(TEST_JWT_SECRET, user_id, 3600).unwrap()
}

pub type WsClient = WebSocketStream<MaybeTlsStream<tokio::net::TcpStream>>;

/// Connect to the gateway and complete the identify handshake.
/// Returns the stream after receiving `connected`.
pub async fn connect_and_identify(addr: SocketAddr, token: &str) -> WsClient {
    let url = format!("ws://{addr}/gateway");
    let (ws_stream, _) = tokio_tungstenite::connect_async(&url)
        .await
        .expect("ws connect");

    let (mut write, mut read) = ws_stream.split();

    let identify = serde_json::json!({ "t": "identify", "d": { "token": token } });
    write
        .send(tungstenite::Message::Text(identify.to_string().into()))
        .await
        .expect("send identify");

    let msg = time::timeout(Duration::from_secs(5), read.next())
        .await
        .expect("timeout waiting for connected")
        .expect("stream ended")
        .expect("ws read error");

    let text = msg.into_text().expect("not text");
    let connected: serde_json::Value = serde_json::from_str(&text).expect("parse connected");
    assert_eq!(connected["t"], "connected");
    assert!(connected["d"]["session_id"]
        .as_str()
        .unwrap()
        .starts_with("gw_"));

    read.reunite(write).expect("reunite")
}

/// Read the next text frame as JSON within a timeout.
pub async fn next_event(ws: &mut WsClient) -> serde_json::Value {
    loop {
        let msg = time::timeout(Duration::from_secs(5), ws.next())
            .await
            .expect("timeout waiting for event")
            .expect("stream ended")
            .expect("ws read error");
        if let tungstenite::Message::Text(text) = msg {
            return serde_json::from_str(&text).expect("parse event");
        }
    }
}

/// Assert no text frame arrives within the window.
pub async fn assert_silent(ws: &mut WsClient, window: Duration) {
    match time::timeout(window, ws.next()).await {
        Err(_) => {} // timed out with nothing queued
        Ok(Some(Ok(tungstenite::Message::Text(text)))) => {
            panic!("expected silence, got: {text}")
        }
        Ok(_) => {}
    }
}

pub async fn join_room(ws: &mut WsClient, room_id: &str) {
    let join = serde_json::json!({ "t": "join-room", "d": { "room_id": room_id } });
    ws.send(tungstenite::Message::Text(join.to_string().into()))
        .await
        .expect("send join");
}

/// Round-trip a heartbeat so every frame sent before it has been handled.
pub async fn sync(ws: &mut WsClient) {
    let heartbeat = serde_json::json!({ "t": "heartbeat" });
    ws.send(tungstenite::Message::Text(heartbeat.to_string().into()))
        .await
        .expect("send heartbeat");
    let ack = next_event(ws).await;
    assert_eq!(ack["t"], "heartbeat-ack");
}

pub async fn send_chat_message(ws: &mut WsClient, chat_id: &str, content: &str) {
    let event = serde_json::json!({
        "t": "send-message",
        "d": { "chat_id": chat_id, "content": content }
    });
    ws.send(tungstenite::Message::Text(event.to_string().into()))
        .await
        .expect("send message");
}
