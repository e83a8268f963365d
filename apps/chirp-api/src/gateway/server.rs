//! WebSocket upgrade handler and per-connection event loop.

use std::sync::Arc;
use std::time::Duration;

use axum::extract::ws::{Message, WebSocket};
use axum::extract::{State, WebSocketUpgrade};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio::time;

use crate::AppState;

use super::events::{ClientEvent, ServerEvent};
use super::handler::{handle_client_event, handle_identify, EventOutcome, HEARTBEAT_INTERVAL_MS};
use super::session::ConnectionHandle;

/// Close codes (4000-range for application-level).
const CLOSE_UNKNOWN_ERROR: u16 = 4000;
const CLOSE_NOT_AUTHENTICATED: u16 = 4003;
const CLOSE_AUTH_FAILED: u16 = 4004;
const CLOSE_SESSION_REPLACED: u16 = 4006;
const CLOSE_SESSION_TIMEOUT: u16 = 4009;

/// Timeout for receiving the identify frame after connection (seconds).
const IDENTIFY_TIMEOUT_SECS: u64 = 10;

pub fn router() -> Router<AppState> {
    Router::new().route("/gateway", get(ws_upgrade))
}

async fn ws_upgrade(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_connection(socket, state))
}

async fn handle_connection(socket: WebSocket, state: AppState) {
    let (mut ws_tx, mut ws_rx) = socket.split();

    // Step 1: wait for the identify frame within the timeout. No session
    // state exists until the credential verifies.
    let token_result = time::timeout(Duration::from_secs(IDENTIFY_TIMEOUT_SECS), async {
        while let Some(msg) = ws_rx.next().await {
            let msg = match msg {
                Ok(m) => m,
                Err(e) => {
                    tracing::debug!(?e, "ws read error during identify");
                    return Err("read error");
                }
            };

            let text = match msg {
                Message::Text(t) => t,
                Message::Close(_) => return Err("client closed"),
                Message::Ping(_) | Message::Pong(_) => continue,
                _ => continue,
            };

            let event: ClientEvent = match serde_json::from_str(&text) {
                Ok(e) => e,
                Err(_) => return Err("invalid json"),
            };

            return match event {
                ClientEvent::Identify { token } => Ok(token),
                _ => Err("expected identify"),
            };
        }
        Err("connection closed before identify")
    })
    .await;

    let token = match token_result {
        Ok(Ok(token)) => token,
        Ok(Err(reason)) => {
            tracing::debug!(%reason, "handshake failed");
            let code = match reason {
                "expected identify" => CLOSE_NOT_AUTHENTICATED,
                _ => CLOSE_UNKNOWN_ERROR,
            };
            let _ = send_close(&mut ws_tx, code, reason).await;
            return;
        }
        Err(_timeout) => {
            let _ = send_close(&mut ws_tx, CLOSE_SESSION_TIMEOUT, "Handshake timeout").await;
            return;
        }
    };

    // Step 2: verify the credential and register the session.
    let (handle, outbound_rx, connected) = match handle_identify(&state, &token).await {
        Ok(result) => result,
        Err(reason) => {
            tracing::debug!(%reason, "identify failed");
            let _ = send_close(&mut ws_tx, CLOSE_AUTH_FAILED, reason).await;
            return;
        }
    };

    tracing::info!(
        session_id = %handle.session_id,
        user_id = %handle.user_id,
        "gateway session established"
    );

    let connected_json = serde_json::to_string(&connected).unwrap();
    if ws_tx.send(Message::Text(connected_json.into())).await.is_err() {
        state.sessions.remove_if(&handle.user_id, &handle.session_id);
        return;
    }

    run_session(&state, handle.clone(), ws_tx, ws_rx, outbound_rx).await;

    // Teardown: the registry entry is only removed when it still belongs to
    // this session; rooms always forget the session.
    state.sessions.remove_if(&handle.user_id, &handle.session_id);
    state.rooms.leave_all(&handle.session_id);

    tracing::info!(
        session_id = %handle.session_id,
        user_id = %handle.user_id,
        "gateway session ended"
    );
}

/// Main session loop: dispatch client events, flush outbound pushes,
/// enforce the heartbeat deadline.
async fn run_session(
    state: &AppState,
    handle: Arc<ConnectionHandle>,
    mut ws_tx: futures_util::stream::SplitSink<WebSocket, Message>,
    mut ws_rx: futures_util::stream::SplitStream<WebSocket>,
    mut outbound_rx: mpsc::UnboundedReceiver<ServerEvent>,
) {
    // Client must heartbeat within 1.5x the advertised interval.
    let heartbeat_deadline = Duration::from_millis(HEARTBEAT_INTERVAL_MS * 3 / 2);
    let mut heartbeat_timer = time::interval(heartbeat_deadline);
    heartbeat_timer.tick().await; // First tick fires immediately; skip it.
    let mut got_heartbeat = true;

    loop {
        tokio::select! {
            // Client sends us a frame.
            msg = ws_rx.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        let event: ClientEvent = match serde_json::from_str(&text) {
                            Ok(e) => e,
                            Err(_) => {
                                // Malformed payloads are dropped with an
                                // acknowledgment to the sender only.
                                handle.send(ServerEvent::error(
                                    "VALIDATION_ERROR",
                                    "Malformed event payload",
                                ));
                                continue;
                            }
                        };

                        if matches!(event, ClientEvent::Heartbeat) {
                            got_heartbeat = true;
                        }

                        match handle_client_event(state, &handle, event).await {
                            EventOutcome::Continue => {}
                            EventOutcome::Close(reason) => {
                                let _ = send_close(&mut ws_tx, CLOSE_UNKNOWN_ERROR, reason).await;
                                break;
                            }
                        }
                    }
                    Some(Ok(Message::Ping(_))) | Some(Ok(Message::Pong(_))) => continue,
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Err(e)) => {
                        tracing::debug!(?e, session_id = %handle.session_id, "ws read error");
                        break;
                    }
                    _ => continue,
                }
            }

            // Outbound push queued by rooms, the registry, or this session.
            event = outbound_rx.recv() => {
                match event {
                    Some(event) => {
                        let evicted = matches!(event, ServerEvent::Disconnected { .. });
                        let json = serde_json::to_string(&event).unwrap();
                        if ws_tx.send(Message::Text(json.into())).await.is_err() {
                            break;
                        }
                        if evicted {
                            let _ = send_close(
                                &mut ws_tx,
                                CLOSE_SESSION_REPLACED,
                                "Session replaced by a newer connection",
                            )
                            .await;
                            break;
                        }
                    }
                    None => break,
                }
            }

            // Heartbeat deadline check.
            _ = heartbeat_timer.tick() => {
                if !got_heartbeat {
                    tracing::debug!(
                        session_id = %handle.session_id,
                        "heartbeat timeout, closing connection"
                    );
                    let _ = send_close(&mut ws_tx, CLOSE_SESSION_TIMEOUT, "Heartbeat timeout").await;
                    break;
                }
                got_heartbeat = false;
            }
        }
    }
}

/// Send a WebSocket close frame with a code and reason.
async fn send_close(
    ws_tx: &mut futures_util::stream::SplitSink<WebSocket, Message>,
    code: u16,
    reason: &str,
) -> Result<(), axum::Error> {
    let close_msg = Message::Close(Some(axum::extract::ws::CloseFrame {
        code,
        reason: reason.to_string().into(),
    }));
    ws_tx.send(close_msg).await
}
