//! Inbound event dispatch: the identify handshake and per-event handling.

use std::sync::Arc;

use tokio::sync::mpsc;

use crate::auth::tokens;
use crate::store::{ChatStore, UserStore};
use crate::AppState;

use super::events::{ClientEvent, ServerEvent};
use super::session::ConnectionHandle;

/// Heartbeat interval advertised to clients in the `connected` event (ms).
pub const HEARTBEAT_INTERVAL_MS: u64 = 41250;

/// Process the handshake credential. On success the session is registered
/// (evicting any previous connection for the identity) and the `connected`
/// greeting is returned alongside the handle and its outbound receiver.
pub async fn handle_identify(
    state: &AppState,
    token: &str,
) -> Result<
    (
        Arc<ConnectionHandle>,
        mpsc::UnboundedReceiver<ServerEvent>,
        ServerEvent,
    ),
    &'static str,
> {
    let user_id = tokens::verify(&state.config.jwt_secret, token)
        .map_err(|_| "Invalid or expired token")?;

    let user = state
        .store
        .get_user(&user_id)
        .await
        .map_err(|_| "User lookup failed")?
        .ok_or("Unknown user")?;

    let (handle, receiver) = ConnectionHandle::new(user.id.clone());
    let handle = Arc::new(handle);

    if let Some(evicted) = state.sessions.register(handle.clone()) {
        tracing::debug!(
            user_id = %handle.user_id,
            old_session = %evicted.session_id,
            "previous session evicted"
        );
    }

    let connected = ServerEvent::Connected {
        session_id: handle.session_id.clone(),
        user,
        heartbeat_interval: HEARTBEAT_INTERVAL_MS,
    };

    Ok((handle, receiver, connected))
}

/// What the connection loop should do after an event is handled.
pub enum EventOutcome {
    Continue,
    Close(&'static str),
}

/// Dispatch one post-handshake client event.
///
/// Failures are acknowledged to the sender only; they never close the
/// connection or reach other room members.
pub async fn handle_client_event(
    state: &AppState,
    handle: &ConnectionHandle,
    event: ClientEvent,
) -> EventOutcome {
    match event {
        ClientEvent::Identify { .. } => EventOutcome::Close("Already identified"),
        ClientEvent::Heartbeat => {
            handle.send(ServerEvent::HeartbeatAck);
            EventOutcome::Continue
        }
        ClientEvent::JoinRoom { room_id } => {
            handle_join(state, handle, &room_id).await;
            EventOutcome::Continue
        }
        ClientEvent::LeaveRoom { room_id } => {
            state.rooms.leave(&room_id, &handle.session_id);
            EventOutcome::Continue
        }
        ClientEvent::SendMessage { chat_id, content } => {
            if let Err(e) = state
                .chat
                .send_message(&chat_id, &handle.user_id, &content)
                .await
            {
                handle.send(ServerEvent::error(e.code, e.message));
            }
            EventOutcome::Continue
        }
    }
}

/// Join a room, enforcing what the room id denotes: chats require
/// participantship (and reply with history), a self-channel belongs to one
/// identity, and item rooms join lazily.
async fn handle_join(state: &AppState, handle: &ConnectionHandle, room_id: &str) {
    match state.store.get_chat(room_id).await {
        Err(e) => {
            handle.send(ServerEvent::error(e.code, e.message));
            return;
        }
        Ok(Some(chat)) => {
            if !chat.is_participant(&handle.user_id) {
                handle.send(ServerEvent::error(
                    "FORBIDDEN",
                    "Not a participant in this chat",
                ));
                return;
            }
            state.rooms.join(room_id, &handle.session_id, handle.sender());

            match state.store.load_history(room_id).await {
                Ok(messages) => {
                    handle.send(ServerEvent::PreviousMessages {
                        chat_id: room_id.to_string(),
                        messages: messages.unwrap_or_default(),
                    });
                }
                Err(e) => {
                    handle.send(ServerEvent::error(e.code, e.message));
                }
            }
            tracing::debug!(session_id = %handle.session_id, %room_id, "joined chat room");
            return;
        }
        Ok(None) => {}
    }

    if room_id == handle.user_id {
        state.rooms.join(room_id, &handle.session_id, handle.sender());
        tracing::debug!(session_id = %handle.session_id, "joined self-channel");
        return;
    }

    match state.store.get_user(room_id).await {
        Ok(Some(_)) => {
            handle.send(ServerEvent::error(
                "FORBIDDEN",
                "Cannot join another identity's notification channel",
            ));
        }
        Ok(None) => {
            // Item rooms (and future room kinds) are created lazily.
            state.rooms.join(room_id, &handle.session_id, handle.sender());
            tracing::debug!(session_id = %handle.session_id, %room_id, "joined room");
        }
        Err(e) => {
            handle.send(ServerEvent::error(e.code, e.message));
        }
    }
}
