use std::sync::Arc;

use axum::{
    debug_handler, extract::{ws::{rejection::WebSocketUpgradeRejection, Message}, Query, State, WebSocketUpgrade}, response::{IntoResponse, Redirect, Response}
};
use futures_util::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tower_sessions::Session;

use crate::{session, AppResult, Config};

use super::{msg::{ChatMessage, Draft}, session::ChatSession};

#[derive(Deserialize)]
pub(crate) struct ChatQuery {
    room: String,
}

/// Server-to-browser frames.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ChatEvent {
    Message { id: u64, html: String },
    Typing { active: bool },
}

impl ChatEvent {
    fn message(message: &ChatMessage, assistant: &str) -> Self {
        ChatEvent::Message { id: message.id, html: message.to_html(assistant) }
    }
}

#[debug_handler(state = crate::AppState)]
pub(crate) async fn chat_ws(
    Query(ChatQuery { room }): Query<ChatQuery>,
    State(config): State<Arc<Config>>,
    session: Session,
    ws: Result<WebSocketUpgrade, WebSocketUpgradeRejection>,
) -> AppResult<Response> {
    if !session::is_logged_in(&session).await? {
        return Ok(Redirect::to("/").into_response());
    }
    let ws = match ws {
        Ok(ws) => ws,
        Err(rejection) => return Ok(rejection.into_response()),
    };

    let chat = ChatSession::new(room, config.assistant_name.clone(), config.reply_delay);

    Ok(ws.on_upgrade(async move |stream| {
        let (mut sender, mut receiver) = stream.split();
        let (drafts_tx, drafts_rx) = mpsc::unbounded_channel::<Draft>();
        let (events_tx, mut events_rx) = mpsc::unbounded_channel::<ChatEvent>();

        let forward_task = tokio::spawn(async move {
            while let Some(event) = events_rx.recv().await {
                let Ok(frame) = serde_json::to_string(&event) else {
                    continue
                };
                if sender.send(Message::Text(frame.into())).await.is_err() {
                    break;
                }
            }
        });
        let conversation = tokio::spawn(converse(chat, drafts_rx, events_tx));

        while let Some(Ok(msg)) = receiver.next().await {
            if let Message::Close(_) = msg {
                break;
            }
            let Some(draft) = decode_draft(msg) else {
                continue
            };
            if drafts_tx.send(draft).is_err() {
                break;
            }
        }

        drop(drafts_tx);
        let _ = conversation.await;
        let _ = forward_task.await;
    })
    .into_response())
}

/// Reads a draft out of a browser frame. Control frames and malformed JSON
/// yield nothing.
fn decode_draft(msg: Message) -> Option<Draft> {
    match msg {
        Message::Text(text) => serde_json::from_str(text.as_str()).ok(),
        Message::Binary(bytes) => serde_json::from_slice(&bytes).ok(),
        _ => None,
    }
}

/// Runs one chat view until the browser goes away: drafts in, rendered
/// messages and typing changes out. The session is closed on the way out so
/// no reply lands after the view is gone.
pub async fn converse(
    mut chat: ChatSession,
    mut drafts: mpsc::UnboundedReceiver<Draft>,
    events: mpsc::UnboundedSender<ChatEvent>,
) {
    tracing::info!(chat = %chat.id(), room = %chat.room(), "chat opened");

    loop {
        tokio::select! {
            draft = drafts.recv() => {
                let Some(draft) = draft else {
                    break;
                };
                match chat.send(draft) {
                    Ok(message) => {
                        let message = message.clone();
                        let event = ChatEvent::message(&message, chat.assistant());
                        let _ = events.send(event);
                        let _ = events.send(ChatEvent::Typing { active: true });
                    }
                    Err(e) => tracing::debug!(chat = %chat.id(), error = %e, "draft ignored"),
                }
            }
            Some(reply) = chat.next_reply() => {
                let _ = events.send(ChatEvent::message(&reply, chat.assistant()));
                if !chat.is_typing() {
                    let _ = events.send(ChatEvent::Typing { active: false });
                }
            }
        }
    }

    chat.close();
    tracing::info!(chat = %chat.id(), messages = chat.messages().len(), "chat closed");
}
