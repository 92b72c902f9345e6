mod image;
mod msg;
mod session;
mod ws;

use axum::{extract::DefaultBodyLimit, routing::{get, post}, Router};

use crate::{include_res, res, AppState};

pub use image::data_url;
pub use msg::{reply_text, ChatMessage, Draft, Sender};
pub use session::{ChatError, ChatSession, ReplyDelay};
pub use ws::{converse, ChatEvent};

/// How long the "Copied!" tip stays next to a clicked message.
pub const COPY_TIP_MS: u64 = 1000;

/// The two places a chat view is shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Variant {
    /// Above the dashboard, for ordinary chatrooms.
    Overlay,
    /// Its own page, for the random chatroom.
    FullScreen,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/ws", get(ws::chat_ws))
        .route("/image", post(image::attach_image).layer(DefaultBodyLimit::disable()))
}

/// Markup for an empty chat view. Messages arrive over the websocket.
pub fn view(variant: Variant, room: &str, assistant: &str) -> String {
    let (class, title, back) = match variant {
        Variant::Overlay => ("overlay", format!("{} Chatroom", res::escape(room)), ""),
        Variant::FullScreen => (
            "fullscreen",
            "Random Chatroom".to_owned(),
            "<a href=\"/dashboard\" aria-label=\"Back to Dashboard\">⟵</a>",
        ),
    };

    include_res!(str, "/pages/chat/chat.html")
        .replace("{variant}", class)
        .replace("{back}", back)
        .replace("{copy_ms}", &COPY_TIP_MS.to_string())
        .replace("{assistant}", &res::escape(assistant))
        .replace("{room}", &res::escape(room))
        .replace("{title}", &title)
}
