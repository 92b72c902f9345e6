use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::{include_res, res};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sender {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub id: u64,
    pub sender: Sender,
    pub text: String,
    /// Inline `data:` URL of an attached picture.
    pub image: Option<String>,
    pub timestamp: OffsetDateTime,
}

/// What the browser sends for each submitted message.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Draft {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub image: Option<String>,
}

pub fn reply_text(assistant: &str, text: &str, has_image: bool) -> String {
    let mut reply = format!("{assistant} says: \"{text}\"");
    if has_image {
        reply.push_str(" [Image received]");
    }
    reply
}

impl ChatMessage {
    pub fn to_html(&self, assistant: &str) -> String {
        let (sender, author) = match self.sender {
            Sender::User => ("user", "You"),
            Sender::Assistant => ("assistant", assistant),
        };
        let image = self.image
            .as_deref()
            .map(|src| format!("<img src=\"{}\" alt=\"uploaded\">", res::escape(src)))
            .unwrap_or_default();
        let ts = self.timestamp.unix_timestamp_nanos() / 1_000_000;
        let time = format!("{:02}:{:02}", self.timestamp.hour(), self.timestamp.minute());

        include_res!(str, "/pages/chat/message.html")
            .replace("{sender}", sender)
            .replace("{id}", &self.id.to_string())
            .replace("{author}", &res::escape(author))
            .replace("{ts}", &ts.to_string())
            .replace("{time}", &time)
            .replace("{image}", &image)
            .replace("{text}", &res::escape(&self.text))
    }
}
