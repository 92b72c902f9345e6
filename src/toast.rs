use serde::{Deserialize, Serialize};
use tower_sessions::Session;

use crate::{include_res, res, session::TOAST, AppResult};

/// How long a toast stays on screen before the browser dismisses it.
pub const TOAST_DISMISS_MS: u64 = 2000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToastKind {
    Success,
    Info,
}

impl ToastKind {
    fn class(self) -> &'static str {
        match self {
            ToastKind::Success => "success",
            ToastKind::Info => "info",
        }
    }
}

/// One transient notification. The session holds at most one; showing a new
/// toast replaces whatever was pending.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Toast {
    pub kind: ToastKind,
    pub message: String,
}

impl Toast {
    pub fn success(message: impl Into<String>) -> Self {
        Self { kind: ToastKind::Success, message: message.into() }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self { kind: ToastKind::Info, message: message.into() }
    }

    pub async fn show(self, session: &Session) -> AppResult<()> {
        session.insert(TOAST, self).await?;
        Ok(())
    }

    /// Removes and returns the pending toast, so each one renders once.
    pub async fn take(session: &Session) -> AppResult<Option<Toast>> {
        Ok(session.remove::<Toast>(TOAST).await?)
    }

    pub fn to_html(&self) -> String {
        include_res!(str, "/pages/toast.html")
            .replace("{kind}", self.kind.class())
            .replace("{dismiss_ms}", &TOAST_DISMISS_MS.to_string())
            .replace("{message}", &res::escape(&self.message))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_html_carries_kind_and_timer() {
        let html = Toast::success("Chatroom created!").to_html();

        assert!(html.contains("toast success"));
        assert!(html.contains("data-dismiss-ms=\"2000\""));
        assert!(html.contains("Chatroom created!"));
    }

    #[test]
    fn test_message_is_escaped() {
        let html = Toast::info("<script>").to_html();

        assert!(html.contains("&lt;script&gt;"));
        assert!(!html.contains("<script>"));
    }
}
