use axum::{debug_handler, extract::Query, response::Redirect};
use serde::Deserialize;
use tower_sessions::Session;

use crate::{session, AppResult};

#[derive(Deserialize)]
pub(crate) struct LogoutQuery {
    pub(crate) return_url: Option<String>,
}

/// Drops the login flag along with the chatroom list and any half-finished
/// OTP flow. The theme preference survives.
#[debug_handler]
pub(crate) async fn logout(
    Query(LogoutQuery { return_url }): Query<LogoutQuery>,
    session: Session
) -> AppResult<Redirect> {
    let theme = crate::theme::Theme::load(&session).await?;
    session.clear().await;
    theme.store(&session).await?;
    tracing::info!("logged out");

    Ok(Redirect::to(&session::local_path(return_url)))
}
