use axum::{debug_handler, extract::Multipart, http::StatusCode, response::{IntoResponse, Response}, Json};
use base64::{engine::general_purpose::STANDARD, Engine};
use serde::Serialize;
use tower_sessions::Session;

use crate::{session, AppResult};

#[derive(Debug, Serialize)]
pub(crate) struct Attachment {
    image: String,
}

pub fn data_url(content_type: Option<&str>, bytes: &[u8]) -> String {
    let content_type = content_type
        .filter(|t| !t.is_empty())
        .unwrap_or("application/octet-stream");
    format!("data:{content_type};base64,{}", STANDARD.encode(bytes))
}

/// Reads the first uploaded file and hands it back as an inline data URL.
#[debug_handler]
pub(crate) async fn attach_image(
    session: Session,
    mut multipart: Multipart,
) -> AppResult<Response> {
    if !session::is_logged_in(&session).await? {
        return Ok(StatusCode::UNAUTHORIZED.into_response());
    }

    let Some(field) = multipart.next_field().await? else {
        return Ok((StatusCode::BAD_REQUEST, "no file").into_response());
    };
    let content_type = field.content_type().map(str::to_owned);
    let bytes = field.bytes().await?;
    tracing::debug!(content_type = ?content_type, size = bytes.len(), "image attached");

    Ok(Json(Attachment { image: data_url(content_type.as_deref(), &bytes) }).into_response())
}
