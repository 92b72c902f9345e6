use std::sync::Arc;

use axum::{debug_handler, extract::{Path, State}, response::{IntoResponse, Redirect, Response}, Form};
use serde::Deserialize;
use time::OffsetDateTime;
use tower_sessions::Session;

use crate::{chat::{self, Variant}, include_res, page::Page, res, session, theme::Theme, toast::Toast, AppResult, AppState, Config};

use super::dashboard::{Dashboard, Destination};

#[derive(Debug, Deserialize)]
pub(crate) struct NewRoomForm {
    #[serde(default)]
    name: String,
}

fn room_items(dashboard: &Dashboard) -> String {
    if dashboard.chatrooms().is_empty() {
        return include_res!(str, "/pages/rooms/empty.html").to_owned();
    }

    dashboard
        .chatrooms()
        .iter()
        .map(|room| {
            include_res!(str, "/pages/rooms/room_item.html")
                .replace("{id}", &room.id.to_string())
                .replace("{name}", &res::escape(&room.name))
        })
        .collect()
}

#[debug_handler(state = AppState)]
pub(crate) async fn dashboard(
    State(config): State<Arc<Config>>,
    session: Session,
) -> AppResult<Response> {
    if !session::is_logged_in(&session).await? {
        return Ok(Redirect::to("/").into_response());
    }

    let theme = Theme::load(&session).await?;
    let dashboard = Dashboard::load(&session).await?;
    let toast = Toast::take(&session).await?;

    let overlay = dashboard
        .active()
        .map(|room| {
            include_res!(str, "/pages/rooms/overlay.html")
                .replace("{chat}", &chat::view(Variant::Overlay, &room.name, &config.assistant_name))
        })
        .unwrap_or_default();

    let body = include_res!(str, "/pages/rooms/dashboard.html")
        .replace("{room_items}", &room_items(&dashboard))
        .replace("{overlay}", &overlay);

    Ok(
        Page::new("Dashboard", "/dashboard", theme)
            .with_toast(toast)
            .render(&body)
            .into_response()
    )
}

#[debug_handler]
pub(crate) async fn new_room(
    session: Session,

    Form(NewRoomForm { name }): Form<NewRoomForm>,
) -> AppResult<Response> {
    if !session::is_logged_in(&session).await? {
        return Ok(Redirect::to("/").into_response());
    }

    let mut dashboard = Dashboard::load(&session).await?;
    let now_ms = (OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000) as i64;

    if let Some(room) = dashboard.add(&name, now_ms) {
        tracing::info!(id = room.id, name = %room.name, "chatroom created");
        dashboard.store(&session).await?;
        Toast::success("Chatroom created!").show(&session).await?;
    }

    Ok(Redirect::to("/dashboard").into_response())
}

#[debug_handler]
pub(crate) async fn delete_room(
    session: Session,
    Path(id): Path<i64>,
) -> AppResult<Response> {
    if !session::is_logged_in(&session).await? {
        return Ok(Redirect::to("/").into_response());
    }

    let mut dashboard = Dashboard::load(&session).await?;
    if let Some(room) = dashboard.delete(id) {
        tracing::info!(id = room.id, name = %room.name, "chatroom deleted");
    }
    dashboard.store(&session).await?;
    Toast::info("Chatroom deleted.").show(&session).await?;

    Ok(Redirect::to("/dashboard").into_response())
}

#[debug_handler]
pub(crate) async fn open_room(
    session: Session,
    Path(id): Path<i64>,
) -> AppResult<Response> {
    if !session::is_logged_in(&session).await? {
        return Ok(Redirect::to("/").into_response());
    }

    let mut dashboard = Dashboard::load(&session).await?;
    match dashboard.open(id) {
        Destination::RandomChatroom => Ok(Redirect::to("/random-chatroom").into_response()),
        Destination::Overlay(room) => {
            tracing::debug!(id = room.id, "overlay opened");
            dashboard.store(&session).await?;
            Ok(Redirect::to("/dashboard").into_response())
        }
        Destination::Nowhere => Ok(Redirect::to("/dashboard").into_response()),
    }
}

#[debug_handler]
pub(crate) async fn close_room(session: Session) -> AppResult<Response> {
    if !session::is_logged_in(&session).await? {
        return Ok(Redirect::to("/").into_response());
    }

    let mut dashboard = Dashboard::load(&session).await?;
    dashboard.close();
    dashboard.store(&session).await?;

    Ok(Redirect::to("/dashboard").into_response())
}

#[debug_handler(state = AppState)]
pub(crate) async fn random_chatroom(
    State(config): State<Arc<Config>>,
    session: Session,
) -> AppResult<Response> {
    if !session::is_logged_in(&session).await? {
        return Ok(Redirect::to("/").into_response());
    }

    let theme = Theme::load(&session).await?;
    let body = chat::view(Variant::FullScreen, "Random", &config.assistant_name);

    Ok(
        Page::new("Random Chatroom", "/random-chatroom", theme)
            .render(&body)
            .into_response()
    )
}
