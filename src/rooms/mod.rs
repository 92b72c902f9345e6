mod dashboard;
mod page;

use axum::{routing::{get, post}, Router};

use crate::AppState;

pub use dashboard::{Chatroom, Dashboard, Destination};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/dashboard", get(page::dashboard))
        .route("/dashboard/rooms", post(page::new_room))
        .route("/dashboard/rooms/{id}", get(page::open_room))
        .route("/dashboard/rooms/{id}/delete", post(page::delete_room))
        .route("/dashboard/close", post(page::close_room))
        .route("/random-chatroom", get(page::random_chatroom))
}
