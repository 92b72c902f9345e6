pub mod auth;
pub mod chat;
pub mod config;
pub mod page;
pub mod res;
pub mod rooms;
pub mod session;
pub mod theme;
pub mod toast;

use std::sync::Arc;

use axum::{
    debug_handler, extract::FromRef, http::StatusCode, response::{IntoResponse, Redirect, Response}, routing::{get, post}, Router
};
use tower_http::trace::TraceLayer;
use tower_sessions::{cookie::SameSite, Expiry, MemoryStore, Session, SessionManagerLayer};

pub use auth::{parse_directory, CountryDirectory};
pub use config::Config;

#[derive(Clone, FromRef)]
pub struct AppState {
    pub config: Arc<Config>,
    pub directory: Arc<CountryDirectory>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let directory = CountryDirectory::new(config.country_directory_url.clone());
        Self::with_directory(config, directory)
    }

    pub fn with_directory(config: Config, directory: CountryDirectory) -> Self {
        Self {
            config: Arc::new(config),
            directory: Arc::new(directory),
        }
    }
}

/// Builds the full application router, session layer included.
pub fn app(state: AppState) -> Router {
    let session_layer = SessionManagerLayer::new(MemoryStore::default())
        .with_secure(false)
        .with_same_site(SameSite::Lax)
        .with_expiry(Expiry::OnInactivity(time::Duration::minutes(
            state.config.session_inactivity_minutes,
        )));

    Router::new()
        .route("/style.css", get(res::stylesheet))
        .route("/chat.js", get(res::chat_script))
        .route("/theme", post(theme::toggle_theme))

        .merge(auth::router())
        .merge(rooms::router())
        .nest("/chat", chat::router())

        .fallback(fallback)
        .with_state(state)
        .layer(session_layer)
        .layer(TraceLayer::new_for_http())
}

#[debug_handler]
async fn fallback(session: Session) -> AppResult<Redirect> {
    if session::is_logged_in(&session).await? {
        Ok(Redirect::to("/dashboard"))
    } else {
        Ok(Redirect::to("/"))
    }
}


pub type AppResult<T> = Result<T, AppError>;
#[derive(Debug)]
pub struct AppError(pub anyhow::Error);

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        tracing::error!(error = %self.0, "request failed");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("{}\n\n{}", self.0, self.0.backtrace()),
        )
            .into_response()
    }
}

impl From<String> for AppError {
    fn from(err: String) -> Self {
        Self(anyhow::Error::msg(err))
    }
}

impl From<&str> for AppError {
    fn from(err: &str) -> Self {
        Self(anyhow::Error::msg(err.to_owned()))
    }
}

macro_rules! apperr_impl {
    ($E:ty) => {
        impl From<$E> for AppError {
            fn from(err: $E) -> Self {
                Self(anyhow::Error::from(err))
            }
        }
    };
}

apperr_impl!(serde_json::Error);
apperr_impl!(tower_sessions::session::Error);
apperr_impl!(axum::Error);
apperr_impl!(axum::extract::multipart::MultipartError);
apperr_impl!(reqwest::Error);
