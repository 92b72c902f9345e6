use axum::{debug_handler, http::HeaderMap, response::{IntoResponse, Redirect, Response}, Form, Json};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;

use crate::{session::{self, DARK}, AppResult};

/// Light/dark preference. Loaded from the session at the start of each
/// request and handed to every page render.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Theme {
    pub dark: bool,
}

impl Theme {
    pub async fn load(session: &Session) -> AppResult<Theme> {
        Ok(Theme {
            dark: session.get::<bool>(DARK).await?.unwrap_or(false),
        })
    }

    pub async fn store(self, session: &Session) -> AppResult<()> {
        session.insert(DARK, self.dark).await?;
        Ok(())
    }

    pub fn toggled(self) -> Theme {
        Theme { dark: !self.dark }
    }

    pub fn class(self) -> &'static str {
        if self.dark { "dark" } else { "light" }
    }

    pub fn icon(self) -> &'static str {
        if self.dark { "🌙" } else { "☀️" }
    }
}

#[derive(Deserialize)]
pub(crate) struct ToggleForm {
    return_url: Option<String>,
}

/// Marks a toggle sent by the page script rather than a plain form submit.
pub const FETCH_HEADER: &str = "x-theme-fetch";

/// What the page script needs to restyle itself in place.
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct ThemeState {
    pub dark: bool,
    pub class: &'static str,
    pub icon: &'static str,
}

impl From<Theme> for ThemeState {
    fn from(theme: Theme) -> Self {
        ThemeState { dark: theme.dark, class: theme.class(), icon: theme.icon() }
    }
}

/// Flips the theme. A scripted toggle gets the new state back; a plain form
/// post is redirected.
#[debug_handler]
pub(crate) async fn toggle_theme(
    headers: HeaderMap,
    session: Session,
    Form(ToggleForm { return_url }): Form<ToggleForm>,
) -> AppResult<Response> {
    let theme = Theme::load(&session).await?.toggled();
    theme.store(&session).await?;
    tracing::debug!(dark = theme.dark, "theme toggled");

    if headers.contains_key(FETCH_HEADER) {
        return Ok(Json(ThemeState::from(theme)).into_response());
    }
    Ok(Redirect::to(&session::local_path(return_url)).into_response())
}

#[cfg(test)]
mod tests {
    use super::{Theme, ThemeState};

    #[test]
    fn test_toggle_flips() {
        let light = Theme::default();
        assert!(!light.dark);
        assert_eq!(light.class(), "light");

        let dark = light.toggled();
        assert!(dark.dark);
        assert_eq!(dark.class(), "dark");
        assert_eq!(dark.toggled(), light);
    }

    #[test]
    fn test_state_follows_theme() {
        let state = ThemeState::from(Theme { dark: true });

        assert_eq!(state, ThemeState { dark: true, class: "dark", icon: "🌙" });
    }
}
