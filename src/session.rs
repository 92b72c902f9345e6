use tower_sessions::Session;

use crate::AppResult;

pub(crate) const IS_LOGGED_IN: &str = "is_logged_in";
pub(crate) const DARK: &str = "dark";
pub(crate) const OTP_FLOW: &str = "otp_flow";
pub(crate) const DASHBOARD: &str = "dashboard";
pub(crate) const TOAST: &str = "toast";

pub async fn is_logged_in(session: &Session) -> AppResult<bool> {
    Ok(session.get::<bool>(IS_LOGGED_IN).await?.unwrap_or(false))
}

pub async fn set_logged_in(session: &Session, logged_in: bool) -> AppResult<()> {
    session.insert(IS_LOGGED_IN, logged_in).await?;
    Ok(())
}

/// Keeps redirects on this site. Anything else falls back to `/`.
pub(crate) fn local_path(url: Option<String>) -> String {
    match url {
        Some(url) if url.starts_with('/') && !url.starts_with("//") => url,
        _ => "/".to_owned(),
    }
}
