mod countries;
mod login;
mod logout;
pub mod otp;

use axum::{routing::{get, post}, Router};

use crate::AppState;

pub use countries::{default_country, parse_directory, Country, CountryDirectory};
pub use otp::{is_valid_phone, OtpError, OtpFlow};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(login::login_page))
        .route("/otp/send", post(login::send_otp))
        .route("/otp/verify", post(login::verify_otp))
        .route("/otp/back", post(login::back))
        .route("/logout", get(logout::logout))
}
