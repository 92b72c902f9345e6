use axum::{debug_handler, extract::State, response::{IntoResponse, Response}, Form};
use serde::Deserialize;
use tower_sessions::Session;

use std::sync::Arc;

use crate::{include_res, page::Page, res, session::{self, OTP_FLOW}, theme::Theme, AppResult, AppState, Config};

use super::{countries::{self, Country}, otp::{self, OtpError, OtpFlow}, CountryDirectory};

#[derive(Deserialize)]
pub(crate) struct SendOtpForm {
    #[serde(default)]
    country: String,
    #[serde(default)]
    phone: String,
}

#[derive(Deserialize)]
pub(crate) struct VerifyOtpForm {
    #[serde(default)]
    otp: String,
}

/// Inline feedback under the login form.
#[derive(Default)]
struct Notice {
    error: Option<String>,
    info: Option<String>,
}

impl Notice {
    fn error(e: OtpError) -> Self {
        Self { error: Some(e.to_string()), info: None }
    }

    fn info(info: String) -> Self {
        Self { error: None, info: Some(info) }
    }
}

/// What the phone-entry form should show.
struct PhoneEntry<'a> {
    countries: &'a [Country],
    selected: Option<&'a Country>,
    phone: &'a str,
}

async fn load_flow(session: &Session) -> AppResult<OtpFlow> {
    Ok(session.get::<OtpFlow>(OTP_FLOW).await?.unwrap_or_default())
}

fn render(theme: Theme, flow: &OtpFlow, entry: Option<PhoneEntry>, notice: Notice) -> Response {
    let form = match flow {
        OtpFlow::EnteringPhone => {
            let entry = entry.unwrap_or(PhoneEntry { countries: &[], selected: None, phone: "" });
            let options: String = entry.countries
                .iter()
                .map(|c| {
                    let selected = entry.selected.is_some_and(|s| s.code == c.code);
                    include_res!(str, "/pages/login/option.html")
                        .replace("{selected}", if selected { " selected" } else { "" })
                        .replace("{code}", &res::escape(&c.code))
                        .replace("{dial_code}", &res::escape(&c.dial_code))
                        .replace("{name}", &res::escape(&c.name))
                })
                .collect();

            include_res!(str, "/pages/login/phone.html")
                .replace("{dial_code}", &entry.selected.map(|c| res::escape(&c.dial_code)).unwrap_or_default())
                .replace("{phone}", &res::escape(entry.phone))
                .replace("{options}", &options)
        }
        OtpFlow::EnteringCode { country, .. } => {
            include_res!(str, "/pages/login/code.html")
                .replace("{dial_code}", &res::escape(&country.dial_code))
        }
    };

    let body = include_res!(str, "/pages/login/login.html")
        .replace("{error}", &notice.error.map(|e| format!("<div class=\"error\">{}</div>", res::escape(&e))).unwrap_or_default())
        .replace("{info}", &notice.info.map(|i| format!("<div class=\"info\">{}</div>", res::escape(&i))).unwrap_or_default())
        .replace("{form}", &form);

    Page::new("OTP Login / Signup", "/", theme)
        .render(&body)
        .into_response()
}

#[debug_handler(state = AppState)]
pub(crate) async fn login_page(
    State(directory): State<Arc<CountryDirectory>>,
    State(config): State<Arc<Config>>,
    session: Session,
) -> AppResult<Response> {
    let theme = Theme::load(&session).await?;
    // a fresh visit starts over
    session.remove::<OtpFlow>(OTP_FLOW).await?;

    let countries = directory.countries().await;
    let entry = PhoneEntry {
        countries: &countries,
        selected: countries::default_country(&countries, &config.default_country),
        phone: "",
    };

    Ok(render(theme, &OtpFlow::EnteringPhone, Some(entry), Notice::default()))
}

#[debug_handler(state = AppState)]
pub(crate) async fn send_otp(
    State(directory): State<Arc<CountryDirectory>>,
    State(config): State<Arc<Config>>,
    session: Session,
    Form(SendOtpForm { country, phone }): Form<SendOtpForm>,
) -> AppResult<Response> {
    let theme = Theme::load(&session).await?;
    let countries = directory.countries().await;
    let selected = countries::find(&countries, &country);

    let selected = match otp::check_phone(selected, &phone) {
        Ok(selected) => selected,
        Err(e) => {
            let entry = PhoneEntry {
                countries: &countries,
                selected: selected.or_else(|| countries::default_country(&countries, &config.default_country)),
                phone: &phone,
            };
            return Ok(render(theme, &OtpFlow::EnteringPhone, Some(entry), Notice::error(e)));
        }
    };

    tokio::time::sleep(config.otp_delay).await;

    let code = otp::generate_code(&mut rand::rng());
    tracing::info!(country = %selected.code, "otp sent");

    let info = format!("OTP sent! (Demo: {code})");
    let flow = OtpFlow::code_sent(selected.clone(), phone, code);
    session.insert(OTP_FLOW, &flow).await?;

    Ok(render(theme, &flow, None, Notice::info(info)))
}

#[debug_handler(state = AppState)]
pub(crate) async fn verify_otp(
    State(directory): State<Arc<CountryDirectory>>,
    State(config): State<Arc<Config>>,
    session: Session,
    Form(VerifyOtpForm { otp }): Form<VerifyOtpForm>,
) -> AppResult<Response> {
    let theme = Theme::load(&session).await?;
    let flow = load_flow(&session).await?;

    if !otp.is_empty() {
        tokio::time::sleep(config.otp_delay).await;
    }

    if let Err(e) = flow.verify(&otp) {
        tracing::debug!(error = %e, "otp rejected");
        if let OtpError::NotSent = e {
            let countries = directory.countries().await;
            let entry = PhoneEntry {
                countries: &countries,
                selected: countries::default_country(&countries, &config.default_country),
                phone: "",
            };
            return Ok(render(theme, &flow, Some(entry), Notice::error(e)));
        }
        return Ok(render(theme, &flow, None, Notice::error(e)));
    }

    session.remove::<OtpFlow>(OTP_FLOW).await?;
    session::set_logged_in(&session, true).await?;
    tracing::info!("login succeeded");

    let refresh = format!(
        "<meta http-equiv=\"refresh\" content=\"{:.1};url=/dashboard\">",
        config.otp_confirm_delay.as_secs_f64()
    );
    Ok(
        Page::new("OTP Login / Signup", "/dashboard", theme)
            .with_head(&refresh)
            .render(include_res!(str, "/pages/login/success.html"))
            .into_response()
    )
}

#[debug_handler(state = AppState)]
pub(crate) async fn back(
    State(directory): State<Arc<CountryDirectory>>,
    State(config): State<Arc<Config>>,
    session: Session,
) -> AppResult<Response> {
    let theme = Theme::load(&session).await?;
    let flow = load_flow(&session).await?;

    let countries = directory.countries().await;
    let selected = flow
        .country()
        .and_then(|c| countries::find(&countries, &c.code))
        .or_else(|| countries::default_country(&countries, &config.default_country));
    // only the code is cleared; the number stays in the form
    let entry = PhoneEntry { countries: &countries, selected, phone: flow.phone() };

    let back = flow.clone().back();
    session.insert(OTP_FLOW, &back).await?;

    Ok(render(theme, &back, Some(entry), Notice::default()))
}
