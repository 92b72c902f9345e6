//! Process configuration, read from the environment (and `.env`).

use std::{fmt::Display, str::FromStr, time::Duration};

use anyhow::{anyhow, bail};

use crate::chat::ReplyDelay;

pub const DEFAULT_DIRECTORY_URL: &str = "https://restcountries.com/v3.1/all?fields=idd,name,cca2";

#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: String,
    /// Where the login view fetches its country/dial-code list from.
    pub country_directory_url: String,
    /// ISO alpha-2 code preselected on the login view when present in the directory.
    pub default_country: String,
    /// Simulated latency of "sending" and "verifying" a code.
    pub otp_delay: Duration,
    /// How long the success notice stays up before moving on to the dashboard.
    pub otp_confirm_delay: Duration,
    pub reply_delay: ReplyDelay,
    pub assistant_name: String,
    pub session_inactivity_minutes: i64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:8080".to_owned(),
            country_directory_url: DEFAULT_DIRECTORY_URL.to_owned(),
            default_country: "IN".to_owned(),
            otp_delay: Duration::from_millis(1200),
            otp_confirm_delay: Duration::from_millis(800),
            reply_delay: ReplyDelay::default(),
            assistant_name: "Gemini".to_owned(),
            session_inactivity_minutes: 60,
        }
    }
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| dotenv::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let defaults = Self::default();

        fn read<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> anyhow::Result<T>
        where
            T: FromStr,
            T::Err: Display,
        {
            match lookup(key) {
                Some(raw) => raw.trim().parse().map_err(|e| anyhow!("{key}={raw:?}: {e}")),
                None => Ok(default),
            }
        }

        let millis = |key: &str, default: Duration| -> anyhow::Result<Duration> {
            Ok(Duration::from_millis(read(&lookup, key, default.as_millis() as u64)?))
        };

        let reply_delay = ReplyDelay::new(
            millis("REPLY_DELAY_MIN_MS", defaults.reply_delay.min)?,
            millis("REPLY_DELAY_MAX_MS", defaults.reply_delay.max)?,
        );
        if reply_delay.min > reply_delay.max {
            bail!("REPLY_DELAY_MIN_MS must not exceed REPLY_DELAY_MAX_MS");
        }

        let session_inactivity_minutes: i64 = read(&lookup, "SESSION_INACTIVITY_MINUTES", defaults.session_inactivity_minutes)?;
        if session_inactivity_minutes <= 0 {
            bail!("SESSION_INACTIVITY_MINUTES must be positive");
        }

        Ok(Self {
            bind_addr: read(&lookup, "BIND_ADDR", defaults.bind_addr)?,
            country_directory_url: read(&lookup, "COUNTRY_DIRECTORY_URL", defaults.country_directory_url)?,
            default_country: read(&lookup, "DEFAULT_COUNTRY", defaults.default_country)?,
            otp_delay: millis("OTP_DELAY_MS", defaults.otp_delay)?,
            otp_confirm_delay: millis("OTP_CONFIRM_DELAY_MS", defaults.otp_confirm_delay)?,
            reply_delay,
            assistant_name: read(&lookup, "ASSISTANT_NAME", defaults.assistant_name)?,
            session_inactivity_minutes,
        })
    }

    /// Zero delays everywhere, for driving the app in tests.
    pub fn instant() -> Self {
        Self {
            otp_delay: Duration::ZERO,
            otp_confirm_delay: Duration::ZERO,
            reply_delay: ReplyDelay::new(Duration::ZERO, Duration::ZERO),
            ..Self::default()
        }
    }
}
