use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::countries::Country;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OtpError {
    #[error("Please select country and enter your phone number.")]
    MissingPhone,
    #[error("Enter a valid phone number as per country code (6-15 digits).")]
    InvalidPhone,
    #[error("Please enter the OTP.")]
    EmptyCode,
    #[error("Invalid OTP. Please try again.")]
    Mismatch,
    #[error("Please request an OTP first.")]
    NotSent,
}

/// Where a visitor is in the login flow.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "step", rename_all = "snake_case")]
pub enum OtpFlow {
    #[default]
    EnteringPhone,
    EnteringCode {
        country: Country,
        phone: String,
        code: String,
    },
}

/// Exactly ten ASCII digits.
pub fn is_valid_phone(phone: &str) -> bool {
    phone.len() == 10 && phone.bytes().all(|b| b.is_ascii_digit())
}

pub fn check_phone<'a>(country: Option<&'a Country>, phone: &str) -> Result<&'a Country, OtpError> {
    let Some(country) = country.filter(|_| !phone.is_empty()) else {
        return Err(OtpError::MissingPhone);
    };
    if !is_valid_phone(phone) {
        return Err(OtpError::InvalidPhone);
    }
    Ok(country)
}

pub fn generate_code(rng: &mut impl Rng) -> String {
    rng.random_range(100_000..=999_999u32).to_string()
}

impl OtpFlow {
    pub fn code_sent(country: Country, phone: String, code: String) -> Self {
        OtpFlow::EnteringCode { country, phone, code }
    }

    /// Compares `input` with the sent code as plain strings. A failed check
    /// leaves the flow where it is.
    pub fn verify(&self, input: &str) -> Result<(), OtpError> {
        let OtpFlow::EnteringCode { code, .. } = self else {
            return Err(OtpError::NotSent);
        };
        if input.is_empty() {
            return Err(OtpError::EmptyCode);
        }
        if input != code {
            return Err(OtpError::Mismatch);
        }
        Ok(())
    }

    pub fn back(self) -> Self {
        OtpFlow::EnteringPhone
    }

    pub fn country(&self) -> Option<&Country> {
        match self {
            OtpFlow::EnteringPhone => None,
            OtpFlow::EnteringCode { country, .. } => Some(country),
        }
    }

    /// The number a code was sent to. Empty before sending.
    pub fn phone(&self) -> &str {
        match self {
            OtpFlow::EnteringPhone => "",
            OtpFlow::EnteringCode { phone, .. } => phone,
        }
    }
}
