use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use crate::error::ProcessorError;

/// Raw card data, only ever handed to the tokenization call.
///
/// Number and CVC stay wrapped so `Debug` output and log lines never
/// contain them.
#[derive(Debug)]
pub struct CardDetails {
    pub number: SecretString,
    pub exp_month: u8,
    pub exp_year: u16,
    pub cvc: SecretString,
}

impl CardDetails {
    pub fn new(
        number: impl Into<String>,
        exp_month: u8,
        exp_year: u16,
        cvc: impl Into<String>,
    ) -> Self {
        Self {
            number: SecretString::new(number.into()),
            exp_month,
            exp_year,
            cvc: SecretString::new(cvc.into()),
        }
    }

    pub fn validate(&self) -> Result<(), ProcessorError> {
        if self.number.expose_secret().trim().is_empty() {
            return Err(ProcessorError::Validation("card number is required".into()));
        }
        if self.cvc.expose_secret().trim().is_empty() {
            return Err(ProcessorError::Validation("card cvc is required".into()));
        }
        if !(1..=12).contains(&self.exp_month) {
            return Err(ProcessorError::Validation(format!(
                "card expiry month {} is out of range",
                self.exp_month
            )));
        }
        if self.exp_year == 0 {
            return Err(ProcessorError::Validation("card expiry year is required".into()));
        }
        Ok(())
    }

    /// Form fields for the tokenization request.
    pub(crate) fn form_fields(&self) -> Vec<(&'static str, String)> {
        vec![
            ("card[number]", self.number.expose_secret().clone()),
            ("card[exp_month]", self.exp_month.to_string()),
            ("card[exp_year]", self.exp_year.to_string()),
            ("card[cvc]", self.cvc.expose_secret().clone()),
        ]
    }
}

/// Single use token the processor issues in exchange for card details.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Token {
    pub id: String,
    #[serde(default)]
    pub used: bool,
    #[serde(default)]
    pub livemode: bool,
}
