//! Localization — supported currencies and languages, conversion, formatting.
//!
//! DESIGN
//! ======
//! Venue rates are stored in the venue's currency; quotes are computed in
//! that currency and only *displayed* in the viewer's. Conversion uses fixed
//! per-currency USD rates, overridable through environment variables, so the
//! numbers a customer is charged never depend on a live rate feed.

use serde::{Deserialize, Serialize};

use crate::pricing::round_cents;

const DEFAULT_EUR_TO_USD: f64 = 1.09;
const DEFAULT_GBP_TO_USD: f64 = 1.27;

// =============================================================================
// CURRENCY
// =============================================================================

/// Currencies the marketplace prices in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    Usd,
    Eur,
    Gbp,
}

impl Currency {
    /// ISO 4217 code, as stored in the database.
    #[must_use]
    pub fn code(self) -> &'static str {
        match self {
            Self::Usd => "USD",
            Self::Eur => "EUR",
            Self::Gbp => "GBP",
        }
    }

    #[must_use]
    pub fn symbol(self) -> &'static str {
        match self {
            Self::Usd => "$",
            Self::Eur => "€",
            Self::Gbp => "£",
        }
    }

    /// Parse an ISO code, case-insensitively.
    #[must_use]
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim().to_ascii_uppercase().as_str() {
            "USD" => Some(Self::Usd),
            "EUR" => Some(Self::Eur),
            "GBP" => Some(Self::Gbp),
            _ => None,
        }
    }

    /// USD value of one unit of this currency.
    fn usd_rate(self) -> f64 {
        match self {
            Self::Usd => 1.0,
            Self::Eur => env_rate("CURRENCY_EUR_USD_RATE", DEFAULT_EUR_TO_USD),
            Self::Gbp => env_rate("CURRENCY_GBP_USD_RATE", DEFAULT_GBP_TO_USD),
        }
    }
}

fn env_rate(key: &str, default: f64) -> f64 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<f64>().ok())
        .filter(|r| *r > 0.0)
        .unwrap_or(default)
}

/// Convert an amount between currencies, rounded to cents.
#[must_use]
pub fn convert(amount: f64, from: Currency, to: Currency) -> f64 {
    if from == to {
        return round_cents(amount);
    }
    round_cents(amount * from.usd_rate() / to.usd_rate())
}

/// Format an amount with the currency symbol and thousands grouping,
/// e.g. `$1,234.50`.
#[must_use]
pub fn format_amount(amount: f64, currency: Currency) -> String {
    let cents = crate::pricing::to_cents(amount.abs());
    let whole = cents / 100;
    let frac = cents % 100;
    let mut grouped = String::new();
    let digits = whole.to_string();
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    let sign = if amount < 0.0 && cents > 0 { "-" } else { "" };
    format!("{sign}{}{grouped}.{frac:02}", currency.symbol())
}

// =============================================================================
// LANGUAGE / LOCALE
// =============================================================================

/// Languages notification templates exist for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    En,
    Es,
    Fr,
}

impl Language {
    #[must_use]
    pub fn tag(self) -> &'static str {
        match self {
            Self::En => "en",
            Self::Es => "es",
            Self::Fr => "fr",
        }
    }

    /// Parse a BCP 47-ish tag (`en`, `en-US`, `es_MX`); unknown tags fall
    /// back to English.
    #[must_use]
    pub fn from_tag(tag: &str) -> Self {
        let primary = tag
            .trim()
            .split(['-', '_'])
            .next()
            .unwrap_or("")
            .to_ascii_lowercase();
        match primary.as_str() {
            "es" => Self::Es,
            "fr" => Self::Fr,
            _ => Self::En,
        }
    }
}

/// A user's display preferences, resolved from their profile row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Locale {
    pub language: Language,
    pub currency: Currency,
}

impl Default for Locale {
    fn default() -> Self {
        Self { language: Language::En, currency: Currency::Usd }
    }
}

impl Locale {
    /// Build a locale from stored profile fields, tolerating bad data.
    #[must_use]
    pub fn from_profile(language_tag: &str, currency_code: &str) -> Self {
        Self {
            language: Language::from_tag(language_tag),
            currency: Currency::from_code(currency_code).unwrap_or(Currency::Usd),
        }
    }
}

#[cfg(test)]
#[path = "localization_test.rs"]
mod tests;
