//! Fake data provider for human-looking values.
//!
//! The dispatcher only sees the [`FakeData`] trait; [`LocaleFaker`] is the
//! default implementation backed by the `fake` crate. Each call draws from
//! the calling thread's RNG, so no provider state is shared across threads.
//! None of these values are security relevant.

use chrono::NaiveDate;
use fake::faker::address::raw::{BuildingNumber, CityName, StateAbbr, StreetName, ZipCode};
use fake::faker::company::raw::CompanyName;
use fake::faker::creditcard::raw::CreditCardNumber;
use fake::faker::impls::address::CityNameGenFn;
use fake::faker::internet::raw::{DomainSuffix, SafeEmail};
use fake::faker::lorem::raw::{Word, Words};
use fake::faker::name::raw::Name;
use fake::faker::phone_number::raw::PhoneNumber;
use fake::locales::{Data, DE_DE, EN, FR_FR, PT_BR};
use fake::Fake;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{ConfigError, GenerationError};

/// Source of locale-aware fake values.
pub trait FakeData: Send + Sync {
    fn email(&self) -> Result<String, GenerationError>;
    fn full_name(&self) -> Result<String, GenerationError>;
    fn full_address(&self) -> Result<String, GenerationError>;
    fn phone_number(&self) -> Result<String, GenerationError>;
    fn company_name(&self) -> Result<String, GenerationError>;
    fn lorem_words(&self, count: usize) -> Result<Vec<String>, GenerationError>;
    /// Hex color such as `#1f8a4c`
    fn color(&self) -> Result<String, GenerationError>;
    fn url(&self) -> Result<String, GenerationError>;
    fn credit_card_number(&self) -> Result<String, GenerationError>;
    /// ISO date (`YYYY-MM-DD`) in `[start, end]`
    fn date_between(&self, start: NaiveDate, end: NaiveDate) -> Result<String, GenerationError>;
}

// ============================================================================
// Locale
// ============================================================================

/// Locales the default provider can draw from
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Locale {
    #[default]
    En,
    FrFr,
    DeDe,
    PtBr,
}

impl Locale {
    pub fn as_str(&self) -> &'static str {
        match self {
            Locale::En => "en",
            Locale::FrFr => "fr_fr",
            Locale::DeDe => "de_de",
            Locale::PtBr => "pt_br",
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Locale {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "en" | "en_us" => Ok(Locale::En),
            "fr" | "fr_fr" => Ok(Locale::FrFr),
            "de" | "de_de" => Ok(Locale::DeDe),
            "pt" | "pt_br" => Ok(Locale::PtBr),
            _ => Err(ConfigError::UnknownLocale(s.to_string())),
        }
    }
}

// ============================================================================
// Default Provider
// ============================================================================

/// [`FakeData`] backed by the `fake` crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocaleFaker {
    locale: Locale,
}

impl LocaleFaker {
    pub fn new(locale: Locale) -> Self {
        Self { locale }
    }

    fn sample(&self, field: Field) -> String {
        match self.locale {
            Locale::En => sample_in(EN, field),
            Locale::FrFr => sample_in(FR_FR, field),
            Locale::DeDe => sample_in(DE_DE, field),
            Locale::PtBr => sample_in(PT_BR, field),
        }
    }

    fn words(&self, count: usize) -> Vec<String> {
        let mut rng = rand::rng();
        let range = count..count + 1;
        match self.locale {
            Locale::En => Words(EN, range).fake_with_rng(&mut rng),
            Locale::FrFr => Words(FR_FR, range).fake_with_rng(&mut rng),
            Locale::DeDe => Words(DE_DE, range).fake_with_rng(&mut rng),
            Locale::PtBr => Words(PT_BR, range).fake_with_rng(&mut rng),
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Field {
    Email,
    Name,
    Address,
    Phone,
    Company,
    Url,
    CreditCard,
}

/// `CityName` composes per-locale patterns, hence the extra bound.
fn sample_in<L: Data + CityNameGenFn + Copy>(locale: L, field: Field) -> String {
    let mut rng = rand::rng();
    match field {
        Field::Email => SafeEmail(locale).fake_with_rng(&mut rng),
        Field::Name => Name(locale).fake_with_rng(&mut rng),
        Field::Address => {
            let building: String = BuildingNumber(locale).fake_with_rng(&mut rng);
            let street: String = StreetName(locale).fake_with_rng(&mut rng);
            let city: String = CityName(locale).fake_with_rng(&mut rng);
            let state: String = StateAbbr(locale).fake_with_rng(&mut rng);
            let zip: String = ZipCode(locale).fake_with_rng(&mut rng);
            format!("{building} {street}, {city}, {state} {zip}")
        }
        Field::Phone => PhoneNumber(locale).fake_with_rng(&mut rng),
        Field::Company => CompanyName(locale).fake_with_rng(&mut rng),
        Field::Url => {
            let word: String = Word(locale).fake_with_rng(&mut rng);
            let suffix: String = DomainSuffix(locale).fake_with_rng(&mut rng);
            let host: String = word
                .chars()
                .filter(char::is_ascii_alphanumeric)
                .collect::<String>()
                .to_ascii_lowercase();
            let host = if host.is_empty() { "example".to_string() } else { host };
            format!("https://www.{host}.{suffix}")
        }
        Field::CreditCard => CreditCardNumber(locale).fake_with_rng(&mut rng),
    }
}

impl FakeData for LocaleFaker {
    fn email(&self) -> Result<String, GenerationError> {
        Ok(self.sample(Field::Email))
    }

    fn full_name(&self) -> Result<String, GenerationError> {
        Ok(self.sample(Field::Name))
    }

    fn full_address(&self) -> Result<String, GenerationError> {
        Ok(self.sample(Field::Address))
    }

    fn phone_number(&self) -> Result<String, GenerationError> {
        Ok(self.sample(Field::Phone))
    }

    fn company_name(&self) -> Result<String, GenerationError> {
        Ok(self.sample(Field::Company))
    }

    fn lorem_words(&self, count: usize) -> Result<Vec<String>, GenerationError> {
        Ok(self.words(count))
    }

    fn color(&self) -> Result<String, GenerationError> {
        let rgb: u32 = rand::rng().random_range(0..=0x00FF_FFFF);
        Ok(format!("#{rgb:06x}"))
    }

    fn url(&self) -> Result<String, GenerationError> {
        Ok(self.sample(Field::Url))
    }

    fn credit_card_number(&self) -> Result<String, GenerationError> {
        Ok(self.sample(Field::CreditCard))
    }

    fn date_between(&self, start: NaiveDate, end: NaiveDate) -> Result<String, GenerationError> {
        let (start, end) = if start <= end { (start, end) } else { (end, start) };
        let span = (end - start).num_days();
        let offset = rand::rng().random_range(0..=span);
        let date = start
            .checked_add_signed(chrono::Duration::days(offset))
            .unwrap_or(start);
        Ok(date.format("%Y-%m-%d").to_string())
    }
}

// ============================================================================
// Tests
// ============================================================================
