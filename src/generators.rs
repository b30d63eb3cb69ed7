//! Generator bindings: parameter parsing and presentation for each command.
//!
//! Parameters are never rejected. Anything unparseable or out of range is
//! replaced by the command's default, and the resolved value is reported
//! back so the caller can replay the exact invocation.

use chrono::{Months, NaiveDate};
use lazy_static::lazy_static;
use rand::Rng;
use regex::Regex;
use serde::Serialize;
use uuid::Uuid;

use crate::cache::ResultCache;
use crate::error::GenerationError;
use crate::faker::FakeData;
use crate::result::Tooltip;
use crate::secure::{generate_password, generate_pin, resolve_pin_length, PasswordSettings};

/// Word count used when the request is missing or out of range
pub const DEFAULT_LOREM_WORDS: usize = 10;

/// Most words a lorem request may ask for
pub const MAX_LOREM_WORDS: usize = 100;

/// Range used by `number` without parameters
pub const DEFAULT_NUMBER_RANGE: (i64, i64) = (1, 100);

/// Years either side of today covered by `date`
const DATE_SPAN_YEARS: u32 = 10;

lazy_static! {
    static ref RE_NUMBER_RANGE: Regex =
        Regex::new(r"^\s*(-?\d+)?(?:(?:\s+|\s*-\s*)(-?\d+))?").unwrap();
}

/// Everything a generator needs besides its parameter
pub struct GenerationContext<'a> {
    pub faker: &'a dyn FakeData,
    pub cache: &'a ResultCache,
    pub today: NaiveDate,
}

/// A produced value with its presentation text
#[derive(Debug, Clone)]
pub struct Generated {
    /// Canonical command name
    pub command: &'static str,
    pub value: String,
    /// Resolved parameter, replayable through the parser
    pub parameter: Option<String>,
    pub display_text: String,
    pub subtitle: String,
    pub tooltip: Tooltip,
}

impl Generated {
    fn plain(command: &'static str, value: String, subject: &str, tooltip: Tooltip) -> Self {
        Self {
            command,
            value,
            parameter: None,
            display_text: command.to_string(),
            subtitle: format!("{subject} - Click to copy"),
            tooltip,
        }
    }
}

/// The generator bound to a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Generator {
    Password,
    Pin,
    Email,
    Name,
    Address,
    Phone,
    Company,
    Lorem,
    Number,
    Date,
    Guid,
    Color,
    Url,
    CreditCard,
}

impl Generator {
    /// Produce a value for `parameter`. Fails only when the fake data
    /// provider does.
    pub fn generate(
        self,
        parameter: Option<&str>,
        ctx: &GenerationContext<'_>,
    ) -> Result<Generated, GenerationError> {
        let generated = match self {
            Generator::Password => password(parameter, ctx.cache),
            Generator::Pin => pin(parameter),
            Generator::Email => Generated::plain(
                "email",
                ctx.faker.email()?,
                "Random email address",
                Tooltip::new("Random Email", "Generated fake email address for testing purposes"),
            ),
            Generator::Name => Generated::plain(
                "name",
                ctx.faker.full_name()?,
                "Random full name",
                Tooltip::new("Random Name", "Generated fake person name"),
            ),
            Generator::Address => Generated::plain(
                "address",
                ctx.faker.full_address()?,
                "Random address",
                Tooltip::new("Random Address", "Generated fake address for testing"),
            ),
            Generator::Phone => Generated::plain(
                "phone",
                ctx.faker.phone_number()?,
                "Random phone number",
                Tooltip::new("Random Phone", "Generated fake phone number"),
            ),
            Generator::Company => Generated::plain(
                "company",
                ctx.faker.company_name()?,
                "Random company name",
                Tooltip::new("Random Company", "Generated fake company name"),
            ),
            Generator::Lorem => lorem(parameter, ctx.faker)?,
            Generator::Number => number(parameter),
            Generator::Date => {
                let (start, end) = date_window(ctx.today);
                Generated::plain(
                    "date",
                    ctx.faker.date_between(start, end)?,
                    "Random date",
                    Tooltip::new("Random Date", "Generated random date in ISO format"),
                )
            }
            Generator::Guid => Generated::plain(
                "guid",
                Uuid::new_v4().to_string(),
                "Random GUID/UUID",
                Tooltip::new("Random GUID", "Generated unique identifier"),
            ),
            Generator::Color => Generated::plain(
                "color",
                ctx.faker.color()?,
                "Random hex color",
                Tooltip::new("Random Color", "Generated hexadecimal color code"),
            ),
            Generator::Url => Generated::plain(
                "url",
                ctx.faker.url()?,
                "Random URL",
                Tooltip::new("Random URL", "Generated fake web address"),
            ),
            Generator::CreditCard => Generated::plain(
                "creditcard",
                ctx.faker.credit_card_number()?,
                "Random credit card number (fake)",
                Tooltip::new(
                    "Random Credit Card",
                    "Generated fake credit card number for testing",
                ),
            ),
        };
        Ok(generated)
    }

    /// Cache key this invocation would use, for commands that cache.
    pub fn cache_key(self, parameter: Option<&str>) -> Option<String> {
        match self {
            Generator::Password => Some(PasswordSettings::from_parameter(parameter).cache_key()),
            _ => None,
        }
    }
}

// ============================================================================
// Per-command generation
// ============================================================================

fn password(parameter: Option<&str>, cache: &ResultCache) -> Generated {
    let settings = PasswordSettings::from_parameter(parameter);
    let length = settings.effective_length();
    let value = cache.get_or_insert_with(&settings.cache_key(), || generate_password(&settings));
    let resolved = settings.to_parameter();

    Generated {
        command: "password",
        value,
        display_text: format!("password {resolved}"),
        parameter: Some(resolved),
        subtitle: format!("Secure password ({length} characters) - Click to copy"),
        tooltip: Tooltip::new(
            "Secure Password",
            format!(
                "Generated {length}-character password with {}",
                settings.describe_classes()
            ),
        ),
    }
}

fn pin(parameter: Option<&str>) -> Generated {
    let length = resolve_pin_length(parameter);
    Generated {
        command: "pin",
        value: generate_pin(length),
        parameter: Some(length.to_string()),
        display_text: format!("pin {length}"),
        subtitle: format!("Secure {length}-digit PIN - Click to copy"),
        tooltip: Tooltip::new(
            "Secure PIN",
            format!("Generated cryptographically secure {length}-digit PIN code"),
        ),
    }
}

fn lorem(parameter: Option<&str>, faker: &dyn FakeData) -> Result<Generated, GenerationError> {
    let count = resolve_word_count(parameter);
    let text = faker.lorem_words(count)?.join(" ");
    Ok(Generated {
        command: "lorem",
        value: text,
        parameter: Some(count.to_string()),
        display_text: format!("lorem {count}"),
        subtitle: format!("Lorem ipsum ({count} words) - Click to copy"),
        tooltip: Tooltip::new(
            "Lorem Ipsum",
            format!("Generated {count} words of placeholder text"),
        ),
    })
}

fn number(parameter: Option<&str>) -> Generated {
    let (min, max) = parse_number_range(parameter);
    let value = rand::rng().random_range(min..=max).to_string();
    Generated {
        command: "number",
        value,
        parameter: Some(format!("{min}-{max}")),
        display_text: format!("number {min}-{max}"),
        subtitle: format!("Random number between {min} and {max} - Click to copy"),
        tooltip: Tooltip::new(
            "Random Number",
            format!("Generated random integer in range [{min}, {max}]"),
        ),
    }
}

// ============================================================================
// Parameter parsing
// ============================================================================

/// Lorem word count: 1..=100, otherwise 10.
pub fn resolve_word_count(parameter: Option<&str>) -> usize {
    match parameter.and_then(|p| p.split_whitespace().next()?.parse::<usize>().ok()) {
        Some(count) if (1..=MAX_LOREM_WORDS).contains(&count) => count,
        _ => DEFAULT_LOREM_WORDS,
    }
}

/// Parse `min-max` or `min max` (either side optional, negatives allowed)
/// into an ordered inclusive range. Missing or unparseable bounds use 1 and 100.
pub fn parse_number_range(parameter: Option<&str>) -> (i64, i64) {
    let (mut min, mut max) = DEFAULT_NUMBER_RANGE;

    if let Some(caps) = parameter.and_then(|p| RE_NUMBER_RANGE.captures(p)) {
        if let Some(parsed) = caps.get(1).and_then(|m| m.as_str().parse().ok()) {
            min = parsed;
        }
        if let Some(parsed) = caps.get(2).and_then(|m| m.as_str().parse().ok()) {
            max = parsed;
        }
    }

    if min > max {
        std::mem::swap(&mut min, &mut max);
    }
    (min, max)
}

/// Today minus and plus ten years, clamped to the calendar's limits.
fn date_window(today: NaiveDate) -> (NaiveDate, NaiveDate) {
    let span = Months::new(DATE_SPAN_YEARS * 12);
    (
        today.checked_sub_months(span).unwrap_or(NaiveDate::MIN),
        today.checked_add_months(span).unwrap_or(NaiveDate::MAX),
    )
}

// ============================================================================
// Tests
// ============================================================================
