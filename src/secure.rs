//! Cryptographically secure password and PIN generation.
//!
//! Every generator here is generic over `R: CryptoRng`, so a fast
//! statistical PRNG cannot be handed in by mistake. The convenience entry
//! points draw from the operating system RNG directly; no RNG state is
//! shared between calls.

use rand::rngs::OsRng;
use rand::seq::SliceRandom;
use rand::{CryptoRng, Rng, TryRngCore};
use serde::Serialize;

// ============================================================================
// Constants
// ============================================================================

const LOWERCASE: &[u8] = b"abcdefghijklmnopqrstuvwxyz";
const UPPERCASE: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ";
const DIGITS: &[u8] = b"0123456789";
const SYMBOLS: &[u8] = b"!@#$%^&*()_+-=[]{}|;:,.<>?";

/// Password length used when the request is missing or out of range
pub const DEFAULT_PASSWORD_LENGTH: usize = 12;

/// Longest password a caller may request
pub const MAX_PASSWORD_LENGTH: usize = 128;

/// PIN length used when the request is not 4 or 6
pub const DEFAULT_PIN_LENGTH: usize = 4;

/// Candidates drawn before a weak PIN is accepted anyway
pub const MAX_PIN_ATTEMPTS: usize = 100;

// ============================================================================
// Password Settings
// ============================================================================

/// Which character classes a password draws from, and how long it is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PasswordSettings {
    pub include_lowercase: bool,
    pub include_uppercase: bool,
    pub include_numeric: bool,
    pub include_special: bool,
    pub length: usize,
}

impl Default for PasswordSettings {
    fn default() -> Self {
        Self {
            include_lowercase: true,
            include_uppercase: true,
            include_numeric: true,
            include_special: true,
            length: DEFAULT_PASSWORD_LENGTH,
        }
    }
}

impl PasswordSettings {
    /// Build settings from parameter tokens such as `"16 no-symbols"`.
    ///
    /// The first numeric token is the length (1..=128, otherwise 12).
    /// `no-lower`, `no-upper`, `no-digits` and `no-symbols` switch a class
    /// off. Unknown tokens are ignored.
    pub fn from_parameter(parameter: Option<&str>) -> Self {
        let mut settings = Self::default();
        let mut length_seen = false;

        for token in parameter.unwrap_or_default().split_whitespace() {
            let flag = token.to_ascii_lowercase().replace('-', "");
            match flag.as_str() {
                "nolower" | "nolowercase" => settings.include_lowercase = false,
                "noupper" | "nouppercase" => settings.include_uppercase = false,
                "nodigits" | "nonumbers" | "nonumeric" => settings.include_numeric = false,
                "nosymbols" | "nospecial" => settings.include_special = false,
                _ if !length_seen => {
                    if let Ok(requested) = token.parse::<i64>() {
                        length_seen = true;
                        settings.length = clamp_password_length(requested);
                    }
                }
                _ => {}
            }
        }

        settings.with_fallback()
    }

    /// Settings actually used for generation: lowercase+uppercase when
    /// every class is switched off.
    pub fn with_fallback(self) -> Self {
        if self.enabled_classes().is_empty() {
            Self {
                include_lowercase: true,
                include_uppercase: true,
                ..self
            }
        } else {
            self
        }
    }

    /// Length of the generated password: never below one character per class.
    pub fn effective_length(&self) -> usize {
        self.length.max(self.with_fallback().enabled_classes().len())
    }

    /// Canonical parameter string, replayable through the query parser.
    pub fn to_parameter(&self) -> String {
        let mut parts = vec![self.length.to_string()];
        for (enabled, flag) in [
            (self.include_lowercase, "no-lower"),
            (self.include_uppercase, "no-upper"),
            (self.include_numeric, "no-digits"),
            (self.include_special, "no-symbols"),
        ] {
            if !enabled {
                parts.push(flag.to_string());
            }
        }
        parts.join(" ")
    }

    /// Cache key for these settings, e.g. `password_12`.
    pub fn cache_key(&self) -> String {
        format!("password_{}", self.to_parameter().replace(' ', "_"))
    }

    /// Human summary of the enabled classes, for tooltips.
    pub fn describe_classes(&self) -> String {
        let names: Vec<&str> = [
            (self.include_lowercase, "lowercase"),
            (self.include_uppercase, "uppercase"),
            (self.include_numeric, "numbers"),
            (self.include_special, "symbols"),
        ]
        .into_iter()
        .filter_map(|(enabled, name)| enabled.then_some(name))
        .collect();
        names.join(", ")
    }

    fn enabled_classes(&self) -> Vec<&'static [u8]> {
        [
            (self.include_lowercase, LOWERCASE),
            (self.include_uppercase, UPPERCASE),
            (self.include_numeric, DIGITS),
            (self.include_special, SYMBOLS),
        ]
        .into_iter()
        .filter_map(|(enabled, class)| enabled.then_some(class))
        .collect()
    }
}

fn clamp_password_length(requested: i64) -> usize {
    match usize::try_from(requested) {
        Ok(length) if (1..=MAX_PASSWORD_LENGTH).contains(&length) => length,
        _ => DEFAULT_PASSWORD_LENGTH,
    }
}

// ============================================================================
// Password
// ============================================================================

/// Generate a password from the operating system RNG.
pub fn generate_password(settings: &PasswordSettings) -> String {
    generate_password_with(settings, &mut OsRng.unwrap_err())
}

/// Generate a password from a caller-supplied cryptographic RNG.
///
/// One character of every enabled class is placed first, the rest is drawn
/// uniformly from the combined pool, then the whole buffer is shuffled so
/// the guaranteed characters have no predictable position.
pub fn generate_password_with<R: CryptoRng>(settings: &PasswordSettings, rng: &mut R) -> String {
    let settings = settings.with_fallback();
    let classes = settings.enabled_classes();
    let pool: Vec<u8> = classes.concat();
    let length = settings.effective_length();

    let mut password: Vec<u8> = Vec::with_capacity(length);
    for class in &classes {
        password.push(pick(class, rng));
    }
    while password.len() < length {
        password.push(pick(&pool, rng));
    }

    // Fisher-Yates
    password.shuffle(rng);

    password.into_iter().map(char::from).collect()
}

fn pick<R: CryptoRng>(set: &[u8], rng: &mut R) -> u8 {
    set[rng.random_range(0..set.len())]
}

// ============================================================================
// PIN
// ============================================================================

/// Resolve a requested PIN length: 4 or 6, anything else becomes 4.
pub fn resolve_pin_length(requested: Option<&str>) -> usize {
    match requested.and_then(|p| p.split_whitespace().next()?.parse::<usize>().ok()) {
        Some(length @ (4 | 6)) => length,
        _ => DEFAULT_PIN_LENGTH,
    }
}

/// Generate a PIN from the operating system RNG.
pub fn generate_pin(length: usize) -> String {
    generate_pin_with(length, &mut OsRng.unwrap_err())
}

/// Generate a PIN, redrawing weak candidates up to [`MAX_PIN_ATTEMPTS`] times.
///
/// If every attempt is weak the last candidate is returned as is. With
/// 10^4 candidates and 30 weak ones, that needs 100 consecutive weak draws.
pub fn generate_pin_with<R: CryptoRng>(length: usize, rng: &mut R) -> String {
    let length = if length == 4 || length == 6 {
        length
    } else {
        DEFAULT_PIN_LENGTH
    };

    let mut pin = String::with_capacity(length);
    for _ in 0..MAX_PIN_ATTEMPTS {
        pin = (0..length).map(|_| char::from(pick(DIGITS, rng))).collect();
        if !is_weak_pin(&pin) {
            break;
        }
    }
    pin
}

/// A PIN is weak when every digit is the same or the digits form a run
/// that steps by +1 or -1 modulo 10 (`1234`, `9012`, `4321`, `0987`).
pub fn is_weak_pin(pin: &str) -> bool {
    let digits: Vec<u32> = pin.chars().filter_map(|c| c.to_digit(10)).collect();
    if digits.is_empty() || digits.len() != pin.chars().count() {
        return true;
    }

    let pairs = || digits.windows(2).map(|w| (w[0], w[1]));
    let uniform = pairs().all(|(prev, cur)| cur == prev);
    let ascending = pairs().all(|(prev, cur)| cur == (prev + 1) % 10);
    let descending = pairs().all(|(prev, cur)| cur == (prev + 9) % 10);

    uniform || ascending || descending
}

// ============================================================================
// Tests
// ============================================================================
