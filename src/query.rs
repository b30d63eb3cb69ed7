//! Query tokenizing and normalization.
//!
//! Turns a raw query such as `"rd rd Password 16"` into a lower-cased
//! command token and the remaining parameter string. Launcher hosts tend to
//! echo their action keyword back into the query (sometimes more than once),
//! so repeated leading tokens are collapsed and a leading action keyword is
//! dropped before the command is read.

use serde::Serialize;

/// Action keyword used when none is configured
pub const DEFAULT_ACTION_KEYWORD: &str = "rd";

/// A query split into command and parameter. Empty command means "show help".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NormalizedCommand {
    /// Lower-cased command token
    pub command: String,

    /// Remaining tokens joined by single spaces, original case preserved
    pub parameter: Option<String>,
}

impl NormalizedCommand {
    pub fn is_empty(&self) -> bool {
        self.command.is_empty()
    }
}

/// Normalizes raw queries for a given action keyword.
#[derive(Debug, Clone)]
pub struct QueryNormalizer {
    action_keyword: String,
}

impl Default for QueryNormalizer {
    fn default() -> Self {
        Self::new(DEFAULT_ACTION_KEYWORD)
    }
}

impl QueryNormalizer {
    /// Only the first whitespace-separated token of `action_keyword` is kept.
    pub fn new(action_keyword: &str) -> Self {
        Self {
            action_keyword: clean_action_keyword(action_keyword),
        }
    }

    pub fn action_keyword(&self) -> &str {
        &self.action_keyword
    }

    /// Split a raw query into a [`NormalizedCommand`]. Never fails.
    pub fn normalize(&self, raw: &str) -> NormalizedCommand {
        let tokens = collapse_leading_duplicates(raw.split_whitespace().collect());

        let mut rest = tokens.as_slice();
        if let Some((first, tail)) = rest.split_first() {
            if !self.action_keyword.is_empty() && first.eq_ignore_ascii_case(&self.action_keyword)
            {
                rest = tail;
            }
        }

        let Some((command, params)) = rest.split_first() else {
            return NormalizedCommand::default();
        };

        NormalizedCommand {
            command: command.to_lowercase(),
            parameter: if params.is_empty() {
                None
            } else {
                Some(params.join(" "))
            },
        }
    }
}

/// Normalize with the default action keyword.
pub fn normalize(raw: &str) -> NormalizedCommand {
    QueryNormalizer::default().normalize(raw)
}

/// First token of a configured action keyword (hosts may store "rd rd").
pub fn clean_action_keyword(keyword: &str) -> String {
    keyword
        .split_whitespace()
        .next()
        .unwrap_or_default()
        .to_string()
}

/// Keep the first token once, skipping every consecutive repeat of it.
fn collapse_leading_duplicates(tokens: Vec<&str>) -> Vec<&str> {
    let Some(first) = tokens.first().copied() else {
        return tokens;
    };

    let repeats = tokens
        .iter()
        .skip(1)
        .take_while(|token| token.eq_ignore_ascii_case(first))
        .count();

    tokens.into_iter().skip(repeats).collect()
}

// ============================================================================
// Tests
// ============================================================================
