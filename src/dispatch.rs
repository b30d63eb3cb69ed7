//! Query dispatch: exact generation, suggestion ranking, help listing.
//!
//! # Ranking
//! When the command is not an exact name or alias, candidates are tried in
//! tiers, and the first non-empty tier wins:
//! 1. names starting with the input, shortest first (max 8)
//! 2. names containing the input, earliest match first (max 5)
//! 3. names within a small edit distance of the input, closest first (max 5)
//! 4. the full help listing

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use tracing::{debug, error, info};

use crate::cache::{Clock, ResultCache};
use crate::error::GenerationError;
use crate::faker::FakeData;
use crate::generators::GenerationContext;
use crate::query::{clean_action_keyword, NormalizedCommand};
use crate::registry::{self, CommandEntry, CommandSpec};
use crate::result::{
    GeneratedData, GeneratedResult, ResultAction, ResultKind, SuggestionData, Tooltip,
};

// ============================================================================
// Constants
// ============================================================================

/// Maximum prefix-match suggestions
const MAX_PREFIX_SUGGESTIONS: usize = 8;

/// Maximum substring-match suggestions
const MAX_SUBSTRING_SUGGESTIONS: usize = 5;

/// Maximum edit-distance suggestions
const MAX_FUZZY_SUGGESTIONS: usize = 5;

/// Score given to suggestions so hosts list them first
const SUGGESTION_SCORE: i32 = 1000;

// ============================================================================
// Dispatcher
// ============================================================================

/// Resolves normalized commands into result lists.
pub struct Dispatcher {
    cache: Arc<ResultCache>,
    faker: Arc<dyn FakeData>,
    clock: Arc<dyn Clock>,
    action_keyword: String,
}

impl Dispatcher {
    pub fn new(
        cache: Arc<ResultCache>,
        faker: Arc<dyn FakeData>,
        clock: Arc<dyn Clock>,
        action_keyword: &str,
    ) -> Self {
        Self {
            cache,
            faker,
            clock,
            action_keyword: clean_action_keyword(action_keyword),
        }
    }

    /// Results for `cmd`. Never panics: any failure becomes one error result.
    pub fn dispatch(&self, cmd: &NormalizedCommand) -> Vec<GeneratedResult> {
        match panic::catch_unwind(AssertUnwindSafe(|| self.try_dispatch(cmd))) {
            Ok(Ok(results)) => results,
            Ok(Err(e)) => {
                error!("Generation failed for '{}': {}", cmd.command, e);
                vec![error_result(&e)]
            }
            Err(payload) => {
                let e = GenerationError::Panicked {
                    command: cmd.command.clone(),
                    message: panic_message(payload.as_ref()),
                };
                error!("Error: {}", e);
                vec![error_result(&e)]
            }
        }
    }

    fn try_dispatch(&self, cmd: &NormalizedCommand) -> Result<Vec<GeneratedResult>, GenerationError> {
        if cmd.is_empty() {
            debug!("Empty query, showing help");
            return Ok(self.help_results());
        }

        if let Some(spec) = registry::lookup(&cmd.command) {
            info!("Generating '{}' ({:?})", spec.name, cmd.parameter);
            return Ok(vec![self.generate(spec, cmd.parameter.as_deref())?]);
        }

        let ranked = rank_suggestions(&cmd.command);
        if ranked.is_empty() {
            debug!("No suggestions for '{}', showing help", cmd.command);
            return Ok(self.help_results());
        }

        debug!("{} suggestions for '{}'", ranked.len(), cmd.command);
        Ok(ranked
            .into_iter()
            .map(|entry| self.suggestion_result(entry))
            .collect())
    }

    fn generate(
        &self,
        spec: &'static CommandSpec,
        parameter: Option<&str>,
    ) -> Result<GeneratedResult, GenerationError> {
        let ctx = GenerationContext {
            faker: self.faker.as_ref(),
            cache: &self.cache,
            today: self.clock.now().date_naive(),
        };
        let generated = spec.generator.generate(parameter, &ctx)?;

        Ok(GeneratedResult {
            display_text: generated.display_text,
            title: generated.value.clone(),
            subtitle: generated.subtitle,
            tooltip: generated.tooltip,
            score: None,
            action: ResultAction::CopyValue(generated.value.clone()),
            kind: ResultKind::Generated(GeneratedData {
                command: generated.command.to_string(),
                parameter: generated.parameter,
                value: generated.value,
            }),
        })
    }

    /// Drop the cached value a `command parameter` invocation would replay.
    pub fn invalidate(&self, command: &str, parameter: Option<&str>) -> bool {
        registry::lookup(command)
            .and_then(|spec| spec.generator.cache_key(parameter))
            .is_some_and(|key| self.cache.invalidate(&key))
    }

    /// Query text that selects `command` and waits for its parameter.
    pub fn prime_query(&self, command: &str) -> String {
        let name = command.split_whitespace().next().unwrap_or_default();
        if self.action_keyword.is_empty() {
            format!("{name} ")
        } else {
            format!("{} {name} ", self.action_keyword)
        }
    }

    /// Query text that replays `invocation` (command plus parameter).
    pub fn replay_query(&self, invocation: &str) -> String {
        if self.action_keyword.is_empty() {
            invocation.to_string()
        } else {
            format!("{} {invocation}", self.action_keyword)
        }
    }

    /// One entry per registered command, each priming its command.
    pub fn help_results(&self) -> Vec<GeneratedResult> {
        registry::commands()
            .iter()
            .map(|spec| {
                let example = self.replay_query(spec.example);
                GeneratedResult {
                    display_text: spec.usage.to_string(),
                    title: spec.usage.to_string(),
                    subtitle: format!("{} (e.g., {example})", spec.description),
                    tooltip: Tooltip::new("RandomGen Command", spec.description),
                    score: None,
                    action: ResultAction::ChangeQuery(self.prime_query(spec.name)),
                    kind: ResultKind::Suggestion(SuggestionData {
                        command: spec.usage.to_string(),
                    }),
                }
            })
            .collect()
    }

    fn suggestion_result(&self, entry: CommandEntry) -> GeneratedResult {
        let description = entry.description();
        let example = self.replay_query(&entry.example());
        GeneratedResult {
            display_text: entry.name.to_string(),
            title: format!("▶ {}", entry.name),
            subtitle: format!("{description} - Press Enter or Tab to select"),
            tooltip: Tooltip::new(
                "AutoComplete Suggestion",
                format!("{description}\n\nExample: {example}"),
            ),
            score: Some(SUGGESTION_SCORE),
            action: ResultAction::ChangeQuery(self.prime_query(entry.name)),
            kind: ResultKind::Suggestion(SuggestionData {
                command: entry.name.to_string(),
            }),
        }
    }
}

/// The single result shown when generation fails.
pub fn error_result(e: &GenerationError) -> GeneratedResult {
    GeneratedResult {
        display_text: String::new(),
        title: "Plugin Error".to_string(),
        subtitle: "An error occurred generating random data".to_string(),
        tooltip: Tooltip::new("Error", format!("Error details: {e}")),
        score: None,
        action: ResultAction::None,
        kind: ResultKind::Error,
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

// ============================================================================
// Suggestion Ranking
// ============================================================================

/// Rank registry names against a partial or mistyped command.
///
/// Returns an empty list when nothing is close enough; callers then show
/// the help listing.
pub fn rank_suggestions(input: &str) -> Vec<CommandEntry> {
    let needle = input.to_lowercase();
    if needle.is_empty() {
        return Vec::new();
    }
    let entries = registry::entries();

    let mut prefix: Vec<CommandEntry> = entries
        .iter()
        .filter(|entry| entry.name.starts_with(&needle))
        .copied()
        .collect();
    if !prefix.is_empty() {
        prefix.sort_by_key(|entry| (entry.name.len(), entry.name));
        prefix.truncate(MAX_PREFIX_SUGGESTIONS);
        return prefix;
    }

    let mut substring: Vec<(usize, CommandEntry)> = entries
        .iter()
        .filter_map(|entry| entry.name.find(&needle).map(|at| (at, *entry)))
        .collect();
    if !substring.is_empty() {
        substring.sort_by_key(|(at, entry)| (*at, entry.name.len(), entry.name));
        return substring
            .into_iter()
            .take(MAX_SUBSTRING_SUGGESTIONS)
            .map(|(_, entry)| entry)
            .collect();
    }

    let threshold = fuzzy_threshold(&needle);
    let mut fuzzy: Vec<(usize, CommandEntry)> = entries
        .iter()
        .map(|entry| (levenshtein(&needle, entry.name), *entry))
        .filter(|(distance, _)| *distance <= threshold)
        .collect();
    fuzzy.sort_by_key(|(distance, entry)| (*distance, entry.name.len(), entry.name));
    fuzzy
        .into_iter()
        .take(MAX_FUZZY_SUGGESTIONS)
        .map(|(_, entry)| entry)
        .collect()
}

/// One typo for short inputs, two for longer ones.
fn fuzzy_threshold(input: &str) -> usize {
    if input.chars().count() <= 4 {
        1
    } else {
        2
    }
}

/// Simple Levenshtein distance calculation.
fn levenshtein(a: &str, b: &str) -> usize {
    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();
    let n = b_chars.len();

    let mut prev_row: Vec<usize> = (0..=n).collect();
    let mut curr_row = vec![0usize; n + 1];

    for (i, a_ch) in a_chars.iter().enumerate() {
        curr_row[0] = i + 1;
        for (j, b_ch) in b_chars.iter().enumerate() {
            let cost = usize::from(a_ch != b_ch);
            curr_row[j + 1] = (prev_row[j + 1] + 1)
                .min(curr_row[j] + 1)
                .min(prev_row[j] + cost);
        }
        std::mem::swap(&mut prev_row, &mut curr_row);
    }

    prev_row[n]
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{CachePolicy, SystemClock};
    use crate::faker::LocaleFaker;
    use crate::query::normalize;
    use chrono::NaiveDate;

    fn dispatcher_with(faker: Arc<dyn FakeData>) -> Dispatcher {
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        let cache = Arc::new(ResultCache::new(CachePolicy::default(), clock.clone()));
        Dispatcher::new(cache, faker, clock, "rd")
    }

    fn dispatcher() -> Dispatcher {
        dispatcher_with(Arc::new(LocaleFaker::default()))
    }

    fn names(entries: &[CommandEntry]) -> Vec<&'static str> {
        entries.iter().map(|e| e.name).collect()
    }

    /// Provider that fails or panics on demand
    struct BrokenFaker {
        panic: bool,
    }

    impl BrokenFaker {
        fn fail(&self) -> Result<String, GenerationError> {
            if self.panic {
                panic!("provider exploded");
            }
            Err(GenerationError::Provider("locale data missing".to_string()))
        }
    }

    impl FakeData for BrokenFaker {
        fn email(&self) -> Result<String, GenerationError> {
            self.fail()
        }
        fn full_name(&self) -> Result<String, GenerationError> {
            self.fail()
        }
        fn full_address(&self) -> Result<String, GenerationError> {
            self.fail()
        }
        fn phone_number(&self) -> Result<String, GenerationError> {
            self.fail()
        }
        fn company_name(&self) -> Result<String, GenerationError> {
            self.fail()
        }
        fn lorem_words(&self, _count: usize) -> Result<Vec<String>, GenerationError> {
            self.fail().map(|w| vec![w])
        }
        fn color(&self) -> Result<String, GenerationError> {
            self.fail()
        }
        fn url(&self) -> Result<String, GenerationError> {
            self.fail()
        }
        fn credit_card_number(&self) -> Result<String, GenerationError> {
            self.fail()
        }
        fn date_between(&self, _start: NaiveDate, _end: NaiveDate) -> Result<String, GenerationError> {
            self.fail()
        }
    }

    #[test]
    fn test_levenshtein() {
        assert_eq!(levenshtein("", ""), 0);
        assert_eq!(levenshtein("numbr", "number"), 1);
        assert_eq!(levenshtein("numbr", "num"), 2);
        assert_eq!(levenshtein("kitten", "sitting"), 3);
    }

    #[test]
    fn test_prefix_ranking() {
        assert_eq!(names(&rank_suggestions("p")), vec!["pin", "pwd", "phone", "password"]);
        assert_eq!(names(&rank_suggestions("cr")), vec!["credit", "creditcard"]);
        assert_eq!(names(&rank_suggestions("NU")), vec!["num", "number"]);
    }

    #[test]
    fn test_substring_ranking() {
        // "or" sits at index 1 in lorem, 3 in color, 5 in password
        assert_eq!(names(&rank_suggestions("or")), vec!["lorem", "color", "password"]);
        assert_eq!(names(&rank_suggestions("card")), vec!["creditcard"]);
    }

    #[test]
    fn test_substring_cap() {
        // eight names contain an "r", none starts with one
        assert_eq!(
            names(&rank_suggestions("r")),
            vec!["url", "credit", "creditcard", "lorem", "address"]
        );
    }

    #[test]
    fn test_fuzzy_ranking_for_typos() {
        let ranked = names(&rank_suggestions("numbr"));
        assert_eq!(ranked.first(), Some(&"number"));
        assert!(ranked.contains(&"num"));
        assert!(!ranked.contains(&"name"));

        assert_eq!(names(&rank_suggestions("emial")), vec!["email"]);
    }

    #[test]
    fn test_nothing_close_is_empty() {
        assert!(rank_suggestions("zzzzzz").is_empty());
        assert!(rank_suggestions("!@#").is_empty());
    }

    #[test]
    fn test_empty_query_lists_help() {
        let results = dispatcher().dispatch(&normalize(""));
        assert_eq!(results.len(), registry::commands().len());
        assert_eq!(results[0].title, "password [length]");
        assert_eq!(
            results[0].subtitle,
            "Generate secure password (default: 12 chars) (e.g., rd password 16)"
        );
        assert_eq!(
            results[0].action,
            ResultAction::ChangeQuery("rd password ".to_string())
        );
    }

    #[test]
    fn test_exact_match_generates_one_result() {
        let results = dispatcher().dispatch(&normalize("password 16"));
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].parameter(), Some("16"));
        assert_eq!(results[0].value().map(str::len), Some(16));
        assert_eq!(results[0].command(), Some("password"));
    }

    #[test]
    fn test_alias_generates_canonical_command() {
        let results = dispatcher().dispatch(&normalize("uuid"));
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].command(), Some("guid"));
    }

    #[test]
    fn test_suggestions_prime_query() {
        let results = dispatcher().dispatch(&normalize("numbr"));
        assert!(!results.is_empty());
        assert!(results.iter().all(GeneratedResult::is_suggestion));
        assert_eq!(results[0].title, "▶ number");
        assert_eq!(results[0].score, Some(1000));
        assert_eq!(
            results[0].action,
            ResultAction::ChangeQuery("rd number ".to_string())
        );
    }

    #[test]
    fn test_unknown_command_falls_back_to_help() {
        let results = dispatcher().dispatch(&normalize("$$$ %%%"));
        assert_eq!(results.len(), registry::commands().len());
    }

    #[test]
    fn test_provider_error_becomes_error_result() {
        let d = dispatcher_with(Arc::new(BrokenFaker { panic: false }));
        let results = d.dispatch(&normalize("email"));
        assert_eq!(results.len(), 1);
        assert!(results[0].is_error());
        assert_eq!(results[0].title, "Plugin Error");
        assert!(results[0].tooltip.text.contains("locale data missing"));

        // secure generators do not depend on the provider
        assert!(!d.dispatch(&normalize("pin"))[0].is_error());
    }

    #[test]
    fn test_provider_panic_becomes_error_result() {
        let d = dispatcher_with(Arc::new(BrokenFaker { panic: true }));
        let results = d.dispatch(&normalize("company"));
        assert_eq!(results.len(), 1);
        assert!(results[0].is_error());
        assert!(results[0].tooltip.text.contains("provider exploded"));
    }

    #[test]
    fn test_invalidate_only_cached_commands() {
        let d = dispatcher();
        let first = d.dispatch(&normalize("password 20"));
        assert!(d.invalidate("password", Some("20")));
        assert!(!d.invalidate("password", Some("20")));
        assert!(!d.invalidate("pin", Some("6")));
        let second = d.dispatch(&normalize("password 20"));
        assert_ne!(first[0].value(), second[0].value());
    }

    #[test]
    fn test_prime_query_without_keyword() {
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        let cache = Arc::new(ResultCache::new(CachePolicy::default(), clock.clone()));
        let d = Dispatcher::new(cache, Arc::new(LocaleFaker::default()), clock, "");
        assert_eq!(d.prime_query("pin [4|6]"), "pin ");
        assert_eq!(d.replay_query("pin 6"), "pin 6");
    }
}
