//! The composed query engine.
//!
//! [`RandomGen`] owns the cache, its sweeper, the fake-data provider and the
//! dispatcher, and is what a host embeds. It is `Send + Sync`; queries may
//! run from several threads at once.

use std::sync::{Arc, Mutex, PoisonError};
use tracing::{debug, info, warn};

use crate::cache::{CacheSweeper, Clock, ResultCache, SystemClock};
use crate::config::Config;
use crate::dispatch::Dispatcher;
use crate::faker::{FakeData, LocaleFaker};
use crate::host::{safe_change_query, safe_copy, Host};
use crate::query::QueryNormalizer;
use crate::result::{self, ContextMenuEntry, GeneratedResult, MenuAction, ResultAction};

pub struct RandomGen {
    config: Config,
    normalizer: QueryNormalizer,
    dispatcher: Dispatcher,
    cache: Arc<ResultCache>,
    sweeper: Mutex<Option<CacheSweeper>>,
}

impl RandomGen {
    /// Engine with the system clock and a faker for the configured locale
    pub fn new(config: &Config) -> Self {
        Self::with_parts(
            config,
            Arc::new(LocaleFaker::new(config.locale)),
            Arc::new(SystemClock),
        )
    }

    pub fn with_parts(config: &Config, faker: Arc<dyn FakeData>, clock: Arc<dyn Clock>) -> Self {
        let cache = Arc::new(ResultCache::new(config.cache_policy(), Arc::clone(&clock)));
        let dispatcher = Dispatcher::new(Arc::clone(&cache), faker, clock, &config.action_keyword);
        Self {
            config: config.clone(),
            normalizer: QueryNormalizer::new(&config.action_keyword),
            dispatcher,
            cache,
            sweeper: Mutex::new(None),
        }
    }

    pub fn cache(&self) -> &ResultCache {
        &self.cache
    }

    /// Start the periodic cache sweep. Calling it twice is harmless; if the
    /// thread cannot be spawned the engine keeps working without sweeps.
    pub fn start(&self) {
        let mut slot = self.sweeper.lock().unwrap_or_else(PoisonError::into_inner);
        if slot.as_ref().is_some_and(CacheSweeper::is_running) {
            return;
        }
        match CacheSweeper::start(Arc::clone(&self.cache), self.config.sweep_interval()) {
            Ok(sweeper) => {
                info!(
                    "Cache sweeper started (every {}s)",
                    self.config.sweep_interval().as_secs()
                );
                *slot = Some(sweeper);
            }
            Err(e) => warn!("Cache sweeper not started: {}", e),
        }
    }

    /// Stop the sweeper and drop all cached values. Idempotent.
    pub fn shutdown(&self) {
        if let Some(mut sweeper) = self
            .sweeper
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        {
            sweeper.stop();
        }
        self.cache.clear();
    }

    /// Results for a raw query string. Never panics.
    pub fn query(&self, raw: &str) -> Vec<GeneratedResult> {
        let cmd = self.normalizer.normalize(raw);
        debug!("Query {:?} -> {:?}", raw, cmd);
        self.dispatcher.dispatch(&cmd)
    }

    pub fn context_menu(&self, result: &GeneratedResult) -> Vec<ContextMenuEntry> {
        result::context_menu(result)
    }

    /// Primary action of a result: copy a value, or change the query.
    pub fn activate(&self, result: &GeneratedResult, host: &dyn Host) -> bool {
        match &result.action {
            ResultAction::CopyValue(value) => safe_copy(host, value),
            ResultAction::ChangeQuery(query) => safe_change_query(host, query),
            ResultAction::None => false,
        }
    }

    pub fn run_menu_action(&self, action: &MenuAction, host: &dyn Host) -> bool {
        match action {
            MenuAction::Copy { value } => safe_copy(host, value),
            MenuAction::Regenerate { command, parameter } => {
                if self.dispatcher.invalidate(command, parameter.as_deref()) {
                    debug!("Invalidated cached '{}' before regenerating", command);
                }
                let invocation = match parameter {
                    Some(p) => format!("{command} {p}"),
                    None => command.clone(),
                };
                safe_change_query(host, &self.dispatcher.replay_query(&invocation))
            }
            MenuAction::Select { command } => {
                safe_change_query(host, &self.dispatcher.prime_query(command))
            }
        }
    }
}

impl Drop for RandomGen {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::ManualClock;
    use crate::error::HostError;
    use crate::result::ResultKind;
    use chrono::{TimeZone, Utc};
    use std::time::Duration;

    #[derive(Default)]
    struct RecordingHost {
        copied: Mutex<Vec<String>>,
        queries: Mutex<Vec<String>>,
    }

    impl Host for RecordingHost {
        fn copy_to_clipboard(&self, text: &str) -> Result<(), HostError> {
            self.copied.lock().unwrap().push(text.to_string());
            Ok(())
        }

        fn change_query(&self, query: &str) -> Result<(), HostError> {
            self.queries.lock().unwrap().push(query.to_string());
            Ok(())
        }
    }

    fn engine() -> (RandomGen, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap(),
        ));
        let engine = RandomGen::with_parts(
            &Config::default(),
            Arc::new(LocaleFaker::default()),
            clock.clone(),
        );
        (engine, clock)
    }

    #[test]
    fn test_password_replayed_within_freshness() {
        let (engine, clock) = engine();
        let first = engine.query("rd password 16");
        clock.advance(Duration::from_secs(1));
        let second = engine.query("rd password 16");
        assert_eq!(first[0].value(), second[0].value());
        assert_eq!(first[0].value().unwrap().chars().count(), 16);
    }

    #[test]
    fn test_password_regenerated_after_freshness() {
        let (engine, clock) = engine();
        let first = engine.query("rd password 24");
        clock.advance(Duration::from_secs(3));
        let second = engine.query("rd password 24");
        assert_ne!(first[0].value(), second[0].value());
    }

    #[test]
    fn test_sweep_evicts_after_retention() {
        let (engine, clock) = engine();
        engine.query("rd password");
        assert_eq!(engine.cache().len(), 1);
        clock.advance(Duration::from_secs(301));
        assert_eq!(engine.cache().sweep(), 1);
        assert!(engine.cache().is_empty());
    }

    #[test]
    fn test_activate_generated_copies_value() {
        let (engine, _) = engine();
        let host = RecordingHost::default();
        let results = engine.query("rd pin 6");
        assert!(engine.activate(&results[0], &host));
        let copied = host.copied.lock().unwrap();
        assert_eq!(copied.len(), 1);
        assert_eq!(copied[0].len(), 6);
    }

    #[test]
    fn test_activate_suggestion_primes_query() {
        let (engine, _) = engine();
        let host = RecordingHost::default();
        let results = engine.query("rd emial");
        assert!(results[0].is_suggestion());
        assert!(engine.activate(&results[0], &host));
        assert_eq!(host.queries.lock().unwrap()[0], "rd email ");
    }

    #[test]
    fn test_regenerate_invalidates_and_replays() {
        let (engine, _) = engine();
        let host = RecordingHost::default();
        let results = engine.query("rd password 16");
        let menu = engine.context_menu(&results[0]);
        let regen = &menu[1].action;
        assert!(matches!(regen, MenuAction::Regenerate { .. }));

        assert!(engine.run_menu_action(regen, &host));
        assert!(engine.cache().is_empty());
        let replay = host.queries.lock().unwrap()[0].clone();
        assert!(replay.starts_with("rd password 16"));

        let again = engine.query(&replay);
        assert_ne!(results[0].value(), again[0].value());
    }

    #[test]
    fn test_error_results_have_no_menu() {
        let (engine, _) = engine();
        let result = crate::dispatch::error_result(&crate::error::GenerationError::Provider(
            "offline".to_string(),
        ));
        assert!(matches!(result.kind, ResultKind::Error));
        assert!(engine.context_menu(&result).is_empty());
        assert!(!engine.activate(&result, &RecordingHost::default()));
    }

    #[test]
    fn test_start_and_shutdown_are_idempotent() {
        let (engine, _) = engine();
        engine.start();
        engine.start();
        engine.query("rd password");
        engine.shutdown();
        engine.shutdown();
        assert!(engine.cache().is_empty());
    }
}
