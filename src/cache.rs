//! Short-lived result cache with sweep-based eviction.
//!
//! The cache dedupes rapid repeated requests (the host re-queries on every
//! keystroke) without replaying a generated secret for longer than the
//! freshness window. Entries linger until the next sweep removes anything
//! older than the retention window.

use chrono::{DateTime, TimeDelta, Utc};
use std::collections::HashMap;
use std::io;
use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::{debug, trace, warn};

/// Default age below which a cached value is replayed
pub const DEFAULT_FRESHNESS: Duration = Duration::from_secs(2);

/// Default age after which a sweep drops an entry
pub const DEFAULT_RETENTION: Duration = Duration::from_secs(5 * 60);

/// Default delay between two sweeps
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(5 * 60);

// ============================================================================
// Clock
// ============================================================================

/// Time source for cache ages.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock that only moves when told to. Used by tests and simulations.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap_or_else(PoisonError::into_inner);
        *now = now.checked_add_signed(to_delta(by)).unwrap_or(*now);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn to_delta(duration: Duration) -> TimeDelta {
    TimeDelta::from_std(duration).unwrap_or(TimeDelta::MAX)
}

// ============================================================================
// Cache
// ============================================================================

/// A cached value and when it was generated
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub value: String,
    pub created_at: DateTime<Utc>,
}

/// Freshness and retention windows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CachePolicy {
    pub freshness: Duration,
    pub retention: Duration,
}

impl Default for CachePolicy {
    fn default() -> Self {
        Self {
            freshness: DEFAULT_FRESHNESS,
            retention: DEFAULT_RETENTION,
        }
    }
}

/// Thread-safe map of generated values keyed by command and parameters.
pub struct ResultCache {
    entries: Mutex<HashMap<String, CacheEntry>>,
    clock: Arc<dyn Clock>,
    freshness: TimeDelta,
    retention: TimeDelta,
}

impl ResultCache {
    pub fn new(policy: CachePolicy, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            clock,
            freshness: to_delta(policy.freshness),
            retention: to_delta(policy.retention),
        }
    }

    /// A poisoned lock only means another thread panicked mid-call; the map
    /// itself is still consistent, so keep using it.
    fn lock(&self) -> MutexGuard<'_, HashMap<String, CacheEntry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Value for `key` if it was stored less than the freshness window ago.
    pub fn get(&self, key: &str) -> Option<String> {
        let now = self.clock.now();
        let entries = self.lock();
        let entry = entries.get(key)?;
        if now - entry.created_at < self.freshness {
            trace!("Cache hit: {}", key);
            Some(entry.value.clone())
        } else {
            trace!("Cache stale: {}", key);
            None
        }
    }

    /// Store `value`, replacing any older entry for `key`.
    pub fn put(&self, key: &str, value: &str) {
        let entry = CacheEntry {
            value: value.to_string(),
            created_at: self.clock.now(),
        };
        self.lock().insert(key.to_string(), entry);
    }

    /// Fresh value for `key`, or a newly generated one that is then cached.
    ///
    /// `generate` runs outside the lock, so two racing callers may both
    /// generate; the later `put` wins.
    pub fn get_or_insert_with<F>(&self, key: &str, generate: F) -> String
    where
        F: FnOnce() -> String,
    {
        if let Some(value) = self.get(key) {
            debug!("Replaying cached value for {}", key);
            return value;
        }
        let value = generate();
        self.put(key, &value);
        value
    }

    /// Drop `key` regardless of age.
    pub fn invalidate(&self, key: &str) -> bool {
        self.lock().remove(key).is_some()
    }

    /// Remove every entry older than the retention window. Returns the count removed.
    pub fn sweep(&self) -> usize {
        let Some(cutoff) = self.clock.now().checked_sub_signed(self.retention) else {
            return 0;
        };
        let mut entries = self.lock();
        let before = entries.len();
        entries.retain(|_, entry| entry.created_at >= cutoff);
        before - entries.len()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}

// ============================================================================
// Sweeper
// ============================================================================

/// Background thread that calls [`ResultCache::sweep`] on a fixed interval.
///
/// Stopping (explicitly or on drop) wakes the thread immediately and joins it.
pub struct CacheSweeper {
    stop: Option<Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl CacheSweeper {
    pub fn start(cache: Arc<ResultCache>, interval: Duration) -> io::Result<Self> {
        let (stop, stopped) = mpsc::channel::<()>();
        let handle = thread::Builder::new()
            .name("randomgen-cache-sweep".to_string())
            .spawn(move || loop {
                match stopped.recv_timeout(interval) {
                    Err(RecvTimeoutError::Timeout) => {
                        match panic::catch_unwind(AssertUnwindSafe(|| cache.sweep())) {
                            Ok(0) => trace!("Cache sweep removed nothing"),
                            Ok(removed) => debug!("Cache sweep removed {} entries", removed),
                            Err(_) => warn!("Cache sweep panicked; will retry next interval"),
                        }
                    }
                    Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                }
            })?;

        debug!("Cache sweeper started (interval: {:?})", interval);
        Ok(Self {
            stop: Some(stop),
            handle: Some(handle),
        })
    }

    /// Signal the thread and wait for it. Safe to call more than once.
    pub fn stop(&mut self) {
        if let Some(stop) = self.stop.take() {
            // The thread may already be gone; nothing to do then
            let _ = stop.send(());
        }
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                warn!("Cache sweeper thread panicked during shutdown");
            } else {
                debug!("Cache sweeper stopped");
            }
        }
    }

    pub fn is_running(&self) -> bool {
        self.handle.is_some()
    }
}

impl Drop for CacheSweeper {
    fn drop(&mut self) {
        self.stop();
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn manual_cache() -> (Arc<ManualClock>, ResultCache) {
        let clock = Arc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2026, 1, 1, 12, 0, 0).unwrap(),
        ));
        let cache = ResultCache::new(CachePolicy::default(), clock.clone());
        (clock, cache)
    }

    #[test]
    fn test_hit_within_freshness_window() {
        let (clock, cache) = manual_cache();
        cache.put("password_12", "s3cr3t!A");
        clock.advance(Duration::from_millis(1_999));
        assert_eq!(cache.get("password_12").as_deref(), Some("s3cr3t!A"));
    }

    #[test]
    fn test_stale_after_freshness_window() {
        let (clock, cache) = manual_cache();
        cache.put("password_12", "s3cr3t!A");
        clock.advance(Duration::from_secs(2));
        assert!(cache.get("password_12").is_none());
        // still stored until swept
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_put_replaces_stale_entry() {
        let (clock, cache) = manual_cache();
        cache.put("k", "old");
        clock.advance(Duration::from_secs(3));
        cache.put("k", "new");
        assert_eq!(cache.get("k").as_deref(), Some("new"));
    }

    #[test]
    fn test_get_or_insert_with() {
        let (clock, cache) = manual_cache();
        let first = cache.get_or_insert_with("k", || "one".to_string());
        let second = cache.get_or_insert_with("k", || "two".to_string());
        assert_eq!(first, "one");
        assert_eq!(second, "one");
        clock.advance(Duration::from_secs(5));
        assert_eq!(cache.get_or_insert_with("k", || "three".to_string()), "three");
    }

    #[test]
    fn test_sweep_uses_retention_window() {
        let (clock, cache) = manual_cache();
        cache.put("old", "a");
        clock.advance(Duration::from_secs(4 * 60));
        cache.put("young", "b");
        clock.advance(Duration::from_secs(61));

        assert_eq!(cache.sweep(), 1);
        assert_eq!(cache.len(), 1);
        assert!(cache.invalidate("young"));
        assert!(!cache.invalidate("old"));
    }

    #[test]
    fn test_clear() {
        let (_clock, cache) = manual_cache();
        cache.put("a", "1");
        cache.put("b", "2");
        cache.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn test_concurrent_access() {
        let (_clock, cache) = manual_cache();
        let cache = Arc::new(cache);
        let workers: Vec<_> = (0..8)
            .map(|i| {
                let cache = cache.clone();
                thread::spawn(move || {
                    for j in 0..200 {
                        let key = format!("k{}", (i * j) % 16);
                        cache.put(&key, "v");
                        let _ = cache.get(&key);
                        if j % 7 == 0 {
                            cache.sweep();
                        }
                    }
                })
            })
            .collect();
        for worker in workers {
            worker.join().unwrap();
        }
        assert!(cache.len() <= 16);
    }

    #[test]
    fn test_sweeper_runs_and_stops() {
        let (clock, cache) = manual_cache();
        let cache = Arc::new(cache);
        cache.put("k", "v");
        clock.advance(Duration::from_secs(10 * 60));

        let mut sweeper = CacheSweeper::start(cache.clone(), Duration::from_millis(10)).unwrap();
        assert!(sweeper.is_running());
        for _ in 0..200 {
            if cache.is_empty() {
                break;
            }
            thread::sleep(Duration::from_millis(5));
        }
        assert!(cache.is_empty());

        sweeper.stop();
        assert!(!sweeper.is_running());
        sweeper.stop();
    }
}
