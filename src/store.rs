//! Suppression store: which keys are currently being answered with the trigger status.

use crate::clock::Clock;
use dashmap::DashMap;
use std::sync::Arc;
use std::time::Duration;

/// Concurrent map from request key to the clock instant its suppression expires.
///
/// An entry only means "suppressed" while `expires_at > now`. Expired entries are never
/// removed; they stay inert until the key triggers again and overwrites them. The store
/// therefore grows with the number of distinct keys that ever triggered, for the lifetime
/// of the process.
#[derive(Debug)]
pub struct SuppressionStore {
    entries: DashMap<String, u64>,
    window: Duration,
    clock: Arc<dyn Clock>,
}

impl SuppressionStore {
    pub(crate) fn with_clock(window: Duration, clock: Arc<dyn Clock>) -> Self {
        Self { entries: DashMap::new(), window, clock }
    }

    /// Length of the suppression window.
    pub fn window(&self) -> Duration {
        self.window
    }

    fn now(&self) -> u64 {
        self.clock.now_nanos()
    }

    /// Whether `key` is suppressed right now.
    pub fn is_active(&self, key: &str) -> bool {
        self.is_active_at(key, self.now())
    }

    /// Whether `key` is suppressed at `now`; expiry is exclusive.
    pub fn is_active_at(&self, key: &str, now: u64) -> bool {
        self.entries.get(key).is_some_and(|expires_at| *expires_at > now)
    }

    /// Start (or restart) suppression of `key` from the current instant.
    pub fn record(&self, key: impl Into<String>) {
        let now = self.now();
        self.record_at(key, now);
    }

    /// Start (or restart) suppression of `key` from `now`.
    pub fn record_at(&self, key: impl Into<String>, now: u64) {
        let window = u64::try_from(self.window.as_nanos()).unwrap_or(u64::MAX);
        self.entries.insert(key.into(), now.saturating_add(window));
    }

    /// Raw expiry recorded for `key`, whether or not it has passed.
    pub fn expires_at(&self, key: &str) -> Option<u64> {
        self.entries.get(key).map(|expires_at| *expires_at)
    }

    /// Number of keys ever recorded, expired ones included.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::manual::ManualClock;

    fn store(window: Duration) -> (SuppressionStore, ManualClock) {
        let clock = ManualClock::default();
        (SuppressionStore::with_clock(window, Arc::new(clock.clone())), clock)
    }

    #[test]
    fn unknown_key_is_inactive() {
        let (store, _) = store(Duration::from_secs(1));
        assert!(!store.is_active("GET/a"));
        assert!(store.is_empty());
    }

    #[test]
    fn recorded_key_is_active_until_window_passes() {
        let (store, clock) = store(Duration::from_secs(10));
        store.record("GET/a");
        assert!(store.is_active("GET/a"));

        clock.advance(Duration::from_secs(9));
        assert!(store.is_active("GET/a"));

        clock.advance(Duration::from_secs(1));
        assert!(!store.is_active("GET/a"), "expiry is exclusive");
    }

    #[test]
    fn expired_entries_are_kept_but_inert() {
        let (store, clock) = store(Duration::from_millis(5));
        store.record("GET/a");
        clock.advance(Duration::from_millis(10));

        assert!(!store.is_active("GET/a"));
        assert_eq!(store.len(), 1);
        assert!(store.expires_at("GET/a").is_some());
    }

    #[test]
    fn record_overwrites_with_fresh_expiry() {
        let (store, clock) = store(Duration::from_secs(2));
        store.record("GET/a");
        let first = store.expires_at("GET/a").unwrap();

        clock.advance(Duration::from_secs(3));
        assert!(!store.is_active("GET/a"));

        store.record("GET/a");
        let second = store.expires_at("GET/a").unwrap();
        assert!(second > first);
        assert!(store.is_active("GET/a"));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn explicit_instants() {
        let (store, _) = store(Duration::from_nanos(100));
        store.record_at("k", 1_000);
        assert_eq!(store.expires_at("k"), Some(1_100));
        assert!(store.is_active_at("k", 1_099));
        assert!(!store.is_active_at("k", 1_100));
    }

    #[test]
    fn huge_window_saturates() {
        let (store, _) = store(Duration::MAX);
        store.record_at("k", 42);
        assert_eq!(store.expires_at("k"), Some(u64::MAX));
        assert!(store.is_active_at("k", u64::MAX - 1));
    }

    #[test]
    fn keys_are_isolated() {
        let (store, _) = store(Duration::from_secs(1));
        store.record("GET/a");
        assert!(store.is_active("GET/a"));
        assert!(!store.is_active("GET/b"));
    }

    #[test]
    fn concurrent_records_and_reads() {
        let (store, _) = store(Duration::from_secs(60));
        std::thread::scope(|scope| {
            for t in 0..8 {
                let store = &store;
                scope.spawn(move || {
                    for i in 0..500 {
                        let key = format!("GET/{}", i % 50);
                        if (i + t) % 2 == 0 {
                            store.record(key);
                        } else {
                            let _ = store.is_active(&key);
                        }
                    }
                });
            }
        });

        assert_eq!(store.len(), 50);
        assert!((0..50).all(|i| store.is_active(&format!("GET/{}", i))));
    }
}
