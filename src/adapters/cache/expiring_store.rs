//! ExpiringStore - In-memory key-value store with per-entry TTL.
//!
//! Expired entries are never returned. They are reclaimed two ways:
//!
//! - lazily, when `get` or `pop` touches them
//! - periodically, by a background sweep task owned by the store
//!
//! ## Lifecycle
//!
//! The sweep task is spawned on the ambient Tokio runtime when the store is
//! created and is stopped when the store is dropped. Stores created outside a
//! runtime still work; they simply rely on lazy expiry alone.
//!
//! ## Concurrency
//!
//! All operations, including the sweep, take one short-lived mutex over the
//! whole map. No operation awaits while holding it.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time;

/// Default interval between background sweeps.
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(5);

const MIN_SWEEP_INTERVAL: Duration = Duration::from_millis(1);

// Deadline used when `now + ttl` is not representable.
const FAR_FUTURE: Duration = Duration::from_secs(100 * 365 * 24 * 60 * 60);

#[derive(Debug)]
struct Entry<V> {
    value: V,
    expires_at: Instant,
}

impl<V> Entry<V> {
    fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}

type Entries<K, V> = Arc<Mutex<HashMap<K, Entry<V>>>>;

/// Key-value store whose entries expire after a per-entry TTL.
///
/// Not `Clone`: share it behind an `Arc`. Dropping the last owner stops the
/// background sweep.
pub struct ExpiringStore<K, V> {
    entries: Entries<K, V>,
    shutdown: watch::Sender<bool>,
    sweeper: Option<JoinHandle<()>>,
}

impl<K, V> ExpiringStore<K, V>
where
    K: Eq + Hash + Send + 'static,
    V: Send + 'static,
{
    /// Creates a store sweeping every [`DEFAULT_SWEEP_INTERVAL`].
    pub fn new() -> Self {
        Self::with_sweep_interval(DEFAULT_SWEEP_INTERVAL)
    }

    /// Creates a store with a custom sweep interval.
    pub fn with_sweep_interval(sweep_interval: Duration) -> Self {
        let entries: Entries<K, V> = Arc::new(Mutex::new(HashMap::new()));
        let (shutdown, shutdown_rx) = watch::channel(false);

        let sweeper = match Handle::try_current() {
            Ok(handle) => Some(handle.spawn(run_sweeper(
                Arc::clone(&entries),
                sweep_interval.max(MIN_SWEEP_INTERVAL),
                shutdown_rx,
            ))),
            Err(_) => {
                tracing::warn!("No Tokio runtime available; expiring store will not sweep");
                None
            }
        };

        Self {
            entries,
            shutdown,
            sweeper,
        }
    }

    /// Inserts or overwrites `key`, expiring `ttl` from now.
    pub fn set(&self, key: K, value: V, ttl: Duration) {
        let expires_at = deadline(Instant::now(), ttl);
        self.lock().insert(key, Entry { value, expires_at });
    }

    /// Inserts `key` only if it is absent or expired. Returns whether it was
    /// inserted; check and insert happen under one lock.
    pub fn set_if_absent(&self, key: K, value: V, ttl: Duration) -> bool {
        let now = Instant::now();
        let mut entries = self.lock();

        if entries.get(&key).is_some_and(|entry| !entry.is_expired(now)) {
            return false;
        }
        entries.insert(
            key,
            Entry {
                value,
                expires_at: deadline(now, ttl),
            },
        );
        true
    }

    /// Returns the value for `key` if present and not expired.
    ///
    /// An expired entry found here is removed immediately.
    pub fn get(&self, key: &K) -> Option<V>
    where
        V: Clone,
    {
        let now = Instant::now();
        let mut entries = self.lock();

        match entries.get(key) {
            Some(entry) if !entry.is_expired(now) => Some(entry.value.clone()),
            Some(_) => {
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    /// Removes `key` and returns its value if it had not yet expired.
    ///
    /// The entry is removed whether or not it was expired.
    pub fn pop(&self, key: &K) -> Option<V> {
        let now = Instant::now();
        self.lock()
            .remove(key)
            .filter(|entry| !entry.is_expired(now))
            .map(|entry| entry.value)
    }

    /// Removes `key`. Missing keys are ignored.
    pub fn delete(&self, key: &K) {
        self.lock().remove(key);
    }

    /// Number of stored entries, including expired ones not yet reclaimed.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<K, Entry<V>>> {
        lock_entries(&self.entries)
    }
}

impl<K, V> Default for ExpiringStore<K, V>
where
    K: Eq + Hash + Send + 'static,
    V: Send + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> Drop for ExpiringStore<K, V> {
    fn drop(&mut self) {
        let _ = self.shutdown.send(true);
        if let Some(sweeper) = self.sweeper.take() {
            sweeper.abort();
        }
    }
}

impl<K, V> std::fmt::Debug for ExpiringStore<K, V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExpiringStore")
            .field("sweeping", &self.sweeper.is_some())
            .finish_non_exhaustive()
    }
}

/// `now + ttl`, clamped so an oversized TTL means "effectively never".
fn deadline(now: Instant, ttl: Duration) -> Instant {
    now.checked_add(ttl)
        .or_else(|| now.checked_add(FAR_FUTURE))
        .unwrap_or(now)
}

// A panic while holding the lock cannot leave the map half-updated, so a
// poisoned mutex is still safe to use.
fn lock_entries<K, V>(entries: &Mutex<HashMap<K, Entry<V>>>) -> MutexGuard<'_, HashMap<K, Entry<V>>> {
    entries.lock().unwrap_or_else(PoisonError::into_inner)
}

fn sweep<K, V>(entries: &Mutex<HashMap<K, Entry<V>>>) -> usize
where
    K: Eq + Hash,
{
    let now = Instant::now();
    let mut entries = lock_entries(entries);
    let before = entries.len();
    entries.retain(|_, entry| !entry.is_expired(now));
    before - entries.len()
}

async fn run_sweeper<K, V>(
    entries: Entries<K, V>,
    sweep_interval: Duration,
    mut shutdown: watch::Receiver<bool>,
) where
    K: Eq + Hash,
{
    let mut interval = time::interval(sweep_interval);
    interval.set_missed_tick_behavior(time::MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow() {
                    return;
                }
            }

            _ = interval.tick() => {
                let removed = sweep(&entries);
                if removed > 0 {
                    tracing::debug!(removed, "Swept expired entries");
                }
            }
        }
    }
}
