//! Thread-Safe Storage Engine with Expiry Support
//!
//! This module implements the key-value store behind every command.
//! It is a single `HashMap` guarded by one `RwLock`, owned by a
//! [`StorageEngine`] value that callers share through an `Arc`.
//!
//! ## Concurrency Model
//!
//! ```text
//! ┌──────────────────────────────────────────┐
//! │              StorageEngine               │
//! │  ┌────────────────────────────────────┐  │
//! │  │ RwLock<HashMap<String, Entry>>     │  │
//! │  └────────────────────────────────────┘  │
//! │   get: shared      set/delete/sweep:     │
//! │                    exclusive             │
//! └──────────────────────────────────────────┘
//! ```
//!
//! ## Expiry
//!
//! An entry whose deadline has passed is treated as absent the moment the
//! deadline passes, whether or not it has been removed yet. Reads remove
//! such entries on the way out (lazy expiry), and [`StorageEngine::sweep`]
//! removes all of them in one pass.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::{Duration, Instant};
use tracing::trace;

/// Represents a stored value with optional expiry time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    /// The actual value stored
    pub value: String,
    /// When this entry expires (None = never expires)
    pub expires_at: Option<Instant>,
}

impl Entry {
    /// Creates a new entry without expiry.
    pub fn new(value: String) -> Self {
        Self {
            value,
            expires_at: None,
        }
    }

    /// Creates a new entry that expires `ttl` from now.
    ///
    /// A zero TTL means no expiry. So does a TTL too large to represent as an
    /// instant.
    pub fn with_ttl(value: String, ttl: Duration) -> Self {
        let expires_at = if ttl.is_zero() {
            None
        } else {
            Instant::now().checked_add(ttl)
        };
        Self { value, expires_at }
    }

    /// Checks if this entry has expired.
    #[inline]
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Instant::now())
    }

    #[inline]
    fn is_expired_at(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|exp| now >= exp)
    }
}

/// The key-value store.
///
/// All operations are total: they never fail and never panic on a poisoned
/// lock.
///
/// # Example
///
/// ```
/// use emberkv::storage::StorageEngine;
/// use std::time::Duration;
///
/// let engine = StorageEngine::new();
///
/// engine.set("name".into(), "Ariz".into(), None);
/// assert_eq!(engine.get("name"), Some("Ariz".to_string()));
///
/// engine.set("session".into(), "abc123".into(), Some(Duration::from_secs(60)));
/// assert!(engine.delete("session"));
/// ```
pub struct StorageEngine {
    data: RwLock<HashMap<String, Entry>>,

    /// Statistics: total GET operations
    get_count: AtomicU64,

    /// Statistics: total SET operations
    set_count: AtomicU64,

    /// Statistics: total DEL operations
    del_count: AtomicU64,

    /// Statistics: number of expired keys cleaned up
    expired_count: AtomicU64,
}

impl std::fmt::Debug for StorageEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorageEngine")
            .field("keys", &self.len())
            .field("get_count", &self.get_count.load(Ordering::Relaxed))
            .field("set_count", &self.set_count.load(Ordering::Relaxed))
            .finish()
    }
}

impl Default for StorageEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl StorageEngine {
    /// Creates an empty storage engine.
    pub fn new() -> Self {
        Self {
            data: RwLock::new(HashMap::new()),
            get_count: AtomicU64::new(0),
            set_count: AtomicU64::new(0),
            del_count: AtomicU64::new(0),
            expired_count: AtomicU64::new(0),
        }
    }

    // Every critical section leaves the map consistent, so a panic in another
    // holder does not invalidate the data.
    fn read(&self) -> RwLockReadGuard<'_, HashMap<String, Entry>> {
        self.data.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, Entry>> {
        self.data.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Sets a key, replacing any existing entry and its expiry.
    ///
    /// With `Some(ttl)` the entry expires `ttl` after this call.
    pub fn set(&self, key: String, value: String, ttl: Option<Duration>) {
        self.set_count.fetch_add(1, Ordering::Relaxed);

        let entry = match ttl {
            Some(ttl) => Entry::with_ttl(value, ttl),
            None => Entry::new(value),
        };

        self.write().insert(key, entry);
    }

    /// Gets the value for a key.
    ///
    /// Returns `None` if the key doesn't exist or has expired.
    /// An expired entry found here is removed before returning.
    pub fn get(&self, key: &str) -> Option<String> {
        self.get_count.fetch_add(1, Ordering::Relaxed);

        // Fast path under the shared lock
        {
            let data = self.read();
            match data.get(key) {
                Some(entry) if !entry.is_expired() => return Some(entry.value.clone()),
                Some(_) => {}
                None => return None,
            }
        }

        // Expired: take the exclusive lock only to remove it
        let mut data = self.write();
        if let Some(entry) = data.get(key) {
            if entry.is_expired() {
                data.remove(key);
                self.expired_count.fetch_add(1, Ordering::Relaxed);
                trace!(key, "Removed expired key on read");
                return None;
            }
            // Race: another writer replaced the key in between
            return Some(entry.value.clone());
        }

        None
    }

    /// Deletes a key.
    ///
    /// Returns `true` if a live entry was removed. An expired entry is removed
    /// too, but counts as absent.
    pub fn delete(&self, key: &str) -> bool {
        self.del_count.fetch_add(1, Ordering::Relaxed);

        match self.write().remove(key) {
            Some(entry) if entry.is_expired() => {
                self.expired_count.fetch_add(1, Ordering::Relaxed);
                false
            }
            Some(_) => true,
            None => false,
        }
    }

    /// Deletes several keys, returning how many live entries were removed.
    pub fn delete_many<S: AsRef<str>>(&self, keys: &[S]) -> u64 {
        keys.iter()
            .filter(|key| self.delete(AsRef::<str>::as_ref(*key)))
            .count() as u64
    }

    /// Removes every expired entry.
    ///
    /// # Returns
    ///
    /// Returns the number of entries removed.
    pub fn sweep(&self) -> u64 {
        let mut data = self.write();
        let before = data.len();

        let now = Instant::now();
        data.retain(|_, entry| !entry.is_expired_at(now));

        let removed = (before - data.len()) as u64;
        if removed > 0 {
            self.expired_count.fetch_add(removed, Ordering::Relaxed);
        }

        removed
    }

    /// Returns the number of entries held, including expired entries not yet
    /// removed.
    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns operation counters.
    pub fn stats(&self) -> StorageStats {
        StorageStats {
            keys: self.len() as u64,
            get_ops: self.get_count.load(Ordering::Relaxed),
            set_ops: self.set_count.load(Ordering::Relaxed),
            del_ops: self.del_count.load(Ordering::Relaxed),
            expired: self.expired_count.load(Ordering::Relaxed),
        }
    }
}

/// Database statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StorageStats {
    /// Number of entries currently held
    pub keys: u64,
    /// Total GET operations
    pub get_ops: u64,
    /// Total SET operations
    pub set_ops: u64,
    /// Total DEL operations
    pub del_ops: u64,
    /// Total expired keys removed
    pub expired: u64,
}
