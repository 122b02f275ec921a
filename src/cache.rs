//! Process-wide query cache shared by every list controller.
//!
//! Values are stored under hierarchical [`QueryKey`]s such as
//! `customers/list/page=1&...` or `orders/detail/7`, so a mutation can drop a
//! whole entity namespace without touching other features. Stale data is
//! always resolved by refetching; cached values are never patched in place.

use std::any::Any;
use std::collections::HashMap;
use std::fmt::Display;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{
    Arc, Condvar, Mutex, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard,
};
use std::time::{Duration, Instant};

use crate::dto::query::ListQueryParams;

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct QueryKey(Vec<String>);

impl QueryKey {
    pub fn new<I, S>(parts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(parts.into_iter().map(Into::into).collect())
    }

    /// Every key of one collection: lists and details.
    pub fn namespace(collection: &str) -> Self {
        Self::new([collection])
    }

    /// Every list page of one collection.
    pub fn lists(collection: &str) -> Self {
        Self::new([collection, "list"])
    }

    pub fn list(collection: &str, params: &ListQueryParams) -> Self {
        Self::new([collection.to_string(), "list".to_string(), params.serialized()])
    }

    pub fn detail(collection: &str, id: impl Display) -> Self {
        Self::new([collection.to_string(), "detail".to_string(), id.to_string()])
    }

    pub fn starts_with(&self, prefix: &QueryKey) -> bool {
        self.0.starts_with(&prefix.0)
    }
}

impl Display for QueryKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.join("/"))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CachePolicy {
    /// Extra attempts after a failed fetch.
    pub retries: u32,
    /// Age after which an entry is refetched even without invalidation.
    pub max_age: Option<Duration>,
}

impl Default for CachePolicy {
    fn default() -> Self {
        Self {
            retries: 0,
            max_age: None,
        }
    }
}

enum Slot {
    InFlight {
        token: u64,
    },
    Ready {
        value: Arc<dyn Any + Send + Sync>,
        stored_at: Instant,
    },
}

/// Result of a cache lookup that never triggers a fetch.
#[derive(Debug, PartialEq)]
pub enum CacheLookup<V> {
    Fresh(V),
    InFlight,
    Miss,
}

/// Claim on a key returned by [`QueryCache::begin`]. Only the holder of the
/// latest claim can store a value for that key.
#[derive(Debug)]
pub struct FetchToken {
    key: QueryKey,
    token: u64,
}

impl FetchToken {
    pub fn key(&self) -> &QueryKey {
        &self.key
    }
}

pub struct QueryCache {
    slots: RwLock<HashMap<QueryKey, Slot>>,
    next_token: AtomicU64,
    policy: CachePolicy,
    /// Bumped whenever an in-flight slot settles; waiters sleep on `settled`.
    generation: Mutex<u64>,
    settled: Condvar,
}

impl Default for QueryCache {
    fn default() -> Self {
        Self::new(CachePolicy::default())
    }
}

impl QueryCache {
    pub fn new(policy: CachePolicy) -> Self {
        Self {
            slots: RwLock::new(HashMap::new()),
            next_token: AtomicU64::new(1),
            policy,
            generation: Mutex::new(0),
            settled: Condvar::new(),
        }
    }

    pub fn policy(&self) -> CachePolicy {
        self.policy
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<QueryKey, Slot>> {
        self.slots.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<QueryKey, Slot>> {
        self.slots.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn is_in_flight(&self, key: &QueryKey) -> bool {
        matches!(self.read().get(key), Some(Slot::InFlight { .. }))
    }

    /// Wakes every caller blocked in [`QueryCache::wait_settled`]. Must be
    /// called after the slot map write lock has been released.
    fn notify_settled(&self) {
        let mut generation = self.generation.lock().unwrap_or_else(PoisonError::into_inner);
        *generation = generation.wrapping_add(1);
        self.settled.notify_all();
    }

    /// Blocks until `key` is no longer in flight.
    fn wait_settled(&self, key: &QueryKey) {
        let generation = self.generation.lock().unwrap_or_else(PoisonError::into_inner);
        let _settled = self
            .settled
            .wait_while(generation, |_| self.is_in_flight(key))
            .unwrap_or_else(PoisonError::into_inner);
    }

    fn is_expired(&self, stored_at: Instant) -> bool {
        self.policy
            .max_age
            .is_some_and(|max_age| stored_at.elapsed() >= max_age)
    }

    pub fn lookup<V>(&self, key: &QueryKey) -> CacheLookup<V>
    where
        V: Clone + 'static,
    {
        match self.read().get(key) {
            Some(Slot::InFlight { .. }) => CacheLookup::InFlight,
            Some(Slot::Ready { value, stored_at }) => {
                if self.is_expired(*stored_at) {
                    return CacheLookup::Miss;
                }
                match value.downcast_ref::<V>() {
                    Some(value) => CacheLookup::Fresh(value.clone()),
                    None => {
                        log::warn!("Cached value under {key} has an unexpected type");
                        CacheLookup::Miss
                    }
                }
            }
            None => CacheLookup::Miss,
        }
    }

    /// Marks `key` as being fetched. Returns `None` when a fetch for the same
    /// key is already in flight.
    pub fn begin(&self, key: &QueryKey) -> Option<FetchToken> {
        let mut slots = self.write();
        if let Some(Slot::InFlight { .. }) = slots.get(key) {
            log::debug!("Fetch for {key} already in flight");
            return None;
        }
        let token = self.next_token.fetch_add(1, Ordering::Relaxed);
        slots.insert(key.clone(), Slot::InFlight { token });
        Some(FetchToken {
            key: key.clone(),
            token,
        })
    }

    /// Stores the fetched value unless the key was invalidated (or claimed
    /// again) while the fetch was running.
    pub fn complete<V>(&self, claim: FetchToken, value: V) -> bool
    where
        V: Send + Sync + 'static,
    {
        let mut slots = self.write();
        let claimed = matches!(
            slots.get(&claim.key),
            Some(Slot::InFlight { token }) if *token == claim.token
        );
        if !claimed {
            log::debug!("Dropping result for {} fetched before invalidation", claim.key);
            return false;
        }
        slots.insert(
            claim.key,
            Slot::Ready {
                value: Arc::new(value),
                stored_at: Instant::now(),
            },
        );
        drop(slots);
        self.notify_settled();
        true
    }

    /// Releases a claim after a failed fetch; failures are never cached.
    pub fn abandon(&self, claim: FetchToken) {
        let mut slots = self.write();
        let claimed = matches!(
            slots.get(&claim.key),
            Some(Slot::InFlight { token }) if *token == claim.token
        );
        if claimed {
            slots.remove(&claim.key);
        }
        drop(slots);
        self.notify_settled();
    }

    /// Returns the cached value for `key` or runs `fetch` and caches its
    /// successful result.
    ///
    /// When another caller is already fetching `key`, this waits for that
    /// fetch and serves its value. It only fetches itself if the other fetch
    /// failed or was invalidated.
    pub fn fetch_with<V, E, F>(&self, key: &QueryKey, mut fetch: F) -> Result<V, E>
    where
        V: Clone + Send + Sync + 'static,
        E: Display,
        F: FnMut() -> Result<V, E>,
    {
        let claim = loop {
            if let CacheLookup::Fresh(value) = self.lookup::<V>(key) {
                log::debug!("Cache hit for {key}");
                return Ok(value);
            }
            match self.begin(key) {
                Some(claim) => break claim,
                None => {
                    log::debug!("Waiting for in-flight fetch of {key}");
                    self.wait_settled(key);
                }
            }
        };
        log::debug!("Cache miss for {key}");

        let mut attempt = 0;
        let result = loop {
            match fetch() {
                Ok(value) => break Ok(value),
                Err(err) if attempt < self.policy.retries => {
                    attempt += 1;
                    log::warn!("Fetch for {key} failed ({err}), retry {attempt}");
                }
                Err(err) => break Err(err),
            }
        };

        match result {
            Ok(value) => {
                self.complete(claim, value.clone());
                Ok(value)
            }
            Err(err) => {
                self.abandon(claim);
                Err(err)
            }
        }
    }

    /// Drops every entry whose key starts with `prefix`, including in-flight
    /// claims, and returns how many were removed.
    pub fn invalidate(&self, prefix: &QueryKey) -> usize {
        let mut slots = self.write();
        let before = slots.len();
        slots.retain(|key, _| !key.starts_with(prefix));
        let removed = before - slots.len();
        drop(slots);
        self.notify_settled();
        log::debug!("Invalidated {removed} cache entries under {prefix}");
        removed
    }

    pub fn clear(&self) {
        self.write().clear();
        self.notify_settled();
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::sync::Barrier;
    use std::sync::atomic::AtomicUsize;
    use std::thread;

    use super::*;

    fn key(parts: &[&str]) -> QueryKey {
        QueryKey::new(parts.iter().copied())
    }

    #[test]
    fn second_read_is_served_from_cache() {
        let cache = QueryCache::default();
        let calls = Cell::new(0);
        let fetch = || -> Result<u32, String> {
            calls.set(calls.get() + 1);
            Ok(7)
        };

        let k = key(&["customers", "list", "page=1"]);
        assert_eq!(cache.fetch_with(&k, fetch), Ok(7));
        assert_eq!(cache.fetch_with(&k, fetch), Ok(7));
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn failures_are_not_cached_or_retried() {
        let cache = QueryCache::default();
        let calls = Cell::new(0);
        let k = key(&["orders", "list", "page=1"]);

        let result: Result<u32, String> = cache.fetch_with(&k, || {
            calls.set(calls.get() + 1);
            Err("boom".to_string())
        });

        assert_eq!(result, Err("boom".to_string()));
        assert_eq!(calls.get(), 1);
        assert!(cache.is_empty());
    }

    #[test]
    fn retry_policy_adds_attempts() {
        let cache = QueryCache::new(CachePolicy {
            retries: 2,
            max_age: None,
        });
        let calls = Cell::new(0);
        let k = key(&["orders", "list", "page=1"]);

        let result: Result<u32, String> = cache.fetch_with(&k, || {
            calls.set(calls.get() + 1);
            if calls.get() < 3 {
                Err("flaky".to_string())
            } else {
                Ok(1)
            }
        });

        assert_eq!(result, Ok(1));
        assert_eq!(calls.get(), 3);
    }

    #[test]
    fn invalidate_only_touches_the_prefix_namespace() {
        let cache = QueryCache::default();
        let ok = |v: u32| move || -> Result<u32, String> { Ok(v) };
        cache
            .fetch_with(&key(&["customers", "list", "page=1"]), ok(1))
            .expect("cached");
        cache
            .fetch_with(&key(&["customers", "detail", "4"]), ok(2))
            .expect("cached");
        cache
            .fetch_with(&key(&["orders", "list", "page=1"]), ok(3))
            .expect("cached");

        assert_eq!(cache.invalidate(&QueryKey::lists("customers")), 1);
        assert_eq!(cache.invalidate(&QueryKey::namespace("customers")), 1);
        assert_eq!(cache.len(), 1);
        assert_eq!(
            cache.lookup::<u32>(&key(&["orders", "list", "page=1"])),
            CacheLookup::Fresh(3)
        );
    }

    #[test]
    fn concurrent_claims_are_deduplicated() {
        let cache = QueryCache::default();
        let k = key(&["suppliers", "list", "page=1"]);

        let claim = cache.begin(&k).expect("first claim");
        assert!(cache.begin(&k).is_none());
        assert_eq!(cache.lookup::<u32>(&k), CacheLookup::InFlight);

        assert!(cache.complete(claim, 5_u32));
        assert_eq!(cache.lookup::<u32>(&k), CacheLookup::Fresh(5));
    }

    #[test]
    fn results_fetched_before_invalidation_are_dropped() {
        let cache = QueryCache::default();
        let k = key(&["orders", "list", "page=2"]);

        let claim = cache.begin(&k).expect("claim");
        cache.invalidate(&QueryKey::namespace("orders"));

        assert!(!cache.complete(claim, 9_u32));
        assert_eq!(cache.lookup::<u32>(&k), CacheLookup::Miss);
    }

    #[test]
    fn expired_entries_are_refetched() {
        let cache = QueryCache::new(CachePolicy {
            retries: 0,
            max_age: Some(Duration::ZERO),
        });
        let calls = Cell::new(0);
        let k = key(&["products", "list", "page=1"]);
        let fetch = || -> Result<u32, String> {
            calls.set(calls.get() + 1);
            Ok(calls.get())
        };

        assert_eq!(cache.fetch_with(&k, fetch), Ok(1));
        assert_eq!(cache.fetch_with(&k, fetch), Ok(2));
    }

    #[test]
    fn mismatched_types_are_treated_as_miss() {
        let cache = QueryCache::default();
        let k = key(&["customers", "detail", "1"]);
        let claim = cache.begin(&k).expect("claim");
        cache.complete(claim, "text".to_string());

        assert_eq!(cache.lookup::<u32>(&k), CacheLookup::Miss);
    }

    #[test]
    fn concurrent_fetches_of_one_key_share_a_single_request() {
        let cache = QueryCache::default();
        let calls = AtomicUsize::new(0);
        let barrier = Barrier::new(2);
        let k = key(&["customers", "list", "page=1"]);

        let results: Vec<Result<u32, String>> = thread::scope(|scope| {
            let handles: Vec<_> = (0..2)
                .map(|_| {
                    scope.spawn(|| {
                        barrier.wait();
                        cache.fetch_with(&k, || {
                            calls.fetch_add(1, Ordering::SeqCst);
                            thread::sleep(Duration::from_millis(200));
                            Ok(11)
                        })
                    })
                })
                .collect();
            handles
                .into_iter()
                .map(|handle| handle.join().expect("fetch thread"))
                .collect()
        });

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(results, vec![Ok(11), Ok(11)]);
    }

    #[test]
    fn waiter_fetches_itself_after_owner_fails() {
        let cache = QueryCache::default();
        let calls = AtomicUsize::new(0);
        let barrier = Barrier::new(2);
        let k = key(&["orders", "list", "page=1"]);

        let results: Vec<Result<u32, String>> = thread::scope(|scope| {
            let handles: Vec<_> = (0..2)
                .map(|_| {
                    scope.spawn(|| {
                        barrier.wait();
                        cache.fetch_with(&k, || {
                            let call = calls.fetch_add(1, Ordering::SeqCst);
                            thread::sleep(Duration::from_millis(100));
                            if call == 0 {
                                Err("down".to_string())
                            } else {
                                Ok(3)
                            }
                        })
                    })
                })
                .collect();
            handles
                .into_iter()
                .map(|handle| handle.join().expect("fetch thread"))
                .collect()
        });

        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert!(results.contains(&Err("down".to_string())));
        assert!(results.contains(&Ok(3)));
        assert_eq!(cache.lookup::<u32>(&k), CacheLookup::Fresh(3));
    }
}
