use std::any::Any;
use std::cell::RefCell;
use std::collections::HashMap;
use std::future::Future;
use std::rc::Rc;

use futures::channel::oneshot;
use jiff::{SignedDuration, Timestamp};

use crate::{QueryKey, QueryState};

/// Cache-wide policy.
#[derive(Debug, Clone, Copy, Default)]
pub struct CacheConfig {
    /// How long a resolved value may be reused before a new fetch is
    /// triggered. `None` keeps values fresh until invalidated.
    pub stale_after: Option<SignedDuration>,
}

/// Time source for the freshness window. Injected so tests and hosts
/// with mocked time can control it.
pub type Clock = Rc<dyn Fn() -> Timestamp>;

enum EntryStatus {
    InFlight,
    Resolved(Rc<dyn Any>),
    Rejected(String),
}

type Outcome = Result<Rc<dyn Any>, String>;

struct Entry {
    status: EntryStatus,
    /// Set when a value landed; `None` means the entry is stale.
    fetched_at: Option<Timestamp>,
    /// Fetch callers that joined this entry's in-flight request.
    waiters: Vec<oneshot::Sender<Outcome>>,
    /// Invalidated while in flight: the landing value is already stale.
    invalidated: bool,
}

impl Entry {
    fn in_flight() -> Self {
        Self {
            status: EntryStatus::InFlight,
            fetched_at: None,
            waiters: Vec::new(),
            invalidated: false,
        }
    }
}

type Entries = Rc<RefCell<HashMap<QueryKey, Entry>>>;

/// Shared handle to the cache. Clones refer to the same entries;
/// equality is handle identity so the cache can be used as a context
/// value.
#[derive(Clone)]
pub struct QueryCache {
    config: CacheConfig,
    clock: Clock,
    entries: Entries,
}

impl PartialEq for QueryCache {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.entries, &other.entries)
    }
}

impl Default for QueryCache {
    fn default() -> Self {
        Self::new(CacheConfig::default())
    }
}

/// What a fetch caller should do after inspecting the entry table.
enum Plan<T> {
    Cached(Rc<T>),
    Join(oneshot::Receiver<Outcome>),
    Start,
}

impl QueryCache {
    pub fn new(config: CacheConfig) -> Self {
        Self::with_clock(config, Rc::new(Timestamp::now))
    }

    pub fn with_clock(config: CacheConfig, clock: Clock) -> Self {
        Self {
            config,
            clock,
            entries: Rc::default(),
        }
    }

    /// Fetch the value for `key`, reusing a fresh cached value or an
    /// in-flight request when one exists. Otherwise `fetch_fn` runs and
    /// its outcome is cached and handed to every joined caller.
    ///
    /// Dropping a joined caller does not abort the underlying request;
    /// its result still lands in the cache.
    pub async fn fetch<T, F, Fut>(
        &self,
        key: &QueryKey,
        fetch_fn: F,
    ) -> Result<Rc<T>, String>
    where
        T: 'static,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, String>>,
    {
        loop {
            match self.join_or_start::<T>(key) {
                Plan::Cached(value) => return Ok(value),
                Plan::Join(rx) => match rx.await {
                    Ok(Ok(value)) => match value.downcast::<T>() {
                        Ok(value) => return Ok(value),
                        Err(_) => {
                            tracing::warn!(
                                %key,
                                "joined request resolved with a different \
                                 type; refetching"
                            );
                            continue;
                        }
                    },
                    Ok(Err(error)) => return Err(error),
                    // The owning fetch was dropped before settling.
                    Err(oneshot::Canceled) => continue,
                },
                Plan::Start => break,
            }
        }

        // This caller owns the request. The guard clears the in-flight
        // marker if the future is dropped mid-fetch, waking joined
        // callers so one of them can take over.
        let guard = FlightGuard {
            entries: self.entries.clone(),
            key: key.clone(),
            armed: true,
        };
        tracing::debug!(%key, "fetching");
        let result = fetch_fn().await.map(Rc::new);
        self.settle(key, &result);
        guard.disarm();
        result
    }

    /// Non-blocking snapshot of the entry for `key`.
    pub fn get<T: 'static>(&self, key: &QueryKey) -> QueryState<T> {
        let entries = self.entries.borrow();
        match entries.get(key).map(|entry| &entry.status) {
            Some(EntryStatus::Resolved(value)) => value
                .clone()
                .downcast::<T>()
                .map(QueryState::Resolved)
                .unwrap_or(QueryState::Pending),
            Some(EntryStatus::Rejected(error)) => {
                QueryState::Rejected(error.clone())
            }
            Some(EntryStatus::InFlight) | None => QueryState::Pending,
        }
    }

    /// Discard the entry for `key`. An in-flight request is left to
    /// land, but its value is marked stale so the next fetch refetches.
    pub fn invalidate(&self, key: &QueryKey) {
        let mut entries = self.entries.borrow_mut();
        match entries.get_mut(key) {
            Some(entry) if matches!(entry.status, EntryStatus::InFlight) => {
                entry.invalidated = true;
                entry.fetched_at = None;
            }
            Some(_) => {
                entries.remove(key);
            }
            None => {}
        }
        tracing::debug!(%key, "invalidated");
    }

    /// Drop every settled entry, as on logout or session switch. An
    /// in-flight request is left to land with its value already stale,
    /// as with [`Self::invalidate`].
    pub fn clear(&self) {
        let mut entries = self.entries.borrow_mut();
        entries
            .retain(|_, entry| matches!(entry.status, EntryStatus::InFlight));
        for entry in entries.values_mut() {
            entry.invalidated = true;
            entry.fetched_at = None;
        }
    }

    fn join_or_start<T: 'static>(&self, key: &QueryKey) -> Plan<T> {
        let mut entries = self.entries.borrow_mut();
        if let Some(entry) = entries.get_mut(key) {
            match &entry.status {
                EntryStatus::Resolved(value) if self.is_fresh(entry) => {
                    match value.clone().downcast::<T>() {
                        Ok(value) => return Plan::Cached(value),
                        Err(_) => {
                            tracing::warn!(
                                %key,
                                "cached value has a different type; refetching"
                            );
                        }
                    }
                }
                EntryStatus::InFlight => {
                    let (tx, rx) = oneshot::channel();
                    entry.waiters.push(tx);
                    return Plan::Join(rx);
                }
                // Stale or rejected entries are refetched.
                _ => {}
            }
        }
        entries.insert(key.clone(), Entry::in_flight());
        Plan::Start
    }

    fn settle<T: 'static>(
        &self,
        key: &QueryKey,
        result: &Result<Rc<T>, String>,
    ) {
        let mut entries = self.entries.borrow_mut();
        let Some(entry) = entries.get_mut(key) else {
            return;
        };
        if !matches!(entry.status, EntryStatus::InFlight) {
            return;
        }

        let outcome: Outcome = match result {
            Ok(value) => {
                let value: Rc<dyn Any> = value.clone();
                Ok(value)
            }
            Err(error) => Err(error.clone()),
        };
        for waiter in entry.waiters.drain(..) {
            let _ = waiter.send(outcome.clone());
        }
        match outcome {
            Ok(value) => {
                entry.fetched_at =
                    (!entry.invalidated).then(|| (self.clock)());
                entry.status = EntryStatus::Resolved(value);
            }
            Err(error) => {
                entry.fetched_at = None;
                entry.status = EntryStatus::Rejected(error);
            }
        }
        entry.invalidated = false;
        tracing::debug!(%key, ok = result.is_ok(), "query settled");
    }

    fn is_fresh(&self, entry: &Entry) -> bool {
        let Some(fetched_at) = entry.fetched_at else {
            return false;
        };
        match self.config.stale_after {
            Some(window) => {
                (self.clock)().duration_since(fetched_at) <= window
            }
            None => true,
        }
    }
}

/// Removes the in-flight marker if the owning fetch never settled,
/// waking joined callers (they observe a canceled channel and retry).
struct FlightGuard {
    entries: Entries,
    key: QueryKey,
    armed: bool,
}

impl FlightGuard {
    fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for FlightGuard {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let mut entries = self.entries.borrow_mut();
        if let Some(entry) = entries.get(&self.key)
            && matches!(entry.status, EntryStatus::InFlight)
        {
            entries.remove(&self.key);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::executor::{LocalPool, block_on};
    use futures::task::LocalSpawnExt;
    use std::cell::Cell;

    fn counting_fetch(
        calls: &Rc<Cell<u32>>,
        value: i32,
    ) -> impl FnOnce() -> futures::future::Ready<Result<i32, String>> {
        let calls = calls.clone();
        move || {
            calls.set(calls.get() + 1);
            futures::future::ready(Ok(value))
        }
    }

    #[test]
    fn resolved_value_is_returned_and_cached() {
        let cache = QueryCache::default();
        let key = QueryKey::new("cart");
        let calls = Rc::new(Cell::new(0));

        let value =
            block_on(cache.fetch(&key, counting_fetch(&calls, 41))).unwrap();
        assert_eq!(*value, 41);
        assert_eq!(calls.get(), 1);

        // Second fetch is served from cache without calling again.
        let value =
            block_on(cache.fetch(&key, counting_fetch(&calls, 99))).unwrap();
        assert_eq!(*value, 41);
        assert_eq!(calls.get(), 1);
        assert_eq!(cache.get::<i32>(&key), QueryState::Resolved(value));
    }

    #[test]
    fn rejected_fetch_surfaces_error_and_is_not_cached() {
        let cache = QueryCache::default();
        let key = QueryKey::new("orders");

        let result: Result<Rc<i32>, String> = block_on(
            cache.fetch(&key, || {
                futures::future::ready(Err("boom".to_string()))
            }),
        );
        assert_eq!(result.unwrap_err(), "boom");
        assert_eq!(
            cache.get::<i32>(&key),
            QueryState::Rejected("boom".to_string())
        );

        // The rejection is terminal for that request only; the next
        // fetch retries.
        let calls = Rc::new(Cell::new(0));
        let value =
            block_on(cache.fetch(&key, counting_fetch(&calls, 7))).unwrap();
        assert_eq!(*value, 7);
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn pending_until_the_fetch_settles() {
        let mut pool = LocalPool::new();
        let spawner = pool.spawner();
        let cache = QueryCache::default();
        let key = QueryKey::new("profile");
        let (gate, gated) = oneshot::channel::<Result<String, String>>();
        let result = Rc::new(RefCell::new(None));

        {
            let cache = cache.clone();
            let key = key.clone();
            let result = result.clone();
            spawner
                .spawn_local(async move {
                    let out = cache
                        .fetch(&key, move || async move {
                            gated.await.expect("gate dropped")
                        })
                        .await;
                    *result.borrow_mut() = Some(out);
                })
                .unwrap();
        }

        pool.run_until_stalled();
        assert!(cache.get::<String>(&key).is_pending());
        assert!(result.borrow().is_none());

        gate.send(Ok("ada".to_string())).unwrap();
        pool.run_until_stalled();
        assert_eq!(
            result.borrow().clone().unwrap().unwrap(),
            Rc::new("ada".to_string())
        );
        assert_eq!(
            cache.get::<String>(&key),
            QueryState::Resolved(Rc::new("ada".to_string()))
        );
    }

    #[test]
    fn concurrent_fetches_share_one_request() {
        let mut pool = LocalPool::new();
        let spawner = pool.spawner();
        let cache = QueryCache::default();
        let key = QueryKey::new("cart");
        let calls = Rc::new(Cell::new(0));
        let (gate, gated) = oneshot::channel::<Result<i32, String>>();
        let results = Rc::new(RefCell::new(Vec::new()));

        // First subscriber owns the (gated) request.
        {
            let cache = cache.clone();
            let key = key.clone();
            let calls = calls.clone();
            let results = results.clone();
            spawner
                .spawn_local(async move {
                    let out = cache
                        .fetch(&key, move || {
                            calls.set(calls.get() + 1);
                            async move { gated.await.expect("gate dropped") }
                        })
                        .await;
                    results.borrow_mut().push(out);
                })
                .unwrap();
        }
        // Second subscriber would resolve instantly with 99, but must
        // be joined onto the in-flight request instead.
        {
            let cache = cache.clone();
            let key = key.clone();
            let calls = calls.clone();
            let results = results.clone();
            spawner
                .spawn_local(async move {
                    let out =
                        cache.fetch(&key, counting_fetch(&calls, 99)).await;
                    results.borrow_mut().push(out);
                })
                .unwrap();
        }

        pool.run_until_stalled();
        assert_eq!(calls.get(), 1);
        assert!(results.borrow().is_empty());

        gate.send(Ok(7)).unwrap();
        pool.run_until_stalled();
        let results = results.borrow();
        assert_eq!(results.len(), 2);
        for result in results.iter() {
            assert_eq!(*result.clone().unwrap(), 7);
        }
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn values_go_stale_after_the_freshness_window() {
        let now = Rc::new(Cell::new(Timestamp::UNIX_EPOCH));
        let clock: Clock = {
            let now = now.clone();
            Rc::new(move || now.get())
        };
        let cache = QueryCache::with_clock(
            CacheConfig {
                stale_after: Some(SignedDuration::from_secs(30)),
            },
            clock,
        );
        let key = QueryKey::new("cart");
        let calls = Rc::new(Cell::new(0));

        block_on(cache.fetch(&key, counting_fetch(&calls, 1))).unwrap();
        assert_eq!(calls.get(), 1);

        // Within the window: served from cache.
        now.set(Timestamp::UNIX_EPOCH + SignedDuration::from_secs(10));
        block_on(cache.fetch(&key, counting_fetch(&calls, 2))).unwrap();
        assert_eq!(calls.get(), 1);

        // Past the window: refetched.
        now.set(Timestamp::UNIX_EPOCH + SignedDuration::from_secs(60));
        let value =
            block_on(cache.fetch(&key, counting_fetch(&calls, 3))).unwrap();
        assert_eq!(*value, 3);
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn invalidation_forces_a_refetch() {
        let cache = QueryCache::default();
        let key = QueryKey::new("orders");
        let calls = Rc::new(Cell::new(0));

        block_on(cache.fetch(&key, counting_fetch(&calls, 1))).unwrap();
        cache.invalidate(&key);
        assert!(cache.get::<i32>(&key).is_pending());

        let value =
            block_on(cache.fetch(&key, counting_fetch(&calls, 2))).unwrap();
        assert_eq!(*value, 2);
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn invalidating_midflight_marks_the_landing_value_stale() {
        let mut pool = LocalPool::new();
        let spawner = pool.spawner();
        let cache = QueryCache::default();
        let key = QueryKey::new("cart");
        let calls = Rc::new(Cell::new(0));
        let (gate, gated) = oneshot::channel::<Result<i32, String>>();
        let result = Rc::new(RefCell::new(None));

        {
            let cache = cache.clone();
            let key = key.clone();
            let calls = calls.clone();
            let result = result.clone();
            spawner
                .spawn_local(async move {
                    let out = cache
                        .fetch(&key, move || {
                            calls.set(calls.get() + 1);
                            async move { gated.await.expect("gate dropped") }
                        })
                        .await;
                    *result.borrow_mut() = Some(out);
                })
                .unwrap();
        }
        pool.run_until_stalled();

        // Invalidation arrives while the request is still in flight:
        // the request is left to land, but its value is already stale.
        cache.invalidate(&key);
        gate.send(Ok(1)).unwrap();
        pool.run_until_stalled();
        assert_eq!(*result.borrow().clone().unwrap().unwrap(), 1);
        assert_eq!(calls.get(), 1);

        let value =
            block_on(cache.fetch(&key, counting_fetch(&calls, 2))).unwrap();
        assert_eq!(*value, 2);
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn wrong_typed_cached_value_is_refetched() {
        let cache = QueryCache::default();
        let key = QueryKey::new("cart");

        block_on(cache.fetch(&key, || {
            futures::future::ready(Ok::<_, String>("stale".to_string()))
        }))
        .unwrap();

        // Reusing the key with another type refetches instead of
        // panicking or serving the old value.
        let calls = Rc::new(Cell::new(0));
        let value =
            block_on(cache.fetch(&key, counting_fetch(&calls, 4))).unwrap();
        assert_eq!(*value, 4);
        assert_eq!(calls.get(), 1);
        assert_eq!(cache.get::<i32>(&key), QueryState::Resolved(value));
    }

    #[test]
    fn waiter_refetches_when_the_joined_request_has_another_type() {
        let mut pool = LocalPool::new();
        let spawner = pool.spawner();
        let cache = QueryCache::default();
        let key = QueryKey::new("profile");
        let calls = Rc::new(Cell::new(0));
        let (gate, gated) = oneshot::channel::<Result<String, String>>();
        let waiter_result = Rc::new(RefCell::new(None));

        // Owner resolves the key as a String.
        {
            let cache = cache.clone();
            let key = key.clone();
            spawner
                .spawn_local(async move {
                    let _ = cache
                        .fetch(&key, move || async move {
                            gated.await.expect("gate dropped")
                        })
                        .await;
                })
                .unwrap();
        }
        pool.run_until_stalled();

        // Waiter joins the same flight but expects an i32.
        {
            let cache = cache.clone();
            let key = key.clone();
            let calls = calls.clone();
            let waiter_result = waiter_result.clone();
            spawner
                .spawn_local(async move {
                    let out =
                        cache.fetch(&key, counting_fetch(&calls, 6)).await;
                    *waiter_result.borrow_mut() = Some(out);
                })
                .unwrap();
        }
        pool.run_until_stalled();
        assert_eq!(calls.get(), 0);

        gate.send(Ok("text".to_string())).unwrap();
        pool.run_until_stalled();
        assert_eq!(*waiter_result.borrow().clone().unwrap().unwrap(), 6);
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn clear_drops_every_entry() {
        let cache = QueryCache::default();
        let calls = Rc::new(Cell::new(0));
        let cart = QueryKey::new("cart");
        let orders = QueryKey::new("orders");

        block_on(cache.fetch(&cart, counting_fetch(&calls, 1))).unwrap();
        block_on(cache.fetch(&orders, counting_fetch(&calls, 2))).unwrap();
        cache.clear();
        assert!(cache.get::<i32>(&cart).is_pending());
        assert!(cache.get::<i32>(&orders).is_pending());
    }

    #[test]
    fn distinct_keys_are_independent() {
        let cache = QueryCache::default();
        let calls = Rc::new(Cell::new(0));
        let mine = QueryKey::scoped("cart", "user-a");
        let theirs = QueryKey::scoped("cart", "user-b");

        let a = block_on(cache.fetch(&mine, counting_fetch(&calls, 1)))
            .unwrap();
        let b = block_on(cache.fetch(&theirs, counting_fetch(&calls, 2)))
            .unwrap();
        assert_eq!(*a, 1);
        assert_eq!(*b, 2);
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn dropped_owner_hands_the_request_to_a_waiter() {
        let mut pool = LocalPool::new();
        let spawner = pool.spawner();
        let cache = QueryCache::default();
        let key = QueryKey::new("profile");
        let calls = Rc::new(Cell::new(0));
        let result = Rc::new(RefCell::new(None));

        // Owner whose fetch never settles.
        let owner = {
            let cache = cache.clone();
            let key = key.clone();
            spawner
                .spawn_local_with_handle(async move {
                    let _ = cache
                        .fetch(&key, || {
                            futures::future::pending::<Result<i32, String>>()
                        })
                        .await;
                })
                .unwrap()
        };
        pool.run_until_stalled();

        // Waiter joins the in-flight request.
        {
            let cache = cache.clone();
            let key = key.clone();
            let calls = calls.clone();
            let result = result.clone();
            spawner
                .spawn_local(async move {
                    let out =
                        cache.fetch(&key, counting_fetch(&calls, 5)).await;
                    *result.borrow_mut() = Some(out);
                })
                .unwrap();
        }
        pool.run_until_stalled();
        assert_eq!(calls.get(), 0);
        assert!(result.borrow().is_none());

        // Cancelling the owner lets the waiter take over the fetch.
        drop(owner);
        pool.run_until_stalled();
        assert_eq!(*result.borrow().clone().unwrap().unwrap(), 5);
        assert_eq!(calls.get(), 1);
    }
}
