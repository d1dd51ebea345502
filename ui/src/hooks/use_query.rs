use std::future::Future;
use std::rc::Rc;

use query_cache::{QueryKey, QueryState};
use yew::prelude::*;

use crate::contexts::query::use_query_cache;

/// Generic query hook return type
pub struct QueryHookReturn<T> {
    /// The resolved value, or `None` while pending or rejected.
    pub data: Option<Rc<T>>,
    /// True until the first settlement of the current request.
    pub is_loading: bool,
    pub error: Option<String>,
    /// Invalidates the key and fetches again.
    pub refetch: Callback<()>,
}

impl<T> QueryHookReturn<T> {
    /// Returns true if this is the initial load (data not yet fetched,
    /// currently loading, and no error).
    pub fn is_initial_loading(&self) -> bool {
        self.is_loading && self.data.is_none() && self.error.is_none()
    }
}

/// Generic query hook composer.
///
/// Subscribes to `key` in the context-provided [`query_cache::QueryCache`],
/// fetching on mount with `fetch_fn`. The fetch function is required:
/// a query can never sit silently pending for lack of wiring.
/// Concurrent subscribers to the same key within the cache's freshness
/// window share one underlying request and one cached value.
///
/// Unmounting stops consuming the result but does not abort the
/// request; its outcome still lands in the cache for the next
/// subscriber.
#[hook]
pub fn use_query<T, F, Fut>(key: QueryKey, fetch_fn: F) -> QueryHookReturn<T>
where
    T: 'static,
    F: Fn() -> Fut + 'static,
    Fut: Future<Output = Result<T, String>> + 'static,
{
    let cache = use_query_cache();
    let snapshot = use_state({
        let cache = cache.clone();
        let key = key.clone();
        move || cache.get::<T>(&key)
    });
    let fetch_fn = Rc::new(fetch_fn);

    let refetch = {
        let cache = cache.clone();
        let snapshot = snapshot.clone();
        let fetch_fn = fetch_fn.clone();

        use_callback(key.clone(), move |invalidate: bool, key| {
            let cache = cache.clone();
            let snapshot = snapshot.clone();
            let fetch_fn = fetch_fn.clone();
            let key = key.clone();

            yew::platform::spawn_local(async move {
                if invalidate {
                    cache.invalidate(&key);
                    snapshot.set(QueryState::Pending);
                }
                let result = cache.fetch(&key, || fetch_fn()).await;
                snapshot.set(match result {
                    Ok(value) => QueryState::Resolved(value),
                    Err(error) => QueryState::Rejected(error),
                });
            });
        })
    };

    // Auto-fetch on mount and when the key changes. The cache
    // deduplicates, so this is a no-op when a fresh value exists.
    {
        let refetch = refetch.clone();
        use_effect_with(key, move |_| {
            refetch.emit(false);
        });
    }

    let (data, error) = match &*snapshot {
        QueryState::Pending => (None, None),
        QueryState::Resolved(value) => (Some(value.clone()), None),
        QueryState::Rejected(error) => (None, Some(error.clone())),
    };
    // Pending covers the pre-fetch initial render as well.
    let is_loading = data.is_none() && error.is_none();

    QueryHookReturn {
        data,
        is_loading,
        error,
        refetch: Callback::from(move |_| refetch.emit(true)),
    }
}
