use jiff::SignedDuration;
use query_cache::{CacheConfig, QueryCache};
use yew::prelude::*;

/// How long a resolved query may be reused before a remount triggers a
/// new fetch.
const STALE_AFTER: SignedDuration = SignedDuration::from_secs(30);

#[derive(Properties, PartialEq)]
pub struct QueryCacheProviderProps {
    pub children: Children,
}

/// Owns the app's query cache for the lifetime of the provider. There
/// is no ambient cache; everything below this component reads it from
/// context.
#[function_component]
pub fn QueryCacheProvider(props: &QueryCacheProviderProps) -> Html {
    let cache = use_memo((), |_| {
        QueryCache::new(CacheConfig {
            stale_after: Some(STALE_AFTER),
        })
    });

    html! {
        <ContextProvider<QueryCache> context={(*cache).clone()}>
            {props.children.clone()}
        </ContextProvider<QueryCache>>
    }
}

#[hook]
pub fn use_query_cache() -> QueryCache {
    use_context::<QueryCache>()
        .expect("use_query_cache must be used within a QueryCacheProvider")
}
