use payloads::responses;
use query_cache::QueryKey;
use yew::prelude::*;

use crate::get_api_client;
use crate::hooks::{QueryHookReturn, use_query};

/// Hook for the current cart contents, cached under the `"cart"` key.
/// Subscribers within the freshness window reuse the cached cart
/// without a new request.
#[hook]
pub fn use_cart() -> QueryHookReturn<responses::Cart> {
    use_query(QueryKey::new("cart"), || async {
        let api_client = get_api_client();
        api_client.get_cart().await.map_err(|e| e.to_string())
    })
}
