use payloads::responses;
use query_cache::QueryKey;
use yew::prelude::*;

use crate::get_api_client;
use crate::hooks::{QueryHookReturn, use_query};

/// Hook for the user's order history, cached under the `"orders"` key.
#[hook]
pub fn use_orders() -> QueryHookReturn<Vec<responses::OrderSummary>> {
    use_query(QueryKey::new("orders"), || async {
        let api_client = get_api_client();
        api_client.list_orders().await.map_err(|e| e.to_string())
    })
}
