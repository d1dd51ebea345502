use payloads::responses;
use query_cache::QueryKey;
use yew::prelude::*;

use crate::get_api_client;
use crate::hooks::{QueryHookReturn, use_query};

/// Hook for the logged-in user's profile, cached under the `"profile"`
/// key.
#[hook]
pub fn use_profile() -> QueryHookReturn<responses::UserProfile> {
    use_query(QueryKey::new("profile"), || async {
        let api_client = get_api_client();
        api_client.user_profile().await.map_err(|e| e.to_string())
    })
}
