//! A key-addressed cache for asynchronous queries.
//!
//! Each query is identified by a [`QueryKey`]. The cache guarantees at
//! most one in-flight request per key: concurrent callers of
//! [`QueryCache::fetch`] for the same key are joined onto the single
//! underlying request and all observe its outcome. Resolved values are
//! reused within the configured freshness window; rejected requests are
//! never served from cache, so the next fetch retries.
//!
//! The cache is single-threaded and cooperative. Handles are cheap to
//! clone and share one set of entries; there is no global instance, so
//! hosts decide the cache's lifetime explicitly (e.g. one per app
//! session, provided through context).

mod cache;
mod key;
mod state;

pub use cache::{CacheConfig, Clock, QueryCache};
pub use key::QueryKey;
pub use state::QueryState;
