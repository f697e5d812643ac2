use std::fmt;
use std::future::Future;
use std::sync::Arc;

use dashmap::DashMap;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::api::ConfessionsApi;
use crate::error::{ClientError, ClientResult};
use crate::models::{CategoryFilter, Confession};

pub const CONFESSIONS_KEY: &str = "confessions";

/// Cache key made of path-like segments, e.g. `["confessions", "Love"]`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct QueryKey(Vec<String>);

impl QueryKey {
    pub fn new<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        QueryKey(segments.into_iter().map(Into::into).collect())
    }

    pub fn starts_with(&self, prefix: &[&str]) -> bool {
        self.0.len() >= prefix.len() && self.0.iter().zip(prefix).all(|(a, b)| a == b)
    }

    pub fn confessions(filter: CategoryFilter) -> Self {
        QueryKey::new([CONFESSIONS_KEY, filter.as_str()])
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join("/"))
    }
}

/// Shared read cache. Clones share one store; pass it to whatever needs to read or invalidate.
#[derive(Clone, Default)]
pub struct QueryCache {
    store: Arc<DashMap<QueryKey, Value>>,
}

impl QueryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get<T: DeserializeOwned>(&self, key: &QueryKey) -> Option<T> {
        let raw = self.store.get(key)?.value().clone();
        match serde_json::from_value(raw) {
            Ok(v) => Some(v),
            Err(e) => {
                warn!(key = %key, "cached value has a different shape, treating as miss: {e}");
                None
            }
        }
    }

    pub fn insert<T: Serialize>(&self, key: QueryKey, value: &T) -> ClientResult<()> {
        let value = serde_json::to_value(value).map_err(ClientError::Cache)?;
        self.store.insert(key, value);
        Ok(())
    }

    pub fn contains(&self, key: &QueryKey) -> bool {
        self.store.contains_key(key)
    }

    /// Drops every entry under `prefix`; returns how many went.
    pub fn invalidate(&self, prefix: &[&str]) -> usize {
        let before = self.store.len();
        self.store.retain(|k, _| !k.starts_with(prefix));
        let dropped = before.saturating_sub(self.store.len());
        debug!(prefix = %prefix.join("/"), dropped, "cache invalidated");
        dropped
    }

    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    /// Cached value for `key`, or the result of `fetch` (stored on success).
    pub async fn get_or_fetch<T, F, Fut>(&self, key: QueryKey, fetch: F) -> ClientResult<T>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = ClientResult<T>>,
    {
        if let Some(hit) = self.get(&key) {
            debug!(key = %key, "cache hit");
            return Ok(hit);
        }
        let value = fetch().await?;
        self.insert(key, &value)?;
        Ok(value)
    }
}

/// Confession lists read through the cache.
#[derive(Clone)]
pub struct ConfessionFeed {
    api: ConfessionsApi,
    cache: QueryCache,
}

impl ConfessionFeed {
    pub fn new(api: ConfessionsApi, cache: QueryCache) -> Self {
        Self { api, cache }
    }

    pub async fn load(&self, filter: CategoryFilter) -> ClientResult<Vec<Confession>> {
        let api = self.api.clone();
        self.cache
            .get_or_fetch(QueryKey::confessions(filter), || async move { api.confessions_by_category(filter).await })
            .await
    }

    /// Drops the cached lists and loads again.
    pub async fn refresh(&self, filter: CategoryFilter) -> ClientResult<Vec<Confession>> {
        self.cache.invalidate(&[CONFESSIONS_KEY]);
        self.load(filter).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalidate_by_prefix() {
        let cache = QueryCache::new();
        cache.insert(QueryKey::new(["confessions", "all"]), &vec![1, 2]).unwrap();
        cache.insert(QueryKey::new(["confessions", "Love"]), &vec![3]).unwrap();
        cache.insert(QueryKey::new(["health"]), &"ok").unwrap();

        assert_eq!(cache.invalidate(&["confessions"]), 2);
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get::<String>(&QueryKey::new(["health"])).as_deref(), Some("ok"));
    }

    #[test]
    fn prefix_must_match_whole_segments() {
        let key = QueryKey::new(["confessions", "Love"]);
        assert!(key.starts_with(&["confessions"]));
        assert!(key.starts_with(&[]));
        assert!(!key.starts_with(&["confession"]));
        assert!(!key.starts_with(&["confessions", "Love", "x"]));
    }

    #[test]
    fn mismatched_shape_reads_as_miss() {
        let cache = QueryCache::new();
        let key = QueryKey::new(["health"]);
        cache.insert(key.clone(), &"ok").unwrap();
        assert_eq!(cache.get::<Vec<i64>>(&key), None);
        assert!(cache.contains(&key));
    }

    #[test]
    fn unencodable_value_is_a_cache_error() {
        use std::collections::HashMap;
        // JSON object keys must be strings
        let mut bad = HashMap::new();
        bad.insert(vec![1u8], 1);
        let err = QueryCache::new().insert(QueryKey::new(["x"]), &bad).unwrap_err();
        assert!(matches!(err, ClientError::Cache(_)));
    }

    #[tokio::test]
    async fn get_or_fetch_only_fetches_on_miss() {
        let cache = QueryCache::new();
        let key = QueryKey::new(["n"]);
        let first: i64 = cache.get_or_fetch(key.clone(), || async { Ok(1) }).await.unwrap();
        let second: i64 = cache.get_or_fetch(key.clone(), || async { Ok(2) }).await.unwrap();
        assert_eq!((first, second), (1, 1));

        let err = cache
            .get_or_fetch::<i64, _, _>(QueryKey::new(["m"]), || async { Err(ClientError::Api("down".into())) })
            .await;
        assert!(err.is_err());
        assert!(!cache.contains(&QueryKey::new(["m"])));
    }
}
