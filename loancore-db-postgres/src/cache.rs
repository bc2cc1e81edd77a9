use std::time::Duration;

use moka::future::Cache;
use serde::de::DeserializeOwned;
use serde::Serialize;

/// In-memory read-through cache for loan summaries and other
/// frequently-read, rarely-written views. Keyed by an arbitrary string
/// (callers build keys like `loan:{id}` or `customer-loans:{id}`);
/// values are stored as `serde_json::Value` so one cache instance can
/// back several view shapes.
///
/// Invalidation is pattern-based: `invalidate_prefix` walks the live
/// entry set and evicts every key starting with the given prefix. This
/// is O(n) in the number of cached entries, which is fine at the scale
/// a single-process loan book operates at; it is not meant to scale to
/// millions of resident keys.
#[derive(Clone)]
pub struct CacheAdapter {
    inner: Cache<String, serde_json::Value>,
}

impl CacheAdapter {
    pub fn new(max_capacity: u64, ttl: Duration) -> Self {
        let inner = Cache::builder()
            .max_capacity(max_capacity)
            .time_to_live(ttl)
            .build();
        Self { inner }
    }

    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let value = self.inner.get(key).await?;
        serde_json::from_value(value).ok()
    }

    pub async fn set<T: Serialize>(&self, key: impl Into<String>, value: &T) {
        if let Ok(json) = serde_json::to_value(value) {
            self.inner.insert(key.into(), json).await;
        }
    }

    pub async fn invalidate(&self, key: &str) {
        self.inner.invalidate(key).await;
    }

    /// Evicts every key starting with `prefix`. Used after a write that
    /// affects a whole family of cached views (e.g. a collection posted
    /// against a loan invalidates both `loan:{id}` and any
    /// `customer-loans:{customer_id}` page that included it).
    pub async fn invalidate_prefix(&self, prefix: &str) {
        self.inner.run_pending_tasks().await;
        let stale: Vec<String> = self
            .inner
            .iter()
            .filter_map(|(key, _)| {
                if key.starts_with(prefix) {
                    Some(key.as_str().to_string())
                } else {
                    None
                }
            })
            .collect();
        for key in stale {
            self.inner.invalidate(&key).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Serialize, Deserialize, PartialEq, Debug)]
    struct Summary {
        outstanding: i64,
    }

    #[tokio::test]
    async fn roundtrips_a_value() {
        let cache = CacheAdapter::new(100, Duration::from_secs(60));
        cache.set("loan:1", &Summary { outstanding: 500 }).await;
        let got: Option<Summary> = cache.get("loan:1").await;
        assert_eq!(got, Some(Summary { outstanding: 500 }));
    }

    #[tokio::test]
    async fn invalidate_prefix_clears_matching_keys_only() {
        let cache = CacheAdapter::new(100, Duration::from_secs(60));
        cache.set("loan:1", &Summary { outstanding: 500 }).await;
        cache.set("loan:2", &Summary { outstanding: 900 }).await;
        cache.set("customer-loans:9", &Summary { outstanding: 1400 }).await;

        cache.invalidate_prefix("loan:").await;

        assert_eq!(cache.get::<Summary>("loan:1").await, None);
        assert_eq!(cache.get::<Summary>("loan:2").await, None);
        assert!(cache.get::<Summary>("customer-loans:9").await.is_some());
    }
}
