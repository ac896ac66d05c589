use async_trait::async_trait;
use dashmap::DashMap;
use serde_json::Value;

use crate::memory::store::{matches_query, Namespace, Store, StoreError, StoreSearchHit};

/// Process-local store backed by a concurrent map.
///
/// **Interaction**: Used as `Arc<dyn Store>` in tests and when no database is configured;
/// contents are lost when the store is dropped.
#[derive(Default)]
pub struct InMemoryStore {
    data: DashMap<String, Value>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compound key from namespace and key. Namespace is JSON-encoded so `:` inside
    /// namespace parts cannot collide with the separator.
    fn make_key(namespace: &Namespace, key: &str) -> String {
        format!("{}:{}", Self::ns_prefix_base(namespace), key)
    }

    fn ns_prefix_base(namespace: &Namespace) -> String {
        serde_json::to_string(namespace).unwrap_or_default()
    }

    fn ns_prefix(namespace: &Namespace) -> String {
        format!("{}:", Self::ns_prefix_base(namespace))
    }
}

#[async_trait]
impl Store for InMemoryStore {
    async fn put(&self, namespace: &Namespace, key: &str, value: &Value) -> Result<(), StoreError> {
        self.data.insert(Self::make_key(namespace, key), value.clone());
        Ok(())
    }

    async fn get(&self, namespace: &Namespace, key: &str) -> Result<Option<Value>, StoreError> {
        Ok(self
            .data
            .get(&Self::make_key(namespace, key))
            .map(|entry| entry.value().clone()))
    }

    async fn list(&self, namespace: &Namespace) -> Result<Vec<String>, StoreError> {
        let prefix = Self::ns_prefix(namespace);
        let mut keys: Vec<String> = self
            .data
            .iter()
            .filter_map(|entry| entry.key().strip_prefix(&prefix).map(String::from))
            .collect();
        keys.sort();
        Ok(keys)
    }

    async fn search(
        &self,
        namespace: &Namespace,
        query: Option<&str>,
        limit: Option<usize>,
    ) -> Result<Vec<StoreSearchHit>, StoreError> {
        let prefix = Self::ns_prefix(namespace);
        let mut hits: Vec<StoreSearchHit> = self
            .data
            .iter()
            .filter_map(|entry| {
                let key = entry.key().strip_prefix(&prefix)?;
                matches_query(query, key, entry.value()).then(|| StoreSearchHit {
                    key: key.to_string(),
                    value: entry.value().clone(),
                    score: None,
                })
            })
            .collect();
        hits.sort_by(|a, b| a.key.cmp(&b.key));
        if let Some(limit) = limit {
            hits.truncate(limit);
        }
        Ok(hits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    /// **Scenario**: put then get returns the value; missing key returns None.
    #[tokio::test]
    async fn put_get_roundtrip_and_missing() {
        let store = InMemoryStore::new();
        let ns = vec!["test".to_string()];
        store.put(&ns, "k", &json!({"a": 1})).await.unwrap();
        assert_eq!(store.get(&ns, "k").await.unwrap(), Some(json!({"a": 1})));
        assert_eq!(store.get(&ns, "missing").await.unwrap(), None);
    }

    /// **Scenario**: Different namespaces are isolated, including prefixes of each other.
    #[tokio::test]
    async fn namespace_isolation() {
        let store = InMemoryStore::new();
        let ns1 = vec!["filesystem".to_string()];
        let ns2 = vec!["filesystem".to_string(), "u1".to_string()];
        store.put(&ns1, "/a", &json!("one")).await.unwrap();
        store.put(&ns2, "/a", &json!("two")).await.unwrap();
        assert_eq!(store.get(&ns1, "/a").await.unwrap(), Some(json!("one")));
        assert_eq!(store.get(&ns2, "/a").await.unwrap(), Some(json!("two")));
        assert_eq!(store.list(&ns1).await.unwrap(), vec!["/a".to_string()]);
    }

    /// **Scenario**: list returns keys sorted; put on an existing key replaces the value.
    #[tokio::test]
    async fn list_sorted_and_last_write_wins() {
        let store = InMemoryStore::new();
        let ns = vec!["test".to_string()];
        store.put(&ns, "b", &json!(1)).await.unwrap();
        store.put(&ns, "a", &json!(1)).await.unwrap();
        store.put(&ns, "a", &json!(2)).await.unwrap();
        assert_eq!(store.list(&ns).await.unwrap(), vec!["a", "b"]);
        assert_eq!(store.get(&ns, "a").await.unwrap(), Some(json!(2)));
    }

    /// **Scenario**: search filters by key/value substring and honours limit; no query returns all.
    #[tokio::test]
    async fn search_filter_and_limit() {
        let store = InMemoryStore::new();
        let ns = vec!["test".to_string()];
        store.put(&ns, "apple", &json!("fruit")).await.unwrap();
        store.put(&ns, "car", &json!("vehicle")).await.unwrap();
        store.put(&ns, "pear", &json!("fruit")).await.unwrap();

        let hits = store.search(&ns, Some("fruit"), None).await.unwrap();
        let keys: Vec<&str> = hits.iter().map(|h| h.key.as_str()).collect();
        assert_eq!(keys, vec!["apple", "pear"]);

        let hits = store.search(&ns, None, Some(2)).await.unwrap();
        assert_eq!(hits.len(), 2);
        assert!(hits.iter().all(|h| h.score.is_none()));

        let hits = store.search(&ns, Some(""), None).await.unwrap();
        assert_eq!(hits.len(), 3);
    }
}
