// region:    --- Imports
use super::{Direction, Document, DocumentStore, Query};
use crate::error::BackendError;
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};
use tokio::sync::RwLock;
use tracing::debug;

// endregion: --- Imports

type Collection = BTreeMap<String, Map<String, Value>>;

// region:    --- Memory Store
/// In-process document store.
///
/// Ordered queries behave like an index-backed store: every matching document
/// must hold the order field with one value type (all strings, all numbers or
/// all timestamp objects), otherwise the query is rejected with
/// `failed-precondition`.
#[derive(Debug, Default)]
pub struct MemoryStore {
    collections: RwLock<HashMap<String, Collection>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of documents currently in `collection`.
    pub async fn len(&self, collection: &str) -> usize {
        self.collections
            .read()
            .await
            .get(collection)
            .map_or(0, BTreeMap::len)
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, BackendError> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(collection)
            .and_then(|docs| docs.get(id))
            .map(|data| Document::new(id, data.clone())))
    }

    async fn query(&self, query: &Query) -> Result<Vec<Document>, BackendError> {
        let collections = self.collections.read().await;
        let mut docs: Vec<Document> = collections
            .get(&query.collection)
            .map(|docs| {
                docs.iter()
                    .filter(|(_, data)| query.matches(data))
                    .map(|(id, data)| Document::new(id.clone(), data.clone()))
                    .collect()
            })
            .unwrap_or_default();

        if let Some(order) = &query.order_by {
            let mut keyed = Vec::with_capacity(docs.len());
            for doc in docs {
                let key = doc.get(&order.field).and_then(SortKey::from_value);
                keyed.push((key, doc));
            }
            let uniform = keyed.windows(2).all(|pair| match (&pair[0].0, &pair[1].0) {
                (Some(a), Some(b)) => a.same_kind(b),
                _ => false,
            });
            if keyed.iter().any(|(key, _)| key.is_none()) || !uniform {
                return Err(BackendError::status(
                    "failed-precondition",
                    format!(
                        "The query requires an index: '{}' in '{}' does not hold a single \
                         orderable type",
                        order.field, query.collection
                    ),
                ));
            }
            keyed.sort_by(|(a, _), (b, _)| {
                let ordering = match (a, b) {
                    (Some(a), Some(b)) => a.compare(b),
                    _ => Ordering::Equal,
                };
                match order.direction {
                    Direction::Ascending => ordering,
                    Direction::Descending => ordering.reverse(),
                }
            });
            docs = keyed.into_iter().map(|(_, doc)| doc).collect();
        }

        debug!(
            "{:<12} --> memory query {} returned {} documents",
            "Store",
            query.collection,
            docs.len()
        );
        Ok(docs)
    }

    async fn update(
        &self,
        collection: &str,
        id: &str,
        fields: Map<String, Value>,
    ) -> Result<(), BackendError> {
        let mut collections = self.collections.write().await;
        let data = collections
            .get_mut(collection)
            .and_then(|docs| docs.get_mut(id))
            .ok_or_else(|| BackendError::NotFound {
                collection: collection.to_string(),
                id: id.to_string(),
            })?;
        data.extend(fields);
        Ok(())
    }

    async fn set(
        &self,
        collection: &str,
        id: &str,
        data: Map<String, Value>,
    ) -> Result<(), BackendError> {
        let mut collections = self.collections.write().await;
        collections
            .entry(collection.to_string())
            .or_default()
            .insert(id.to_string(), data);
        Ok(())
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<(), BackendError> {
        let mut collections = self.collections.write().await;
        if let Some(docs) = collections.get_mut(collection) {
            docs.remove(id);
        }
        Ok(())
    }
}
// endregion: --- Memory Store

// region:    --- Sort Key
enum SortKey {
    Text(String),
    Number(f64),
    Timestamp(i64, u64),
}

impl SortKey {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::String(text) => Some(Self::Text(text.clone())),
            Value::Number(number) => number.as_f64().map(Self::Number),
            Value::Object(object) => {
                let seconds = object.get("seconds")?.as_i64()?;
                let nanos = object
                    .get("nanoseconds")
                    .and_then(Value::as_u64)
                    .unwrap_or(0);
                Some(Self::Timestamp(seconds, nanos))
            }
            _ => None,
        }
    }

    fn same_kind(&self, other: &Self) -> bool {
        std::mem::discriminant(self) == std::mem::discriminant(other)
    }

    fn compare(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Text(a), Self::Text(b)) => a.cmp(b),
            (Self::Number(a), Self::Number(b)) => a.partial_cmp(b).unwrap_or(Ordering::Equal),
            (Self::Timestamp(a_s, a_n), Self::Timestamp(b_s, b_n)) => (a_s, a_n).cmp(&(b_s, b_n)),
            _ => Ordering::Equal,
        }
    }
}
// endregion: --- Sort Key

// region:    --- Tests
#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn object(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected an object"),
        }
    }

    async fn seeded() -> MemoryStore {
        let store = MemoryStore::new();
        for (id, status, created) in [
            ("a", "pending", "2024-01-01T00:00:00Z"),
            ("b", "approved", "2024-01-03T00:00:00Z"),
            ("c", "pending", "2024-01-02T00:00:00Z"),
        ] {
            store
                .set("products", id, object(json!({ "status": status, "createdAt": created })))
                .await
                .unwrap();
        }
        store
    }

    #[tokio::test]
    async fn filters_and_orders_uniform_fields() {
        let store = seeded().await;
        let query = Query::collection("products")
            .where_eq("status", "pending")
            .order_by("createdAt", Direction::Descending);
        let ids: Vec<_> = store
            .query(&query)
            .await
            .unwrap()
            .into_iter()
            .map(|doc| doc.id)
            .collect();
        assert_eq!(ids, vec!["c", "a"]);
    }

    #[tokio::test]
    async fn rejects_ordering_over_mixed_types() {
        let store = seeded().await;
        store
            .set(
                "products",
                "d",
                object(json!({
                    "status": "pending",
                    "createdAt": { "seconds": 1, "nanoseconds": 0 }
                })),
            )
            .await
            .unwrap();
        let ordered = Query::collection("products").order_by("createdAt", Direction::Descending);
        let err = store.query(&ordered).await.unwrap_err();
        assert_eq!(err.code(), Some("failed-precondition"));

        let unordered = Query::collection("products");
        assert_eq!(store.query(&unordered).await.unwrap().len(), 4);
    }

    #[tokio::test]
    async fn update_merges_and_requires_existing_document() {
        let store = seeded().await;
        store
            .update("products", "a", object(json!({ "status": "approved" })))
            .await
            .unwrap();
        let doc = store.get("products", "a").await.unwrap().unwrap();
        assert_eq!(doc.get("status"), Some(&json!("approved")));
        assert_eq!(doc.get("createdAt"), Some(&json!("2024-01-01T00:00:00Z")));

        let err = store
            .update("products", "missing", Map::new())
            .await
            .unwrap_err();
        assert_eq!(err.code(), Some("not-found"));
    }

    #[tokio::test]
    async fn delete_is_idempotent() {
        let store = seeded().await;
        store.delete("products", "a").await.unwrap();
        store.delete("products", "a").await.unwrap();
        assert_eq!(store.len("products").await, 2);
    }
}
// endregion: --- Tests
