// region:    --- Imports
pub mod memory;
pub mod postgres;

use crate::error::BackendError;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

pub use memory::MemoryStore;
pub use postgres::PostgresStore;

// endregion: --- Imports

/// Field every listing is ordered by
pub const CREATED_AT: &str = "createdAt";

// region:    --- Document Model
/// A stored document: opaque id plus its JSON fields.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: String,
    pub data: Map<String, Value>,
}

impl Document {
    pub fn new(id: impl Into<String>, data: Map<String, Value>) -> Self {
        Self {
            id: id.into(),
            data,
        }
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.data.get(field)
    }

    /// Decodes the document fields into `T`.
    pub fn decode<T: DeserializeOwned>(&self, collection: &str) -> Result<T, BackendError> {
        serde_json::from_value(Value::Object(self.data.clone())).map_err(|source| {
            BackendError::Decode {
                collection: collection.to_string(),
                id: self.id.clone(),
                source,
            }
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Ascending,
    Descending,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderBy {
    pub field: String,
    pub direction: Direction,
}

/// Collection query: equality filters plus an optional ordering.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    pub collection: String,
    pub filters: Vec<(String, Value)>,
    pub order_by: Option<OrderBy>,
}

impl Query {
    pub fn collection(collection: impl Into<String>) -> Self {
        Self {
            collection: collection.into(),
            filters: Vec::new(),
            order_by: None,
        }
    }

    pub fn where_eq(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filters.push((field.into(), value.into()));
        self
    }

    pub fn order_by(mut self, field: impl Into<String>, direction: Direction) -> Self {
        self.order_by = Some(OrderBy {
            field: field.into(),
            direction,
        });
        self
    }

    /// Whether `data` satisfies every equality filter.
    pub fn matches(&self, data: &Map<String, Value>) -> bool {
        self.filters
            .iter()
            .all(|(field, expected)| data.get(field) == Some(expected))
    }
}
// endregion: --- Document Model

// region:    --- Document Store Trait
/// Document database boundary.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, BackendError>;

    async fn query(&self, query: &Query) -> Result<Vec<Document>, BackendError>;

    /// Merges `fields` into an existing document. Fails with `not-found` when it does not exist.
    async fn update(
        &self,
        collection: &str,
        id: &str,
        fields: Map<String, Value>,
    ) -> Result<(), BackendError>;

    /// Creates or replaces a whole document.
    async fn set(
        &self,
        collection: &str,
        id: &str,
        data: Map<String, Value>,
    ) -> Result<(), BackendError>;

    /// Deleting a missing document is not an error.
    async fn delete(&self, collection: &str, id: &str) -> Result<(), BackendError>;
}
// endregion: --- Document Store Trait
