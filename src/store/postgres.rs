// region:    --- Imports
use super::{Direction, Document, DocumentStore, Query};
use crate::error::BackendError;
use crate::query::queries;
use async_trait::async_trait;
use serde_json::{Map, Value};
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::types::Json;
use sqlx::FromRow;
use std::sync::Arc;
use tracing::{debug, info};

// endregion: --- Imports

#[derive(FromRow)]
struct DocumentRow {
    id: String,
    data: Json<Map<String, Value>>,
}

impl From<DocumentRow> for Document {
    fn from(row: DocumentRow) -> Self {
        Document::new(row.id, row.data.0)
    }
}

// region:    --- Postgres Store
/// Document store backed by one JSONB table shared by every collection.
pub struct PostgresStore {
    pool: Arc<PgPool>,
}

impl PostgresStore {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }

    /// Connects a pool to `database_url`.
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, sqlx::Error> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;
        Ok(Self::new(Arc::new(pool)))
    }

    pub fn get_pool(&self) -> Arc<PgPool> {
        Arc::clone(&self.pool)
    }

    /// Creates the documents table if it is missing
    pub async fn initialize_schema(&self) -> Result<(), sqlx::Error> {
        let create_schema_sql = include_str!("../sql/01-create-schema.sql");
        self.execute_multi_query(create_schema_sql).await?;
        info!("{:<12} --> document schema ready", "Store");
        Ok(())
    }

    async fn execute_multi_query(&self, sql: &str) -> Result<(), sqlx::Error> {
        for query in sql.split(';') {
            let query = query.trim();
            if !query.is_empty() {
                sqlx::query(query).execute(&*self.pool).await?;
            }
        }
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for PostgresStore {
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, BackendError> {
        let row = sqlx::query_as::<_, DocumentRow>(queries::GET_DOCUMENT)
            .bind(collection)
            .bind(id)
            .fetch_optional(&*self.pool)
            .await?;
        Ok(row.map(Document::from))
    }

    async fn query(&self, query: &Query) -> Result<Vec<Document>, BackendError> {
        let filter: Map<String, Value> = query.filters.iter().cloned().collect();
        let rows = match &query.order_by {
            Some(order) => {
                let sql = match order.direction {
                    Direction::Descending => queries::QUERY_DOCUMENTS_NEWEST_FIRST,
                    Direction::Ascending => queries::QUERY_DOCUMENTS_OLDEST_FIRST,
                };
                sqlx::query_as::<_, DocumentRow>(sql)
                    .bind(&query.collection)
                    .bind(Json(&filter))
                    .bind(&order.field)
                    .fetch_all(&*self.pool)
                    .await?
            }
            None => {
                sqlx::query_as::<_, DocumentRow>(queries::QUERY_DOCUMENTS)
                    .bind(&query.collection)
                    .bind(Json(&filter))
                    .fetch_all(&*self.pool)
                    .await?
            }
        };
        debug!(
            "{:<12} --> query {} returned {} rows",
            "Store",
            query.collection,
            rows.len()
        );
        Ok(rows.into_iter().map(Document::from).collect())
    }

    async fn update(
        &self,
        collection: &str,
        id: &str,
        fields: Map<String, Value>,
    ) -> Result<(), BackendError> {
        let result = sqlx::query(queries::UPDATE_DOCUMENT)
            .bind(collection)
            .bind(id)
            .bind(Json(&fields))
            .execute(&*self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(BackendError::NotFound {
                collection: collection.to_string(),
                id: id.to_string(),
            });
        }
        Ok(())
    }

    async fn set(
        &self,
        collection: &str,
        id: &str,
        data: Map<String, Value>,
    ) -> Result<(), BackendError> {
        sqlx::query(queries::SET_DOCUMENT)
            .bind(collection)
            .bind(id)
            .bind(Json(&data))
            .execute(&*self.pool)
            .await?;
        Ok(())
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<(), BackendError> {
        sqlx::query(queries::DELETE_DOCUMENT)
            .bind(collection)
            .bind(id)
            .execute(&*self.pool)
            .await?;
        Ok(())
    }
}
// endregion: --- Postgres Store

// region:    --- Tests
#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    async fn connect() -> PostgresStore {
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
        let store = PostgresStore::connect(&url, 2).await.expect("connect");
        store.initialize_schema().await.expect("schema");
        store
    }

    fn object(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected an object"),
        }
    }

    #[tokio::test]
    #[ignore = "requires a PostgreSQL DATABASE_URL"]
    async fn ordering_over_timestamp_objects_is_rejected() {
        let store = connect().await;
        let collection = "test_ordering";
        store
            .set(collection, "iso", object(json!({ "createdAt": "2024-01-01T00:00:00Z" })))
            .await
            .unwrap();
        store
            .set(
                collection,
                "ts",
                object(json!({ "createdAt": { "seconds": 1, "nanoseconds": 0 } })),
            )
            .await
            .unwrap();

        let ordered = Query::collection(collection).order_by("createdAt", Direction::Descending);
        assert!(store.query(&ordered).await.is_err());
        assert_eq!(store.query(&Query::collection(collection)).await.unwrap().len(), 2);

        store.delete(collection, "iso").await.unwrap();
        store.delete(collection, "ts").await.unwrap();
    }

    #[tokio::test]
    #[ignore = "requires a PostgreSQL DATABASE_URL"]
    async fn update_merges_fields_and_reports_missing_documents() {
        let store = connect().await;
        let collection = "test_update";
        store
            .set(collection, "u1", object(json!({ "isAdmin": true, "isBanned": false })))
            .await
            .unwrap();
        store
            .update(collection, "u1", object(json!({ "isBanned": true })))
            .await
            .unwrap();
        let doc = store.get(collection, "u1").await.unwrap().unwrap();
        assert_eq!(doc.get("isAdmin"), Some(&json!(true)));
        assert_eq!(doc.get("isBanned"), Some(&json!(true)));

        let err = store
            .update(collection, "missing", Map::new())
            .await
            .unwrap_err();
        assert_eq!(err.code(), Some("not-found"));
        store.delete(collection, "u1").await.unwrap();
    }
}
// endregion: --- Tests
