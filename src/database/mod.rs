// region:    --- Imports
use crate::config::Config;
use crate::error::{AdminError, BackendError};
use crate::retry::classifier::NetworkStatus;
use crate::retry::{Retrier, RetryPolicy};
use crate::store::{DocumentStore, PostgresStore};
use std::future::Future;
use std::sync::Arc;

// endregion: --- Imports

/// Handle every admin operation runs against: the document store plus the retry layer.
#[derive(Clone)]
pub struct DatabaseManager {
    store: Arc<dyn DocumentStore>,
    retrier: Retrier,
}

impl DatabaseManager {
    pub fn new(store: Arc<dyn DocumentStore>, retrier: Retrier) -> Self {
        Self { store, retrier }
    }

    /// Handle with the default retry policy and an online network indicator
    pub fn with_store(store: Arc<dyn DocumentStore>) -> Self {
        Self::new(store, Retrier::default())
    }

    /// Connects to PostgreSQL and makes sure the document table exists.
    pub async fn connect(config: &Config) -> Result<Self, sqlx::Error> {
        let store = PostgresStore::connect(&config.database_url, config.max_connections).await?;
        store.initialize_schema().await?;
        Ok(Self::new(
            Arc::new(store),
            Retrier::new(config.retry, NetworkStatus::online()),
        ))
    }

    pub fn store(&self) -> &dyn DocumentStore {
        self.store.as_ref()
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        self.retrier.policy()
    }

    pub fn network(&self) -> &NetworkStatus {
        self.retrier.network()
    }

    /// Runs a store call through the backoff retrier.
    pub async fn retry<T, F, Fut>(&self, operation: F) -> Result<T, BackendError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, BackendError>>,
    {
        self.retrier.retry(operation).await
    }

    pub fn user_error(&self, err: &BackendError) -> AdminError {
        AdminError::from_backend(err, self.network())
    }
}
