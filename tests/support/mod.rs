#![allow(dead_code)]

use async_trait::async_trait;
use marketplace_admin::admin::auth::{IdentityProvider, Principal};
use marketplace_admin::database::DatabaseManager;
use marketplace_admin::error::BackendError;
use marketplace_admin::retry::classifier::NetworkStatus;
use marketplace_admin::retry::{Retrier, RetryPolicy};
use marketplace_admin::store::{Document, DocumentStore, MemoryStore, Query};
use serde_json::{Map, Value};
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub fn object(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        other => panic!("expected a JSON object, got {other}"),
    }
}

/// Handle with a fast retry policy so transient paths finish quickly.
pub fn db_manager(store: Arc<dyn DocumentStore>) -> DatabaseManager {
    DatabaseManager::new(
        store,
        Retrier::new(
            RetryPolicy::new(3, Duration::from_millis(1)),
            NetworkStatus::online(),
        ),
    )
}

// region:    --- Scripted Store
/// Memory store with switchable failures and call counters.
#[derive(Default)]
pub struct ScriptedStore {
    pub inner: MemoryStore,
    pub reject_ordering: AtomicBool,
    pub unavailable: AtomicBool,
    pub denied_collections: Mutex<HashSet<String>>,
    pub failing_updates: Mutex<HashSet<String>>,
    pub ordered_queries: AtomicUsize,
    pub unordered_queries: AtomicUsize,
    pub calls: AtomicUsize,
}

impl ScriptedStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn deny_queries_on(&self, collection: &str) {
        self.denied_collections
            .lock()
            .unwrap()
            .insert(collection.to_string());
    }

    pub fn fail_updates_on(&self, collection: &str) {
        self.failing_updates
            .lock()
            .unwrap()
            .insert(collection.to_string());
    }

    fn check_available(&self) -> Result<(), BackendError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(BackendError::status(
                "unavailable",
                "Could not reach the backend",
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for ScriptedStore {
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, BackendError> {
        self.check_available()?;
        self.inner.get(collection, id).await
    }

    async fn query(&self, query: &Query) -> Result<Vec<Document>, BackendError> {
        self.check_available()?;
        if self
            .denied_collections
            .lock()
            .unwrap()
            .contains(&query.collection)
        {
            return Err(BackendError::status(
                "permission-denied",
                "Missing or insufficient permissions.",
            ));
        }
        if query.order_by.is_some() {
            self.ordered_queries.fetch_add(1, Ordering::SeqCst);
            if self.reject_ordering.load(Ordering::SeqCst) {
                return Err(BackendError::status(
                    "failed-precondition",
                    "The query requires an index.",
                ));
            }
        } else {
            self.unordered_queries.fetch_add(1, Ordering::SeqCst);
        }
        self.inner.query(query).await
    }

    async fn update(
        &self,
        collection: &str,
        id: &str,
        fields: Map<String, Value>,
    ) -> Result<(), BackendError> {
        self.check_available()?;
        if self.failing_updates.lock().unwrap().contains(collection) {
            return Err(BackendError::status("aborted", "Write rejected by backend"));
        }
        self.inner.update(collection, id, fields).await
    }

    async fn set(
        &self,
        collection: &str,
        id: &str,
        data: Map<String, Value>,
    ) -> Result<(), BackendError> {
        self.check_available()?;
        self.inner.set(collection, id, data).await
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<(), BackendError> {
        self.check_available()?;
        self.inner.delete(collection, id).await
    }
}
// endregion: --- Scripted Store

// region:    --- Fake Identity Provider
/// Identity provider that accepts one password for a fixed set of accounts.
pub struct FakeIdentity {
    accounts: Vec<(String, String)>,
    pub sign_outs: AtomicUsize,
}

impl FakeIdentity {
    pub fn new(accounts: &[(&str, &str)]) -> Self {
        Self {
            accounts: accounts
                .iter()
                .map(|(email, uid)| (email.to_string(), uid.to_string()))
                .collect(),
            sign_outs: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl IdentityProvider for FakeIdentity {
    async fn sign_in(&self, email: &str, password: &str) -> Result<Principal, BackendError> {
        if password != "secret" {
            return Err(BackendError::status(
                "auth/wrong-password",
                "Invalid email or password",
            ));
        }
        self.accounts
            .iter()
            .find(|(known, _)| known == email)
            .map(|(email, uid)| Principal {
                uid: uid.clone(),
                email: Some(email.clone()),
            })
            .ok_or_else(|| BackendError::status("auth/user-not-found", "Invalid email or password"))
    }

    async fn sign_out(&self) -> Result<(), BackendError> {
        self.sign_outs.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
// endregion: --- Fake Identity Provider
