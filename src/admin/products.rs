/// Product moderation
/// 1. listing and lookup
/// 2. approve / reject / status change / delete
/// 3. per-status counts
// region:    --- Imports
use super::model::{Product, ProductStatus, PRODUCTS};
use crate::database::DatabaseManager;
use crate::date::Timestamp;
use crate::error::AdminError;
use crate::query::handlers::{get_record, list_newest_first};
use serde::Serialize;
use serde_json::{json, Map, Value};
use tracing::{error, info};

// endregion: --- Imports

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct ProductStats {
    pub total: usize,
    pub pending: usize,
    pub approved: usize,
    pub rejected: usize,
    pub sold: usize,
}

// region:    --- Queries
/// Products newest first, optionally restricted to one status.
pub async fn get_products(
    db_manager: &DatabaseManager,
    status: Option<ProductStatus>,
) -> Result<Vec<Product>, AdminError> {
    let filter = status.map(|status| ("status", Value::from(status.as_str())));
    list_newest_first(db_manager, filter).await.map_err(|e| {
        error!("{:<12} --> failed to load products: {}", "Query", e);
        db_manager.user_error(&e)
    })
}

pub async fn get_product_by_id(
    db_manager: &DatabaseManager,
    product_id: &str,
) -> Result<Option<Product>, AdminError> {
    get_record(db_manager, product_id)
        .await
        .map_err(|e| db_manager.user_error(&e))
}

/// Counts per status. The five listings run concurrently.
pub async fn get_product_stats(db_manager: &DatabaseManager) -> Result<ProductStats, AdminError> {
    let (all, pending, approved, rejected, sold) = tokio::try_join!(
        get_products(db_manager, None),
        get_products(db_manager, Some(ProductStatus::Pending)),
        get_products(db_manager, Some(ProductStatus::Approved)),
        get_products(db_manager, Some(ProductStatus::Rejected)),
        get_products(db_manager, Some(ProductStatus::Sold)),
    )?;

    Ok(ProductStats {
        total: all.len(),
        pending: pending.len(),
        approved: approved.len(),
        rejected: rejected.len(),
        sold: sold.len(),
    })
}
// endregion: --- Queries

// region:    --- Commands
pub async fn approve_product(
    db_manager: &DatabaseManager,
    product_id: &str,
) -> Result<(), AdminError> {
    info!("{:<12} --> approve product {}", "Command", product_id);
    update_product(db_manager, product_id, status_fields(ProductStatus::Approved)).await
}

/// Rejects a product, recording the reason when one is given.
pub async fn reject_product(
    db_manager: &DatabaseManager,
    product_id: &str,
    reason: Option<&str>,
) -> Result<(), AdminError> {
    info!("{:<12} --> reject product {}", "Command", product_id);
    let mut fields = status_fields(ProductStatus::Rejected);
    if let Some(reason) = reason {
        fields.insert("rejectionReason".to_string(), json!(reason));
    }
    update_product(db_manager, product_id, fields).await
}

/// Sets any status; transitions are not constrained.
pub async fn update_product_status(
    db_manager: &DatabaseManager,
    product_id: &str,
    status: ProductStatus,
) -> Result<(), AdminError> {
    info!("{:<12} --> product {} status -> {}", "Command", product_id, status);
    update_product(db_manager, product_id, status_fields(status)).await
}

/// Removes the product document. Its bids and reports are left in place.
pub async fn delete_product(
    db_manager: &DatabaseManager,
    product_id: &str,
) -> Result<(), AdminError> {
    info!("{:<12} --> delete product {}", "Command", product_id);
    let store = db_manager.store();
    db_manager
        .retry(|| store.delete(PRODUCTS, product_id))
        .await
        .map_err(|e| db_manager.user_error(&e))
}

fn status_fields(status: ProductStatus) -> Map<String, Value> {
    let mut fields = Map::new();
    fields.insert("status".to_string(), json!(status.as_str()));
    fields.insert("updatedAt".to_string(), Timestamp::now().to_value());
    fields
}

async fn update_product(
    db_manager: &DatabaseManager,
    product_id: &str,
    fields: Map<String, Value>,
) -> Result<(), AdminError> {
    let store = db_manager.store();
    db_manager
        .retry(|| store.update(PRODUCTS, product_id, fields.clone()))
        .await
        .map_err(|e| db_manager.user_error(&e))
}
// endregion: --- Commands
