// region:    --- Imports
use super::model::{Report, ReportStatus, ResolveAction, PRODUCTS, REPORTS};
use crate::database::DatabaseManager;
use crate::date::Timestamp;
use crate::error::AdminError;
use crate::query::handlers::{get_record, list_newest_first};
use crate::store::Document;
use serde_json::{json, Map, Value};
use tracing::{error, info, warn};

// endregion: --- Imports

// region:    --- Queries
pub async fn get_reports(db_manager: &DatabaseManager) -> Result<Vec<Report>, AdminError> {
    list_newest_first(db_manager, None).await.map_err(|e| {
        error!("{:<12} --> failed to load reports: {}", "Query", e);
        db_manager.user_error(&e)
    })
}

pub async fn get_pending_reports(db_manager: &DatabaseManager) -> Result<Vec<Report>, AdminError> {
    let filter = Some(("status", Value::from(ReportStatus::Pending.as_str())));
    list_newest_first(db_manager, filter).await.map_err(|e| {
        error!("{:<12} --> failed to load pending reports: {}", "Query", e);
        db_manager.user_error(&e)
    })
}
// endregion: --- Queries

// region:    --- Commands
/// Closes a pending report.
///
/// `Delete` removes the reported product and marks the report `resolved`;
/// `Dismiss` only marks it `dismissed`. When the report update fails after the
/// product was deleted, the product is written back from the snapshot taken
/// before deletion. Product deletion is idempotent, so a resolve that stopped
/// half way can simply be run again.
pub async fn resolve_report(
    db_manager: &DatabaseManager,
    report_id: &str,
    action: ResolveAction,
) -> Result<(), AdminError> {
    info!("{:<12} --> resolve report {} ({:?})", "Command", report_id, action);

    let report: Report = get_record(db_manager, report_id)
        .await
        .map_err(|e| db_manager.user_error(&e))?
        .ok_or_else(|| AdminError::NotFound("Report not found".to_string()))?;

    if report.status != ReportStatus::Pending {
        warn!(
            "{:<12} --> report {} is already {}",
            "Command",
            report_id,
            report.status.as_str()
        );
        return Err(AdminError::AlreadyResolved);
    }

    let snapshot = match action {
        ResolveAction::Delete => delete_reported_product(db_manager, &report.product_id).await?,
        ResolveAction::Dismiss => None,
    };

    let mut fields = Map::new();
    fields.insert("status".to_string(), json!(action.outcome().as_str()));
    fields.insert("resolvedAt".to_string(), Timestamp::now().to_value());

    let store = db_manager.store();
    let update = db_manager
        .retry(|| store.update(REPORTS, report_id, fields.clone()))
        .await;

    if let Err(e) = update {
        error!(
            "{:<12} --> report {} update failed after product step: {}",
            "Command", report_id, e
        );
        if let Some(product) = snapshot {
            restore_product(db_manager, product).await;
        }
        return Err(db_manager.user_error(&e));
    }

    Ok(())
}

/// Deletes the product and returns what it looked like beforehand.
async fn delete_reported_product(
    db_manager: &DatabaseManager,
    product_id: &str,
) -> Result<Option<Document>, AdminError> {
    let store = db_manager.store();
    let snapshot = db_manager
        .retry(|| store.get(PRODUCTS, product_id))
        .await
        .map_err(|e| db_manager.user_error(&e))?;

    db_manager
        .retry(|| store.delete(PRODUCTS, product_id))
        .await
        .map_err(|e| db_manager.user_error(&e))?;
    info!("{:<12} --> deleted reported product {}", "Command", product_id);

    Ok(snapshot)
}

async fn restore_product(db_manager: &DatabaseManager, product: Document) {
    let store = db_manager.store();
    let restored = db_manager
        .retry(|| store.set(PRODUCTS, &product.id, product.data.clone()))
        .await;
    match restored {
        Ok(()) => warn!("{:<12} --> restored product {}", "Command", product.id),
        Err(e) => error!(
            "{:<12} --> could not restore product {}: {}",
            "Command", product.id, e
        ),
    }
}
// endregion: --- Commands
