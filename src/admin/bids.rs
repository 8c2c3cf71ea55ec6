// region:    --- Imports
use super::model::Bid;
use crate::database::DatabaseManager;
use crate::error::AdminError;
use crate::query::handlers::list_newest_first;
use tracing::error;

// endregion: --- Imports

/// Every bid, newest first. Read-only for staff.
pub async fn get_bids(db_manager: &DatabaseManager) -> Result<Vec<Bid>, AdminError> {
    list_newest_first(db_manager, None).await.map_err(|e| {
        error!("{:<12} --> failed to load bids: {}", "Query", e);
        db_manager.user_error(&e)
    })
}
