// region:    --- Imports
use super::products::{get_product_stats, ProductStats};
use super::reports::get_pending_reports;
use super::users::{get_user_stats, UserStats};
use crate::database::DatabaseManager;
use serde::Serialize;
use tracing::error;

// endregion: --- Imports

/// Dashboard summary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub products: ProductStats,
    pub users: UserStats,
    pub pending_reports: usize,
}

/// Loads the three dashboard sections concurrently.
/// A section that fails is logged and reported as zeros; the others are unaffected.
pub async fn get_dashboard_stats(db_manager: &DatabaseManager) -> DashboardStats {
    let (products, users, reports) = tokio::join!(
        get_product_stats(db_manager),
        get_user_stats(db_manager),
        get_pending_reports(db_manager),
    );

    DashboardStats {
        products: products.unwrap_or_else(|e| {
            error!("{:<12} --> product stats unavailable: {}", "Query", e);
            ProductStats::default()
        }),
        users: users.unwrap_or_else(|e| {
            error!("{:<12} --> user stats unavailable: {}", "Query", e);
            UserStats::default()
        }),
        pending_reports: reports.map_or_else(
            |e| {
                error!("{:<12} --> pending reports unavailable: {}", "Query", e);
                0
            },
            |reports| reports.len(),
        ),
    }
}
