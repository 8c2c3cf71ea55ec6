// region:    --- Imports
use crate::admin::model::{ProductStatus, ResolveAction};
use crate::admin::{bids, products, reports, stats, users};
use crate::database::DatabaseManager;
use crate::error::AdminError;
use axum::extract::{DefaultBodyLimit, Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use serde::Deserialize;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

// endregion: --- Imports

type AppState = State<Arc<DatabaseManager>>;

// region:    --- Router
/// Admin API routes over a shared database handle.
pub fn routes(db_manager: Arc<DatabaseManager>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/products", get(handle_get_products))
        .route("/products/stats", get(handle_get_product_stats))
        .route(
            "/products/:id",
            get(handle_get_product).delete(handle_delete_product),
        )
        .route("/products/:id/approve", post(handle_approve_product))
        .route("/products/:id/reject", post(handle_reject_product))
        .route("/products/:id/status", put(handle_update_product_status))
        .route("/users", get(handle_get_users))
        .route("/users/stats", get(handle_get_user_stats))
        .route("/users/:id/ban", post(handle_ban_user))
        .route("/users/:id/unban", post(handle_unban_user))
        .route(
            "/users/:id/admin",
            post(handle_make_admin).delete(handle_remove_admin),
        )
        .route("/reports", get(handle_get_reports))
        .route("/reports/pending", get(handle_get_pending_reports))
        .route("/reports/:id/resolve", post(handle_resolve_report))
        .route("/bids", get(handle_get_bids))
        .route("/dashboard", get(handle_get_dashboard))
        .layer(cors)
        .layer(DefaultBodyLimit::max(1024 * 1024))
        .with_state(db_manager)
}
// endregion: --- Router

// region:    --- Error Response
impl IntoResponse for AdminError {
    fn into_response(self) -> Response {
        let status = match &self {
            AdminError::Connection => StatusCode::SERVICE_UNAVAILABLE,
            AdminError::NotFound(_) => StatusCode::NOT_FOUND,
            AdminError::AccessDenied => StatusCode::FORBIDDEN,
            AdminError::AlreadyResolved => StatusCode::CONFLICT,
            AdminError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            AdminError::Failed(_) | AdminError::Unexpected => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(serde_json::json!({ "error": self.to_string() }))).into_response()
    }
}

fn no_content(result: Result<(), AdminError>) -> Response {
    match result {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => e.into_response(),
    }
}
// endregion: --- Error Response

// region:    --- Request Bodies
/// `?status=` query. An empty value means no filter.
#[derive(Debug, Deserialize)]
pub struct ProductFilter {
    pub status: Option<String>,
}

impl ProductFilter {
    pub fn status(&self) -> Result<Option<ProductStatus>, AdminError> {
        match self.status.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(value) => value.parse().map(Some).map_err(AdminError::InvalidInput),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct RejectRequest {
    pub reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct StatusRequest {
    pub status: ProductStatus,
}

#[derive(Debug, Deserialize)]
pub struct ResolveRequest {
    pub action: ResolveAction,
}
// endregion: --- Request Bodies

// region:    --- Product Handlers
pub async fn handle_get_products(
    State(db_manager): AppState,
    Query(filter): Query<ProductFilter>,
) -> impl IntoResponse {
    info!("{:<12} --> products status: {:?}", "HandlerQuery", filter.status);
    let status = match filter.status() {
        Ok(status) => status,
        Err(e) => return e.into_response(),
    };
    match products::get_products(&db_manager, status).await {
        Ok(items) => Json(items).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn handle_get_product_stats(State(db_manager): AppState) -> impl IntoResponse {
    match products::get_product_stats(&db_manager).await {
        Ok(stats) => Json(stats).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn handle_get_product(
    State(db_manager): AppState,
    Path(product_id): Path<String>,
) -> impl IntoResponse {
    info!("{:<12} --> product id: {}", "HandlerQuery", product_id);
    match products::get_product_by_id(&db_manager, &product_id).await {
        Ok(Some(product)) => Json(product).into_response(),
        Ok(None) => AdminError::NotFound("Product not found".to_string()).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn handle_approve_product(
    State(db_manager): AppState,
    Path(product_id): Path<String>,
) -> impl IntoResponse {
    no_content(products::approve_product(&db_manager, &product_id).await)
}

pub async fn handle_reject_product(
    State(db_manager): AppState,
    Path(product_id): Path<String>,
    body: Option<Json<RejectRequest>>,
) -> impl IntoResponse {
    let reason = body.and_then(|Json(request)| request.reason);
    no_content(products::reject_product(&db_manager, &product_id, reason.as_deref()).await)
}

pub async fn handle_update_product_status(
    State(db_manager): AppState,
    Path(product_id): Path<String>,
    Json(request): Json<StatusRequest>,
) -> impl IntoResponse {
    no_content(products::update_product_status(&db_manager, &product_id, request.status).await)
}

pub async fn handle_delete_product(
    State(db_manager): AppState,
    Path(product_id): Path<String>,
) -> impl IntoResponse {
    no_content(products::delete_product(&db_manager, &product_id).await)
}
// endregion: --- Product Handlers

// region:    --- User Handlers
pub async fn handle_get_users(State(db_manager): AppState) -> impl IntoResponse {
    match users::get_users(&db_manager).await {
        Ok(items) => Json(items).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn handle_get_user_stats(State(db_manager): AppState) -> impl IntoResponse {
    match users::get_user_stats(&db_manager).await {
        Ok(stats) => Json(stats).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn handle_ban_user(
    State(db_manager): AppState,
    Path(user_id): Path<String>,
) -> impl IntoResponse {
    no_content(users::ban_user(&db_manager, &user_id).await)
}

pub async fn handle_unban_user(
    State(db_manager): AppState,
    Path(user_id): Path<String>,
) -> impl IntoResponse {
    no_content(users::unban_user(&db_manager, &user_id).await)
}

pub async fn handle_make_admin(
    State(db_manager): AppState,
    Path(user_id): Path<String>,
) -> impl IntoResponse {
    no_content(users::make_admin(&db_manager, &user_id).await)
}

pub async fn handle_remove_admin(
    State(db_manager): AppState,
    Path(user_id): Path<String>,
) -> impl IntoResponse {
    no_content(users::remove_admin(&db_manager, &user_id).await)
}
// endregion: --- User Handlers

// region:    --- Report, Bid and Dashboard Handlers
pub async fn handle_get_reports(State(db_manager): AppState) -> impl IntoResponse {
    match reports::get_reports(&db_manager).await {
        Ok(items) => Json(items).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn handle_get_pending_reports(State(db_manager): AppState) -> impl IntoResponse {
    match reports::get_pending_reports(&db_manager).await {
        Ok(items) => Json(items).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn handle_resolve_report(
    State(db_manager): AppState,
    Path(report_id): Path<String>,
    Json(request): Json<ResolveRequest>,
) -> impl IntoResponse {
    info!(
        "{:<12} --> resolve report {} ({:?})",
        "Handler", report_id, request.action
    );
    no_content(reports::resolve_report(&db_manager, &report_id, request.action).await)
}

pub async fn handle_get_bids(State(db_manager): AppState) -> impl IntoResponse {
    match bids::get_bids(&db_manager).await {
        Ok(items) => Json(items).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn handle_get_dashboard(State(db_manager): AppState) -> impl IntoResponse {
    Json(stats::get_dashboard_stats(&db_manager).await)
}
// endregion: --- Report, Bid and Dashboard Handlers
