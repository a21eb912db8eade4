use crate::{
    entities::stock_alert::{self, AlertType},
    errors::ServiceError,
    services::alerts::StockAlertEntry,
    ApiResponse, AppState,
};
use axum::{
    extract::{Json, Query, State},
    routing::{get, post},
    Router,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

#[derive(Debug, Serialize, ToSchema)]
pub struct StockAlertResponse {
    pub id: Uuid,
    pub item_id: Uuid,
    pub warehouse_id: Uuid,
    pub alert_type: AlertType,
    pub quantity: Decimal,
    pub min_stock: Decimal,
    pub reorder_point: Decimal,
    pub created_at: DateTime<Utc>,
}

impl From<stock_alert::Model> for StockAlertResponse {
    fn from(model: stock_alert::Model) -> Self {
        Self {
            id: model.id,
            item_id: model.item_id,
            warehouse_id: model.warehouse_id,
            alert_type: model.alert_type,
            quantity: model.quantity,
            min_stock: model.min_stock,
            reorder_point: model.reorder_point,
            created_at: model.created_at,
        }
    }
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct RecomputeQuery {
    /// Replace the persisted alert set with this recompute's result
    #[serde(default)]
    pub persist: bool,
}

/// Create the alerts router
pub fn alerts_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_alerts))
        .route("/recompute", post(recompute_alerts))
}

/// List the persisted alert set, newest first
#[utoipa::path(
    get,
    path = "/api/v1/alerts",
    responses(
        (status = 200, description = "Persisted alerts returned")
    ),
    tag = "alerts"
)]
pub async fn list_alerts(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<StockAlertResponse>>>, ServiceError> {
    let alerts = state.alert_service.list_alerts().await?;
    Ok(Json(ApiResponse::success(
        alerts.into_iter().map(Into::into).collect(),
    )))
}

/// Recompute alerts from current balances, optionally persisting the result
#[utoipa::path(
    post,
    path = "/api/v1/alerts/recompute",
    params(RecomputeQuery),
    responses(
        (status = 200, description = "Recomputed alerts returned")
    ),
    tag = "alerts"
)]
pub async fn recompute_alerts(
    State(state): State<AppState>,
    Query(query): Query<RecomputeQuery>,
) -> Result<Json<ApiResponse<Vec<StockAlertEntry>>>, ServiceError> {
    let alerts = state.alert_service.compute_alerts(query.persist).await?;
    Ok(Json(ApiResponse::success(alerts)))
}
