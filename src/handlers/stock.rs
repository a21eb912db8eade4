use crate::{
    entities::stock_balance, errors::ServiceError, services::movements::StockFilters, ApiResponse,
    AppState,
};
use axum::{
    extract::{Json, Query, State},
    routing::get,
    Router,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

#[derive(Debug, Serialize, ToSchema)]
pub struct StockBalanceResponse {
    pub id: Uuid,
    pub item_id: Uuid,
    pub warehouse_id: Uuid,
    pub location_id: Option<Uuid>,
    pub quantity: Decimal,
    pub version: i32,
    pub updated_at: DateTime<Utc>,
}

impl From<stock_balance::Model> for StockBalanceResponse {
    fn from(model: stock_balance::Model) -> Self {
        Self {
            id: model.id,
            item_id: model.item_id,
            warehouse_id: model.warehouse_id,
            location_id: model.location_id,
            quantity: model.quantity,
            version: model.version,
            updated_at: model.updated_at,
        }
    }
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct StockQuery {
    pub item_id: Option<Uuid>,
    pub warehouse_id: Option<Uuid>,
    pub location_id: Option<Uuid>,
}

/// Create the stock router
pub fn stock_router() -> Router<AppState> {
    Router::new().route("/", get(list_stock))
}

/// List stock balances with optional key filters
#[utoipa::path(
    get,
    path = "/api/v1/stock",
    params(StockQuery),
    responses(
        (status = 200, description = "Stock balance list returned")
    ),
    tag = "stock"
)]
pub async fn list_stock(
    State(state): State<AppState>,
    Query(query): Query<StockQuery>,
) -> Result<Json<ApiResponse<Vec<StockBalanceResponse>>>, ServiceError> {
    let balances = state
        .movement_service
        .list_stock_balances(StockFilters {
            item_id: query.item_id,
            warehouse_id: query.warehouse_id,
            location_id: query.location_id,
        })
        .await?;

    Ok(Json(ApiResponse::success(
        balances.into_iter().map(Into::into).collect(),
    )))
}
