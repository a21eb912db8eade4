use crate::{
    entities::movement::{self, AdjustmentDirection, MovementStatus, MovementType},
    entities::movement_line,
    errors::ServiceError,
    services::movements::{
        MovementFilters, MovementWithLines, NewMovement, NewMovementLine,
    },
    ApiResponse, AppState, PaginatedResponse,
};
use axum::{
    extract::{Json, Path, Query, State},
    routing::{get, post},
    Router,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateMovementRequest {
    pub code: Option<String>,
    pub movement_type: MovementType,
    pub adjustment_direction: Option<AdjustmentDirection>,
    pub origin_warehouse_id: Option<Uuid>,
    pub origin_location_id: Option<Uuid>,
    pub destination_warehouse_id: Option<Uuid>,
    pub destination_location_id: Option<Uuid>,
    pub reference: Option<String>,
    pub reason: Option<String>,
    pub created_by: Uuid,
    pub lines: Vec<MovementLineRequest>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct MovementLineRequest {
    pub item_id: Uuid,
    pub quantity: Decimal,
    pub unit_cost: Option<Decimal>,
    pub notes: Option<String>,
}

impl From<CreateMovementRequest> for NewMovement {
    fn from(req: CreateMovementRequest) -> Self {
        NewMovement {
            code: req.code,
            movement_type: req.movement_type,
            adjustment_direction: req.adjustment_direction,
            origin_warehouse_id: req.origin_warehouse_id,
            origin_location_id: req.origin_location_id,
            destination_warehouse_id: req.destination_warehouse_id,
            destination_location_id: req.destination_location_id,
            reference: req.reference,
            reason: req.reason,
            created_by: req.created_by,
            lines: req
                .lines
                .into_iter()
                .map(|line| NewMovementLine {
                    item_id: line.item_id,
                    quantity: line.quantity,
                    unit_cost: line.unit_cost,
                    notes: line.notes,
                })
                .collect(),
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ConfirmMovementRequest {
    pub approved_by: Uuid,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CancelMovementRequest {
    pub user_id: Uuid,
    pub reason: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MovementResponse {
    pub id: Uuid,
    pub code: Option<String>,
    pub movement_type: MovementType,
    pub status: MovementStatus,
    pub adjustment_direction: Option<AdjustmentDirection>,
    pub origin_warehouse_id: Option<Uuid>,
    pub origin_location_id: Option<Uuid>,
    pub destination_warehouse_id: Option<Uuid>,
    pub destination_location_id: Option<Uuid>,
    pub reference: Option<String>,
    pub reason: Option<String>,
    pub created_by: Uuid,
    pub approved_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub confirmed_at: Option<DateTime<Utc>>,
    pub canceled_at: Option<DateTime<Utc>>,
}

impl From<movement::Model> for MovementResponse {
    fn from(model: movement::Model) -> Self {
        Self {
            id: model.id,
            code: model.code,
            movement_type: model.movement_type,
            status: model.status,
            adjustment_direction: model.adjustment_direction,
            origin_warehouse_id: model.origin_warehouse_id,
            origin_location_id: model.origin_location_id,
            destination_warehouse_id: model.destination_warehouse_id,
            destination_location_id: model.destination_location_id,
            reference: model.reference,
            reason: model.reason,
            created_by: model.created_by,
            approved_by: model.approved_by,
            created_at: model.created_at,
            confirmed_at: model.confirmed_at,
            canceled_at: model.canceled_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MovementLineResponse {
    pub id: Uuid,
    pub line_number: i32,
    pub item_id: Uuid,
    pub quantity: Decimal,
    pub unit_cost: Option<Decimal>,
    pub total_cost: Option<Decimal>,
    pub notes: Option<String>,
}

impl From<movement_line::Model> for MovementLineResponse {
    fn from(model: movement_line::Model) -> Self {
        Self {
            id: model.id,
            line_number: model.line_number,
            item_id: model.item_id,
            quantity: model.quantity,
            unit_cost: model.unit_cost,
            total_cost: model.total_cost,
            notes: model.notes,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MovementWithLinesResponse {
    #[serde(flatten)]
    pub movement: MovementResponse,
    pub lines: Vec<MovementLineResponse>,
}

impl From<MovementWithLines> for MovementWithLinesResponse {
    fn from(value: MovementWithLines) -> Self {
        Self {
            movement: value.movement.into(),
            lines: value.lines.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct MovementQuery {
    pub movement_type: Option<MovementType>,
    pub status: Option<MovementStatus>,
    pub warehouse_id: Option<Uuid>,
    pub item_id: Option<Uuid>,
    pub created_by: Option<Uuid>,
    pub created_from: Option<DateTime<Utc>>,
    pub created_to: Option<DateTime<Utc>>,
    #[serde(default = "default_page")]
    pub page: u64,
    #[serde(default = "default_limit")]
    pub limit: u64,
}

fn default_page() -> u64 {
    1
}
fn default_limit() -> u64 {
    20
}

/// Create the movements router
pub fn movements_router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_movement).get(list_movements))
        .route("/validate", post(validate_movement))
        .route("/:id", get(get_movement))
        .route("/:id/confirm", post(confirm_movement))
        .route("/:id/cancel", post(cancel_movement))
}

/// Create a new draft movement
#[utoipa::path(
    post,
    path = "/api/v1/movements",
    request_body = CreateMovementRequest,
    responses(
        (status = 200, description = "Movement created as draft"),
        (status = 400, description = "Structurally invalid movement")
    ),
    tag = "movements"
)]
pub async fn create_movement(
    State(state): State<AppState>,
    Json(request): Json<CreateMovementRequest>,
) -> Result<Json<ApiResponse<MovementWithLinesResponse>>, ServiceError> {
    let created = state
        .movement_service
        .create_movement(request.into())
        .await?;
    Ok(Json(ApiResponse::success(created.into())))
}

/// Dry-run validation of a proposed movement
#[utoipa::path(
    post,
    path = "/api/v1/movements/validate",
    request_body = CreateMovementRequest,
    responses(
        (status = 200, description = "Movement is structurally valid"),
        (status = 400, description = "Structurally invalid movement")
    ),
    tag = "movements"
)]
pub async fn validate_movement(
    State(state): State<AppState>,
    Json(request): Json<CreateMovementRequest>,
) -> Result<Json<ApiResponse<serde_json::Value>>, ServiceError> {
    state
        .movement_service
        .validate_new_movement(&request.into())?;
    Ok(Json(ApiResponse::success(
        serde_json::json!({ "valid": true }),
    )))
}

/// List movements with optional filters
#[utoipa::path(
    get,
    path = "/api/v1/movements",
    params(MovementQuery),
    responses(
        (status = 200, description = "Movement list returned")
    ),
    tag = "movements"
)]
pub async fn list_movements(
    State(state): State<AppState>,
    Query(query): Query<MovementQuery>,
) -> Result<Json<ApiResponse<PaginatedResponse<MovementResponse>>>, ServiceError> {
    let page = query.page.max(1);
    let limit = query.limit.clamp(1, 100);

    let filters = MovementFilters {
        movement_type: query.movement_type,
        status: query.status,
        warehouse_id: query.warehouse_id,
        item_id: query.item_id,
        created_by: query.created_by,
        created_from: query.created_from,
        created_to: query.created_to,
    };

    let (movements, total) = state
        .movement_service
        .list_movements(filters, page - 1, limit)
        .await?;

    let total_pages = total.div_ceil(limit);
    Ok(Json(ApiResponse::success(PaginatedResponse {
        items: movements.into_iter().map(Into::into).collect(),
        total,
        page,
        limit,
        total_pages,
    })))
}

/// Fetch one movement with its lines
#[utoipa::path(
    get,
    path = "/api/v1/movements/{id}",
    params(("id" = Uuid, Path, description = "Movement id")),
    responses(
        (status = 200, description = "Movement returned"),
        (status = 404, description = "Movement not found")
    ),
    tag = "movements"
)]
pub async fn get_movement(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<MovementWithLinesResponse>>, ServiceError> {
    let movement = state.movement_service.get_movement(id).await?;
    Ok(Json(ApiResponse::success(movement.into())))
}

/// Confirm a draft movement and apply its stock deltas
#[utoipa::path(
    post,
    path = "/api/v1/movements/{id}/confirm",
    params(("id" = Uuid, Path, description = "Movement id")),
    request_body = ConfirmMovementRequest,
    responses(
        (status = 200, description = "Movement confirmed, balances updated"),
        (status = 404, description = "Movement not found"),
        (status = 409, description = "Movement is not a draft"),
        (status = 422, description = "A balance would drop below zero")
    ),
    tag = "movements"
)]
pub async fn confirm_movement(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<ConfirmMovementRequest>,
) -> Result<Json<ApiResponse<MovementWithLinesResponse>>, ServiceError> {
    let confirmed = state
        .movement_service
        .confirm_movement(id, request.approved_by)
        .await?;
    Ok(Json(ApiResponse::success(confirmed.into())))
}

/// Cancel a draft movement
#[utoipa::path(
    post,
    path = "/api/v1/movements/{id}/cancel",
    params(("id" = Uuid, Path, description = "Movement id")),
    request_body = CancelMovementRequest,
    responses(
        (status = 200, description = "Movement canceled"),
        (status = 404, description = "Movement not found"),
        (status = 409, description = "Movement already canceled or confirmed")
    ),
    tag = "movements"
)]
pub async fn cancel_movement(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<CancelMovementRequest>,
) -> Result<Json<ApiResponse<MovementResponse>>, ServiceError> {
    let canceled = state
        .movement_service
        .cancel_movement(id, request.user_id, request.reason)
        .await?;
    Ok(Json(ApiResponse::success(canceled.into())))
}
