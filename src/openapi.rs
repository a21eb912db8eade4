use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Almacen API",
        version = "0.1.0",
        description = r#"
Municipal warehouse inventory backend.

The core of the service is the stock movement ledger: movements are created
as drafts, validated structurally, and only mutate stock balances when
confirmed. Confirmation applies signed per-location quantity deltas inside a
single transaction and enforces the non-negative stock invariant. Reorder
alerts (`BELOW_MIN` / `BELOW_REORDER`) are derived from the same balances,
and every state-changing operation leaves an audit trail row.
        "#,
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    ),
    servers(
        (url = "http://localhost:8080", description = "Local development")
    ),
    tags(
        (name = "movements", description = "Stock movement ledger endpoints"),
        (name = "stock", description = "Stock balance queries"),
        (name = "alerts", description = "Reorder alert endpoints")
    ),
    paths(
        crate::handlers::movements::create_movement,
        crate::handlers::movements::validate_movement,
        crate::handlers::movements::list_movements,
        crate::handlers::movements::get_movement,
        crate::handlers::movements::confirm_movement,
        crate::handlers::movements::cancel_movement,
        crate::handlers::stock::list_stock,
        crate::handlers::alerts::list_alerts,
        crate::handlers::alerts::recompute_alerts,
    ),
    components(schemas(
        crate::handlers::movements::CreateMovementRequest,
        crate::handlers::movements::MovementLineRequest,
        crate::handlers::movements::ConfirmMovementRequest,
        crate::handlers::movements::CancelMovementRequest,
        crate::handlers::movements::MovementResponse,
        crate::handlers::movements::MovementLineResponse,
        crate::handlers::movements::MovementWithLinesResponse,
        crate::handlers::stock::StockBalanceResponse,
        crate::handlers::alerts::StockAlertResponse,
        crate::services::alerts::StockAlertEntry,
        crate::entities::movement::MovementType,
        crate::entities::movement::MovementStatus,
        crate::entities::movement::AdjustmentDirection,
        crate::entities::stock_alert::AlertType,
        crate::errors::ErrorResponse,
    ))
)]
pub struct ApiDoc;
