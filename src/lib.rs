/*!
 * Almacen API
 *
 * Inventory backend for a network of municipal warehouses. Stock only moves
 * through the movement ledger: drafts are validated structurally, and
 * confirmation applies signed quantity deltas to per-location balances inside
 * one transaction. Reorder alerts and an audit trail are derived from the
 * same data.
 */

pub mod config;
pub mod db;
pub mod entities;
pub mod errors;
pub mod events;
pub mod handlers;
pub mod migrator;
pub mod openapi;
pub mod services;
pub mod tracing;

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::Response,
    routing::get,
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use utoipa::ToSchema;

use crate::config::AppConfig;
use crate::db::DbPool;
use crate::errors::ServiceError;
use crate::events::EventSender;
use crate::services::alerts::AlertService;
use crate::services::movements::MovementService;

/// Shared application state threaded through every handler.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DbPool>,
    pub config: AppConfig,
    pub event_sender: Arc<EventSender>,
    pub movement_service: MovementService,
    pub alert_service: AlertService,
}

impl AppState {
    pub fn new(db: Arc<DbPool>, config: AppConfig, event_sender: Arc<EventSender>) -> Self {
        let movement_service = MovementService::new(
            db.clone(),
            event_sender.clone(),
            config.allow_negative_stock,
        );
        let alert_service = AlertService::new(db.clone(), event_sender.clone());

        Self {
            db,
            config,
            event_sender,
            movement_service,
            alert_service,
        }
    }
}

/// Standard envelope for every API response.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<String>>,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ResponseMeta {
    pub request_id: String,
    pub timestamp: DateTime<Utc>,
}

impl ResponseMeta {
    /// Captures the request id from the current task-local scope, minting a
    /// fresh one for work running outside a request (startup, background jobs).
    pub fn capture() -> Self {
        Self {
            request_id: crate::tracing::current_request_id()
                .map(|id| id.as_str().to_string())
                .unwrap_or_else(|| uuid::Uuid::new_v4().to_string()),
            timestamp: Utc::now(),
        }
    }
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
            errors: None,
            meta: ResponseMeta::capture(),
        }
    }

    pub fn success_with_message(data: T, message: impl Into<String>) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: Some(message.into()),
            errors: None,
            meta: ResponseMeta::capture(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            message: Some(message.into()),
            errors: None,
            meta: ResponseMeta::capture(),
        }
    }

    pub fn validation_errors(errors: Vec<String>) -> Self {
        Self {
            success: false,
            data: None,
            message: Some("Validation failed".to_string()),
            errors: Some(errors),
            meta: ResponseMeta::capture(),
        }
    }
}

/// Page of results plus the counts needed to render pagination controls.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PaginatedResponse<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u64,
    pub limit: u64,
    pub total_pages: u64,
}

pub type ApiResult<T> = Result<Json<ApiResponse<T>>, ServiceError>;

/// All versioned API routes, mounted under `/api/v1` by the binary.
pub fn api_v1_routes() -> Router<AppState> {
    Router::new()
        .nest("/movements", handlers::movements::movements_router())
        .nest("/stock", handlers::stock::stock_router())
        .nest("/alerts", handlers::alerts::alerts_router())
}

/// Unversioned operational routes.
pub fn operational_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health_check))
        .route("/status", get(app_status))
}

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthStatus {
    pub status: String,
    pub database: String,
}

async fn health_check(State(state): State<AppState>) -> ApiResult<HealthStatus> {
    let database = match db::check_connection(&state.db).await {
        Ok(()) => "up".to_string(),
        Err(err) => {
            tracing::warn!(error = %err, "health check failed to reach database");
            return Err(err);
        }
    };

    Ok(Json(ApiResponse::success(HealthStatus {
        status: "ok".to_string(),
        database,
    })))
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AppStatus {
    pub name: String,
    pub version: String,
    pub environment: String,
}

async fn app_status(State(state): State<AppState>) -> ApiResult<AppStatus> {
    Ok(Json(ApiResponse::success(AppStatus {
        name: env!("CARGO_PKG_NAME").to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        environment: state.config.environment.clone(),
    })))
}

/// Logs one line per request with method, path, status and latency.
pub async fn request_logging_middleware(request: Request<Body>, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let start = Instant::now();

    let response = next.run(request).await;

    let elapsed = start.elapsed();
    let status = response.status();
    if status.is_server_error() {
        tracing::error!(%method, %path, %status, elapsed_ms = elapsed.as_millis() as u64, "request failed");
    } else {
        tracing::info!(%method, %path, %status, elapsed_ms = elapsed.as_millis() as u64, "request completed");
    }

    response
}

#[cfg(test)]
mod response_tests {
    use super::*;

    #[test]
    fn success_response_wraps_data() {
        let response = ApiResponse::success(vec![1, 2, 3]);
        assert!(response.success);
        assert_eq!(response.data, Some(vec![1, 2, 3]));
        assert!(response.message.is_none());
        assert!(response.errors.is_none());
        assert!(!response.meta.request_id.is_empty());
    }

    #[test]
    fn error_response_has_no_data() {
        let response: ApiResponse<()> = ApiResponse::error("boom");
        assert!(!response.success);
        assert!(response.data.is_none());
        assert_eq!(response.message.as_deref(), Some("boom"));
    }

    #[test]
    fn validation_errors_are_listed() {
        let response: ApiResponse<()> =
            ApiResponse::validation_errors(vec!["quantity must be positive".to_string()]);
        assert!(!response.success);
        assert_eq!(response.errors.as_ref().map(Vec::len), Some(1));
    }

    #[tokio::test]
    async fn response_meta_uses_scoped_request_id() {
        let id = crate::tracing::RequestId("req-lib-test".to_string());
        let meta =
            crate::tracing::scope_request_id(id, async { ResponseMeta::capture() }).await;
        assert_eq!(meta.request_id, "req-lib-test");
    }

    #[test]
    fn success_envelope_serializes_without_null_fields() {
        let response = ApiResponse::success(42);
        let json = serde_json::to_value(&response).unwrap();
        assert!(json.get("message").is_none());
        assert!(json.get("errors").is_none());
        assert_eq!(json["data"], 42);
    }
}
