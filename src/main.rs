use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use axum::Router;
use tokio::sync::mpsc;
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;

use almacen_api::config::{init_tracing, load_config};
use almacen_api::db;
use almacen_api::events::{process_events, EventSender};
use almacen_api::tracing::{configure_http_tracing, info, request_id_middleware};
use almacen_api::{api_v1_routes, operational_routes, request_logging_middleware, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = load_config().context("failed to load configuration")?;
    init_tracing(config.log_level(), config.log_json);

    info!(
        environment = %config.environment,
        "Starting {} v{}",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION")
    );

    let db = Arc::new(
        db::establish_connection_from_app_config(&config)
            .await
            .context("failed to connect to database")?,
    );

    if config.auto_migrate {
        db::run_migrations(&db)
            .await
            .context("failed to run migrations")?;
    }

    let (tx, rx) = mpsc::channel(config.event_channel_capacity);
    tokio::spawn(process_events(rx));
    let event_sender = Arc::new(EventSender::new(tx));

    let addr = SocketAddr::new(
        config.host.parse().context("invalid listen host")?,
        config.port,
    );
    let state = AppState::new(db.clone(), config, event_sender);

    let app = Router::new()
        .nest("/api/v1", api_v1_routes())
        .merge(operational_routes())
        .layer(axum::middleware::from_fn(request_logging_middleware))
        .layer(configure_http_tracing())
        .layer(axum::middleware::from_fn(request_id_middleware))
        .layer(CorsLayer::permissive())
        .layer(CompressionLayer::new())
        .layer(TimeoutLayer::new(std::time::Duration::from_secs(30)))
        .with_state(state);

    info!("Listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("failed to bind listener")?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("Shutdown complete, closing database pool");
    match Arc::try_unwrap(db) {
        Ok(pool) => db::close_pool(pool).await?,
        Err(_) => info!("Database pool still shared, leaving close to drop"),
    }

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        almacen_api::tracing::error!(error = %err, "failed to install shutdown signal handler");
        return;
    }
    info!("Shutdown signal received");
}
