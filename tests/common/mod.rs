#![allow(dead_code)]

use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, Set};
use tokio::sync::mpsc;
use uuid::Uuid;

use almacen_api::db::{self, DbPool};
use almacen_api::entities::{item, item_warehouse_config, warehouse, warehouse_location};
use almacen_api::events::{process_events, EventSender};
use almacen_api::services::alerts::AlertService;
use almacen_api::services::movements::MovementService;

pub struct TestApp {
    pub db: Arc<DbPool>,
    pub movements: MovementService,
    pub alerts: AlertService,
}

/// Boots a fresh in-memory database with migrations applied and services
/// wired to a live event loop. Each call gets its own database.
pub async fn setup() -> TestApp {
    setup_with(false).await
}

pub async fn setup_with(allow_negative_stock: bool) -> TestApp {
    // Shared-cache keeps the database alive across pool connections; a unique
    // name isolates concurrent tests from each other.
    let url = format!("sqlite:file:test_{}?mode=memory&cache=shared", Uuid::new_v4());
    let db = Arc::new(
        db::establish_connection(&url)
            .await
            .unwrap_or_else(|e| panic!("failed to open test database: {e}")),
    );
    db::run_migrations(&db)
        .await
        .unwrap_or_else(|e| panic!("failed to migrate test database: {e}"));

    let (tx, rx) = mpsc::channel(64);
    tokio::spawn(process_events(rx));
    let event_sender = Arc::new(EventSender::new(tx));

    TestApp {
        movements: MovementService::new(db.clone(), event_sender.clone(), allow_negative_stock),
        alerts: AlertService::new(db.clone(), event_sender),
        db,
    }
}

pub async fn seed_item(db: &DbPool, code: &str) -> item::Model {
    let now = Utc::now();
    item::ActiveModel {
        id: Set(Uuid::new_v4()),
        code: Set(code.to_string()),
        name: Set(format!("Item {code}")),
        description: Set(None),
        unit: Set("unit".to_string()),
        category: Set(Some("office".to_string())),
        default_warehouse_id: Set(None),
        standard_cost: Set(Decimal::new(1000, 2)),
        active: Set(true),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(db)
    .await
    .unwrap_or_else(|e| panic!("failed to seed item {code}: {e}"))
}

pub async fn seed_warehouse(db: &DbPool, code: &str) -> warehouse::Model {
    let now = Utc::now();
    warehouse::ActiveModel {
        id: Set(Uuid::new_v4()),
        code: Set(code.to_string()),
        name: Set(format!("Warehouse {code}")),
        warehouse_type: Set(warehouse::WarehouseType::Central),
        address: Set(None),
        contact: Set(None),
        active: Set(true),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(db)
    .await
    .unwrap_or_else(|e| panic!("failed to seed warehouse {code}: {e}"))
}

pub async fn seed_location(
    db: &DbPool,
    warehouse_id: Uuid,
    code: &str,
) -> warehouse_location::Model {
    let now = Utc::now();
    warehouse_location::ActiveModel {
        id: Set(Uuid::new_v4()),
        warehouse_id: Set(warehouse_id),
        code: Set(code.to_string()),
        name: Set(format!("Location {code}")),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(db)
    .await
    .unwrap_or_else(|e| panic!("failed to seed location {code}: {e}"))
}

pub async fn seed_config(
    db: &DbPool,
    item_id: Uuid,
    warehouse_id: Uuid,
    min_stock: Decimal,
    reorder_point: Decimal,
) -> item_warehouse_config::Model {
    let now = Utc::now();
    item_warehouse_config::ActiveModel {
        id: Set(Uuid::new_v4()),
        item_id: Set(item_id),
        warehouse_id: Set(warehouse_id),
        min_stock: Set(min_stock),
        reorder_point: Set(reorder_point),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(db)
    .await
    .unwrap_or_else(|e| panic!("failed to seed item warehouse config: {e}"))
}
