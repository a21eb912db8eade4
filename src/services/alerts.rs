//! Reorder alerting. Alerts are derived data: each recompute aggregates
//! balances per (item, warehouse) across locations and compares them against
//! the configured thresholds. A persisted recompute replaces the whole
//! `stock_alerts` table contents.

use crate::{
    db::DbPool,
    entities::{
        item_warehouse_config::{self, Entity as ItemWarehouseConfig},
        stock_alert::{self, AlertType, Entity as StockAlert},
        stock_balance::{self, Entity as StockBalance},
    },
    errors::ServiceError,
    events::{Event, EventSender},
};
use chrono::Utc;
use metrics::{counter, gauge};
use rust_decimal::Decimal;
use sea_orm::{
    ColumnTrait, EntityTrait, FromQueryResult, QueryFilter, QueryOrder, QuerySelect, Set,
    TransactionError, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, instrument};
use utoipa::ToSchema;
use uuid::Uuid;

/// One computed alert, before (optional) persistence.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct StockAlertEntry {
    pub item_id: Uuid,
    pub warehouse_id: Uuid,
    pub alert_type: AlertType,
    pub quantity: Decimal,
    pub min_stock: Decimal,
    pub reorder_point: Decimal,
}

#[derive(Debug, FromQueryResult)]
struct BalanceSum {
    item_id: Uuid,
    warehouse_id: Uuid,
    total: Option<Decimal>,
}

/// Classifies one aggregated quantity against its thresholds. BELOW_MIN wins
/// when both thresholds are crossed.
fn classify(quantity: Decimal, min_stock: Decimal, reorder_point: Decimal) -> Option<AlertType> {
    if quantity <= min_stock {
        Some(AlertType::BelowMin)
    } else if quantity <= reorder_point {
        Some(AlertType::BelowReorder)
    } else {
        None
    }
}

#[derive(Clone)]
pub struct AlertService {
    db_pool: Arc<DbPool>,
    event_sender: Arc<EventSender>,
}

impl AlertService {
    pub fn new(db_pool: Arc<DbPool>, event_sender: Arc<EventSender>) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    /// Recomputes alerts for every configured (item, warehouse) pair.
    ///
    /// When `persist` is true the stored alert set is fully replaced inside
    /// one transaction; otherwise this is a pure read.
    #[instrument(skip(self))]
    pub async fn compute_alerts(&self, persist: bool) -> Result<Vec<StockAlertEntry>, ServiceError> {
        let db = self.db_pool.as_ref();

        let sums = StockBalance::find()
            .select_only()
            .column(stock_balance::Column::ItemId)
            .column(stock_balance::Column::WarehouseId)
            .column_as(stock_balance::Column::Quantity.sum(), "total")
            .group_by(stock_balance::Column::ItemId)
            .group_by(stock_balance::Column::WarehouseId)
            .into_model::<BalanceSum>()
            .all(db)
            .await
            .map_err(ServiceError::db_error)?;

        let totals: HashMap<(Uuid, Uuid), Decimal> = sums
            .into_iter()
            .map(|sum| {
                (
                    (sum.item_id, sum.warehouse_id),
                    sum.total.unwrap_or(Decimal::ZERO),
                )
            })
            .collect();

        let configs = ItemWarehouseConfig::find()
            .all(db)
            .await
            .map_err(ServiceError::db_error)?;

        let mut entries = Vec::new();
        for config in configs {
            let quantity = totals
                .get(&(config.item_id, config.warehouse_id))
                .copied()
                .unwrap_or(Decimal::ZERO);

            if let Some(alert_type) = classify(quantity, config.min_stock, config.reorder_point) {
                entries.push(StockAlertEntry {
                    item_id: config.item_id,
                    warehouse_id: config.warehouse_id,
                    alert_type,
                    quantity,
                    min_stock: config.min_stock,
                    reorder_point: config.reorder_point,
                });
            }
        }

        if persist {
            let to_persist = entries.clone();
            db.transaction::<_, (), ServiceError>(move |txn| {
                Box::pin(async move {
                    StockAlert::delete_many()
                        .exec(txn)
                        .await
                        .map_err(ServiceError::db_error)?;

                    let now = Utc::now();
                    for entry in &to_persist {
                        let active = stock_alert::ActiveModel {
                            id: Set(Uuid::new_v4()),
                            item_id: Set(entry.item_id),
                            warehouse_id: Set(entry.warehouse_id),
                            alert_type: Set(entry.alert_type),
                            quantity: Set(entry.quantity),
                            min_stock: Set(entry.min_stock),
                            reorder_point: Set(entry.reorder_point),
                            created_at: Set(now),
                        };
                        sea_orm::ActiveModelTrait::insert(active, txn)
                            .await
                            .map_err(ServiceError::db_error)?;
                    }

                    Ok(())
                })
            })
            .await
            .map_err(|e| match e {
                TransactionError::Connection(db_err) => ServiceError::db_error(db_err),
                TransactionError::Transaction(service_err) => service_err,
            })?;
        }

        counter!("almacen_alerts.recomputes", 1);
        gauge!("almacen_alerts.active", entries.len() as f64);
        info!(alerts = entries.len(), persisted = persist, "Alerts recomputed");

        self.event_sender
            .send(Event::AlertsRecomputed {
                alerts: entries.len(),
                persisted: persist,
            })
            .await
            .map_err(|e| ServiceError::EventError(format!("Failed to send event: {}", e)))?;

        Ok(entries)
    }

    /// Returns the persisted alert set, newest first.
    pub async fn list_alerts(&self) -> Result<Vec<stock_alert::Model>, ServiceError> {
        let db = self.db_pool.as_ref();

        StockAlert::find()
            .order_by_desc(stock_alert::Column::CreatedAt)
            .all(db)
            .await
            .map_err(ServiceError::db_error)
    }
}
