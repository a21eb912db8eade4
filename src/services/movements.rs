//! Movement lifecycle manager: DRAFT creation, confirmation (the only path
//! that mutates stock balances), cancellation, and read queries over the
//! ledger.

use crate::{
    db::DbPool,
    entities::{
        movement::{self, AdjustmentDirection, Entity as Movement, MovementState, MovementType},
        movement_line::{self, Entity as MovementLine},
        stock_balance::{self, Entity as StockBalance},
    },
    errors::ServiceError,
    events::{Event, EventSender},
    services::audit::{self, AuditAction, AuditEntry},
    services::stock_engine::{
        apply_stock_deltas, compute_stock_deltas, validate_movement_input, MovementInput,
        MovementLineInput, QUANTITY_SCALE,
    },
};
use chrono::{DateTime, Utc};
use metrics::counter;
use rust_decimal::Decimal;
use sea_orm::{
    ColumnTrait, Condition, EntityTrait, JoinType, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, RelationTrait, Set, TransactionError, TransactionTrait,
};
use std::sync::Arc;
use tracing::{info, instrument, warn};
use uuid::Uuid;

/// Fractional digits carried by costs.
const COST_SCALE: u32 = 2;

/// A proposed movement, as submitted by a caller.
#[derive(Clone, Debug)]
pub struct NewMovement {
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
    pub lines: Vec<NewMovementLine>,
}

#[derive(Clone, Debug)]
pub struct NewMovementLine {
    pub item_id: Uuid,
    pub quantity: Decimal,
    pub unit_cost: Option<Decimal>,
    pub notes: Option<String>,
}

/// A movement header with its ordered lines.
#[derive(Clone, Debug)]
pub struct MovementWithLines {
    pub movement: movement::Model,
    pub lines: Vec<movement_line::Model>,
}

/// Filters accepted by `list_movements`.
#[derive(Clone, Debug, Default)]
pub struct MovementFilters {
    pub movement_type: Option<MovementType>,
    pub status: Option<movement::MovementStatus>,
    pub warehouse_id: Option<Uuid>,
    pub item_id: Option<Uuid>,
    pub created_by: Option<Uuid>,
    pub created_from: Option<DateTime<Utc>>,
    pub created_to: Option<DateTime<Utc>>,
}

/// Filters accepted by `list_stock_balances`.
#[derive(Clone, Debug, Default)]
pub struct StockFilters {
    pub item_id: Option<Uuid>,
    pub warehouse_id: Option<Uuid>,
    pub location_id: Option<Uuid>,
}

#[derive(Clone)]
pub struct MovementService {
    db_pool: Arc<DbPool>,
    event_sender: Arc<EventSender>,
    allow_negative_stock: bool,
}

impl MovementService {
    pub fn new(
        db_pool: Arc<DbPool>,
        event_sender: Arc<EventSender>,
        allow_negative_stock: bool,
    ) -> Self {
        Self {
            db_pool,
            event_sender,
            allow_negative_stock,
        }
    }

    fn movement_input(new: &NewMovement) -> MovementInput {
        MovementInput {
            movement_type: new.movement_type,
            adjustment_direction: new.adjustment_direction,
            origin_warehouse_id: new.origin_warehouse_id,
            origin_location_id: new.origin_location_id,
            destination_warehouse_id: new.destination_warehouse_id,
            destination_location_id: new.destination_location_id,
        }
    }

    fn line_inputs(new: &NewMovement) -> Vec<MovementLineInput> {
        new.lines
            .iter()
            .map(|line| MovementLineInput {
                item_id: line.item_id,
                quantity: line.quantity,
            })
            .collect()
    }

    /// Structural dry-run validation, no persistence.
    pub fn validate_new_movement(&self, new: &NewMovement) -> Result<(), ServiceError> {
        validate_movement_input(&Self::movement_input(new), &Self::line_inputs(new))?;

        if new.movement_type == MovementType::Adjustment
            && new.reason.as_deref().map_or(true, str::is_empty)
        {
            return Err(ServiceError::ValidationError(
                "Adjustment movements require a reason".to_string(),
            ));
        }

        Ok(())
    }

    /// Persists a DRAFT movement with its ordered lines. Balances are not
    /// touched until confirmation.
    #[instrument(skip(self, new), fields(movement_type = %new.movement_type))]
    pub async fn create_movement(&self, new: NewMovement) -> Result<MovementWithLines, ServiceError> {
        self.validate_new_movement(&new)?;

        let db = self.db_pool.as_ref();
        let created = db
            .transaction::<_, MovementWithLines, ServiceError>(move |txn| {
                Box::pin(async move {
                    let now = Utc::now();
                    let movement_id = Uuid::new_v4();

                    let header = movement::ActiveModel {
                        id: Set(movement_id),
                        code: Set(new.code.clone()),
                        movement_type: Set(new.movement_type),
                        status: Set(movement::MovementStatus::Draft),
                        adjustment_direction: Set(new.adjustment_direction),
                        origin_warehouse_id: Set(new.origin_warehouse_id),
                        origin_location_id: Set(new.origin_location_id),
                        destination_warehouse_id: Set(new.destination_warehouse_id),
                        destination_location_id: Set(new.destination_location_id),
                        reference: Set(new.reference.clone()),
                        reason: Set(new.reason.clone()),
                        created_by: Set(new.created_by),
                        approved_by: Set(None),
                        created_at: Set(now),
                        confirmed_at: Set(None),
                        canceled_at: Set(None),
                    };
                    let header = sea_orm::ActiveModelTrait::insert(header, txn)
                        .await
                        .map_err(ServiceError::db_error)?;

                    let mut lines = Vec::with_capacity(new.lines.len());
                    for (index, line) in new.lines.iter().enumerate() {
                        let quantity = line.quantity.round_dp(QUANTITY_SCALE);
                        let unit_cost = line.unit_cost.map(|c| c.round_dp(COST_SCALE));
                        let total_cost =
                            unit_cost.map(|c| (c * quantity).round_dp(COST_SCALE));

                        let active = movement_line::ActiveModel {
                            id: Set(Uuid::new_v4()),
                            movement_id: Set(movement_id),
                            line_number: Set(index as i32 + 1),
                            item_id: Set(line.item_id),
                            quantity: Set(quantity),
                            unit_cost: Set(unit_cost),
                            total_cost: Set(total_cost),
                            notes: Set(line.notes.clone()),
                            created_at: Set(now),
                        };
                        let inserted = sea_orm::ActiveModelTrait::insert(active, txn)
                            .await
                            .map_err(ServiceError::db_error)?;
                        lines.push(inserted);
                    }

                    audit::record(
                        txn,
                        AuditEntry::for_movement(movement_id, AuditAction::Create)
                            .after(&header)
                            .by(new.created_by),
                    )
                    .await?;

                    Ok(MovementWithLines {
                        movement: header,
                        lines,
                    })
                })
            })
            .await
            .map_err(|e| match e {
                TransactionError::Connection(db_err) => ServiceError::db_error(db_err),
                TransactionError::Transaction(service_err) => service_err,
            })?;

        counter!("almacen_movements.created", 1);
        info!(movement_id = %created.movement.id, "Movement created as draft");

        self.event_sender
            .send(Event::MovementCreated(created.movement.id))
            .await
            .map_err(|e| ServiceError::EventError(format!("Failed to send event: {}", e)))?;

        Ok(created)
    }

    /// Confirms a DRAFT movement: recomputes its deltas from the persisted
    /// header and lines, applies them, and flips the status, all in one
    /// transaction. Any failure leaves the movement DRAFT and balances
    /// untouched.
    #[instrument(skip(self))]
    pub async fn confirm_movement(
        &self,
        movement_id: Uuid,
        approved_by: Uuid,
    ) -> Result<MovementWithLines, ServiceError> {
        let db = self.db_pool.as_ref();
        let allow_negative = self.allow_negative_stock;

        let (confirmed, balances) = db
            .transaction::<_, (MovementWithLines, Vec<stock_balance::Model>), ServiceError>(
                move |txn| {
                    Box::pin(async move {
                        let header = Movement::find_by_id(movement_id)
                            .one(txn)
                            .await
                            .map_err(ServiceError::db_error)?
                            .ok_or_else(|| {
                                ServiceError::NotFound("Movement not found".to_string())
                            })?;

                        match header.state() {
                            MovementState::Draft => {}
                            MovementState::Confirmed { .. } | MovementState::Canceled { .. } => {
                                return Err(ServiceError::InvalidTransition(
                                    "Only draft movements can be confirmed".to_string(),
                                ));
                            }
                        }

                        let lines = MovementLine::find()
                            .filter(movement_line::Column::MovementId.eq(movement_id))
                            .order_by_asc(movement_line::Column::LineNumber)
                            .all(txn)
                            .await
                            .map_err(ServiceError::db_error)?;

                        let input = MovementInput::from(&header);
                        let line_inputs: Vec<MovementLineInput> =
                            lines.iter().map(MovementLineInput::from).collect();
                        let deltas = compute_stock_deltas(&input, &line_inputs)?;

                        let balances =
                            apply_stock_deltas(txn, &deltas, allow_negative).await?;

                        let before = header.clone();
                        let mut active: movement::ActiveModel = header.into();
                        active.status = Set(movement::MovementStatus::Confirmed);
                        active.approved_by = Set(Some(approved_by));
                        active.confirmed_at = Set(Some(Utc::now()));
                        let updated = sea_orm::ActiveModelTrait::update(active, txn)
                            .await
                            .map_err(ServiceError::db_error)?;

                        audit::record(
                            txn,
                            AuditEntry::for_movement(movement_id, AuditAction::Confirm)
                                .before(&before)
                                .after(&updated)
                                .by(approved_by),
                        )
                        .await?;

                        Ok((
                            MovementWithLines {
                                movement: updated,
                                lines,
                            },
                            balances,
                        ))
                    })
                },
            )
            .await
            .map_err(|e| match e {
                TransactionError::Connection(db_err) => ServiceError::db_error(db_err),
                TransactionError::Transaction(service_err) => service_err,
            })?;

        counter!("almacen_movements.confirmed", 1);
        info!(movement_id = %movement_id, approved_by = %approved_by, "Movement confirmed");

        self.event_sender
            .send(Event::MovementConfirmed {
                movement_id,
                approved_by,
            })
            .await
            .map_err(|e| ServiceError::EventError(format!("Failed to send event: {}", e)))?;

        for balance in &balances {
            self.event_sender
                .send(Event::StockBalanceChanged {
                    item_id: balance.item_id,
                    warehouse_id: balance.warehouse_id,
                    location_id: balance.location_id,
                    new_quantity: balance.quantity,
                })
                .await
                .map_err(|e| ServiceError::EventError(format!("Failed to send event: {}", e)))?;
        }

        Ok(confirmed)
    }

    /// Cancels a DRAFT movement. Confirmed movements are immutable; a second
    /// cancel is reported as such. Balances are never touched.
    #[instrument(skip(self))]
    pub async fn cancel_movement(
        &self,
        movement_id: Uuid,
        user_id: Uuid,
        reason: Option<String>,
    ) -> Result<movement::Model, ServiceError> {
        let db = self.db_pool.as_ref();

        let canceled = db
            .transaction::<_, movement::Model, ServiceError>(move |txn| {
                Box::pin(async move {
                    let header = Movement::find_by_id(movement_id)
                        .one(txn)
                        .await
                        .map_err(ServiceError::db_error)?
                        .ok_or_else(|| ServiceError::NotFound("Movement not found".to_string()))?;

                    match header.state() {
                        MovementState::Draft => {}
                        MovementState::Canceled { .. } => {
                            return Err(ServiceError::AlreadyCanceled(movement_id.to_string()));
                        }
                        MovementState::Confirmed { .. } => {
                            return Err(ServiceError::ConfirmedImmutable(movement_id.to_string()));
                        }
                    }

                    let before = header.clone();
                    let mut active: movement::ActiveModel = header.into();
                    active.status = Set(movement::MovementStatus::Canceled);
                    active.canceled_at = Set(Some(Utc::now()));
                    if let Some(reason) = reason.clone() {
                        active.reason = Set(Some(reason));
                    }
                    let updated = sea_orm::ActiveModelTrait::update(active, txn)
                        .await
                        .map_err(ServiceError::db_error)?;

                    audit::record(
                        txn,
                        AuditEntry::for_movement(movement_id, AuditAction::Cancel)
                            .before(&before)
                            .after(&updated)
                            .by(user_id),
                    )
                    .await?;

                    Ok(updated)
                })
            })
            .await
            .map_err(|e| match e {
                TransactionError::Connection(db_err) => ServiceError::db_error(db_err),
                TransactionError::Transaction(service_err) => service_err,
            })?;

        counter!("almacen_movements.canceled", 1);
        warn!(movement_id = %movement_id, user_id = %user_id, "Movement canceled");

        self.event_sender
            .send(Event::MovementCanceled {
                movement_id,
                user_id,
            })
            .await
            .map_err(|e| ServiceError::EventError(format!("Failed to send event: {}", e)))?;

        Ok(canceled)
    }

    /// Loads one movement with its ordered lines.
    pub async fn get_movement(&self, movement_id: Uuid) -> Result<MovementWithLines, ServiceError> {
        let db = self.db_pool.as_ref();

        let header = Movement::find_by_id(movement_id)
            .one(db)
            .await
            .map_err(ServiceError::db_error)?
            .ok_or_else(|| ServiceError::NotFound("Movement not found".to_string()))?;

        let lines = MovementLine::find()
            .filter(movement_line::Column::MovementId.eq(movement_id))
            .order_by_asc(movement_line::Column::LineNumber)
            .all(db)
            .await
            .map_err(ServiceError::db_error)?;

        Ok(MovementWithLines {
            movement: header,
            lines,
        })
    }

    /// Lists movement headers newest first with optional filters.
    ///
    /// `page` is zero-based; returns the page plus the total row count.
    pub async fn list_movements(
        &self,
        filters: MovementFilters,
        page: u64,
        limit: u64,
    ) -> Result<(Vec<movement::Model>, u64), ServiceError> {
        let db = self.db_pool.as_ref();

        let mut query = Movement::find();

        if let Some(movement_type) = filters.movement_type {
            query = query.filter(movement::Column::MovementType.eq(movement_type));
        }
        if let Some(status) = filters.status {
            query = query.filter(movement::Column::Status.eq(status));
        }
        if let Some(warehouse_id) = filters.warehouse_id {
            query = query.filter(
                Condition::any()
                    .add(movement::Column::OriginWarehouseId.eq(warehouse_id))
                    .add(movement::Column::DestinationWarehouseId.eq(warehouse_id)),
            );
        }
        if let Some(item_id) = filters.item_id {
            query = query
                .join(JoinType::InnerJoin, movement::Relation::MovementLine.def())
                .filter(movement_line::Column::ItemId.eq(item_id))
                .distinct();
        }
        if let Some(created_by) = filters.created_by {
            query = query.filter(movement::Column::CreatedBy.eq(created_by));
        }
        if let Some(from) = filters.created_from {
            query = query.filter(movement::Column::CreatedAt.gte(from));
        }
        if let Some(to) = filters.created_to {
            query = query.filter(movement::Column::CreatedAt.lte(to));
        }

        let paginator = query
            .order_by_desc(movement::Column::CreatedAt)
            .paginate(db, limit.max(1));

        let total = paginator
            .num_items()
            .await
            .map_err(ServiceError::db_error)?;
        let movements = paginator
            .fetch_page(page)
            .await
            .map_err(ServiceError::db_error)?;

        Ok((movements, total))
    }

    /// Read-only balance listing with optional key filters.
    pub async fn list_stock_balances(
        &self,
        filters: StockFilters,
    ) -> Result<Vec<stock_balance::Model>, ServiceError> {
        let db = self.db_pool.as_ref();

        let mut query = StockBalance::find();

        if let Some(item_id) = filters.item_id {
            query = query.filter(stock_balance::Column::ItemId.eq(item_id));
        }
        if let Some(warehouse_id) = filters.warehouse_id {
            query = query.filter(stock_balance::Column::WarehouseId.eq(warehouse_id));
        }
        if let Some(location_id) = filters.location_id {
            query = query.filter(stock_balance::Column::LocationId.eq(location_id));
        }

        query
            .order_by_asc(stock_balance::Column::WarehouseId)
            .order_by_asc(stock_balance::Column::ItemId)
            .all(db)
            .await
            .map_err(ServiceError::db_error)
    }
}
