//! The balance-mutation engine: validate a proposed movement, turn it into
//! signed per-key quantity deltas, and apply those deltas to stock balance
//! rows inside the caller's transaction.
//!
//! Validation and delta computation are pure; only the applier touches the
//! database.

use crate::{
    entities::{
        movement::{self, AdjustmentDirection, MovementType},
        stock_balance::{self, Entity as StockBalance},
    },
    errors::{MovementValidationError, ServiceError},
};
use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QuerySelect, Select, Set};
use uuid::Uuid;

/// Fractional digits carried by all stock quantities.
pub const QUANTITY_SCALE: u32 = 3;

/// Warehouse routing and type of a proposed movement, independent of whether
/// it came from an API request or a persisted header row.
#[derive(Clone, Debug, PartialEq)]
pub struct MovementInput {
    pub movement_type: MovementType,
    pub adjustment_direction: Option<AdjustmentDirection>,
    pub origin_warehouse_id: Option<Uuid>,
    pub origin_location_id: Option<Uuid>,
    pub destination_warehouse_id: Option<Uuid>,
    pub destination_location_id: Option<Uuid>,
}

impl From<&movement::Model> for MovementInput {
    fn from(model: &movement::Model) -> Self {
        Self {
            movement_type: model.movement_type,
            adjustment_direction: model.adjustment_direction,
            origin_warehouse_id: model.origin_warehouse_id,
            origin_location_id: model.origin_location_id,
            destination_warehouse_id: model.destination_warehouse_id,
            destination_location_id: model.destination_location_id,
        }
    }
}

/// One proposed movement line.
#[derive(Clone, Debug, PartialEq)]
pub struct MovementLineInput {
    pub item_id: Uuid,
    pub quantity: Decimal,
}

impl From<&crate::entities::movement_line::Model> for MovementLineInput {
    fn from(model: &crate::entities::movement_line::Model) -> Self {
        Self {
            item_id: model.item_id,
            quantity: model.quantity,
        }
    }
}

/// A signed quantity change against one stock key.
#[derive(Clone, Debug, PartialEq)]
pub struct StockDelta {
    pub item_id: Uuid,
    pub warehouse_id: Uuid,
    pub location_id: Option<Uuid>,
    pub delta: Decimal,
}

/// Structural validation of a proposed movement. Rules are checked in a fixed
/// order so callers always see the first applicable failure.
pub fn validate_movement_input(
    input: &MovementInput,
    lines: &[MovementLineInput],
) -> Result<(), MovementValidationError> {
    if lines.is_empty() {
        return Err(MovementValidationError::EmptyMovement);
    }

    for line in lines {
        if line.item_id.is_nil() || line.quantity <= Decimal::ZERO {
            return Err(MovementValidationError::InvalidLine);
        }
    }

    match input.movement_type {
        MovementType::Ingress => {
            if input.destination_warehouse_id.is_none() {
                return Err(MovementValidationError::MissingDestination);
            }
        }
        MovementType::Egress => {
            if input.origin_warehouse_id.is_none() {
                return Err(MovementValidationError::MissingOrigin);
            }
        }
        MovementType::Transfer => {
            let (origin, destination) =
                match (input.origin_warehouse_id, input.destination_warehouse_id) {
                    (Some(origin), Some(destination)) => (origin, destination),
                    _ => return Err(MovementValidationError::MissingEndpoint),
                };
            if origin == destination {
                return Err(MovementValidationError::SameWarehouseTransfer);
            }
        }
        MovementType::Adjustment => {
            if input.origin_warehouse_id.is_none() {
                return Err(MovementValidationError::MissingOrigin);
            }
            if input.adjustment_direction.is_none() {
                return Err(MovementValidationError::MissingDirection);
            }
        }
    }

    Ok(())
}

/// Computes the signed deltas a movement produces, in line order. A TRANSFER
/// line yields its origin debit before its destination credit.
pub fn compute_stock_deltas(
    input: &MovementInput,
    lines: &[MovementLineInput],
) -> Result<Vec<StockDelta>, MovementValidationError> {
    validate_movement_input(input, lines)?;

    let mut deltas = Vec::with_capacity(lines.len() * 2);

    for line in lines {
        let quantity = line.quantity.round_dp(QUANTITY_SCALE);

        match input.movement_type {
            MovementType::Ingress => {
                let warehouse_id = input
                    .destination_warehouse_id
                    .ok_or(MovementValidationError::MissingDestination)?;
                deltas.push(StockDelta {
                    item_id: line.item_id,
                    warehouse_id,
                    location_id: input.destination_location_id,
                    delta: quantity,
                });
            }
            MovementType::Egress => {
                let warehouse_id = input
                    .origin_warehouse_id
                    .ok_or(MovementValidationError::MissingOrigin)?;
                deltas.push(StockDelta {
                    item_id: line.item_id,
                    warehouse_id,
                    location_id: input.origin_location_id,
                    delta: -quantity,
                });
            }
            MovementType::Transfer => {
                let (origin, destination) =
                    match (input.origin_warehouse_id, input.destination_warehouse_id) {
                        (Some(origin), Some(destination)) => (origin, destination),
                        _ => return Err(MovementValidationError::MissingEndpoint),
                    };
                deltas.push(StockDelta {
                    item_id: line.item_id,
                    warehouse_id: origin,
                    location_id: input.origin_location_id,
                    delta: -quantity,
                });
                deltas.push(StockDelta {
                    item_id: line.item_id,
                    warehouse_id: destination,
                    location_id: input.destination_location_id,
                    delta: quantity,
                });
            }
            MovementType::Adjustment => {
                let warehouse_id = input
                    .origin_warehouse_id
                    .ok_or(MovementValidationError::MissingOrigin)?;
                let direction = input
                    .adjustment_direction
                    .ok_or(MovementValidationError::MissingDirection)?;
                let signed = match direction {
                    AdjustmentDirection::Increase => quantity,
                    AdjustmentDirection::Decrease => -quantity,
                };
                deltas.push(StockDelta {
                    item_id: line.item_id,
                    warehouse_id,
                    location_id: input.origin_location_id,
                    delta: signed,
                });
            }
        }
    }

    Ok(deltas)
}

/// Builds the locked lookup for one stock key. `SELECT ... FOR UPDATE`
/// serializes same-key confirmations on backends with row-level locking, so
/// the non-negative check always sees the latest committed quantity; SQLite
/// has no row locks and relies on its single-writer transaction instead.
fn balance_lookup(delta: &StockDelta) -> Select<StockBalance> {
    let query = StockBalance::find()
        .filter(stock_balance::Column::ItemId.eq(delta.item_id))
        .filter(stock_balance::Column::WarehouseId.eq(delta.warehouse_id));
    let query = match delta.location_id {
        Some(location_id) => query.filter(stock_balance::Column::LocationId.eq(location_id)),
        None => query.filter(stock_balance::Column::LocationId.is_null()),
    };
    query.lock_exclusive()
}

/// Applies deltas to stock balance rows on the given connection, in order.
///
/// Each key is locked, read, and written on the same connection, so when the
/// caller passes a transaction the check-then-act is atomic: any
/// `InsufficientStock` failure rolls back every prior delta. Missing balance
/// rows are created lazily; existing rows bump their `version`.
///
/// Returns the updated balance rows so the caller can emit per-key events
/// after commit.
pub async fn apply_stock_deltas<C: ConnectionTrait>(
    conn: &C,
    deltas: &[StockDelta],
    allow_negative: bool,
) -> Result<Vec<stock_balance::Model>, ServiceError> {
    let mut updated = Vec::with_capacity(deltas.len());

    for delta in deltas {
        let existing = balance_lookup(delta)
            .one(conn)
            .await
            .map_err(ServiceError::db_error)?;

        let current = existing
            .as_ref()
            .map(|balance| balance.quantity)
            .unwrap_or(Decimal::ZERO);
        let next = (current + delta.delta).round_dp(QUANTITY_SCALE);

        if next < Decimal::ZERO && !allow_negative {
            return Err(ServiceError::InsufficientStock(format!(
                "item {} in warehouse {} would drop to {}",
                delta.item_id, delta.warehouse_id, next
            )));
        }

        let now = Utc::now();
        let model = match existing {
            Some(balance) => {
                let version = balance.version;
                let mut active: stock_balance::ActiveModel = balance.into();
                active.quantity = Set(next);
                active.version = Set(version + 1);
                active.updated_at = Set(now);
                sea_orm::ActiveModelTrait::update(active, conn)
                    .await
                    .map_err(ServiceError::db_error)?
            }
            None => {
                let active = stock_balance::ActiveModel {
                    id: Set(Uuid::new_v4()),
                    item_id: Set(delta.item_id),
                    warehouse_id: Set(delta.warehouse_id),
                    location_id: Set(delta.location_id),
                    quantity: Set(next),
                    version: Set(1),
                    created_at: Set(now),
                    updated_at: Set(now),
                };
                sea_orm::ActiveModelTrait::insert(active, conn)
                    .await
                    .map_err(ServiceError::db_error)?
            }
        };

        updated.push(model);
    }

    Ok(updated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rust_decimal_macros::dec;

    fn ingress(destination: Uuid) -> MovementInput {
        MovementInput {
            movement_type: MovementType::Ingress,
            adjustment_direction: None,
            origin_warehouse_id: None,
            origin_location_id: None,
            destination_warehouse_id: Some(destination),
            destination_location_id: None,
        }
    }

    fn egress(origin: Uuid) -> MovementInput {
        MovementInput {
            movement_type: MovementType::Egress,
            adjustment_direction: None,
            origin_warehouse_id: Some(origin),
            origin_location_id: None,
            destination_warehouse_id: None,
            destination_location_id: None,
        }
    }

    fn transfer(origin: Uuid, destination: Uuid) -> MovementInput {
        MovementInput {
            movement_type: MovementType::Transfer,
            adjustment_direction: None,
            origin_warehouse_id: Some(origin),
            origin_location_id: None,
            destination_warehouse_id: Some(destination),
            destination_location_id: None,
        }
    }

    fn adjustment(origin: Uuid, direction: Option<AdjustmentDirection>) -> MovementInput {
        MovementInput {
            movement_type: MovementType::Adjustment,
            adjustment_direction: direction,
            origin_warehouse_id: Some(origin),
            origin_location_id: None,
            destination_warehouse_id: None,
            destination_location_id: None,
        }
    }

    fn line(quantity: Decimal) -> MovementLineInput {
        MovementLineInput {
            item_id: Uuid::new_v4(),
            quantity,
        }
    }

    #[test]
    fn rejects_empty_movement() {
        let input = ingress(Uuid::new_v4());
        assert_eq!(
            validate_movement_input(&input, &[]),
            Err(MovementValidationError::EmptyMovement)
        );
    }

    #[test]
    fn rejects_non_positive_quantities() {
        let input = ingress(Uuid::new_v4());
        assert_eq!(
            validate_movement_input(&input, &[line(dec!(0))]),
            Err(MovementValidationError::InvalidLine)
        );
        assert_eq!(
            validate_movement_input(&input, &[line(dec!(-3))]),
            Err(MovementValidationError::InvalidLine)
        );
    }

    #[test]
    fn rejects_nil_item_id() {
        let input = ingress(Uuid::new_v4());
        let bad = MovementLineInput {
            item_id: Uuid::nil(),
            quantity: dec!(1),
        };
        assert_eq!(
            validate_movement_input(&input, &[bad]),
            Err(MovementValidationError::InvalidLine)
        );
    }

    #[test]
    fn ingress_requires_destination() {
        let input = MovementInput {
            destination_warehouse_id: None,
            ..ingress(Uuid::new_v4())
        };
        assert_eq!(
            validate_movement_input(&input, &[line(dec!(1))]),
            Err(MovementValidationError::MissingDestination)
        );
    }

    #[test]
    fn egress_requires_origin() {
        let input = MovementInput {
            origin_warehouse_id: None,
            ..egress(Uuid::new_v4())
        };
        assert_eq!(
            validate_movement_input(&input, &[line(dec!(1))]),
            Err(MovementValidationError::MissingOrigin)
        );
    }

    #[test]
    fn transfer_requires_both_endpoints() {
        let input = MovementInput {
            destination_warehouse_id: None,
            ..transfer(Uuid::new_v4(), Uuid::new_v4())
        };
        assert_eq!(
            validate_movement_input(&input, &[line(dec!(1))]),
            Err(MovementValidationError::MissingEndpoint)
        );
    }

    #[test]
    fn transfer_rejects_same_warehouse() {
        let warehouse = Uuid::new_v4();
        let input = transfer(warehouse, warehouse);
        assert_eq!(
            validate_movement_input(&input, &[line(dec!(1))]),
            Err(MovementValidationError::SameWarehouseTransfer)
        );
    }

    #[test]
    fn adjustment_requires_direction() {
        let input = adjustment(Uuid::new_v4(), None);
        assert_eq!(
            validate_movement_input(&input, &[line(dec!(1))]),
            Err(MovementValidationError::MissingDirection)
        );
    }

    #[test]
    fn ingress_produces_positive_delta_at_destination() {
        let destination = Uuid::new_v4();
        let input = ingress(destination);
        let lines = vec![line(dec!(120))];

        let deltas = compute_stock_deltas(&input, &lines).unwrap();
        assert_eq!(deltas.len(), 1);
        assert_eq!(deltas[0].warehouse_id, destination);
        assert_eq!(deltas[0].delta, dec!(120));
    }

    #[test]
    fn egress_produces_negative_delta_at_origin() {
        let origin = Uuid::new_v4();
        let input = egress(origin);
        let lines = vec![line(dec!(7.5))];

        let deltas = compute_stock_deltas(&input, &lines).unwrap();
        assert_eq!(deltas.len(), 1);
        assert_eq!(deltas[0].warehouse_id, origin);
        assert_eq!(deltas[0].delta, dec!(-7.5));
    }

    #[test]
    fn transfer_emits_origin_debit_before_destination_credit() {
        let origin = Uuid::new_v4();
        let destination = Uuid::new_v4();
        let input = transfer(origin, destination);
        let lines = vec![line(dec!(40))];

        let deltas = compute_stock_deltas(&input, &lines).unwrap();
        assert_eq!(deltas.len(), 2);
        assert_eq!(deltas[0].warehouse_id, origin);
        assert_eq!(deltas[0].delta, dec!(-40));
        assert_eq!(deltas[1].warehouse_id, destination);
        assert_eq!(deltas[1].delta, dec!(40));
        assert_eq!(deltas[0].item_id, deltas[1].item_id);
    }

    #[test]
    fn adjustment_sign_follows_direction() {
        let origin = Uuid::new_v4();
        let lines = vec![line(dec!(12))];

        let increase = adjustment(origin, Some(AdjustmentDirection::Increase));
        let deltas = compute_stock_deltas(&increase, &lines).unwrap();
        assert_eq!(deltas[0].delta, dec!(12));

        let decrease = adjustment(origin, Some(AdjustmentDirection::Decrease));
        let deltas = compute_stock_deltas(&decrease, &lines).unwrap();
        assert_eq!(deltas[0].delta, dec!(-12));
    }

    #[test]
    fn quantities_normalize_to_three_decimal_places() {
        let input = ingress(Uuid::new_v4());
        let lines = vec![line(dec!(1.23456))];

        let deltas = compute_stock_deltas(&input, &lines).unwrap();
        assert_eq!(deltas[0].delta, dec!(1.235));
    }

    #[test]
    fn line_order_is_preserved() {
        let destination = Uuid::new_v4();
        let input = ingress(destination);
        let first = line(dec!(1));
        let second = line(dec!(2));
        let lines = vec![first.clone(), second.clone()];

        let deltas = compute_stock_deltas(&input, &lines).unwrap();
        assert_eq!(deltas[0].item_id, first.item_id);
        assert_eq!(deltas[1].item_id, second.item_id);
    }

    #[test]
    fn balance_lookup_takes_a_row_lock_on_postgres() {
        use sea_orm::{DbBackend, QueryTrait};

        let delta = StockDelta {
            item_id: Uuid::new_v4(),
            warehouse_id: Uuid::new_v4(),
            location_id: None,
            delta: dec!(1),
        };

        // Two concurrent confirmations of the same key must serialize on the
        // row so neither checks the floor against a stale quantity.
        let postgres = balance_lookup(&delta).build(DbBackend::Postgres).to_string();
        assert!(postgres.ends_with("FOR UPDATE"), "{postgres}");
        assert!(postgres.contains("IS NULL"), "{postgres}");

        // SQLite has no FOR UPDATE; sea-query drops the clause there.
        let sqlite = balance_lookup(&delta).build(DbBackend::Sqlite).to_string();
        assert!(!sqlite.contains("FOR UPDATE"), "{sqlite}");
    }

    proptest! {
        #[test]
        fn transfer_deltas_net_to_zero_per_item(
            quantities in proptest::collection::vec(1u64..1_000_000u64, 1..8)
        ) {
            let origin = Uuid::new_v4();
            let destination = Uuid::new_v4();
            let input = transfer(origin, destination);
            let lines: Vec<MovementLineInput> = quantities
                .iter()
                .map(|q| MovementLineInput {
                    item_id: Uuid::new_v4(),
                    quantity: Decimal::from(*q) / Decimal::from(1000u64),
                })
                .collect();

            let deltas = compute_stock_deltas(&input, &lines).unwrap();

            for item_line in &lines {
                let net: Decimal = deltas
                    .iter()
                    .filter(|d| d.item_id == item_line.item_id)
                    .map(|d| d.delta)
                    .sum();
                prop_assert_eq!(net, Decimal::ZERO);
            }
        }
    }
}
