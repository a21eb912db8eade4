mod common;

use rust_decimal_macros::dec;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder};
use uuid::Uuid;

use almacen_api::entities::movement::{AdjustmentDirection, MovementStatus, MovementType};
use almacen_api::entities::{audit_log, stock_balance};
use almacen_api::errors::ServiceError;
use almacen_api::services::movements::{NewMovement, NewMovementLine, StockFilters};

use common::{seed_item, seed_location, seed_warehouse, setup, setup_with};

fn ingress(
    destination_warehouse_id: Uuid,
    destination_location_id: Option<Uuid>,
    lines: Vec<NewMovementLine>,
    created_by: Uuid,
) -> NewMovement {
    NewMovement {
        code: None,
        movement_type: MovementType::Ingress,
        adjustment_direction: None,
        origin_warehouse_id: None,
        origin_location_id: None,
        destination_warehouse_id: Some(destination_warehouse_id),
        destination_location_id,
        reference: None,
        reason: None,
        created_by,
        lines,
    }
}

fn egress(
    origin_warehouse_id: Uuid,
    origin_location_id: Option<Uuid>,
    lines: Vec<NewMovementLine>,
    created_by: Uuid,
) -> NewMovement {
    NewMovement {
        code: None,
        movement_type: MovementType::Egress,
        adjustment_direction: None,
        origin_warehouse_id: Some(origin_warehouse_id),
        origin_location_id,
        destination_warehouse_id: None,
        destination_location_id: None,
        reference: None,
        reason: None,
        created_by,
        lines,
    }
}

fn line(item_id: Uuid, quantity: rust_decimal::Decimal) -> NewMovementLine {
    NewMovementLine {
        item_id,
        quantity,
        unit_cost: None,
        notes: None,
    }
}

async fn balance_of(
    app: &common::TestApp,
    item_id: Uuid,
    warehouse_id: Uuid,
    location_id: Option<Uuid>,
) -> Option<stock_balance::Model> {
    app.movements
        .list_stock_balances(StockFilters {
            item_id: Some(item_id),
            warehouse_id: Some(warehouse_id),
            location_id,
        })
        .await
        .unwrap()
        .into_iter()
        .next()
}

#[tokio::test]
async fn confirmed_ingress_creates_balance() {
    let app = setup().await;
    let user = Uuid::new_v4();
    let item = seed_item(&app.db, "OFC-001").await;
    let wh = seed_warehouse(&app.db, "WH-CEN").await;
    let loc = seed_location(&app.db, wh.id, "A1").await;

    let draft = app
        .movements
        .create_movement(ingress(wh.id, Some(loc.id), vec![line(item.id, dec!(120))], user))
        .await
        .unwrap();
    assert_eq!(draft.movement.status, MovementStatus::Draft);

    let confirmed = app
        .movements
        .confirm_movement(draft.movement.id, user)
        .await
        .unwrap();
    assert_eq!(confirmed.movement.status, MovementStatus::Confirmed);
    assert_eq!(confirmed.movement.approved_by, Some(user));
    assert!(confirmed.movement.confirmed_at.is_some());

    let balance = balance_of(&app, item.id, wh.id, Some(loc.id))
        .await
        .unwrap_or_else(|| panic!("balance row missing after confirm"));
    assert_eq!(balance.quantity, dec!(120.000));
    assert_eq!(balance.version, 1);
}

#[tokio::test]
async fn confirmed_transfer_moves_stock_between_warehouses() {
    let app = setup().await;
    let user = Uuid::new_v4();
    let item = seed_item(&app.db, "OFC-001").await;
    let central = seed_warehouse(&app.db, "WH-CEN").await;
    let central_a1 = seed_location(&app.db, central.id, "A1").await;
    let north = seed_warehouse(&app.db, "WH-NOR").await;
    let north_a1 = seed_location(&app.db, north.id, "A1").await;

    let seed = app
        .movements
        .create_movement(ingress(
            central.id,
            Some(central_a1.id),
            vec![line(item.id, dec!(120))],
            user,
        ))
        .await
        .unwrap();
    app.movements.confirm_movement(seed.movement.id, user).await.unwrap();

    let transfer = app
        .movements
        .create_movement(NewMovement {
            code: None,
            movement_type: MovementType::Transfer,
            adjustment_direction: None,
            origin_warehouse_id: Some(central.id),
            origin_location_id: Some(central_a1.id),
            destination_warehouse_id: Some(north.id),
            destination_location_id: Some(north_a1.id),
            reference: None,
            reason: None,
            created_by: user,
            lines: vec![line(item.id, dec!(40))],
        })
        .await
        .unwrap();
    app.movements
        .confirm_movement(transfer.movement.id, user)
        .await
        .unwrap();

    let origin = balance_of(&app, item.id, central.id, Some(central_a1.id))
        .await
        .unwrap();
    let destination = balance_of(&app, item.id, north.id, Some(north_a1.id))
        .await
        .unwrap();
    assert_eq!(origin.quantity, dec!(80.000));
    assert_eq!(origin.version, 2);
    assert_eq!(destination.quantity, dec!(40.000));
}

#[tokio::test]
async fn canceled_draft_cannot_be_confirmed() {
    let app = setup().await;
    let user = Uuid::new_v4();
    let item = seed_item(&app.db, "OFC-001").await;
    let wh = seed_warehouse(&app.db, "WH-CEN").await;

    let draft = app
        .movements
        .create_movement(ingress(wh.id, None, vec![line(item.id, dec!(10))], user))
        .await
        .unwrap();

    let canceled = app
        .movements
        .cancel_movement(draft.movement.id, user, Some("duplicate entry".to_string()))
        .await
        .unwrap();
    assert_eq!(canceled.status, MovementStatus::Canceled);
    assert!(canceled.canceled_at.is_some());

    let err = app
        .movements
        .confirm_movement(draft.movement.id, user)
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::InvalidTransition(_)), "got {err:?}");

    // The cancellation must not have touched stock.
    assert!(balance_of(&app, item.id, wh.id, None).await.is_none());
}

#[tokio::test]
async fn confirmed_movement_cannot_be_canceled() {
    let app = setup().await;
    let user = Uuid::new_v4();
    let item = seed_item(&app.db, "OFC-001").await;
    let wh = seed_warehouse(&app.db, "WH-CEN").await;

    let draft = app
        .movements
        .create_movement(ingress(wh.id, None, vec![line(item.id, dec!(10))], user))
        .await
        .unwrap();
    app.movements.confirm_movement(draft.movement.id, user).await.unwrap();

    let err = app
        .movements
        .cancel_movement(draft.movement.id, user, None)
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::ConfirmedImmutable(_)), "got {err:?}");
}

#[tokio::test]
async fn canceling_twice_reports_already_canceled() {
    let app = setup().await;
    let user = Uuid::new_v4();
    let item = seed_item(&app.db, "OFC-001").await;
    let wh = seed_warehouse(&app.db, "WH-CEN").await;

    let draft = app
        .movements
        .create_movement(ingress(wh.id, None, vec![line(item.id, dec!(10))], user))
        .await
        .unwrap();
    app.movements
        .cancel_movement(draft.movement.id, user, None)
        .await
        .unwrap();

    let err = app
        .movements
        .cancel_movement(draft.movement.id, user, None)
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::AlreadyCanceled(_)), "got {err:?}");
}

#[tokio::test]
async fn double_confirm_is_rejected() {
    let app = setup().await;
    let user = Uuid::new_v4();
    let item = seed_item(&app.db, "OFC-001").await;
    let wh = seed_warehouse(&app.db, "WH-CEN").await;

    let draft = app
        .movements
        .create_movement(ingress(wh.id, None, vec![line(item.id, dec!(50))], user))
        .await
        .unwrap();
    app.movements.confirm_movement(draft.movement.id, user).await.unwrap();

    let err = app
        .movements
        .confirm_movement(draft.movement.id, user)
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::InvalidTransition(_)), "got {err:?}");

    // Deltas must not have been applied a second time.
    let balance = balance_of(&app, item.id, wh.id, None).await.unwrap();
    assert_eq!(balance.quantity, dec!(50.000));
    assert_eq!(balance.version, 1);
}

#[tokio::test]
async fn insufficient_stock_rolls_back_confirmation() {
    let app = setup().await;
    let user = Uuid::new_v4();
    let item = seed_item(&app.db, "OFC-001").await;
    let wh = seed_warehouse(&app.db, "WH-CEN").await;

    let seed = app
        .movements
        .create_movement(ingress(wh.id, None, vec![line(item.id, dec!(5))], user))
        .await
        .unwrap();
    app.movements.confirm_movement(seed.movement.id, user).await.unwrap();

    let draft = app
        .movements
        .create_movement(egress(wh.id, None, vec![line(item.id, dec!(10))], user))
        .await
        .unwrap();
    let err = app
        .movements
        .confirm_movement(draft.movement.id, user)
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::InsufficientStock(_)), "got {err:?}");

    // Whole transaction rolled back: balance untouched, movement still draft.
    let balance = balance_of(&app, item.id, wh.id, None).await.unwrap();
    assert_eq!(balance.quantity, dec!(5.000));
    let movement = app.movements.get_movement(draft.movement.id).await.unwrap();
    assert_eq!(movement.movement.status, MovementStatus::Draft);
}

#[tokio::test]
async fn negative_stock_allowed_when_configured() {
    let app = setup_with(true).await;
    let user = Uuid::new_v4();
    let item = seed_item(&app.db, "OFC-001").await;
    let wh = seed_warehouse(&app.db, "WH-CEN").await;

    let seed = app
        .movements
        .create_movement(ingress(wh.id, None, vec![line(item.id, dec!(5))], user))
        .await
        .unwrap();
    app.movements.confirm_movement(seed.movement.id, user).await.unwrap();

    let draft = app
        .movements
        .create_movement(egress(wh.id, None, vec![line(item.id, dec!(10))], user))
        .await
        .unwrap();
    app.movements.confirm_movement(draft.movement.id, user).await.unwrap();

    let balance = balance_of(&app, item.id, wh.id, None).await.unwrap();
    assert_eq!(balance.quantity, dec!(-5.000));
}

#[tokio::test]
async fn adjustment_requires_a_reason() {
    let app = setup().await;
    let user = Uuid::new_v4();
    let item = seed_item(&app.db, "OFC-001").await;
    let wh = seed_warehouse(&app.db, "WH-CEN").await;

    let err = app
        .movements
        .create_movement(NewMovement {
            code: None,
            movement_type: MovementType::Adjustment,
            adjustment_direction: Some(AdjustmentDirection::Decrease),
            origin_warehouse_id: Some(wh.id),
            origin_location_id: None,
            destination_warehouse_id: None,
            destination_location_id: None,
            reference: None,
            reason: None,
            created_by: user,
            lines: vec![line(item.id, dec!(1))],
        })
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::ValidationError(_)), "got {err:?}");
}

#[tokio::test]
async fn unit_cost_derives_rounded_line_totals() {
    let app = setup().await;
    let user = Uuid::new_v4();
    let item = seed_item(&app.db, "OFC-001").await;
    let wh = seed_warehouse(&app.db, "WH-CEN").await;

    let mut new = ingress(wh.id, None, vec![], user);
    new.lines.push(NewMovementLine {
        item_id: item.id,
        quantity: dec!(3),
        unit_cost: Some(dec!(1.333)),
        notes: None,
    });

    let created = app.movements.create_movement(new).await.unwrap();
    let stored = &created.lines[0];
    assert_eq!(stored.line_number, 1);
    // 3 * 1.333 = 3.999, rounded to cost scale.
    assert_eq!(stored.total_cost, Some(dec!(4.00)));
}

#[tokio::test]
async fn lifecycle_actions_leave_audit_trail() {
    let app = setup().await;
    let user = Uuid::new_v4();
    let item = seed_item(&app.db, "OFC-001").await;
    let wh = seed_warehouse(&app.db, "WH-CEN").await;

    let draft = app
        .movements
        .create_movement(ingress(wh.id, None, vec![line(item.id, dec!(10))], user))
        .await
        .unwrap();
    app.movements.confirm_movement(draft.movement.id, user).await.unwrap();

    let other = app
        .movements
        .create_movement(ingress(wh.id, None, vec![line(item.id, dec!(1))], user))
        .await
        .unwrap();
    app.movements
        .cancel_movement(other.movement.id, user, None)
        .await
        .unwrap();

    let entries = audit_log::Entity::find()
        .filter(audit_log::Column::EntityId.eq(draft.movement.id))
        .order_by_asc(audit_log::Column::CreatedAt)
        .all(app.db.as_ref())
        .await
        .unwrap();
    let actions: Vec<&str> = entries.iter().map(|e| e.action.as_str()).collect();
    assert_eq!(actions, vec!["create", "confirm"]);
    assert!(entries.iter().all(|e| e.entity_type == "movement"));
    assert!(entries.iter().all(|e| e.user_id == Some(user)));
    // Confirm records the draft it started from.
    assert!(entries[1].data_before.is_some());
    assert!(entries[1].data_after.is_some());

    let cancel_entries = audit_log::Entity::find()
        .filter(audit_log::Column::EntityId.eq(other.movement.id))
        .order_by_asc(audit_log::Column::CreatedAt)
        .all(app.db.as_ref())
        .await
        .unwrap();
    let cancel_actions: Vec<&str> = cancel_entries.iter().map(|e| e.action.as_str()).collect();
    assert_eq!(cancel_actions, vec!["create", "cancel"]);
}

#[tokio::test]
async fn list_movements_filters_and_paginates() {
    let app = setup().await;
    let user = Uuid::new_v4();
    let item = seed_item(&app.db, "OFC-001").await;
    let wh = seed_warehouse(&app.db, "WH-CEN").await;

    for _ in 0..3 {
        app.movements
            .create_movement(ingress(wh.id, None, vec![line(item.id, dec!(1))], user))
            .await
            .unwrap();
    }

    let (page, total) = app
        .movements
        .list_movements(
            almacen_api::services::movements::MovementFilters {
                movement_type: Some(MovementType::Ingress),
                warehouse_id: Some(wh.id),
                item_id: Some(item.id),
                ..Default::default()
            },
            0,
            2,
        )
        .await
        .unwrap();
    assert_eq!(total, 3);
    assert_eq!(page.len(), 2);

    let (empty, total_egress) = app
        .movements
        .list_movements(
            almacen_api::services::movements::MovementFilters {
                movement_type: Some(MovementType::Egress),
                ..Default::default()
            },
            0,
            10,
        )
        .await
        .unwrap();
    assert_eq!(total_egress, 0);
    assert!(empty.is_empty());
}

#[tokio::test]
async fn get_movement_reports_not_found() {
    let app = setup().await;
    let err = app.movements.get_movement(Uuid::new_v4()).await.unwrap_err();
    assert!(matches!(err, ServiceError::NotFound(_)), "got {err:?}");
}
