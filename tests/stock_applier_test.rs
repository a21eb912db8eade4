mod common;

use chrono::Utc;
use rust_decimal_macros::dec;
use sea_orm::{ActiveModelTrait, Set};
use uuid::Uuid;

use almacen_api::entities::stock_balance;
use almacen_api::errors::ServiceError;
use almacen_api::services::stock_engine::{apply_stock_deltas, StockDelta};

use common::setup;

fn delta(
    item_id: Uuid,
    warehouse_id: Uuid,
    location_id: Option<Uuid>,
    delta: rust_decimal::Decimal,
) -> StockDelta {
    StockDelta {
        item_id,
        warehouse_id,
        location_id,
        delta,
    }
}

#[tokio::test]
async fn first_delta_creates_the_balance_row() {
    let app = setup().await;
    let item = Uuid::new_v4();
    let wh = Uuid::new_v4();

    let updated = apply_stock_deltas(
        app.db.as_ref(),
        &[delta(item, wh, None, dec!(7.5))],
        false,
    )
    .await
    .unwrap();

    assert_eq!(updated.len(), 1);
    assert_eq!(updated[0].quantity, dec!(7.500));
    assert_eq!(updated[0].version, 1);
}

#[tokio::test]
async fn repeated_deltas_accumulate_and_bump_version() {
    let app = setup().await;
    let item = Uuid::new_v4();
    let wh = Uuid::new_v4();

    apply_stock_deltas(app.db.as_ref(), &[delta(item, wh, None, dec!(10))], false)
        .await
        .unwrap();
    let updated = apply_stock_deltas(
        app.db.as_ref(),
        &[delta(item, wh, None, dec!(-4))],
        false,
    )
    .await
    .unwrap();

    assert_eq!(updated[0].quantity, dec!(6.000));
    assert_eq!(updated[0].version, 2);
}

#[tokio::test]
async fn null_location_is_a_distinct_key() {
    let app = setup().await;
    let item = Uuid::new_v4();
    let wh = Uuid::new_v4();
    let loc = Uuid::new_v4();

    apply_stock_deltas(
        app.db.as_ref(),
        &[delta(item, wh, None, dec!(3)), delta(item, wh, Some(loc), dec!(5))],
        false,
    )
    .await
    .unwrap();

    // Draining the located row must not see the warehouse-level quantity.
    let err = apply_stock_deltas(
        app.db.as_ref(),
        &[delta(item, wh, Some(loc), dec!(-6))],
        false,
    )
    .await
    .unwrap_err();
    assert!(matches!(err, ServiceError::InsufficientStock(_)), "got {err:?}");

    let ok = apply_stock_deltas(
        app.db.as_ref(),
        &[delta(item, wh, Some(loc), dec!(-5))],
        false,
    )
    .await
    .unwrap();
    assert_eq!(ok[0].quantity, dec!(0.000));
}

#[tokio::test]
async fn duplicate_warehouse_level_balance_rows_are_rejected() {
    let app = setup().await;
    let item = Uuid::new_v4();
    let wh = Uuid::new_v4();

    let row = |quantity| stock_balance::ActiveModel {
        id: Set(Uuid::new_v4()),
        item_id: Set(item),
        warehouse_id: Set(wh),
        location_id: Set(None),
        quantity: Set(quantity),
        version: Set(1),
        created_at: Set(Utc::now()),
        updated_at: Set(Utc::now()),
    };

    row(dec!(3)).insert(app.db.as_ref()).await.unwrap();

    // A second first-touch insert on the same (item, warehouse, NULL) key
    // must hit the partial unique index instead of fragmenting the balance.
    let duplicate = row(dec!(5)).insert(app.db.as_ref()).await;
    assert!(duplicate.is_err());
}

#[tokio::test]
async fn zero_floor_is_reachable() {
    let app = setup().await;
    let item = Uuid::new_v4();
    let wh = Uuid::new_v4();

    apply_stock_deltas(app.db.as_ref(), &[delta(item, wh, None, dec!(5))], false)
        .await
        .unwrap();
    let updated = apply_stock_deltas(
        app.db.as_ref(),
        &[delta(item, wh, None, dec!(-5))],
        false,
    )
    .await
    .unwrap();
    assert_eq!(updated[0].quantity, dec!(0.000));
}
