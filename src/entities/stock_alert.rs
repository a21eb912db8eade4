use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Severity of a reorder alert. BELOW_MIN wins over BELOW_REORDER when both
/// thresholds are crossed.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    EnumIter,
    DeriveActiveEnum,
    Serialize,
    Deserialize,
    strum::Display,
    utoipa::ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum AlertType {
    #[sea_orm(string_value = "BELOW_MIN")]
    BelowMin,
    #[sea_orm(string_value = "BELOW_REORDER")]
    BelowReorder,
}

/// The `stock_alerts` table. Holds the latest persisted recompute; the whole
/// set is replaced on each persisted run.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "stock_alerts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    pub item_id: Uuid,

    pub warehouse_id: Uuid,

    pub alert_type: AlertType,

    /// Aggregated quantity across all locations of the warehouse.
    #[sea_orm(column_type = "Decimal(Some((19, 3)))")]
    pub quantity: Decimal,

    #[sea_orm(column_type = "Decimal(Some((19, 3)))")]
    pub min_stock: Decimal,

    #[sea_orm(column_type = "Decimal(Some((19, 3)))")]
    pub reorder_point: Decimal,

    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::item::Entity",
        from = "Column::ItemId",
        to = "super::item::Column::Id"
    )]
    Item,
    #[sea_orm(
        belongs_to = "super::warehouse::Entity",
        from = "Column::WarehouseId",
        to = "super::warehouse::Column::Id"
    )]
    Warehouse,
}

impl Related<super::item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Item.def()
    }
}

impl Related<super::warehouse::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Warehouse.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
