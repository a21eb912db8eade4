use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// The `items` catalog table.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "items")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    /// Unique catalog code (e.g. "OFC-001").
    #[sea_orm(unique)]
    pub code: String,

    pub name: String,

    pub description: Option<String>,

    /// Unit of measure code (e.g. "UN", "KG", "BOX").
    pub unit: String,

    pub category: Option<String>,

    pub default_warehouse_id: Option<Uuid>,

    #[sea_orm(column_type = "Decimal(Some((19, 2)))")]
    pub standard_cost: Decimal,

    pub active: bool,

    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::stock_balance::Entity")]
    StockBalance,
    #[sea_orm(has_many = "super::movement_line::Entity")]
    MovementLine,
    #[sea_orm(has_many = "super::item_warehouse_config::Entity")]
    ItemWarehouseConfig,
}

impl Related<super::stock_balance::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::StockBalance.def()
    }
}

impl Related<super::movement_line::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::MovementLine.def()
    }
}

impl Related<super::item_warehouse_config::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ItemWarehouseConfig.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
