use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Enum representing the kind of warehouse.
#[derive(
    Clone, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, strum::Display,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum WarehouseType {
    #[sea_orm(string_value = "CENTRAL")]
    Central,
    #[sea_orm(string_value = "SATELLITE")]
    Satellite,
    #[sea_orm(string_value = "OTHER")]
    Other,
}

/// The `warehouses` table.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "warehouses")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    /// Unique warehouse code (e.g. "WH-CEN").
    #[sea_orm(unique)]
    pub code: String,

    pub name: String,

    pub warehouse_type: WarehouseType,

    pub address: Option<String>,

    pub contact: Option<String>,

    pub active: bool,

    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::warehouse_location::Entity")]
    WarehouseLocation,
    #[sea_orm(has_many = "super::stock_balance::Entity")]
    StockBalance,
    #[sea_orm(has_many = "super::item_warehouse_config::Entity")]
    ItemWarehouseConfig,
}

impl Related<super::warehouse_location::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::WarehouseLocation.def()
    }
}

impl Related<super::stock_balance::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::StockBalance.def()
    }
}

impl Related<super::item_warehouse_config::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ItemWarehouseConfig.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
