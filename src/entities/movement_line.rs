use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// The `movement_lines` table. Lines are ordered by `line_number` within one
/// movement and are immutable after creation.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "movement_lines")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    pub movement_id: Uuid,

    /// 1-based position within the movement.
    pub line_number: i32,

    pub item_id: Uuid,

    /// Always strictly positive; sign is derived from the movement type.
    #[sea_orm(column_type = "Decimal(Some((19, 3)))")]
    pub quantity: Decimal,

    #[sea_orm(column_type = "Decimal(Some((19, 2)))")]
    pub unit_cost: Option<Decimal>,

    #[sea_orm(column_type = "Decimal(Some((19, 2)))")]
    pub total_cost: Option<Decimal>,

    pub notes: Option<String>,

    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::movement::Entity",
        from = "Column::MovementId",
        to = "super::movement::Column::Id"
    )]
    Movement,
    #[sea_orm(
        belongs_to = "super::item::Entity",
        from = "Column::ItemId",
        to = "super::item::Column::Id"
    )]
    Item,
}

impl Related<super::movement::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Movement.def()
    }
}

impl Related<super::item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Item.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
