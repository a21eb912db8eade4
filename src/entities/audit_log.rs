use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// The `audit_logs` table: one row per state-changing core operation, with
/// JSON before/after snapshots of the entity.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "audit_logs")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    /// Entity kind, e.g. "movement".
    pub entity_type: String,

    pub entity_id: Uuid,

    /// Operation name, e.g. "create", "confirm", "cancel".
    pub action: String,

    #[sea_orm(column_type = "Json")]
    pub data_before: Option<Json>,

    #[sea_orm(column_type = "Json")]
    pub data_after: Option<Json>,

    pub user_id: Option<Uuid>,

    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
