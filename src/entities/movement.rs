use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Enum representing the kind of stock movement.
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
pub enum MovementType {
    #[sea_orm(string_value = "INGRESS")]
    Ingress,
    #[sea_orm(string_value = "EGRESS")]
    Egress,
    #[sea_orm(string_value = "TRANSFER")]
    Transfer,
    #[sea_orm(string_value = "ADJUSTMENT")]
    Adjustment,
}

/// Enum representing the lifecycle status of a movement as stored.
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
pub enum MovementStatus {
    #[sea_orm(string_value = "DRAFT")]
    Draft,
    #[sea_orm(string_value = "CONFIRMED")]
    Confirmed,
    #[sea_orm(string_value = "CANCELED")]
    Canceled,
}

/// Sign of an ADJUSTMENT movement.
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
pub enum AdjustmentDirection {
    #[sea_orm(string_value = "INCREASE")]
    Increase,
    #[sea_orm(string_value = "DECREASE")]
    Decrease,
}

/// The `movements` ledger table (header row; quantities live on the lines).
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "movements")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    /// Optional human-facing document code.
    pub code: Option<String>,

    pub movement_type: MovementType,

    pub status: MovementStatus,

    /// Required when `movement_type` is ADJUSTMENT.
    pub adjustment_direction: Option<AdjustmentDirection>,

    pub origin_warehouse_id: Option<Uuid>,
    pub origin_location_id: Option<Uuid>,
    pub destination_warehouse_id: Option<Uuid>,
    pub destination_location_id: Option<Uuid>,

    pub reference: Option<String>,
    pub reason: Option<String>,

    pub created_by: Uuid,
    pub approved_by: Option<Uuid>,

    pub created_at: DateTimeUtc,
    pub confirmed_at: Option<DateTimeUtc>,
    pub canceled_at: Option<DateTimeUtc>,
}

/// Closed view of the movement lifecycle so transitions can be matched
/// exhaustively instead of comparing status strings and nullable columns.
#[derive(Clone, Debug, PartialEq)]
pub enum MovementState {
    Draft,
    Confirmed {
        approved_by: Option<Uuid>,
        confirmed_at: Option<DateTime<Utc>>,
    },
    Canceled {
        canceled_at: Option<DateTime<Utc>>,
        reason: Option<String>,
    },
}

impl Model {
    pub fn state(&self) -> MovementState {
        match self.status {
            MovementStatus::Draft => MovementState::Draft,
            MovementStatus::Confirmed => MovementState::Confirmed {
                approved_by: self.approved_by,
                confirmed_at: self.confirmed_at,
            },
            MovementStatus::Canceled => MovementState::Canceled {
                canceled_at: self.canceled_at,
                reason: self.reason.clone(),
            },
        }
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::movement_line::Entity")]
    MovementLine,
}

impl Related<super::movement_line::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::MovementLine.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
