//! Audit trail sink. `record` is generic over the connection so callers can
//! write the audit row inside the same transaction as the state change it
//! describes.

use crate::{entities::audit_log, errors::ServiceError};
use chrono::Utc;
use sea_orm::{ActiveModelTrait, ConnectionTrait, Set};
use serde::Serialize;
use uuid::Uuid;

/// Operation being audited.
#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum AuditAction {
    Create,
    Confirm,
    Cancel,
}

/// One audit trail entry, before persistence.
#[derive(Clone, Debug)]
pub struct AuditEntry {
    pub entity_type: String,
    pub entity_id: Uuid,
    pub action: AuditAction,
    pub data_before: Option<serde_json::Value>,
    pub data_after: Option<serde_json::Value>,
    pub user_id: Option<Uuid>,
}

impl AuditEntry {
    pub fn for_movement(movement_id: Uuid, action: AuditAction) -> Self {
        Self {
            entity_type: "movement".to_string(),
            entity_id: movement_id,
            action,
            data_before: None,
            data_after: None,
            user_id: None,
        }
    }

    pub fn before<T: Serialize>(mut self, value: &T) -> Self {
        self.data_before = serde_json::to_value(value).ok();
        self
    }

    pub fn after<T: Serialize>(mut self, value: &T) -> Self {
        self.data_after = serde_json::to_value(value).ok();
        self
    }

    pub fn by(mut self, user_id: Uuid) -> Self {
        self.user_id = Some(user_id);
        self
    }
}

/// Persists one audit row on the given connection.
pub async fn record<C: ConnectionTrait>(
    conn: &C,
    entry: AuditEntry,
) -> Result<audit_log::Model, ServiceError> {
    let active = audit_log::ActiveModel {
        id: Set(Uuid::new_v4()),
        entity_type: Set(entry.entity_type),
        entity_id: Set(entry.entity_id),
        action: Set(entry.action.to_string()),
        data_before: Set(entry.data_before),
        data_after: Set(entry.data_after),
        user_id: Set(entry.user_id),
        created_at: Set(Utc::now()),
    };

    active.insert(conn).await.map_err(ServiceError::db_error)
}
