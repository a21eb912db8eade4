use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{debug, info};
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct EventSender {
    sender: mpsc::Sender<Event>,
}

impl EventSender {
    /// Creates a new EventSender
    pub fn new(sender: mpsc::Sender<Event>) -> Self {
        Self { sender }
    }

    /// Sends an event asynchronously
    pub async fn send(&self, event: Event) -> Result<(), String> {
        self.sender
            .send(event)
            .await
            .map_err(|e| format!("Failed to send event: {}", e))
    }
}

// Define the various events that can occur in the system.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    // Movement lifecycle events
    MovementCreated(Uuid),
    MovementConfirmed {
        movement_id: Uuid,
        approved_by: Uuid,
    },
    MovementCanceled {
        movement_id: Uuid,
        user_id: Uuid,
    },

    // Balance events, one per stock key a confirmation touched
    StockBalanceChanged {
        item_id: Uuid,
        warehouse_id: Uuid,
        location_id: Option<Uuid>,
        new_quantity: Decimal,
    },

    // Alerting events
    AlertsRecomputed {
        alerts: usize,
        persisted: bool,
    },

    // Generic event data
    Generic {
        message: String,
        timestamp: DateTime<Utc>,
        metadata: serde_json::Value,
    },
}

// Function to process incoming events. The consumer is intentionally thin:
// it logs the event stream so downstream integrations have a single place to
// hook into.
pub async fn process_events(mut rx: mpsc::Receiver<Event>) {
    info!("Starting event processing loop");

    while let Some(event) = rx.recv().await {
        match &event {
            Event::MovementCreated(movement_id) => {
                info!(movement_id = %movement_id, "Movement created");
            }
            Event::MovementConfirmed {
                movement_id,
                approved_by,
            } => {
                info!(movement_id = %movement_id, approved_by = %approved_by, "Movement confirmed");
            }
            Event::MovementCanceled {
                movement_id,
                user_id,
            } => {
                info!(movement_id = %movement_id, user_id = %user_id, "Movement canceled");
            }
            Event::StockBalanceChanged {
                item_id,
                warehouse_id,
                location_id,
                new_quantity,
            } => {
                debug!(
                    item_id = %item_id,
                    warehouse_id = %warehouse_id,
                    location_id = ?location_id,
                    new_quantity = %new_quantity,
                    "Stock balance changed"
                );
            }
            Event::AlertsRecomputed { alerts, persisted } => {
                info!(alerts = alerts, persisted = persisted, "Alerts recomputed");
            }
            Event::Generic { message, .. } => {
                debug!(message = %message, "Generic event");
            }
        }
    }

    info!("Event processing loop stopped");
}
