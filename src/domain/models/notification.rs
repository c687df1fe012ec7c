use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A message intent produced by a transition or sweep. The core persists these
/// in the same transaction as the state change; delivery belongs to an
/// external messaging collaborator.
#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct NotificationIntent {
    pub id: String,
    pub sender_id: String,
    pub receiver_id: String,
    pub booking_id: String,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

impl NotificationIntent {
    pub fn new(sender_id: String, receiver_id: String, booking_id: String, body: String) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            sender_id,
            receiver_id,
            booking_id,
            body,
            created_at: Utc::now(),
        }
    }
}
