use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A host's vehicle. The core only needs its identity and owner: the car is
/// the join key for conflict detection and the host party for notifications.
#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct Car {
    pub id: String,
    pub host_id: String,
    pub created_at: DateTime<Utc>,
}

impl Car {
    pub fn new(host_id: String) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            host_id,
            created_at: Utc::now(),
        }
    }
}
