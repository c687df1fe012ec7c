use crate::domain::models::notification::NotificationIntent;
use crate::domain::ports::NotificationRepository;
use crate::error::AppError;
use async_trait::async_trait;
use sqlx::SqlitePool;

/// Read side of the notifications table. Writes happen inside booking
/// transactions; see the booking repository.
pub struct SqliteNotificationRepo {
    pool: SqlitePool,
}

impl SqliteNotificationRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl NotificationRepository for SqliteNotificationRepo {
    async fn list_by_booking(&self, booking_id: &str) -> Result<Vec<NotificationIntent>, AppError> {
        sqlx::query_as::<_, NotificationIntent>(
            "SELECT * FROM notifications WHERE booking_id = ? ORDER BY created_at ASC",
        )
        .bind(booking_id)
        .fetch_all(&self.pool)
        .await
        .map_err(AppError::Database)
    }

    async fn list_for_receiver(&self, receiver_id: &str) -> Result<Vec<NotificationIntent>, AppError> {
        sqlx::query_as::<_, NotificationIntent>(
            "SELECT * FROM notifications WHERE receiver_id = ? ORDER BY created_at ASC",
        )
        .bind(receiver_id)
        .fetch_all(&self.pool)
        .await
        .map_err(AppError::Database)
    }
}
