use crate::domain::models::notification::NotificationIntent;
use crate::domain::ports::NotificationRepository;
use crate::error::AppError;
use async_trait::async_trait;
use sqlx::PgPool;

pub struct PostgresNotificationRepo {
    pool: PgPool,
}

impl PostgresNotificationRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl NotificationRepository for PostgresNotificationRepo {
    async fn list_by_booking(&self, booking_id: &str) -> Result<Vec<NotificationIntent>, AppError> {
        sqlx::query_as::<_, NotificationIntent>(
            "SELECT * FROM notifications WHERE booking_id = $1 ORDER BY created_at ASC",
        )
        .bind(booking_id)
        .fetch_all(&self.pool)
        .await
        .map_err(AppError::Database)
    }

    async fn list_for_receiver(&self, receiver_id: &str) -> Result<Vec<NotificationIntent>, AppError> {
        sqlx::query_as::<_, NotificationIntent>(
            "SELECT * FROM notifications WHERE receiver_id = $1 ORDER BY created_at ASC",
        )
        .bind(receiver_id)
        .fetch_all(&self.pool)
        .await
        .map_err(AppError::Database)
    }
}
