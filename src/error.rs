use thiserror::Error;
use tracing::error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("Resource not found: {0}")]
    NotFound(String),
    #[error("Invalid input: {0}")]
    Validation(String),
    #[error("Forbidden: {0}")]
    Forbidden(String),
    #[error("Invalid transition: {0}")]
    InvalidTransition(String),
    #[error("Booking conflict: {0}")]
    Conflict(String),
    #[error("Exclusion constraint rejected the write: {0}")]
    ConstraintViolation(String),
    #[error("Notification emission failed: {0}")]
    NotificationFailure(String),
}

impl AppError {
    /// Maps driver errors from booking writes. The accepted-overlap rule is
    /// enforced at the storage layer (Postgres exclusion constraint, SQLite
    /// trigger), so a violation here means a concurrent writer won the race.
    pub fn from_booking_write(e: sqlx::Error) -> Self {
        if let Some(db_err) = e.as_database_error() {
            let code = db_err.code().unwrap_or_default();

            // 23P01 = PostgreSQL exclusion_violation
            // SQLite triggers abort with the constraint tag in the message
            if code == "23P01" || db_err.message().contains("bookings_accepted_no_overlap") {
                return AppError::ConstraintViolation(
                    "another accepted booking overlaps this car and date range".to_string(),
                );
            }
        }

        error!("Booking write failed: {:?}", e);
        AppError::Database(e)
    }
}
