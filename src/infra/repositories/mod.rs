use chrono::{DateTime, NaiveDate, Utc};
use sqlx::FromRow;

use crate::domain::models::booking::Booking;
use crate::error::AppError;

pub mod sqlite_booking_repo;
pub mod sqlite_car_repo;
pub mod sqlite_notification_repo;

pub mod postgres_booking_repo;
pub mod postgres_car_repo;
pub mod postgres_notification_repo;

/// Raw booking row shared by both backends. Status is decoded as text and
/// parsed into the closed enum on the way out, so an out-of-vocabulary value
/// in storage surfaces as an error instead of a phantom state.
#[derive(FromRow)]
pub struct BookingRow {
    pub id: String,
    pub car_id: String,
    pub renter_id: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub status: String,
    pub rejection_reason: Option<String>,
    pub base_price: i64,
    pub insurance_amount: Option<i64>,
    pub platform_fee: Option<i64>,
    pub total_price: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<BookingRow> for Booking {
    type Error = AppError;

    fn try_from(row: BookingRow) -> Result<Self, AppError> {
        let status = row
            .status
            .parse()
            .map_err(|e: String| AppError::Validation(format!("booking {}: {}", row.id, e)))?;
        Ok(Booking {
            id: row.id,
            car_id: row.car_id,
            renter_id: row.renter_id,
            start_date: row.start_date,
            end_date: row.end_date,
            status,
            rejection_reason: row.rejection_reason,
            base_price: row.base_price,
            insurance_amount: row.insurance_amount,
            platform_fee: row.platform_fee,
            total_price: row.total_price,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

pub(crate) fn rows_to_bookings(rows: Vec<BookingRow>) -> Result<Vec<Booking>, AppError> {
    rows.into_iter().map(Booking::try_from).collect()
}
