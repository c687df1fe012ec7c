use crate::config::ExpiryPolicy;
use crate::domain::models::booking::{BookedPeriod, Booking, BookingStatus, SweepAction};
use crate::domain::models::notification::NotificationIntent;
use crate::domain::ports::BookingRepository;
use crate::error::AppError;
use crate::infra::repositories::{rows_to_bookings, BookingRow};
use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::{PgPool, Postgres, Transaction};

pub struct PostgresBookingRepo {
    pool: PgPool,
}

impl PostgresBookingRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

async fn insert_notifications(
    tx: &mut Transaction<'_, Postgres>,
    notifications: &[NotificationIntent],
) -> Result<(), AppError> {
    for n in notifications {
        sqlx::query("INSERT INTO notifications (id, sender_id, receiver_id, booking_id, body, created_at) VALUES ($1, $2, $3, $4, $5, $6)")
            .bind(&n.id).bind(&n.sender_id).bind(&n.receiver_id).bind(&n.booking_id).bind(&n.body).bind(n.created_at)
            .execute(&mut **tx)
            .await
            .map_err(|e| AppError::NotificationFailure(e.to_string()))?;
    }
    Ok(())
}

#[async_trait]
impl BookingRepository for PostgresBookingRepo {
    async fn create(&self, booking: &Booking) -> Result<Booking, AppError> {
        let row = sqlx::query_as::<_, BookingRow>(
            "INSERT INTO bookings (id, car_id, renter_id, start_date, end_date, status, rejection_reason, base_price, insurance_amount, platform_fee, total_price, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
             RETURNING *"
        )
            .bind(&booking.id).bind(&booking.car_id).bind(&booking.renter_id)
            .bind(booking.start_date).bind(booking.end_date).bind(booking.status.as_str())
            .bind(&booking.rejection_reason).bind(booking.base_price).bind(booking.insurance_amount)
            .bind(booking.platform_fee).bind(booking.total_price)
            .bind(booking.created_at).bind(booking.updated_at)
            .fetch_one(&self.pool).await.map_err(AppError::from_booking_write)?;
        row.try_into()
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Booking>, AppError> {
        let row = sqlx::query_as::<_, BookingRow>("SELECT * FROM bookings WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)?;
        row.map(Booking::try_from).transpose()
    }

    async fn list_by_car(&self, car_id: &str) -> Result<Vec<Booking>, AppError> {
        let rows = sqlx::query_as::<_, BookingRow>(
            "SELECT * FROM bookings WHERE car_id = $1 ORDER BY start_date ASC",
        )
        .bind(car_id)
        .fetch_all(&self.pool)
        .await
        .map_err(AppError::Database)?;
        rows_to_bookings(rows)
    }

    async fn list_accepted_periods(&self, car_id: &str) -> Result<Vec<BookedPeriod>, AppError> {
        sqlx::query_as::<_, BookedPeriod>(
            "SELECT start_date, end_date FROM bookings WHERE car_id = $1 AND status = 'accepted' ORDER BY start_date ASC",
        )
        .bind(car_id)
        .fetch_all(&self.pool)
        .await
        .map_err(AppError::Database)
    }

    async fn list_accepted_overlapping(
        &self,
        car_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<BookedPeriod>, AppError> {
        sqlx::query_as::<_, BookedPeriod>(
            "SELECT start_date, end_date FROM bookings
             WHERE car_id = $1 AND status = 'accepted'
               AND NOT (end_date < $2 OR start_date > $3)
             ORDER BY start_date ASC",
        )
        .bind(car_id)
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await
        .map_err(AppError::Database)
    }

    async fn find_accepted_ended_before(&self, date: NaiveDate) -> Result<Vec<Booking>, AppError> {
        let rows = sqlx::query_as::<_, BookingRow>(
            "SELECT * FROM bookings WHERE status = 'accepted' AND end_date < $1 ORDER BY end_date ASC",
        )
        .bind(date)
        .fetch_all(&self.pool)
        .await
        .map_err(AppError::Database)?;
        rows_to_bookings(rows)
    }

    async fn find_pending_expired(
        &self,
        policy: ExpiryPolicy,
        date: NaiveDate,
    ) -> Result<Vec<Booking>, AppError> {
        let sql = match policy {
            ExpiryPolicy::EndDate => {
                "SELECT * FROM bookings WHERE status = 'pending' AND end_date < $1 ORDER BY end_date ASC"
            }
            ExpiryPolicy::StartDate => {
                "SELECT * FROM bookings WHERE status = 'pending' AND start_date < $1 ORDER BY start_date ASC"
            }
        };
        let rows = sqlx::query_as::<_, BookingRow>(sql)
            .bind(date)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)?;
        rows_to_bookings(rows)
    }

    async fn transition(
        &self,
        booking: &Booking,
        prev: BookingStatus,
        notifications: &[NotificationIntent],
    ) -> Result<Booking, AppError> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;

        let updated = sqlx::query_as::<_, BookingRow>(
            "UPDATE bookings SET status = $1, rejection_reason = $2, base_price = $3, insurance_amount = $4, platform_fee = $5, total_price = $6, updated_at = $7
             WHERE id = $8 AND status = $9
             RETURNING *"
        )
            .bind(booking.status.as_str()).bind(&booking.rejection_reason)
            .bind(booking.base_price).bind(booking.insurance_amount).bind(booking.platform_fee)
            .bind(booking.total_price).bind(booking.updated_at)
            .bind(&booking.id).bind(prev.as_str())
            .fetch_optional(&mut *tx).await.map_err(AppError::from_booking_write)?;

        let Some(updated) = updated else {
            return Err(AppError::InvalidTransition(format!(
                "Booking {} changed state concurrently",
                booking.id
            )));
        };

        insert_notifications(&mut tx, notifications).await?;
        tx.commit().await.map_err(AppError::Database)?;
        updated.try_into()
    }

    async fn apply_sweep(&self, actions: &[SweepAction]) -> Result<u64, AppError> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;
        let mut count = 0u64;

        for action in actions {
            let booking = &action.booking;
            let result = sqlx::query(
                "UPDATE bookings SET status = $1, rejection_reason = $2, updated_at = $3 WHERE id = $4 AND status = $5",
            )
                .bind(booking.status.as_str()).bind(&booking.rejection_reason).bind(booking.updated_at)
                .bind(&booking.id).bind(action.prev.as_str())
                .execute(&mut *tx).await.map_err(AppError::from_booking_write)?;

            if result.rows_affected() == 1 {
                insert_notifications(&mut tx, &action.notifications).await?;
                count += 1;
            }
        }

        tx.commit().await.map_err(AppError::Database)?;
        Ok(count)
    }
}
