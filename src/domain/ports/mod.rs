use crate::config::ExpiryPolicy;
use crate::domain::models::{
    booking::{BookedPeriod, Booking, BookingStatus, SweepAction},
    car::Car,
    notification::NotificationIntent,
};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::NaiveDate;

#[async_trait]
pub trait CarRepository: Send + Sync {
    async fn create(&self, car: &Car) -> Result<Car, AppError>;
    async fn find_by_id(&self, id: &str) -> Result<Option<Car>, AppError>;
}

#[async_trait]
pub trait BookingRepository: Send + Sync {
    async fn create(&self, booking: &Booking) -> Result<Booking, AppError>;
    async fn find_by_id(&self, id: &str) -> Result<Option<Booking>, AppError>;
    async fn list_by_car(&self, car_id: &str) -> Result<Vec<Booking>, AppError>;

    /// Blocked calendar ranges: every accepted booking of the car.
    async fn list_accepted_periods(&self, car_id: &str) -> Result<Vec<BookedPeriod>, AppError>;
    /// Accepted ranges intersecting `[start, end]`, bounds inclusive. Must use
    /// the same predicate as the storage-layer exclusion rule.
    async fn list_accepted_overlapping(
        &self,
        car_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<BookedPeriod>, AppError>;

    async fn find_accepted_ended_before(&self, date: NaiveDate) -> Result<Vec<Booking>, AppError>;
    async fn find_pending_expired(
        &self,
        policy: ExpiryPolicy,
        date: NaiveDate,
    ) -> Result<Vec<Booking>, AppError>;

    /// Persists a single status transition together with its notification
    /// intents, atomically. The update is guarded on `prev`; a booking whose
    /// status changed underneath the caller yields `InvalidTransition`.
    async fn transition(
        &self,
        booking: &Booking,
        prev: BookingStatus,
        notifications: &[NotificationIntent],
    ) -> Result<Booking, AppError>;

    /// Applies a whole sweep in one all-or-nothing transaction. Rows whose
    /// guarded update no longer matches are skipped, not errors. Returns the
    /// number of rows transitioned.
    async fn apply_sweep(&self, actions: &[SweepAction]) -> Result<u64, AppError>;
}

#[async_trait]
pub trait NotificationRepository: Send + Sync {
    async fn list_by_booking(&self, booking_id: &str) -> Result<Vec<NotificationIntent>, AppError>;
    async fn list_for_receiver(&self, receiver_id: &str) -> Result<Vec<NotificationIntent>, AppError>;
}

/// Injectable source of the current calendar date so sweep boundary
/// conditions are testable without waiting on wall clocks.
pub trait Clock: Send + Sync {
    fn today(&self) -> NaiveDate;
}
