use std::sync::Arc;

use chrono::NaiveDate;
use serde::Serialize;
use tracing::info;

use crate::config::ExpiryPolicy;
use crate::domain::models::booking::{
    BookedPeriod, Booking, BookingStatus, NewBookingParams, SweepAction,
};
use crate::domain::models::car::Car;
use crate::domain::models::notification::NotificationIntent;
use crate::domain::ports::{BookingRepository, CarRepository, Clock};
use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Accept,
    Reject,
}

#[derive(Debug, Serialize)]
pub struct Availability {
    pub available: bool,
    pub booked_periods: Vec<BookedPeriod>,
}

#[derive(Debug, Serialize)]
pub struct SweepOutcome {
    pub count: u64,
}

/// The booking lifecycle engine: availability reads, the decide/cancel state
/// machine, and the two reconciliation sweeps. Timer and admin invocations
/// both go through this type; there is no second copy of the sweep logic.
pub struct BookingService {
    bookings: Arc<dyn BookingRepository>,
    cars: Arc<dyn CarRepository>,
    clock: Arc<dyn Clock>,
    expiry_policy: ExpiryPolicy,
}

impl BookingService {
    pub fn new(
        bookings: Arc<dyn BookingRepository>,
        cars: Arc<dyn CarRepository>,
        clock: Arc<dyn Clock>,
        expiry_policy: ExpiryPolicy,
    ) -> Self {
        Self {
            bookings,
            cars,
            clock,
            expiry_policy,
        }
    }

    pub fn from_state(state: &AppState) -> Self {
        Self::new(
            state.booking_repo.clone(),
            state.car_repo.clone(),
            state.clock.clone(),
            state.config.expiry_policy,
        )
    }

    async fn car_or_not_found(&self, car_id: &str) -> Result<Car, AppError> {
        self.cars
            .find_by_id(car_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Car {} not found", car_id)))
    }

    pub async fn request_availability(
        &self,
        car_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Availability, AppError> {
        if start > end {
            return Err(AppError::Validation(
                "start_date must not be after end_date".into(),
            ));
        }
        self.car_or_not_found(car_id).await?;

        let overlapping = self
            .bookings
            .list_accepted_overlapping(car_id, start, end)
            .await?;
        let booked_periods = self.bookings.list_accepted_periods(car_id).await?;

        Ok(Availability {
            available: overlapping.is_empty(),
            booked_periods,
        })
    }

    /// Creates a booking request in `pending`. Overlapping pending requests
    /// for the same car are allowed; only acceptance is exclusive.
    pub async fn create_request(&self, params: NewBookingParams) -> Result<Booking, AppError> {
        if params.start_date > params.end_date {
            return Err(AppError::Validation(
                "start_date must not be after end_date".into(),
            ));
        }
        self.car_or_not_found(&params.car_id).await?;

        let booking = Booking::new(params);
        self.bookings.create(&booking).await
    }

    pub async fn decide(
        &self,
        booking_id: &str,
        decision: Decision,
        reason: Option<String>,
    ) -> Result<Booking, AppError> {
        let mut booking = self
            .bookings
            .find_by_id(booking_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Booking {} not found", booking_id)))?;

        let prev = booking.status;
        if prev.is_terminal() {
            return Err(AppError::InvalidTransition(format!(
                "Booking {} is already finalized as {}",
                booking.id, prev
            )));
        }

        let target = match decision {
            Decision::Accept => BookingStatus::Accepted,
            Decision::Reject => BookingStatus::Rejected,
        };
        if !prev.can_transition_to(target) {
            return Err(AppError::InvalidTransition(format!(
                "Booking {} cannot go from {} to {}",
                booking.id, prev, target
            )));
        }

        let car = self.car_or_not_found(&booking.car_id).await?;

        let notification = match decision {
            Decision::Accept => {
                // Proactive guard: fail with a clean conflict before issuing
                // the write the exclusion constraint would reject anyway.
                let conflicts = self
                    .bookings
                    .list_accepted_overlapping(&booking.car_id, booking.start_date, booking.end_date)
                    .await?;
                if let Some(window) = conflicts.first() {
                    return Err(AppError::Conflict(format!(
                        "Car {} is already booked from {} to {}",
                        booking.car_id, window.start_date, window.end_date
                    )));
                }

                booking.accept();
                NotificationIntent::new(
                    car.host_id.clone(),
                    booking.renter_id.clone(),
                    booking.id.clone(),
                    format!(
                        "Your booking request for {} to {} has been accepted.",
                        booking.start_date, booking.end_date
                    ),
                )
            }
            Decision::Reject => {
                let reason = reason
                    .unwrap_or_else(|| "Your booking request was declined by the host.".to_string());
                booking.reject(reason.clone());
                NotificationIntent::new(
                    car.host_id.clone(),
                    booking.renter_id.clone(),
                    booking.id.clone(),
                    format!(
                        "Your booking request for {} to {} was rejected: {}",
                        booking.start_date, booking.end_date, reason
                    ),
                )
            }
        };

        let saved = self
            .bookings
            .transition(&booking, prev, &[notification])
            .await?;
        info!("Booking {} decided: {} -> {}", saved.id, prev, saved.status);
        Ok(saved)
    }

    pub async fn cancel(&self, booking_id: &str, actor_id: &str) -> Result<Booking, AppError> {
        let mut booking = self
            .bookings
            .find_by_id(booking_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Booking {} not found", booking_id)))?;

        let prev = booking.status;
        if prev.is_terminal() {
            return Err(AppError::InvalidTransition(format!(
                "Booking {} is already finalized as {}",
                booking.id, prev
            )));
        }

        let car = self.car_or_not_found(&booking.car_id).await?;

        // Only the two parties of the rental may cancel; the counterparty is
        // the one who gets told.
        let (sender, receiver) = if actor_id == booking.renter_id {
            (booking.renter_id.clone(), car.host_id.clone())
        } else if actor_id == car.host_id {
            (car.host_id.clone(), booking.renter_id.clone())
        } else {
            return Err(AppError::Forbidden(format!(
                "Actor {} is neither the renter nor the host of booking {}",
                actor_id, booking.id
            )));
        };

        booking.cancel();
        let notification = NotificationIntent::new(
            sender,
            receiver,
            booking.id.clone(),
            format!(
                "Booking for {} to {} has been cancelled.",
                booking.start_date, booking.end_date
            ),
        );

        let saved = self
            .bookings
            .transition(&booking, prev, &[notification])
            .await?;
        info!("Booking {} cancelled by {}", saved.id, actor_id);
        Ok(saved)
    }

    /// Auto-completes every accepted booking whose end date is strictly in the
    /// past. One notification per party, committed with the status changes.
    pub async fn run_completion_sweep(&self) -> Result<SweepOutcome, AppError> {
        let today = self.clock.today();
        let candidates = self.bookings.find_accepted_ended_before(today).await?;

        let mut actions = Vec::with_capacity(candidates.len());
        for mut booking in candidates {
            let car = self.car_or_not_found(&booking.car_id).await?;
            let prev = booking.status;
            booking.complete();

            let body = format!(
                "Rental of car {} from {} to {} is complete.",
                booking.car_id, booking.start_date, booking.end_date
            );
            let notifications = vec![
                NotificationIntent::new(
                    car.host_id.clone(),
                    booking.renter_id.clone(),
                    booking.id.clone(),
                    body.clone(),
                ),
                NotificationIntent::new(
                    booking.renter_id.clone(),
                    car.host_id.clone(),
                    booking.id.clone(),
                    body,
                ),
            ];
            actions.push(SweepAction {
                booking,
                prev,
                notifications,
            });
        }

        let count = self.bookings.apply_sweep(&actions).await?;
        if count > 0 {
            info!("Completion sweep transitioned {} booking(s)", count);
        }
        Ok(SweepOutcome { count })
    }

    /// Auto-rejects pending requests whose window has lapsed under the
    /// configured expiry policy.
    pub async fn run_expiry_sweep(&self) -> Result<SweepOutcome, AppError> {
        let today = self.clock.today();
        let candidates = self
            .bookings
            .find_pending_expired(self.expiry_policy, today)
            .await?;

        let mut actions = Vec::with_capacity(candidates.len());
        for mut booking in candidates {
            let car = self.car_or_not_found(&booking.car_id).await?;
            let prev = booking.status;
            let reason = format!(
                "Request expired automatically: the requested period ({} to {}) passed without a decision.",
                booking.start_date, booking.end_date
            );
            booking.reject(reason.clone());

            let notifications = vec![NotificationIntent::new(
                car.host_id.clone(),
                booking.renter_id.clone(),
                booking.id.clone(),
                reason,
            )];
            actions.push(SweepAction {
                booking,
                prev,
                notifications,
            });
        }

        let count = self.bookings.apply_sweep(&actions).await?;
        if count > 0 {
            info!("Expiry sweep rejected {} stale request(s)", count);
        }
        Ok(SweepOutcome { count })
    }
}
