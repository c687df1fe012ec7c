use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::domain::models::notification::NotificationIntent;

/// Closed status vocabulary. Transition legality lives here, not at call sites.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Pending,
    Accepted,
    Rejected,
    Cancelled,
    Completed,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Accepted => "accepted",
            BookingStatus::Rejected => "rejected",
            BookingStatus::Cancelled => "cancelled",
            BookingStatus::Completed => "completed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            BookingStatus::Rejected | BookingStatus::Cancelled | BookingStatus::Completed
        )
    }

    pub fn can_transition_to(self, next: BookingStatus) -> bool {
        matches!(
            (self, next),
            (BookingStatus::Pending, BookingStatus::Accepted)
                | (BookingStatus::Pending, BookingStatus::Rejected)
                | (BookingStatus::Pending, BookingStatus::Cancelled)
                | (BookingStatus::Accepted, BookingStatus::Completed)
                | (BookingStatus::Accepted, BookingStatus::Cancelled)
        )
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BookingStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(BookingStatus::Pending),
            "accepted" => Ok(BookingStatus::Accepted),
            "rejected" => Ok(BookingStatus::Rejected),
            "cancelled" => Ok(BookingStatus::Cancelled),
            "completed" => Ok(BookingStatus::Completed),
            other => Err(format!("unknown booking status '{other}'")),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Booking {
    pub id: String,
    pub car_id: String,
    pub renter_id: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub status: BookingStatus,
    pub rejection_reason: Option<String>,
    pub base_price: i64,
    pub insurance_amount: Option<i64>,
    pub platform_fee: Option<i64>,
    pub total_price: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

pub struct NewBookingParams {
    pub car_id: String,
    pub renter_id: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub base_price: i64,
    pub insurance_amount: Option<i64>,
    pub platform_fee: Option<i64>,
}

impl Booking {
    pub fn new(params: NewBookingParams) -> Self {
        let now = Utc::now();
        let mut booking = Self {
            id: Uuid::new_v4().to_string(),
            car_id: params.car_id,
            renter_id: params.renter_id,
            start_date: params.start_date,
            end_date: params.end_date,
            status: BookingStatus::Pending,
            rejection_reason: None,
            base_price: params.base_price,
            insurance_amount: params.insurance_amount,
            platform_fee: params.platform_fee,
            total_price: 0,
            created_at: now,
            updated_at: now,
        };
        booking.recompute_total();
        booking
    }

    /// `total_price = base_price + insurance_amount + platform_fee`, nulls as 0.
    pub fn recompute_total(&mut self) {
        self.total_price = self.base_price
            + self.insurance_amount.unwrap_or(0)
            + self.platform_fee.unwrap_or(0);
    }

    pub fn accept(&mut self) {
        self.status = BookingStatus::Accepted;
        self.rejection_reason = None;
        self.recompute_total();
        self.updated_at = Utc::now();
    }

    pub fn reject(&mut self, reason: String) {
        self.status = BookingStatus::Rejected;
        self.rejection_reason = Some(reason);
        self.updated_at = Utc::now();
    }

    pub fn cancel(&mut self) {
        self.status = BookingStatus::Cancelled;
        self.updated_at = Utc::now();
    }

    pub fn complete(&mut self) {
        self.status = BookingStatus::Completed;
        self.updated_at = Utc::now();
    }
}

/// An accepted booking's blocked calendar range.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct BookedPeriod {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

/// One row of a reconciliation sweep: the already-mutated booking, the status
/// it is transitioning from, and the intents that must commit with it.
pub struct SweepAction {
    pub booking: Booking,
    pub prev: BookingStatus,
    pub notifications: Vec<NotificationIntent>,
}
