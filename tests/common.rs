use carshare_backend::{
    config::{Config, ExpiryPolicy},
    domain::models::{booking::Booking, booking::NewBookingParams, car::Car},
    domain::ports::Clock,
    domain::services::booking_service::BookingService,
    infra::repositories::{
        sqlite_booking_repo::SqliteBookingRepo, sqlite_car_repo::SqliteCarRepo,
        sqlite_notification_repo::SqliteNotificationRepo,
    },
    state::AppState,
};
use chrono::NaiveDate;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Pool, Sqlite};
use std::str::FromStr;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use uuid::Uuid;

/// Settable clock so sweep boundary conditions can be pinned to a fixed date.
pub struct TestClock {
    today: Mutex<NaiveDate>,
}

#[allow(dead_code)]
impl TestClock {
    pub fn new(today: NaiveDate) -> Self {
        Self {
            today: Mutex::new(today),
        }
    }

    pub fn set(&self, today: NaiveDate) {
        *self.today.lock().unwrap() = today;
    }
}

impl Clock for TestClock {
    fn today(&self) -> NaiveDate {
        *self.today.lock().unwrap()
    }
}

pub fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

#[allow(dead_code)]
pub struct TestApp {
    pub pool: Pool<Sqlite>,
    pub db_filename: String,
    pub state: Arc<AppState>,
    pub service: BookingService,
    pub clock: Arc<TestClock>,
}

#[allow(dead_code)]
impl TestApp {
    pub async fn new() -> Self {
        Self::with_policy(ExpiryPolicy::EndDate).await
    }

    pub async fn with_policy(expiry_policy: ExpiryPolicy) -> Self {
        let db_filename = format!("test_{}.db", Uuid::new_v4());
        let db_url = format!("sqlite://{}?mode=rwc", db_filename);

        let connection_options = SqliteConnectOptions::from_str(&db_url)
            .unwrap()
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .connect_with(connection_options)
            .await
            .expect("Failed to connect to test db");

        sqlx::migrate!("./migrations/sqlite")
            .run(&pool)
            .await
            .expect("Failed to migrate test db");

        let config = Config {
            database_url: db_url,
            completion_sweep_interval: Duration::from_secs(60),
            expiry_sweep_interval: Duration::from_secs(180),
            sweep_timeout: Duration::from_secs(30),
            expiry_policy,
        };

        let clock = Arc::new(TestClock::new(date("2025-06-01")));

        let state = Arc::new(AppState {
            config,
            car_repo: Arc::new(SqliteCarRepo::new(pool.clone())),
            booking_repo: Arc::new(SqliteBookingRepo::new(pool.clone())),
            notification_repo: Arc::new(SqliteNotificationRepo::new(pool.clone())),
            clock: clock.clone(),
        });

        let service = BookingService::from_state(&state);

        Self {
            pool,
            db_filename,
            state,
            service,
            clock,
        }
    }

    pub async fn create_car(&self, host_id: &str) -> Car {
        self.state
            .car_repo
            .create(&Car::new(host_id.to_string()))
            .await
            .expect("Failed to create test car")
    }

    pub async fn create_request(&self, car: &Car, renter_id: &str, start: &str, end: &str) -> Booking {
        self.service
            .create_request(NewBookingParams {
                car_id: car.id.clone(),
                renter_id: renter_id.to_string(),
                start_date: date(start),
                end_date: date(end),
                base_price: 5000,
                insurance_amount: Some(700),
                platform_fee: Some(300),
            })
            .await
            .expect("Failed to create test booking request")
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.db_filename);
    }
}
