use std::sync::Arc;

use crate::config::Config;
use crate::domain::ports::{BookingRepository, CarRepository, Clock, NotificationRepository};

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub car_repo: Arc<dyn CarRepository>,
    pub booking_repo: Arc<dyn BookingRepository>,
    pub notification_repo: Arc<dyn NotificationRepository>,
    pub clock: Arc<dyn Clock>,
}
