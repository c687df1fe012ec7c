use std::env;
use std::time::Duration;

/// Which date the expiry sweep compares against the current day when deciding
/// that a pending request has lapsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpiryPolicy {
    /// The requested period itself is fully in the past (primary policy).
    EndDate,
    /// The requested start has already passed (alternate sweep policy).
    StartDate,
}

impl ExpiryPolicy {
    pub fn from_env_value(value: &str) -> Self {
        match value {
            "start_date" => ExpiryPolicy::StartDate,
            _ => ExpiryPolicy::EndDate,
        }
    }
}

#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    pub completion_sweep_interval: Duration,
    pub expiry_sweep_interval: Duration,
    pub sweep_timeout: Duration,
    pub expiry_policy: ExpiryPolicy,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            database_url: env::var("DATABASE_URL").expect("DATABASE_URL must be set"),
            completion_sweep_interval: Duration::from_secs(
                env::var("COMPLETION_SWEEP_SECS").unwrap_or_else(|_| "60".to_string())
                    .parse().expect("COMPLETION_SWEEP_SECS must be a number"),
            ),
            expiry_sweep_interval: Duration::from_secs(
                env::var("EXPIRY_SWEEP_SECS").unwrap_or_else(|_| "180".to_string())
                    .parse().expect("EXPIRY_SWEEP_SECS must be a number"),
            ),
            sweep_timeout: Duration::from_secs(
                env::var("SWEEP_TIMEOUT_SECS").unwrap_or_else(|_| "30".to_string())
                    .parse().expect("SWEEP_TIMEOUT_SECS must be a number"),
            ),
            expiry_policy: ExpiryPolicy::from_env_value(
                &env::var("EXPIRY_POLICY").unwrap_or_else(|_| "end_date".to_string()),
            ),
        }
    }
}
