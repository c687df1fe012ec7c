pub mod config;
pub mod domain;
pub mod error;
pub mod infra;
pub mod scheduler;
pub mod state;

use crate::config::Config;
use crate::infra::factory::bootstrap_state;
use crate::scheduler::SweepScheduler;
use std::sync::Arc;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

pub fn init_logging() -> WorkerGuard {
    let file_appender = tracing_appender::rolling::daily("./logs", "carshare-backend.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .json()
        .with_writer(non_blocking)
        .with_filter(EnvFilter::new("info,carshare_backend=debug"));

    let stdout_layer = tracing_subscriber::fmt::layer()
        .pretty()
        .with_target(false)
        .with_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()));

    tracing_subscriber::registry()
        .with(stdout_layer)
        .with(file_layer)
        .init();

    info!("Logging initialized. Writing JSON logs to ./logs/");
    guard
}

pub async fn run() {
    let _guard = init_logging();

    let config = Config::from_env();
    let state = bootstrap_state(&config).await;
    let state_arc = Arc::new(state);

    let scheduler = SweepScheduler::start(state_arc);

    info!("🚀 Reconciliation scheduler running (Ctrl-C to stop)");
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to listen for Ctrl-C");

    scheduler.stop().await;
    info!("Shutdown complete");
}
