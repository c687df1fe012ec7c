//! Administrative trigger: runs the reconciliation sweeps once, on demand,
//! through the same service methods the scheduler uses.

use carshare_backend::config::Config;
use carshare_backend::domain::services::booking_service::BookingService;
use carshare_backend::infra::factory::bootstrap_state;
use tracing::{error, info};

#[tokio::main]
async fn main() {
    let _guard = carshare_backend::init_logging();

    let which = std::env::args().nth(1).unwrap_or_else(|| "all".to_string());
    if !matches!(which.as_str(), "completion" | "expiry" | "all") {
        eprintln!("usage: sweep [completion|expiry|all]");
        std::process::exit(2);
    }

    let config = Config::from_env();
    let state = bootstrap_state(&config).await;
    let service = BookingService::from_state(&state);

    let mut failed = false;

    if which == "completion" || which == "all" {
        match service.run_completion_sweep().await {
            Ok(outcome) => info!("Completion sweep done: {} booking(s) completed", outcome.count),
            Err(e) => {
                error!("Completion sweep failed: {:?}", e);
                failed = true;
            }
        }
    }

    if which == "expiry" || which == "all" {
        match service.run_expiry_sweep().await {
            Ok(outcome) => info!("Expiry sweep done: {} request(s) expired", outcome.count),
            Err(e) => {
                error!("Expiry sweep failed: {:?}", e);
                failed = true;
            }
        }
    }

    if failed {
        std::process::exit(1);
    }
}
