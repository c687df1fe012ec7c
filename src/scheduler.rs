use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval, timeout, MissedTickBehavior};
use tracing::{error, info, info_span, warn, Instrument};

use crate::domain::services::booking_service::{BookingService, SweepOutcome};
use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Clone, Copy)]
enum SweepKind {
    Completion,
    Expiry,
}

impl SweepKind {
    fn name(&self) -> &'static str {
        match self {
            SweepKind::Completion => "completion_sweep",
            SweepKind::Expiry => "expiry_sweep",
        }
    }
}

/// Drives the two reconciliation sweeps on independent timers. Unlike a
/// boot-time interval that runs forever, this owns its tasks and can be
/// stopped, so tests and shutdown paths control exactly when sweeps happen.
pub struct SweepScheduler {
    shutdown: watch::Sender<bool>,
    handles: Vec<JoinHandle<()>>,
}

impl SweepScheduler {
    pub fn start(state: Arc<AppState>) -> Self {
        info!("Starting reconciliation scheduler...");
        let (shutdown, _) = watch::channel(false);

        let completion = spawn_sweep_loop(
            state.clone(),
            SweepKind::Completion,
            state.config.completion_sweep_interval,
            shutdown.subscribe(),
        );
        let expiry = spawn_sweep_loop(
            state.clone(),
            SweepKind::Expiry,
            state.config.expiry_sweep_interval,
            shutdown.subscribe(),
        );

        Self {
            shutdown,
            handles: vec![completion, expiry],
        }
    }

    pub async fn stop(self) {
        info!("Stopping reconciliation scheduler...");
        let _ = self.shutdown.send(true);
        for handle in self.handles {
            let _ = handle.await;
        }
    }
}

async fn run_sweep(service: &BookingService, kind: SweepKind) -> Result<SweepOutcome, AppError> {
    match kind {
        SweepKind::Completion => service.run_completion_sweep().await,
        SweepKind::Expiry => service.run_expiry_sweep().await,
    }
}

fn spawn_sweep_loop(
    state: Arc<AppState>,
    kind: SweepKind,
    period: Duration,
    mut shutdown: watch::Receiver<bool>,
) -> JoinHandle<()> {
    let sweep_timeout = state.config.sweep_timeout;

    tokio::spawn(async move {
        let service = BookingService::from_state(&state);
        let mut ticker = interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let span = info_span!("sweep", sweep = kind.name());
                    async {
                        // A hung sweep must not stall the schedule; dropping
                        // the future rolls the sweep transaction back and the
                        // next tick retries.
                        match timeout(sweep_timeout, run_sweep(&service, kind)).await {
                            Ok(Ok(outcome)) => {
                                if outcome.count > 0 {
                                    info!("Sweep transitioned {} booking(s)", outcome.count);
                                }
                            }
                            Ok(Err(e)) => error!("Sweep failed: {:?}", e),
                            Err(_) => warn!("Sweep timed out after {:?}, will retry next tick", sweep_timeout),
                        }
                    }
                    .instrument(span)
                    .await;
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }
    })
}
