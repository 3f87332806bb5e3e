//! The single tick source driving the timer core

use std::sync::Arc;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, error, info};

use crate::state::AppState;

/// Background task that ticks the core once per period while the engine runs.
///
/// Spawn exactly one per `AppState`. It idles on the run flag while paused,
/// so there is never more than one live interval.
pub async fn clock_task(state: Arc<AppState>) {
    info!("Starting clock task with period {:?}", state.tick_period);

    let mut running_rx = state.subscribe_running();

    loop {
        // Wait for the engine to start
        loop {
            let running = *running_rx.borrow_and_update();
            if running {
                break;
            }
            if running_rx.changed().await.is_err() {
                debug!("Run flag closed, stopping clock task");
                return;
            }
        }

        debug!("Clock running");
        let period = state.tick_period;
        let mut interval = interval_at(Instant::now() + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    match state.tick() {
                        Ok(true) => {}
                        // Paused under the lock since the last flag check
                        Ok(false) => break,
                        Err(e) => {
                            error!("Clock tick failed: {}", e);
                            break;
                        }
                    }
                }

                changed = running_rx.changed() => {
                    if changed.is_err() {
                        debug!("Run flag closed, stopping clock task");
                        return;
                    }
                    let running = *running_rx.borrow_and_update();
                    if !running {
                        break;
                    }
                }
            }
        }

        debug!("Clock idle");
    }
}
