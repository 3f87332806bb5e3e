//! Session-complete notification task

use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;
use tracing::{info, warn};

use crate::{
    services::run_notify_command,
    state::{AppEvent, AppState},
};

/// Background task that reacts to completed Pomodoro sessions.
///
/// With a command configured it is spawned once per completed session so
/// a slow command never holds up the event receiver. Failures are logged
/// and never reach the timer.
pub async fn completion_notifier_task(state: Arc<AppState>, command: Option<String>) {
    info!("Starting completion notifier task");

    let mut events = state.subscribe_events();

    loop {
        match events.recv().await {
            Ok(AppEvent::SessionCompleted { completed_sessions }) => {
                info!("Session {} complete, time for a break", completed_sessions);
                if let Some(command) = command.clone() {
                    tokio::spawn(async move {
                        if let Err(e) = run_notify_command(&command, completed_sessions).await {
                            warn!("{}", e);
                        }
                    });
                }
            }
            Ok(_) => {}
            Err(RecvError::Lagged(skipped)) => {
                warn!("Completion notifier lagged, skipped {} events", skipped);
            }
            Err(RecvError::Closed) => {
                info!("Event channel closed, stopping completion notifier");
                return;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::MemorySnapshotStore;
    use crate::state::{AppSettings, TimerMode, DEFAULT_STORAGE_KEY};
    use std::{collections::BTreeSet, fs, time::Duration};
    use tempfile::TempDir;
    use tokio::time::{sleep, Instant};

    fn app_state() -> Arc<AppState> {
        Arc::new(AppState::new(
            AppSettings {
                port: 0,
                host: "127.0.0.1".to_string(),
                pomodoro_seconds: 3,
                tick_period: Duration::from_secs(1),
                storage_key: DEFAULT_STORAGE_KEY.to_string(),
            },
            Arc::new(MemorySnapshotStore::new()),
        ))
    }

    fn recorded_sessions(path: &std::path::Path) -> BTreeSet<String> {
        fs::read_to_string(path)
            .unwrap_or_default()
            .lines()
            .map(str::to_string)
            .collect()
    }

    #[tokio::test]
    async fn slow_command_does_not_drop_later_sessions() {
        let dir = TempDir::new().expect("temp dir");
        let out = dir.path().join("sessions.txt");
        let command = format!(
            "sleep 1; echo \"$POMOTRACK_COMPLETED_SESSIONS\" >> '{}'",
            out.display()
        );

        let state = app_state();
        tokio::spawn(completion_notifier_task(Arc::clone(&state), Some(command)));
        tokio::task::yield_now().await;

        let send = |event: AppEvent| {
            let _ = state.event_tx.send(event);
        };
        send(AppEvent::SessionCompleted { completed_sessions: 1 });
        tokio::task::yield_now().await;
        send(AppEvent::SessionCompleted { completed_sessions: 2 });
        for time_value in 0..150 {
            tokio::task::yield_now().await;
            send(AppEvent::Tick {
                mode: TimerMode::Tracker,
                time_value,
                project: None,
            });
        }

        let expected: BTreeSet<String> = ["1", "2"].iter().map(|s| s.to_string()).collect();
        let deadline = Instant::now() + Duration::from_secs(10);
        while recorded_sessions(&out) != expected && Instant::now() < deadline {
            sleep(Duration::from_millis(50)).await;
        }
        assert_eq!(recorded_sessions(&out), expected);
    }
}
