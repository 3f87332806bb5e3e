//! Main application state management

use std::{
    sync::{Arc, Mutex, MutexGuard},
    time::{Duration, Instant},
};
use chrono::{DateTime, Utc};
use thiserror::Error;
use tokio::sync::{broadcast, watch};
use tracing::{debug, info, warn};

use super::{AppEvent, Project, ProjectId, ProjectTracker, TimerCore, TimerEngine, TimerSnapshot};
use crate::services::SnapshotStore;

/// Failures visible at the composition root
#[derive(Error, Debug)]
pub enum StateError {
    #[error("Failed to lock timer core: {0}")]
    LockPoisoned(String),
}

/// Settings the state is built from
#[derive(Debug, Clone)]
pub struct AppSettings {
    pub port: u16,
    pub host: String,
    pub pomodoro_seconds: u64,
    pub tick_period: Duration,
    pub storage_key: String,
}

/// Composition root: owns the core and the change channels around it
#[derive(Debug)]
pub struct AppState {
    /// Engine and tracker behind one lock so a tick is a single step
    core: Mutex<TimerCore>,
    /// Clock period the tick task runs at
    pub tick_period: Duration,
    /// Server metadata
    pub start_time: Instant,
    pub port: u16,
    pub host: String,
    /// Last action tracking
    pub last_action: Arc<Mutex<Option<String>>>,
    pub last_action_time: Arc<Mutex<Option<DateTime<Utc>>>>,
    /// Change notifications for subscribers
    pub event_tx: broadcast::Sender<AppEvent>,
    /// Latest timer view
    pub timer_update_tx: watch::Sender<TimerSnapshot>,
    /// Engine run flag; the clock task ticks only while this is true
    pub running_tx: watch::Sender<bool>,
}

impl AppState {
    /// Build the state, restoring projects from `store`
    pub fn new(settings: AppSettings, store: Arc<dyn SnapshotStore>) -> Self {
        let engine = TimerEngine::with_pomodoro_seconds(settings.pomodoro_seconds);
        let tracker = ProjectTracker::load(store, settings.storage_key);
        Self::with_core(TimerCore::new(engine, tracker), settings.port, settings.host, settings.tick_period)
    }

    /// Build the state around an existing core
    pub fn with_core(core: TimerCore, port: u16, host: String, tick_period: Duration) -> Self {
        let (event_tx, _) = broadcast::channel(100);
        let (timer_update_tx, _) = watch::channel(core.timer_snapshot());
        let (running_tx, _) = watch::channel(core.is_running());

        Self {
            core: Mutex::new(core),
            tick_period,
            start_time: Instant::now(),
            port,
            host,
            last_action: Arc::new(Mutex::new(None)),
            last_action_time: Arc::new(Mutex::new(None)),
            event_tx,
            timer_update_tx,
            running_tx,
        }
    }

    fn lock_core(&self) -> Result<MutexGuard<'_, TimerCore>, StateError> {
        self.core
            .lock()
            .map_err(|e| StateError::LockPoisoned(e.to_string()))
    }

    /// Apply a command to the core, then publish what changed
    fn update<T, F>(&self, action: &str, command: F) -> Result<T, StateError>
    where
        F: FnOnce(&mut TimerCore) -> (T, Vec<AppEvent>),
    {
        let mut core = self.lock_core()?;
        let (result, events) = command(&mut *core);
        let timer = core.timer_snapshot();
        drop(core);

        if let Ok(mut last_action) = self.last_action.lock() {
            *last_action = Some(action.to_string());
        }
        if let Ok(mut last_time) = self.last_action_time.lock() {
            *last_time = Some(Utc::now());
        }

        self.publish(timer, events);
        Ok(result)
    }

    fn publish(&self, timer: TimerSnapshot, events: Vec<AppEvent>) {
        let running = timer.is_running;
        self.running_tx.send_if_modified(|current| {
            let changed = *current != running;
            *current = running;
            changed
        });
        self.timer_update_tx.send_replace(timer);

        for event in events {
            // No subscribers is the normal idle case
            if self.event_tx.send(event).is_err() {
                debug!("No event subscribers");
            }
        }
    }

    /// Advance one clock period. Returns false when the engine was paused.
    pub fn tick(&self) -> Result<bool, StateError> {
        let mut core = self.lock_core()?;
        let events = core.tick();
        if events.is_empty() {
            return Ok(false);
        }
        let timer = core.timer_snapshot();
        drop(core);

        debug!("Tick: {:?} {}", timer.mode, timer.time_value);
        self.publish(timer, events);
        Ok(true)
    }

    pub fn start(&self) -> Result<TimerSnapshot, StateError> {
        info!("Starting timer");
        self.update("start", |core| {
            let event = core.start();
            (core.timer_snapshot(), vec![event])
        })
    }

    pub fn pause(&self) -> Result<TimerSnapshot, StateError> {
        info!("Pausing timer");
        self.update("pause", |core| {
            let event = core.pause();
            (core.timer_snapshot(), vec![event])
        })
    }

    pub fn toggle_running(&self) -> Result<TimerSnapshot, StateError> {
        self.update("toggle", |core| {
            let event = core.toggle_running();
            info!("Timer {}", if core.is_running() { "started" } else { "paused" });
            (core.timer_snapshot(), vec![event])
        })
    }

    pub fn reset(&self) -> Result<TimerSnapshot, StateError> {
        info!("Resetting timer");
        self.update("reset", |core| {
            let event = core.reset();
            (core.timer_snapshot(), vec![event])
        })
    }

    pub fn toggle_mode(&self) -> Result<TimerSnapshot, StateError> {
        self.update("mode", |core| {
            let event = core.toggle_mode();
            (core.timer_snapshot(), vec![event])
        })
    }

    /// Add a project; `Ok(None)` means the name was declined
    pub fn add_project(&self, name: Option<&str>) -> Result<Option<ProjectId>, StateError> {
        self.update("add-project", |core| match core.add_project(name) {
            Some((id, event)) => (Some(id), vec![event]),
            None => {
                warn!("Declined project with empty name");
                (None, Vec::new())
            }
        })
    }

    /// Toggle a project; `Ok(None)` means the id is unknown
    pub fn toggle_project(&self, id: ProjectId) -> Result<Option<bool>, StateError> {
        self.update("toggle-project", |core| match core.toggle_project(id) {
            Some((active, events)) => (Some(active), events),
            None => {
                warn!("Ignoring toggle for unknown project {}", id);
                (None, Vec::new())
            }
        })
    }

    pub fn get_timer_state(&self) -> Result<TimerSnapshot, StateError> {
        Ok(self.lock_core()?.timer_snapshot())
    }

    pub fn get_projects(&self) -> Result<Vec<Project>, StateError> {
        Ok(self.lock_core()?.tracker().projects().to_vec())
    }

    pub fn get_active_project(&self) -> Result<Option<ProjectId>, StateError> {
        Ok(self.lock_core()?.tracker().active_id())
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<AppEvent> {
        self.event_tx.subscribe()
    }

    /// Most recently published timer view
    pub fn latest_timer(&self) -> TimerSnapshot {
        self.timer_update_tx.borrow().clone()
    }

    pub fn subscribe_timer(&self) -> watch::Receiver<TimerSnapshot> {
        self.timer_update_tx.subscribe()
    }

    pub fn subscribe_running(&self) -> watch::Receiver<bool> {
        self.running_tx.subscribe()
    }

    /// Calculate server uptime as a formatted string
    pub fn get_uptime(&self) -> String {
        let duration = self.start_time.elapsed();
        let hours = duration.as_secs() / 3600;
        let minutes = (duration.as_secs() % 3600) / 60;
        let seconds = duration.as_secs() % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}s", seconds)
        }
    }

    /// Get last action information
    pub fn get_last_action(&self) -> (Option<String>, Option<DateTime<Utc>>) {
        let last_action = self.last_action.lock().ok().and_then(|a| a.clone());
        let last_action_time = self.last_action_time.lock().ok().and_then(|t| *t);
        (last_action, last_action_time)
    }
}
