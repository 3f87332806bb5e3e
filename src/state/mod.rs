//! State management module
//!
//! The timer engine, the project tracker, the combined core they form, and
//! the application state that wires the core to storage and notifications.

pub mod timer_state;
pub mod project_state;
pub mod timer_core;
pub mod app_state;

// Re-export main types
pub use timer_state::{TickOutcome, TimerEngine, TimerMode, TimerSnapshot, POMODORO_SECONDS};
pub use project_state::{Project, ProjectId, ProjectTracker, DEFAULT_STORAGE_KEY};
pub use timer_core::{AppEvent, TimerCore};
pub use app_state::{AppSettings, AppState, StateError};
