//! Pomotrack - a Pomodoro timer and per-project time tracker
//!
//! This library provides the timer engine, the project tracker that shares
//! its clock, snapshot persistence, and the HTTP API that exposes them to a
//! presentation layer.

pub mod config;
pub mod state;
pub mod api;
pub mod services;
pub mod tasks;
pub mod utils;

// Re-export commonly used types
pub use config::Config;
pub use state::AppState;
pub use api::create_router;
pub use utils::signals::shutdown_signal;
