//! Utility functions module
//!
//! Shutdown signal handling and clock display formatting.

pub mod format;
pub mod signals;

// Re-export main functions
pub use format::{format_clock, format_hms};
pub use signals::shutdown_signal;
