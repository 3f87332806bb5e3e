//! External collaborator module
//!
//! This module contains the adapters the core talks to: snapshot storage
//! and the session-complete notification hook.

pub mod notify;
pub mod storage;

// Re-export main types
pub use notify::run_notify_command;
pub use storage::{
    FileSnapshotStore, MemorySnapshotStore, SnapshotStore, StorageError, StorageResult,
};
