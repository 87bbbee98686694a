//! Shared types for the Cradlewatch cradle-monitoring stack.
//!
//! This crate defines the state enumerations and configuration shared by the
//! hardware abstraction layer (`cradlewatch-hardware`) and the presence
//! monitor (`cradlewatch-monitor`). It performs no I/O.

pub mod config;
pub mod types;

pub use config::MonitorConfig;
pub use types::{InsertionState, LockAction, LockState, MonitorState};

/// Version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
