//! Cradle presence monitoring.
//!
//! This crate watches whether a handheld device is seated in its charging
//! cradle and turns raw driver signals into a deduplicated stream of
//! [`InsertionState`] change events. Detection is dual-path: push
//! notifications from the driver plus a recurring keep-alive poll, because
//! push listeners silently die after the hardware idles or sleeps. Driver
//! failures observed by the poll trigger automatic teardown and
//! re-acquisition of the cradle handle.
//!
//! The monitor runs as a task; consumers interact through a cloneable
//! [`MonitorHandle`]. See [`MonitorRuntime`] for the entry point.
//!
//! [`InsertionState`]: cradlewatch_core::InsertionState

pub mod error;
pub mod gate;
pub mod keepalive;
pub mod lifecycle;
pub mod monitor;
pub mod runtime;

pub use error::{MonitorError, Result};
pub use gate::TransitionGate;
pub use keepalive::KeepAliveScheduler;
pub use lifecycle::{LifecycleAdapter, LifecycleEvent};
pub use monitor::PresenceMonitor;
pub use runtime::{MonitorHandle, MonitorRuntime};
