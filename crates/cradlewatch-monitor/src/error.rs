//! Error types for the presence monitor's consumer surface.
//!
//! Driver-level failures inside the monitor's internal operations never
//! reach consumers; they feed the recovery path. What consumers can see is
//! limited to "no cradle" on explicit operations, a driver error on a
//! direct query they issued themselves, and a closed monitor task.

use cradlewatch_hardware::DriverError;

/// Result type alias for monitor operations.
pub type Result<T> = std::result::Result<T, MonitorError>;

/// Errors surfaced by the presence monitor.
#[derive(Debug, thiserror::Error)]
pub enum MonitorError {
    /// No cradle is present, or the present cradle is of an unsupported
    /// kind. This is the normal "not found" outcome of `unlock` and
    /// `current_state`; it is not a driver fault.
    #[error("no supported cradle found")]
    CradleNotFound,

    /// A driver-level failure on a consumer-issued query.
    #[error(transparent)]
    Driver(#[from] DriverError),

    /// The monitor task has shut down; no further commands can be served.
    #[error("monitor task terminated")]
    Terminated,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_display() {
        let error = MonitorError::CradleNotFound;
        assert_eq!(error.to_string(), "no supported cradle found");
    }

    #[test]
    fn test_driver_error_is_transparent() {
        let error: MonitorError = DriverError::service_died("gone").into();
        assert_eq!(error.to_string(), "cradle service died: gone");
        assert!(matches!(error, MonitorError::Driver(_)));
    }
}
