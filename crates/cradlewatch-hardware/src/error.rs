//! Error types for cradle driver operations.
//!
//! Driver-level failures can happen at any time, including after prior
//! success: the underlying hardware service may die while the device sleeps.
//! Every failure here is a candidate for the monitor's recovery path; none
//! of them represent "no cradle present", which is modeled as a `None`
//! registry result, not an error.

/// Result type alias for driver operations.
pub type Result<T> = std::result::Result<T, DriverError>;

/// Errors that can occur talking to the cradle driver.
#[derive(Debug, thiserror::Error)]
pub enum DriverError {
    /// The hardware service backing the handle has died; the handle is
    /// invalid and must be discarded and re-acquired.
    #[error("cradle service died: {message}")]
    ServiceDied { message: String },

    /// Device communication error.
    #[error("communication error: {message}")]
    Communication { message: String },

    /// Operation is not supported by this cradle.
    #[error("unsupported operation: {operation}")]
    Unsupported { operation: String },

    /// Generic I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl DriverError {
    /// Create a new service-died error.
    pub fn service_died(message: impl Into<String>) -> Self {
        Self::ServiceDied {
            message: message.into(),
        }
    }

    /// Create a new communication error.
    pub fn communication(message: impl Into<String>) -> Self {
        Self::Communication {
            message: message.into(),
        }
    }

    /// Create a new unsupported operation error.
    pub fn unsupported(operation: impl Into<String>) -> Self {
        Self::Unsupported {
            operation: operation.into(),
        }
    }
}
