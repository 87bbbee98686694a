//! Hardware abstraction layer for the Cradlewatch presence monitor.
//!
//! This crate defines the trait boundary between the presence monitor and
//! the cradle hardware: a capability registry that vends device handles, and
//! the device handle itself with state queries, push-listener registration,
//! and lock control. A mock implementation with a programmatic control
//! handle backs development and testing without physical hardware.
//!
//! # Design Philosophy
//!
//! - **Async-first**: all I/O operations are asynchronous using native
//!   `async fn` in traits (Rust 1.90 + Edition 2024 RPITIT).
//! - **Thread-safe**: all traits require `Send + Sync` for use with Tokio.
//! - **Failure-aware**: every driver call can fail at any time, including
//!   after prior success; the hardware service backing a handle may die
//!   while the device sleeps.
//! - **Absence is not an error**: a missing or unsupported cradle is a
//!   `None` registry result, never a `DriverError`.
//!
//! # Push listeners
//!
//! The driver invokes push callbacks from a thread the consumer does not
//! control. The contract here is channel handoff: the driver sends raw
//! [`InsertionState`] values into the `mpsc::Sender` it was registered
//! with and never touches consumer state directly.
//!
//! [`InsertionState`]: cradlewatch_core::InsertionState

pub mod error;
pub mod mock;
pub mod traits;

// Re-export commonly used types for convenience
pub use error::{DriverError, Result};
pub use mock::{MockCradle, MockCradleHandle, MockRegistry};
pub use traits::{CradleDevice, CradleKind, CradleRegistry};
