//! Cradle device trait definitions.
//!
//! These traits establish the contract between the presence monitor and the
//! cradle hardware, enabling substitution between the mock implementation
//! (for development and testing) and a real driver binding.
//!
//! All traits use native `async fn` methods (Rust 1.90 + Edition 2024
//! RPITIT), eliminating the need for the `async_trait` macro.

#![allow(async_fn_in_trait)]

use cradlewatch_core::{InsertionState, LockAction, LockState};
use tokio::sync::mpsc;

use crate::error::Result;

/// Kind of cradle reported by the capability registry.
///
/// Only [`CradleKind::SelfShopping`] cradles expose the insertion-state and
/// lock interfaces the monitor needs; registries treat other kinds as
/// absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum CradleKind {
    /// Self-shopping dock with insertion detection and a retention lock.
    SelfShopping,

    /// Charge-only dock without a data interface.
    ChargeOnly,

    /// Unrecognized cradle hardware.
    Unknown,
}

impl CradleKind {
    /// Check whether the monitor can drive this kind of cradle.
    pub fn is_supported(&self) -> bool {
        matches!(self, Self::SelfShopping)
    }
}

/// An acquired handle to the physical cradle.
///
/// The handle may become invalid at any time if the underlying hardware
/// service dies; every method can fail with [`DriverError::ServiceDied`]
/// even after prior success. On any such failure the caller must discard
/// the handle and acquire a fresh one through the registry.
///
/// # Ownership
///
/// Exactly one component owns a handle at a time. The presence monitor is
/// that owner; nothing else reads or caches the handle.
///
/// [`DriverError::ServiceDied`]: crate::DriverError::ServiceDied
pub trait CradleDevice: Send + Sync {
    /// Query the current insertion state.
    ///
    /// There is no timeout on this call: a query that never returns is a
    /// driver defect the caller cannot mitigate at this layer.
    ///
    /// # Errors
    ///
    /// Returns an error if the hardware service has died or a
    /// communication error occurs.
    async fn insertion_state(&self) -> Result<InsertionState>;

    /// Register a push listener for insertion-state changes.
    ///
    /// The driver sends raw states into `listener` from its own callback
    /// context; it never touches caller state directly. Registering
    /// replaces any previously registered listener.
    ///
    /// # Errors
    ///
    /// Returns an error if the hardware service has died.
    async fn register_listener(&mut self, listener: mpsc::Sender<InsertionState>) -> Result<()>;

    /// Unregister the push listener, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the hardware service has died. Callers tearing
    /// down a possibly-dead handle are expected to swallow this.
    async fn unregister_listener(&mut self) -> Result<()>;

    /// Drive the cradle's retention lock.
    ///
    /// Returns the lock state *before* the action was applied, so callers
    /// can tell whether anything actually transitioned.
    ///
    /// # Errors
    ///
    /// Returns an error if the hardware service has died or the cradle
    /// does not support lock control.
    async fn control_lock(&mut self, action: LockAction) -> Result<LockState>;
}

/// Capability registry that vends cradle handles.
///
/// # Absence is not an error
///
/// `get_cradle` returns `Ok(None)` when no cradle is present or the present
/// cradle is of an unsupported kind. `Err` is reserved for a dead or
/// unreachable capability service.
pub trait CradleRegistry: Send + Sync {
    /// The device type this registry vends.
    type Device: CradleDevice;

    /// Query for a supported cradle.
    ///
    /// # Errors
    ///
    /// Returns an error only if the capability service itself fails; a
    /// missing or unsupported cradle is `Ok(None)`.
    async fn get_cradle(&self) -> Result<Option<Self::Device>>;
}
