//! Mock cradle implementation for testing and development.
//!
//! This module provides a simulated cradle that can be controlled
//! programmatically without physical hardware. The registry, every device
//! handle it vends, and the control handle all share one piece of state, so
//! a test keeps control of the cradle across a monitor recovery that
//! discards and re-acquires the device.

use std::sync::{Arc, Mutex};

use cradlewatch_core::{InsertionState, LockAction, LockState};
use tokio::sync::mpsc;

use crate::error::{DriverError, Result};
use crate::traits::{CradleDevice, CradleKind, CradleRegistry};

#[derive(Debug)]
struct Inner {
    present: bool,
    kind: CradleKind,
    state: InsertionState,
    lock: LockState,
    failing: bool,
    fail_next_query: bool,
    listener: Option<mpsc::Sender<InsertionState>>,
    vend_count: usize,
    register_count: usize,
}

impl Inner {
    fn check_service(&self) -> Result<()> {
        if self.failing {
            return Err(DriverError::service_died("mock service failure injected"));
        }
        Ok(())
    }
}

/// Mock capability registry vending [`MockCradle`] handles.
///
/// # Examples
///
/// ```
/// use cradlewatch_hardware::mock::MockRegistry;
/// use cradlewatch_hardware::traits::{CradleDevice, CradleRegistry};
/// use cradlewatch_core::InsertionState;
///
/// #[tokio::main]
/// async fn main() -> cradlewatch_hardware::Result<()> {
///     let (registry, handle) = MockRegistry::new();
///     handle.set_insertion_state(InsertionState::InsertedCorrectly);
///
///     let cradle = registry.get_cradle().await?.expect("cradle present");
///     assert_eq!(
///         cradle.insertion_state().await?,
///         InsertionState::InsertedCorrectly
///     );
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct MockRegistry {
    shared: Arc<Mutex<Inner>>,
}

impl MockRegistry {
    /// Create a mock registry with a supported cradle present and the
    /// device extracted.
    ///
    /// Returns a tuple of (MockRegistry, MockCradleHandle) where the handle
    /// drives the simulated hardware.
    pub fn new() -> (Self, MockCradleHandle) {
        let shared = Arc::new(Mutex::new(Inner {
            present: true,
            kind: CradleKind::SelfShopping,
            state: InsertionState::Extracted,
            lock: LockState::Unlocked,
            failing: false,
            fail_next_query: false,
            listener: None,
            vend_count: 0,
            register_count: 0,
        }));

        let handle = MockCradleHandle {
            shared: Arc::clone(&shared),
        };

        (Self { shared }, handle)
    }
}

impl CradleRegistry for MockRegistry {
    type Device = MockCradle;

    async fn get_cradle(&self) -> Result<Option<MockCradle>> {
        let mut inner = self.shared.lock().expect("mock state poisoned");
        inner.check_service()?;

        if !inner.present || !inner.kind.is_supported() {
            return Ok(None);
        }

        inner.vend_count += 1;
        Ok(Some(MockCradle {
            shared: Arc::clone(&self.shared),
        }))
    }
}

/// Mock cradle device vended by [`MockRegistry`].
#[derive(Debug)]
pub struct MockCradle {
    shared: Arc<Mutex<Inner>>,
}

impl CradleDevice for MockCradle {
    async fn insertion_state(&self) -> Result<InsertionState> {
        let mut inner = self.shared.lock().expect("mock state poisoned");
        inner.check_service()?;
        if inner.fail_next_query {
            inner.fail_next_query = false;
            return Err(DriverError::service_died("injected one-shot query failure"));
        }
        Ok(inner.state)
    }

    async fn register_listener(&mut self, listener: mpsc::Sender<InsertionState>) -> Result<()> {
        let mut inner = self.shared.lock().expect("mock state poisoned");
        inner.check_service()?;
        inner.listener = Some(listener);
        inner.register_count += 1;
        Ok(())
    }

    async fn unregister_listener(&mut self) -> Result<()> {
        let mut inner = self.shared.lock().expect("mock state poisoned");
        inner.check_service()?;
        inner.listener = None;
        Ok(())
    }

    async fn control_lock(&mut self, action: LockAction) -> Result<LockState> {
        let mut inner = self.shared.lock().expect("mock state poisoned");
        inner.check_service()?;

        let previous = inner.lock;
        inner.lock = match action {
            LockAction::Lock => LockState::Locked,
            LockAction::Unlock => LockState::Unlocked,
        };
        Ok(previous)
    }
}

/// Handle for driving a mock cradle.
///
/// Cloneable; all clones and all vended devices observe the same simulated
/// hardware.
#[derive(Debug, Clone)]
pub struct MockCradleHandle {
    shared: Arc<Mutex<Inner>>,
}

impl MockCradleHandle {
    /// Set whether a cradle is physically present.
    pub fn set_present(&self, present: bool) {
        self.shared.lock().expect("mock state poisoned").present = present;
    }

    /// Set the kind of cradle the registry reports.
    pub fn set_kind(&self, kind: CradleKind) {
        self.shared.lock().expect("mock state poisoned").kind = kind;
    }

    /// Change the simulated insertion state and notify the registered push
    /// listener, if any.
    ///
    /// The push is best-effort, like real driver callbacks: a full or
    /// closed listener channel drops the notification. A driver in the
    /// failing state stops pushing entirely, mirroring the silent listener
    /// death after idle/sleep.
    pub fn set_insertion_state(&self, state: InsertionState) {
        let inner = &mut *self.shared.lock().expect("mock state poisoned");
        inner.state = state;

        if inner.failing {
            return;
        }
        if let Some(listener) = &inner.listener {
            let _ = listener.try_send(state);
        }
    }

    /// Change the simulated insertion state without notifying the listener.
    ///
    /// Models the state changing while push notifications have silently
    /// stopped firing (hardware idle/sleep); only a keep-alive probe can
    /// observe the change.
    pub fn set_insertion_state_silently(&self, state: InsertionState) {
        self.shared.lock().expect("mock state poisoned").state = state;
    }

    /// Inject or clear a driver failure.
    ///
    /// While failing, every device and registry operation returns
    /// [`DriverError::ServiceDied`]. Service death also takes the driver's
    /// listener table with it, so the registered listener is dropped.
    pub fn set_failing(&self, failing: bool) {
        let inner = &mut *self.shared.lock().expect("mock state poisoned");
        inner.failing = failing;
        if failing {
            inner.listener = None;
        }
    }

    /// Fail the next single insertion-state query, then heal.
    ///
    /// Lets tests exercise the probe-failure recovery path without killing
    /// the re-acquisition that follows it.
    pub fn fail_next_query(&self) {
        self.shared
            .lock()
            .expect("mock state poisoned")
            .fail_next_query = true;
    }

    /// Set the lock state directly (e.g., to simulate a cradle that locks
    /// on insertion).
    pub fn set_lock_state(&self, lock: LockState) {
        self.shared.lock().expect("mock state poisoned").lock = lock;
    }

    /// Current simulated insertion state.
    pub fn insertion_state(&self) -> InsertionState {
        self.shared.lock().expect("mock state poisoned").state
    }

    /// Current simulated lock state.
    pub fn lock_state(&self) -> LockState {
        self.shared.lock().expect("mock state poisoned").lock
    }

    /// Whether a push listener is currently registered.
    pub fn listener_registered(&self) -> bool {
        self.shared
            .lock()
            .expect("mock state poisoned")
            .listener
            .is_some()
    }

    /// Number of devices the registry has vended.
    pub fn vend_count(&self) -> usize {
        self.shared.lock().expect("mock state poisoned").vend_count
    }

    /// Number of listener registrations across all vended devices.
    pub fn register_count(&self) -> usize {
        self.shared
            .lock()
            .expect("mock state poisoned")
            .register_count
    }
}
