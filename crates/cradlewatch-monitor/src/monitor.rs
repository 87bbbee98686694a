//! Cradle presence monitor.
//!
//! The [`PresenceMonitor`] owns the cradle handle's lifecycle: it acquires
//! the handle from the capability registry, registers for push
//! notifications, arms the keep-alive probe, and is the single source of
//! truth for the current insertion state. Both detection paths (push and
//! poll) feed one [`TransitionGate`], so consumers see each state change
//! exactly once.
//!
//! # Serialization
//!
//! All fields are mutated from a single logical context. The runtime
//! (see [`runtime`](crate::runtime)) drives one monitor per task and
//! marshals push notifications, probe ticks, and consumer commands onto
//! that task; nothing here needs a lock.
//!
//! # Failure handling
//!
//! Driver failures during probes trigger [`recover`], which tears the
//! handle down, re-acquires it, and re-arms both paths. If re-acquisition
//! fails the monitor goes idle until the next external `start` (typically
//! the host's next foreground resume) — it never busy-retries acquisition.
//!
//! [`recover`]: PresenceMonitor::recover

use cradlewatch_core::{InsertionState, LockAction, LockState, MonitorConfig, MonitorState};
use cradlewatch_hardware::{CradleDevice, CradleRegistry};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::error::{MonitorError, Result};
use crate::gate::TransitionGate;
use crate::keepalive::KeepAliveScheduler;
use crate::lifecycle::LifecycleEvent;

/// Capacity of the internal push-notification channel.
///
/// Push events are a few bytes each and the monitor drains them promptly;
/// a small buffer only has to absorb bursts while a probe is in flight.
const PUSH_CHANNEL_CAPACITY: usize = 16;

/// What the monitor's event loop should do next.
#[derive(Debug)]
pub(crate) enum MonitorTurn {
    /// A push notification arrived from the driver callback.
    Push(InsertionState),

    /// The keep-alive timer fired; run a probe.
    Probe,
}

/// Owner of the cradle handle and single source of truth for insertion
/// state.
///
/// Constructed together with the event receiver that forms the produced
/// event stream; see [`PresenceMonitor::new`].
pub struct PresenceMonitor<R: CradleRegistry> {
    registry: R,
    device: Option<R::Device>,
    state: MonitorState,
    gate: TransitionGate,
    scheduler: KeepAliveScheduler,
    config: MonitorConfig,

    /// Sender handed to the driver on listener registration. The driver's
    /// callback thread only ever sends into this channel; it never touches
    /// monitor state.
    push_tx: mpsc::Sender<InsertionState>,
    push_rx: mpsc::Receiver<InsertionState>,

    /// Whether monitoring has ever been successfully started. Consulted on
    /// host resume; cleared only by [`stop`](Self::stop).
    initialized: bool,
}

impl<R: CradleRegistry> PresenceMonitor<R> {
    /// Create a monitor over the given registry.
    ///
    /// Returns the monitor and the receiving end of the event stream: one
    /// [`InsertionState`] per actual state change, `Unknown` never
    /// included.
    pub fn new(registry: R, config: MonitorConfig) -> (Self, mpsc::Receiver<InsertionState>) {
        let (event_tx, event_rx) = mpsc::channel(config.event_capacity);
        let (push_tx, push_rx) = mpsc::channel(PUSH_CHANNEL_CAPACITY);

        let monitor = Self {
            registry,
            device: None,
            state: MonitorState::Uninitialized,
            gate: TransitionGate::new(event_tx),
            scheduler: KeepAliveScheduler::new(),
            config,
            push_tx,
            push_rx,
            initialized: false,
        };

        (monitor, event_rx)
    }

    /// Current lifecycle state.
    pub fn state(&self) -> MonitorState {
        self.state
    }

    /// Whether monitoring has ever been successfully started.
    pub fn has_started(&self) -> bool {
        self.initialized
    }

    /// Whether a keep-alive probe is pending.
    pub fn keep_alive_armed(&self) -> bool {
        self.scheduler.is_armed()
    }

    fn set_state(&mut self, target: MonitorState) {
        if self.state == target {
            return;
        }
        debug_assert!(
            self.state.can_transition_to(&target),
            "invalid monitor transition {} -> {}",
            self.state,
            target
        );
        debug!(from = %self.state, to = %target, "monitor state transition");
        self.state = target;
    }

    /// Acquire a cradle handle from the capability registry.
    ///
    /// Returns `false` — a normal outcome, not a failure — when no cradle
    /// is present or it is of an unsupported kind. Registry errors are
    /// logged and reported as absence. Idempotent: a held handle is
    /// returned as-is without re-querying.
    pub async fn acquire(&mut self) -> bool {
        if self.device.is_some() {
            return true;
        }

        self.set_state(MonitorState::Acquiring);
        match self.registry.get_cradle().await {
            Ok(Some(device)) => {
                self.device = Some(device);
                // Fresh handle, fresh dedup baseline.
                self.gate.reset();
                true
            }
            Ok(None) => {
                debug!("no supported cradle present");
                self.set_state(MonitorState::Uninitialized);
                false
            }
            Err(error) => {
                warn!(%error, "capability registry query failed");
                self.set_state(MonitorState::Uninitialized);
                false
            }
        }
    }

    /// Start monitoring through the held handle.
    ///
    /// Requires a prior successful [`acquire`](Self::acquire). Registers a
    /// fresh push listener, immediately queries and emits the current
    /// state (hardware may have changed between acquisition and
    /// registration), and arms the keep-alive probe. No-op when already
    /// `Registered`.
    ///
    /// Returns whether monitoring is established. On a failed listener
    /// registration the monitor continues in `Degraded` poll-only mode; on
    /// a failed initial query it tears down completely and returns
    /// `false`.
    pub async fn start(&mut self) -> bool {
        if self.state == MonitorState::Registered {
            debug!("start ignored, already registered");
            return true;
        }

        let push_tx = self.push_tx.clone();
        let Some(device) = self.device.as_mut() else {
            warn!("start called without an acquired cradle");
            return false;
        };

        // A stale listener may survive on a handle whose service already
        // died; removal failures are expected here.
        if let Err(error) = device.unregister_listener().await {
            debug!(%error, "stale listener removal failed");
        }

        let registered = match device.register_listener(push_tx).await {
            Ok(()) => true,
            Err(error) => {
                warn!(%error, "push listener registration failed, polling only");
                false
            }
        };

        // Emit the current state right away so the consumer can never
        // desynchronize from hardware that changed before registration.
        match device.insertion_state().await {
            Ok(state) => {
                self.gate.observe(state);
            }
            Err(error) => {
                warn!(%error, "initial state query failed");
                self.teardown().await;
                return false;
            }
        }

        self.set_state(if registered {
            MonitorState::Registered
        } else {
            MonitorState::Degraded
        });
        self.scheduler.arm(self.config.keep_alive_interval);
        self.initialized = true;
        info!(state = %self.state, "cradle monitoring started");
        true
    }

    /// Stop monitoring and release the handle.
    ///
    /// Cancels the keep-alive probe, unregisters the push listener,
    /// releases the handle, and resets the dedup baseline. Safe to call
    /// repeatedly and from a destroy callback even if never started.
    pub async fn stop(&mut self) {
        self.teardown().await;
        self.initialized = false;
    }

    /// Full teardown-and-reacquire after a detected driver failure.
    ///
    /// Invoked from the probe failure path. If re-acquisition fails the
    /// monitor stays `Uninitialized` until the next external start; there
    /// is deliberately no retry loop here to avoid competing with the host
    /// thread's timer resources.
    pub async fn recover(&mut self) {
        info!("recovering cradle monitoring");
        self.teardown().await;
        if self.acquire().await {
            self.start().await;
        } else {
            warn!("cradle reacquisition failed, monitoring idle until next start");
        }
    }

    /// Run one keep-alive probe.
    ///
    /// On success the observation goes through the transition gate, so an
    /// unchanged state produces no event. On failure the probe does not
    /// reschedule itself; it hands control to [`recover`](Self::recover),
    /// whose `start` arms a fresh timer — a failed chain can never leave a
    /// duplicate behind.
    pub async fn probe(&mut self) {
        let Some(device) = self.device.as_ref() else {
            self.scheduler.cancel();
            return;
        };

        match device.insertion_state().await {
            Ok(state) => {
                self.gate.observe(state);
            }
            Err(error) => {
                warn!(%error, "keep-alive probe failed");
                self.recover().await;
            }
        }
    }

    /// Handle a push notification from the driver.
    ///
    /// Pushes are accepted only while `Registered`; anything still queued
    /// from a listener that has since been unregistered is dropped, so no
    /// event fires after stop or destroy.
    pub fn handle_push(&mut self, state: InsertionState) {
        if self.state != MonitorState::Registered {
            debug!(%state, "ignoring push while not registered");
            return;
        }
        self.gate.observe(state);
    }

    /// Query the current insertion state.
    ///
    /// Acquires the cradle on demand, so this works without monitoring
    /// having been started.
    ///
    /// # Errors
    ///
    /// Returns [`MonitorError::CradleNotFound`] when no supported cradle
    /// is available or the driver cannot determine the state, and a driver
    /// error if the query itself fails.
    pub async fn current_state(&mut self) -> Result<InsertionState> {
        if !self.acquire().await {
            return Err(MonitorError::CradleNotFound);
        }
        let Some(device) = self.device.as_ref() else {
            return Err(MonitorError::CradleNotFound);
        };

        match device.insertion_state().await {
            Ok(state) if state.is_known() => Ok(state),
            Ok(_) => Err(MonitorError::CradleNotFound),
            Err(error) => Err(error.into()),
        }
    }

    /// Release the cradle's retention lock.
    ///
    /// Only acts when the device is seated correctly. Returns `true` iff
    /// the lock actually transitioned from locked to unlocked; `false`
    /// when it was already unlocked or the device is not seated. Lock
    /// state is independent of insertion state.
    ///
    /// # Errors
    ///
    /// Returns [`MonitorError::CradleNotFound`] when no supported cradle
    /// is available.
    pub async fn unlock(&mut self) -> Result<bool> {
        if !self.acquire().await {
            return Err(MonitorError::CradleNotFound);
        }
        let Some(device) = self.device.as_mut() else {
            return Err(MonitorError::CradleNotFound);
        };

        if device.insertion_state().await? != InsertionState::InsertedCorrectly {
            return Ok(false);
        }

        let prior = device.control_lock(LockAction::Unlock).await?;
        Ok(prior == LockState::Locked)
    }

    /// React to a host application lifecycle signal.
    pub async fn handle_lifecycle(&mut self, event: LifecycleEvent) {
        match event {
            LifecycleEvent::Resumed => {
                // Host environments can tear down native bindings while
                // backgrounded; re-establish the listener if monitoring
                // was ever up.
                if self.initialized && self.acquire().await {
                    self.start().await;
                }
            }
            // Cradle detection is independent of application visibility.
            LifecycleEvent::Paused => {}
            LifecycleEvent::Destroyed => self.stop().await,
        }
    }

    /// Wait for the next push notification or probe tick.
    ///
    /// Pends while neither path is active. Cancel-safe; the runtime keeps
    /// this in a `select!` against the command channel.
    pub(crate) async fn wait_event(&mut self) -> MonitorTurn {
        let push_rx = &mut self.push_rx;
        let scheduler = &mut self.scheduler;

        tokio::select! {
            Some(state) = push_rx.recv() => MonitorTurn::Push(state),
            _ = scheduler.tick() => MonitorTurn::Probe,
        }
    }

    async fn teardown(&mut self) {
        self.scheduler.cancel();
        if let Some(device) = self.device.as_mut()
            && let Err(error) = device.unregister_listener().await
        {
            // The handle may already be dead; nothing to do but log.
            debug!(%error, "listener removal during teardown failed");
        }
        self.device = None;
        self.gate.reset();
        self.set_state(MonitorState::Uninitialized);
    }
}
