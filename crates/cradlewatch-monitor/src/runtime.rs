//! Monitor task runtime.
//!
//! The [`PresenceMonitor`] is single-context by construction: pushes,
//! probes, and consumer calls must all touch it from one place. The runtime
//! is that place — a task owning the monitor and multiplexing the command
//! channel against the monitor's internal event sources. Consumers hold a
//! cloneable [`MonitorHandle`] and never see the monitor itself.

use cradlewatch_core::{InsertionState, MonitorConfig, MonitorState};
use cradlewatch_hardware::CradleRegistry;
use tokio::sync::{mpsc, oneshot};
use tracing::debug;

use crate::error::{MonitorError, Result};
use crate::lifecycle::LifecycleEvent;
use crate::monitor::{MonitorTurn, PresenceMonitor};

/// Capacity of the command channel between handles and the monitor task.
const COMMAND_CHANNEL_CAPACITY: usize = 16;

#[derive(Debug)]
enum MonitorCommand {
    Start(oneshot::Sender<bool>),
    Stop(oneshot::Sender<()>),
    CurrentState(oneshot::Sender<Result<InsertionState>>),
    Unlock(oneshot::Sender<Result<bool>>),
    State(oneshot::Sender<MonitorState>),
    Lifecycle(LifecycleEvent),
}

/// Event loop owning a [`PresenceMonitor`].
///
/// Constructed by [`MonitorRuntime::new`] and consumed by
/// [`run`](Self::run), which the caller spawns:
///
/// ```no_run
/// use cradlewatch_core::MonitorConfig;
/// use cradlewatch_hardware::MockRegistry;
/// use cradlewatch_monitor::MonitorRuntime;
///
/// # async fn demo() {
/// let (registry, _hw) = MockRegistry::new();
/// let (runtime, handle, mut events) = MonitorRuntime::new(registry, MonitorConfig::default());
/// tokio::spawn(runtime.run());
///
/// handle.start().await.unwrap();
/// while let Some(state) = events.recv().await {
///     println!("cradle: {state}");
/// }
/// # }
/// ```
pub struct MonitorRuntime<R: CradleRegistry> {
    monitor: PresenceMonitor<R>,
    commands: mpsc::Receiver<MonitorCommand>,
}

impl<R: CradleRegistry> MonitorRuntime<R> {
    /// Create a runtime over the given registry.
    ///
    /// Returns the runtime, a command handle, and the event stream carrying
    /// one [`InsertionState`] per actual state change.
    pub fn new(
        registry: R,
        config: MonitorConfig,
    ) -> (Self, MonitorHandle, mpsc::Receiver<InsertionState>) {
        let (monitor, events) = PresenceMonitor::new(registry, config);
        let (command_tx, command_rx) = mpsc::channel(COMMAND_CHANNEL_CAPACITY);

        let runtime = Self {
            monitor,
            commands: command_rx,
        };
        let handle = MonitorHandle {
            commands: command_tx,
        };

        (runtime, handle, events)
    }

    /// Drive the monitor until every [`MonitorHandle`] is dropped.
    ///
    /// Commands take priority over push notifications and probe ticks, so a
    /// `stop` cannot be overtaken by a probe already due.
    pub async fn run(mut self) {
        enum Input {
            Command(Option<MonitorCommand>),
            Monitor(MonitorTurn),
        }

        loop {
            // Borrows from both branches must end before dispatch below.
            let input = tokio::select! {
                biased;
                command = self.commands.recv() => Input::Command(command),
                turn = self.monitor.wait_event() => Input::Monitor(turn),
            };

            match input {
                Input::Command(Some(command)) => self.handle_command(command).await,
                Input::Command(None) => break,
                Input::Monitor(MonitorTurn::Push(state)) => self.monitor.handle_push(state),
                Input::Monitor(MonitorTurn::Probe) => self.monitor.probe().await,
            }
        }

        debug!("all monitor handles dropped, shutting down");
        self.monitor.stop().await;
    }

    async fn handle_command(&mut self, command: MonitorCommand) {
        // A consumer that dropped its reply receiver gets no reply; the
        // operation still runs.
        match command {
            MonitorCommand::Start(reply) => {
                let started = self.monitor.acquire().await && self.monitor.start().await;
                let _ = reply.send(started);
            }
            MonitorCommand::Stop(reply) => {
                self.monitor.stop().await;
                let _ = reply.send(());
            }
            MonitorCommand::CurrentState(reply) => {
                let _ = reply.send(self.monitor.current_state().await);
            }
            MonitorCommand::Unlock(reply) => {
                let _ = reply.send(self.monitor.unlock().await);
            }
            MonitorCommand::State(reply) => {
                let _ = reply.send(self.monitor.state());
            }
            MonitorCommand::Lifecycle(event) => {
                self.monitor.handle_lifecycle(event).await;
            }
        }
    }
}

/// Cloneable command handle onto a running monitor task.
///
/// Every method maps a closed command channel to
/// [`MonitorError::Terminated`].
#[derive(Debug, Clone)]
pub struct MonitorHandle {
    commands: mpsc::Sender<MonitorCommand>,
}

impl MonitorHandle {
    async fn request<T>(
        &self,
        command: MonitorCommand,
        reply: oneshot::Receiver<T>,
    ) -> Result<T> {
        self.commands
            .send(command)
            .await
            .map_err(|_| MonitorError::Terminated)?;
        reply.await.map_err(|_| MonitorError::Terminated)
    }

    /// Start cradle monitoring.
    ///
    /// Returns whether monitoring is established; `false` means no
    /// supported cradle is available or setup failed.
    pub async fn start(&self) -> Result<bool> {
        let (tx, rx) = oneshot::channel();
        self.request(MonitorCommand::Start(tx), rx).await
    }

    /// Stop monitoring and release the cradle handle.
    pub async fn stop(&self) -> Result<()> {
        let (tx, rx) = oneshot::channel();
        self.request(MonitorCommand::Stop(tx), rx).await
    }

    /// Query the current insertion state, acquiring the cradle on demand.
    pub async fn current_state(&self) -> Result<InsertionState> {
        let (tx, rx) = oneshot::channel();
        self.request(MonitorCommand::CurrentState(tx), rx).await?
    }

    /// Release the cradle's retention lock.
    ///
    /// `Ok(true)` iff the lock transitioned from locked to unlocked.
    pub async fn unlock(&self) -> Result<bool> {
        let (tx, rx) = oneshot::channel();
        self.request(MonitorCommand::Unlock(tx), rx).await?
    }

    /// Current monitor lifecycle state.
    pub async fn state(&self) -> Result<MonitorState> {
        let (tx, rx) = oneshot::channel();
        self.request(MonitorCommand::State(tx), rx).await
    }

    /// Forward a host lifecycle signal. Fire-and-forget.
    pub async fn lifecycle(&self, event: LifecycleEvent) -> Result<()> {
        self.commands
            .send(MonitorCommand::Lifecycle(event))
            .await
            .map_err(|_| MonitorError::Terminated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cradlewatch_hardware::MockRegistry;

    #[tokio::test]
    async fn test_runtime_serves_commands() {
        let (registry, hw) = MockRegistry::new();
        hw.set_insertion_state(InsertionState::InsertedCorrectly);

        let (runtime, handle, mut events) = MonitorRuntime::new(registry, MonitorConfig::default());
        let task = tokio::spawn(runtime.run());

        assert!(handle.start().await.unwrap());
        assert_eq!(handle.state().await.unwrap(), MonitorState::Registered);
        assert_eq!(
            events.recv().await,
            Some(InsertionState::InsertedCorrectly)
        );
        assert_eq!(
            handle.current_state().await.unwrap(),
            InsertionState::InsertedCorrectly
        );

        handle.stop().await.unwrap();
        assert_eq!(handle.state().await.unwrap(), MonitorState::Uninitialized);

        drop(handle);
        task.await.unwrap();
    }

    #[tokio::test]
    async fn test_runtime_shutdown_releases_cradle() {
        let (registry, hw) = MockRegistry::new();

        let (runtime, handle, _events) = MonitorRuntime::new(registry, MonitorConfig::default());
        let task = tokio::spawn(runtime.run());

        assert!(handle.start().await.unwrap());
        assert!(hw.listener_registered());

        drop(handle);
        task.await.unwrap();
        assert!(!hw.listener_registered());
    }

    #[tokio::test]
    async fn test_handle_reports_terminated_runtime() {
        let (registry, _hw) = MockRegistry::new();
        let (runtime, handle, _events) = MonitorRuntime::new(registry, MonitorConfig::default());
        drop(runtime);

        assert!(matches!(handle.start().await, Err(MonitorError::Terminated)));
        assert!(matches!(
            handle.lifecycle(LifecycleEvent::Paused).await,
            Err(MonitorError::Terminated)
        ));
    }
}
