//! Host application lifecycle binding.
//!
//! Host platforms deliver coarse foreground/background/teardown signals;
//! the adapter forwards them to the monitor and absorbs failures, since a
//! lifecycle callback is never a place an error can usefully propagate to.

use tracing::warn;

use crate::runtime::MonitorHandle;

/// Host application lifecycle signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleEvent {
    /// The host application returned to the foreground.
    Resumed,

    /// The host application moved to the background. Monitoring continues;
    /// cradle detection is independent of visibility.
    Paused,

    /// The host application is shutting down; monitoring must stop and
    /// release the cradle handle.
    Destroyed,
}

/// Adapter from a host lifecycle callback to the monitor.
///
/// Holds a [`MonitorHandle`]; every signal becomes a command on the monitor
/// task. Errors (a terminated monitor) are logged and swallowed.
#[derive(Debug, Clone)]
pub struct LifecycleAdapter {
    handle: MonitorHandle,
}

impl LifecycleAdapter {
    /// Wrap a monitor handle.
    pub fn new(handle: MonitorHandle) -> Self {
        Self { handle }
    }

    /// Forward a lifecycle signal to the monitor.
    pub async fn notify(&self, event: LifecycleEvent) {
        if let Err(error) = self.handle.lifecycle(event).await {
            warn!(?event, %error, "lifecycle signal dropped");
        }
    }

    /// The host application returned to the foreground.
    pub async fn on_resume(&self) {
        self.notify(LifecycleEvent::Resumed).await;
    }

    /// The host application moved to the background.
    pub async fn on_pause(&self) {
        self.notify(LifecycleEvent::Paused).await;
    }

    /// The host application is shutting down.
    pub async fn on_destroy(&self) {
        self.notify(LifecycleEvent::Destroyed).await;
    }
}
