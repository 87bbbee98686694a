//! State-transition gate: deduplication and event emission.
//!
//! Both the push listener and the keep-alive poll feed their observations
//! through this single gate, which guarantees the event sink sees a state
//! change at most once per actual change regardless of which path observed
//! it first. The gate is only ever touched from the monitor's serialized
//! context, which is what makes observe-then-update atomic with respect to
//! concurrent push/poll submissions.

use cradlewatch_core::InsertionState;
use tokio::sync::mpsc;
use tracing::warn;

/// Deduplicating boundary between state observations and the event sink.
#[derive(Debug)]
pub struct TransitionGate {
    /// Most recently emitted state; `Unknown` until the first emission and
    /// after every reset.
    last_observed: InsertionState,

    /// Event sink toward the consuming application.
    events: mpsc::Sender<InsertionState>,
}

impl TransitionGate {
    /// Create a gate writing into the given event sink.
    pub fn new(events: mpsc::Sender<InsertionState>) -> Self {
        Self {
            last_observed: InsertionState::Unknown,
            events,
        }
    }

    /// Submit a newly observed state.
    ///
    /// Emits exactly one event iff `state` is a real observation and
    /// differs from the last emitted state. Returns whether an event was
    /// emitted. Emission is non-blocking; if the consumer has fallen
    /// behind far enough to fill the sink, the event is dropped with a
    /// warning rather than stalling the monitor.
    pub fn observe(&mut self, state: InsertionState) -> bool {
        if !state.is_known() || state == self.last_observed {
            return false;
        }

        self.last_observed = state;
        if let Err(error) = self.events.try_send(state) {
            warn!(%state, %error, "dropping insertion event, sink unavailable");
        }
        true
    }

    /// Reset the deduplication baseline to `Unknown`.
    ///
    /// Called whenever the device handle is replaced, so the first
    /// observation through a fresh handle is always emitted.
    pub fn reset(&mut self) {
        self.last_observed = InsertionState::Unknown;
    }

    /// The most recently emitted state.
    pub fn last_observed(&self) -> InsertionState {
        self.last_observed
    }
}
