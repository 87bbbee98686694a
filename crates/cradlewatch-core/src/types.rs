//! State enumerations for cradle monitoring.
//!
//! This module defines the two state machines at the heart of the subsystem:
//! the hardware-reported [`InsertionState`] of the device in its cradle, and
//! the monitor's own lifecycle [`MonitorState`].
//!
//! # Monitor lifecycle
//!
//! The monitor moves through the following states:
//! - `Uninitialized`: no cradle handle is held
//! - `Acquiring`: querying the capability registry for a cradle
//! - `Registered`: handle held, push listener registered, keep-alive armed
//! - `Degraded`: handle held and keep-alive armed, but no push listener
//!   (registration failed while queries still succeed — poll-only mode)
//!
//! # Valid Transitions
//!
//! - Uninitialized → Acquiring → Registered/Degraded
//! - Registered → Degraded (push listener lost)
//! - Degraded → Registered (recovery re-registered the listener)
//! - Acquiring/Registered/Degraded → Uninitialized (teardown)
//!
//! # Examples
//!
//! ```
//! use cradlewatch_core::MonitorState;
//!
//! assert!(MonitorState::Uninitialized.can_transition_to(&MonitorState::Acquiring));
//! assert!(!MonitorState::Uninitialized.can_transition_to(&MonitorState::Registered));
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

/// Insertion state of the handheld device in its docking cradle.
///
/// This is the value reported by the cradle driver, both through push
/// notifications and through explicit queries. `Unknown` is the sentinel
/// before any successful query; it is never emitted to consumers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InsertionState {
    /// Device is seated correctly in the cradle (charging and data contacts
    /// engaged).
    InsertedCorrectly,

    /// Device is in the cradle but misaligned; contacts are not engaged.
    InsertedWrongly,

    /// Device has been removed from the cradle.
    Extracted,

    /// No successful query has been made yet, or the driver could not
    /// determine the state.
    Unknown,
}

impl InsertionState {
    /// Check whether this is a real hardware observation.
    ///
    /// Returns `false` only for [`InsertionState::Unknown`], which is a
    /// sentinel and must never cross the event boundary.
    pub fn is_known(&self) -> bool {
        !matches!(self, Self::Unknown)
    }
}

impl fmt::Display for InsertionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            InsertionState::InsertedCorrectly => "InsertedCorrectly",
            InsertionState::InsertedWrongly => "InsertedWrongly",
            InsertionState::Extracted => "Extracted",
            InsertionState::Unknown => "Unknown",
        };
        write!(f, "{}", s)
    }
}

/// Lifecycle state of the presence monitor.
///
/// Exactly one value is authoritative at any instant; the monitor is the
/// sole owner and mutator. Invariants tied to this state:
///
/// - a push listener is registered with the driver iff `Registered`
/// - a keep-alive probe is pending iff `Registered` or `Degraded`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MonitorState {
    /// No cradle handle is held; monitoring is inactive.
    Uninitialized,

    /// Querying the capability registry for a cradle handle.
    Acquiring,

    /// Handle held, push listener registered, keep-alive armed.
    Registered,

    /// Handle held and keep-alive armed, but no push listener; the monitor
    /// relies on polling alone until the next recovery or start.
    Degraded,
}

impl MonitorState {
    /// Check if transition to target state is valid from this state.
    ///
    /// # Examples
    ///
    /// ```
    /// use cradlewatch_core::MonitorState;
    ///
    /// assert!(MonitorState::Acquiring.can_transition_to(&MonitorState::Registered));
    /// assert!(!MonitorState::Uninitialized.can_transition_to(&MonitorState::Degraded));
    /// ```
    pub fn can_transition_to(&self, target: &MonitorState) -> bool {
        matches!(
            (self, target),
            // From Uninitialized
            (MonitorState::Uninitialized, MonitorState::Acquiring)
            // From Acquiring
            | (
                MonitorState::Acquiring,
                MonitorState::Registered | MonitorState::Degraded | MonitorState::Uninitialized
            )
            // From Registered
            | (MonitorState::Registered, MonitorState::Degraded | MonitorState::Uninitialized)
            // From Degraded
            | (MonitorState::Degraded, MonitorState::Registered | MonitorState::Uninitialized)
        )
    }

    /// Check whether a keep-alive probe should be pending in this state.
    pub fn keeps_alive(&self) -> bool {
        matches!(self, MonitorState::Registered | MonitorState::Degraded)
    }
}

impl fmt::Display for MonitorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            MonitorState::Uninitialized => "Uninitialized",
            MonitorState::Acquiring => "Acquiring",
            MonitorState::Registered => "Registered",
            MonitorState::Degraded => "Degraded",
        };
        write!(f, "{}", s)
    }
}

/// Action accepted by the cradle's lock mechanism.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LockAction {
    /// Engage the retention lock.
    Lock,

    /// Release the retention lock.
    Unlock,
}

/// State of the cradle's retention lock.
///
/// Lock state is independent of [`InsertionState`]: unlocking a seated
/// device does not change its insertion state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LockState {
    /// The retention lock is engaged.
    Locked,

    /// The retention lock is released.
    Unlocked,
}
