//! Keep-alive probe scheduling.
//!
//! Push notifications from the cradle driver silently stop firing after the
//! device idles or sleeps, so the monitor re-queries state on a fixed
//! period as a redundant pull path. The scheduler owns at most one timer at
//! a time: arming replaces any previous timer and cancelling drops it, so
//! there is never more than one pending probe chain.

use std::future;
use std::time::Duration;

use tokio::time::{self, Instant, Interval, MissedTickBehavior};

/// Armable recurring timer driving keep-alive probes.
///
/// Exists in the armed state only while the monitor is `Registered` or
/// `Degraded`; `cancel` is unconditional on stop and teardown.
#[derive(Debug, Default)]
pub struct KeepAliveScheduler {
    timer: Option<Interval>,
}

impl KeepAliveScheduler {
    /// Create an unarmed scheduler.
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm the scheduler with the given probe period.
    ///
    /// The first tick fires one full period from now, not immediately; the
    /// caller emits the current state itself when it arms. Re-arming
    /// replaces the existing timer wholesale.
    pub fn arm(&mut self, period: Duration) {
        let mut timer = time::interval_at(Instant::now() + period, period);
        timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
        self.timer = Some(timer);
    }

    /// Cancel the pending timer, if any.
    pub fn cancel(&mut self) {
        self.timer = None;
    }

    /// Whether a probe timer is currently pending.
    pub fn is_armed(&self) -> bool {
        self.timer.is_some()
    }

    /// Wait for the next probe tick.
    ///
    /// Pends forever while unarmed, which lets callers keep this future in
    /// a `select!` unconditionally. Cancel-safe.
    pub async fn tick(&mut self) {
        match self.timer.as_mut() {
            Some(timer) => {
                timer.tick().await;
            }
            None => future::pending::<()>().await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::sleep;

    #[test]
    fn test_new_is_unarmed() {
        let scheduler = KeepAliveScheduler::new();
        assert!(!scheduler.is_armed());
    }

    #[tokio::test]
    async fn test_arm_and_cancel() {
        let mut scheduler = KeepAliveScheduler::new();
        scheduler.arm(Duration::from_secs(5));
        assert!(scheduler.is_armed());

        scheduler.cancel();
        assert!(!scheduler.is_armed());
    }

    #[tokio::test(start_paused = true)]
    async fn test_tick_fires_after_period() {
        let mut scheduler = KeepAliveScheduler::new();
        scheduler.arm(Duration::from_secs(5));

        tokio::select! {
            _ = scheduler.tick() => {}
            _ = sleep(Duration::from_secs(6)) => panic!("tick did not fire within the period"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_tick_does_not_fire_before_period() {
        let mut scheduler = KeepAliveScheduler::new();
        scheduler.arm(Duration::from_secs(5));

        tokio::select! {
            _ = scheduler.tick() => panic!("tick fired before the period elapsed"),
            _ = sleep(Duration::from_secs(4)) => {}
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_unarmed_tick_pends() {
        let mut scheduler = KeepAliveScheduler::new();

        tokio::select! {
            _ = scheduler.tick() => panic!("unarmed scheduler ticked"),
            _ = sleep(Duration::from_secs(3600)) => {}
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_rearm_replaces_pending_timer() {
        let mut scheduler = KeepAliveScheduler::new();
        scheduler.arm(Duration::from_secs(5));
        scheduler.arm(Duration::from_secs(10));

        // The 5s chain must be gone: nothing fires before the new period.
        tokio::select! {
            _ = scheduler.tick() => panic!("stale timer chain survived re-arm"),
            _ = sleep(Duration::from_secs(7)) => {}
        }

        tokio::select! {
            _ = scheduler.tick() => {}
            _ = sleep(Duration::from_secs(4)) => panic!("re-armed timer never fired"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_tick_recurs() {
        let mut scheduler = KeepAliveScheduler::new();
        scheduler.arm(Duration::from_secs(5));

        for _ in 0..3 {
            tokio::select! {
                _ = scheduler.tick() => {}
                _ = sleep(Duration::from_secs(6)) => panic!("recurring tick stopped"),
            }
        }
    }
}
