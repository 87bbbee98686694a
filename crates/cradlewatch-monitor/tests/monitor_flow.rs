//! End-to-end monitor flow over a spawned runtime task with paused time.
//!
//! Exercises the full dual-path pipeline: push notifications, keep-alive
//! probes catching silent changes, automatic recovery after a driver
//! failure, and lifecycle-driven shutdown.

use std::time::Duration;

use cradlewatch_core::{InsertionState, LockState, MonitorConfig, MonitorState};
use cradlewatch_hardware::{MockCradleHandle, MockRegistry};
use cradlewatch_monitor::{LifecycleAdapter, MonitorError, MonitorHandle, MonitorRuntime};
use tokio::sync::mpsc;
use tokio::time::timeout;

const PROBE_PERIOD: Duration = Duration::from_secs(5);
const RECV_WAIT: Duration = Duration::from_secs(30);

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("cradlewatch_monitor=debug")
        .with_test_writer()
        .try_init();
}

fn spawn_monitor() -> (
    MonitorHandle,
    MockCradleHandle,
    mpsc::Receiver<InsertionState>,
) {
    init_tracing();
    let (registry, hw) = MockRegistry::new();
    let config = MonitorConfig::default().with_keep_alive_interval(PROBE_PERIOD);
    let (runtime, handle, events) = MonitorRuntime::new(registry, config);
    tokio::spawn(runtime.run());
    (handle, hw, events)
}

async fn next_event(events: &mut mpsc::Receiver<InsertionState>) -> InsertionState {
    timeout(RECV_WAIT, events.recv())
        .await
        .expect("no event within the wait window")
        .expect("event stream closed")
}

async fn expect_quiet(events: &mut mpsc::Receiver<InsertionState>) {
    // With paused time this advances the clock past several probe periods
    // instantly, so a wrongly scheduled probe or duplicate would surface.
    assert!(
        timeout(RECV_WAIT, events.recv()).await.is_err(),
        "unexpected event"
    );
}

#[tokio::test(start_paused = true)]
async fn test_push_and_probe_feed_one_event_stream() {
    let (handle, hw, mut events) = spawn_monitor();
    hw.set_insertion_state(InsertionState::Extracted);

    assert!(handle.start().await.unwrap());
    assert_eq!(next_event(&mut events).await, InsertionState::Extracted);

    // Push path.
    hw.set_insertion_state(InsertionState::InsertedCorrectly);
    assert_eq!(
        next_event(&mut events).await,
        InsertionState::InsertedCorrectly
    );

    // Poll path: the listener has gone quiet, only the probe can see this.
    hw.set_insertion_state_silently(InsertionState::Extracted);
    assert_eq!(next_event(&mut events).await, InsertionState::Extracted);

    // Unchanged state stays quiet across many probe periods.
    expect_quiet(&mut events).await;
}

#[tokio::test(start_paused = true)]
async fn test_probe_failure_triggers_recovery() {
    let (handle, hw, mut events) = spawn_monitor();
    hw.set_insertion_state(InsertionState::InsertedCorrectly);

    assert!(handle.start().await.unwrap());
    assert_eq!(
        next_event(&mut events).await,
        InsertionState::InsertedCorrectly
    );
    assert_eq!(hw.vend_count(), 1);

    // The next probe hits a dead driver; recovery re-acquires the handle
    // and the fresh baseline re-emits the current state.
    hw.fail_next_query();
    assert_eq!(
        next_event(&mut events).await,
        InsertionState::InsertedCorrectly
    );
    assert_eq!(hw.vend_count(), 2);
    assert_eq!(handle.state().await.unwrap(), MonitorState::Registered);

    // Recovered monitor still observes changes.
    hw.set_insertion_state_silently(InsertionState::Extracted);
    assert_eq!(next_event(&mut events).await, InsertionState::Extracted);
}

#[tokio::test(start_paused = true)]
async fn test_persistent_failure_goes_idle_until_resume() {
    let (handle, hw, mut events) = spawn_monitor();
    let lifecycle = LifecycleAdapter::new(handle.clone());
    hw.set_insertion_state(InsertionState::InsertedCorrectly);

    assert!(handle.start().await.unwrap());
    assert_eq!(
        next_event(&mut events).await,
        InsertionState::InsertedCorrectly
    );

    // Service dies outright: recovery fails and monitoring goes idle
    // without busy-retrying.
    hw.set_failing(true);
    expect_quiet(&mut events).await;
    assert_eq!(handle.state().await.unwrap(), MonitorState::Uninitialized);

    // Foreground resume re-establishes monitoring once the service is back.
    hw.set_failing(false);
    lifecycle.on_resume().await;
    assert_eq!(
        next_event(&mut events).await,
        InsertionState::InsertedCorrectly
    );
    assert_eq!(handle.state().await.unwrap(), MonitorState::Registered);
}

#[tokio::test(start_paused = true)]
async fn test_destroy_stops_all_paths() {
    let (handle, hw, mut events) = spawn_monitor();
    let lifecycle = LifecycleAdapter::new(handle.clone());
    hw.set_insertion_state(InsertionState::InsertedCorrectly);

    assert!(handle.start().await.unwrap());
    assert_eq!(
        next_event(&mut events).await,
        InsertionState::InsertedCorrectly
    );

    lifecycle.on_destroy().await;
    assert_eq!(handle.state().await.unwrap(), MonitorState::Uninitialized);
    assert!(!hw.listener_registered());

    // Neither a hardware change nor elapsed probe periods produce events.
    hw.set_insertion_state(InsertionState::Extracted);
    expect_quiet(&mut events).await;
}

#[tokio::test(start_paused = true)]
async fn test_unlock_through_handle() {
    let (handle, hw, _events) = spawn_monitor();
    hw.set_insertion_state(InsertionState::InsertedCorrectly);
    hw.set_lock_state(LockState::Locked);

    // No start needed; the cradle is acquired on demand.
    assert!(handle.unlock().await.unwrap());
    assert_eq!(hw.lock_state(), LockState::Unlocked);
    assert!(!handle.unlock().await.unwrap());

    hw.set_insertion_state(InsertionState::Extracted);
    hw.set_lock_state(LockState::Locked);
    assert!(!handle.unlock().await.unwrap());
    assert_eq!(hw.lock_state(), LockState::Locked);
}

#[tokio::test(start_paused = true)]
async fn test_start_without_cradle_reports_false() {
    let (handle, hw, mut events) = spawn_monitor();
    hw.set_present(false);

    assert!(!handle.start().await.unwrap());
    assert_eq!(handle.state().await.unwrap(), MonitorState::Uninitialized);
    assert!(matches!(
        handle.current_state().await,
        Err(MonitorError::CradleNotFound)
    ));
    expect_quiet(&mut events).await;
}
