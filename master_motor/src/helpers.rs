//! Blocking motion helpers built on the trajectory manager and the blocking
//! detectors.
//!
//! Every wait goes through [`poll_until`]: sleep the grace period first so
//! a freshly issued command has time to register, then poll the condition.
//! Without a timeout or cancel token a wait is unbounded.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use master_common::robot::{BlockingDetector, BoardMode, BoardModeCell, TrajectoryManager};
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::error::WaitError;

// ─── Configuration ──────────────────────────────────────────────────

/// Tunables of the helpers, `[helpers]` in the motor configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct HelperConfig {
    /// Delay before the first poll [ms].
    pub grace_ms: u64,
    /// Poll period [ms].
    pub poll_ms: u64,
    /// Give up waiting after this long [ms]. Unbounded when absent.
    pub wait_timeout_ms: Option<u64>,
    /// Relative move used to drive into a wall [mm].
    pub align_distance_mm: f32,
    pub aligning_error_threshold: u32,
    pub aligning_duration: u32,
    pub aligning_speed_mm_s: f64,
    pub aligning_speed_rad_s: f64,
    pub aligning_acc_mm_s2: f64,
    pub aligning_acc_rad_s2: f64,
}

impl Default for HelperConfig {
    fn default() -> Self {
        Self {
            grace_ms: 100,
            poll_ms: 1,
            wait_timeout_ms: None,
            align_distance_mm: -2000.0,
            aligning_error_threshold: 20000,
            aligning_duration: 2,
            aligning_speed_mm_s: 100.0,
            aligning_speed_rad_s: 0.75,
            aligning_acc_mm_s2: 150.0,
            aligning_acc_rad_s2: 1.57,
        }
    }
}

impl HelperConfig {
    /// Wait options described by this configuration, without a cancel token.
    pub fn wait_options(&self) -> WaitOptions {
        WaitOptions {
            grace: Duration::from_millis(self.grace_ms),
            poll_period: Duration::from_millis(self.poll_ms),
            timeout: self.wait_timeout_ms.map(Duration::from_millis),
            cancel: None,
        }
    }
}

// ─── Waiting ────────────────────────────────────────────────────────

/// Cooperative cancellation flag shared between a waiter and its owner.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// How a wait behaves.
#[derive(Debug, Clone)]
pub struct WaitOptions {
    /// Always slept before the first poll.
    pub grace: Duration,
    pub poll_period: Duration,
    /// Measured from the start of the wait, grace included.
    pub timeout: Option<Duration>,
    pub cancel: Option<CancelToken>,
}

impl Default for WaitOptions {
    fn default() -> Self {
        Self {
            grace: Duration::from_millis(100),
            poll_period: Duration::from_millis(1),
            timeout: None,
            cancel: None,
        }
    }
}

impl WaitOptions {
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_cancel(mut self, cancel: CancelToken) -> Self {
        self.cancel = Some(cancel);
        self
    }
}

/// Sleep the grace period, then poll `condition` until it holds.
///
/// # Errors
/// [`WaitError::Cancelled`] once the token is cancelled,
/// [`WaitError::TimedOut`] when the timeout elapses first.
pub fn poll_until(mut condition: impl FnMut() -> bool, options: &WaitOptions) -> Result<(), WaitError> {
    let start = Instant::now();
    thread::sleep(options.grace);

    loop {
        if options.cancel.as_ref().is_some_and(CancelToken::is_cancelled) {
            return Err(WaitError::Cancelled);
        }
        if condition() {
            return Ok(());
        }
        if let Some(timeout) = options.timeout {
            if start.elapsed() >= timeout {
                return Err(WaitError::TimedOut(timeout));
            }
        }
        thread::sleep(options.poll_period);
    }
}

/// Block until the trajectory manager reports the current move finished.
pub fn wait_for_finish<T>(traj: &T, options: &WaitOptions) -> Result<(), WaitError>
where
    T: TrajectoryManager + ?Sized,
{
    poll_until(|| traj.is_finished(), options)
}

/// Block until `detector` reports a collision.
pub fn wait_for_collision<D>(detector: &D, options: &WaitOptions) -> Result<(), WaitError>
where
    D: BlockingDetector + ?Sized,
{
    poll_until(|| detector.is_blocked(), options)
}

// ─── Motion helpers ─────────────────────────────────────────────────

/// Back into a wall until the distance detector fires, then restore
/// angle+distance control.
///
/// If the collision wait fails the robot is hard-stopped and the board is
/// left in distance-only mode.
pub fn align_with_wall<T, D, A>(
    mode: &BoardModeCell,
    traj: &T,
    distance_bd: &D,
    angle_bd: &A,
    config: &HelperConfig,
    options: &WaitOptions,
) -> Result<(), WaitError>
where
    T: TrajectoryManager + ?Sized,
    D: BlockingDetector + ?Sized,
    A: BlockingDetector + ?Sized,
{
    info!("Aligning with wall ({} mm)", config.align_distance_mm);
    mode.set(BoardMode::DistanceOnly);
    traj.command_relative_distance(config.align_distance_mm);

    if let Err(e) = wait_for_collision(distance_bd, options) {
        traj.hard_stop();
        warn!("Wall alignment aborted: {}", e);
        return Err(e);
    }

    traj.hard_stop();
    distance_bd.reset();
    angle_bd.reset();
    mode.set(BoardMode::AngleDistance);
    debug!("Wall reached, angle control restored");
    Ok(())
}

/// Switch to the soft, distance-only profile used while aligning.
///
/// The angle detector keeps its settings.
pub fn set_mode_aligning<T, D, A>(
    mode: &BoardModeCell,
    traj: &T,
    distance_bd: &D,
    _angle_bd: &A,
    config: &HelperConfig,
) where
    T: TrajectoryManager + ?Sized,
    D: BlockingDetector + ?Sized,
    A: BlockingDetector + ?Sized,
{
    mode.set(BoardMode::DistanceOnly);
    distance_bd.set_thresholds(config.aligning_error_threshold, config.aligning_duration);
    traj.set_speed(
        traj.speed_mm_to_imp(config.aligning_speed_mm_s),
        traj.speed_rad_to_imp(config.aligning_speed_rad_s),
    );
    traj.set_acceleration(
        traj.acc_mm_to_imp(config.aligning_acc_mm_s2),
        traj.acc_rad_to_imp(config.aligning_acc_rad_s2),
    );
    debug!("Aligning profile set");
}

/// Go to `(x, y)`, then turn to the absolute heading `a_deg`, waiting for
/// each move.
pub fn move_to<T>(traj: &T, x_mm: f32, y_mm: f32, a_deg: f32, options: &WaitOptions) -> Result<(), WaitError>
where
    T: TrajectoryManager + ?Sized,
{
    debug!("Moving to ({}, {}) heading {}", x_mm, y_mm, a_deg);
    traj.goto_absolute_xy(x_mm, y_mm);
    wait_for_finish(traj, options)?;
    traj.command_absolute_angle(a_deg);
    wait_for_finish(traj, options)
}
