//! Integration test: wall alignment against a simulated base.
//!
//! The simulated base drives backwards on `command_relative_distance` and
//! trips the distance detector after a few polls, the way a real robot
//! stalls against the border.

use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use master_common::robot::{BlockingDetector, BoardMode, BoardModeCell, TrajectoryManager};
use master_motor::helpers::{align_with_wall, move_to, set_mode_aligning};
use master_motor::{CancelToken, HelperConfig, WaitError, WaitOptions};

#[derive(Default)]
struct SimBase {
    moving: AtomicBool,
    stops: AtomicU32,
    last_distance: Mutex<Option<f32>>,
    speed: Mutex<Option<(f64, f64)>>,
    acc: Mutex<Option<(f64, f64)>>,
}

impl TrajectoryManager for SimBase {
    fn is_finished(&self) -> bool {
        !self.moving.load(Ordering::SeqCst)
    }
    fn command_relative_distance(&self, distance_mm: f32) {
        *self.last_distance.lock().unwrap() = Some(distance_mm);
        self.moving.store(true, Ordering::SeqCst);
    }
    fn command_absolute_angle(&self, _angle_deg: f32) {}
    fn goto_absolute_xy(&self, _x_mm: f32, _y_mm: f32) {}
    fn hard_stop(&self) {
        self.stops.fetch_add(1, Ordering::SeqCst);
        self.moving.store(false, Ordering::SeqCst);
    }
    fn set_speed(&self, distance_speed: f64, angle_speed: f64) {
        *self.speed.lock().unwrap() = Some((distance_speed, angle_speed));
    }
    fn set_acceleration(&self, distance_acc: f64, angle_acc: f64) {
        *self.acc.lock().unwrap() = Some((distance_acc, angle_acc));
    }
    fn speed_mm_to_imp(&self, v: f64) -> f64 {
        v
    }
    fn speed_rad_to_imp(&self, v: f64) -> f64 {
        v
    }
    fn acc_mm_to_imp(&self, v: f64) -> f64 {
        v
    }
    fn acc_rad_to_imp(&self, v: f64) -> f64 {
        v
    }
}

/// Reports blocked after `trip_after` polls.
struct StallDetector {
    polls: AtomicU32,
    trip_after: u32,
    resets: AtomicU32,
}

impl StallDetector {
    fn new(trip_after: u32) -> Self {
        Self {
            polls: AtomicU32::new(0),
            trip_after,
            resets: AtomicU32::new(0),
        }
    }
}

impl BlockingDetector for StallDetector {
    fn is_blocked(&self) -> bool {
        self.polls.fetch_add(1, Ordering::SeqCst) + 1 >= self.trip_after
    }
    fn reset(&self) {
        self.resets.fetch_add(1, Ordering::SeqCst);
    }
    fn set_thresholds(&self, _error_threshold: u32, _duration: u32) {}
}

fn quick() -> WaitOptions {
    WaitOptions {
        grace: Duration::from_millis(10),
        ..WaitOptions::default()
    }
}

#[test]
fn full_alignment_sequence() {
    let mode = BoardModeCell::default();
    let base = SimBase::default();
    let distance = StallDetector::new(5);
    let angle = StallDetector::new(u32::MAX);
    let config = HelperConfig::default();

    set_mode_aligning(&mode, &base, &distance, &angle, &config);
    assert_eq!(*base.speed.lock().unwrap(), Some((100.0, 0.75)));
    assert_eq!(*base.acc.lock().unwrap(), Some((150.0, 1.57)));

    align_with_wall(&mode, &base, &distance, &angle, &config, &quick()).unwrap();

    assert_eq!(*base.last_distance.lock().unwrap(), Some(-2000.0));
    assert!(distance.polls.load(Ordering::SeqCst) >= 5);
    assert_eq!(base.stops.load(Ordering::SeqCst), 1);
    assert_eq!(distance.resets.load(Ordering::SeqCst), 1);
    assert_eq!(angle.resets.load(Ordering::SeqCst), 1);
    assert_eq!(mode.get(), BoardMode::AngleDistance);
}

#[test]
fn alignment_can_be_cancelled_from_another_thread() {
    let mode = BoardModeCell::default();
    let base = SimBase::default();
    let distance = StallDetector::new(u32::MAX);
    let angle = StallDetector::new(u32::MAX);
    let token = CancelToken::new();

    let canceller = {
        let token = token.clone();
        thread::spawn(move || {
            thread::sleep(Duration::from_millis(30));
            token.cancel();
        })
    };

    let result = align_with_wall(
        &mode,
        &base,
        &distance,
        &angle,
        &HelperConfig::default(),
        &quick().with_cancel(token),
    );
    canceller.join().unwrap();

    assert_eq!(result, Err(WaitError::Cancelled));
    assert_eq!(base.stops.load(Ordering::SeqCst), 1);
    assert!(base.is_finished());
    assert_eq!(mode.get(), BoardMode::DistanceOnly);
}

#[test]
fn move_to_waits_for_each_leg() {
    let base = SimBase::default();
    let start = Instant::now();
    move_to(&base, 100.0, 200.0, 45.0, &quick()).unwrap();
    // Two waits, each with its own grace period.
    assert!(start.elapsed() >= Duration::from_millis(20));
}
