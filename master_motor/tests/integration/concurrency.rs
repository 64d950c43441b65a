//! Integration test: a planner thread mutating drivers while a dispatcher
//! thread snapshots them.
//!
//! Every observed command must be self-consistent: the value always
//! belongs to the mode it was read with, and the pool never leaks. One
//! driver's lock never stalls another driver or the pool.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, mpsc};
use std::thread;
use std::time::Duration;

use master_common::motor::{ControlMode, TrajectoryPoint};
use master_common::param::ParameterNamespace;
use master_common::time::Timestamp;
use master_motor::{BusCommand, MotorDriverRegistry, TrajectoryBufferPool};

// Each mode gets its own value range so a mixed-up read is detectable.
const POSITION: f32 = 1.0;
const VELOCITY: f32 = 2.0;
const TORQUE: f32 = 3.0;
const VOLTAGE: f32 = 4.0;

fn points() -> [TrajectoryPoint; 2] {
    [
        TrajectoryPoint::new(Timestamp::from_millis(0), 5.0, 0.0),
        TrajectoryPoint::new(Timestamp::from_millis(10), 5.0, 0.0),
    ]
}

#[test]
fn snapshots_never_mix_modes() {
    let mut reg = MotorDriverRegistry::new(
        TrajectoryBufferPool::new(2),
        ParameterNamespace::root().child("actuator"),
    );
    for id in ["a", "b", "c"] {
        reg.create(id).unwrap();
    }
    let reg = Arc::new(reg);
    let stop = Arc::new(AtomicBool::new(false));

    let planner = {
        let reg = Arc::clone(&reg);
        let stop = Arc::clone(&stop);
        thread::spawn(move || {
            let mut step = 0u32;
            while !stop.load(Ordering::Relaxed) {
                for driver in reg.iter() {
                    match step % 6 {
                        0 => driver.set_position(POSITION),
                        1 => driver.set_velocity(VELOCITY),
                        2 => driver.set_torque(TORQUE),
                        3 => driver.set_voltage(VOLTAGE),
                        // Pool smaller than the driver count: exhaustion is expected.
                        4 => {
                            let _ = driver.update_trajectory(&points());
                        }
                        _ => driver.disable(),
                    }
                }
                step = step.wrapping_add(1);
            }
        })
    };

    let reader = {
        let reg = Arc::clone(&reg);
        thread::spawn(move || {
            for _ in 0..20_000 {
                for driver in reg.iter() {
                    let guard = driver.lock();
                    let mode = guard.control_mode();
                    let command = guard.command(Timestamp::from_millis(5));
                    drop(guard);

                    assert_eq!(command.mode(), mode);
                    match command {
                        BusCommand::Position(v) => assert_eq!(v, POSITION),
                        BusCommand::Velocity(v) => assert_eq!(v, VELOCITY),
                        BusCommand::Torque(v) => assert_eq!(v, TORQUE),
                        BusCommand::Voltage(v) => assert_eq!(v, VOLTAGE),
                        BusCommand::Trajectory(s) => assert_eq!(s.position, 5.0),
                        BusCommand::Disabled | BusCommand::NoData => {}
                    }
                }
            }
        })
    };

    reader.join().unwrap();
    stop.store(true, Ordering::Relaxed);
    planner.join().unwrap();

    // Any buffer still out is held by a driver in trajectory mode.
    let holding = reg
        .iter()
        .filter(|d| d.lock().control_mode() == ControlMode::Trajectory)
        .count();
    assert_eq!(reg.pool().in_use(), holding);
    for driver in reg.iter() {
        driver.disable();
    }
    assert_eq!(reg.pool().available(), 2);
}

#[test]
fn held_driver_lock_does_not_block_other_drivers_or_pool() {
    let mut reg = MotorDriverRegistry::new(
        TrajectoryBufferPool::new(2),
        ParameterNamespace::root().child("actuator"),
    );
    let a = reg.create("a").unwrap();
    let b = reg.create("b").unwrap();
    let reg = Arc::new(reg);

    let guard = reg.get(a).unwrap().lock();

    let (tx, rx) = mpsc::channel();
    let worker = {
        let reg = Arc::clone(&reg);
        thread::spawn(move || {
            let driver = reg.get(b).unwrap();
            driver.update_trajectory(&points()).unwrap();
            driver.disable();
            let buffer = reg.pool().acquire().unwrap();
            drop(buffer);
            tx.send(reg.pool().available()).unwrap();
        })
    };

    let available = rx
        .recv_timeout(Duration::from_secs(1))
        .expect("driver b and the pool stalled behind driver a's lock");
    assert_eq!(guard.control_mode(), ControlMode::Disabled);
    drop(guard);

    worker.join().unwrap();
    assert_eq!(available, 2);
}
