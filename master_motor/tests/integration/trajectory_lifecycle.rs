//! Integration test: buffers move between the pool and drivers as modes
//! change.

use master_common::motor::{ControlMode, TrajectoryPoint};
use master_common::param::ParameterNamespace;
use master_common::time::Timestamp;
use master_motor::{
    BusCommand, MotorDriverRegistry, MotorError, PoolError, TrajectoryBufferPool,
};

fn ramp(start_ms: i64, n: usize) -> Vec<TrajectoryPoint> {
    (0..n)
        .map(|i| {
            let t = start_ms + i as i64 * 10;
            TrajectoryPoint::new(Timestamp::from_millis(t), i as f32, 1.0)
        })
        .collect()
}

fn registry(pool_capacity: usize, ids: &[&str]) -> MotorDriverRegistry {
    let mut reg = MotorDriverRegistry::new(
        TrajectoryBufferPool::new(pool_capacity),
        ParameterNamespace::root().child("actuator"),
    );
    for id in ids {
        reg.create(id).unwrap();
    }
    reg
}

#[test]
fn third_driver_waits_for_a_free_buffer() {
    let reg = registry(2, &["a", "b", "c"]);
    let drivers: Vec<_> = reg.iter().collect();

    drivers[0].update_trajectory(&ramp(0, 4)).unwrap();
    drivers[1].update_trajectory(&ramp(0, 4)).unwrap();

    drivers[2].set_position(3.0);
    assert_eq!(
        drivers[2].update_trajectory(&ramp(0, 4)),
        Err(MotorError::Pool(PoolError::Exhausted { capacity: 2 }))
    );
    assert_eq!(drivers[2].lock().control_mode(), ControlMode::Position);

    drivers[0].disable();
    drivers[2].update_trajectory(&ramp(0, 4)).unwrap();
    assert_eq!(drivers[2].lock().control_mode(), ControlMode::Trajectory);
    assert_eq!(reg.pool().available(), 0);
}

#[test]
fn replacing_a_trajectory_keeps_the_same_buffer() {
    let reg = registry(1, &["arm"]);
    let arm = reg.iter().next().unwrap();

    for round in 0..10 {
        arm.update_trajectory(&ramp(round * 1000, 1 + round as usize))
            .unwrap();
        assert_eq!(reg.pool().in_use(), 1);
    }
    assert_eq!(arm.lock().trajectory().map(|b| b.len()), Some(10));
}

#[test]
fn trajectory_runs_to_completion() {
    let reg = registry(1, &["arm"]);
    let arm = reg.iter().next().unwrap();
    arm.update_trajectory(&ramp(0, 5)).unwrap();

    let finished_at = |ms| match arm.snapshot(Timestamp::from_millis(ms)) {
        BusCommand::Trajectory(sample) => sample.finished,
        other => panic!("unexpected {other:?}"),
    };
    assert!(!finished_at(0));
    assert!(!finished_at(40));
    assert!(finished_at(41));

    arm.set_position(4.0);
    assert_eq!(reg.pool().available(), 1);
}
