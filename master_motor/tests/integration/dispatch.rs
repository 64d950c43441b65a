//! Integration test: configuration file → registry → dispatch passes.

use std::fs;
use std::sync::Arc;

use master_common::config::ConfigLoader;
use master_common::motor::{ControlMode, TrajectoryPoint};
use master_common::time::Timestamp;
use master_motor::{
    BusCommand, BusFrame, BusTransport, Dispatcher, MotorManagerConfig, TransportError,
};
use tempfile::TempDir;

const CONFIG_TOML: &str = r#"
[shared]
service_name = "dispatch-test"

[pool]
capacity = 2

[dispatch]
period_us = 1000

[[actuators]]
id = "left-wheel"
bus_id = 1

[[actuators]]
id = "right-wheel"
bus_id = 2

[[actuators]]
id = "lift"
"#;

#[derive(Default)]
struct CaptureBus {
    frames: Vec<(u16, ControlMode, BusCommand)>,
}

impl BusTransport for CaptureBus {
    fn transmit(&mut self, frame: &BusFrame<'_>) -> Result<(), TransportError> {
        self.frames
            .push((frame.bus_id, frame.command.mode(), frame.command));
        Ok(())
    }
}

fn load() -> MotorManagerConfig {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("motors.toml");
    fs::write(&path, CONFIG_TOML).unwrap();
    MotorManagerConfig::load(&path).unwrap()
}

#[test]
fn only_addressable_drivers_reach_the_bus() {
    let config = load();
    let registry = Arc::new(config.build_registry().unwrap());

    let mut dispatcher = Dispatcher::new(
        Arc::clone(&registry),
        CaptureBus::default(),
        config.dispatch.period(),
    );
    let report = dispatcher.dispatch_once(Timestamp::ZERO);

    assert_eq!(report.sent, 2);
    assert_eq!(report.unassigned, 1);
    let buses: Vec<_> = dispatcher.transport().frames.iter().map(|f| f.0).collect();
    assert_eq!(buses, [1, 2]);
}

#[test]
fn each_pass_reflects_latest_setpoints() {
    let config = load();
    let registry = Arc::new(config.build_registry().unwrap());
    let left = registry.iter().next().unwrap();
    let right = registry.iter().nth(1).unwrap();

    let mut dispatcher = Dispatcher::new(
        Arc::clone(&registry),
        CaptureBus::default(),
        config.dispatch.period(),
    );

    left.set_velocity(0.5);
    right.set_torque(1.5);
    dispatcher.dispatch_once(Timestamp::ZERO);

    right.update_trajectory(&[
        TrajectoryPoint::new(Timestamp::from_millis(0), 0.0, 2.0),
        TrajectoryPoint::new(Timestamp::from_millis(200), 40.0, 2.0),
    ])
    .unwrap();
    dispatcher.dispatch_once(Timestamp::from_millis(100));

    let bus = dispatcher.into_transport();
    let frames = &bus.frames;
    assert_eq!(frames[0].2, BusCommand::Velocity(0.5));
    assert_eq!(frames[1].2, BusCommand::Torque(1.5));
    assert_eq!(frames[2].2, BusCommand::Velocity(0.5));
    match frames[3].2 {
        BusCommand::Trajectory(sample) => {
            assert!((sample.position - 20.0).abs() < 1e-4);
            assert!((sample.velocity - 2.0).abs() < 1e-6);
            assert!(!sample.finished);
        }
        other => panic!("expected trajectory sample, got {other:?}"),
    }
}

#[test]
fn bus_id_can_be_assigned_after_startup() {
    let config = load();
    let registry = Arc::new(config.build_registry().unwrap());
    let mut dispatcher = Dispatcher::new(
        Arc::clone(&registry),
        CaptureBus::default(),
        config.dispatch.period(),
    );

    registry.iter().nth(2).unwrap().set_bus_id(0x30).unwrap();
    let report = dispatcher.dispatch_once(Timestamp::ZERO);
    assert_eq!(report.sent, 3);
    assert_eq!(report.unassigned, 0);
}
