//! Simulated bus and planner for running the dispatch loop on a host.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use master_common::motor::TrajectoryPoint;
use master_common::time::Timestamp;
use master_motor::{BusCommand, BusFrame, BusTransport, MotorDriverRegistry, TransportError};
use tracing::{debug, info, warn};

/// Transport that logs every frame and remembers the last command per node.
#[derive(Debug, Default)]
pub struct SimulatedBus {
    last: HashMap<u16, BusCommand>,
    frames: u64,
}

impl SimulatedBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Last command received by `bus_id`.
    pub fn last_command(&self, bus_id: u16) -> Option<BusCommand> {
        self.last.get(&bus_id).copied()
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn nodes(&self) -> usize {
        self.last.len()
    }
}

impl BusTransport for SimulatedBus {
    fn transmit(&mut self, frame: &BusFrame<'_>) -> Result<(), TransportError> {
        debug!(
            "[sim] {} @{:#05x} t={}: {:?}",
            frame.driver_id, frame.bus_id, frame.timestamp, frame.command
        );
        self.last.insert(frame.bus_id, frame.command);
        self.frames += 1;
        Ok(())
    }
}

/// Back-and-forth trajectory starting at `start`, `period` per leg.
pub fn demo_trajectory(start: Timestamp, period: Duration, amplitude: f32) -> [TrajectoryPoint; 3] {
    let leg_s = period.as_secs_f32();
    let speed = if leg_s > 0.0 { amplitude / leg_s } else { 0.0 };
    [
        TrajectoryPoint::new(start, 0.0, speed),
        TrajectoryPoint::new(start + period, amplitude, -speed),
        TrajectoryPoint::new(start + period * 2, 0.0, 0.0),
    ]
}

/// Reload the demo trajectory into every driver once per round until
/// `running` drops, then disable them all.
pub fn spawn_demo_planner(
    registry: Arc<MotorDriverRegistry>,
    running: Arc<AtomicBool>,
    leg: Duration,
) -> JoinHandle<()> {
    thread::spawn(move || {
        info!("Demo planner started ({} drivers)", registry.len());
        while running.load(Ordering::SeqCst) {
            let points = demo_trajectory(Timestamp::now(), leg, 100.0);
            for driver in registry.iter() {
                if let Err(e) = driver.update_trajectory(&points) {
                    warn!("{}: demo trajectory rejected: {}", driver.id(), e);
                    driver.set_velocity(0.0);
                }
            }
            thread::sleep(leg * 2);
        }
        for driver in registry.iter() {
            driver.disable();
        }
        info!("Demo planner stopped");
    })
}
