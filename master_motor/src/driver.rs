//! Per-actuator motor driver.
//!
//! A `MotorDriver` is the rendezvous between the planner, which changes
//! mode and setpoints, and the bus dispatcher, which reads the current
//! command once per period and sends it to the actuator node.
//!
//! ## Locking
//!
//! Mode, setpoint and trajectory buffer are one value, [`Setpoint`], behind
//! one mutex. The variant *is* the control mode, so a reader can never see
//! a mode paired with another mode's value.
//!
//! - Readers call [`MotorDriver::lock`] and read through the returned
//!   [`MotorDriverGuard`]; everything read through one guard is a single
//!   consistent observation. The lock is released when the guard drops.
//! - Mutators (`set_*`, `update_trajectory`, `disable`) take the lock
//!   themselves. Calling one while holding a guard of the same driver
//!   deadlocks.
//! - Leaving trajectory mode drops the pooled buffer while the lock is
//!   still held, so the buffer is back in the pool before anyone can
//!   observe the new mode.
//!
//! Hold the guard for copies only, never across bus I/O.

use std::sync::atomic::{AtomicU16, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use master_common::consts::BUS_ID_NOT_SET;
use master_common::motor::{ControlMode, MotorId, MotorIdError, TrajectoryPoint, TrajectorySample};
use master_common::param::ParameterNamespace;
use master_common::time::Timestamp;
use tracing::{debug, warn};

use crate::buffer::TrajectoryBuffer;
use crate::error::MotorError;
use crate::interpolate;
use crate::pool::{PooledBuffer, TrajectoryBufferPool};

/// Current command of a driver, tagged by control mode.
#[derive(Debug, Default)]
pub enum Setpoint {
    #[default]
    Disabled,
    Position(f32),
    Velocity(f32),
    Torque(f32),
    Voltage(f32),
    /// Buffer owned by the driver for as long as it stays in this mode.
    Trajectory(PooledBuffer),
}

impl Setpoint {
    #[inline]
    pub fn mode(&self) -> ControlMode {
        match self {
            Self::Disabled => ControlMode::Disabled,
            Self::Position(_) => ControlMode::Position,
            Self::Velocity(_) => ControlMode::Velocity,
            Self::Torque(_) => ControlMode::Torque,
            Self::Voltage(_) => ControlMode::Voltage,
            Self::Trajectory(_) => ControlMode::Trajectory,
        }
    }
}

/// Snapshot of a driver's command for one dispatch period.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BusCommand {
    Disabled,
    Position(f32),
    Velocity(f32),
    Torque(f32),
    Voltage(f32),
    Trajectory(TrajectorySample),
    /// Trajectory mode with an empty buffer: nothing valid to send.
    NoData,
}

impl BusCommand {
    pub fn mode(&self) -> ControlMode {
        match self {
            Self::Disabled => ControlMode::Disabled,
            Self::Position(_) => ControlMode::Position,
            Self::Velocity(_) => ControlMode::Velocity,
            Self::Torque(_) => ControlMode::Torque,
            Self::Voltage(_) => ControlMode::Voltage,
            Self::Trajectory(_) | Self::NoData => ControlMode::Trajectory,
        }
    }
}

/// One actuator: identity, bus address, parameter mount and command state.
#[derive(Debug)]
pub struct MotorDriver {
    id: MotorId,
    bus_id: AtomicU16,
    namespace: ParameterNamespace,
    pool: TrajectoryBufferPool,
    state: Mutex<Setpoint>,
}

impl MotorDriver {
    /// Create a disabled driver mounted as `parent/<id>`.
    pub fn new(id: MotorId, parent: &ParameterNamespace, pool: TrajectoryBufferPool) -> Self {
        let namespace = parent.child(id.as_str());
        Self {
            id,
            bus_id: AtomicU16::new(BUS_ID_NOT_SET),
            namespace,
            pool,
            state: Mutex::new(Setpoint::Disabled),
        }
    }

    /// Like [`MotorDriver::new`], validating a raw id first.
    pub fn with_name(
        id: &str,
        parent: &ParameterNamespace,
        pool: TrajectoryBufferPool,
    ) -> Result<Self, MotorIdError> {
        Ok(Self::new(MotorId::new(id)?, parent, pool))
    }

    #[inline]
    pub fn id(&self) -> &MotorId {
        &self.id
    }

    /// Parameter tree mount point of this actuator.
    #[inline]
    pub fn parameter_namespace(&self) -> &ParameterNamespace {
        &self.namespace
    }

    /// Bus address, `None` until assigned.
    #[inline]
    pub fn bus_id(&self) -> Option<u16> {
        match self.bus_id.load(Ordering::Acquire) {
            BUS_ID_NOT_SET => None,
            id => Some(id),
        }
    }

    /// Assign the bus address.
    ///
    /// # Errors
    /// [`MotorError::InvalidBusId`] for the reserved "not set" value.
    pub fn set_bus_id(&self, bus_id: u16) -> Result<(), MotorError> {
        if bus_id == BUS_ID_NOT_SET {
            return Err(MotorError::InvalidBusId(bus_id));
        }
        self.bus_id.store(bus_id, Ordering::Release);
        debug!("{}: bus id {}", self.id, bus_id);
        Ok(())
    }

    /// Lock the command state for reading.
    pub fn lock(&self) -> MotorDriverGuard<'_> {
        MotorDriverGuard {
            id: &self.id,
            state: self.state(),
        }
    }

    pub fn set_position(&self, position: f32) {
        self.replace(Setpoint::Position(position));
    }

    pub fn set_velocity(&self, velocity: f32) {
        self.replace(Setpoint::Velocity(velocity));
    }

    pub fn set_torque(&self, torque: f32) {
        self.replace(Setpoint::Torque(torque));
    }

    pub fn set_voltage(&self, voltage: f32) {
        self.replace(Setpoint::Voltage(voltage));
    }

    /// Switch off the output stage, returning any trajectory buffer.
    pub fn disable(&self) {
        self.replace(Setpoint::Disabled);
    }

    /// Load a new trajectory and enter trajectory mode.
    ///
    /// Reuses the buffer already held when the driver is in trajectory mode,
    /// otherwise takes one from the pool. The buffer content is replaced,
    /// not appended to.
    ///
    /// # Errors
    /// - [`MotorError::Trajectory`] if `points` is empty, too long or not
    ///   strictly time-ordered.
    /// - [`MotorError::Pool`] if no buffer is free.
    ///
    /// On error the driver keeps its previous mode and setpoint.
    pub fn update_trajectory(&self, points: &[TrajectoryPoint]) -> Result<(), MotorError> {
        TrajectoryBuffer::validate(points)?;

        let mut state = self.state();
        if let Setpoint::Trajectory(buffer) = &mut *state {
            buffer.load(points)?;
            return Ok(());
        }

        let mut buffer = match self.pool.acquire() {
            Ok(buffer) => buffer,
            Err(e) => {
                let kept = state.mode();
                drop(state);
                warn!("{}: {}; staying in {} mode", self.id, e, kept);
                return Err(e.into());
            }
        };
        buffer.load(points)?;
        let previous = state.mode();
        *state = Setpoint::Trajectory(buffer);
        drop(state);

        debug!("{}: {} -> trajectory ({} points)", self.id, previous, points.len());
        Ok(())
    }

    /// Current command for the bus, as one atomic observation.
    ///
    /// In trajectory mode the buffer is sampled at `now` under the lock.
    pub fn snapshot(&self, now: Timestamp) -> BusCommand {
        self.lock().command(now)
    }

    fn replace(&self, setpoint: Setpoint) {
        let mut state = self.state();
        let previous = state.mode();
        let next = setpoint.mode();
        // Any trajectory buffer goes back to the pool here, lock still held.
        *state = setpoint;
        drop(state);

        if previous != next {
            debug!("{}: {} -> {}", self.id, previous, next);
        }
    }

    fn state(&self) -> MutexGuard<'_, Setpoint> {
        // Writers replace the whole value in one assignment; a panicking
        // holder can't leave it half-written.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Read access to a locked driver.
///
/// Every getter observes the same state; the driver stays locked until the
/// guard is dropped.
pub struct MotorDriverGuard<'a> {
    id: &'a MotorId,
    state: MutexGuard<'a, Setpoint>,
}

impl MotorDriverGuard<'_> {
    #[inline]
    pub fn id(&self) -> &MotorId {
        self.id
    }

    #[inline]
    pub fn control_mode(&self) -> ControlMode {
        self.state.mode()
    }

    #[inline]
    pub fn setpoint(&self) -> &Setpoint {
        &self.state
    }

    /// Position setpoint, `None` unless in position mode.
    pub fn position_setpoint(&self) -> Option<f32> {
        match *self.state {
            Setpoint::Position(v) => Some(v),
            _ => None,
        }
    }

    /// Velocity setpoint, `None` unless in velocity mode.
    pub fn velocity_setpoint(&self) -> Option<f32> {
        match *self.state {
            Setpoint::Velocity(v) => Some(v),
            _ => None,
        }
    }

    /// Torque setpoint, `None` unless in torque mode.
    pub fn torque_setpoint(&self) -> Option<f32> {
        match *self.state {
            Setpoint::Torque(v) => Some(v),
            _ => None,
        }
    }

    /// Voltage setpoint, `None` unless in voltage mode.
    pub fn voltage_setpoint(&self) -> Option<f32> {
        match *self.state {
            Setpoint::Voltage(v) => Some(v),
            _ => None,
        }
    }

    /// Held trajectory buffer, `None` unless in trajectory mode.
    pub fn trajectory(&self) -> Option<&TrajectoryBuffer> {
        match &*self.state {
            Setpoint::Trajectory(buffer) => Some(&**buffer),
            _ => None,
        }
    }

    /// Trajectory sampled at `t`; `None` outside trajectory mode or when
    /// the buffer holds no points.
    pub fn trajectory_sample(&self, t: Timestamp) -> Option<TrajectorySample> {
        self.trajectory().and_then(|buffer| interpolate::sample(buffer, t))
    }

    /// Command to put on the bus at `now`.
    pub fn command(&self, now: Timestamp) -> BusCommand {
        match &*self.state {
            Setpoint::Disabled => BusCommand::Disabled,
            Setpoint::Position(v) => BusCommand::Position(*v),
            Setpoint::Velocity(v) => BusCommand::Velocity(*v),
            Setpoint::Torque(v) => BusCommand::Torque(*v),
            Setpoint::Voltage(v) => BusCommand::Voltage(*v),
            Setpoint::Trajectory(buffer) => interpolate::sample(buffer, now)
                .map_or(BusCommand::NoData, BusCommand::Trajectory),
        }
    }
}
