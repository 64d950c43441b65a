//! Error types of the motor core.
//!
//! Every failure here is recoverable and reported to the caller; contract
//! violations (reading a setpoint without the lock, releasing a buffer
//! twice) are ruled out by the types instead.

use std::time::Duration;

use master_common::motor::MotorIdError;
use thiserror::Error;

/// Trajectory buffer pool errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PoolError {
    /// Every buffer is owned by a driver in trajectory mode.
    #[error("trajectory buffer pool exhausted ({capacity} buffers in use)")]
    Exhausted { capacity: usize },
}

/// Rejected trajectory input. The target buffer is left untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TrajectoryError {
    #[error("trajectory has no points")]
    Empty,

    #[error("trajectory has {len} points, buffer holds {max}")]
    TooManyPoints { len: usize, max: usize },

    /// Point `index` is not strictly later than point `index - 1`.
    #[error("trajectory timestamps not strictly increasing at point {index}")]
    NonMonotonic { index: usize },
}

/// Errors reported by `MotorDriver` operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MotorError {
    #[error(transparent)]
    Pool(#[from] PoolError),

    #[error(transparent)]
    Trajectory(#[from] TrajectoryError),

    /// The value is reserved as the "not set" sentinel.
    #[error("bus id {0:#06x} is reserved")]
    InvalidBusId(u16),
}

/// Registry construction errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("motor id '{0}' is already registered")]
    DuplicateId(String),

    #[error("invalid motor id: {0}")]
    InvalidId(#[from] MotorIdError),
}

/// Failure reported by a bus transport for one frame.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("bus I/O error: {0}")]
    Io(String),

    #[error("frame rejected: {0}")]
    Rejected(String),
}

/// Outcome of a bounded or cancellable wait.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WaitError {
    #[error("condition not reached within {0:?}")]
    TimedOut(Duration),

    #[error("wait cancelled")]
    Cancelled,
}
