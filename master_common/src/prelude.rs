//! Prelude module for common re-exports.
//!
//! ```rust
//! use master_common::prelude::*;
//! ```

use std::time::Duration;

// ─── Configuration ──────────────────────────────────────────────────
pub use crate::config::{ConfigError, ConfigLoader, LogLevel, SharedConfig};

// ─── System Constants ───────────────────────────────────────────────
pub use crate::consts::{
    BUS_ID_NOT_SET, MAX_ACTUATORS, MAX_TRAJECTORY_BUFFERS, MOTOR_ID_MAX_LEN,
    TRAJECTORY_BUFFER_POINTS,
};

// ─── Actuator Types ─────────────────────────────────────────────────
pub use crate::motor::{ControlMode, MotorId, MotorIdError, TrajectoryPoint, TrajectorySample};
pub use crate::param::ParameterNamespace;
pub use crate::time::Timestamp;

// ─── Collaborators ──────────────────────────────────────────────────
pub use crate::robot::{BlockingDetector, BoardMode, BoardModeCell, TrajectoryManager};

/// Default bus dispatch period as Duration.
pub const DEFAULT_DISPATCH_PERIOD: Duration =
    Duration::from_micros(crate::consts::DISPATCH_PERIOD_US);
