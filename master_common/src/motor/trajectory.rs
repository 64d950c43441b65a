//! Trajectory point and sample layouts.
//!
//! A `TrajectoryPoint` is what the planner writes; a `TrajectorySample` is
//! what the interpolator hands to the bus dispatcher for one query time.

use serde::{Deserialize, Serialize};
use static_assertions::const_assert_eq;

use crate::time::Timestamp;

/// One waypoint of a time-indexed trajectory.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[repr(C)]
pub struct TrajectoryPoint {
    /// When this point applies.
    pub timestamp: Timestamp,
    /// Position setpoint [rad or m, actuator units].
    pub position: f32,
    /// Velocity setpoint [units/s].
    pub velocity: f32,
    /// Acceleration feed-forward [units/s²].
    pub acceleration: f32,
    /// Torque feed-forward [Nm].
    pub torque: f32,
}

const_assert_eq!(core::mem::size_of::<TrajectoryPoint>(), 24);

impl TrajectoryPoint {
    /// Point carrying only position and velocity.
    pub const fn new(timestamp: Timestamp, position: f32, velocity: f32) -> Self {
        Self {
            timestamp,
            position,
            velocity,
            acceleration: 0.0,
            torque: 0.0,
        }
    }

    pub const fn with_feedforward(mut self, acceleration: f32, torque: f32) -> Self {
        self.acceleration = acceleration;
        self.torque = torque;
        self
    }
}

/// Continuous command derived from a trajectory at one instant.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct TrajectorySample {
    pub position: f32,
    pub velocity: f32,
    pub acceleration: f32,
    pub torque: f32,
    /// Query time is past the last point; the values are a hold.
    pub finished: bool,
}

impl TrajectorySample {
    /// Hold the values of `point`.
    #[inline]
    pub const fn hold(point: &TrajectoryPoint, finished: bool) -> Self {
        Self {
            position: point.position,
            velocity: point.velocity,
            acceleration: point.acceleration,
            torque: point.torque,
            finished,
        }
    }
}
