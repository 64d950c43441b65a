//! Actuator-facing shared types.
//!
//! Everything the planning side, the motor core and the bus transport need
//! to agree on: motor ids, control modes, and the trajectory point/sample
//! layout.

pub mod id;
pub mod mode;
pub mod trajectory;

pub use id::{MotorId, MotorIdError};
pub use mode::ControlMode;
pub use trajectory::{TrajectoryPoint, TrajectorySample};
