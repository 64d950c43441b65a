//! System-wide constants for the master firmware workspace.
//!
//! Single source of truth for all numeric limits and sentinels.
//! Imported by all crates; never duplicate a value elsewhere.

/// Maximum length of a motor id in bytes.
pub const MOTOR_ID_MAX_LEN: usize = 24;

/// Bus address value meaning "not assigned yet".
pub const BUS_ID_NOT_SET: u16 = 0xFFFF;

/// Number of points a single trajectory buffer can hold.
pub const TRAJECTORY_BUFFER_POINTS: usize = 32;

/// Upper bound for the trajectory buffer pool size.
pub const MAX_TRAJECTORY_BUFFERS: usize = 64;

/// Maximum number of actuators in one registry.
pub const MAX_ACTUATORS: usize = 64;

/// Default bus dispatch period in microseconds (100 Hz).
pub const DISPATCH_PERIOD_US: u64 = 10_000;

/// Name of the parameter namespace actuators are mounted under.
pub const ACTUATOR_NAMESPACE: &str = "actuator";

/// Default configuration file path.
pub const DEFAULT_CONFIG_PATH: &str = "/etc/master/motors.toml";
