//! # Master Motor
//!
//! Actuator layer of the master firmware. Owns one [`MotorDriver`] per
//! actuator, a shared pool of trajectory buffers, and the fixed-rate
//! dispatcher that turns every driver's current setpoint into a bus frame.
//!
//! ## Threads
//!
//! 1. **Planner**: changes modes and setpoints through the driver mutators.
//! 2. **Dispatcher**: once per period takes one locked snapshot per driver
//!    and transmits it after unlocking.
//! 3. **Strategy**: runs the blocking helpers, which sleep and poll on the
//!    calling thread.
//!
//! ## No Allocation After Startup
//!
//! Trajectory buffers are allocated once, when the pool is built. Loading a
//! trajectory, sampling it and returning it to the pool copy into
//! preallocated storage only.

pub mod buffer;
pub mod config;
pub mod dispatch;
pub mod driver;
pub mod error;
pub mod helpers;
pub mod interpolate;
pub mod pool;
pub mod registry;

pub use buffer::TrajectoryBuffer;
pub use config::MotorManagerConfig;
pub use dispatch::{BusFrame, BusTransport, CycleReport, DispatchStats, Dispatcher};
pub use driver::{BusCommand, MotorDriver, MotorDriverGuard, Setpoint};
pub use error::{MotorError, PoolError, RegistryError, TrajectoryError, TransportError, WaitError};
pub use helpers::{CancelToken, HelperConfig, WaitOptions};
pub use pool::{PooledBuffer, TrajectoryBufferPool};
pub use registry::{DriverHandle, MotorDriverRegistry};
