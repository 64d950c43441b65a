//! Master Firmware Common Library
//!
//! This crate provides shared constants, configuration loading utilities and
//! the actuator-facing types used by every crate of the master firmware
//! workspace.
//!
//! # Module Structure
//!
//! - [`consts`] - System-wide limits (id length, buffer sizes, sentinels)
//! - [`config`] - Configuration loading traits and types
//! - [`motor`] - Control modes, motor ids, trajectory points and samples
//! - [`param`] - Parameter namespace mount points
//! - [`robot`] - Collaborator contracts (trajectory manager, blocking detection)
//! - [`time`] - Microsecond timestamps
//! - [`prelude`] - Common re-exports for convenience
//!
//! # Usage
//!
//! ```rust
//! use master_common::prelude::*;
//!
//! let id = MotorId::new("left-wheel").unwrap();
//! assert_eq!(id.as_str(), "left-wheel");
//! ```

pub mod config;
pub mod consts;
pub mod motor;
pub mod param;
pub mod prelude;
pub mod robot;
pub mod time;
