//! Robot-level collaborator contracts.
//!
//! The trajectory manager and the blocking detectors are implemented by the
//! position control stack, outside this workspace. This module fixes the
//! capability set the motion helpers rely on:
//!
//! - [`TrajectoryManager`] - relative/absolute motion commands and limits
//! - [`BlockingDetector`] - stall detection on one control axis
//! - [`BoardModeCell`] - which control loops (distance, angle) are active

pub mod blocking;
pub mod board_mode;
pub mod trajectory_manager;

pub use blocking::BlockingDetector;
pub use board_mode::{BoardMode, BoardModeCell};
pub use trajectory_manager::TrajectoryManager;
