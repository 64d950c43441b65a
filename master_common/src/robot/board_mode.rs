//! Position control mode of the robot base.

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU8, Ordering};

/// Which of the base's control loops are closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum BoardMode {
    /// Distance and heading both regulated (normal driving).
    #[default]
    AngleDistance = 0,
    /// Heading loop open, e.g. to let the robot square up against a wall.
    DistanceOnly = 1,
}

impl BoardMode {
    #[inline]
    pub const fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::AngleDistance),
            1 => Some(Self::DistanceOnly),
            _ => None,
        }
    }
}

/// Mode flag shared between the helpers and the position control loop.
///
/// Lock-free so the control loop can read it every period.
#[derive(Debug)]
pub struct BoardModeCell(AtomicU8);

impl BoardModeCell {
    pub const fn new(mode: BoardMode) -> Self {
        Self(AtomicU8::new(mode as u8))
    }

    #[inline]
    pub fn get(&self) -> BoardMode {
        // Only `set` writes, so the value is always a valid discriminant.
        BoardMode::from_u8(self.0.load(Ordering::Acquire)).unwrap_or_default()
    }

    #[inline]
    pub fn set(&self, mode: BoardMode) {
        self.0.store(mode as u8, Ordering::Release);
    }

    /// Store `mode` and return the previous one.
    #[inline]
    pub fn replace(&self, mode: BoardMode) -> BoardMode {
        BoardMode::from_u8(self.0.swap(mode as u8, Ordering::AcqRel)).unwrap_or_default()
    }
}

impl Default for BoardModeCell {
    fn default() -> Self {
        Self::new(BoardMode::default())
    }
}
