//! Actuator control modes.

use serde::{Deserialize, Serialize};

/// Which physical quantity a driver's control loop currently regulates.
///
/// `#[repr(u8)]` values match the wire values the motor boards expect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum ControlMode {
    /// Output stage off.
    #[default]
    Disabled = 0,
    Position = 1,
    Velocity = 2,
    Torque = 3,
    Voltage = 4,
    /// Time-indexed setpoints from a trajectory buffer.
    Trajectory = 5,
}

impl ControlMode {
    /// Convert from raw `u8`. Returns `None` for invalid values.
    #[inline]
    pub const fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::Disabled),
            1 => Some(Self::Position),
            2 => Some(Self::Velocity),
            3 => Some(Self::Torque),
            4 => Some(Self::Voltage),
            5 => Some(Self::Trajectory),
            _ => None,
        }
    }

    #[inline]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Disabled => "disabled",
            Self::Position => "position",
            Self::Velocity => "velocity",
            Self::Torque => "torque",
            Self::Voltage => "voltage",
            Self::Trajectory => "trajectory",
        }
    }
}

impl std::fmt::Display for ControlMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_values_round_trip() {
        for raw in 0..=5u8 {
            let mode = ControlMode::from_u8(raw).unwrap();
            assert_eq!(mode as u8, raw);
        }
        assert_eq!(ControlMode::from_u8(6), None);
    }

    #[test]
    fn default_is_disabled() {
        assert_eq!(ControlMode::default(), ControlMode::Disabled);
    }
}
