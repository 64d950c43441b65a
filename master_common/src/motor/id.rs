//! Bounded motor identifiers.
//!
//! Ids are stored inline (`heapless::String`) so a driver never allocates
//! for its name. Construction fails instead of truncating: two actuators
//! whose names only differ past the limit must not alias each other.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

use crate::consts::MOTOR_ID_MAX_LEN;

/// Reasons a string can't be used as a motor id.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MotorIdError {
    #[error("motor id is empty")]
    Empty,

    #[error("motor id is {len} bytes long, limit is {max}")]
    TooLong { len: usize, max: usize },

    /// Ids name parameter namespaces, so they can't contain the separator.
    #[error("motor id '{0}' contains '/'")]
    Separator(String),
}

/// Actuator name, unique within a registry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MotorId(heapless::String<MOTOR_ID_MAX_LEN>);

impl MotorId {
    /// Validate and copy `id`.
    ///
    /// # Errors
    /// [`MotorIdError::Empty`] for an empty string,
    /// [`MotorIdError::TooLong`] above [`MOTOR_ID_MAX_LEN`] bytes,
    /// [`MotorIdError::Separator`] if it contains `/`.
    pub fn new(id: &str) -> Result<Self, MotorIdError> {
        if id.is_empty() {
            return Err(MotorIdError::Empty);
        }
        if id.contains('/') {
            return Err(MotorIdError::Separator(id.to_string()));
        }
        let too_long = MotorIdError::TooLong {
            len: id.len(),
            max: MOTOR_ID_MAX_LEN,
        };
        if id.len() > MOTOR_ID_MAX_LEN {
            return Err(too_long);
        }
        let mut inner = heapless::String::new();
        inner.push_str(id).map_err(|_| too_long)?;
        Ok(Self(inner))
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl std::fmt::Display for MotorId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl AsRef<str> for MotorId {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl TryFrom<&str> for MotorId {
    type Error = MotorIdError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl Serialize for MotorId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for MotorId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::new(&raw).map_err(serde::de::Error::custom)
    }
}
