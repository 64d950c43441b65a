//! Fixed-capacity trajectory buffer.
//!
//! Storage is inline (`heapless::Vec`), so a buffer never allocates after
//! the pool creates it at startup. Loading a trajectory replaces the whole
//! content; there is no append.

use master_common::consts::TRAJECTORY_BUFFER_POINTS;
use master_common::motor::TrajectoryPoint;
use master_common::time::Timestamp;

use crate::error::TrajectoryError;

/// Time-ordered waypoints for one actuator.
///
/// Invariant: timestamps are strictly increasing.
#[derive(Debug, Clone, Default)]
pub struct TrajectoryBuffer {
    points: heapless::Vec<TrajectoryPoint, TRAJECTORY_BUFFER_POINTS>,
}

impl TrajectoryBuffer {
    /// Empty buffer.
    pub const fn new() -> Self {
        Self {
            points: heapless::Vec::new(),
        }
    }

    /// Maximum number of points.
    #[inline]
    pub const fn capacity() -> usize {
        TRAJECTORY_BUFFER_POINTS
    }

    /// Check `points` against the buffer invariants without touching any buffer.
    pub fn validate(points: &[TrajectoryPoint]) -> Result<(), TrajectoryError> {
        if points.is_empty() {
            return Err(TrajectoryError::Empty);
        }
        if points.len() > TRAJECTORY_BUFFER_POINTS {
            return Err(TrajectoryError::TooManyPoints {
                len: points.len(),
                max: TRAJECTORY_BUFFER_POINTS,
            });
        }
        if let Some(bad) = points
            .windows(2)
            .position(|pair| pair[1].timestamp <= pair[0].timestamp)
        {
            return Err(TrajectoryError::NonMonotonic { index: bad + 1 });
        }
        Ok(())
    }

    /// Replace the content with `points`.
    ///
    /// On error the previous content is kept.
    pub fn load(&mut self, points: &[TrajectoryPoint]) -> Result<(), TrajectoryError> {
        Self::validate(points)?;
        self.points.clear();
        self.points
            .extend_from_slice(points)
            .map_err(|_| TrajectoryError::TooManyPoints {
                len: points.len(),
                max: TRAJECTORY_BUFFER_POINTS,
            })
    }

    /// Drop all points.
    #[inline]
    pub fn clear(&mut self) {
        self.points.clear();
    }

    #[inline]
    pub fn points(&self) -> &[TrajectoryPoint] {
        &self.points
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Timestamp of the first point.
    pub fn start_time(&self) -> Option<Timestamp> {
        self.points.first().map(|p| p.timestamp)
    }

    /// Timestamp of the last point; sampling after it reports `finished`.
    pub fn end_time(&self) -> Option<Timestamp> {
        self.points.last().map(|p| p.timestamp)
    }
}
