//! Trajectory interpolation.
//!
//! Turns buffered waypoints into a continuous command for one query time.
//! Position and velocity are interpolated linearly inside a segment;
//! acceleration and torque are piecewise constant (taken from the segment
//! start). Outside the buffer the nearest end point is held.
//!
//! Runs under the driver lock inside the dispatch period: no allocation,
//! linear scan over at most `TRAJECTORY_BUFFER_POINTS` points.

use master_common::motor::{TrajectoryPoint, TrajectorySample};
use master_common::time::Timestamp;

use crate::buffer::TrajectoryBuffer;

/// Sample `buffer` at `t`.
///
/// Returns `None` for an empty buffer: there is no valid command to send.
#[inline]
pub fn sample(buffer: &TrajectoryBuffer, t: Timestamp) -> Option<TrajectorySample> {
    sample_points(buffer.points(), t)
}

/// Sample a slice of strictly time-ordered points at `t`.
pub fn sample_points(points: &[TrajectoryPoint], t: Timestamp) -> Option<TrajectorySample> {
    let first = points.first()?;
    let last = points.last()?;

    if t < first.timestamp {
        return Some(TrajectorySample::hold(first, false));
    }
    if t > last.timestamp {
        return Some(TrajectorySample::hold(last, true));
    }

    // first.timestamp <= t <= last.timestamp, so the scan stops at the
    // first segment whose end is not before t.
    for segment in points.windows(2) {
        let (p0, p1) = (&segment[0], &segment[1]);
        if t <= p1.timestamp {
            return Some(segment_sample(p0, p1, t));
        }
    }

    // Single point queried exactly at its timestamp.
    Some(TrajectorySample::hold(last, false))
}

fn segment_sample(p0: &TrajectoryPoint, p1: &TrajectoryPoint, t: Timestamp) -> TrajectorySample {
    // Differences of two i64 timestamps can exceed i64.
    let t0 = i128::from(p0.timestamp.as_micros());
    let span = (i128::from(p1.timestamp.as_micros()) - t0) as f64;
    let f = if span > 0.0 {
        ((i128::from(t.as_micros()) - t0) as f64 / span).clamp(0.0, 1.0) as f32
    } else {
        1.0
    };

    TrajectorySample {
        position: lerp(p0.position, p1.position, f),
        velocity: lerp(p0.velocity, p1.velocity, f),
        acceleration: p0.acceleration,
        torque: p0.torque,
        finished: false,
    }
}

#[inline]
fn lerp(a: f32, b: f32, f: f32) -> f32 {
    a + (b - a) * f
}
