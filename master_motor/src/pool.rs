//! Shared trajectory buffer pool.
//!
//! All buffers are allocated when the pool is built and parked in a
//! fixed-capacity lock-free queue, so neither `acquire` nor a release ever
//! allocates or blocks. A buffer handed out is a [`PooledBuffer`]: owning it
//! is owning the buffer, and dropping it puts the buffer back. A buffer can
//! therefore be released exactly once and never while someone still uses it.
//!
//! The free queue takes no lock at all. Drivers acquire or release while
//! holding their own lock, and the pool never calls back into a driver, so
//! contention on one actuator can't stall the pool for the others.

use std::fmt;
use std::ops::{Deref, DerefMut};
use std::sync::Arc;

use crossbeam_queue::ArrayQueue;
use tracing::info;

use crate::buffer::TrajectoryBuffer;
use crate::error::PoolError;

struct PoolShared {
    capacity: usize,
    free: ArrayQueue<Box<TrajectoryBuffer>>,
}

/// Fixed-size pool of trajectory buffers, shared by every driver.
///
/// Cloning yields another handle to the same pool.
#[derive(Clone)]
pub struct TrajectoryBufferPool {
    shared: Arc<PoolShared>,
}

impl TrajectoryBufferPool {
    /// Preallocate `capacity` buffers.
    pub fn new(capacity: usize) -> Self {
        // ArrayQueue rejects a zero capacity; an empty pool just never hands out.
        let free = ArrayQueue::new(capacity.max(1));
        for _ in 0..capacity {
            let pushed = free.push(Box::new(TrajectoryBuffer::new()));
            debug_assert!(pushed.is_ok());
        }

        info!(
            "Trajectory buffer pool created: {} buffers x {} points",
            capacity,
            TrajectoryBuffer::capacity()
        );

        Self {
            shared: Arc::new(PoolShared { capacity, free }),
        }
    }

    /// Take a buffer out of the pool. Never blocks.
    ///
    /// # Errors
    /// [`PoolError::Exhausted`] when every buffer is in use.
    pub fn acquire(&self) -> Result<PooledBuffer, PoolError> {
        let buffer = self.shared.free.pop().ok_or(PoolError::Exhausted {
            capacity: self.shared.capacity,
        })?;
        Ok(PooledBuffer {
            buffer: Some(buffer),
            pool: Arc::clone(&self.shared),
        })
    }

    /// Return `buffer` to its pool. Equivalent to dropping it.
    pub fn release(&self, buffer: PooledBuffer) {
        debug_assert!(
            Arc::ptr_eq(&self.shared, &buffer.pool),
            "buffer released into a foreign pool"
        );
        drop(buffer);
    }

    /// Total number of buffers.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.shared.capacity
    }

    /// Buffers currently free.
    pub fn available(&self) -> usize {
        self.shared.free.len()
    }

    /// Buffers currently owned by drivers.
    pub fn in_use(&self) -> usize {
        self.capacity() - self.available()
    }
}

impl fmt::Debug for TrajectoryBufferPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TrajectoryBufferPool")
            .field("capacity", &self.capacity())
            .field("available", &self.available())
            .finish()
    }
}

/// A trajectory buffer on loan from a [`TrajectoryBufferPool`].
///
/// Dereferences to [`TrajectoryBuffer`]. Dropping it clears the buffer and
/// returns it to the pool.
pub struct PooledBuffer {
    // `None` only inside `drop`.
    buffer: Option<Box<TrajectoryBuffer>>,
    pool: Arc<PoolShared>,
}

impl Deref for PooledBuffer {
    type Target = TrajectoryBuffer;

    fn deref(&self) -> &TrajectoryBuffer {
        match self.buffer.as_deref() {
            Some(buffer) => buffer,
            None => unreachable!("pooled buffer accessed after release"),
        }
    }
}

impl DerefMut for PooledBuffer {
    fn deref_mut(&mut self) -> &mut TrajectoryBuffer {
        match self.buffer.as_deref_mut() {
            Some(buffer) => buffer,
            None => unreachable!("pooled buffer accessed after release"),
        }
    }
}

impl Drop for PooledBuffer {
    fn drop(&mut self) {
        if let Some(mut buffer) = self.buffer.take() {
            buffer.clear();
            let returned = self.pool.free.push(buffer);
            debug_assert!(returned.is_ok(), "pool free list overflow");
        }
    }
}

impl fmt::Debug for PooledBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PooledBuffer").field("points", &self.len()).finish()
    }
}
