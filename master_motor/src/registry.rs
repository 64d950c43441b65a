//! Motor driver registry.
//!
//! Owns every driver of the robot. Built once at startup from the actuator
//! list, then shared read-only (usually behind an `Arc`) with the planner
//! and the bus dispatcher. Append-only: drivers are never removed, so a
//! [`DriverHandle`] stays valid for the registry's lifetime.

use std::collections::HashSet;

use master_common::motor::MotorId;
use master_common::param::ParameterNamespace;
use tracing::info;

use crate::driver::MotorDriver;
use crate::error::RegistryError;
use crate::pool::TrajectoryBufferPool;

/// Stable index of a driver in its registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DriverHandle(usize);

impl DriverHandle {
    /// Registration position (0-based).
    #[inline]
    pub const fn index(self) -> usize {
        self.0
    }
}

/// Registration-ordered collection of motor drivers with unique ids.
#[derive(Debug)]
pub struct MotorDriverRegistry {
    drivers: Vec<MotorDriver>,
    ids: HashSet<MotorId>,
    pool: TrajectoryBufferPool,
    namespace: ParameterNamespace,
}

impl MotorDriverRegistry {
    /// Empty registry whose drivers share `pool` and mount under `namespace`.
    pub fn new(pool: TrajectoryBufferPool, namespace: ParameterNamespace) -> Self {
        Self {
            drivers: Vec::new(),
            ids: HashSet::new(),
            pool,
            namespace,
        }
    }

    /// Register an already constructed driver.
    ///
    /// # Errors
    /// [`RegistryError::DuplicateId`] if a driver with the same id exists.
    pub fn add(&mut self, driver: MotorDriver) -> Result<DriverHandle, RegistryError> {
        if !self.ids.insert(driver.id().clone()) {
            return Err(RegistryError::DuplicateId(driver.id().to_string()));
        }
        let handle = DriverHandle(self.drivers.len());
        info!(
            "Registered motor driver {} at {}",
            driver.id(),
            driver.parameter_namespace()
        );
        self.drivers.push(driver);
        Ok(handle)
    }

    /// Build a driver on the shared pool and namespace, then register it.
    ///
    /// # Errors
    /// [`RegistryError::InvalidId`] for an empty or over-length id,
    /// [`RegistryError::DuplicateId`] if it is already taken.
    pub fn create(&mut self, id: &str) -> Result<DriverHandle, RegistryError> {
        let driver = MotorDriver::with_name(id, &self.namespace, self.pool.clone())?;
        self.add(driver)
    }

    /// First registered driver.
    #[inline]
    pub fn first(&self) -> Option<DriverHandle> {
        (!self.drivers.is_empty()).then_some(DriverHandle(0))
    }

    /// Driver registered right after `handle`.
    #[inline]
    pub fn next(&self, handle: DriverHandle) -> Option<DriverHandle> {
        let next = handle.0 + 1;
        (next < self.drivers.len()).then_some(DriverHandle(next))
    }

    #[inline]
    pub fn get(&self, handle: DriverHandle) -> Option<&MotorDriver> {
        self.drivers.get(handle.0)
    }

    /// Drivers in registration order.
    pub fn iter(&self) -> std::slice::Iter<'_, MotorDriver> {
        self.drivers.iter()
    }

    /// Handles in registration order.
    pub fn handles(&self) -> impl Iterator<Item = DriverHandle> + '_ {
        (0..self.drivers.len()).map(DriverHandle)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.drivers.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.drivers.is_empty()
    }

    /// Pool shared by every driver of this registry.
    #[inline]
    pub fn pool(&self) -> &TrajectoryBufferPool {
        &self.pool
    }

    /// Parent namespace of all driver mounts.
    #[inline]
    pub fn namespace(&self) -> &ParameterNamespace {
        &self.namespace
    }
}

impl<'a> IntoIterator for &'a MotorDriverRegistry {
    type Item = &'a MotorDriver;
    type IntoIter = std::slice::Iter<'a, MotorDriver>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
