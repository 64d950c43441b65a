//! Motor manager configuration.
//!
//! One TOML file describes the buffer pool, the dispatch rate, the helper
//! tunables and the actuator list. [`MotorManagerConfig::build_registry`]
//! turns a validated configuration into a ready registry.

use std::collections::HashSet;
use std::time::Duration;

use master_common::config::{ConfigError, SharedConfig};
use master_common::consts::{
    ACTUATOR_NAMESPACE, BUS_ID_NOT_SET, DISPATCH_PERIOD_US, MAX_ACTUATORS, MAX_TRAJECTORY_BUFFERS,
};
use master_common::motor::MotorId;
use master_common::param::ParameterNamespace;
use serde::Deserialize;
use tracing::info;

use crate::driver::MotorDriver;
use crate::helpers::HelperConfig;
use crate::pool::TrajectoryBufferPool;
use crate::registry::MotorDriverRegistry;

// ─── Sections ───────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PoolConfig {
    /// Number of trajectory buffers, shared by all actuators.
    pub capacity: usize,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self { capacity: 4 }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DispatchConfig {
    /// Bus dispatch period [µs].
    pub period_us: u64,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            period_us: DISPATCH_PERIOD_US,
        }
    }
}

impl DispatchConfig {
    pub fn period(&self) -> Duration {
        Duration::from_micros(self.period_us)
    }
}

/// One `[[actuators]]` entry.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ActuatorConfig {
    pub id: MotorId,
    /// Left unassigned when absent; the dispatcher skips such drivers.
    #[serde(default)]
    pub bus_id: Option<u16>,
}

// ─── Top Level ──────────────────────────────────────────────────────

/// Complete motor manager configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct MotorManagerConfig {
    pub shared: SharedConfig,
    #[serde(default)]
    pub pool: PoolConfig,
    #[serde(default)]
    pub dispatch: DispatchConfig,
    #[serde(default)]
    pub helpers: HelperConfig,
    #[serde(default)]
    pub actuators: Vec<ActuatorConfig>,
}

impl MotorManagerConfig {
    /// Check semantic constraints the TOML schema can't express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.shared.validate()?;

        if !(1..=MAX_TRAJECTORY_BUFFERS).contains(&self.pool.capacity) {
            return Err(ConfigError::ValidationError(format!(
                "pool.capacity {} out of range [1, {}]",
                self.pool.capacity, MAX_TRAJECTORY_BUFFERS
            )));
        }
        if self.dispatch.period_us == 0 {
            return Err(ConfigError::ValidationError(
                "dispatch.period_us must be > 0".to_string(),
            ));
        }
        if self.helpers.poll_ms == 0 {
            return Err(ConfigError::ValidationError(
                "helpers.poll_ms must be > 0".to_string(),
            ));
        }
        if self.actuators.len() > MAX_ACTUATORS {
            return Err(ConfigError::ValidationError(format!(
                "{} actuators configured, limit is {}",
                self.actuators.len(),
                MAX_ACTUATORS
            )));
        }

        validate_actuators(&self.actuators)
    }

    /// Build the pool and a registry holding one driver per actuator,
    /// bus ids assigned.
    pub fn build_registry(&self) -> Result<MotorDriverRegistry, ConfigError> {
        self.validate()?;

        let pool = TrajectoryBufferPool::new(self.pool.capacity);
        let namespace = ParameterNamespace::root().child(ACTUATOR_NAMESPACE);
        let mut registry = MotorDriverRegistry::new(pool.clone(), namespace.clone());

        for actuator in &self.actuators {
            let driver = MotorDriver::new(actuator.id.clone(), &namespace, pool.clone());
            if let Some(bus_id) = actuator.bus_id {
                driver
                    .set_bus_id(bus_id)
                    .map_err(|e| ConfigError::ValidationError(format!("{}: {e}", actuator.id)))?;
            }
            registry
                .add(driver)
                .map_err(|e| ConfigError::ValidationError(e.to_string()))?;
        }

        info!(
            "Motor registry built: {} actuators, {} trajectory buffers",
            registry.len(),
            pool.capacity()
        );
        Ok(registry)
    }
}

/// Ids and bus ids must be unique; the "not set" bus id is reserved.
fn validate_actuators(actuators: &[ActuatorConfig]) -> Result<(), ConfigError> {
    let mut ids = HashSet::new();
    let mut bus_ids = HashSet::new();

    for actuator in actuators {
        if !ids.insert(&actuator.id) {
            return Err(ConfigError::ValidationError(format!(
                "duplicate actuator id '{}'",
                actuator.id
            )));
        }
        let Some(bus_id) = actuator.bus_id else {
            continue;
        };
        if bus_id == BUS_ID_NOT_SET {
            return Err(ConfigError::ValidationError(format!(
                "{}: bus_id {:#06x} is reserved",
                actuator.id, bus_id
            )));
        }
        if !bus_ids.insert(bus_id) {
            return Err(ConfigError::ValidationError(format!(
                "{}: duplicate bus_id {}",
                actuator.id, bus_id
            )));
        }
    }
    Ok(())
}
