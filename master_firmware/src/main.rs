//! # Master Firmware Host Binary
//!
//! Loads the actuator configuration, builds the motor driver registry and
//! runs the bus dispatch loop against a simulated bus.
//!
//! # Usage
//!
//! ```bash
//! # Run until Ctrl-C
//! master_firmware --config config/motors.toml
//!
//! # 500 dispatch passes with a demo trajectory and frame logging
//! master_firmware --config config/motors.toml --demo --cycles 500 -v
//! ```

#![deny(warnings)]

mod sim;

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::Ordering;

use clap::Parser;
use master_common::config::{ConfigLoader, LogLevel};
use master_common::consts::DEFAULT_CONFIG_PATH;
use master_motor::{Dispatcher, MotorManagerConfig};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::sim::{SimulatedBus, spawn_demo_planner};

/// Master firmware - actuator layer on a simulated bus
#[derive(Parser, Debug)]
#[command(name = "master_firmware")]
#[command(author = "RTS007")]
#[command(version)]
#[command(about = "Actuator layer: motor drivers, trajectory pool and bus dispatch")]
#[command(long_about = None)]
struct Args {
    /// Path to the motor configuration file
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Stop after this many dispatch passes
    #[arg(long, value_name = "N")]
    cycles: Option<u64>,

    /// Feed every actuator a back-and-forth demo trajectory
    #[arg(long)]
    demo: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Output logs in JSON format
    #[arg(long)]
    json: bool,
}

fn main() {
    if let Err(e) = run() {
        error!("Firmware startup failed: {}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let config = match MotorManagerConfig::load(&args.config) {
        Ok(config) => config,
        Err(e) => {
            setup_tracing(&args, LogLevel::default());
            return Err(format!("{:?}: {e}", args.config).into());
        }
    };

    setup_tracing(&args, config.shared.log_level);
    info!(
        "{} v{} starting with {:?}",
        config.shared.service_name,
        env!("CARGO_PKG_VERSION"),
        args.config
    );

    let registry = Arc::new(config.build_registry()?);
    for driver in registry.iter() {
        match driver.bus_id() {
            Some(bus_id) => info!("  {} on bus {:#05x}", driver.parameter_namespace(), bus_id),
            None => info!("  {} has no bus id, not dispatched", driver.parameter_namespace()),
        }
    }

    let mut dispatcher = Dispatcher::new(
        Arc::clone(&registry),
        SimulatedBus::new(),
        config.dispatch.period(),
    );

    let running = dispatcher.running_flag();
    {
        let running = Arc::clone(&running);
        ctrlc::set_handler(move || {
            info!("Received shutdown signal");
            running.store(false, Ordering::SeqCst);
        })?;
    }

    // The planner stops when the dispatch loop clears the flag.
    let planner = args.demo.then(|| {
        let leg = config.dispatch.period() * 50;
        spawn_demo_planner(Arc::clone(&registry), Arc::clone(&running), leg)
    });

    let stats = dispatcher.run(args.cycles).clone();
    if let Some(planner) = planner {
        if planner.join().is_err() {
            error!("Demo planner panicked");
        }
    }

    let bus = dispatcher.into_transport();
    info!(
        "Dispatch stats: cycles={}, frames={} ({} nodes), failed={}, avg={}us, max={}us, overruns={}",
        stats.cycle_count,
        bus.frames(),
        bus.nodes(),
        stats.frames_failed,
        stats.avg_cycle_us(),
        stats.max_cycle_us,
        stats.overruns
    );
    for driver in registry.iter() {
        if let Some(command) = driver.bus_id().and_then(|bus_id| bus.last_command(bus_id)) {
            info!("  {}: last command {:?}", driver.id(), command);
        }
    }
    info!(
        "Trajectory buffers free at shutdown: {}/{}",
        registry.pool().available(),
        registry.pool().capacity()
    );
    info!("Master firmware shutdown complete");
    Ok(())
}

/// Setup tracing subscriber from CLI arguments and the configured level.
fn setup_tracing(args: &Args, level: LogLevel) {
    let directive = if args.verbose {
        LogLevel::Debug.as_directive()
    } else {
        level.as_directive()
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directive));

    if args.json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}
