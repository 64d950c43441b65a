//! Fixed-rate bus dispatch.
//!
//! Once per period the dispatcher walks the registry and, for every driver
//! with an assigned bus id, takes one snapshot under the driver lock,
//! releases the lock, and hands the command to the [`BusTransport`]. Bus
//! I/O never happens with a driver locked.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use master_common::motor::MotorId;
use master_common::time::Timestamp;
use tracing::{debug, info, warn};

use crate::driver::BusCommand;
use crate::error::TransportError;
use crate::registry::MotorDriverRegistry;

/// One command addressed to one actuator node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BusFrame<'a> {
    pub driver_id: &'a MotorId,
    pub bus_id: u16,
    pub command: BusCommand,
    /// Time the command was sampled at.
    pub timestamp: Timestamp,
}

/// Sink for outgoing frames. Encoding and the physical bus live behind it.
pub trait BusTransport: Send {
    fn transmit(&mut self, frame: &BusFrame<'_>) -> Result<(), TransportError>;
}

impl<T: BusTransport + ?Sized> BusTransport for Box<T> {
    fn transmit(&mut self, frame: &BusFrame<'_>) -> Result<(), TransportError> {
        (**self).transmit(frame)
    }
}

// ─── Statistics ─────────────────────────────────────────────────────

/// What one dispatch pass did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleReport {
    /// Frames accepted by the transport.
    pub sent: usize,
    /// Frames the transport refused.
    pub failed: usize,
    /// Drivers without a bus id.
    pub unassigned: usize,
    /// Drivers in trajectory mode with nothing to send.
    pub no_data: usize,
}

/// Running totals over all passes, updated without allocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DispatchStats {
    pub cycle_count: u64,
    pub frames_sent: u64,
    pub frames_failed: u64,
    /// Passes that took longer than the period.
    pub overruns: u64,
    pub max_cycle_us: u64,
    pub total_cycle_us: u64,
}

impl DispatchStats {
    fn record(&mut self, report: &CycleReport, cycle_us: u64) {
        self.cycle_count += 1;
        self.frames_sent += report.sent as u64;
        self.frames_failed += report.failed as u64;
        self.total_cycle_us += cycle_us;
        if cycle_us > self.max_cycle_us {
            self.max_cycle_us = cycle_us;
        }
    }

    /// Average pass duration in µs (0 before the first pass).
    pub fn avg_cycle_us(&self) -> u64 {
        if self.cycle_count == 0 {
            0
        } else {
            self.total_cycle_us / self.cycle_count
        }
    }
}

// ─── Dispatcher ─────────────────────────────────────────────────────

/// Periodic sender of driver commands.
pub struct Dispatcher<T> {
    registry: Arc<MotorDriverRegistry>,
    transport: T,
    period: Duration,
    running: Arc<AtomicBool>,
    stats: DispatchStats,
}

impl<T: BusTransport> Dispatcher<T> {
    pub fn new(registry: Arc<MotorDriverRegistry>, transport: T, period: Duration) -> Self {
        Self {
            registry,
            transport,
            period,
            running: Arc::new(AtomicBool::new(true)),
            stats: DispatchStats::default(),
        }
    }

    /// Flag that keeps [`Dispatcher::run`] going; clear it to stop.
    ///
    /// Set once at construction. Clearing it before `run` makes `run`
    /// return without a pass, and `run` clears it on exit so threads
    /// sharing it stop too.
    pub fn running_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.running)
    }

    #[inline]
    pub fn period(&self) -> Duration {
        self.period
    }

    /// Send the current command of every addressable driver, sampled at `now`.
    pub fn dispatch_once(&mut self, now: Timestamp) -> CycleReport {
        let mut report = CycleReport::default();

        for driver in self.registry.iter() {
            let Some(bus_id) = driver.bus_id() else {
                report.unassigned += 1;
                continue;
            };

            // Guard dropped at the end of this statement.
            let command = driver.snapshot(now);
            if command == BusCommand::NoData {
                report.no_data += 1;
                continue;
            }

            let frame = BusFrame {
                driver_id: driver.id(),
                bus_id,
                command,
                timestamp: now,
            };
            match self.transport.transmit(&frame) {
                Ok(()) => {
                    report.sent += 1;
                    debug!("{} -> bus {:#05x}: {:?}", driver.id(), bus_id, command);
                }
                Err(e) => {
                    report.failed += 1;
                    warn!("{}: transmit to bus {:#05x} failed: {}", driver.id(), bus_id, e);
                }
            }
        }

        report
    }

    /// Pace [`Dispatcher::dispatch_once`] at the configured period until the
    /// running flag is cleared or `max_cycles` passes have run.
    pub fn run(&mut self, max_cycles: Option<u64>) -> &DispatchStats {
        info!(
            "Starting dispatch loop: {} drivers, period={}us",
            self.registry.len(),
            self.period.as_micros()
        );
        let period_us = self.period.as_micros() as u64;
        let mut deadline = Instant::now();
        let mut cycles = 0u64;

        while self.running.load(Ordering::SeqCst) && max_cycles.is_none_or(|max| cycles < max) {
            let cycle_start = Instant::now();
            let report = self.dispatch_once(Timestamp::now());
            let cycle_us = cycle_start.elapsed().as_micros() as u64;
            self.stats.record(&report, cycle_us);
            cycles += 1;

            if cycle_us > period_us {
                self.stats.overruns += 1;
                if self.stats.overruns <= 10 || self.stats.overruns % 1000 == 0 {
                    warn!(
                        "Dispatch overrun #{}: pass took {}us (period {}us)",
                        self.stats.overruns, cycle_us, period_us
                    );
                }
            }

            // Absolute deadlines keep the rate from drifting; after a late
            // pass the schedule restarts from now instead of bursting.
            deadline += self.period;
            let now = Instant::now();
            if deadline > now {
                std::thread::sleep(deadline - now);
            } else {
                deadline = now;
            }

            if self.stats.cycle_count % 1000 == 0 {
                debug!(
                    "Dispatch stats: cycles={}, avg={}us, max={}us, overruns={}",
                    self.stats.cycle_count,
                    self.stats.avg_cycle_us(),
                    self.stats.max_cycle_us,
                    self.stats.overruns
                );
            }
        }

        self.running.store(false, Ordering::SeqCst);
        info!(
            "Dispatch loop stopped after {} cycles ({} frames sent, {} failed)",
            self.stats.cycle_count, self.stats.frames_sent, self.stats.frames_failed
        );
        &self.stats
    }

    pub fn stats(&self) -> &DispatchStats {
        &self.stats
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn into_transport(self) -> T {
        self.transport
    }
}
