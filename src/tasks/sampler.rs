//! Periodic Sampler task, one per sensor.
//!
//! ```text
//! WaitEnabled ─▶ Sample ─▶ Report ─▶ Sleep(interval) ─┐
//!      ▲                                              │
//!      └──────────────────────────────────────────────┘
//! ```
//!
//! The interval is read under the device lock at the top of each cycle,
//! so a `DUR` lands on the next cycle. An interval of 0 still sleeps the
//! configured minimum period.

use std::sync::Arc;
use std::thread;

use core::time::Duration;

use log::warn;

use crate::app::commands::Device;
use crate::app::events::Report;
use crate::app::ports::{AnalogPort, SerialTx};
use crate::app::registry::SensorGate;
use crate::diagnostics::Diagnostics;
use crate::drivers::serial_guard::SerialGuard;
use crate::error::Result;
use crate::sensors::{self, Reading};

/// Result of one sampling cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cycle {
    /// `None` if the sensor was disabled under us or had no sample ready.
    pub reading: Option<Reading>,
    /// How long to sleep before the next cycle.
    pub period: Duration,
}

pub struct Sampler<A, S> {
    device: Device,
    gate: Arc<SensorGate<A>>,
    serial: Arc<SerialGuard<S>>,
    diag: Arc<Diagnostics>,
    lock_timeout: Option<Duration>,
    min_period: Duration,
}

impl<A: AnalogPort, S: SerialTx> Sampler<A, S> {
    pub fn new(
        device: Device,
        gate: Arc<SensorGate<A>>,
        serial: Arc<SerialGuard<S>>,
        diag: Arc<Diagnostics>,
        lock_timeout: Option<Duration>,
        min_period: Duration,
    ) -> Self {
        Self {
            device,
            gate,
            serial,
            diag,
            lock_timeout,
            min_period,
        }
    }

    pub fn device(&self) -> Device {
        self.device
    }

    /// Park until the sensor is enabled.
    pub fn wait_enabled(&self) {
        self.gate.wait_until(|cell| cell.slot.enabled);
    }

    /// Sample once and transmit the reading.
    ///
    /// The device lock covers the enable re-check, the interval read and
    /// the ADC read; it is dropped before the serial guard is taken.
    pub fn cycle(&self) -> Result<Cycle> {
        let (raw, interval_secs) = {
            let mut cell = self.gate.lock(self.lock_timeout)?;
            let interval = cell.slot.interval_secs;
            if !cell.slot.enabled || !cell.adc.sample_ready() {
                (None, interval)
            } else {
                (Some(cell.adc.read()?), interval)
            }
        };
        let period = Duration::from_secs(u64::from(interval_secs)).max(self.min_period);

        let Some(reading) = raw.and_then(|raw| sensors::convert(self.device, raw)) else {
            return Ok(Cycle {
                reading: None,
                period,
            });
        };

        // A DISABLE may land here; the stored value and the report still
        // describe a sample taken while enabled.
        self.gate.lock(self.lock_timeout)?.slot.last_value = Some(reading.value());
        self.serial
            .send(&Report::reading(self.device, reading), self.lock_timeout)?;
        self.diag.record_reading_sent();

        Ok(Cycle {
            reading: Some(reading),
            period,
        })
    }

    pub fn run(self) -> ! {
        let mut period = self.min_period;
        loop {
            self.wait_enabled();
            match self.cycle() {
                Ok(c) => period = c.period,
                Err(e) => {
                    self.diag.record_error(&e);
                    warn!("{} sample failed: {}", self.gate.name(), e);
                }
            }
            thread::sleep(period);
        }
    }
}
