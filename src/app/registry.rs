//! Device registry.
//!
//! Each sensor's enable bit, sampling interval, last value and ADC handle
//! live together in one [`SensorCell`] behind that sensor's [`Gate`]. The
//! Dispatcher flips the bit and the Sampler re-checks it under the same
//! lock, so a DISABLE can never land between the check and the read.
//!
//! Enabling is two steps: [`SensorCell::prepare`] powers the converter,
//! and [`SensorCell::mark_enabled`] opens the gate once `DONE` is out.

use std::sync::Arc;

use core::time::Duration;

use serde::Serialize;

use crate::app::commands::Device;
use crate::app::ports::{AnalogPort, DigitalOutputPort};
use crate::app::relay::{RelayCell, RelayGate, RelayState};
use crate::error::{HalError, Result};
use crate::sync::Gate;

/// Per-sensor bookkeeping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DeviceSlot {
    pub enabled: bool,
    pub interval_secs: u32,
    pub last_value: Option<i32>,
}

impl DeviceSlot {
    pub const fn new(interval_secs: u32) -> Self {
        Self {
            enabled: false,
            interval_secs,
            last_value: None,
        }
    }
}

pub struct SensorCell<A> {
    pub slot: DeviceSlot,
    pub adc: A,
}

pub type SensorGate<A> = Gate<SensorCell<A>>;

impl<A: AnalogPort> SensorCell<A> {
    pub fn new(adc: A, interval_secs: u32) -> Self {
        Self {
            slot: DeviceSlot::new(interval_secs),
            adc,
        }
    }

    /// Power up the converter ahead of enabling.
    ///
    /// Returns `false` without re-initialising if already enabled. The
    /// sampler keeps waiting until [`mark_enabled`](Self::mark_enabled).
    pub fn prepare(&mut self) -> core::result::Result<bool, HalError> {
        if self.slot.enabled {
            return Ok(false);
        }
        self.adc.init()?;
        Ok(true)
    }

    pub fn mark_enabled(&mut self) {
        self.slot.enabled = true;
    }

    /// Mark the sensor disabled and power down the converter.
    ///
    /// Returns `false` if it was not enabled.
    pub fn disable(&mut self) -> bool {
        if !self.slot.enabled {
            return false;
        }
        self.slot.enabled = false;
        self.adc.deinit();
        true
    }
}

/// Snapshot of every device, for logs and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RegistrySnapshot {
    pub temperature: DeviceSlot,
    pub light: DeviceSlot,
    pub relay_armed: bool,
    pub relay: RelayState,
}

/// The three logical devices, keyed by [`Device`].
pub struct DeviceRegistry<A, D> {
    temperature: Arc<SensorGate<A>>,
    light: Arc<SensorGate<A>>,
    relay: Arc<RelayGate<D>>,
}

impl<A, D> Clone for DeviceRegistry<A, D> {
    fn clone(&self) -> Self {
        Self {
            temperature: self.temperature.clone(),
            light: self.light.clone(),
            relay: self.relay.clone(),
        }
    }
}

impl<A: AnalogPort, D: DigitalOutputPort> DeviceRegistry<A, D> {
    pub fn new(temp_adc: A, light_adc: A, relay_port: D, interval_secs: u32) -> Self {
        Self {
            temperature: Arc::new(Gate::new(
                "temperature",
                SensorCell::new(temp_adc, interval_secs),
            )),
            light: Arc::new(Gate::new("light", SensorCell::new(light_adc, interval_secs))),
            relay: Arc::new(Gate::new("relay", RelayCell::new(relay_port))),
        }
    }

    /// Gate for a sensor device; `None` for the relay.
    pub fn sensor(&self, device: Device) -> Option<&Arc<SensorGate<A>>> {
        match device {
            Device::Temperature => Some(&self.temperature),
            Device::Light => Some(&self.light),
            Device::Relay => None,
        }
    }

    pub fn relay(&self) -> &Arc<RelayGate<D>> {
        &self.relay
    }

    /// Copy out every device's state, taking one lock at a time.
    pub fn snapshot(&self, timeout: Option<Duration>) -> Result<RegistrySnapshot> {
        let temperature = self.temperature.lock(timeout)?.slot;
        let light = self.light.lock(timeout)?.slot;
        let (relay_armed, relay) = {
            let cell = self.relay.lock(timeout)?;
            (cell.is_armed(), cell.state)
        };
        Ok(RegistrySnapshot {
            temperature,
            light,
            relay_armed,
            relay,
        })
    }
}
