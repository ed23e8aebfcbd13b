//! Command Dispatcher.
//!
//! Applies one [`Command`] to the device registry and relay state, wakes
//! the loop it concerns, and sends the acknowledgement if the command has
//! one.
//!
//! | Command | Device  | Effect                                   | Reply    |
//! |---------|---------|------------------------------------------|----------|
//! | `ENA`   | sensor  | power up ADC, enable, wake sampler       | `DONE`   |
//! | `ENA`   | relay   | claim pin, restore level, wake actuator  | `DONE`   |
//! | `DIS`   | sensor  | disable, power down ADC                  | `DONE`   |
//! | `DIS`   | relay   | remember level, release pin              | `DONE`   |
//! | `ACT`   | relay   | set commanded level (`"0"` / `"1"`)      | none     |
//! | `STA`   | any     | none                                     | `0`/`1`  |
//! | `DUR`   | sensor  | set interval (seconds), wake sampler     | none     |
//!
//! Nothing is ever negatively acknowledged. A command that does not apply
//! returns [`Outcome::Ignored`] and bumps the matching diagnostics counter.
//!
//! Lock discipline: the device lock is released before the serial guard is
//! taken. A sensor is marked enabled only after its `DONE` is written, so
//! the acknowledgement always precedes the first reading.

use std::sync::Arc;

use core::time::Duration;

use log::{debug, info};

use crate::app::commands::{Command, CommandKind, Device};
use crate::app::events::Report;
use crate::app::ports::{AnalogPort, DigitalOutputPort, SerialTx};
use crate::app::registry::DeviceRegistry;
use crate::diagnostics::Diagnostics;
use crate::drivers::serial_guard::SerialGuard;
use crate::error::Result;

/// Why a command had no effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ignored {
    /// The node ID matches no device.
    UnknownNode,
    /// The command does not apply to this kind of device.
    NotApplicable,
    /// DISABLE of a device that is not enabled.
    NotEnabled,
    /// The payload is not a value the command accepts.
    InvalidPayload,
}

/// What a dispatched command did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// State changed (or was already as requested) and a reply was sent.
    Acked,
    /// State changed; the command has no reply.
    Applied,
    Ignored(Ignored),
}

pub struct Dispatcher<A, D, S> {
    registry: DeviceRegistry<A, D>,
    serial: Arc<SerialGuard<S>>,
    diag: Arc<Diagnostics>,
    lock_timeout: Option<Duration>,
}

impl<A, D, S> Dispatcher<A, D, S>
where
    A: AnalogPort,
    D: DigitalOutputPort,
    S: SerialTx,
{
    pub fn new(
        registry: DeviceRegistry<A, D>,
        serial: Arc<SerialGuard<S>>,
        diag: Arc<Diagnostics>,
        lock_timeout: Option<Duration>,
    ) -> Self {
        Self {
            registry,
            serial,
            diag,
            lock_timeout,
        }
    }

    /// Apply one command.
    ///
    /// `Err` means a lock wait expired or a peripheral failed; the caller
    /// counts it. Ignored commands are counted here.
    pub fn dispatch(&self, cmd: &Command) -> Result<Outcome> {
        let outcome = self.apply(cmd)?;
        match outcome {
            Outcome::Ignored(reason) => {
                debug!(
                    "{} {} ignored: {:?}",
                    cmd.kind.mnemonic(),
                    cmd.node_id,
                    reason
                );
                match reason {
                    Ignored::UnknownNode => self.diag.record_unknown_node(),
                    Ignored::NotApplicable | Ignored::NotEnabled => {
                        self.diag.record_precondition_failed()
                    }
                    Ignored::InvalidPayload => self.diag.record_invalid_payload(),
                }
            }
            Outcome::Acked | Outcome::Applied => self.diag.record_command_dispatched(),
        }
        Ok(outcome)
    }

    fn apply(&self, cmd: &Command) -> Result<Outcome> {
        if cmd.kind == CommandKind::Status {
            return self.status(cmd);
        }

        let Some(device) = Device::from_node_id(cmd.node_id) else {
            return Ok(Outcome::Ignored(Ignored::UnknownNode));
        };

        match (cmd.kind, device) {
            (CommandKind::Enable, Device::Relay) => self.arm_relay(),
            (CommandKind::Enable, sensor) => self.enable_sensor(sensor),
            (CommandKind::Disable, Device::Relay) => self.disarm_relay(),
            (CommandKind::Disable, sensor) => self.disable_sensor(sensor),
            (CommandKind::Activate, Device::Relay) => self.activate(cmd.payload.as_str()),
            (CommandKind::SetDuration, sensor) if sensor.is_sensor() => {
                self.set_duration(sensor, cmd.payload.as_str())
            }
            (CommandKind::Activate | CommandKind::SetDuration, _) => {
                Ok(Outcome::Ignored(Ignored::NotApplicable))
            }
            (CommandKind::Status, _) => self.status(cmd),
        }
    }

    fn ack(&self, report: &Report) -> Result<()> {
        self.serial.send(report, self.lock_timeout)?;
        self.diag.record_ack_sent();
        Ok(())
    }

    fn enable_sensor(&self, device: Device) -> Result<Outcome> {
        let Some(gate) = self.registry.sensor(device) else {
            return Ok(Outcome::Ignored(Ignored::NotApplicable));
        };
        let fresh = gate.lock(self.lock_timeout)?.prepare()?;
        let acked = self.ack(&Report::done(device));
        if fresh {
            gate.lock(self.lock_timeout)?.mark_enabled();
            info!("{} enabled", gate.name());
            gate.wake();
        }
        acked.map(|()| Outcome::Acked)
    }

    fn disable_sensor(&self, device: Device) -> Result<Outcome> {
        let Some(gate) = self.registry.sensor(device) else {
            return Ok(Outcome::Ignored(Ignored::NotApplicable));
        };
        if !gate.lock(self.lock_timeout)?.disable() {
            return Ok(Outcome::Ignored(Ignored::NotEnabled));
        }
        info!("{} disabled", gate.name());
        self.ack(&Report::done(device))?;
        Ok(Outcome::Acked)
    }

    fn arm_relay(&self) -> Result<Outcome> {
        let gate = self.registry.relay();
        let armed = gate.lock(self.lock_timeout)?.arm()?;
        if armed {
            info!("relay armed");
        }
        let acked = self.ack(&Report::done(Device::Relay));
        if armed {
            gate.wake();
        }
        acked.map(|()| Outcome::Acked)
    }

    fn disarm_relay(&self) -> Result<Outcome> {
        if !self.registry.relay().lock(self.lock_timeout)?.disarm() {
            return Ok(Outcome::Ignored(Ignored::NotEnabled));
        }
        info!("relay disarmed");
        self.ack(&Report::done(Device::Relay))?;
        Ok(Outcome::Acked)
    }

    fn activate(&self, payload: &str) -> Result<Outcome> {
        let level = match payload {
            "1" => true,
            "0" => false,
            _ => return Ok(Outcome::Ignored(Ignored::InvalidPayload)),
        };
        let gate = self.registry.relay();
        let armed = {
            let mut cell = gate.lock(self.lock_timeout)?;
            cell.state.commanded = level;
            cell.is_armed()
        };
        if armed {
            gate.wake();
        }
        Ok(Outcome::Applied)
    }

    fn status(&self, cmd: &Command) -> Result<Outcome> {
        let commanded = self.registry.relay().lock(self.lock_timeout)?.state.commanded;
        self.ack(&Report::relay_status(cmd.node_id, commanded))?;
        Ok(Outcome::Acked)
    }

    fn set_duration(&self, device: Device, payload: &str) -> Result<Outcome> {
        let Ok(secs) = payload.trim().parse::<u32>() else {
            return Ok(Outcome::Ignored(Ignored::InvalidPayload));
        };
        let Some(gate) = self.registry.sensor(device) else {
            return Ok(Outcome::Ignored(Ignored::NotApplicable));
        };
        gate.lock(self.lock_timeout)?.slot.interval_secs = secs;
        debug!("{} interval = {}s", gate.name(), secs);
        gate.wake();
        Ok(Outcome::Applied)
    }
}
