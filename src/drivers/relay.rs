//! Relay driver (open-drain, active LOW).
//!
//! The relay module energises its coil when its input is pulled low, so
//! `commanded = true` drives the pin [`PinState::Low`]. A released pin is
//! parked high, which leaves the relay off.
//!
//! Policy lives in [`RelayCell`](crate::app::relay::RelayCell); this type
//! only owns the pin and maps a boolean onto a level. Every call is made
//! under the relay gate, and `apply` refuses a released pin.

use embedded_hal::digital::PinState;

use crate::app::ports::DigitalOutputPort;
use crate::error::HalError;

/// Level that turns the relay coil on.
const ACTIVE: PinState = PinState::Low;
/// Level that leaves the relay off.
const IDLE: PinState = PinState::High;

pub struct RelayOutput<D> {
    port: D,
    configured: bool,
    energised: bool,
}

impl<D: DigitalOutputPort> RelayOutput<D> {
    pub fn new(port: D) -> Self {
        Self {
            port,
            configured: false,
            energised: false,
        }
    }

    /// Configure the pin and park it with the relay off.
    pub fn claim(&mut self) -> Result<(), HalError> {
        self.port.init(IDLE)?;
        self.configured = true;
        self.energised = false;
        Ok(())
    }

    /// Return the pin to its unconfigured state.
    pub fn release(&mut self) {
        if self.configured {
            self.port.deinit();
        }
        self.configured = false;
        self.energised = false;
    }

    /// Drive the relay to `on`.
    pub fn apply(&mut self, on: bool) -> Result<(), HalError> {
        if !self.configured {
            return Err(HalError::GpioWriteFailed);
        }
        self.port.write(if on { ACTIVE } else { IDLE })?;
        self.energised = on;
        Ok(())
    }

    /// Last level successfully written.
    pub fn is_energised(&self) -> bool {
        self.energised
    }

    pub fn port(&self) -> &D {
        &self.port
    }
}
