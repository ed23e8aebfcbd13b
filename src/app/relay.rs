//! Relay state shared by the Dispatcher and the Actuator Loop.

use serde::Serialize;

use crate::app::ports::DigitalOutputPort;
use crate::drivers::relay::RelayOutput;
use crate::error::HalError;
use crate::sync::Gate;

/// Commanded relay level plus the level to restore on the next arm.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RelayState {
    pub commanded: bool,
    pub last_commanded: bool,
}

/// Everything behind the relay mutex.
pub struct RelayCell<D> {
    pub state: RelayState,
    armed: bool,
    output: RelayOutput<D>,
}

/// The relay mutex and the Actuator Loop's wake signal.
pub type RelayGate<D> = Gate<RelayCell<D>>;

impl<D: DigitalOutputPort> RelayCell<D> {
    pub fn new(port: D) -> Self {
        Self {
            state: RelayState::default(),
            armed: false,
            output: RelayOutput::new(port),
        }
    }

    pub fn is_armed(&self) -> bool {
        self.armed
    }

    /// Claim the pin and restore the level the relay had when disarmed.
    ///
    /// Returns `false` without touching anything if already armed.
    pub fn arm(&mut self) -> Result<bool, HalError> {
        if self.armed {
            return Ok(false);
        }
        self.output.claim()?;
        self.state.commanded = self.state.last_commanded;
        self.armed = true;
        Ok(true)
    }

    /// Remember the commanded level and release the pin.
    ///
    /// Returns `false` if the relay was not armed.
    pub fn disarm(&mut self) -> bool {
        if !self.armed {
            return false;
        }
        self.state.last_commanded = self.state.commanded;
        self.output.release();
        self.armed = false;
        true
    }

    /// Drive the pin to the commanded level. No-op while disarmed.
    pub fn apply(&mut self) -> Result<bool, HalError> {
        if !self.armed {
            return Ok(false);
        }
        self.output.apply(self.state.commanded)?;
        Ok(true)
    }

    pub fn output(&self) -> &RelayOutput<D> {
        &self.output
    }
}
