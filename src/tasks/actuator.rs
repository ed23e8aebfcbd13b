//! Actuator Loop.
//!
//! While the relay is armed, re-applies the commanded level every
//! `relay_poll_ms`. Apply and DISABLE's pin release both run under the
//! relay lock, so the pin is never written after release.

use std::sync::Arc;
use std::thread;

use core::time::Duration;

use log::warn;

use crate::app::ports::DigitalOutputPort;
use crate::app::relay::RelayGate;
use crate::diagnostics::Diagnostics;
use crate::error::Result;

pub struct Actuator<D> {
    gate: Arc<RelayGate<D>>,
    diag: Arc<Diagnostics>,
    lock_timeout: Option<Duration>,
    poll: Duration,
}

impl<D: DigitalOutputPort> Actuator<D> {
    pub fn new(
        gate: Arc<RelayGate<D>>,
        diag: Arc<Diagnostics>,
        lock_timeout: Option<Duration>,
        poll: Duration,
    ) -> Self {
        Self {
            gate,
            diag,
            lock_timeout,
            poll,
        }
    }

    /// Drive the pin once. `Ok(false)` if the relay was disarmed meanwhile.
    pub fn apply_once(&self) -> Result<bool> {
        Ok(self.gate.lock(self.lock_timeout)?.apply()?)
    }

    pub fn run(self) -> ! {
        loop {
            self.gate.wait_until(|cell| cell.is_armed());
            if let Err(e) = self.apply_once() {
                self.diag.record_error(&e);
                warn!("relay apply failed: {}", e);
            }
            thread::sleep(self.poll);
        }
    }
}
