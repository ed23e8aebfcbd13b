//! Host simulation adapters.
//!
//! Stand-ins for the node peripherals so the full pipeline runs as a plain
//! process: ADC channels read injectable atomics, the relay pin is an
//! `embedded-hal` output that records its level, and the transmit line is
//! stdout (or any `io::Write`).

use std::io::{self, Read, Write};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU16, Ordering};

use core::convert::Infallible;

use embedded_hal::digital::{ErrorType, OutputPin};

use crate::app::ports::{AnalogPort, OutputPinPort, SerialTx};
use crate::error::HalError;
use crate::pins::ADC_MAX;
use crate::protocol::framing::FrameReceiver;

// ── Analog ────────────────────────────────────────────────────

/// Simulated ADC channel. The raw value is shared with a [`SimAnalogHandle`]
/// so a test or the sim binary can move it while the sampler runs.
pub struct SimAnalog {
    raw: Arc<AtomicU16>,
    powered: bool,
}

/// Injection side of a [`SimAnalog`].
#[derive(Clone)]
pub struct SimAnalogHandle(Arc<AtomicU16>);

impl SimAnalogHandle {
    pub fn set(&self, raw: u16) {
        self.0.store(raw.min(ADC_MAX), Ordering::Relaxed);
    }
}

impl SimAnalog {
    pub fn new(raw: u16) -> Self {
        Self {
            raw: Arc::new(AtomicU16::new(raw.min(ADC_MAX))),
            powered: false,
        }
    }

    pub fn handle(&self) -> SimAnalogHandle {
        SimAnalogHandle(self.raw.clone())
    }
}

impl AnalogPort for SimAnalog {
    fn init(&mut self) -> Result<(), HalError> {
        self.powered = true;
        Ok(())
    }

    fn deinit(&mut self) {
        self.powered = false;
    }

    fn sample_ready(&mut self) -> bool {
        self.powered
    }

    fn read(&mut self) -> Result<u16, HalError> {
        if !self.powered {
            return Err(HalError::AnalogReadFailed);
        }
        Ok(self.raw.load(Ordering::Relaxed))
    }
}

// ── Relay pin ─────────────────────────────────────────────────

/// Simulated output pin; the level is readable through [`SimPin::level`].
#[derive(Clone)]
pub struct SimPin {
    high: Arc<AtomicBool>,
}

impl Default for SimPin {
    fn default() -> Self {
        Self {
            high: Arc::new(AtomicBool::new(true)),
        }
    }
}

impl SimPin {
    pub fn is_high(&self) -> bool {
        self.high.load(Ordering::Relaxed)
    }
}

impl ErrorType for SimPin {
    type Error = Infallible;
}

impl OutputPin for SimPin {
    fn set_low(&mut self) -> Result<(), Infallible> {
        self.high.store(false, Ordering::Relaxed);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Infallible> {
        self.high.store(true, Ordering::Relaxed);
        Ok(())
    }
}

pub type SimRelayPort = OutputPinPort<SimPin>;

// ── Serial ────────────────────────────────────────────────────

/// Transmit line over any writer. Bytes are staged per message and written
/// out on `flush`, so one report is one `write_all`.
pub struct WriterTx<W> {
    out: W,
    staged: Vec<u8>,
}

impl<W: Write> WriterTx<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            staged: Vec::with_capacity(64),
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> SerialTx for WriterTx<W> {
    fn send_byte(&mut self, byte: u8) -> Result<(), HalError> {
        self.staged.push(byte);
        Ok(())
    }

    fn flush(&mut self) -> Result<(), HalError> {
        let res = self
            .out
            .write_all(&self.staged)
            .and_then(|()| self.out.flush());
        self.staged.clear();
        res.map_err(|_| HalError::SerialWriteFailed)
    }
}

pub type StdoutTx = WriterTx<io::Stdout>;

impl StdoutTx {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

// ── Receive ───────────────────────────────────────────────────

/// Feed everything `input` yields into the frame receiver until EOF.
///
/// Stands in for the UART receive interrupt: one `on_byte` per byte.
pub fn pump_input(mut input: impl Read, rx: &mut FrameReceiver) -> io::Result<()> {
    let mut buf = [0u8; 64];
    loop {
        match input.read(&mut buf) {
            Ok(0) => return Ok(()),
            Ok(n) => {
                rx.feed(&buf[..n]);
            }
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
    }
}
