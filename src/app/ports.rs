//! Port traits: the boundary between the command pipeline and the
//! peripheral HAL.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ Dispatcher / Sampler / Actuator Loop
//! ```
//!
//! Adapters (ADC channels, relay GPIO, both UART directions) implement these
//! traits. The pipeline owns them through generics, so the core never
//! touches registers directly and runs unchanged against mocks on the host.

use embedded_hal::digital::{OutputPin, PinState};

use crate::error::HalError;

// ───────────────────────────────────────────────────────────────
// Analog port (driven adapter: ADC → sampler)
// ───────────────────────────────────────────────────────────────

/// One analog input channel.
pub trait AnalogPort {
    /// Configure the pin as analog input and power up the converter.
    fn init(&mut self) -> Result<(), HalError>;

    /// Power down the converter and release the pin.
    fn deinit(&mut self);

    /// Whether a fresh conversion result is available.
    fn sample_ready(&mut self) -> bool;

    /// Raw conversion result (12-bit).
    fn read(&mut self) -> Result<u16, HalError>;
}

// ───────────────────────────────────────────────────────────────
// Digital output port (driven adapter: actuator → GPIO)
// ───────────────────────────────────────────────────────────────

/// One digital output line.
pub trait DigitalOutputPort {
    /// Configure the pin as an output and park it at `idle`.
    fn init(&mut self, idle: PinState) -> Result<(), HalError>;

    /// Return the pin to its unconfigured state.
    fn deinit(&mut self);

    /// Drive the pin.
    fn write(&mut self, level: PinState) -> Result<(), HalError>;
}

/// Adapts any `embedded-hal` output pin into a [`DigitalOutputPort`].
///
/// `embedded-hal` has no notion of (de)configuring a pin, so `init` parks
/// the level and `deinit` stops accepting writes until the next `init`.
pub struct OutputPinPort<P> {
    pin: P,
    configured: bool,
}

impl<P: OutputPin> OutputPinPort<P> {
    pub fn new(pin: P) -> Self {
        Self {
            pin,
            configured: false,
        }
    }

    pub fn into_inner(self) -> P {
        self.pin
    }
}

impl<P: OutputPin> DigitalOutputPort for OutputPinPort<P> {
    fn init(&mut self, idle: PinState) -> Result<(), HalError> {
        self.pin
            .set_state(idle)
            .map_err(|_| HalError::GpioConfigFailed)?;
        self.configured = true;
        Ok(())
    }

    fn deinit(&mut self) {
        self.configured = false;
    }

    fn write(&mut self, level: PinState) -> Result<(), HalError> {
        if !self.configured {
            return Err(HalError::GpioWriteFailed);
        }
        self.pin
            .set_state(level)
            .map_err(|_| HalError::GpioWriteFailed)
    }
}

// ───────────────────────────────────────────────────────────────
// Serial transmit port (driven adapter: pipeline → UART TX)
// ───────────────────────────────────────────────────────────────

/// Byte-at-a-time transmit line. Callers serialise access through the
/// [`SerialGuard`](crate::drivers::serial_guard::SerialGuard).
pub trait SerialTx {
    fn send_byte(&mut self, byte: u8) -> Result<(), HalError>;

    /// Push out anything the adapter buffered. Called once per message.
    fn flush(&mut self) -> Result<(), HalError> {
        Ok(())
    }
}

/// Receive side of the command line, drained by the UART receive task.
pub trait SerialRx {
    /// Block until one byte has arrived and return it.
    fn wait_byte(&mut self) -> Result<u8, HalError>;

    /// Copy bytes that have already arrived into `buf` without waiting.
    /// Returns how many were copied; `0` means the line is idle.
    fn read_available(&mut self, buf: &mut [u8]) -> Result<usize, HalError>;
}

// ───────────────────────────────────────────────────────────────
// Error types
// ───────────────────────────────────────────────────────────────

/// Errors from loading or validating [`NodeConfig`](crate::config::NodeConfig).
#[derive(Debug)]
pub enum ConfigError {
    /// Stored config failed to deserialise.
    Corrupted,
    /// A config field failed range validation.
    /// The `&'static str` describes which field and why.
    ValidationFailed(&'static str),
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Corrupted => write!(f, "config corrupted"),
            Self::ValidationFailed(msg) => write!(f, "validation failed: {}", msg),
        }
    }
}

impl core::error::Error for ConfigError {}
