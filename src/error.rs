//! Unified error types for the sensor node firmware.
//!
//! A single `Error` enum that every subsystem converts into, keeping the
//! task loops' error handling uniform. All variants are `Copy` so they can
//! be passed between tasks and counted without allocation.
//!
//! None of these errors ever reach the wire: the command protocol is
//! fail-silent, so every failure ends up as a log line and a counter bump
//! in [`Diagnostics`](crate::diagnostics::Diagnostics).

use core::fmt;

// ---------------------------------------------------------------------------
// Top-level firmware error
// ---------------------------------------------------------------------------

/// Every fallible operation in the firmware funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// A peripheral call failed.
    Hal(HalError),
    /// A bounded wait on the named resource expired.
    TimedOut(&'static str),
    /// An outbound message could not be serialised.
    Encode,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Hal(e) => write!(f, "hal: {e}"),
            Self::TimedOut(what) => write!(f, "timed out waiting for {what}"),
            Self::Encode => write!(f, "encode: report does not serialise"),
        }
    }
}

impl core::error::Error for Error {}

// ---------------------------------------------------------------------------
// Decode errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeError {
    /// Not valid JSON, or truncated.
    Malformed,
    /// A required field is missing, has the wrong type, or is too long.
    InvalidField,
    /// The `command` mnemonic is not one the node understands.
    UnknownCommand,
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Malformed => write!(f, "malformed frame"),
            Self::InvalidField => write!(f, "missing or invalid field"),
            Self::UnknownCommand => write!(f, "unknown command"),
        }
    }
}

impl core::error::Error for DecodeError {}

// ---------------------------------------------------------------------------
// Peripheral errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HalError {
    /// ADC channel could not be configured.
    AnalogInitFailed,
    /// ADC conversion failed or the channel is not initialised.
    AnalogReadFailed,
    /// GPIO could not be configured as an output.
    GpioConfigFailed,
    /// GPIO level write failed.
    GpioWriteFailed,
    /// A byte could not be pushed onto the transmit line.
    SerialWriteFailed,
    /// The receive line reported an error.
    SerialReadFailed,
}

impl fmt::Display for HalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AnalogInitFailed => write!(f, "ADC init failed"),
            Self::AnalogReadFailed => write!(f, "ADC read failed"),
            Self::GpioConfigFailed => write!(f, "GPIO config failed"),
            Self::GpioWriteFailed => write!(f, "GPIO write failed"),
            Self::SerialWriteFailed => write!(f, "serial write failed"),
            Self::SerialReadFailed => write!(f, "serial read failed"),
        }
    }
}

impl core::error::Error for HalError {}

impl From<HalError> for Error {
    fn from(e: HalError) -> Self {
        Self::Hal(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Firmware-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
