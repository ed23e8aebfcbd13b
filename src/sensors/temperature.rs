//! Analog temperature sensor (10 mV/°C, calibrated offset).
//!
//! The sensor output is read on ADC1 and converted with a fixed linear
//! transform:
//!
//! ```text
//! volts = raw * V_REF / ADC_MAX
//! °C    = volts / 0.01 + OFFSET_C
//! ```
//!
//! The result is truncated toward zero and reported as `"<N>°C"`.

use core::fmt;

use crate::pins::ADC_MAX;

/// Measured reference voltage of the converter.
const V_REF: f32 = 3.27;
/// Sensor slope (volts per degree).
const VOLTS_PER_C: f32 = 0.01;
/// Calibration offset.
const OFFSET_C: f32 = -10.0;

/// Whole degrees Celsius.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Celsius(pub i32);

impl fmt::Display for Celsius {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}°C", self.0)
    }
}

/// Convert a raw 12-bit sample to whole degrees.
pub fn adc_to_celsius(raw: u16) -> Celsius {
    let volts = f32::from(raw) * V_REF / f32::from(ADC_MAX);
    // `as` truncates toward zero.
    Celsius((volts / VOLTS_PER_C + OFFSET_C) as i32)
}
