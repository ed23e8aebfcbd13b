//! Sensor transforms.
//!
//! Each sampled device has one fixed conversion from a raw ADC count to the
//! value it reports. [`convert`] picks the right one; the result is stored
//! as the device's last value and formatted into the outbound reading.

pub mod light;
pub mod temperature;

use core::fmt;

use crate::app::commands::Device;
use temperature::Celsius;

/// A converted sample, ready to report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reading {
    Temperature(Celsius),
    Light(u16),
}

impl Reading {
    /// Integer form kept in the device registry.
    pub fn value(self) -> i32 {
        match self {
            Self::Temperature(c) => c.0,
            Self::Light(level) => i32::from(level),
        }
    }
}

impl fmt::Display for Reading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Temperature(c) => fmt::Display::fmt(c, f),
            Self::Light(level) => write!(f, "{}", level),
        }
    }
}

/// Apply the sensor's transform. `None` for devices that are not sensors.
pub fn convert(device: Device, raw: u16) -> Option<Reading> {
    match device {
        Device::Temperature => Some(Reading::Temperature(temperature::adc_to_celsius(raw))),
        Device::Light => Some(Reading::Light(light::adc_to_level(raw))),
        Device::Relay => None,
    }
}
