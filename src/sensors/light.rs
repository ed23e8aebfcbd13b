//! Photoresistor light sensor on ADC2. Reported uncalibrated.

/// Raw light level, 0..=4095.
pub fn adc_to_level(raw: u16) -> u16 {
    raw
}
