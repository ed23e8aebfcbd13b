//! Peripheral assignments for the sensor node board.
//!
//! Single source of truth: every adapter references this module rather
//! than hard-coding channel or pin numbers.

// ---------------------------------------------------------------------------
// Serial command line (UART0)
// ---------------------------------------------------------------------------

/// UART peripheral carrying the command protocol.
pub const UART_PORT: i32 = 0;
pub const UART_TX_GPIO: i32 = 43;
pub const UART_RX_GPIO: i32 = 44;
/// Driver RX ring size; must exceed the largest frame.
pub const UART_RX_BUF_LEN: i32 = 256;

// ---------------------------------------------------------------------------
// Sensors (analog)
// ---------------------------------------------------------------------------

/// LM35-style temperature sensor (10 mV/°C) on ADC1.
pub const TEMP_ADC_UNIT: u32 = 1;
pub const TEMP_ADC_CHANNEL: u32 = 0;

/// Light-dependent resistor divider on ADC2.
pub const LIGHT_ADC_UNIT: u32 = 2;
pub const LIGHT_ADC_CHANNEL: u32 = 1;

/// Full-scale reading of the 12-bit converters.
pub const ADC_MAX: u16 = 4095;

// ---------------------------------------------------------------------------
// Relay actuator
// ---------------------------------------------------------------------------

/// Open-drain relay driver input, active LOW.
pub const RELAY_GPIO: i32 = 5;
