//! Adapters: concrete implementations of the port traits.
//!
//! | Adapter | Implements                          | Connects to            |
//! |---------|-------------------------------------|------------------------|
//! | `sim`   | AnalogPort, OutputPin, SerialTx     | atomics, stdin/stdout  |
//! | `esp`   | AnalogPort, DigitalOutputPort,      | ESP32 ADC oneshot,     |
//! |         | SerialTx                            | GPIO, UART driver      |

#[cfg(target_os = "espidf")]
pub mod esp;
#[cfg(not(target_os = "espidf"))]
pub mod sim;
