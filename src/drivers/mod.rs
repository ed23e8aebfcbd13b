//! Actuator and serial-line drivers, task spawning, and the watchdog.

pub mod relay;
pub mod serial_guard;
pub mod serial_rx;
pub mod task_pin;
pub mod watchdog;
