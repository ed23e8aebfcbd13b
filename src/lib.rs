//! Sensor node firmware library.
//!
//! A serial-commanded IoT node: `{...}` JSON frames arrive on a UART, are
//! decoded into commands, and enable or tune a temperature sensor, a light
//! sensor and a relay. Enabled sensors report periodically on the same line.
//!
//! ```text
//!  UART RX ─▶ protocol::framing ─▶ tasks::decoder ─▶ tasks::dispatcher
//!                                                        │
//!                          app::registry / app::relay ◀──┘
//!                                 │              │
//!                        tasks::sampler    tasks::actuator
//!                                 │
//!  UART TX ◀─ drivers::serial_guard ◀──────────────────────
//! ```
//!
//! All ESP-IDF-specific code is guarded by `#[cfg(target_os = "espidf")]`;
//! everything else runs and is tested on the host.

#![deny(unused_must_use)]

pub mod adapters;
pub mod app;
pub mod config;
pub mod diagnostics;
pub mod drivers;
pub mod error;
pub mod node;
pub mod pins;
pub mod protocol;
pub mod sensors;
pub mod sync;
pub mod tasks;
