//! Task loops.
//!
//! ```text
//!  uart-rx ──FrameQueue───▶ decoder ──DispatchQueue──▶ dispatcher
//!                                                        │ wake
//!                                     ┌──────────────────┼─────────────┐
//!                                     ▼                  ▼             ▼
//!                               temp-sampler       light-sampler    actuator
//! ```
//!
//! Each loop is a struct holding `Arc` handles to what it shares, with a
//! single-step method (`run_once`, `cycle`, `apply_once`) that the tests
//! drive directly, and a `run` method that loops forever on its own thread.

pub mod actuator;
pub mod decoder;
pub mod dispatcher;
pub mod sampler;
