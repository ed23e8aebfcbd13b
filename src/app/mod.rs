//! Application core: commands, reports, device state and the dispatcher.
//!
//! All interaction with hardware happens through the **port traits** in
//! [`ports`], so this layer runs unchanged against mocks on the host.

pub mod commands;
pub mod dispatcher;
pub mod events;
pub mod ports;
pub mod registry;
pub mod relay;
