//! Outbound reports.
//!
//! Everything the node puts on the transmit line is a [`Report`]: sensor
//! readings, relay status, and `DONE` acknowledgements. They share the
//! same three-field envelope as inbound commands.

use core::fmt::Write as _;

use heapless::String;
use serde::Serialize;

use super::commands::{Device, NodeId};

/// Payload of every positive acknowledgement.
pub const DONE: &str = "DONE";

/// Room for a reading, a status digit, or `DONE`.
pub type ReportData = String<16>;

/// Which side of the node a report speaks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum NodeType {
    /// Sensor report.
    #[serde(rename = "NS")]
    Sensor,
    /// Actuator report.
    #[serde(rename = "NA")]
    Actuator,
}

impl NodeType {
    pub const fn of(device: Device) -> Self {
        if device.is_sensor() {
            Self::Sensor
        } else {
            Self::Actuator
        }
    }
}

/// One outbound message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Report {
    #[serde(rename = "nodeType")]
    pub node_type: NodeType,
    #[serde(rename = "nodeID")]
    pub node_id: NodeId,
    pub data: ReportData,
}

impl Report {
    /// `DONE` acknowledgement for a state-changing command.
    pub fn done(device: Device) -> Self {
        let mut data = ReportData::new();
        let _ = data.push_str(DONE);
        Self {
            node_type: NodeType::of(device),
            node_id: device.node_id(),
            data,
        }
    }

    /// Relay status reply. Echoes the node ID the request carried.
    pub fn relay_status(node_id: NodeId, commanded: bool) -> Self {
        let mut data = ReportData::new();
        let _ = data.push(if commanded { '1' } else { '0' });
        Self {
            node_type: NodeType::Actuator,
            node_id,
            data,
        }
    }

    /// Periodic sensor reading, already formatted by the sensor transform.
    pub fn reading(device: Device, value: impl core::fmt::Display) -> Self {
        let mut data = ReportData::new();
        let _ = write!(data, "{}", value);
        Self {
            node_type: NodeType::of(device),
            node_id: device.node_id(),
            data,
        }
    }
}
