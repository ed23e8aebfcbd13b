//! Inbound commands to the dispatcher.
//!
//! A [`Command`] is produced once by the decoder task from a completed
//! frame and consumed once by the [`Dispatcher`](super::dispatcher::Dispatcher).

use heapless::String;

/// Integer identifying a logical sensor or actuator endpoint.
pub type NodeId = i32;

pub const TEMPERATURE_NODE_ID: NodeId = 128;
pub const LIGHT_NODE_ID: NodeId = 129;
pub const RELAY_NODE_ID: NodeId = 80;

/// Longest `data` payload a command may carry (bytes).
pub const PAYLOAD_CAPACITY: usize = 31;

/// Longest `command` mnemonic accepted on the wire (bytes).
pub const MNEMONIC_CAPACITY: usize = 63;

pub type Payload = String<PAYLOAD_CAPACITY>;

/// What the outside world asked the node to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandKind {
    /// `ENA`: start a sensor loop or arm the relay.
    Enable,
    /// `DIS`: stop a sensor loop or disarm the relay.
    Disable,
    /// `ACT`: set the relay level (`"0"` / `"1"`).
    Activate,
    /// `STA`: report the commanded relay level.
    Status,
    /// `DUR`: set a sensor's sampling interval in seconds.
    SetDuration,
}

impl CommandKind {
    pub const ALL: [Self; 5] = [
        Self::Enable,
        Self::Disable,
        Self::Activate,
        Self::Status,
        Self::SetDuration,
    ];

    /// Three-letter wire mnemonic.
    pub const fn mnemonic(self) -> &'static str {
        match self {
            Self::Enable => "ENA",
            Self::Disable => "DIS",
            Self::Activate => "ACT",
            Self::Status => "STA",
            Self::SetDuration => "DUR",
        }
    }

    pub fn from_mnemonic(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.mnemonic() == s)
    }
}

/// One decoded command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    pub kind: CommandKind,
    pub node_id: NodeId,
    pub payload: Payload,
}

impl Command {
    /// Build a command, truncating the payload at a char boundary if it
    /// exceeds [`PAYLOAD_CAPACITY`].
    pub fn new(kind: CommandKind, node_id: NodeId, payload: &str) -> Self {
        let mut end = payload.len().min(PAYLOAD_CAPACITY);
        while !payload.is_char_boundary(end) {
            end -= 1;
        }
        let mut p = Payload::new();
        // Cannot fail: `end` is within capacity.
        let _ = p.push_str(&payload[..end]);
        Self {
            kind,
            node_id,
            payload: p,
        }
    }
}

/// The three logical devices the node exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Device {
    Temperature,
    Light,
    Relay,
}

impl Device {
    pub const ALL: [Self; 3] = [Self::Temperature, Self::Light, Self::Relay];

    pub fn from_node_id(id: NodeId) -> Option<Self> {
        match id {
            TEMPERATURE_NODE_ID => Some(Self::Temperature),
            LIGHT_NODE_ID => Some(Self::Light),
            RELAY_NODE_ID => Some(Self::Relay),
            _ => None,
        }
    }

    pub const fn node_id(self) -> NodeId {
        match self {
            Self::Temperature => TEMPERATURE_NODE_ID,
            Self::Light => LIGHT_NODE_ID,
            Self::Relay => RELAY_NODE_ID,
        }
    }

    pub const fn is_sensor(self) -> bool {
        !matches!(self, Self::Relay)
    }
}
