//! JSON envelope codec.
//!
//! Inbound: `{"command":"ENA","nodeID":128,"data":""}` → [`Command`].
//! Outbound: [`Report`] → `{"nodeType":"NS","nodeID":128,"data":"DONE"}`.
//!
//! All three inbound fields are required. A frame missing one is rejected
//! as a whole; nothing is carried over from an earlier frame.

use heapless::String;
use serde::{Deserialize, Serialize};
use serde_json::error::Category;

use crate::app::commands::{Command, CommandKind, MNEMONIC_CAPACITY, NodeId, Payload};
use crate::app::events::Report;
use crate::error::{DecodeError, Error};

/// Field layout shared by both directions of the inbound envelope.
#[derive(Serialize, Deserialize)]
struct WireCommand {
    command: String<MNEMONIC_CAPACITY>,
    #[serde(rename = "nodeID")]
    node_id: NodeId,
    data: Payload,
}

/// Decode one complete frame into a command.
pub fn decode_command(frame: &[u8]) -> Result<Command, DecodeError> {
    let wire: WireCommand = serde_json::from_slice(frame).map_err(|e| match e.classify() {
        Category::Data => DecodeError::InvalidField,
        Category::Io | Category::Syntax | Category::Eof => DecodeError::Malformed,
    })?;

    let kind = CommandKind::from_mnemonic(&wire.command).ok_or(DecodeError::UnknownCommand)?;
    Ok(Command {
        kind,
        node_id: wire.node_id,
        payload: wire.data,
    })
}

/// Encode a command in its wire form (used by host tools and tests).
pub fn encode_command(cmd: &Command) -> Result<Vec<u8>, Error> {
    let mut command = String::new();
    command
        .push_str(cmd.kind.mnemonic())
        .map_err(|()| Error::Encode)?;
    let wire = WireCommand {
        command,
        node_id: cmd.node_id,
        data: cmd.payload.clone(),
    };
    serde_json::to_vec(&wire).map_err(|_| Error::Encode)
}

/// Encode an outbound report as compact JSON.
pub fn encode_report(report: &Report) -> Result<Vec<u8>, Error> {
    serde_json::to_vec(report).map_err(|_| Error::Encode)
}
