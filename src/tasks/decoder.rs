//! Command Decoder task.
//!
//! Waits for the next completed frame, decodes it, and offers the command to the
//! dispatch queue without blocking. A full queue drops the command.

use std::sync::Arc;

use embassy_sync::channel::TrySendError;
use futures_lite::future;
use log::{debug, warn};

use crate::diagnostics::Diagnostics;
use crate::error::DecodeError;
use crate::protocol::channels::{DispatchQueue, FrameQueue};
use crate::protocol::codec::decode_command;

/// What happened to one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOutcome {
    Queued,
    /// Decoded fine but the dispatcher is behind.
    QueueFull,
    Rejected(DecodeError),
}

pub struct Decoder {
    frames: Arc<FrameQueue>,
    queue: Arc<DispatchQueue>,
    diag: Arc<Diagnostics>,
}

impl Decoder {
    pub fn new(frames: Arc<FrameQueue>, queue: Arc<DispatchQueue>, diag: Arc<Diagnostics>) -> Self {
        Self {
            frames,
            queue,
            diag,
        }
    }

    /// Decode one frame and offer it to the dispatcher.
    pub fn handle_frame(&self, frame: &[u8]) -> FrameOutcome {
        let cmd = match decode_command(frame) {
            Ok(cmd) => cmd,
            Err(e) => {
                self.diag.record_decode(e);
                debug!("frame dropped: {}", e);
                return FrameOutcome::Rejected(e);
            }
        };

        match self.queue.try_send(cmd) {
            Ok(()) => FrameOutcome::Queued,
            Err(TrySendError::Full(cmd)) => {
                self.diag.record_queue_full();
                warn!(
                    "dispatch queue full, dropped {} {}",
                    cmd.kind.mnemonic(),
                    cmd.node_id
                );
                FrameOutcome::QueueFull
            }
        }
    }

    /// Block until the next frame arrives, then handle it.
    pub fn run_once(&self) -> FrameOutcome {
        let frame = future::block_on(self.frames.receive());
        let outcome = self.handle_frame(&frame);
        self.diag.record_frame_decoded();
        outcome
    }

    pub fn run(self) -> ! {
        loop {
            self.run_once();
        }
    }
}
