//! Brace-delimited frame receiver.
//!
//! Wire format: one JSON object per frame, no length prefix.
//! ```text
//! ... noise ... { "command": ... } ... noise ... { ... }
//!               └──── frame ─────┘               └ frame ┘
//! ```
//!
//! [`FrameReceiver::on_byte`] runs in the UART receive interrupt (or its
//! host stand-in thread). It does a bounded amount of work per byte, never
//! blocks, and never logs. Completed frames are queued for the decoder task
//! on a [`FrameQueue`]; all parsing happens there.
//!
//! Policy, byte by byte:
//! - nothing buffered and the byte is not `{` → dropped;
//! - `{` → the frame (re)starts at this byte, discarding any partial frame;
//! - `}` → the frame is complete and queued, the buffer resets;
//! - anything else → appended; a frame that would exceed
//!   [`RAW_FRAME_CAPACITY`] is discarded whole.

use std::sync::Arc;

use heapless::Vec;

use crate::diagnostics::Diagnostics;
use crate::protocol::channels::FrameQueue;

/// Largest frame, braces included.
pub const RAW_FRAME_CAPACITY: usize = 64;

const FRAME_START: u8 = b'{';
const FRAME_END: u8 = b'}';

/// One complete `{...}` frame.
pub type RawFrame = Vec<u8, RAW_FRAME_CAPACITY>;

/// What a single byte did to the receiver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ByteOutcome {
    /// Byte arrived outside a frame and was dropped.
    Ignored,
    /// Byte was buffered (including a frame-opening `{`).
    Buffered,
    /// A partial frame was abandoned because a new `{` arrived.
    Restarted,
    /// Byte closed a frame, which was queued for the decoder.
    Completed,
    /// Byte closed a frame but the frame queue was full; it was dropped.
    Dropped,
    /// Frame outgrew the buffer and was dropped.
    Overflowed,
}

/// Interrupt-side frame assembler.
pub struct FrameReceiver {
    buf: RawFrame,
    frames: Arc<FrameQueue>,
    diag: Arc<Diagnostics>,
}

impl FrameReceiver {
    pub fn new(frames: Arc<FrameQueue>, diag: Arc<Diagnostics>) -> Self {
        Self {
            buf: Vec::new(),
            frames,
            diag,
        }
    }

    /// Feed one received byte.
    pub fn on_byte(&mut self, byte: u8) -> ByteOutcome {
        if byte == FRAME_START {
            let restarted = !self.buf.is_empty();
            if restarted {
                self.diag.record_malformed_frame();
            }
            self.buf.clear();
            // Cannot fail: the buffer was just cleared.
            let _ = self.buf.push(byte);
            return if restarted {
                ByteOutcome::Restarted
            } else {
                ByteOutcome::Buffered
            };
        }

        if self.buf.is_empty() {
            return ByteOutcome::Ignored;
        }

        if self.buf.push(byte).is_err() {
            self.buf.clear();
            self.diag.record_overlong_frame();
            return ByteOutcome::Overflowed;
        }

        if byte == FRAME_END {
            let frame = core::mem::take(&mut self.buf);
            if self.frames.try_send(frame).is_err() {
                self.diag.record_frame_overrun();
                return ByteOutcome::Dropped;
            }
            self.diag.record_frame_completed();
            return ByteOutcome::Completed;
        }

        ByteOutcome::Buffered
    }

    /// Feed a run of bytes; returns how many frames were queued.
    pub fn feed(&mut self, bytes: &[u8]) -> usize {
        bytes
            .iter()
            .filter(|&&b| self.on_byte(b) == ByteOutcome::Completed)
            .count()
    }

    /// Bytes of the frame currently being assembled.
    pub fn pending(&self) -> usize {
        self.buf.len()
    }

    /// Drop any partial frame (e.g. after a line break or UART error).
    pub fn reset(&mut self) {
        self.buf.clear();
    }
}
