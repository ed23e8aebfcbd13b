//! Inter-task channels.
//!
//! Uses `embassy-sync` bounded channels for both hand-offs in the command
//! path. The channels live inside the [`Node`](crate::node::Node) and are
//! shared as `Arc`s, never as globals.
//!
//! ```text
//! ┌──────────────┐   RawFrame   ┌──────────────┐   Command    ┌──────────────┐
//! │   Receiver   │─────────────▶│   Decoder    │─────────────▶│  Dispatcher  │
//! │  (try_send)  │  depth = 16  │  (try_send)  │  depth = 10  │  (receive)   │
//! └──────────────┘              └──────────────┘              └──────────────┘
//! ```
//!
//! The frame queue is deeper than the dispatch queue so that a burst which
//! arrives faster than the decoder runs still reaches the dispatch queue,
//! where backpressure is applied.

use embassy_sync::channel::Channel;

use crate::app::commands::Command;
use crate::protocol::framing::RawFrame;
use crate::sync::RawMutex;

/// Channel depth for completed raw frames.
pub const FRAME_DEPTH: usize = 16;

/// Channel depth for decoded commands.
pub const DISPATCH_DEPTH: usize = 10;

/// Receiver → decoder FIFO. Filled from interrupt context with
/// `try_send`; a frame that finds it full is dropped and counted.
pub type FrameQueue = Channel<RawMutex, RawFrame, FRAME_DEPTH>;

/// Decoder → dispatcher FIFO. A full queue rejects new commands; the
/// decoder drops them without retry.
pub type DispatchQueue = Channel<RawMutex, Command, DISPATCH_DEPTH>;
