//! Serial command protocol.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────┐
//! │                     Protocol Stack                         │
//! │                                                            │
//! │  ┌──────────┐  frames  ┌──────────┐  queue  ┌───────────┐  │
//! │  │ Framing  │─────────▶│  Codec   │────────▶│ Dispatcher│  │
//! │  │ (ISR)    │          │ (decoder │         │  (task)   │  │
//! │  └──────────┘          │  task)   │         └─────┬─────┘  │
//! │                        └──────────┘               │        │
//! │  ┌──────────┐                                     │        │
//! │  │ UART TX  │◀──── SerialGuard ◀──── encode ◀─────┘        │
//! │  └──────────┘                                              │
//! └────────────────────────────────────────────────────────────┘
//! ```

pub mod channels;
pub mod codec;
pub mod framing;
