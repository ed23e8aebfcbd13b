//! Runtime diagnostics.
//!
//! The command protocol never sends a negative acknowledgement, so these
//! counters are the only record of what the node dropped or refused. Every
//! counter is a relaxed `AtomicU32` and is safe to bump from the receive
//! interrupt.
//!
//! A [`DiagnosticsSnapshot`] is collected on demand and logged by the
//! supervisor loop.

use core::sync::atomic::{AtomicU32, Ordering};

use log::info;
use serde::Serialize;

use crate::error::{DecodeError, Error};

macro_rules! counters {
    ($($(#[$doc:meta])* $field:ident => $record:ident;)*) => {
        /// Live counters shared by every task.
        #[derive(Debug, Default)]
        pub struct Diagnostics {
            $($field: AtomicU32,)*
        }

        /// Point-in-time copy of [`Diagnostics`].
        #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
        pub struct DiagnosticsSnapshot {
            $($(#[$doc])* pub $field: u32,)*
        }

        impl Diagnostics {
            $(
                pub fn $record(&self) {
                    self.$field.fetch_add(1, Ordering::Relaxed);
                }
            )*

            pub fn snapshot(&self) -> DiagnosticsSnapshot {
                DiagnosticsSnapshot {
                    $($field: self.$field.load(Ordering::Relaxed),)*
                }
            }
        }
    };
}

counters! {
    /// Frames handed to the decoder.
    frames_completed => record_frame_completed;
    /// Partial frames abandoned by a new `{`.
    malformed_frames => record_malformed_frame;
    /// Frames longer than the receive buffer.
    overlong_frames => record_overlong_frame;
    /// Completed frames dropped because the frame queue was full.
    frame_overruns => record_frame_overrun;
    /// Frames that were not a valid command envelope.
    decode_errors => record_decode_error;
    /// Well-formed frames with an unrecognised `command`.
    unknown_command => record_unknown_command;
    /// Commands dropped because the dispatch queue was full.
    queue_full => record_queue_full;
    /// Commands addressed to a node ID the node does not have.
    unknown_node => record_unknown_node;
    /// Commands whose precondition did not hold (e.g. DIS while disabled).
    precondition_failed => record_precondition_failed;
    /// Commands with an unusable `data` payload.
    invalid_payload => record_invalid_payload;
    /// Peripheral failures.
    hal_errors => record_hal_error;
    /// Bounded waits that expired.
    timeouts => record_timeout;
    /// Commands the dispatcher accepted and applied.
    commands_dispatched => record_command_dispatched;
    /// `DONE` and status replies written.
    acks_sent => record_ack_sent;
    /// Sensor readings written.
    readings_sent => record_reading_sent;
    /// Frames the decoder took off the frame queue, whatever their fate.
    frames_decoded => record_frame_decoded;
    /// Commands the dispatcher took off the dispatch queue, whatever their fate.
    commands_handled => record_command_handled;
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count a decoder failure under the right bucket.
    pub fn record_decode(&self, err: DecodeError) {
        match err {
            DecodeError::UnknownCommand => self.record_unknown_command(),
            DecodeError::Malformed | DecodeError::InvalidField => self.record_decode_error(),
        }
    }

    /// Count a task-level failure under the right bucket.
    pub fn record_error(&self, err: &Error) {
        match err {
            Error::Hal(_) => self.record_hal_error(),
            Error::TimedOut(_) => self.record_timeout(),
            Error::Encode => {}
        }
    }
}

impl DiagnosticsSnapshot {
    /// Sum of every counter that represents something dropped or refused.
    pub fn total_dropped(&self) -> u32 {
        self.malformed_frames
            + self.overlong_frames
            + self.frame_overruns
            + self.decode_errors
            + self.unknown_command
            + self.queue_full
            + self.unknown_node
            + self.precondition_failed
            + self.invalid_payload
            + self.hal_errors
            + self.timeouts
    }

    /// Emit one structured log line.
    pub fn log(&self) {
        match serde_json::to_string(self) {
            Ok(json) => info!("DIAG | {}", json),
            Err(_) => info!("DIAG | {:?}", self),
        }
    }
}
