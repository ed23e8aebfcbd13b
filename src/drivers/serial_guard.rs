//! Serial Output Guard.
//!
//! One mutex around the transmit line. A writer holds it from the first
//! byte of a message to the last, so reports from the Dispatcher and the
//! two Samplers never interleave on the wire. Waiters are served in the
//! order the underlying `embassy-sync` mutex wakes them.

use core::time::Duration;

use embassy_sync::mutex::Mutex;

use crate::app::events::Report;
use crate::app::ports::SerialTx;
use crate::error::Result;
use crate::protocol::codec::encode_report;
use crate::sync::{RawMutex, block_on_bounded};

pub struct SerialGuard<S> {
    tx: Mutex<RawMutex, S>,
}

impl<S: SerialTx> SerialGuard<S> {
    pub fn new(tx: S) -> Self {
        Self { tx: Mutex::new(tx) }
    }

    /// Encode `report` and write it as one uninterrupted message.
    ///
    /// Encoding happens before the line is taken so the critical section
    /// covers only the byte writes.
    pub fn send(&self, report: &Report, timeout: Option<Duration>) -> Result<()> {
        let bytes = encode_report(report)?;
        self.write_all(&bytes, timeout)
    }

    /// Write raw bytes as one uninterrupted message.
    pub fn write_all(&self, bytes: &[u8], timeout: Option<Duration>) -> Result<()> {
        let mut tx = block_on_bounded(self.tx.lock(), timeout, "serial")?;
        for &b in bytes {
            tx.send_byte(b)?;
        }
        tx.flush()?;
        Ok(())
    }

    /// Run `f` with exclusive access to the line.
    pub fn with_line<R>(&self, f: impl FnOnce(&mut S) -> R) -> R {
        let mut tx = futures_lite::future::block_on(self.tx.lock());
        f(&mut tx)
    }
}
