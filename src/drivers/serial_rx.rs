//! UART receive pump.
//!
//! Stands in for the per-byte receive interrupt: wakes on the first byte of
//! a burst, then drains whatever else the driver already holds, so a short
//! command is handed to the [`FrameReceiver`] as soon as it arrives rather
//! than when some read length is reached.

use log::warn;

use crate::app::ports::SerialRx;
use crate::error::HalError;
use crate::protocol::framing::FrameReceiver;

/// Bytes moved per non-blocking drain.
pub const RX_CHUNK: usize = 64;

/// Wait for one burst on `port` and feed all of it to `rx`.
///
/// Returns the number of bytes fed.
pub fn pump_once<R: SerialRx>(port: &mut R, rx: &mut FrameReceiver) -> Result<usize, HalError> {
    let first = port.wait_byte()?;
    rx.on_byte(first);

    let mut fed = 1;
    let mut buf = [0u8; RX_CHUNK];
    loop {
        let n = port.read_available(&mut buf)?;
        rx.feed(&buf[..n]);
        fed += n;
        if n < buf.len() {
            return Ok(fed);
        }
    }
}

/// Pump `port` forever. A line error drops any partial frame.
pub fn run<R: SerialRx>(mut port: R, mut rx: FrameReceiver) -> ! {
    loop {
        if let Err(e) = pump_once(&mut port, &mut rx) {
            warn!("uart rx: {}", e);
            rx.reset();
        }
    }
}
