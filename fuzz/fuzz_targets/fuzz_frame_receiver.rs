//! Fuzz target: `FrameReceiver::on_byte`
//!
//! Drives arbitrary byte sequences into the frame receiver and asserts
//! that it never panics, never buffers past capacity, and only ever emits
//! brace-delimited frames.
//!
//! cargo fuzz run fuzz_frame_receiver

#![no_main]

use std::sync::Arc;

use libfuzzer_sys::fuzz_target;
use sensornode::diagnostics::Diagnostics;
use sensornode::protocol::channels::FrameQueue;
use sensornode::protocol::framing::{ByteOutcome, FrameReceiver, RAW_FRAME_CAPACITY};

fuzz_target!(|data: &[u8]| {
    let frames = Arc::new(FrameQueue::new());
    let mut rx = FrameReceiver::new(frames.clone(), Arc::new(Diagnostics::new()));

    for &b in data {
        if rx.on_byte(b) == ByteOutcome::Completed {
            let frame = frames.try_receive().expect("completed frame not queued");
            assert!(frame.len() <= RAW_FRAME_CAPACITY);
            assert_eq!(frame.first(), Some(&b'{'));
            assert_eq!(frame.last(), Some(&b'}'));
        }
        assert!(rx.pending() <= RAW_FRAME_CAPACITY);
    }

    rx.reset();
    assert_eq!(rx.pending(), 0);
});
