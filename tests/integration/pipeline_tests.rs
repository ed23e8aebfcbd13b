//! Integration tests: the full node running on its own threads.
//!
//! The test thread plays the UART receive interrupt, feeding bytes into
//! the frame receiver, and watches the mock transmit line.

use std::time::Duration;

use embedded_hal::digital::PinState;
use sensornode::app::commands::CommandKind::{Activate, Disable, Enable, SetDuration, Status};
use sensornode::app::commands::Device;
use sensornode::protocol::channels::DISPATCH_DEPTH;
use sensornode::protocol::framing::FrameReceiver;

use crate::mock_hw::{MockNode, Rig, done, fast_config, frame, rig, wait_until};

const TIMEOUT: Duration = Duration::from_secs(5);

fn temp_reading() -> String {
    r#"{"nodeType":"NS","nodeID":128,"data":"22°C"}"#.to_string()
}

/// Commands the node has finished with, one way or another.
fn settled(node: &MockNode) -> u32 {
    let d = node.diagnostics().snapshot();
    d.commands_dispatched
        + d.unknown_node
        + d.precondition_failed
        + d.invalid_payload
        + d.decode_errors
        + d.unknown_command
        + d.queue_full
        + d.hal_errors
        + d.timeouts
}

/// Feed one frame and wait until the node has dealt with it, so the next
/// frame cannot overrun it.
fn send(r: &Rig, rx: &mut FrameReceiver, bytes: &[u8]) {
    let before = settled(&r.node);
    assert_eq!(rx.feed(bytes), 1);
    assert!(
        wait_until(TIMEOUT, || settled(&r.node) > before),
        "command not processed"
    );
}

fn start() -> (Rig, FrameReceiver) {
    let r = rig(fast_config());
    r.node.spawn().unwrap();
    let rx = r.node.receiver();
    (r, rx)
}

#[test]
fn enable_temperature_acks_then_streams_readings() {
    let (r, mut rx) = start();
    send(&r, &mut rx, &frame(Enable, 128, ""));

    let msgs = r
        .serial
        .wait_for(TIMEOUT, |m| m.len() >= 4)
        .expect("no readings");
    assert_eq!(msgs[0], done("NS", 128));
    assert!(msgs[1..].iter().all(|m| *m == temp_reading()), "{msgs:?}");
}

#[test]
fn activate_then_status_reports_one() {
    let (r, mut rx) = start();
    send(&r, &mut rx, &frame(Activate, 80, "1"));
    send(&r, &mut rx, &frame(Status, 80, ""));
    let msgs = r.serial.wait_for(TIMEOUT, |m| !m.is_empty()).unwrap();
    assert_eq!(msgs[0], r#"{"nodeType":"NA","nodeID":80,"data":"1"}"#);
}

#[test]
fn disable_of_never_enabled_node_does_not_deadlock() {
    let (r, mut rx) = start();
    send(&r, &mut rx, &frame(Disable, 129, ""));
    send(&r, &mut rx, &frame(Enable, 129, ""));
    let msgs = r.serial.wait_for(TIMEOUT, |m| !m.is_empty()).unwrap();
    assert_eq!(msgs[0], done("NS", 129), "DIS must not have produced an ack");
}

#[test]
fn disable_stops_readings() {
    let (r, mut rx) = start();
    send(&r, &mut rx, &frame(Enable, 129, ""));
    r.serial.wait_for(TIMEOUT, |m| m.len() >= 3).unwrap();

    send(&r, &mut rx, &frame(Disable, 129, ""));
    let msgs = r
        .serial
        .wait_for(TIMEOUT, |m| m.iter().skip(1).any(|s| *s == done("NS", 129)))
        .unwrap();
    let ack_at = msgs.iter().rposition(|s| *s == done("NS", 129)).unwrap();

    std::thread::sleep(Duration::from_millis(100));
    let after = r.serial.messages().len() - ack_at - 1;
    // A sample taken just before the DIS may still be in flight.
    assert!(after <= 1, "{after} readings after DIS");
    assert!(!r.light.powered());
}

#[test]
fn long_duration_throttles_sampler() {
    let (r, mut rx) = start();
    send(&r, &mut rx, &frame(Enable, 128, ""));
    r.serial.wait_for(TIMEOUT, |m| m.len() >= 3).unwrap();
    send(&r, &mut rx, &frame(SetDuration, 128, "3600"));

    // Let the in-flight cycle finish and pick up the new interval.
    std::thread::sleep(Duration::from_millis(50));
    let before = r.serial.messages().len();
    std::thread::sleep(Duration::from_millis(100));
    assert!(r.serial.messages().len() <= before + 1);
}

#[test]
fn actuator_loop_drives_relay_and_stops_on_disable() {
    let (r, mut rx) = start();
    send(&r, &mut rx, &frame(Enable, 80, ""));
    send(&r, &mut rx, &frame(Activate, 80, "1"));
    assert!(wait_until(TIMEOUT, || r.pin.level() == Some(PinState::Low)));

    send(&r, &mut rx, &frame(Activate, 80, "0"));
    assert!(wait_until(TIMEOUT, || r.pin.level() == Some(PinState::High)));

    send(&r, &mut rx, &frame(Disable, 80, ""));
    std::thread::sleep(Duration::from_millis(50));
    assert_eq!(r.pin.level(), None);
    assert!(!r.pin.written_while_released());
}

#[test]
fn noise_between_frames_is_ignored() {
    let (r, mut rx) = start();
    rx.feed(b"garbage\r\n");
    send(&r, &mut rx, &frame(Status, 42, ""));
    let msgs = r.serial.wait_for(TIMEOUT, |m| !m.is_empty()).unwrap();
    assert_eq!(msgs[0], r#"{"nodeType":"NA","nodeID":42,"data":"0"}"#);
}

fn acks(msgs: &[String]) -> Vec<String> {
    msgs.iter().filter(|m| m.contains("DONE")).cloned().collect()
}

#[test]
fn back_to_back_frames_in_one_read_all_get_acked() {
    let (r, mut rx) = start();
    let mut burst = frame(Enable, 128, "");
    burst.extend(frame(Enable, 129, ""));
    burst.extend(frame(Enable, 80, ""));
    assert_eq!(rx.feed(&burst), 3);

    let msgs = r
        .serial
        .wait_for(TIMEOUT, |m| acks(m).len() >= 3)
        .expect("every frame in the burst should be acked");
    assert_eq!(
        acks(&msgs),
        vec![done("NS", 128), done("NS", 129), done("NA", 80)]
    );
    assert_eq!(r.node.diagnostics().snapshot().frame_overruns, 0);
}

#[test]
fn burst_against_stalled_dispatcher_keeps_queue_depth() {
    let (r, mut rx) = start();
    let ena = frame(Enable, 128, "");
    let temp = r.node.registry().sensor(Device::Temperature).unwrap().clone();

    let held = temp.lock(None).unwrap();
    // The dispatcher takes this one and blocks on the held sensor lock.
    assert_eq!(rx.feed(&ena), 1);
    assert!(wait_until(TIMEOUT, || {
        r.node.diagnostics().snapshot().frames_decoded == 1 && r.node.queue().is_empty()
    }));

    let burst: Vec<u8> = (0..=DISPATCH_DEPTH).flat_map(|_| ena.clone()).collect();
    assert_eq!(rx.feed(&burst), DISPATCH_DEPTH + 1);
    assert!(wait_until(TIMEOUT, || {
        r.node.diagnostics().snapshot().frames_decoded == DISPATCH_DEPTH as u32 + 2
    }));
    assert_eq!(r.node.queue().len(), DISPATCH_DEPTH);
    assert_eq!(r.node.diagnostics().snapshot().queue_full, 1);

    drop(held);
    let msgs = r
        .serial
        .wait_for(TIMEOUT, |m| acks(m).len() >= DISPATCH_DEPTH + 1)
        .expect("in-flight and queued commands should all be acked");
    assert_eq!(acks(&msgs).len(), DISPATCH_DEPTH + 1);
}
