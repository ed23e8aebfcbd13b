//! Integration tests: frame → decoder → dispatcher, driven one step at a
//! time on the test thread.

use embedded_hal::digital::PinState;
use sensornode::app::commands::CommandKind::{Activate, Disable, Enable, SetDuration, Status};
use sensornode::app::dispatcher::{Ignored, Outcome};
use sensornode::config::NodeConfig;
use sensornode::protocol::channels::DISPATCH_DEPTH;
use sensornode::tasks::decoder::FrameOutcome;

use crate::mock_hw::{AnalogCall, PinCall, Rig, done, frame, rig};

/// Push one frame through the receiver and decoder, then dispatch it.
fn step(r: &Rig, bytes: &[u8]) -> Outcome {
    let mut rx = r.node.receiver();
    assert_eq!(rx.feed(bytes), 1);
    assert_eq!(r.node.decoder().run_once(), FrameOutcome::Queued);
    r.node.dispatch_task().run_once().unwrap()
}

#[test]
fn enable_temperature_acks_and_powers_adc() {
    let r = rig(NodeConfig::default());
    assert_eq!(step(&r, &frame(Enable, 128, "")), Outcome::Acked);
    assert_eq!(r.serial.messages(), vec![done("NS", 128)]);
    assert_eq!(r.temp.calls(), vec![AnalogCall::Init]);
    assert!(r.light.calls().is_empty());
}

#[test]
fn disable_powers_adc_down_and_acks() {
    let r = rig(NodeConfig::default());
    step(&r, &frame(Enable, 129, ""));
    assert_eq!(step(&r, &frame(Disable, 129, "")), Outcome::Acked);
    assert_eq!(r.light.calls(), vec![AnalogCall::Init, AnalogCall::Deinit]);
    assert_eq!(r.serial.messages(), vec![done("NS", 129), done("NS", 129)]);
}

#[test]
fn activate_then_status_reports_one() {
    let r = rig(NodeConfig::default());
    assert_eq!(step(&r, &frame(Activate, 80, "1")), Outcome::Applied);
    step(&r, &frame(Status, 80, ""));
    assert_eq!(
        r.serial.messages(),
        vec![r#"{"nodeType":"NA","nodeID":80,"data":"1"}"#.to_string()]
    );
}

#[test]
fn repeated_status_is_stable() {
    let r = rig(NodeConfig::default());
    step(&r, &frame(Enable, 80, ""));
    step(&r, &frame(Activate, 80, "0"));
    step(&r, &frame(Status, 80, ""));
    step(&r, &frame(Status, 80, ""));
    let msgs = r.serial.messages();
    assert_eq!(msgs.len(), 3);
    assert_eq!(msgs[1], msgs[2]);
}

#[test]
fn relay_lifecycle_drives_pin_active_low() {
    let r = rig(NodeConfig::default());
    let actuator = r.node.actuator();

    step(&r, &frame(Enable, 80, ""));
    assert_eq!(r.pin.calls(), vec![PinCall::Init(PinState::High)]);

    step(&r, &frame(Activate, 80, "1"));
    assert!(actuator.apply_once().unwrap());
    assert_eq!(r.pin.level(), Some(PinState::Low));

    step(&r, &frame(Disable, 80, ""));
    assert_eq!(r.pin.level(), None);
    assert!(!actuator.apply_once().unwrap(), "released pin must not be driven");
    assert!(!r.pin.written_while_released());
    assert_eq!(r.serial.messages(), vec![done("NA", 80), done("NA", 80)]);
}

#[test]
fn relay_re_enable_restores_last_level() {
    let r = rig(NodeConfig::default());
    let actuator = r.node.actuator();
    step(&r, &frame(Enable, 80, ""));
    step(&r, &frame(Activate, 80, "1"));
    step(&r, &frame(Disable, 80, ""));
    step(&r, &frame(Enable, 80, ""));
    actuator.apply_once().unwrap();
    assert_eq!(r.pin.level(), Some(PinState::Low));
}

#[test]
fn eleven_enables_while_dispatcher_stalled() {
    let r = rig(NodeConfig::default());
    let mut rx = r.node.receiver();
    let decoder = r.node.decoder();
    let ena = frame(Enable, 128, "");

    let mut outcomes = Vec::new();
    for _ in 0..=DISPATCH_DEPTH {
        rx.feed(&ena);
        outcomes.push(decoder.run_once());
    }
    assert_eq!(outcomes.last(), Some(&FrameOutcome::QueueFull));
    assert_eq!(r.node.queue().len(), DISPATCH_DEPTH);
    assert_eq!(r.node.diagnostics().snapshot().queue_full, 1);

    let task = r.node.dispatch_task();
    for _ in 0..DISPATCH_DEPTH {
        assert_eq!(task.run_once().unwrap(), Outcome::Acked);
    }
    assert!(r.node.queue().is_empty());
    assert_eq!(r.temp.count(AnalogCall::Init), 1, "ENA is idempotent");
    assert_eq!(r.serial.messages().len(), DISPATCH_DEPTH);
}

#[test]
fn eleven_enables_in_one_burst_keep_ten() {
    let r = rig(NodeConfig::default());
    let mut rx = r.node.receiver();
    let decoder = r.node.decoder();
    let burst: Vec<u8> = (0..=DISPATCH_DEPTH)
        .flat_map(|_| frame(Enable, 128, ""))
        .collect();

    assert_eq!(rx.feed(&burst), DISPATCH_DEPTH + 1);
    let outcomes: Vec<_> = (0..=DISPATCH_DEPTH).map(|_| decoder.run_once()).collect();
    assert!(outcomes[..DISPATCH_DEPTH].iter().all(|o| *o == FrameOutcome::Queued));
    assert_eq!(outcomes[DISPATCH_DEPTH], FrameOutcome::QueueFull);

    let s = r.node.diagnostics().snapshot();
    assert_eq!(s.frame_overruns, 0);
    assert_eq!(s.queue_full, 1);
    assert_eq!(r.node.queue().len(), DISPATCH_DEPTH);
}

#[test]
fn disable_of_never_enabled_node_is_a_silent_no_op() {
    let r = rig(NodeConfig::default());
    assert_eq!(
        step(&r, &frame(Disable, 129, "")),
        Outcome::Ignored(Ignored::NotEnabled)
    );
    assert!(r.serial.messages().is_empty());
    assert!(r.light.calls().is_empty());
    // The dispatcher is still alive.
    assert_eq!(step(&r, &frame(Enable, 129, "")), Outcome::Acked);
}

#[test]
fn unknown_node_and_bad_payloads_are_counted() {
    let r = rig(NodeConfig::default());
    step(&r, &frame(Enable, 1, ""));
    step(&r, &frame(Activate, 80, "2"));
    step(&r, &frame(SetDuration, 128, "soon"));
    step(&r, &frame(SetDuration, 80, "3"));
    let d = r.node.diagnostics().snapshot();
    assert_eq!(d.unknown_node, 1);
    assert_eq!(d.invalid_payload, 2);
    assert_eq!(d.precondition_failed, 1);
    assert_eq!(d.commands_dispatched, 0);
    assert!(r.serial.messages().is_empty());
}

#[test]
fn set_duration_updates_registry() {
    let r = rig(NodeConfig::default());
    step(&r, &frame(SetDuration, 129, "7"));
    let snap = r.node.registry().snapshot(None).unwrap();
    assert_eq!(snap.light.interval_secs, 7);
    assert_eq!(snap.temperature.interval_secs, 2);
}

#[test]
fn malformed_frames_never_reach_the_queue() {
    let r = rig(NodeConfig::default());
    let mut rx = r.node.receiver();
    let decoder = r.node.decoder();
    rx.feed(br#"{"command":"ENA","nodeID":128}"#);
    assert!(matches!(decoder.run_once(), FrameOutcome::Rejected(_)));
    rx.feed(br#"{"command":"ZAP","nodeID":128,"data":""}"#);
    assert!(matches!(decoder.run_once(), FrameOutcome::Rejected(_)));
    assert!(r.node.queue().is_empty());
}
