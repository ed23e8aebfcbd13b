//! Mock hardware adapters for integration tests.
//!
//! Every mock is a cheap `Clone` over shared state, so a test keeps one
//! copy for assertions while the node owns the other.

use std::sync::atomic::{AtomicU16, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use embedded_hal::digital::PinState;
use sensornode::app::commands::{Command, CommandKind, NodeId};
use sensornode::app::ports::{AnalogPort, DigitalOutputPort, SerialTx};
use sensornode::config::NodeConfig;
use sensornode::error::HalError;
use sensornode::node::Node;
use sensornode::protocol::codec::encode_command;

// ── Analog ────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalogCall {
    Init,
    Deinit,
    Read,
}

#[derive(Default)]
struct AnalogState {
    powered: bool,
    fail_reads: bool,
    calls: Vec<AnalogCall>,
}

#[derive(Clone, Default)]
pub struct MockAnalog {
    raw: Arc<AtomicU16>,
    state: Arc<Mutex<AnalogState>>,
}

#[allow(dead_code)]
impl MockAnalog {
    pub fn new(raw: u16) -> Self {
        let m = Self::default();
        m.set_raw(raw);
        m
    }

    pub fn set_raw(&self, raw: u16) {
        self.raw.store(raw, Ordering::Relaxed);
    }

    pub fn fail_reads(&self, fail: bool) {
        self.state.lock().unwrap().fail_reads = fail;
    }

    pub fn calls(&self) -> Vec<AnalogCall> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn count(&self, call: AnalogCall) -> usize {
        self.calls().iter().filter(|&&c| c == call).count()
    }

    pub fn powered(&self) -> bool {
        self.state.lock().unwrap().powered
    }
}

impl AnalogPort for MockAnalog {
    fn init(&mut self) -> Result<(), HalError> {
        let mut s = self.state.lock().unwrap();
        s.calls.push(AnalogCall::Init);
        s.powered = true;
        Ok(())
    }

    fn deinit(&mut self) {
        let mut s = self.state.lock().unwrap();
        s.calls.push(AnalogCall::Deinit);
        s.powered = false;
    }

    fn sample_ready(&mut self) -> bool {
        self.state.lock().unwrap().powered
    }

    fn read(&mut self) -> Result<u16, HalError> {
        let mut s = self.state.lock().unwrap();
        s.calls.push(AnalogCall::Read);
        if s.fail_reads || !s.powered {
            return Err(HalError::AnalogReadFailed);
        }
        Ok(self.raw.load(Ordering::Relaxed))
    }
}

// ── Relay pin ─────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinCall {
    Init(PinState),
    Deinit,
    Write(PinState),
}

#[derive(Clone, Default)]
pub struct MockPin {
    calls: Arc<Mutex<Vec<PinCall>>>,
}

#[allow(dead_code)]
impl MockPin {
    pub fn calls(&self) -> Vec<PinCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Current level; `None` while released.
    pub fn level(&self) -> Option<PinState> {
        match self.calls().last()? {
            PinCall::Init(l) | PinCall::Write(l) => Some(*l),
            PinCall::Deinit => None,
        }
    }

    /// Any write between a release and the next init.
    pub fn written_while_released(&self) -> bool {
        let mut released = true;
        for call in self.calls() {
            match call {
                PinCall::Init(_) => released = false,
                PinCall::Deinit => released = true,
                PinCall::Write(_) if released => return true,
                PinCall::Write(_) => {}
            }
        }
        false
    }
}

impl DigitalOutputPort for MockPin {
    fn init(&mut self, idle: PinState) -> Result<(), HalError> {
        self.calls.lock().unwrap().push(PinCall::Init(idle));
        Ok(())
    }

    fn deinit(&mut self) {
        self.calls.lock().unwrap().push(PinCall::Deinit);
    }

    fn write(&mut self, level: PinState) -> Result<(), HalError> {
        self.calls.lock().unwrap().push(PinCall::Write(level));
        Ok(())
    }
}

// ── Serial ────────────────────────────────────────────────────

#[derive(Default)]
struct SerialState {
    pending: Vec<u8>,
    messages: Vec<String>,
}

/// Transmit line that splits the byte stream into messages at each flush.
#[derive(Clone, Default)]
pub struct MockSerial {
    state: Arc<Mutex<SerialState>>,
}

#[allow(dead_code)]
impl MockSerial {
    pub fn messages(&self) -> Vec<String> {
        self.state.lock().unwrap().messages.clone()
    }

    /// Poll until `done` holds for the message log or `timeout` passes.
    pub fn wait_for(
        &self,
        timeout: Duration,
        done: impl Fn(&[String]) -> bool,
    ) -> Option<Vec<String>> {
        let deadline = Instant::now() + timeout;
        loop {
            let msgs = self.messages();
            if done(&msgs) {
                return Some(msgs);
            }
            if Instant::now() >= deadline {
                return None;
            }
            std::thread::sleep(Duration::from_millis(2));
        }
    }
}

impl SerialTx for MockSerial {
    fn send_byte(&mut self, byte: u8) -> Result<(), HalError> {
        self.state.lock().unwrap().pending.push(byte);
        Ok(())
    }

    fn flush(&mut self) -> Result<(), HalError> {
        let mut s = self.state.lock().unwrap();
        let bytes = std::mem::take(&mut s.pending);
        s.messages.push(String::from_utf8(bytes).unwrap());
        Ok(())
    }
}

// ── Fixtures ──────────────────────────────────────────────────

pub type MockNode = Node<MockAnalog, MockPin, MockSerial>;

/// Raw ADC value that converts to 22 °C.
pub const TEMP_RAW_22C: u16 = 409;
pub const LIGHT_RAW: u16 = 1500;

pub struct Rig {
    pub node: MockNode,
    pub temp: MockAnalog,
    pub light: MockAnalog,
    pub pin: MockPin,
    pub serial: MockSerial,
}

pub fn rig(config: NodeConfig) -> Rig {
    let temp = MockAnalog::new(TEMP_RAW_22C);
    let light = MockAnalog::new(LIGHT_RAW);
    let pin = MockPin::default();
    let serial = MockSerial::default();
    let node = Node::new(
        config,
        temp.clone(),
        light.clone(),
        pin.clone(),
        serial.clone(),
    );
    Rig {
        node,
        temp,
        light,
        pin,
        serial,
    }
}

/// Config with fast loops for threaded tests.
#[allow(dead_code)]
pub fn fast_config() -> NodeConfig {
    NodeConfig {
        default_interval_secs: 0,
        min_sample_period_ms: 10,
        relay_poll_ms: 10,
        ..NodeConfig::default()
    }
}

/// Wire bytes for one command.
pub fn frame(kind: CommandKind, node_id: NodeId, data: &str) -> Vec<u8> {
    encode_command(&Command::new(kind, node_id, data)).unwrap()
}

pub fn done(node_type: &str, node_id: NodeId) -> String {
    format!(r#"{{"nodeType":"{node_type}","nodeID":{node_id},"data":"DONE"}}"#)
}

#[allow(dead_code)]
pub fn wait_until(timeout: Duration, cond: impl Fn() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if cond() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(2));
    }
    cond()
}
