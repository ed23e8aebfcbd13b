//! Sensor node firmware entry point.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │  Adapters:  ADC ×2   relay GPIO   UART TX   UART RX          │
//! │  ─────────────────── Port Trait Boundary ─────────────────   │
//! │  Node: decoder · dispatcher · samplers ×2 · actuator         │
//! │  Supervisor (this thread): watchdog + diagnostics            │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! On ESP-IDF the adapters are the real peripherals. On the host the
//! receive line is stdin, the transmit line is stdout, and logs go to
//! stderr.

use std::thread;
use std::time::{Duration, Instant};

use anyhow::Result;
use log::info;

use sensornode::app::ports::{AnalogPort, DigitalOutputPort, SerialTx};
use sensornode::config::NodeConfig;
use sensornode::drivers::watchdog::{Supervisor, Watchdog};
use sensornode::node::Node;

/// Supervisor tick; well inside the watchdog timeout.
const SUPERVISOR_TICK: Duration = Duration::from_secs(1);

#[cfg(target_os = "espidf")]
fn main() -> Result<()> {
    use sensornode::adapters::esp::{self, EspAnalog, EspRelayPin, EspUartRx, EspUartTx};
    use sensornode::drivers::serial_rx;
    use sensornode::drivers::task_pin::{TaskSpec, spawn_task};

    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("sensornode v{}", env!("CARGO_PKG_VERSION"));

    let config = NodeConfig::default();
    esp::install_uart(config.uart_baud)?;

    let node = Node::new(
        config,
        EspAnalog::temperature(),
        EspAnalog::light(),
        EspRelayPin::new(),
        EspUartTx,
    );
    let _tasks = node.spawn()?;
    let rx = node.receiver();
    spawn_task(TaskSpec::UART_RX, move || serial_rx::run(EspUartRx, rx))?;

    supervise(&node)
}

#[cfg(not(target_os = "espidf"))]
fn main() -> Result<()> {
    use sensornode::adapters::sim::{self, SimAnalog, SimPin, SimRelayPort, StdoutTx};
    use sensornode::drivers::task_pin::{TaskSpec, spawn_task};
    use tracing_subscriber::EnvFilter;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    info!("sensornode v{} (sim)", env!("CARGO_PKG_VERSION"));

    let config = load_config()?;
    info!("config: {:?}", config);

    // ~22 °C and mid-scale light until something moves them.
    let node = Node::new(
        config,
        SimAnalog::new(409),
        SimAnalog::new(2048),
        SimRelayPort::new(SimPin::default()),
        StdoutTx::stdout(),
    );
    let _tasks = node.spawn()?;

    let mut rx = node.receiver();
    spawn_task(TaskSpec::UART_RX, move || {
        if let Err(e) = sim::pump_input(std::io::stdin().lock(), &mut rx) {
            log::error!("stdin: {}", e);
        }
        info!("stdin closed");
    })?;

    supervise(&node)
}

/// Host config: JSON at `$SENSORNODE_CONFIG`, else defaults.
#[cfg(not(target_os = "espidf"))]
fn load_config() -> Result<NodeConfig> {
    use anyhow::Context;

    let Ok(path) = std::env::var("SENSORNODE_CONFIG") else {
        return Ok(NodeConfig::default());
    };
    let bytes = std::fs::read(&path).with_context(|| format!("reading {path}"))?;
    NodeConfig::from_json(&bytes).with_context(|| format!("loading {path}"))
}

/// Feed the watchdog while the command path keeps up, and log counters,
/// until the node resets.
fn supervise<A, D, S>(node: &Node<A, D, S>) -> Result<()>
where
    A: AnalogPort,
    D: DigitalOutputPort,
    S: SerialTx,
{
    let mut supervisor = Supervisor::new(Watchdog::new());
    let period = Duration::from_secs(u64::from(node.config().diagnostics_interval_secs));
    let mut last_log = Instant::now();
    loop {
        supervisor.tick(&node.progress());
        if last_log.elapsed() >= period {
            node.diagnostics().snapshot().log();
            last_log = Instant::now();
        }
        thread::sleep(SUPERVISOR_TICK);
    }
}
