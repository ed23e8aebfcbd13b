//! Node assembly.
//!
//! [`Node`] owns every piece of shared state (the frame queue, the
//! dispatch queue, the device registry, the serial guard and the
//! diagnostics counters) and hands `Arc` handles to each task it builds.
//! There are no globals: two nodes in one process are independent.

use std::io;
use std::sync::Arc;
use std::thread::JoinHandle;

use log::info;

use crate::app::commands::Device;
use crate::app::dispatcher::Dispatcher;
use crate::app::ports::{AnalogPort, DigitalOutputPort, SerialTx};
use crate::app::registry::DeviceRegistry;
use crate::config::NodeConfig;
use crate::diagnostics::Diagnostics;
use crate::drivers::serial_guard::SerialGuard;
use crate::drivers::task_pin::{TaskSpec, spawn_task};
use crate::drivers::watchdog::Progress;
use crate::protocol::channels::{DispatchQueue, FrameQueue};
use crate::protocol::framing::FrameReceiver;
use crate::tasks::actuator::Actuator;
use crate::tasks::decoder::Decoder;
use crate::tasks::dispatcher::DispatchTask;
use crate::tasks::sampler::Sampler;

/// Join handles of the running node tasks.
pub struct NodeTasks {
    pub decoder: JoinHandle<()>,
    pub dispatcher: JoinHandle<()>,
    pub temp_sampler: JoinHandle<()>,
    pub light_sampler: JoinHandle<()>,
    pub actuator: JoinHandle<()>,
}

pub struct Node<A, D, S> {
    config: NodeConfig,
    diag: Arc<Diagnostics>,
    frames: Arc<FrameQueue>,
    queue: Arc<DispatchQueue>,
    registry: DeviceRegistry<A, D>,
    serial: Arc<SerialGuard<S>>,
}

impl<A, D, S> Node<A, D, S>
where
    A: AnalogPort,
    D: DigitalOutputPort,
    S: SerialTx,
{
    pub fn new(config: NodeConfig, temp_adc: A, light_adc: A, relay_pin: D, serial: S) -> Self {
        let registry =
            DeviceRegistry::new(temp_adc, light_adc, relay_pin, config.default_interval_secs);
        Self {
            config,
            diag: Arc::new(Diagnostics::new()),
            frames: Arc::new(FrameQueue::new()),
            queue: Arc::new(DispatchQueue::new()),
            registry,
            serial: Arc::new(SerialGuard::new(serial)),
        }
    }

    pub fn config(&self) -> &NodeConfig {
        &self.config
    }

    pub fn diagnostics(&self) -> &Arc<Diagnostics> {
        &self.diag
    }

    pub fn registry(&self) -> &DeviceRegistry<A, D> {
        &self.registry
    }

    pub fn serial(&self) -> &Arc<SerialGuard<S>> {
        &self.serial
    }

    pub fn queue(&self) -> &Arc<DispatchQueue> {
        &self.queue
    }

    /// Backlog and throughput of the decoder and dispatcher, for the
    /// supervisor's stall check.
    pub fn progress(&self) -> [Progress; 2] {
        let snap = self.diag.snapshot();
        [
            Progress {
                stage: "decoder",
                backlog: self.frames.len(),
                done: snap.frames_decoded,
            },
            Progress {
                stage: "dispatcher",
                backlog: self.queue.len(),
                done: snap.commands_handled,
            },
        ]
    }

    /// Byte-level receiver for the UART interrupt (or its stand-in).
    pub fn receiver(&self) -> FrameReceiver {
        FrameReceiver::new(self.frames.clone(), self.diag.clone())
    }

    pub fn decoder(&self) -> Decoder {
        Decoder::new(self.frames.clone(), self.queue.clone(), self.diag.clone())
    }

    pub fn dispatcher(&self) -> Dispatcher<A, D, S> {
        Dispatcher::new(
            self.registry.clone(),
            self.serial.clone(),
            self.diag.clone(),
            self.config.lock_timeout(),
        )
    }

    pub fn dispatch_task(&self) -> DispatchTask<A, D, S> {
        DispatchTask::new(self.queue.clone(), self.dispatcher(), self.diag.clone())
    }

    /// Sampler for a sensor device; `None` for the relay.
    pub fn sampler(&self, device: Device) -> Option<Sampler<A, S>> {
        let gate = self.registry.sensor(device)?.clone();
        Some(Sampler::new(
            device,
            gate,
            self.serial.clone(),
            self.diag.clone(),
            self.config.lock_timeout(),
            self.config.min_sample_period(),
        ))
    }

    pub fn actuator(&self) -> Actuator<D> {
        Actuator::new(
            self.registry.relay().clone(),
            self.diag.clone(),
            self.config.lock_timeout(),
            self.config.relay_poll(),
        )
    }
}

impl<A, D, S> Node<A, D, S>
where
    A: AnalogPort + Send + 'static,
    D: DigitalOutputPort + Send + 'static,
    S: SerialTx + Send + 'static,
{
    /// Start the decoder, dispatcher, both samplers and the actuator loop.
    ///
    /// The receive side is not started here; the caller feeds
    /// [`receiver`](Self::receiver) from whatever delivers UART bytes.
    pub fn spawn(&self) -> io::Result<NodeTasks> {
        let decoder = self.decoder();
        let dispatch = self.dispatch_task();
        let temp = self.sampler(Device::Temperature);
        let light = self.sampler(Device::Light);
        let actuator = self.actuator();

        let tasks = NodeTasks {
            decoder: spawn_task(TaskSpec::DECODER, move || decoder.run())?,
            dispatcher: spawn_task(TaskSpec::DISPATCHER, move || dispatch.run())?,
            temp_sampler: spawn_task(TaskSpec::TEMP_SAMPLER, move || {
                if let Some(s) = temp {
                    s.run()
                }
            })?,
            light_sampler: spawn_task(TaskSpec::LIGHT_SAMPLER, move || {
                if let Some(s) = light {
                    s.run()
                }
            })?,
            actuator: spawn_task(TaskSpec::ACTUATOR, move || actuator.run())?,
        };
        info!("node tasks running");
        Ok(tasks)
    }
}
