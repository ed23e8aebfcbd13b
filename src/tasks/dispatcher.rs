//! Command Dispatcher task: the sole consumer of the dispatch queue.

use std::sync::Arc;

use futures_lite::future;
use log::warn;

use crate::app::dispatcher::{Dispatcher, Outcome};
use crate::app::ports::{AnalogPort, DigitalOutputPort, SerialTx};
use crate::diagnostics::Diagnostics;
use crate::error::Result;
use crate::protocol::channels::DispatchQueue;

pub struct DispatchTask<A, D, S> {
    queue: Arc<DispatchQueue>,
    dispatcher: Dispatcher<A, D, S>,
    diag: Arc<Diagnostics>,
}

impl<A, D, S> DispatchTask<A, D, S>
where
    A: AnalogPort,
    D: DigitalOutputPort,
    S: SerialTx,
{
    pub fn new(
        queue: Arc<DispatchQueue>,
        dispatcher: Dispatcher<A, D, S>,
        diag: Arc<Diagnostics>,
    ) -> Self {
        Self {
            queue,
            dispatcher,
            diag,
        }
    }

    /// Block for the next command and apply it.
    pub fn run_once(&self) -> Result<Outcome> {
        let cmd = future::block_on(self.queue.receive());
        let result = self.dispatcher.dispatch(&cmd);
        self.diag.record_command_handled();
        if let Err(e) = &result {
            self.diag.record_error(e);
            warn!("{} {} failed: {}", cmd.kind.mnemonic(), cmd.node_id, e);
        }
        result
    }

    pub fn run(self) -> ! {
        loop {
            let _ = self.run_once();
        }
    }
}
