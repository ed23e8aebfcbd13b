//! Blocking wrappers over `embassy-sync` primitives.
//!
//! Every task in the node is an OS thread (a FreeRTOS task on target). The
//! primitives are the async ones from `embassy-sync`, driven to completion
//! with `futures_lite::future::block_on`, so an ISR-side `signal()` or a
//! guard drop on one thread wakes the waiter parked on another.
//!
//! Waits are unbounded unless the caller passes a timeout; bounded waits
//! race the primitive against an `async-io-mini` reactor timer.

use core::future::Future;
use core::time::Duration;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::mutex::{Mutex, MutexGuard};
use embassy_sync::signal::Signal;
use futures_lite::future;

use crate::error::{Error, Result};

/// Raw mutex used by every shared primitive in the node. A critical
/// section is the only lock that is also safe to take from interrupt
/// context.
pub type RawMutex = CriticalSectionRawMutex;

/// Block the current task on `fut`, optionally giving up after `timeout`.
///
/// `what` names the resource in the resulting [`Error::TimedOut`].
pub fn block_on_bounded<F: Future>(
    fut: F,
    timeout: Option<Duration>,
    what: &'static str,
) -> Result<F::Output> {
    match timeout {
        None => Ok(future::block_on(fut)),
        Some(limit) => future::block_on(future::or(async { Ok(fut.await) }, async {
            async_io_mini::Timer::after(limit).await;
            Err(Error::TimedOut(what))
        })),
    }
}

/// A device's loop gate: its mutex-guarded state plus a wake signal.
///
/// The state carries the enable flag, so flipping it and waking the loop
/// happen on one object. The wake signal is sticky: a `wake()` issued
/// before the loop starts waiting is not lost, and extra wakes only cause
/// one redundant re-check. This is what makes arming idempotent.
pub struct Gate<T> {
    name: &'static str,
    state: Mutex<RawMutex, T>,
    wake: Signal<RawMutex, ()>,
}

impl<T> Gate<T> {
    pub const fn new(name: &'static str, state: T) -> Self {
        Self {
            name,
            state: Mutex::new(state),
            wake: Signal::new(),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Lock the gate state.
    pub fn lock(&self, timeout: Option<Duration>) -> Result<MutexGuard<'_, RawMutex, T>> {
        block_on_bounded(self.state.lock(), timeout, self.name)
    }

    /// Nudge the loop behind this gate to re-check its state.
    pub fn wake(&self) {
        self.wake.signal(());
    }

    /// Park until `open` holds for the gate state. Never times out.
    pub fn wait_until(&self, mut open: impl FnMut(&T) -> bool) {
        loop {
            {
                let state = future::block_on(self.state.lock());
                if open(&state) {
                    return;
                }
            }
            future::block_on(self.wake.wait());
        }
    }
}
