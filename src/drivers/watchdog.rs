//! Task watchdog, fed only while the command path makes progress.
//!
//! The decoder and dispatcher block on their queues, so an idle node looks
//! the same as a stuck one from the outside. [`StallDetector`] tells them
//! apart: a stage is stalled when work is waiting for it and its completion
//! counter has not moved for [`STALL_TICKS`] supervisor ticks. Once any
//! stage stalls the supervisor stops feeding, and the ESP-IDF TWDT resets
//! the node [`WATCHDOG_TIMEOUT_MS`] later. On the host the watchdog is a
//! no-op but stalls are still detected and logged.

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

/// Time without a feed before the TWDT resets the node.
pub const WATCHDOG_TIMEOUT_MS: u32 = 10_000;

/// Consecutive ticks with a backlog and no progress that count as a stall.
pub const STALL_TICKS: u32 = 5;

/// One stage of the command path, sampled once per supervisor tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    pub stage: &'static str,
    /// Items waiting in the stage's input queue.
    pub backlog: usize,
    /// Monotonic count of items the stage has taken.
    pub done: u32,
}

#[derive(Debug, Clone, Copy, Default)]
struct StageTrack {
    last_done: u32,
    idle_ticks: u32,
}

/// Flags a stage that sits on a backlog without taking from it.
#[derive(Debug)]
pub struct StallDetector<const N: usize> {
    tracks: [StageTrack; N],
    limit: u32,
}

impl<const N: usize> StallDetector<N> {
    pub fn new(limit: u32) -> Self {
        Self {
            tracks: [StageTrack::default(); N],
            limit,
        }
    }

    /// Record one tick. Returns the first stage that has stalled, if any.
    pub fn observe(&mut self, stages: &[Progress; N]) -> Option<&'static str> {
        let mut stalled = None;
        for (track, p) in self.tracks.iter_mut().zip(stages) {
            if p.done != track.last_done || p.backlog == 0 {
                track.last_done = p.done;
                track.idle_ticks = 0;
                continue;
            }
            track.idle_ticks = track.idle_ticks.saturating_add(1);
            if track.idle_ticks >= self.limit && stalled.is_none() {
                stalled = Some(p.stage);
            }
        }
        stalled
    }
}

/// Handle on the ESP-IDF Task Watchdog Timer for the supervisor task.
pub struct Watchdog {
    #[cfg(target_os = "espidf")]
    subscribed: bool,
}

impl Default for Watchdog {
    fn default() -> Self {
        Self::new()
    }
}

impl Watchdog {
    /// Configure the TWDT and subscribe the calling task.
    pub fn new() -> Self {
        #[cfg(target_os = "espidf")]
        {
            let cfg = esp_task_wdt_config_t {
                timeout_ms: WATCHDOG_TIMEOUT_MS,
                idle_core_mask: 0,
                trigger_panic: true,
            };
            // SAFETY: plain FFI calls; a null handle means the current task.
            let (reconfigured, added) = unsafe {
                (
                    esp_task_wdt_reconfigure(&cfg),
                    esp_task_wdt_add(core::ptr::null_mut()),
                )
            };
            if reconfigured != ESP_OK {
                log::warn!("TWDT reconfigure returned {}", reconfigured);
            }
            let subscribed = added == ESP_OK;
            if subscribed {
                log::info!("supervisor on TWDT, {} ms", WATCHDOG_TIMEOUT_MS);
            } else {
                log::warn!("TWDT subscribe failed ({})", added);
            }
            Self { subscribed }
        }

        #[cfg(not(target_os = "espidf"))]
        {
            Self {}
        }
    }

    pub fn feed(&self) {
        #[cfg(target_os = "espidf")]
        {
            if self.subscribed {
                // SAFETY: the calling task subscribed itself in `new`.
                unsafe {
                    esp_task_wdt_reset();
                }
            }
        }
    }
}

/// The watchdog plus its stall check. Once a stage stalls it stays
/// tripped; only a reset clears it.
pub struct Supervisor<const N: usize> {
    watchdog: Watchdog,
    stalls: StallDetector<N>,
    tripped: Option<&'static str>,
}

impl<const N: usize> Supervisor<N> {
    pub fn new(watchdog: Watchdog) -> Self {
        Self {
            watchdog,
            stalls: StallDetector::new(STALL_TICKS),
            tripped: None,
        }
    }

    /// One supervisor tick. Feeds the watchdog unless a stage has stalled;
    /// returns whether it fed.
    pub fn tick(&mut self, stages: &[Progress; N]) -> bool {
        if self.tripped.is_none() {
            self.tripped = self.stalls.observe(stages);
            if let Some(stage) = self.tripped {
                log::error!("{} stalled with work queued, watchdog no longer fed", stage);
            }
        }
        if self.tripped.is_some() {
            return false;
        }
        self.watchdog.feed();
        true
    }

    pub fn tripped(&self) -> Option<&'static str> {
        self.tripped
    }
}
