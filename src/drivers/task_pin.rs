//! Task spawning with explicit priority and stack.
//!
//! Wraps `esp_pthread_set_cfg()` so that `std::thread::spawn` creates a
//! FreeRTOS task with the requested priority and stack size. On non-ESP
//! targets it falls back to a plain named thread.
//!
//! # ESP-IDF Threading Model
//!
//! ESP-IDF implements `std::thread` via pthreads, which are thin wrappers
//! around FreeRTOS tasks. `esp_pthread_set_cfg()` sets thread-local
//! configuration that applies to the *next* `pthread_create()` call from
//! the calling thread, so the config→spawn pair must not be interleaved
//! with other thread creation on the same thread.

use std::io;
use std::thread::JoinHandle;

/// Priority and stack for one node task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskSpec {
    /// NUL-terminated task name (e.g. `"decoder\0"`).
    pub name: &'static str,
    /// FreeRTOS priority; higher preempts lower.
    pub priority: u8,
    pub stack_kb: usize,
}

impl TaskSpec {
    pub const DECODER: Self = Self {
        name: "decoder\0",
        priority: 5,
        stack_kb: 6,
    };
    pub const DISPATCHER: Self = Self {
        name: "dispatcher\0",
        priority: 5,
        stack_kb: 6,
    };
    pub const TEMP_SAMPLER: Self = Self {
        name: "temp-sampler\0",
        priority: 4,
        stack_kb: 4,
    };
    pub const LIGHT_SAMPLER: Self = Self {
        name: "light-sampler\0",
        priority: 4,
        stack_kb: 4,
    };
    pub const ACTUATOR: Self = Self {
        name: "actuator\0",
        priority: 3,
        stack_kb: 3,
    };
    pub const UART_RX: Self = Self {
        name: "uart-rx\0",
        priority: 6,
        stack_kb: 4,
    };

    pub fn display_name(&self) -> &'static str {
        self.name.trim_end_matches('\0')
    }
}

/// Spawn a node task with its priority and stack size.
#[cfg(target_os = "espidf")]
pub fn spawn_task(
    spec: TaskSpec,
    f: impl FnOnce() + Send + 'static,
) -> io::Result<JoinHandle<()>> {
    // SAFETY: the config is consumed by the very next pthread_create on
    // this thread, which is the spawn below.
    unsafe {
        let mut cfg = esp_idf_sys::esp_create_default_pthread_config();
        cfg.prio = i32::from(spec.priority);
        cfg.stack_size = (spec.stack_kb * 1024) as i32;
        cfg.thread_name = spec.name.as_ptr() as *const _;
        let ret = esp_idf_sys::esp_pthread_set_cfg(&cfg);
        if ret != esp_idf_sys::ESP_OK as i32 {
            return Err(io::Error::other(format!("esp_pthread_set_cfg failed: {ret}")));
        }
    }

    log::info!(
        "Spawning '{}' (pri={}, stack={}KB)",
        spec.display_name(),
        spec.priority,
        spec.stack_kb
    );

    std::thread::Builder::new()
        .name(spec.display_name().into())
        .spawn(f)
}

/// Simulation fallback: priority is advisory only.
#[cfg(not(target_os = "espidf"))]
pub fn spawn_task(
    spec: TaskSpec,
    f: impl FnOnce() + Send + 'static,
) -> io::Result<JoinHandle<()>> {
    log::debug!(
        "Spawning '{}' (sim, pri={} ignored, stack={}KB)",
        spec.display_name(),
        spec.priority,
        spec.stack_kb
    );

    std::thread::Builder::new()
        .name(spec.display_name().into())
        .stack_size(spec.stack_kb * 1024)
        .spawn(f)
}
