//! Instrumentation helpers shared across the engine: a scope timer that logs
//! its own elapsed time on drop.

use std::time::{Duration, Instant};

#[derive(Debug)]
pub struct Timer {
    start: Instant,
    name: String,
}

impl Timer {
    pub fn new(name: &str) -> Self {
        Self {
            start: Instant::now(),
            name: name.to_string(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    pub fn elapsed_ms(&self) -> u64 {
        self.elapsed().as_millis() as u64
    }
}

impl Drop for Timer {
    fn drop(&mut self) {
        let elapsed = self.elapsed_ms();
        log::debug!("Timer '{}' completed in {}ms", self.name, elapsed);
    }
}

/// Macro for timing code blocks
#[macro_export]
macro_rules! time_it {
    ($name:expr, $code:block) => {{
        let _timer = $crate::utils::Timer::new($name);
        $code
    }};
}

/// Tracks several independent named timers at once, for instrumenting a
/// multi-stage pass (e.g. per rule block) without nesting `time_it!` calls.
pub struct PerformanceMonitor {
    timers: std::collections::HashMap<String, Timer>,
}

impl Default for PerformanceMonitor {
    fn default() -> Self {
        Self::new()
    }
}

impl PerformanceMonitor {
    pub fn new() -> Self {
        Self {
            timers: std::collections::HashMap::new(),
        }
    }

    pub fn start_timer(&mut self, name: &str) {
        self.timers.insert(name.to_string(), Timer::new(name));
    }

    pub fn stop_timer(&mut self, name: &str) -> Option<u64> {
        self.timers.remove(name).map(|timer| timer.elapsed_ms())
    }

    pub fn get_metrics(&self, name: &str) -> Option<u64> {
        self.timers.get(name).map(|timer| timer.elapsed_ms())
    }
}
