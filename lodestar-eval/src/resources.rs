//! Best-effort CPU/RAM sampling around generation calls.

use serde::Serialize;
use sysinfo::System;

/// A point-in-time CPU/RAM reading.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct ResourceSample {
    pub cpu_percent: f32,
    pub ram_percent: f32,
}

/// Samples process-visible CPU and memory usage.
///
/// Purely observational: callers take a sample immediately before and
/// after a generation call to show the delta. Sampling never throttles or
/// cancels work.
pub struct ResourceMonitor {
    system: System,
}

impl ResourceMonitor {
    pub fn new() -> Self {
        Self { system: System::new() }
    }

    /// Refresh and read current CPU and RAM utilization.
    pub fn sample(&mut self) -> ResourceSample {
        self.system.refresh_cpu_usage();
        self.system.refresh_memory();

        let total = self.system.total_memory();
        let ram_percent = if total == 0 {
            0.0
        } else {
            self.system.used_memory() as f32 * 100.0 / total as f32
        };

        ResourceSample { cpu_percent: self.system.global_cpu_info().cpu_usage(), ram_percent }
    }
}

impl Default for ResourceMonitor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn samples_are_within_plausible_bounds() {
        let mut monitor = ResourceMonitor::new();
        let sample = monitor.sample();
        assert!(sample.ram_percent >= 0.0);
        assert!(sample.ram_percent <= 100.0);
        assert!(sample.cpu_percent >= 0.0);
    }
}
