//! Update rate control for record streams

use serde::{Deserialize, Serialize};

/// Update rate for record streams
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum UpdateRate {
    /// Every record the driver publishes
    Native,

    /// Throttled to maximum Hz
    /// If the requested rate meets or exceeds a known source rate, Native is used
    Max(u32),
}

impl UpdateRate {
    /// Normalize rate against the source frequency, if the source has one.
    ///
    /// Sources with an unknown rate (live transports) are always throttled
    /// when a maximum is requested. `Max(0)` is treated as Native.
    pub fn normalize(self, source_hz: Option<f64>) -> Self {
        match (self, source_hz) {
            (UpdateRate::Native, _) => UpdateRate::Native,
            (UpdateRate::Max(0), _) => UpdateRate::Native,
            (UpdateRate::Max(hz), Some(source)) if hz as f64 >= source => UpdateRate::Native,
            (UpdateRate::Max(hz), _) => UpdateRate::Max(hz),
        }
    }

    /// Get throttle interval if needed
    pub fn throttle_interval(self, source_hz: Option<f64>) -> Option<std::time::Duration> {
        match self.normalize(source_hz) {
            UpdateRate::Native => None,
            UpdateRate::Max(hz) => Some(std::time::Duration::from_secs_f64(1.0 / hz as f64)),
        }
    }
}
