//! Raw execution results.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// Per-shot rows of one readout region.
pub type RegisterData = Vec<Vec<u8>>;

/// Classical data returned by a machine run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExecutionResult {
    /// Readout regions by name; each row is one shot.
    pub readout_data: FxHashMap<String, RegisterData>,
    /// Wall-clock execution time in milliseconds.
    pub execution_time_ms: Option<u64>,
}

impl ExecutionResult {
    /// Create an empty result (no classical data).
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a readout region.
    pub fn with_register(mut self, name: impl Into<String>, data: RegisterData) -> Self {
        self.readout_data.insert(name.into(), data);
        self
    }

    /// Set execution time.
    pub fn with_execution_time(mut self, ms: u64) -> Self {
        self.execution_time_ms = Some(ms);
        self
    }

    /// Look up a readout region.
    pub fn register(&self, name: &str) -> Option<&RegisterData> {
        self.readout_data.get(name)
    }
}
