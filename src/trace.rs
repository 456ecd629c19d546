//! Kernel event model shared by ingestion, detection, and reporting
//!
//! A trace is an ordered list of device-kernel invocations. The detector only
//! reads `name` and `duration_us`, addressed by position; timestamps are kept
//! for reporting.

use serde::{Deserialize, Serialize};

/// A single kernel invocation in trace order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KernelEvent {
    /// Kernel name as reported by the profiler
    pub name: String,
    /// Start time in microseconds, relative to the first kernel in the trace
    pub start_us: f64,
    /// Wall-clock duration in microseconds
    pub duration_us: f64,
}

/// An ordered kernel trace with a human-readable name
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KernelTrace {
    /// Display name (e.g., "Trace_A" or the file stem)
    pub name: String,
    /// Kernel invocations in execution order
    pub events: Vec<KernelEvent>,
}

impl KernelTrace {
    /// Create a trace from pre-built events
    pub fn new(name: impl Into<String>, events: Vec<KernelEvent>) -> Self {
        KernelTrace {
            name: name.into(),
            events,
        }
    }

    /// Number of kernel invocations
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// True if the trace contains no kernel events
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
