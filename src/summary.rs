//! Per-kernel duration aggregation for a whole trace
//!
//! Answers "which kernels dominate this trace" independently of the
//! repeated-block detector: total/mean duration and call count per unique
//! kernel name, plus a top-N ranking by total duration.

use std::collections::HashMap;

use serde::Serialize;

use crate::trace::KernelEvent;

/// Aggregated durations for a single kernel name
#[derive(Debug, Clone, Default)]
pub struct KernelStats {
    /// Number of invocations
    pub count: u64,
    /// Total duration in microseconds
    pub total_us: f64,
    /// Individual durations, kept for mean/extended statistics
    pub durations: Vec<f32>,
}

/// One row of a rendered kernel summary
#[derive(Debug, Clone, Serialize)]
pub struct KernelRow {
    pub kernel_name: String,
    pub total_us: f64,
    pub count: u64,
    pub mean_us: f32,
}

/// Tracks per-kernel statistics for one trace
#[derive(Debug, Default)]
pub struct TraceSummary {
    stats: HashMap<String, KernelStats>,
}

impl TraceSummary {
    /// Create an empty summary
    pub fn new() -> Self {
        Self::default()
    }

    /// Aggregate a full event sequence
    pub fn from_events(events: &[KernelEvent]) -> Self {
        let mut summary = Self::new();
        for event in events {
            summary.record(&event.name, event.duration_us);
        }
        summary
    }

    /// Record one kernel invocation
    pub fn record(&mut self, kernel_name: &str, duration_us: f64) {
        let entry = self.stats.entry(kernel_name.to_string()).or_default();
        entry.count += 1;
        entry.total_us += duration_us;
        entry.durations.push(duration_us as f32);
    }

    /// Number of distinct kernel names seen
    pub fn unique_kernels(&self) -> usize {
        self.stats.len()
    }

    /// Access the underlying per-kernel map
    pub fn stats_map(&self) -> &HashMap<String, KernelStats> {
        &self.stats
    }

    fn mean_of(durations: &[f32]) -> f32 {
        if durations.is_empty() {
            return 0.0;
        }
        trueno::Vector::from_slice(durations).mean().unwrap_or(0.0)
    }

    /// Top `n` kernels by total duration, descending
    pub fn top_by_total_duration(&self, n: usize) -> Vec<KernelRow> {
        let mut rows: Vec<KernelRow> = self
            .stats
            .iter()
            .map(|(name, stats)| KernelRow {
                kernel_name: name.clone(),
                total_us: stats.total_us,
                count: stats.count,
                mean_us: Self::mean_of(&stats.durations),
            })
            .collect();
        rows.sort_by(|a, b| {
            b.total_us
                .partial_cmp(&a.total_us)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.kernel_name.cmp(&b.kernel_name))
        });
        rows.truncate(n);
        rows
    }

    /// All unique kernels with their mean duration
    ///
    /// With a `kernel_order` list, kernels named in it come first in list
    /// order and the rest follow, descending by mean; names that never
    /// appear in the trace are skipped. Without one, the whole table is
    /// sorted descending by mean.
    pub fn mean_duration_summary(&self, kernel_order: Option<&[String]>) -> Vec<KernelRow> {
        let mut rows: Vec<KernelRow> = self
            .stats
            .iter()
            .map(|(name, stats)| KernelRow {
                kernel_name: name.clone(),
                total_us: stats.total_us,
                count: stats.count,
                mean_us: Self::mean_of(&stats.durations),
            })
            .collect();
        rows.sort_by(|a, b| {
            b.mean_us
                .partial_cmp(&a.mean_us)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.kernel_name.cmp(&b.kernel_name))
        });

        if let Some(order) = kernel_order {
            let mut ordered = Vec::with_capacity(rows.len());
            for name in order {
                if let Some(index) = rows.iter().position(|r| &r.kernel_name == name) {
                    ordered.push(rows.remove(index));
                }
            }
            ordered.append(&mut rows);
            return ordered;
        }
        rows
    }
}
