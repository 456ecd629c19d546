//! Duration statistics for a detected repeated block
//!
//! Pure derivations over the winning block: a per-position table (one row per
//! offset inside the block) and per-trace metadata over each occurrence's
//! total duration. Reductions use Trueno SIMD vectors, matching the rest of
//! the paiml stack; the sample standard deviation is computed explicitly
//! because it must be Bessel-corrected (n - 1).

use serde::Serialize;

use super::detect::RepeatedBlock;
use crate::trace::KernelEvent;

/// Duration summary for one offset inside the repeated block
#[derive(Debug, Clone, Serialize)]
pub struct BlockPositionStats {
    /// Offset inside the block (0..length)
    pub position: usize,
    /// Kernel name at this offset, from the first occurrence
    pub kernel_name: String,
    pub mean_us: f32,
    pub median_us: f32,
    pub min_us: f32,
    pub max_us: f32,
    /// Number of occurrences contributing a duration at this offset
    pub occurrences: usize,
}

/// Per-trace metadata for the detected block
#[derive(Debug, Clone, Serialize)]
pub struct BlockMetadata {
    pub trace_name: String,
    pub block_length: usize,
    pub occurrences: usize,
    /// Start position of the first occurrence
    pub first_kernel_index: usize,
    pub score: usize,
    /// Mean of each occurrence's total block duration
    pub mean_block_duration_us: f32,
    /// Sample standard deviation (n - 1) of occurrence totals; 0 for n == 1
    pub std_block_duration_us: f32,
    pub min_block_duration_us: f32,
    pub max_block_duration_us: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_occurrences: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub occurrence_delta: Option<usize>,
}

/// Linear-interpolation percentile over sorted data
fn percentile(sorted: &[f32], pct: f32) -> f32 {
    if sorted.is_empty() {
        return 0.0;
    }
    if sorted.len() == 1 {
        return sorted[0];
    }

    let index = (pct / 100.0) * (sorted.len() - 1) as f32;
    let lower = index.floor() as usize;
    let upper = index.ceil() as usize;

    if lower == upper {
        sorted[lower]
    } else {
        let weight = index - lower as f32;
        sorted[lower] * (1.0 - weight) + sorted[upper] * weight
    }
}

/// Bessel-corrected sample standard deviation
fn sample_stddev(values: &[f32], mean: f32) -> f32 {
    if values.len() < 2 {
        return 0.0;
    }
    let mean = f64::from(mean);
    let variance = values
        .iter()
        .map(|&v| {
            let d = f64::from(v) - mean;
            d * d
        })
        .sum::<f64>()
        / (values.len() - 1) as f64;
    variance.sqrt() as f32
}

/// Per-position duration summary across all occurrences of the block
///
/// One row per offset 0..length. An occurrence is skipped at an offset if
/// `start + offset` would run past the end of the trace. A `None` block
/// yields an empty table.
pub fn summarize_block(
    events: &[KernelEvent],
    block: Option<&RepeatedBlock>,
) -> Vec<BlockPositionStats> {
    let Some(block) = block else {
        return Vec::new();
    };

    let mut rows = Vec::with_capacity(block.length);
    for position in 0..block.length {
        let durations: Vec<f32> = block
            .occurrences
            .iter()
            .filter(|&&start| start + position < events.len())
            .map(|&start| events[start + position].duration_us as f32)
            .collect();
        if durations.is_empty() {
            continue;
        }

        let v = trueno::Vector::from_slice(&durations);
        let mut sorted = durations.clone();
        sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

        rows.push(BlockPositionStats {
            position,
            kernel_name: block.kernel_sequence[position].clone(),
            mean_us: v.mean().unwrap_or(0.0),
            median_us: percentile(&sorted, 50.0),
            min_us: v.min().unwrap_or(0.0),
            max_us: v.max().unwrap_or(0.0),
            occurrences: durations.len(),
        });
    }
    rows
}

/// Per-trace metadata over each occurrence's total block duration
///
/// Returns `None` when no block was detected; reporting layers render a
/// status row in that case.
pub fn block_metadata(
    events: &[KernelEvent],
    block: Option<&RepeatedBlock>,
    trace_name: &str,
) -> Option<BlockMetadata> {
    let block = block?;

    let totals: Vec<f32> = block
        .occurrences
        .iter()
        .map(|&start| {
            let end = (start + block.length).min(events.len());
            events[start..end]
                .iter()
                .map(|e| e.duration_us as f32)
                .sum()
        })
        .collect();

    let v = trueno::Vector::from_slice(&totals);
    let mean = v.mean().unwrap_or(0.0);

    Some(BlockMetadata {
        trace_name: trace_name.to_string(),
        block_length: block.length,
        occurrences: block.occurrence_count,
        first_kernel_index: block.occurrences[0],
        score: block.score,
        mean_block_duration_us: mean,
        std_block_duration_us: sample_stddev(&totals, mean),
        min_block_duration_us: v.min().unwrap_or(0.0),
        max_block_duration_us: v.max().unwrap_or(0.0),
        target_occurrences: block.target_occurrences,
        occurrence_delta: block
            .target_occurrences
            .map(|t| block.occurrence_count.abs_diff(t)),
    })
}
